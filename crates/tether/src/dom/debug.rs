//! Human-readable dumps of the element tree.
//!
//! ```
//! use tether::dom::{Document, ElementTreeDebug, TreeFormatOptions};
//! use tether_core::Size;
//!
//! let doc = Document::new(Size::new(800.0, 600.0));
//! let menu = doc.create_element("md-menu");
//! doc.append_child(doc.root(), menu).unwrap();
//!
//! let dump = ElementTreeDebug::with_options(TreeFormatOptions::minimal()).format(&doc, doc.root());
//! assert!(dump.contains("md-menu"));
//! ```

use std::fmt::Write;

use super::document::Document;
use super::element::{ElementId, NodeKind};

/// Style options for tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Compact single-line representation.
    Compact,
}

/// Configuration for tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to show element ids.
    pub show_ids: bool,
    /// Whether to show attributes.
    pub show_attributes: bool,
    /// Whether to show border boxes.
    pub show_rects: bool,
    /// Walk the composed tree instead of the light tree.
    pub composed: bool,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
    /// Indent size for each level.
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_ids: true,
            show_attributes: true,
            show_rects: false,
            composed: false,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Everything, including geometry.
    pub fn detailed() -> Self {
        Self {
            show_rects: true,
            ..Default::default()
        }
    }

    /// Tag names only.
    pub fn minimal() -> Self {
        Self {
            show_ids: false,
            show_attributes: false,
            show_rects: false,
            ..Default::default()
        }
    }
}

/// Formats an element tree for logs and test failure messages.
#[derive(Debug, Clone, Default)]
pub struct ElementTreeDebug {
    options: TreeFormatOptions,
}

impl ElementTreeDebug {
    /// Create a formatter with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a formatter with custom options.
    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format the subtree rooted at `root`.
    pub fn format(&self, doc: &Document, root: ElementId) -> String {
        let mut output = String::new();
        self.format_into(doc, root, 0, true, &mut output);
        output
    }

    /// Emit the subtree as a debug event on the DOM target.
    pub fn log(&self, doc: &Document, root: ElementId) {
        tracing::debug!(
            target: tether_core::logging::targets::DOM,
            "element tree:\n{}",
            self.format(doc, root)
        );
    }

    fn format_into(&self, doc: &Document, id: ElementId, depth: usize, is_last: bool, output: &mut String) {
        if self.options.max_depth.is_some_and(|max| depth > max) {
            return;
        }
        let Some(line) = doc.with_element(id, |el| {
            let mut line = match el.kind() {
                NodeKind::ShadowRoot { delegates_focus: true } => "#shadow-root (delegates focus)".to_owned(),
                _ => el.tag().to_owned(),
            };
            if self.options.show_ids {
                let _ = write!(line, " [{:?}]", id);
            }
            if self.options.show_attributes {
                for (name, value) in el.attributes() {
                    if value.is_empty() {
                        let _ = write!(line, " {}", name);
                    } else {
                        let _ = write!(line, " {}=\"{}\"", name, value);
                    }
                }
            }
            if self.options.show_rects {
                let r = el.rect();
                let _ = write!(line, " @({}, {} {}x{})", r.left(), r.top(), r.width(), r.height());
            }
            if !el.is_connected() {
                line.push_str(" (disconnected)");
            }
            line
        }) else {
            return;
        };

        output.push_str(&self.build_prefix(depth, is_last));
        output.push_str(&line);
        output.push('\n');

        let children = if self.options.composed {
            doc.composed_children(id)
        } else {
            let mut children = Vec::new();
            children.extend(doc.shadow_root(id));
            children.extend(doc.children(id));
            children
        };
        let count = children.len();
        for (i, child) in children.into_iter().enumerate() {
            self.format_into(doc, child, depth + 1, i + 1 == count, output);
        }
    }

    fn build_prefix(&self, depth: usize, is_last: bool) -> String {
        if depth == 0 {
            return String::new();
        }
        let (branch, tee, corner) = match self.options.style {
            TreeStyle::Ascii => ("|", "+-- ", "`-- "),
            TreeStyle::Unicode => ("\u{2502}", "\u{251c}\u{2500}\u{2500} ", "\u{2514}\u{2500}\u{2500} "),
            TreeStyle::Compact => ("", "- ", "- "),
        };

        let mut prefix = String::new();
        for _ in 0..(depth - 1) {
            prefix.push_str(branch);
            prefix.extend(std::iter::repeat_n(' ', self.options.indent_size));
        }
        prefix.push_str(if is_last { corner } else { tee });
        prefix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_core::Size;

    #[test]
    fn test_format_light_tree_with_shadow() {
        let doc = Document::new(Size::new(100.0, 100.0));
        let host = doc.create_element("md-chip");
        doc.append_child(doc.root(), host).unwrap();
        let shadow = doc.attach_shadow(host, true).unwrap();
        let button = doc.create_element("button");
        doc.append_child(shadow, button).unwrap();
        doc.set_attribute(host, "disabled", "").unwrap();

        let out = ElementTreeDebug::with_options(TreeFormatOptions {
            show_ids: false,
            style: TreeStyle::Ascii,
            ..Default::default()
        })
        .format(&doc, doc.root());
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines[0], "#document");
        assert_eq!(lines[1], "`-- md-chip disabled");
        assert!(lines[2].ends_with("#shadow-root (delegates focus)"));
        assert!(lines[3].ends_with("`-- button"));
    }

    #[test]
    fn test_max_depth_and_disconnected() {
        let doc = Document::new(Size::new(100.0, 100.0));
        let a = doc.create_element("div");
        let b = doc.create_element("span");
        doc.append_child(a, b).unwrap();

        let out = ElementTreeDebug::with_options(TreeFormatOptions {
            max_depth: Some(0),
            ..TreeFormatOptions::minimal()
        })
        .format(&doc, a);
        assert_eq!(out, "div (disconnected)\n");
    }
}

use serde::{Deserialize, Serialize};

use super::position::AnchorPosition;

/// What to do when the requested position overflows the viewport.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "FlipRepr", into = "FlipRepr")]
pub enum FlipPolicy {
    /// Keep the requested position.
    #[default]
    Disabled,
    /// Try the position across the anchor.
    Opposite,
    /// Try each position in order.
    Fallbacks(Vec<AnchorPosition>),
}

impl FlipPolicy {
    /// Candidate positions to try after `requested`, in order.
    pub fn candidates(&self, requested: AnchorPosition) -> Vec<AnchorPosition> {
        match self {
            Self::Disabled => Vec::new(),
            Self::Opposite => vec![requested.opposite()],
            Self::Fallbacks(list) => list.iter().copied().filter(|&p| p != requested).collect(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::Disabled)
    }
}

impl From<bool> for FlipPolicy {
    fn from(enabled: bool) -> Self {
        if enabled { Self::Opposite } else { Self::Disabled }
    }
}

impl From<Vec<AnchorPosition>> for FlipPolicy {
    fn from(list: Vec<AnchorPosition>) -> Self {
        Self::Fallbacks(list)
    }
}

/// Written as `flip = true` or `flip = ["top", "left"]`.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum FlipRepr {
    Enabled(bool),
    Fallbacks(Vec<AnchorPosition>),
}

impl From<FlipRepr> for FlipPolicy {
    fn from(repr: FlipRepr) -> Self {
        match repr {
            FlipRepr::Enabled(enabled) => enabled.into(),
            FlipRepr::Fallbacks(list) => list.into(),
        }
    }
}

impl From<FlipPolicy> for FlipRepr {
    fn from(policy: FlipPolicy) -> Self {
        match policy {
            FlipPolicy::Disabled => Self::Enabled(false),
            FlipPolicy::Opposite => Self::Enabled(true),
            FlipPolicy::Fallbacks(list) => Self::Fallbacks(list),
        }
    }
}

/// How a floating element is positioned against its anchor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorOptions {
    /// The preferred position.
    pub position: AnchorPosition,
    /// Pick the anchor rectangle from its line boxes.
    pub inline: bool,
    /// Slide along the cross axis to stay in the viewport.
    pub shift: bool,
    /// Flip policy.
    pub flip: FlipPolicy,
    /// Gap between anchor and floating element along the main axis.
    pub offset: f32,
}

impl Default for AnchorOptions {
    fn default() -> Self {
        Self {
            position: AnchorPosition::Bottom,
            inline: false,
            shift: false,
            flip: FlipPolicy::Disabled,
            offset: 0.0,
        }
    }
}

impl AnchorOptions {
    /// Options for `position` with everything else at defaults.
    pub fn new(position: AnchorPosition) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn with_inline(mut self, inline: bool) -> Self {
        self.inline = inline;
        self
    }

    pub fn with_shift(mut self, shift: bool) -> Self {
        self.shift = shift;
        self
    }

    pub fn with_flip(mut self, flip: impl Into<FlipPolicy>) -> Self {
        self.flip = flip.into();
        self
    }

    pub fn with_offset(mut self, offset: f32) -> Self {
        self.offset = offset;
        self
    }
}

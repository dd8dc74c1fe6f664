//! Anchor rectangles for inline content that wraps across lines.

use tether_core::Rect;

use super::position::Side;

/// Group line boxes into visual lines.
///
/// Consecutive rects whose vertical center falls inside the current line's
/// extent join that line.
pub fn group_lines(rects: &[Rect]) -> Vec<Rect> {
    let mut lines: Vec<Rect> = Vec::new();
    for rect in rects.iter().filter(|r| !r.is_empty()) {
        let center_y = rect.center().y;
        match lines.last_mut() {
            Some(line) if center_y >= line.top() && center_y <= line.bottom() => {
                *line = line.union(rect);
            }
            _ => lines.push(*rect),
        }
    }
    lines
}

/// The rectangle a floating element on `side` should anchor to.
///
/// Falls back to `bounding` when there are no usable line boxes.
pub fn inline_anchor_rect(side: Side, client_rects: &[Rect], bounding: Rect) -> Rect {
    let lines = group_lines(client_rects);
    let chosen = match side {
        Side::Top => lines.first(),
        Side::Bottom => lines.last(),
        Side::Left => lines
            .iter()
            .min_by(|a, b| a.left().total_cmp(&b.left())),
        Side::Right => lines
            .iter()
            .max_by(|a, b| a.right().total_cmp(&b.right())),
    };
    chosen.copied().unwrap_or(bounding)
}

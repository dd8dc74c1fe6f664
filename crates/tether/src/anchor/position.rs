use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The side of the anchor a floating element is placed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

impl Side {
    /// The side across the anchor.
    pub fn opposite(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Whether the main axis is vertical.
    pub fn is_vertical(self) -> bool {
        matches!(self, Self::Top | Self::Bottom)
    }
}

/// Cross-axis alignment against the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Alignment {
    /// Centers line up.
    #[default]
    Center,
    /// Left edges (top/bottom sides) or top edges (left/right sides) line up.
    Start,
    /// Right edges or bottom edges line up.
    End,
}

/// Placement of a floating element relative to its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnchorPosition {
    /// Above the anchor, centered.
    Top,
    /// Above the anchor, left edges aligned.
    TopStart,
    /// Above the anchor, right edges aligned.
    TopEnd,
    /// Below the anchor, centered.
    #[default]
    Bottom,
    /// Below the anchor, left edges aligned.
    BottomStart,
    /// Below the anchor, right edges aligned.
    BottomEnd,
    /// Left of the anchor, centered.
    Left,
    /// Left of the anchor, top edges aligned.
    LeftStart,
    /// Left of the anchor, bottom edges aligned.
    LeftEnd,
    /// Right of the anchor, centered.
    Right,
    /// Right of the anchor, top edges aligned.
    RightStart,
    /// Right of the anchor, bottom edges aligned.
    RightEnd,
}

impl AnchorPosition {
    /// Every position, in declaration order.
    pub const ALL: [AnchorPosition; 12] = [
        Self::Top,
        Self::TopStart,
        Self::TopEnd,
        Self::Bottom,
        Self::BottomStart,
        Self::BottomEnd,
        Self::Left,
        Self::LeftStart,
        Self::LeftEnd,
        Self::Right,
        Self::RightStart,
        Self::RightEnd,
    ];

    /// Compose a position from a side and an alignment.
    pub fn new(side: Side, alignment: Alignment) -> Self {
        use Alignment::*;
        match (side, alignment) {
            (Side::Top, Center) => Self::Top,
            (Side::Top, Start) => Self::TopStart,
            (Side::Top, End) => Self::TopEnd,
            (Side::Bottom, Center) => Self::Bottom,
            (Side::Bottom, Start) => Self::BottomStart,
            (Side::Bottom, End) => Self::BottomEnd,
            (Side::Left, Center) => Self::Left,
            (Side::Left, Start) => Self::LeftStart,
            (Side::Left, End) => Self::LeftEnd,
            (Side::Right, Center) => Self::Right,
            (Side::Right, Start) => Self::RightStart,
            (Side::Right, End) => Self::RightEnd,
        }
    }

    pub fn side(self) -> Side {
        match self {
            Self::Top | Self::TopStart | Self::TopEnd => Side::Top,
            Self::Bottom | Self::BottomStart | Self::BottomEnd => Side::Bottom,
            Self::Left | Self::LeftStart | Self::LeftEnd => Side::Left,
            Self::Right | Self::RightStart | Self::RightEnd => Side::Right,
        }
    }

    pub fn alignment(self) -> Alignment {
        match self {
            Self::Top | Self::Bottom | Self::Left | Self::Right => Alignment::Center,
            Self::TopStart | Self::BottomStart | Self::LeftStart | Self::RightStart => Alignment::Start,
            Self::TopEnd | Self::BottomEnd | Self::LeftEnd | Self::RightEnd => Alignment::End,
        }
    }

    /// Same alignment on the other side of the anchor.
    pub fn opposite(self) -> Self {
        Self::new(self.side().opposite(), self.alignment())
    }

    /// The kebab-case name (`"bottom-end"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::TopStart => "top-start",
            Self::TopEnd => "top-end",
            Self::Bottom => "bottom",
            Self::BottomStart => "bottom-start",
            Self::BottomEnd => "bottom-end",
            Self::Left => "left",
            Self::LeftStart => "left-start",
            Self::LeftEnd => "left-end",
            Self::Right => "right",
            Self::RightStart => "right-start",
            Self::RightEnd => "right-end",
        }
    }
}

impl fmt::Display for AnchorPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no anchor position.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown anchor position `{0}`")]
pub struct ParsePositionError(String);

impl FromStr for AnchorPosition {
    type Err = ParsePositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParsePositionError(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decompose_and_compose() {
        for position in AnchorPosition::ALL {
            assert_eq!(AnchorPosition::new(position.side(), position.alignment()), position);
        }
    }

    #[test]
    fn test_opposite_keeps_alignment() {
        assert_eq!(AnchorPosition::BottomEnd.opposite(), AnchorPosition::TopEnd);
        assert_eq!(AnchorPosition::LeftStart.opposite(), AnchorPosition::RightStart);
        assert_eq!(AnchorPosition::Top.opposite().opposite(), AnchorPosition::Top);
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("bottom-end".parse::<AnchorPosition>(), Ok(AnchorPosition::BottomEnd));
        assert_eq!(" Right-Start ".parse::<AnchorPosition>(), Ok(AnchorPosition::RightStart));
        assert!("middle".parse::<AnchorPosition>().is_err());
        assert_eq!(AnchorPosition::LeftEnd.to_string(), "left-end");
    }
}

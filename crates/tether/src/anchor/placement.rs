//! Pure placement geometry: side, alignment, flip and shift.

use tether_core::logging::targets;
use tether_core::{Point, Rect, Size};

use super::inline::inline_anchor_rect;
use super::options::AnchorOptions;
use super::position::{Alignment, AnchorPosition, Side};

/// A resolved placement.
///
/// `x`/`y` is the floating element's top-left corner. [`compute_placement`]
/// returns viewport coordinates; [`to_offset_space`] converts them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    /// The position actually used after flipping.
    pub position: AnchorPosition,
}

impl Placement {
    /// The top-left corner as a point.
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// The floating element's rectangle at this placement.
    pub fn rect(&self, floating: Size) -> Rect {
        Rect::from_origin_size(self.origin(), floating)
    }
}

/// Compute where a floating element of size `floating` goes.
///
/// `anchor` is the anchor's border box; `client_rects` its line boxes, only
/// consulted in inline mode. All rectangles are in viewport coordinates.
#[tracing::instrument(level = "trace", target = "tether::anchor", skip_all, fields(position = %options.position))]
pub fn compute_placement(
    anchor: Rect,
    client_rects: &[Rect],
    floating: Size,
    viewport: Rect,
    options: &AnchorOptions,
) -> Placement {
    let resolver = Resolver {
        anchor,
        client_rects,
        floating,
        viewport,
        options,
    };

    let requested = options.position;
    let mut position = requested;
    if options.flip.is_enabled() && !resolver.fits(requested) {
        match options
            .flip
            .candidates(requested)
            .into_iter()
            .find(|&candidate| resolver.fits(candidate))
        {
            Some(candidate) => {
                tracing::trace!(target: targets::ANCHOR, from = %requested, to = %candidate, "flipped");
                position = candidate;
            }
            None => {
                tracing::trace!(target: targets::ANCHOR, %requested, "no flip candidate fits");
            }
        }
    }

    let mut origin = resolver.place(position);
    if options.shift {
        origin = resolver.shift(position, origin);
    }
    Placement {
        x: origin.x,
        y: origin.y,
        position,
    }
}

/// Convert a viewport placement into the coordinate space of the floating
/// element's offset parent.
pub fn to_offset_space(placement: Placement, offset_parent: Rect, parent_scroll: Point) -> Placement {
    Placement {
        x: placement.x - offset_parent.left() + parent_scroll.x,
        y: placement.y - offset_parent.top() + parent_scroll.y,
        position: placement.position,
    }
}

struct Resolver<'a> {
    anchor: Rect,
    client_rects: &'a [Rect],
    floating: Size,
    viewport: Rect,
    options: &'a AnchorOptions,
}

impl Resolver<'_> {
    fn anchor_for(&self, side: Side) -> Rect {
        if self.options.inline {
            inline_anchor_rect(side, self.client_rects, self.anchor)
        } else {
            self.anchor
        }
    }

    /// Top-left corner for `position` before any shifting.
    fn place(&self, position: AnchorPosition) -> Point {
        let side = position.side();
        let a = self.anchor_for(side);
        let (w, h) = (self.floating.width, self.floating.height);
        let gap = self.options.offset;

        let cross = |start: f32, len: f32, own: f32| match position.alignment() {
            Alignment::Center => start + len / 2.0 - own / 2.0,
            Alignment::Start => start,
            Alignment::End => start + len - own,
        };

        match side {
            Side::Top => Point::new(cross(a.left(), a.width(), w), a.top() - h - gap),
            Side::Bottom => Point::new(cross(a.left(), a.width(), w), a.bottom() + gap),
            Side::Left => Point::new(a.left() - w - gap, cross(a.top(), a.height(), h)),
            Side::Right => Point::new(a.right() + gap, cross(a.top(), a.height(), h)),
        }
    }

    fn overflows_x(&self, x: f32) -> bool {
        x < self.viewport.left() || x + self.floating.width > self.viewport.right()
    }

    fn overflows_y(&self, y: f32) -> bool {
        y < self.viewport.top() || y + self.floating.height > self.viewport.bottom()
    }

    /// A position fits when its main axis stays inside the viewport, and,
    /// without shift, its cross axis as well.
    fn fits(&self, position: AnchorPosition) -> bool {
        let origin = self.place(position);
        let (main, cross) = if position.side().is_vertical() {
            (self.overflows_y(origin.y), self.overflows_x(origin.x))
        } else {
            (self.overflows_x(origin.x), self.overflows_y(origin.y))
        };
        !main && (self.options.shift || !cross)
    }

    fn shift(&self, position: AnchorPosition, origin: Point) -> Point {
        let x = clamp_span(origin.x, self.floating.width, self.viewport.left(), self.viewport.right());
        let y = clamp_span(origin.y, self.floating.height, self.viewport.top(), self.viewport.bottom());
        // The cross axis always shifts; the main axis only as a last resort.
        if position.side().is_vertical() {
            let y = if self.overflows_y(origin.y) { y } else { origin.y };
            Point::new(x, y)
        } else {
            let x = if self.overflows_x(origin.x) { x } else { origin.x };
            Point::new(x, y)
        }
    }
}

/// Clamp a span into `[min, max]`, aligning it to `min` when it cannot fit.
fn clamp_span(start: f32, len: f32, min: f32, max: f32) -> f32 {
    if len >= max - min {
        min
    } else {
        start.clamp(min, max - len)
    }
}

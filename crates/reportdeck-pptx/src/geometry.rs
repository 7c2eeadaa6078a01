//! Rectangles in slide coordinates.
//!
//! Layout works in points (1/72 inch), the unit slide anchors are usually
//! reasoned about in. Values are converted to EMU only when XML is written.

use reportdeck_model::Anchor;

use crate::constants::EMU_PER_POINT;

/// An axis-aligned rectangle in points
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a rectangle
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge
    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge
    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    /// Horizontal centre
    pub fn center_x(&self) -> f64 {
        self.x + 0.5 * self.width
    }

    /// Vertical centre
    pub fn center_y(&self) -> f64 {
        self.y + 0.5 * self.height
    }

    /// Shrink by `margin` on every side
    pub fn inset(&self, margin: f64) -> Self {
        Self::new(
            self.x + margin,
            self.y + margin,
            self.width - 2.0 * margin,
            self.height - 2.0 * margin,
        )
    }

    /// The sub-rectangle at `fraction` of this one
    pub fn scaled(&self, fraction: &Anchor) -> Self {
        Self::new(
            self.x + self.width * fraction.x,
            self.y + self.height * fraction.y,
            self.width * fraction.width,
            self.height * fraction.height,
        )
    }

    /// Smallest rectangle containing every point, `None` for no points
    pub fn bounding(points: &[(f64, f64)]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let (mut min_x, mut min_y) = *first;
        let (mut max_x, mut max_y) = *first;
        for &(x, y) in rest {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        Some(Self::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    /// Offset and extent in EMU, as written into `a:off`/`a:ext`
    pub fn to_emu(&self) -> (i64, i64, i64, i64) {
        (
            to_emu(self.x),
            to_emu(self.y),
            to_emu(self.width),
            to_emu(self.height),
        )
    }
}

/// Convert points to EMU, truncating toward zero
pub fn to_emu(points: f64) -> i64 {
    (points * EMU_PER_POINT as f64) as i64
}

/// Convert EMU to points
pub fn from_emu(emu: i64) -> f64 {
    emu as f64 / EMU_PER_POINT as f64
}

/// The drawable page area: the slide size scaled by the fractional anchor
/// from the settings
pub fn page_anchor(slide_width: f64, slide_height: f64, anchor: &Anchor) -> Rect {
    Rect::new(
        slide_width * anchor.x,
        slide_height * anchor.y,
        slide_width * anchor.width,
        slide_height * anchor.height,
    )
}

/// The band of height `space` at the top of `page`
pub fn starting_space(page: &Rect, space: f64) -> Rect {
    Rect::new(page.x, page.y, page.width, space)
}

/// What remains of `page` below `used` points; never less than 1pt tall
pub fn remaining_space(page: &Rect, used: f64) -> Rect {
    Rect::new(
        page.x,
        page.y + used,
        page.width,
        (page.height - used).max(1.0),
    )
}

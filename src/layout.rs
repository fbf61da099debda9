//! Page geometry and palette shared by the generated pages
//!
//! All coordinates are PDF points with the origin at the bottom-left of the page.

/// Page dimensions in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    /// US Letter size (8.5" × 11")
    pub const fn letter() -> Self {
        Self { width: 612.0, height: 792.0 }
    }

    /// Read a size from a `[llx lly urx ury]` MediaBox
    pub fn from_media_box(media_box: [f32; 4]) -> Self {
        Self {
            width: (media_box[2] - media_box[0]).abs(),
            height: (media_box[3] - media_box[1]).abs(),
        }
    }

    /// Full-page rectangle
    pub fn rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

/// Axis-aligned rectangle: lower-left corner plus extent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Build from a PDF `[x1 y1 x2 y2]` array in any corner order
    pub fn from_corners(corners: [f32; 4]) -> Self {
        let (x1, x2) = (corners[0].min(corners[2]), corners[0].max(corners[2]));
        let (y1, y2) = (corners[1].min(corners[3]), corners[1].max(corners[3]));
        Self::new(x1, y1, x2 - x1, y2 - y1)
    }

    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Shrink by the same amount on every side
    pub fn inset(&self, amount: f32) -> Self {
        Self::new(
            self.x + amount,
            self.y + amount,
            (self.width - 2.0 * amount).max(0.0),
            (self.height - 2.0 * amount).max(0.0),
        )
    }

    /// Largest rectangle with the given aspect ratio that fits inside, anchored left
    /// and vertically centered
    pub fn fit_left(&self, aspect: f32) -> Self {
        if aspect <= 0.0 {
            return *self;
        }
        let mut width = self.width;
        let mut height = width / aspect;
        if height > self.height {
            height = self.height;
            width = height * aspect;
        }
        Self::new(self.x, self.y + (self.height - height) / 2.0, width, height)
    }
}

/// RGB color with components in 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb(pub f32, pub f32, pub f32);

impl Rgb {
    /// Build from 0-255 components
    pub fn from_u8(r: u8, g: u8, b: u8) -> Self {
        Self(f32::from(r) / 255.0, f32::from(g) / 255.0, f32::from(b) / 255.0)
    }
}

/// Brand palette used by the cover, divider and error pages
pub mod palette {
    use super::Rgb;

    pub const NAVY: Rgb = Rgb(0.075, 0.137, 0.247);
    pub const ACCENT: Rgb = Rgb(0.902, 0.459, 0.122);
    pub const BLACK: Rgb = Rgb(0.0, 0.0, 0.0);
    pub const WHITE: Rgb = Rgb(1.0, 1.0, 1.0);
    pub const GRAY: Rgb = Rgb(0.42, 0.45, 0.5);
    pub const LIGHT_GRAY: Rgb = Rgb(0.82, 0.84, 0.86);
    pub const PANEL: Rgb = Rgb(0.965, 0.969, 0.976);
    pub const ERROR_RED: Rgb = Rgb(0.753, 0.137, 0.137);
}

/// Standard page margin for generated pages
pub const MARGIN: f32 = 40.0;

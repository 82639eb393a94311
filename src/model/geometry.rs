//! Page geometry in millimetres, origin at the top-left corner.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Narrowest page on which the deepest list level still has room for
/// text after its indent and marker.
const MIN_PAGE_WIDTH: f32 = 100.0;

/// Fixed page size and margin for one render.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    /// Page width
    pub width: f32,
    /// Page height
    pub height: f32,
    /// Top and bottom margin; the bottom margin triggers page breaks
    pub margin: f32,
}

impl PageGeometry {
    /// Create a geometry. Call [`validate`](Self::validate) before use.
    pub fn new(width: f32, height: f32, margin: f32) -> Self {
        Self {
            width,
            height,
            margin,
        }
    }

    /// A4 portrait, 15 mm margin.
    pub fn a4() -> Self {
        Self::new(210.0, 297.0, 15.0)
    }

    /// Y coordinate past which a cell forces a page break.
    pub fn break_trigger(&self) -> f32 {
        self.height - self.margin
    }

    /// Check that the geometry leaves room for content.
    pub fn validate(&self) -> Result<()> {
        if !self.width.is_finite() || self.width <= 0.0 {
            return Err(Error::InvalidGeometry(format!(
                "page width must be positive, got {}",
                self.width
            )));
        }
        if !self.height.is_finite() || self.height <= 0.0 {
            return Err(Error::InvalidGeometry(format!(
                "page height must be positive, got {}",
                self.height
            )));
        }
        if !self.margin.is_finite() || self.margin < 0.0 {
            return Err(Error::InvalidGeometry(format!(
                "margin must not be negative, got {}",
                self.margin
            )));
        }
        if self.margin * 2.0 >= self.height {
            return Err(Error::InvalidGeometry(format!(
                "margins of {} leave no vertical space on a page {} high",
                self.margin, self.height
            )));
        }
        if self.width < MIN_PAGE_WIDTH {
            return Err(Error::InvalidGeometry(format!(
                "page width {} is below the minimum of {}",
                self.width, MIN_PAGE_WIDTH
            )));
        }
        Ok(())
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4()
    }
}

/// A point on the page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal offset from the left edge
    pub x: f32,
    /// Vertical offset from the top edge
    pub y: f32,
}

impl Point {
    /// Create a point.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle on the page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Rect {
    /// Create a rectangle.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

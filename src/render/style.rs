//! Text styles, colors and width estimation.

use serde::{Deserialize, Serialize};

/// Millimetres per typographic point.
pub const PT_TO_MM: f32 = 25.4 / 72.0;

/// Standard font family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontFamily {
    /// Proportional sans-serif
    Helvetica,
    /// Monospaced
    Courier,
}

/// Font weight/slant.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FontStyle {
    #[default]
    Regular,
    Bold,
    Italic,
}

/// RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);

    /// Create a color from components.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Create a gray level.
    pub const fn gray(level: u8) -> Self {
        Self::rgb(level, level, level)
    }

    /// Components scaled to 0.0..=1.0.
    pub fn unit(&self) -> (f32, f32, f32) {
        (
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        )
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

/// Horizontal alignment of text inside a cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    #[default]
    Left,
    Center,
}

/// Complete text style, passed explicitly with every draw call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub family: FontFamily,
    pub style: FontStyle,
    /// Size in points
    pub size: f32,
    pub color: Color,
}

impl TextStyle {
    /// Regular Helvetica at the given size.
    pub fn helvetica(size: f32) -> Self {
        Self {
            family: FontFamily::Helvetica,
            style: FontStyle::Regular,
            size,
            color: Color::BLACK,
        }
    }

    /// Regular Courier at the given size.
    pub fn courier(size: f32) -> Self {
        Self {
            family: FontFamily::Courier,
            ..Self::helvetica(size)
        }
    }

    pub fn bold(self) -> Self {
        Self {
            style: FontStyle::Bold,
            ..self
        }
    }

    pub fn italic(self) -> Self {
        Self {
            style: FontStyle::Italic,
            ..self
        }
    }

    pub fn with_size(self, size: f32) -> Self {
        Self { size, ..self }
    }

    pub fn with_color(self, color: Color) -> Self {
        Self { color, ..self }
    }

    /// Font size in millimetres.
    pub fn size_mm(&self) -> f32 {
        self.size * PT_TO_MM
    }

    /// Estimated advance width of one character, in millimetres.
    ///
    /// Width is estimated by character count, not real glyph metrics.
    pub fn char_width(&self) -> f32 {
        let em = match (self.family, self.style) {
            (FontFamily::Courier, _) => 0.6,
            (FontFamily::Helvetica, FontStyle::Bold) => 0.55,
            (FontFamily::Helvetica, _) => 0.5,
        };
        em * self.size_mm()
    }

    /// Estimated width of a string, in millimetres.
    pub fn text_width(&self, text: &str) -> f32 {
        text.chars().count() as f32 * self.char_width()
    }

    /// Number of whole characters that fit in a width.
    pub fn chars_fitting(&self, width: f32) -> usize {
        if width <= 0.0 {
            0
        } else {
            (width / self.char_width()).floor() as usize
        }
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        TextStyle::helvetica(12.0)
    }
}

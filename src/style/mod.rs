//! # Style System
//!
//! Fonts, per-range text styles, and the enumerations that configure a
//! [`TextLayout`](crate::layout::TextLayout).
//!
//! All style values compare by content: setting a style that is equal to the
//! one already in place is a no-op and keeps the cached layout valid.

pub mod table;

pub use table::{StyleSpan, StyleTable};

use serde::{Deserialize, Serialize};

/// A font description. Measurement is delegated to a
/// [`MetricsProvider`](crate::font::MetricsProvider); this is only the key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Font {
    /// Font family name.
    pub family: String,
    /// Font size in points.
    pub size: f64,
    /// Font weight (100-900).
    pub weight: u32,
    /// Font style.
    pub font_style: FontStyle,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            family: "Helvetica".to_string(),
            size: 12.0,
            weight: 400,
            font_style: FontStyle::Normal,
        }
    }
}

impl Font {
    pub fn new(family: &str, size: f64) -> Self {
        Self {
            family: family.to_string(),
            size,
            ..Default::default()
        }
    }

    pub fn bold(mut self) -> Self {
        self.weight = 700;
        self
    }

    pub fn italic(mut self) -> Self {
        self.font_style = FontStyle::Italic;
        self
    }

    pub fn is_italic(&self) -> bool {
        matches!(self.font_style, FontStyle::Italic | FontStyle::Oblique)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
    Oblique,
}

/// Fixed metrics for every character of a styled range.
///
/// Used for inline objects (images, widgets) that occupy text positions but
/// are not measured by the font.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlyphMetrics {
    pub ascent: f64,
    pub descent: f64,
    /// Advance of each character in the range.
    pub width: f64,
}

impl GlyphMetrics {
    pub fn new(ascent: f64, descent: f64, width: f64) -> Self {
        Self {
            ascent,
            descent,
            width,
        }
    }

    pub(crate) fn is_valid(&self) -> bool {
        [self.ascent, self.descent, self.width]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0)
    }
}

/// Per-range style override.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextStyle {
    /// Font for this range. Falls back to the layout font when absent.
    pub font: Option<Font>,
    /// Baseline shift in points; positive values raise the text.
    pub rise: f64,
    /// Fixed metrics that replace font measurement.
    pub metrics: Option<GlyphMetrics>,
}

impl TextStyle {
    pub fn with_font(font: Font) -> Self {
        Self {
            font: Some(font),
            ..Default::default()
        }
    }

    pub fn with_metrics(metrics: GlyphMetrics) -> Self {
        Self {
            metrics: Some(metrics),
            ..Default::default()
        }
    }
}

/// Horizontal alignment of lines inside the wrap width.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Paragraph orientation. Stored and reported; lines are laid out left to
/// right in both cases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    LeftToRight,
    RightToLeft,
}

/// Caret movement granularity for `next_offset` / `previous_offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Movement {
    Char,
    Cluster,
    Word,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_builders() {
        let f = Font::new("Courier", 10.0).bold().italic();
        assert_eq!(f.family, "Courier");
        assert_eq!(f.weight, 700);
        assert!(f.is_italic());
    }

    #[test]
    fn test_style_content_equality() {
        let a = TextStyle::with_font(Font::new("Times", 14.0));
        let b = TextStyle::with_font(Font::new("Times", 14.0));
        assert_eq!(a, b);
        assert_ne!(a, TextStyle::default());
    }

    #[test]
    fn test_style_deserializes_camel_case() {
        let style: TextStyle = serde_json::from_str(
            r#"{ "font": { "family": "Courier", "size": 9, "fontStyle": "Oblique" }, "rise": 2 }"#,
        )
        .unwrap();
        let font = style.font.unwrap();
        assert_eq!(font.size, 9.0);
        assert_eq!(font.weight, 400);
        assert!(font.is_italic());
        assert_eq!(style.rise, 2.0);
    }

    #[test]
    fn test_glyph_metrics_validation() {
        assert!(GlyphMetrics::new(8.0, 2.0, 5.0).is_valid());
        assert!(!GlyphMetrics::new(8.0, -2.0, 5.0).is_valid());
        assert!(!GlyphMetrics::new(f64::NAN, 2.0, 5.0).is_valid());
    }
}

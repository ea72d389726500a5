//! # Font Management
//!
//! Text measurement for the layout engine.
//!
//! The engine never measures text itself: it asks a [`MetricsProvider`].
//! [`FontContext`] is the provider shipped with the crate. It knows the
//! built-in Helvetica and Courier metrics and any TrueType/OpenType font
//! registered through ttf-parser.

pub mod metrics;

pub use metrics::StandardFontMetrics;

use crate::error::{LayoutError, MetricsError};
use crate::style::Font;
use std::collections::HashMap;

/// Extent of a measured string.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TextExtent {
    pub width: f64,
    pub height: f64,
    /// Distance from the top of the extent to the baseline.
    pub baseline: f64,
}

/// Vertical metrics of a font.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FontMetrics {
    pub ascent: f64,
    pub descent: f64,
    pub leading: f64,
}

impl FontMetrics {
    pub fn height(&self) -> f64 {
        self.ascent + self.descent + self.leading
    }
}

/// Measures text for the layout engine.
///
/// Implementations must be deterministic for identical `(text, font)` input
/// and must not call back into the layout that is measuring.
pub trait MetricsProvider {
    /// Measure a whole string in `font`.
    fn measure(&self, text: &str, font: &Font) -> Result<TextExtent, MetricsError>;

    /// Vertical metrics of `font`.
    fn font_metrics(&self, font: &Font) -> Result<FontMetrics, MetricsError>;

    /// Advance width of a single character.
    fn measure_char(&self, ch: char, font: &Font) -> Result<f64, MetricsError> {
        let mut buf = [0u8; 4];
        Ok(self.measure(ch.encode_utf8(&mut buf), font)?.width)
    }

    /// Line height of `font`.
    fn font_height(&self, font: &Font) -> Result<f64, MetricsError> {
        Ok(self.font_metrics(font)?.height())
    }

    /// The font used when neither a style nor the layout names one.
    fn system_font(&self) -> Font {
        Font::default()
    }
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct FontKey {
    pub family: String,
    pub weight: u32,
    pub italic: bool,
}

#[derive(Debug, Clone)]
pub enum FontData {
    /// One of the built-in fonts. No font file needed.
    Standard(StandardFont),
    /// A TrueType/OpenType font with metrics parsed by ttf-parser.
    Custom(CustomFontMetrics),
}

/// Parsed metrics from a TrueType/OpenType font via ttf-parser.
#[derive(Debug, Clone)]
pub struct CustomFontMetrics {
    pub units_per_em: u16,
    pub advance_widths: HashMap<char, u16>,
    pub default_advance: u16,
    pub ascender: i16,
    pub descender: i16,
    pub line_gap: i16,
}

impl CustomFontMetrics {
    /// Get the advance width of a character in points.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        let w = self
            .advance_widths
            .get(&ch)
            .copied()
            .unwrap_or(self.default_advance);
        self.scale(w as f64, font_size)
    }

    pub fn font_metrics(&self, font_size: f64) -> FontMetrics {
        FontMetrics {
            ascent: self.scale(self.ascender as f64, font_size),
            descent: self.scale(-(self.descender as f64), font_size),
            leading: self.scale((self.line_gap as f64).max(0.0), font_size),
        }
    }

    fn scale(&self, units: f64, font_size: f64) -> f64 {
        units * font_size / self.units_per_em as f64
    }

    /// Parse metrics from font data using ttf-parser.
    pub fn from_font_data(data: &[u8]) -> Option<Self> {
        let face = ttf_parser::Face::parse(data, 0).ok()?;
        let units_per_em = face.units_per_em();

        let mut advance_widths = HashMap::new();
        let mut default_advance = 0u16;

        // Sample the BMP to build the width map.
        for code in 32u32..=0xFFFF {
            if let Some(ch) = char::from_u32(code) {
                if let Some(glyph_id) = face.glyph_index(ch) {
                    let advance = face.glyph_hor_advance(glyph_id).unwrap_or(0);
                    advance_widths.insert(ch, advance);
                    if ch == ' ' {
                        default_advance = advance;
                    }
                }
            }
        }

        if default_advance == 0 {
            default_advance = units_per_em / 2;
        }

        Some(CustomFontMetrics {
            units_per_em,
            advance_widths,
            default_advance,
            ascender: face.ascender(),
            descender: face.descender(),
            line_gap: face.line_gap(),
        })
    }
}

/// The built-in fonts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFont {
    Helvetica,
    Courier,
}

impl StandardFont {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::Courier => "Courier",
        }
    }

    pub fn metrics(&self) -> &'static StandardFontMetrics {
        match self {
            Self::Helvetica => &metrics::HELVETICA,
            Self::Courier => &metrics::COURIER,
        }
    }
}

/// A font registry that maps font family + weight + style to font data.
pub struct FontRegistry {
    fonts: HashMap<FontKey, FontData>,
}

impl Default for FontRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FontRegistry {
    pub fn new() -> Self {
        let mut fonts = HashMap::new();
        for font in [StandardFont::Helvetica, StandardFont::Courier] {
            for (weight, italic) in [(400, false), (700, false), (400, true), (700, true)] {
                fonts.insert(
                    FontKey {
                        family: font.name().to_string(),
                        weight,
                        italic,
                    },
                    FontData::Standard(font),
                );
            }
        }
        Self { fonts }
    }

    /// Look up a font, falling back to Helvetica if not found.
    pub fn resolve(&self, family: &str, weight: u32, italic: bool) -> &FontData {
        let key = FontKey {
            family: family.to_string(),
            weight,
            italic,
        };
        if let Some(font) = self.fonts.get(&key) {
            return font;
        }

        // Try with normalized weight (snap to 400 or 700)
        let snapped_weight = if weight >= 600 { 700 } else { 400 };
        let key = FontKey {
            family: family.to_string(),
            weight: snapped_weight,
            italic,
        };
        if let Some(font) = self.fonts.get(&key) {
            return font;
        }

        // An upright face of the same family is closer than another family.
        let key = FontKey {
            family: family.to_string(),
            weight: snapped_weight,
            italic: false,
        };
        if let Some(font) = self.fonts.get(&key) {
            return font;
        }

        static FALLBACK: FontData = FontData::Standard(StandardFont::Helvetica);
        &FALLBACK
    }

    /// Register a TrueType/OpenType font.
    pub fn register(
        &mut self,
        family: &str,
        weight: u32,
        italic: bool,
        data: &[u8],
    ) -> Result<(), LayoutError> {
        let metrics = CustomFontMetrics::from_font_data(data).ok_or_else(|| {
            LayoutError::FontLoad(format!("could not parse font data for '{}'", family))
        })?;
        tracing::debug!(
            family,
            weight,
            italic,
            glyphs = metrics.advance_widths.len(),
            "registered font"
        );
        self.fonts.insert(
            FontKey {
                family: family.to_string(),
                weight,
                italic,
            },
            FontData::Custom(metrics),
        );
        Ok(())
    }

    /// Iterate over all registered fonts.
    pub fn iter(&self) -> impl Iterator<Item = (&FontKey, &FontData)> {
        self.fonts.iter()
    }
}

/// The crate's [`MetricsProvider`], backed by a [`FontRegistry`].
pub struct FontContext {
    registry: FontRegistry,
    system_font: Font,
}

impl Default for FontContext {
    fn default() -> Self {
        Self::new()
    }
}

impl FontContext {
    pub fn new() -> Self {
        Self {
            registry: FontRegistry::new(),
            system_font: Font::default(),
        }
    }

    /// Use `font` wherever neither a style nor the layout names one.
    pub fn with_system_font(mut self, font: Font) -> Self {
        self.system_font = font;
        self
    }

    /// Get the advance width of a single character in points.
    pub fn char_width(&self, ch: char, font: &Font) -> f64 {
        match self.resolve(font) {
            FontData::Standard(std_font) => std_font.metrics().char_width(ch, font.size),
            FontData::Custom(m) => m.char_width(ch, font.size),
        }
    }

    /// Measure the width of a string in points.
    pub fn measure_string(&self, text: &str, font: &Font) -> f64 {
        match self.resolve(font) {
            FontData::Standard(std_font) => std_font.metrics().measure_string(text, font.size),
            FontData::Custom(m) => text.chars().map(|ch| m.char_width(ch, font.size)).sum(),
        }
    }

    /// Resolve a font to its font data.
    pub fn resolve(&self, font: &Font) -> &FontData {
        self.registry
            .resolve(&font.family, font.weight, font.is_italic())
    }

    /// Access the underlying font registry.
    pub fn registry(&self) -> &FontRegistry {
        &self.registry
    }

    /// Access the underlying font registry mutably.
    pub fn registry_mut(&mut self) -> &mut FontRegistry {
        &mut self.registry
    }

    fn check_size(font: &Font) -> Result<(), MetricsError> {
        if font.size.is_finite() && font.size > 0.0 {
            Ok(())
        } else {
            Err(MetricsError::new(format!(
                "font '{}' has unusable size {}",
                font.family, font.size
            )))
        }
    }
}

impl MetricsProvider for FontContext {
    fn measure(&self, text: &str, font: &Font) -> Result<TextExtent, MetricsError> {
        let metrics = self.font_metrics(font)?;
        Ok(TextExtent {
            width: self.measure_string(text, font),
            height: metrics.height(),
            baseline: metrics.ascent + metrics.leading,
        })
    }

    fn font_metrics(&self, font: &Font) -> Result<FontMetrics, MetricsError> {
        Self::check_size(font)?;
        Ok(match self.resolve(font) {
            FontData::Standard(std_font) => {
                let m = std_font.metrics();
                FontMetrics {
                    ascent: m.ascent(font.size),
                    descent: m.descent(font.size),
                    leading: 0.0,
                }
            }
            FontData::Custom(m) => m.font_metrics(font.size),
        })
    }

    fn measure_char(&self, ch: char, font: &Font) -> Result<f64, MetricsError> {
        Self::check_size(font)?;
        Ok(self.char_width(ch, font))
    }

    fn system_font(&self) -> Font {
        self.system_font.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_context_helvetica() {
        let ctx = FontContext::new();
        let w = ctx.char_width(' ', &Font::new("Helvetica", 12.0));
        assert!((w - 3.336).abs() < 0.001);
    }

    #[test]
    fn test_font_context_measure_string() {
        let ctx = FontContext::new();
        let extent = ctx.measure("Hello", &Font::new("Courier", 10.0)).unwrap();
        assert_eq!(extent.width, 30.0);
        assert!((extent.height - 7.86).abs() < 1e-9);
        assert!((extent.baseline - 6.29).abs() < 1e-9);
    }

    #[test]
    fn test_font_context_fallback() {
        let ctx = FontContext::new();
        let w1 = ctx.char_width('A', &Font::new("Helvetica", 12.0));
        let w2 = ctx.char_width('A', &Font::new("UnknownFont", 12.0));
        assert!((w1 - w2).abs() < 0.001);
    }

    #[test]
    fn test_font_context_weight_resolution() {
        let ctx = FontContext::new();
        let mut semibold = Font::new("Courier", 10.0);
        semibold.weight = 650;
        assert!(matches!(
            ctx.resolve(&semibold),
            FontData::Standard(StandardFont::Courier)
        ));
    }

    #[test]
    fn test_measure_char_matches_measure() {
        let ctx = FontContext::new();
        let font = Font::new("Helvetica", 14.0);
        let by_char = ctx.measure_char('W', &font).unwrap();
        let by_string = ctx.measure("W", &font).unwrap().width;
        assert_eq!(by_char, by_string);
    }

    #[test]
    fn test_zero_size_font_is_metrics_error() {
        let ctx = FontContext::new();
        assert!(ctx.measure("x", &Font::new("Helvetica", 0.0)).is_err());
        assert!(ctx.measure_char('x', &Font::new("Helvetica", f64::NAN)).is_err());
    }

    #[test]
    fn test_register_rejects_garbage() {
        let mut ctx = FontContext::new();
        let result = ctx
            .registry_mut()
            .register("Broken", 400, false, b"not a font");
        assert!(matches!(result, Err(LayoutError::FontLoad(_))));
    }

    #[test]
    fn test_system_font_override() {
        let ctx = FontContext::new().with_system_font(Font::new("Courier", 9.0));
        assert_eq!(ctx.system_font(), Font::new("Courier", 9.0));
    }
}

//! # Layout Documents
//!
//! A JSON description of one paragraph and its layout settings, and the
//! report produced by laying it out. This is what the CLI reads and writes,
//! and what [`crate::layout_json`] accepts.
//!
//! ```json
//! {
//!   "text": "Hello World",
//!   "font": { "family": "Courier", "size": 10 },
//!   "width": 40,
//!   "styles": [{ "start": 6, "end": 10, "style": { "rise": 2 } }]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::font::{FontContext, MetricsProvider};
use crate::layout::{Rect, TextLayout};
use crate::style::{Alignment, Font, Orientation, TextStyle};

/// A paragraph plus everything needed to lay it out.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutDocument {
    pub text: String,
    /// Layout font. Falls back to the provider's system font.
    pub font: Option<Font>,
    /// Wrap width. Absent means a single unwrapped line per paragraph.
    pub width: Option<f64>,
    pub spacing: f64,
    pub alignment: Alignment,
    pub orientation: Orientation,
    pub tabs: Vec<f64>,
    pub indent: f64,
    pub wrap_indent: f64,
    pub ascent: Option<f64>,
    pub descent: Option<f64>,
    /// Style overrides, applied in order.
    pub styles: Vec<StyleRange>,
    /// Fonts to register before layout.
    pub fonts: Vec<FontSource>,
}

/// A style applied to the inclusive range `start..=end`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleRange {
    pub start: usize,
    pub end: usize,
    #[serde(default)]
    pub style: Option<TextStyle>,
}

/// A custom font to register with the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontSource {
    /// Font family name (e.g. "Inter", "Roboto").
    pub family: String,
    /// Base64-encoded font data, a data URI (e.g. "data:font/ttf;base64,..."),
    /// or a file path starting with `/`, `./` or `../`.
    pub src: String,
    /// Font weight (100-900). Defaults to 400.
    #[serde(default = "default_weight")]
    pub weight: u32,
    /// Whether this is an italic variant.
    #[serde(default)]
    pub italic: bool,
}

fn default_weight() -> u32 {
    400
}

impl FontSource {
    /// Resolve `src` to raw font bytes.
    pub fn read_bytes(&self) -> Result<Vec<u8>, LayoutError> {
        let src = self.src.as_str();
        if src.starts_with("data:") {
            let comma = src.find(',').ok_or_else(|| {
                LayoutError::FontLoad(format!(
                    "invalid data URI for '{}': missing comma",
                    self.family
                ))
            })?;
            return self.decode(&src[comma + 1..]);
        }
        if src.starts_with('/') || src.starts_with("./") || src.starts_with("../") {
            return std::fs::read(src).map_err(|e| {
                LayoutError::FontLoad(format!("failed to read font file '{}': {}", src, e))
            });
        }
        self.decode(src)
    }

    fn decode(&self, data: &str) -> Result<Vec<u8>, LayoutError> {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD
            .decode(data.trim())
            .map_err(|e| {
                LayoutError::FontLoad(format!("base64 decode error for '{}': {}", self.family, e))
            })
    }
}

impl LayoutDocument {
    /// A [`FontContext`] with the document's fonts registered.
    pub fn font_context(&self) -> Result<FontContext, LayoutError> {
        let mut context = FontContext::new();
        for source in &self.fonts {
            let data = source.read_bytes()?;
            context
                .registry_mut()
                .register(&source.family, source.weight, source.italic, &data)?;
        }
        Ok(context)
    }

    /// Configure a [`TextLayout`] measured by `metrics`.
    pub fn build(&self, metrics: Box<dyn MetricsProvider>) -> Result<TextLayout, LayoutError> {
        let mut layout = TextLayout::new(metrics);
        layout.set_font(self.font.clone())?;
        layout.set_text(&self.text)?;
        layout.set_width(self.width)?;
        layout.set_spacing(self.spacing)?;
        layout.set_alignment(self.alignment)?;
        layout.set_orientation(self.orientation)?;
        layout.set_tabs(&self.tabs)?;
        layout.set_indent(self.indent)?;
        layout.set_wrap_indent(self.wrap_indent)?;
        layout.set_ascent(self.ascent)?;
        layout.set_descent(self.descent)?;
        for range in &self.styles {
            layout.set_style(range.style.clone(), range.start, range.end)?;
        }
        Ok(layout)
    }
}

/// Lines and bounds of a laid out document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutReport {
    pub bounds: Rect,
    pub line_count: usize,
    pub lines: Vec<LineReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineReport {
    pub index: usize,
    pub start: usize,
    /// Start of the next line; includes a consumed line break.
    pub end: usize,
    /// The line's characters without its line break.
    pub text: String,
    pub bounds: Rect,
    pub ascent: f64,
    pub descent: f64,
}

impl LayoutReport {
    pub fn from_layout(layout: &TextLayout) -> Result<Self, LayoutError> {
        let table = layout.line_table()?;
        let text: Vec<char> = layout.text()?.chars().collect();
        let mut lines = Vec::with_capacity(table.line_count());
        for index in 0..table.line_count() {
            let (start, end) = layout.line_offsets(index)?;
            let metrics = layout.line_metrics(index)?;
            lines.push(LineReport {
                index,
                start,
                end,
                text: text[start..table.content_end(index)].iter().collect(),
                bounds: layout.line_bounds(index)?,
                ascent: metrics.ascent,
                descent: metrics.descent,
            });
        }
        Ok(Self {
            bounds: layout.bounds()?,
            line_count: lines.len(),
            lines,
        })
    }
}

//! # Textflow
//!
//! A deterministic text layout engine.
//!
//! Given a paragraph of text, per-range styles, tab stops and a wrap width,
//! textflow splits the text into measured runs, wraps the runs into lines,
//! and answers geometry questions about the result: where the caret for an
//! offset goes, which character lies under a point, how far a word movement
//! goes, and how big each line is.
//!
//! Measurement is not built in. Every width comes from a
//! [`MetricsProvider`](font::MetricsProvider); the bundled
//! [`FontContext`](font::FontContext) knows Helvetica and Courier and any
//! TrueType/OpenType font you register.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON/API)
//!       ↓
//!   [model]    — Layout document: text, styles, settings, fonts
//!       ↓
//!   [style]    — Fonts, text styles, the style table
//!       ↓
//!   [text]     — Itemize, merge with styles, measure, break lines
//!       ↓
//!   [layout]   — TextLayout: cached line table, geometry queries
//! ```

pub mod error;
pub mod font;
pub mod layout;
pub mod model;
pub mod style;
pub mod text;

pub use error::{LayoutError, MetricsError};
pub use layout::TextLayout;

use font::FontContext;
use model::{LayoutDocument, LayoutReport};

/// Lay out a document and report its lines.
///
/// Fonts listed in the document are registered with a fresh
/// [`FontContext`] first.
pub fn layout(document: &LayoutDocument) -> Result<LayoutReport, LayoutError> {
    let context = document.font_context()?;
    layout_with(document, context)
}

/// Lay out a document measured by an existing font context.
pub fn layout_with(
    document: &LayoutDocument,
    context: FontContext,
) -> Result<LayoutReport, LayoutError> {
    let text_layout = document.build(Box::new(context))?;
    LayoutReport::from_layout(&text_layout)
}

/// Lay out a document described as JSON.
pub fn layout_json(json: &str) -> Result<LayoutReport, LayoutError> {
    let document: LayoutDocument = serde_json::from_str(json)?;
    layout(&document)
}

//! # Text Layout
//!
//! [`TextLayout`] owns a paragraph of text and everything that shapes it:
//! the style table, tab stops, wrap width, spacing, alignment and fonts.
//!
//! Layout is lazy. Setters only record their value and drop the cached
//! [`LineTable`]; the next query rebuilds it:
//!
//! ```text
//! text ─▶ itemize ─▶ merge(styles) ─▶ shape ─▶ break lines ─▶ LineTable
//! ```
//!
//! A setter that receives a value equal to the current one leaves the cache
//! alone, so callers can push unchanged state on every frame without paying
//! for a relayout.
//!
//! After [`TextLayout::dispose`] the layout holds no state at all and every
//! call except [`TextLayout::is_disposed`] fails with
//! [`LayoutError::Disposed`].

pub mod cache;
pub mod geometry;

pub use cache::{LayoutCache, Line, LineTable};
pub use geometry::{HitOffset, Point, Rect};

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::error::LayoutError;
use crate::font::{FontContext, MetricsProvider};
use crate::style::{Alignment, Font, Orientation, StyleTable, TextStyle};
use crate::text::{Shaper, UnicodeClassifier, WhitespaceClassifier};

/// Everything a live layout owns. Dropped as a whole by `dispose()`.
pub(crate) struct LayoutState {
    pub(crate) metrics: Box<dyn MetricsProvider>,
    pub(crate) classifier: Box<dyn WhitespaceClassifier>,
    pub(crate) text: Vec<char>,
    pub(crate) styles: StyleTable,
    pub(crate) font: Option<Font>,
    pub(crate) tabs: Vec<f64>,
    /// `None` lays every paragraph out on a single line.
    pub(crate) wrap_width: Option<f64>,
    pub(crate) spacing: f64,
    pub(crate) alignment: Alignment,
    pub(crate) orientation: Orientation,
    pub(crate) indent: f64,
    pub(crate) wrap_indent: f64,
    pub(crate) ascent: Option<f64>,
    pub(crate) descent: Option<f64>,
    cache: RefCell<LayoutCache>,
}

impl LayoutState {
    fn invalidate(&mut self) {
        *self.cache.get_mut() = LayoutCache::Invalid;
    }

    fn line_table(&self) -> Result<Rc<LineTable>, LayoutError> {
        if let LayoutCache::Valid(table) = &*self.cache.borrow() {
            return Ok(Rc::clone(table));
        }
        let table = Rc::new(cache::compute(self)?);
        *self.cache.borrow_mut() = LayoutCache::Valid(Rc::clone(&table));
        Ok(table)
    }

    /// Horizontal offset of a line: its indent plus the alignment shift.
    pub(crate) fn line_indent(&self, table: &LineTable, index: usize) -> f64 {
        let mut indent = if index == 0 || table.ends_with_hard_break(index - 1) {
            self.indent
        } else {
            self.wrap_indent
        };
        if let Some(wrap) = self.wrap_width {
            let width = table.line(index).width + indent;
            match self.alignment {
                Alignment::Left => {}
                Alignment::Center => indent += (wrap - width) / 2.0,
                Alignment::Right => indent += wrap - width,
            }
        }
        indent
    }

    pub(crate) fn shaper(&self) -> Shaper<'_> {
        Shaper::new(
            &self.text,
            self.font.as_ref(),
            self.metrics.as_ref(),
            &self.tabs,
        )
    }

    pub(crate) fn check_offset(&self, offset: usize) -> Result<(), LayoutError> {
        if offset > self.text.len() {
            return Err(LayoutError::InvalidRange(format!(
                "offset {} outside 0..={}",
                offset,
                self.text.len()
            )));
        }
        Ok(())
    }
}

/// A paragraph of styled text and its wrapped lines.
pub struct TextLayout {
    state: Option<LayoutState>,
}

impl Default for TextLayout {
    fn default() -> Self {
        Self::new(Box::new(FontContext::new()))
    }
}

fn check_length(name: &str, value: f64) -> Result<(), LayoutError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(LayoutError::InvalidArgument(format!(
            "{} must be a finite value >= 0, got {}",
            name, value
        )))
    }
}

impl TextLayout {
    /// An empty layout measured by `metrics`, using the Unicode whitespace
    /// classifier.
    pub fn new(metrics: Box<dyn MetricsProvider>) -> Self {
        Self::with_classifier(metrics, Box::new(UnicodeClassifier))
    }

    pub fn with_classifier(
        metrics: Box<dyn MetricsProvider>,
        classifier: Box<dyn WhitespaceClassifier>,
    ) -> Self {
        Self {
            state: Some(LayoutState {
                metrics,
                classifier,
                text: Vec::new(),
                styles: StyleTable::new(0),
                font: None,
                tabs: Vec::new(),
                wrap_width: None,
                spacing: 0.0,
                alignment: Alignment::Left,
                orientation: Orientation::LeftToRight,
                indent: 0.0,
                wrap_indent: 0.0,
                ascent: None,
                descent: None,
                cache: RefCell::new(LayoutCache::Invalid),
            }),
        }
    }

    pub(crate) fn state(&self) -> Result<&LayoutState, LayoutError> {
        self.state.as_ref().ok_or(LayoutError::Disposed)
    }

    fn state_mut(&mut self) -> Result<&mut LayoutState, LayoutError> {
        self.state.as_mut().ok_or(LayoutError::Disposed)
    }

    /// The current line table, rebuilt if a setter invalidated it.
    pub fn line_table(&self) -> Result<Rc<LineTable>, LayoutError> {
        self.state()?.line_table()
    }

    /// Whether the cached line table is current.
    pub fn is_laid_out(&self) -> Result<bool, LayoutError> {
        Ok(self.state()?.cache.borrow().is_valid())
    }

    // ── Lifecycle ───────────────────────────────────────────────────

    /// Release all state. Every later call fails with
    /// [`LayoutError::Disposed`].
    pub fn dispose(&mut self) {
        if self.state.take().is_some() {
            tracing::debug!("text layout disposed");
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.state.is_none()
    }

    // ── Setters ─────────────────────────────────────────────────────

    /// Replace the text. Styles are reset.
    pub fn set_text(&mut self, text: &str) -> Result<(), LayoutError> {
        let state = self.state_mut()?;
        let chars: Vec<char> = text.chars().collect();
        if chars == state.text {
            return Ok(());
        }
        state.styles = StyleTable::new(chars.len());
        state.text = chars;
        state.invalidate();
        Ok(())
    }

    /// Apply `style` to the inclusive character range `start..=end`.
    /// `None` clears any style there.
    pub fn set_style(
        &mut self,
        style: Option<TextStyle>,
        start: usize,
        end: usize,
    ) -> Result<(), LayoutError> {
        let state = self.state_mut()?;
        if let Some(style) = &style {
            if style.metrics.is_some_and(|m| !m.is_valid()) {
                return Err(LayoutError::InvalidArgument(
                    "glyph metrics must be finite values >= 0".to_string(),
                ));
            }
            if !style.rise.is_finite() {
                return Err(LayoutError::InvalidArgument(format!(
                    "rise must be finite, got {}",
                    style.rise
                )));
            }
        }
        if state.styles.apply(style, start, end)? {
            state.invalidate();
        }
        Ok(())
    }

    /// Replace the tab stops. Stops are positions in points from the line
    /// start.
    pub fn set_tabs(&mut self, tabs: &[f64]) -> Result<(), LayoutError> {
        let state = self.state_mut()?;
        for &stop in tabs {
            check_length("tab stop", stop)?;
        }
        if state.tabs == tabs {
            return Ok(());
        }
        state.tabs = tabs.to_vec();
        state.invalidate();
        Ok(())
    }

    /// Set the wrap width. `None` disables wrapping.
    pub fn set_width(&mut self, width: Option<f64>) -> Result<(), LayoutError> {
        let state = self.state_mut()?;
        if let Some(w) = width {
            if !w.is_finite() || w <= 0.0 {
                return Err(LayoutError::InvalidArgument(format!(
                    "wrap width must be a finite value > 0, got {}",
                    w
                )));
            }
        }
        if state.wrap_width == width {
            return Ok(());
        }
        state.wrap_width = width;
        state.invalidate();
        Ok(())
    }

    /// Extra vertical space after every line.
    pub fn set_spacing(&mut self, spacing: f64) -> Result<(), LayoutError> {
        let state = self.state_mut()?;
        check_length("spacing", spacing)?;
        if state.spacing == spacing {
            return Ok(());
        }
        state.spacing = spacing;
        state.invalidate();
        Ok(())
    }

    pub fn set_alignment(&mut self, alignment: Alignment) -> Result<(), LayoutError> {
        let state = self.state_mut()?;
        if state.alignment != alignment {
            state.alignment = alignment;
            state.invalidate();
        }
        Ok(())
    }

    pub fn set_orientation(&mut self, orientation: Orientation) -> Result<(), LayoutError> {
        let state = self.state_mut()?;
        if state.orientation != orientation {
            state.orientation = orientation;
            state.invalidate();
        }
        Ok(())
    }

    /// Set the layout font. `None` falls back to the provider's system font.
    pub fn set_font(&mut self, font: Option<Font>) -> Result<(), LayoutError> {
        let state = self.state_mut()?;
        if state.font == font {
            return Ok(());
        }
        state.font = font;
        state.invalidate();
        Ok(())
    }

    /// Indent of the first line and of every line after a hard break.
    pub fn set_indent(&mut self, indent: f64) -> Result<(), LayoutError> {
        let state = self.state_mut()?;
        check_length("indent", indent)?;
        if state.indent != indent {
            state.indent = indent;
            state.invalidate();
        }
        Ok(())
    }

    /// Indent of lines that follow a wrap.
    pub fn set_wrap_indent(&mut self, wrap_indent: f64) -> Result<(), LayoutError> {
        let state = self.state_mut()?;
        check_length("wrap indent", wrap_indent)?;
        if state.wrap_indent != wrap_indent {
            state.wrap_indent = wrap_indent;
            state.invalidate();
        }
        Ok(())
    }

    /// Minimum ascent of every line. `None` uses the fonts alone.
    pub fn set_ascent(&mut self, ascent: Option<f64>) -> Result<(), LayoutError> {
        let state = self.state_mut()?;
        if let Some(a) = ascent {
            check_length("ascent", a)?;
        }
        if state.ascent != ascent {
            state.ascent = ascent;
            state.invalidate();
        }
        Ok(())
    }

    /// Minimum descent of every line. `None` uses the fonts alone.
    pub fn set_descent(&mut self, descent: Option<f64>) -> Result<(), LayoutError> {
        let state = self.state_mut()?;
        if let Some(d) = descent {
            check_length("descent", d)?;
        }
        if state.descent != descent {
            state.descent = descent;
            state.invalidate();
        }
        Ok(())
    }

    // ── Getters ─────────────────────────────────────────────────────

    pub fn text(&self) -> Result<String, LayoutError> {
        Ok(self.state()?.text.iter().collect())
    }

    /// Text length in characters.
    pub fn len(&self) -> Result<usize, LayoutError> {
        Ok(self.state()?.text.len())
    }

    pub fn is_empty(&self) -> Result<bool, LayoutError> {
        Ok(self.state()?.text.is_empty())
    }

    pub fn font(&self) -> Result<Option<&Font>, LayoutError> {
        Ok(self.state()?.font.as_ref())
    }

    pub fn width(&self) -> Result<Option<f64>, LayoutError> {
        Ok(self.state()?.wrap_width)
    }

    pub fn spacing(&self) -> Result<f64, LayoutError> {
        Ok(self.state()?.spacing)
    }

    pub fn alignment(&self) -> Result<Alignment, LayoutError> {
        Ok(self.state()?.alignment)
    }

    pub fn orientation(&self) -> Result<Orientation, LayoutError> {
        Ok(self.state()?.orientation)
    }

    pub fn tabs(&self) -> Result<&[f64], LayoutError> {
        Ok(&self.state()?.tabs)
    }

    pub fn indent(&self) -> Result<f64, LayoutError> {
        Ok(self.state()?.indent)
    }

    pub fn wrap_indent(&self) -> Result<f64, LayoutError> {
        Ok(self.state()?.wrap_indent)
    }

    pub fn ascent(&self) -> Result<Option<f64>, LayoutError> {
        Ok(self.state()?.ascent)
    }

    pub fn descent(&self) -> Result<Option<f64>, LayoutError> {
        Ok(self.state()?.descent)
    }

    /// Style of the character at `offset`. `offset == len` is allowed and
    /// has no style.
    pub fn style_at(&self, offset: usize) -> Result<Option<&TextStyle>, LayoutError> {
        let state = self.state()?;
        state.check_offset(offset)?;
        Ok(state.styles.style_at(offset))
    }

    /// Styles of every styled range, matching [`ranges`](Self::ranges).
    pub fn styles(&self) -> Result<Vec<&TextStyle>, LayoutError> {
        Ok(self.state()?.styles.styles())
    }

    /// Inclusive `(start, end)` of every styled range.
    pub fn ranges(&self) -> Result<Vec<(usize, usize)>, LayoutError> {
        Ok(self.state()?.styles.ranges())
    }
}

impl fmt::Display for TextLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            None => write!(f, "TextLayout {{*DISPOSED*}}"),
            Some(state) => {
                let text: String = state.text.iter().collect();
                write!(f, "TextLayout {{{:?}}}", text)
            }
        }
    }
}

impl fmt::Debug for TextLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            None => f.write_str("TextLayout(disposed)"),
            Some(state) => f
                .debug_struct("TextLayout")
                .field("text", &state.text.iter().collect::<String>())
                .field("styles", &state.styles)
                .field("font", &state.font)
                .field("tabs", &state.tabs)
                .field("wrap_width", &state.wrap_width)
                .field("spacing", &state.spacing)
                .field("alignment", &state.alignment)
                .field("orientation", &state.orientation)
                .field("cache_valid", &state.cache.borrow().is_valid())
                .finish(),
        }
    }
}

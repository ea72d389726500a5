//! # Run Placement
//!
//! Measures runs through the [`MetricsProvider`], marks tabs and hard
//! breaks, and folds `\r\n` into a single break run.
//!
//! Measurement is the only place the engine talks to fonts. Runs whose style
//! carries [`GlyphMetrics`](crate::style::GlyphMetrics) are sized from those
//! metrics and never reach the provider.

use super::Run;
use crate::error::LayoutError;
use crate::font::MetricsProvider;
use crate::style::Font;

/// Measurement context for one layout pass.
pub struct Shaper<'a> {
    text: &'a [char],
    font: Option<&'a Font>,
    system_font: Font,
    metrics: &'a dyn MetricsProvider,
    tabs: &'a [f64],
}

impl<'a> Shaper<'a> {
    pub fn new(
        text: &'a [char],
        font: Option<&'a Font>,
        metrics: &'a dyn MetricsProvider,
        tabs: &'a [f64],
    ) -> Self {
        Self {
            text,
            font,
            system_font: metrics.system_font(),
            metrics,
            tabs,
        }
    }

    pub fn text(&self) -> &[char] {
        self.text
    }

    pub fn char_at(&self, offset: usize) -> char {
        self.text[offset]
    }

    pub fn metrics(&self) -> &dyn MetricsProvider {
        self.metrics
    }

    /// The font of the layout itself, ignoring styles.
    pub fn default_font(&self) -> &Font {
        self.font.unwrap_or(&self.system_font)
    }

    /// Style font, then layout font, then the provider's system font.
    pub fn resolve_font<'r>(&'r self, run: &'r Run) -> &'r Font {
        run.style
            .as_ref()
            .and_then(|s| s.font.as_ref())
            .unwrap_or_else(|| self.default_font())
    }

    fn substring(&self, start: usize, end: usize) -> String {
        self.text[start..end].iter().collect()
    }

    /// Mark tabs and hard breaks, merge `\r\n`, and measure every run.
    pub fn shape(&self, runs: Vec<Run>) -> Result<Vec<Run>, LayoutError> {
        let mut shaped = Vec::with_capacity(runs.len());
        let mut runs = runs.into_iter().peekable();
        while let Some(mut run) = runs.next() {
            if run.length == 1 {
                match self.text[run.start] {
                    '\t' => run.tab = true,
                    '\n' => run.line_break = true,
                    '\r' => {
                        run.line_break = true;
                        let lf_follows = runs.peek().is_some_and(|next| {
                            next.length == 1
                                && next.start == run.start + 1
                                && self.text[next.start] == '\n'
                        });
                        if lf_follows {
                            tracing::trace!(offset = run.start, "merged CRLF break");
                            run.length += 1;
                            runs.next();
                        }
                    }
                    _ => {}
                }
            }
            if run.length > 0 && !run.line_break {
                self.place(&mut run)?;
            }
            shaped.push(run);
        }
        Ok(shaped)
    }

    /// Measure a single run in place.
    pub fn place(&self, run: &mut Run) -> Result<(), LayoutError> {
        let rise = run.style.as_ref().map_or(0.0, |s| s.rise);
        if run.tab {
            run.width = self.metrics.measure_char('\t', self.resolve_font(run))?;
            run.height = 0.0;
            run.baseline = 0.0;
            return Ok(());
        }
        if let Some(gm) = run.style.as_ref().and_then(|s| s.metrics) {
            run.width = gm.width * run.length as f64;
            run.height = gm.ascent + gm.descent;
            run.baseline = gm.ascent + rise;
            return Ok(());
        }
        let extent = self
            .metrics
            .measure(&self.substring(run.start, run.end()), self.resolve_font(run))?;
        run.width = extent.width;
        run.height = extent.height;
        run.baseline = extent.baseline + rise;
        Ok(())
    }

    /// Advance of the character at `offset`, which must lie in `run`.
    pub fn char_width(&self, run: &Run, offset: usize) -> Result<f64, LayoutError> {
        if let Some(gm) = run.style.as_ref().and_then(|s| s.metrics) {
            return Ok(gm.width);
        }
        Ok(self
            .metrics
            .measure_char(self.text[offset], self.resolve_font(run))?)
    }

    /// Width of `[run.start, end)`.
    pub fn prefix_width(&self, run: &Run, end: usize) -> Result<f64, LayoutError> {
        let end = end.min(run.end());
        if end <= run.start {
            return Ok(0.0);
        }
        if let Some(gm) = run.style.as_ref().and_then(|s| s.metrics) {
            return Ok(gm.width * (end - run.start) as f64);
        }
        Ok(self
            .metrics
            .measure(&self.substring(run.start, end), self.resolve_font(run))?
            .width)
    }

    /// Width of a tab that starts at `line_width`, or `None` when no tab
    /// stops are configured.
    pub fn tab_width(&self, line_width: f64) -> Option<f64> {
        if self.tabs.is_empty() {
            None
        } else {
            Some(tab_advance(self.tabs, line_width))
        }
    }
}

/// Distance from `line_width` to the next tab stop.
///
/// Past the last stop, stops repeat at the spacing of the last two (or at the
/// single stop's own position when only one is configured). A spacing that is
/// not positive, or too small to move past `line_width` in `f64`, yields zero.
pub fn tab_advance(tabs: &[f64], line_width: f64) -> f64 {
    if let Some(&stop) = tabs.iter().find(|&&stop| stop > line_width) {
        return stop - line_width;
    }
    let Some(&last) = tabs.last() else {
        return 0.0;
    };
    let delta = match tabs.len() {
        1 => last,
        n => last - tabs[n - 2],
    };
    if delta <= 0.0 || line_width + delta <= line_width {
        return 0.0;
    }
    let steps = ((line_width - last) / delta).floor().max(0.0) + 1.0;
    let mut x = last + steps * delta;
    if x <= line_width {
        // Rounding can land one stop short.
        x += delta;
    }
    if x <= line_width {
        return 0.0;
    }
    x - line_width
}

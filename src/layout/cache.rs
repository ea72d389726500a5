//! Line table construction and the lazily rebuilt layout cache.

use super::LayoutState;
use crate::error::LayoutError;
use crate::text::{itemize, merge, LineBreaker, Run};
use std::ops::Range;
use std::rc::Rc;

/// Cached result of a layout pass.
#[derive(Debug, Clone, Default)]
pub enum LayoutCache {
    #[default]
    Invalid,
    Valid(Rc<LineTable>),
}

impl LayoutCache {
    pub fn is_valid(&self) -> bool {
        matches!(self, LayoutCache::Valid(_))
    }
}

/// One visual line.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    /// Offset of the first character on the line.
    pub start: usize,
    /// Offset one past the last character, including a consumed break.
    pub end: usize,
    pub top: f64,
    pub height: f64,
    /// Sum of the widths of the line's runs.
    pub width: f64,
    /// Indices into [`LineTable::runs`].
    pub runs: Range<usize>,
}

impl Line {
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Runs and lines produced by one layout pass.
#[derive(Debug, Clone, PartialEq)]
pub struct LineTable {
    runs: Vec<Run>,
    lines: Vec<Line>,
    spacing: f64,
}

impl LineTable {
    /// Group broken runs into lines, stacking them from `y = 0`.
    pub fn assemble(
        runs: Vec<Run>,
        ranges: Vec<Range<usize>>,
        min_height: f64,
        spacing: f64,
    ) -> Self {
        let mut lines = Vec::with_capacity(ranges.len());
        let mut top = 0.0;
        for range in ranges {
            let line_runs = &runs[range.clone()];
            let height = line_runs.iter().map(|r| r.height).fold(min_height, f64::max);
            let width = line_runs.iter().map(|r| r.width).sum();
            let start = line_runs.first().map_or(0, |r| r.start);
            let end = line_runs.last().map_or(start, |r| r.end());
            lines.push(Line {
                start,
                end,
                top,
                height,
                width,
                runs: range,
            });
            top += height + spacing;
        }
        Self {
            runs,
            lines,
            spacing,
        }
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn line(&self, index: usize) -> &Line {
        &self.lines[index]
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn line_runs(&self, line: &Line) -> &[Run] {
        &self.runs[line.runs.clone()]
    }

    /// Last run of a line, which carries its break flags.
    fn last_run(&self, line: &Line) -> Option<&Run> {
        self.line_runs(line)
            .iter()
            .rev()
            .find(|r| r.length > 0 || r.line_break)
    }

    /// The line ends at a `\r`, `\n` or `\r\n`.
    pub fn ends_with_hard_break(&self, index: usize) -> bool {
        self.last_run(&self.lines[index])
            .is_some_and(|r| r.is_hard_break())
    }

    /// The line was ended by the line breaker.
    pub fn ends_with_soft_break(&self, index: usize) -> bool {
        self.last_run(&self.lines[index])
            .is_some_and(|r| r.soft_break)
    }

    /// End of the line's visible content: the start of a trailing hard
    /// break, otherwise the line end.
    pub fn content_end(&self, index: usize) -> usize {
        let line = &self.lines[index];
        match self.last_run(line) {
            Some(run) if run.is_hard_break() => run.start,
            _ => line.end,
        }
    }

    /// Line starts followed by the end of the text.
    pub fn offsets(&self) -> Vec<usize> {
        let mut offsets: Vec<usize> = self.lines.iter().map(|l| l.start).collect();
        offsets.push(self.lines.last().map_or(0, |l| l.end));
        offsets
    }

    /// First line whose end lies past `offset`, else the last line.
    pub fn line_index(&self, offset: usize) -> usize {
        let index = self.lines.partition_point(|l| l.end <= offset);
        index.min(self.lines.len().saturating_sub(1))
    }

    /// First line whose slot (including spacing) extends below `y`, else
    /// the last line.
    pub fn line_at_y(&self, y: f64) -> usize {
        let index = self
            .lines
            .partition_point(|l| l.bottom() + self.spacing <= y);
        index.min(self.lines.len().saturating_sub(1))
    }

    /// Total height, including the spacing after every line.
    pub fn height(&self) -> f64 {
        self.lines
            .last()
            .map_or(0.0, |l| l.bottom() + self.spacing)
    }
}

/// Run the full pipeline for the current state of a layout.
pub(super) fn compute(state: &LayoutState) -> Result<LineTable, LayoutError> {
    let shaper = state.shaper();
    let runs = merge(&itemize(&state.text), &state.styles);
    let mut runs = shaper.shape(runs)?;
    let ranges = LineBreaker::new(&shaper, state.classifier.as_ref(), state.wrap_width)
        .break_lines(&mut runs)?;

    let overrides = state.ascent.unwrap_or(0.0) + state.descent.unwrap_or(0.0);
    let min_height = state
        .metrics
        .font_height(shaper.default_font())?
        .max(overrides);
    let table = LineTable::assemble(runs, ranges, min_height, state.spacing);

    tracing::debug!(
        chars = state.text.len(),
        runs = table.runs.len(),
        lines = table.line_count(),
        "rebuilt line table"
    );
    debug_assert_eq!(table.lines.first().map(|l| l.start), Some(0));
    debug_assert_eq!(table.lines.last().map(|l| l.end), Some(state.text.len()));
    Ok(table)
}

//! # Text Runs
//!
//! Segmentation of the text into runs, the units that are measured and
//! wrapped.
//!
//! ```text
//! text ──itemize──▶ items ─┐
//!                          ├─merge──▶ runs ──shape──▶ placed runs ──break──▶ lines
//! style table ─────────────┘
//! ```

pub mod classify;
pub mod line_break;
pub mod shaping;

pub use classify::{UnicodeClassifier, WhitespaceClassifier};
pub use line_break::{LineBreakState, LineBreaker};
pub use shaping::Shaper;

use crate::style::{StyleTable, TextStyle};

/// A span produced by the itemizer. Separators (`\t`, `\r`, `\n`) are always
/// items of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Item {
    pub start: usize,
    pub length: usize,
}

/// A maximal span of text sharing one style and one item.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub start: usize,
    pub length: usize,
    pub style: Option<TextStyle>,
    pub width: f64,
    pub height: f64,
    /// Distance from the top of the run to its baseline.
    pub baseline: f64,
    /// The line ends after this run.
    pub line_break: bool,
    /// The line break was chosen by the line breaker, not by a `\r`/`\n`.
    pub soft_break: bool,
    pub tab: bool,
}

impl Run {
    pub fn new(start: usize, length: usize, style: Option<TextStyle>) -> Self {
        Self {
            start,
            length,
            style,
            width: 0.0,
            height: 0.0,
            baseline: 0.0,
            line_break: false,
            soft_break: false,
            tab: false,
        }
    }

    /// Offset one past the last character of the run.
    pub fn end(&self) -> usize {
        self.start + self.length
    }

    /// A `\r`, `\n` or `\r\n` run.
    pub fn is_hard_break(&self) -> bool {
        self.line_break && !self.soft_break
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end()
    }
}

fn is_separator(ch: char) -> bool {
    matches!(ch, '\t' | '\r' | '\n')
}

/// Split `text` at tabs and line terminators.
///
/// The result always ends with a zero-length sentinel item at `text.len()`,
/// and always has at least two entries.
pub fn itemize(text: &[char]) -> Vec<Item> {
    let len = text.len();
    if len == 0 {
        return vec![Item { start: 0, length: 0 }, Item { start: 0, length: 0 }];
    }

    let mut items = Vec::new();
    let mut start = 0;
    for (i, &ch) in text.iter().enumerate() {
        if is_separator(ch) {
            if i != start {
                items.push(Item {
                    start,
                    length: i - start,
                });
            }
            items.push(Item { start: i, length: 1 });
            start = i + 1;
        }
    }
    if start < len {
        items.push(Item {
            start,
            length: len - start,
        });
    }
    items.push(Item {
        start: len,
        length: 0,
    });
    items
}

/// Intersect item boundaries with style boundaries.
///
/// Each run inherits the style active at its start. The output ends with a
/// zero-length sentinel run at the text length.
pub fn merge(items: &[Item], styles: &StyleTable) -> Vec<Run> {
    let len = styles.len();
    let spans = styles.spans();
    let mut runs = Vec::with_capacity(items.len() + spans.len());

    let (mut start, mut item_index, mut style_index) = (0, 0, 0);
    while start < len {
        let run_start = start;
        let style = spans[style_index].style.clone();
        let item_limit = items.get(item_index + 1).map_or(len, |item| item.start);
        let style_limit = spans.get(style_index + 1).map_or(len, |span| span.start);
        if style_limit <= item_limit {
            style_index += 1;
            start = style_limit;
        }
        if item_limit <= style_limit {
            item_index += 1;
            start = item_limit;
        }
        runs.push(Run::new(run_start, start - run_start, style));
    }
    runs.push(Run::new(len, 0, None));

    debug_assert_eq!(
        runs.iter().map(|r| r.length).sum::<usize>(),
        len,
        "run lengths must cover the text exactly"
    );
    runs
}

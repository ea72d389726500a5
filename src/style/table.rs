//! Style spans over the text.
//!
//! The table is an ordered, gap-free partition of `[0, len)`. The last entry
//! is a sentinel starting at `len` so that `spans[i + 1].start` is always the
//! limit of span `i`.

use super::TextStyle;
use crate::error::LayoutError;
use std::iter;

#[derive(Debug, Clone, PartialEq)]
pub struct StyleSpan {
    pub start: usize,
    pub style: Option<TextStyle>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StyleTable {
    spans: Vec<StyleSpan>,
}

impl StyleTable {
    /// An unstyled table covering `len` characters.
    pub fn new(len: usize) -> Self {
        Self {
            spans: vec![
                StyleSpan {
                    start: 0,
                    style: None,
                },
                StyleSpan {
                    start: len,
                    style: None,
                },
            ],
        }
    }

    /// Length of the text the table covers.
    pub fn len(&self) -> usize {
        self.spans[self.spans.len() - 1].start
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All spans including the closing sentinel.
    pub fn spans(&self) -> &[StyleSpan] {
        &self.spans
    }

    /// The style in effect at `offset`, which must be `< len`.
    pub fn style_at(&self, offset: usize) -> Option<&TextStyle> {
        let idx = self.spans.partition_point(|s| s.start <= offset);
        self.spans[idx.saturating_sub(1)].style.as_ref()
    }

    /// Apply `style` to the inclusive range `[start, end]`.
    ///
    /// Spans are split at both ends, the covered spans are replaced, and
    /// neighbours with equal styles are merged. Returns `false` when the
    /// resulting table is identical to the current one.
    pub fn apply(
        &mut self,
        style: Option<TextStyle>,
        start: usize,
        end: usize,
    ) -> Result<bool, LayoutError> {
        let len = self.len();
        if start > end {
            return Err(LayoutError::InvalidArgument(format!(
                "style range start {} is after end {}",
                start, end
            )));
        }
        if end >= len {
            return Err(LayoutError::InvalidArgument(format!(
                "style range {}..={} exceeds text length {}",
                start, end, len
            )));
        }

        let mut spans = self.spans.clone();
        let lo = split_at(&mut spans, start);
        let hi = split_at(&mut spans, end + 1);
        spans.splice(lo..hi, iter::once(StyleSpan { start, style }));

        // The sentinel never merges with the span before it.
        if let Some(sentinel) = spans.pop() {
            spans.dedup_by(|later, earlier| later.style == earlier.style);
            spans.push(sentinel);
        }

        if spans == self.spans {
            return Ok(false);
        }
        self.spans = spans;
        Ok(true)
    }

    /// Inclusive `(start, end)` ranges of every styled span.
    pub fn ranges(&self) -> Vec<(usize, usize)> {
        self.spans
            .windows(2)
            .filter(|w| w[0].style.is_some())
            .map(|w| (w[0].start, w[1].start - 1))
            .collect()
    }

    /// The styles of every styled span, in text order.
    pub fn styles(&self) -> Vec<&TextStyle> {
        self.spans[..self.spans.len() - 1]
            .iter()
            .filter_map(|s| s.style.as_ref())
            .collect()
    }
}

/// Make sure a span starts exactly at `offset` and return its index.
fn split_at(spans: &mut Vec<StyleSpan>, offset: usize) -> usize {
    let idx = spans.partition_point(|s| s.start <= offset) - 1;
    if spans[idx].start == offset {
        return idx;
    }
    let style = spans[idx].style.clone();
    spans.insert(idx + 1, StyleSpan { start: offset, style });
    idx + 1
}

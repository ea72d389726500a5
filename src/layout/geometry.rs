//! # Geometry Mapping
//!
//! Conversions between character offsets and positions, line queries, and
//! caret movement. Every query works on the cached [`LineTable`] and
//! rebuilds it first if needed.
//!
//! Positions are relative to the top-left corner of the layout. `x` includes
//! the line's indent and alignment shift; `y` is the top of the line.

use serde::{Deserialize, Serialize};

use super::{LayoutState, LineTable, TextLayout};
use crate::error::LayoutError;
use crate::font::FontMetrics;
use crate::style::Movement;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Edges are inclusive.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitOffset {
    pub offset: usize,
    /// 1 when the point is nearer the trailing edge of the character at
    /// `offset`, else 0.
    pub trailing: usize,
}

impl HitOffset {
    /// The caret position the hit resolves to.
    pub fn caret(&self) -> usize {
        self.offset + self.trailing
    }
}

impl LayoutState {
    fn check_line(&self, table: &LineTable, index: usize) -> Result<(), LayoutError> {
        if index >= table.line_count() {
            return Err(LayoutError::InvalidRange(format!(
                "line {} outside 0..{}",
                index,
                table.line_count()
            )));
        }
        Ok(())
    }

    fn location(
        &self,
        table: &LineTable,
        offset: usize,
        trailing: bool,
    ) -> Result<Point, LayoutError> {
        let index = table.line_index(offset);
        let line = table.line(index);
        let mut x = 0.0;
        if offset == self.text.len() {
            x = line.width;
        } else {
            for run in table.line_runs(line) {
                if !run.contains(offset) {
                    x += run.width;
                    continue;
                }
                if run.tab {
                    if trailing {
                        x += run.width;
                    }
                } else if !run.is_hard_break() {
                    let end = if trailing { offset + 1 } else { offset };
                    x += self.shaper().prefix_width(run, end)?;
                }
                break;
            }
        }
        Ok(Point::new(x + self.line_indent(table, index), line.top))
    }
}

impl TextLayout {
    /// Size of the whole layout. The width is the wrap width when one is
    /// set, otherwise the widest line including its indent.
    pub fn bounds(&self) -> Result<Rect, LayoutError> {
        let state = self.state()?;
        let table = state.line_table()?;
        let width = match state.wrap_width {
            Some(wrap) => wrap,
            None => (0..table.line_count())
                .map(|i| table.line(i).width + state.line_indent(&table, i))
                .fold(0.0, f64::max),
        };
        Ok(Rect::new(0.0, 0.0, width, table.height()))
    }

    /// Bounds of the inclusive character range `start..=end`.
    ///
    /// A range on one line is measured exactly. A range spanning lines
    /// covers the full height of those lines and the width of the widest.
    pub fn range_bounds(&self, start: usize, end: usize) -> Result<Rect, LayoutError> {
        let state = self.state()?;
        state.check_offset(start)?;
        state.check_offset(end)?;
        let len = state.text.len();
        if len == 0 || start > end {
            return Ok(Rect::default());
        }
        let (start, end) = (start.min(len - 1), end.min(len - 1));
        let table = state.line_table()?;
        let first = table.line_index(start);
        let last = table.line_index(end);
        let top = table.line(first).top;
        let height = table.line(last).bottom() - top;
        if first == last {
            let x = state.location(&table, start, false)?.x;
            let right = state.location(&table, end, true)?.x;
            return Ok(Rect::new(x, top, right - x, height));
        }
        let width = (first..=last)
            .map(|i| table.line(i).width)
            .fold(0.0, f64::max);
        Ok(Rect::new(0.0, top, width, height))
    }

    pub fn line_count(&self) -> Result<usize, LayoutError> {
        Ok(self.line_table()?.line_count())
    }

    /// Index of the line holding `offset`.
    pub fn line_index(&self, offset: usize) -> Result<usize, LayoutError> {
        let state = self.state()?;
        state.check_offset(offset)?;
        Ok(state.line_table()?.line_index(offset))
    }

    /// `(start, end)` offsets of a line. `end` is the start of the next line
    /// and so includes a consumed line break.
    pub fn line_offsets(&self, line: usize) -> Result<(usize, usize), LayoutError> {
        let state = self.state()?;
        let table = state.line_table()?;
        state.check_line(&table, line)?;
        let l = table.line(line);
        Ok((l.start, l.end))
    }

    /// Start offset of every line followed by the text length.
    pub fn line_offset_table(&self) -> Result<Vec<usize>, LayoutError> {
        Ok(self.line_table()?.offsets())
    }

    pub fn line_bounds(&self, line: usize) -> Result<Rect, LayoutError> {
        let state = self.state()?;
        let table = state.line_table()?;
        state.check_line(&table, line)?;
        let l = table.line(line);
        Ok(Rect::new(
            state.line_indent(&table, line),
            l.top,
            l.width,
            l.height,
        ))
    }

    /// Ascent and descent of a line: the layout font and the ascent/descent
    /// overrides, raised by any styled run on the line.
    pub fn line_metrics(&self, line: usize) -> Result<FontMetrics, LayoutError> {
        let state = self.state()?;
        let table = state.line_table()?;
        state.check_line(&table, line)?;

        let default_font = state
            .font
            .clone()
            .unwrap_or_else(|| state.metrics.system_font());
        let base = state.metrics.font_metrics(&default_font)?;
        let mut ascent = base.ascent.max(state.ascent.unwrap_or(0.0));
        let mut descent = base.descent.max(state.descent.unwrap_or(0.0));

        for run in table.line_runs(table.line(line)) {
            let Some(style) = &run.style else { continue };
            let (run_ascent, run_descent) = if let Some(gm) = style.metrics {
                (gm.ascent, gm.descent)
            } else if let Some(font) = &style.font {
                let m = state.metrics.font_metrics(font)?;
                (m.ascent, m.descent)
            } else {
                (0.0, 0.0)
            };
            ascent = ascent.max(run_ascent + style.rise);
            descent = descent.max(run_descent - style.rise);
        }

        Ok(FontMetrics {
            ascent,
            descent,
            leading: 0.0,
        })
    }

    /// Caret position of `offset`: its leading edge, or its trailing edge
    /// when `trailing` is set.
    pub fn location(&self, offset: usize, trailing: bool) -> Result<Point, LayoutError> {
        let state = self.state()?;
        state.check_offset(offset)?;
        let table = state.line_table()?;
        state.location(&table, offset, trailing)
    }

    /// Character under `(x, y)`.
    ///
    /// Points above or below the layout hit the first or last line. Points
    /// left of a line hit its first character; points right of it hit its
    /// last.
    pub fn offset_at(&self, x: f64, y: f64) -> Result<HitOffset, LayoutError> {
        let state = self.state()?;
        let table = state.line_table()?;
        let index = table.line_at_y(y);
        let line = table.line(index);

        let mut x = x - state.line_indent(&table, index);
        if x >= line.width {
            x = line.width - 1.0;
        }
        if x < 0.0 {
            x = 0.0;
        }

        let shaper = state.shaper();
        let mut width = 0.0;
        for run in table.line_runs(line) {
            if run.is_hard_break() {
                return Ok(HitOffset {
                    offset: run.start,
                    trailing: 0,
                });
            }
            if width + run.width <= x {
                width += run.width;
                continue;
            }
            if let Some(gm) = run.style.as_ref().and_then(|s| s.metrics) {
                if gm.width > 0.0 {
                    let x_run = x - width;
                    let glyph = ((x_run / gm.width).floor() as usize).min(run.length - 1);
                    let trailing = usize::from(x_run % gm.width >= gm.width / 2.0);
                    return Ok(HitOffset {
                        offset: run.start + glyph,
                        trailing,
                    });
                }
            }
            if run.tab {
                return Ok(HitOffset {
                    offset: run.start,
                    trailing: usize::from(x >= width + run.width / 2.0),
                });
            }
            for offset in run.start..run.end() {
                let char_width = shaper.char_width(run, offset)?;
                if width + char_width > x {
                    return Ok(HitOffset {
                        offset,
                        trailing: usize::from(x >= width + char_width / 2.0),
                    });
                }
                width += char_width;
            }
            return Ok(HitOffset {
                offset: run.end(),
                trailing: 0,
            });
        }
        Ok(HitOffset {
            offset: line.end,
            trailing: 0,
        })
    }

    /// The caret position after `offset`.
    ///
    /// Word movement stops at the start of the next word and never leaves
    /// the line holding `offset`.
    pub fn next_offset(&self, offset: usize, movement: Movement) -> Result<usize, LayoutError> {
        let state = self.state()?;
        state.check_offset(offset)?;
        let len = state.text.len();
        if offset == len {
            return Ok(len);
        }
        if movement != Movement::Word {
            return Ok(offset + 1);
        }

        let table = state.line_table()?;
        let index = table.line_index(offset);
        let line_end = if index + 1 == table.line_count() {
            len
        } else {
            table.content_end(index)
        };

        let is_space = |o: usize| state.classifier.is_break_space(state.text[o]);
        let mut previous_space = is_space(offset);
        let mut offset = offset + 1;
        while offset < line_end {
            let space = is_space(offset);
            if previous_space && !space {
                break;
            }
            previous_space = space;
            offset += 1;
        }
        Ok(offset)
    }

    /// The caret position before `offset`.
    ///
    /// Word movement stops at the start of the current or previous word and
    /// never leaves the line holding `offset`.
    pub fn previous_offset(&self, offset: usize, movement: Movement) -> Result<usize, LayoutError> {
        let state = self.state()?;
        state.check_offset(offset)?;
        if offset == 0 {
            return Ok(0);
        }
        if movement != Movement::Word {
            return Ok(offset - 1);
        }

        let table = state.line_table()?;
        let line_start = table.line(table.line_index(offset)).start;

        let is_space = |o: usize| state.classifier.is_break_space(state.text[o]);
        let mut offset = offset - 1;
        let mut previous_space = is_space(offset);
        while line_start < offset {
            let space = is_space(offset - 1);
            if space && !previous_space {
                break;
            }
            previous_space = space;
            offset -= 1;
        }
        Ok(offset)
    }

    /// Bidi embedding level of the character at `offset`. Text is never
    /// reordered, so this is always 0.
    pub fn level(&self, offset: usize) -> Result<u8, LayoutError> {
        self.state()?.check_offset(offset)?;
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{Alignment, Font, GlyphMetrics, TextStyle};

    /// Courier 10pt: every character is 6 wide.
    fn courier(text: &str) -> TextLayout {
        let mut layout = TextLayout::default();
        layout.set_font(Some(Font::new("Courier", 10.0))).unwrap();
        layout.set_text(text).unwrap();
        layout
    }

    #[test]
    fn test_location_within_line() {
        let layout = courier("Hello World");
        assert_eq!(layout.location(0, false).unwrap(), Point::new(0.0, 0.0));
        assert_eq!(layout.location(3, false).unwrap().x, 18.0);
        assert_eq!(layout.location(3, true).unwrap().x, 24.0);
        assert_eq!(layout.location(11, false).unwrap().x, 66.0);
    }

    #[test]
    fn test_location_on_wrapped_line() {
        let mut layout = courier("abc def");
        layout.set_width(Some(30.0)).unwrap();
        let line_height = layout.line_bounds(0).unwrap().height;
        let p = layout.location(5, false).unwrap();
        assert_eq!(p, Point::new(6.0, line_height));
    }

    #[test]
    fn test_location_out_of_range() {
        let layout = courier("abc");
        assert!(matches!(
            layout.location(4, false),
            Err(LayoutError::InvalidRange(_))
        ));
        assert!(matches!(layout.level(4), Err(LayoutError::InvalidRange(_))));
        assert_eq!(layout.level(3).unwrap(), 0);
    }

    #[test]
    fn test_tab_location_counts_width_only_when_trailing() {
        let mut layout = courier("a\tb");
        layout.set_tabs(&[40.0]).unwrap();
        assert_eq!(layout.location(1, false).unwrap().x, 6.0);
        assert_eq!(layout.location(1, true).unwrap().x, 40.0);
        assert_eq!(layout.location(2, false).unwrap().x, 40.0);
    }

    #[test]
    fn test_offset_at_midpoint_rule() {
        let layout = courier("Hello");
        assert_eq!(
            layout.offset_at(7.0, 1.0).unwrap(),
            HitOffset { offset: 1, trailing: 0 }
        );
        assert_eq!(
            layout.offset_at(10.0, 1.0).unwrap(),
            HitOffset { offset: 1, trailing: 1 }
        );
    }

    #[test]
    fn test_offset_at_clamps_to_line() {
        let layout = courier("Hello");
        assert_eq!(layout.offset_at(-50.0, 1.0).unwrap().offset, 0);
        let right = layout.offset_at(500.0, 1.0).unwrap();
        assert_eq!(right, HitOffset { offset: 4, trailing: 1 });
        assert_eq!(right.caret(), 5);
    }

    #[test]
    fn test_offset_at_hard_break_returns_break_start() {
        let layout = courier("ab\ncd");
        // Line 0 is 12 wide; x is clamped to 11, inside 'b'.
        assert_eq!(layout.offset_at(11.0, 1.0).unwrap().offset, 1);
        let below = layout.line_bounds(1).unwrap().y + 1.0;
        assert_eq!(layout.offset_at(8.0, below).unwrap().offset, 4);
    }

    #[test]
    fn test_offset_at_empty_line_after_break() {
        let layout = courier("ab\n");
        let y = layout.line_bounds(1).unwrap().y + 1.0;
        assert_eq!(
            layout.offset_at(30.0, y).unwrap(),
            HitOffset { offset: 3, trailing: 0 }
        );
    }

    #[test]
    fn test_offset_at_glyph_metrics() {
        let mut layout = courier("abcd");
        layout
            .set_style(
                Some(TextStyle::with_metrics(GlyphMetrics::new(8.0, 2.0, 20.0))),
                1,
                2,
            )
            .unwrap();
        // 'a' is 6 wide, then two 20-wide glyphs.
        assert_eq!(
            layout.offset_at(12.0, 1.0).unwrap(),
            HitOffset { offset: 1, trailing: 0 }
        );
        assert_eq!(
            layout.offset_at(40.0, 1.0).unwrap(),
            HitOffset { offset: 2, trailing: 1 }
        );
    }

    #[test]
    fn test_offset_at_inverts_location() {
        let mut layout = courier("The quick brown fox");
        layout.set_width(Some(50.0)).unwrap();
        for offset in 0..19 {
            let p = layout.location(offset, false).unwrap();
            let hit = layout.offset_at(p.x + 1.0, p.y + 1.0).unwrap();
            assert_eq!(hit.offset, offset, "offset {offset}");
        }
    }

    #[test]
    fn test_bounds() {
        let mut layout = courier("Hello World");
        let single = layout.bounds().unwrap();
        assert_eq!(single.width, 66.0);
        assert_eq!(single.height, layout.line_bounds(0).unwrap().height);

        layout.set_width(Some(40.0)).unwrap();
        layout.set_spacing(2.0).unwrap();
        let wrapped = layout.bounds().unwrap();
        assert_eq!(wrapped.width, 40.0);
        let last = layout.line_bounds(layout.line_count().unwrap() - 1).unwrap();
        assert_eq!(wrapped.height, last.y + last.height + 2.0);
    }

    #[test]
    fn test_range_bounds() {
        let mut layout = courier("Hello World");
        let r = layout.range_bounds(1, 3).unwrap();
        assert_eq!((r.x, r.width), (6.0, 18.0));

        layout.set_width(Some(40.0)).unwrap();
        let r = layout.range_bounds(0, 10).unwrap();
        assert_eq!(r.x, 0.0);
        let second = layout.line_bounds(1).unwrap();
        assert_eq!(r.height, second.y + second.height);
        assert_eq!(layout.range_bounds(5, 2).unwrap(), Rect::default());
        assert!(layout.range_bounds(0, 12).is_err());
    }

    #[test]
    fn test_line_bounds_include_alignment() {
        let mut layout = courier("abc");
        layout.set_width(Some(100.0)).unwrap();
        layout.set_alignment(Alignment::Center).unwrap();
        let b = layout.line_bounds(0).unwrap();
        assert_eq!((b.x, b.width), (41.0, 18.0));
        assert_eq!(layout.location(0, false).unwrap().x, 41.0);
        assert!(matches!(
            layout.line_bounds(1),
            Err(LayoutError::InvalidRange(_))
        ));
    }

    #[test]
    fn test_wrap_indent_applies_after_soft_breaks() {
        let mut layout = courier("aaaa bbbb\ncccc");
        layout.set_width(Some(30.0)).unwrap();
        layout.set_indent(5.0).unwrap();
        layout.set_wrap_indent(2.0).unwrap();
        assert_eq!(layout.line_count().unwrap(), 3);
        assert_eq!(layout.line_bounds(0).unwrap().x, 5.0);
        assert_eq!(layout.line_bounds(1).unwrap().x, 2.0);
        assert_eq!(layout.line_bounds(2).unwrap().x, 5.0);
    }

    #[test]
    fn test_line_metrics() {
        let mut layout = courier("abcd");
        let base = layout.line_metrics(0).unwrap();
        assert!((base.ascent - 6.29).abs() < 1e-9);
        assert!((base.descent - 1.57).abs() < 1e-9);

        layout.set_ascent(Some(9.0)).unwrap();
        assert_eq!(layout.line_metrics(0).unwrap().ascent, 9.0);

        let raised = TextStyle {
            rise: 3.0,
            ..TextStyle::with_metrics(GlyphMetrics::new(8.0, 2.0, 5.0))
        };
        layout.set_style(Some(raised), 1, 1).unwrap();
        let m = layout.line_metrics(0).unwrap();
        assert_eq!(m.ascent, 11.0);
        assert!((m.descent - 1.57).abs() < 1e-9);
    }

    #[test]
    fn test_char_movement() {
        let layout = courier("ab");
        assert_eq!(layout.next_offset(0, Movement::Char).unwrap(), 1);
        assert_eq!(layout.next_offset(2, Movement::Cluster).unwrap(), 2);
        assert_eq!(layout.previous_offset(0, Movement::Char).unwrap(), 0);
        assert_eq!(layout.previous_offset(2, Movement::Cluster).unwrap(), 1);
        assert!(layout.next_offset(3, Movement::Char).is_err());
    }

    #[test]
    fn test_word_movement() {
        let layout = courier("abc  def ghi");
        assert_eq!(layout.next_offset(0, Movement::Word).unwrap(), 5);
        assert_eq!(layout.next_offset(5, Movement::Word).unwrap(), 9);
        assert_eq!(layout.next_offset(9, Movement::Word).unwrap(), 12);
        assert_eq!(layout.previous_offset(12, Movement::Word).unwrap(), 9);
        assert_eq!(layout.previous_offset(9, Movement::Word).unwrap(), 5);
        assert_eq!(layout.previous_offset(4, Movement::Word).unwrap(), 0);
    }

    #[test]
    fn test_word_movement_stays_on_line() {
        let mut layout = courier("abc def");
        layout.set_width(Some(30.0)).unwrap();
        // Line 0 is "abc ", line 1 is "def".
        assert_eq!(layout.next_offset(4, Movement::Word).unwrap(), 7);
        assert_eq!(layout.previous_offset(6, Movement::Word).unwrap(), 4);

        let layout = courier("ab\ncd");
        assert_eq!(layout.next_offset(0, Movement::Word).unwrap(), 2);
    }
}

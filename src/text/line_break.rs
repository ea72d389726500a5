//! # Line Breaking
//!
//! Greedy line filling over placed runs.
//!
//! The breaker walks the runs once, carrying a [`LineBreakState`]. When a run
//! would push the line past the wrap width it finds the last character that
//! still fits, then searches backwards (into earlier runs of the same line if
//! needed) for a space. The line ends after any breaking whitespace at that
//! point, so a no-break space moves to the next line. A run is split if the
//! break falls inside one. Without any space the break is forced inside the
//! word, and a line always keeps at least one character, so arbitrarily
//! narrow widths still terminate.
//!
//! Runs after a backtracked break are visited again, so tab widths are always
//! resolved against the line they end up on.

use super::classify::WhitespaceClassifier;
use super::shaping::Shaper;
use super::Run;
use crate::error::LayoutError;
use std::ops::Range;

/// State threaded through the fold over runs.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LineBreakState {
    /// Index of the first run of the current line.
    pub line_start: usize,
    /// Sum of the widths of the runs accepted so far on this line.
    pub running_width: f64,
}

impl LineBreakState {
    fn accept(self, width: f64) -> Self {
        Self {
            line_start: self.line_start,
            running_width: self.running_width + width,
        }
    }
}

/// Result of feeding one run to the breaker.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Step {
    /// The run stays on the current line.
    Continue(LineBreakState),
    /// The current line ends after run `last`.
    Commit { last: usize },
}

/// Where an overflowing line ends.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Break {
    /// After the whole run at this index.
    After(usize),
    /// Inside run `run`, before the character at offset `at`.
    Split { run: usize, at: usize },
}

pub struct LineBreaker<'a> {
    shaper: &'a Shaper<'a>,
    classifier: &'a dyn WhitespaceClassifier,
    wrap_width: Option<f64>,
}

impl<'a> LineBreaker<'a> {
    pub fn new(
        shaper: &'a Shaper<'a>,
        classifier: &'a dyn WhitespaceClassifier,
        wrap_width: Option<f64>,
    ) -> Self {
        Self {
            shaper,
            classifier,
            wrap_width,
        }
    }

    /// Break `runs` (ending in the sentinel) into lines.
    ///
    /// Runs may be split in place. Returns the run range of every line; the
    /// last line always holds the sentinel.
    pub fn break_lines(&self, runs: &mut Vec<Run>) -> Result<Vec<Range<usize>>, LayoutError> {
        let mut lines = Vec::new();
        let mut state = LineBreakState::default();
        let mut i = 0;
        while i + 1 < runs.len() {
            match self.step(runs, i, state)? {
                Step::Continue(next) => {
                    state = next;
                    i += 1;
                }
                Step::Commit { last } => {
                    lines.push(state.line_start..last + 1);
                    state = LineBreakState {
                        line_start: last + 1,
                        running_width: 0.0,
                    };
                    i = last + 1;
                }
            }
        }
        lines.push(state.line_start..runs.len());
        Ok(lines)
    }

    fn step(
        &self,
        runs: &mut Vec<Run>,
        i: usize,
        state: LineBreakState,
    ) -> Result<Step, LayoutError> {
        if runs[i].tab {
            if let Some(width) = self.shaper.tab_width(state.running_width) {
                runs[i].width = width;
            }
        }

        let run = &runs[i];
        if run.line_break {
            return Ok(Step::Commit { last: i });
        }
        if let Some(wrap) = self.wrap_width {
            if !run.tab && state.running_width + run.width > wrap {
                return self.overflow(runs, i, state, wrap);
            }
        }
        Ok(Step::Continue(state.accept(runs[i].width)))
    }

    fn overflow(
        &self,
        runs: &mut Vec<Run>,
        i: usize,
        state: LineBreakState,
        wrap: f64,
    ) -> Result<Step, LayoutError> {
        let probe = self.probe(&runs[i], wrap - state.running_width)?;

        let space = self.find_space(runs, i, probe, state.line_start);
        let brk = match space.and_then(|(j, space)| self.break_at_space(runs, j, space, state)) {
            Some(brk) => brk,
            None => {
                let run = &runs[i];
                if probe == run.start && i > state.line_start {
                    Break::After(i - 1)
                } else {
                    let at = probe.max(run.start + 1);
                    tracing::trace!(offset = at, "forced break inside word");
                    if at < run.end() {
                        Break::Split { run: i, at }
                    } else {
                        Break::After(i)
                    }
                }
            }
        };

        let last = match brk {
            Break::After(run) => run,
            Break::Split { run, at } => {
                self.split(runs, run, at)?;
                run
            }
        };

        // Ending the line here would leave an empty line holding only the
        // sentinel.
        if last + 2 >= runs.len() {
            return Ok(Step::Continue(state.accept(runs[i].width)));
        }
        runs[last].soft_break = true;
        runs[last].line_break = true;
        Ok(Step::Commit { last })
    }

    /// Break at the space found at `space` in run `j`. The line ends before
    /// that character, or after it and any whitespace following it. A
    /// no-break space is not whitespace, so it starts the next line.
    fn break_at_space(
        &self,
        runs: &[Run],
        j: usize,
        space: usize,
        state: LineBreakState,
    ) -> Option<Break> {
        let run = &runs[j];
        let mut at = space;
        while at < run.end() && self.classifier.is_whitespace(self.shaper.char_at(at)) {
            at += 1;
        }
        if at == run.start {
            return (j > state.line_start).then(|| Break::After(j - 1));
        }
        if at < run.end() {
            Some(Break::Split { run: j, at })
        } else {
            Some(Break::After(j))
        }
    }

    /// Offset of the first character of `run` that does not fit in
    /// `max_width`, clamped to the run's last character.
    fn probe(&self, run: &Run, max_width: f64) -> Result<usize, LayoutError> {
        let mut width = 0.0;
        for offset in run.start..run.end() {
            let char_width = self.shaper.char_width(run, offset)?;
            if width + char_width > max_width {
                return Ok(offset);
            }
            width += char_width;
        }
        Ok(run.end() - 1)
    }

    /// Nearest whitespace at or before `probe`, searching run `i` and then
    /// the earlier runs of the line. Returns `(run index, offset)`.
    fn find_space(
        &self,
        runs: &[Run],
        i: usize,
        probe: usize,
        line_start: usize,
    ) -> Option<(usize, usize)> {
        let mut j = i;
        let mut limit = probe + 1;
        loop {
            let run = &runs[j];
            let found = (run.start..limit)
                .rev()
                .find(|&offset| self.classifier.is_break_space(self.shaper.char_at(offset)));
            if let Some(offset) = found {
                return Some((j, offset));
            }
            if j == line_start {
                return None;
            }
            j -= 1;
            limit = runs[j].end();
        }
    }

    /// Split run `j` before offset `at` and re-measure both halves.
    fn split(&self, runs: &mut Vec<Run>, j: usize, at: usize) -> Result<(), LayoutError> {
        let mut right = runs[j].clone();
        right.start = at;
        right.length = runs[j].end() - at;
        runs[j].length = at - runs[j].start;
        self.shaper.place(&mut runs[j])?;
        self.shaper.place(&mut right)?;
        runs.insert(j + 1, right);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MetricsError;
    use crate::font::{FontMetrics, MetricsProvider, TextExtent};
    use crate::style::{Font, StyleTable, TextStyle};
    use crate::text::classify::UnicodeClassifier;
    use crate::text::{itemize, merge};

    /// Every character is 10 wide and 10 tall.
    struct Fixed;

    impl MetricsProvider for Fixed {
        fn measure(&self, text: &str, _font: &Font) -> Result<TextExtent, MetricsError> {
            Ok(TextExtent {
                width: 10.0 * text.chars().count() as f64,
                height: 10.0,
                baseline: 8.0,
            })
        }

        fn font_metrics(&self, _font: &Font) -> Result<FontMetrics, MetricsError> {
            Ok(FontMetrics {
                ascent: 8.0,
                descent: 2.0,
                leading: 0.0,
            })
        }
    }

    fn break_text(
        text: &str,
        styles: Option<StyleTable>,
        wrap: Option<f64>,
        tabs: &[f64],
    ) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        let styles = styles.unwrap_or_else(|| StyleTable::new(chars.len()));
        let shaper = Shaper::new(&chars, None, &Fixed, tabs);
        let mut runs = shaper.shape(merge(&itemize(&chars), &styles)).unwrap();
        let lines = LineBreaker::new(&shaper, &UnicodeClassifier, wrap)
            .break_lines(&mut runs)
            .unwrap();
        lines
            .iter()
            .map(|range| {
                let start = runs[range.start].start;
                let end = runs[range.end - 1].end();
                chars[start..end].iter().collect()
            })
            .collect()
    }

    #[test]
    fn test_unconstrained_single_line() {
        assert_eq!(break_text("Hello World", None, None, &[]), vec!["Hello World"]);
    }

    #[test]
    fn test_hard_breaks_end_lines() {
        assert_eq!(
            break_text("Hello\nWorld", None, None, &[]),
            vec!["Hello\n", "World"]
        );
        assert_eq!(break_text("a\r\nb", None, None, &[]), vec!["a\r\n", "b"]);
        assert_eq!(break_text("a\n", None, None, &[]), vec!["a\n", ""]);
    }

    #[test]
    fn test_hard_break_ignores_width() {
        assert_eq!(
            break_text("ab\ncd", None, Some(1000.0), &[]),
            vec!["ab\n", "cd"]
        );
    }

    #[test]
    fn test_breaks_at_space_exact_fit() {
        // "A B " is exactly 40 wide.
        assert_eq!(
            break_text("A B C D E", None, Some(40.0), &[]),
            vec!["A B ", "C D ", "E"]
        );
    }

    #[test]
    fn test_breaks_at_word_boundary() {
        // Overflow happens inside "def"; the break goes after the space.
        assert_eq!(
            break_text("abc def ghi", None, Some(55.0), &[]),
            vec!["abc ", "def ", "ghi"]
        );
    }

    #[test]
    fn test_consecutive_spaces_stay_on_first_line() {
        assert_eq!(
            break_text("ab   cd", None, Some(30.0), &[]),
            vec!["ab   ", "cd"]
        );
    }

    #[test]
    fn test_forced_split_when_word_too_long() {
        assert_eq!(
            break_text("abcdefgh", None, Some(35.0), &[]),
            vec!["abc", "def", "gh"]
        );
    }

    #[test]
    fn test_forced_progress_below_char_width() {
        let lines = break_text("abc", None, Some(1.0), &[]);
        assert_eq!(lines, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_break_searches_into_earlier_runs() {
        // "one " is plain, "twothree" is styled: the space lives in the
        // earlier run.
        let mut styles = StyleTable::new(12);
        styles
            .apply(Some(TextStyle::with_font(Font::new("Courier", 10.0))), 4, 11)
            .unwrap();
        assert_eq!(
            break_text("one twothree", Some(styles), Some(70.0), &[]),
            vec!["one ", "twothre", "e"]
        );
    }

    #[test]
    fn test_styled_word_without_space_breaks_before_run() {
        let mut styles = StyleTable::new(6);
        styles
            .apply(Some(TextStyle::with_font(Font::new("Courier", 10.0))), 3, 5)
            .unwrap();
        // "abc" fits exactly; "def" starts a new run with no room left.
        assert_eq!(
            break_text("abcdef", Some(styles), Some(30.0), &[]),
            vec!["abc", "def"]
        );
    }

    #[test]
    fn test_no_break_space_moves_to_next_line() {
        assert_eq!(
            break_text("ab\u{00A0}cd", None, Some(30.0), &[]),
            vec!["ab", "\u{00A0}cd"]
        );
    }

    #[test]
    fn test_no_break_space_at_line_start_forces_split() {
        assert_eq!(
            break_text("\u{00A0}abcd", None, Some(30.0), &[]),
            vec!["\u{00A0}ab", "cd"]
        );
    }

    #[test]
    fn test_trailing_space_overflow_does_not_add_empty_line() {
        assert_eq!(break_text("abc ", None, Some(30.0), &[]), vec!["abc "]);
    }

    #[test]
    fn test_tab_resolves_against_running_width() {
        let chars: Vec<char> = "ab\tc".chars().collect();
        let shaper = Shaper::new(&chars, None, &Fixed, &[50.0]);
        let mut runs = shaper
            .shape(merge(&itemize(&chars), &StyleTable::new(chars.len())))
            .unwrap();
        LineBreaker::new(&shaper, &UnicodeClassifier, None)
            .break_lines(&mut runs)
            .unwrap();
        assert!(runs[1].tab);
        assert_eq!(runs[1].width, 30.0);
    }

    #[test]
    fn test_tab_is_a_break_opportunity() {
        assert_eq!(
            break_text("ab\tcdef", None, Some(50.0), &[40.0]),
            vec!["ab\t", "cdef"]
        );
    }

    #[test]
    fn test_split_runs_are_remeasured() {
        let chars: Vec<char> = "abc def".chars().collect();
        let shaper = Shaper::new(&chars, None, &Fixed, &[]);
        let mut runs = shaper
            .shape(merge(&itemize(&chars), &StyleTable::new(chars.len())))
            .unwrap();
        let lines = LineBreaker::new(&shaper, &UnicodeClassifier, Some(50.0))
            .break_lines(&mut runs)
            .unwrap();
        assert_eq!(lines, vec![0..1, 1..3]);
        assert_eq!((runs[0].length, runs[0].width), (4, 40.0));
        assert!(runs[0].soft_break && runs[0].line_break);
        assert_eq!((runs[1].start, runs[1].width), (4, 30.0));
        assert!(!runs[1].line_break);
    }

    #[test]
    fn test_every_line_makes_progress() {
        let text = "The quick brown fox\tjumps over\nthe lazy dog, repeatedly and at length.";
        for wrap in [1.0, 7.0, 10.0, 23.0, 45.0, 99.0, 150.0] {
            let lines = break_text(text, None, Some(wrap), &[40.0, 80.0]);
            assert_eq!(lines.concat(), text, "wrap {wrap}");
            for line in &lines[..lines.len() - 1] {
                assert!(!line.is_empty(), "empty line at wrap {wrap}");
            }
        }
    }
}

//! Character classification used for word boundaries.

/// Classifies characters for the line breaker and word navigation.
pub trait WhitespaceClassifier {
    /// Unicode space separators (general categories Zs, Zl, Zp).
    fn is_space(&self, ch: char) -> bool;

    /// Breaking whitespace: the Unicode `White_Space` property minus the
    /// no-break spaces.
    fn is_whitespace(&self, ch: char) -> bool;

    /// A word boundary candidate for line breaking.
    fn is_break_space(&self, ch: char) -> bool {
        self.is_space(ch) || self.is_whitespace(ch)
    }
}

/// The default classifier, using Unicode character properties.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeClassifier;

impl WhitespaceClassifier for UnicodeClassifier {
    fn is_space(&self, ch: char) -> bool {
        matches!(ch,
            '\u{0020}' |               // Space
            '\u{00A0}' |               // No-break space
            '\u{1680}' |               // Ogham space mark
            '\u{2000}'..='\u{200A}' |  // En quad .. hair space
            '\u{2028}' |               // Line separator
            '\u{2029}' |               // Paragraph separator
            '\u{202F}' |               // Narrow no-break space
            '\u{205F}' |               // Medium mathematical space
            '\u{3000}'                 // Ideographic space
        )
    }

    fn is_whitespace(&self, ch: char) -> bool {
        ch.is_whitespace() && !matches!(ch, '\u{00A0}' | '\u{2007}' | '\u{202F}')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii() {
        let c = UnicodeClassifier;
        assert!(c.is_space(' '));
        assert!(c.is_whitespace(' '));
        assert!(!c.is_space('\t'));
        assert!(c.is_whitespace('\t'));
        assert!(c.is_whitespace('\n'));
        assert!(!c.is_break_space('a'));
        assert!(!c.is_break_space('-'));
    }

    #[test]
    fn test_no_break_spaces() {
        let c = UnicodeClassifier;
        assert!(c.is_space('\u{00A0}'));
        assert!(!c.is_whitespace('\u{00A0}'));
        assert!(c.is_space('\u{2007}'));
        assert!(!c.is_whitespace('\u{2007}'));
    }

    #[test]
    fn test_ideographic_space() {
        let c = UnicodeClassifier;
        assert!(c.is_space('\u{3000}'));
        assert!(c.is_whitespace('\u{3000}'));
    }
}

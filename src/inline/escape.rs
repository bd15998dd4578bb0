//! Backslash escapes.

use super::{Inline, InlineRecognizer, InlineState};
use crate::{Range, TextSlice};

#[derive(Debug, Default, Clone, Copy)]
pub struct EscapeRecognizer;

impl EscapeRecognizer {
    pub fn new() -> Self {
        Self
    }
}

impl InlineRecognizer for EscapeRecognizer {
    fn name(&self) -> &'static str {
        "escape"
    }

    fn opening_chars(&self) -> &[u8] {
        b"\\"
    }

    fn try_match(&self, slice: &mut TextSlice<'_>, state: &mut InlineState<'_>) -> bool {
        let start = slice.offset();
        match slice.peek_ahead(1) {
            Some(b'\n') => {
                slice.advance(2);
                slice.skip_spaces();
                state.push(Inline::HardBreak);
                true
            }
            Some(b) if b.is_ascii_punctuation() => {
                slice.advance(2);
                state.push(Inline::Literal(Range::from_usize(start + 1, start + 2)));
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inline::{EmphasisRecognizer, InlineProcessor};
    use crate::tree::{BlockKind, LeafBlock};

    fn process(text: &str) -> LeafBlock {
        let recognizers: Vec<Box<dyn InlineRecognizer>> =
            vec![Box::new(EscapeRecognizer), Box::new(EmphasisRecognizer)];
        let mut leaf = LeafBlock::with_content(BlockKind::Paragraph, text.to_string());
        InlineProcessor::new(&recognizers, None).process_leaf(&mut leaf);
        leaf
    }

    #[test]
    fn test_escaped_delimiters_are_literal() {
        let leaf = process(r"\*not em\*");
        assert!(leaf.inlines().unwrap().iter().all(|i| matches!(i, Inline::Literal(_))));
        assert_eq!(leaf.plain_text(), "*not em*");
    }

    #[test]
    fn test_backslash_before_letter_is_kept() {
        let leaf = process(r"a\b");
        assert_eq!(leaf.plain_text(), r"a\b");
    }

    #[test]
    fn test_backslash_newline_is_hard_break() {
        let leaf = process("one\\\n  two");
        assert_eq!(
            leaf.inlines().unwrap(),
            &[
                Inline::Literal(Range::new(0, 3)),
                Inline::HardBreak,
                Inline::Literal(Range::new(7, 10)),
            ]
        );
    }
}

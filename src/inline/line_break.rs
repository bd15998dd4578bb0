//! Soft and hard line breaks inside multi-line leaves.

use super::{Inline, InlineRecognizer, InlineState};
use crate::TextSlice;

#[derive(Debug, Default, Clone, Copy)]
pub struct LineBreakRecognizer;

impl LineBreakRecognizer {
    pub fn new() -> Self {
        Self
    }
}

impl InlineRecognizer for LineBreakRecognizer {
    fn name(&self) -> &'static str {
        "line_break"
    }

    fn opening_chars(&self) -> &[u8] {
        b"\n"
    }

    fn try_match(&self, slice: &mut TextSlice<'_>, state: &mut InlineState<'_>) -> bool {
        let pending = state.pending_text();
        let trimmed = pending.trim_end_matches(' ');
        let hard = pending.len() - trimmed.len() >= 2;
        state.truncate_pending(trimmed.len());

        slice.advance(1);
        slice.skip_spaces();
        state.push(if hard { Inline::HardBreak } else { Inline::SoftBreak });
        true
    }
}

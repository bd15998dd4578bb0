//! Code spans.
//!
//! A backtick run opens a code span that closes at the next run of
//! exactly the same length. Everything in between is taken verbatim, so
//! code spans win over every construct that starts inside them.

use super::{Inline, InlineRecognizer, InlineState};
use crate::limits::MAX_CODE_SPAN_BACKTICKS;
use crate::{Range, TextSlice};

#[derive(Debug, Default, Clone, Copy)]
pub struct CodeSpanRecognizer;

impl CodeSpanRecognizer {
    pub fn new() -> Self {
        Self
    }
}

impl InlineRecognizer for CodeSpanRecognizer {
    fn name(&self) -> &'static str {
        "code_span"
    }

    fn opening_chars(&self) -> &[u8] {
        b"`"
    }

    fn try_match(&self, slice: &mut TextSlice<'_>, state: &mut InlineState<'_>) -> bool {
        let opener_len = slice.run_length(b'`');
        slice.advance(opener_len);
        if opener_len > MAX_CODE_SPAN_BACKTICKS {
            // Consumed as literal so the run is not retried byte by byte.
            return true;
        }

        let content_start = slice.offset();
        let mut search = *slice;
        while let Some(idx) = search.find(b'`') {
            search.advance(idx);
            let closer_start = search.offset();
            let closer_len = search.run_length(b'`');
            search.advance(closer_len);
            if closer_len == opener_len {
                let content = strip_one_space(search.source(), content_start, closer_start);
                state.push(Inline::Code(content));
                *slice = search;
                return true;
            }
        }

        // No closer: the opening run is literal text.
        true
    }
}

/// Strip one leading and one trailing space (or newline) when both are
/// present and the content is not made only of spaces.
fn strip_one_space(text: &str, start: usize, end: usize) -> Range {
    let bytes = &text.as_bytes()[start..end];
    let is_space = |b: u8| b == b' ' || b == b'\n';
    let all_space = bytes.iter().all(|&b| is_space(b));
    if bytes.len() >= 2 && !all_space && is_space(bytes[0]) && is_space(bytes[bytes.len() - 1]) {
        Range::from_usize(start + 1, end - 1)
    } else {
        Range::from_usize(start, end)
    }
}

//! ATX headings (`# Title`).

use super::{BlockContext, BlockRecognizer, BlockStart, BlockState};
use crate::limits::MAX_HEADING_LEVEL;
use crate::tree::{Block, BlockKind};
use crate::TextSlice;

/// Single-line heading; the block closes on the line that opens it.
#[derive(Debug, Default, Clone, Copy)]
pub struct AtxHeadingRecognizer;

impl BlockRecognizer for AtxHeadingRecognizer {
    fn name(&self) -> &'static str {
        "atx_heading"
    }

    fn opening_chars(&self) -> &[u8] {
        b"#"
    }

    fn can_interrupt(&self) -> bool {
        true
    }

    fn try_open(&self, slice: &mut TextSlice<'_>, ctx: &mut BlockContext<'_>) -> Option<BlockStart> {
        slice.skip_spaces_max(3);
        let level = slice.run_length(b'#');
        if level == 0 || level > MAX_HEADING_LEVEL as usize {
            return None;
        }
        slice.advance(level);

        // Must be followed by space, tab, or end of line
        if !slice.is_empty() && !slice.at_any(b" \t") {
            return None;
        }
        slice.skip_whitespace();
        let end = trim_heading_end(slice.as_str());
        slice.truncate(slice.offset() + end);

        let leaf = ctx.new_leaf(BlockKind::Heading { level: level as u8 }).with_inlines();
        Some(BlockStart::new(leaf, BlockState::Break))
    }

    fn try_continue(
        &self,
        _slice: &mut TextSlice<'_>,
        _block: &mut Block,
        _ctx: &mut BlockContext<'_>,
    ) -> BlockState {
        BlockState::None
    }
}

/// Length of `content` without trailing whitespace and an optional
/// closing `#` sequence.
fn trim_heading_end(content: &str) -> usize {
    let bytes = content.as_bytes();
    let is_space = |b: u8| b == b' ' || b == b'\t';

    let mut pos = bytes.len();
    while pos > 0 && is_space(bytes[pos - 1]) {
        pos -= 1;
    }

    let after_hashes = pos;
    while pos > 0 && bytes[pos - 1] == b'#' {
        pos -= 1;
    }

    if pos < after_hashes {
        // Closing hashes must be preceded by space (or be everything).
        if pos == 0 || is_space(bytes[pos - 1]) {
            while pos > 0 && is_space(bytes[pos - 1]) {
                pos -= 1;
            }
        } else {
            pos = after_hashes;
        }
    }
    pos
}

//! Thematic breaks (`---`, `***`, `___`).

use super::{BlockContext, BlockRecognizer, BlockStart, BlockState};
use crate::tree::{Block, BlockKind, LeafBlock};
use crate::TextSlice;

#[derive(Debug, Default, Clone, Copy)]
pub struct ThematicBreakRecognizer;

impl BlockRecognizer for ThematicBreakRecognizer {
    fn name(&self) -> &'static str {
        "thematic_break"
    }

    fn opening_chars(&self) -> &[u8] {
        b"-*_"
    }

    fn can_interrupt(&self) -> bool {
        true
    }

    fn try_open(&self, slice: &mut TextSlice<'_>, _ctx: &mut BlockContext<'_>) -> Option<BlockStart> {
        slice.skip_spaces_max(3);
        let marker = slice.peek().filter(|&b| matches!(b, b'-' | b'*' | b'_'))?;

        let mut count = 0;
        for b in slice.as_str().bytes() {
            if b == marker {
                count += 1;
            } else if b != b' ' && b != b'\t' {
                return None;
            }
        }
        if count < 3 {
            return None;
        }

        slice.advance(slice.remaining());
        Some(BlockStart::new(
            LeafBlock::new(BlockKind::ThematicBreak),
            BlockState::BreakDiscard,
        ))
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

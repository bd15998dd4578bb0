//! Block quotes (`> text`).

use super::{BlockContext, BlockRecognizer, BlockStart, BlockState};
use crate::tree::{Block, BlockKind, ContainerBlock};
use crate::TextSlice;

#[derive(Debug, Default, Clone, Copy)]
pub struct BlockQuoteRecognizer;

impl BlockRecognizer for BlockQuoteRecognizer {
    fn name(&self) -> &'static str {
        "block_quote"
    }

    fn opening_chars(&self) -> &[u8] {
        b">"
    }

    fn can_interrupt(&self) -> bool {
        true
    }

    fn try_open(&self, slice: &mut TextSlice<'_>, _ctx: &mut BlockContext<'_>) -> Option<BlockStart> {
        if !eat_marker(slice) {
            return None;
        }
        Some(BlockStart::new(
            ContainerBlock::new(BlockKind::BlockQuote),
            BlockState::Continue,
        ))
    }

    fn try_continue(
        &self,
        slice: &mut TextSlice<'_>,
        _block: &mut Block,
        _ctx: &mut BlockContext<'_>,
    ) -> BlockState {
        if eat_marker(slice) {
            BlockState::Continue
        } else {
            BlockState::None
        }
    }
}

/// Up to three spaces, `>`, and one optional space or tab.
fn eat_marker(slice: &mut TextSlice<'_>) -> bool {
    let mut probe = *slice;
    probe.skip_spaces_max(3);
    if !probe.eat(b'>') {
        return false;
    }
    if !probe.eat(b' ') {
        probe.eat(b'\t');
    }
    *slice = probe;
    true
}

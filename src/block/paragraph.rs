//! Paragraphs: the catch-all leaf.

use super::{BlockContext, BlockRecognizer, BlockStart, BlockState};
use crate::tree::{Block, BlockKind};
use crate::TextSlice;

/// Opens on any non-blank line no other recognizer claimed. Blank lines
/// end it; interrupting blocks end it; lines its containers reject still
/// continue it (laziness).
#[derive(Debug, Default, Clone, Copy)]
pub struct ParagraphRecognizer;

impl BlockRecognizer for ParagraphRecognizer {
    fn name(&self) -> &'static str {
        "paragraph"
    }

    fn can_be_interrupted(&self, _block: &Block) -> bool {
        true
    }

    fn is_lazy(&self) -> bool {
        true
    }

    fn try_open(&self, slice: &mut TextSlice<'_>, ctx: &mut BlockContext<'_>) -> Option<BlockStart> {
        if slice.is_blank() {
            return None;
        }
        slice.skip_whitespace();
        let leaf = ctx.new_leaf(BlockKind::Paragraph).with_inlines();
        Some(BlockStart::new(leaf, BlockState::Continue))
    }

    fn try_continue(
        &self,
        slice: &mut TextSlice<'_>,
        _block: &mut Block,
        _ctx: &mut BlockContext<'_>,
    ) -> BlockState {
        if slice.is_blank() {
            return BlockState::None;
        }
        slice.skip_whitespace();
        BlockState::Continue
    }

    fn close(&self, block: &mut Block, _ctx: &mut BlockContext<'_>) -> bool {
        match block.as_leaf_mut() {
            Some(leaf) => {
                leaf.trim_end();
                !leaf.content().is_empty()
            }
            None => true,
        }
    }
}

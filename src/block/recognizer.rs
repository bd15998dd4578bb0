//! The contract between the block engine and pluggable block recognizers.

use crate::cache::StringCache;
use crate::tree::{Block, BlockKind, LeafBlock};
use crate::TextSlice;

/// Outcome of offering a line to an open block (or of opening one).
///
/// For a leaf, `Continue` and `Break` append the rest of the line to the
/// leaf's content; the `*Discard` variants drop it. `Break*` closes the
/// block right after the line.
///
/// For a container, `Continue` lets the rest of the line flow on to its
/// children, `ContinueDiscard` keeps the container open but ends the
/// line, and `Break*` closes the container together with everything
/// below it. After `Break` the rest of the line is offered to openers
/// in the container's parent; after `BreakDiscard` the line ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockState {
    /// The line does not belong to the block.
    None,
    Continue,
    ContinueDiscard,
    Break,
    BreakDiscard,
}

impl BlockState {
    /// Whether the line belongs to the block at all.
    #[inline]
    pub fn is_match(self) -> bool {
        self != BlockState::None
    }

    /// Whether the rest of the line is kept.
    #[inline]
    pub fn keeps_line(self) -> bool {
        matches!(self, BlockState::Continue | BlockState::Break)
    }

    /// Whether the block closes after this line.
    #[inline]
    pub fn closes(self) -> bool {
        matches!(self, BlockState::Break | BlockState::BreakDiscard)
    }
}

/// A block produced by [`BlockRecognizer::try_open`], with the state the
/// opening line leaves it in.
#[derive(Debug)]
pub struct BlockStart {
    pub block: Block,
    pub state: BlockState,
}

impl BlockStart {
    pub fn new(block: impl Into<Block>, state: BlockState) -> Self {
        Self {
            block: block.into(),
            state,
        }
    }
}

/// Per-line context handed to recognizers.
pub struct BlockContext<'c> {
    cache: &'c mut StringCache,
    line_number: usize,
}

impl<'c> BlockContext<'c> {
    pub(crate) fn new(cache: &'c mut StringCache, line_number: usize) -> Self {
        Self { cache, line_number }
    }

    /// One-based number of the line being processed.
    #[inline]
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// A new leaf whose content buffer comes from the parse's string cache.
    pub fn new_leaf(&mut self, kind: BlockKind) -> LeafBlock {
        LeafBlock::with_content(kind, self.cache.acquire())
    }

    /// Hand a leaf's content buffer back to the string cache.
    pub fn release_content(&mut self, leaf: &mut LeafBlock) {
        self.cache.release(leaf.take_content());
    }
}

/// A pluggable block strategy.
///
/// Recognizers are shared by every parse of a pipeline, so all methods
/// take `&self`; per-block state lives in the block itself. Each call
/// must consume what it matched from the slice; a recognizer that
/// reports success without making progress on every line can make the
/// block pass loop forever.
pub trait BlockRecognizer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Bytes that may begin this block after leading spaces. An empty set
    /// means the recognizer is tried on every line.
    fn opening_chars(&self) -> &[u8] {
        &[]
    }

    /// May open while an interruptible leaf is still accepting lines.
    fn can_interrupt(&self) -> bool {
        false
    }

    /// Whether a line that opens an interrupting block ends `block`.
    fn can_be_interrupted(&self, _block: &Block) -> bool {
        false
    }

    /// Accepts lines even when not all enclosing containers matched.
    fn is_lazy(&self) -> bool {
        false
    }

    /// Try to start a block at the slice position.
    fn try_open(&self, slice: &mut TextSlice<'_>, ctx: &mut BlockContext<'_>) -> Option<BlockStart>;

    /// Offer the next line to an open block this recognizer started.
    fn try_continue(
        &self,
        slice: &mut TextSlice<'_>,
        block: &mut Block,
        ctx: &mut BlockContext<'_>,
    ) -> BlockState;

    /// Finalize the block. Returning `false` drops it from the tree.
    fn close(&self, _block: &mut Block, _ctx: &mut BlockContext<'_>) -> bool {
        true
    }
}

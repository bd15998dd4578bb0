//! Fenced code blocks.

use super::{BlockContext, BlockRecognizer, BlockStart, BlockState};
use crate::tree::{Block, BlockKind, FenceInfo};
use crate::TextSlice;

/// Backtick or tilde fences of three or more. Content lines are kept
/// verbatim apart from the fence's own indentation; the block never goes
/// through the inline pass.
#[derive(Debug, Default, Clone, Copy)]
pub struct FencedCodeRecognizer;

impl BlockRecognizer for FencedCodeRecognizer {
    fn name(&self) -> &'static str {
        "fenced_code"
    }

    fn opening_chars(&self) -> &[u8] {
        b"`~"
    }

    fn can_interrupt(&self) -> bool {
        true
    }

    fn try_open(&self, slice: &mut TextSlice<'_>, ctx: &mut BlockContext<'_>) -> Option<BlockStart> {
        let indent = slice.skip_spaces_max(3);
        let fence_char = slice.peek().filter(|&b| b == b'`' || b == b'~')?;
        let fence_len = slice.run_length(fence_char);
        if fence_len < 3 {
            return None;
        }
        slice.advance(fence_len);
        slice.skip_whitespace();
        slice.trim_end();

        // Backtick fences cannot carry backticks in their info string.
        let info = slice.as_str();
        if fence_char == b'`' && info.contains('`') {
            return None;
        }
        let info = (!info.is_empty()).then(|| info.to_string());
        slice.advance(slice.remaining());

        let fence = FenceInfo {
            fence_char,
            fence_len,
            indent,
            info,
        };
        let leaf = ctx.new_leaf(BlockKind::FencedCode(fence));
        Some(BlockStart::new(leaf, BlockState::ContinueDiscard))
    }

    fn try_continue(
        &self,
        slice: &mut TextSlice<'_>,
        block: &mut Block,
        _ctx: &mut BlockContext<'_>,
    ) -> BlockState {
        let BlockKind::FencedCode(fence) = block.kind() else {
            return BlockState::None;
        };

        let mut probe = *slice;
        probe.skip_spaces_max(3);
        if probe.run_length(fence.fence_char) >= fence.fence_len {
            probe.advance(probe.run_length(fence.fence_char));
            if probe.is_blank() {
                slice.advance(slice.remaining());
                return BlockState::BreakDiscard;
            }
        }

        slice.skip_spaces_max(fence.indent);
        BlockState::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::StringCache;

    fn open(line: &str) -> Option<Block> {
        let mut cache = StringCache::new();
        let mut ctx = BlockContext::new(&mut cache, 1);
        FencedCodeRecognizer
            .try_open(&mut TextSlice::new(line), &mut ctx)
            .map(|start| start.block)
    }

    fn fence(block: &Block) -> &FenceInfo {
        match block.kind() {
            BlockKind::FencedCode(fence) => fence,
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn test_open_with_info() {
        let block = open("  ```rust ignore  ").unwrap();
        let info = fence(&block);
        assert_eq!(info.fence_char, b'`');
        assert_eq!(info.fence_len, 3);
        assert_eq!(info.indent, 2);
        assert_eq!(info.info.as_deref(), Some("rust ignore"));
        assert!(!block.as_leaf().unwrap().process_inlines);
    }

    #[test]
    fn test_not_fences() {
        assert!(open("``").is_none());
        assert!(open("``` a`b").is_none());
        assert!(open("    ```").is_none());
        assert!(open("~~~ a`b").is_some());
    }

    #[test]
    fn test_continue_and_close() {
        let mut cache = StringCache::new();
        let mut ctx = BlockContext::new(&mut cache, 2);
        let mut block = open("  ~~~~").unwrap();

        let mut line = TextSlice::new("    code");
        assert_eq!(
            FencedCodeRecognizer.try_continue(&mut line, &mut block, &mut ctx),
            BlockState::Continue
        );
        assert_eq!(line.as_str(), "  code");

        let mut short = TextSlice::new("~~~");
        assert_eq!(
            FencedCodeRecognizer.try_continue(&mut short, &mut block, &mut ctx),
            BlockState::Continue
        );

        let mut other = TextSlice::new("`````");
        assert_eq!(
            FencedCodeRecognizer.try_continue(&mut other, &mut block, &mut ctx),
            BlockState::Continue
        );

        let mut close = TextSlice::new(" ~~~~~ ");
        assert_eq!(
            FencedCodeRecognizer.try_continue(&mut close, &mut block, &mut ctx),
            BlockState::BreakDiscard
        );
    }
}

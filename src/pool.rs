//! Reusable traversal frames for the inline pass.

use crate::limits::MAX_POOLED_FRAMES;
use crate::tree::{Block, ContainerBlock};

/// Where the container of a frame lives while its children are detached.
#[derive(Debug, Default)]
pub(crate) enum FrameOrigin {
    /// The document root.
    #[default]
    Root,
    /// Still in the parent frame's children, at this index.
    Slot(usize),
    /// Taken out of the tree by the walk; dropped once the frame pops.
    Removed(ContainerBlock),
}

/// One level of the inline walk: a container's children and the index
/// of the next child to visit.
#[derive(Debug, Default)]
pub(crate) struct Frame {
    pub(crate) children: Vec<Block>,
    pub(crate) cursor: usize,
    pub(crate) origin: FrameOrigin,
}

impl Frame {
    fn reset(&mut self) {
        self.children.clear();
        self.cursor = 0;
        self.origin = FrameOrigin::Root;
    }
}

/// Cache of traversal frames, owned by a single parse.
#[derive(Debug, Default)]
pub struct FramePool {
    free: Vec<Frame>,
    allocated: usize,
}

impl FramePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// A reset frame, reused when one is idle.
    pub(crate) fn acquire(&mut self) -> Frame {
        self.free.pop().unwrap_or_else(|| {
            self.allocated += 1;
            Frame::default()
        })
    }

    /// Reset `frame` and keep it for reuse, up to [`MAX_POOLED_FRAMES`].
    pub(crate) fn release(&mut self, mut frame: Frame) {
        frame.reset();
        if self.free.len() < MAX_POOLED_FRAMES {
            self.free.push(frame);
        }
    }

    /// Frames created over the pool's lifetime.
    #[inline]
    pub fn allocated(&self) -> usize {
        self.allocated
    }

    /// Frames currently idle in the pool.
    #[inline]
    pub fn idle(&self) -> usize {
        self.free.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{BlockKind, LeafBlock};

    #[test]
    fn test_release_resets_frame() {
        let mut pool = FramePool::new();
        let mut frame = pool.acquire();
        frame.children.push(LeafBlock::new(BlockKind::Paragraph).into());
        frame.cursor = 1;
        frame.origin = FrameOrigin::Slot(3);
        pool.release(frame);

        let frame = pool.acquire();
        assert!(frame.children.is_empty());
        assert_eq!(frame.cursor, 0);
        assert!(matches!(frame.origin, FrameOrigin::Root));
        assert_eq!(pool.allocated(), 1);
    }

    #[test]
    fn test_pool_is_bounded() {
        let mut pool = FramePool::new();
        let frames: Vec<_> = (0..MAX_POOLED_FRAMES + 10).map(|_| pool.acquire()).collect();
        for frame in frames {
            pool.release(frame);
        }
        assert_eq!(pool.idle(), MAX_POOLED_FRAMES);
        assert_eq!(pool.allocated(), MAX_POOLED_FRAMES + 10);
    }
}

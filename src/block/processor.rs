//! The block engine: opens, continues and closes blocks line by line.
//!
//! Open blocks form a chain from the document root: each one is the last
//! child of the one before it, and only the deepest may be a leaf. The
//! chain is tracked as a list of recognizer indices; nodes are reached
//! by walking last children from the root.

use super::recognizer::{BlockContext, BlockRecognizer, BlockStart, BlockState};
use crate::cache::StringCache;
use crate::tree::{Block, ContainerBlock, Document};
use crate::TextSlice;

#[derive(Debug, Clone, Copy)]
struct OpenBlock {
    recognizer: usize,
    is_leaf: bool,
}

/// What the container pass decided for the current line.
enum ContainerOutcome {
    /// Containers were offered the line; `matched` of them accepted it.
    Matched,
    /// A container accepted the line and ended it.
    Consumed,
    /// The container at the matched depth broke; `keep` tells whether the
    /// rest of the line goes on to openers.
    Broke { keep: bool },
}

/// Builds the raw document tree from lines.
pub struct BlockProcessor<'p> {
    recognizers: &'p [Box<dyn BlockRecognizer>],
    cache: &'p mut StringCache,
    document: Document,
    open: Vec<OpenBlock>,
    line_number: usize,
    finished: bool,
}

impl<'p> BlockProcessor<'p> {
    pub fn new(recognizers: &'p [Box<dyn BlockRecognizer>], cache: &'p mut StringCache) -> Self {
        Self {
            recognizers,
            cache,
            document: Document::new(),
            open: Vec::new(),
            line_number: 0,
            finished: false,
        }
    }

    /// Number of lines processed.
    #[inline]
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Number of blocks currently open below the root.
    #[inline]
    pub fn open_depth(&self) -> usize {
        self.open.len()
    }

    /// Whether the final `close_all(true)` has run.
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The tree built so far.
    #[inline]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Feed one line (without its terminator).
    pub fn process_line(&mut self, line: TextSlice<'_>) {
        if self.finished {
            log::warn!("line after close_all ignored");
            return;
        }
        self.line_number += 1;
        let mut slice = line;
        log::trace!("line {}: {:?}", self.line_number, slice.as_str());

        let (matched, outcome) = self.continue_containers(&mut slice);
        match outcome {
            ContainerOutcome::Consumed => return,
            ContainerOutcome::Broke { keep } => {
                self.close_from(matched);
                if keep {
                    self.open_blocks(slice, None);
                }
                return;
            }
            ContainerOutcome::Matched => {}
        }

        let containers = self.container_count();
        let leaf = self.open.last().copied().filter(|o| o.is_leaf);

        if let Some(leaf) = leaf {
            let all_matched = matched == containers;
            let interruptible = all_matched || self.is_lazy(leaf, &slice);

            if interruptible {
                if let Some(start) = self.try_interrupt(leaf, &mut slice) {
                    self.close_from(matched);
                    self.open_blocks(slice, Some(start));
                    return;
                }
                let state = self.continue_leaf(leaf, &mut slice);
                if state.is_match() {
                    if state.closes() {
                        self.close_from(containers);
                    }
                    return;
                }
            }
        }

        self.close_from(matched);
        self.open_blocks(slice, None);
    }

    /// Finalize open blocks.
    ///
    /// With `force` every open block is closed and the processor accepts
    /// no further lines; a second forced call only logs a warning. Without
    /// `force` only an open leaf is closed.
    pub fn close_all(&mut self, force: bool) {
        if self.finished {
            log::warn!("close_all called on a finished block processor");
            return;
        }
        if force {
            log::debug!("closing {} open blocks after {} lines", self.open.len(), self.line_number);
            self.close_from(0);
            self.finished = true;
        } else if self.open.last().is_some_and(|o| o.is_leaf) {
            self.close_from(self.open.len() - 1);
        }
    }

    /// The finished document. Closes anything still open first.
    pub fn into_document(mut self) -> Document {
        if !self.finished {
            self.close_all(true);
        }
        self.document
    }

    fn container_count(&self) -> usize {
        self.open.len() - usize::from(self.open.last().is_some_and(|o| o.is_leaf))
    }

    /// Offer the line to the open containers in order, stopping at the
    /// first one that does not take it.
    fn continue_containers(&mut self, slice: &mut TextSlice<'_>) -> (usize, ContainerOutcome) {
        let mut ctx = BlockContext::new(&mut *self.cache, self.line_number);
        let mut node: &mut ContainerBlock = &mut self.document.root;
        let mut matched = 0;

        for entry in &self.open {
            if entry.is_leaf {
                break;
            }
            let Some(block) = node.children.last_mut() else {
                break;
            };
            let recognizer = &self.recognizers[entry.recognizer];
            match recognizer.try_continue(slice, block, &mut ctx) {
                BlockState::None => break,
                BlockState::Continue => {}
                BlockState::ContinueDiscard => return (matched + 1, ContainerOutcome::Consumed),
                BlockState::Break => return (matched, ContainerOutcome::Broke { keep: true }),
                BlockState::BreakDiscard => return (matched, ContainerOutcome::Broke { keep: false }),
            }
            matched += 1;
            match block {
                Block::Container(container) => node = container,
                Block::Leaf(_) => break,
            }
        }
        (matched, ContainerOutcome::Matched)
    }

    /// A lazy leaf keeps a non-blank line its containers rejected.
    fn is_lazy(&self, leaf: OpenBlock, slice: &TextSlice<'_>) -> bool {
        !slice.is_blank() && self.recognizers[leaf.recognizer].is_lazy()
    }

    fn try_interrupt(&mut self, leaf: OpenBlock, slice: &mut TextSlice<'_>) -> Option<(usize, BlockStart)> {
        let depth = self.open.len() - 1;
        let block = container_at(&mut self.document.root, depth)?.children.last()?;
        if !self.recognizers[leaf.recognizer].can_be_interrupted(block) {
            return None;
        }
        let first = slice.first_non_space();
        let mut ctx = BlockContext::new(&mut *self.cache, self.line_number);
        for (idx, recognizer) in self.recognizers.iter().enumerate() {
            if !recognizer.can_interrupt() || !accepts(recognizer.as_ref(), first) {
                continue;
            }
            let mut attempt = *slice;
            if let Some(start) = recognizer.try_open(&mut attempt, &mut ctx) {
                log::trace!("{} interrupts at line {}", recognizer.name(), self.line_number);
                *slice = attempt;
                return Some((idx, start));
            }
        }
        None
    }

    fn continue_leaf(&mut self, leaf: OpenBlock, slice: &mut TextSlice<'_>) -> BlockState {
        let depth = self.open.len() - 1;
        let mut ctx = BlockContext::new(&mut *self.cache, self.line_number);
        let Some(block) = container_at(&mut self.document.root, depth).and_then(|c| c.children.last_mut())
        else {
            return BlockState::None;
        };
        let state = self.recognizers[leaf.recognizer].try_continue(slice, block, &mut ctx);
        if state.keeps_line() {
            if let Some(leaf) = block.as_leaf_mut() {
                leaf.append_line(slice.as_str());
            }
        }
        state
    }

    /// Open new blocks below the deepest open container. Containers nest;
    /// the first leaf ends the loop.
    fn open_blocks(&mut self, mut slice: TextSlice<'_>, mut pending: Option<(usize, BlockStart)>) {
        loop {
            let next = match pending.take() {
                Some(start) => Some(start),
                None => self.try_open(&mut slice),
            };
            let Some((idx, BlockStart { mut block, state })) = next else {
                return;
            };

            let is_leaf = block.is_leaf();
            if is_leaf && state.keeps_line() {
                if let Some(leaf) = block.as_leaf_mut() {
                    leaf.append_line(slice.as_str());
                }
            }

            let depth = self.open.len();
            let Some(parent) = container_at(&mut self.document.root, depth) else {
                log::warn!("open block chain broken at depth {depth}");
                return;
            };
            parent.children.push(block);
            self.open.push(OpenBlock {
                recognizer: idx,
                is_leaf,
            });

            if state.closes() {
                self.close_from(depth);
                return;
            }
            if is_leaf || state == BlockState::ContinueDiscard {
                return;
            }
        }
    }

    fn try_open(&mut self, slice: &mut TextSlice<'_>) -> Option<(usize, BlockStart)> {
        let first = slice.first_non_space();
        let mut ctx = BlockContext::new(&mut *self.cache, self.line_number);
        for (idx, recognizer) in self.recognizers.iter().enumerate() {
            if !accepts(recognizer.as_ref(), first) {
                continue;
            }
            let mut attempt = *slice;
            if let Some(start) = recognizer.try_open(&mut attempt, &mut ctx) {
                log::trace!("{} opens at line {}", recognizer.name(), self.line_number);
                *slice = attempt;
                return Some((idx, start));
            }
        }
        None
    }

    /// Close the open blocks at `depth` and below, deepest first.
    fn close_from(&mut self, depth: usize) {
        if depth >= self.open.len() {
            return;
        }
        let mut ctx = BlockContext::new(&mut *self.cache, self.line_number);
        let Some(parent) = container_at(&mut self.document.root, depth) else {
            self.open.truncate(depth);
            return;
        };

        // Detach the open chain so each block can be closed after its
        // descendants without walking from the root every time.
        let mut chain: Vec<Block> = Vec::with_capacity(self.open.len() - depth);
        chain.extend(parent.children.pop());
        while chain.len() < self.open.len() - depth {
            let next = match chain.last_mut() {
                Some(Block::Container(container)) => container.children.pop(),
                _ => None,
            };
            match next {
                Some(block) => chain.push(block),
                None => break,
            }
        }

        while let Some(mut block) = chain.pop() {
            let entry = self.open[depth + chain.len()];
            let recognizer = &self.recognizers[entry.recognizer];
            let keep = recognizer.close(&mut block, &mut ctx);
            if !keep {
                log::trace!("{} dropped its block on close", recognizer.name());
                if let Block::Leaf(leaf) = &mut block {
                    ctx.release_content(leaf);
                }
                continue;
            }
            match chain.last_mut() {
                Some(Block::Container(container)) => container.children.push(block),
                _ => parent.children.push(block),
            }
        }
        self.open.truncate(depth);
    }
}

/// The container holding the open block at `depth` (the root for 0).
fn container_at(root: &mut ContainerBlock, depth: usize) -> Option<&mut ContainerBlock> {
    let mut node = root;
    for _ in 0..depth {
        node = node.children.last_mut()?.as_container_mut()?;
    }
    Some(node)
}

fn accepts(recognizer: &dyn BlockRecognizer, first: Option<u8>) -> bool {
    let chars = recognizer.opening_chars();
    chars.is_empty() || first.is_some_and(|b| chars.contains(&b))
}

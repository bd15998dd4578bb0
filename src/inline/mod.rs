//! Inline engine.
//!
//! A leaf's content is scanned once, left to right. At every byte that is
//! an opening character of some recognizer, the recognizers registered
//! for it are tried in pipeline order; text between matches accumulates
//! as a literal. After the scan every recognizer gets a post-processing
//! pass over the produced nodes (emphasis resolution happens there).

mod code_span;
mod emphasis;
mod entity;
mod escape;
mod line_break;
mod link_ref;
mod node;

pub use code_span::CodeSpanRecognizer;
pub use emphasis::EmphasisRecognizer;
pub use entity::EntityRecognizer;
pub use escape::EscapeRecognizer;
pub use line_break::LineBreakRecognizer;
pub use link_ref::LinkReferenceRecognizer;
pub use node::{DelimiterRun, Inline};

use smallvec::SmallVec;

use crate::link_ref::LinkRefStore;
use crate::pipeline::DebugLog;
use crate::tree::{Block, BlockKind, LeafBlock};
use crate::{Range, TextSlice};

/// A pluggable inline strategy.
///
/// `try_match` is called with the slice positioned on one of
/// `opening_chars`. On success it consumes what it matched, optionally
/// pushes nodes through `state`, and returns `true`. Matched text that
/// was neither pushed nor explicitly consumed with
/// [`InlineState::mark_consumed`] stays part of the surrounding literal.
/// On failure the recognizer must not push anything.
pub trait InlineRecognizer: Send + Sync {
    fn name(&self) -> &'static str;

    /// ASCII bytes that may start a match.
    fn opening_chars(&self) -> &[u8];

    fn try_match(&self, slice: &mut TextSlice<'_>, state: &mut InlineState<'_>) -> bool;

    /// Runs once per leaf after the scan, in pipeline order.
    fn post_process(&self, _state: &mut InlineState<'_>) {}
}

/// Per-leaf state shared by the recognizers during one scan.
pub struct InlineState<'a> {
    content: &'a str,
    kind: &'a BlockKind,
    inlines: Vec<Inline>,
    literal_start: usize,
    match_start: usize,
    consumed: bool,
    delimiter_runs: usize,
    link_refs: &'a mut LinkRefStore,
    remove_leaf: bool,
    replacement: Option<Block>,
}

impl<'a> InlineState<'a> {
    fn new(content: &'a str, kind: &'a BlockKind, link_refs: &'a mut LinkRefStore) -> Self {
        Self {
            content,
            kind,
            inlines: Vec::new(),
            literal_start: 0,
            match_start: 0,
            consumed: false,
            delimiter_runs: 0,
            link_refs,
            remove_leaf: false,
            replacement: None,
        }
    }

    /// The leaf content being scanned.
    #[inline]
    pub fn content(&self) -> &'a str {
        self.content
    }

    /// Kind of the leaf being processed.
    #[inline]
    pub fn leaf_kind(&self) -> &BlockKind {
        self.kind
    }

    /// Literal text accumulated before the current match.
    #[inline]
    pub fn pending_text(&self) -> &'a str {
        self.content
            .get(self.literal_start..self.match_start)
            .unwrap_or("")
    }

    /// Cut the pending literal short, e.g. to drop trailing spaces before
    /// a line break.
    pub fn truncate_pending(&mut self, len: usize) {
        let end = self.literal_start + len;
        if end < self.match_start {
            self.match_start = end;
        }
    }

    /// Nodes produced so far.
    #[inline]
    pub fn inlines(&self) -> &[Inline] {
        &self.inlines
    }

    #[inline]
    pub fn inlines_mut(&mut self) -> &mut Vec<Inline> {
        &mut self.inlines
    }

    /// Flush the pending literal and append `inline`.
    pub fn push(&mut self, inline: Inline) {
        self.mark_consumed();
        if let Inline::Delimiter(_) = inline {
            self.delimiter_runs += 1;
        }
        self.inlines.push(inline);
    }

    /// Flush the pending literal; the text of the current match will not
    /// become literal text.
    pub fn mark_consumed(&mut self) {
        if self.consumed {
            return;
        }
        if self.literal_start < self.match_start {
            self.inlines
                .push(Inline::Literal(Range::from_usize(self.literal_start, self.match_start)));
        }
        self.literal_start = self.match_start;
        self.consumed = true;
    }

    /// Number of delimiter runs pushed for this leaf.
    #[inline]
    pub fn delimiter_runs(&self) -> usize {
        self.delimiter_runs
    }

    #[inline]
    pub fn link_refs_mut(&mut self) -> &mut LinkRefStore {
        self.link_refs
    }

    /// Ask the traversal to drop the leaf after processing.
    pub fn remove_leaf(&mut self) {
        self.remove_leaf = true;
    }

    /// Ask the traversal to put `block` in place of the leaf.
    pub fn replace_block(&mut self, block: Block) {
        self.replacement = Some(block);
    }

    fn begin_match(&mut self, pos: usize) {
        self.match_start = pos;
        self.consumed = false;
    }

    fn end_match(&mut self, pos: usize) {
        if self.consumed {
            self.literal_start = pos;
        }
        self.match_start = pos;
        self.consumed = false;
    }

    fn finish(mut self) -> (Vec<Inline>, bool, Option<Block>) {
        self.begin_match(self.content.len());
        self.mark_consumed();
        let mut inlines = std::mem::take(&mut self.inlines);
        for inline in &mut inlines {
            if let Inline::Delimiter(run) = inline {
                *inline = Inline::Literal(run.range);
            }
        }
        node::merge_literals(&mut inlines);
        (inlines, self.remove_leaf, self.replacement)
    }
}

/// Recognizer indices per opening byte.
type DispatchTable = [SmallVec<[usize; 2]>; 256];

/// Feeds leaves to the inline recognizers of a pipeline.
pub struct InlineProcessor<'p> {
    recognizers: &'p [Box<dyn InlineRecognizer>],
    table: Box<DispatchTable>,
    debug_log: Option<&'p DebugLog>,
    link_refs: LinkRefStore,
    replacement: Option<Block>,
    leaves: usize,
}

impl<'p> InlineProcessor<'p> {
    pub fn new(recognizers: &'p [Box<dyn InlineRecognizer>], debug_log: Option<&'p DebugLog>) -> Self {
        let mut table: Box<DispatchTable> = Box::new(std::array::from_fn(|_| SmallVec::new()));
        for (idx, recognizer) in recognizers.iter().enumerate() {
            for &ch in recognizer.opening_chars() {
                if !table[ch as usize].contains(&idx) {
                    table[ch as usize].push(idx);
                }
            }
        }
        Self {
            recognizers,
            table,
            debug_log,
            link_refs: LinkRefStore::new(),
            replacement: None,
            leaves: 0,
        }
    }

    /// Resolve the inline content of `leaf`.
    ///
    /// Afterwards the leaf's `remove_after_inlines` flag and
    /// [`take_replacement`](Self::take_replacement) tell the caller what
    /// to do with it.
    pub fn process_leaf(&mut self, leaf: &mut LeafBlock) {
        self.replacement = None;
        self.leaves += 1;

        let (inlines, remove, replacement) = {
            let mut state = InlineState::new(&leaf.content, &leaf.kind, &mut self.link_refs);
            scan(self.recognizers, &self.table, self.debug_log, &mut state);
            for recognizer in self.recognizers {
                recognizer.post_process(&mut state);
            }
            state.finish()
        };

        leaf.inlines = Some(inlines);
        if remove {
            leaf.remove_after_inlines = true;
        }
        self.replacement = replacement;
    }

    /// The node the last processed leaf asked to be replaced with.
    pub fn take_replacement(&mut self) -> Option<Block> {
        self.replacement.take()
    }

    /// Number of leaves processed so far.
    pub fn leaves_processed(&self) -> usize {
        self.leaves
    }

    /// Definitions collected across all processed leaves.
    pub fn into_link_refs(self) -> LinkRefStore {
        self.link_refs
    }
}

fn scan(
    recognizers: &[Box<dyn InlineRecognizer>],
    table: &DispatchTable,
    debug_log: Option<&DebugLog>,
    state: &mut InlineState<'_>,
) {
    let mut slice = TextSlice::new(state.content);

    while let Some(b) = slice.peek() {
        let pos = slice.offset();
        let mut matched = false;

        for &idx in &table[b as usize] {
            let recognizer = &recognizers[idx];
            let mut attempt = slice;
            state.begin_match(pos);
            if recognizer.try_match(&mut attempt, state) {
                log::trace!("{} matched at {}", recognizer.name(), pos);
                if let Some(sink) = debug_log {
                    sink(&format!("{} matched at {}", recognizer.name(), pos));
                }
                if attempt.offset() == pos {
                    attempt.bump();
                    state.end_match(pos);
                } else {
                    state.end_match(attempt.offset());
                }
                slice = attempt;
                matched = true;
                break;
            }
        }

        if !matched {
            slice.bump();
        }
    }
}

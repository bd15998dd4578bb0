//! treemark: two-pass Markdown-to-tree parser
//!
//! Lines are turned into a document tree in two decoupled passes:
//! a line-oriented block pass that builds containers and leaves, and an
//! inline pass that interprets each leaf's text. Both passes are driven
//! by pluggable recognizers collected in a [`Pipeline`].
//!
//! # Design Principles
//! - No recursion over the tree: the inline walk uses an explicit frame
//!   stack, so nesting depth is bounded by memory only
//! - Inline nodes are ranges into their leaf's text, not copies
//! - Parsing is total: every input yields a tree
//! - Per-parse state (frames, string buffers) is pooled and never shared
//!
//! # Example
//! ```
//! use treemark::{parse, Block, Inline, Pipeline};
//!
//! let doc = parse("Some *text*.\n", &Pipeline::default()).unwrap();
//! let Block::Leaf(paragraph) = &doc.children()[0] else { unreachable!() };
//! let inlines = paragraph.inlines().unwrap();
//! assert!(matches!(inlines[1], Inline::Emphasis { strong: false, .. }));
//! assert_eq!(paragraph.plain_text(), "Some text.");
//! ```

pub mod block;
pub mod cache;
pub mod error;
pub mod inline;
pub mod limits;
pub mod link_ref;
pub mod pipeline;
pub mod pool;
pub mod range;
pub mod slice;
pub mod source;
pub mod tree;
pub mod walk;

// Re-export primary types
pub use block::{process_blocks, BlockProcessor, BlockRecognizer};
pub use cache::StringCache;
pub use error::{ParseError, Result};
pub use inline::{Inline, InlineProcessor, InlineRecognizer};
pub use link_ref::{LinkRefDef, LinkRefStore};
pub use pipeline::{Pipeline, PipelineBuilder, TraversalHook};
pub use pool::FramePool;
pub use range::Range;
pub use slice::TextSlice;
pub use source::{LineSource, ReaderLines, StrLines, REPLACEMENT_CHARACTER};
pub use tree::{Block, BlockKind, ContainerBlock, Document, LeafBlock, NodeRef};
pub use walk::process_inlines;

/// Parse an in-memory string.
///
/// Lines are split on `\n`, `\r\n` and `\r`.
pub fn parse(input: &str, pipeline: &Pipeline) -> Result<Document> {
    parse_lines(StrLines::new(input), pipeline)
}

/// Parse the lines of `source` with a fresh string cache.
pub fn parse_lines<S: LineSource>(source: S, pipeline: &Pipeline) -> Result<Document> {
    let mut cache = StringCache::with_initial_capacity(pipeline.string_cache_capacity);
    parse_with_cache(source, pipeline, &mut cache)
}

/// Parse the lines of `source`, taking leaf buffers from `cache`.
///
/// Runs the block pass to completion, then the inline pass, then the
/// pipeline's completion callback (once) before returning the document.
/// Fails before reading anything if the pipeline has no block
/// recognizers.
pub fn parse_with_cache<S: LineSource>(
    source: S,
    pipeline: &Pipeline,
    cache: &mut StringCache,
) -> Result<Document> {
    if pipeline.block_recognizers.is_empty() {
        return Err(ParseError::NoBlockRecognizers);
    }

    let mut blocks = BlockProcessor::new(&pipeline.block_recognizers, cache);
    process_blocks(source, &mut blocks)?;
    let mut document = blocks.into_document();
    log::debug!("block phase built {} top-level blocks", document.children().len());

    let mut engine = InlineProcessor::new(&pipeline.inline_recognizers, pipeline.debug_log.as_ref());
    let mut pool = FramePool::new();
    process_inlines(&mut document, &mut engine, &mut pool, &pipeline.hooks);
    log::debug!(
        "inline phase processed {} leaves using {} frames",
        engine.leaves_processed(),
        pool.allocated()
    );
    pipeline.debug(&format!("processed {} leaves", engine.leaves_processed()));
    document.link_refs = engine.into_link_refs();

    if let Some(callback) = &pipeline.on_document_processed {
        callback(&document);
    }
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        let doc = parse("", &Pipeline::default()).unwrap();
        assert!(doc.children().is_empty());
    }

    #[test]
    fn test_no_block_recognizers() {
        let pipeline = PipelineBuilder::new().build();
        assert!(matches!(parse("text", &pipeline), Err(ParseError::NoBlockRecognizers)));
    }

    #[test]
    fn test_link_refs_move_to_document() {
        let doc = parse("[home]: /index.html\n\nSee home.", &Pipeline::default()).unwrap();
        assert_eq!(doc.children().len(), 1);
        assert_eq!(doc.link_refs().get("HOME").map(|d| d.url.as_str()), Some("/index.html"));
    }

    #[test]
    fn test_injected_cache_is_used() {
        let pipeline = Pipeline::default();
        let mut cache = StringCache::new();
        cache.release(String::with_capacity(4096));
        let doc = parse_with_cache(StrLines::new("text"), &pipeline, &mut cache).unwrap();
        assert!(cache.is_empty());
        assert!(doc.leaves().all(|l| l.content.capacity() >= 4096));
    }

    #[test]
    fn test_heading_levels() {
        for level in 1..=6u8 {
            let input = format!("{} Heading", "#".repeat(level as usize));
            let doc = parse(&input, &Pipeline::default()).unwrap();
            assert_eq!(doc.children()[0].kind(), &BlockKind::Heading { level });
        }
    }
}

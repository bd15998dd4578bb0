//! Parser configuration.
//!
//! A [`Pipeline`] holds the ordered recognizer lists, traversal hooks and
//! callbacks. It is immutable once built and can be shared across threads
//! and reused for any number of parses.

use std::fmt;
use std::sync::Arc;

use crate::block::{
    AtxHeadingRecognizer, BlockQuoteRecognizer, BlockRecognizer, FencedCodeRecognizer,
    ParagraphRecognizer, ThematicBreakRecognizer,
};
use crate::inline::{
    CodeSpanRecognizer, EmphasisRecognizer, EntityRecognizer, EscapeRecognizer, InlineRecognizer,
    LineBreakRecognizer, LinkReferenceRecognizer,
};
use crate::limits::DEFAULT_STRING_CAPACITY;
use crate::tree::{Document, NodeRef};

/// Sink for human-readable debug lines.
pub type DebugLog = Arc<dyn Fn(&str) + Send + Sync>;

/// Callback invoked once with every finished document.
pub type DocumentCallback = Arc<dyn Fn(&Document) + Send + Sync>;

/// Observer of the inline pass.
///
/// `on_inlines_begin` fires when the walk reaches a node and
/// `on_inlines_end` once the node (and, for containers, its whole
/// subtree) is done. Events are balanced and properly nested.
pub trait TraversalHook: Send + Sync {
    fn on_inlines_begin(&self, _node: NodeRef<'_>) {}

    fn on_inlines_end(&self, _node: NodeRef<'_>) {}
}

/// Immutable parser configuration. Build one with [`PipelineBuilder`].
pub struct Pipeline {
    pub(crate) block_recognizers: Vec<Box<dyn BlockRecognizer>>,
    pub(crate) inline_recognizers: Vec<Box<dyn InlineRecognizer>>,
    pub(crate) hooks: Vec<Box<dyn TraversalHook>>,
    pub(crate) debug_log: Option<DebugLog>,
    pub(crate) on_document_processed: Option<DocumentCallback>,
    pub(crate) string_cache_capacity: usize,
}

impl Pipeline {
    /// A builder with no recognizers.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Block recognizers, in the order they are tried.
    pub fn block_recognizers(&self) -> &[Box<dyn BlockRecognizer>] {
        &self.block_recognizers
    }

    /// Inline recognizers, in the order they are tried.
    pub fn inline_recognizers(&self) -> &[Box<dyn InlineRecognizer>] {
        &self.inline_recognizers
    }

    pub fn hooks(&self) -> &[Box<dyn TraversalHook>] {
        &self.hooks
    }

    pub(crate) fn debug(&self, message: &str) {
        if let Some(sink) = &self.debug_log {
            sink(message);
        }
    }
}

impl Default for Pipeline {
    /// The default recognizer set, no hooks or callbacks.
    fn default() -> Self {
        PipelineBuilder::with_defaults().build()
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let blocks: Vec<_> = self.block_recognizers.iter().map(|r| r.name()).collect();
        let inlines: Vec<_> = self.inline_recognizers.iter().map(|r| r.name()).collect();
        f.debug_struct("Pipeline")
            .field("block_recognizers", &blocks)
            .field("inline_recognizers", &inlines)
            .field("hooks", &self.hooks.len())
            .field("debug_log", &self.debug_log.is_some())
            .field("on_document_processed", &self.on_document_processed.is_some())
            .field("string_cache_capacity", &self.string_cache_capacity)
            .finish()
    }
}

/// Assembles a [`Pipeline`].
///
/// # Example
/// ```
/// use treemark::{parse, PipelineBuilder};
///
/// let pipeline = PipelineBuilder::with_defaults().build();
/// let doc = parse("# Hello\n", &pipeline).unwrap();
/// assert_eq!(doc.children().len(), 1);
/// ```
pub struct PipelineBuilder {
    pipeline: Pipeline,
}

impl PipelineBuilder {
    /// A builder with no recognizers.
    pub fn new() -> Self {
        Self {
            pipeline: Pipeline {
                block_recognizers: Vec::new(),
                inline_recognizers: Vec::new(),
                hooks: Vec::new(),
                debug_log: None,
                on_document_processed: None,
                string_cache_capacity: DEFAULT_STRING_CAPACITY,
            },
        }
    }

    /// A builder preloaded with the default recognizer set.
    pub fn with_defaults() -> Self {
        Self::new()
            .block(BlockQuoteRecognizer)
            .block(ThematicBreakRecognizer)
            .block(AtxHeadingRecognizer)
            .block(FencedCodeRecognizer)
            .block(ParagraphRecognizer)
            .inline(LinkReferenceRecognizer)
            .inline(CodeSpanRecognizer)
            .inline(EscapeRecognizer)
            .inline(EntityRecognizer)
            .inline(LineBreakRecognizer)
            .inline(EmphasisRecognizer)
    }

    /// Append a block recognizer.
    pub fn block(mut self, recognizer: impl BlockRecognizer + 'static) -> Self {
        self.pipeline.block_recognizers.push(Box::new(recognizer));
        self
    }

    /// Append an inline recognizer.
    pub fn inline(mut self, recognizer: impl InlineRecognizer + 'static) -> Self {
        self.pipeline.inline_recognizers.push(Box::new(recognizer));
        self
    }

    /// Register a traversal hook. Hooks run in registration order.
    pub fn hook(mut self, hook: impl TraversalHook + 'static) -> Self {
        self.pipeline.hooks.push(Box::new(hook));
        self
    }

    pub fn debug_log(mut self, sink: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.pipeline.debug_log = Some(Arc::new(sink));
        self
    }

    pub fn on_document_processed(mut self, callback: impl Fn(&Document) + Send + Sync + 'static) -> Self {
        self.pipeline.on_document_processed = Some(Arc::new(callback));
        self
    }

    /// Initial capacity of leaf content buffers when a parse creates its
    /// own string cache.
    pub fn string_cache_capacity(mut self, capacity: usize) -> Self {
        self.pipeline.string_cache_capacity = capacity;
        self
    }

    pub fn build(self) -> Pipeline {
        self.pipeline
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_pipeline_is_send_sync() {
        assert_send_sync::<Pipeline>();
    }

    #[test]
    fn test_default_order() {
        let pipeline = Pipeline::default();
        let blocks: Vec<_> = pipeline.block_recognizers().iter().map(|r| r.name()).collect();
        assert_eq!(
            blocks,
            vec!["block_quote", "thematic_break", "atx_heading", "fenced_code", "paragraph"]
        );
        let inlines: Vec<_> = pipeline.inline_recognizers().iter().map(|r| r.name()).collect();
        assert_eq!(
            inlines,
            vec!["link_reference", "code_span", "escape", "entity", "line_break", "emphasis"]
        );
    }

    #[test]
    fn test_debug_sink() {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&lines);
        let pipeline = PipelineBuilder::new()
            .debug_log(move |line| sink.lock().unwrap().push(line.to_string()))
            .build();
        pipeline.debug("hello");
        assert_eq!(*lines.lock().unwrap(), vec!["hello"]);
        assert!(format!("{pipeline:?}").contains("debug_log: true"));
    }
}

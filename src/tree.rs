//! Document tree: containers, leaves and the document root.
//!
//! Ownership is strictly hierarchical. A container exclusively owns its
//! children; a leaf owns its raw text and, after the inline pass, the
//! inline nodes produced from it.

use crate::inline::Inline;
use crate::link_ref::LinkRefStore;
use crate::Range;

/// Fence parameters of a fenced code block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenceInfo {
    /// The fence character (`` ` `` or `~`).
    pub fence_char: u8,
    /// Length of the opening fence.
    pub fence_len: usize,
    /// Indentation of the opening fence.
    pub indent: usize,
    /// Info string (language identifier and the rest).
    pub info: Option<String>,
}

/// What a block is. The set of shapes (container or leaf) is closed; the
/// set of kinds is open through [`BlockKind::Custom`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Document,
    Paragraph,
    Heading {
        /// Heading level (1-6).
        level: u8,
    },
    ThematicBreak,
    FencedCode(FenceInfo),
    BlockQuote,
    /// A block produced by a caller-supplied recognizer.
    Custom(&'static str),
}

/// A tree node.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Container(ContainerBlock),
    Leaf(LeafBlock),
}

impl Block {
    #[inline]
    pub fn kind(&self) -> &BlockKind {
        match self {
            Block::Container(c) => &c.kind,
            Block::Leaf(l) => &l.kind,
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Block::Leaf(_))
    }

    #[inline]
    pub fn is_container(&self) -> bool {
        matches!(self, Block::Container(_))
    }

    pub fn as_container(&self) -> Option<&ContainerBlock> {
        match self {
            Block::Container(c) => Some(c),
            Block::Leaf(_) => None,
        }
    }

    pub fn as_container_mut(&mut self) -> Option<&mut ContainerBlock> {
        match self {
            Block::Container(c) => Some(c),
            Block::Leaf(_) => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&LeafBlock> {
        match self {
            Block::Leaf(l) => Some(l),
            Block::Container(_) => None,
        }
    }

    pub fn as_leaf_mut(&mut self) -> Option<&mut LeafBlock> {
        match self {
            Block::Leaf(l) => Some(l),
            Block::Container(_) => None,
        }
    }

    /// Whether the inline pass should drop this block after visiting it.
    #[inline]
    pub fn remove_after_inlines(&self) -> bool {
        match self {
            Block::Container(c) => c.remove_after_inlines,
            Block::Leaf(l) => l.remove_after_inlines,
        }
    }

    #[inline]
    pub fn as_node(&self) -> NodeRef<'_> {
        match self {
            Block::Container(c) => NodeRef::Container(c),
            Block::Leaf(l) => NodeRef::Leaf(l),
        }
    }
}

impl From<ContainerBlock> for Block {
    fn from(c: ContainerBlock) -> Self {
        Block::Container(c)
    }
}

impl From<LeafBlock> for Block {
    fn from(l: LeafBlock) -> Self {
        Block::Leaf(l)
    }
}

/// A block owning an ordered sequence of child blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerBlock {
    pub kind: BlockKind,
    pub(crate) children: Vec<Block>,
    /// Drop this container (and its subtree) once the inline pass has walked it.
    pub remove_after_inlines: bool,
}

impl ContainerBlock {
    pub fn new(kind: BlockKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
            remove_after_inlines: false,
        }
    }

    pub fn with_children(kind: BlockKind, children: Vec<Block>) -> Self {
        Self {
            kind,
            children,
            remove_after_inlines: false,
        }
    }

    #[inline]
    pub fn children(&self) -> &[Block] {
        &self.children
    }

    #[inline]
    pub fn children_mut(&mut self) -> &mut Vec<Block> {
        &mut self.children
    }

    #[inline]
    pub fn push(&mut self, block: impl Into<Block>) {
        self.children.push(block.into());
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl Drop for ContainerBlock {
    // Deep trees would otherwise be torn down recursively.
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(block) = stack.pop() {
            if let Block::Container(mut container) = block {
                stack.append(&mut container.children);
            }
        }
    }
}

/// A block holding raw text awaiting inline interpretation.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafBlock {
    pub kind: BlockKind,
    pub(crate) content: String,
    pub(crate) line_count: usize,
    /// Eligible for the inline pass.
    pub process_inlines: bool,
    /// Drop this leaf once the inline pass has processed it. Leaves the
    /// pass skips are never dropped.
    pub remove_after_inlines: bool,
    pub(crate) inlines: Option<Vec<Inline>>,
}

impl LeafBlock {
    /// A leaf with no content, not eligible for inline processing.
    pub fn new(kind: BlockKind) -> Self {
        Self::with_content(kind, String::new())
    }

    /// A leaf taking over an existing buffer as its content.
    ///
    /// A non-empty buffer counts as one line.
    pub fn with_content(kind: BlockKind, content: String) -> Self {
        let line_count = usize::from(!content.is_empty());
        Self {
            kind,
            content,
            line_count,
            process_inlines: false,
            remove_after_inlines: false,
            inlines: None,
        }
    }

    /// Mark the leaf eligible for inline processing.
    pub fn with_inlines(mut self) -> Self {
        self.process_inlines = true;
        self
    }

    /// Raw text, lines joined with `\n`.
    #[inline]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[inline]
    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// Append one line of text.
    pub fn append_line(&mut self, line: &str) {
        if self.line_count > 0 {
            self.content.push('\n');
        }
        self.content.push_str(line);
        self.line_count += 1;
    }

    /// Replace the raw text.
    pub fn set_content(&mut self, content: &str) {
        self.content.clear();
        self.content.push_str(content);
        self.line_count = content.lines().count().max(usize::from(!content.is_empty()));
    }

    /// Drop trailing spaces, tabs and newlines from the content.
    pub fn trim_end(&mut self) {
        let len = self.content.trim_end_matches([' ', '\t', '\n']).len();
        self.content.truncate(len);
    }

    /// Inline nodes, once the inline pass has processed this leaf.
    #[inline]
    pub fn inlines(&self) -> Option<&[Inline]> {
        self.inlines.as_deref()
    }

    #[inline]
    pub fn set_inlines(&mut self, inlines: Vec<Inline>) {
        self.inlines = Some(inlines);
    }

    /// Text of a range into this leaf's content.
    #[inline]
    pub fn text(&self, range: Range) -> &str {
        range.text(&self.content)
    }

    /// Concatenated text of the inline nodes, without markup.
    pub fn plain_text(&self) -> String {
        let mut out = String::with_capacity(self.content.len());
        if let Some(inlines) = &self.inlines {
            for inline in inlines {
                inline.push_plain_text(&self.content, &mut out);
            }
        }
        out
    }

    pub(crate) fn take_content(&mut self) -> String {
        self.line_count = 0;
        std::mem::take(&mut self.content)
    }
}

/// Borrowed view of a node, handed to traversal hooks.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Container(&'a ContainerBlock),
    Leaf(&'a LeafBlock),
}

impl<'a> NodeRef<'a> {
    pub fn kind(&self) -> &'a BlockKind {
        match self {
            NodeRef::Container(c) => &c.kind,
            NodeRef::Leaf(l) => &l.kind,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, NodeRef::Leaf(_))
    }
}

/// The root of a parsed document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub(crate) root: ContainerBlock,
    pub(crate) link_refs: LinkRefStore,
}

impl Document {
    pub fn new() -> Self {
        Self {
            root: ContainerBlock::new(BlockKind::Document),
            link_refs: LinkRefStore::new(),
        }
    }

    /// The root container.
    #[inline]
    pub fn root(&self) -> &ContainerBlock {
        &self.root
    }

    #[inline]
    pub fn root_mut(&mut self) -> &mut ContainerBlock {
        &mut self.root
    }

    /// Top-level blocks.
    #[inline]
    pub fn children(&self) -> &[Block] {
        &self.root.children
    }

    /// Link reference definitions found during the inline pass.
    #[inline]
    pub fn link_refs(&self) -> &LinkRefStore {
        &self.link_refs
    }

    /// All blocks below the root in document (pre-)order.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: vec![self.root.children.iter()],
        }
    }

    /// All leaves in document order.
    pub fn leaves(&self) -> impl Iterator<Item = &LeafBlock> {
        self.descendants().filter_map(Block::as_leaf)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Pre-order iterator over a document's blocks.
pub struct Descendants<'a> {
    stack: Vec<std::slice::Iter<'a, Block>>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Block;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                Some(block) => {
                    if let Block::Container(c) = block {
                        self.stack.push(c.children.iter());
                    }
                    return Some(block);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn para(text: &str) -> Block {
        LeafBlock::with_content(BlockKind::Paragraph, text.to_string())
            .with_inlines()
            .into()
    }

    #[test]
    fn test_append_line_joins_with_newline() {
        let mut leaf = LeafBlock::new(BlockKind::Paragraph);
        leaf.append_line("one");
        leaf.append_line("");
        leaf.append_line("three");
        assert_eq!(leaf.content(), "one\n\nthree");
        assert_eq!(leaf.line_count(), 3);
    }

    #[test]
    fn test_append_leading_blank_line() {
        let mut leaf = LeafBlock::new(BlockKind::Paragraph);
        leaf.append_line("");
        leaf.append_line("code");
        assert_eq!(leaf.content(), "\ncode");
    }

    #[test]
    fn test_trim_end() {
        let mut leaf = LeafBlock::with_content(BlockKind::Paragraph, "text \t\n".into());
        leaf.trim_end();
        assert_eq!(leaf.content(), "text");
    }

    #[test]
    fn test_descendants_pre_order() {
        let mut doc = Document::new();
        let mut quote = ContainerBlock::new(BlockKind::BlockQuote);
        quote.push(para("inner"));
        doc.root_mut().push(para("first"));
        doc.root_mut().push(quote);
        doc.root_mut().push(para("last"));

        let kinds: Vec<_> = doc.descendants().map(|b| b.kind().clone()).collect();
        assert_eq!(
            kinds,
            vec![
                BlockKind::Paragraph,
                BlockKind::BlockQuote,
                BlockKind::Paragraph,
                BlockKind::Paragraph
            ]
        );
        let texts: Vec<_> = doc.leaves().map(LeafBlock::content).collect();
        assert_eq!(texts, vec!["first", "inner", "last"]);
    }

    #[test]
    fn test_deep_tree_drops_without_recursion() {
        let mut node = ContainerBlock::new(BlockKind::BlockQuote);
        for _ in 0..200_000 {
            let mut parent = ContainerBlock::new(BlockKind::BlockQuote);
            parent.push(node);
            node = parent;
        }
        drop(node);
    }
}

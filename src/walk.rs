//! Inline phase: an explicit-stack, pre-order walk over the document.
//!
//! Each frame owns the detached children of one container while it is on
//! the stack, so the current level can be mutated in place (leaves
//! removed or replaced, flagged containers taken out) without touching
//! the frames below it. Nesting depth is bounded by memory, not by the
//! call stack.

use std::mem;

use crate::inline::InlineProcessor;
use crate::pipeline::TraversalHook;
use crate::pool::{FrameOrigin, FramePool};
use crate::tree::{Block, Document, NodeRef};

/// Run the inline engine over every eligible leaf of `document`.
///
/// Hooks see a begin event when the walk reaches a node and an end event
/// once it is done with it; a container's end event follows those of all
/// its descendants. After a leaf is processed:
/// - if it is flagged `remove_after_inlines` it is removed and the walk
///   continues with the sibling that moved into its slot;
/// - if the engine produced a replacement it takes the leaf's place and
///   the walk continues after it (the replacement is not walked).
///
/// A container flagged `remove_after_inlines` is taken out of the tree
/// before its subtree is walked; its hooks still fire.
pub fn process_inlines(
    document: &mut Document,
    engine: &mut InlineProcessor<'_>,
    pool: &mut FramePool,
    hooks: &[Box<dyn TraversalHook>],
) {
    begin(hooks, NodeRef::Container(&document.root));
    let mut root = pool.acquire();
    root.children = mem::take(&mut document.root.children);
    root.origin = FrameOrigin::Root;
    let mut stack = vec![root];

    'frames: while let Some(top) = stack.last_mut() {
        while top.cursor < top.children.len() {
            let i = top.cursor;

            if top.children[i].is_leaf() {
                let (remove, replacement) = match &mut top.children[i] {
                    Block::Leaf(leaf) => {
                        begin(hooks, NodeRef::Leaf(leaf));
                        if leaf.process_inlines {
                            engine.process_leaf(leaf);
                            (leaf.remove_after_inlines, engine.take_replacement())
                        } else {
                            (false, None)
                        }
                    }
                    Block::Container(_) => (false, None),
                };

                if remove {
                    let removed = top.children.remove(i);
                    end(hooks, removed.as_node());
                } else if let Some(replacement) = replacement {
                    let original = mem::replace(&mut top.children[i], replacement);
                    end(hooks, original.as_node());
                    top.cursor += 1;
                } else {
                    end(hooks, top.children[i].as_node());
                    top.cursor += 1;
                }
                continue;
            }

            let mut frame = pool.acquire();
            if top.children[i].remove_after_inlines() {
                let block = top.children.remove(i);
                begin(hooks, block.as_node());
                if let Block::Container(mut container) = block {
                    frame.children = mem::take(&mut container.children);
                    frame.origin = FrameOrigin::Removed(container);
                }
            } else {
                top.cursor += 1;
                begin(hooks, top.children[i].as_node());
                if let Block::Container(container) = &mut top.children[i] {
                    frame.children = mem::take(&mut container.children);
                }
                frame.origin = FrameOrigin::Slot(i);
            }
            stack.push(frame);
            continue 'frames;
        }

        let Some(mut frame) = stack.pop() else {
            break;
        };
        let children = mem::take(&mut frame.children);
        match mem::take(&mut frame.origin) {
            FrameOrigin::Root => {
                document.root.children = children;
                end(hooks, NodeRef::Container(&document.root));
            }
            FrameOrigin::Slot(idx) => {
                let parent = stack.last_mut().and_then(|f| f.children.get_mut(idx));
                if let Some(Block::Container(container)) = parent {
                    container.children = children;
                    end(hooks, NodeRef::Container(container));
                }
            }
            FrameOrigin::Removed(mut container) => {
                container.children = children;
                end(hooks, NodeRef::Container(&container));
            }
        }
        pool.release(frame);
    }
}

fn begin(hooks: &[Box<dyn TraversalHook>], node: NodeRef<'_>) {
    for hook in hooks {
        hook.on_inlines_begin(node);
    }
}

fn end(hooks: &[Box<dyn TraversalHook>], node: NodeRef<'_>) {
    for hook in hooks {
        hook.on_inlines_end(node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inline::{InlineRecognizer, InlineState};
    use crate::tree::{BlockKind, ContainerBlock, LeafBlock};
    use crate::TextSlice;
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};

    /// Records hook events as `+kind` / `-kind` strings.
    #[derive(Clone, Default)]
    struct Recorder {
        events: Arc<Mutex<Vec<String>>>,
    }

    impl Recorder {
        fn label(node: NodeRef<'_>) -> String {
            match node {
                NodeRef::Leaf(leaf) => leaf.content().to_string(),
                NodeRef::Container(c) => match &c.kind {
                    BlockKind::Custom(name) => (*name).to_string(),
                    other => format!("{other:?}"),
                },
            }
        }

        fn take(&self) -> Vec<String> {
            std::mem::take(&mut *self.events.lock().unwrap())
        }
    }

    impl TraversalHook for Recorder {
        fn on_inlines_begin(&self, node: NodeRef<'_>) {
            self.events.lock().unwrap().push(format!("+{}", Self::label(node)));
        }

        fn on_inlines_end(&self, node: NodeRef<'_>) {
            self.events.lock().unwrap().push(format!("-{}", Self::label(node)));
        }
    }

    /// `!drop` removes the leaf, `!swap` replaces it with a leaf, `!nest`
    /// with a container. Anything else is kept.
    struct Commands;

    impl InlineRecognizer for Commands {
        fn name(&self) -> &'static str {
            "commands"
        }

        fn opening_chars(&self) -> &[u8] {
            b"!"
        }

        fn try_match(&self, slice: &mut TextSlice<'_>, state: &mut InlineState<'_>) -> bool {
            if slice.eat_bytes(b"!drop") {
                state.remove_leaf();
                true
            } else if slice.eat_bytes(b"!swap") {
                state.replace_block(LeafBlock::with_content(BlockKind::Custom("swapped"), "swapped".into()).into());
                true
            } else if slice.eat_bytes(b"!nest") {
                state.replace_block(container("nested", vec![leaf("inner one"), leaf("!drop")]));
                true
            } else {
                false
            }
        }
    }

    fn leaf(text: &str) -> Block {
        LeafBlock::with_content(BlockKind::Paragraph, text.to_string())
            .with_inlines()
            .into()
    }

    fn container(name: &'static str, children: Vec<Block>) -> Block {
        ContainerBlock::with_children(BlockKind::Custom(name), children).into()
    }

    fn document(children: Vec<Block>) -> Document {
        let mut doc = Document::new();
        for child in children {
            doc.root_mut().push(child);
        }
        doc
    }

    fn walk(doc: &mut Document) -> (Vec<String>, FramePool) {
        let recorder = Recorder::default();
        let hooks: Vec<Box<dyn TraversalHook>> = vec![Box::new(recorder.clone())];
        let recognizers: Vec<Box<dyn InlineRecognizer>> = vec![Box::new(Commands)];
        let mut engine = InlineProcessor::new(&recognizers, None);
        let mut pool = FramePool::new();
        process_inlines(doc, &mut engine, &mut pool, &hooks);
        (recorder.take(), pool)
    }

    fn contents(doc: &Document) -> Vec<String> {
        doc.descendants()
            .map(|b| match b {
                Block::Leaf(l) => l.content().to_string(),
                Block::Container(c) => format!("{:?}", c.kind),
            })
            .collect()
    }

    #[test]
    fn test_hooks_are_balanced_and_nested() {
        let mut doc = document(vec![
            leaf("a"),
            container("q", vec![leaf("b"), container("r", vec![leaf("c")])]),
            leaf("d"),
        ]);
        let (events, _) = walk(&mut doc);
        assert_eq!(
            events,
            vec![
                "+Document", "+a", "-a", "+q", "+b", "-b", "+r", "+c", "-c", "-r", "-q", "+d", "-d",
                "-Document"
            ]
        );
        assert!(doc.leaves().all(|l| l.inlines().is_some()));
    }

    #[test]
    fn test_remove_leaf_does_not_skip_sibling() {
        let mut doc = document(vec![leaf("!drop"), leaf("!drop"), leaf("kept")]);
        let (events, _) = walk(&mut doc);
        assert_eq!(
            events,
            vec!["+Document", "+!drop", "-!drop", "+!drop", "-!drop", "+kept", "-kept", "-Document"]
        );
        assert_eq!(contents(&doc), vec!["kept"]);
    }

    #[test]
    fn test_replace_leaf_in_place() {
        let mut doc = document(vec![leaf("one"), leaf("!swap"), leaf("three")]);
        let (events, _) = walk(&mut doc);
        assert_eq!(
            events,
            vec!["+Document", "+one", "-one", "+!swap", "-!swap", "+three", "-three", "-Document"]
        );
        assert_eq!(contents(&doc), vec!["one", "swapped", "three"]);
        // The replacement is not walked.
        assert!(doc.children()[1].as_leaf().is_some_and(|l| l.inlines().is_none()));
    }

    #[test]
    fn test_replace_leaf_with_container() {
        let mut doc = document(vec![leaf("one"), leaf("!nest"), leaf("three")]);
        let (events, _) = walk(&mut doc);
        assert_eq!(
            events,
            vec!["+Document", "+one", "-one", "+!nest", "-!nest", "+three", "-three", "-Document"]
        );
        assert_eq!(
            contents(&doc),
            vec!["one", "Custom(\"nested\")", "inner one", "!drop", "three"]
        );
        // The replacement subtree is left unprocessed.
        let nested = doc.children()[1].as_container().unwrap();
        assert_eq!(nested.len(), 2);
        assert!(nested.children().iter().all(|b| b.as_leaf().is_some_and(|l| l.inlines().is_none())));
        assert!(doc.children()[2].as_leaf().is_some_and(|l| l.inlines().is_some()));
    }

    #[test]
    fn test_removed_container_subtree_is_still_walked() {
        let mut flagged = ContainerBlock::with_children(BlockKind::Custom("gone"), vec![leaf("inside")]);
        flagged.remove_after_inlines = true;
        let mut doc = document(vec![flagged.into(), leaf("after")]);
        let (events, _) = walk(&mut doc);
        assert_eq!(
            events,
            vec!["+Document", "+gone", "+inside", "-inside", "-gone", "+after", "-after", "-Document"]
        );
        assert_eq!(contents(&doc), vec!["after"]);
    }

    #[test]
    fn test_ineligible_leaf_is_visited_but_not_processed() {
        let mut doc = document(vec![LeafBlock::with_content(BlockKind::ThematicBreak, "!drop".into()).into()]);
        let (events, _) = walk(&mut doc);
        assert_eq!(events, vec!["+Document", "+!drop", "-!drop", "-Document"]);
        assert!(doc.leaves().all(|l| l.inlines().is_none()));
    }

    #[test]
    fn test_ineligible_leaf_keeps_remove_flag_only() {
        let mut flagged = LeafBlock::with_content(BlockKind::ThematicBreak, "flagged".into());
        flagged.remove_after_inlines = true;
        let mut doc = document(vec![flagged.into(), leaf("!drop"), leaf("kept")]);
        let (events, _) = walk(&mut doc);
        assert_eq!(
            events,
            vec!["+Document", "+flagged", "-flagged", "+!drop", "-!drop", "+kept", "-kept", "-Document"]
        );
        assert_eq!(contents(&doc), vec!["flagged", "kept"]);
    }

    #[test]
    fn test_empty_document() {
        let mut doc = Document::new();
        let (events, pool) = walk(&mut doc);
        assert_eq!(events, vec!["+Document", "-Document"]);
        assert_eq!(pool.allocated(), 1);
    }

    #[test]
    fn test_siblings_reuse_frames() {
        let children = (0..100).map(|_| container("q", vec![leaf("x")])).collect();
        let mut doc = document(children);
        let (_, pool) = walk(&mut doc);
        assert_eq!(pool.allocated(), 2);
    }

    #[test]
    fn test_deep_nesting_walks_iteratively() {
        let depth = 10_000;
        let mut node = ContainerBlock::with_children(BlockKind::Custom("q"), vec![leaf("deep")]);
        for _ in 1..depth {
            node = ContainerBlock::with_children(BlockKind::Custom("q"), vec![node.into()]);
        }
        let mut doc = document(vec![node.into()]);

        let (events, pool) = walk(&mut doc);
        assert_eq!(events.len(), 2 * (depth + 2));
        // One frame per level, root included.
        assert_eq!(pool.allocated(), depth + 1);
        assert_eq!(doc.leaves().count(), 1);
    }
}

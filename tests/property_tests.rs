//! Property tests over arbitrary Markdown-ish input.

use std::sync::{Arc, Mutex};

use proptest::prelude::*;
use treemark::{parse, Block, Inline, NodeRef, Pipeline, PipelineBuilder, TraversalHook};

/// Lines built from the characters the default recognizers react to.
fn markdownish() -> impl Strategy<Value = String> {
    let line = prop::collection::vec(
        prop_oneof![
            Just("*"),
            Just("**"),
            Just("_"),
            Just("`"),
            Just("> "),
            Just("# "),
            Just("---"),
            Just("```"),
            Just("\\"),
            Just("&amp;"),
            Just("&#0;"),
            Just("[a]: /u"),
            Just("[é]: <\\é>"),
            Just("[b]: /é \"\\é\""),
            Just("[c]: /u ('ü\\é')"),
            Just("  "),
            Just("\0"),
            Just("é"),
            Just("word"),
        ],
        0..12,
    )
    .prop_map(|parts| parts.concat());
    prop::collection::vec(line, 0..12).prop_map(|lines| lines.join("\n"))
}

/// Checks that begin/end events are balanced and properly nested.
#[derive(Clone, Default)]
struct Balance(Arc<Mutex<(Vec<String>, bool)>>);

impl TraversalHook for Balance {
    fn on_inlines_begin(&self, node: NodeRef<'_>) {
        self.0.lock().unwrap().0.push(format!("{:?}", node.kind()));
    }

    fn on_inlines_end(&self, node: NodeRef<'_>) {
        let mut state = self.0.lock().unwrap();
        let expected = format!("{:?}", node.kind());
        if state.0.pop().as_deref() != Some(expected.as_str()) {
            state.1 = true;
        }
    }
}

fn no_delimiters(inlines: &[Inline]) -> bool {
    inlines.iter().all(|inline| match inline {
        Inline::Delimiter(_) => false,
        Inline::Emphasis { children, .. } => no_delimiters(children),
        _ => true,
    })
}

proptest! {
    #[test]
    fn parsing_is_deterministic(input in markdownish()) {
        let pipeline = Pipeline::default();
        let first = parse(&input, &pipeline).unwrap();
        let second = parse(&input, &pipeline).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn hooks_are_balanced(input in markdownish()) {
        let balance = Balance::default();
        let pipeline = PipelineBuilder::with_defaults().hook(balance.clone()).build();
        parse(&input, &pipeline).unwrap();
        let state = balance.0.lock().unwrap();
        prop_assert!(state.0.is_empty());
        prop_assert!(!state.1);
    }

    #[test]
    fn tree_is_fully_resolved(input in markdownish()) {
        let doc = parse(&input, &Pipeline::default()).unwrap();
        for block in doc.descendants() {
            prop_assert!(!block.remove_after_inlines());
            if let Block::Leaf(leaf) = block {
                prop_assert!(!leaf.content().contains('\0'));
                if leaf.process_inlines {
                    let inlines = leaf.inlines().unwrap_or_default();
                    prop_assert!(leaf.inlines().is_some());
                    prop_assert!(no_delimiters(inlines));
                }
            }
        }
    }
}

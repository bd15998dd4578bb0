//! Emphasis and strong emphasis.
//!
//! The scan only records delimiter runs with their CommonMark flanking
//! flags. Matching happens in `post_process`: closers are paired with the
//! nearest compatible opener (rule of three included), then the flat
//! node list is folded into nested emphasis nodes.

use smallvec::SmallVec;

use super::node::merge_literals;
use super::{DelimiterRun, Inline, InlineRecognizer, InlineState};
use crate::limits::MAX_DELIMITER_RUNS;
use crate::{Range, TextSlice};

#[derive(Debug, Default, Clone, Copy)]
pub struct EmphasisRecognizer;

impl EmphasisRecognizer {
    pub fn new() -> Self {
        Self
    }
}

impl InlineRecognizer for EmphasisRecognizer {
    fn name(&self) -> &'static str {
        "emphasis"
    }

    fn opening_chars(&self) -> &[u8] {
        b"*_"
    }

    fn try_match(&self, slice: &mut TextSlice<'_>, state: &mut InlineState<'_>) -> bool {
        if state.delimiter_runs() >= MAX_DELIMITER_RUNS {
            return false;
        }
        let Some(ch) = slice.peek() else {
            return false;
        };
        let start = slice.offset();
        let len = slice.run_length(ch);
        let before = slice.char_before();
        let after = slice.char_at(start + len);
        let (can_open, can_close) = flanking(ch, before, after);

        slice.advance(len);
        state.push(Inline::Delimiter(DelimiterRun {
            ch,
            range: Range::from_usize(start, start + len),
            can_open,
            can_close,
        }));
        true
    }

    fn post_process(&self, state: &mut InlineState<'_>) {
        resolve_emphasis(state.inlines_mut());
    }
}

/// Opener/closer ability of a delimiter run, from the characters around it.
/// Start and end of text count as whitespace.
fn flanking(ch: u8, before: Option<char>, after: Option<char>) -> (bool, bool) {
    let before_space = before.is_none_or(char::is_whitespace);
    let after_space = after.is_none_or(char::is_whitespace);
    let before_punct = before.is_some_and(is_punctuation);
    let after_punct = after.is_some_and(is_punctuation);

    let left_flanking = !after_space && (!after_punct || before_space || before_punct);
    let right_flanking = !before_space && (!before_punct || after_space || after_punct);

    if ch == b'*' {
        (left_flanking, right_flanking)
    } else {
        (
            left_flanking && (!right_flanking || before_punct),
            right_flanking && (!left_flanking || after_punct),
        )
    }
}

fn is_punctuation(ch: char) -> bool {
    ch.is_ascii_punctuation() || (!ch.is_ascii() && !ch.is_alphanumeric() && !ch.is_whitespace())
}

/// A delimiter run being matched. Closers consume from `lo`, openers
/// from `hi`.
#[derive(Debug, Clone, Copy)]
struct Run {
    ch: u8,
    lo: u32,
    hi: u32,
    orig_len: u32,
    can_open: bool,
    can_close: bool,
}

impl Run {
    #[inline]
    fn remaining(&self) -> u32 {
        self.hi - self.lo
    }
}

#[derive(Debug, Clone, Copy)]
struct EmphasisMatch {
    ch: u8,
    count: u32,
    opener_run: usize,
    opener: Range,
    closer_run: usize,
    closer: Range,
}

/// Replace delimiter runs in `inlines` by nested emphasis nodes.
pub(crate) fn resolve_emphasis(inlines: &mut Vec<Inline>) {
    let mut runs: Vec<Run> = Vec::new();
    let mut run_of_node: Vec<Option<usize>> = Vec::with_capacity(inlines.len());
    for inline in inlines.iter() {
        if let Inline::Delimiter(d) = inline {
            run_of_node.push(Some(runs.len()));
            runs.push(Run {
                ch: d.ch,
                lo: d.range.start,
                hi: d.range.end,
                orig_len: d.range.len(),
                can_open: d.can_open,
                can_close: d.can_close,
            });
        } else {
            run_of_node.push(None);
        }
    }
    if runs.is_empty() {
        return;
    }

    let matches = match_runs(&mut runs);
    let events = build_events(std::mem::take(inlines), &run_of_node, &runs, &matches);
    *inlines = fold_events(events, &matches);
}

fn match_runs(runs: &mut [Run]) -> Vec<EmphasisMatch> {
    let mut matches = Vec::new();
    let mut openers: Vec<usize> = Vec::new();

    for c in 0..runs.len() {
        if runs[c].can_close {
            while runs[c].remaining() > 0 {
                let closer = runs[c];
                let Some(pos) = openers
                    .iter()
                    .rposition(|&o| compatible(&runs[o], &closer))
                else {
                    break;
                };
                let o = openers[pos];
                let count = if runs[o].remaining() >= 2 && closer.remaining() >= 2 { 2 } else { 1 };

                let opener = Range::new(runs[o].hi - count, runs[o].hi);
                runs[o].hi -= count;
                let closer_range = Range::new(runs[c].lo, runs[c].lo + count);
                runs[c].lo += count;
                matches.push(EmphasisMatch {
                    ch: closer.ch,
                    count,
                    opener_run: o,
                    opener,
                    closer_run: c,
                    closer: closer_range,
                });

                // Openers between the pair can no longer match.
                openers.truncate(pos + 1);
                if runs[o].remaining() == 0 {
                    openers.pop();
                }
            }
        }
        if runs[c].can_open && runs[c].remaining() > 0 {
            openers.push(c);
        }
    }
    matches
}

fn compatible(opener: &Run, closer: &Run) -> bool {
    if opener.ch != closer.ch || opener.remaining() == 0 {
        return false;
    }
    // Rule of three.
    let odd_match = (closer.can_open || opener.can_close)
        && closer.orig_len % 3 != 0
        && (opener.orig_len + closer.orig_len) % 3 == 0;
    !odd_match
}

enum Event {
    Node(Inline),
    Literal(Range),
    Open(usize),
    Close(usize),
}

fn build_events(
    inlines: Vec<Inline>,
    run_of_node: &[Option<usize>],
    runs: &[Run],
    matches: &[EmphasisMatch],
) -> Vec<Event> {
    // Open/close markers grouped by the run they were cut from.
    let mut markers: Vec<SmallVec<[(u32, Event); 4]>> = (0..runs.len()).map(|_| SmallVec::new()).collect();
    for (id, m) in matches.iter().enumerate() {
        markers[m.opener_run].push((m.opener.start, Event::Open(id)));
        markers[m.closer_run].push((m.closer.start, Event::Close(id)));
    }

    let mut events = Vec::with_capacity(inlines.len() + matches.len() * 2);
    for (inline, run_idx) in inlines.into_iter().zip(run_of_node) {
        let run_idx = match (&inline, run_idx) {
            (Inline::Delimiter(_), Some(idx)) => *idx,
            _ => {
                events.push(Event::Node(inline));
                continue;
            }
        };
        let run = &runs[run_idx];
        let mut segments = std::mem::take(&mut markers[run_idx]);
        if run.lo < run.hi {
            segments.push((run.lo, Event::Literal(Range::new(run.lo, run.hi))));
        }
        segments.sort_by_key(|(pos, _)| *pos);
        events.extend(segments.into_iter().map(|(_, event)| event));
    }
    events
}

fn fold_events(events: Vec<Event>, matches: &[EmphasisMatch]) -> Vec<Inline> {
    let mut stack: SmallVec<[(Option<usize>, Vec<Inline>); 8]> = SmallVec::new();
    stack.push((None, Vec::new()));

    for event in events {
        match event {
            Event::Node(inline) => push_top(&mut stack, inline),
            Event::Literal(range) => push_top(&mut stack, Inline::Literal(range)),
            Event::Open(id) => stack.push((Some(id), Vec::new())),
            Event::Close(id) => {
                let closes_top = stack.len() > 1 && stack.last().is_some_and(|(open, _)| *open == Some(id));
                match stack.pop() {
                    Some((_, mut children)) if closes_top => {
                        merge_literals(&mut children);
                        let m = &matches[id];
                        push_top(
                            &mut stack,
                            Inline::Emphasis {
                                delimiter: m.ch,
                                strong: m.count == 2,
                                children,
                            },
                        );
                    }
                    Some(frame) => {
                        stack.push(frame);
                        push_top(&mut stack, Inline::Literal(matches[id].closer));
                    }
                    None => {}
                }
            }
        }
    }

    // Unbalanced openers cannot occur for well-formed matches; flatten them.
    while stack.len() > 1 {
        if let Some((open, children)) = stack.pop() {
            if let Some(id) = open {
                push_top(&mut stack, Inline::Literal(matches[id].opener));
            }
            for child in children {
                push_top(&mut stack, child);
            }
        }
    }

    let mut out = stack.pop().map(|(_, children)| children).unwrap_or_default();
    merge_literals(&mut out);
    out
}

fn push_top(stack: &mut SmallVec<[(Option<usize>, Vec<Inline>); 8]>, inline: Inline) {
    if let Some((_, children)) = stack.last_mut() {
        children.push(inline);
    }
}

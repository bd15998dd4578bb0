//! Link reference definitions at the start of a paragraph.
//!
//! Definitions are moved into the document's [`LinkRefStore`]; their
//! text does not produce inline nodes. A paragraph that consists only of
//! definitions asks to be removed from the tree.
//!
//! [`LinkRefStore`]: crate::LinkRefStore

use super::{InlineRecognizer, InlineState};
use crate::limits::MAX_LINK_LABEL_LEN;
use crate::link_ref::LinkRefDef;
use crate::tree::BlockKind;
use crate::TextSlice;

#[derive(Debug, Default, Clone, Copy)]
pub struct LinkReferenceRecognizer;

impl LinkReferenceRecognizer {
    pub fn new() -> Self {
        Self
    }
}

impl InlineRecognizer for LinkReferenceRecognizer {
    fn name(&self) -> &'static str {
        "link_reference"
    }

    fn opening_chars(&self) -> &[u8] {
        b"["
    }

    fn try_match(&self, slice: &mut TextSlice<'_>, state: &mut InlineState<'_>) -> bool {
        if slice.offset() != 0 || *state.leaf_kind() != BlockKind::Paragraph {
            return false;
        }

        let mut cursor = *slice;
        let mut found = 0;
        while cursor.at(b'[') {
            let mut attempt = cursor;
            let Some(def) = parse_definition(&mut attempt) else {
                break;
            };
            log::trace!("link reference definition [{}]", def.label);
            state.link_refs_mut().insert(def);
            found += 1;
            cursor = attempt;
        }
        if found == 0 {
            return false;
        }

        *slice = cursor;
        state.mark_consumed();
        if slice.is_empty() {
            state.remove_leaf();
        }
        true
    }
}

/// Parse one definition, leaving the slice after its line terminator.
fn parse_definition(slice: &mut TextSlice<'_>) -> Option<LinkRefDef> {
    let label = parse_label(slice)?;
    if !slice.eat(b':') {
        return None;
    }
    skip_space_and_newline(slice);
    let url = parse_destination(slice)?;

    // A title must be separated from the destination by whitespace and
    // be followed by the end of its line; otherwise the definition ends
    // after the destination.
    let after_dest = *slice;
    let had_space = skip_space_and_newline(slice);
    if had_space {
        if let Some(title) = parse_title(slice) {
            if finish_line(slice) {
                return Some(LinkRefDef { label, url, title: Some(title) });
            }
        }
    }

    *slice = after_dest;
    if finish_line(slice) {
        Some(LinkRefDef { label, url, title: None })
    } else {
        None
    }
}

fn parse_label(slice: &mut TextSlice<'_>) -> Option<String> {
    if !slice.eat(b'[') {
        return None;
    }
    let start = slice.offset();
    loop {
        match slice.peek()? {
            b']' => break,
            b'[' => return None,
            b'\\' => {
                slice.advance(1);
                if slice.at_any(b"[]\\") {
                    slice.advance(1);
                }
            }
            _ => slice.bump(),
        }
        if slice.offset() - start > MAX_LINK_LABEL_LEN {
            return None;
        }
    }
    let label = slice.source().get(start..slice.offset())?;
    slice.advance(1);
    if label.trim().is_empty() {
        return None;
    }
    Some(label.to_string())
}

fn parse_destination(slice: &mut TextSlice<'_>) -> Option<String> {
    if slice.eat(b'<') {
        let start = slice.offset();
        loop {
            match slice.peek()? {
                b'>' => break,
                b'<' | b'\n' => return None,
                b'\\' => {
                    slice.advance(1);
                    slice.bump();
                }
                _ => slice.bump(),
            }
        }
        let url = slice.source().get(start..slice.offset())?;
        slice.advance(1);
        return Some(unescape(url));
    }

    let start = slice.offset();
    let mut depth = 0usize;
    while let Some(b) = slice.peek() {
        match b {
            b' ' | b'\t' | b'\n' => break,
            b if b.is_ascii_control() => break,
            b'(' => depth += 1,
            b')' if depth == 0 => break,
            b')' => depth -= 1,
            b'\\' if slice.peek_ahead(1).is_some_and(|n| n.is_ascii_punctuation()) => {
                slice.advance(1);
            }
            _ => {}
        }
        slice.bump();
    }
    if depth != 0 || slice.offset() == start {
        return None;
    }
    slice.source().get(start..slice.offset()).map(unescape)
}

fn parse_title(slice: &mut TextSlice<'_>) -> Option<String> {
    let close = match slice.peek()? {
        b'"' => b'"',
        b'\'' => b'\'',
        b'(' => b')',
        _ => return None,
    };
    slice.advance(1);
    let start = slice.offset();
    loop {
        match slice.peek()? {
            b if b == close => break,
            b'(' if close == b')' => return None,
            b'\\' => {
                slice.advance(1);
                slice.bump();
            }
            _ => slice.bump(),
        }
    }
    let title = slice.source().get(start..slice.offset())?;
    slice.advance(1);
    Some(unescape(title))
}

/// Skip spaces and at most one newline; returns whether anything was skipped.
fn skip_space_and_newline(slice: &mut TextSlice<'_>) -> bool {
    let mut skipped = slice.skip_whitespace();
    if slice.eat(b'\n') {
        skipped += 1 + slice.skip_whitespace();
    }
    skipped > 0
}

/// Only spaces may remain on the line; consume them and the newline.
fn finish_line(slice: &mut TextSlice<'_>) -> bool {
    slice.skip_whitespace();
    slice.is_empty() || slice.eat(b'\n')
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(&next) = chars.peek() {
                if next.is_ascii_punctuation() {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(ch);
    }
    html_escape::decode_html_entities(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inline::{Inline, InlineProcessor};
    use crate::tree::LeafBlock;

    fn definition(text: &str) -> Option<LinkRefDef> {
        let mut slice = TextSlice::new(text);
        parse_definition(&mut slice)
    }

    #[test]
    fn test_simple_definition() {
        let def = definition("[Foo]: /url").unwrap();
        assert_eq!(def.label, "Foo");
        assert_eq!(def.url, "/url");
        assert_eq!(def.title, None);
    }

    #[test]
    fn test_definition_with_titles() {
        assert_eq!(definition("[a]: /u \"t\"").unwrap().title.as_deref(), Some("t"));
        assert_eq!(definition("[a]: /u 't'").unwrap().title.as_deref(), Some("t"));
        assert_eq!(definition("[a]: /u (t)").unwrap().title.as_deref(), Some("t"));
        assert_eq!(definition("[a]:\n/u\n\"t\"").unwrap().title.as_deref(), Some("t"));
    }

    #[test]
    fn test_angle_destination() {
        assert_eq!(definition("[a]: <my url>").unwrap().url, "my url");
    }

    #[test]
    fn test_escaped_multibyte_character() {
        assert_eq!(definition("[a]: <\\é>").unwrap().url, "\\é");
        assert_eq!(definition("[a]: /u \"\\é\"").unwrap().title.as_deref(), Some("\\é"));
        assert_eq!(definition("[a]: <ü\\>>").unwrap().url, "ü>");
    }

    #[test]
    fn test_invalid_definitions() {
        assert!(definition("[]: /u").is_none());
        assert!(definition("[a] /u").is_none());
        assert!(definition("[a]:").is_none());
        assert!(definition("[a]: /u \"t\" junk").is_none());
        assert!(definition("[a]: /u junk").is_none());
    }

    #[test]
    fn test_bad_title_falls_back_to_line_end() {
        let mut slice = TextSlice::new("[a]: /u\n\"no close");
        let def = parse_definition(&mut slice).unwrap();
        assert_eq!(def.title, None);
        assert_eq!(slice.as_str(), "\"no close");
    }

    fn process(text: &str) -> (LeafBlock, crate::LinkRefStore) {
        let recognizers: Vec<Box<dyn InlineRecognizer>> = vec![Box::new(LinkReferenceRecognizer)];
        let mut leaf = LeafBlock::with_content(BlockKind::Paragraph, text.to_string());
        let mut processor = InlineProcessor::new(&recognizers, None);
        processor.process_leaf(&mut leaf);
        (leaf, processor.into_link_refs())
    }

    #[test]
    fn test_definition_only_paragraph_is_removed() {
        let (leaf, refs) = process("[a]: /one\n[b]: /two 'T'");
        assert!(leaf.remove_after_inlines);
        assert_eq!(leaf.inlines(), Some(&[][..]));
        assert_eq!(refs.len(), 2);
        assert_eq!(refs.get("B").and_then(|d| d.title.as_deref()), Some("T"));
    }

    #[test]
    fn test_trailing_text_stays() {
        let (leaf, refs) = process("[a]: /one\nbody text");
        assert!(!leaf.remove_after_inlines);
        assert_eq!(refs.len(), 1);
        assert_eq!(leaf.plain_text(), "body text");
        assert!(matches!(leaf.inlines().unwrap(), [Inline::Literal(_)]));
    }

    #[test]
    fn test_only_at_paragraph_start() {
        let (leaf, refs) = process("text [a]: /one");
        assert!(refs.is_empty());
        assert_eq!(leaf.plain_text(), "text [a]: /one");
    }
}

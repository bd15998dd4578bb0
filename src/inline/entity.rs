//! Entity and numeric character references (`&amp;`, `&#35;`, `&#x22;`).

use super::{Inline, InlineRecognizer, InlineState};
use crate::limits::MAX_ENTITY_LEN;
use crate::source::REPLACEMENT_CHARACTER;
use crate::{Range, TextSlice};

#[derive(Debug, Default, Clone, Copy)]
pub struct EntityRecognizer;

impl EntityRecognizer {
    pub fn new() -> Self {
        Self
    }
}

impl InlineRecognizer for EntityRecognizer {
    fn name(&self) -> &'static str {
        "entity"
    }

    fn opening_chars(&self) -> &[u8] {
        b"&"
    }

    fn try_match(&self, slice: &mut TextSlice<'_>, state: &mut InlineState<'_>) -> bool {
        let Some(semi) = slice.find(b';') else {
            return false;
        };
        if semi + 1 > MAX_ENTITY_LEN {
            return false;
        }
        let candidate = &slice.as_str()[..=semi];
        if !is_reference_syntax(candidate) {
            return false;
        }

        let decoded = html_escape::decode_html_entities(candidate);
        if decoded == candidate {
            return false;
        }
        // NUL and invalid code points decode to U+FFFD.
        let decoded = if decoded.is_empty() || decoded.contains('\0') {
            REPLACEMENT_CHARACTER.to_string()
        } else {
            decoded.into_owned()
        };

        let start = slice.offset();
        slice.advance(semi + 1);
        state.push(Inline::Entity {
            range: Range::from_usize(start, start + semi + 1),
            decoded,
        });
        true
    }
}

/// `&name;`, `&#digits;` (1-7 digits) or `&#xhex;` (1-6 hex digits).
fn is_reference_syntax(candidate: &str) -> bool {
    let Some(body) = candidate.strip_prefix('&').and_then(|s| s.strip_suffix(';')) else {
        return false;
    };
    if let Some(num) = body.strip_prefix('#') {
        if let Some(hex) = num.strip_prefix(['x', 'X']) {
            (1..=6).contains(&hex.len()) && hex.bytes().all(|b| b.is_ascii_hexdigit())
        } else {
            (1..=7).contains(&num.len()) && num.bytes().all(|b| b.is_ascii_digit())
        }
    } else {
        body.as_bytes().first().is_some_and(u8::is_ascii_alphabetic)
            && body.bytes().all(|b| b.is_ascii_alphanumeric())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inline::InlineProcessor;
    use crate::tree::{BlockKind, LeafBlock};

    fn entities(text: &str) -> Vec<String> {
        let recognizers: Vec<Box<dyn InlineRecognizer>> = vec![Box::new(EntityRecognizer)];
        let mut leaf = LeafBlock::with_content(BlockKind::Paragraph, text.to_string());
        InlineProcessor::new(&recognizers, None).process_leaf(&mut leaf);
        leaf.inlines()
            .unwrap_or_default()
            .iter()
            .filter_map(|i| match i {
                Inline::Entity { decoded, .. } => Some(decoded.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_named_entity() {
        assert_eq!(entities("a &amp; b"), vec!["&"]);
        assert_eq!(entities("&auml;"), vec!["ä"]);
    }

    #[test]
    fn test_numeric_entities() {
        assert_eq!(entities("&#35; &#x22;"), vec!["#", "\""]);
    }

    #[test]
    fn test_unknown_entity_is_literal() {
        assert!(entities("&nosuchentity;").is_empty());
        assert!(entities("& amp;").is_empty());
        assert!(entities("&amp").is_empty());
    }

    #[test]
    fn test_reference_syntax() {
        assert!(is_reference_syntax("&copy;"));
        assert!(is_reference_syntax("&#1234567;"));
        assert!(!is_reference_syntax("&#12345678;"));
        assert!(is_reference_syntax("&#XaF;"));
        assert!(!is_reference_syntax("&#x;"));
        assert!(!is_reference_syntax("&1a;"));
    }
}

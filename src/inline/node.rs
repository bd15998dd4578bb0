//! Inline node types.

use crate::Range;

/// Inline content of a leaf. Ranges point into the owning leaf's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    /// Plain text.
    Literal(Range),

    /// Code span content, already stripped of its backticks.
    Code(Range),

    /// An entity or numeric character reference.
    Entity {
        /// The reference as written, `&` and `;` included.
        range: Range,
        /// The decoded text.
        decoded: String,
    },

    /// Line break without trailing double space.
    SoftBreak,

    /// Line break after two spaces or a backslash.
    HardBreak,

    /// Emphasis (`*em*`) or strong emphasis (`**strong**`).
    Emphasis {
        /// Delimiter character (`*` or `_`).
        delimiter: u8,
        strong: bool,
        children: Vec<Inline>,
    },

    /// An unresolved delimiter run. Only exists while a leaf is being
    /// processed; leftovers turn into literal text.
    Delimiter(DelimiterRun),

    /// Node produced by a caller-supplied recognizer.
    Custom {
        name: &'static str,
        range: Range,
    },
}

impl Inline {
    /// Append this node's text, without markup, to `out`.
    pub fn push_plain_text(&self, content: &str, out: &mut String) {
        match self {
            Inline::Literal(range) | Inline::Code(range) | Inline::Custom { range, .. } => {
                out.push_str(range.text(content));
            }
            Inline::Delimiter(run) => out.push_str(run.range.text(content)),
            Inline::Entity { decoded, .. } => out.push_str(decoded),
            Inline::SoftBreak | Inline::HardBreak => out.push('\n'),
            Inline::Emphasis { children, .. } => {
                for child in children {
                    child.push_plain_text(content, out);
                }
            }
        }
    }
}

/// A run of emphasis delimiter characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelimiterRun {
    pub ch: u8,
    pub range: Range,
    pub can_open: bool,
    pub can_close: bool,
}

/// Merge adjacent literals covering contiguous text.
pub(crate) fn merge_literals(inlines: &mut Vec<Inline>) {
    let mut merged: Vec<Inline> = Vec::with_capacity(inlines.len());
    for inline in inlines.drain(..) {
        if let (Some(Inline::Literal(prev)), Inline::Literal(next)) = (merged.last_mut(), &inline) {
            if prev.end == next.start {
                prev.end = next.end;
                continue;
            }
        }
        merged.push(inline);
    }
    *inlines = merged;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_literals() {
        let mut inlines = vec![
            Inline::Literal(Range::new(0, 3)),
            Inline::Literal(Range::new(3, 5)),
            Inline::SoftBreak,
            Inline::Literal(Range::new(6, 8)),
            Inline::Literal(Range::new(9, 10)),
        ];
        merge_literals(&mut inlines);
        assert_eq!(
            inlines,
            vec![
                Inline::Literal(Range::new(0, 5)),
                Inline::SoftBreak,
                Inline::Literal(Range::new(6, 8)),
                Inline::Literal(Range::new(9, 10)),
            ]
        );
    }

    #[test]
    fn test_plain_text() {
        let content = "a *b* &amp;";
        let node = Inline::Emphasis {
            delimiter: b'*',
            strong: false,
            children: vec![Inline::Literal(Range::new(3, 4))],
        };
        let mut out = String::new();
        Inline::Literal(Range::new(0, 2)).push_plain_text(content, &mut out);
        node.push_plain_text(content, &mut out);
        Inline::Entity {
            range: Range::new(6, 11),
            decoded: "&".into(),
        }
        .push_plain_text(content, &mut out);
        assert_eq!(out, "a b&");
    }
}

//! Link reference definitions collected while parsing.

use rustc_hash::FxHashMap;

/// A link reference definition (`[label]: url "title"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRefDef {
    /// Label as written, without the brackets.
    pub label: String,
    pub url: String,
    pub title: Option<String>,
}

/// Definitions keyed by normalized label. First definition wins.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LinkRefStore {
    defs: Vec<LinkRefDef>,
    by_label: FxHashMap<String, usize>,
}

impl LinkRefStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a definition; returns `false` if the label was already defined.
    pub fn insert(&mut self, def: LinkRefDef) -> bool {
        let key = normalize_label(&def.label);
        if key.is_empty() || self.by_label.contains_key(&key) {
            return false;
        }
        self.by_label.insert(key, self.defs.len());
        self.defs.push(def);
        true
    }

    /// Look up a definition by label, in any spelling that normalizes the same.
    pub fn get(&self, label: &str) -> Option<&LinkRefDef> {
        let idx = *self.by_label.get(&normalize_label(label))?;
        self.defs.get(idx)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Definitions in document order.
    pub fn iter(&self) -> impl Iterator<Item = &LinkRefDef> {
        self.defs.iter()
    }
}

/// Normalize a link label: decode entities, unescape `[`, `]` and `\`,
/// collapse internal whitespace, trim, and case-fold.
pub fn normalize_label(label: &str) -> String {
    let decoded = html_escape::decode_html_entities(label);
    let mut out = String::with_capacity(decoded.len());
    let mut last_was_space = true;
    let mut chars = decoded.chars().peekable();

    while let Some(mut ch) = chars.next() {
        if ch == '\\' && chars.peek().is_some_and(|&next| matches!(next, '[' | ']' | '\\')) {
            if let Some(next) = chars.next() {
                ch = next;
            }
        }
        if ch.is_whitespace() {
            if !last_was_space {
                out.push(' ');
                last_was_space = true;
            }
            continue;
        }
        last_was_space = false;
        if ch == 'ß' || ch == 'ẞ' {
            out.push_str("ss");
        } else {
            out.extend(ch.to_lowercase());
        }
    }

    if out.ends_with(' ') {
        out.pop();
    }
    out
}

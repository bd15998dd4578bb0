//! Zero-copy view over one unit of text.
//!
//! A [`TextSlice`] is what recognizers see: a line during the block
//! pass, a leaf's content during the inline pass. It never copies the
//! underlying text and every access is bounds-checked.

use crate::Range;

/// A bounds-checked cursor over a borrowed string.
///
/// The view covers `start..end` of the underlying text. Recognizers
/// consume it by moving `start` forward; `end` can be pulled back to trim
/// trailing content.
///
/// # Example
/// ```
/// use treemark::TextSlice;
///
/// let mut slice = TextSlice::new("> quoted");
/// assert!(slice.eat(b'>'));
/// slice.skip_spaces();
/// assert_eq!(slice.as_str(), "quoted");
/// ```
#[derive(Clone, Copy)]
pub struct TextSlice<'a> {
    text: &'a str,
    start: usize,
    end: usize,
}

impl<'a> TextSlice<'a> {
    /// View the whole of `text`.
    #[inline]
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            start: 0,
            end: text.len(),
        }
    }

    /// The full underlying text, regardless of how much was consumed.
    #[inline]
    pub fn source(&self) -> &'a str {
        self.text
    }

    /// Current offset from the start of the underlying text.
    #[inline]
    pub fn offset(&self) -> usize {
        self.start
    }

    /// End offset of the view.
    #[inline]
    pub fn end(&self) -> usize {
        self.end
    }

    /// Number of bytes left in the view.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Peek the current byte.
    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.peek_ahead(0)
    }

    /// Peek at the byte `n` positions ahead.
    #[inline]
    pub fn peek_ahead(&self, n: usize) -> Option<u8> {
        if n >= self.remaining() {
            None
        } else {
            self.text.as_bytes().get(self.start + n).copied()
        }
    }

    /// The character at the current position.
    #[inline]
    pub fn peek_char(&self) -> Option<char> {
        self.as_str().chars().next()
    }

    /// The character just before the current position, looking past the
    /// start of the view into the underlying text.
    #[inline]
    pub fn char_before(&self) -> Option<char> {
        self.text.get(..self.start)?.chars().next_back()
    }

    /// The character at `pos` in the underlying text, ignoring the view's
    /// end bound.
    #[inline]
    pub fn char_at(&self, pos: usize) -> Option<char> {
        self.text.get(pos..)?.chars().next()
    }

    /// Advance by `n` bytes, never past the end of the view.
    #[inline]
    pub fn advance(&mut self, n: usize) {
        debug_assert!(n <= self.remaining());
        self.start = (self.start + n).min(self.end);
    }

    /// Advance by one character.
    #[inline]
    pub fn bump(&mut self) {
        if let Some(ch) = self.peek_char() {
            self.start += ch.len_utf8();
        }
    }

    /// Move to an absolute offset inside the view.
    #[inline]
    pub fn seek(&mut self, pos: usize) {
        debug_assert!(pos >= self.start && pos <= self.end);
        self.start = pos.clamp(self.start, self.end);
    }

    /// Consume and return the current byte.
    #[inline]
    pub fn next_byte(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.start += 1;
        Some(b)
    }

    #[inline]
    pub fn at(&self, b: u8) -> bool {
        self.peek() == Some(b)
    }

    #[inline]
    pub fn at_any(&self, bytes: &[u8]) -> bool {
        self.peek().is_some_and(|b| bytes.contains(&b))
    }

    /// Skip ASCII bytes while the predicate holds; returns the count.
    #[inline]
    pub fn skip_while<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(u8) -> bool,
    {
        let start = self.start;
        while let Some(b) = self.peek() {
            if !b.is_ascii() || !predicate(b) {
                break;
            }
            self.start += 1;
        }
        self.start - start
    }

    /// Skip spaces and tabs.
    #[inline]
    pub fn skip_whitespace(&mut self) -> usize {
        self.skip_while(|b| b == b' ' || b == b'\t')
    }

    /// Skip spaces only.
    #[inline]
    pub fn skip_spaces(&mut self) -> usize {
        self.skip_while(|b| b == b' ')
    }

    /// Skip at most `max` spaces.
    #[inline]
    pub fn skip_spaces_max(&mut self, max: usize) -> usize {
        let mut count = 0;
        while count < max && self.at(b' ') {
            self.start += 1;
            count += 1;
        }
        count
    }

    /// Number of leading spaces, without consuming them.
    #[inline]
    pub fn indent(&self) -> usize {
        self.as_str().bytes().take_while(|&b| b == b' ').count()
    }

    /// First byte after the leading spaces, without consuming anything.
    #[inline]
    pub fn first_non_space(&self) -> Option<u8> {
        self.peek_ahead(self.indent())
    }

    /// Whether the rest of the view is only spaces and tabs.
    #[inline]
    pub fn is_blank(&self) -> bool {
        self.as_str().bytes().all(|b| b == b' ' || b == b'\t')
    }

    #[inline]
    pub fn eat(&mut self, b: u8) -> bool {
        if self.at(b) {
            self.start += 1;
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn eat_bytes(&mut self, bytes: &[u8]) -> bool {
        if self.as_str().as_bytes().starts_with(bytes) {
            self.start += bytes.len();
            true
        } else {
            false
        }
    }

    /// Count a run of `b` at the current position, without consuming it.
    #[inline]
    pub fn run_length(&self, b: u8) -> usize {
        self.as_str().bytes().take_while(|&c| c == b).count()
    }

    /// Drop trailing spaces and tabs from the view.
    #[inline]
    pub fn trim_end(&mut self) {
        let bytes = self.text.as_bytes();
        while self.end > self.start && matches!(bytes[self.end - 1], b' ' | b'\t') {
            self.end -= 1;
        }
    }

    /// Pull the end of the view back to `end`.
    #[inline]
    pub fn truncate(&mut self, end: usize) {
        debug_assert!(end >= self.start && end <= self.end);
        self.end = end.clamp(self.start, self.end);
    }

    /// The unconsumed part of the view.
    #[inline]
    pub fn as_str(&self) -> &'a str {
        self.text.get(self.start..self.end).unwrap_or("")
    }

    /// Find the next occurrence of a byte, relative to the current offset.
    #[inline]
    pub fn find(&self, needle: u8) -> Option<usize> {
        memchr::memchr(needle, self.as_str().as_bytes())
    }

    /// Range from `start` to the current offset.
    #[inline]
    pub fn range_from(&self, start: usize) -> Range {
        Range::from_usize(start, self.start)
    }
}

impl std::fmt::Debug for TextSlice<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextSlice")
            .field("offset", &self.start)
            .field("end", &self.end)
            .field("text", &self.as_str())
            .finish()
    }
}

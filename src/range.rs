//! Compact byte span into a leaf's content buffer.
//!
//! Inline nodes refer back into the text of the leaf that owns them
//! instead of copying it. Offsets are `u32`, so a single leaf may hold
//! up to 4GB of text.

/// Byte span `start..end` into a leaf's content.
///
/// # Example
/// ```
/// use treemark::Range;
///
/// let content = "Some *text*.";
/// assert_eq!(Range::new(6, 10).text(content), "text");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Range {
    pub start: u32,
    pub end: u32,
}

const _: () = assert!(std::mem::size_of::<Range>() == 8);

impl Range {
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Create a range from `usize` offsets.
    ///
    /// # Panics
    /// Panics in debug mode if an offset exceeds `u32::MAX`.
    #[inline]
    pub fn from_usize(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        debug_assert!(end <= u32::MAX as usize);
        Self {
            start: start as u32,
            end: end as u32,
        }
    }

    #[inline]
    pub const fn empty_at(pos: u32) -> Self {
        Self { start: pos, end: pos }
    }

    /// The text this range covers in `content`.
    ///
    /// Returns an empty string when the range does not fall on character
    /// boundaries of `content`, which only happens if the range was taken
    /// from a different buffer.
    #[inline]
    pub fn text<'a>(&self, content: &'a str) -> &'a str {
        content.get(self.start_usize()..self.end_usize()).unwrap_or("")
    }

    #[inline]
    pub const fn len(&self) -> u32 {
        self.end - self.start
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    #[inline]
    pub const fn start_usize(&self) -> usize {
        self.start as usize
    }

    #[inline]
    pub const fn end_usize(&self) -> usize {
        self.end as usize
    }

    #[inline]
    pub const fn contains(&self, pos: u32) -> bool {
        pos >= self.start && pos < self.end
    }

    /// Move the end of the range backwards, e.g. to drop trailing spaces.
    #[inline]
    pub fn shrink_to(&mut self, new_end: u32) {
        debug_assert!(new_end >= self.start && new_end <= self.end);
        self.end = new_end;
    }
}

impl From<std::ops::Range<usize>> for Range {
    #[inline]
    fn from(r: std::ops::Range<usize>) -> Self {
        Self::from_usize(r.start, r.end)
    }
}

impl From<Range> for std::ops::Range<usize> {
    #[inline]
    fn from(r: Range) -> Self {
        r.start_usize()..r.end_usize()
    }
}

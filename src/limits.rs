//! Resource limits and sizing constants.
//!
//! Tree depth is deliberately absent: the inline walk keeps its state on
//! the heap, so nesting is bounded by memory only.

/// Maximum number of idle frames the frame pool keeps around.
pub const MAX_POOLED_FRAMES: usize = 64;

/// Maximum number of idle buffers the string cache keeps around.
pub const MAX_CACHED_STRINGS: usize = 32;

/// Default capacity of a freshly allocated leaf content buffer.
pub const DEFAULT_STRING_CAPACITY: usize = 128;

/// Buffers that grew beyond this are dropped instead of cached.
pub const MAX_CACHED_STRING_CAPACITY: usize = 64 * 1024;

/// Maximum delimiter runs per leaf taking part in emphasis resolution.
/// Runs beyond the limit stay literal text.
pub const MAX_DELIMITER_RUNS: usize = 4096;

/// Maximum length of an entity reference, `&` and `;` included.
pub const MAX_ENTITY_LEN: usize = 32;

/// Maximum link label length in bytes (CommonMark: 999).
pub const MAX_LINK_LABEL_LEN: usize = 999;

/// Maximum backtick run length for code spans; longer runs are literal.
pub const MAX_CODE_SPAN_BACKTICKS: usize = 32;

/// Maximum ATX heading level.
pub const MAX_HEADING_LEVEL: u8 = 6;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_are_reasonable() {
        const { assert!(MAX_POOLED_FRAMES >= 8) };
        const { assert!(MAX_CACHED_STRING_CAPACITY > DEFAULT_STRING_CAPACITY) };
        const { assert!(MAX_ENTITY_LEN >= 10) };
        const { assert!(MAX_CODE_SPAN_BACKTICKS >= 16) };
    }
}

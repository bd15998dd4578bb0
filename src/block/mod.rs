//! Block phase: line-oriented construction of the document tree.
//!
//! [`process_blocks`] pulls lines from a [`LineSource`], sanitizes them
//! and feeds them to a [`BlockProcessor`], which drives the pipeline's
//! [`BlockRecognizer`]s. The default recognizers handle:
//! - Block quotes
//! - Thematic breaks
//! - ATX headings
//! - Fenced code blocks
//! - Paragraphs

mod fence;
mod heading;
mod paragraph;
mod processor;
mod quote;
mod recognizer;
mod thematic;

pub use fence::FencedCodeRecognizer;
pub use heading::AtxHeadingRecognizer;
pub use paragraph::ParagraphRecognizer;
pub use processor::BlockProcessor;
pub use quote::BlockQuoteRecognizer;
pub use recognizer::{BlockContext, BlockRecognizer, BlockStart, BlockState};
pub use thematic::ThematicBreakRecognizer;

use crate::error::Result;
use crate::source::{sanitize_line, LineSource};
use crate::TextSlice;

/// Feed every line of `source` to `processor`, then close all open blocks.
///
/// NUL characters are replaced with
/// [`REPLACEMENT_CHARACTER`](crate::REPLACEMENT_CHARACTER) before a line
/// reaches any recognizer. `close_all(true)` runs exactly once, after the
/// last line. A read error aborts the phase with the tree left open.
pub fn process_blocks<S: LineSource>(mut source: S, processor: &mut BlockProcessor<'_>) -> Result<()> {
    let mut line = String::new();
    let mut lines = 0usize;

    while source.read_line(&mut line)? {
        lines += 1;
        if sanitize_line(&mut line) {
            log::debug!("replaced NUL characters on line {lines}");
        }
        processor.process_line(TextSlice::new(&line));
    }

    log::debug!("block phase read {lines} lines");
    processor.close_all(true);
    Ok(())
}

//! Line sources feeding the block pass.
//!
//! Line-ending normalization belongs to the source: the block pass only
//! ever sees line content without its terminator.

use std::io::{self, BufRead};

/// Substitute for U+0000 in input lines (insecure-character policy).
pub const REPLACEMENT_CHARACTER: char = '\u{FFFD}';

/// A supplier of successive input lines.
///
/// `read_line` clears `buf`, writes the next line into it without its line
/// terminator and returns `Ok(true)`. `Ok(false)` means there are no more
/// lines; `buf` is then left empty.
pub trait LineSource {
    fn read_line(&mut self, buf: &mut String) -> io::Result<bool>;
}

impl<S: LineSource + ?Sized> LineSource for &mut S {
    fn read_line(&mut self, buf: &mut String) -> io::Result<bool> {
        (**self).read_line(buf)
    }
}

/// Lines of an in-memory string, split on `\n`, `\r\n` and `\r`.
///
/// A terminator at the very end of the input does not start another line.
#[derive(Debug, Clone)]
pub struct StrLines<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> StrLines<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }
}

impl LineSource for StrLines<'_> {
    fn read_line(&mut self, buf: &mut String) -> io::Result<bool> {
        buf.clear();
        if self.pos >= self.input.len() {
            return Ok(false);
        }
        let rest = &self.input[self.pos..];
        match memchr::memchr2(b'\n', b'\r', rest.as_bytes()) {
            Some(idx) => {
                buf.push_str(&rest[..idx]);
                let terminator = if rest[idx..].starts_with("\r\n") { 2 } else { 1 };
                self.pos += idx + terminator;
            }
            None => {
                buf.push_str(rest);
                self.pos = self.input.len();
            }
        }
        Ok(true)
    }
}

/// Lines of a buffered reader, split on `\n`, `\r\n` and `\r` like
/// [`StrLines`].
///
/// Invalid UTF-8 is decoded lossily, so any byte stream yields lines.
#[derive(Debug)]
pub struct ReaderLines<R> {
    reader: R,
    bytes: Vec<u8>,
    // The previous line ended in `\r`; a following `\n` belongs to it.
    skip_lf: bool,
}

impl<R: BufRead> ReaderLines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            bytes: Vec::new(),
            skip_lf: false,
        }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: BufRead> LineSource for ReaderLines<R> {
    fn read_line(&mut self, buf: &mut String) -> io::Result<bool> {
        buf.clear();
        self.bytes.clear();
        let mut terminated = false;
        loop {
            let available = match self.reader.fill_buf() {
                Ok(available) => available,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            if available.is_empty() {
                break;
            }
            if self.skip_lf {
                self.skip_lf = false;
                if available[0] == b'\n' {
                    self.reader.consume(1);
                    continue;
                }
            }
            match memchr::memchr2(b'\n', b'\r', available) {
                Some(idx) => {
                    self.bytes.extend_from_slice(&available[..idx]);
                    self.skip_lf = available[idx] == b'\r';
                    self.reader.consume(idx + 1);
                    terminated = true;
                    break;
                }
                None => {
                    let len = available.len();
                    self.bytes.extend_from_slice(available);
                    self.reader.consume(len);
                }
            }
        }
        if !terminated && self.bytes.is_empty() {
            return Ok(false);
        }
        buf.push_str(&String::from_utf8_lossy(&self.bytes));
        Ok(true)
    }
}

/// Replace every NUL in `line` with [`REPLACEMENT_CHARACTER`].
///
/// Returns `true` if anything was replaced. Lines without NUL are left
/// untouched and cost a single `memchr` scan.
pub fn sanitize_line(line: &mut String) -> bool {
    if memchr::memchr(0, line.as_bytes()).is_none() {
        return false;
    }
    let mut buf = [0u8; 4];
    let replacement: &str = REPLACEMENT_CHARACTER.encode_utf8(&mut buf);
    *line = line.replace('\0', replacement);
    true
}

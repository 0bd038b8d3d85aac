use std::io::{self, Read};

use csv::{Position, Reader, ReaderBuilder, StringRecord};
use log::debug;

use crate::error::{DsvError, Result};

/// Bytes handed to the csv reader that have not been validated yet.
#[derive(Debug, Default)]
struct Window {
    bytes: Vec<u8>,
    /// Stream offset of `bytes[0]`.
    offset: u64,
}

/// Reader adapter copying everything it reads into a [`Window`].
struct Capture<R> {
    inner: R,
    window: Option<Window>,
}

impl<R: Read> Read for Capture<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let read = self.inner.read(buf)?;
        if let Some(window) = &mut self.window {
            window.bytes.extend_from_slice(&buf[..read]);
        }
        Ok(read)
    }
}

/// Splits a stream into raw records.
///
/// Quoting follows the usual CSV convention: a field may be wrapped in `"`
/// and a literal quote inside it is written `""`. Records may have any
/// number of fields and blank lines never produce a record.
///
/// With `lazy_quotes` disabled, a quote inside an unquoted field or a quote
/// not followed by a delimiter after a quoted field is reported as
/// [`DsvError::Quote`], carrying the line of the offending quote. With
/// `lazy_quotes` enabled such quotes are kept as text.
pub struct Tokenizer<R> {
    reader: Reader<Capture<R>>,
    delimiter: u8,
}

impl<R: Read> Tokenizer<R> {
    /// Wraps `rdr`; strict quote checking is enabled unless `lazy_quotes`.
    pub fn new(rdr: R, delimiter: u8, lazy_quotes: bool) -> Self {
        let reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(Capture {
                inner: rdr,
                window: (!lazy_quotes).then(Window::default),
            });

        debug!(
            "tokenizer ready: delimiter={:?}, lazy_quotes={}",
            delimiter as char, lazy_quotes
        );

        Self { reader, delimiter }
    }

    /// Reads the next record into `record`.
    ///
    /// Returns `Ok(false)` at the end of the stream.
    pub fn read_record(&mut self, record: &mut StringRecord) -> Result<bool> {
        let start = self.reader.position().clone();
        if !self.reader.read_record(record)? {
            return Ok(false);
        }

        let end = self.reader.position().byte();
        let delimiter = self.delimiter;
        let Some(window) = self.reader.get_mut().window.as_mut() else {
            return Ok(true);
        };

        let from = start.byte().saturating_sub(window.offset) as usize;
        let to = (end.saturating_sub(window.offset) as usize).min(window.bytes.len());
        // the raw span starts at `start`, blank lines skipped by the reader included
        let checked = match window.bytes.get(from..to) {
            Some(raw) => check_quotes(raw, delimiter)
                .map_err(|(at, message)| (start.line() + count_lines(&raw[..at]), message)),
            None => Ok(()),
        };

        window.bytes.drain(..to);
        window.offset += to as u64;

        checked.map_err(|(line, message)| DsvError::Quote { line, message })?;

        Ok(true)
    }

    /// Position of the next record in the stream.
    pub fn position(&self) -> &Position {
        self.reader.position()
    }
}

fn count_lines(raw: &[u8]) -> u64 {
    raw.iter().filter(|&&byte| byte == b'\n').count() as u64
}

/// Validates quoting of one raw record, terminator included.
///
/// On failure returns the offset of the offending quote within `raw`.
fn check_quotes(raw: &[u8], delimiter: u8) -> std::result::Result<(), (usize, &'static str)> {
    const BARE_QUOTE: &str = "bare \" in non-quoted-field";
    const EXTRA_QUOTE: &str = "extraneous or missing \" in quoted-field";

    let mut field_start = true;
    let mut quoted_at = None;
    let mut bytes = raw.iter().copied().enumerate().peekable();

    while let Some((at, byte)) = bytes.next() {
        if quoted_at.is_some() {
            if byte == b'"' {
                match bytes.peek() {
                    Some((_, b'"')) => {
                        bytes.next();
                    }
                    Some(&(_, next)) if next != delimiter && next != b'\r' && next != b'\n' => {
                        return Err((at, EXTRA_QUOTE));
                    }
                    _ => quoted_at = None,
                }
            }
            continue;
        }

        match byte {
            b'"' if field_start => {
                quoted_at = Some(at);
                field_start = false;
            }
            b'"' => return Err((at, BARE_QUOTE)),
            b'\r' | b'\n' => field_start = true,
            _ => field_start = byte == delimiter,
        }
    }

    match quoted_at {
        Some(at) => Err((at, EXTRA_QUOTE)),
        None => Ok(()),
    }
}

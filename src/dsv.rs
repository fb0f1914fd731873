//! Delimiter-separated values: the on-disk form of a profile.
//!
//! A header row names the columns; each following non-blank line is one
//! record. Fields that contain the delimiter, a double quote or a line
//! break are wrapped in double quotes with inner quotes doubled. Rows are
//! split with `memchr`, and the quote-aware path only runs for lines that
//! actually contain a quote.

use std::{
    fmt::Display,
    fs,
    io::{self, Read, Write},
    mem,
    path::Path,
};

use memchr::{memchr, memchr2, memchr_iter};
#[cfg(feature = "simd")]
use simdutf8::basic::from_utf8;
use thiserror::Error;
use tracing::{debug, debug_span};

use crate::value::{Record, Value};

pub const DEFAULT_DELIMITER: u8 = b'\t';
const QUOTE: u8 = b'"';
const BOM: char = '\u{feff}';

#[derive(Debug, Error)]
pub enum DsvError {
    #[error("line {line}: {found} fields but the header has {expected}")]
    TooManyFields {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: unterminated quoted field")]
    UnterminatedQuote { line: usize },
    #[error("input is not valid UTF-8: {0}")]
    InvalidUtf8(String),
    #[error("delimiter byte {0:#04x} must be ASCII and not a quote or line break")]
    Delimiter(u8),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Validate raw file contents, SIMD-accelerated under the `simd` feature.
pub fn decode_utf8(bytes: &[u8]) -> Result<&str, DsvError> {
    #[cfg(feature = "simd")]
    {
        from_utf8(bytes).map_err(|e| DsvError::InvalidUtf8(e.to_string()))
    }
    #[cfg(not(feature = "simd"))]
    {
        std::str::from_utf8(bytes).map_err(|e| DsvError::InvalidUtf8(e.to_string()))
    }
}

/// Fields are split on raw bytes, so the delimiter must be a single ASCII
/// byte that cannot occur inside a multi-byte character, a quoted field or
/// a line break.
pub fn check_delimiter(delimiter: u8) -> Result<u8, DsvError> {
    if delimiter.is_ascii() && !matches!(delimiter, QUOTE | b'\n' | b'\r') {
        Ok(delimiter)
    } else {
        Err(DsvError::Delimiter(delimiter))
    }
}

struct Rows<'a> {
    text: &'a str,
    pos: usize,
    line: usize,
    delimiter: u8,
}

impl<'a> Rows<'a> {
    fn new(text: &'a str, delimiter: u8) -> Result<Self, DsvError> {
        let text = text.strip_prefix(BOM).unwrap_or(text);
        Ok(Self {
            text,
            pos: 0,
            line: 0,
            delimiter: check_delimiter(delimiter)?,
        })
    }

    /// Next non-blank row and the line it starts on.
    fn next_row(&mut self) -> Result<Option<(usize, Vec<String>)>, DsvError> {
        let bytes = self.text.as_bytes();
        while self.pos < bytes.len() {
            let tail = &bytes[self.pos..];
            let line_len = memchr(b'\n', tail).unwrap_or(tail.len());
            let line = trim_cr(&self.text[self.pos..self.pos + line_len]);
            self.line += 1;

            if line.is_empty() {
                self.pos += line_len + 1;
                continue;
            }
            if memchr(QUOTE, line.as_bytes()).is_none() {
                self.pos += line_len + 1;
                return Ok(Some((self.line, self.split_plain(line))));
            }
            let start_line = self.line;
            return self.quoted_row().map(|row| Some((start_line, row)));
        }
        Ok(None)
    }

    fn split_plain(&self, line: &str) -> Vec<String> {
        let mut fields = Vec::new();
        let mut start = 0;
        for i in memchr_iter(self.delimiter, line.as_bytes()) {
            fields.push(line[start..i].to_owned());
            start = i + 1;
        }
        fields.push(line[start..].to_owned());
        fields
    }

    fn quoted_row(&mut self) -> Result<Vec<String>, DsvError> {
        let text = self.text;
        let bytes = text.as_bytes();
        let start_line = self.line;
        let mut i = self.pos;
        let mut fields = Vec::new();
        let mut field = String::new();

        loop {
            if bytes.get(i) == Some(&QUOTE) {
                i += 1;
                loop {
                    let Some(q) = memchr(QUOTE, &bytes[i..]) else {
                        return Err(DsvError::UnterminatedQuote { line: start_line });
                    };
                    field.push_str(&text[i..i + q]);
                    i += q + 1;
                    if bytes.get(i) == Some(&QUOTE) {
                        field.push('"');
                        i += 1;
                    } else {
                        break;
                    }
                }
            }
            let rest = &bytes[i..];
            let stop = memchr2(self.delimiter, b'\n', rest).unwrap_or(rest.len());
            let chunk = &text[i..i + stop];
            i += stop;

            if bytes.get(i) == Some(&self.delimiter) {
                field.push_str(chunk);
                fields.push(mem::take(&mut field));
                i += 1;
                continue;
            }
            field.push_str(trim_cr(chunk));
            fields.push(field);
            break;
        }

        // Line breaks inside quoted fields; the first line was counted by `next_row`.
        self.line += memchr_iter(b'\n', &bytes[self.pos..i]).count();
        self.pos = i + 1;
        Ok(fields)
    }
}

#[inline]
fn trim_cr(s: &str) -> &str {
    s.strip_suffix('\r').unwrap_or(s)
}

/// Parse every row, header included, without interpreting them.
pub fn parse_rows(text: &str, delimiter: u8) -> Result<Vec<Vec<String>>, DsvError> {
    let mut rows = Rows::new(text, delimiter)?;
    let mut out = Vec::new();
    while let Some((_, row)) = rows.next_row()? {
        out.push(row);
    }
    Ok(out)
}

/// Parse header-keyed records.
///
/// Short rows leave their trailing columns out of the record; rows longer
/// than the header are rejected.
pub fn parse_records(text: &str, delimiter: u8) -> Result<Vec<Record>, DsvError> {
    let mut rows = Rows::new(text, delimiter)?;
    let Some((_, header)) = rows.next_row()? else {
        return Ok(Vec::new());
    };
    let mut records = Vec::new();
    while let Some((line, row)) = rows.next_row()? {
        if row.len() > header.len() {
            return Err(DsvError::TooManyFields {
                line,
                expected: header.len(),
                found: row.len(),
            });
        }
        records.push(
            header
                .iter()
                .cloned()
                .zip(row.into_iter().map(Value::Text))
                .collect(),
        );
    }
    Ok(records)
}

pub fn read_records<R: Read>(mut reader: R, delimiter: u8) -> Result<Vec<Record>, DsvError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    parse_records(decode_utf8(&bytes)?, delimiter)
}

pub fn read_file(path: impl AsRef<Path>, delimiter: u8) -> Result<Vec<Record>, DsvError> {
    let path = path.as_ref();
    let _span = debug_span!("read_file", path = %path.display()).entered();
    let bytes = fs::read(path)?;
    let records = parse_records(decode_utf8(&bytes)?, delimiter)?;
    debug!(records = records.len(), "read delimited file");
    Ok(records)
}

fn write_field<W: Write>(out: &mut W, field: &str, delimiter: u8) -> io::Result<()> {
    let needs_quotes = field
        .bytes()
        .any(|b| b == delimiter || b == QUOTE || b == b'\n' || b == b'\r');
    if !needs_quotes {
        return out.write_all(field.as_bytes());
    }
    out.write_all(b"\"")?;
    let mut start = 0;
    for i in memchr_iter(QUOTE, field.as_bytes()) {
        out.write_all(&field.as_bytes()[start..=i])?;
        out.write_all(b"\"")?;
        start = i + 1;
    }
    out.write_all(&field.as_bytes()[start..])?;
    out.write_all(b"\"")
}

/// Write rows, one line each, quoting fields where needed.
///
/// A row made of a single empty field is written as `""` so that it is not
/// read back as a blank line.
pub fn write_rows<W, I, R, C>(mut out: W, delimiter: u8, rows: I) -> Result<(), DsvError>
where
    W: Write,
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = C>,
    C: Display,
{
    let delimiter = check_delimiter(delimiter)?;
    for row in rows {
        let mut cells = row.into_iter().map(|cell| cell.to_string());
        if let Some(first) = cells.next() {
            match cells.next() {
                None if first.is_empty() => out.write_all(b"\"\"")?,
                second => {
                    write_field(&mut out, &first, delimiter)?;
                    for cell in second.into_iter().chain(cells) {
                        out.write_all(&[delimiter])?;
                        write_field(&mut out, &cell, delimiter)?;
                    }
                }
            }
        }
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_file<P, I, R, C>(path: P, delimiter: u8, rows: I) -> Result<(), DsvError>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = C>,
    C: Display,
{
    let path = path.as_ref();
    let _span = debug_span!("write_file", path = %path.display()).entered();
    check_delimiter(delimiter)?;
    let file = fs::File::create(path)?;
    write_rows(io::BufWriter::new(file), delimiter, rows)
}

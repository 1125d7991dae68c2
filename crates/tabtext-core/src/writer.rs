//! CSV/TSV writer — quoting, joining, and encoding of records.
//!
//! A field is quoted when its contents contain the delimiter, a double
//! quote, `\r` or `\n`, or when the caller asked for it. Inside quotes every
//! `"` is doubled. Unquoted fields are written verbatim.
//!
//! Records are separated by the configured line break; there is no trailing
//! line break after the last record, so writing nothing produces nothing.

use std::io::Write;

use crate::encoding::{Encoding, TranscodeWriter};
use crate::error::Result;
use crate::field::Field;
use crate::line_break::LineBreak;

/// Writes records of [`Field`]s as delimiter-separated text.
///
/// Output is buffered; call [`Writer::flush`] (or [`Writer::into_inner`])
/// to guarantee it reaches the sink.
///
/// A record with a single empty unquoted field is written as a blank line,
/// which reads back as one absent cell (or nothing, at the end of the
/// stream). Quote the field to keep it as an empty string.
pub struct Writer<W: Write> {
    sink: TranscodeWriter<W>,
    delimiter: char,
    line_break: LineBreak,
    appended: bool,
}

impl<W: Write> Writer<W> {
    /// Create a writer. The encoding's byte-order mark, if it has one, is
    /// written to `sink` immediately.
    pub fn new(sink: W, line_break: LineBreak, encoding: Encoding) -> Result<Self> {
        Ok(Self {
            sink: TranscodeWriter::new(sink, encoding)?,
            delimiter: ',',
            line_break,
            appended: false,
        })
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    pub fn line_break(&self) -> LineBreak {
        self.line_break
    }

    /// Write one record.
    ///
    /// On error the output for this record is incomplete; treat the stream
    /// as unusable.
    pub fn write(&mut self, record: &[Field]) -> Result<()> {
        if self.appended {
            self.sink.write_str(self.line_break.as_str())?;
        } else {
            self.appended = true;
        }

        for (i, field) in record.iter().enumerate() {
            if i > 0 {
                self.sink.write_char(self.delimiter)?;
            }
            if field.quote || needs_quoting(&field.contents, self.delimiter) {
                self.sink.write_str(&quote(&field.contents))?;
            } else {
                self.sink.write_str(&field.contents)?;
            }
        }
        Ok(())
    }

    /// Write every record in order.
    pub fn write_all<R: AsRef<[Field]>>(&mut self, records: &[R]) -> Result<()> {
        for record in records {
            self.write(record.as_ref())?;
        }
        tracing::debug!(records = records.len(), "wrote records");
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.sink.flush()
    }

    /// Flush and return the sink.
    pub fn into_inner(self) -> Result<W> {
        self.sink.into_inner()
    }
}

/// Whether `contents` can only be written safely inside quotes.
pub fn needs_quoting(contents: &str, delimiter: char) -> bool {
    contents
        .chars()
        .any(|c| c == delimiter || c == '"' || c == '\r' || c == '\n')
}

/// Wrap `contents` in quotes, doubling embedded quotes.
fn quote(contents: &str) -> String {
    let mut out = String::with_capacity(contents.len() + 2);
    out.push('"');
    for c in contents.chars() {
        if c == '"' {
            out.push('"');
        }
        out.push(c);
    }
    out.push('"');
    out
}

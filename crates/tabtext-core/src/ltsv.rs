//! LTSV writer — `label:value` pairs joined by tabs, one record per line.
//!
//! Labels may only use `[0-9A-Za-z_.-]`. Values may use any character except
//! NUL, TAB, LF and CR, which would break the line structure.

use std::io::Write;

use crate::encoding::{Encoding, TranscodeWriter};
use crate::error::{CharacterPlace, Result, TextError};
use crate::line_break::LineBreak;

/// Whether `c` may appear in an LTSV label.
pub fn is_label_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')
}

/// Whether `c` may appear in an LTSV field value.
pub fn is_field_value_char(c: char) -> bool {
    !matches!(c, '\0' | '\t' | '\n' | '\r')
}

fn check(s: &str, place: CharacterPlace, permitted: fn(char) -> bool) -> Result<()> {
    match s.chars().find(|c| !permitted(*c)) {
        Some(character) => Err(TextError::UnsupportedCharacter { place, character }),
        None => Ok(()),
    }
}

/// Writes LTSV records against a fixed header.
pub struct LtsvWriter<W: Write> {
    header: Vec<String>,
    sink: TranscodeWriter<W>,
    line_break: LineBreak,
    appended: bool,
}

impl<W: Write> LtsvWriter<W> {
    /// Validate the header labels and wrap `sink`. The encoding's
    /// byte-order mark, if any, is written immediately.
    pub fn new(
        sink: W,
        header: Vec<String>,
        line_break: LineBreak,
        encoding: Encoding,
    ) -> Result<Self> {
        for label in &header {
            check(label, CharacterPlace::Label, is_label_char)?;
        }
        Ok(Self {
            header,
            sink: TranscodeWriter::new(sink, encoding)?,
            line_break,
            appended: false,
        })
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Write one record, one value per header label.
    ///
    /// Every value is checked before anything is written, so a rejected
    /// record leaves no partial line behind.
    pub fn write<S: AsRef<str>>(&mut self, record: &[S]) -> Result<()> {
        if record.len() != self.header.len() {
            return Err(TextError::FieldLengthMismatch);
        }
        for value in record {
            check(value.as_ref(), CharacterPlace::FieldValue, is_field_value_char)?;
        }

        if self.appended {
            self.sink.write_str(self.line_break.as_str())?;
        } else {
            self.appended = true;
        }

        for (i, (label, value)) in self.header.iter().zip(record).enumerate() {
            if i > 0 {
                self.sink.write_char('\t')?;
            }
            self.sink.write_str(label)?;
            self.sink.write_char(':')?;
            self.sink.write_str(value.as_ref())?;
        }
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

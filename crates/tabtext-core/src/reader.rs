//! CSV/TSV reader — a quote-aware state machine over decoded text.
//!
//! The input stream is decoded once by the encoding adapter; the state machine
//! then walks the resulting characters with a single cursor. All line/column
//! bookkeeping happens in the rune reader and the line-break handler, so
//! every error reports the position exactly as the cursor saw it.
//!
//! # Position rules
//!
//! - Lines are 1-based, columns 0-based.
//! - Every rune read advances the column by one, including the read that
//!   reports end of stream.
//! - The rune after a closing quote is only looked at until the machine
//!   decides what it means, so an "unexpected quote" error points at it
//!   without counting it.
//! - A line break (`\n`, `\r`, or `\r\n`) advances the line and resets the
//!   column, also inside quoted fields.
//!
//! # Field count
//!
//! The first record read (or the header) fixes the number of fields for the
//! whole session. Extra fields are rejected as soon as one starts, at the
//! column just past its delimiter; short records are rejected at column 0 of
//! the line the record started on.

use std::io::Read;

use crate::encoding::{self, Encoding};
use crate::error::{QuoteFault, Result, TextError};
use crate::field::{RawText, Record};
use crate::line_break::{LineBreak, LineBreakDetector};

/// Scanner state within one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    StartOfField,
    InUnquotedField,
    InQuotedField,
    /// A quote inside a quoted field: either an escaped quote or the end of
    /// the field, depending on the next rune.
    QuoteInQuotedField,
    EndOfRecord,
}

/// Reads records from delimiter-separated text.
///
/// ```
/// use tabtext_core::{Encoding, LineBreak, Reader};
///
/// let mut reader = Reader::new("a,\"b\",c\nd,e,".as_bytes(), Encoding::Utf8).unwrap();
/// let records = reader.read_all().unwrap();
/// assert_eq!(records[1][2], None);
/// assert_eq!(reader.detected_line_break(), Some(LineBreak::Lf));
/// ```
#[derive(Debug)]
pub struct Reader {
    text: Vec<char>,
    cursor: usize,
    delimiter: char,
    without_null: bool,
    line: usize,
    column: usize,
    field_count: Option<usize>,
    line_breaks: LineBreakDetector,
    /// Blank lines consumed but not yet emitted. Dropped if only more blank
    /// lines follow.
    pending_blank_lines: usize,
}

impl Reader {
    /// Decode `input` as `encoding` and prepare to read it.
    pub fn new<R: Read>(input: R, encoding: Encoding) -> Result<Self> {
        let text = encoding::decode(input, encoding)?;
        Ok(Self::from_text(&text))
    }

    /// Read already-decoded text.
    pub fn from_text(text: &str) -> Self {
        Self {
            text: text.chars().collect(),
            cursor: 0,
            delimiter: ',',
            without_null: false,
            line: 1,
            column: 0,
            field_count: None,
            line_breaks: LineBreakDetector::new(),
            pending_blank_lines: 0,
        }
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Report absent cells as empty strings instead of `None`.
    pub fn with_without_null(mut self, without_null: bool) -> Self {
        self.without_null = without_null;
        self
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// The first record terminator seen so far; `None` for single-line input.
    pub fn detected_line_break(&self) -> Option<LineBreak> {
        self.line_breaks.detected()
    }

    /// Field count established by the first record or header, if any.
    pub fn field_count(&self) -> Option<usize> {
        self.field_count
    }

    /// Current line (1-based).
    pub fn line(&self) -> usize {
        self.line
    }

    /// Current column (0-based).
    pub fn column(&self) -> usize {
        self.column
    }

    /// Read the next record, or `None` at the end of the stream.
    ///
    /// Errors are terminal: after one, the reader reports end of stream.
    pub fn read(&mut self) -> Result<Option<Record>> {
        let result = self.read_next();
        if result.is_err() {
            self.cursor = self.text.len();
            self.pending_blank_lines = 0;
        }
        result
    }

    /// Read every remaining record.
    pub fn read_all(&mut self) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        while let Some(record) = self.read()? {
            records.push(record);
        }
        tracing::debug!(
            records = records.len(),
            fields = ?self.field_count,
            line_break = ?self.detected_line_break(),
            "read all records"
        );
        Ok(records)
    }

    /// Read one record as a header of raw labels.
    ///
    /// Labels are not trimmed; absent cells become empty labels. The header
    /// fixes the field count for every following record.
    pub fn read_header(&mut self) -> Result<Vec<String>> {
        let header: Vec<String> = self
            .read()?
            .unwrap_or_default()
            .into_iter()
            .map(Option::unwrap_or_default)
            .collect();
        tracing::debug!(labels = header.len(), "read header");
        Ok(header)
    }

    fn read_next(&mut self) -> Result<Option<Record>> {
        loop {
            match self.peek() {
                None => {
                    if self.pending_blank_lines > 0 {
                        tracing::debug!(
                            lines = self.pending_blank_lines,
                            "discarded trailing blank lines"
                        );
                        self.pending_blank_lines = 0;
                    }
                    return Ok(None);
                }
                Some(c) if is_line_break(c) => {
                    self.next_rune();
                    self.end_line(c);
                    self.pending_blank_lines += 1;
                }
                Some(_) => break,
            }
        }

        if self.pending_blank_lines > 0 {
            self.pending_blank_lines -= 1;
            let line = self.line - self.pending_blank_lines - 1;
            return self.finish_record(vec![None], line).map(Some);
        }

        let line = self.line;
        let record = self.parse_record()?;
        self.finish_record(record, line).map(Some)
    }

    /// Run the state machine over one record.
    fn parse_record(&mut self) -> Result<Record> {
        let mut record = Record::new();
        let mut field = String::new();
        let mut state = State::StartOfField;

        while state != State::EndOfRecord {
            state = match state {
                State::StartOfField => {
                    if let Some(expected) = self.field_count {
                        if record.len() >= expected {
                            return Err(TextError::FieldCountMismatch {
                                line: self.line,
                                column: self.column,
                            });
                        }
                    }
                    match self.next_rune() {
                        None => {
                            record.push(None);
                            State::EndOfRecord
                        }
                        Some('"') => State::InQuotedField,
                        Some(c) if c == self.delimiter => {
                            record.push(None);
                            State::StartOfField
                        }
                        Some(c) if is_line_break(c) => {
                            self.end_line(c);
                            record.push(None);
                            State::EndOfRecord
                        }
                        Some(c) => {
                            field.push(c);
                            State::InUnquotedField
                        }
                    }
                }
                State::InUnquotedField => match self.next_rune() {
                    None => {
                        record.push(Some(std::mem::take(&mut field)));
                        State::EndOfRecord
                    }
                    Some(c) if c == self.delimiter => {
                        record.push(Some(std::mem::take(&mut field)));
                        State::StartOfField
                    }
                    Some(c) if is_line_break(c) => {
                        self.end_line(c);
                        record.push(Some(std::mem::take(&mut field)));
                        State::EndOfRecord
                    }
                    // A bare quote in an unquoted field is data.
                    Some(c) => {
                        field.push(c);
                        State::InUnquotedField
                    }
                },
                State::InQuotedField => match self.next_rune() {
                    None => return Err(self.malformed_quote(QuoteFault::Extraneous)),
                    Some('"') => State::QuoteInQuotedField,
                    Some(c) => {
                        field.push(c);
                        if is_line_break(c) {
                            if c == '\r' && self.peek() == Some('\n') {
                                self.next_rune();
                                field.push('\n');
                            }
                            self.new_line();
                        }
                        State::InQuotedField
                    }
                },
                State::QuoteInQuotedField => match self.peek() {
                    Some('"') => {
                        self.next_rune();
                        field.push('"');
                        State::InQuotedField
                    }
                    Some(c) if c == self.delimiter => {
                        self.next_rune();
                        record.push(Some(std::mem::take(&mut field)));
                        State::StartOfField
                    }
                    Some(c) if is_line_break(c) => {
                        self.next_rune();
                        self.end_line(c);
                        record.push(Some(std::mem::take(&mut field)));
                        State::EndOfRecord
                    }
                    None => {
                        self.next_rune();
                        record.push(Some(std::mem::take(&mut field)));
                        State::EndOfRecord
                    }
                    Some(_) => return Err(self.malformed_quote(QuoteFault::Unexpected)),
                },
                State::EndOfRecord => State::EndOfRecord,
            };
        }

        Ok(record)
    }

    /// Enforce the session field count and apply without-null.
    fn finish_record(&mut self, mut record: Record, line: usize) -> Result<Record> {
        match self.field_count {
            Some(expected) if record.len() < expected => {
                return Err(TextError::FieldCountMismatch { line, column: 0 });
            }
            Some(_) => {}
            None => self.field_count = Some(record.len()),
        }
        if self.without_null {
            record.iter_mut().for_each(fill_absent);
        }
        Ok(record)
    }

    fn malformed_quote(&self, kind: QuoteFault) -> TextError {
        TextError::MalformedQuote {
            line: self.line,
            column: self.column,
            kind,
        }
    }

    fn peek(&self) -> Option<char> {
        self.text.get(self.cursor).copied()
    }

    fn next_rune(&mut self) -> Option<char> {
        self.column += 1;
        let c = self.peek()?;
        self.cursor += 1;
        Some(c)
    }

    /// Finish a record terminator whose first rune `c` was just consumed.
    fn end_line(&mut self, c: char) {
        let line_break = if c == '\r' {
            if self.peek() == Some('\n') {
                self.next_rune();
                LineBreak::Crlf
            } else {
                LineBreak::Cr
            }
        } else {
            LineBreak::Lf
        };
        self.line_breaks.observe(line_break);
        self.new_line();
    }

    fn new_line(&mut self) {
        self.line += 1;
        self.column = 0;
    }
}

impl Iterator for Reader {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read().transpose()
    }
}

fn is_line_break(c: char) -> bool {
    c == '\n' || c == '\r'
}

fn fill_absent(cell: &mut RawText) {
    if cell.is_none() {
        *cell = Some(String::new());
    }
}

//! Field and record types for both directions.
//!
//! The read side keeps "absent" apart from "empty": `a,,b` has an absent middle
//! cell while `a,"",b` has an empty one. The write side carries the caller's
//! quoting directive alongside the contents.

/// One cell as read: `None` when nothing at all stood between the delimiters.
pub type RawText = Option<String>;

/// One line's worth of read cells.
pub type Record = Vec<RawText>;

/// One cell to be written.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Field {
    pub contents: String,
    /// Force quoting even when the contents would not require it.
    pub quote: bool,
}

impl Field {
    pub fn new(contents: impl Into<String>, quote: bool) -> Self {
        Self {
            contents: contents.into(),
            quote,
        }
    }

    /// A field that is always written quoted.
    pub fn quoted(contents: impl Into<String>) -> Self {
        Self::new(contents, true)
    }

    /// A field that is quoted only when its contents require it.
    pub fn plain(contents: impl Into<String>) -> Self {
        Self::new(contents, false)
    }
}

impl From<&str> for Field {
    fn from(contents: &str) -> Self {
        Field::plain(contents)
    }
}

impl From<String> for Field {
    fn from(contents: String) -> Self {
        Field::plain(contents)
    }
}

/// Convert read cells into plain write fields, writing absent cells as empty.
pub fn to_fields(record: &[RawText]) -> Vec<Field> {
    record
        .iter()
        .map(|cell| Field::plain(cell.as_deref().unwrap_or_default()))
        .collect()
}

//! Line-break conventions and first-occurrence detection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TextError};

/// A line-break convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LineBreak {
    #[default]
    Lf,
    Cr,
    Crlf,
}

impl LineBreak {
    /// The characters written for this line break.
    pub fn as_str(self) -> &'static str {
        match self {
            LineBreak::Lf => "\n",
            LineBreak::Cr => "\r",
            LineBreak::Crlf => "\r\n",
        }
    }

    /// Upper-case name, e.g. `CRLF`.
    pub fn name(self) -> &'static str {
        match self {
            LineBreak::Lf => "LF",
            LineBreak::Cr => "CR",
            LineBreak::Crlf => "CRLF",
        }
    }
}

impl fmt::Display for LineBreak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LineBreak {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "LF" => Ok(LineBreak::Lf),
            "CR" => Ok(LineBreak::Cr),
            "CRLF" => Ok(LineBreak::Crlf),
            _ => Err(TextError::UnknownName {
                kind: "line break",
                name: s.to_string(),
            }),
        }
    }
}

/// Remembers the first record terminator of a session.
///
/// Later terminators are accepted by the reader whatever their form; they
/// just no longer change the detected value.
#[derive(Debug, Default, Clone, Copy)]
pub struct LineBreakDetector {
    detected: Option<LineBreak>,
}

impl LineBreakDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, line_break: LineBreak) {
        if self.detected.is_none() {
            tracing::debug!(line_break = %line_break, "detected line break");
            self.detected = Some(line_break);
        }
    }

    /// `None` until a terminator has been observed.
    pub fn detected(&self) -> Option<LineBreak> {
        self.detected
    }
}

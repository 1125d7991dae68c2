//! Encoding adapter — bytes to text on the way in, text to bytes on the way out.
//!
//! The reader and writers only ever see Unicode text. Everything byte-level
//! lives here:
//!
//! - [`decode`] transforms a whole input stream at once. Quoted fields may
//!   embed line breaks and double-byte sequences must never be split, so there
//!   is no line-by-line decoding.
//! - [`TranscodeWriter`] encodes each text chunk as it is written and buffers
//!   the resulting bytes in front of the sink.
//! - [`Encoding::bom`] supplies the byte-order mark a variant must emit.
//!
//! Shift_JIS and UTF-16 decoding are delegated to `encoding_rs`. UTF-16 output
//! is produced directly from `str::encode_utf16`, since `encoding_rs` only
//! decodes UTF-16.

use std::borrow::Cow;
use std::fmt;
use std::io::{BufWriter, Read, Write};
use std::str::FromStr;

use encoding_rs::{SHIFT_JIS, UTF_16BE, UTF_16LE, UTF_8};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TextError};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16BE_BOM: &[u8] = &[0xFE, 0xFF];
const UTF16LE_BOM: &[u8] = &[0xFF, 0xFE];

/// Bytes buffered by [`TranscodeWriter`] before they are handed to the sink.
const BUFFER_CAPACITY: usize = 8 * 1024;

/// A character encoding for delimited text.
///
/// Variants ending in `M` carry a mandatory byte-order mark on output. On
/// input a leading BOM of the variant's family is always skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Encoding {
    #[default]
    #[serde(rename = "UTF8")]
    Utf8,
    #[serde(rename = "UTF8M")]
    Utf8M,
    /// Byte order taken from the BOM on input (big-endian when absent);
    /// big-endian with BOM on output.
    #[serde(rename = "UTF16")]
    Utf16,
    #[serde(rename = "UTF16BE")]
    Utf16Be,
    #[serde(rename = "UTF16LE")]
    Utf16Le,
    #[serde(rename = "UTF16BEM")]
    Utf16BeM,
    #[serde(rename = "UTF16LEM")]
    Utf16LeM,
    /// Shift_JIS.
    #[serde(rename = "SJIS")]
    Sjis,
}

impl Encoding {
    /// Every supported encoding, in canonical order.
    pub const ALL: [Encoding; 8] = [
        Encoding::Utf8,
        Encoding::Utf8M,
        Encoding::Utf16,
        Encoding::Utf16Be,
        Encoding::Utf16Le,
        Encoding::Utf16BeM,
        Encoding::Utf16LeM,
        Encoding::Sjis,
    ];

    /// Canonical upper-case name, e.g. `UTF16LEM`.
    pub fn name(self) -> &'static str {
        match self {
            Encoding::Utf8 => "UTF8",
            Encoding::Utf8M => "UTF8M",
            Encoding::Utf16 => "UTF16",
            Encoding::Utf16Be => "UTF16BE",
            Encoding::Utf16Le => "UTF16LE",
            Encoding::Utf16BeM => "UTF16BEM",
            Encoding::Utf16LeM => "UTF16LEM",
            Encoding::Sjis => "SJIS",
        }
    }

    /// The byte-order mark this variant writes before any content.
    /// Empty for unmarked variants.
    pub fn bom(self) -> &'static [u8] {
        match self {
            Encoding::Utf8M => UTF8_BOM,
            Encoding::Utf16 | Encoding::Utf16BeM => UTF16BE_BOM,
            Encoding::Utf16LeM => UTF16LE_BOM,
            Encoding::Utf8 | Encoding::Utf16Be | Encoding::Utf16Le | Encoding::Sjis => &[],
        }
    }

    /// Decode a complete byte buffer, skipping a leading BOM.
    pub fn decode_bytes(self, bytes: &[u8]) -> Result<String> {
        let text = match self {
            Encoding::Utf8 | Encoding::Utf8M => strict(UTF_8, strip_prefix(bytes, UTF8_BOM)),
            Encoding::Utf16 => {
                let (family, bom_len) = encoding_rs::Encoding::for_bom(bytes)
                    .filter(|(family, _)| *family == UTF_16BE || *family == UTF_16LE)
                    .unwrap_or((UTF_16BE, 0));
                strict(family, &bytes[bom_len..])
            }
            Encoding::Utf16Be | Encoding::Utf16BeM => {
                strict(UTF_16BE, strip_prefix(bytes, UTF16BE_BOM))
            }
            Encoding::Utf16Le | Encoding::Utf16LeM => {
                strict(UTF_16LE, strip_prefix(bytes, UTF16LE_BOM))
            }
            Encoding::Sjis => strict(SHIFT_JIS, bytes),
        };
        text.map(Cow::into_owned)
            .ok_or(TextError::Decode { encoding: self })
    }

    /// Encode text into this encoding. The BOM is not included.
    pub fn encode_text<'a>(self, text: &'a str) -> Result<Cow<'a, [u8]>> {
        match self {
            Encoding::Utf8 | Encoding::Utf8M => Ok(Cow::Borrowed(text.as_bytes())),
            Encoding::Utf16 | Encoding::Utf16Be | Encoding::Utf16BeM => Ok(Cow::Owned(
                text.encode_utf16().flat_map(u16::to_be_bytes).collect(),
            )),
            Encoding::Utf16Le | Encoding::Utf16LeM => Ok(Cow::Owned(
                text.encode_utf16().flat_map(u16::to_le_bytes).collect(),
            )),
            Encoding::Sjis => {
                let (bytes, _, had_errors) = SHIFT_JIS.encode(text);
                if had_errors {
                    // encoding_rs substitutes numeric character references;
                    // report the first character it could not map instead.
                    let character = text
                        .chars()
                        .find(|c| {
                            let mut scratch = [0u8; 4];
                            SHIFT_JIS.encode(c.encode_utf8(&mut scratch)).2
                        })
                        .unwrap_or(char::REPLACEMENT_CHARACTER);
                    return Err(TextError::Unmappable {
                        encoding: self,
                        character,
                    });
                }
                Ok(bytes)
            }
        }
    }
}

fn strict<'a>(family: &'static encoding_rs::Encoding, bytes: &'a [u8]) -> Option<Cow<'a, str>> {
    family.decode_without_bom_handling_and_without_replacement(bytes)
}

fn strip_prefix<'a>(bytes: &'a [u8], bom: &[u8]) -> &'a [u8] {
    bytes.strip_prefix(bom).unwrap_or(bytes)
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Encoding {
    type Err = TextError;

    /// Case-insensitive; `-` and `_` are ignored, so `utf-8` and `Shift_JIS`
    /// are accepted alongside the canonical names.
    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .map(|c| c.to_ascii_uppercase())
            .collect();
        match normalized.as_str() {
            "SHIFTJIS" => Ok(Encoding::Sjis),
            name => Encoding::ALL
                .into_iter()
                .find(|encoding| encoding.name() == name)
                .ok_or_else(|| TextError::UnknownName {
                    kind: "encoding",
                    name: s.to_string(),
                }),
        }
    }
}

/// Read an entire stream and decode it as `encoding`.
///
/// A failure of the underlying reader is reported as
/// [`TextError::EncodingConstruction`]; invalid byte sequences as
/// [`TextError::Decode`].
pub fn decode<R: Read>(mut reader: R, encoding: Encoding) -> Result<String> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|source| TextError::EncodingConstruction { encoding, source })?;
    let text = encoding.decode_bytes(&bytes)?;
    tracing::debug!(
        %encoding,
        bytes = bytes.len(),
        chars = text.chars().count(),
        "decoded input stream"
    );
    Ok(text)
}

/// A buffered text sink that encodes into a target encoding.
///
/// Text is encoded per `write_str`/`write_char` call, so an unmappable
/// character is reported by the call that supplied it. Encoded bytes go
/// through a [`BufWriter`] and are only guaranteed to reach the sink after
/// [`flush`].
///
/// [`flush`]: TranscodeWriter::flush
pub struct TranscodeWriter<W: Write> {
    inner: BufWriter<W>,
    encoding: Encoding,
}

impl<W: Write> TranscodeWriter<W> {
    /// Wrap `inner`, writing the encoding's byte-order mark (if any) right away.
    pub fn new(mut inner: W, encoding: Encoding) -> Result<Self> {
        let bom = encoding.bom();
        if !bom.is_empty() {
            inner
                .write_all(bom)
                .map_err(|source| TextError::EncodingConstruction { encoding, source })?;
            tracing::debug!(%encoding, bytes = bom.len(), "wrote byte-order mark");
        }
        Ok(Self {
            inner: BufWriter::with_capacity(BUFFER_CAPACITY, inner),
            encoding,
        })
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn write_str(&mut self, s: &str) -> Result<()> {
        let bytes = self.encoding.encode_text(s)?;
        self.inner.write_all(&bytes)?;
        Ok(())
    }

    pub fn write_char(&mut self, c: char) -> Result<()> {
        let mut scratch = [0u8; 4];
        self.write_str(c.encode_utf8(&mut scratch))
    }

    /// Push all buffered bytes to the sink and flush it.
    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    pub fn get_ref(&self) -> &W {
        self.inner.get_ref()
    }

    /// Flush and return the sink.
    pub fn into_inner(self) -> Result<W> {
        let mut inner = self.inner.into_inner().map_err(|err| err.into_error())?;
        inner.flush()?;
        Ok(inner)
    }
}

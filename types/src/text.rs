//! Small pure text helpers for column arithmetic.

use serde::{Deserialize, Serialize};

/// Unit in which [`crate::Position::character`] counts columns.
///
/// Names follow the LSP `PositionEncodingKind` values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PositionEncoding {
    /// Bytes of UTF-8.
    #[serde(rename = "utf-8")]
    Utf8,
    /// UTF-16 code units (the LSP wire default).
    #[serde(rename = "utf-16")]
    Utf16,
    /// Unicode scalar values.
    #[default]
    #[serde(rename = "utf-32")]
    Utf32,
}

impl PositionEncoding {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Utf16 => "utf-16",
            Self::Utf32 => "utf-32",
        }
    }

    /// Width of a single `char` in this encoding.
    #[must_use]
    pub fn char_width(self, c: char) -> usize {
        match self {
            Self::Utf8 => c.len_utf8(),
            Self::Utf16 => c.len_utf16(),
            Self::Utf32 => 1,
        }
    }

    /// Column reached after `prefix`, measured in this encoding.
    #[must_use]
    pub fn column_of(self, prefix: &str) -> u32 {
        let width = match self {
            Self::Utf8 => prefix.len(),
            Self::Utf16 => prefix.chars().map(char::len_utf16).sum(),
            Self::Utf32 => prefix.chars().count(),
        };
        width as u32
    }

    /// Byte offset inside `line` for `column`.
    ///
    /// Columns past the end clamp to `line.len()`. A column that lands inside a
    /// multi-unit character rounds down to that character's start.
    #[must_use]
    pub fn byte_offset_of_column(self, line: &str, column: u32) -> usize {
        let column = column as usize;
        let mut units = 0;
        for (idx, c) in line.char_indices() {
            if units >= column {
                return idx;
            }
            let width = self.char_width(c);
            if units + width > column {
                return idx;
            }
            units += width;
        }
        line.len()
    }
}

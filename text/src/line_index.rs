//! Offset <-> (line, column) mapping over one text snapshot.
//!
//! Offsets are byte offsets into the UTF-8 text. Columns are measured in the
//! caller's [`PositionEncoding`]. Every line records the delimiter it actually
//! ended with, so slices taken through the index are byte-exact for `\n`,
//! `\r\n` and `\r` alike.
//!
//! The text after the last delimiter is always a line of its own, possibly
//! empty: `"a\n"` has two lines, `""` has one.

use reweave_types::{Position, PositionEncoding};

use crate::TextError;

/// The delimiter that terminated a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineEnding {
    Lf,
    CrLf,
    Cr,
}

impl LineEnding {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
            Self::Cr => "\r",
        }
    }

    #[must_use]
    pub const fn len(self) -> usize {
        self.as_str().len()
    }
}

#[derive(Debug, Clone, Copy)]
struct Line {
    start: usize,
    /// Byte length including the delimiter.
    len: usize,
    ending: Option<LineEnding>,
}

impl Line {
    fn end(self) -> usize {
        self.start + self.len
    }

    fn content_end(self) -> usize {
        self.end() - self.ending.map_or(0, LineEnding::len)
    }
}

/// Line table over a borrowed text.
#[derive(Debug, Clone)]
pub struct LineIndex<'a> {
    text: &'a str,
    lines: Vec<Line>,
}

impl<'a> LineIndex<'a> {
    /// Scan `text` once and record every line boundary.
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        let bytes = text.as_bytes();
        let mut lines = Vec::new();
        let mut start = 0;
        let mut i = 0;

        while i < bytes.len() {
            let ending = match bytes[i] {
                b'\n' => Some(LineEnding::Lf),
                b'\r' if bytes.get(i + 1) == Some(&b'\n') => Some(LineEnding::CrLf),
                b'\r' => Some(LineEnding::Cr),
                _ => None,
            };
            match ending {
                Some(ending) => {
                    let end = i + ending.len();
                    lines.push(Line {
                        start,
                        len: end - start,
                        ending: Some(ending),
                    });
                    start = end;
                    i = end;
                }
                None => i += 1,
            }
        }

        lines.push(Line {
            start,
            len: bytes.len() - start,
            ending: None,
        });

        Self { text, lines }
    }

    #[must_use]
    pub fn text(&self) -> &'a str {
        self.text
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Number of lines, counting the (possibly empty) line after the last delimiter.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Text of line `i` including its delimiter.
    #[must_use]
    pub fn line(&self, i: usize) -> Option<&'a str> {
        self.lines.get(i).map(|line| &self.text[line.start..line.end()])
    }

    /// Text of line `i` without its delimiter.
    #[must_use]
    pub fn line_content(&self, i: usize) -> Option<&'a str> {
        self.lines
            .get(i)
            .map(|line| &self.text[line.start..line.content_end()])
    }

    #[must_use]
    pub fn line_ending(&self, i: usize) -> Option<LineEnding> {
        self.lines.get(i).and_then(|line| line.ending)
    }

    /// Start offset of line `i`.
    ///
    /// `i == line_count()` addresses the end of the text.
    pub fn offset_of_line(&self, i: usize) -> Result<usize, TextError> {
        match self.lines.get(i) {
            Some(line) => Ok(line.start),
            None if i == self.lines.len() => Ok(self.text.len()),
            None => Err(self.line_out_of_range(i)),
        }
    }

    /// Start of line `i` if it exists, otherwise the end of line `i - 1`.
    ///
    /// Used as the exclusive end of a span of whole lines: a span that runs to
    /// the end of the text stops at the last byte instead of claiming a
    /// delimiter that is not there.
    pub fn start_of_line_or_end_of_previous_line(&self, i: usize) -> Result<usize, TextError> {
        if let Some(line) = self.lines.get(i) {
            return Ok(line.start);
        }
        if i == 0 {
            return Ok(0);
        }
        match self.lines.get(i - 1) {
            Some(previous) if i == self.lines.len() => Ok(previous.end()),
            _ => Err(self.line_out_of_range(i)),
        }
    }

    /// Line containing `offset`.
    pub fn line_of_offset(&self, offset: usize) -> Result<usize, TextError> {
        if offset > self.text.len() {
            return Err(TextError::OffsetOutOfRange {
                offset,
                len: self.text.len(),
            });
        }
        Ok(self.lines.partition_point(|line| line.start <= offset) - 1)
    }

    /// Convert a byte offset into a position with columns in `encoding`.
    pub fn position_of_offset(
        &self,
        offset: usize,
        encoding: PositionEncoding,
    ) -> Result<Position, TextError> {
        self.check_offset(offset)?;
        let line = self.line_of_offset(offset)?;
        let start = self.lines[line].start;
        let column = encoding.column_of(&self.text[start..offset]);
        Ok(Position::new(line as u32, column))
    }

    /// Convert a position back into a byte offset.
    ///
    /// Columns past the end of the line's content clamp to the content end.
    pub fn offset_of_position(
        &self,
        position: Position,
        encoding: PositionEncoding,
    ) -> Result<usize, TextError> {
        let i = position.line as usize;
        let line = self
            .lines
            .get(i)
            .copied()
            .ok_or_else(|| self.line_out_of_range(i))?;
        let content = &self.text[line.start..line.content_end()];
        Ok(line.start + encoding.byte_offset_of_column(content, position.character))
    }

    /// Position just past the last character.
    #[must_use]
    pub fn end_position(&self, encoding: PositionEncoding) -> Position {
        let last = self.lines.len() - 1;
        let start = self.lines[last].start;
        Position::new(last as u32, encoding.column_of(&self.text[start..]))
    }

    /// Fails unless `offset` lies inside the text on a character boundary.
    pub fn check_offset(&self, offset: usize) -> Result<(), TextError> {
        check_offset(self.text, offset)
    }

    /// Checked substring `start..end`.
    pub fn slice(&self, start: usize, end: usize) -> Result<&'a str, TextError> {
        self.check_offset(start)?;
        self.check_offset(end)?;
        if start > end {
            return Err(TextError::InvertedRange { start, end });
        }
        Ok(&self.text[start..end])
    }

    /// The line slices, delimiters included, that a line diff compares.
    ///
    /// The trailing empty line is left out so `"a\n"` and `"a"` both tokenize to
    /// a single line; their difference shows up in that line's delimiter.
    #[must_use]
    pub fn diff_tokens(&self) -> Vec<&'a str> {
        self.lines
            .iter()
            .filter(|line| line.len > 0)
            .map(|line| &self.text[line.start..line.end()])
            .collect()
    }

    fn line_out_of_range(&self, line: usize) -> TextError {
        TextError::LineOutOfRange {
            line,
            line_count: self.lines.len(),
        }
    }
}

/// Fails unless `offset` lies inside `text` on a character boundary.
pub fn check_offset(text: &str, offset: usize) -> Result<(), TextError> {
    if offset > text.len() {
        return Err(TextError::OffsetOutOfRange {
            offset,
            len: text.len(),
        });
    }
    if !text.is_char_boundary(offset) {
        return Err(TextError::NotCharBoundary { offset });
    }
    Ok(())
}

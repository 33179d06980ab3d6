//! Source text positions and ranges.

use std::fmt;

// Re-export from text-size for compatibility
pub use text_size::TextRange;
pub use text_size::TextSize;

/// A line and column position in source text.
///
/// Both line and column are 0-indexed internally, but displayed as 1-indexed.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, PartialOrd, Ord)]
pub struct LineCol {
    /// 0-indexed line number
    pub line: u32,
    /// 0-indexed column (in UTF-8 bytes, not characters)
    pub col: u32,
}

impl LineCol {
    /// Create a new LineCol position.
    #[inline]
    pub const fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }

    /// Create from 1-indexed line and column (as displayed to users).
    #[inline]
    pub const fn from_one_indexed(line: u32, col: u32) -> Self {
        Self {
            line: line.saturating_sub(1),
            col: col.saturating_sub(1),
        }
    }

    /// Get 1-indexed line number (for display).
    #[inline]
    pub const fn line_one_indexed(self) -> u32 {
        self.line + 1
    }

    /// Get 1-indexed column number (for display).
    #[inline]
    pub const fn col_one_indexed(self) -> u32 {
        self.col + 1
    }
}

impl fmt::Debug for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line_one_indexed(), self.col_one_indexed())
    }
}

impl fmt::Display for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line_one_indexed(), self.col_one_indexed())
    }
}

/// A start/end pair of line/column positions.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, Debug)]
pub struct LineColRange {
    pub start: LineCol,
    pub end: LineCol,
}

impl LineColRange {
    pub const fn new(start: LineCol, end: LineCol) -> Self {
        Self { start, end }
    }

    /// Check if a position falls inside this range (end inclusive).
    pub fn contains(&self, pos: LineCol) -> bool {
        self.start <= pos && pos <= self.end
    }
}

/// Index for converting between byte offsets and line/column positions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineIndex {
    /// Byte offset of the start of each line
    line_starts: Vec<TextSize>,
    /// Total length of the indexed text
    len: TextSize,
}

impl LineIndex {
    /// Build a line index from source text.
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![TextSize::from(0)];

        for (offset, c) in text.char_indices() {
            if c == '\n' {
                line_starts.push(TextSize::from((offset + 1) as u32));
            }
        }

        Self {
            line_starts,
            len: TextSize::of(text),
        }
    }

    /// Convert a byte offset to a line/column position.
    ///
    /// Offsets past the end of the text clamp to the last position.
    pub fn line_col(&self, offset: TextSize) -> LineCol {
        let offset = offset.min(self.len);
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);

        let line_start = self.line_starts[line];
        let col = offset - line_start;

        LineCol {
            line: line as u32,
            col: col.into(),
        }
    }

    /// Convert a text range to a line/column range.
    pub fn range(&self, range: TextRange) -> LineColRange {
        LineColRange::new(self.line_col(range.start()), self.line_col(range.end()))
    }

    /// Convert a line/column position to a byte offset.
    ///
    /// Returns `None` for lines past the end; columns past the end of a line
    /// clamp to the end of that line.
    pub fn offset(&self, line_col: LineCol) -> Option<TextSize> {
        let line_start = *self.line_starts.get(line_col.line as usize)?;
        let line_end = self.line_end(line_col.line as usize);
        Some((line_start + TextSize::from(line_col.col)).min(line_end))
    }

    /// Like [`LineIndex::line_col`], with the column counted in UTF-16 code
    /// units, the default position encoding of the Language Server Protocol.
    ///
    /// `text` must be the text the index was built from.
    pub fn line_col_utf16(&self, text: &str, offset: TextSize) -> LineCol {
        let LineCol { line, col } = self.line_col(offset);
        let line_start = usize::from(self.line_starts[line as usize]);
        let units: usize = text
            .get(line_start..)
            .unwrap_or("")
            .char_indices()
            .take_while(|(i, _)| *i < col as usize)
            .map(|(_, c)| c.len_utf16())
            .sum();
        LineCol::new(line, units as u32)
    }

    /// Like [`LineIndex::offset`], with the column counted in UTF-16 code
    /// units. A column inside a surrogate pair moves to the next character.
    pub fn offset_utf16(&self, text: &str, line_col: LineCol) -> Option<TextSize> {
        let line_start = *self.line_starts.get(line_col.line as usize)?;
        let line_end = self.line_end(line_col.line as usize);
        let line_text = text
            .get(usize::from(line_start)..usize::from(line_end))
            .unwrap_or("");

        let mut units = 0u32;
        for (i, c) in line_text.char_indices() {
            if units >= line_col.col {
                return Some(line_start + TextSize::from(i as u32));
            }
            units += c.len_utf16() as u32;
        }
        Some(line_end)
    }

    /// Offset of the end of `line`, before its newline.
    fn line_end(&self, line: usize) -> TextSize {
        self.line_starts
            .get(line + 1)
            .map(|next| *next - TextSize::from(1))
            .unwrap_or(self.len)
    }

    /// Get the number of lines.
    pub fn len(&self) -> usize {
        self.line_starts.len()
    }

    /// Check if there are no lines (empty file).
    pub fn is_empty(&self) -> bool {
        self.line_starts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col_display() {
        let pos = LineCol::new(0, 0);
        assert_eq!(format!("{}", pos), "1:1");

        let pos = LineCol::new(5, 10);
        assert_eq!(format!("{}", pos), "6:11");
    }

    #[test]
    fn test_line_col_ordering() {
        assert!(LineCol::new(0, 9) < LineCol::new(1, 0));
        assert!(LineCol::new(2, 1) < LineCol::new(2, 3));
    }

    #[test]
    fn test_line_index_multi_line() {
        let index = LineIndex::new("hello\nworld\n!");

        assert_eq!(index.line_col(TextSize::from(0)), LineCol::new(0, 0));
        assert_eq!(index.line_col(TextSize::from(5)), LineCol::new(0, 5));
        assert_eq!(index.line_col(TextSize::from(6)), LineCol::new(1, 0));
        assert_eq!(index.line_col(TextSize::from(12)), LineCol::new(2, 0));
        assert_eq!(index.line_col(TextSize::from(99)), LineCol::new(2, 1));
    }

    #[test]
    fn test_line_index_offset() {
        let index = LineIndex::new("hello\nworld");

        assert_eq!(index.offset(LineCol::new(0, 0)), Some(TextSize::from(0)));
        assert_eq!(index.offset(LineCol::new(1, 0)), Some(TextSize::from(6)));
        assert_eq!(index.offset(LineCol::new(1, 3)), Some(TextSize::from(9)));
        assert_eq!(index.offset(LineCol::new(0, 40)), Some(TextSize::from(5)));
        assert_eq!(index.offset(LineCol::new(7, 0)), None);
    }

    #[test]
    fn test_line_index_utf16_columns() {
        let text = "a é $x\n😀$y";
        let index = LineIndex::new(text);

        // `é` is two bytes but one UTF-16 unit
        assert_eq!(index.line_col(TextSize::from(5)), LineCol::new(0, 5));
        assert_eq!(index.line_col_utf16(text, TextSize::from(5)), LineCol::new(0, 4));
        assert_eq!(index.offset_utf16(text, LineCol::new(0, 4)), Some(TextSize::from(5)));

        // `😀` is four bytes and a surrogate pair
        let dollar = TextSize::from(text.rfind('$').unwrap() as u32);
        assert_eq!(index.line_col_utf16(text, dollar), LineCol::new(1, 2));
        assert_eq!(index.offset_utf16(text, LineCol::new(1, 2)), Some(dollar));
        assert_eq!(index.offset_utf16(text, LineCol::new(1, 1)), Some(dollar));

        assert_eq!(index.offset_utf16(text, LineCol::new(0, 40)), Some(TextSize::from(7)));
        assert_eq!(index.offset_utf16(text, LineCol::new(5, 0)), None);
    }

    #[test]
    fn test_line_index_range() {
        let index = LineIndex::new("$a: 1;\n$b: 2;");
        let range = index.range(TextRange::new(7.into(), 9.into()));
        assert_eq!(range.start, LineCol::new(1, 0));
        assert_eq!(range.end, LineCol::new(1, 2));
        assert!(range.contains(LineCol::new(1, 1)));
        assert!(!range.contains(LineCol::new(0, 1)));
    }
}

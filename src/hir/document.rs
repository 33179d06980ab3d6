//! Versioned text documents.

use std::sync::Arc;

use crate::base::{LineCol, LineColRange, LineIndex, TextRange, TextSize, Uri};
use crate::parser::Dialect;

/// A versioned text buffer identified by a URI.
#[derive(Debug, Clone)]
pub struct TextDocument {
    pub uri: Uri,
    pub dialect: Dialect,
    pub version: i32,
    pub text: Arc<str>,
    line_index: LineIndex,
}

impl TextDocument {
    pub fn new(uri: impl Into<Uri>, dialect: Dialect, version: i32, text: impl Into<Arc<str>>) -> Self {
        let text = text.into();
        Self {
            uri: uri.into(),
            dialect,
            version,
            line_index: LineIndex::new(&text),
            text,
        }
    }

    /// Create a document whose dialect is inferred from the URI extension,
    /// defaulting to SCSS.
    pub fn from_uri(uri: impl Into<Uri>, version: i32, text: impl Into<Arc<str>>) -> Self {
        let uri = uri.into();
        let dialect = Dialect::from_path(&uri).unwrap_or_default();
        Self::new(uri, dialect, version, text)
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    pub fn offset_at(&self, position: LineCol) -> Option<TextSize> {
        self.line_index.offset(position)
    }

    pub fn position_at(&self, offset: TextSize) -> LineCol {
        self.line_index.line_col(offset)
    }

    pub fn range(&self, range: TextRange) -> LineColRange {
        self.line_index.range(range)
    }

    /// Position with the column in UTF-16 code units, as LSP clients send it.
    pub fn position_at_utf16(&self, offset: TextSize) -> LineCol {
        self.line_index.line_col_utf16(&self.text, offset)
    }

    pub fn offset_at_utf16(&self, position: LineCol) -> Option<TextSize> {
        self.line_index.offset_utf16(&self.text, position)
    }

    pub fn range_utf16(&self, range: TextRange) -> LineColRange {
        LineColRange::new(
            self.position_at_utf16(range.start()),
            self.position_at_utf16(range.end()),
        )
    }

    pub fn slice(&self, range: TextRange) -> &str {
        self.text.get(std::ops::Range::<usize>::from(range)).unwrap_or("")
    }
}

//! Foundation types for the sassy toolchain.
//!
//! This module provides fundamental types used throughout the analyzer:
//! - [`TextRange`], [`TextSize`] - Source positions
//! - [`LineCol`], [`LineIndex`] - Line/column conversion
//! - [`Uri`] - Document identifiers and path helpers
//!
//! This module has NO dependencies on other sassy modules.

mod span;
pub mod uri;

pub use span::{LineCol, LineColRange, LineIndex, TextRange, TextSize};
pub use uri::Uri;

// Re-export text-size types for convenience
pub use text_size;

//! Rowan-based parser for SCSS and indented Sass
//!
//! This module provides a lossless parser using:
//! - **logos** for fast lexing
//! - **rowan** for the CST (Concrete Syntax Tree)
//!
//! ## Architecture
//!
//! ```text
//! Source Text (host documents: embedded style blocks only)
//!     ↓
//! Lexer (logos) → Tokens with SyntaxKind (+ layout tokens for `.sass`)
//!     ↓
//! Parser → GreenNode tree (immutable, cheap to clone)
//!     ↓
//! SyntaxNode (rowan) → CST with parent pointers
//!     ↓
//! AST layer → Typed wrappers over SyntaxNode
//!     ↓
//! HIR → Symbols, links, module graph
//! ```
//!
//! The parser never fails: syntax errors are recorded with their range and
//! the tree still covers every byte of the input.

#[allow(clippy::module_inception)]
mod parser;

pub mod ast;
mod dialect;
mod lexer;
mod syntax_kind;

pub use ast::*;
pub use dialect::{Dialect, extract_embedded};
pub use lexer::{Lexer, Token, tokenize, tokenize_indented};
pub use parser::{Parse, SyntaxError, parse};
pub use syntax_kind::{SassLanguage, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken};

/// Re-export rowan types for convenience
pub use rowan::{GreenNode, TextRange, TextSize};

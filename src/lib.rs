//! # sassy-base
//!
//! Core library for Sass (SCSS and indented syntax) parsing and
//! module-aware static analysis.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! ide     → IDE features (completion, hover, goto-def, rename)
//!   ↓
//! hir     → Stylesheet cache, module graph, symbol resolution
//!   ↓
//! parser  → Lexer + lossless rowan parser for both syntaxes
//!   ↓
//! base    → Primitives (Uri, Span, line index)
//! ```
//!
//! `project` sits beside `hir`: file system access, settings and the
//! workspace scan.

/// Foundation types: Uri, Span, line/column conversion
pub mod base;

/// High-level IR: cache, module graph and resolution
pub mod hir;

/// IDE features: completion, hover, goto-definition, find-references
pub mod ide;

pub mod parser;
pub mod project;

// Re-export foundation types
pub use base::{LineCol, LineIndex, TextRange, TextSize, Uri};
pub use ide::{Analysis, AnalysisHost};

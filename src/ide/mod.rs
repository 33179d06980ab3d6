//! IDE features: High-level APIs for LSP handlers.
//!
//! This module provides the interface between the resolution engine (HIR)
//! and a language server. Each function corresponds to an LSP request.
//!
//! ## Design Principles
//!
//! 1. **Pure functions**: Take data in, return data out
//! 2. **No LSP types**: Uses our own types, converted at the LSP boundary
//! 3. **Empty over error**: a request that cannot be answered yields nothing
//!
//! ## Usage
//!
//! The recommended way to use this module is through `AnalysisHost`:
//!
//! ```ignore
//! use sassy::base::LineCol;
//! use sassy::ide::AnalysisHost;
//!
//! let host = AnalysisHost::default();
//! host.open_document("file:///app.scss", Some("scss"), 1, "@use \"theme\";");
//!
//! let analysis = host.analysis();
//! let definition = analysis.goto_definition("file:///app.scss", LineCol::new(0, 6));
//! ```

mod analysis;
mod completion;
mod document_links;
mod folding;
mod goto;
mod hover;
mod references;
mod rename;
mod selection;
mod semantic_tokens;
mod symbols;

pub use analysis::{Analysis, AnalysisHost};
pub use completion::{CompletionItem, CompletionKind, completions};
pub use document_links::{DocumentLink, document_links};
pub use folding::{FoldingKind, FoldingRange, folding_ranges};
pub use goto::{GotoResult, GotoTarget, Location, goto_definition};
pub use hover::{HoverResult, MAX_ALIAS_DEPTH, hover, resolve_value};
pub use references::{Reference, ReferenceResult, find_references, references_to};
pub use rename::{PrepareRename, RenameError, SourceChange, TextEdit, is_valid_identifier, prepare_rename, rename};
pub use selection::{selection_ranges, selection_ranges_at};
pub use semantic_tokens::{MODIFIER_DECLARATION, SemanticToken, TokenType, semantic_tokens};
pub use symbols::{SymbolInfo, WorkspaceSymbol, document_symbols, workspace_symbols};

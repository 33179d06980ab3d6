//! High-level IR: the module-graph resolution engine.
//!
//! ```text
//! TextDocument ──parse──▶ CacheEntry (green tree, symbols, links)
//!                              │
//!                  LinkResolver│resolves @use/@forward/@import targets
//!                              ▼
//!                        ModuleGraph ──traverse──▶ definition / references
//! ```
//!
//! Every feature of the `ide` layer is a consumer of [`ModuleGraph`] over a
//! shared [`StylesheetCache`].

pub mod builtins;
mod cache;
pub mod definition;
pub mod diagnostics;
mod document;
mod graph;
pub mod links;
mod resolve;
pub mod symbols;

pub use cache::{CacheEntry, EvictionPolicy, StylesheetCache};
pub use definition::{Definition, Target, definition_at, occurrence_at, resolve_name, resolve_occurrence};
pub use diagnostics::{
    CheckOptions, Diagnostic, DiagnosticCollector, DiagnosticTag, RelatedInfo, Severity, check_file,
};
pub use document::TextDocument;
pub use graph::{ForwardEdge, Module, ModuleGraph, ModuleScope, Namespace, TraversalOptions};
pub use links::{Link, LinkKind, Visibility, extract_links};
pub use resolve::{LinkResolver, ResolverConfig};
pub use symbols::{
    FileSymbols, LocalScope, Occurrence, OccurrenceKind, SassDoc, SassSymbol, SymbolKind, extract_symbols,
};

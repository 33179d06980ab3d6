//! Document and workspace symbols.

use crate::base::{LineColRange, TextRange};
use crate::hir::{CacheEntry, SassSymbol, StylesheetCache, SymbolKind};

use super::goto::Location;

/// A symbol for the outline view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolInfo {
    pub name: String,
    pub kind: SymbolKind,
    pub range: TextRange,
    pub selection_range: TextRange,
    pub line_col: LineColRange,
    pub detail: Option<String>,
    pub deprecated: bool,
    /// Parameters and local variables of mixins and functions.
    pub children: Vec<SymbolInfo>,
}

/// Module-level declarations of a document, with their locals nested.
pub fn document_symbols(entry: &CacheEntry) -> Vec<SymbolInfo> {
    entry
        .symbols()
        .symbols
        .iter()
        .map(|symbol| symbol_info(entry, symbol))
        .collect()
}

fn symbol_info(entry: &CacheEntry, symbol: &SassSymbol) -> SymbolInfo {
    SymbolInfo {
        name: symbol.name.to_string(),
        kind: symbol.kind,
        range: symbol.range,
        selection_range: symbol.selection_range,
        line_col: entry.document().range(symbol.selection_range),
        detail: symbol.detail.clone().or_else(|| symbol.value.clone()),
        deprecated: symbol.deprecation().is_some(),
        children: symbol.children.iter().map(|c| symbol_info(entry, c)).collect(),
    }
}

/// A match of a workspace symbol search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceSymbol {
    pub name: String,
    pub kind: SymbolKind,
    pub location: Location,
}

/// Search module-level declarations of every cached document. The query
/// matches when its characters appear in order in the name, ignoring case.
/// An empty query matches everything.
pub fn workspace_symbols(cache: &StylesheetCache, query: &str) -> Vec<WorkspaceSymbol> {
    let query = query.to_lowercase();
    let mut out = Vec::new();
    for entry in cache.entries() {
        for symbol in &entry.symbols().symbols {
            if fuzzy_match(&symbol.name, &query) {
                out.push(WorkspaceSymbol {
                    name: symbol.name.to_string(),
                    kind: symbol.kind,
                    location: Location::new(&entry, symbol.selection_range),
                });
            }
        }
    }
    out
}

fn fuzzy_match(name: &str, lowercase_query: &str) -> bool {
    let mut chars = name.chars().flat_map(char::to_lowercase);
    lowercase_query.chars().all(|q| chars.any(|c| c == q))
}

//! Rename.
//!
//! Only the base identifier is rewritten: the sigil and any forwarding
//! prefix written in front of it stay. Renaming `$ki-day` to `gato` edits
//! `day` in the declaration and `day` inside `$ki-day` at every reference.

use std::sync::Arc;

use indexmap::IndexMap;
use thiserror::Error;

use crate::base::{LineColRange, TextRange, TextSize, Uri};
use crate::hir::{CacheEntry, ModuleGraph, Target, resolve_occurrence};

use super::references::references_to;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenameError {
    #[error("no symbol at this position")]
    NoSymbol,
    #[error("built-in members cannot be renamed")]
    Builtin,
    #[error("`{0}` is not a valid identifier")]
    InvalidName(String),
}

/// The range a rename would replace and its current text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrepareRename {
    pub range: TextRange,
    pub placeholder: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub range: TextRange,
    pub line_col: LineColRange,
    pub new_text: String,
}

/// Edits grouped per document, in the order documents were visited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceChange {
    pub edits: IndexMap<Uri, Vec<TextEdit>>,
}

impl SourceChange {
    pub fn file_count(&self) -> usize {
        self.edits.len()
    }

    pub fn edits_for(&self, uri: &str) -> &[TextEdit] {
        self.edits.get(uri).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Check that the symbol under `offset` can be renamed and return the base
/// name range to highlight.
pub fn prepare_rename(
    graph: &ModuleGraph<'_>,
    entry: &Arc<CacheEntry>,
    offset: TextSize,
) -> Result<PrepareRename, RenameError> {
    let symbols = entry.symbols();
    let occurrence = symbols.occurrence_at(offset).ok_or(RenameError::NoSymbol)?;
    let def = match resolve_occurrence(graph, entry, occurrence) {
        Some(Target::Declaration(def)) => def,
        Some(Target::Builtin { .. }) => return Err(RenameError::Builtin),
        None => return Err(RenameError::NoSymbol),
    };
    let base = def.symbol.base_name();
    let range = base_range(occurrence.name_range, &occurrence.name, base).ok_or(RenameError::NoSymbol)?;
    Ok(PrepareRename {
        range,
        placeholder: base.to_string(),
    })
}

/// Rename the symbol under `offset` to `new_name`. A leading sigil on
/// `new_name` is ignored.
pub fn rename(
    graph: &ModuleGraph<'_>,
    entry: &Arc<CacheEntry>,
    offset: TextSize,
    new_name: &str,
) -> Result<SourceChange, RenameError> {
    let symbols = entry.symbols();
    let occurrence = symbols.occurrence_at(offset).ok_or(RenameError::NoSymbol)?;
    let target = resolve_occurrence(graph, entry, occurrence).ok_or(RenameError::NoSymbol)?;
    let Target::Declaration(def) = &target else {
        return Err(RenameError::Builtin);
    };

    let sigil = def.symbol.kind.sigil();
    let new_base = new_name.strip_prefix(sigil).filter(|_| !sigil.is_empty()).unwrap_or(new_name);
    if !is_valid_identifier(new_base) {
        return Err(RenameError::InvalidName(new_name.to_string()));
    }

    let base = def.symbol.base_name();
    let mut change = SourceChange::default();
    for reference in references_to(graph, &target, true) {
        let Some(range) = base_range(reference.location.range, &reference.name, base) else {
            continue;
        };
        let Some(document) = graph.entry(&reference.location.uri) else {
            continue;
        };
        let edits = change.edits.entry(reference.location.uri.clone()).or_default();
        if edits.iter().any(|e| e.range == range) {
            continue;
        }
        edits.push(TextEdit {
            range,
            line_col: document.document().range(range),
            new_text: new_base.to_string(),
        });
    }
    Ok(change)
}

/// The trailing `base` portion of a name occupying `name_range`.
fn base_range(name_range: TextRange, name: &str, base: &str) -> Option<TextRange> {
    if !name.ends_with(base) || base.is_empty() {
        return None;
    }
    let end = name_range.end();
    Some(TextRange::new(end - TextSize::of(base), end))
}

/// A CSS identifier: starts with a letter, `_`, `-` or non-ASCII, continues
/// with those, digits or `-`.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    let body = |c: char| c == '-' || c == '_' || unicode_ident::is_xid_continue(c);
    (first == '-' || first == '_' || unicode_ident::is_xid_start(first)) && chars.all(body)
}

//! Find references.
//!
//! Every cached document is scanned for occurrences whose base name
//! contains the definition's base name (forwarding prefixes make the written
//! name longer). Each candidate is then resolved on its own and kept only if
//! it lands on the same declaration.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;

use crate::base::TextSize;
use crate::hir::{CacheEntry, Definition, ModuleGraph, Occurrence, OccurrenceKind, Target, resolve_occurrence};

use super::goto::Location;

/// One confirmed reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// The name as written, sigil included.
    pub location: Location,
    pub name: SmolStr,
    pub is_declaration: bool,
}

/// Result of a find-references request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceResult {
    /// What the references point at. Built-in members have no file-backed
    /// declaration.
    pub target: Target,
    pub references: Vec<Reference>,
}

impl ReferenceResult {
    pub fn definition(&self) -> Option<&Definition> {
        self.target.declaration()
    }
}

/// Find every reference to the symbol under `offset`.
pub fn find_references(
    graph: &ModuleGraph<'_>,
    entry: &Arc<CacheEntry>,
    offset: TextSize,
    include_declaration: bool,
) -> Option<ReferenceResult> {
    let symbols = entry.symbols();
    let occurrence = symbols.occurrence_at(offset)?;
    let target = resolve_occurrence(graph, entry, occurrence)?;
    let references = references_to(graph, &target, include_declaration);
    Some(ReferenceResult { target, references })
}

/// Every occurrence resolving to `target`, in cache order then source order.
pub fn references_to(graph: &ModuleGraph<'_>, target: &Target, include_declaration: bool) -> Vec<Reference> {
    let (kind, base_name) = match target {
        Target::Declaration(def) => (def.symbol.kind, def.symbol.base_name()),
        Target::Builtin { member, .. } => (member.kind, crate::hir::symbols::strip_sigil(member.name)),
    };

    // a local can only be referenced from its own document
    let documents = match target {
        Target::Declaration(def) if def.local => graph.entry(&def.uri).into_iter().collect(),
        _ => distinct_documents(graph),
    };

    let mut references = Vec::new();
    for document in documents {
        let symbols = document.symbols();
        let mut memo: FxHashMap<(OccurrenceKind, Option<SmolStr>, SmolStr), bool> = FxHashMap::default();

        for occurrence in &symbols.occurrences {
            if !occurrence.kind.symbol_kinds().contains(&kind) || !occurrence.base_name().contains(base_name) {
                continue;
            }
            if occurrence.is_declaration && !include_declaration {
                continue;
            }
            let confirmed = if is_memoizable(occurrence, &document) {
                let key = (occurrence.kind, occurrence.namespace.clone(), occurrence.name.clone());
                *memo
                    .entry(key)
                    .or_insert_with(|| lands_on(graph, &document, occurrence, target))
            } else {
                lands_on(graph, &document, occurrence, target)
            };
            if confirmed {
                references.push(Reference {
                    location: Location::new(&document, occurrence.name_range),
                    name: occurrence.name.clone(),
                    is_declaration: occurrence.is_declaration,
                });
            }
        }
    }
    references
}

/// Cached documents, one per file on disk. Where a file is cached under two
/// URIs the editor's copy is kept.
fn distinct_documents(graph: &ModuleGraph<'_>) -> Vec<Arc<CacheEntry>> {
    let entries = graph.cache.entries();
    let open: FxHashSet<_> = entries
        .iter()
        .filter(|e| e.is_open())
        .map(|e| graph.canonical(e.uri()))
        .collect();
    let mut seen = FxHashSet::default();
    entries
        .into_iter()
        .filter(|entry| {
            let canonical = graph.canonical(entry.uri());
            (entry.is_open() || !open.contains(&canonical)) && seen.insert(canonical)
        })
        .collect()
}

/// Whether the resolution of an occurrence depends only on its name.
fn is_memoizable(occurrence: &Occurrence, document: &CacheEntry) -> bool {
    if occurrence.is_declaration || occurrence.visibility_of.is_some() {
        return false;
    }
    occurrence.kind != OccurrenceKind::Variable
        || occurrence.namespace.is_some()
        || document
            .symbols()
            .local_variable_at(&occurrence.name, occurrence.name_range.start())
            .is_none()
}

fn lands_on(graph: &ModuleGraph<'_>, document: &Arc<CacheEntry>, occurrence: &Occurrence, target: &Target) -> bool {
    match (resolve_occurrence(graph, document, occurrence), target) {
        (Some(Target::Declaration(found)), Target::Declaration(wanted)) => found.same_declaration(wanted, graph),
        (Some(Target::Builtin { module: m1, member: n1 }), Target::Builtin { module: m2, member: n2 }) => {
            m1.name == m2.name && n1.name == n2.name && n1.kind == n2.kind
        }
        _ => false,
    }
}

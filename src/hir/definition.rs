//! Definition lookup.
//!
//! Resolves an identifier occurrence to its declaration:
//!
//! 1. a declaration resolves to itself
//! 2. variables resolve through local scopes first
//! 3. names in a `@forward` `show`/`hide` list resolve through that edge
//! 4. otherwise the module graph is walked from the document; the first
//!    module whose scope matches the reference's namespace and whose symbol
//!    table declares the name (with forwarding prefixes removed) wins
//! 5. references without a namespace fall back to a flat scan of every
//!    known document, for code that relies on `@import`
//! 6. global built-in functions
//!
//! Depth-first source order of the walk is the tie-break between
//! candidates.

use std::sync::Arc;

use smol_str::SmolStr;

use crate::base::{TextSize, Uri};

use super::builtins::{self, BuiltinMember, BuiltinModule};
use super::cache::CacheEntry;
use super::graph::{Module, ModuleGraph, ModuleScope, Namespace, TraversalOptions};
use super::links::Link;
use super::symbols::{Occurrence, OccurrenceKind, SassSymbol, SymbolKind, strip_sigil};

/// A file-backed declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub uri: Uri,
    pub symbol: SassSymbol,
    /// Forwarding prefix between the reference and the declaration.
    pub prefix: String,
    /// Declared in a local scope (block, parameter list, loop).
    pub local: bool,
}

impl Definition {
    fn module_member(uri: &Uri, symbol: &SassSymbol, prefix: &str) -> Self {
        Self {
            uri: uri.clone(),
            symbol: symbol.clone(),
            prefix: prefix.to_string(),
            local: false,
        }
    }

    /// Whether both point at the same declaration, symbolic links resolved.
    pub fn same_declaration(&self, other: &Definition, graph: &ModuleGraph<'_>) -> bool {
        self.symbol.selection_range == other.symbol.selection_range
            && self.symbol.kind == other.symbol.kind
            && graph.same_document(&self.uri, &other.uri)
    }
}

/// What an occurrence resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Declaration(Definition),
    Builtin {
        module: &'static BuiltinModule,
        member: &'static BuiltinMember,
    },
}

impl Target {
    pub fn declaration(&self) -> Option<&Definition> {
        match self {
            Target::Declaration(def) => Some(def),
            Target::Builtin { .. } => None,
        }
    }
}

/// The occurrence under `offset` in a document.
pub fn occurrence_at(entry: &CacheEntry, offset: TextSize) -> Option<Occurrence> {
    entry.symbols().occurrence_at(offset).cloned()
}

/// Resolve an occurrence of `entry`.
pub fn resolve_occurrence(
    graph: &ModuleGraph<'_>,
    entry: &Arc<CacheEntry>,
    occurrence: &Occurrence,
) -> Option<Target> {
    let symbols = entry.symbols();

    if occurrence.is_declaration {
        if let Some(local) = symbols
            .scopes
            .iter()
            .flat_map(|s| s.variables.iter())
            .find(|v| v.selection_range == occurrence.name_range)
        {
            return Some(Target::Declaration(Definition {
                uri: entry.uri().clone(),
                symbol: local.clone(),
                prefix: String::new(),
                local: true,
            }));
        }
    }

    if occurrence.kind == OccurrenceKind::Variable && occurrence.namespace.is_none() {
        if let Some(local) = symbols.local_variable_at(&occurrence.name, occurrence.name_range.start()) {
            return Some(Target::Declaration(Definition {
                uri: entry.uri().clone(),
                symbol: local.clone(),
                prefix: String::new(),
                local: true,
            }));
        }
    }

    if let Some(forward_range) = occurrence.visibility_of {
        let links = graph.links(entry);
        let link = links.iter().find(|l| l.range == forward_range)?;
        return resolve_through_forward(graph, link, occurrence);
    }

    let kinds = occurrence.kind.symbol_kinds();
    resolve_name(graph, entry, kinds, occurrence.namespace.as_deref(), &occurrence.name)
}

/// Resolve a name as seen from `entry`, with an optional namespace.
pub fn resolve_name(
    graph: &ModuleGraph<'_>,
    entry: &Arc<CacheEntry>,
    kinds: &[SymbolKind],
    namespace: Option<&str>,
    name: &str,
) -> Option<Target> {
    let found = graph
        .traverse(entry, TraversalOptions::lazy(), |module, scope| {
            if !scope.is_referenceable() || !scope.matches_namespace(namespace) {
                return Vec::new();
            }
            match_in_module(module, scope, kinds, name).into_iter().collect()
        })
        .into_iter()
        .next();
    if found.is_some() || namespace.is_some() {
        return found;
    }

    // flat scan for `@import`-style globals
    for other in graph.cache.entries() {
        let symbols = other.symbols();
        for kind in kinds {
            if let Some(symbol) = symbols.find(*kind, name) {
                return Some(Target::Declaration(Definition::module_member(other.uri(), symbol, "")));
            }
        }
    }

    if kinds.contains(&SymbolKind::Function) {
        if let Some((module, member)) = builtins::global_function(name) {
            return Some(Target::Builtin { module, member });
        }
    }
    None
}

fn match_in_module(module: &Module, scope: &ModuleScope, kinds: &[SymbolKind], name: &str) -> Option<Target> {
    let declared = scope.unexpose(name)?;
    match module {
        Module::Document(entry) => {
            let symbols = entry.symbols();
            kinds.iter().find_map(|kind| {
                symbols
                    .find(*kind, &declared)
                    .map(|s| Target::Declaration(Definition::module_member(entry.uri(), s, &scope.prefix)))
            })
        }
        Module::Builtin(builtin) => {
            let builtin: &'static BuiltinModule = builtin;
            kinds
                .iter()
                .find_map(|kind| builtin.member(*kind, &declared))
                .map(|member| Target::Builtin {
                    module: builtin,
                    member,
                })
        }
    }
}

/// Resolve a name in a `show`/`hide` list of `link`. The listed name is
/// the outward name, with the edge's prefix applied.
fn resolve_through_forward(graph: &ModuleGraph<'_>, link: &Link, occurrence: &Occurrence) -> Option<Target> {
    let target = link.resolved.as_ref()?;
    let base = strip_sigil(&occurrence.name);
    let sigil = &occurrence.name[..occurrence.name.len() - base.len()];
    let inner = match &link.prefix {
        Some(prefix) => base.strip_prefix(prefix.as_str())?,
        None => base,
    };
    let inner = SmolStr::from(format!("{sigil}{inner}"));
    let kinds = occurrence.kind.symbol_kinds();

    let entry = match graph.module(target)? {
        Module::Document(entry) => entry,
        builtin => return match_in_module(&builtin, &ModuleScope::local(), kinds, &inner),
    };

    // walk what the forwarded module itself exposes
    let exposed = ModuleScope {
        namespace: Namespace::ForwardedOnly,
        prefix: String::new(),
        forwards: Vec::new(),
        depth: 1,
    };
    graph
        .traverse_from(Module::Document(entry), exposed, TraversalOptions::lazy(), |module, scope| {
            match_in_module(module, scope, kinds, &inner).into_iter().collect()
        })
        .into_iter()
        .next()
}

/// Convenience: resolve the occurrence under `offset`.
pub fn definition_at(graph: &ModuleGraph<'_>, entry: &Arc<CacheEntry>, offset: TextSize) -> Option<Target> {
    let occurrence = occurrence_at(entry, offset)?;
    resolve_occurrence(graph, entry, &occurrence)
}

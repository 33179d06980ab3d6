//! Completion of module members, variables, mixins, functions and
//! placeholders.
//!
//! Candidates come from the module graph: members of used modules are
//! offered with their namespace (`ns.$var`), wildcard and forwarded members
//! bare. Unless `suggestFromUseOnly` is set, declarations of every other
//! known document are offered bare as well, for code built on `@import`.

use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use crate::base::{TextSize, Uri};
use crate::hir::{
    CacheEntry, LinkKind, Module, ModuleGraph, ModuleScope, Namespace, SassSymbol, SymbolKind, TraversalOptions,
};
use crate::project::{CompletionSettings, MixinStyle};

/// Kind of a completion item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompletionKind {
    Variable,
    Mixin,
    Function,
    Placeholder,
    Module,
}

impl From<SymbolKind> for CompletionKind {
    fn from(kind: SymbolKind) -> Self {
        match kind {
            SymbolKind::Variable => CompletionKind::Variable,
            SymbolKind::Mixin => CompletionKind::Mixin,
            SymbolKind::Function => CompletionKind::Function,
            SymbolKind::Placeholder => CompletionKind::Placeholder,
        }
    }
}

/// A completion item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionItem {
    pub label: String,
    pub kind: CompletionKind,
    pub detail: Option<String>,
    pub documentation: Option<String>,
    pub insert_text: String,
    pub deprecated: bool,
}

impl CompletionItem {
    fn new(label: impl Into<String>, kind: CompletionKind) -> Self {
        let label = label.into();
        Self {
            insert_text: label.clone(),
            label,
            kind,
            detail: None,
            documentation: None,
            deprecated: false,
        }
    }
}

// ============================================================================
// CONTEXT
// ============================================================================

/// What the cursor is in the middle of.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Context {
    /// `@include name` or `+name`.
    Include { namespace: Option<SmolStr> },
    /// `@extend %name`.
    Extend,
    /// `ns.name` outside `@include`.
    Member { namespace: SmolStr },
    /// `$name`.
    Variable,
    /// A word in a property value.
    Value,
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '-' | '_' | '$' | '%') || !c.is_ascii()
}

impl Context {
    fn detect(line: &str) -> Option<Self> {
        let word_start = line
            .char_indices()
            .rev()
            .take_while(|(_, c)| is_word_char(*c))
            .last()
            .map_or(line.len(), |(i, _)| i);
        let word = &line[word_start..];
        let before = &line[..word_start];

        let (namespace, before) = match before.strip_suffix('.') {
            Some(rest) => {
                let ns_start = rest
                    .char_indices()
                    .rev()
                    .take_while(|(_, c)| is_word_char(*c) && *c != '$' && *c != '%')
                    .last()
                    .map(|(i, _)| i)?;
                (Some(SmolStr::new(&rest[ns_start..])), &rest[..ns_start])
            }
            None => (None, before),
        };

        let trimmed = before.trim_end();
        // the statement the cursor is in, after any `{`, `;` or `}` on the line
        let head = trimmed
            .rsplit(['{', ';', '}'])
            .next()
            .unwrap_or(trimmed)
            .trim_start();
        if head == "@include" || (head == "+" && before.trim_start() == "+") {
            return Some(Context::Include { namespace });
        }
        if head == "@extend" {
            return Some(Context::Extend);
        }
        if let Some(namespace) = namespace {
            return Some(Context::Member { namespace });
        }
        if word.starts_with('$') {
            return Some(Context::Variable);
        }
        if trimmed.contains(':') {
            return Some(Context::Value);
        }
        None
    }

    fn accepts(&self, kind: SymbolKind) -> bool {
        match self {
            Context::Include { .. } => kind == SymbolKind::Mixin,
            Context::Extend => kind == SymbolKind::Placeholder,
            Context::Variable => kind == SymbolKind::Variable,
            Context::Member { .. } | Context::Value => {
                matches!(kind, SymbolKind::Variable | SymbolKind::Function)
            }
        }
    }

    fn namespace(&self) -> Option<&str> {
        match self {
            Context::Include { namespace } => namespace.as_deref(),
            Context::Member { namespace } => Some(namespace),
            _ => None,
        }
    }
}

// ============================================================================
// COMPLETION
// ============================================================================

/// Completions at `offset`.
pub fn completions(
    graph: &ModuleGraph<'_>,
    entry: &Arc<CacheEntry>,
    offset: TextSize,
    settings: &CompletionSettings,
) -> Vec<CompletionItem> {
    let text = &entry.document().text;
    let offset = usize::from(offset).min(text.len());
    let Some(prefix) = text.get(..offset) else {
        return Vec::new();
    };
    let line = prefix.rsplit('\n').next().unwrap_or(prefix);
    let Some(context) = Context::detect(line) else {
        return Vec::new();
    };

    let mut items: IndexMap<String, CompletionItem> = IndexMap::new();
    let mut push = |item: CompletionItem| {
        items.entry(item.label.clone()).or_insert(item);
    };

    if settings.suggest_all_from_open_document && context.namespace().is_none() {
        let symbols = entry.symbols();
        let at = TextSize::try_from(offset).unwrap_or_default();
        for scope in symbols.scopes.iter().filter(|s| s.range.contains_inclusive(at)) {
            for var in scope.variables.iter().filter(|v| v.selection_range.start() < at) {
                if context.accepts(var.kind) {
                    push(symbol_item(var, var.name.to_string()));
                }
            }
        }
    }

    let mut visited: FxHashSet<Uri> = FxHashSet::default();
    let wanted = context.namespace();
    let found = graph.traverse(entry, TraversalOptions::exhaustive(), |module, scope| {
        visited.insert(graph.canonical(&module.uri()));
        if !scope.is_referenceable() || !offered(scope, wanted) {
            return Vec::new();
        }
        if scope.is_local() && !settings.suggest_all_from_open_document {
            return Vec::new();
        }
        module_items(module, scope, &context, wanted.is_some())
    });
    for item in found {
        push(item);
    }

    if !settings.suggest_from_use_only && wanted.is_none() {
        for other in graph.cache.entries() {
            if visited.contains(&graph.canonical(other.uri())) {
                continue;
            }
            for symbol in &other.symbols().symbols {
                if context.accepts(symbol.kind) && !symbol.is_private() {
                    push(symbol_item(symbol, symbol.name.to_string()));
                }
            }
        }
    }

    if context == Context::Value {
        for link in graph.links(entry).iter().filter(|l| l.kind == LinkKind::Use && !l.is_wildcard()) {
            if let Some(ns) = link.namespace.as_deref() {
                let mut item = CompletionItem::new(ns, CompletionKind::Module);
                item.detail = Some(link.raw_target.clone());
                push(item);
            }
        }
    }

    let items = items.into_values();
    match &context {
        Context::Include { .. } => items.flat_map(|item| mixin_variants(item, settings.mixin_style)).collect(),
        _ => items.collect(),
    }
}

/// Whether members of a module reached through `scope` are offered when the
/// user typed `wanted` as namespace.
fn offered(scope: &ModuleScope, wanted: Option<&str>) -> bool {
    match wanted {
        Some(_) => scope.matches_namespace(wanted),
        None => true,
    }
}

fn module_items(module: &Module, scope: &ModuleScope, context: &Context, namespace_typed: bool) -> Vec<CompletionItem> {
    let label = |exposed: &str| match &scope.namespace {
        Namespace::Named(ns) if !namespace_typed => format!("{ns}.{exposed}"),
        _ => exposed.to_string(),
    };

    match module {
        Module::Document(entry) => entry
            .symbols()
            .symbols
            .iter()
            .filter(|s| context.accepts(s.kind) && (scope.is_local() || !s.is_private()))
            .filter_map(|s| Some(symbol_item(s, label(&scope.expose(&s.name)?))))
            .collect(),
        Module::Builtin(builtin) => builtin
            .members
            .iter()
            .filter(|m| context.accepts(m.kind))
            .filter_map(|m| {
                let mut item = CompletionItem::new(label(&scope.expose(m.name)?), m.kind.into());
                item.detail = Some(m.signature.to_string()).filter(|s| !s.is_empty());
                item.documentation = Some(m.description.to_string());
                Some(item)
            })
            .collect(),
    }
}

fn symbol_item(symbol: &SassSymbol, label: String) -> CompletionItem {
    let mut item = CompletionItem::new(label, symbol.kind.into());
    item.detail = symbol.detail.clone().or_else(|| symbol.value.clone());
    item.documentation = symbol
        .doc
        .as_ref()
        .map(|d| d.description.clone())
        .filter(|d| !d.is_empty());
    item.deprecated = symbol.deprecation().is_some();
    item
}

/// Bare and bracketed forms of a mixin item, by configured style.
fn mixin_variants(item: CompletionItem, style: MixinStyle) -> Vec<CompletionItem> {
    let has_params = item.detail.as_deref().is_some_and(|d| d != "()");
    if !has_params {
        return vec![item];
    }
    let mut bracketed = item.clone();
    bracketed.label = format!("{}()", item.label);
    bracketed.insert_text = format!("{}()", item.insert_text);
    match style {
        MixinStyle::All => vec![item, bracketed],
        MixinStyle::NoBracket => vec![item],
        MixinStyle::Bracket => vec![bracketed],
    }
}

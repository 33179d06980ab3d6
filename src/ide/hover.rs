//! Hover information.

use std::fmt::Write as _;
use std::sync::Arc;

use crate::base::{TextRange, TextSize};
use crate::hir::builtins::{BuiltinMember, BuiltinModule};
use crate::hir::{CacheEntry, Definition, ModuleGraph, SymbolKind, Target, resolve_name, resolve_occurrence};

/// Alias chains (`$a: $b; $b: $c; ...`) are followed at most this far.
pub const MAX_ALIAS_DEPTH: usize = 10;

/// Result of a hover request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverResult {
    /// Markdown contents.
    pub contents: String,
    /// The hovered name.
    pub range: TextRange,
}

/// Hover over the identifier at `offset`.
pub fn hover(graph: &ModuleGraph<'_>, entry: &Arc<CacheEntry>, offset: TextSize) -> Option<HoverResult> {
    let symbols = entry.symbols();
    let occurrence = symbols.occurrence_at(offset)?;
    let contents = match resolve_occurrence(graph, entry, occurrence)? {
        Target::Declaration(def) => declaration_markdown(graph, &def),
        Target::Builtin { module, member } => builtin_markdown(module, member),
    };
    Some(HoverResult {
        contents,
        range: occurrence.name_range,
    })
}

fn declaration_markdown(graph: &ModuleGraph<'_>, def: &Definition) -> String {
    let symbol = &def.symbol;
    let mut out = String::from("```scss\n");
    match symbol.kind {
        SymbolKind::Variable => {
            let value = symbol.value.as_deref().unwrap_or("");
            let _ = write!(out, "{}: {}", symbol.name, value);
            if let Some(resolved) = resolve_value(graph, def).filter(|v| v != value) {
                let _ = write!(out, "\n// = {resolved}");
            }
        }
        SymbolKind::Mixin => {
            let _ = write!(out, "@mixin {}{}", symbol.name, symbol.detail.as_deref().unwrap_or(""));
        }
        SymbolKind::Function => {
            let _ = write!(out, "@function {}{}", symbol.name, symbol.detail.as_deref().unwrap_or("()"));
        }
        SymbolKind::Placeholder => out.push_str(&symbol.name),
    }
    out.push_str("\n```");

    if let Some(doc) = &symbol.doc {
        if let Some(reason) = &doc.deprecated {
            out.push_str("\n\n**Deprecated**");
            if !reason.is_empty() {
                let _ = write!(out, ": {reason}");
            }
        }
        if !doc.description.is_empty() {
            let _ = write!(out, "\n\n{}", doc.description);
        }
        if !doc.params.is_empty() {
            out.push('\n');
            for param in &doc.params {
                let _ = write!(out, "\n- `{}`", param.name);
                if let Some(ty) = &param.ty {
                    let _ = write!(out, " `{{{ty}}}`");
                }
                if !param.description.is_empty() {
                    let _ = write!(out, " {}", param.description);
                }
            }
        }
        if let Some(returns) = &doc.returns {
            let _ = write!(out, "\n\n@return {returns}");
        }
    }

    if !def.local {
        let _ = write!(out, "\n\n{}", crate::base::uri::basename(&def.uri));
    }
    out
}

fn builtin_markdown(module: &BuiltinModule, member: &BuiltinMember) -> String {
    let mut out = String::from("```scss\n");
    match member.kind {
        SymbolKind::Variable => out.push_str(member.name),
        _ => out.push_str(member.signature),
    }
    let _ = write!(out, "\n```\n\n{}\n\nsass:{}", member.description, module.name);
    out
}

/// Follow a variable whose value is another variable, up to
/// [`MAX_ALIAS_DEPTH`] hops. Returns the last value in the chain, or `None`
/// when the chain is too long or breaks.
pub fn resolve_value(graph: &ModuleGraph<'_>, def: &Definition) -> Option<String> {
    let mut current = def.clone();
    for _ in 0..MAX_ALIAS_DEPTH {
        let value = current.symbol.value.as_deref()?.trim();
        let Some((namespace, name)) = alias_target(value) else {
            return Some(value.to_string());
        };
        let entry = graph.entry(&current.uri)?;
        let next = resolve_name(graph, &entry, &[SymbolKind::Variable], namespace, name)?;
        current = next.declaration()?.clone();
    }
    None
}

/// `$name` or `ns.$name` as a whole value.
fn alias_target(value: &str) -> Option<(Option<&str>, &str)> {
    let (namespace, name) = match value.split_once('.') {
        Some((ns, name)) if !ns.is_empty() && !ns.starts_with('$') => (Some(ns), name),
        _ => (None, value),
    };
    let base = name.strip_prefix('$')?;
    let valid = !base.is_empty() && base.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_');
    valid.then_some((namespace, name))
}

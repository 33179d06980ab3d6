//! Go-to-definition.

use std::sync::Arc;

use crate::base::{LineColRange, TextRange, TextSize, Uri};
use crate::hir::{CacheEntry, LinkKind, ModuleGraph, Target, resolve_occurrence};

/// A range in some document, with line/column positions precomputed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub uri: Uri,
    pub range: TextRange,
    pub line_col: LineColRange,
}

impl Location {
    pub fn new(entry: &CacheEntry, range: TextRange) -> Self {
        Self {
            uri: entry.uri().clone(),
            range,
            line_col: entry.document().range(range),
        }
    }

    /// A location in a document that may not be cached yet.
    pub fn in_document(graph: &ModuleGraph<'_>, uri: &Uri, range: TextRange) -> Self {
        match graph.entry(uri) {
            Some(entry) => Self::new(&entry, range),
            None => Self {
                uri: uri.clone(),
                range,
                line_col: LineColRange::default(),
            },
        }
    }
}

/// Where a go-to-definition request lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GotoTarget {
    /// A declaration, spanning only its name.
    Declaration(Location),
    /// A whole document: the target of a link or a module namespace.
    Document(Uri),
    /// A member of a built-in module; there is nothing to open.
    Builtin {
        module: &'static str,
        member: &'static str,
    },
}

/// Result of a go-to-definition request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GotoResult {
    /// The range under the cursor that was resolved.
    pub origin: TextRange,
    pub target: GotoTarget,
}

/// Resolve what is under `offset`: a link target, a module namespace, or an
/// identifier.
pub fn goto_definition(graph: &ModuleGraph<'_>, entry: &Arc<CacheEntry>, offset: TextSize) -> Option<GotoResult> {
    let links = graph.links(entry);

    if let Some(link) = links
        .iter()
        .find(|l| l.target_range.contains_inclusive(offset))
    {
        let resolved = link.resolved.as_ref().filter(|uri| !crate::hir::builtins::is_builtin_uri(uri))?;
        return Some(GotoResult {
            origin: link.target_range,
            target: GotoTarget::Document(resolved.clone()),
        });
    }

    let symbols = entry.symbols();
    let occurrence = symbols.occurrence_at(offset)?;

    if let Some(namespace) = &occurrence.namespace {
        if offset < occurrence.name_range.start() {
            let link = links
                .iter()
                .find(|l| l.kind == LinkKind::Use && l.namespace.as_ref() == Some(namespace))?;
            let resolved = link.resolved.as_ref().filter(|uri| !crate::hir::builtins::is_builtin_uri(uri))?;
            let ns_range = TextRange::at(occurrence.range.start(), TextSize::of(namespace.as_str()));
            return Some(GotoResult {
                origin: ns_range,
                target: GotoTarget::Document(resolved.clone()),
            });
        }
    }

    let target = match resolve_occurrence(graph, entry, occurrence)? {
        Target::Declaration(def) => {
            GotoTarget::Declaration(Location::in_document(graph, &def.uri, def.symbol.selection_range))
        }
        Target::Builtin { module, member } => GotoTarget::Builtin {
            module: module.name,
            member: member.name,
        },
    };
    Some(GotoResult {
        origin: occurrence.name_range,
        target,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::LineCol;
    use crate::hir::{ResolverConfig, StylesheetCache};
    use crate::project::MemoryFileSystem;
    use pretty_assertions::assert_eq;

    fn goto(files: &[(&str, &str)], uri: &str, needle: &str) -> Option<GotoResult> {
        let fs = MemoryFileSystem::with_files(files.iter().copied());
        let cache = StylesheetCache::new();
        let config = ResolverConfig::default();
        let graph = ModuleGraph::new(&cache, &fs, &config);
        let entry = graph.entry(uri).unwrap();
        let offset = entry.document().text.find(needle).unwrap() as u32;
        goto_definition(&graph, &entry, TextSize::from(offset + 1))
    }

    #[test]
    fn test_goto_variable_in_used_module() {
        let result = goto(
            &[
                ("file:///p/one.scss", "$primary: limegreen;"),
                ("file:///p/two.scss", "@use \"./one\";\n.a { color: one.$primary; }"),
            ],
            "file:///p/two.scss",
            "$primary",
        )
        .unwrap();
        let GotoTarget::Declaration(location) = result.target else {
            panic!("expected a declaration");
        };
        assert_eq!(&*location.uri, "file:///p/one.scss");
        assert_eq!(location.range, TextRange::new(0.into(), 8.into()));
        assert_eq!(location.line_col.start, LineCol::new(0, 0));
        assert_eq!(location.line_col.end, LineCol::new(0, 8));
    }

    #[test]
    fn test_goto_link_target() {
        let result = goto(
            &[
                ("file:///p/_one.scss", "$a: 1;"),
                ("file:///p/two.scss", "@use \"one\";"),
            ],
            "file:///p/two.scss",
            "one",
        )
        .unwrap();
        assert_eq!(result.target, GotoTarget::Document(Uri::from("file:///p/_one.scss")));
    }

    #[test]
    fn test_goto_namespace() {
        let result = goto(
            &[
                ("file:///p/one.scss", "$a: 1;"),
                ("file:///p/two.scss", "@use \"one\" as o;\n.a { b: o.$a; }"),
            ],
            "file:///p/two.scss",
            " o.$a",
        )
        .unwrap();
        assert_eq!(result.target, GotoTarget::Document(Uri::from("file:///p/one.scss")));
    }

    #[test]
    fn test_goto_builtin_member() {
        let result = goto(
            &[("file:///p/a.scss", "@use \"sass:math\";\n.a { b: math.div(1, 2); }")],
            "file:///p/a.scss",
            "div",
        )
        .unwrap();
        assert_eq!(
            result.target,
            GotoTarget::Builtin {
                module: "math",
                member: "div"
            }
        );
    }

    #[test]
    fn test_goto_builtin_link_has_no_document() {
        assert!(
            goto(
                &[("file:///p/a.scss", "@use \"sass:math\";")],
                "file:///p/a.scss",
                "sass:math",
            )
            .is_none()
        );
    }
}

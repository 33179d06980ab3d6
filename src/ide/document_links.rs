//! Document links: clickable `@use`, `@forward`, `@import` and `url()`
//! targets.

use std::borrow::Cow;
use std::sync::Arc;

use crate::base::uri::scheme;
use crate::base::{LineColRange, TextRange, Uri};
use crate::hir::builtins::is_builtin_uri;
use crate::hir::{CacheEntry, LinkKind, LinkResolver, ModuleGraph};

/// A document link target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentLink {
    /// The span of the target text, without quotes.
    pub range: TextRange,
    pub line_col: LineColRange,
    /// The linked document. For unresolved links this is the best guess of
    /// where the file would be, so the editor can offer to create it.
    pub target: Uri,
    pub resolved: bool,
    /// Tooltip text for the link.
    pub tooltip: Cow<'static, str>,
}

/// Get document links for a file.
///
/// Built-in modules and `data:` URLs have no document and are skipped.
pub fn document_links(graph: &ModuleGraph<'_>, entry: &Arc<CacheEntry>) -> Vec<DocumentLink> {
    let mut out = Vec::new();

    for link in graph.links(entry).iter() {
        let raw = link.raw_target.as_str();
        if raw.is_empty() || raw.starts_with("data:") || is_builtin_uri(raw) {
            continue;
        }

        let (target, resolved) = match &link.resolved {
            Some(uri) => (uri.clone(), true),
            None if link.kind == LinkKind::OpaqueUrl && matches!(scheme(raw), Some("http" | "https")) => {
                (Uri::from(raw), true)
            }
            None => match LinkResolver::best_guess(raw, entry.uri()) {
                // plain CSS links are never resolved as modules
                Some(guess) if link.kind == LinkKind::OpaqueUrl => {
                    let exists = graph.fs.is_file(&guess);
                    (guess, exists)
                }
                Some(guess) => (guess, false),
                None => continue,
            },
        };

        let tooltip = if resolved {
            Cow::Borrowed("Follow link")
        } else {
            Cow::Owned(format!("File not found: {raw}"))
        };
        out.push(DocumentLink {
            range: link.target_range,
            line_col: entry.document().range(link.target_range),
            target,
            resolved,
            tooltip,
        });
    }

    out
}

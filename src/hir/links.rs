//! Module links discovered in a document.
//!
//! A link is a directed edge from one document to another, found in a
//! `@use`, `@forward` or `@import` statement or a `url(...)` call. Links are
//! extracted from the tree without touching the file system; the
//! [`LinkResolver`](super::LinkResolver) fills in [`Link::resolved`].

use smol_str::SmolStr;

use crate::base::{TextRange, Uri};
use crate::parser::{
    AstNode, ForwardRule, ImportRule, SyntaxKind, SyntaxNode, UrlCall, UseRule, VisibilityMode,
};

use super::symbols::strip_sigil;

/// Statement kind a link comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    Use,
    Forward,
    Import,
    /// Plain CSS import or `url(...)`; shown as a link, never followed.
    OpaqueUrl,
}

/// A `show` or `hide` list on a `@forward`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visibility {
    Show(Vec<SmolStr>),
    Hide(Vec<SmolStr>),
}

impl Visibility {
    /// Whether a name (sigil included) passes the list. `$`-names only match
    /// `$`-entries; bare names match mixins and functions.
    pub fn allows(&self, name: &str) -> bool {
        match self {
            Visibility::Show(names) => names.iter().any(|n| n == name),
            Visibility::Hide(names) => !names.iter().any(|n| n == name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub kind: LinkKind,
    /// Target text as written, without quotes.
    pub raw_target: String,
    /// Range of the target text.
    pub target_range: TextRange,
    /// Range of the whole statement.
    pub range: TextRange,
    /// Concrete document, when resolution succeeded.
    pub resolved: Option<Uri>,
    /// `@use` namespace: the alias, `*`, or derived from the URL.
    pub namespace: Option<SmolStr>,
    /// `@forward ... as <prefix>-*` prefix, without the `*`.
    pub prefix: Option<SmolStr>,
    pub visibility: Option<Visibility>,
}

impl Link {
    fn new(kind: LinkKind, raw_target: String, target_range: TextRange, range: TextRange) -> Self {
        Self {
            kind,
            raw_target,
            target_range,
            range,
            resolved: None,
            namespace: None,
            prefix: None,
            visibility: None,
        }
    }

    /// Whether a `@use` brings members in without a prefix.
    pub fn is_wildcard(&self) -> bool {
        self.namespace.as_deref() == Some("*")
    }
}

/// The namespace `@use` derives from a URL: the last path segment without
/// extension or partial underscore (`sass:math` → `math`).
pub fn default_namespace(url: &str) -> SmolStr {
    let url = url.strip_prefix("pkg:").unwrap_or(url);
    let last = url.rsplit(['/', ':']).next().unwrap_or(url);
    let stem = match last.rsplit_once('.') {
        Some((stem, ext)) if matches!(ext, "scss" | "sass" | "css") => stem,
        _ => last,
    };
    SmolStr::new(stem.strip_prefix('_').unwrap_or(stem))
}

/// Whether an `@import` target is plain CSS and never loaded as a module.
pub fn is_plain_css_import(target: &str) -> bool {
    target.ends_with(".css")
        || target.starts_with("http://")
        || target.starts_with("https://")
        || target.starts_with("//")
}

/// Extract every link of a tree, in source order.
pub fn extract_links(root: &SyntaxNode) -> Vec<Link> {
    let mut links = Vec::new();
    for node in root.descendants() {
        match node.kind() {
            SyntaxKind::USE_RULE => links.extend(use_link(&node)),
            SyntaxKind::FORWARD_RULE => links.extend(forward_link(&node)),
            SyntaxKind::IMPORT_RULE => import_links(&node, &mut links),
            SyntaxKind::URL_CALL => {
                let in_import = node
                    .parent()
                    .is_some_and(|p| p.kind() == SyntaxKind::IMPORT_TARGET);
                if in_import {
                    continue;
                }
                if let Some((target, range)) = UrlCall::cast(node.clone()).and_then(|u| u.target()) {
                    if !target.is_empty() {
                        links.push(Link::new(LinkKind::OpaqueUrl, target, range, node.text_range()));
                    }
                }
            }
            _ => {}
        }
    }
    links
}

fn use_link(node: &SyntaxNode) -> Option<Link> {
    let rule = UseRule::cast(node.clone())?;
    let url = rule.url()?;
    let target = url.value()?;
    let namespace = rule
        .alias()
        .and_then(|a| a.name_token())
        .map(|t| SmolStr::new(t.text()))
        .unwrap_or_else(|| default_namespace(&target));

    let mut link = Link::new(LinkKind::Use, target, url.value_range()?, node.text_range());
    link.namespace = Some(namespace);
    Some(link)
}

fn forward_link(node: &SyntaxNode) -> Option<Link> {
    let rule = ForwardRule::cast(node.clone())?;
    let url = rule.url()?;
    let mut link = Link::new(LinkKind::Forward, url.value()?, url.value_range()?, node.text_range());
    link.prefix = rule.prefix().map(SmolStr::from);
    link.visibility = rule.visibility().and_then(|list| {
        let names = list.items().map(|t| SmolStr::new(t.text())).collect();
        match list.mode()? {
            VisibilityMode::Show => Some(Visibility::Show(names)),
            VisibilityMode::Hide => Some(Visibility::Hide(names)),
        }
    });
    Some(link)
}

fn import_links(node: &SyntaxNode, links: &mut Vec<Link>) {
    let Some(rule) = ImportRule::cast(node.clone()) else {
        return;
    };
    let media = rule.has_media_query();
    for target in rule.targets() {
        let Some((raw, range)) = target.target() else {
            continue;
        };
        let opaque = media || target.url_call().is_some() || is_plain_css_import(&raw);
        let kind = if opaque {
            LinkKind::OpaqueUrl
        } else {
            LinkKind::Import
        };
        links.push(Link::new(kind, raw, range, target.syntax().text_range()));
    }
}

/// Apply a forwarding prefix after the sigil: `$day` + `ki-` → `$ki-day`.
pub fn prefixed(name: &str, prefix: &str) -> SmolStr {
    let base = strip_sigil(name);
    let sigil = &name[..name.len() - base.len()];
    SmolStr::from(format!("{sigil}{prefix}{base}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{Dialect, parse};
    use pretty_assertions::assert_eq;

    fn links(input: &str) -> Vec<Link> {
        extract_links(&parse(input, Dialect::Scss).syntax())
    }

    #[test]
    fn test_use_namespaces() {
        let links = links(
            "@use \"sass:math\";\n@use \"src/_corners.scss\";\n@use \"theme\" as t;\n@use \"flat\" as *;",
        );
        let namespaces: Vec<_> = links
            .iter()
            .map(|l| (l.kind, l.namespace.as_deref()))
            .collect();
        assert_eq!(
            namespaces,
            vec![
                (LinkKind::Use, Some("math")),
                (LinkKind::Use, Some("corners")),
                (LinkKind::Use, Some("t")),
                (LinkKind::Use, Some("*")),
            ]
        );
        assert!(links[3].is_wildcard());
    }

    #[test]
    fn test_target_range_excludes_quotes() {
        let input = "@use \"./one\";";
        let links = links(input);
        assert_eq!(links[0].raw_target, "./one");
        assert_eq!(&input[std::ops::Range::<usize>::from(links[0].target_range)], "./one");
    }

    #[test]
    fn test_forward_prefix_and_visibility() {
        let links = links("@forward \"one\" as ki-* hide $secret, mixer;");
        let link = &links[0];
        assert_eq!(link.kind, LinkKind::Forward);
        assert_eq!(link.prefix.as_deref(), Some("ki-"));
        assert_eq!(
            link.visibility,
            Some(Visibility::Hide(vec!["$secret".into(), "mixer".into()]))
        );
        assert_eq!(link.namespace, None);
    }

    #[test]
    fn test_import_kinds() {
        let links = links(
            "@import \"a\", \"b.css\";\n@import url(c.css);\n@import \"http://x/y\";\n@import \"d\" screen;",
        );
        let kinds: Vec<_> = links.iter().map(|l| (l.raw_target.as_str(), l.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                ("a", LinkKind::Import),
                ("b.css", LinkKind::OpaqueUrl),
                ("c.css", LinkKind::OpaqueUrl),
                ("http://x/y", LinkKind::OpaqueUrl),
                ("d", LinkKind::OpaqueUrl),
            ]
        );
    }

    #[test]
    fn test_url_calls_in_values() {
        let links = links(".a { background: url(\"img/bg.png\"); }");
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].kind, LinkKind::OpaqueUrl);
        assert_eq!(links[0].raw_target, "img/bg.png");
    }

    #[test]
    fn test_prefixed_keeps_sigil() {
        assert_eq!(prefixed("$day", "ki-"), "$ki-day");
        assert_eq!(prefixed("mixer", "ki-"), "ki-mixer");
    }
}

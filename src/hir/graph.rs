//! Module Graph Walker.
//!
//! Depth-first traversal of the links of a start document, in source order,
//! applying the Sass module rules:
//!
//! - `@forward` edges are followed at any depth; each adds its prefix and
//!   `show`/`hide` filter to what the importer can see
//! - `@use` edges are followed only from the start document
//! - `@import` edges are followed only when asked for
//! - every module is visited at most once, so cycles terminate
//!
//! The walk is an explicit stack of frames, each carrying the
//! [`ModuleScope`] the module is seen through.

use std::sync::Arc;

use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use tracing::trace;

use crate::base::Uri;
use crate::project::FileSystem;

use super::builtins::{self, BuiltinModule};
use super::cache::{CacheEntry, StylesheetCache};
use super::links::{Link, LinkKind, Visibility, prefixed};
use super::resolve::{LinkResolver, ResolverConfig};
use super::symbols::{is_private_name, strip_sigil};

// ============================================================================
// SCOPES
// ============================================================================

/// How the start document reaches a module.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// The start document itself, or a document it `@import`s.
    Local,
    /// Through `@use "x"` or `@use "x" as ns`.
    Named(SmolStr),
    /// Through `@use "x" as *`.
    Wildcard,
    /// Only through the start document's own `@forward`s. Members are
    /// re-exported but not referenceable from the start document.
    ForwardedOnly,
}

/// One `@forward` edge on the path from the start document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardEdge {
    pub prefix: Option<SmolStr>,
    pub visibility: Option<Visibility>,
}

/// The view through which the start document sees a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleScope {
    pub namespace: Namespace,
    /// Accumulated forwarding prefix, outermost first.
    pub prefix: String,
    /// Forward edges, outermost first.
    pub forwards: Vec<ForwardEdge>,
    /// Edges from the start document.
    pub depth: usize,
}

impl ModuleScope {
    pub fn local() -> Self {
        Self {
            namespace: Namespace::Local,
            prefix: String::new(),
            forwards: Vec::new(),
            depth: 0,
        }
    }

    fn through_use(namespace: Namespace) -> Self {
        Self {
            namespace,
            prefix: String::new(),
            forwards: Vec::new(),
            depth: 1,
        }
    }

    fn through_forward(&self, link: &Link) -> Self {
        let namespace = match &self.namespace {
            Namespace::Local => Namespace::ForwardedOnly,
            other => other.clone(),
        };
        let mut prefix = self.prefix.clone();
        if let Some(p) = &link.prefix {
            prefix.push_str(p);
        }
        let mut forwards = self.forwards.clone();
        forwards.push(ForwardEdge {
            prefix: link.prefix.clone(),
            visibility: link.visibility.clone(),
        });
        Self {
            namespace,
            prefix,
            forwards,
            depth: self.depth + 1,
        }
    }

    fn through_import(&self) -> Self {
        Self {
            depth: self.depth + 1,
            ..self.clone()
        }
    }

    pub fn is_local(&self) -> bool {
        self.namespace == Namespace::Local && self.forwards.is_empty()
    }

    /// Whether members are referenceable from the start document.
    pub fn is_referenceable(&self) -> bool {
        self.namespace != Namespace::ForwardedOnly
    }

    /// The name a member declared as `name` has once it reaches the start
    /// document, or `None` if it is private or filtered out on the way.
    pub fn expose(&self, name: &str) -> Option<SmolStr> {
        if self.is_local() {
            return Some(SmolStr::new(name));
        }
        if is_private_name(name) {
            return None;
        }
        let mut current = SmolStr::new(name);
        for edge in self.forwards.iter().rev() {
            if let Some(prefix) = &edge.prefix {
                current = prefixed(&current, prefix);
            }
            if let Some(visibility) = &edge.visibility {
                if !visibility.allows(&current) {
                    return None;
                }
            }
        }
        Some(current)
    }

    /// Inverse of [`expose`](Self::expose): the declared name behind a name
    /// seen from the start document.
    pub fn unexpose(&self, visible: &str) -> Option<SmolStr> {
        let base = strip_sigil(visible);
        let sigil = &visible[..visible.len() - base.len()];
        let inner = base.strip_prefix(self.prefix.as_str())?;
        let name = SmolStr::from(format!("{sigil}{inner}"));
        (self.expose(&name).as_deref() == Some(visible)).then_some(name)
    }

    /// Whether a reference written with `namespace` can reach this module.
    pub fn matches_namespace(&self, namespace: Option<&str>) -> bool {
        match (&self.namespace, namespace) {
            (Namespace::Named(ns), Some(written)) => ns == written,
            (Namespace::Local | Namespace::Wildcard, None) => true,
            _ => false,
        }
    }
}

// ============================================================================
// TRAVERSAL
// ============================================================================

/// A module reached by the walker.
#[derive(Debug, Clone)]
pub enum Module {
    Document(Arc<CacheEntry>),
    Builtin(&'static BuiltinModule),
}

impl Module {
    pub fn uri(&self) -> Uri {
        match self {
            Module::Document(entry) => entry.uri().clone(),
            Module::Builtin(module) => module.uri(),
        }
    }

    pub fn entry(&self) -> Option<&Arc<CacheEntry>> {
        match self {
            Module::Document(entry) => Some(entry),
            Module::Builtin(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraversalOptions {
    /// Stop at the first visitor call that yields results.
    pub lazy: bool,
    /// Follow legacy `@import` edges.
    pub follow_imports: bool,
}

impl TraversalOptions {
    pub fn lazy() -> Self {
        Self {
            lazy: true,
            follow_imports: false,
        }
    }

    pub fn exhaustive() -> Self {
        Self::default()
    }
}

/// Read access to the documents and links of a workspace.
#[derive(Clone, Copy)]
pub struct ModuleGraph<'a> {
    pub cache: &'a StylesheetCache,
    pub fs: &'a dyn FileSystem,
    pub resolver: &'a ResolverConfig,
}

impl<'a> ModuleGraph<'a> {
    pub fn new(cache: &'a StylesheetCache, fs: &'a dyn FileSystem, resolver: &'a ResolverConfig) -> Self {
        Self {
            cache,
            fs,
            resolver,
        }
    }

    pub fn link_resolver(&self) -> LinkResolver<'a> {
        LinkResolver::new(self.fs, self.resolver)
    }

    /// The cached entry for a URI, loading it from disk on a miss.
    pub fn entry(&self, uri: &str) -> Option<Arc<CacheEntry>> {
        if builtins::is_builtin_uri(uri) {
            return None;
        }
        self.cache.get_or_load(uri, self.fs)
    }

    pub fn module(&self, uri: &str) -> Option<Module> {
        if builtins::is_builtin_uri(uri) {
            return builtins::module(uri).map(Module::Builtin);
        }
        self.entry(uri).map(Module::Document)
    }

    /// Links of an entry with resolved targets.
    pub fn links(&self, entry: &CacheEntry) -> Arc<[Link]> {
        entry.resolved_links(|links| self.link_resolver().resolve_links(links, entry.uri()))
    }

    /// Canonical identity of a URI, with symbolic links resolved.
    pub fn canonical(&self, uri: &str) -> Uri {
        if builtins::is_builtin_uri(uri) {
            return Uri::from(uri);
        }
        self.cache.canonical(uri, self.fs)
    }

    pub fn same_document(&self, a: &str, b: &str) -> bool {
        a == b || self.canonical(a) == self.canonical(b)
    }

    /// Walk the module graph from `start`, calling `visitor` once per
    /// reachable module. Results are concatenated in visiting order.
    pub fn traverse<T>(
        &self,
        start: &Arc<CacheEntry>,
        options: TraversalOptions,
        visitor: impl FnMut(&Module, &ModuleScope) -> Vec<T>,
    ) -> Vec<T> {
        self.traverse_from(Module::Document(start.clone()), ModuleScope::local(), options, visitor)
    }

    /// Walk from `start` as seen through `scope`. `@use` edges are only
    /// followed when the scope has depth zero.
    pub fn traverse_from<T>(
        &self,
        start: Module,
        scope: ModuleScope,
        options: TraversalOptions,
        mut visitor: impl FnMut(&Module, &ModuleScope) -> Vec<T>,
    ) -> Vec<T> {
        let mut results = Vec::new();
        let mut visited: FxHashSet<Uri> = FxHashSet::default();
        let mut stack: Vec<(Module, ModuleScope)> = vec![(start, scope)];

        while let Some((module, scope)) = stack.pop() {
            let uri = module.uri();
            if !visited.insert(self.canonical(&uri)) {
                continue;
            }
            trace!(uri = %uri, depth = scope.depth, "visiting module");

            let found = visitor(&module, &scope);
            if options.lazy && !found.is_empty() {
                return found;
            }
            results.extend(found);

            let Module::Document(entry) = &module else {
                continue;
            };
            let links = self.links(entry);
            let mut children = Vec::new();
            for link in links.iter() {
                let Some(target) = &link.resolved else {
                    continue;
                };
                if *target == uri {
                    continue;
                }
                let child_scope = match link.kind {
                    LinkKind::Forward => scope.through_forward(link),
                    LinkKind::Use if scope.depth == 0 => {
                        let namespace = match link.namespace.as_deref() {
                            Some(_) if link.is_wildcard() => Namespace::Wildcard,
                            Some(ns) => Namespace::Named(SmolStr::new(ns)),
                            None => continue,
                        };
                        ModuleScope::through_use(namespace)
                    }
                    LinkKind::Import if options.follow_imports => scope.through_import(),
                    _ => continue,
                };
                if let Some(child) = self.module(target) {
                    children.push((child, child_scope));
                }
            }
            // reversed so the first link is visited first
            stack.extend(children.into_iter().rev());
        }
        results
    }
}

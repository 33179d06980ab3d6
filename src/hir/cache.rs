//! Stylesheet Cache.
//!
//! One [`CacheEntry`] per document URI, holding the parsed tree and lazily
//! derived data (symbols, links, resolved links). Entries are immutable
//! `Arc`s behind a read-write lock: a replaced entry stays valid for readers
//! that already hold it, and nobody observes a half-built one.
//!
//! Entries are keyed by the URI they were opened or loaded under. A file
//! reached through a symbolic link has a second URI; [`StylesheetCache::get_or_load`]
//! answers with the editor's copy whenever one exists for the same file.

use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use tracing::{debug, trace, warn};

use crate::base::Uri;
use crate::parser::{GreenNode, SyntaxError, SyntaxNode, parse};
use crate::project::FileSystem;

use super::document::TextDocument;
use super::links::{Link, extract_links};
use super::symbols::{FileSymbols, extract_symbols};

// ============================================================================
// ENTRY
// ============================================================================

/// A parsed document and its derived data.
#[derive(Debug)]
pub struct CacheEntry {
    document: TextDocument,
    green: GreenNode,
    errors: Arc<[SyntaxError]>,
    /// Owned by the editor rather than read from disk.
    open: bool,
    symbols: OnceLock<Arc<FileSymbols>>,
    links: OnceLock<Arc<[Link]>>,
    resolved_links: OnceLock<Arc<[Link]>>,
    last_access: Mutex<Instant>,
}

impl CacheEntry {
    fn new(document: TextDocument, open: bool) -> Self {
        let parse = parse(&document.text, document.dialect);
        trace!(uri = %document.uri, version = document.version, "parsed document");
        Self {
            document,
            green: parse.green,
            errors: parse.errors.into(),
            open,
            symbols: OnceLock::new(),
            links: OnceLock::new(),
            resolved_links: OnceLock::new(),
            last_access: Mutex::new(Instant::now()),
        }
    }

    /// Same tree and symbols, resolved links dropped.
    fn without_resolved_links(&self) -> Self {
        Self {
            document: self.document.clone(),
            green: self.green.clone(),
            errors: self.errors.clone(),
            open: self.open,
            symbols: self.symbols.clone(),
            links: self.links.clone(),
            resolved_links: OnceLock::new(),
            last_access: Mutex::new(*self.last_access.lock()),
        }
    }

    pub fn uri(&self) -> &Uri {
        &self.document.uri
    }

    pub fn version(&self) -> i32 {
        self.document.version
    }

    pub fn document(&self) -> &TextDocument {
        &self.document
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    pub fn errors(&self) -> &[SyntaxError] {
        &self.errors
    }

    pub fn symbols(&self) -> Arc<FileSymbols> {
        self.symbols
            .get_or_init(|| Arc::new(extract_symbols(&self.syntax())))
            .clone()
    }

    /// Links as written, unresolved.
    pub fn links(&self) -> Arc<[Link]> {
        self.links
            .get_or_init(|| extract_links(&self.syntax()).into())
            .clone()
    }

    /// Links with targets filled in by `resolve`, computed once per entry.
    pub fn resolved_links(&self, resolve: impl FnOnce(&[Link]) -> Vec<Link>) -> Arc<[Link]> {
        self.resolved_links
            .get_or_init(|| resolve(&self.links()).into())
            .clone()
    }

    fn touch(&self) {
        *self.last_access.lock() = Instant::now();
    }

    fn idle(&self) -> Duration {
        self.last_access.lock().elapsed()
    }
}

// ============================================================================
// CACHE
// ============================================================================

/// Bounds applied by [`StylesheetCache::evict`]. Open documents are exempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvictionPolicy {
    pub max_entries: Option<usize>,
    pub max_idle: Option<Duration>,
}

/// Per-URI store of parsed documents.
#[derive(Debug, Default)]
pub struct StylesheetCache {
    inner: RwLock<CacheInner>,
    /// Key → canonical URI, filled on demand.
    canonical: RwLock<FxHashMap<Uri, Uri>>,
    policy: EvictionPolicy,
}

#[derive(Debug, Default)]
struct CacheInner {
    /// Insertion order keeps flat scans deterministic.
    entries: IndexMap<Uri, Arc<CacheEntry>>,
}

impl StylesheetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: EvictionPolicy) -> Self {
        Self {
            inner: RwLock::default(),
            canonical: RwLock::default(),
            policy,
        }
    }

    /// Parse an editor-owned document, or return the cached entry when the
    /// version and text are unchanged.
    pub fn open(&self, document: TextDocument) -> Arc<CacheEntry> {
        self.upsert(document, true)
    }

    /// Parse a document read from disk.
    pub fn insert(&self, document: TextDocument) -> Arc<CacheEntry> {
        self.upsert(document, false)
    }

    fn upsert(&self, document: TextDocument, open: bool) -> Arc<CacheEntry> {
        let is_current = |entry: &CacheEntry| {
            entry.version() == document.version
                && entry.document.text == document.text
                && entry.open >= open
        };

        // Fast path: read lock
        {
            let inner = self.inner.read();
            if let Some(entry) = inner.entries.get(&document.uri) {
                if is_current(entry) || (entry.open && !open) {
                    entry.touch();
                    return entry.clone();
                }
            }
        }

        // Slow path: parse outside the lock, then publish
        let fresh = Arc::new(CacheEntry::new(document.clone(), open));
        let mut inner = self.inner.write();

        // Double-check
        if let Some(entry) = inner.entries.get(&document.uri) {
            if is_current(entry) {
                entry.touch();
                return entry.clone();
            }
            // an editor copy is never replaced by a disk read
            if entry.open && !open {
                return entry.clone();
            }
        }
        inner.entries.insert(document.uri.clone(), fresh.clone());
        fresh
    }

    /// Cached entry for a URI.
    pub fn get(&self, uri: &str) -> Option<Arc<CacheEntry>> {
        let inner = self.inner.read();
        let entry = inner.entries.get(uri)?;
        entry.touch();
        Some(entry.clone())
    }

    /// Cached entry for a URI, reading it from the file system on a miss.
    ///
    /// An open document for the same file under another URI wins over both
    /// a disk copy and a fresh read.
    pub fn get_or_load(&self, uri: &str, fs: &dyn FileSystem) -> Option<Arc<CacheEntry>> {
        let cached = self.get(uri);
        if let Some(entry) = cached.as_ref().filter(|e| e.open) {
            return Some(entry.clone());
        }

        let canonical = self.canonical(uri, fs);
        if let Some(entry) = self.open_alias(&canonical, fs) {
            trace!(uri, alias = %entry.uri(), "using editor copy of aliased document");
            entry.touch();
            return Some(entry);
        }
        if cached.is_some() {
            return cached;
        }
        if *canonical != *uri {
            if let Some(entry) = self.get(&canonical) {
                return Some(entry);
            }
        }

        match fs.read_file(uri) {
            Ok(text) => Some(self.insert(TextDocument::from_uri(uri, 0, text))),
            Err(err) if err.is_not_found() => {
                trace!(uri, "document not found");
                None
            }
            Err(err) => {
                warn!(uri, error = %err, "failed to read document");
                None
            }
        }
    }

    /// Canonical URI of `uri` with symbolic links resolved, memoized per URI.
    pub fn canonical(&self, uri: &str, fs: &dyn FileSystem) -> Uri {
        if let Some(canonical) = self.canonical.read().get(uri) {
            return canonical.clone();
        }
        let canonical = fs.realpath(uri).unwrap_or_else(|_| Uri::from(uri));
        self.canonical
            .write()
            .insert(Uri::from(uri), canonical.clone());
        canonical
    }

    /// The open entry whose file is `canonical`, if any.
    fn open_alias(&self, canonical: &str, fs: &dyn FileSystem) -> Option<Arc<CacheEntry>> {
        let open: Vec<Arc<CacheEntry>> = self
            .inner
            .read()
            .entries
            .values()
            .filter(|e| e.open)
            .cloned()
            .collect();
        open.into_iter()
            .find(|entry| *self.canonical(entry.uri(), fs) == *canonical)
    }

    fn forget_canonical(&self, uri: &str) {
        self.canonical.write().remove(uri);
    }

    /// Forget the editor copy; the next request reloads from disk.
    pub fn close(&self, uri: &str) -> bool {
        let mut inner = self.inner.write();
        let open = inner.entries.get(uri).is_some_and(|e| e.open);
        if open {
            inner.entries.shift_remove(uri);
            self.forget_canonical(uri);
        }
        open
    }

    /// A file changed on disk. Disk copies are dropped so they reload; open
    /// documents are kept. Every entry loses its resolved links, since a new
    /// file can turn a dead link into a live one.
    pub fn on_document_changed(&self, uri: &str) {
        let mut inner = self.inner.write();
        if inner.entries.get(uri).is_some_and(|e| !e.open) {
            inner.entries.shift_remove(uri);
        }
        self.forget_canonical(uri);
        Self::drop_resolved_links(&mut inner);
    }

    /// A file was deleted on disk.
    pub fn on_document_removed(&self, uri: &str) {
        let mut inner = self.inner.write();
        if inner.entries.get(uri).is_some_and(|e| !e.open) {
            inner.entries.shift_remove(uri);
        }
        self.forget_canonical(uri);
        Self::drop_resolved_links(&mut inner);
    }

    fn drop_resolved_links(inner: &mut CacheInner) {
        for entry in inner.entries.values_mut() {
            if entry.resolved_links.get().is_some() {
                *entry = Arc::new(entry.without_resolved_links());
            }
        }
    }

    /// Drop everything, e.g. after a settings change.
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        debug!(entries = inner.entries.len(), "clearing stylesheet cache");
        inner.entries.clear();
        self.canonical.write().clear();
    }

    /// Apply the eviction policy. Returns the number of evicted entries.
    pub fn evict(&self) -> usize {
        let EvictionPolicy {
            max_entries,
            max_idle,
        } = self.policy;
        if max_entries.is_none() && max_idle.is_none() {
            return 0;
        }

        let mut inner = self.inner.write();
        let before = inner.entries.len();

        if let Some(max_idle) = max_idle {
            inner
                .entries
                .retain(|_, entry| entry.open || entry.idle() < max_idle);
        }

        if let Some(max_entries) = max_entries {
            let mut closed: Vec<(Duration, Uri)> = inner
                .entries
                .values()
                .filter(|e| !e.open)
                .map(|e| (e.idle(), e.uri().clone()))
                .collect();
            // most idle first
            closed.sort_by(|a, b| b.0.cmp(&a.0));
            let excess = inner.entries.len().saturating_sub(max_entries);
            for (_, uri) in closed.into_iter().take(excess) {
                inner.entries.shift_remove(&uri);
            }
        }
        self.canonical
            .write()
            .retain(|uri, _| inner.entries.contains_key(uri));

        let evicted = before - inner.entries.len();
        if evicted > 0 {
            debug!(evicted, remaining = inner.entries.len(), "evicted cache entries");
        }
        evicted
    }

    /// All entries in insertion order.
    pub fn entries(&self) -> Vec<Arc<CacheEntry>> {
        self.inner.read().entries.values().cloned().collect()
    }

    pub fn uris(&self) -> Vec<Uri> {
        self.inner.read().entries.keys().cloned().collect()
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.inner.read().entries.contains_key(uri)
    }

    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

//! Analysis host and snapshot: the main entry point for IDE features.
//!
//! [`AnalysisHost`] owns the stylesheet cache, the file system and the
//! settings. [`Analysis`] is a cheap view over them on which every feature
//! request is answered.

use std::sync::Arc;

use tracing::debug;

use crate::base::uri::uri_to_path;
use crate::base::{LineCol, TextRange, TextSize, Uri};
use crate::hir::{
    CacheEntry, CheckOptions, Diagnostic, EvictionPolicy, ModuleGraph, ResolverConfig, StylesheetCache, TextDocument,
    check_file,
};
use crate::parser::Dialect;
use crate::project::{FileSystem, LoadError, LoadSummary, OsFileSystem, Settings, WorkspaceLoader};

use super::completion::{CompletionItem, completions};
use super::document_links::{DocumentLink, document_links};
use super::folding::{FoldingRange, folding_ranges};
use super::goto::{GotoResult, goto_definition};
use super::hover::{HoverResult, hover};
use super::references::{ReferenceResult, find_references};
use super::rename::{PrepareRename, RenameError, SourceChange, prepare_rename, rename};
use super::selection::selection_ranges_at;
use super::semantic_tokens::{SemanticToken, semantic_tokens};
use super::symbols::{SymbolInfo, WorkspaceSymbol, document_symbols, workspace_symbols};

/// Owns the mutable state of the engine.
pub struct AnalysisHost {
    cache: StylesheetCache,
    fs: Arc<dyn FileSystem>,
    settings: Settings,
    roots: Vec<Uri>,
    resolver: ResolverConfig,
}

impl Default for AnalysisHost {
    fn default() -> Self {
        Self::new(Arc::new(OsFileSystem::new()))
    }
}

impl AnalysisHost {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self::with_settings(fs, Vec::new(), Settings::default())
    }

    pub fn with_settings(fs: Arc<dyn FileSystem>, roots: Vec<Uri>, settings: Settings) -> Self {
        let resolver = ResolverConfig::from_settings(roots.clone(), &settings.workspace);
        Self {
            cache: StylesheetCache::new(),
            fs,
            settings,
            roots,
            resolver,
        }
    }

    /// Bound the cache. Documents open in the editor are never evicted.
    pub fn with_eviction_policy(mut self, policy: EvictionPolicy) -> Self {
        self.cache = StylesheetCache::with_policy(policy);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn cache(&self) -> &StylesheetCache {
        &self.cache
    }

    /// Replace the settings. Cached data depends on aliases and load paths,
    /// so everything except open documents is dropped.
    pub fn apply_settings(&mut self, settings: Settings) {
        self.resolver = ResolverConfig::from_settings(self.roots.clone(), &settings.workspace);
        self.settings = settings;
        let open: Vec<TextDocument> = self
            .cache
            .entries()
            .into_iter()
            .filter(|e| e.is_open())
            .map(|e| e.document().clone())
            .collect();
        self.cache.clear();
        for document in open {
            self.cache.open(document);
        }
        debug!("settings applied, cache cleared");
    }

    // ------------------------------------------------------------------
    // Document lifecycle
    // ------------------------------------------------------------------

    /// Open or update an editor document. The dialect comes from the
    /// language id when known, else from the URI.
    pub fn open_document(
        &self,
        uri: &str,
        language_id: Option<&str>,
        version: i32,
        text: impl Into<Arc<str>>,
    ) -> Arc<CacheEntry> {
        let dialect = language_id
            .and_then(Dialect::from_language_id)
            .or_else(|| Dialect::from_path(uri))
            .unwrap_or_default();
        self.cache.open(TextDocument::new(uri, dialect, version, text))
    }

    /// New text for an open document.
    pub fn change_document(&self, uri: &str, version: i32, text: impl Into<Arc<str>>) -> Arc<CacheEntry> {
        let dialect = self
            .cache
            .get(uri)
            .map(|e| e.document().dialect)
            .or_else(|| Dialect::from_path(uri))
            .unwrap_or_default();
        self.cache.open(TextDocument::new(uri, dialect, version, text))
    }

    pub fn close_document(&self, uri: &str) {
        self.cache.close(uri);
    }

    /// A file changed on disk.
    pub fn file_changed(&self, uri: &str) {
        self.cache.on_document_changed(uri);
    }

    /// A file was deleted on disk.
    pub fn file_removed(&self, uri: &str) {
        self.cache.on_document_removed(uri);
    }

    /// Drop idle entries according to the eviction policy.
    pub fn evict(&self) -> usize {
        self.cache.evict()
    }

    /// Parse every stylesheet below the workspace roots.
    pub fn load_workspace(&self, loader: &WorkspaceLoader) -> Result<LoadSummary, LoadError> {
        let mut summary = LoadSummary::default();
        for root in &self.roots {
            let Some(path) = uri_to_path(root) else {
                continue;
            };
            let loaded = loader.load_directory(&path, &self.cache)?;
            summary.loaded += loaded.loaded;
            summary.failed.extend(loaded.failed);
        }
        Ok(summary)
    }

    /// A snapshot to answer requests on.
    pub fn analysis(&self) -> Analysis<'_> {
        Analysis {
            graph: ModuleGraph::new(&self.cache, &*self.fs, &self.resolver),
            settings: &self.settings,
        }
    }
}

/// A read-only view answering feature requests.
///
/// Positions are 0-based line / UTF-8 byte column.
#[derive(Clone, Copy)]
pub struct Analysis<'a> {
    graph: ModuleGraph<'a>,
    settings: &'a Settings,
}

impl<'a> Analysis<'a> {
    pub fn graph(&self) -> ModuleGraph<'a> {
        self.graph
    }

    /// The document for a URI, read from disk if it is not cached.
    pub fn document(&self, uri: &str) -> Option<Arc<CacheEntry>> {
        self.graph.entry(uri)
    }

    fn locate(&self, uri: &str, position: LineCol) -> Option<(Arc<CacheEntry>, TextSize)> {
        let entry = self.document(uri)?;
        let offset = entry.document().offset_at(position)?;
        Some((entry, offset))
    }

    pub fn goto_definition(&self, uri: &str, position: LineCol) -> Option<GotoResult> {
        let (entry, offset) = self.locate(uri, position)?;
        goto_definition(&self.graph, &entry, offset)
    }

    pub fn find_references(&self, uri: &str, position: LineCol, include_declaration: bool) -> Option<ReferenceResult> {
        let (entry, offset) = self.locate(uri, position)?;
        find_references(&self.graph, &entry, offset, include_declaration)
    }

    pub fn prepare_rename(&self, uri: &str, position: LineCol) -> Result<PrepareRename, RenameError> {
        let (entry, offset) = self.locate(uri, position).ok_or(RenameError::NoSymbol)?;
        prepare_rename(&self.graph, &entry, offset)
    }

    pub fn rename(&self, uri: &str, position: LineCol, new_name: &str) -> Result<SourceChange, RenameError> {
        let (entry, offset) = self.locate(uri, position).ok_or(RenameError::NoSymbol)?;
        rename(&self.graph, &entry, offset, new_name)
    }

    pub fn hover(&self, uri: &str, position: LineCol) -> Option<HoverResult> {
        let (entry, offset) = self.locate(uri, position)?;
        hover(&self.graph, &entry, offset)
    }

    pub fn completions(&self, uri: &str, position: LineCol) -> Vec<CompletionItem> {
        let Some((entry, offset)) = self.locate(uri, position) else {
            return Vec::new();
        };
        let settings = &self.settings.for_dialect(entry.document().dialect).completion;
        completions(&self.graph, &entry, offset, settings)
    }

    /// Syntax errors, deprecated usages and lint findings.
    pub fn diagnostics(&self, uri: &str) -> Vec<Diagnostic> {
        let Some(entry) = self.document(uri) else {
            return Vec::new();
        };
        let options = CheckOptions {
            lint: self.settings.for_dialect(entry.document().dialect).diagnostics.lint.clone(),
            include_declarations: false,
        };
        check_file(self.graph, &entry, &options)
    }

    pub fn document_links(&self, uri: &str) -> Vec<DocumentLink> {
        self.document(uri)
            .map(|entry| document_links(&self.graph, &entry))
            .unwrap_or_default()
    }

    pub fn document_symbols(&self, uri: &str) -> Vec<SymbolInfo> {
        self.document(uri)
            .map(|entry| document_symbols(&entry))
            .unwrap_or_default()
    }

    pub fn workspace_symbols(&self, query: &str) -> Vec<WorkspaceSymbol> {
        workspace_symbols(self.graph.cache, query)
    }

    pub fn folding_ranges(&self, uri: &str) -> Vec<FoldingRange> {
        self.document(uri)
            .map(|entry| folding_ranges(&entry))
            .unwrap_or_default()
    }

    pub fn selection_ranges(&self, uri: &str, positions: &[LineCol]) -> Vec<Vec<TextRange>> {
        let Some(entry) = self.document(uri) else {
            return Vec::new();
        };
        let offsets: Vec<TextSize> = positions
            .iter()
            .filter_map(|p| entry.document().offset_at(*p))
            .collect();
        selection_ranges_at(&entry, &offsets)
    }

    pub fn semantic_tokens(&self, uri: &str) -> Vec<SemanticToken> {
        self.document(uri)
            .map(|entry| semantic_tokens(&entry))
            .unwrap_or_default()
    }
}

use std::path::{Path, PathBuf};
use std::sync::Arc;

use glob::{MatchOptions, Pattern};
use rayon::prelude::*;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::base::uri::path_to_uri;
use crate::hir::{CacheEntry, StylesheetCache, TextDocument};

use super::config::WorkspaceSettings;
use super::fs::{FileSystem, FsError, OsFileSystem};

/// Extensions picked up by the workspace scan.
const STYLESHEET_EXTENSIONS: &[&str] = &["scss", "sass"];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("directory not found: {0}")]
    DirectoryNotFound(PathBuf),
    #[error("workspace scan cancelled")]
    Cancelled,
    #[error("failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error(transparent)]
    Fs(#[from] FsError),
}

/// Outcome of a directory load.
#[derive(Debug, Default)]
pub struct LoadSummary {
    pub loaded: usize,
    /// Files that could not be read, with the reason.
    pub failed: Vec<(PathBuf, String)>,
}

/// Scans workspace roots for stylesheets and parses them into a cache.
#[derive(Debug, Clone)]
pub struct WorkspaceLoader {
    scan_depth: usize,
    exclude: Vec<Pattern>,
    cancel: CancellationToken,
}

/// `*` and `?` stay within one path segment; `**` crosses segments.
const EXCLUDE_MATCH: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

impl WorkspaceLoader {
    /// Invalid exclude globs are logged and skipped.
    pub fn new(settings: &WorkspaceSettings) -> Self {
        let exclude = settings
            .exclude
            .iter()
            .filter_map(|raw| match Pattern::new(raw.trim_start_matches("./")) {
                Ok(pattern) => Some(pattern),
                Err(err) => {
                    warn!(pattern = %raw, error = %err, "ignoring invalid exclude glob");
                    None
                }
            })
            .collect();
        Self {
            scan_depth: settings.scan_depth,
            exclude,
            cancel: CancellationToken::new(),
        }
    }

    /// Stop the scan when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Stylesheet paths below `root`, honouring the depth limit and the
    /// exclude globs. Sorted for a deterministic load order.
    pub fn collect_paths(&self, root: &Path) -> Result<Vec<PathBuf>, LoadError> {
        if !root.is_dir() {
            return Err(LoadError::DirectoryNotFound(root.to_path_buf()));
        }

        let mut paths = Vec::new();
        let walker = WalkDir::new(root)
            .max_depth(self.scan_depth)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| {
                let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
                !self.is_excluded(relative)
            });

        for entry in walker {
            if self.cancel.is_cancelled() {
                return Err(LoadError::Cancelled);
            }
            let entry = entry.map_err(|source| LoadError::Walk {
                path: root.to_path_buf(),
                source,
            })?;
            if entry.file_type().is_file() && is_stylesheet(entry.path()) {
                paths.push(entry.into_path());
            }
        }

        paths.sort();
        Ok(paths)
    }

    /// Read and parse every stylesheet below `root` in parallel.
    ///
    /// Documents already open in the editor keep their editor copy.
    pub fn load_directory(&self, root: &Path, cache: &StylesheetCache) -> Result<LoadSummary, LoadError> {
        let paths = self.collect_paths(root)?;
        debug!(root = %root.display(), files = paths.len(), "scanning workspace");

        let fs = OsFileSystem::new();
        let results: Vec<_> = paths
            .par_iter()
            .filter(|_| !self.cancel.is_cancelled())
            .map(|path| (path, load_file(&fs, path, cache)))
            .collect();

        if self.cancel.is_cancelled() {
            return Err(LoadError::Cancelled);
        }

        let mut summary = LoadSummary::default();
        for (path, result) in results {
            match result {
                Ok(_) => summary.loaded += 1,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "failed to load stylesheet");
                    summary.failed.push((path.clone(), err.to_string()));
                }
            }
        }
        Ok(summary)
    }

    /// Read and parse a single file.
    pub fn load_file(&self, path: &Path, cache: &StylesheetCache) -> Result<Arc<CacheEntry>, LoadError> {
        load_file(&OsFileSystem::new(), path, cache)
    }

    fn is_excluded(&self, relative: &Path) -> bool {
        let relative = relative.to_string_lossy().replace('\\', "/");
        !relative.is_empty()
            && self
                .exclude
                .iter()
                .any(|pattern| pattern.matches_with(&relative, EXCLUDE_MATCH))
    }
}

impl Default for WorkspaceLoader {
    fn default() -> Self {
        Self::new(&WorkspaceSettings::default())
    }
}

fn load_file(fs: &dyn FileSystem, path: &Path, cache: &StylesheetCache) -> Result<Arc<CacheEntry>, LoadError> {
    let uri = path_to_uri(path);
    let text = fs.read_file(&uri)?;
    Ok(cache.insert(TextDocument::from_uri(uri, 0, text)))
}

fn is_stylesheet(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| STYLESHEET_EXTENSIONS.contains(&ext))
}

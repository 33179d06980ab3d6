//! File-system boundary.
//!
//! The engine reads dependencies it has never seen opened through this trait.
//! Every failure is treated as "not found" by callers; [`FsError::is_not_found`]
//! separates the expected misses from I/O errors worth logging.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use thiserror::Error;

use crate::base::Uri;
use crate::base::uri::{path_to_uri, uri_to_path};

/// Kind of a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FileType {
    File,
    Directory,
}

/// Result of [`FileSystem::stat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    pub file_type: FileType,
    pub size: u64,
}

#[derive(Debug, Error)]
pub enum FsError {
    #[error("file not found: {0}")]
    NotFound(Uri),
    #[error("unsupported URI scheme: {0}")]
    UnsupportedScheme(Uri),
    #[error("I/O error on {uri}: {source}")]
    Io {
        uri: Uri,
        #[source]
        source: std::io::Error,
    },
}

impl FsError {
    /// Whether this is an expected miss rather than an unexpected failure.
    pub fn is_not_found(&self) -> bool {
        match self {
            FsError::NotFound(_) | FsError::UnsupportedScheme(_) => true,
            FsError::Io { source, .. } => source.kind() == std::io::ErrorKind::NotFound,
        }
    }

    fn io(uri: &str, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            FsError::NotFound(Arc::from(uri))
        } else {
            FsError::Io {
                uri: Arc::from(uri),
                source,
            }
        }
    }
}

/// File-system primitives the engine consumes.
pub trait FileSystem: Send + Sync {
    fn read_file(&self, uri: &str) -> Result<String, FsError>;

    fn stat(&self, uri: &str) -> Result<FileStat, FsError>;

    /// Immediate children of a directory as `(name, type)` pairs.
    fn read_directory(&self, uri: &str) -> Result<Vec<(String, FileType)>, FsError>;

    /// Canonical URI with symbolic links resolved.
    fn realpath(&self, uri: &str) -> Result<Uri, FsError> {
        Ok(Arc::from(uri))
    }

    fn is_file(&self, uri: &str) -> bool {
        matches!(self.stat(uri), Ok(stat) if stat.file_type == FileType::File)
    }

    fn is_dir(&self, uri: &str) -> bool {
        matches!(self.stat(uri), Ok(stat) if stat.file_type == FileType::Directory)
    }
}

// ============================================================================
// OS FILE SYSTEM
// ============================================================================

/// [`FileSystem`] backed by `std::fs`. Only `file://` URIs are supported.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFileSystem;

impl OsFileSystem {
    pub fn new() -> Self {
        Self
    }
}

fn to_path(uri: &str) -> Result<std::path::PathBuf, FsError> {
    uri_to_path(uri).ok_or_else(|| FsError::UnsupportedScheme(Arc::from(uri)))
}

impl FileSystem for OsFileSystem {
    fn read_file(&self, uri: &str) -> Result<String, FsError> {
        let path = to_path(uri)?;
        std::fs::read_to_string(&path).map_err(|e| FsError::io(uri, e))
    }

    fn stat(&self, uri: &str) -> Result<FileStat, FsError> {
        let path = to_path(uri)?;
        let meta = std::fs::metadata(&path).map_err(|e| FsError::io(uri, e))?;
        Ok(FileStat {
            file_type: if meta.is_dir() {
                FileType::Directory
            } else {
                FileType::File
            },
            size: meta.len(),
        })
    }

    fn read_directory(&self, uri: &str) -> Result<Vec<(String, FileType)>, FsError> {
        let path = to_path(uri)?;
        let entries = std::fs::read_dir(&path).map_err(|e| FsError::io(uri, e))?;
        let mut out = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| FsError::io(uri, e))?;
            let is_dir = entry.path().is_dir();
            out.push((
                entry.file_name().to_string_lossy().into_owned(),
                if is_dir {
                    FileType::Directory
                } else {
                    FileType::File
                },
            ));
        }
        out.sort();
        Ok(out)
    }

    fn realpath(&self, uri: &str) -> Result<Uri, FsError> {
        let path = to_path(uri)?;
        let real = std::fs::canonicalize(&path).map_err(|e| FsError::io(uri, e))?;
        Ok(path_to_uri(&real))
    }
}

// ============================================================================
// IN-MEMORY FILE SYSTEM
// ============================================================================

/// [`FileSystem`] over an in-memory map of URI → text.
///
/// Directories exist implicitly when some file lives below them. Symbolic
/// links map a link URI (file or directory) onto a target URI.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    files: RwLock<IndexMap<Uri, String>>,
    links: RwLock<IndexMap<Uri, Uri>>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a file system pre-populated with `(uri, text)` pairs.
    pub fn with_files<'a>(files: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let fs = Self::new();
        for (uri, text) in files {
            fs.insert(uri, text);
        }
        fs
    }

    pub fn insert(&self, uri: &str, text: impl Into<String>) {
        self.files.write().insert(Arc::from(uri), text.into());
    }

    pub fn remove(&self, uri: &str) -> bool {
        self.files.write().shift_remove(uri).is_some()
    }

    /// Make `link` point at `target`.
    pub fn symlink(&self, link: &str, target: &str) {
        self.links.write().insert(Arc::from(link), Arc::from(target));
    }

    fn resolve_links(&self, uri: &str) -> String {
        let links = self.links.read();
        let mut current = uri.to_string();
        // bounded so that link cycles terminate
        for _ in 0..32 {
            let hit = links.iter().find_map(|(link, target)| {
                if current == **link {
                    Some(target.to_string())
                } else {
                    current
                        .strip_prefix(&**link)
                        .filter(|rest| rest.starts_with('/'))
                        .map(|rest| format!("{target}{rest}"))
                }
            });
            match hit {
                Some(next) => current = next,
                None => break,
            }
        }
        current
    }

    fn has_dir(&self, uri: &str) -> bool {
        let prefix = format!("{}/", uri.trim_end_matches('/'));
        self.files.read().keys().any(|k| k.starts_with(&prefix))
    }
}

impl FileSystem for MemoryFileSystem {
    fn read_file(&self, uri: &str) -> Result<String, FsError> {
        let real = self.resolve_links(uri);
        self.files
            .read()
            .get(real.as_str())
            .cloned()
            .ok_or_else(|| FsError::NotFound(Arc::from(uri)))
    }

    fn stat(&self, uri: &str) -> Result<FileStat, FsError> {
        let real = self.resolve_links(uri);
        if let Some(text) = self.files.read().get(real.as_str()) {
            return Ok(FileStat {
                file_type: FileType::File,
                size: text.len() as u64,
            });
        }
        if self.has_dir(&real) {
            return Ok(FileStat {
                file_type: FileType::Directory,
                size: 0,
            });
        }
        Err(FsError::NotFound(Arc::from(uri)))
    }

    fn read_directory(&self, uri: &str) -> Result<Vec<(String, FileType)>, FsError> {
        let real = self.resolve_links(uri);
        let prefix = format!("{}/", real.trim_end_matches('/'));
        let mut out: IndexMap<String, FileType> = IndexMap::new();
        for key in self.files.read().keys() {
            let Some(rest) = key.strip_prefix(&prefix) else {
                continue;
            };
            match rest.split_once('/') {
                Some((dir, _)) => {
                    out.insert(dir.to_string(), FileType::Directory);
                }
                None => {
                    out.entry(rest.to_string()).or_insert(FileType::File);
                }
            }
        }
        if out.is_empty() {
            return Err(FsError::NotFound(Arc::from(uri)));
        }
        let mut entries: Vec<_> = out.into_iter().collect();
        entries.sort();
        Ok(entries)
    }

    fn realpath(&self, uri: &str) -> Result<Uri, FsError> {
        Ok(Arc::from(self.resolve_links(uri)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_fs_read_and_stat() {
        let fs = MemoryFileSystem::with_files([("file:///p/a.scss", "$a: 1;")]);
        assert_eq!(fs.read_file("file:///p/a.scss").unwrap(), "$a: 1;");
        assert!(fs.is_file("file:///p/a.scss"));
        assert!(fs.is_dir("file:///p"));
        assert!(!fs.is_file("file:///p/b.scss"));

        let err = fs.read_file("file:///p/b.scss").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_memory_fs_read_directory() {
        let fs = MemoryFileSystem::with_files([
            ("file:///p/a.scss", ""),
            ("file:///p/sub/b.scss", ""),
            ("file:///p/sub/c.scss", ""),
        ]);
        let entries = fs.read_directory("file:///p").unwrap();
        assert_eq!(
            entries,
            vec![
                ("a.scss".to_string(), FileType::File),
                ("sub".to_string(), FileType::Directory)
            ]
        );
    }

    #[test]
    fn test_memory_fs_symlinks() {
        let fs = MemoryFileSystem::with_files([("file:///real/lib/_x.scss", "$x: 1;")]);
        fs.symlink("file:///p/node_modules/lib", "file:///real/lib");

        assert_eq!(
            fs.read_file("file:///p/node_modules/lib/_x.scss").unwrap(),
            "$x: 1;"
        );
        assert_eq!(
            &*fs.realpath("file:///p/node_modules/lib/_x.scss").unwrap(),
            "file:///real/lib/_x.scss"
        );
    }

    #[test]
    fn test_os_fs_rejects_other_schemes() {
        let err = OsFileSystem.read_file("sass:math").unwrap_err();
        assert!(matches!(err, FsError::UnsupportedScheme(_)));
    }

    #[test]
    fn test_os_fs_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("_one.scss");
        std::fs::write(&path, "$primary: limegreen;").unwrap();

        let uri = path_to_uri(&path);
        let fs = OsFileSystem::new();
        assert_eq!(fs.read_file(&uri).unwrap(), "$primary: limegreen;");
        assert!(fs.is_file(&uri));

        let dir_uri = path_to_uri(dir.path());
        let entries = fs.read_directory(&dir_uri).unwrap();
        assert_eq!(entries, vec![("_one.scss".to_string(), FileType::File)]);
    }
}

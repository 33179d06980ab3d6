//! Document URIs.
//!
//! Documents are identified by URI strings. Files on disk use the `file://`
//! scheme; built-in modules use the `sass:` sentinel scheme and never touch
//! the file system.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use url::Url;

/// A document URI, cheap to clone.
pub type Uri = Arc<str>;

/// Convert a file path to a percent-encoded `file://` URI.
///
/// Relative paths are taken from the file system root.
pub fn path_to_uri(path: &Path) -> Uri {
    match Url::from_file_path(path) {
        Ok(url) => Arc::from(url.as_str()),
        Err(()) => join("file:///", &path.to_string_lossy().replace('\\', "/")),
    }
}

/// Convert a `file://` URI to a path.
pub fn uri_to_path(uri: &str) -> Option<PathBuf> {
    Url::parse(uri).ok()?.to_file_path().ok()
}

/// The scheme of a URI-like string (`file`, `sass`, `https`, `data`...).
///
/// Single-letter schemes are treated as Windows drive letters, not schemes.
pub fn scheme(target: &str) -> Option<&str> {
    let colon = target.find(':')?;
    let candidate = &target[..colon];
    let valid = candidate.len() > 1
        && candidate.starts_with(|c: char| c.is_ascii_alphabetic())
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some(candidate)
}

/// Everything up to (not including) the last `/`.
pub fn dirname(uri: &str) -> &str {
    match uri.rfind('/') {
        Some(idx) => &uri[..idx],
        None => "",
    }
}

/// The last path segment of a URI.
pub fn basename(uri: &str) -> &str {
    match uri.rfind('/') {
        Some(idx) => &uri[idx + 1..],
        None => uri,
    }
}

/// Resolve `reference` against a directory URI, normalising `.` and `..`.
///
/// Absolute references (`/x/y`) replace the path part of `base_dir`. The
/// result is percent-encoded the way editors send URIs.
pub fn join(base_dir: &str, reference: &str) -> Uri {
    let base = format!("{}/", base_dir.trim_end_matches('/'));
    // `C:/x` is a drive path, not a `c:` URL
    let drive;
    let reference = if reference.as_bytes().get(1) == Some(&b':')
        && reference.starts_with(|c: char| c.is_ascii_alphabetic())
    {
        drive = format!("/{reference}");
        drive.as_str()
    } else {
        reference
    };
    match Url::parse(&base).and_then(|base| base.join(reference)) {
        Ok(url) if url.path() == "/" => Arc::from(url.as_str()),
        Ok(url) => Arc::from(url.as_str().trim_end_matches('/')),
        Err(_) => join_segments(base_dir, reference),
    }
}

/// Plain segment join for bases that are not absolute URLs.
fn join_segments(base_dir: &str, reference: &str) -> Uri {
    let mut segments: Vec<&str> = if reference.starts_with('/') {
        Vec::new()
    } else {
        base_dir.split('/').filter(|s| !s.is_empty()).collect()
    };
    for segment in reference.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    Arc::from(segments.join("/"))
}

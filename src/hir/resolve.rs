//! Link Resolver.
//!
//! Turns the raw target of a `@use`/`@forward`/`@import` into a concrete
//! document URI. Steps, first success wins:
//!
//! 1. `sass:` built-in modules → sentinel URI, no file-system access
//! 2. `~pkg/...` → dependency-directory lookup
//! 3. `pkg:name/sub` → package manifest and export map
//! 4. relative or absolute path → path variations, then configured load paths
//! 5. dependency-directory fallback, walking up from the document
//! 6. alias table substitution, then steps 4 and 5 again
//!
//! Every file-system failure is a miss; resolution returns `None` rather than
//! an error.

use indexmap::IndexMap;
use serde_json::Value as Json;
use tracing::{debug, trace};

use crate::base::Uri;
use crate::base::uri::{basename, dirname, join, scheme};
use crate::project::{FileSystem, WorkspaceSettings};

use super::builtins;
use super::links::{Link, LinkKind};

const EXTENSIONS: [&str; 3] = ["scss", "sass", "css"];

/// Workspace-level inputs of resolution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolverConfig {
    /// Workspace root directories, as URIs.
    pub roots: Vec<Uri>,
    /// Directories searched after the importing document's directory,
    /// relative to each root.
    pub load_paths: Vec<String>,
    /// `"@styles/*": "src/styles/*"` or `"~ui": "packages/ui"`.
    pub aliases: IndexMap<String, String>,
}

impl ResolverConfig {
    pub fn from_settings(roots: Vec<Uri>, settings: &WorkspaceSettings) -> Self {
        Self {
            roots,
            load_paths: settings.load_paths.clone(),
            aliases: settings.path_aliases.clone(),
        }
    }
}

/// Resolves link targets against a [`FileSystem`].
pub struct LinkResolver<'a> {
    fs: &'a dyn FileSystem,
    config: &'a ResolverConfig,
}

impl<'a> LinkResolver<'a> {
    pub fn new(fs: &'a dyn FileSystem, config: &'a ResolverConfig) -> Self {
        Self { fs, config }
    }

    /// Resolve every followable link of a document. Plain CSS links are left
    /// unresolved.
    pub fn resolve_links(&self, links: &[Link], from: &str) -> Vec<Link> {
        links
            .iter()
            .map(|link| {
                let mut link = link.clone();
                if link.kind != LinkKind::OpaqueUrl {
                    link.resolved = self.resolve(&link.raw_target, from);
                }
                link
            })
            .collect()
    }

    /// Resolve `raw` as referenced from the document `from`.
    pub fn resolve(&self, raw: &str, from: &str) -> Option<Uri> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if builtins::is_builtin_uri(raw) {
            return builtins::module(raw).map(|m| m.uri());
        }

        let found = self
            .resolve_direct(raw, from)
            .or_else(|| self.resolve_alias(raw, from));
        match &found {
            Some(uri) => trace!(link = raw, resolved = %uri, "resolved link"),
            None => debug!(link = raw, from, "unresolved link"),
        }
        found.map(|uri| self.canonical(uri))
    }

    /// Where an unresolved target would live: joined to the document's
    /// directory. `None` for targets that are not paths.
    pub fn best_guess(raw: &str, from: &str) -> Option<Uri> {
        if raw.is_empty() || scheme(raw).is_some() || raw.starts_with("//") || raw.starts_with('~') {
            return None;
        }
        Some(join(dirname(from), raw))
    }

    fn canonical(&self, uri: Uri) -> Uri {
        if builtins::is_builtin_uri(&uri) {
            return uri;
        }
        self.fs.realpath(&uri).unwrap_or(uri)
    }

    fn resolve_direct(&self, raw: &str, from: &str) -> Option<Uri> {
        if let Some(rest) = raw.strip_prefix('~') {
            return self.resolve_dependency(rest, from);
        }
        if let Some(rest) = raw.strip_prefix("pkg:") {
            return self.resolve_dependency(rest, from);
        }
        if let Some(scheme) = scheme(raw) {
            return if scheme == "file" {
                self.find_variation(raw)
            } else {
                None
            };
        }
        if raw.starts_with("//") {
            return None;
        }

        self.find_variation(&join(dirname(from), raw))
            .or_else(|| self.resolve_load_paths(raw))
            .or_else(|| self.resolve_dependency(raw, from))
    }

    fn resolve_load_paths(&self, raw: &str) -> Option<Uri> {
        self.config.roots.iter().find_map(|root| {
            self.config
                .load_paths
                .iter()
                .find_map(|dir| self.find_variation(&join(&join(root, dir), raw)))
        })
    }

    fn resolve_alias(&self, raw: &str, from: &str) -> Option<Uri> {
        for (key, value) in &self.config.aliases {
            let Some(substituted) = substitute_alias(key, value, raw) else {
                continue;
            };
            trace!(alias = %key, substituted = %substituted, "applying path alias");
            if scheme(&substituted).is_some() {
                if let Some(uri) = self.resolve_direct(&substituted, from) {
                    return Some(uri);
                }
                continue;
            }
            let relative = substituted.trim_start_matches("./");
            for root in &self.config.roots {
                if let Some(uri) = self.find_variation(&join(root, relative)) {
                    return Some(uri);
                }
            }
        }
        None
    }

    // ------------------------------------------------------------------------
    // Path variations
    // ------------------------------------------------------------------------

    /// Try the path variations of a candidate URI: exact, with extensions,
    /// as a partial, then index files.
    fn find_variation(&self, base: &str) -> Option<Uri> {
        variations(base).into_iter().find(|candidate| self.fs.is_file(candidate))
    }

    // ------------------------------------------------------------------------
    // Packages
    // ------------------------------------------------------------------------

    /// Find `name[/subpath]` inside the nearest `node_modules` above `from`.
    fn resolve_dependency(&self, specifier: &str, from: &str) -> Option<Uri> {
        let (name, subpath) = split_package(specifier)?;
        let package_dir = self.find_package_dir(name, from)?;

        let manifest_uri = join(&package_dir, "package.json");
        let manifest = self
            .fs
            .read_file(&manifest_uri)
            .ok()
            .and_then(|text| serde_json::from_str::<Json>(&text).ok());

        if let Some(exports) = manifest.as_ref().and_then(|m| m.get("exports")) {
            if let Some(target) = match_exports(exports, subpath) {
                return self.find_variation(&join(&package_dir, &target));
            }
            debug!(package = name, subpath, "no matching export");
        }

        if subpath.is_empty() {
            let main = manifest.as_ref().and_then(|m| {
                ["sass", "style"]
                    .iter()
                    .find_map(|field| m.get(*field).and_then(Json::as_str))
            });
            if let Some(main) = main {
                if let Some(uri) = self.find_variation(&join(&package_dir, main)) {
                    return Some(uri);
                }
            }
            return self.find_variation(&package_dir);
        }
        self.find_variation(&join(&package_dir, subpath))
    }

    fn find_package_dir(&self, name: &str, from: &str) -> Option<Uri> {
        let mut dir = dirname(from);
        loop {
            let candidate = join(dir, &format!("node_modules/{name}"));
            if self.fs.is_dir(&candidate) {
                return Some(candidate);
            }
            if !dir.contains(":///") || dir.ends_with("://") {
                return None;
            }
            dir = dirname(dir);
        }
    }
}

/// Candidate URIs for `base`, in search order.
pub fn variations(base: &str) -> Vec<Uri> {
    let base = base.trim_end_matches('/');
    let dir = dirname(base);
    let file = basename(base);
    let mut out: Vec<Uri> = vec![base.into()];

    let has_extension = file
        .rsplit_once('.')
        .is_some_and(|(_, ext)| EXTENSIONS.contains(&ext));

    if has_extension {
        if !file.starts_with('_') {
            out.push(format!("{dir}/_{file}").into());
        }
        return out;
    }

    for ext in EXTENSIONS {
        out.push(format!("{base}.{ext}").into());
    }
    if !file.starts_with('_') {
        for ext in EXTENSIONS {
            out.push(format!("{dir}/_{file}.{ext}").into());
        }
    }
    for index in ["index", "_index"] {
        for ext in ["scss", "sass"] {
            out.push(format!("{base}/{index}.{ext}").into());
        }
    }
    out
}

/// Split `@scope/name/sub/path` or `name/sub/path` into name and subpath.
fn split_package(specifier: &str) -> Option<(&str, &str)> {
    let specifier = specifier.trim_start_matches('/');
    let segments = if specifier.starts_with('@') { 2 } else { 1 };
    let mut end = 0;
    for _ in 0..segments {
        let rest = &specifier[end..];
        match rest.find('/') {
            Some(idx) => end += idx + 1,
            None => {
                end = specifier.len() + 1;
                break;
            }
        }
    }
    if end > specifier.len() {
        return (!specifier.is_empty()).then_some((specifier, ""));
    }
    Some((&specifier[..end - 1], &specifier[end..]))
}

fn substitute_alias(key: &str, value: &str, raw: &str) -> Option<String> {
    if let Some(prefix) = key.strip_suffix('*') {
        let rest = raw.strip_prefix(prefix)?;
        let target = value.strip_suffix('*').unwrap_or(value);
        return Some(format!("{target}{rest}"));
    }
    if raw == key {
        return Some(value.to_string());
    }
    let rest = raw.strip_prefix(key)?.strip_prefix('/')?;
    Some(format!("{}/{rest}", value.trim_end_matches('/')))
}

/// Match a subpath against a manifest `exports` field.
///
/// Literal keys win over patterns; among patterns the longest prefix before
/// the `*` wins and the captured segment replaces `*` in the target.
fn match_exports(exports: &Json, subpath: &str) -> Option<String> {
    let key = if subpath.is_empty() {
        ".".to_string()
    } else {
        format!("./{subpath}")
    };

    let map = match exports {
        Json::Object(map) if map.keys().any(|k| k.starts_with('.')) => map,
        // sugar: the whole value is the "." export
        other => return (key == ".").then(|| condition_target(other)).flatten(),
    };

    if let Some(target) = map.get(&key) {
        return condition_target(target);
    }

    let mut best: Option<(usize, String)> = None;
    for (pattern, target) in map {
        let Some((prefix, suffix)) = pattern.split_once('*') else {
            continue;
        };
        let Some(captured) = key
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_suffix(suffix))
        else {
            continue;
        };
        if best.as_ref().is_some_and(|(len, _)| *len >= prefix.len()) {
            continue;
        }
        if let Some(target) = condition_target(target) {
            best = Some((prefix.len(), target.replace('*', captured)));
        }
    }
    best.map(|(_, target)| target)
}

/// A string target or the first of the `sass`, `style`, `default` conditions.
fn condition_target(target: &Json) -> Option<String> {
    match target {
        Json::String(s) => Some(s.clone()),
        Json::Object(conditions) => ["sass", "style", "default"]
            .iter()
            .find_map(|c| conditions.get(*c).and_then(condition_target)),
        Json::Array(items) => items.iter().find_map(condition_target),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::MemoryFileSystem;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn resolve(fs: &MemoryFileSystem, raw: &str, from: &str) -> Option<String> {
        let config = ResolverConfig::default();
        LinkResolver::new(fs, &config)
            .resolve(raw, from)
            .map(|u| u.to_string())
    }

    #[test]
    fn test_variations_order() {
        let all: Vec<String> = variations("file:///p/one").iter().map(|u| u.to_string()).collect();
        assert_eq!(
            all[..7],
            [
                "file:///p/one",
                "file:///p/one.scss",
                "file:///p/one.sass",
                "file:///p/one.css",
                "file:///p/_one.scss",
                "file:///p/_one.sass",
                "file:///p/_one.css",
            ]
        );
        assert_eq!(all.last().map(String::as_str), Some("file:///p/one/_index.sass"));
    }

    #[test]
    fn test_relative_and_partial() {
        let fs = MemoryFileSystem::with_files([
            ("file:///p/_one.scss", ""),
            ("file:///p/lib/two.sass", ""),
            ("file:///p/theme/_index.scss", ""),
        ]);
        let from = "file:///p/main.scss";
        assert_eq!(resolve(&fs, "./one", from).as_deref(), Some("file:///p/_one.scss"));
        assert_eq!(resolve(&fs, "one.scss", from).as_deref(), Some("file:///p/_one.scss"));
        assert_eq!(resolve(&fs, "lib/two", from).as_deref(), Some("file:///p/lib/two.sass"));
        assert_eq!(resolve(&fs, "theme", from).as_deref(), Some("file:///p/theme/_index.scss"));
        assert_eq!(resolve(&fs, "missing", from), None);
    }

    #[test]
    fn test_builtin_and_foreign_schemes() {
        let fs = MemoryFileSystem::new();
        assert_eq!(resolve(&fs, "sass:math", "file:///p/a.scss").as_deref(), Some("sass:math"));
        assert_eq!(resolve(&fs, "sass:nope", "file:///p/a.scss"), None);
        assert_eq!(resolve(&fs, "https://x/y.css", "file:///p/a.scss"), None);
        assert_eq!(resolve(&fs, "data:text/css,a", "file:///p/a.scss"), None);
    }

    #[test]
    fn test_node_modules_walk_and_tilde() {
        let fs = MemoryFileSystem::with_files([
            ("file:///p/node_modules/lib/_vars.scss", ""),
            ("file:///p/node_modules/lib/package.json", r#"{ "sass": "main.scss" }"#),
            ("file:///p/node_modules/lib/main.scss", ""),
        ]);
        let from = "file:///p/src/deep/a.scss";
        assert_eq!(
            resolve(&fs, "lib/vars", from).as_deref(),
            Some("file:///p/node_modules/lib/_vars.scss")
        );
        assert_eq!(
            resolve(&fs, "~lib/vars", from).as_deref(),
            Some("file:///p/node_modules/lib/_vars.scss")
        );
        assert_eq!(
            resolve(&fs, "~lib", from).as_deref(),
            Some("file:///p/node_modules/lib/main.scss")
        );
    }

    #[test]
    fn test_pkg_exports() {
        let manifest = json!({
            "exports": {
                ".": { "sass": "./scss/index.scss", "default": "./index.js" },
                "./theme": "./scss/theme/_theme.scss",
                "./*": { "sass": "./scss/*.scss" },
                "./components/*": "./scss/components/_*.scss"
            }
        })
        .to_string();
        let fs = MemoryFileSystem::with_files([
            ("file:///p/node_modules/@acme/ui/package.json", manifest.as_str()),
            ("file:///p/node_modules/@acme/ui/scss/index.scss", ""),
            ("file:///p/node_modules/@acme/ui/scss/theme/_theme.scss", ""),
            ("file:///p/node_modules/@acme/ui/scss/colors.scss", ""),
            ("file:///p/node_modules/@acme/ui/scss/components/_button.scss", ""),
        ]);
        let from = "file:///p/a.scss";
        assert_eq!(
            resolve(&fs, "pkg:@acme/ui", from).as_deref(),
            Some("file:///p/node_modules/@acme/ui/scss/index.scss")
        );
        assert_eq!(
            resolve(&fs, "pkg:@acme/ui/theme", from).as_deref(),
            Some("file:///p/node_modules/@acme/ui/scss/theme/_theme.scss")
        );
        assert_eq!(
            resolve(&fs, "pkg:@acme/ui/colors", from).as_deref(),
            Some("file:///p/node_modules/@acme/ui/scss/colors.scss")
        );
        assert_eq!(
            resolve(&fs, "pkg:@acme/ui/components/button", from).as_deref(),
            Some("file:///p/node_modules/@acme/ui/scss/components/_button.scss")
        );
    }

    #[test]
    fn test_aliases_and_load_paths() {
        let fs = MemoryFileSystem::with_files([
            ("file:///p/src/styles/_vars.scss", ""),
            ("file:///p/packages/ui/_button.scss", ""),
            ("file:///p/shared/_mixins.scss", ""),
        ]);
        let mut aliases = IndexMap::new();
        aliases.insert("@styles/*".to_string(), "src/styles/*".to_string());
        aliases.insert("~ui".to_string(), "./packages/ui".to_string());
        let config = ResolverConfig {
            roots: vec!["file:///p".into()],
            load_paths: vec!["shared".to_string()],
            aliases,
        };
        let resolver = LinkResolver::new(&fs, &config);
        let from = "file:///p/app/main.scss";
        assert_eq!(
            resolver.resolve("@styles/vars", from).as_deref(),
            Some("file:///p/src/styles/_vars.scss")
        );
        assert_eq!(
            resolver.resolve("~ui/button", from).as_deref(),
            Some("file:///p/packages/ui/_button.scss")
        );
        assert_eq!(
            resolver.resolve("mixins", from).as_deref(),
            Some("file:///p/shared/_mixins.scss")
        );
    }

    #[test]
    fn test_symlinked_targets_are_canonical() {
        let fs = MemoryFileSystem::with_files([("file:///real/lib/_x.scss", "")]);
        fs.symlink("file:///p/node_modules/lib", "file:///real/lib");
        assert_eq!(
            resolve(&fs, "lib/x", "file:///p/a.scss").as_deref(),
            Some("file:///real/lib/_x.scss")
        );
    }

    #[test]
    fn test_best_guess() {
        assert_eq!(
            LinkResolver::best_guess("nonexistent", "file:///p/a.scss").as_deref(),
            Some("file:///p/nonexistent")
        );
        assert_eq!(LinkResolver::best_guess("sass:math", "file:///p/a.scss"), None);
        assert_eq!(LinkResolver::best_guess("data:x", "file:///p/a.scss"), None);
    }

    #[test]
    fn test_split_package() {
        assert_eq!(split_package("lib"), Some(("lib", "")));
        assert_eq!(split_package("lib/a/b"), Some(("lib", "a/b")));
        assert_eq!(split_package("@s/lib"), Some(("@s/lib", "")));
        assert_eq!(split_package("@s/lib/x"), Some(("@s/lib", "x")));
    }
}

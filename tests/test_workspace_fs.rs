//! Workspace scans and link resolution against the real file system.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use pretty_assertions::assert_eq;
use sassy::base::uri::path_to_uri;
use sassy::ide::{AnalysisHost, GotoTarget};
use sassy::project::{OsFileSystem, Settings, WorkspaceLoader};
use sassy::{TextSize, Uri};
use tempfile::TempDir;

// ============================================================================
// FIXTURE
// ============================================================================

struct Project {
    _dir: TempDir,
    root: PathBuf,
}

impl Project {
    fn new(files: &[(&str, &str)]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        // canonical, so URIs match what realpath reports
        let root = dir.path().canonicalize().unwrap();
        for (path, text) in files {
            let path = root.join(path);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, text).unwrap();
        }
        Self { _dir: dir, root }
    }

    fn uri(&self, relative: &str) -> Uri {
        path_to_uri(&self.root.join(relative))
    }

    fn host(&self) -> AnalysisHost {
        AnalysisHost::with_settings(
            Arc::new(OsFileSystem::new()),
            vec![path_to_uri(&self.root)],
            Settings::default(),
        )
    }
}

fn definition_uri(host: &AnalysisHost, uri: &str, needle: &str) -> Option<Uri> {
    let analysis = host.analysis();
    let entry = analysis.document(uri)?;
    let offset = entry.document().text.find(needle)? as u32 + 1;
    let position = entry.document().position_at(TextSize::from(offset));
    match analysis.goto_definition(uri, position)?.target {
        GotoTarget::Declaration(location) => Some(location.uri),
        _ => None,
    }
}

fn relative(root: &Path, uri: &str) -> String {
    let prefix = path_to_uri(root);
    uri.strip_prefix(&*prefix).unwrap_or(uri).trim_start_matches('/').to_string()
}

// ============================================================================
// WORKSPACE SCAN
// ============================================================================

#[test]
fn test_load_workspace_skips_dependencies() {
    let project = Project::new(&[
        ("src/_vars.scss", "$brand: navy;"),
        ("src/app.scss", "@use \"vars\";\n.a { color: vars.$brand; }"),
        ("src/legacy.sass", "$old: 1\n"),
        ("node_modules/lib/_x.scss", "$y: 1;"),
        ("README.md", "# styles"),
    ]);
    let host = project.host();
    let summary = host.load_workspace(&WorkspaceLoader::default()).unwrap();
    assert_eq!(summary.loaded, 3);
    assert!(summary.failed.is_empty());

    let mut names: Vec<String> = host
        .analysis()
        .workspace_symbols("")
        .into_iter()
        .map(|s| s.name.to_string())
        .collect();
    names.sort();
    assert_eq!(names, vec!["$brand", "$old"]);
}

#[test]
fn test_loaded_documents_answer_references() {
    let project = Project::new(&[
        ("_vars.scss", "$brand: navy;"),
        ("a.scss", "@use \"vars\";\n.a { color: vars.$brand; }"),
        ("b.scss", "@use \"vars\" as v;\n.b { border-color: v.$brand; }"),
    ]);
    let host = project.host();
    host.load_workspace(&WorkspaceLoader::default()).unwrap();

    let vars = project.uri("_vars.scss");
    let result = host
        .analysis()
        .find_references(&vars, sassy::LineCol::new(0, 1), false)
        .unwrap();
    let mut files: Vec<String> = result
        .references
        .iter()
        .map(|r| relative(&project.root, &r.location.uri))
        .collect();
    files.sort();
    assert_eq!(files, vec!["a.scss", "b.scss"]);
}

// ============================================================================
// RESOLUTION
// ============================================================================

#[test]
fn test_dependency_directory_lookup() {
    let project = Project::new(&[
        ("node_modules/theme/_colors.scss", "$accent: teal;"),
        ("src/deep/app.scss", "@use \"theme/colors\";\n.a { color: colors.$accent; }"),
    ]);
    let host = project.host();
    let app = project.uri("src/deep/app.scss");
    assert_eq!(
        definition_uri(&host, &app, "$accent"),
        Some(project.uri("node_modules/theme/_colors.scss"))
    );
}

#[test]
fn test_package_exports() {
    let manifest = r#"{
        "name": "@acme/ui",
        "exports": {
            ".": { "sass": "./scss/index.scss" },
            "./tokens/*": "./scss/tokens/_*.scss"
        }
    }"#;
    let project = Project::new(&[
        ("node_modules/@acme/ui/package.json", manifest),
        ("node_modules/@acme/ui/scss/index.scss", "@mixin button { a: b; }"),
        ("node_modules/@acme/ui/scss/tokens/_space.scss", "$md: 8px;"),
        (
            "app.scss",
            "@use \"pkg:@acme/ui\";\n@use \"pkg:@acme/ui/tokens/space\";\n.a { @include ui.button; margin: space.$md; }",
        ),
    ]);
    let host = project.host();
    let app = project.uri("app.scss");
    assert_eq!(
        definition_uri(&host, &app, "button;"),
        Some(project.uri("node_modules/@acme/ui/scss/index.scss"))
    );
    assert_eq!(
        definition_uri(&host, &app, "$md"),
        Some(project.uri("node_modules/@acme/ui/scss/tokens/_space.scss"))
    );
}

#[cfg(unix)]
#[test]
fn test_symlinked_dependency_is_one_document() {
    let project = Project::new(&[
        ("shared/_mixins.scss", "@mixin card { a: b; }"),
        ("app/a.scss", "@use \"mixins\";\n.a { @include mixins.card; }"),
    ]);
    std::os::unix::fs::symlink(project.root.join("shared"), project.root.join("app/node_modules")).unwrap();
    std::fs::write(
        project.root.join("app/b.scss"),
        "@use \"node_modules/mixins\";\n.b { @include mixins.card; }",
    )
    .unwrap();
    std::os::unix::fs::symlink(
        project.root.join("shared/_mixins.scss"),
        project.root.join("app/_mixins.scss"),
    )
    .unwrap();

    let host = project.host();
    let real = project.uri("shared/_mixins.scss");
    assert_eq!(definition_uri(&host, &project.uri("app/a.scss"), "card;"), Some(real.clone()));
    assert_eq!(definition_uri(&host, &project.uri("app/b.scss"), "card;"), Some(real.clone()));

    let result = host
        .analysis()
        .find_references(&real, sassy::LineCol::new(0, 8), true)
        .unwrap();
    let mut files: Vec<String> = result
        .references
        .iter()
        .map(|r| relative(&project.root, &r.location.uri))
        .collect();
    files.sort();
    assert_eq!(files, vec!["app/a.scss", "app/b.scss", "shared/_mixins.scss"]);
}

#[test]
fn test_missing_files_are_not_errors() {
    let project = Project::new(&[("a.scss", "@use \"gone\";\n.a { color: gone.$x; }")]);
    let host = project.host();
    let a = project.uri("a.scss");
    assert_eq!(definition_uri(&host, &a, "$x"), None);

    let links = host.analysis().document_links(&a);
    assert_eq!(links.len(), 1);
    assert!(!links[0].resolved);
    assert_eq!(links[0].target, project.uri("gone"));
}

//! Cross-file resolution through the public analysis API.
//!
//! Every workspace here lives in a `MemoryFileSystem`; documents are pulled
//! into the cache the same way an editor session would reach them.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use rstest::rstest;
use sassy::hir::{Module, StylesheetCache, TextDocument, TraversalOptions};
use sassy::ide::{AnalysisHost, GotoTarget, TextEdit};
use sassy::project::{MemoryFileSystem, Settings};
use sassy::{LineCol, TextSize};

// ============================================================================
// FIXTURE
// ============================================================================

fn workspace(files: &[(&str, &str)]) -> AnalysisHost {
    workspace_with(files, Settings::default())
}

fn workspace_with(files: &[(&str, &str)], settings: Settings) -> AnalysisHost {
    let fs = MemoryFileSystem::with_files(files.iter().copied());
    let host = AnalysisHost::with_settings(Arc::new(fs), vec!["file:///p".into()], settings);
    for (uri, _) in files {
        host.analysis().document(uri);
    }
    host
}

fn use_only() -> Settings {
    let mut settings = Settings::default();
    settings.scss.completion.suggest_from_use_only = true;
    settings
}

/// Position of `needle` in the document, shifted by `shift` bytes.
fn position(host: &AnalysisHost, uri: &str, needle: &str, shift: u32) -> LineCol {
    let entry = host.analysis().document(uri).expect("document is reachable");
    let offset = entry.document().text.find(needle).expect("needle is present") as u32 + shift;
    entry.document().position_at(TextSize::from(offset))
}

/// `(uri, declared text)` of the definition of `needle`.
fn definition(host: &AnalysisHost, uri: &str, needle: &str) -> Option<(String, String)> {
    let analysis = host.analysis();
    let result = analysis.goto_definition(uri, position(host, uri, needle, 1))?;
    match result.target {
        GotoTarget::Declaration(location) => {
            let entry = analysis.document(&location.uri)?;
            Some((
                location.uri.to_string(),
                entry.document().slice(location.range).to_string(),
            ))
        }
        other => panic!("expected a declaration, got {other:?}"),
    }
}

fn labels(host: &AnalysisHost, uri: &str, text: &str) -> Vec<String> {
    let cursor = text.find('|').expect("cursor marker");
    let source = text.replace('|', "");
    host.open_document(uri, Some("scss"), 1, source.as_str());
    let entry = host.analysis().document(uri).expect("open document");
    let at = entry.document().position_at(TextSize::from(cursor as u32));
    host.analysis()
        .completions(uri, at)
        .into_iter()
        .map(|item| item.label)
        .collect()
}

fn apply(text: &str, edits: &[TextEdit]) -> String {
    let mut out = text.to_string();
    let mut edits = edits.to_vec();
    edits.sort_by_key(|e| std::cmp::Reverse(e.range.start()));
    for edit in edits {
        out.replace_range(std::ops::Range::<usize>::from(edit.range), &edit.new_text);
    }
    out
}

// ============================================================================
// CACHE
// ============================================================================

#[test]
fn test_reparse_of_same_version_is_shared() {
    let cache = StylesheetCache::new();
    let text = "@use \"one\";\n$a: one.$b;";
    let first = cache.insert(TextDocument::from_uri("file:///p/a.scss", 1, text));
    let second = cache.insert(TextDocument::from_uri("file:///p/a.scss", 1, text));
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.symbols(), second.symbols());
    assert_eq!(first.links(), second.links());

    let third = cache.insert(TextDocument::from_uri("file:///p/a.scss", 2, "$c: 1;"));
    assert!(!Arc::ptr_eq(&first, &third));
    assert_eq!(third.symbols().symbols[0].name, "$c");
}

// ============================================================================
// DEFINITION
// ============================================================================

#[test]
fn test_definition_in_used_module() {
    let host = workspace(&[
        ("file:///p/one.scss", "$primary: limegreen;"),
        ("file:///p/two.scss", "@use \"./one\";\n.a { color: one.$primary; }"),
    ]);
    let result = host
        .analysis()
        .goto_definition("file:///p/two.scss", position(&host, "file:///p/two.scss", "$primary", 1))
        .unwrap();
    let GotoTarget::Declaration(location) = result.target else {
        panic!("expected a declaration");
    };
    assert_eq!(&*location.uri, "file:///p/one.scss");
    assert_eq!(u32::from(location.range.start()), 0);
    assert_eq!(u32::from(location.range.end()), 8);
}

#[test]
fn test_used_modules_are_not_reexported() {
    let host = workspace_with(
        &[
            ("file:///p/c.scss", "$deep: 1;"),
            ("file:///p/b.scss", "@use \"c\";\n$own: 2;"),
            ("file:///p/a.scss", "@use \"b\";\n.x { y: b.$deep; z: b.$own; }"),
        ],
        use_only(),
    );
    assert_eq!(definition(&host, "file:///p/a.scss", "$deep"), None);
    assert_eq!(
        definition(&host, "file:///p/a.scss", "$own"),
        Some(("file:///p/b.scss".to_string(), "$own".to_string()))
    );
    assert_eq!(
        labels(&host, "file:///p/d.scss", "@use \"b\";\n.x { y: b.|"),
        vec!["$own"]
    );
}

#[test]
fn test_forward_prefix_resolves_and_renames() {
    let files = [
        ("file:///p/c.scss", "$foo: 1;"),
        ("file:///p/b.scss", "@forward \"c\" as c-*;"),
        ("file:///p/a.scss", "@use \"b\";\n.x { y: b.$c-foo; }"),
    ];
    let host = workspace(&files);
    assert_eq!(
        definition(&host, "file:///p/a.scss", "$c-foo"),
        Some(("file:///p/c.scss".to_string(), "$foo".to_string()))
    );

    let at = position(&host, "file:///p/a.scss", "$c-foo", 3);
    let change = host.analysis().rename("file:///p/a.scss", at, "bar").unwrap();
    assert_eq!(change.file_count(), 2);
    assert_eq!(apply(files[0].1, change.edits_for("file:///p/c.scss")), "$bar: 1;");
    assert_eq!(
        apply(files[2].1, change.edits_for("file:///p/a.scss")),
        "@use \"b\";\n.x { y: b.$c-bar; }"
    );
}

#[test]
fn test_rename_from_forwarded_name() {
    let files = [
        ("file:///p/one.scss", "$day: \"monday\";"),
        ("file:///p/dev.scss", "@forward \"one\" as ki-*;"),
        ("file:///p/helen.scss", "@use \"dev\";\n.a { content: dev.$ki-day; }"),
    ];
    let host = workspace(&files);
    let at = position(&host, "file:///p/helen.scss", "$ki-day", 1);

    let prepared = host.analysis().prepare_rename("file:///p/helen.scss", at).unwrap();
    assert_eq!(prepared.placeholder, "day");

    let change = host.analysis().rename("file:///p/helen.scss", at, "gato").unwrap();
    let files_touched: Vec<&str> = change.edits.keys().map(|uri| &**uri).collect();
    assert_eq!(files_touched.len(), 2);
    assert!(files_touched.contains(&"file:///p/one.scss"));
    assert!(files_touched.contains(&"file:///p/helen.scss"));
    assert_eq!(
        apply(files[0].1, change.edits_for("file:///p/one.scss")),
        "$gato: \"monday\";"
    );
    assert_eq!(
        apply(files[2].1, change.edits_for("file:///p/helen.scss")),
        "@use \"dev\";\n.a { content: dev.$ki-gato; }"
    );
}

#[test]
fn test_declarations_after_block_comments_resolve() {
    let host = workspace(&[
        ("file:///p/one.scss", "/* Brand colors */\n$primary: limegreen;\n@mixin m { a: b; }"),
        ("file:///p/two.scss", "@use \"one\";\n.a { color: one.$primary; }"),
    ]);
    assert_eq!(
        definition(&host, "file:///p/two.scss", "$primary"),
        Some(("file:///p/one.scss".to_string(), "$primary".to_string()))
    );
    assert!(host.analysis().diagnostics("file:///p/one.scss").is_empty());
}

#[test]
fn test_symlinked_workspace_keeps_editor_copies() {
    let fs = MemoryFileSystem::with_files([
        ("file:///real/one.scss", "$primary: limegreen;"),
        ("file:///real/two.scss", "@use \"one\";\n.a { color: one.$primary; }"),
    ]);
    fs.symlink("file:///p", "file:///real");
    let host = AnalysisHost::with_settings(Arc::new(fs), vec!["file:///p".into()], Settings::default());

    // unsaved edits in both documents
    let one = "$primary: limegreen;\n$brand: red;";
    let two = "@use \"one\";\n.a { color: one.$primary; border-color: one.$brand; }";
    host.open_document("file:///p/one.scss", Some("scss"), 2, one);
    host.open_document("file:///p/two.scss", Some("scss"), 2, two);

    assert_eq!(
        definition(&host, "file:///p/two.scss", "$brand"),
        Some(("file:///p/one.scss".to_string(), "$brand".to_string()))
    );

    let at = position(&host, "file:///p/two.scss", "$primary", 1);
    let change = host.analysis().rename("file:///p/two.scss", at, "accent").unwrap();
    let mut touched: Vec<&str> = change.edits.keys().map(|uri| &**uri).collect();
    touched.sort();
    assert_eq!(touched, vec!["file:///p/one.scss", "file:///p/two.scss"]);
    assert_eq!(
        apply(one, change.edits_for("file:///p/one.scss")),
        "$accent: limegreen;\n$brand: red;"
    );
    assert_eq!(
        apply(two, change.edits_for("file:///p/two.scss")),
        "@use \"one\";\n.a { color: one.$accent; border-color: one.$brand; }"
    );
}

#[test]
fn test_hidden_members_do_not_propagate() {
    let host = workspace_with(
        &[
            ("file:///p/c.scss", "$secret: 1;\n$open: 2;"),
            ("file:///p/b.scss", "@forward \"c\" hide $secret;"),
            ("file:///p/a.scss", "@use \"b\";\n.x { y: b.$secret; z: b.$open; }"),
        ],
        use_only(),
    );
    assert_eq!(definition(&host, "file:///p/a.scss", "$secret"), None);
    assert_eq!(
        definition(&host, "file:///p/a.scss", "$open"),
        Some(("file:///p/c.scss".to_string(), "$open".to_string()))
    );
    assert_eq!(
        labels(&host, "file:///p/d.scss", "@use \"b\";\n.x { y: b.|"),
        vec!["$open"]
    );
}

#[test]
fn test_wildcard_uses_resolve_in_declaration_order() {
    let host = workspace_with(
        &[
            ("file:///p/b.scss", "$x: b;\n$only-b: 1;"),
            ("file:///p/c.scss", "$x: c;\n$only-c: 2;"),
            (
                "file:///p/a.scss",
                "@use \"b\" as *;\n@use \"c\" as *;\n.k { v: $x; w: $only-c; }",
            ),
        ],
        use_only(),
    );
    assert_eq!(
        definition(&host, "file:///p/a.scss", "$x;"),
        Some(("file:///p/b.scss".to_string(), "$x".to_string()))
    );
    assert_eq!(
        definition(&host, "file:///p/a.scss", "$only-c"),
        Some(("file:///p/c.scss".to_string(), "$only-c".to_string()))
    );

    let mut offered = labels(
        &host,
        "file:///p/d.scss",
        "@use \"b\" as *;\n@use \"c\" as *;\n.k { v: $o|",
    );
    offered.sort();
    assert_eq!(offered, vec!["$only-b", "$only-c", "$x"]);
}

#[test]
fn test_cyclic_forwards_terminate() {
    let host = workspace(&[
        ("file:///p/a.scss", "@forward \"b\";\n$a: 1;"),
        ("file:///p/b.scss", "@forward \"a\";\n$b: 2;"),
        ("file:///p/main.scss", "@use \"a\";\n.x { p: a.$b; q: a.$a; }"),
    ]);
    assert_eq!(
        definition(&host, "file:///p/main.scss", "$b;"),
        Some(("file:///p/b.scss".to_string(), "$b".to_string()))
    );
    assert_eq!(
        definition(&host, "file:///p/main.scss", "$a;"),
        Some(("file:///p/a.scss".to_string(), "$a".to_string()))
    );

    let analysis = host.analysis();
    let graph = analysis.graph();
    let main = analysis.document("file:///p/main.scss").unwrap();
    let visited = graph.traverse(&main, TraversalOptions::exhaustive(), |module, _| vec![module.uri()]);
    let visited: Vec<&str> = visited.iter().map(|uri| &**uri).collect();
    assert_eq!(visited, vec!["file:///p/main.scss", "file:///p/a.scss", "file:///p/b.scss"]);
}

#[test]
fn test_lazy_traversal_stops_at_first_result() {
    let host = workspace(&[
        ("file:///p/b.scss", "$x: 1;"),
        ("file:///p/c.scss", "$x: 2;"),
        ("file:///p/a.scss", "@use \"b\";\n@use \"c\";"),
    ]);
    let analysis = host.analysis();
    let graph = analysis.graph();
    let a = analysis.document("file:///p/a.scss").unwrap();
    let mut calls = 0;
    let found = graph.traverse(&a, TraversalOptions::lazy(), |module, _| {
        calls += 1;
        match module {
            Module::Document(entry) if !entry.symbols().symbols.is_empty() => vec![entry.uri().clone()],
            _ => Vec::new(),
        }
    });
    assert_eq!(found.len(), 1);
    assert_eq!(&*found[0], "file:///p/b.scss");
    assert_eq!(calls, 2);
}

#[test]
fn test_flat_fallback_for_imports() {
    let host = workspace(&[
        ("file:///p/_vars.scss", "$brand: navy;"),
        ("file:///p/main.scss", "@import \"vars\";\n.a { color: $brand; }"),
    ]);
    assert_eq!(
        definition(&host, "file:///p/main.scss", "$brand"),
        Some(("file:///p/_vars.scss".to_string(), "$brand".to_string()))
    );
}

#[test]
fn test_indented_document_uses_scss_module() {
    let host = workspace(&[
        ("file:///p/one.scss", "$primary: red;"),
        (
            "file:///p/app.sass",
            "@use \"one\"\n=theme($c)\n  color: $c\n.a\n  +theme(one.$primary)\n",
        ),
    ]);
    assert_eq!(
        definition(&host, "file:///p/app.sass", "$primary"),
        Some(("file:///p/one.scss".to_string(), "$primary".to_string()))
    );
    assert_eq!(
        definition(&host, "file:///p/app.sass", "theme(one"),
        Some(("file:///p/app.sass".to_string(), "theme".to_string()))
    );
}

// ============================================================================
// REFERENCES & DIAGNOSTICS
// ============================================================================

#[test]
fn test_references_across_forward_chain() {
    let host = workspace(&[
        ("file:///p/_lib.scss", "@mixin card { a: b; }"),
        ("file:///p/index.scss", "@forward \"lib\";"),
        ("file:///p/app.scss", "@use \"index\";\n.a { @include index.card; }"),
        ("file:///p/other.scss", "@mixin card { c: d; }\n.b { @include card; }"),
    ]);
    let at = position(&host, "file:///p/app.scss", "card;", 0);
    let result = host.analysis().find_references("file:///p/app.scss", at, true).unwrap();
    let mut found: Vec<(String, bool)> = result
        .references
        .iter()
        .map(|r| (r.location.uri.to_string(), r.is_declaration))
        .collect();
    found.sort();
    assert_eq!(
        found,
        vec![
            ("file:///p/_lib.scss".to_string(), true),
            ("file:///p/app.scss".to_string(), false),
        ]
    );
}

#[test]
fn test_deprecated_forwarded_member() {
    let host = workspace(&[
        ("file:///p/_tokens.scss", "/// @deprecated Use $space-md\n$gap: 8px;\n$space-md: 8px;"),
        ("file:///p/index.scss", "@forward \"tokens\" as t-*;"),
        ("file:///p/app.scss", "@use \"index\" as ds;\n.a { margin: ds.$t-gap; padding: ds.$t-space-md; }"),
    ]);
    let diagnostics = host.analysis().diagnostics("file:///p/app.scss");
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(&*diagnostics[0].message, "Use $space-md");
    let entry = host.analysis().document("file:///p/app.scss").unwrap();
    assert_eq!(entry.document().slice(diagnostics[0].range), "$t-gap");
}

// ============================================================================
// DOCUMENT LINKS
// ============================================================================

#[test]
fn test_unresolved_import_links_to_best_guess() {
    let host = workspace(&[]);
    host.open_document(
        "file:///p/main.scss",
        Some("scss"),
        1,
        "@import \"nonexistent\";\n@use \"sass:math\";\n@import url(\"data:text/css,a\");",
    );
    let links = host.analysis().document_links("file:///p/main.scss");
    assert_eq!(links.len(), 1);
    assert_eq!(&*links[0].target, "file:///p/nonexistent");
    assert!(!links[0].resolved);
}

#[rstest]
#[case("./one", "file:///p/_one.scss")]
#[case("one", "file:///p/_one.scss")]
#[case("_one.scss", "file:///p/_one.scss")]
#[case("theme", "file:///p/theme/_index.scss")]
#[case("lib/two", "file:///p/lib/two.sass")]
fn test_link_target_variations(#[case] raw: &str, #[case] expected: &str) {
    let host = workspace(&[
        ("file:///p/_one.scss", "$a: 1;"),
        ("file:///p/theme/_index.scss", "$b: 2;"),
        ("file:///p/lib/two.sass", "$c: 3\n"),
    ]);
    host.open_document("file:///p/main.scss", None, 1, format!("@use \"{raw}\";"));
    let links = host.analysis().document_links("file:///p/main.scss");
    assert_eq!(links.len(), 1);
    assert_eq!(&*links[0].target, expected);
    assert!(links[0].resolved);
}

//! Diagnostics about the analyzed source.
//!
//! Three checks run over a document: syntax errors from the parser,
//! at-rules that neither CSS nor Sass knows, and references to
//! declarations marked `@deprecated`. Failures of the engine itself never
//! become diagnostics.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::base::{TextRange, Uri};
use crate::parser::{AstNode, AtRule, SyntaxKind, SyntaxNode};
use crate::project::{LintLevel, LintSettings};

use super::cache::CacheEntry;
use super::definition::{Target, resolve_occurrence};
use super::graph::ModuleGraph;
use super::symbols::{Occurrence, OccurrenceKind};

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl Severity {
    /// Convert to LSP severity number.
    pub fn to_lsp(&self) -> u32 {
        match self {
            Severity::Error => 1,
            Severity::Warning => 2,
            Severity::Info => 3,
            Severity::Hint => 4,
        }
    }
}

/// Extra rendering hints for a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiagnosticTag {
    Unnecessary,
    Deprecated,
}

impl DiagnosticTag {
    pub fn to_lsp(&self) -> u32 {
        match self {
            DiagnosticTag::Unnecessary => 1,
            DiagnosticTag::Deprecated => 2,
        }
    }
}

/// A diagnostic message with location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub range: TextRange,
    pub severity: Severity,
    /// Error/warning code (e.g., "E0001").
    pub code: Option<Arc<str>>,
    pub message: Arc<str>,
    pub tags: Vec<DiagnosticTag>,
    pub related: Vec<RelatedInfo>,
}

/// Related information for a diagnostic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelatedInfo {
    pub uri: Uri,
    pub range: TextRange,
    pub message: Arc<str>,
}

impl Diagnostic {
    pub fn new(severity: Severity, range: TextRange, message: impl Into<Arc<str>>) -> Self {
        Self {
            range,
            severity,
            code: None,
            message: message.into(),
            tags: Vec::new(),
            related: Vec::new(),
        }
    }

    /// Create a new error diagnostic.
    pub fn error(range: TextRange, message: impl Into<Arc<str>>) -> Self {
        Self::new(Severity::Error, range, message)
    }

    /// Create a new warning diagnostic.
    pub fn warning(range: TextRange, message: impl Into<Arc<str>>) -> Self {
        Self::new(Severity::Warning, range, message)
    }

    pub fn hint(range: TextRange, message: impl Into<Arc<str>>) -> Self {
        Self::new(Severity::Hint, range, message)
    }

    /// Set the error code.
    pub fn with_code(mut self, code: impl Into<Arc<str>>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_tag(mut self, tag: DiagnosticTag) -> Self {
        self.tags.push(tag);
        self
    }

    /// Add related information.
    pub fn with_related(mut self, info: RelatedInfo) -> Self {
        self.related.push(info);
        self
    }
}

// ============================================================================
// DIAGNOSTIC CODES
// ============================================================================

/// Diagnostic codes.
pub mod codes {
    /// The parser could not make sense of the input.
    pub const SYNTAX_ERROR: &str = "E0001";

    /// At-rule unknown to CSS and Sass.
    pub const UNKNOWN_AT_RULE: &str = "W0001";
    /// Deprecated usage.
    pub const DEPRECATED: &str = "W0002";
}

// ============================================================================
// DIAGNOSTIC COLLECTOR
// ============================================================================

/// Collects diagnostics for one document.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn syntax_error(&mut self, range: TextRange, message: &str) {
        self.add(Diagnostic::error(range, message).with_code(codes::SYNTAX_ERROR));
    }

    pub fn unknown_at_rule(&mut self, range: TextRange, keyword: &str, severity: Severity) {
        self.add(
            Diagnostic::new(severity, range, format!("Unknown at rule {keyword}"))
                .with_code(codes::UNKNOWN_AT_RULE),
        );
    }

    /// A reference to a deprecated declaration. An empty `reason` gets the
    /// generated message.
    pub fn deprecated(&mut self, occurrence: &Occurrence, reason: &str, declared_at: Option<RelatedInfo>) {
        let message = if reason.is_empty() {
            format!("{} is deprecated", occurrence.name)
        } else {
            reason.to_string()
        };
        let mut diag = Diagnostic::hint(occurrence.name_range, message)
            .with_code(codes::DEPRECATED)
            .with_tag(DiagnosticTag::Deprecated);
        if let Some(info) = declared_at {
            diag = diag.with_related(info);
        }
        self.add(diag);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Error).count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Warning).count()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }

    /// Take all diagnostics in source order, leaving the collector empty.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        let mut diagnostics = std::mem::take(&mut self.diagnostics);
        diagnostics.sort_by_key(|d| (d.range.start(), d.range.end()));
        diagnostics
    }
}

// ============================================================================
// CHECKS
// ============================================================================

/// At-rules known to CSS or Sass, without the `@`.
const KNOWN_AT_RULES: &[&str] = &[
    // Sass
    "at-root", "content", "debug", "each", "else", "error", "extend", "for", "forward", "function",
    "if", "import", "include", "mixin", "return", "use", "warn", "while",
    // CSS
    "charset", "container", "counter-style", "document", "font-face", "font-feature-values",
    "font-palette-values", "keyframes", "layer", "media", "namespace", "page", "position-try",
    "property", "scope", "starting-style", "supports", "view-transition", "viewport",
];

/// Whether an at-keyword (with `@`) is known. Vendor prefixes are ignored.
pub fn is_known_at_rule(keyword: &str) -> bool {
    let name = keyword.trim_start_matches('@').to_ascii_lowercase();
    let name = match name.strip_prefix('-') {
        Some(rest) => rest.split_once('-').map_or(rest, |(_, n)| n).to_string(),
        None => name,
    };
    KNOWN_AT_RULES.contains(&name.as_str())
}

/// Options of [`SemanticChecker`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CheckOptions {
    pub lint: LintSettings,
    /// Also report declarations that are themselves deprecated.
    pub include_declarations: bool,
}

/// Runs the checks of one document.
pub struct SemanticChecker<'a> {
    graph: ModuleGraph<'a>,
    options: &'a CheckOptions,
    collector: DiagnosticCollector,
}

impl<'a> SemanticChecker<'a> {
    pub fn new(graph: ModuleGraph<'a>, options: &'a CheckOptions) -> Self {
        Self {
            graph,
            options,
            collector: DiagnosticCollector::new(),
        }
    }

    pub fn check_file(&mut self, entry: &Arc<CacheEntry>) {
        for error in entry.errors() {
            self.collector.syntax_error(error.range, &error.message);
        }
        self.check_at_rules(&entry.syntax());
        self.check_deprecations(entry);
    }

    fn check_at_rules(&mut self, root: &SyntaxNode) {
        let severity = match self.options.lint.unknown_at_rules {
            LintLevel::Ignore => return,
            LintLevel::Warning => Severity::Warning,
            LintLevel::Error => Severity::Error,
        };
        for node in root.descendants().filter(|n| n.kind() == SyntaxKind::AT_RULE) {
            let Some(keyword) = AtRule::cast(node).and_then(|r| r.keyword()) else {
                continue;
            };
            if !is_known_at_rule(keyword.text()) {
                self.collector
                    .unknown_at_rule(keyword.text_range(), keyword.text(), severity);
            }
        }
    }

    /// Resolve every reference and flag those whose declaration carries
    /// `@deprecated`. Module-level lookups are memoized per name.
    fn check_deprecations(&mut self, entry: &Arc<CacheEntry>) {
        let symbols = entry.symbols();
        let mut memo: FxHashMap<(OccurrenceKind, Option<SmolStr>, SmolStr), Option<Target>> =
            FxHashMap::default();

        for occurrence in &symbols.occurrences {
            if occurrence.is_declaration && !self.options.include_declarations {
                continue;
            }
            let memoizable = occurrence.visibility_of.is_none()
                && !occurrence.is_declaration
                && (occurrence.kind != OccurrenceKind::Variable
                    || occurrence.namespace.is_some()
                    || symbols
                        .local_variable_at(&occurrence.name, occurrence.name_range.start())
                        .is_none());

            let target = if memoizable {
                let key = (occurrence.kind, occurrence.namespace.clone(), occurrence.name.clone());
                memo.entry(key)
                    .or_insert_with(|| resolve_occurrence(&self.graph, entry, occurrence))
                    .clone()
            } else {
                resolve_occurrence(&self.graph, entry, occurrence)
            };

            let Some(Target::Declaration(def)) = target else {
                continue;
            };
            if let Some(reason) = def.symbol.deprecation() {
                let related = RelatedInfo {
                    uri: def.uri.clone(),
                    range: def.symbol.selection_range,
                    message: Arc::from(format!("{} is declared here", def.symbol.name)),
                };
                self.collector.deprecated(occurrence, reason, Some(related));
            }
        }
    }

    pub fn finish(mut self) -> Vec<Diagnostic> {
        self.collector.take()
    }
}

/// Check a document and return its diagnostics in source order.
pub fn check_file(graph: ModuleGraph<'_>, entry: &Arc<CacheEntry>, options: &CheckOptions) -> Vec<Diagnostic> {
    let mut checker = SemanticChecker::new(graph, options);
    checker.check_file(entry);
    checker.finish()
}

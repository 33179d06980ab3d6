//! Document Symbol Extractor.
//!
//! Walks a syntax tree once and produces:
//! - module-level declarations (variables, mixins, functions, placeholders)
//!   in source order, unique per kind and name;
//! - every identifier occurrence, declaration or reference, with its
//!   namespace and name-only range;
//! - local scopes (blocks, parameter lists, loop bindings) for resolving
//!   variables before any cross-file lookup.

use rowan::NodeOrToken;
use smol_str::SmolStr;

use crate::base::{TextRange, TextSize};
use crate::parser::{
    AstNode, AtRule, CallableDecl, ExtendRule, ForwardRule, FunctionCall, FunctionDecl,
    IncludeRule, MixinDecl, ParamList, Rule, SyntaxKind, SyntaxNode, VariableDecl, VariableRef,
};

// ============================================================================
// SYMBOL TYPES
// ============================================================================

/// The kind of a declared symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SymbolKind {
    Variable,
    Mixin,
    Function,
    Placeholder,
}

impl SymbolKind {
    /// The sigil that prefixes names of this kind.
    pub fn sigil(self) -> &'static str {
        match self {
            SymbolKind::Variable => "$",
            SymbolKind::Placeholder => "%",
            SymbolKind::Mixin | SymbolKind::Function => "",
        }
    }

    pub fn display(self) -> &'static str {
        match self {
            SymbolKind::Variable => "variable",
            SymbolKind::Mixin => "mixin",
            SymbolKind::Function => "function",
            SymbolKind::Placeholder => "placeholder",
        }
    }
}

/// Strip a `$` or `%` sigil.
pub fn strip_sigil(name: &str) -> &str {
    name.strip_prefix(['$', '%']).unwrap_or(name)
}

/// Module members whose name starts with `-` or `_` are private.
pub fn is_private_name(name: &str) -> bool {
    strip_sigil(name).starts_with(['-', '_'])
}

/// A documented `@param`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DocParam {
    pub name: String,
    pub ty: Option<String>,
    pub description: String,
}

/// SassDoc attached to a declaration through `///` comments.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SassDoc {
    pub description: String,
    /// `Some("")` for a bare `@deprecated`.
    pub deprecated: Option<String>,
    pub params: Vec<DocParam>,
    pub returns: Option<String>,
    pub ty: Option<String>,
    pub access_private: bool,
    pub examples: Vec<String>,
}

impl SassDoc {
    /// Parse the text of consecutive `///` lines.
    pub fn parse<'a>(lines: impl IntoIterator<Item = &'a str>) -> Self {
        let mut doc = SassDoc::default();
        let mut description: Vec<&str> = Vec::new();
        let mut in_example = false;

        for raw in lines {
            let line = raw.trim_start_matches('/');
            let line = line.strip_prefix(' ').unwrap_or(line);

            let Some(annotation) = line.trim_start().strip_prefix('@') else {
                if in_example {
                    if let Some(example) = doc.examples.last_mut() {
                        if !example.is_empty() {
                            example.push('\n');
                        }
                        example.push_str(line);
                    }
                } else {
                    description.push(line.trim_end());
                }
                continue;
            };

            in_example = false;
            let (tag, rest) = annotation
                .split_once(char::is_whitespace)
                .unwrap_or((annotation, ""));
            let rest = rest.trim();
            match tag {
                "deprecated" => doc.deprecated = Some(rest.to_string()),
                "param" | "arg" | "argument" | "parameter" => doc.params.push(parse_param(rest)),
                "return" | "returns" => doc.returns = Some(rest.to_string()),
                "type" => doc.ty = Some(rest.to_string()),
                "access" => doc.access_private = rest.eq_ignore_ascii_case("private"),
                "example" => {
                    in_example = true;
                    doc.examples.push(String::new());
                }
                _ => {}
            }
        }

        doc.description = description.join("\n").trim().to_string();
        doc
    }
}

fn parse_param(text: &str) -> DocParam {
    let mut rest = text;
    let mut ty = None;
    if let Some(inner) = rest.strip_prefix('{') {
        if let Some((t, after)) = inner.split_once('}') {
            ty = Some(t.trim().to_string());
            rest = after.trim_start();
        }
    }
    let (name, after) = rest
        .split_once(char::is_whitespace)
        .unwrap_or((rest, ""));
    let description = after.trim().trim_start_matches('-').trim().to_string();
    DocParam {
        name: name.to_string(),
        ty,
        description,
    }
}

/// A declaration extracted from a syntax tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SassSymbol {
    /// Name with its sigil (`$primary`, `%button`, `theme`).
    pub name: SmolStr,
    pub kind: SymbolKind,
    /// The whole declaration.
    pub range: TextRange,
    /// Just the name, sigil included.
    pub selection_range: TextRange,
    /// Parameter signature of mixins and functions.
    pub detail: Option<String>,
    /// Raw value text of variables and parameter defaults.
    pub value: Option<String>,
    pub doc: Option<SassDoc>,
    /// Parameters and local variables.
    pub children: Vec<SassSymbol>,
}

impl SassSymbol {
    pub fn base_name(&self) -> &str {
        strip_sigil(&self.name)
    }

    pub fn is_private(&self) -> bool {
        is_private_name(&self.name) || self.doc.as_ref().is_some_and(|d| d.access_private)
    }

    pub fn deprecation(&self) -> Option<&str> {
        self.doc.as_ref()?.deprecated.as_deref()
    }
}

// ============================================================================
// OCCURRENCES
// ============================================================================

/// What an identifier occurrence can refer to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OccurrenceKind {
    Variable,
    Mixin,
    Function,
    Placeholder,
    /// An identifier in a `show`/`hide` list.
    MixinOrFunction,
}

impl OccurrenceKind {
    /// Symbol kinds to try, in order.
    pub fn symbol_kinds(self) -> &'static [SymbolKind] {
        match self {
            OccurrenceKind::Variable => &[SymbolKind::Variable],
            OccurrenceKind::Mixin => &[SymbolKind::Mixin],
            OccurrenceKind::Function => &[SymbolKind::Function],
            OccurrenceKind::Placeholder => &[SymbolKind::Placeholder],
            OccurrenceKind::MixinOrFunction => &[SymbolKind::Mixin, SymbolKind::Function],
        }
    }
}

impl From<SymbolKind> for OccurrenceKind {
    fn from(kind: SymbolKind) -> Self {
        match kind {
            SymbolKind::Variable => OccurrenceKind::Variable,
            SymbolKind::Mixin => OccurrenceKind::Mixin,
            SymbolKind::Function => OccurrenceKind::Function,
            SymbolKind::Placeholder => OccurrenceKind::Placeholder,
        }
    }
}

/// One identifier in the document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Occurrence {
    pub kind: OccurrenceKind,
    /// Name with its sigil.
    pub name: SmolStr,
    pub namespace: Option<SmolStr>,
    /// Namespace, dot and name.
    pub range: TextRange,
    /// Just the name, sigil included.
    pub name_range: TextRange,
    pub is_declaration: bool,
    /// Range of the `@forward` whose `show`/`hide` list holds this name.
    pub visibility_of: Option<TextRange>,
}

impl Occurrence {
    pub fn base_name(&self) -> &str {
        strip_sigil(&self.name)
    }
}

/// Variables visible inside a range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalScope {
    pub range: TextRange,
    pub variables: Vec<SassSymbol>,
}

/// Everything extracted from one document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileSymbols {
    pub symbols: Vec<SassSymbol>,
    pub occurrences: Vec<Occurrence>,
    pub scopes: Vec<LocalScope>,
}

impl FileSymbols {
    /// The module-level declaration of a kind and name (sigil included).
    pub fn find(&self, kind: SymbolKind, name: &str) -> Option<&SassSymbol> {
        self.symbols
            .iter()
            .find(|s| s.kind == kind && s.name == name)
    }

    /// The occurrence under `offset` (end inclusive, so a cursor right after
    /// a name still hits it).
    pub fn occurrence_at(&self, offset: TextSize) -> Option<&Occurrence> {
        self.occurrences
            .iter()
            .find(|o| o.name_range.contains_inclusive(offset))
            .or_else(|| {
                self.occurrences
                    .iter()
                    .find(|o| o.range.contains_inclusive(offset))
            })
    }

    /// The innermost local variable named `name` visible at `offset`.
    pub fn local_variable_at(&self, name: &str, offset: TextSize) -> Option<&SassSymbol> {
        self.scopes
            .iter()
            .filter(|scope| scope.range.contains_inclusive(offset))
            .filter_map(|scope| {
                scope
                    .variables
                    .iter()
                    .find(|v| v.name == name && v.selection_range.start() <= offset)
                    .map(|v| (scope.range.len(), v))
            })
            .min_by_key(|(len, _)| *len)
            .map(|(_, v)| v)
    }
}

// ============================================================================
// EXTRACTION
// ============================================================================

/// Extract symbols, occurrences and local scopes from a tree.
pub fn extract_symbols(root: &SyntaxNode) -> FileSymbols {
    let mut extractor = Extractor::default();
    extractor.visit(root);
    extractor.out
}

#[derive(Default)]
struct Extractor {
    out: FileSymbols,
    scope_stack: Vec<usize>,
}

impl Extractor {
    fn visit(&mut self, node: &SyntaxNode) {
        for child in node.children() {
            match child.kind() {
                SyntaxKind::VARIABLE_DECL => self.variable_decl(&child),
                SyntaxKind::MIXIN_DECL => {
                    if let Some(decl) = MixinDecl::cast(child.clone()) {
                        self.callable(&decl, SymbolKind::Mixin);
                    }
                }
                SyntaxKind::FUNCTION_DECL => {
                    if let Some(decl) = FunctionDecl::cast(child.clone()) {
                        self.callable(&decl, SymbolKind::Function);
                    }
                }
                SyntaxKind::RULE => self.rule(&child),
                SyntaxKind::BLOCK => self.scoped(&child, Vec::new()),
                SyntaxKind::VARIABLE_REF => self.variable_ref(&child),
                SyntaxKind::FUNCTION_CALL => self.function_call(&child),
                SyntaxKind::INCLUDE_RULE => self.include(&child),
                SyntaxKind::EXTEND_RULE => self.extend(&child),
                SyntaxKind::AT_RULE => self.at_rule(&child),
                SyntaxKind::FORWARD_RULE => self.forward(&child),
                _ => self.visit(&child),
            }
        }
    }

    /// Visit `node` inside a new local scope holding `variables`.
    fn scoped(&mut self, node: &SyntaxNode, variables: Vec<SassSymbol>) {
        for var in &variables {
            self.declare_occurrence(var, None);
        }
        self.out.scopes.push(LocalScope {
            range: node.text_range(),
            variables,
        });
        self.scope_stack.push(self.out.scopes.len() - 1);
        self.visit(node);
        self.scope_stack.pop();
    }

    fn push_symbol(&mut self, symbol: SassSymbol) -> Option<usize> {
        if self.out.find(symbol.kind, &symbol.name).is_some() {
            return None;
        }
        self.out.symbols.push(symbol);
        Some(self.out.symbols.len() - 1)
    }

    fn declare_occurrence(&mut self, symbol: &SassSymbol, namespace: Option<SmolStr>) {
        self.out.occurrences.push(Occurrence {
            kind: symbol.kind.into(),
            name: symbol.name.clone(),
            namespace,
            range: symbol.selection_range,
            name_range: symbol.selection_range,
            is_declaration: true,
            visibility_of: None,
        });
    }

    fn reference(
        &mut self,
        kind: OccurrenceKind,
        node: &SyntaxNode,
        name: &crate::parser::SyntaxToken,
        namespace: Option<&crate::parser::SyntaxToken>,
    ) {
        let range = match namespace {
            Some(ns) => TextRange::new(ns.text_range().start(), name.text_range().end()),
            None => name.text_range(),
        };
        debug_assert!(node.text_range().contains_range(range));
        self.out.occurrences.push(Occurrence {
            kind,
            name: SmolStr::new(name.text()),
            namespace: namespace.map(|ns| SmolStr::new(ns.text())),
            range,
            name_range: name.text_range(),
            is_declaration: false,
            visibility_of: None,
        });
    }

    fn variable_decl(&mut self, node: &SyntaxNode) {
        let Some(decl) = VariableDecl::cast(node.clone()) else {
            return;
        };
        let Some(name) = decl.name_token() else {
            return;
        };

        if let Some(ns) = decl.namespace().and_then(|ns| ns.name_token()) {
            // `ns.$var: value` assigns a member of another module
            self.reference(OccurrenceKind::Variable, node, &name, Some(&ns));
            self.visit(node);
            return;
        }

        let symbol = SassSymbol {
            name: SmolStr::new(name.text()),
            kind: SymbolKind::Variable,
            range: node.text_range(),
            selection_range: name.text_range(),
            detail: None,
            value: decl.value().map(|v| v.text_without_flags()),
            doc: doc_comment(node),
            children: Vec::new(),
        };
        self.declare_occurrence(&symbol, None);

        match self.scope_stack.last() {
            Some(&scope) if !decl.is_global() => self.out.scopes[scope].variables.push(symbol),
            _ => {
                self.push_symbol(symbol);
            }
        }
        self.visit(node);
    }

    fn callable<D: CallableDecl>(&mut self, decl: &D, kind: SymbolKind) {
        let node = decl.syntax();
        let Some(name) = decl.name_token() else {
            self.visit(node);
            return;
        };
        let params = decl.params().map(|p| parameters(&p)).unwrap_or_default();
        let detail = decl.params().map(|_| signature(&params));

        let symbol = SassSymbol {
            name: SmolStr::new(name.text()),
            kind,
            range: node.text_range(),
            selection_range: name.text_range(),
            detail,
            value: None,
            doc: doc_comment(node),
            children: Vec::new(),
        };
        self.declare_occurrence(&symbol, None);
        let index = self.push_symbol(symbol);

        let first_scope = self.out.scopes.len();
        self.scoped(node, params);

        if let Some(index) = index {
            let children = self.out.scopes[first_scope..]
                .iter()
                .flat_map(|s| s.variables.iter().cloned())
                .collect();
            self.out.symbols[index].children = children;
        }
    }

    fn rule(&mut self, node: &SyntaxNode) {
        let Some(rule) = Rule::cast(node.clone()) else {
            return;
        };
        if let Some(selector) = rule.selector() {
            let doc = doc_comment(node);
            for token in selector.placeholders() {
                let symbol = SassSymbol {
                    name: SmolStr::new(token.text()),
                    kind: SymbolKind::Placeholder,
                    range: node.text_range(),
                    selection_range: token.text_range(),
                    detail: None,
                    value: None,
                    doc: doc.clone(),
                    children: Vec::new(),
                };
                self.declare_occurrence(&symbol, None);
                self.push_symbol(symbol);
            }
        }
        self.visit(node);
    }

    fn variable_ref(&mut self, node: &SyntaxNode) {
        let Some(reference) = VariableRef::cast(node.clone()) else {
            return;
        };
        if let Some(name) = reference.name_token() {
            let ns = reference.namespace().and_then(|ns| ns.name_token());
            self.reference(OccurrenceKind::Variable, node, &name, ns.as_ref());
        }
    }

    fn function_call(&mut self, node: &SyntaxNode) {
        if let Some(call) = FunctionCall::cast(node.clone()) {
            if let Some(name) = call.name_token() {
                let ns = call.namespace().and_then(|ns| ns.name_token());
                self.reference(OccurrenceKind::Function, node, &name, ns.as_ref());
            }
        }
        self.visit(node);
    }

    fn include(&mut self, node: &SyntaxNode) {
        let Some(include) = IncludeRule::cast(node.clone()) else {
            return;
        };
        if let Some(name) = include.name_token() {
            let ns = include.namespace().and_then(|ns| ns.name_token());
            self.reference(OccurrenceKind::Mixin, node, &name, ns.as_ref());
        }
        match include.content_params() {
            Some(params) => self.scoped(node, parameters(&params)),
            None => self.visit(node),
        }
    }

    fn extend(&mut self, node: &SyntaxNode) {
        let Some(extend) = ExtendRule::cast(node.clone()) else {
            return;
        };
        for token in extend.placeholders() {
            self.reference(OccurrenceKind::Placeholder, node, &token, None);
        }
        self.visit(node);
    }

    fn at_rule(&mut self, node: &SyntaxNode) {
        let Some(rule) = AtRule::cast(node.clone()) else {
            return;
        };
        let keyword = rule
            .keyword()
            .map(|k| k.text().to_ascii_lowercase())
            .unwrap_or_default();
        if keyword == "@each" || keyword == "@for" {
            let bindings = rule
                .loop_bindings()
                .map(|token| SassSymbol {
                    name: SmolStr::new(token.text()),
                    kind: SymbolKind::Variable,
                    range: token.text_range(),
                    selection_range: token.text_range(),
                    detail: None,
                    value: None,
                    doc: None,
                    children: Vec::new(),
                })
                .collect();
            self.scoped(node, bindings);
        } else {
            self.visit(node);
        }
    }

    fn forward(&mut self, node: &SyntaxNode) {
        let Some(forward) = ForwardRule::cast(node.clone()) else {
            return;
        };
        if let Some(list) = forward.visibility() {
            for item in list.items() {
                let kind = if item.kind() == SyntaxKind::VARIABLE {
                    OccurrenceKind::Variable
                } else {
                    OccurrenceKind::MixinOrFunction
                };
                self.out.occurrences.push(Occurrence {
                    kind,
                    name: SmolStr::new(item.text()),
                    namespace: None,
                    range: item.text_range(),
                    name_range: item.text_range(),
                    is_declaration: false,
                    visibility_of: Some(node.text_range()),
                });
            }
        }
        self.visit(node);
    }
}

fn parameters(list: &ParamList) -> Vec<SassSymbol> {
    list.params()
        .filter_map(|param| {
            let name = param.name_token()?;
            Some(SassSymbol {
                name: SmolStr::new(name.text()),
                kind: SymbolKind::Variable,
                range: param.syntax().text_range(),
                selection_range: name.text_range(),
                detail: param.is_rest().then(|| format!("{}...", name.text())),
                value: param.default_value().map(|v| v.text_without_flags()),
                doc: None,
                children: Vec::new(),
            })
        })
        .collect()
}

/// `($a, $b: 1, $rest...)`
fn signature(params: &[SassSymbol]) -> String {
    let parts: Vec<String> = params
        .iter()
        .map(|p| match (&p.detail, &p.value) {
            (Some(rest), _) => rest.clone(),
            (None, Some(default)) => format!("{}: {}", p.name, default),
            (None, None) => p.name.to_string(),
        })
        .collect();
    format!("({})", parts.join(", "))
}

/// Collect consecutive `///` lines directly above `node`.
fn doc_comment(node: &SyntaxNode) -> Option<SassDoc> {
    let mut lines = Vec::new();
    let mut cursor = node.prev_sibling_or_token();
    while let Some(NodeOrToken::Token(token)) = cursor {
        match token.kind() {
            SyntaxKind::DOC_COMMENT => lines.push(token.text().to_string()),
            SyntaxKind::WHITESPACE if token.text().matches('\n').count() <= 1 => {}
            SyntaxKind::NEWLINE | SyntaxKind::INDENT | SyntaxKind::DEDENT => {}
            _ => break,
        }
        cursor = token.prev_sibling_or_token();
    }
    if lines.is_empty() {
        return None;
    }
    lines.reverse();
    Some(SassDoc::parse(lines.iter().map(String::as_str)))
}

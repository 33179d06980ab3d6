//! Typed AST wrappers over the untyped rowan CST.
//!
//! This module provides strongly-typed accessors for stylesheet syntax nodes.
//! Each struct wraps a SyntaxNode and provides methods to access children.

use super::syntax_kind::SyntaxKind;
use super::{SyntaxNode, SyntaxToken};
use rowan::{TextRange, TextSize};

/// Trait for AST nodes that wrap a SyntaxNode
pub trait AstNode: Sized {
    fn can_cast(kind: SyntaxKind) -> bool;
    fn cast(node: SyntaxNode) -> Option<Self>;
    fn syntax(&self) -> &SyntaxNode;
}

// ============================================================================
// Helper macros
// ============================================================================

macro_rules! ast_node {
    ($name:ident, $kind:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(SyntaxNode);

        impl AstNode for $name {
            fn can_cast(kind: SyntaxKind) -> bool {
                kind == SyntaxKind::$kind
            }

            fn cast(node: SyntaxNode) -> Option<Self> {
                if Self::can_cast(node.kind()) {
                    Some(Self(node))
                } else {
                    None
                }
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.0
            }
        }
    };
}

// ============================================================================
// Helpers
// ============================================================================

fn child<N: AstNode>(node: &SyntaxNode) -> Option<N> {
    node.children().find_map(N::cast)
}

fn token(node: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxToken> {
    node.children_with_tokens()
        .filter_map(|e| e.into_token())
        .find(|t| t.kind() == kind)
}

/// Strip matching quotes from a string token's text.
pub fn unquote(text: &str) -> &str {
    let bytes = text.as_bytes();
    if bytes.len() >= 2 && (bytes[0] == b'"' || bytes[0] == b'\'') && bytes[bytes.len() - 1] == bytes[0] {
        &text[1..text.len() - 1]
    } else {
        text
    }
}

/// Range of a string token's contents, without the quotes.
pub fn unquoted_range(token: &SyntaxToken) -> TextRange {
    let range = token.text_range();
    let inner = unquote(token.text());
    if inner.len() == token.text().len() {
        range
    } else {
        TextRange::at(range.start() + TextSize::from(1), TextSize::of(inner))
    }
}

// ============================================================================
// Root and blocks
// ============================================================================

ast_node!(SourceFile, SOURCE_FILE);

impl SourceFile {
    pub fn statements(&self) -> impl Iterator<Item = SyntaxNode> + '_ {
        self.0.children()
    }
}

ast_node!(Block, BLOCK);

impl Block {
    pub fn statements(&self) -> impl Iterator<Item = SyntaxNode> + '_ {
        self.0.children()
    }

    /// The opening `{` or INDENT token.
    pub fn open_token(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| t.kind().is_block_open())
    }
}

ast_node!(Rule, RULE);

impl Rule {
    pub fn selector(&self) -> Option<Selector> {
        child(&self.0)
    }

    pub fn block(&self) -> Option<Block> {
        child(&self.0)
    }
}

ast_node!(Selector, SELECTOR);

impl Selector {
    /// Placeholder selectors (`%name`) declared by this selector.
    pub fn placeholders(&self) -> impl Iterator<Item = SyntaxToken> + '_ {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .filter(|t| t.kind() == SyntaxKind::PLACEHOLDER)
    }
}

ast_node!(Declaration, DECLARATION);

impl Declaration {
    pub fn property(&self) -> Option<SyntaxNode> {
        self.0.children().find(|n| n.kind() == SyntaxKind::PROPERTY)
    }

    pub fn value(&self) -> Option<Value> {
        child(&self.0)
    }

    pub fn block(&self) -> Option<Block> {
        child(&self.0)
    }
}

ast_node!(Value, VALUE);

impl Value {
    /// The value text without trailing `!default` / `!global` flags.
    pub fn text_without_flags(&self) -> String {
        let mut out = String::new();
        for element in self.0.descendants_with_tokens() {
            if let Some(token) = element.into_token() {
                if token.kind() == SyntaxKind::BANG_WORD && is_assignment_flag(token.text()) {
                    continue;
                }
                out.push_str(token.text());
            }
        }
        out.trim().to_string()
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .any(|t| t.kind() == SyntaxKind::BANG_WORD && t.text().eq_ignore_ascii_case(flag))
    }
}

fn is_assignment_flag(text: &str) -> bool {
    text.eq_ignore_ascii_case("!default") || text.eq_ignore_ascii_case("!global")
}

// ============================================================================
// Variables
// ============================================================================

ast_node!(VariableDecl, VARIABLE_DECL);

impl VariableDecl {
    pub fn namespace(&self) -> Option<ModuleNamespace> {
        child(&self.0)
    }

    pub fn name_token(&self) -> Option<SyntaxToken> {
        token(&self.0, SyntaxKind::VARIABLE)
    }

    pub fn value(&self) -> Option<Value> {
        child(&self.0)
    }

    pub fn is_global(&self) -> bool {
        self.value().is_some_and(|v| v.has_flag("!global"))
    }

    pub fn is_default(&self) -> bool {
        self.value().is_some_and(|v| v.has_flag("!default"))
    }
}

ast_node!(VariableRef, VARIABLE_REF);

impl VariableRef {
    pub fn namespace(&self) -> Option<ModuleNamespace> {
        child(&self.0)
    }

    pub fn name_token(&self) -> Option<SyntaxToken> {
        token(&self.0, SyntaxKind::VARIABLE)
    }
}

ast_node!(ModuleNamespace, MODULE_NAMESPACE);

impl ModuleNamespace {
    pub fn name_token(&self) -> Option<SyntaxToken> {
        token(&self.0, SyntaxKind::IDENT)
    }
}

// ============================================================================
// Mixins and functions
// ============================================================================

ast_node!(MixinDecl, MIXIN_DECL);
ast_node!(FunctionDecl, FUNCTION_DECL);

/// Shared accessors of `@mixin` and `@function` declarations.
pub trait CallableDecl: AstNode {
    fn name_token(&self) -> Option<SyntaxToken> {
        token(self.syntax(), SyntaxKind::IDENT)
    }

    fn params(&self) -> Option<ParamList> {
        child(self.syntax())
    }

    fn body(&self) -> Option<Block> {
        child(self.syntax())
    }
}

impl CallableDecl for MixinDecl {}
impl CallableDecl for FunctionDecl {}

ast_node!(ParamList, PARAM_LIST);

impl ParamList {
    pub fn params(&self) -> impl Iterator<Item = Param> + '_ {
        self.0.children().filter_map(Param::cast)
    }
}

ast_node!(Param, PARAM);

impl Param {
    pub fn name_token(&self) -> Option<SyntaxToken> {
        token(&self.0, SyntaxKind::VARIABLE)
    }

    pub fn default_value(&self) -> Option<Value> {
        child(&self.0)
    }

    pub fn is_rest(&self) -> bool {
        token(&self.0, SyntaxKind::ELLIPSIS).is_some()
    }
}

ast_node!(FunctionCall, FUNCTION_CALL);

impl FunctionCall {
    pub fn namespace(&self) -> Option<ModuleNamespace> {
        child(&self.0)
    }

    pub fn name_token(&self) -> Option<SyntaxToken> {
        token(&self.0, SyntaxKind::IDENT)
    }

    pub fn args(&self) -> Option<ArgList> {
        child(&self.0)
    }
}

ast_node!(ArgList, ARG_LIST);

ast_node!(IncludeRule, INCLUDE_RULE);

impl IncludeRule {
    pub fn namespace(&self) -> Option<ModuleNamespace> {
        child(&self.0)
    }

    pub fn name_token(&self) -> Option<SyntaxToken> {
        token(&self.0, SyntaxKind::IDENT)
    }

    pub fn args(&self) -> Option<ArgList> {
        child(&self.0)
    }

    pub fn content_params(&self) -> Option<ParamList> {
        self.0
            .children()
            .find(|n| n.kind() == SyntaxKind::CONTENT_BLOCK_PARAMS)
            .and_then(|n| child(&n))
    }

    pub fn body(&self) -> Option<Block> {
        child(&self.0)
    }
}

ast_node!(ExtendRule, EXTEND_RULE);

impl ExtendRule {
    pub fn placeholders(&self) -> impl Iterator<Item = SyntaxToken> + '_ {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .filter(|t| t.kind() == SyntaxKind::PLACEHOLDER)
    }
}

// ============================================================================
// Module statements
// ============================================================================

ast_node!(ModuleUrl, MODULE_URL);

impl ModuleUrl {
    pub fn string_token(&self) -> Option<SyntaxToken> {
        token(&self.0, SyntaxKind::STRING)
    }

    /// The URL text without quotes.
    pub fn value(&self) -> Option<String> {
        self.string_token().map(|t| unquote(t.text()).to_string())
    }

    /// Range of the URL text without quotes.
    pub fn value_range(&self) -> Option<TextRange> {
        self.string_token().map(|t| unquoted_range(&t))
    }
}

ast_node!(UseRule, USE_RULE);

impl UseRule {
    pub fn url(&self) -> Option<ModuleUrl> {
        child(&self.0)
    }

    pub fn alias(&self) -> Option<UseAlias> {
        child(&self.0)
    }

    pub fn with_config(&self) -> Option<SyntaxNode> {
        self.0.children().find(|n| n.kind() == SyntaxKind::WITH_CONFIG)
    }
}

ast_node!(UseAlias, USE_ALIAS);

impl UseAlias {
    /// The namespace token: an identifier or `*`.
    pub fn name_token(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| t.kind() == SyntaxKind::STAR || (t.kind() == SyntaxKind::IDENT && t.text() != "as"))
    }
}

ast_node!(ForwardRule, FORWARD_RULE);

impl ForwardRule {
    pub fn url(&self) -> Option<ModuleUrl> {
        child(&self.0)
    }

    /// The `as <prefix>-*` prefix, without the `*`.
    pub fn prefix(&self) -> Option<String> {
        let prefix: ForwardPrefix = child(&self.0)?;
        prefix
            .0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .filter(|t| t.kind() == SyntaxKind::IDENT)
            .nth(1)
            .map(|t| t.text().to_string())
    }

    pub fn visibility(&self) -> Option<VisibilityList> {
        child(&self.0)
    }
}

ast_node!(ForwardPrefix, FORWARD_PREFIX);

/// `show` or `hide`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisibilityMode {
    Show,
    Hide,
}

ast_node!(VisibilityList, VISIBILITY_LIST);

impl VisibilityList {
    pub fn mode(&self) -> Option<VisibilityMode> {
        let keyword = self.0.first_token()?;
        match keyword.text().to_ascii_lowercase().as_str() {
            "show" => Some(VisibilityMode::Show),
            "hide" => Some(VisibilityMode::Hide),
            _ => None,
        }
    }

    /// Member names in the list (`$var` tokens or mixin/function identifiers).
    pub fn items(&self) -> impl Iterator<Item = SyntaxToken> + '_ {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .filter(|t| matches!(t.kind(), SyntaxKind::VARIABLE | SyntaxKind::IDENT))
            .skip(1)
    }
}

ast_node!(ImportRule, IMPORT_RULE);

impl ImportRule {
    pub fn targets(&self) -> impl Iterator<Item = ImportTarget> + '_ {
        self.0.children().filter_map(ImportTarget::cast)
    }

    /// Whether the import carries a media query or supports condition,
    /// which turns every target into a plain CSS import.
    pub fn has_media_query(&self) -> bool {
        let mut after_targets = false;
        for element in self.0.children_with_tokens() {
            match element {
                rowan::NodeOrToken::Node(n) if n.kind() == SyntaxKind::IMPORT_TARGET => {
                    after_targets = true;
                }
                rowan::NodeOrToken::Token(t)
                    if after_targets
                        && !t.kind().is_trivia()
                        && !matches!(
                            t.kind(),
                            SyntaxKind::COMMA | SyntaxKind::SEMICOLON | SyntaxKind::NEWLINE
                        ) =>
                {
                    return true;
                }
                _ => {}
            }
        }
        false
    }
}

ast_node!(ImportTarget, IMPORT_TARGET);

impl ImportTarget {
    pub fn string_token(&self) -> Option<SyntaxToken> {
        token(&self.0, SyntaxKind::STRING)
    }

    pub fn url_call(&self) -> Option<UrlCall> {
        child(&self.0)
    }

    /// The raw target text and its range, without quotes.
    pub fn target(&self) -> Option<(String, TextRange)> {
        if let Some(string) = self.string_token() {
            return Some((unquote(string.text()).to_string(), unquoted_range(&string)));
        }
        if let Some(url) = self.url_call() {
            return url.target();
        }
        // unquoted target of the indented syntax
        let text = self.0.text().to_string();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        let lead = text.len() - text.trim_start().len();
        let start = self.0.text_range().start() + TextSize::from(lead as u32);
        Some((trimmed.to_string(), TextRange::at(start, TextSize::of(trimmed))))
    }
}

ast_node!(UrlCall, URL_CALL);

impl UrlCall {
    /// The URL and its range, without `url(` `)` and quotes.
    pub fn target(&self) -> Option<(String, TextRange)> {
        if let Some(string) = token(&self.0, SyntaxKind::STRING) {
            return Some((unquote(string.text()).to_string(), unquoted_range(&string)));
        }
        let raw = token(&self.0, SyntaxKind::URL)?;
        let text = raw.text();
        let open = text.find('(')? + 1;
        let close = text.rfind(')')?;
        let inner = &text[open..close];
        let lead = inner.len() - inner.trim_start().len();
        let trimmed = inner.trim();
        let start = raw.text_range().start() + TextSize::from((open + lead) as u32);
        Some((trimmed.to_string(), TextRange::at(start, TextSize::of(trimmed))))
    }
}

// ============================================================================
// Other at-rules
// ============================================================================

ast_node!(AtRule, AT_RULE);

impl AtRule {
    pub fn keyword(&self) -> Option<SyntaxToken> {
        token(&self.0, SyntaxKind::AT_KEYWORD)
    }

    /// Variables bound by `@each` / `@for`.
    pub fn loop_bindings(&self) -> impl Iterator<Item = SyntaxToken> + '_ {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .filter(|t| t.kind() == SyntaxKind::VARIABLE)
    }

    pub fn block(&self) -> Option<Block> {
        child(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{Dialect, parse};

    fn first<N: AstNode>(input: &str) -> N {
        parse(input, Dialect::Scss)
            .syntax()
            .descendants()
            .find_map(N::cast)
            .unwrap()
    }

    #[test]
    fn test_use_rule_accessors() {
        let rule: UseRule = first("@use \"sass:math\" as m;");
        assert_eq!(rule.url().unwrap().value().as_deref(), Some("sass:math"));
        assert_eq!(rule.alias().unwrap().name_token().unwrap().text(), "m");

        let wildcard: UseRule = first("@use 'theme' as *;");
        assert_eq!(wildcard.alias().unwrap().name_token().unwrap().text(), "*");
    }

    #[test]
    fn test_module_url_value_range() {
        let rule: UseRule = first("@use \"./one\";");
        let range = rule.url().unwrap().value_range().unwrap();
        assert_eq!(range, TextRange::new(6.into(), 11.into()));
    }

    #[test]
    fn test_forward_rule_accessors() {
        let rule: ForwardRule = first("@forward \"one\" as ki-* show $day, paint;");
        assert_eq!(rule.prefix().as_deref(), Some("ki-"));
        let list = rule.visibility().unwrap();
        assert_eq!(list.mode(), Some(VisibilityMode::Show));
        let items: Vec<_> = list.items().map(|t| t.text().to_string()).collect();
        assert_eq!(items, vec!["$day", "paint"]);
    }

    #[test]
    fn test_variable_decl_flags() {
        let decl: VariableDecl = first("$a: 10px !default;");
        assert!(decl.is_default());
        assert!(!decl.is_global());
        assert_eq!(decl.value().unwrap().text_without_flags(), "10px");
    }

    #[test]
    fn test_mixin_params() {
        let mixin: MixinDecl = first("@mixin m($a, $b: 1, $rest...) {}");
        assert_eq!(mixin.name_token().unwrap().text(), "m");
        let params: Vec<_> = mixin.params().unwrap().params().collect();
        assert_eq!(params.len(), 3);
        assert_eq!(params[1].default_value().unwrap().text_without_flags(), "1");
        assert!(params[2].is_rest());
    }

    #[test]
    fn test_import_targets() {
        let rule: ImportRule = first("@import \"a\", url(b.css);");
        let targets: Vec<_> = rule.targets().filter_map(|t| t.target()).map(|t| t.0).collect();
        assert_eq!(targets, vec!["a", "b.css"]);
        assert!(!rule.has_media_query());

        let media: ImportRule = first("@import \"print.css\" print;");
        assert!(media.has_media_query());
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("\"a\""), "a");
        assert_eq!(unquote("'a'"), "a");
        assert_eq!(unquote("a"), "a");
        assert_eq!(unquote("\"a'"), "\"a'");
    }
}

//! Syntax kinds for the Rowan-based CST
//!
//! This enum defines all possible node and token kinds in the syntax tree.
//! Only the structure the module-graph engine consumes gets its own node
//! kind; everything else is kept as plain tokens inside a generic node.

/// All syntax kinds (tokens and nodes) for SCSS and indented Sass.
///
/// Tokens are leaf nodes (identifiers, variables, punctuation).
/// Nodes are composite (rules, declarations, module statements).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    WHITESPACE = 0,
    LINE_COMMENT,       // // comment
    DOC_COMMENT,        // /// SassDoc comment
    BLOCK_COMMENT,      // /* comment */

    // =========================================================================
    // LITERALS AND NAMES
    // =========================================================================
    IDENT,              // color, my-mixin, -moz-x
    VARIABLE,           // $primary
    PLACEHOLDER,        // %button-base
    AT_KEYWORD,         // @use
    STRING,             // "one" or 'one'
    NUMBER,             // 42, 1.5
    PERCENTAGE,         // 50%
    DIMENSION,          // 10px
    HASH,               // #fff, #main
    URL,                // url(unquoted/path.png)
    BANG_WORD,          // !default, !global, !important

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    L_BRACE,            // {
    R_BRACE,            // }
    L_PAREN,            // (
    R_PAREN,            // )
    L_BRACKET,          // [
    R_BRACKET,          // ]
    SEMICOLON,          // ;
    COLON,              // :
    COMMA,              // ,
    DOT,                // .
    ELLIPSIS,           // ...
    HASH_BRACE,         // #{
    STAR,               // *
    PLUS,               // +
    MINUS,              // -
    SLASH,              // /
    PERCENT,            // %
    EQ,                 // =
    EQ_EQ,              // ==
    BANG_EQ,            // !=
    BANG,               // !
    LT,                 // <
    GT,                 // >
    LT_EQ,              // <=
    GT_EQ,              // >=
    AMP,                // &
    TILDE,              // ~
    PIPE,               // |
    CARET,              // ^
    QUESTION,           // ?

    // =========================================================================
    // LAYOUT (zero-width, indented syntax only)
    // =========================================================================
    INDENT,
    DEDENT,
    NEWLINE,

    // =========================================================================
    // NODES
    // =========================================================================
    SOURCE_FILE,
    BLOCK,
    RULE,
    SELECTOR,
    DECLARATION,
    PROPERTY,
    VALUE,
    VARIABLE_DECL,
    VARIABLE_REF,
    MODULE_NAMESPACE,
    FUNCTION_CALL,
    ARG_LIST,
    MIXIN_DECL,
    FUNCTION_DECL,
    PARAM_LIST,
    PARAM,
    INCLUDE_RULE,
    CONTENT_BLOCK_PARAMS,
    EXTEND_RULE,
    USE_RULE,
    FORWARD_RULE,
    IMPORT_RULE,
    IMPORT_TARGET,
    MODULE_URL,
    USE_ALIAS,
    FORWARD_PREFIX,
    VISIBILITY_LIST,
    WITH_CONFIG,
    URL_CALL,
    AT_RULE,
    INTERPOLATION,

    // Error node / unknown token
    ERROR,

    // End of input; never stored in a tree
    EOF,

    #[doc(hidden)]
    __LAST,
}

impl SyntaxKind {
    /// Check if this is a trivia token (whitespace or comment)
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            Self::WHITESPACE | Self::LINE_COMMENT | Self::DOC_COMMENT | Self::BLOCK_COMMENT
        )
    }

    /// Check if this is a comment of any flavour
    pub fn is_comment(self) -> bool {
        matches!(
            self,
            Self::LINE_COMMENT | Self::DOC_COMMENT | Self::BLOCK_COMMENT
        )
    }

    /// Block openers: `{` or an indentation increase.
    pub fn is_block_open(self) -> bool {
        matches!(self, Self::L_BRACE | Self::INDENT)
    }

    /// Block closers: `}` or an indentation decrease.
    pub fn is_block_close(self) -> bool {
        matches!(self, Self::R_BRACE | Self::DEDENT)
    }

    /// Statement terminators: `;` or a line break in the indented syntax.
    pub fn is_terminator(self) -> bool {
        matches!(self, Self::SEMICOLON | Self::NEWLINE)
    }

    /// Check if this is a composite node kind
    pub fn is_node(self) -> bool {
        (self as u16) >= (Self::SOURCE_FILE as u16) && (self as u16) <= (Self::ERROR as u16)
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

impl From<rowan::SyntaxKind> for SyntaxKind {
    fn from(raw: rowan::SyntaxKind) -> Self {
        assert!(raw.0 < SyntaxKind::__LAST as u16);
        // Safety: we control all syntax kinds and check bounds above
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }
}

/// Language definition for Rowan
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SassLanguage {}

impl rowan::Language for SassLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        raw.into()
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type aliases for convenience
pub type SyntaxNode = rowan::SyntaxNode<SassLanguage>;
pub type SyntaxToken = rowan::SyntaxToken<SassLanguage>;
pub type SyntaxElement = rowan::SyntaxElement<SassLanguage>;

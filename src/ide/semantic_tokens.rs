//! Semantic tokens: syntax highlighting based on the extracted symbols.

use crate::hir::{CacheEntry, OccurrenceKind};
use crate::parser::SyntaxKind;

/// Token type for semantic highlighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    Namespace,
    Variable,
    Parameter,
    Function,
    Mixin,
    Placeholder,
}

impl TokenType {
    /// Legend in LSP index order.
    pub const LEGEND: &'static [&'static str] = &["namespace", "variable", "parameter", "function", "macro", "class"];

    /// Convert to LSP token type index.
    pub fn to_lsp_index(self) -> u32 {
        match self {
            TokenType::Namespace => 0,
            TokenType::Variable => 1,
            TokenType::Parameter => 2,
            TokenType::Function => 3,
            TokenType::Mixin => 4,
            TokenType::Placeholder => 5,
        }
    }
}

impl From<OccurrenceKind> for TokenType {
    fn from(kind: OccurrenceKind) -> Self {
        match kind {
            OccurrenceKind::Variable => TokenType::Variable,
            OccurrenceKind::Function | OccurrenceKind::MixinOrFunction => TokenType::Function,
            OccurrenceKind::Mixin => TokenType::Mixin,
            OccurrenceKind::Placeholder => TokenType::Placeholder,
        }
    }
}

/// Modifier bit: the token declares the symbol.
pub const MODIFIER_DECLARATION: u32 = 1;

/// A semantic token for syntax highlighting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticToken {
    /// Line number (0-indexed)
    pub line: u32,
    /// Column number (0-indexed, UTF-8 bytes)
    pub col: u32,
    /// Length of the token in bytes
    pub length: u32,
    /// The token type
    pub token_type: TokenType,
    pub modifiers: u32,
}

/// Get semantic tokens for a file, sorted by position.
///
/// Every identifier occurrence yields one token, plus one for its module
/// namespace. Declarations inside a parameter list are parameters.
pub fn semantic_tokens(entry: &CacheEntry) -> Vec<SemanticToken> {
    let symbols = entry.symbols();
    let document = entry.document();
    let root = entry.syntax();
    let is_param = |offset| {
        root.token_at_offset(offset)
            .right_biased()
            .and_then(|t| t.parent())
            .is_some_and(|p| p.kind() == SyntaxKind::PARAM)
    };

    let mut tokens = Vec::new();
    for occurrence in &symbols.occurrences {
        if let Some(namespace) = &occurrence.namespace {
            let start = document.position_at(occurrence.range.start());
            tokens.push(SemanticToken {
                line: start.line,
                col: start.col,
                length: namespace.len() as u32,
                token_type: TokenType::Namespace,
                modifiers: 0,
            });
        }

        let start = document.position_at(occurrence.name_range.start());
        let token_type = if occurrence.is_declaration && is_param(occurrence.name_range.start()) {
            TokenType::Parameter
        } else {
            occurrence.kind.into()
        };
        tokens.push(SemanticToken {
            line: start.line,
            col: start.col,
            length: u32::from(occurrence.name_range.len()),
            token_type,
            modifiers: if occurrence.is_declaration { MODIFIER_DECLARATION } else { 0 },
        });
    }

    // Sort tokens by position (line, then column)
    tokens.sort_by_key(|t| (t.line, t.col));
    tokens.dedup_by_key(|t| (t.line, t.col));
    tokens
}

//! Logos-based lexer for SCSS and indented Sass
//!
//! The brace syntax is tokenized directly. For the indented syntax a second
//! pass inserts zero-width `INDENT` / `DEDENT` / `NEWLINE` tokens so that a
//! single recursive-descent parser handles both surfaces.

use super::syntax_kind::SyntaxKind;
use logos::Logos;
use rowan::TextSize;

/// A token with its kind, text, and position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: SyntaxKind,
    pub text: &'a str,
    pub offset: TextSize,
}

impl Token<'_> {
    fn layout(kind: SyntaxKind, offset: TextSize) -> Self {
        Token {
            kind,
            text: "",
            offset,
        }
    }
}

/// Lexer wrapping the logos-generated tokenizer
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, LogosToken>,
    offset: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: LogosToken::lexer(input),
            offset: 0,
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let logos_token = self.inner.next()?;
        let kind = match logos_token {
            Ok(LogosToken::Ident) if self.inner.slice().eq_ignore_ascii_case("url") => {
                match raw_url_len(self.inner.remainder()) {
                    Some(len) => {
                        self.inner.bump(len);
                        SyntaxKind::URL
                    }
                    None => SyntaxKind::IDENT,
                }
            }
            Ok(t) => t.into(),
            Err(()) => SyntaxKind::ERROR,
        };
        let text = self.inner.slice();
        let offset = TextSize::new(self.offset);
        self.offset += text.len() as u32;

        Some(Token { kind, text, offset })
    }
}

/// Length of the `(...)` tail of an unquoted `url(...)`.
///
/// Quoted or dynamic arguments return `None`; those stay `IDENT` + `(` and
/// the parser builds the call around the string.
fn raw_url_len(rest: &str) -> Option<usize> {
    let inner = rest.strip_prefix('(')?;
    let end = inner.find(')')?;
    let arg = inner[..end].trim_matches([' ', '\t']);
    if arg.contains(['"', '\'', '$', '#']) || arg.contains(char::is_whitespace) {
        return None;
    }
    Some(end + 2)
}

/// Consume a block comment body up to `*/`, or to EOF when unterminated.
fn block_comment(lex: &mut logos::Lexer<'_, LogosToken>) -> bool {
    let len = match lex.remainder().find("*/") {
        Some(end) => end + 2,
        None => lex.remainder().len(),
    };
    lex.bump(len);
    true
}

/// Tokenize brace-syntax source into a Vec
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}

/// Tokenize indented-syntax source, inserting layout tokens.
///
/// Layout tokens are placed directly after the last significant token, so
/// comments on the following lines lead the next statement. Line breaks
/// inside parentheses/brackets, or after a trailing comma, do not end a
/// statement.
pub fn tokenize_indented(input: &str) -> Vec<Token<'_>> {
    let raw = tokenize(input);
    let mut out = Vec::with_capacity(raw.len() + raw.len() / 4);
    let mut pending: Vec<Token<'_>> = Vec::new();
    let mut indents: Vec<u32> = Vec::new();
    let mut depth = 0u32;
    let mut saw_line_break = false;
    let mut last_significant: Option<SyntaxKind> = None;
    let mut last_end = TextSize::new(0);

    for token in raw {
        if token.kind.is_trivia() {
            if token.kind == SyntaxKind::WHITESPACE && token.text.contains('\n') {
                saw_line_break = true;
            }
            pending.push(token);
            continue;
        }

        let column = column_of(input, token.offset);
        match indents.last().copied() {
            None => indents.push(column),
            Some(current) if saw_line_break && depth == 0 => {
                let continues = last_significant == Some(SyntaxKind::COMMA);
                if !continues {
                    if column > current {
                        out.push(Token::layout(SyntaxKind::INDENT, last_end));
                        indents.push(column);
                    } else {
                        out.push(Token::layout(SyntaxKind::NEWLINE, last_end));
                        while indents.len() > 1 && indents.last().is_some_and(|&c| c > column) {
                            indents.pop();
                            out.push(Token::layout(SyntaxKind::DEDENT, last_end));
                        }
                    }
                }
            }
            Some(_) => {}
        }
        saw_line_break = false;
        out.append(&mut pending);

        match token.kind {
            SyntaxKind::L_PAREN | SyntaxKind::L_BRACKET | SyntaxKind::HASH_BRACE => depth += 1,
            SyntaxKind::R_PAREN | SyntaxKind::R_BRACKET | SyntaxKind::R_BRACE => {
                depth = depth.saturating_sub(1)
            }
            _ => {}
        }
        last_significant = Some(token.kind);
        last_end = token.offset + TextSize::of(token.text);
        out.push(token);
    }

    if last_significant.is_some() {
        out.push(Token::layout(SyntaxKind::NEWLINE, last_end));
    }
    while indents.len() > 1 {
        indents.pop();
        out.push(Token::layout(SyntaxKind::DEDENT, last_end));
    }
    out.append(&mut pending);
    out
}

/// Column (in bytes) of `offset` within its line.
fn column_of(input: &str, offset: TextSize) -> u32 {
    let offset = u32::from(offset) as usize;
    let line_start = input[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
    (offset - line_start) as u32
}

/// Logos token enum - maps to SyntaxKind
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
pub enum LogosToken {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,

    #[regex(r"///[^\n]*", priority = 10)]
    DocComment,

    #[regex(r"//[^\n]*")]
    LineComment,

    #[token("/*", block_comment)]
    BlockComment,

    // =========================================================================
    // LITERALS AND NAMES
    // =========================================================================
    #[regex(r"-?-?([a-zA-Z_]|[^\x00-\x7F])([a-zA-Z0-9_-]|[^\x00-\x7F])*")]
    Ident,

    #[regex(r"\$-?([a-zA-Z_]|[^\x00-\x7F])([a-zA-Z0-9_-]|[^\x00-\x7F])*")]
    Variable,

    #[regex(r"%-?([a-zA-Z_]|[^\x00-\x7F])([a-zA-Z0-9_-]|[^\x00-\x7F])*")]
    Placeholder,

    #[regex(r"@-?[a-zA-Z_]([a-zA-Z0-9_-])*")]
    AtKeyword,

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    #[regex(r#"'([^'\\\n]|\\.)*'"#)]
    String,

    #[regex(r"[0-9]+(\.[0-9]+)?|\.[0-9]+")]
    Number,

    #[regex(r"([0-9]+(\.[0-9]+)?|\.[0-9]+)%")]
    Percentage,

    #[regex(r"([0-9]+(\.[0-9]+)?|\.[0-9]+)[a-zA-Z]+")]
    Dimension,

    #[regex(r"#[a-zA-Z0-9_-]+")]
    Hash,


    #[regex(r"![a-zA-Z][a-zA-Z-]*")]
    BangWord,

    // =========================================================================
    // MULTI-CHARACTER PUNCTUATION
    // =========================================================================
    #[token("#{")]
    HashBrace,
    #[token("...")]
    Ellipsis,
    #[token("==")]
    EqEq,
    #[token("!=")]
    BangEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,

    // =========================================================================
    // SINGLE-CHARACTER PUNCTUATION
    // =========================================================================
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("*")]
    Star,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("=")]
    Eq,
    #[token("!")]
    Bang,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("&")]
    Amp,
    #[token("~")]
    Tilde,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("?")]
    Question,
}

impl From<LogosToken> for SyntaxKind {
    fn from(token: LogosToken) -> Self {
        use LogosToken::*;
        match token {
            Whitespace => SyntaxKind::WHITESPACE,
            DocComment => SyntaxKind::DOC_COMMENT,
            LineComment => SyntaxKind::LINE_COMMENT,
            BlockComment => SyntaxKind::BLOCK_COMMENT,

            Ident => SyntaxKind::IDENT,
            Variable => SyntaxKind::VARIABLE,
            Placeholder => SyntaxKind::PLACEHOLDER,
            AtKeyword => SyntaxKind::AT_KEYWORD,
            String => SyntaxKind::STRING,
            Number => SyntaxKind::NUMBER,
            Percentage => SyntaxKind::PERCENTAGE,
            Dimension => SyntaxKind::DIMENSION,
            Hash => SyntaxKind::HASH,
            BangWord => SyntaxKind::BANG_WORD,

            HashBrace => SyntaxKind::HASH_BRACE,
            Ellipsis => SyntaxKind::ELLIPSIS,
            EqEq => SyntaxKind::EQ_EQ,
            BangEq => SyntaxKind::BANG_EQ,
            LtEq => SyntaxKind::LT_EQ,
            GtEq => SyntaxKind::GT_EQ,

            LBrace => SyntaxKind::L_BRACE,
            RBrace => SyntaxKind::R_BRACE,
            LParen => SyntaxKind::L_PAREN,
            RParen => SyntaxKind::R_PAREN,
            LBracket => SyntaxKind::L_BRACKET,
            RBracket => SyntaxKind::R_BRACKET,
            Semicolon => SyntaxKind::SEMICOLON,
            Colon => SyntaxKind::COLON,
            Comma => SyntaxKind::COMMA,
            Dot => SyntaxKind::DOT,
            Star => SyntaxKind::STAR,
            Plus => SyntaxKind::PLUS,
            Minus => SyntaxKind::MINUS,
            Slash => SyntaxKind::SLASH,
            Percent => SyntaxKind::PERCENT,
            Eq => SyntaxKind::EQ,
            Bang => SyntaxKind::BANG,
            Lt => SyntaxKind::LT,
            Gt => SyntaxKind::GT,
            Amp => SyntaxKind::AMP,
            Tilde => SyntaxKind::TILDE,
            Pipe => SyntaxKind::PIPE,
            Caret => SyntaxKind::CARET,
            Question => SyntaxKind::QUESTION,
        }
    }
}

//! Recursive descent parser for SCSS and indented Sass
//!
//! Builds a rowan GreenNode tree from tokens.
//! Supports error recovery and produces a lossless CST.

use super::dialect::{Dialect, extract_embedded};
use super::lexer::{Token, tokenize, tokenize_indented};
use super::syntax_kind::SyntaxKind;
use rowan::{GreenNode, GreenNodeBuilder, TextRange, TextSize};

/// Parse result containing the green tree and any errors
#[derive(Debug, Clone)]
pub struct Parse {
    pub green: GreenNode,
    pub errors: Vec<SyntaxError>,
}

impl Parse {
    /// Get the root syntax node
    pub fn syntax(&self) -> super::SyntaxNode {
        super::SyntaxNode::new_root(self.green.clone())
    }

    /// Check if parsing succeeded without errors
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A syntax error with location and message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub range: TextRange,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, range: TextRange) -> Self {
        Self {
            message: message.into(),
            range,
        }
    }
}

/// Parse stylesheet source in the given dialect into a CST.
///
/// Host documents are reduced to their embedded style blocks first; offsets
/// in the resulting tree are offsets into the host text.
pub fn parse(input: &str, dialect: Dialect) -> Parse {
    match dialect {
        Dialect::Sass => run(&tokenize_indented(input), true),
        Dialect::Scss | Dialect::Css => run(&tokenize(input), false),
        Dialect::Vue | Dialect::Svelte | Dialect::Astro | Dialect::Html => {
            let (text, inner) = extract_embedded(input);
            parse(&text, inner)
        }
    }
}

fn run(tokens: &[Token<'_>], indented: bool) -> Parse {
    let mut parser = Parser::new(tokens, indented);
    parser.parse_source_file();
    parser.finish()
}

const STATEMENT_END: &[SyntaxKind] = &[
    SyntaxKind::SEMICOLON,
    SyntaxKind::NEWLINE,
    SyntaxKind::R_BRACE,
    SyntaxKind::DEDENT,
    SyntaxKind::EOF,
];

const VALUE_END: &[SyntaxKind] = &[
    SyntaxKind::SEMICOLON,
    SyntaxKind::NEWLINE,
    SyntaxKind::R_BRACE,
    SyntaxKind::DEDENT,
    SyntaxKind::L_BRACE,
    SyntaxKind::INDENT,
    SyntaxKind::EOF,
];

const ARG_END: &[SyntaxKind] = &[
    SyntaxKind::COMMA,
    SyntaxKind::R_PAREN,
    SyntaxKind::SEMICOLON,
    SyntaxKind::L_BRACE,
    SyntaxKind::R_BRACE,
    SyntaxKind::EOF,
];

/// The parser state
struct Parser<'t, 'a> {
    tokens: &'t [Token<'a>],
    pos: usize,
    indented: bool,
    builder: GreenNodeBuilder<'static>,
    errors: Vec<SyntaxError>,
}

impl<'t, 'a> Parser<'t, 'a> {
    fn new(tokens: &'t [Token<'a>], indented: bool) -> Self {
        Self {
            tokens,
            pos: 0,
            indented,
            builder: GreenNodeBuilder::new(),
            errors: Vec::new(),
        }
    }

    fn finish(self) -> Parse {
        Parse {
            green: self.builder.finish(),
            errors: self.errors,
        }
    }

    // =========================================================================
    // Token inspection
    // =========================================================================

    /// Index of the next non-trivia token
    fn peek_index(&self) -> usize {
        let mut idx = self.pos;
        while idx < self.tokens.len() && self.tokens[idx].kind.is_trivia() {
            idx += 1;
        }
        idx
    }

    fn nth(&self, n: usize) -> SyntaxKind {
        // Look ahead, skipping trivia
        let mut idx = self.pos;
        let mut count = 0;
        while idx < self.tokens.len() {
            if !self.tokens[idx].kind.is_trivia() {
                if count == n {
                    return self.tokens[idx].kind;
                }
                count += 1;
            }
            idx += 1;
        }
        SyntaxKind::EOF
    }

    fn peek(&self) -> SyntaxKind {
        self.nth(0)
    }

    fn peek_text(&self) -> &'a str {
        self.tokens
            .get(self.peek_index())
            .map(|t| t.text)
            .unwrap_or("")
    }

    /// Kind of the token `k` places after the next significant one, with
    /// no trivia skipped (used to detect `ns.$x` and `fn(`).
    fn adjacent(&self, k: usize) -> SyntaxKind {
        self.tokens
            .get(self.peek_index() + k)
            .map(|t| t.kind)
            .unwrap_or(SyntaxKind::EOF)
    }

    fn at(&self, kind: SyntaxKind) -> bool {
        self.peek() == kind
    }

    fn at_any(&self, kinds: &[SyntaxKind]) -> bool {
        kinds.contains(&self.peek())
    }

    fn at_ident(&self, word: &str) -> bool {
        self.at(SyntaxKind::IDENT) && self.peek_text().eq_ignore_ascii_case(word)
    }

    fn at_end(&self) -> bool {
        self.peek_index() >= self.tokens.len()
    }

    fn at_block_open(&self) -> bool {
        self.peek().is_block_open()
    }

    fn at_statement_end(&self) -> bool {
        self.at_any(STATEMENT_END)
    }

    // =========================================================================
    // Token consumption
    // =========================================================================

    /// Consume leading trivia, then the next significant token.
    fn bump(&mut self) {
        self.skip_trivia();
        if let Some(token) = self.tokens.get(self.pos) {
            self.builder.token(token.kind.into(), token.text);
            self.pos += 1;
        }
    }

    fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: SyntaxKind, what: &str) -> bool {
        if self.eat(kind) {
            true
        } else {
            self.error(format!("expected {what}"));
            false
        }
    }

    fn skip_trivia(&mut self) {
        while let Some(token) = self.tokens.get(self.pos) {
            if !token.kind.is_trivia() {
                break;
            }
            self.builder.token(token.kind.into(), token.text);
            self.pos += 1;
        }
    }

    // =========================================================================
    // Error handling
    // =========================================================================

    fn error(&mut self, message: impl Into<String>) {
        let range = match self.tokens.get(self.peek_index()) {
            Some(t) => TextRange::at(t.offset, TextSize::of(t.text)),
            None => {
                let end = self
                    .tokens
                    .last()
                    .map(|t| t.offset + TextSize::of(t.text))
                    .unwrap_or_default();
                TextRange::empty(end)
            }
        };
        self.errors.push(SyntaxError::new(message, range));
    }

    fn error_recover(&mut self, message: impl Into<String>, recovery: &[SyntaxKind]) {
        self.error(message);
        self.start_node(SyntaxKind::ERROR);
        // Always consume at least one token to make progress
        let mut consumed = false;
        while !self.at_end() && !self.at_any(recovery) {
            self.bump();
            consumed = true;
        }
        if !consumed && !self.at_end() {
            self.bump();
        }
        self.finish_node();
    }

    // =========================================================================
    // Node building helpers
    // =========================================================================

    /// Start a node at the next significant token; leading trivia stays with
    /// the parent.
    fn start_node(&mut self, kind: SyntaxKind) {
        self.skip_trivia();
        self.builder.start_node(kind.into());
    }

    fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    /// Consume a statement terminator (`;` or a line break), tolerating the
    /// end of the enclosing block.
    fn terminate(&mut self) {
        if self.at_any(&[SyntaxKind::SEMICOLON, SyntaxKind::NEWLINE]) {
            self.bump();
        } else if !self.at_statement_end() {
            self.error_recover("expected `;`", STATEMENT_END);
            self.eat(SyntaxKind::SEMICOLON);
        }
    }

    // =========================================================================
    // Grammar rules: statements
    // =========================================================================

    /// SourceFile = Statement*
    fn parse_source_file(&mut self) {
        self.builder.start_node(SyntaxKind::SOURCE_FILE.into());

        loop {
            self.skip_trivia();
            if self.at_end() {
                break;
            }
            match self.peek() {
                SyntaxKind::SEMICOLON | SyntaxKind::NEWLINE => self.bump(),
                SyntaxKind::R_BRACE | SyntaxKind::DEDENT => {
                    self.error_recover("unexpected end of block", &[]);
                }
                _ => self.parse_statement_guarded(),
            }
        }

        self.finish_node();
    }

    /// Block = '{' Statement* '}' | INDENT Statement* DEDENT
    fn parse_block(&mut self) {
        self.start_node(SyntaxKind::BLOCK);
        self.bump();

        loop {
            self.skip_trivia();
            match self.peek() {
                SyntaxKind::EOF => {
                    self.error("expected `}`");
                    break;
                }
                SyntaxKind::R_BRACE | SyntaxKind::DEDENT => {
                    self.bump();
                    break;
                }
                SyntaxKind::SEMICOLON | SyntaxKind::NEWLINE => self.bump(),
                _ => self.parse_statement_guarded(),
            }
        }

        self.finish_node();
    }

    fn parse_statement_guarded(&mut self) {
        let before = self.pos;
        self.parse_statement();
        if self.pos == before && !self.at_end() {
            self.error_recover(format!("unexpected {:?}", self.peek()), &[]);
        }
    }

    fn parse_statement(&mut self) {
        match self.peek() {
            SyntaxKind::AT_KEYWORD => self.parse_at_rule(),
            SyntaxKind::VARIABLE if self.nth(1) == SyntaxKind::COLON => {
                self.parse_variable_decl()
            }
            SyntaxKind::IDENT
                if self.adjacent(1) == SyntaxKind::DOT
                    && self.adjacent(2) == SyntaxKind::VARIABLE
                    && self.nth(3) == SyntaxKind::COLON =>
            {
                self.parse_variable_decl()
            }
            SyntaxKind::EQ if self.indented => self.parse_callable_decl(SyntaxKind::MIXIN_DECL),
            SyntaxKind::PLUS if self.indented && self.adjacent(1) == SyntaxKind::IDENT => {
                self.parse_include()
            }
            _ if self.looks_like_rule() => self.parse_rule(),
            _ => self.parse_declaration(),
        }
    }

    /// A statement is a rule when a block opener comes before any statement
    /// terminator at nesting depth zero.
    fn looks_like_rule(&self) -> bool {
        let mut depth = 0u32;
        for token in &self.tokens[self.peek_index()..] {
            match token.kind {
                SyntaxKind::L_PAREN | SyntaxKind::L_BRACKET | SyntaxKind::HASH_BRACE => depth += 1,
                SyntaxKind::R_PAREN | SyntaxKind::R_BRACKET => depth = depth.saturating_sub(1),
                SyntaxKind::R_BRACE if depth > 0 => depth -= 1,
                SyntaxKind::L_BRACE | SyntaxKind::INDENT if depth == 0 => return true,
                SyntaxKind::SEMICOLON
                | SyntaxKind::R_BRACE
                | SyntaxKind::NEWLINE
                | SyntaxKind::DEDENT
                    if depth == 0 =>
                {
                    return false;
                }
                _ => {}
            }
        }
        false
    }

    /// Rule = Selector Block
    fn parse_rule(&mut self) {
        self.start_node(SyntaxKind::RULE);
        self.start_node(SyntaxKind::SELECTOR);
        while !self.at_block_open() && !self.at_statement_end() {
            if self.at(SyntaxKind::HASH_BRACE) {
                self.parse_interpolation();
            } else {
                self.bump();
            }
        }
        self.finish_node();

        if self.at_block_open() {
            self.parse_block();
        } else {
            self.error("expected `{`");
        }
        self.finish_node();
    }

    /// Declaration = Property ':' Value Block?
    fn parse_declaration(&mut self) {
        self.start_node(SyntaxKind::DECLARATION);
        self.start_node(SyntaxKind::PROPERTY);
        while !self.at(SyntaxKind::COLON) && !self.at_statement_end() && !self.at_block_open() {
            if self.at(SyntaxKind::HASH_BRACE) {
                self.parse_interpolation();
            } else {
                self.bump();
            }
        }
        self.finish_node();

        if self.expect(SyntaxKind::COLON, "`:`") {
            self.parse_value(VALUE_END);
            if self.at_block_open() {
                // nested properties: `font: 12px { family: serif }`
                self.parse_block();
            } else {
                self.terminate();
            }
        } else {
            self.terminate();
        }
        self.finish_node();
    }

    /// VariableDecl = (Namespace '.')? '$name' ':' Value Flags? ';'
    fn parse_variable_decl(&mut self) {
        self.start_node(SyntaxKind::VARIABLE_DECL);
        if self.at(SyntaxKind::IDENT) {
            self.parse_namespace();
        }
        self.bump();
        self.expect(SyntaxKind::COLON, "`:`");
        self.parse_value(VALUE_END);
        self.terminate();
        self.finish_node();
    }

    fn parse_at_rule(&mut self) {
        let keyword = self.peek_text().to_ascii_lowercase();
        match keyword.as_str() {
            "@use" => self.parse_use(),
            "@forward" => self.parse_forward(),
            "@import" => self.parse_import(),
            "@mixin" => self.parse_callable_decl(SyntaxKind::MIXIN_DECL),
            "@function" => self.parse_callable_decl(SyntaxKind::FUNCTION_DECL),
            "@include" => self.parse_include(),
            "@extend" => self.parse_extend(),
            "@each" | "@for" => self.parse_loop(),
            _ => self.parse_generic_at_rule(),
        }
    }

    /// UseRule = '@use' ModuleUrl ('as' (IDENT | '*'))? WithConfig?
    fn parse_use(&mut self) {
        self.start_node(SyntaxKind::USE_RULE);
        self.bump();
        self.parse_module_url();

        if self.at_ident("as") {
            self.start_node(SyntaxKind::USE_ALIAS);
            self.bump();
            if self.at_any(&[SyntaxKind::IDENT, SyntaxKind::STAR]) {
                self.bump();
            } else {
                self.error("expected namespace");
            }
            self.finish_node();
        }
        if self.at_ident("with") {
            self.parse_with_config();
        }
        self.terminate();
        self.finish_node();
    }

    /// ForwardRule = '@forward' ModuleUrl ('as' prefix '*')? (('show' | 'hide') Names)? WithConfig?
    fn parse_forward(&mut self) {
        self.start_node(SyntaxKind::FORWARD_RULE);
        self.bump();
        self.parse_module_url();

        if self.at_ident("as") {
            self.start_node(SyntaxKind::FORWARD_PREFIX);
            self.bump();
            self.eat(SyntaxKind::IDENT);
            self.expect(SyntaxKind::STAR, "`*`");
            self.finish_node();
        }
        if self.at_ident("show") || self.at_ident("hide") {
            self.start_node(SyntaxKind::VISIBILITY_LIST);
            self.bump();
            loop {
                if self.at_any(&[SyntaxKind::VARIABLE, SyntaxKind::IDENT]) && !self.at_ident("with") {
                    self.bump();
                } else {
                    self.error("expected member name");
                    break;
                }
                if !self.eat(SyntaxKind::COMMA) {
                    break;
                }
            }
            self.finish_node();
        }
        if self.at_ident("with") {
            self.parse_with_config();
        }
        self.terminate();
        self.finish_node();
    }

    /// ImportRule = '@import' ImportTarget (',' ImportTarget)* MediaQuery?
    fn parse_import(&mut self) {
        self.start_node(SyntaxKind::IMPORT_RULE);
        self.bump();

        loop {
            if self.at_statement_end() {
                self.error("expected import target");
                break;
            }
            self.start_node(SyntaxKind::IMPORT_TARGET);
            match self.peek() {
                SyntaxKind::STRING => self.bump(),
                SyntaxKind::URL => self.parse_url_call(),
                SyntaxKind::IDENT
                    if self.peek_text().eq_ignore_ascii_case("url")
                        && self.adjacent(1) == SyntaxKind::L_PAREN =>
                {
                    self.parse_url_call()
                }
                _ if self.indented => {
                    // unquoted targets are allowed in the indented syntax
                    while !self.at(SyntaxKind::COMMA) && !self.at_statement_end() {
                        self.bump();
                    }
                }
                _ => self.error("expected string"),
            }
            self.finish_node();
            if !self.eat(SyntaxKind::COMMA) {
                break;
            }
        }

        // media query or supports condition
        while !self.at_statement_end() {
            self.bump();
        }
        self.terminate();
        self.finish_node();
    }

    /// MixinDecl | FunctionDecl = keyword IDENT ParamList? Block
    fn parse_callable_decl(&mut self, kind: SyntaxKind) {
        self.start_node(kind);
        self.bump();
        if !self.eat(SyntaxKind::IDENT) {
            self.error("expected name");
        }
        if self.at(SyntaxKind::L_PAREN) {
            self.parse_param_list();
        }
        if self.at_block_open() {
            self.parse_block();
        } else {
            self.error("expected `{`");
            self.terminate();
        }
        self.finish_node();
    }

    /// ParamList = '(' (Param (',' Param)*)? ')'
    fn parse_param_list(&mut self) {
        self.start_node(SyntaxKind::PARAM_LIST);
        self.bump();
        loop {
            if self.at_any(ARG_END) && !self.at(SyntaxKind::COMMA) {
                break;
            }
            if self.at(SyntaxKind::VARIABLE) {
                self.start_node(SyntaxKind::PARAM);
                self.bump();
                if self.eat(SyntaxKind::COLON) {
                    self.parse_value(ARG_END);
                }
                self.eat(SyntaxKind::ELLIPSIS);
                self.finish_node();
            } else {
                self.error_recover("expected parameter", ARG_END);
            }
            if !self.eat(SyntaxKind::COMMA) {
                break;
            }
        }
        self.expect(SyntaxKind::R_PAREN, "`)`");
        self.finish_node();
    }

    /// IncludeRule = '@include' (Namespace '.')? IDENT ArgList? ('using' ParamList)? Block?
    fn parse_include(&mut self) {
        self.start_node(SyntaxKind::INCLUDE_RULE);
        self.bump();
        if self.at(SyntaxKind::IDENT)
            && self.adjacent(1) == SyntaxKind::DOT
            && self.adjacent(2) == SyntaxKind::IDENT
        {
            self.parse_namespace();
        }
        if !self.eat(SyntaxKind::IDENT) {
            self.error("expected mixin name");
        }
        if self.at(SyntaxKind::L_PAREN) {
            self.parse_arg_list();
        }
        if self.at_ident("using") {
            self.start_node(SyntaxKind::CONTENT_BLOCK_PARAMS);
            self.bump();
            if self.at(SyntaxKind::L_PAREN) {
                self.parse_param_list();
            }
            self.finish_node();
        }
        if self.at_block_open() {
            self.parse_block();
        } else {
            self.terminate();
        }
        self.finish_node();
    }

    /// ExtendRule = '@extend' Selector '!optional'?
    fn parse_extend(&mut self) {
        self.start_node(SyntaxKind::EXTEND_RULE);
        self.bump();
        while !self.at_statement_end() {
            if self.at(SyntaxKind::HASH_BRACE) {
                self.parse_interpolation();
            } else {
                self.bump();
            }
        }
        self.terminate();
        self.finish_node();
    }

    /// `@each $k, $v in ...` / `@for $i from ...`: the leading variables are
    /// loop bindings, not references.
    fn parse_loop(&mut self) {
        self.start_node(SyntaxKind::AT_RULE);
        self.bump();
        while self.at_any(&[SyntaxKind::VARIABLE, SyntaxKind::COMMA]) {
            self.bump();
        }
        self.parse_at_rule_tail();
        self.finish_node();
    }

    /// AtRule = AT_KEYWORD Prelude (Block | ';')
    fn parse_generic_at_rule(&mut self) {
        self.start_node(SyntaxKind::AT_RULE);
        self.bump();
        self.parse_at_rule_tail();
        self.finish_node();
    }

    fn parse_at_rule_tail(&mut self) {
        self.parse_expression(VALUE_END);
        if self.at_block_open() {
            self.parse_block();
        } else {
            self.terminate();
        }
    }

    // =========================================================================
    // Grammar rules: module pieces
    // =========================================================================

    fn parse_module_url(&mut self) {
        if self.at(SyntaxKind::STRING) {
            self.start_node(SyntaxKind::MODULE_URL);
            self.bump();
            self.finish_node();
        } else {
            self.error("expected module URL string");
        }
    }

    /// WithConfig = 'with' ArgList
    fn parse_with_config(&mut self) {
        self.start_node(SyntaxKind::WITH_CONFIG);
        self.bump();
        if self.at(SyntaxKind::L_PAREN) {
            self.parse_arg_list();
        } else {
            self.error("expected `(`");
        }
        self.finish_node();
    }

    /// Namespace = IDENT (followed by '.')
    fn parse_namespace(&mut self) {
        self.start_node(SyntaxKind::MODULE_NAMESPACE);
        self.bump();
        self.finish_node();
        self.bump();
    }

    // =========================================================================
    // Grammar rules: values
    // =========================================================================

    fn parse_value(&mut self, stop: &[SyntaxKind]) {
        self.start_node(SyntaxKind::VALUE);
        self.parse_expression(stop);
        self.finish_node();
    }

    fn parse_expression(&mut self, stop: &[SyntaxKind]) {
        while !self.at_end() && !self.at_any(stop) {
            self.parse_atom();
        }
    }

    fn parse_atom(&mut self) {
        match self.peek() {
            SyntaxKind::VARIABLE => {
                self.start_node(SyntaxKind::VARIABLE_REF);
                self.bump();
                self.finish_node();
            }
            SyntaxKind::IDENT => self.parse_ident_atom(),
            SyntaxKind::URL => self.parse_url_call(),
            SyntaxKind::HASH_BRACE => self.parse_interpolation(),
            SyntaxKind::L_PAREN => self.parse_group(SyntaxKind::R_PAREN),
            SyntaxKind::L_BRACKET => self.parse_group(SyntaxKind::R_BRACKET),
            _ => self.bump(),
        }
    }

    fn parse_ident_atom(&mut self) {
        let after = (self.adjacent(1), self.adjacent(2), self.adjacent(3));
        match after {
            (SyntaxKind::DOT, SyntaxKind::VARIABLE, _) => {
                self.start_node(SyntaxKind::VARIABLE_REF);
                self.parse_namespace();
                self.bump();
                self.finish_node();
            }
            (SyntaxKind::DOT, SyntaxKind::IDENT, SyntaxKind::L_PAREN) => {
                self.start_node(SyntaxKind::FUNCTION_CALL);
                self.parse_namespace();
                self.bump();
                self.parse_arg_list();
                self.finish_node();
            }
            (SyntaxKind::L_PAREN, next, _) => {
                let is_url = self.peek_text().eq_ignore_ascii_case("url");
                let quoted = self.nth(2) == SyntaxKind::STRING && self.nth(3) == SyntaxKind::R_PAREN;
                if is_url && (quoted || next == SyntaxKind::R_PAREN) {
                    self.parse_url_call();
                } else {
                    self.start_node(SyntaxKind::FUNCTION_CALL);
                    self.bump();
                    self.parse_arg_list();
                    self.finish_node();
                }
            }
            _ => self.bump(),
        }
    }

    /// UrlCall = URL | 'url' '(' STRING? ')'
    fn parse_url_call(&mut self) {
        self.start_node(SyntaxKind::URL_CALL);
        if self.at(SyntaxKind::URL) {
            self.bump();
        } else {
            self.bump();
            self.bump();
            self.eat(SyntaxKind::STRING);
            self.expect(SyntaxKind::R_PAREN, "`)`");
        }
        self.finish_node();
    }

    /// ArgList = '(' (('$name' ':')? Expr (',' ...)*)? ')'
    fn parse_arg_list(&mut self) {
        self.start_node(SyntaxKind::ARG_LIST);
        self.bump();
        loop {
            if self.at_any(ARG_END) && !self.at(SyntaxKind::COMMA) {
                break;
            }
            if self.at(SyntaxKind::VARIABLE) && self.nth(1) == SyntaxKind::COLON {
                // keyword argument name
                self.bump();
                self.bump();
            }
            self.parse_expression(ARG_END);
            if !self.eat(SyntaxKind::COMMA) {
                break;
            }
        }
        self.expect(SyntaxKind::R_PAREN, "`)`");
        self.finish_node();
    }

    fn parse_group(&mut self, close: SyntaxKind) {
        self.bump();
        self.parse_expression(&[
            close,
            SyntaxKind::SEMICOLON,
            SyntaxKind::L_BRACE,
            SyntaxKind::R_BRACE,
            SyntaxKind::DEDENT,
        ]);
        if !self.eat(close) {
            self.error(if close == SyntaxKind::R_PAREN {
                "expected `)`"
            } else {
                "expected `]`"
            });
        }
    }

    /// Interpolation = '#{' Expr '}'
    fn parse_interpolation(&mut self) {
        self.start_node(SyntaxKind::INTERPOLATION);
        self.bump();
        self.parse_expression(&[SyntaxKind::R_BRACE, SyntaxKind::SEMICOLON]);
        self.expect(SyntaxKind::R_BRACE, "`}`");
        self.finish_node();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::SyntaxNode;

    fn scss(input: &str) -> SyntaxNode {
        let parse = parse(input, Dialect::Scss);
        assert!(parse.ok(), "unexpected errors: {:?}", parse.errors);
        parse.syntax()
    }

    fn kinds(node: &SyntaxNode) -> Vec<SyntaxKind> {
        node.descendants().map(|n| n.kind()).collect()
    }

    #[test]
    fn test_parse_is_lossless() {
        let input = "@use \"one\" as o;\n/// doc\n$a: o.$b !default;\n.x { color: $a; }\n";
        let root = parse(input, Dialect::Scss).syntax();
        assert_eq!(root.text().to_string(), input);
    }

    #[test]
    fn test_parse_variable_decl_and_ref() {
        let root = scss("$a: 1px;\n.b { width: $a; }");
        let kinds = kinds(&root);
        assert!(kinds.contains(&SyntaxKind::VARIABLE_DECL));
        assert!(kinds.contains(&SyntaxKind::RULE));
        assert!(kinds.contains(&SyntaxKind::DECLARATION));
        assert!(kinds.contains(&SyntaxKind::VARIABLE_REF));
    }

    #[test]
    fn test_parse_namespaced_reference() {
        let root = scss("@use \"./one\";\n.a { color: one.$primary; }");
        let reference = root
            .descendants()
            .find(|n| n.kind() == SyntaxKind::VARIABLE_REF)
            .unwrap();
        assert_eq!(reference.text().to_string(), "one.$primary");
        assert!(
            reference
                .children()
                .any(|c| c.kind() == SyntaxKind::MODULE_NAMESPACE)
        );
    }

    #[test]
    fn test_parse_forward_with_prefix_and_visibility() {
        let root = scss("@forward \"src/list\" as list-* hide list-reset, $horizontal-list-gap;");
        let kinds = kinds(&root);
        assert!(kinds.contains(&SyntaxKind::FORWARD_RULE));
        assert!(kinds.contains(&SyntaxKind::FORWARD_PREFIX));
        assert!(kinds.contains(&SyntaxKind::VISIBILITY_LIST));
    }

    #[test]
    fn test_parse_mixin_and_include() {
        let root = scss(
            "@mixin theme($theme: DarkGray, $args...) { background: $theme; }\n\
             .info { @include theme; @include m.theme($theme: DarkRed) { a: b; } }",
        );
        let kinds = kinds(&root);
        assert!(kinds.contains(&SyntaxKind::MIXIN_DECL));
        assert!(kinds.contains(&SyntaxKind::PARAM_LIST));
        assert_eq!(kinds.iter().filter(|k| **k == SyntaxKind::PARAM).count(), 2);
        assert_eq!(
            kinds.iter().filter(|k| **k == SyntaxKind::INCLUDE_RULE).count(),
            2
        );
        // keyword argument names are not references
        assert_eq!(
            kinds.iter().filter(|k| **k == SyntaxKind::VARIABLE_REF).count(),
            1
        );
    }

    #[test]
    fn test_parse_function_call_in_value() {
        let root = scss("@function double($n) { @return $n * 2; }\n.a { width: double(2px) math.div(1, 2); }");
        let calls: Vec<_> = root
            .descendants()
            .filter(|n| n.kind() == SyntaxKind::FUNCTION_CALL)
            .map(|n| n.text().to_string())
            .collect();
        assert_eq!(calls, vec!["double(2px)", "math.div(1, 2)"]);
    }

    #[test]
    fn test_parse_pseudo_selector_is_rule() {
        let root = scss("a:hover { color: red; }");
        let kinds = kinds(&root);
        assert!(kinds.contains(&SyntaxKind::RULE));
        assert_eq!(
            kinds.iter().filter(|k| **k == SyntaxKind::DECLARATION).count(),
            1
        );
    }

    #[test]
    fn test_parse_import_targets() {
        let root = scss("@import \"a\", 'b';\n@import url(foo.css);\n@import \"c.css\" screen;");
        assert_eq!(
            root.descendants()
                .filter(|n| n.kind() == SyntaxKind::IMPORT_TARGET)
                .count(),
            4
        );
    }

    #[test]
    fn test_parse_each_binds_variables() {
        let root = scss("@each $key, $value in $map { .#{$key} { color: $value; } }");
        let refs: Vec<_> = root
            .descendants()
            .filter(|n| n.kind() == SyntaxKind::VARIABLE_REF)
            .map(|n| n.text().to_string())
            .collect();
        assert_eq!(refs, vec!["$map", "$key", "$value"]);
    }

    #[test]
    fn test_parse_recovers_from_errors() {
        let parse = parse(".a { color: red; \n$b: ;\n", Dialect::Scss);
        assert!(!parse.ok());
        assert_eq!(parse.syntax().text().to_string(), ".a { color: red; \n$b: ;\n");
    }

    #[test]
    fn test_parse_indented_syntax() {
        let input = "@use \"one\"\n=theme($c)\n  color: $c\n.a\n  +theme(one.$primary)\n";
        let parse = parse(input, Dialect::Sass);
        assert!(parse.ok(), "unexpected errors: {:?}", parse.errors);
        let root = parse.syntax();
        assert_eq!(root.text().to_string(), input);
        let kinds = kinds(&root);
        assert!(kinds.contains(&SyntaxKind::USE_RULE));
        assert!(kinds.contains(&SyntaxKind::MIXIN_DECL));
        assert!(kinds.contains(&SyntaxKind::INCLUDE_RULE));
        assert!(kinds.contains(&SyntaxKind::RULE));
    }

    #[test]
    fn test_parse_host_document() {
        let input = "<template/>\n<style lang=\"scss\">\n$a: 1;\n</style>\n";
        let parse = parse(input, Dialect::Vue);
        assert!(parse.ok(), "unexpected errors: {:?}", parse.errors);
        let root = parse.syntax();
        let decl = root
            .descendants()
            .find(|n| n.kind() == SyntaxKind::VARIABLE_DECL)
            .unwrap();
        let start = u32::from(decl.text_range().start()) as usize;
        assert_eq!(&input[start..start + 2], "$a");
    }
}

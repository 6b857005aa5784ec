//! Token stream navigation shared by all productions.
//!
//! The stream pulls tokens from the lexer on demand and keeps at most a few
//! significant tokens buffered. Hidden tokens are dropped and unrecognized
//! input is reported once and skipped, so productions only ever see tokens
//! the grammar can name.

use crate::ast::Span;
use crate::diag::Diag;
use crate::lexer::token::{Token, TokenKind};
use crate::lexer::{Lexer, unrecognized_input};
use crate::options::ParseOptions;
use crate::parser::recovery::EXPECTED;
use std::collections::VecDeque;

/// Common error type for parsing operations.
pub type ParseError = Box<Diag>;

/// Common result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Significant tokens the parser may look at beyond the current one.
const MAX_LOOKAHEAD: usize = 2;

/// Lazily filled token stream over a [`Lexer`].
pub struct TokenStream<'a> {
    lexer: Lexer<'a>,
    buffer: VecDeque<Token>,
    previous_end: usize,
    diagnostics: Vec<Diag>,
}

impl<'a> TokenStream<'a> {
    pub fn new(source: &'a str, options: &ParseOptions) -> Self {
        Self {
            lexer: Lexer::new(source, options),
            buffer: VecDeque::with_capacity(MAX_LOOKAHEAD + 1),
            previous_end: 0,
            diagnostics: Vec::new(),
        }
    }

    /// Ensures `count` significant tokens are buffered.
    fn fill(&mut self, count: usize) {
        while self.buffer.len() < count {
            let token = self.lexer.next_token();
            if token.is_hidden() {
                continue;
            }
            if token.kind == TokenKind::Unknown {
                self.diagnostics.push(unrecognized_input(&token));
                continue;
            }
            self.buffer.push_back(token);
        }
    }

    /// Returns the current token.
    pub fn current(&mut self) -> &Token {
        self.fill(1);
        &self.buffer[0]
    }

    /// Returns the kind of the token `offset` positions ahead (0 is current).
    pub fn kind_at(&mut self, offset: usize) -> TokenKind {
        let offset = offset.min(MAX_LOOKAHEAD);
        self.fill(offset + 1);
        self.buffer[offset].kind
    }

    pub fn kind(&mut self) -> TokenKind {
        self.kind_at(0)
    }

    /// Returns the kind of the token after the current one.
    pub fn peek_kind(&mut self) -> TokenKind {
        self.kind_at(1)
    }

    /// Consumes and returns the current token. At end of input the `Eof`
    /// token is returned without being consumed.
    pub fn advance(&mut self) -> Token {
        self.fill(1);
        if self.buffer[0].kind == TokenKind::Eof {
            return self.buffer[0].clone();
        }
        let token = self.buffer.pop_front().unwrap_or_else(|| self.lexer.next_token());
        self.previous_end = token.span.end;
        token
    }

    pub fn check(&mut self, kind: TokenKind) -> bool {
        self.kind() == kind
    }

    pub fn at_any(&mut self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.kind())
    }

    pub fn is_eof(&mut self) -> bool {
        self.check(TokenKind::Eof)
    }

    /// Consumes the current token if it matches `kind`.
    pub fn consume(&mut self, kind: TokenKind) -> Option<Token> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    /// Consumes a token of `kind` or fails with an "expected" diagnostic.
    pub fn expect(&mut self, kind: TokenKind) -> ParseResult<Token> {
        self.expect_described(kind, &kind.to_string())
    }

    /// Like [`TokenStream::expect`] with a custom description of what was expected.
    pub fn expect_described(&mut self, kind: TokenKind, expected: &str) -> ParseResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.expected(expected))
        }
    }

    /// Builds an "expected X, found Y" error at the current token.
    pub fn expected(&mut self, expected: &str) -> ParseError {
        let found = self.current().describe();
        self.error_here_with_code(format!("expected {expected}, found {found}"), EXPECTED)
    }

    /// Creates an error at the current token position with a diagnostic code.
    pub fn error_here_with_code(&mut self, message: impl Into<String>, code: &str) -> ParseError {
        let span = self.current().span.clone();
        Box::new(
            Diag::error(message.into())
                .with_primary_label(span, "here")
                .with_code(code),
        )
    }

    /// Byte offset where the current token starts.
    pub fn current_start(&mut self) -> usize {
        self.current().span.start
    }

    /// Byte offset where the last consumed token ended.
    pub fn previous_end(&self) -> usize {
        self.previous_end
    }

    /// Span of the current token.
    pub fn current_span(&mut self) -> Span {
        self.current().span.clone()
    }

    /// Takes the diagnostics reported for unrecognized input so far.
    pub fn take_diagnostics(&mut self) -> Vec<Diag> {
        std::mem::take(&mut self.diagnostics)
    }
}

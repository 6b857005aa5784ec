//! Lexical analysis for the pipe query language.
//!
//! The lexer is a direct-coded scanner driven by a stack of lexical modes. Each
//! pipeline command pushes the mode that matches its clause, so the same
//! characters can tokenize differently: `logs-*` is one source token after
//! `FROM` but three expression tokens after `EVAL`.
//!
//! Within a mode the longest match wins and ties go to the rule declared first,
//! which is how keywords beat identifiers of the same length. The lexer never
//! fails: input no rule can match becomes an [`TokenKind::Unknown`] token, and
//! the concatenated token texts always reproduce the source.

pub mod keywords;
pub mod mode;
pub mod token;

use crate::diag::Diag;
use crate::options::{ParseOptions, PreviewRule};
use mode::{LexerMode, ModeStack, Transition};
use token::{Channel, Token, TokenKind};

const TRACE_TARGET: &str = "esql_parser::lexer";

/// Result of lexical analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerResult {
    /// Every token, hidden ones included, ending with `Eof`.
    pub tokens: Vec<Token>,
    /// One diagnostic per unrecognized input token.
    pub diagnostics: Vec<Diag>,
}

/// A scanned rule: its kind, byte length and mode transition.
#[derive(Debug, Clone, Copy)]
struct Scan {
    kind: TokenKind,
    len: usize,
    transition: Transition,
}

impl Scan {
    fn new(kind: TokenKind, len: usize) -> Self {
        Self {
            kind,
            len,
            transition: Transition::None,
        }
    }

    fn with(kind: TokenKind, len: usize, transition: Transition) -> Self {
        Self {
            kind,
            len,
            transition,
        }
    }
}

/// A pull-based lexical analyzer.
///
/// Each instance owns its mode stack, so independent lexers never share state.
pub struct Lexer<'a> {
    /// The source text being lexed.
    source: &'a str,
    /// Feature flags consulted by preview-gated rules.
    options: ParseOptions,
    /// Current byte position in source.
    pos: usize,
    /// Line of the character at `pos`.
    line: u32,
    /// Column of the character at `pos`.
    column: u32,
    /// Active modes.
    modes: ModeStack,
    /// Set once the iterator has yielded `Eof`.
    finished: bool,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given source text.
    pub fn new(source: &'a str, options: &ParseOptions) -> Self {
        Self {
            source,
            options: *options,
            pos: 0,
            line: 1,
            column: 1,
            modes: ModeStack::new(),
            finished: false,
        }
    }

    /// Returns the active lexical mode.
    pub fn mode(&self) -> LexerMode {
        self.modes.current()
    }

    /// Returns the full mode stack.
    pub fn mode_stack(&self) -> &ModeStack {
        &self.modes
    }

    /// Returns the source text.
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Produces the next token.
    ///
    /// After the end of input every call returns a zero-width `Eof` token.
    pub fn next_token(&mut self) -> Token {
        if self.pos >= self.source.len() {
            let end = self.source.len();
            return Token {
                kind: TokenKind::Eof,
                text: "".into(),
                channel: Channel::Default,
                span: end..end,
                line: self.line,
                column: self.column,
            };
        }

        let rest = &self.source[self.pos..];
        let scan = self.scan_rule(rest);
        // Every rule consumes at least one character.
        let len = scan.len.max(first_char_len(rest)).min(rest.len());
        let start = self.pos;
        let text = &self.source[start..start + len];

        let token = Token {
            kind: scan.kind,
            text: text.into(),
            channel: if scan.kind.is_trivia() {
                Channel::Hidden
            } else {
                Channel::Default
            },
            span: start..start + len,
            line: self.line,
            column: self.column,
        };

        self.advance_position(text);
        self.apply_transition(scan.transition);
        token
    }

    /// Tokenizes the remaining input and returns every token plus diagnostics
    /// for unrecognized input.
    pub fn tokenize(self) -> LexerResult {
        let tokens: Vec<Token> = self.collect();
        let diagnostics = tokens
            .iter()
            .filter(|token| token.kind == TokenKind::Unknown)
            .map(unrecognized_input)
            .collect();
        LexerResult {
            tokens,
            diagnostics,
        }
    }

    fn advance_position(&mut self, text: &str) {
        for ch in text.chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.pos += text.len();
    }

    fn apply_transition(&mut self, transition: Transition) {
        if transition == Transition::None {
            return;
        }
        let before = self.modes.current();
        self.modes.apply(transition);
        tracing::trace!(
            target: TRACE_TARGET,
            from = %before,
            to = %self.modes.current(),
            depth = self.modes.depth(),
            "mode transition"
        );
    }

    /// Dispatches to the rules of the active mode.
    fn scan_rule(&self, rest: &str) -> Scan {
        if let Some(scan) = scan_trivia(rest) {
            return scan;
        }

        let scan = match self.modes.current() {
            LexerMode::Default => self.scan_default(rest),
            LexerMode::Expression => self.scan_expression(rest),
            LexerMode::Explain => scan_explain(rest),
            LexerMode::From => scan_from(rest),
            LexerMode::Project => self.scan_project(rest),
            LexerMode::Rename => self.scan_rename(rest),
            LexerMode::Enrich => scan_enrich(rest),
            LexerMode::EnrichField => self.scan_enrich_field(rest),
            LexerMode::MvExpand => self.scan_mv_expand(rest),
            LexerMode::Show => scan_show(rest),
            LexerMode::Setting => scan_setting(rest),
            LexerMode::Lookup => scan_lookup(rest),
            LexerMode::LookupField => scan_lookup_field(rest),
            LexerMode::Metrics => scan_metrics(rest),
            LexerMode::ClosingMetrics => scan_closing_metrics(rest),
        };

        scan.unwrap_or_else(|| Scan::new(TokenKind::Unknown, first_char_len(rest)))
    }

    fn scan_default(&self, rest: &str) -> Option<Scan> {
        let len = command_word(rest);
        if len == 0 {
            return None;
        }
        let word = &rest[..len];
        Some(match keywords::lookup_command(word, &self.options) {
            Some((kind, mode)) => Scan::with(kind, len, Transition::Push(mode)),
            None => Scan::with(
                TokenKind::UnknownCommand,
                len,
                Transition::Push(LexerMode::Expression),
            ),
        })
    }

    fn scan_expression(&self, rest: &str) -> Option<Scan> {
        let bytes = rest.as_bytes();
        let next = bytes.get(1).copied();
        let scan = match bytes[0] {
            b'|' => Scan::with(TokenKind::Pipe, 1, Transition::Pop),
            b'"' => scan_quoted_string(rest),
            b'0'..=b'9' => {
                let integer = digits(rest);
                match decimal_literal(rest) {
                    Some(len) if len > integer => Scan::new(TokenKind::DecimalLiteral, len),
                    _ => Scan::new(TokenKind::IntegerLiteral, integer),
                }
            }
            b'.' => match decimal_literal(rest) {
                Some(len) => Scan::new(TokenKind::DecimalLiteral, len),
                None => Scan::new(TokenKind::Dot, 1),
            },
            b'a'..=b'z' | b'A'..=b'Z' | b'_' | b'@' => {
                let len = unquoted_identifier(rest)?;
                match keywords::lookup_expression_keyword(&rest[..len]) {
                    Some(kind) => Scan::new(kind, len),
                    None => Scan::new(TokenKind::UnquotedIdentifier, len),
                }
            }
            b'`' => scan_quoted_identifier(rest, TokenKind::QuotedIdentifier),
            b'=' => match next {
                Some(b'=') => Scan::new(TokenKind::Eq, 2),
                Some(b'~') => Scan::new(TokenKind::CiEq, 2),
                _ => Scan::new(TokenKind::Assign, 1),
            },
            b':' => match next {
                Some(b':') => Scan::new(TokenKind::CastOp, 2),
                _ if PreviewRule::MatchOperator.is_enabled(&self.options) => {
                    Scan::new(TokenKind::Colon, 1)
                }
                _ => return None,
            },
            b',' => Scan::new(TokenKind::Comma, 1),
            b'(' => Scan::new(TokenKind::LParen, 1),
            b')' => Scan::new(TokenKind::RParen, 1),
            b'?' => scan_param(rest),
            b'!' => match next {
                Some(b'=') => Scan::new(TokenKind::Neq, 2),
                _ => return None,
            },
            b'<' => match next {
                Some(b'=') => Scan::new(TokenKind::Lte, 2),
                _ => Scan::new(TokenKind::Lt, 1),
            },
            b'>' => match next {
                Some(b'=') => Scan::new(TokenKind::Gte, 2),
                _ => Scan::new(TokenKind::Gt, 1),
            },
            b'+' => Scan::new(TokenKind::Plus, 1),
            b'-' => Scan::new(TokenKind::Minus, 1),
            b'*' => Scan::new(TokenKind::Asterisk, 1),
            b'/' => Scan::new(TokenKind::Slash, 1),
            b'%' => Scan::new(TokenKind::Percent, 1),
            b'[' => Scan::with(
                TokenKind::OpeningBracket,
                1,
                Transition::PushTwice(LexerMode::Expression),
            ),
            b']' => Scan::with(TokenKind::ClosingBracket, 1, Transition::PopTwice),
            _ => return None,
        };
        Some(scan)
    }

    fn scan_project(&self, rest: &str) -> Option<Scan> {
        match rest.as_bytes()[0] {
            b'|' => Some(Scan::with(TokenKind::Pipe, 1, Transition::Pop)),
            b'.' => Some(Scan::new(TokenKind::Dot, 1)),
            b',' => Some(Scan::new(TokenKind::Comma, 1)),
            b'?' => self.scan_gated_param(rest),
            _ => id_pattern(rest).map(|len| Scan::new(TokenKind::IdPattern, len)),
        }
    }

    fn scan_rename(&self, rest: &str) -> Option<Scan> {
        match rest.as_bytes()[0] {
            b'|' => Some(Scan::with(TokenKind::Pipe, 1, Transition::Pop)),
            b'=' => Some(Scan::new(TokenKind::Assign, 1)),
            b',' => Some(Scan::new(TokenKind::Comma, 1)),
            b'.' => Some(Scan::new(TokenKind::Dot, 1)),
            b'?' => self.scan_gated_param(rest),
            _ => {
                let len = id_pattern(rest)?;
                Some(mode_keyword_or(
                    LexerMode::Rename,
                    &rest[..len],
                    Scan::new(TokenKind::IdPattern, len),
                ))
            }
        }
    }

    fn scan_enrich_field(&self, rest: &str) -> Option<Scan> {
        match rest.as_bytes()[0] {
            b'|' => Some(Scan::with(TokenKind::Pipe, 1, Transition::PopTwice)),
            b'=' => Some(Scan::new(TokenKind::Assign, 1)),
            b',' => Some(Scan::new(TokenKind::Comma, 1)),
            b'.' => Some(Scan::new(TokenKind::Dot, 1)),
            b'?' => self.scan_gated_param(rest),
            b'`' if quoted_identifier(rest).is_none() => Some(unterminated_to_end(rest)),
            _ => {
                let len = id_pattern(rest)?;
                Some(mode_keyword_or(
                    LexerMode::EnrichField,
                    &rest[..len],
                    Scan::new(TokenKind::IdPattern, len),
                ))
            }
        }
    }

    fn scan_mv_expand(&self, rest: &str) -> Option<Scan> {
        match rest.as_bytes()[0] {
            b'|' => Some(Scan::with(TokenKind::Pipe, 1, Transition::Pop)),
            b'.' => Some(Scan::new(TokenKind::Dot, 1)),
            b'?' => self.scan_gated_param(rest),
            b'`' => Some(scan_quoted_identifier(rest, TokenKind::QuotedIdentifier)),
            _ => unquoted_identifier(rest).map(|len| Scan::new(TokenKind::UnquotedIdentifier, len)),
        }
    }

    /// Parameters in identifier positions only exist in preview syntax.
    fn scan_gated_param(&self, rest: &str) -> Option<Scan> {
        if PreviewRule::IdentifierParams.is_enabled(&self.options) {
            Some(scan_param(rest))
        } else {
            None
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            self.finished = true;
        }
        Some(token)
    }
}

/// Convenience function to tokenize a source string.
///
/// Returns every token including whitespace and comments, ending with `Eof`.
pub fn tokenize(source: &str, options: &ParseOptions) -> LexerResult {
    Lexer::new(source, options).tokenize()
}

/// Builds the diagnostic reported for an unrecognized input token.
pub fn unrecognized_input(token: &Token) -> Diag {
    let message = if token.text.starts_with('"') {
        "unterminated quoted string".to_string()
    } else if token.text.starts_with('`') {
        "unterminated quoted identifier".to_string()
    } else if token.text.starts_with("/*") {
        "unterminated block comment".to_string()
    } else {
        format!("unrecognized input '{}'", token.text)
    };
    Diag::error(message)
        .with_primary_label(token.span.clone(), "here")
        .with_code("L001")
}

// ---------------------------------------------------------------------------
// Mode rules without preview-gated alternatives
// ---------------------------------------------------------------------------

fn scan_explain(rest: &str) -> Option<Scan> {
    match rest.as_bytes()[0] {
        b'[' => Some(Scan::with(
            TokenKind::OpeningBracket,
            1,
            Transition::Push(LexerMode::Default),
        )),
        b'|' => Some(Scan::with(TokenKind::Pipe, 1, Transition::Pop)),
        _ => None,
    }
}

fn scan_from(rest: &str) -> Option<Scan> {
    match rest.as_bytes()[0] {
        b'|' => Some(Scan::with(TokenKind::Pipe, 1, Transition::Pop)),
        b'[' => Some(Scan::new(TokenKind::OpeningBracket, 1)),
        b']' => Some(Scan::new(TokenKind::ClosingBracket, 1)),
        b':' => Some(Scan::new(TokenKind::Colon, 1)),
        b',' => Some(Scan::new(TokenKind::Comma, 1)),
        b'=' => Some(Scan::new(TokenKind::Assign, 1)),
        b'"' => Some(scan_quoted_string(rest)),
        _ => {
            let len = unquoted_source(rest)?;
            Some(mode_keyword_or(
                LexerMode::From,
                &rest[..len],
                Scan::new(TokenKind::UnquotedSource, len),
            ))
        }
    }
}

fn scan_enrich(rest: &str) -> Option<Scan> {
    match rest.as_bytes()[0] {
        b'|' => Some(Scan::with(TokenKind::Pipe, 1, Transition::Pop)),
        b'[' => Some(Scan::with(
            TokenKind::OpeningBracket,
            1,
            Transition::Push(LexerMode::Setting),
        )),
        _ => {
            let len = enrich_policy_name(rest)?;
            Some(mode_keyword_or(
                LexerMode::Enrich,
                &rest[..len],
                Scan::new(TokenKind::EnrichPolicyName, len),
            ))
        }
    }
}

fn scan_show(rest: &str) -> Option<Scan> {
    match rest.as_bytes()[0] {
        b'|' => Some(Scan::with(TokenKind::Pipe, 1, Transition::Pop)),
        _ => {
            let len = word(rest);
            if len == 0 {
                return None;
            }
            Some(mode_keyword_or(
                LexerMode::Show,
                &rest[..len],
                Scan::new(TokenKind::Unknown, len),
            ))
        }
    }
}

fn scan_setting(rest: &str) -> Option<Scan> {
    match rest.as_bytes()[0] {
        b']' => Some(Scan::with(TokenKind::ClosingBracket, 1, Transition::Pop)),
        b':' => Some(Scan::new(TokenKind::Colon, 1)),
        _ => {
            let len = take_while(rest, |ch| {
                ch.is_ascii_alphanumeric() || matches!(ch, '@' | '.' | '_')
            });
            (len > 0).then(|| Scan::new(TokenKind::Setting, len))
        }
    }
}

fn scan_lookup(rest: &str) -> Option<Scan> {
    match rest.as_bytes()[0] {
        b'|' => Some(Scan::with(TokenKind::Pipe, 1, Transition::Pop)),
        b':' => Some(Scan::new(TokenKind::Colon, 1)),
        b',' => Some(Scan::new(TokenKind::Comma, 1)),
        b'"' => Some(scan_quoted_string(rest)),
        _ => {
            let len = unquoted_source(rest)?;
            if len == 1 && rest.starts_with('.') {
                return Some(Scan::new(TokenKind::Dot, 1));
            }
            Some(mode_keyword_or(
                LexerMode::Lookup,
                &rest[..len],
                Scan::new(TokenKind::UnquotedSource, len),
            ))
        }
    }
}

fn scan_lookup_field(rest: &str) -> Option<Scan> {
    match rest.as_bytes()[0] {
        b'|' => Some(Scan::with(TokenKind::Pipe, 1, Transition::PopTwice)),
        b',' => Some(Scan::new(TokenKind::Comma, 1)),
        b'.' => Some(Scan::new(TokenKind::Dot, 1)),
        b'`' if quoted_identifier(rest).is_none() => Some(unterminated_to_end(rest)),
        _ => id_pattern(rest).map(|len| Scan::new(TokenKind::IdPattern, len)),
    }
}

fn scan_metrics(rest: &str) -> Option<Scan> {
    let closing = Transition::Replace(LexerMode::ClosingMetrics);
    match rest.as_bytes()[0] {
        b'|' => Some(Scan::with(TokenKind::Pipe, 1, Transition::Pop)),
        b'"' => {
            let scan = scan_quoted_string(rest);
            if scan.kind == TokenKind::QuotedString {
                Some(Scan::with(scan.kind, scan.len, closing))
            } else {
                Some(scan)
            }
        }
        _ => unquoted_source(rest).map(|len| Scan::with(TokenKind::UnquotedSource, len, closing)),
    }
}

fn scan_closing_metrics(rest: &str) -> Option<Scan> {
    let metrics = Transition::Replace(LexerMode::Metrics);
    let expression = Transition::Replace(LexerMode::Expression);
    match rest.as_bytes()[0] {
        b':' => Some(Scan::with(TokenKind::Colon, 1, metrics)),
        b',' => Some(Scan::with(TokenKind::Comma, 1, metrics)),
        b'|' => Some(Scan::with(TokenKind::Pipe, 1, Transition::Pop)),
        b'`' => {
            let scan = scan_quoted_identifier(rest, TokenKind::QuotedIdentifier);
            if scan.kind == TokenKind::QuotedIdentifier {
                Some(Scan::with(scan.kind, scan.len, expression))
            } else {
                Some(scan)
            }
        }
        _ => {
            let len = unquoted_identifier(rest)?;
            Some(mode_keyword_or(
                LexerMode::ClosingMetrics,
                &rest[..len],
                Scan::with(TokenKind::UnquotedIdentifier, len, expression),
            ))
        }
    }
}

/// Returns the mode keyword for `word` when the mode declares one, else `fallback`.
fn mode_keyword_or(mode: LexerMode, word: &str, fallback: Scan) -> Scan {
    match keywords::lookup_mode_keyword(mode, word) {
        Some((kind, transition)) => Scan::with(kind, word.len(), transition),
        None => fallback,
    }
}

// ---------------------------------------------------------------------------
// Shared terminal matchers. Each returns a byte length.
// ---------------------------------------------------------------------------

/// Whitespace and comments are recognized the same way in every mode.
fn scan_trivia(rest: &str) -> Option<Scan> {
    let ws = take_while(rest, |ch| matches!(ch, ' ' | '\t' | '\r' | '\n'));
    if ws > 0 {
        return Some(Scan::new(TokenKind::Whitespace, ws));
    }
    if rest.starts_with("//") {
        return Some(Scan::new(TokenKind::LineComment, line_comment(rest)));
    }
    if rest.starts_with("/*") {
        return Some(match block_comment(rest) {
            Some(len) => Scan::new(TokenKind::MultilineComment, len),
            None => unterminated_to_end(rest),
        });
    }
    None
}

/// `//` up to and including the line terminator.
fn line_comment(rest: &str) -> usize {
    let body = rest[2..].find(['\r', '\n']).map_or(rest.len(), |i| i + 2);
    let mut len = body;
    if rest[len..].starts_with('\r') {
        len += 1;
    }
    if rest[len..].starts_with('\n') {
        len += 1;
    }
    len
}

/// Nested `/* ... */`. Returns `None` when unterminated.
fn block_comment(rest: &str) -> Option<usize> {
    let bytes = rest.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'/' && bytes.get(i + 1) == Some(&b'*') {
            depth += 1;
            i += 2;
        } else if bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/') {
            depth -= 1;
            i += 2;
            if depth == 0 {
                return Some(i);
            }
        } else {
            i += 1;
        }
    }
    None
}

/// A quoted string, or an unknown token up to the end of the line when it is
/// unterminated or holds an invalid escape.
fn scan_quoted_string(rest: &str) -> Scan {
    match quoted_string(rest) {
        Some(len) => Scan::new(TokenKind::QuotedString, len),
        None => {
            let len = rest.find(['\r', '\n']).unwrap_or(rest.len());
            Scan::new(TokenKind::Unknown, len)
        }
    }
}

/// `"..."` with escapes, or `"""..."""`; the longer alternative wins.
fn quoted_string(rest: &str) -> Option<usize> {
    let simple = simple_string(rest);
    let triple = triple_quoted_string(rest);
    match (simple, triple) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}

fn simple_string(rest: &str) -> Option<usize> {
    let bytes = rest.as_bytes();
    if bytes.first() != Some(&b'"') {
        return None;
    }
    let mut i = 1;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => return Some(i + 1),
            b'\\' => match bytes.get(i + 1) {
                Some(b't' | b'n' | b'r' | b'"' | b'\\') => i += 2,
                _ => return None,
            },
            b'\r' | b'\n' => return None,
            _ => i += 1,
        }
    }
    None
}

fn triple_quoted_string(rest: &str) -> Option<usize> {
    if !rest.starts_with("\"\"\"") {
        return None;
    }
    let close = rest[3..].find("\"\"\"")? + 3;
    let mut len = close + 3;
    for _ in 0..2 {
        if rest[len..].starts_with('"') {
            len += 1;
        }
    }
    Some(len)
}

/// A backtick-quoted identifier, or an unknown token to the end of input.
fn scan_quoted_identifier(rest: &str, kind: TokenKind) -> Scan {
    match quoted_identifier(rest) {
        Some(len) => Scan::new(kind, len),
        None => unterminated_to_end(rest),
    }
}

/// `` `...` `` where a doubled backtick escapes one backtick. The body is not empty.
fn quoted_identifier(rest: &str) -> Option<usize> {
    let bytes = rest.as_bytes();
    if bytes.first() != Some(&b'`') {
        return None;
    }
    let mut i = 1;
    let mut blocks = 0;
    while i < bytes.len() {
        if bytes[i] == b'`' {
            if bytes.get(i + 1) == Some(&b'`') {
                i += 2;
                blocks += 1;
                continue;
            }
            return (blocks > 0).then_some(i + 1);
        }
        i += 1;
        blocks += 1;
    }
    None
}

fn unterminated_to_end(rest: &str) -> Scan {
    Scan::new(TokenKind::Unknown, rest.len())
}

fn digits(rest: &str) -> usize {
    take_while(rest, |ch| ch.is_ascii_digit())
}

/// `E` `[+-]?` digits, case-insensitive.
fn exponent(rest: &str) -> Option<usize> {
    let bytes = rest.as_bytes();
    if !matches!(bytes.first(), Some(b'e' | b'E')) {
        return None;
    }
    let sign = usize::from(matches!(bytes.get(1), Some(b'+' | b'-')));
    let count = digits(&rest[1 + sign..]);
    (count > 0).then_some(1 + sign + count)
}

/// `DIGIT+ . DIGIT*`, `. DIGIT+`, either followed by an optional exponent, or
/// `DIGIT+ EXPONENT`.
fn decimal_literal(rest: &str) -> Option<usize> {
    let integer = digits(rest);
    let mut best = None;

    let mantissa = if rest[integer..].starts_with('.') {
        let fraction = digits(&rest[integer + 1..]);
        if integer == 0 && fraction == 0 {
            return None;
        }
        let len = integer + 1 + fraction;
        best = Some(len);
        len
    } else if integer > 0 {
        integer
    } else {
        return None;
    };

    if let Some(exp) = exponent(&rest[mantissa..]) {
        best = Some(mantissa + exp);
    }
    best
}

/// `LETTER BODY*` or `[_@] BODY+`, where BODY is a letter, digit or underscore.
fn unquoted_identifier(rest: &str) -> Option<usize> {
    let bytes = rest.as_bytes();
    let first = *bytes.first()?;
    let body = |b: &u8| b.is_ascii_alphanumeric() || *b == b'_';
    let tail = bytes[1..].iter().take_while(|b| body(b)).count();
    if first.is_ascii_alphabetic() {
        Some(1 + tail)
    } else if matches!(first, b'_' | b'@') && tail > 0 {
        Some(1 + tail)
    } else {
        None
    }
}

/// One or more unquoted patterns (identifier characters plus `*`) or quoted
/// identifiers, concatenated.
fn id_pattern(rest: &str) -> Option<usize> {
    let mut len = 0;
    loop {
        let part = unquoted_id_pattern(&rest[len..]).or_else(|| quoted_identifier(&rest[len..]));
        match part {
            Some(part) => len += part,
            None => break,
        }
    }
    (len > 0).then_some(len)
}

fn unquoted_id_pattern(rest: &str) -> Option<usize> {
    let bytes = rest.as_bytes();
    let first = *bytes.first()?;
    let body = |b: &u8| b.is_ascii_alphanumeric() || *b == b'_' || *b == b'*';
    let tail = bytes[1..].iter().take_while(|b| body(b)).count();
    if first.is_ascii_alphabetic() || first == b'*' {
        Some(1 + tail)
    } else if matches!(first, b'_' | b'@') && tail > 0 {
        Some(1 + tail)
    } else {
        None
    }
}

/// Source names: anything but `: " = | , [ ] / ` and whitespace, where a `/`
/// is allowed when it does not start a comment.
fn unquoted_source(rest: &str) -> Option<usize> {
    let mut len = 0;
    let mut chars = rest.char_indices().peekable();
    while let Some((i, ch)) = chars.next() {
        match ch {
            ':' | '"' | '=' | '|' | ',' | '[' | ']' | ' ' | '\t' | '\r' | '\n' => break,
            '/' => match chars.peek() {
                Some((j, next)) if !matches!(next, '*' | '/') => {
                    len = j + next.len_utf8();
                    chars.next();
                }
                _ => break,
            },
            _ => len = i + ch.len_utf8(),
        }
    }
    (len > 0).then_some(len)
}

/// Enrich policy names, optionally prefixed by a `mode:` qualifier.
fn enrich_policy_name(rest: &str) -> Option<usize> {
    let body = |ch: char| {
        !matches!(
            ch,
            '\\' | '/' | '?' | '"' | '<' | '>' | '|' | ' ' | ',' | '#' | '\t' | '\r' | '\n' | ':'
                | '[' | ']'
        )
    };
    let first = take_while(rest, body);
    if first == 0 {
        return None;
    }
    if rest[first..].starts_with(':') {
        let second = take_while(&rest[first + 1..], body);
        if second > 0 {
            return Some(first + 1 + second);
        }
    }
    Some(first)
}

/// `?`, `?name` or `?123`.
fn scan_param(rest: &str) -> Scan {
    let after = &rest[1..];
    let named = match after.as_bytes().first() {
        Some(b) if b.is_ascii_alphabetic() || *b == b'_' => {
            1 + take_while(after, |ch| ch.is_ascii_alphanumeric() || ch == '_')
        }
        Some(b) if b.is_ascii_digit() => 1 + digits(after),
        _ => 0,
    };
    if named > 0 {
        Scan::new(TokenKind::NamedOrPositionalParam, named)
    } else {
        Scan::new(TokenKind::Param, 1)
    }
}

/// Runs of characters that can start a command word in default mode.
fn command_word(rest: &str) -> usize {
    take_while(rest, |ch| {
        !matches!(ch, ' ' | '\r' | '\n' | '\t' | '[' | ']' | '/')
    })
}

fn word(rest: &str) -> usize {
    take_while(rest, |ch| ch.is_alphanumeric() || ch == '_')
}

fn take_while(rest: &str, pred: impl Fn(char) -> bool) -> usize {
    rest.char_indices()
        .find(|(_, ch)| !pred(*ch))
        .map_or(rest.len(), |(i, _)| i)
}

fn first_char_len(rest: &str) -> usize {
    rest.chars().next().map_or(0, char::len_utf8)
}

//! Token types and representations for query lexical analysis.

use crate::ast::Span;
use smol_str::SmolStr;
use std::fmt;

/// The kind of a lexical token.
///
/// Several kinds are produced by more than one lexer mode; a `,` is a `Comma`
/// whether it was scanned inside `FROM` sources or inside an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Command keywords
    Dissect,
    Drop,
    Enrich,
    Eval,
    Explain,
    From,
    Grok,
    Keep,
    Limit,
    MvExpand,
    Rename,
    Row,
    Show,
    Sort,
    Stats,
    Where,
    Meta,
    InlineStats,
    Lookup,
    Metrics,
    /// Any other word in command position.
    UnknownCommand,

    // Trivia (hidden channel)
    LineComment,
    MultilineComment,
    Whitespace,

    // Punctuation
    Colon,
    Pipe,
    Assign,
    CastOp,
    Comma,
    Dot,
    LParen,
    RParen,
    OpeningBracket,
    ClosingBracket,

    // Literals
    QuotedString,
    IntegerLiteral,
    DecimalLiteral,

    // Expression keywords
    By,
    And,
    Asc,
    Desc,
    False,
    First,
    In,
    Is,
    Last,
    Like,
    Not,
    Null,
    Nulls,
    Or,
    RLike,
    True,

    // Operators
    Eq,
    CiEq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    Plus,
    Minus,
    Asterisk,
    Slash,
    Percent,

    // Parameters
    Param,
    NamedOrPositionalParam,

    // Names
    UnquotedIdentifier,
    QuotedIdentifier,
    IdPattern,
    UnquotedSource,
    EnrichPolicyName,
    Setting,

    // Clause keywords
    Metadata,
    As,
    On,
    With,
    Info,
    Functions,

    /// Input no rule in the active mode could match.
    Unknown,
    Eof,
}

impl TokenKind {
    /// Returns true for the keywords that start a pipeline step.
    pub fn is_command(&self) -> bool {
        matches!(
            self,
            TokenKind::Dissect
                | TokenKind::Drop
                | TokenKind::Enrich
                | TokenKind::Eval
                | TokenKind::Explain
                | TokenKind::From
                | TokenKind::Grok
                | TokenKind::Keep
                | TokenKind::Limit
                | TokenKind::MvExpand
                | TokenKind::Rename
                | TokenKind::Row
                | TokenKind::Show
                | TokenKind::Sort
                | TokenKind::Stats
                | TokenKind::Where
                | TokenKind::Meta
                | TokenKind::InlineStats
                | TokenKind::Lookup
                | TokenKind::Metrics
        )
    }

    /// Returns true for whitespace and comments.
    pub fn is_trivia(&self) -> bool {
        matches!(
            self,
            TokenKind::LineComment | TokenKind::MultilineComment | TokenKind::Whitespace
        )
    }

    /// Returns true if this token kind is a literal.
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            TokenKind::QuotedString
                | TokenKind::IntegerLiteral
                | TokenKind::DecimalLiteral
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Null
        )
    }

    /// Returns true for comparison operators.
    pub fn is_comparison_operator(&self) -> bool {
        matches!(
            self,
            TokenKind::Eq
                | TokenKind::CiEq
                | TokenKind::Neq
                | TokenKind::Lt
                | TokenKind::Lte
                | TokenKind::Gt
                | TokenKind::Gte
        )
    }

    /// Returns true if this token kind is an operator.
    pub fn is_operator(&self) -> bool {
        self.is_comparison_operator()
            || matches!(
                self,
                TokenKind::Plus
                    | TokenKind::Minus
                    | TokenKind::Asterisk
                    | TokenKind::Slash
                    | TokenKind::Percent
                    | TokenKind::CastOp
                    | TokenKind::Assign
            )
    }

    /// Returns true for `?` and `?name` / `?1`.
    pub fn is_param(&self) -> bool {
        matches!(self, TokenKind::Param | TokenKind::NamedOrPositionalParam)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::Dissect => "DISSECT",
            TokenKind::Drop => "DROP",
            TokenKind::Enrich => "ENRICH",
            TokenKind::Eval => "EVAL",
            TokenKind::Explain => "EXPLAIN",
            TokenKind::From => "FROM",
            TokenKind::Grok => "GROK",
            TokenKind::Keep => "KEEP",
            TokenKind::Limit => "LIMIT",
            TokenKind::MvExpand => "MV_EXPAND",
            TokenKind::Rename => "RENAME",
            TokenKind::Row => "ROW",
            TokenKind::Show => "SHOW",
            TokenKind::Sort => "SORT",
            TokenKind::Stats => "STATS",
            TokenKind::Where => "WHERE",
            TokenKind::Meta => "META",
            TokenKind::InlineStats => "INLINESTATS",
            TokenKind::Lookup => "LOOKUP",
            TokenKind::Metrics => "METRICS",
            TokenKind::UnknownCommand => "unknown command",
            TokenKind::LineComment => "line comment",
            TokenKind::MultilineComment => "block comment",
            TokenKind::Whitespace => "whitespace",
            TokenKind::Colon => "':'",
            TokenKind::Pipe => "'|'",
            TokenKind::Assign => "'='",
            TokenKind::CastOp => "'::'",
            TokenKind::Comma => "','",
            TokenKind::Dot => "'.'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::OpeningBracket => "'['",
            TokenKind::ClosingBracket => "']'",
            TokenKind::QuotedString => "quoted string",
            TokenKind::IntegerLiteral => "integer literal",
            TokenKind::DecimalLiteral => "decimal literal",
            TokenKind::By => "BY",
            TokenKind::And => "AND",
            TokenKind::Asc => "ASC",
            TokenKind::Desc => "DESC",
            TokenKind::False => "FALSE",
            TokenKind::First => "FIRST",
            TokenKind::In => "IN",
            TokenKind::Is => "IS",
            TokenKind::Last => "LAST",
            TokenKind::Like => "LIKE",
            TokenKind::Not => "NOT",
            TokenKind::Null => "NULL",
            TokenKind::Nulls => "NULLS",
            TokenKind::Or => "OR",
            TokenKind::RLike => "RLIKE",
            TokenKind::True => "TRUE",
            TokenKind::Eq => "'=='",
            TokenKind::CiEq => "'=~'",
            TokenKind::Neq => "'!='",
            TokenKind::Lt => "'<'",
            TokenKind::Lte => "'<='",
            TokenKind::Gt => "'>'",
            TokenKind::Gte => "'>='",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Asterisk => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Percent => "'%'",
            TokenKind::Param => "'?'",
            TokenKind::NamedOrPositionalParam => "parameter",
            TokenKind::UnquotedIdentifier => "identifier",
            TokenKind::QuotedIdentifier => "quoted identifier",
            TokenKind::IdPattern => "identifier pattern",
            TokenKind::UnquotedSource => "source",
            TokenKind::EnrichPolicyName => "policy name",
            TokenKind::Setting => "setting",
            TokenKind::Metadata => "METADATA",
            TokenKind::As => "AS",
            TokenKind::On => "ON",
            TokenKind::With => "WITH",
            TokenKind::Info => "INFO",
            TokenKind::Functions => "FUNCTIONS",
            TokenKind::Unknown => "unrecognized input",
            TokenKind::Eof => "end of input",
        };
        f.write_str(text)
    }
}

/// Token channel: the parser only sees `Default` tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Default,
    Hidden,
}

/// A lexical token with its kind, raw text and source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The exact source text of the token.
    pub text: SmolStr,
    /// Default or hidden channel.
    pub channel: Channel,
    /// Byte range in the source text.
    pub span: Span,
    /// 1-based line of the first character.
    pub line: u32,
    /// 1-based column of the first character, counted in characters.
    pub column: u32,
}

impl Token {
    /// Creates a default-channel token at line 1, column 1.
    ///
    /// Mostly useful for tests that feed hand-built token streams.
    pub fn new(kind: TokenKind, span: Span, text: impl Into<SmolStr>) -> Self {
        let channel = if kind.is_trivia() {
            Channel::Hidden
        } else {
            Channel::Default
        };
        Self {
            kind,
            text: text.into(),
            channel,
            span,
            line: 1,
            column: 1,
        }
    }

    /// Returns true if the token is on the hidden channel.
    pub fn is_hidden(&self) -> bool {
        self.channel == Channel::Hidden
    }

    /// Returns the source slice covered by this token.
    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.span.clone()).unwrap_or("")
    }

    /// Describes the token for diagnostics: its text, or its kind at end of input.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Eof => "end of input".to_string(),
            _ => format!("'{}'", self.text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_creation() {
        let token = Token::new(TokenKind::From, 0..4, "from");
        assert_eq!(token.kind, TokenKind::From);
        assert_eq!(token.span, 0..4);
        assert_eq!(token.channel, Channel::Default);
        assert_eq!(token.slice("from logs"), "from");
    }

    #[test]
    fn trivia_tokens_are_hidden() {
        let token = Token::new(TokenKind::Whitespace, 0..1, " ");
        assert!(token.is_hidden());
        assert!(TokenKind::LineComment.is_trivia());
        assert!(!TokenKind::Pipe.is_trivia());
    }

    #[test]
    fn token_kind_classification() {
        assert!(TokenKind::From.is_command());
        assert!(TokenKind::Lookup.is_command());
        assert!(!TokenKind::UnknownCommand.is_command());
        assert!(TokenKind::Gte.is_comparison_operator());
        assert!(TokenKind::Percent.is_operator());
        assert!(TokenKind::DecimalLiteral.is_literal());
        assert!(TokenKind::NamedOrPositionalParam.is_param());
    }

    #[test]
    fn describe_uses_text() {
        assert_eq!(Token::new(TokenKind::Pipe, 0..1, "|").describe(), "'|'");
        assert_eq!(Token::new(TokenKind::Eof, 3..3, "").describe(), "end of input");
        assert_eq!(TokenKind::Pipe.to_string(), "'|'");
        assert_eq!(TokenKind::MvExpand.to_string(), "MV_EXPAND");
    }
}

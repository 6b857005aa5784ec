//! Pipe query parser with rich diagnostics.
//!
//! This library lexes and parses pipe-based queries such as
//! `FROM logs | WHERE status >= 500 | STATS count(*) BY host` into a typed
//! AST. Syntax errors never stop the parse: every problem becomes a
//! diagnostic, rendered through miette, and the affected command is kept as
//! incomplete.
//!
//! # Example
//!
//! ```
//! use esql_parser::{CommandKind, parse};
//!
//! let result = parse("FROM logs | WHERE status >= 500 | LIMIT 10");
//! assert!(result.diagnostics.is_empty());
//!
//! let names: Vec<_> = result.ast.commands.iter().map(|c| c.name()).collect();
//! assert_eq!(names, ["FROM", "WHERE", "LIMIT"]);
//! assert!(matches!(result.ast.commands[2].kind, CommandKind::Limit(Some(_))));
//!
//! // Rendering produces canonical text.
//! assert_eq!(result.ast.to_string(), "FROM logs | WHERE status >= 500 | LIMIT 10");
//! ```

pub mod ast;
pub mod builder;
pub mod diag;
pub mod lexer;
pub mod options;
pub mod parser;

// Re-export syntax span primitives.
pub use ast::{Command, CommandKind, Expression, Query, Span, Spanned};

pub use diag::{Diag, DiagLabel, DiagSeverity, LabelRole};
pub use lexer::token::{Token, TokenKind};
pub use lexer::{Lexer, LexerResult, tokenize};
pub use options::{ParseOptions, PreviewRule};
pub use parser::{ParseResult, parse_query};

/// Parses `source` with default options.
pub fn parse(source: &str) -> ParseResult {
    parse_query(source, &ParseOptions::default())
}

/// Parses `source` with the given options.
pub fn parse_with_options(source: &str, options: &ParseOptions) -> ParseResult {
    parse_query(source, options)
}

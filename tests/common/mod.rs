//! Common test utilities
//!
//! Shared helpers for the integration tests.
//!
//! # Diagnostic Helpers
//! - [`format_diagnostics`] - Format diagnostics for display in assertions
//! - [`assert_no_parse_errors`] - Assert that parsing produced no diagnostics
//! - [`assert_has_error_containing`] - Assert that an error message contains specific text
//!
//! # Parsing Helpers
//! - [`parse_cleanly`] - Parse source and return the query, panicking on diagnostics
//! - [`tokenize_cleanly`] - Tokenize source and return significant tokens
//! - [`command_names`] - Names of the parsed commands in order

#![allow(dead_code)]

use esql_parser::ast::Query;
use esql_parser::diag::{Diag, DiagSeverity};
use esql_parser::{ParseOptions, ParseResult, Token, TokenKind, parse_with_options, tokenize};

/// Options with preview syntax enabled.
pub fn preview() -> ParseOptions {
    ParseOptions::default().with_preview(true)
}

/// Format diagnostics for display in assertion messages.
pub fn format_diagnostics(diags: &[Diag]) -> String {
    diags
        .iter()
        .map(|diag| match &diag.code {
            Some(code) => format!("[{code}] {} at {:?}", diag.message, diag.span()),
            None => format!("{} at {:?}", diag.message, diag.span()),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Assert that a parse result contains no diagnostics (no errors or warnings).
///
/// # Panics
/// Panics if any diagnostics are present, showing the source and diagnostics.
pub fn assert_no_parse_errors(result: &ParseResult, source: &str) {
    assert!(
        result.diagnostics.is_empty(),
        "unexpected diagnostics for `{source}`:\n{}",
        format_diagnostics(&result.diagnostics)
    );
}

/// Assert that a parse result holds an error whose message contains `text`.
///
/// # Panics
/// Panics if no such error is found.
pub fn assert_has_error_containing(result: &ParseResult, text: &str) {
    let found = result
        .diagnostics
        .iter()
        .any(|d| d.severity == DiagSeverity::Error && d.message.contains(text));
    assert!(
        found,
        "expected error containing '{text}', but found:\n{}",
        format_diagnostics(&result.diagnostics)
    );
}

/// Codes of every diagnostic, in order.
pub fn diagnostic_codes(result: &ParseResult) -> Vec<String> {
    result
        .diagnostics
        .iter()
        .filter_map(|d| d.code.clone())
        .collect()
}

/// Parse source with `options` and return the query, panicking on diagnostics.
pub fn parse_cleanly_with(source: &str, options: &ParseOptions) -> Query {
    let result = parse_with_options(source, options);
    assert_no_parse_errors(&result, source);
    result.ast
}

/// Parse source with default options and return the query, panicking on
/// diagnostics.
pub fn parse_cleanly(source: &str) -> Query {
    parse_cleanly_with(source, &ParseOptions::default())
}

/// Tokenize source and return the non-hidden tokens, `Eof` included.
///
/// # Panics
/// Panics if tokenization produces any diagnostics.
pub fn tokenize_cleanly(source: &str, options: &ParseOptions) -> Vec<Token> {
    let result = tokenize(source, options);
    assert!(
        result.diagnostics.is_empty(),
        "unexpected lexer diagnostics for `{source}`:\n{}",
        format_diagnostics(&result.diagnostics)
    );
    result
        .tokens
        .into_iter()
        .filter(|token| !token.is_hidden())
        .collect()
}

/// Kinds of the non-hidden tokens of `source`.
pub fn significant_kinds(source: &str, options: &ParseOptions) -> Vec<TokenKind> {
    tokenize(source, options)
        .tokens
        .into_iter()
        .filter(|token| !token.is_hidden())
        .map(|token| token.kind)
        .collect()
}

/// Names of the parsed commands in order.
pub fn command_names(query: &Query) -> Vec<String> {
    query
        .commands
        .iter()
        .map(|command| command.name().to_string())
        .collect()
}

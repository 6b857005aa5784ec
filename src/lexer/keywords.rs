//! Keyword recognition per lexical mode.
//!
//! Keywords are case-insensitive. A word is only a keyword in the modes that
//! declare it; everywhere else it falls back to the mode's identifier-like rule.

use super::mode::{LexerMode, Transition};
use super::token::TokenKind;
use crate::options::{ParseOptions, PreviewRule};

/// Looks up a command keyword in default mode.
///
/// Returns the token kind and the mode pushed by the command. Preview commands
/// only match when their rule is enabled.
pub fn lookup_command(word: &str, options: &ParseOptions) -> Option<(TokenKind, LexerMode)> {
    let found = match word.to_ascii_lowercase().as_str() {
        "dissect" => (TokenKind::Dissect, LexerMode::Expression),
        "drop" => (TokenKind::Drop, LexerMode::Project),
        "enrich" => (TokenKind::Enrich, LexerMode::Enrich),
        "eval" => (TokenKind::Eval, LexerMode::Expression),
        "explain" => (TokenKind::Explain, LexerMode::Explain),
        "from" => (TokenKind::From, LexerMode::From),
        "grok" => (TokenKind::Grok, LexerMode::Expression),
        "keep" => (TokenKind::Keep, LexerMode::Project),
        "limit" => (TokenKind::Limit, LexerMode::Expression),
        "mv_expand" => (TokenKind::MvExpand, LexerMode::MvExpand),
        "rename" => (TokenKind::Rename, LexerMode::Rename),
        "row" => (TokenKind::Row, LexerMode::Expression),
        "show" => (TokenKind::Show, LexerMode::Show),
        "meta" => (TokenKind::Meta, LexerMode::Show),
        "sort" => (TokenKind::Sort, LexerMode::Expression),
        "stats" => (TokenKind::Stats, LexerMode::Expression),
        "where" => (TokenKind::Where, LexerMode::Expression),
        "inlinestats" if PreviewRule::InlineStats.is_enabled(options) => {
            (TokenKind::InlineStats, LexerMode::Expression)
        }
        "lookup" if PreviewRule::Lookup.is_enabled(options) => {
            (TokenKind::Lookup, LexerMode::Lookup)
        }
        "metrics" if PreviewRule::Metrics.is_enabled(options) => {
            (TokenKind::Metrics, LexerMode::Metrics)
        }
        _ => return None,
    };
    Some(found)
}

/// Looks up a keyword inside expression mode.
pub fn lookup_expression_keyword(word: &str) -> Option<TokenKind> {
    match word.to_ascii_lowercase().as_str() {
        "by" => Some(TokenKind::By),
        "and" => Some(TokenKind::And),
        "asc" => Some(TokenKind::Asc),
        "desc" => Some(TokenKind::Desc),
        "false" => Some(TokenKind::False),
        "first" => Some(TokenKind::First),
        "in" => Some(TokenKind::In),
        "is" => Some(TokenKind::Is),
        "last" => Some(TokenKind::Last),
        "like" => Some(TokenKind::Like),
        "not" => Some(TokenKind::Not),
        "null" => Some(TokenKind::Null),
        "nulls" => Some(TokenKind::Nulls),
        "or" => Some(TokenKind::Or),
        "rlike" => Some(TokenKind::RLike),
        "true" => Some(TokenKind::True),
        "where" => Some(TokenKind::Where),
        _ => None,
    }
}

/// Looks up a keyword that a non-expression mode declares ahead of its
/// identifier-like rule, together with the mode transition it triggers.
pub(crate) fn lookup_mode_keyword(mode: LexerMode, word: &str) -> Option<(TokenKind, Transition)> {
    let lower = word.to_ascii_lowercase();
    let found = match (mode, lower.as_str()) {
        (LexerMode::From, "metadata") => (TokenKind::Metadata, Transition::None),
        (LexerMode::Rename, "as") => (TokenKind::As, Transition::None),
        (LexerMode::Enrich, "on") => (TokenKind::On, Transition::Push(LexerMode::EnrichField)),
        (LexerMode::Enrich, "with") => {
            (TokenKind::With, Transition::Push(LexerMode::EnrichField))
        }
        (LexerMode::EnrichField, "with") => (TokenKind::With, Transition::None),
        (LexerMode::Show, "info") => (TokenKind::Info, Transition::None),
        (LexerMode::Show, "functions") => (TokenKind::Functions, Transition::None),
        (LexerMode::Lookup, "on") => (TokenKind::On, Transition::Push(LexerMode::LookupField)),
        (LexerMode::ClosingMetrics, "by") => {
            (TokenKind::By, Transition::Replace(LexerMode::Expression))
        }
        _ => return None,
    };
    Some(found)
}

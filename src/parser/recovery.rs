//! Error recovery and synchronization.
//!
//! A failed production leaves its partial node in place. Recovery then skips
//! tokens up to the next pipe, the end of input, or the `]` closing an
//! explained subquery, and records them in an `Error` node.

use crate::diag::Diag;
use crate::lexer::token::TokenKind;
use crate::parser::Parser;
use crate::parser::tree::{Rule, SyntaxNode};

/// Expected a specific construct.
pub(crate) const EXPECTED: &str = "P002";
/// Token not allowed where it appears.
pub(crate) const UNEXPECTED: &str = "P003";
/// Word in command position that names no command.
pub(crate) const UNKNOWN_COMMAND: &str = "P004";
/// Source command after a pipe, or processing command first.
pub(crate) const COMMAND_PLACEMENT: &str = "P005";
/// List literal mixing numeric, boolean and string items.
pub(crate) const LIST_TYPE_MISMATCH: &str = "P006";
/// Expression or subquery deeper than the parser's nesting limits.
pub(crate) const NESTED_TOO_DEEPLY: &str = "P007";
/// Deprecated syntax that still parses.
pub(crate) const DEPRECATED: &str = "W001";

impl Parser<'_> {
    /// Returns true at a pipe, end of input, or the `]` ending an explained subquery.
    pub(crate) fn at_sync_point(&mut self) -> bool {
        match self.stream.kind() {
            TokenKind::Pipe | TokenKind::Eof => true,
            TokenKind::ClosingBracket => self.explain_depth > 0,
            _ => false,
        }
    }

    /// Returns true where the current pipeline ends.
    pub(crate) fn at_query_end(&mut self) -> bool {
        match self.stream.kind() {
            TokenKind::Eof => true,
            TokenKind::ClosingBracket => self.explain_depth > 0,
            _ => false,
        }
    }

    /// Skips to the next synchronization point and attaches an `Error` node to
    /// `parent`.
    ///
    /// The error node starts where `parent` stopped growing, so tokens consumed
    /// by the failed production are covered by it.
    pub(crate) fn recover(&mut self, parent: &mut SyntaxNode) {
        let start = if parent.is_empty() {
            self.stream.current_start()
        } else {
            parent.span.end
        };
        let mut error = SyntaxNode::new(Rule::Error, start);
        let mut skipped = 0usize;
        while !self.at_sync_point() {
            error.push_token(self.stream.advance());
            skipped += 1;
        }
        let end = self.stream.previous_end().max(start);
        error.span = start..end;

        tracing::debug!(
            target: super::TRACE_TARGET,
            rule = ?parent.rule,
            skipped,
            start,
            end,
            "recovered at synchronization point"
        );
        parent.push_node(error);
    }

    pub(crate) fn report(&mut self, diag: Diag) {
        self.diagnostics.push(diag);
    }

    /// Reports the current token as unexpected in `context`.
    pub(crate) fn unexpected_token(&mut self, context: &str) {
        let token = self.stream.current().clone();
        let diag = Diag::error(format!("unexpected {} in {context}", token.describe()))
            .with_primary_label(token.span.clone(), format!("unexpected {}", token.kind))
            .with_code(UNEXPECTED);
        self.report(diag);
    }
}

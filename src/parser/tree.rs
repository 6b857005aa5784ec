//! Concrete parse tree.
//!
//! Grammar productions build [`SyntaxNode`]s tagged with a [`Rule`]. Nodes keep
//! the significant tokens they consumed, so the AST builder can lower them by
//! matching on rule tags and token kinds alone.

use crate::ast::Span;
use crate::lexer::token::{Token, TokenKind};
use std::fmt;

/// Grammar rule that produced a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    Query,

    // Source commands
    FromCommand,
    RowCommand,
    ShowCommand,
    MetaCommand,
    ExplainCommand,
    MetricsCommand,

    // Processing commands
    EvalCommand,
    WhereCommand,
    StatsCommand,
    InlineStatsCommand,
    LimitCommand,
    SortCommand,
    KeepCommand,
    DropCommand,
    RenameCommand,
    DissectCommand,
    GrokCommand,
    EnrichCommand,
    MvExpandCommand,
    LookupCommand,
    UnknownCommand,

    // Command parts
    Subquery,
    IndexPattern,
    Metadata,
    Fields,
    Aggregates,
    Grouping,
    Field,
    OrderExpression,
    QualifiedNamePatterns,
    QualifiedNamePattern,
    RenameClause,
    CommandOptions,
    CommandOption,
    Setting,
    EnrichWithClause,

    // Expressions
    LogicalNot,
    LogicalBinary,
    LogicalIn,
    IsNull,
    RegexMatch,
    MatchExpression,
    Comparison,
    ArithmeticUnary,
    ArithmeticBinary,
    Parenthesized,
    InlineCast,
    FunctionCall,
    QualifiedName,

    // Constants
    NullLiteral,
    NumericLiteral,
    TimeIntervalLiteral,
    BooleanLiteral,
    StringLiteral,
    InputParameter,
    ListLiteral,

    /// Tokens skipped while recovering from a syntax error.
    Error,
}

impl Rule {
    /// Returns true for the rules of pipeline commands.
    pub fn is_command(self) -> bool {
        matches!(
            self,
            Rule::FromCommand
                | Rule::RowCommand
                | Rule::ShowCommand
                | Rule::MetaCommand
                | Rule::ExplainCommand
                | Rule::MetricsCommand
                | Rule::EvalCommand
                | Rule::WhereCommand
                | Rule::StatsCommand
                | Rule::InlineStatsCommand
                | Rule::LimitCommand
                | Rule::SortCommand
                | Rule::KeepCommand
                | Rule::DropCommand
                | Rule::RenameCommand
                | Rule::DissectCommand
                | Rule::GrokCommand
                | Rule::EnrichCommand
                | Rule::MvExpandCommand
                | Rule::LookupCommand
                | Rule::UnknownCommand
        )
    }
}

/// A child of a [`SyntaxNode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxElement {
    Node(SyntaxNode),
    Token(Token),
}

impl SyntaxElement {
    pub fn span(&self) -> &Span {
        match self {
            SyntaxElement::Node(node) => &node.span,
            SyntaxElement::Token(token) => &token.span,
        }
    }
}

/// A node of the concrete parse tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    pub rule: Rule,
    pub children: Vec<SyntaxElement>,
    /// Covers every child; empty nodes sit at the position they were opened.
    pub span: Span,
}

impl SyntaxNode {
    /// Opens an empty node at byte offset `start`.
    pub fn new(rule: Rule, start: usize) -> Self {
        Self {
            rule,
            children: Vec::new(),
            span: start..start,
        }
    }

    /// Opens a node whose first child is `first`.
    pub fn wrap(rule: Rule, first: SyntaxNode) -> Self {
        let mut node = Self::new(rule, first.span.start);
        node.push_node(first);
        node
    }

    pub fn push_token(&mut self, token: Token) {
        self.extend(&token.span);
        self.children.push(SyntaxElement::Token(token));
    }

    pub fn push_node(&mut self, node: SyntaxNode) {
        self.extend(&node.span);
        self.children.push(SyntaxElement::Node(node));
    }

    fn extend(&mut self, span: &Span) {
        if self.children.is_empty() {
            self.span = span.clone();
        } else {
            self.span.start = self.span.start.min(span.start);
            self.span.end = self.span.end.max(span.end);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Child nodes in order.
    pub fn nodes(&self) -> impl Iterator<Item = &SyntaxNode> {
        self.children.iter().filter_map(|child| match child {
            SyntaxElement::Node(node) => Some(node),
            SyntaxElement::Token(_) => None,
        })
    }

    /// Direct tokens in order.
    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.children.iter().filter_map(|child| match child {
            SyntaxElement::Token(token) => Some(token),
            SyntaxElement::Node(_) => None,
        })
    }

    /// First child node tagged `rule`.
    pub fn child(&self, rule: Rule) -> Option<&SyntaxNode> {
        self.nodes().find(|node| node.rule == rule)
    }

    /// Child nodes tagged `rule`.
    pub fn children_of(&self, rule: Rule) -> impl Iterator<Item = &SyntaxNode> {
        self.nodes().filter(move |node| node.rule == rule)
    }

    /// First direct token of `kind`.
    pub fn token(&self, kind: TokenKind) -> Option<&Token> {
        self.tokens().find(|token| token.kind == kind)
    }

    pub fn has_token(&self, kind: TokenKind) -> bool {
        self.token(kind).is_some()
    }

    /// Returns true if an error node is a direct child.
    pub fn has_error(&self) -> bool {
        self.child(Rule::Error).is_some()
    }

    /// Returns true if an error node appears anywhere below this node.
    pub fn contains_error(&self) -> bool {
        self.nodes()
            .any(|node| node.rule == Rule::Error || node.contains_error())
    }

    /// Concatenates the text of every token below this node.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                SyntaxElement::Token(token) => out.push_str(&token.text),
                SyntaxElement::Node(node) => node.collect_text(out),
            }
        }
    }
}

/// Renders the tree as an s-expression, e.g. `(Query (FromCommand FROM (IndexPattern logs)))`.
impl fmt::Display for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:?}", self.rule)?;
        for child in &self.children {
            match child {
                SyntaxElement::Token(token) => write!(f, " {}", token.text)?,
                SyntaxElement::Node(node) => write!(f, " {node}")?,
            }
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spans_grow_with_children() {
        let mut node = SyntaxNode::new(Rule::Fields, 4);
        assert_eq!(node.span, 4..4);
        assert!(node.is_empty());

        node.push_token(Token::new(TokenKind::UnquotedIdentifier, 5..6, "a"));
        node.push_token(Token::new(TokenKind::Comma, 6..7, ","));
        assert_eq!(node.span, 5..7);

        let wrapped = SyntaxNode::wrap(Rule::Field, node);
        assert_eq!(wrapped.span, 5..7);
        assert_eq!(wrapped.text(), "a,");
    }

    #[test]
    fn lookups_by_rule_and_kind() {
        let mut error = SyntaxNode::new(Rule::Error, 3);
        error.push_token(Token::new(TokenKind::Unknown, 3..4, "#"));
        let mut command = SyntaxNode::new(Rule::WhereCommand, 0);
        command.push_token(Token::new(TokenKind::Where, 0..2, "WH"));
        command.push_node(error);

        assert!(command.has_token(TokenKind::Where));
        assert!(command.has_error());
        assert_eq!(command.child(Rule::Error).map(|n| n.span.clone()), Some(3..4));
        assert_eq!(command.to_string(), "(WhereCommand WH (Error #))");
    }
}

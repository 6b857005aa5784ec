//! Lowering of the parse tree to the typed AST.
//!
//! The builder matches on rule tags and token kinds only. It never reports
//! diagnostics: parts of a command that failed to parse are simply absent, and
//! the command is marked incomplete when its node holds an `Error` child.

mod expression;

pub use expression::{build_column_ref, build_expression, build_literal};

use crate::ast::{
    ColumnRef, Command, CommandKind, CommandOption, DissectCommand, EnrichCommand, EnrichField,
    EnrichPolicy, EnrichSetting, ExplainCommand, Expression, Field, FromCommand, GrokCommand,
    Identifier, IdentifierKind, Literal, LiteralKind, LookupCommand, MetricsCommand, NullsOrder,
    OrderExpression, Query, RenameClause, SortDirection, Source, Spanned, StatsCommand,
    unescape_string,
};
use crate::lexer::token::TokenKind;
use crate::parser::tree::{Rule, SyntaxNode};

/// Lowers a `Query` node.
pub fn build_query(node: &SyntaxNode) -> Query {
    let commands = node
        .nodes()
        .filter(|child| child.rule.is_command())
        .filter_map(build_command)
        .collect();
    Query {
        commands,
        span: node.span.clone(),
    }
}

fn build_command(node: &SyntaxNode) -> Option<Command> {
    let kind = match node.rule {
        Rule::FromCommand => CommandKind::From(FromCommand {
            sources: build_sources(node),
            metadata: node
                .child(Rule::Metadata)
                .map(build_metadata)
                .unwrap_or_default(),
        }),
        Rule::RowCommand => CommandKind::Row(build_fields(node.child(Rule::Fields))),
        Rule::EvalCommand => CommandKind::Eval(build_fields(node.child(Rule::Fields))),
        Rule::ShowCommand => CommandKind::Show,
        Rule::MetaCommand => CommandKind::Meta,
        Rule::ExplainCommand => CommandKind::Explain(build_explain(node)),
        Rule::MetricsCommand => CommandKind::Metrics(MetricsCommand {
            sources: build_sources(node),
            aggregates: build_fields(node.child(Rule::Aggregates)),
            grouping: build_fields(node.child(Rule::Grouping)),
        }),
        Rule::WhereCommand => CommandKind::Where(first_expression(node)),
        Rule::StatsCommand => CommandKind::Stats(build_stats(node)),
        Rule::InlineStatsCommand => CommandKind::InlineStats(build_stats(node)),
        Rule::LimitCommand => CommandKind::Limit(
            node.token(TokenKind::IntegerLiteral)
                .map(|token| Literal::new(LiteralKind::Integer, token.text.clone(), token.span.clone())),
        ),
        Rule::SortCommand => CommandKind::Sort(
            node.children_of(Rule::OrderExpression)
                .filter_map(build_order)
                .collect(),
        ),
        Rule::KeepCommand => CommandKind::Keep(build_patterns(node.child(Rule::QualifiedNamePatterns))),
        Rule::DropCommand => CommandKind::Drop(build_patterns(node.child(Rule::QualifiedNamePatterns))),
        Rule::RenameCommand => CommandKind::Rename(
            node.children_of(Rule::RenameClause)
                .filter_map(build_rename)
                .collect(),
        ),
        Rule::DissectCommand => {
            let (input, pattern) = build_input_and_pattern(node);
            let options = node
                .child(Rule::CommandOptions)
                .map(|options| options.children_of(Rule::CommandOption).filter_map(build_option).collect())
                .unwrap_or_default();
            CommandKind::Dissect(DissectCommand {
                input,
                pattern,
                options,
            })
        }
        Rule::GrokCommand => {
            let (input, pattern) = build_input_and_pattern(node);
            CommandKind::Grok(GrokCommand { input, pattern })
        }
        Rule::EnrichCommand => CommandKind::Enrich(build_enrich(node)),
        Rule::MvExpandCommand => {
            CommandKind::MvExpand(node.child(Rule::QualifiedName).and_then(build_column_ref))
        }
        Rule::LookupCommand => CommandKind::Lookup(LookupCommand {
            table: node.child(Rule::IndexPattern).and_then(build_source),
            on: build_patterns(node.child(Rule::QualifiedNamePatterns)),
        }),
        Rule::UnknownCommand => CommandKind::Unknown(node.tokens().next()?.text.clone()),
        _ => return None,
    };
    Some(Command {
        kind,
        span: node.span.clone(),
        incomplete: node.has_error(),
    })
}

fn first_expression(node: &SyntaxNode) -> Option<Expression> {
    node.nodes()
        .find(|child| child.rule != Rule::Error)
        .and_then(build_expression)
}

fn build_sources(node: &SyntaxNode) -> Vec<Source> {
    node.children_of(Rule::IndexPattern)
        .filter_map(build_source)
        .collect()
}

/// `cluster:index`, `index` or `"index"`.
fn build_source(node: &SyntaxNode) -> Option<Source> {
    let tokens: Vec<_> = node.tokens().collect();
    let (cluster, index) = match tokens.as_slice() {
        [cluster, colon, index] if colon.kind == TokenKind::Colon => (Some(cluster.text.clone()), *index),
        [index] => (None, *index),
        _ => return None,
    };
    let (name, quoted) = match index.kind {
        TokenKind::QuotedString => (unescape_string(&index.text)?.into(), true),
        TokenKind::UnquotedSource => (index.text.clone(), false),
        _ => return None,
    };
    Some(Source {
        cluster,
        index: name,
        quoted,
        span: node.span.clone(),
    })
}

fn build_metadata(node: &SyntaxNode) -> Vec<Identifier> {
    node.tokens()
        .filter(|token| token.kind == TokenKind::UnquotedSource)
        .map(|token| Identifier::new(token.text.clone(), IdentifierKind::Unquoted, token.span.clone()))
        .collect()
}

fn build_explain(node: &SyntaxNode) -> ExplainCommand {
    let query = node
        .child(Rule::Subquery)
        .and_then(|subquery| subquery.child(Rule::Query))
        .map(build_query)
        .unwrap_or_else(|| Query {
            commands: Vec::new(),
            span: node.span.end..node.span.end,
        });
    ExplainCommand {
        query: Box::new(query),
    }
}

fn build_fields(node: Option<&SyntaxNode>) -> Vec<Field> {
    node.map(|fields| fields.children_of(Rule::Field).filter_map(build_field).collect())
        .unwrap_or_default()
}

/// `name = value` or a bare value.
fn build_field(node: &SyntaxNode) -> Option<Field> {
    let mut parts = node.nodes().filter(|child| child.rule != Rule::Error);
    let first = parts.next()?;
    let (name, value) = if node.has_token(TokenKind::Assign) {
        (Some(build_column_ref(first)?), build_expression(parts.next()?)?)
    } else {
        (None, build_expression(first)?)
    };
    Some(Field {
        name,
        value,
        span: node.span.clone(),
    })
}

fn build_stats(node: &SyntaxNode) -> StatsCommand {
    StatsCommand {
        aggregates: build_fields(node.child(Rule::Aggregates)),
        grouping: build_fields(node.child(Rule::Grouping)),
    }
}

fn build_order(node: &SyntaxNode) -> Option<OrderExpression> {
    let expr = build_expression(node.nodes().next()?)?;
    let direction = node.tokens().find_map(|token| {
        let direction = match token.kind {
            TokenKind::Asc => SortDirection::Asc,
            TokenKind::Desc => SortDirection::Desc,
            _ => return None,
        };
        Some(Spanned::new(direction, token.span.clone()))
    });
    let nulls = node.tokens().find_map(|token| {
        let order = match token.kind {
            TokenKind::First => NullsOrder::First,
            TokenKind::Last => NullsOrder::Last,
            _ => return None,
        };
        Some(Spanned::new(order, token.span.clone()))
    });
    Some(OrderExpression {
        expr,
        direction,
        nulls,
        span: node.span.clone(),
    })
}

fn build_patterns(node: Option<&SyntaxNode>) -> Vec<ColumnRef> {
    node.map(|patterns| {
        patterns
            .children_of(Rule::QualifiedNamePattern)
            .filter_map(build_column_ref)
            .collect()
    })
    .unwrap_or_default()
}

fn build_rename(node: &SyntaxNode) -> Option<RenameClause> {
    let mut patterns = node.children_of(Rule::QualifiedNamePattern);
    let old = build_column_ref(patterns.next()?)?;
    let new = build_column_ref(patterns.next()?)?;
    Some(RenameClause {
        old,
        new,
        span: node.span.clone(),
    })
}

/// The input expression and pattern string shared by `DISSECT` and `GROK`.
fn build_input_and_pattern(node: &SyntaxNode) -> (Option<Expression>, Option<Literal>) {
    let mut parts = node
        .nodes()
        .filter(|child| !matches!(child.rule, Rule::Error | Rule::CommandOptions));
    let input = parts.next().and_then(build_expression);
    let pattern = parts.next().and_then(build_literal);
    (input, pattern)
}

fn build_option(node: &SyntaxNode) -> Option<CommandOption> {
    let name = node.tokens().next()?;
    let value = build_expression(node.nodes().next()?)?;
    Some(CommandOption {
        name: Identifier::from_text(&name.text, name.span.clone()),
        value,
        span: node.span.clone(),
    })
}

fn build_enrich(node: &SyntaxNode) -> EnrichCommand {
    let settings = node
        .children_of(Rule::Setting)
        .filter_map(|setting| {
            let mut values = setting.tokens().filter(|token| token.kind == TokenKind::Setting);
            let name = values.next()?;
            let value = values.next()?;
            Some(EnrichSetting {
                name: name.text.clone(),
                value: value.text.clone(),
                span: setting.span.clone(),
            })
        })
        .collect();
    let policy = node
        .token(TokenKind::EnrichPolicyName)
        .map(|token| EnrichPolicy::from_text(&token.text, token.span.clone()));
    let on = node
        .child(Rule::QualifiedNamePattern)
        .and_then(build_column_ref);
    let with = node
        .children_of(Rule::EnrichWithClause)
        .filter_map(|clause| {
            let mut patterns = clause.children_of(Rule::QualifiedNamePattern);
            let first = build_column_ref(patterns.next()?)?;
            let (new_name, field) = match patterns.next() {
                Some(second) => (Some(first), build_column_ref(second)?),
                None => (None, first),
            };
            Some(EnrichField {
                new_name,
                field,
                span: clause.span.clone(),
            })
        })
        .collect();
    EnrichCommand {
        settings,
        policy,
        on,
        with,
    }
}

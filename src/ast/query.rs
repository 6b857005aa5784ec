//! Query and command AST nodes.
//!
//! A query is a pipeline: one source command followed by processing commands,
//! separated by `|`. Commands recovered from a syntax error are kept with
//! `incomplete` set and whatever parts parsed successfully.

use crate::ast::expression::{Expression, Literal};
use crate::ast::references::{ColumnRef, Identifier, Source};
use crate::ast::{Span, Spanned};
use smol_str::SmolStr;

/// A parsed query.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub commands: Vec<Command>,
    pub span: Span,
}

impl Query {
    /// Returns true if any command, including those of explained subqueries,
    /// was recovered from a syntax error.
    pub fn has_incomplete_commands(&self) -> bool {
        self.commands.iter().any(|command| {
            command.incomplete
                || matches!(&command.kind, CommandKind::Explain(explain) if explain.query.has_incomplete_commands())
        })
    }
}

/// One pipeline step.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub kind: CommandKind,
    pub span: Span,
    /// Set when the command was recovered from a syntax error.
    pub incomplete: bool,
}

impl Command {
    /// Returns the command keyword as written in canonical form.
    pub fn name(&self) -> &str {
        self.kind.name()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandKind {
    From(FromCommand),
    Row(Vec<Field>),
    Show,
    /// `META FUNCTIONS`.
    Meta,
    Explain(ExplainCommand),
    Metrics(MetricsCommand),
    Eval(Vec<Field>),
    Where(Option<Expression>),
    Stats(StatsCommand),
    InlineStats(StatsCommand),
    Limit(Option<Literal>),
    Sort(Vec<OrderExpression>),
    Keep(Vec<ColumnRef>),
    Drop(Vec<ColumnRef>),
    Rename(Vec<RenameClause>),
    Dissect(DissectCommand),
    Grok(GrokCommand),
    Enrich(EnrichCommand),
    MvExpand(Option<ColumnRef>),
    Lookup(LookupCommand),
    /// A word in command position that names no command.
    Unknown(SmolStr),
}

impl CommandKind {
    pub fn name(&self) -> &str {
        match self {
            CommandKind::From(_) => "FROM",
            CommandKind::Row(_) => "ROW",
            CommandKind::Show => "SHOW",
            CommandKind::Meta => "META",
            CommandKind::Explain(_) => "EXPLAIN",
            CommandKind::Metrics(_) => "METRICS",
            CommandKind::Eval(_) => "EVAL",
            CommandKind::Where(_) => "WHERE",
            CommandKind::Stats(_) => "STATS",
            CommandKind::InlineStats(_) => "INLINESTATS",
            CommandKind::Limit(_) => "LIMIT",
            CommandKind::Sort(_) => "SORT",
            CommandKind::Keep(_) => "KEEP",
            CommandKind::Drop(_) => "DROP",
            CommandKind::Rename(_) => "RENAME",
            CommandKind::Dissect(_) => "DISSECT",
            CommandKind::Grok(_) => "GROK",
            CommandKind::Enrich(_) => "ENRICH",
            CommandKind::MvExpand(_) => "MV_EXPAND",
            CommandKind::Lookup(_) => "LOOKUP",
            CommandKind::Unknown(name) => name,
        }
    }

    /// Returns true for commands that can start a query.
    pub fn is_source(&self) -> bool {
        matches!(
            self,
            CommandKind::From(_)
                | CommandKind::Row(_)
                | CommandKind::Show
                | CommandKind::Meta
                | CommandKind::Explain(_)
                | CommandKind::Metrics(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FromCommand {
    pub sources: Vec<Source>,
    /// Metadata fields requested with `METADATA`.
    pub metadata: Vec<Identifier>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExplainCommand {
    pub query: Box<Query>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricsCommand {
    pub sources: Vec<Source>,
    pub aggregates: Vec<Field>,
    pub grouping: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatsCommand {
    pub aggregates: Vec<Field>,
    pub grouping: Vec<Field>,
}

/// `name = value` or a bare expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: Option<ColumnRef>,
    pub value: Expression,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NullsOrder {
    First,
    Last,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderExpression {
    pub expr: Expression,
    pub direction: Option<Spanned<SortDirection>>,
    pub nulls: Option<Spanned<NullsOrder>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenameClause {
    pub old: ColumnRef,
    pub new: ColumnRef,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DissectCommand {
    pub input: Option<Expression>,
    pub pattern: Option<Literal>,
    pub options: Vec<CommandOption>,
}

/// `name = constant` option of `DISSECT`, such as `append_separator = "-"`.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOption {
    pub name: Identifier,
    pub value: Expression,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GrokCommand {
    pub input: Option<Expression>,
    pub pattern: Option<Literal>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnrichCommand {
    pub settings: Vec<EnrichSetting>,
    pub policy: Option<EnrichPolicy>,
    /// Match field given with `ON`.
    pub on: Option<ColumnRef>,
    pub with: Vec<EnrichField>,
}

/// `[name:value]` before the policy name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichSetting {
    pub name: SmolStr,
    pub value: SmolStr,
    pub span: Span,
}

/// Policy name, optionally prefixed by a mode such as `_any:`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichPolicy {
    pub mode: Option<SmolStr>,
    pub name: SmolStr,
    pub span: Span,
}

impl EnrichPolicy {
    /// Splits `mode:name` policy text.
    pub fn from_text(text: &str, span: Span) -> Self {
        match text.split_once(':') {
            Some((mode, name)) => Self {
                mode: Some(mode.into()),
                name: name.into(),
                span,
            },
            None => Self {
                mode: None,
                name: text.into(),
                span,
            },
        }
    }
}

/// `WITH` clause entry: `new_name = field` or `field`.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichField {
    pub new_name: Option<ColumnRef>,
    pub field: ColumnRef,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LookupCommand {
    pub table: Option<Source>,
    pub on: Vec<ColumnRef>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enrich_policy_mode_prefix() {
        let policy = EnrichPolicy::from_text("_remote:hosts", 0..13);
        assert_eq!(policy.mode.as_deref(), Some("_remote"));
        assert_eq!(policy.name, "hosts");
        assert_eq!(EnrichPolicy::from_text("hosts", 0..5).mode, None);
    }

    #[test]
    fn source_commands() {
        assert!(CommandKind::Show.is_source());
        assert!(!CommandKind::Where(None).is_source());
        assert_eq!(CommandKind::MvExpand(None).name(), "MV_EXPAND");
        assert_eq!(CommandKind::Unknown("frm".into()).name(), "frm");
    }
}

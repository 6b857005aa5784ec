//! Typed syntax tree for pipe queries.

pub mod display;
pub mod expression;
pub mod query;
pub mod references;
mod span;
pub mod visit;

pub use span::{Span, Spanned, contains, merge_spans};

pub use expression::{
    ArithmeticOperator, ComparisonOperator, Expression, FunctionCall, InExpression, InlineCast,
    LikeExpression, Literal, LiteralKind, LogicalOperator, MatchExpression, PatternKind,
    UnaryOperator, unescape_string,
};
pub use query::{
    Command, CommandKind, CommandOption, DissectCommand, EnrichCommand, EnrichField,
    EnrichPolicy, EnrichSetting, ExplainCommand, Field, FromCommand, GrokCommand, LookupCommand,
    MetricsCommand, NullsOrder, OrderExpression, Query, RenameClause, SortDirection,
    StatsCommand,
};
pub use references::{ColumnRef, Identifier, IdentifierKind, Parameter, Source};

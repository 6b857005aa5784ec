//! Canonical query text.
//!
//! Rendering uses upper-case keywords, single spaces around operators and
//! `", "` between list items. Parenthesized expressions are kept as parsed, so
//! rendering a parsed query and parsing the result yields the same tree.

use crate::ast::expression::{
    ArithmeticOperator, ComparisonOperator, Expression, Literal, LiteralKind, LogicalOperator,
    PatternKind, UnaryOperator,
};
use crate::ast::query::{
    Command, CommandKind, CommandOption, EnrichField, EnrichPolicy, EnrichSetting, Field,
    NullsOrder, OrderExpression, Query, RenameClause, SortDirection, StatsCommand,
};
use crate::ast::references::{ColumnRef, Identifier, IdentifierKind, Parameter, Source};
use std::fmt::{self, Display, Formatter};

fn write_list<T: Display>(f: &mut Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

/// Quotes `value` as a single-line string literal.
pub fn quote_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}

impl Display for Query {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, command) in self.commands.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            write!(f, "{command}")?;
        }
        Ok(())
    }
}

impl Display for Command {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl Display for CommandKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())?;
        match self {
            CommandKind::From(from) => {
                if !from.sources.is_empty() {
                    f.write_str(" ")?;
                    write_list(f, &from.sources)?;
                }
                if !from.metadata.is_empty() {
                    f.write_str(" METADATA ")?;
                    write_list(f, &from.metadata)?;
                }
                Ok(())
            }
            CommandKind::Row(fields) | CommandKind::Eval(fields) => write_spaced(f, fields),
            CommandKind::Show => f.write_str(" INFO"),
            CommandKind::Meta => f.write_str(" FUNCTIONS"),
            CommandKind::Explain(explain) => write!(f, " [{}]", explain.query),
            CommandKind::Metrics(metrics) => {
                if !metrics.sources.is_empty() {
                    f.write_str(" ")?;
                    write_list(f, &metrics.sources)?;
                }
                write_aggregation(f, &metrics.aggregates, &metrics.grouping)
            }
            CommandKind::Where(condition) => match condition {
                Some(condition) => write!(f, " {condition}"),
                None => Ok(()),
            },
            CommandKind::Stats(StatsCommand {
                aggregates,
                grouping,
            })
            | CommandKind::InlineStats(StatsCommand {
                aggregates,
                grouping,
            }) => write_aggregation(f, aggregates, grouping),
            CommandKind::Limit(count) => match count {
                Some(count) => write!(f, " {count}"),
                None => Ok(()),
            },
            CommandKind::Sort(orders) => write_spaced(f, orders),
            CommandKind::Keep(columns) | CommandKind::Drop(columns) => write_spaced(f, columns),
            CommandKind::Rename(clauses) => write_spaced(f, clauses),
            CommandKind::Dissect(dissect) => {
                write_optional(f, dissect.input.as_ref())?;
                write_optional(f, dissect.pattern.as_ref())?;
                write_spaced(f, &dissect.options)
            }
            CommandKind::Grok(grok) => {
                write_optional(f, grok.input.as_ref())?;
                write_optional(f, grok.pattern.as_ref())
            }
            CommandKind::Enrich(enrich) => {
                for setting in &enrich.settings {
                    write!(f, " {setting}")?;
                }
                write_optional(f, enrich.policy.as_ref())?;
                if let Some(on) = &enrich.on {
                    write!(f, " ON {on}")?;
                }
                if !enrich.with.is_empty() {
                    f.write_str(" WITH ")?;
                    write_list(f, &enrich.with)?;
                }
                Ok(())
            }
            CommandKind::MvExpand(column) => write_optional(f, column.as_ref()),
            CommandKind::Lookup(lookup) => {
                write_optional(f, lookup.table.as_ref())?;
                if !lookup.on.is_empty() {
                    f.write_str(" ON ")?;
                    write_list(f, &lookup.on)?;
                }
                Ok(())
            }
            CommandKind::Unknown(_) => Ok(()),
        }
    }
}

fn write_spaced<T: Display>(f: &mut Formatter<'_>, items: &[T]) -> fmt::Result {
    if items.is_empty() {
        return Ok(());
    }
    f.write_str(" ")?;
    write_list(f, items)
}

fn write_optional<T: Display>(f: &mut Formatter<'_>, item: Option<&T>) -> fmt::Result {
    match item {
        Some(item) => write!(f, " {item}"),
        None => Ok(()),
    }
}

fn write_aggregation(f: &mut Formatter<'_>, aggregates: &[Field], grouping: &[Field]) -> fmt::Result {
    write_spaced(f, aggregates)?;
    if !grouping.is_empty() {
        f.write_str(" BY ")?;
        write_list(f, grouping)?;
    }
    Ok(())
}

impl Display for Field {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            write!(f, "{name} = ")?;
        }
        write!(f, "{}", self.value)
    }
}

impl Display for OrderExpression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)?;
        match self.direction.as_ref().map(|d| d.node) {
            Some(SortDirection::Asc) => f.write_str(" ASC")?,
            Some(SortDirection::Desc) => f.write_str(" DESC")?,
            None => {}
        }
        match self.nulls.as_ref().map(|n| n.node) {
            Some(NullsOrder::First) => f.write_str(" NULLS FIRST"),
            Some(NullsOrder::Last) => f.write_str(" NULLS LAST"),
            None => Ok(()),
        }
    }
}

impl Display for RenameClause {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} AS {}", self.old, self.new)
    }
}

impl Display for CommandOption {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.name, self.value)
    }
}

impl Display for EnrichSetting {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:{}]", self.name, self.value)
    }
}

impl Display for EnrichPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.mode {
            Some(mode) => write!(f, "{mode}:{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

impl Display for EnrichField {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(new_name) = &self.new_name {
            write!(f, "{new_name} = ")?;
        }
        write!(f, "{}", self.field)
    }
}

impl Display for Source {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(cluster) = &self.cluster {
            write!(f, "{cluster}:")?;
        }
        if self.quoted {
            f.write_str(&quote_string(&self.index))
        } else {
            f.write_str(&self.index)
        }
    }
}

impl Display for Identifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.kind {
            IdentifierKind::Quoted => write!(f, "`{}`", self.name.replace('`', "``")),
            IdentifierKind::Unquoted | IdentifierKind::Parameter => f.write_str(&self.name),
        }
    }
}

impl Display for ColumnRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{part}")?;
        }
        Ok(())
    }
}

impl Display for Parameter {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Parameter::Unnamed => f.write_str("?"),
            Parameter::Named(name) => write!(f, "?{name}"),
            Parameter::Positional(index) => write!(f, "?{index}"),
        }
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.kind {
            LiteralKind::Null => f.write_str("NULL"),
            LiteralKind::Boolean => match self.as_bool() {
                Some(true) => f.write_str("TRUE"),
                _ => f.write_str("FALSE"),
            },
            _ => f.write_str(&self.text),
        }
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(literal) => write!(f, "{literal}"),
            Expression::Column(column) => write!(f, "{column}"),
            Expression::Parameter(param, _) => write!(f, "{param}"),
            Expression::FunctionCall(call) => {
                write!(f, "{}(", call.name)?;
                write_list(f, &call.args)?;
                f.write_str(")")
            }
            Expression::Wildcard(_) => f.write_str("*"),
            Expression::List(items, _) => {
                f.write_str("[")?;
                write_list(f, items)?;
                f.write_str("]")
            }
            Expression::Unary(op, operand, _) => {
                let sign = match op {
                    UnaryOperator::Plus => "+",
                    UnaryOperator::Minus => "-",
                };
                write!(f, "{sign}{operand}")
            }
            Expression::Binary(op, left, right, _) => {
                let op = match op {
                    ArithmeticOperator::Add => "+",
                    ArithmeticOperator::Subtract => "-",
                    ArithmeticOperator::Multiply => "*",
                    ArithmeticOperator::Divide => "/",
                    ArithmeticOperator::Modulo => "%",
                };
                write!(f, "{left} {op} {right}")
            }
            Expression::Comparison(op, left, right, _) => {
                let op = match op {
                    ComparisonOperator::Equal => "==",
                    ComparisonOperator::InsensitiveEqual => "=~",
                    ComparisonOperator::NotEqual => "!=",
                    ComparisonOperator::LessThan => "<",
                    ComparisonOperator::LessThanOrEqual => "<=",
                    ComparisonOperator::GreaterThan => ">",
                    ComparisonOperator::GreaterThanOrEqual => ">=",
                };
                write!(f, "{left} {op} {right}")
            }
            Expression::Logical(op, left, right, _) => {
                let op = match op {
                    LogicalOperator::And => "AND",
                    LogicalOperator::Or => "OR",
                };
                write!(f, "{left} {op} {right}")
            }
            Expression::Not(operand, _) => write!(f, "NOT {operand}"),
            Expression::In(expr) => {
                write!(f, "{}", expr.value)?;
                f.write_str(if expr.negated { " NOT IN (" } else { " IN (" })?;
                write_list(f, &expr.list)?;
                f.write_str(")")
            }
            Expression::Like(expr) => {
                let keyword = match expr.kind {
                    PatternKind::Like => "LIKE",
                    PatternKind::RLike => "RLIKE",
                };
                let not = if expr.negated { "NOT " } else { "" };
                write!(f, "{} {not}{keyword} {}", expr.value, expr.pattern)
            }
            Expression::IsNull(value, negated, _) => {
                let not = if *negated { "NOT " } else { "" };
                write!(f, "{value} IS {not}NULL")
            }
            Expression::Match(expr) => write!(f, "{} : {}", expr.field, expr.query),
            Expression::InlineCast(cast) => write!(f, "{}::{}", cast.value, cast.data_type),
            Expression::Parenthesized(inner, _) => write!(f, "({inner})"),
        }
    }
}

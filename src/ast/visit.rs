//! Immutable AST visitor.
//!
//! Override the `visit_*` methods of interest and call the matching `walk_*`
//! function to continue into children. Returning `ControlFlow::Break` stops
//! the traversal.

use std::ops::ControlFlow;

use crate::ast::expression::Expression;
use crate::ast::query::{Command, CommandKind, Field, Query};

macro_rules! try_visit {
    ($expr:expr) => {
        match $expr {
            ControlFlow::Continue(()) => {}
            ControlFlow::Break(b) => return ControlFlow::Break(b),
        }
    };
}

pub type VisitResult<B> = ControlFlow<B>;

pub trait Visit {
    /// Early-exit payload produced when traversal stops.
    type Break;

    fn visit_query(&mut self, query: &Query) -> VisitResult<Self::Break> {
        walk_query(self, query)
    }

    fn visit_command(&mut self, command: &Command) -> VisitResult<Self::Break> {
        walk_command(self, command)
    }

    fn visit_field(&mut self, field: &Field) -> VisitResult<Self::Break> {
        walk_field(self, field)
    }

    fn visit_expression(&mut self, expression: &Expression) -> VisitResult<Self::Break> {
        walk_expression(self, expression)
    }
}

pub fn walk_query<V: Visit + ?Sized>(visitor: &mut V, query: &Query) -> VisitResult<V::Break> {
    for command in &query.commands {
        try_visit!(visitor.visit_command(command));
    }
    ControlFlow::Continue(())
}

pub fn walk_command<V: Visit + ?Sized>(
    visitor: &mut V,
    command: &Command,
) -> VisitResult<V::Break> {
    match &command.kind {
        CommandKind::Row(fields) | CommandKind::Eval(fields) => {
            for field in fields {
                try_visit!(visitor.visit_field(field));
            }
        }
        CommandKind::Explain(explain) => try_visit!(visitor.visit_query(&explain.query)),
        CommandKind::Metrics(metrics) => {
            for field in metrics.aggregates.iter().chain(&metrics.grouping) {
                try_visit!(visitor.visit_field(field));
            }
        }
        CommandKind::Stats(stats) | CommandKind::InlineStats(stats) => {
            for field in stats.aggregates.iter().chain(&stats.grouping) {
                try_visit!(visitor.visit_field(field));
            }
        }
        CommandKind::Where(Some(condition)) => try_visit!(visitor.visit_expression(condition)),
        CommandKind::Sort(orders) => {
            for order in orders {
                try_visit!(visitor.visit_expression(&order.expr));
            }
        }
        CommandKind::Dissect(dissect) => {
            if let Some(input) = &dissect.input {
                try_visit!(visitor.visit_expression(input));
            }
            for option in &dissect.options {
                try_visit!(visitor.visit_expression(&option.value));
            }
        }
        CommandKind::Grok(grok) => {
            if let Some(input) = &grok.input {
                try_visit!(visitor.visit_expression(input));
            }
        }
        CommandKind::From(_)
        | CommandKind::Show
        | CommandKind::Meta
        | CommandKind::Where(None)
        | CommandKind::Limit(_)
        | CommandKind::Keep(_)
        | CommandKind::Drop(_)
        | CommandKind::Rename(_)
        | CommandKind::Enrich(_)
        | CommandKind::MvExpand(_)
        | CommandKind::Lookup(_)
        | CommandKind::Unknown(_) => {}
    }
    ControlFlow::Continue(())
}

pub fn walk_field<V: Visit + ?Sized>(visitor: &mut V, field: &Field) -> VisitResult<V::Break> {
    visitor.visit_expression(&field.value)
}

pub fn walk_expression<V: Visit + ?Sized>(
    visitor: &mut V,
    expression: &Expression,
) -> VisitResult<V::Break> {
    for child in expression.children() {
        try_visit!(visitor.visit_expression(child));
    }
    ControlFlow::Continue(())
}

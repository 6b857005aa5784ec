//! Lowering of expression and constant nodes.

use crate::ast::{
    ArithmeticOperator, ColumnRef, ComparisonOperator, Expression, FunctionCall, Identifier,
    InExpression, InlineCast, LikeExpression, Literal, LiteralKind, LogicalOperator,
    MatchExpression, Parameter, PatternKind, UnaryOperator,
};
use crate::lexer::token::TokenKind;
use crate::parser::tree::{Rule, SyntaxNode};

/// Lowers an expression node. Returns `None` for error nodes and for nodes
/// missing a required operand.
pub fn build_expression(node: &SyntaxNode) -> Option<Expression> {
    let span = node.span.clone();
    let mut operands = node.nodes().filter(|child| child.rule != Rule::Error);

    let expr = match node.rule {
        Rule::QualifiedName => Expression::Column(build_column_ref(node)?),
        Rule::NullLiteral
        | Rule::BooleanLiteral
        | Rule::StringLiteral
        | Rule::NumericLiteral
        | Rule::TimeIntervalLiteral => Expression::Literal(build_literal(node)?),
        Rule::InputParameter => {
            let token = node.tokens().next()?;
            Expression::Parameter(Parameter::from_text(&token.text), span)
        }
        Rule::ListLiteral => {
            let items = node.nodes().filter_map(build_literal).collect();
            Expression::List(items, span)
        }
        Rule::FunctionCall => Expression::FunctionCall(build_function_call(node)?),
        Rule::Parenthesized => {
            Expression::Parenthesized(Box::new(build_expression(operands.next()?)?), span)
        }
        Rule::LogicalNot => Expression::Not(Box::new(build_expression(operands.next()?)?), span),
        Rule::LogicalBinary => {
            let op = if node.has_token(TokenKind::And) {
                LogicalOperator::And
            } else {
                LogicalOperator::Or
            };
            let left = build_expression(operands.next()?)?;
            let right = build_expression(operands.next()?)?;
            Expression::Logical(op, Box::new(left), Box::new(right), span)
        }
        Rule::Comparison => {
            let op = node.tokens().find_map(|token| comparison_operator(token.kind))?;
            let left = build_expression(operands.next()?)?;
            let right = build_expression(operands.next()?)?;
            Expression::Comparison(op, Box::new(left), Box::new(right), span)
        }
        Rule::ArithmeticBinary => {
            let op = node.tokens().find_map(|token| arithmetic_operator(token.kind))?;
            let left = build_expression(operands.next()?)?;
            let right = build_expression(operands.next()?)?;
            Expression::Binary(op, Box::new(left), Box::new(right), span)
        }
        Rule::ArithmeticUnary => {
            let op = if node.has_token(TokenKind::Minus) {
                UnaryOperator::Minus
            } else {
                UnaryOperator::Plus
            };
            Expression::Unary(op, Box::new(build_expression(operands.next()?)?), span)
        }
        Rule::LogicalIn => {
            let value = build_expression(operands.next()?)?;
            let list: Vec<_> = operands.filter_map(build_expression).collect();
            if list.is_empty() {
                return None;
            }
            Expression::In(InExpression {
                value: Box::new(value),
                list,
                negated: node.has_token(TokenKind::Not),
                span,
            })
        }
        Rule::RegexMatch => {
            let kind = if node.has_token(TokenKind::RLike) {
                PatternKind::RLike
            } else {
                PatternKind::Like
            };
            let value = build_expression(operands.next()?)?;
            let pattern = build_literal(operands.next()?)?;
            Expression::Like(LikeExpression {
                value: Box::new(value),
                kind,
                pattern,
                negated: node.has_token(TokenKind::Not),
                span,
            })
        }
        Rule::IsNull => {
            let value = build_expression(operands.next()?)?;
            Expression::IsNull(Box::new(value), node.has_token(TokenKind::Not), span)
        }
        Rule::MatchExpression => {
            let field = build_column_ref(operands.next()?)?;
            let query = build_expression(operands.next()?)?;
            Expression::Match(MatchExpression {
                field,
                query: Box::new(query),
                span,
            })
        }
        Rule::InlineCast => {
            let value = build_expression(operands.next()?)?;
            let data_type = node
                .tokens()
                .filter(|token| {
                    matches!(
                        token.kind,
                        TokenKind::UnquotedIdentifier | TokenKind::QuotedIdentifier
                    )
                })
                .last()?;
            Expression::InlineCast(InlineCast {
                value: Box::new(value),
                data_type: Identifier::from_text(&data_type.text, data_type.span.clone()),
                span,
            })
        }
        _ => return None,
    };
    Some(expr)
}

fn build_function_call(node: &SyntaxNode) -> Option<FunctionCall> {
    let name = node.tokens().next()?;
    let args = match node.token(TokenKind::Asterisk) {
        Some(star) => vec![Expression::Wildcard(star.span.clone())],
        None => node.nodes().filter_map(build_expression).collect(),
    };
    Some(FunctionCall {
        name: Identifier::from_text(&name.text, name.span.clone()),
        args,
        span: node.span.clone(),
    })
}

/// Lowers a constant node. Signed numbers keep their sign in the text and time
/// intervals are normalized to `value unit`.
pub fn build_literal(node: &SyntaxNode) -> Option<Literal> {
    let span = node.span.clone();
    let literal = match node.rule {
        Rule::NullLiteral => Literal::new(LiteralKind::Null, node.text(), span),
        Rule::BooleanLiteral => Literal::new(LiteralKind::Boolean, node.text(), span),
        Rule::StringLiteral => {
            let token = node.token(TokenKind::QuotedString)?;
            Literal::new(LiteralKind::String, token.text.clone(), span)
        }
        Rule::NumericLiteral => {
            let kind = if node.has_token(TokenKind::DecimalLiteral) {
                LiteralKind::Decimal
            } else if node.has_token(TokenKind::IntegerLiteral) {
                LiteralKind::Integer
            } else {
                return None;
            };
            Literal::new(kind, node.text(), span)
        }
        Rule::TimeIntervalLiteral => {
            let sign = node
                .tokens()
                .find(|token| matches!(token.kind, TokenKind::Plus | TokenKind::Minus))
                .map_or("", |token| token.text.as_str());
            let value = node.token(TokenKind::IntegerLiteral)?;
            let unit = node.token(TokenKind::UnquotedIdentifier)?;
            Literal::new(
                LiteralKind::TimeInterval,
                format!("{sign}{} {}", value.text, unit.text),
                span,
            )
        }
        _ => return None,
    };
    Some(literal)
}

/// Lowers a `QualifiedName` or `QualifiedNamePattern` node.
pub fn build_column_ref(node: &SyntaxNode) -> Option<ColumnRef> {
    if !matches!(node.rule, Rule::QualifiedName | Rule::QualifiedNamePattern) {
        return None;
    }
    let parts: Vec<_> = node
        .tokens()
        .filter(|token| token.kind != TokenKind::Dot)
        .map(|token| Identifier::from_text(&token.text, token.span.clone()))
        .collect();
    if parts.is_empty() {
        return None;
    }
    Some(ColumnRef::new(parts, node.span.clone()))
}

fn comparison_operator(kind: TokenKind) -> Option<ComparisonOperator> {
    let op = match kind {
        TokenKind::Eq => ComparisonOperator::Equal,
        TokenKind::CiEq => ComparisonOperator::InsensitiveEqual,
        TokenKind::Neq => ComparisonOperator::NotEqual,
        TokenKind::Lt => ComparisonOperator::LessThan,
        TokenKind::Lte => ComparisonOperator::LessThanOrEqual,
        TokenKind::Gt => ComparisonOperator::GreaterThan,
        TokenKind::Gte => ComparisonOperator::GreaterThanOrEqual,
        _ => return None,
    };
    Some(op)
}

fn arithmetic_operator(kind: TokenKind) -> Option<ArithmeticOperator> {
    let op = match kind {
        TokenKind::Plus => ArithmeticOperator::Add,
        TokenKind::Minus => ArithmeticOperator::Subtract,
        TokenKind::Asterisk => ArithmeticOperator::Multiply,
        TokenKind::Slash => ArithmeticOperator::Divide,
        TokenKind::Percent => ArithmeticOperator::Modulo,
        _ => return None,
    };
    Some(op)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::CommandKind;
    use crate::parse;

    fn eval_value(source: &str) -> Expression {
        let result = parse(source);
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
        match result.ast.commands.into_iter().nth(1).map(|c| c.kind) {
            Some(CommandKind::Eval(mut fields)) => fields.remove(0).value,
            other => panic!("expected EVAL, got {other:?}"),
        }
    }

    #[test]
    fn numeric_literal_kinds() {
        match eval_value("ROW a = 1 | EVAL 3.14") {
            Expression::Literal(literal) => {
                assert_eq!(literal.kind, LiteralKind::Decimal);
                assert_eq!(literal.text, "3.14");
            }
            other => panic!("unexpected {other:?}"),
        }
        match eval_value("ROW a = 1 | EVAL -42") {
            Expression::Literal(literal) => {
                assert_eq!(literal.kind, LiteralKind::Integer);
                assert_eq!(literal.text, "-42");
                assert_eq!(literal.span, 17..20);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn signed_number_text_is_normalized() {
        let source = "ROW a = 1 | EVAL - 42";
        match eval_value(source) {
            Expression::Literal(literal) => {
                assert_eq!(literal.kind, LiteralKind::Integer);
                assert_eq!(literal.text, "-42");
                assert_eq!(&source[literal.span], "- 42");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn time_interval_text_is_normalized() {
        let source = "ROW a = 1 | EVAL 2   hours";
        match eval_value(source) {
            Expression::Literal(literal) => {
                assert_eq!(literal.kind, LiteralKind::TimeInterval);
                assert_eq!(literal.text, "2 hours");
                assert_eq!(literal.interval_parts(), Some(("2", "hours")));
                assert_eq!(&source[literal.span], "2   hours");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn wildcard_argument() {
        match eval_value("ROW a = 1 | EVAL count(*)") {
            Expression::FunctionCall(call) => {
                assert_eq!(call.name.name, "count");
                assert!(matches!(call.args.as_slice(), [Expression::Wildcard(span)] if *span == (23..24)));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn operators_and_predicates() {
        match eval_value("ROW a = 1 | EVAL a + 1 > 2 AND b NOT LIKE \"x*\"") {
            Expression::Logical(LogicalOperator::And, left, right, _) => {
                assert!(matches!(
                    *left,
                    Expression::Comparison(ComparisonOperator::GreaterThan, ..)
                ));
                match *right {
                    Expression::Like(like) => {
                        assert!(like.negated);
                        assert_eq!(like.kind, PatternKind::Like);
                        assert_eq!(like.pattern.string_value().as_deref(), Some("x*"));
                    }
                    other => panic!("unexpected {other:?}"),
                }
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn quoted_column_parts() {
        match eval_value("ROW a = 1 | EVAL `a b`.c") {
            Expression::Column(column) => {
                assert_eq!(column.name(), "a b.c");
                assert_eq!(column.parts.len(), 2);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn error_nodes_do_not_lower() {
        let error = SyntaxNode::new(Rule::Error, 0);
        assert_eq!(build_expression(&error), None);
        assert_eq!(build_literal(&error), None);
        assert_eq!(build_column_ref(&error), None);
    }
}

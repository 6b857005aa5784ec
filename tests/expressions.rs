mod common;

use common::{parse_cleanly, parse_cleanly_with, preview};
use esql_parser::ast::{
    ArithmeticOperator, CommandKind, ComparisonOperator, Expression, LiteralKind,
    LogicalOperator, Parameter, UnaryOperator,
};

/// Value of the single field of `ROW <expr>`.
fn row_value(expr: &str) -> Expression {
    let query = parse_cleanly(&format!("ROW {expr}"));
    match query.commands.into_iter().next().map(|c| c.kind) {
        Some(CommandKind::Row(mut fields)) => fields.remove(0).value,
        other => panic!("expected ROW, got {other:?}"),
    }
}

fn where_condition(condition: &str) -> Expression {
    let query = parse_cleanly(&format!("FROM t | WHERE {condition}"));
    match query.commands.into_iter().nth(1).map(|c| c.kind) {
        Some(CommandKind::Where(Some(expr))) => expr,
        other => panic!("expected WHERE, got {other:?}"),
    }
}

#[test]
fn decimal_literal_keeps_lexeme() {
    let query = parse_cleanly("ROW x = 3.14");
    let CommandKind::Row(fields) = &query.commands[0].kind else {
        panic!("expected ROW");
    };
    assert_eq!(fields[0].name.as_ref().map(|n| n.name()).as_deref(), Some("x"));
    let Expression::Literal(literal) = &fields[0].value else {
        panic!("expected literal");
    };
    assert_eq!(literal.kind, LiteralKind::Decimal);
    assert_eq!(literal.text, "3.14");
}

#[test]
fn numeric_forms() {
    for (text, kind) in [
        ("1", LiteralKind::Integer),
        ("1.", LiteralKind::Decimal),
        (".5", LiteralKind::Decimal),
        ("1e10", LiteralKind::Decimal),
        ("2.5E-3", LiteralKind::Decimal),
    ] {
        let Expression::Literal(literal) = row_value(text) else {
            panic!("expected literal for {text}");
        };
        assert_eq!(literal.kind, kind, "{text}");
        assert_eq!(literal.text, text);
    }
}

#[test]
fn arithmetic_precedence_and_associativity() {
    let Expression::Binary(ArithmeticOperator::Subtract, left, right, _) = row_value("10 - 2 - 3")
    else {
        panic!("expected subtraction");
    };
    assert!(matches!(*left, Expression::Binary(ArithmeticOperator::Subtract, ..)));
    assert!(matches!(*right, Expression::Literal(_)));

    let Expression::Binary(ArithmeticOperator::Add, _, right, _) = row_value("1 + 2 % 3") else {
        panic!("expected addition");
    };
    assert!(matches!(*right, Expression::Binary(ArithmeticOperator::Modulo, ..)));
}

#[test]
fn unary_minus_on_columns() {
    let Expression::Unary(UnaryOperator::Minus, operand, _) = row_value("-a") else {
        panic!("expected unary minus");
    };
    assert!(matches!(*operand, Expression::Column(_)));
}

#[test]
fn logical_operators() {
    let Expression::Logical(LogicalOperator::Or, left, right, _) =
        where_condition("a == 1 OR NOT b =~ \"x\" AND c != 2")
    else {
        panic!("expected OR");
    };
    assert!(matches!(*left, Expression::Comparison(ComparisonOperator::Equal, ..)));
    let Expression::Logical(LogicalOperator::And, not, _, _) = *right else {
        panic!("expected AND");
    };
    let Expression::Not(inner, _) = *not else {
        panic!("expected NOT");
    };
    assert!(matches!(*inner, Expression::Comparison(ComparisonOperator::InsensitiveEqual, ..)));
}

#[test]
fn in_list() {
    let Expression::In(expr) = where_condition("status NOT IN (200, 201 + 1, code)") else {
        panic!("expected IN");
    };
    assert!(expr.negated);
    assert_eq!(expr.list.len(), 3);
}

#[test]
fn parenthesized_expressions_are_kept() {
    let Expression::Binary(ArithmeticOperator::Multiply, left, _, _) = row_value("(1 + 2) * 3")
    else {
        panic!("expected multiplication");
    };
    assert!(matches!(*left, Expression::Parenthesized(..)));
}

#[test]
fn inline_casts_chain() {
    let Expression::InlineCast(outer) = row_value("\"1\"::integer::long") else {
        panic!("expected cast");
    };
    assert_eq!(outer.data_type.name, "long");
    assert!(matches!(*outer.value, Expression::InlineCast(_)));
}

#[test]
fn parameters() {
    let query = parse_cleanly("ROW a = ?, b = ?name, c = ?1");
    let CommandKind::Row(fields) = &query.commands[0].kind else {
        panic!("expected ROW");
    };
    let params: Vec<_> = fields
        .iter()
        .map(|f| match &f.value {
            Expression::Parameter(param, _) => param.clone(),
            other => panic!("expected parameter, got {other:?}"),
        })
        .collect();
    assert_eq!(
        params,
        [
            Parameter::Unnamed,
            Parameter::Named("name".into()),
            Parameter::Positional("1".into()),
        ]
    );
}

#[test]
fn list_literals() {
    let Expression::List(items, _) = row_value("[true, false]") else {
        panic!("expected list");
    };
    assert!(items.iter().all(|item| item.kind == LiteralKind::Boolean));

    let Expression::List(items, _) = row_value("[\"a\", \"b\", \"c\"]") else {
        panic!("expected list");
    };
    assert_eq!(items.len(), 3);
}

#[test]
fn triple_quoted_strings_are_verbatim() {
    let Expression::Literal(literal) = row_value("\"\"\"a \\n \"quoted\" b\"\"\"") else {
        panic!("expected literal");
    };
    assert_eq!(literal.string_value().as_deref(), Some("a \\n \"quoted\" b"));
}

#[test]
fn match_operator_with_preview() {
    let query = parse_cleanly_with("FROM t | WHERE message : \"error\"", &preview());
    let CommandKind::Where(Some(Expression::Match(expr))) = &query.commands[1].kind else {
        panic!("expected match");
    };
    assert_eq!(expr.field.name(), "message");
}

#[test]
fn function_params_with_preview() {
    let query = parse_cleanly_with("ROW a = ?fn(1)", &preview());
    let CommandKind::Row(fields) = &query.commands[0].kind else {
        panic!("expected ROW");
    };
    let Expression::FunctionCall(call) = &fields[0].value else {
        panic!("expected call");
    };
    assert_eq!(call.name.name, "?fn");
    assert_eq!(call.args.len(), 1);
}

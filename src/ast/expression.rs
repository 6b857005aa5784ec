//! Expression AST nodes.
//!
//! Expressions appear in `ROW`, `EVAL`, `WHERE`, `STATS`, `SORT` and the
//! input positions of `DISSECT` and `GROK`. Every node keeps the span it was
//! parsed from and literals keep their source text.

use crate::ast::references::{ColumnRef, Identifier, Parameter};
use crate::ast::Span;
use smol_str::SmolStr;

// ============================================================================
// Expression
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Constant value.
    Literal(Literal),

    /// Column reference (`a.b`).
    Column(ColumnRef),

    /// Parameter placeholder in constant position.
    Parameter(Parameter, Span),

    /// Function call.
    FunctionCall(FunctionCall),

    /// `*` as the only argument of a function call (`count(*)`).
    Wildcard(Span),

    /// Homogeneous list of constants (`[1, 2, 3]`).
    List(Vec<Literal>, Span),

    /// Unary sign applied to a non-literal operand.
    Unary(UnaryOperator, Box<Expression>, Span),

    /// Arithmetic expression.
    Binary(ArithmeticOperator, Box<Expression>, Box<Expression>, Span),

    /// Comparison expression.
    Comparison(ComparisonOperator, Box<Expression>, Box<Expression>, Span),

    /// `AND` / `OR`.
    Logical(LogicalOperator, Box<Expression>, Box<Expression>, Span),

    /// `NOT expr`.
    Not(Box<Expression>, Span),

    /// `expr [NOT] IN (...)`.
    In(InExpression),

    /// `expr [NOT] LIKE|RLIKE "pattern"`.
    Like(LikeExpression),

    /// `expr IS [NOT] NULL`.
    IsNull(Box<Expression>, bool, Span),

    /// Full-text `field : "query"`.
    Match(MatchExpression),

    /// `expr::type`.
    InlineCast(InlineCast),

    /// `(expr)`.
    Parenthesized(Box<Expression>, Span),
}

impl Expression {
    /// Returns the span of this expression.
    pub fn span(&self) -> Span {
        match self {
            Expression::Literal(literal) => literal.span.clone(),
            Expression::Column(column) => column.span.clone(),
            Expression::Parameter(_, span) => span.clone(),
            Expression::FunctionCall(call) => call.span.clone(),
            Expression::Wildcard(span) => span.clone(),
            Expression::List(_, span) => span.clone(),
            Expression::Unary(_, _, span) => span.clone(),
            Expression::Binary(_, _, _, span) => span.clone(),
            Expression::Comparison(_, _, _, span) => span.clone(),
            Expression::Logical(_, _, _, span) => span.clone(),
            Expression::Not(_, span) => span.clone(),
            Expression::In(expr) => expr.span.clone(),
            Expression::Like(expr) => expr.span.clone(),
            Expression::IsNull(_, _, span) => span.clone(),
            Expression::Match(expr) => expr.span.clone(),
            Expression::InlineCast(cast) => cast.span.clone(),
            Expression::Parenthesized(_, span) => span.clone(),
        }
    }

    /// Returns the direct sub-expressions in source order.
    pub fn children(&self) -> Vec<&Expression> {
        match self {
            Expression::Literal(_)
            | Expression::Column(_)
            | Expression::Parameter(..)
            | Expression::Wildcard(_)
            | Expression::List(..) => Vec::new(),
            Expression::FunctionCall(call) => call.args.iter().collect(),
            Expression::Unary(_, operand, _)
            | Expression::Not(operand, _)
            | Expression::IsNull(operand, _, _)
            | Expression::Parenthesized(operand, _) => vec![operand.as_ref()],
            Expression::Binary(_, left, right, _)
            | Expression::Comparison(_, left, right, _)
            | Expression::Logical(_, left, right, _) => vec![left.as_ref(), right.as_ref()],
            Expression::In(expr) => std::iter::once(expr.value.as_ref())
                .chain(expr.list.iter())
                .collect(),
            Expression::Like(expr) => vec![expr.value.as_ref()],
            Expression::Match(expr) => vec![expr.query.as_ref()],
            Expression::InlineCast(cast) => vec![cast.value.as_ref()],
        }
    }
}

// ============================================================================
// Literals
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    Null,
    Boolean,
    Integer,
    Decimal,
    String,
    /// Integer followed by a unit (`1 day`).
    TimeInterval,
}

/// A constant with its normalized text.
///
/// `text` is not always a slice of the query. Numeric text includes a leading
/// sign when one was folded into the literal, with any whitespace after the
/// sign dropped (`- 42` becomes `-42`). Time interval text is the value and
/// unit separated by one space (`2   hours` becomes `2 hours`). String text
/// keeps its quotes and escapes; see [`Literal::string_value`]. The raw
/// lexeme is always `&source[span]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    pub kind: LiteralKind,
    pub text: SmolStr,
    pub span: Span,
}

impl Literal {
    pub fn new(kind: LiteralKind, text: impl Into<SmolStr>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.kind, LiteralKind::Integer | LiteralKind::Decimal)
    }

    /// Returns the unescaped value of a string literal.
    pub fn string_value(&self) -> Option<String> {
        if self.kind == LiteralKind::String {
            unescape_string(&self.text)
        } else {
            None
        }
    }

    /// Returns the boolean value of a boolean literal.
    pub fn as_bool(&self) -> Option<bool> {
        match self.kind {
            LiteralKind::Boolean => Some(self.text.eq_ignore_ascii_case("true")),
            _ => None,
        }
    }

    /// Splits a time interval literal into its value and unit.
    pub fn interval_parts(&self) -> Option<(&str, &str)> {
        match self.kind {
            LiteralKind::TimeInterval => self.text.split_once(' '),
            _ => None,
        }
    }
}

/// Decodes a quoted string lexeme.
///
/// Triple-quoted strings are taken verbatim. Single-quoted strings resolve the
/// `\t \n \r \" \\` escapes. Returns `None` when `text` is not a string lexeme.
pub fn unescape_string(text: &str) -> Option<String> {
    if text.len() >= 6 && text.starts_with("\"\"\"") && text.ends_with("\"\"\"") {
        return Some(text[3..text.len() - 3].to_string());
    }
    let inner = text.strip_prefix('"')?.strip_suffix('"')?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next()? {
            't' => out.push('\t'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            '"' => out.push('"'),
            '\\' => out.push('\\'),
            _ => return None,
        }
    }
    Some(out)
}

// ============================================================================
// Operators
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Plus,
    Minus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    Equal,
    /// `=~`, case-insensitive equality.
    InsensitiveEqual,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOperator {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternKind {
    Like,
    RLike,
}

// ============================================================================
// Compound expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: Identifier,
    /// Arguments; `count(*)` holds a single [`Expression::Wildcard`].
    pub args: Vec<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InExpression {
    pub value: Box<Expression>,
    pub list: Vec<Expression>,
    pub negated: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LikeExpression {
    pub value: Box<Expression>,
    pub kind: PatternKind,
    pub pattern: Literal,
    pub negated: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchExpression {
    pub field: ColumnRef,
    pub query: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InlineCast {
    pub value: Box<Expression>,
    pub data_type: Identifier,
    pub span: Span,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unescape_simple_strings() {
        assert_eq!(unescape_string(r#""a\tb""#).as_deref(), Some("a\tb"));
        assert_eq!(unescape_string(r#""q\"q""#).as_deref(), Some("q\"q"));
        assert_eq!(unescape_string(r#""bad\x""#), None);
        assert_eq!(unescape_string("plain"), None);
    }

    #[test]
    fn unescape_triple_quoted_is_verbatim() {
        assert_eq!(
            unescape_string("\"\"\"a\\n\"b\"\"\"\"").as_deref(),
            Some("a\\n\"b\"")
        );
        assert_eq!(unescape_string("\"\"").as_deref(), Some(""));
    }

    #[test]
    fn literal_accessors() {
        let interval = Literal::new(LiteralKind::TimeInterval, "1 day", 0..5);
        assert_eq!(interval.interval_parts(), Some(("1", "day")));

        let flag = Literal::new(LiteralKind::Boolean, "TRUE", 0..4);
        assert_eq!(flag.as_bool(), Some(true));

        let number = Literal::new(LiteralKind::Decimal, "-3.5", 0..4);
        assert!(number.is_numeric());
        assert_eq!(number.string_value(), None);
    }

    #[test]
    fn children_follow_source_order() {
        let left = Expression::Literal(Literal::new(LiteralKind::Integer, "1", 0..1));
        let right = Expression::Literal(Literal::new(LiteralKind::Integer, "2", 4..5));
        let sum = Expression::Binary(
            ArithmeticOperator::Add,
            Box::new(left.clone()),
            Box::new(right.clone()),
            0..5,
        );
        assert_eq!(sum.children(), vec![&left, &right]);
        assert_eq!(sum.span(), 0..5);
    }
}

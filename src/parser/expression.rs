//! Expression productions.
//!
//! Precedence climbs from `OR` down to primaries. Every production returns the
//! node it built; the caller decides where to attach it.

use crate::diag::Diag;
use crate::lexer::token::TokenKind;
use crate::options::PreviewRule;
use crate::parser::Parser;
use crate::parser::base::ParseResult;
use crate::parser::recovery::{LIST_TYPE_MISMATCH, UNEXPECTED};
use crate::parser::tree::{Rule, SyntaxNode};

/// Item class of a list literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListClass {
    Numeric,
    Boolean,
    String,
}

impl ListClass {
    fn of(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::IntegerLiteral
            | TokenKind::DecimalLiteral
            | TokenKind::Plus
            | TokenKind::Minus => Some(ListClass::Numeric),
            TokenKind::True | TokenKind::False => Some(ListClass::Boolean),
            TokenKind::QuotedString => Some(ListClass::String),
            _ => None,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            ListClass::Numeric => "numeric",
            ListClass::Boolean => "boolean",
            ListClass::String => "string",
        }
    }
}

fn is_numeric(kind: TokenKind) -> bool {
    matches!(kind, TokenKind::IntegerLiteral | TokenKind::DecimalLiteral)
}

impl Parser<'_> {
    pub(crate) fn parse_boolean_expression(&mut self) -> ParseResult<SyntaxNode> {
        self.parse_or_expression()
    }

    fn parse_or_expression(&mut self) -> ParseResult<SyntaxNode> {
        self.parse_chain(Rule::LogicalBinary, &[TokenKind::Or], Self::parse_and_expression)
    }

    fn parse_and_expression(&mut self) -> ParseResult<SyntaxNode> {
        self.parse_chain(Rule::LogicalBinary, &[TokenKind::And], Self::parse_not_expression)
    }

    /// Folds `operand (op operand)*` into a left-deep `rule` chain. Every link
    /// counts toward the tree depth limit until the chain is complete.
    fn parse_chain(
        &mut self,
        rule: Rule,
        operators: &[TokenKind],
        operand: fn(&mut Self) -> ParseResult<SyntaxNode>,
    ) -> ParseResult<SyntaxNode> {
        let base = self.depth;
        let result = self.fold_chain(rule, operators, operand);
        self.depth = base;
        result
    }

    fn fold_chain(
        &mut self,
        rule: Rule,
        operators: &[TokenKind],
        operand: fn(&mut Self) -> ParseResult<SyntaxNode>,
    ) -> ParseResult<SyntaxNode> {
        let mut left = operand(self)?;
        while self.stream.at_any(operators) {
            self.deepen("expression")?;
            let mut node = SyntaxNode::wrap(rule, left);
            node.push_token(self.stream.advance());
            node.push_node(operand(self)?);
            left = node;
        }
        Ok(left)
    }

    fn parse_not_expression(&mut self) -> ParseResult<SyntaxNode> {
        if self.stream.check(TokenKind::Not) {
            let mut node = SyntaxNode::new(Rule::LogicalNot, self.stream.current_start());
            node.push_token(self.stream.advance());
            node.push_node(self.nested("expression", Self::parse_not_expression)?);
            return Ok(node);
        }
        self.parse_predicate()
    }

    /// A value expression optionally followed by `IN`, `LIKE`, `RLIKE`, `IS NULL`
    /// or the match operator.
    fn parse_predicate(&mut self) -> ParseResult<SyntaxNode> {
        let value = self.parse_value_expression()?;
        let negated = self.stream.check(TokenKind::Not)
            && matches!(
                self.stream.peek_kind(),
                TokenKind::In | TokenKind::Like | TokenKind::RLike
            );
        let kind = if negated {
            self.stream.peek_kind()
        } else {
            self.stream.kind()
        };

        match kind {
            TokenKind::In => {
                let mut node = SyntaxNode::wrap(Rule::LogicalIn, value);
                if negated {
                    node.push_token(self.stream.advance());
                }
                node.push_token(self.stream.advance());
                node.push_token(self.stream.expect(TokenKind::LParen)?);
                loop {
                    node.push_node(self.parse_value_expression()?);
                    match self.stream.consume(TokenKind::Comma) {
                        Some(comma) => node.push_token(comma),
                        None => break,
                    }
                }
                node.push_token(self.stream.expect(TokenKind::RParen)?);
                Ok(node)
            }
            TokenKind::Like | TokenKind::RLike => {
                let mut node = SyntaxNode::wrap(Rule::RegexMatch, value);
                if negated {
                    node.push_token(self.stream.advance());
                }
                node.push_token(self.stream.advance());
                let pattern = self.stream.expect_described(TokenKind::QuotedString, "pattern string")?;
                let mut literal = SyntaxNode::new(Rule::StringLiteral, pattern.span.start);
                literal.push_token(pattern);
                node.push_node(literal);
                Ok(node)
            }
            TokenKind::Is => {
                let mut node = SyntaxNode::wrap(Rule::IsNull, value);
                node.push_token(self.stream.advance());
                if let Some(not) = self.stream.consume(TokenKind::Not) {
                    node.push_token(not);
                }
                node.push_token(self.stream.expect(TokenKind::Null)?);
                Ok(node)
            }
            TokenKind::Colon => {
                if value.rule != Rule::QualifiedName {
                    let colon = self.stream.current_span();
                    return Err(Box::new(
                        Diag::error("the match operator needs a field name on its left")
                            .with_primary_label(colon, "match operator")
                            .with_secondary_label(value.span.clone(), "not a field name")
                            .with_code(UNEXPECTED),
                    ));
                }
                let mut node = SyntaxNode::wrap(Rule::MatchExpression, value);
                node.push_token(self.stream.advance());
                node.push_node(self.parse_constant()?);
                Ok(node)
            }
            _ => Ok(value),
        }
    }

    /// `operatorExpression (comparisonOperator operatorExpression)?`
    fn parse_value_expression(&mut self) -> ParseResult<SyntaxNode> {
        let left = self.parse_additive_expression()?;
        if !self.stream.kind().is_comparison_operator() {
            return Ok(left);
        }
        let mut node = SyntaxNode::wrap(Rule::Comparison, left);
        node.push_token(self.stream.advance());
        node.push_node(self.parse_additive_expression()?);

        if self.stream.kind().is_comparison_operator() {
            let token = self.stream.current().clone();
            return Err(Box::new(
                Diag::error("comparison operators cannot be chained")
                    .with_primary_label(token.span.clone(), format!("second comparison {}", token.describe()))
                    .with_secondary_label(node.span.clone(), "first comparison")
                    .with_help("combine comparisons with AND")
                    .with_code(UNEXPECTED),
            ));
        }
        Ok(node)
    }

    fn parse_additive_expression(&mut self) -> ParseResult<SyntaxNode> {
        self.parse_chain(
            Rule::ArithmeticBinary,
            &[TokenKind::Plus, TokenKind::Minus],
            Self::parse_multiplicative_expression,
        )
    }

    fn parse_multiplicative_expression(&mut self) -> ParseResult<SyntaxNode> {
        self.parse_chain(
            Rule::ArithmeticBinary,
            &[TokenKind::Asterisk, TokenKind::Slash, TokenKind::Percent],
            Self::parse_unary_expression,
        )
    }

    /// A sign directly before a number belongs to the constant.
    fn parse_unary_expression(&mut self) -> ParseResult<SyntaxNode> {
        if self.stream.at_any(&[TokenKind::Plus, TokenKind::Minus])
            && !is_numeric(self.stream.peek_kind())
        {
            let mut node = SyntaxNode::new(Rule::ArithmeticUnary, self.stream.current_start());
            node.push_token(self.stream.advance());
            node.push_node(self.nested("expression", Self::parse_unary_expression)?);
            return Ok(node);
        }
        self.parse_postfix_expression()
    }

    /// `primaryExpression ('::' dataType)*`
    fn parse_postfix_expression(&mut self) -> ParseResult<SyntaxNode> {
        let base = self.depth;
        let result = self.fold_casts();
        self.depth = base;
        result
    }

    fn fold_casts(&mut self) -> ParseResult<SyntaxNode> {
        let mut value = self.parse_primary_expression()?;
        while self.stream.check(TokenKind::CastOp) {
            self.deepen("expression")?;
            let mut node = SyntaxNode::wrap(Rule::InlineCast, value);
            node.push_token(self.stream.advance());
            if !self
                .stream
                .at_any(&[TokenKind::UnquotedIdentifier, TokenKind::QuotedIdentifier])
            {
                return Err(self.stream.expected("data type"));
            }
            node.push_token(self.stream.advance());
            value = node;
        }
        Ok(value)
    }

    pub(crate) fn parse_primary_expression(&mut self) -> ParseResult<SyntaxNode> {
        let kind = self.stream.kind();
        let next = self.stream.peek_kind();
        match kind {
            TokenKind::LParen => {
                let mut node = SyntaxNode::new(Rule::Parenthesized, self.stream.current_start());
                node.push_token(self.stream.advance());
                node.push_node(self.nested("expression", Self::parse_boolean_expression)?);
                node.push_token(self.stream.expect(TokenKind::RParen)?);
                Ok(node)
            }
            TokenKind::UnquotedIdentifier | TokenKind::QuotedIdentifier => {
                if next == TokenKind::LParen {
                    self.nested("expression", Self::parse_function_call)
                } else {
                    self.parse_qualified_name()
                }
            }
            TokenKind::Param | TokenKind::NamedOrPositionalParam
                if PreviewRule::IdentifierParams.is_enabled(&self.options)
                    && matches!(next, TokenKind::LParen | TokenKind::Dot) =>
            {
                if next == TokenKind::LParen {
                    self.nested("expression", Self::parse_function_call)
                } else {
                    self.parse_qualified_name()
                }
            }
            _ => self.parse_constant(),
        }
    }

    /// `functionName '(' ('*' | booleanExpression (',' booleanExpression)*)? ')'`
    fn parse_function_call(&mut self) -> ParseResult<SyntaxNode> {
        let mut node = SyntaxNode::new(Rule::FunctionCall, self.stream.current_start());
        node.push_token(self.stream.advance());
        node.push_token(self.stream.expect(TokenKind::LParen)?);

        if let Some(star) = self.stream.consume(TokenKind::Asterisk) {
            node.push_token(star);
        } else if !self.stream.check(TokenKind::RParen) {
            loop {
                node.push_node(self.parse_boolean_expression()?);
                match self.stream.consume(TokenKind::Comma) {
                    Some(comma) => node.push_token(comma),
                    None => break,
                }
            }
        }
        node.push_token(self.stream.expect(TokenKind::RParen)?);
        Ok(node)
    }

    /// `identifier ('.' identifier)*`
    pub(crate) fn parse_qualified_name(&mut self) -> ParseResult<SyntaxNode> {
        let mut node = SyntaxNode::new(Rule::QualifiedName, self.stream.current_start());
        loop {
            if self
                .stream
                .at_any(&[TokenKind::UnquotedIdentifier, TokenKind::QuotedIdentifier])
                || self.at_identifier_param()
            {
                node.push_token(self.stream.advance());
            } else {
                return Err(self.stream.expected("identifier"));
            }
            match self.stream.consume(TokenKind::Dot) {
                Some(dot) => node.push_token(dot),
                None => return Ok(node),
            }
        }
    }

    /// Literal constants, parameters and list literals.
    pub(crate) fn parse_constant(&mut self) -> ParseResult<SyntaxNode> {
        let start = self.stream.current_start();
        let kind = self.stream.kind();
        let rule = match kind {
            TokenKind::Null => Rule::NullLiteral,
            TokenKind::True | TokenKind::False => Rule::BooleanLiteral,
            TokenKind::QuotedString => Rule::StringLiteral,
            TokenKind::Param | TokenKind::NamedOrPositionalParam => Rule::InputParameter,
            TokenKind::OpeningBracket => return self.parse_list_literal(),
            TokenKind::IntegerLiteral | TokenKind::DecimalLiteral => return self.parse_number(),
            TokenKind::Plus | TokenKind::Minus if is_numeric(self.stream.peek_kind()) => {
                return self.parse_number();
            }
            _ => return Err(self.stream.expected("expression")),
        };
        let mut node = SyntaxNode::new(rule, start);
        node.push_token(self.stream.advance());
        Ok(node)
    }

    /// Signed numeric literal, or a time interval such as `1 day`.
    fn parse_number(&mut self) -> ParseResult<SyntaxNode> {
        let mut node = SyntaxNode::new(Rule::NumericLiteral, self.stream.current_start());
        if self.stream.at_any(&[TokenKind::Plus, TokenKind::Minus]) {
            node.push_token(self.stream.advance());
        }
        if !is_numeric(self.stream.kind()) {
            return Err(self.stream.expected("number"));
        }
        let number = self.stream.advance();
        let integer = number.kind == TokenKind::IntegerLiteral;
        node.push_token(number);

        if integer && self.stream.check(TokenKind::UnquotedIdentifier) {
            node.rule = Rule::TimeIntervalLiteral;
            node.push_token(self.stream.advance());
        }
        Ok(node)
    }

    /// `'[' item (',' item)* ']'` with items of one class.
    fn parse_list_literal(&mut self) -> ParseResult<SyntaxNode> {
        let mut node = SyntaxNode::new(Rule::ListLiteral, self.stream.current_start());
        node.push_token(self.stream.advance());

        let mut class = None;
        loop {
            let Some(item_class) = ListClass::of(self.stream.kind()) else {
                return Err(self.stream.expected("numeric, boolean or string literal"));
            };
            let item = self.parse_constant()?;
            match class {
                None => class = Some(item_class),
                Some(expected) if expected != item_class => {
                    let diag = Diag::error(format!(
                        "list literal mixes {} and {} items",
                        expected.describe(),
                        item_class.describe()
                    ))
                    .with_primary_label(item.span.clone(), format!("{} item", item_class.describe()))
                    .with_help("list items must all be numbers, booleans or strings")
                    .with_code(LIST_TYPE_MISMATCH);
                    self.report(diag);
                }
                Some(_) => {}
            }
            node.push_node(item);
            match self.stream.consume(TokenKind::Comma) {
                Some(comma) => node.push_token(comma),
                None => break,
            }
        }
        node.push_token(self.stream.expect(TokenKind::ClosingBracket)?);
        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use crate::options::ParseOptions;
    use crate::parser::Parser;

    fn tree(source: &str) -> String {
        tree_with(source, &ParseOptions::default())
    }

    fn tree_with(source: &str, options: &ParseOptions) -> String {
        let mut parser = Parser::new(source, options);
        let tree = parser.parse_tree();
        let diagnostics = parser.finish();
        assert!(diagnostics.is_empty(), "{source}: {diagnostics:?}");
        tree.to_string()
    }

    fn first_error(source: &str) -> String {
        let mut parser = Parser::new(source, &ParseOptions::default());
        parser.parse_tree();
        let diagnostics = parser.finish();
        diagnostics
            .first()
            .map(|d| d.message.clone())
            .unwrap_or_default()
    }

    #[test]
    fn precedence() {
        assert_eq!(
            tree("WHERE a OR b AND NOT c"),
            "(Query (WhereCommand WHERE (LogicalBinary (QualifiedName a) OR \
             (LogicalBinary (QualifiedName b) AND (LogicalNot NOT (QualifiedName c))))))"
        );
        assert_eq!(
            tree("EVAL 1 + 2 * 3"),
            "(Query (EvalCommand EVAL (Fields (Field (ArithmeticBinary (NumericLiteral 1) + \
             (ArithmeticBinary (NumericLiteral 2) * (NumericLiteral 3)))))))"
        );
    }

    #[test]
    fn signs_fold_into_numbers() {
        assert_eq!(
            tree("ROW -1, - x"),
            "(Query (RowCommand ROW (Fields (Field (NumericLiteral - 1)) , \
             (Field (ArithmeticUnary - (QualifiedName x))))))"
        );
        assert_eq!(
            tree("EVAL a - 1"),
            "(Query (EvalCommand EVAL (Fields (Field (ArithmeticBinary (QualifiedName a) - \
             (NumericLiteral 1))))))"
        );
    }

    #[test]
    fn predicates() {
        assert_eq!(
            tree("WHERE a NOT IN (1, 2)"),
            "(Query (WhereCommand WHERE (LogicalIn (QualifiedName a) NOT IN ( \
             (NumericLiteral 1) , (NumericLiteral 2) ))))"
        );
        assert_eq!(
            tree("WHERE a RLIKE \"x.*\""),
            "(Query (WhereCommand WHERE (RegexMatch (QualifiedName a) RLIKE (StringLiteral \"x.*\"))))"
        );
        assert_eq!(
            tree("WHERE a IS NOT NULL"),
            "(Query (WhereCommand WHERE (IsNull (QualifiedName a) IS NOT NULL)))"
        );
    }

    #[test]
    fn chained_comparison_is_rejected() {
        assert_eq!(first_error("WHERE a < b < c"), "comparison operators cannot be chained");
    }

    #[test]
    fn function_calls_and_casts() {
        assert_eq!(
            tree("STATS count(*), max(a.b)"),
            "(Query (StatsCommand STATS (Aggregates (Field (FunctionCall count ( * ))) , \
             (Field (FunctionCall max ( (QualifiedName a . b) ))))))"
        );
        assert_eq!(
            tree("EVAL x::long"),
            "(Query (EvalCommand EVAL (Fields (Field (InlineCast (QualifiedName x) :: long)))))"
        );
    }

    #[test]
    fn time_interval_literal() {
        assert_eq!(
            tree("EVAL 1 day"),
            "(Query (EvalCommand EVAL (Fields (Field (TimeIntervalLiteral 1 day)))))"
        );
    }

    #[test]
    fn list_literals() {
        assert_eq!(
            tree("ROW a = [1, -2.5]"),
            "(Query (RowCommand ROW (Fields (Field (QualifiedName a) = \
             (ListLiteral [ (NumericLiteral 1) , (NumericLiteral - 2.5) ])))))"
        );
        assert_eq!(
            first_error("ROW a = [1, \"x\"]"),
            "list literal mixes numeric and string items"
        );
    }

    #[test]
    fn match_operator_needs_preview() {
        let preview = ParseOptions::default().with_preview(true);
        assert_eq!(
            tree_with("WHERE title : \"rust\"", &preview),
            "(Query (WhereCommand WHERE (MatchExpression (QualifiedName title) : (StringLiteral \"rust\"))))"
        );
        assert!(first_error("WHERE title : \"rust\"").starts_with("unrecognized input"));
    }

    #[test]
    fn missing_operand() {
        assert_eq!(first_error("EVAL 1 +"), "expected expression, found end of input");
    }
}

//! Pipeline and command productions.

use crate::diag::Diag;
use crate::lexer::token::{Token, TokenKind};
use crate::options::PreviewRule;
use crate::parser::Parser;
use crate::parser::base::ParseResult;
use crate::parser::recovery::{COMMAND_PLACEMENT, DEPRECATED, UNKNOWN_COMMAND};
use crate::parser::tree::{Rule, SyntaxNode};

/// Maps a command keyword to its rule and whether it is a source command.
fn command_rule(kind: TokenKind) -> Option<(Rule, bool)> {
    let found = match kind {
        TokenKind::From => (Rule::FromCommand, true),
        TokenKind::Row => (Rule::RowCommand, true),
        TokenKind::Show => (Rule::ShowCommand, true),
        TokenKind::Meta => (Rule::MetaCommand, true),
        TokenKind::Explain => (Rule::ExplainCommand, true),
        TokenKind::Metrics => (Rule::MetricsCommand, true),
        TokenKind::Eval => (Rule::EvalCommand, false),
        TokenKind::Where => (Rule::WhereCommand, false),
        TokenKind::Stats => (Rule::StatsCommand, false),
        TokenKind::InlineStats => (Rule::InlineStatsCommand, false),
        TokenKind::Limit => (Rule::LimitCommand, false),
        TokenKind::Sort => (Rule::SortCommand, false),
        TokenKind::Keep => (Rule::KeepCommand, false),
        TokenKind::Drop => (Rule::DropCommand, false),
        TokenKind::Rename => (Rule::RenameCommand, false),
        TokenKind::Dissect => (Rule::DissectCommand, false),
        TokenKind::Grok => (Rule::GrokCommand, false),
        TokenKind::Enrich => (Rule::EnrichCommand, false),
        TokenKind::MvExpand => (Rule::MvExpandCommand, false),
        TokenKind::Lookup => (Rule::LookupCommand, false),
        _ => return None,
    };
    Some(found)
}

impl Parser<'_> {
    pub(crate) fn parse_query_root(&mut self) -> SyntaxNode {
        let mut query = SyntaxNode::new(Rule::Query, 0);
        self.parse_pipeline(&mut query);
        query
    }

    /// `sourceCommand (PIPE processingCommand)*` up to the end of the current query.
    fn parse_pipeline(&mut self, query: &mut SyntaxNode) {
        if self.at_query_end() {
            return;
        }
        self.parse_command(query, true);

        while !self.at_query_end() {
            if let Some(pipe) = self.stream.consume(TokenKind::Pipe) {
                query.push_token(pipe);
                if self.at_query_end() {
                    let diag = self.stream.expected("command");
                    self.report(*diag);
                    break;
                }
                self.parse_command(query, false);
            } else {
                self.unexpected_token("query");
                self.recover(query);
            }
        }
    }

    fn parse_command(&mut self, query: &mut SyntaxNode, source_position: bool) {
        let keyword = self.stream.current().clone();
        let Some((rule, is_source)) = command_rule(keyword.kind) else {
            self.parse_unknown_command(query);
            return;
        };

        if source_position != is_source {
            self.report_placement(&keyword, is_source);
        }

        let mut node = SyntaxNode::new(rule, keyword.span.start);
        node.push_token(self.stream.advance());

        let result = match rule {
            Rule::FromCommand => self.parse_from(&mut node),
            Rule::RowCommand | Rule::EvalCommand => self.parse_fields(&mut node, Rule::Fields),
            Rule::ShowCommand => self.push_expected(&mut node, TokenKind::Info),
            Rule::MetaCommand => self.push_expected(&mut node, TokenKind::Functions),
            Rule::ExplainCommand => self.parse_explain(&mut node),
            Rule::MetricsCommand => self.parse_metrics(&mut node),
            Rule::WhereCommand => self.parse_boolean_expression().map(|e| node.push_node(e)),
            Rule::StatsCommand => self.parse_stats(&mut node, false),
            Rule::InlineStatsCommand => self.parse_stats(&mut node, true),
            Rule::LimitCommand => self
                .stream
                .expect_described(TokenKind::IntegerLiteral, "integer")
                .map(|t| node.push_token(t)),
            Rule::SortCommand => self.parse_sort(&mut node),
            Rule::KeepCommand | Rule::DropCommand => self.parse_qualified_name_patterns(&mut node),
            Rule::RenameCommand => self.parse_rename(&mut node),
            Rule::DissectCommand => self.parse_dissect(&mut node),
            Rule::GrokCommand => self.parse_grok(&mut node),
            Rule::EnrichCommand => self.parse_enrich(&mut node),
            Rule::MvExpandCommand => self.parse_qualified_name().map(|n| node.push_node(n)),
            Rule::LookupCommand => self.parse_lookup(&mut node),
            _ => Ok(()),
        };

        match result {
            Ok(()) => self.finish_command(&mut node),
            Err(diag) => {
                let context = format!("in {} command", keyword.text.to_uppercase());
                self.report((*diag).with_secondary_label(keyword.span.clone(), context));
                self.recover(&mut node);
            }
        }
        query.push_node(node);
    }

    /// Reports tokens left over after a complete command.
    fn finish_command(&mut self, node: &mut SyntaxNode) {
        if self.at_sync_point() {
            return;
        }
        let context = match node.tokens().next() {
            Some(keyword) => format!("{} command", keyword.text.to_uppercase()),
            None => "command".to_string(),
        };
        self.unexpected_token(&context);
        self.recover(node);
    }

    fn report_placement(&mut self, keyword: &Token, is_source: bool) {
        let name = keyword.text.to_uppercase();
        let diag = if is_source {
            Diag::error(format!("{name} is a source command and can only start a query"))
                .with_primary_label(keyword.span.clone(), "source command after a pipe")
        } else {
            Diag::error(format!("a query cannot start with the processing command {name}"))
                .with_primary_label(keyword.span.clone(), "processing command")
                .with_help("start the query with a source command such as FROM, ROW or SHOW")
        };
        self.report(diag.with_code(COMMAND_PLACEMENT));
    }

    fn parse_unknown_command(&mut self, query: &mut SyntaxNode) {
        let token = self.stream.advance();
        let diag = Diag::error(format!("unknown command {}", token.describe()))
            .with_primary_label(token.span.clone(), "not a command")
            .with_code(UNKNOWN_COMMAND);
        self.report(diag);

        let mut node = SyntaxNode::new(Rule::UnknownCommand, token.span.start);
        node.push_token(token);
        if !self.at_sync_point() {
            self.recover(&mut node);
        }
        query.push_node(node);
    }

    /// Runs `f` on a fresh `rule` node and attaches the node to `parent` if it
    /// gained children, whether or not `f` succeeded.
    pub(crate) fn partial<F>(&mut self, parent: &mut SyntaxNode, rule: Rule, f: F) -> ParseResult<()>
    where
        F: FnOnce(&mut Self, &mut SyntaxNode) -> ParseResult<()>,
    {
        let start = self.stream.current_start();
        let mut node = SyntaxNode::new(rule, start);
        let result = f(self, &mut node);
        if !node.is_empty() {
            parent.push_node(node);
        }
        result
    }

    fn push_expected(&mut self, node: &mut SyntaxNode, kind: TokenKind) -> ParseResult<()> {
        let token = self.stream.expect(kind)?;
        node.push_token(token);
        Ok(())
    }

    fn push_any(
        &mut self,
        node: &mut SyntaxNode,
        kinds: &[TokenKind],
        expected: &str,
    ) -> ParseResult<()> {
        if self.stream.at_any(kinds) {
            node.push_token(self.stream.advance());
            Ok(())
        } else {
            Err(self.stream.expected(expected))
        }
    }

    // ------------------------------------------------------------------
    // Source commands
    // ------------------------------------------------------------------

    fn parse_from(&mut self, node: &mut SyntaxNode) -> ParseResult<()> {
        self.parse_index_patterns(node)?;
        if self.stream.check(TokenKind::Metadata) {
            return self.parse_metadata(node);
        }
        if self.stream.check(TokenKind::OpeningBracket) && self.stream.peek_kind() == TokenKind::Metadata {
            return self.parse_bracketed_metadata(node);
        }
        Ok(())
    }

    fn parse_index_patterns(&mut self, node: &mut SyntaxNode) -> ParseResult<()> {
        loop {
            self.parse_index_pattern(node)?;
            match self.stream.consume(TokenKind::Comma) {
                Some(comma) => node.push_token(comma),
                None => return Ok(()),
            }
        }
    }

    /// `(cluster ':')? (UNQUOTED_SOURCE | QUOTED_STRING)`
    fn parse_index_pattern(&mut self, parent: &mut SyntaxNode) -> ParseResult<()> {
        self.partial(parent, Rule::IndexPattern, |p, pattern| {
            if p.stream.check(TokenKind::UnquotedSource) && p.stream.peek_kind() == TokenKind::Colon {
                pattern.push_token(p.stream.advance());
                pattern.push_token(p.stream.advance());
            }
            p.push_any(
                pattern,
                &[TokenKind::UnquotedSource, TokenKind::QuotedString],
                "index pattern",
            )
        })
    }

    fn parse_metadata(&mut self, node: &mut SyntaxNode) -> ParseResult<()> {
        self.partial(node, Rule::Metadata, |p, metadata| {
            p.push_expected(metadata, TokenKind::Metadata)?;
            p.parse_metadata_fields(metadata)
        })
    }

    /// Deprecated `[METADATA _id]` form.
    fn parse_bracketed_metadata(&mut self, node: &mut SyntaxNode) -> ParseResult<()> {
        let open = self.stream.current_span();
        let result = self.partial(node, Rule::Metadata, |p, metadata| {
            p.push_expected(metadata, TokenKind::OpeningBracket)?;
            p.push_expected(metadata, TokenKind::Metadata)?;
            p.parse_metadata_fields(metadata)?;
            p.push_expected(metadata, TokenKind::ClosingBracket)
        });
        let diag = Diag::warning("square brackets around METADATA are deprecated")
            .with_primary_label(open, "remove the brackets")
            .with_help("write `FROM index METADATA _id`")
            .with_code(DEPRECATED);
        self.report(diag);
        result
    }

    fn parse_metadata_fields(&mut self, metadata: &mut SyntaxNode) -> ParseResult<()> {
        loop {
            self.push_any(metadata, &[TokenKind::UnquotedSource], "metadata field")?;
            match self.stream.consume(TokenKind::Comma) {
                Some(comma) => metadata.push_token(comma),
                None => return Ok(()),
            }
        }
    }

    fn parse_explain(&mut self, node: &mut SyntaxNode) -> ParseResult<()> {
        self.nested("subquery", |p| p.parse_subquery(node))
    }

    fn parse_subquery(&mut self, node: &mut SyntaxNode) -> ParseResult<()> {
        self.partial(node, Rule::Subquery, |p, subquery| {
            p.push_expected(subquery, TokenKind::OpeningBracket)?;

            let mut query = SyntaxNode::new(Rule::Query, p.stream.current_start());
            p.explain_depth += 1;
            if p.at_query_end() {
                let diag = p.stream.expected("command");
                p.report(*diag);
            } else {
                p.parse_pipeline(&mut query);
            }
            p.explain_depth -= 1;
            subquery.push_node(query);

            p.push_expected(subquery, TokenKind::ClosingBracket)
        })
    }

    fn parse_metrics(&mut self, node: &mut SyntaxNode) -> ParseResult<()> {
        self.parse_index_patterns(node)?;
        self.parse_aggregation(node, false)
    }

    // ------------------------------------------------------------------
    // Processing commands
    // ------------------------------------------------------------------

    /// `field (',' field)*` wrapped in a `rule` node.
    pub(crate) fn parse_fields(&mut self, parent: &mut SyntaxNode, rule: Rule) -> ParseResult<()> {
        self.partial(parent, rule, |p, fields| loop {
            p.parse_field(fields)?;
            match p.stream.consume(TokenKind::Comma) {
                Some(comma) => fields.push_token(comma),
                None => return Ok(()),
            }
        })
    }

    /// `qualifiedName '=' booleanExpression | booleanExpression`
    fn parse_field(&mut self, fields: &mut SyntaxNode) -> ParseResult<()> {
        let expr = self.parse_boolean_expression()?;
        let is_name = expr.rule == Rule::QualifiedName;
        let mut field = SyntaxNode::wrap(Rule::Field, expr);
        if is_name && self.stream.check(TokenKind::Assign) {
            field.push_token(self.stream.advance());
            field.push_node(self.parse_boolean_expression()?);
        }
        fields.push_node(field);
        Ok(())
    }

    fn parse_stats(&mut self, node: &mut SyntaxNode, require_aggregates: bool) -> ParseResult<()> {
        if require_aggregates && self.stream.check(TokenKind::By) {
            return Err(self.stream.expected("aggregate expression"));
        }
        self.parse_aggregation(node, require_aggregates)
    }

    /// `aggregates? (BY grouping)?`
    fn parse_aggregation(&mut self, node: &mut SyntaxNode, require_aggregates: bool) -> ParseResult<()> {
        if require_aggregates || (!self.at_sync_point() && !self.stream.check(TokenKind::By)) {
            self.parse_fields(node, Rule::Aggregates)?;
        }
        if let Some(by) = self.stream.consume(TokenKind::By) {
            node.push_token(by);
            self.parse_fields(node, Rule::Grouping)?;
        }
        Ok(())
    }

    fn parse_sort(&mut self, node: &mut SyntaxNode) -> ParseResult<()> {
        loop {
            self.parse_order_expression(node)?;
            match self.stream.consume(TokenKind::Comma) {
                Some(comma) => node.push_token(comma),
                None => return Ok(()),
            }
        }
    }

    /// `booleanExpression (ASC | DESC)? (NULLS (FIRST | LAST))?`
    fn parse_order_expression(&mut self, parent: &mut SyntaxNode) -> ParseResult<()> {
        let expr = self.parse_boolean_expression()?;
        let mut order = SyntaxNode::wrap(Rule::OrderExpression, expr);
        if self.stream.at_any(&[TokenKind::Asc, TokenKind::Desc]) {
            order.push_token(self.stream.advance());
        }
        if let Some(nulls) = self.stream.consume(TokenKind::Nulls) {
            order.push_token(nulls);
            let result = self.push_any(&mut order, &[TokenKind::First, TokenKind::Last], "FIRST or LAST");
            parent.push_node(order);
            return result;
        }
        parent.push_node(order);
        Ok(())
    }

    fn parse_qualified_name_patterns(&mut self, parent: &mut SyntaxNode) -> ParseResult<()> {
        self.partial(parent, Rule::QualifiedNamePatterns, |p, patterns| loop {
            let pattern = p.parse_qualified_name_pattern()?;
            patterns.push_node(pattern);
            match p.stream.consume(TokenKind::Comma) {
                Some(comma) => patterns.push_token(comma),
                None => return Ok(()),
            }
        })
    }

    /// `identifierPattern ('.' identifierPattern)*`
    pub(crate) fn parse_qualified_name_pattern(&mut self) -> ParseResult<SyntaxNode> {
        let mut pattern = SyntaxNode::new(Rule::QualifiedNamePattern, self.stream.current_start());
        loop {
            if self.stream.check(TokenKind::IdPattern) || self.at_identifier_param() {
                pattern.push_token(self.stream.advance());
            } else {
                return Err(self.stream.expected("identifier pattern"));
            }
            match self.stream.consume(TokenKind::Dot) {
                Some(dot) => pattern.push_token(dot),
                None => return Ok(pattern),
            }
        }
    }

    /// Returns true at a parameter standing in for an identifier.
    pub(crate) fn at_identifier_param(&mut self) -> bool {
        self.stream.kind().is_param() && PreviewRule::IdentifierParams.is_enabled(&self.options)
    }

    fn parse_rename(&mut self, node: &mut SyntaxNode) -> ParseResult<()> {
        loop {
            let old = self.parse_qualified_name_pattern()?;
            let mut clause = SyntaxNode::wrap(Rule::RenameClause, old);
            self.push_expected(&mut clause, TokenKind::As)?;
            clause.push_node(self.parse_qualified_name_pattern()?);
            node.push_node(clause);
            match self.stream.consume(TokenKind::Comma) {
                Some(comma) => node.push_token(comma),
                None => return Ok(()),
            }
        }
    }

    /// `primaryExpression string commandOptions?`
    fn parse_dissect(&mut self, node: &mut SyntaxNode) -> ParseResult<()> {
        self.parse_input_and_pattern(node)?;
        if self.stream.at_any(&[TokenKind::UnquotedIdentifier, TokenKind::QuotedIdentifier]) {
            self.partial(node, Rule::CommandOptions, |p, options| loop {
                let mut option = SyntaxNode::new(Rule::CommandOption, p.stream.current_start());
                p.push_any(
                    &mut option,
                    &[TokenKind::UnquotedIdentifier, TokenKind::QuotedIdentifier],
                    "option name",
                )?;
                p.push_expected(&mut option, TokenKind::Assign)?;
                option.push_node(p.parse_constant()?);
                options.push_node(option);
                match p.stream.consume(TokenKind::Comma) {
                    Some(comma) => options.push_token(comma),
                    None => return Ok(()),
                }
            })?;
        }
        Ok(())
    }

    fn parse_grok(&mut self, node: &mut SyntaxNode) -> ParseResult<()> {
        self.parse_input_and_pattern(node)
    }

    fn parse_input_and_pattern(&mut self, node: &mut SyntaxNode) -> ParseResult<()> {
        node.push_node(self.parse_primary_expression()?);
        if !self.stream.check(TokenKind::QuotedString) {
            return Err(self.stream.expected("pattern string"));
        }
        node.push_node(self.parse_constant()?);
        Ok(())
    }

    /// `setting* POLICY (ON pattern)? (WITH clause (',' clause)*)?`
    fn parse_enrich(&mut self, node: &mut SyntaxNode) -> ParseResult<()> {
        while self.stream.check(TokenKind::OpeningBracket) {
            self.partial(node, Rule::Setting, |p, setting| {
                p.push_expected(setting, TokenKind::OpeningBracket)?;
                p.push_any(setting, &[TokenKind::Setting], "setting name")?;
                p.push_expected(setting, TokenKind::Colon)?;
                p.push_any(setting, &[TokenKind::Setting], "setting value")?;
                p.push_expected(setting, TokenKind::ClosingBracket)
            })?;
        }

        self.push_any(node, &[TokenKind::EnrichPolicyName], "policy name")?;

        if let Some(on) = self.stream.consume(TokenKind::On) {
            node.push_token(on);
            node.push_node(self.parse_qualified_name_pattern()?);
        }

        if let Some(with) = self.stream.consume(TokenKind::With) {
            node.push_token(with);
            loop {
                let first = self.parse_qualified_name_pattern()?;
                let mut clause = SyntaxNode::wrap(Rule::EnrichWithClause, first);
                if let Some(assign) = self.stream.consume(TokenKind::Assign) {
                    clause.push_token(assign);
                    clause.push_node(self.parse_qualified_name_pattern()?);
                }
                node.push_node(clause);
                match self.stream.consume(TokenKind::Comma) {
                    Some(comma) => node.push_token(comma),
                    None => break,
                }
            }
        }
        Ok(())
    }

    /// `indexPattern ON qualifiedNamePatterns`
    fn parse_lookup(&mut self, node: &mut SyntaxNode) -> ParseResult<()> {
        self.parse_index_pattern(node)?;
        self.push_expected(node, TokenKind::On)?;
        self.parse_qualified_name_patterns(node)
    }
}

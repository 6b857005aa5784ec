//! Parser for pipe queries.
//!
//! The parser pulls significant tokens from the lexer, builds a rule-tagged
//! parse tree for `sourceCommand (| processingCommand)*`, and hands the tree to
//! the AST builder. Syntax errors never abort the parse: the failing command
//! is kept as incomplete and parsing resumes at the next pipe.

pub mod base;
mod command;
mod expression;
mod recovery;
pub mod tree;

use crate::ast::Query;
use crate::builder;
use crate::diag::{Diag, SourceFile, convert_diagnostics_to_reports, sort_by_position};
use crate::options::ParseOptions;
use base::{ParseError, ParseResult as StepResult, TokenStream};
use miette::Report;
use tree::SyntaxNode;

pub(crate) const TRACE_TARGET: &str = "esql_parser::parser";

/// Deepest recursion through parentheses, function calls, `NOT`, unary signs
/// and explained subqueries.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Deepest parse tree an expression may produce, operator chains included.
pub const MAX_TREE_DEPTH: usize = 256;

/// Result of parsing a query.
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// The query AST. Always present; commands that failed to parse are marked
    /// incomplete.
    pub ast: Query,
    /// Lexer and parser diagnostics sorted by position.
    pub diagnostics: Vec<Diag>,
    /// Concrete parse tree, kept when [`ParseOptions::retain_parse_tree`] is set.
    pub tree: Option<SyntaxNode>,
}

impl ParseResult {
    /// Returns true if any diagnostic is an error.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diag::is_error)
    }

    /// Renders the diagnostics as miette reports against `source`.
    pub fn reports(&self, source: &str) -> Vec<Report> {
        convert_diagnostics_to_reports(&self.diagnostics, &SourceFile::new(source))
    }
}

/// Recursive-descent parser state for one query.
pub struct Parser<'a> {
    pub(crate) stream: TokenStream<'a>,
    pub(crate) options: ParseOptions,
    pub(crate) diagnostics: Vec<Diag>,
    /// Nesting depth of `EXPLAIN [ ... ]` subqueries.
    pub(crate) explain_depth: usize,
    /// Active recursion levels, bounded by [`MAX_NESTING_DEPTH`].
    nesting: usize,
    /// Tree levels above the current production, bounded by [`MAX_TREE_DEPTH`].
    pub(crate) depth: usize,
    source_len: usize,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, options: &ParseOptions) -> Self {
        Self {
            stream: TokenStream::new(source, options),
            options: *options,
            diagnostics: Vec::new(),
            explain_depth: 0,
            nesting: 0,
            depth: 0,
            source_len: source.len(),
        }
    }

    /// Runs `f` one recursion level deeper, failing once the nesting limit
    /// is reached.
    pub(crate) fn nested<T>(
        &mut self,
        what: &str,
        f: impl FnOnce(&mut Self) -> StepResult<T>,
    ) -> StepResult<T> {
        if self.nesting >= MAX_NESTING_DEPTH {
            return Err(self.too_deep(what));
        }
        let depth = self.depth;
        self.deepen(what)?;
        self.nesting += 1;
        let result = f(self);
        self.nesting -= 1;
        self.depth = depth;
        result
    }

    /// Adds one tree level. Callers restore `depth` when their node is done.
    pub(crate) fn deepen(&mut self, what: &str) -> StepResult<()> {
        if self.depth >= MAX_TREE_DEPTH {
            return Err(self.too_deep(what));
        }
        self.depth += 1;
        Ok(())
    }

    fn too_deep(&mut self, what: &str) -> ParseError {
        tracing::debug!(
            target: TRACE_TARGET,
            nesting = self.nesting,
            depth = self.depth,
            "nesting limit reached"
        );
        let span = self.stream.current_span();
        Box::new(
            Diag::error(format!("{what} nested too deeply"))
                .with_primary_label(span, "nesting limit reached here")
                .with_help(format!(
                    "nesting is limited to {MAX_NESTING_DEPTH} levels and operator chains to {MAX_TREE_DEPTH}"
                ))
                .with_code(recovery::NESTED_TOO_DEEPLY),
        )
    }

    /// Parses the whole input into a `Query` parse tree spanning the source.
    pub fn parse_tree(&mut self) -> SyntaxNode {
        let mut query = self.parse_query_root();
        query.span = 0..self.source_len;
        query
    }

    /// Returns every diagnostic, lexer ones included, sorted by position.
    pub fn finish(mut self) -> Vec<Diag> {
        let mut diagnostics = self.stream.take_diagnostics();
        diagnostics.append(&mut self.diagnostics);
        sort_by_position(&mut diagnostics);
        diagnostics
    }
}

/// Parses `source` with `options`.
pub fn parse_query(source: &str, options: &ParseOptions) -> ParseResult {
    let span = tracing::debug_span!(
        target: TRACE_TARGET,
        "parse",
        bytes = source.len(),
        preview = options.preview,
        commands = tracing::field::Empty,
        diagnostics = tracing::field::Empty,
    );
    let _entered = span.enter();

    let mut parser = Parser::new(source, options);
    let tree = parser.parse_tree();
    let diagnostics = parser.finish();
    let ast = builder::build_query(&tree);

    span.record("commands", ast.commands.len());
    span.record("diagnostics", diagnostics.len());
    if !diagnostics.is_empty() {
        tracing::debug!(
            target: TRACE_TARGET,
            count = diagnostics.len(),
            first = %diagnostics[0].message,
            "query has diagnostics"
        );
    }

    ParseResult {
        ast,
        diagnostics,
        tree: options.retain_parse_tree.then_some(tree),
    }
}

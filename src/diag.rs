//! Diagnostics produced while lexing and parsing a query.
//!
//! Every recoverable problem becomes a [`Diag`]. Callers that want rendered
//! output convert them to [`miette::Report`]s against the query text.

use crate::ast::Span;
use miette::{Diagnostic, LabeledSpan, Report, Severity};
use std::fmt;

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagSeverity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for DiagSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagSeverity::Error => write!(f, "error"),
            DiagSeverity::Warning => write!(f, "warning"),
            DiagSeverity::Note => write!(f, "note"),
        }
    }
}

/// Role of a label within its diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelRole {
    Primary,
    Secondary,
}

/// A span of query text with an explanation attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagLabel {
    pub span: Span,
    pub message: String,
    pub role: LabelRole,
}

impl DiagLabel {
    /// Creates a primary label.
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            role: LabelRole::Primary,
        }
    }

    /// Creates a secondary label.
    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            role: LabelRole::Secondary,
        }
    }
}

/// A structured diagnostic message.
///
/// The first primary label is the location of the diagnostic; see [`Diag::span`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diag {
    /// The severity level of this diagnostic.
    pub severity: DiagSeverity,
    /// The main diagnostic message.
    pub message: String,
    /// Labeled spans showing relevant source locations.
    pub labels: Vec<DiagLabel>,
    /// Optional help text suggesting how to fix the query.
    pub help: Option<String>,
    /// Additional notes providing context.
    pub notes: Vec<String>,
    /// Stable diagnostic code such as `P002`.
    pub code: Option<String>,
}

impl Diag {
    /// Creates a new diagnostic with the given severity and message.
    pub fn new(severity: DiagSeverity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            labels: Vec::new(),
            help: None,
            notes: Vec::new(),
            code: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(DiagSeverity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(DiagSeverity::Warning, message)
    }

    pub fn note(message: impl Into<String>) -> Self {
        Self::new(DiagSeverity::Note, message)
    }

    /// Adds a primary label.
    pub fn with_primary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(DiagLabel::primary(span, message));
        self
    }

    /// Adds a secondary label.
    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(DiagLabel::secondary(span, message));
        self
    }

    /// Sets the help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Adds a note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Sets the diagnostic code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Returns the span of the first primary label, or of the first label when
    /// there is no primary one.
    pub fn span(&self) -> Option<Span> {
        self.labels
            .iter()
            .find(|label| label.role == LabelRole::Primary)
            .or_else(|| self.labels.first())
            .map(|label| label.span.clone())
    }

    /// Returns true for error severity.
    pub fn is_error(&self) -> bool {
        self.severity == DiagSeverity::Error
    }
}

/// Sorts diagnostics by the start of their span, keeping the order of
/// diagnostics that start at the same offset.
pub fn sort_by_position(diagnostics: &mut [Diag]) {
    diagnostics.sort_by_key(|diag| diag.span().map_or(usize::MAX, |span| span.start));
}

/// Query text wrapped for diagnostic rendering.
#[derive(Debug, Clone)]
pub struct SourceFile {
    content: String,
    name: Option<String>,
}

impl SourceFile {
    /// Creates an unnamed source.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            name: None,
        }
    }

    /// Creates a source with a display name.
    pub fn with_name(content: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            name: Some(name.into()),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Clamps a span to the bounds of this source.
    pub fn clamp_span(&self, span: &Span) -> Span {
        let len = self.content.len();
        let start = span.start.min(len);
        let end = span.end.min(len).max(start);
        start..end
    }
}

/// Converts diagnostics to miette reports with source context.
pub fn convert_diagnostics_to_reports(diagnostics: &[Diag], source: &SourceFile) -> Vec<Report> {
    diagnostics
        .iter()
        .map(|diag| convert_diag_to_report(diag, source))
        .collect()
}

/// Converts a single diagnostic to a miette report.
///
/// Out-of-bounds spans are clamped to the source.
pub fn convert_diag_to_report(diag: &Diag, source: &SourceFile) -> Report {
    let report = Report::new(build_diagnostic(diag, source));
    match source.name() {
        Some(name) => {
            report.with_source_code(miette::NamedSource::new(name, source.content().to_string()))
        }
        None => report.with_source_code(source.content().to_string()),
    }
}

fn build_diagnostic(diag: &Diag, source: &SourceFile) -> BuiltDiagnostic {
    let labels = diag
        .labels
        .iter()
        .map(|label| {
            let span = source.clamp_span(&label.span);
            let offset_len = (span.start, span.end - span.start);
            match label.role {
                LabelRole::Primary => {
                    LabeledSpan::new_primary_with_span(Some(label.message.clone()), offset_len)
                }
                LabelRole::Secondary => {
                    LabeledSpan::new_with_span(Some(label.message.clone()), offset_len)
                }
            }
        })
        .collect();

    BuiltDiagnostic {
        message: diag.message.clone(),
        severity: match diag.severity {
            DiagSeverity::Error => Severity::Error,
            DiagSeverity::Warning => Severity::Warning,
            DiagSeverity::Note => Severity::Advice,
        },
        code: diag.code.clone(),
        help: diag.help.clone(),
        labels,
        related: diag.notes.iter().cloned().map(NoteDiagnostic).collect(),
    }
}

#[derive(Debug)]
struct BuiltDiagnostic {
    message: String,
    severity: Severity,
    code: Option<String>,
    help: Option<String>,
    labels: Vec<LabeledSpan>,
    related: Vec<NoteDiagnostic>,
}

#[derive(Debug)]
struct NoteDiagnostic(String);

impl fmt::Display for NoteDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for BuiltDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for BuiltDiagnostic {}
impl std::error::Error for NoteDiagnostic {}

impl Diagnostic for BuiltDiagnostic {
    fn severity(&self) -> Option<Severity> {
        Some(self.severity)
    }

    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.code
            .as_ref()
            .map(|c| Box::new(c) as Box<dyn fmt::Display>)
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        if self.labels.is_empty() {
            None
        } else {
            Some(Box::new(self.labels.clone().into_iter()))
        }
    }

    fn related<'a>(&'a self) -> Option<Box<dyn Iterator<Item = &'a dyn Diagnostic> + 'a>> {
        if self.related.is_empty() {
            None
        } else {
            Some(Box::new(
                self.related.iter().map(|diag| diag as &dyn Diagnostic),
            ))
        }
    }
}

impl Diagnostic for NoteDiagnostic {
    fn severity(&self) -> Option<Severity> {
        Some(Severity::Advice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_labels_and_code() {
        let diag = Diag::error("expected expression, found '|'")
            .with_primary_label(12..13, "here")
            .with_secondary_label(7..11, "in this command")
            .with_help("add an expression after EVAL")
            .with_code("P002");

        assert!(diag.is_error());
        assert_eq!(diag.labels.len(), 2);
        assert_eq!(diag.labels[0].role, LabelRole::Primary);
        assert_eq!(diag.code.as_deref(), Some("P002"));
        assert_eq!(diag.span(), Some(12..13));
    }

    #[test]
    fn span_falls_back_to_first_label() {
        let diag = Diag::warning("odd").with_secondary_label(3..4, "here");
        assert_eq!(diag.span(), Some(3..4));
        assert_eq!(Diag::note("none").span(), None);
    }

    #[test]
    fn sorting_is_stable_by_start() {
        let mut diags = vec![
            Diag::error("b").with_primary_label(10..11, ""),
            Diag::error("a1").with_primary_label(2..3, ""),
            Diag::error("no span"),
            Diag::error("a2").with_primary_label(2..5, ""),
        ];
        sort_by_position(&mut diags);
        let order: Vec<_> = diags.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(order, vec!["a1", "a2", "b", "no span"]);
    }

    #[test]
    fn clamp_span() {
        let src = SourceFile::new("ROW 1");
        assert_eq!(src.clamp_span(&(0..10)), 0..5);
        let inverted = std::ops::Range { start: 3, end: 2 };
        assert_eq!(src.clamp_span(&inverted), 3..3);
        assert_eq!(src.clamp_span(&(10..20)), 5..5);
    }

    #[test]
    fn convert_keeps_message_help_and_code() {
        let source = SourceFile::with_name("FROM logs | EVAL", "query.esql");
        let diag = Diag::error("expected expression")
            .with_primary_label(16..16, "here")
            .with_help("add an expression")
            .with_code("P002");

        let report = convert_diag_to_report(&diag, &source);
        assert_eq!(report.to_string(), "expected expression");

        let built = build_diagnostic(&diag, &source);
        assert_eq!(built.help.as_deref(), Some("add an expression"));
        assert_eq!(built.code.as_deref(), Some("P002"));
        assert_eq!(built.severity, Severity::Error);
    }

    #[test]
    fn convert_preserves_label_roles() {
        let source = SourceFile::new("RENAME a AS");
        let diag = Diag::error("expected identifier pattern")
            .with_primary_label(11..11, "here")
            .with_secondary_label(7..8, "renaming this");

        let built = build_diagnostic(&diag, &source);
        assert_eq!(built.labels.len(), 2);
        assert!(built.labels[0].primary());
        assert!(!built.labels[1].primary());
        assert_eq!(built.labels[1].label(), Some("renaming this"));
    }

    #[test]
    fn notes_become_related_diagnostics() {
        let source = SourceFile::new("ROW [1, \"a\"]");
        let diag = Diag::error("list literal mixes types").with_note("found integer and string");

        let built = build_diagnostic(&diag, &source);
        let related = built
            .related()
            .expect("expected related diagnostics")
            .collect::<Vec<_>>();
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].to_string(), "found integer and string");
        assert_eq!(related[0].severity(), Some(Severity::Advice));
    }

    #[test]
    fn convert_with_out_of_bounds_span() {
        let source = SourceFile::new("ROW");
        let diag = Diag::error("error").with_primary_label(0..100, "out of bounds");
        let reports = convert_diagnostics_to_reports(&[diag], &source);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].to_string(), "error");
    }
}

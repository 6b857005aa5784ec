//! Names that refer to columns, sources and query parameters.

use crate::ast::Span;
use smol_str::SmolStr;

/// How an identifier was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentifierKind {
    /// Bare word or pattern such as `host` or `host*`.
    Unquoted,
    /// Backtick quoted; `name` holds the unescaped text.
    Quoted,
    /// A `?param` standing in for an identifier.
    Parameter,
}

/// A single name segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub name: SmolStr,
    pub kind: IdentifierKind,
    pub span: Span,
}

impl Identifier {
    pub fn new(name: impl Into<SmolStr>, kind: IdentifierKind, span: Span) -> Self {
        Self {
            name: name.into(),
            kind,
            span,
        }
    }

    /// Builds an identifier from raw token text, unquoting backtick names.
    ///
    /// Patterns that mix quoted and unquoted segments (`` `a b`* ``) are kept
    /// verbatim as unquoted text.
    pub fn from_text(text: &str, span: Span) -> Self {
        if text.starts_with('?') {
            return Self::new(text, IdentifierKind::Parameter, span);
        }
        match unquote_identifier(text) {
            Some(name) => Self::new(name, IdentifierKind::Quoted, span),
            None => Self::new(text, IdentifierKind::Unquoted, span),
        }
    }

    /// Returns true if this segment contains an unquoted `*` wildcard.
    pub fn is_pattern(&self) -> bool {
        self.kind == IdentifierKind::Unquoted && self.name.contains('*')
    }
}

/// Strips the backticks of a single quoted identifier and collapses doubled
/// backticks. Returns `None` when `text` is not exactly one quoted identifier.
pub fn unquote_identifier(text: &str) -> Option<String> {
    let inner = text.strip_prefix('`')?.strip_suffix('`')?;
    if inner.is_empty() {
        return None;
    }
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '`' {
            // A lone backtick ends the identifier, so this text holds several segments.
            if chars.next_if_eq(&'`').is_none() {
                return None;
            }
        }
        out.push(ch);
    }
    Some(out)
}

/// A dotted column reference such as `a.b` or a pattern such as `a.*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub parts: Vec<Identifier>,
    pub span: Span,
}

impl ColumnRef {
    pub fn new(parts: Vec<Identifier>, span: Span) -> Self {
        Self { parts, span }
    }

    /// Returns the unescaped dotted name.
    pub fn name(&self) -> String {
        self.parts
            .iter()
            .map(|part| part.name.as_str())
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Returns true if any segment contains a wildcard.
    pub fn is_pattern(&self) -> bool {
        self.parts.iter().any(Identifier::is_pattern)
    }
}

/// An index, alias or data stream named by `FROM`, `METRICS` or `LOOKUP`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    /// Remote cluster prefix in `cluster:index`.
    pub cluster: Option<SmolStr>,
    /// Index expression; unescaped when quoted.
    pub index: SmolStr,
    /// Written as a quoted string.
    pub quoted: bool,
    pub span: Span,
}

/// A query parameter placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Parameter {
    /// `?`
    Unnamed,
    /// `?name`
    Named(SmolStr),
    /// `?1`
    Positional(SmolStr),
}

impl Parameter {
    /// Classifies the text of a parameter token.
    pub fn from_text(text: &str) -> Self {
        let body = text.strip_prefix('?').unwrap_or(text);
        if body.is_empty() {
            Parameter::Unnamed
        } else if body.bytes().all(|b| b.is_ascii_digit()) {
            Parameter::Positional(body.into())
        } else {
            Parameter::Named(body.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_from_token_text() {
        let plain = Identifier::from_text("host", 0..4);
        assert_eq!(plain.kind, IdentifierKind::Unquoted);

        let quoted = Identifier::from_text("`a``b`", 0..6);
        assert_eq!(quoted.kind, IdentifierKind::Quoted);
        assert_eq!(quoted.name, "a`b");

        let param = Identifier::from_text("?field", 0..6);
        assert_eq!(param.kind, IdentifierKind::Parameter);

        let mixed = Identifier::from_text("`a`*", 0..4);
        assert_eq!(mixed.kind, IdentifierKind::Unquoted);
        assert_eq!(mixed.name, "`a`*");
    }

    #[test]
    fn unquote_rejects_multiple_segments() {
        assert_eq!(unquote_identifier("`a``b`").as_deref(), Some("a`b"));
        assert_eq!(unquote_identifier("`a`.`b`"), None);
        assert_eq!(unquote_identifier("``"), None);
        assert_eq!(unquote_identifier("abc"), None);
    }

    #[test]
    fn column_patterns() {
        let column = ColumnRef::new(
            vec![
                Identifier::from_text("event", 0..5),
                Identifier::from_text("*", 6..7),
            ],
            0..7,
        );
        assert!(column.is_pattern());
        assert_eq!(column.name(), "event.*");

        let quoted_star = ColumnRef::new(vec![Identifier::from_text("`*`", 0..3)], 0..3);
        assert!(!quoted_star.is_pattern());
    }

    #[test]
    fn parameter_kinds() {
        assert_eq!(Parameter::from_text("?"), Parameter::Unnamed);
        assert_eq!(Parameter::from_text("?12"), Parameter::Positional("12".into()));
        assert_eq!(Parameter::from_text("?day"), Parameter::Named("day".into()));
    }
}

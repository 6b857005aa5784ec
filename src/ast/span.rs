//! Byte spans and spanned values.

use std::ops::Range;

/// A byte range in the query text.
pub type Span = Range<usize>;

/// A value with the span it was parsed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }

    /// Maps the inner value while preserving the span.
    pub fn map<U, F>(self, f: F) -> Spanned<U>
    where
        F: FnOnce(T) -> U,
    {
        Spanned {
            node: f(self.node),
            span: self.span,
        }
    }
}

impl<T> AsRef<T> for Spanned<T> {
    fn as_ref(&self) -> &T {
        &self.node
    }
}

/// Returns the span running from the start of `start` to the end of `end`.
pub fn merge_spans(start: &Span, end: &Span) -> Span {
    start.start..end.end.max(start.start)
}

/// Returns true when `inner` lies within `outer`.
pub fn contains(outer: &Span, inner: &Span) -> bool {
    outer.start <= inner.start && inner.end <= outer.end
}

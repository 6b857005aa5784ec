//! Parse configuration and preview feature gating.

/// Options controlling a single lexer/parser run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseOptions {
    /// Recognize dev/preview commands and syntax.
    pub preview: bool,

    /// Return the concrete parse tree alongside the AST.
    pub retain_parse_tree: bool,
}

impl ParseOptions {
    /// Creates options with every feature disabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables preview syntax.
    pub fn with_preview(mut self, enabled: bool) -> Self {
        self.preview = enabled;
        self
    }

    /// Keeps the parse tree in the parse result.
    pub fn with_parse_tree(mut self, retain: bool) -> Self {
        self.retain_parse_tree = retain;
        self
    }
}

/// Grammar rules that only exist while preview syntax is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreviewRule {
    /// `INLINESTATS` command.
    InlineStats,
    /// `LOOKUP` command.
    Lookup,
    /// `METRICS` source command.
    Metrics,
    /// `field : "query"` match operator in expressions.
    MatchOperator,
    /// `?param` in identifier positions (KEEP, DROP, RENAME, ENRICH fields, MV_EXPAND,
    /// function names and column references).
    IdentifierParams,
}

impl PreviewRule {
    /// Returns true when the rule is active under `options`.
    pub fn is_enabled(self, options: &ParseOptions) -> bool {
        match self {
            PreviewRule::InlineStats
            | PreviewRule::Lookup
            | PreviewRule::Metrics
            | PreviewRule::MatchOperator
            | PreviewRule::IdentifierParams => options.preview,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_disable_everything() {
        let options = ParseOptions::default();
        assert!(!options.preview);
        assert!(!options.retain_parse_tree);
        assert!(!PreviewRule::Metrics.is_enabled(&options));
    }

    #[test]
    fn builder_sets_flags() {
        let options = ParseOptions::new().with_preview(true).with_parse_tree(true);
        assert!(options.preview);
        assert!(options.retain_parse_tree);
        assert!(PreviewRule::Lookup.is_enabled(&options));
        assert!(PreviewRule::MatchOperator.is_enabled(&options));
    }
}

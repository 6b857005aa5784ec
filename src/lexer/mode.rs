//! Lexical modes and the per-lexer mode stack.

use std::fmt;

/// A named lexical state restricting which rules are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LexerMode {
    /// Command position: the start of the query or of a pipeline step.
    Default,
    /// Expressions, function calls and literals.
    Expression,
    /// Between `EXPLAIN` and its bracketed subquery.
    Explain,
    /// `FROM` source list.
    From,
    /// `KEEP` / `DROP` name patterns.
    Project,
    /// `RENAME` clauses.
    Rename,
    /// `ENRICH` policy and settings.
    Enrich,
    /// `ENRICH ... ON/WITH` field patterns.
    EnrichField,
    /// `MV_EXPAND` column.
    MvExpand,
    /// `SHOW` and `META` items.
    Show,
    /// `[name:value]` setting inside `ENRICH`.
    Setting,
    /// `LOOKUP` table.
    Lookup,
    /// `LOOKUP ... ON` field patterns.
    LookupField,
    /// `METRICS` sources.
    Metrics,
    /// After a `METRICS` source, deciding between another source and the aggregates.
    ClosingMetrics,
}

impl fmt::Display for LexerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LexerMode::Default => "default",
            LexerMode::Expression => "expression",
            LexerMode::Explain => "explain",
            LexerMode::From => "from",
            LexerMode::Project => "project",
            LexerMode::Rename => "rename",
            LexerMode::Enrich => "enrich",
            LexerMode::EnrichField => "enrich-field",
            LexerMode::MvExpand => "mv-expand",
            LexerMode::Show => "show",
            LexerMode::Setting => "setting",
            LexerMode::Lookup => "lookup",
            LexerMode::LookupField => "lookup-field",
            LexerMode::Metrics => "metrics",
            LexerMode::ClosingMetrics => "closing-metrics",
        };
        f.write_str(name)
    }
}

/// Mode change attached to a matched rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Transition {
    None,
    Push(LexerMode),
    /// Pushes the same mode twice (`[` in expressions).
    PushTwice(LexerMode),
    Pop,
    PopTwice,
    /// Pops the current mode and pushes another in its place.
    Replace(LexerMode),
}

/// Ordered stack of active modes.
///
/// The bottom `Default` entry is never removed, so the stack is never empty and
/// unbalanced pops on malformed input are absorbed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeStack {
    modes: Vec<LexerMode>,
}

impl ModeStack {
    /// Creates a stack holding only the default mode.
    pub fn new() -> Self {
        Self {
            modes: vec![LexerMode::Default],
        }
    }

    /// Returns the active mode.
    pub fn current(&self) -> LexerMode {
        self.modes.last().copied().unwrap_or(LexerMode::Default)
    }

    /// Returns the number of modes on the stack (at least one).
    pub fn depth(&self) -> usize {
        self.modes.len()
    }

    /// Pushes a mode.
    pub fn push(&mut self, mode: LexerMode) {
        self.modes.push(mode);
    }

    /// Pops the active mode, keeping the base entry.
    pub fn pop(&mut self) -> LexerMode {
        if self.modes.len() > 1 {
            self.modes.pop().unwrap_or(LexerMode::Default)
        } else {
            LexerMode::Default
        }
    }

    /// Applies a rule's mode transition.
    pub(crate) fn apply(&mut self, transition: Transition) {
        match transition {
            Transition::None => {}
            Transition::Push(mode) => self.push(mode),
            Transition::PushTwice(mode) => {
                self.push(mode);
                self.push(mode);
            }
            Transition::Pop => {
                self.pop();
            }
            Transition::PopTwice => {
                self.pop();
                self.pop();
            }
            Transition::Replace(mode) => {
                self.pop();
                self.push(mode);
            }
        }
    }

    /// Returns the modes from bottom to top.
    pub fn as_slice(&self) -> &[LexerMode] {
        &self.modes
    }
}

impl Default for ModeStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stack_starts_in_default_mode() {
        let stack = ModeStack::new();
        assert_eq!(stack.current(), LexerMode::Default);
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn pop_never_empties_the_stack() {
        let mut stack = ModeStack::new();
        stack.apply(Transition::PopTwice);
        stack.pop();
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.current(), LexerMode::Default);
    }

    #[test]
    fn transitions_update_the_top() {
        let mut stack = ModeStack::new();
        stack.apply(Transition::Push(LexerMode::Enrich));
        stack.apply(Transition::Push(LexerMode::EnrichField));
        assert_eq!(stack.current(), LexerMode::EnrichField);

        stack.apply(Transition::PopTwice);
        assert_eq!(stack.current(), LexerMode::Default);

        stack.apply(Transition::Push(LexerMode::Metrics));
        stack.apply(Transition::Replace(LexerMode::ClosingMetrics));
        assert_eq!(
            stack.as_slice(),
            &[LexerMode::Default, LexerMode::ClosingMetrics]
        );

        stack.apply(Transition::PushTwice(LexerMode::Expression));
        assert_eq!(stack.depth(), 4);
    }

    #[test]
    fn mode_names() {
        assert_eq!(LexerMode::EnrichField.to_string(), "enrich-field");
        assert_eq!(LexerMode::ClosingMetrics.to_string(), "closing-metrics");
    }
}

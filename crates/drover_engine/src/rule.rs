//! Rule declarations and their compiled form.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use drover_foundation::Result;
use drover_schema::Fact;

use crate::beta::Token;
use crate::engine::Engine;
use crate::pattern::Pattern;

/// Identifier of a registered rule.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(pub(crate) usize);

impl RuleId {
    /// Returns the registration index of this rule.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// The callable body of a rule.
///
/// Receives the engine (for reentrant `declare`/`retract`/`halt`) and
/// one fact per pattern, in pattern order.
pub type ActionFn = dyn Fn(&mut Engine, &[Fact]) -> Result<()>;

/// A rule declaration: name, salience, patterns, and action.
///
/// Delivered to [`Engine::register_rule`](crate::Engine::register_rule)
/// by whatever authoring surface produced it.
#[derive(Clone)]
pub struct Rule {
    /// Rule name, used in diagnostics and errors.
    pub name: String,
    /// Priority; higher fires first. Defaults to 0.
    pub salience: i32,
    /// Patterns, one per fact position of the match.
    pub patterns: Vec<Pattern>,
    /// The action invoked when the rule fires.
    pub action: Rc<ActionFn>,
}

impl Rule {
    /// Creates a rule with default salience and a no-op action.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            salience: 0,
            patterns: Vec::new(),
            action: Rc::new(|_, _| Ok(())),
        }
    }

    /// Sets the salience (priority).
    #[must_use]
    pub fn with_salience(mut self, salience: i32) -> Self {
        self.salience = salience;
        self
    }

    /// Appends a pattern.
    #[must_use]
    pub fn with_pattern(mut self, pattern: Pattern) -> Self {
        self.patterns.push(pattern);
        self
    }

    /// Sets the action.
    #[must_use]
    pub fn with_action<F>(mut self, action: F) -> Self
    where
        F: Fn(&mut Engine, &[Fact]) -> Result<()> + 'static,
    {
        self.action = Rc::new(action);
        self
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("salience", &self.salience)
            .field("patterns", &self.patterns.len())
            .finish_non_exhaustive()
    }
}

/// A rule wired into the network.
///
/// The token map is the rule's terminal memory: every complete match
/// currently derivable, with the sequence number of its activation.
/// A token stays recorded after firing, which is what prevents the
/// same `(rule, token)` from reactivating until it is withdrawn and
/// re-derived.
pub(crate) struct CompiledRule {
    pub name: String,
    pub salience: i32,
    pub action: Rc<ActionFn>,
    /// Terminal memory: complete tokens and their activation sequence.
    pub tokens: HashMap<Token, u64>,
}

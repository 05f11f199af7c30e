//! Beta network: hash-indexed join nodes over partial matches.
//!
//! Each rule compiles to a linear chain of join nodes, one per
//! pattern. A join combines the tokens arriving from upstream (left)
//! with the facts of an alpha memory (right) using a hash index keyed
//! on the binding variables the patterns share. Joins are not shared
//! between rules; alpha memories are.

use std::collections::HashMap;

use drover_foundation::{FactId, Value};
use drover_schema::Fact;

use crate::alpha::AlphaMemoryId;
use crate::pattern::ConstraintOp;
use crate::rule::RuleId;
use crate::wm::FactStore;

// =============================================================================
// Tokens
// =============================================================================

/// An ordered tuple of fact ids: a partial or complete match of the
/// first k patterns of a rule.
///
/// Tokens are value-equal iff their id tuples are equal.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Token(Vec<FactId>);

impl Token {
    /// The empty token held by the dummy top of every chain.
    #[must_use]
    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    /// Returns a new token with `id` appended.
    #[must_use]
    pub fn extend(&self, id: FactId) -> Self {
        let mut ids = self.0.clone();
        ids.push(id);
        Self(ids)
    }

    /// The fact ids of this token, in pattern order.
    #[must_use]
    pub fn ids(&self) -> &[FactId] {
        &self.0
    }

    /// Returns true if the token includes the given fact.
    #[must_use]
    pub fn contains(&self, id: FactId) -> bool {
        self.0.contains(&id)
    }

    /// Number of facts matched so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true for the empty (dummy top) token.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Token")?;
        f.debug_list().entries(self.0.iter()).finish()
    }
}

impl FromIterator<FactId> for Token {
    fn from_iter<I: IntoIterator<Item = FactId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// =============================================================================
// Join nodes
// =============================================================================

/// Index of a join node within the engine's node table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct JoinId(pub(crate) usize);

/// A position inside an already-matched token: pattern index plus
/// field index within that pattern's fact.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TokenField {
    /// Pattern position within the token.
    pub pattern: usize,
    /// Field index within that fact.
    pub field: usize,
}

/// One equality component of a join's hash key: a shared binding
/// variable resolved on both sides.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JoinKey {
    /// Where the variable was bound on the left (token) side.
    pub left: TokenField,
    /// Field index carrying the variable on the right (fact) side.
    pub right: usize,
}

/// A cross-fact comparison applied after the hash probe.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JoinTest {
    /// Operand position on the left (token) side.
    pub left: TokenField,
    /// Comparison operator.
    pub op: ConstraintOp,
    /// Operand field on the right (fact) side.
    pub right: usize,
}

impl JoinTest {
    /// Evaluates this test for a token/fact pair.
    ///
    /// Missing token facts fail the test; with intact propagation they
    /// never occur.
    #[must_use]
    pub fn evaluate(&self, token: &Token, fact: &Fact, wm: &FactStore) -> bool {
        let Some(left_id) = token.ids().get(self.left.pattern) else {
            return false;
        };
        let Some(left_fact) = wm.get(*left_id) else {
            return false;
        };
        self.op
            .compare(left_fact.field(self.left.field), fact.field(self.right))
    }
}

/// Where a join's extended tokens go.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum JoinOutput {
    /// Left input of the next join in the chain.
    Join(JoinId),
    /// Terminal of the owning rule: the token is a complete match.
    Terminal(RuleId),
}

/// A hash join between an upstream beta memory and an alpha memory.
///
/// The left index holds upstream tokens keyed by the join key; the
/// right index holds alpha-memory facts keyed the same way. An empty
/// key puts everything in one bucket, degenerating to the Cartesian
/// product, which is the required semantics for patterns that share no
/// variables.
#[derive(Debug)]
pub struct JoinNode {
    /// Rule this join belongs to.
    pub rule: RuleId,
    /// Pattern position within the rule (0-based).
    pub level: usize,
    /// Alpha memory feeding the right input.
    pub alpha: AlphaMemoryId,
    /// Equality components of the hash key.
    pub key: Vec<JoinKey>,
    /// Additional comparisons applied after the probe.
    pub tests: Vec<JoinTest>,
    /// Upstream tokens by join key. Unused at level 0, where the only
    /// left input is the dummy empty token.
    pub left_index: HashMap<Vec<Value>, Vec<Token>>,
    /// Right-input facts by join key.
    pub right_index: HashMap<Vec<Value>, Vec<FactId>>,
    /// Downstream target.
    pub output: JoinOutput,
}

impl JoinNode {
    /// Computes the join key of an upstream token.
    ///
    /// Returns `None` if any of the token's facts is no longer in
    /// working memory; with intact propagation that never occurs and
    /// callers drop the token defensively.
    #[must_use]
    pub fn left_key(&self, token: &Token, wm: &FactStore) -> Option<Vec<Value>> {
        self.key
            .iter()
            .map(|component| {
                let id = *token.ids().get(component.left.pattern)?;
                Some(wm.get(id)?.field(component.left.field).clone())
            })
            .collect()
    }

    /// Computes the join key of a right-input fact.
    #[must_use]
    pub fn right_key(&self, fact: &Fact) -> Vec<Value> {
        self.key
            .iter()
            .map(|component| fact.field(component.right).clone())
            .collect()
    }

    /// Applies the post-probe tests for a token/fact pair.
    #[must_use]
    pub fn passes_tests(&self, token: &Token, fact: &Fact, wm: &FactStore) -> bool {
        self.tests.iter().all(|t| t.evaluate(token, fact, wm))
    }

    /// Records an upstream token under its join key.
    pub fn insert_left(&mut self, key: Vec<Value>, token: Token) {
        self.left_index.entry(key).or_default().push(token);
    }

    /// Records a right-input fact under its join key.
    pub fn insert_right(&mut self, key: Vec<Value>, id: FactId) {
        self.right_index.entry(key).or_default().push(id);
    }

    /// Tokens currently matching the given right key.
    #[must_use]
    pub fn left_matches(&self, key: &[Value]) -> Vec<Token> {
        if self.level == 0 {
            return vec![Token::empty()];
        }
        self.left_index.get(key).cloned().unwrap_or_default()
    }

    /// Facts currently matching the given left key.
    #[must_use]
    pub fn right_matches(&self, key: &[Value]) -> Vec<FactId> {
        self.right_index.get(key).cloned().unwrap_or_default()
    }

    /// Withdraws everything involving a retracted fact: the fact from
    /// the right index and every upstream token containing it from the
    /// left index.
    pub fn retract_fact(&mut self, id: FactId) {
        self.right_index.retain(|_, ids| {
            ids.retain(|&f| f != id);
            !ids.is_empty()
        });
        self.left_index.retain(|_, tokens| {
            tokens.retain(|t| !t.contains(id));
            !tokens.is_empty()
        });
    }

    /// Clears both memories, preserving the compiled wiring.
    pub fn clear(&mut self) {
        self.left_index.clear();
        self.right_index.clear();
    }

    /// Number of tokens held in the left memory.
    #[must_use]
    pub fn left_len(&self) -> usize {
        self.left_index.values().map(Vec::len).sum()
    }

    /// Number of facts held in the right memory.
    #[must_use]
    pub fn right_len(&self) -> usize {
        self.right_index.values().map(Vec::len).sum()
    }
}

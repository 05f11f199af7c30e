//! Conflict-resolution agenda.
//!
//! Activations are ordered by salience (higher first), then by
//! sequence number (lower first, i.e. FIFO among equal salience).
//! A secondary index from `(rule, token)` supports O(log n) removal
//! when a supporting token is withdrawn.

use std::collections::{BTreeSet, HashMap};

use crate::beta::Token;
use crate::rule::RuleId;

/// A complete rule match eligible to fire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Activation {
    /// The matched rule.
    pub rule: RuleId,
    /// The complete token (one fact id per pattern).
    pub token: Token,
    /// Salience of the rule at activation time.
    pub salience: i32,
    /// Creation sequence number; breaks salience ties FIFO.
    pub seq: u64,
}

/// Ordering key: higher salience first, then lower sequence number.
/// The remaining fields only make the order total.
#[derive(Clone, Debug, PartialEq, Eq)]
struct AgendaEntry {
    salience: i32,
    seq: u64,
    rule: RuleId,
    token: Token,
}

impl Ord for AgendaEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        other
            .salience
            .cmp(&self.salience)
            .then_with(|| self.seq.cmp(&other.seq))
            .then_with(|| self.rule.cmp(&other.rule))
            .then_with(|| self.token.cmp(&other.token))
    }
}

impl PartialOrd for AgendaEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Priority-ordered set of pending activations.
#[derive(Debug, Default)]
pub struct Agenda {
    entries: BTreeSet<AgendaEntry>,
    index: HashMap<(RuleId, Token), (i32, u64)>,
}

impl Agenda {
    /// Creates an empty agenda.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an activation.
    ///
    /// There is at most one live activation per `(rule, token)` pair;
    /// inserting a duplicate replaces nothing and is ignored.
    pub fn insert(&mut self, activation: Activation) {
        let key = (activation.rule, activation.token.clone());
        if self.index.contains_key(&key) {
            debug_assert!(false, "duplicate activation for {key:?}");
            return;
        }
        self.index.insert(key, (activation.salience, activation.seq));
        self.entries.insert(AgendaEntry {
            salience: activation.salience,
            seq: activation.seq,
            rule: activation.rule,
            token: activation.token,
        });
    }

    /// Removes the pending activation for a `(rule, token)` pair.
    ///
    /// Returns true if one was pending.
    pub fn remove(&mut self, rule: RuleId, token: &Token) -> bool {
        let Some((salience, seq)) = self.index.remove(&(rule, token.clone())) else {
            return false;
        };
        self.entries.remove(&AgendaEntry {
            salience,
            seq,
            rule,
            token: token.clone(),
        })
    }

    /// Pops the highest-priority activation.
    pub fn pop(&mut self) -> Option<Activation> {
        let entry = self.entries.pop_first()?;
        self.index.remove(&(entry.rule, entry.token.clone()));
        Some(Activation {
            rule: entry.rule,
            token: entry.token,
            salience: entry.salience,
            seq: entry.seq,
        })
    }

    /// Number of pending activations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Discards every pending activation.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }
}

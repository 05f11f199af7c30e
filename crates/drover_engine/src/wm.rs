//! Working memory: the store of live facts.

use std::collections::{HashMap, HashSet};

use drover_foundation::{FactId, FactTypeId};
use drover_schema::Fact;

/// Working-memory store mapping fact ids to facts.
///
/// Ids are issued from a monotonic counter and never reused within an
/// engine lifetime. Declaring the same fact value twice yields two
/// distinct ids (bag semantics).
#[derive(Debug, Default)]
pub struct FactStore {
    facts: HashMap<FactId, Fact>,
    by_type: HashMap<FactTypeId, HashSet<FactId>>,
    next_id: u64,
}

impl FactStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a fact, assigning it the next id.
    pub fn insert(&mut self, fact: Fact) -> FactId {
        let id = FactId::new(self.next_id);
        self.next_id += 1;
        self.by_type.entry(fact.type_id()).or_default().insert(id);
        self.facts.insert(id, fact);
        id
    }

    /// Removes a fact, returning it if present.
    pub fn remove(&mut self, id: FactId) -> Option<Fact> {
        let fact = self.facts.remove(&id)?;
        if let Some(ids) = self.by_type.get_mut(&fact.type_id()) {
            ids.remove(&id);
        }
        Some(fact)
    }

    /// Looks up a fact by id.
    #[must_use]
    pub fn get(&self, id: FactId) -> Option<&Fact> {
        self.facts.get(&id)
    }

    /// Returns true if the id is live.
    #[must_use]
    pub fn contains(&self, id: FactId) -> bool {
        self.facts.contains_key(&id)
    }

    /// Returns the number of live facts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    /// Returns true if no facts are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Returns the live ids of the given fact type, in issue order.
    #[must_use]
    pub fn ids_of_type(&self, ty: FactTypeId) -> Vec<FactId> {
        let mut ids: Vec<FactId> = self
            .by_type
            .get(&ty)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        ids.sort_unstable();
        ids
    }

    /// Clears all facts and restarts the id counter.
    pub fn reset(&mut self) {
        self.facts.clear();
        self.by_type.clear();
        self.next_id = 0;
    }
}

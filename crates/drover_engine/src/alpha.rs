//! Alpha network: single-fact discrimination memories.
//!
//! Each alpha memory holds the ids of facts that pass one canonical
//! `(fact type, constraint set)` filter. Memories are interned by key
//! so that two rules with semantically equal filters share one memory,
//! and each memory keeps the list of join nodes fed by it.

use std::collections::{HashMap, HashSet};

use drover_foundation::{FactId, FactTypeId, Value};
use drover_schema::Fact;

use crate::beta::JoinId;
use crate::pattern::ConstraintOp;

// =============================================================================
// Alpha tests and keys
// =============================================================================

/// A compiled intra-fact test with the field resolved to its index.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AlphaTest {
    /// Compare a field against a literal.
    Compare {
        /// Field index in schema order.
        field: usize,
        /// Comparison operator.
        op: ConstraintOp,
        /// The literal operand.
        literal: Value,
    },
    /// Field membership in a sorted literal collection.
    Member {
        /// Field index in schema order.
        field: usize,
        /// Collection elements, canonically sorted.
        values: Vec<Value>,
    },
}

impl AlphaTest {
    /// Evaluates this test against a fact.
    #[must_use]
    pub fn matches(&self, fact: &Fact) -> bool {
        match self {
            Self::Compare { field, op, literal } => op.compare(fact.field(*field), literal),
            Self::Member { field, values } => values.contains(fact.field(*field)),
        }
    }

    /// Canonical sort key: field index, operator, rendered operand.
    fn sort_key(&self) -> (usize, ConstraintOp, String) {
        match self {
            Self::Compare { field, op, literal } => (*field, *op, format!("{literal:?}")),
            Self::Member { field, values } => (*field, ConstraintOp::In, format!("{values:?}")),
        }
    }
}

/// Canonical identity of an alpha memory.
///
/// Construction sorts the tests by field, operator, and operand so
/// that semantically equal constraint sets produce equal keys.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AlphaKey {
    /// Fact type the memory filters.
    pub fact_type: FactTypeId,
    /// Canonically ordered tests.
    pub tests: Vec<AlphaTest>,
}

impl AlphaKey {
    /// Creates a canonical key from a fact type and tests.
    #[must_use]
    pub fn new(fact_type: FactTypeId, mut tests: Vec<AlphaTest>) -> Self {
        tests.sort_by_key(AlphaTest::sort_key);
        Self { fact_type, tests }
    }
}

// =============================================================================
// Alpha memories
// =============================================================================

/// Index of an alpha memory within the network.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct AlphaMemoryId(pub(crate) usize);

/// One alpha memory: facts passing a canonical filter, plus the join
/// nodes whose right input this memory feeds.
#[derive(Debug)]
pub struct AlphaMemory {
    key: AlphaKey,
    /// Ids of facts currently passing the filter.
    pub facts: HashSet<FactId>,
    /// Join nodes fed by this memory.
    pub successors: Vec<JoinId>,
}

impl AlphaMemory {
    fn new(key: AlphaKey) -> Self {
        Self {
            key,
            facts: HashSet::new(),
            successors: Vec::new(),
        }
    }

    /// Returns the canonical key of this memory.
    #[must_use]
    pub fn key(&self) -> &AlphaKey {
        &self.key
    }

    /// Evaluates the full constraint set against a fact.
    #[must_use]
    pub fn accepts(&self, fact: &Fact) -> bool {
        fact.type_id() == self.key.fact_type && self.key.tests.iter().all(|t| t.matches(fact))
    }
}

/// The alpha network: interned memories plus a per-type subscriber
/// list used to route incoming facts.
#[derive(Debug, Default)]
pub struct AlphaNet {
    memories: Vec<AlphaMemory>,
    by_key: HashMap<AlphaKey, AlphaMemoryId>,
    by_type: HashMap<FactTypeId, Vec<AlphaMemoryId>>,
}

impl AlphaNet {
    /// Creates an empty network.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up or creates the memory for a canonical key.
    ///
    /// Returns the memory id and whether it was newly created.
    pub fn intern(&mut self, key: AlphaKey) -> (AlphaMemoryId, bool) {
        if let Some(&id) = self.by_key.get(&key) {
            return (id, false);
        }
        let id = AlphaMemoryId(self.memories.len());
        self.by_type.entry(key.fact_type).or_default().push(id);
        self.by_key.insert(key.clone(), id);
        self.memories.push(AlphaMemory::new(key));
        (id, true)
    }

    /// Returns a memory by id.
    ///
    /// # Panics
    ///
    /// Panics if the id was not produced by this network.
    #[must_use]
    pub fn memory(&self, id: AlphaMemoryId) -> &AlphaMemory {
        &self.memories[id.0]
    }

    /// Returns a memory mutably by id.
    ///
    /// # Panics
    ///
    /// Panics if the id was not produced by this network.
    pub fn memory_mut(&mut self, id: AlphaMemoryId) -> &mut AlphaMemory {
        &mut self.memories[id.0]
    }

    /// Returns the number of memories in the network.
    #[must_use]
    pub fn len(&self) -> usize {
        self.memories.len()
    }

    /// Returns true if the network has no memories.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.memories.is_empty()
    }

    /// Routes an asserted fact into every subscribed memory whose
    /// filter it passes. Returns the memories entered.
    pub fn insert(&mut self, id: FactId, fact: &Fact) -> Vec<AlphaMemoryId> {
        let Some(subscribed) = self.by_type.get(&fact.type_id()) else {
            return Vec::new();
        };
        let mut entered = Vec::new();
        for &mem_id in subscribed {
            let memory = &mut self.memories[mem_id.0];
            if memory.accepts(fact) {
                memory.facts.insert(id);
                entered.push(mem_id);
            }
        }
        entered
    }

    /// Removes a retracted fact from every memory holding it.
    /// Returns the memories left.
    pub fn remove(&mut self, id: FactId, fact: &Fact) -> Vec<AlphaMemoryId> {
        let Some(subscribed) = self.by_type.get(&fact.type_id()) else {
            return Vec::new();
        };
        let mut left = Vec::new();
        for &mem_id in subscribed {
            if self.memories[mem_id.0].facts.remove(&id) {
                left.push(mem_id);
            }
        }
        left
    }

    /// Clears the contents of every memory, preserving the compiled
    /// network structure.
    pub fn clear(&mut self) {
        for memory in &mut self.memories {
            memory.facts.clear();
        }
    }
}

//! Immutable fact records.

use std::fmt;

use drover_foundation::{FactTypeId, Value};

/// A validated, immutable record of a declared fact type.
///
/// Field values are stored positionally in schema declaration order;
/// access goes through a compiled index, not a name lookup. Facts are
/// built through [`SchemaRegistry::build`](crate::SchemaRegistry::build)
/// so every instance reaching the engine has already been validated.
#[derive(Clone, PartialEq, Eq)]
pub struct Fact {
    ty: FactTypeId,
    values: Vec<Value>,
}

impl Fact {
    /// Creates a fact from already-validated parts.
    ///
    /// Callers outside this crate should prefer
    /// [`SchemaRegistry::build`](crate::SchemaRegistry::build).
    #[must_use]
    pub fn from_parts(ty: FactTypeId, values: Vec<Value>) -> Self {
        Self { ty, values }
    }

    /// Returns the fact type of this record.
    #[must_use]
    pub const fn type_id(&self) -> FactTypeId {
        self.ty
    }

    /// Returns the value at a compiled field index.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds for the schema; indices
    /// produced by pattern compilation are always in range.
    #[must_use]
    pub fn field(&self, index: usize) -> &Value {
        &self.values[index]
    }

    /// Returns the value at a field index, if in range.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Returns all field values in schema order.
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

impl fmt::Debug for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fact")
            .field("ty", &self.ty)
            .field("values", &self.values)
            .finish()
    }
}

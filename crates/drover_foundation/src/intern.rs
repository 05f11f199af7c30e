//! String interning for fact-type and field names.
//!
//! Fact-type and field names are interned to enable fast equality
//! comparison during pattern matching; compiled patterns and schemas
//! carry interned ids rather than strings.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Interned fact-type identifier.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct FactTypeId(pub(crate) u32);

impl FactTypeId {
    /// Returns the raw index of this fact type.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for FactTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FactTypeId({})", self.0)
    }
}

/// Interned field-name identifier.
///
/// Field names share one id space across all fact types; a schema maps
/// each of its field ids to a positional index.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct FieldId(pub(crate) u32);

impl FieldId {
    /// Returns the raw index of this field name.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldId({})", self.0)
    }
}

/// Interner for fact-type and field names.
///
/// The two id spaces are independent: the same string may be both a
/// fact-type name and a field name. Not thread-safe; use external
/// synchronization if needed.
#[derive(Clone, Debug, Default)]
pub struct Interner {
    /// Fact-type name storage.
    types: Vec<Arc<str>>,
    /// Map from fact-type name to id.
    type_map: HashMap<Arc<str>, FactTypeId>,
    /// Field name storage.
    fields: Vec<Arc<str>>,
    /// Map from field name to id.
    field_map: HashMap<Arc<str>, FieldId>,
}

impl Interner {
    /// Creates a new empty interner.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns a fact-type name, returning its [`FactTypeId`].
    ///
    /// # Panics
    ///
    /// Panics if the number of interned fact types exceeds `u32::MAX`.
    pub fn intern_type(&mut self, name: &str) -> FactTypeId {
        if let Some(&id) = self.type_map.get(name) {
            return id;
        }

        let idx = u32::try_from(self.types.len()).expect("too many fact types");
        let arc: Arc<str> = name.into();
        self.types.push(arc.clone());

        let id = FactTypeId(idx);
        self.type_map.insert(arc, id);
        id
    }

    /// Looks up a fact-type id without interning.
    #[must_use]
    pub fn type_id(&self, name: &str) -> Option<FactTypeId> {
        self.type_map.get(name).copied()
    }

    /// Gets the name for a fact type.
    #[must_use]
    pub fn type_name(&self, id: FactTypeId) -> Option<&str> {
        self.types.get(id.0 as usize).map(AsRef::as_ref)
    }

    /// Interns a field name, returning its [`FieldId`].
    ///
    /// # Panics
    ///
    /// Panics if the number of interned field names exceeds `u32::MAX`.
    pub fn intern_field(&mut self, name: &str) -> FieldId {
        if let Some(&id) = self.field_map.get(name) {
            return id;
        }

        let idx = u32::try_from(self.fields.len()).expect("too many field names");
        let arc: Arc<str> = name.into();
        self.fields.push(arc.clone());

        let id = FieldId(idx);
        self.field_map.insert(arc, id);
        id
    }

    /// Looks up a field id without interning.
    #[must_use]
    pub fn field_id(&self, name: &str) -> Option<FieldId> {
        self.field_map.get(name).copied()
    }

    /// Gets the name for a field.
    #[must_use]
    pub fn field_name(&self, id: FieldId) -> Option<&str> {
        self.fields.get(id.0 as usize).map(AsRef::as_ref)
    }

    /// Returns the number of interned fact types.
    #[must_use]
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Returns the number of interned field names.
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}

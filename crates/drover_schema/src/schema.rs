//! Schema definitions for fact types.
//!
//! Schemas declare the named, typed fields of a fact type. Field
//! position within the schema is the compiled accessor index used by
//! facts and patterns at runtime.

use drover_foundation::{FactTypeId, FieldId, Type, Value};

/// Schema definition for a fact type.
#[derive(Clone, Debug, PartialEq)]
pub struct FactSchema {
    /// Fact-type name (interned).
    pub ty: FactTypeId,
    /// Field definitions; declaration order fixes field indices.
    pub fields: Vec<FieldSchema>,
}

impl FactSchema {
    /// Creates a new fact schema with no fields.
    #[must_use]
    pub fn new(ty: FactTypeId) -> Self {
        Self {
            ty,
            fields: Vec::new(),
        }
    }

    /// Adds a field to the schema.
    #[must_use]
    pub fn with_field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    /// Returns the field schema by name.
    #[must_use]
    pub fn field(&self, name: FieldId) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns the positional index of a field by name.
    #[must_use]
    pub fn field_index(&self, name: FieldId) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// Schema definition for a fact field.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldSchema {
    /// Field name (interned).
    pub name: FieldId,
    /// Field type.
    pub ty: Type,
    /// Default value if not provided.
    pub default: Option<Value>,
    /// Whether the field is required.
    pub required: bool,
}

impl FieldSchema {
    /// Creates a required field with no default.
    #[must_use]
    pub fn required(name: FieldId, ty: Type) -> Self {
        Self {
            name,
            ty,
            default: None,
            required: true,
        }
    }

    /// Creates an optional field with a default value.
    #[must_use]
    pub fn optional(name: FieldId, ty: Type, default: Value) -> Self {
        Self {
            name,
            ty,
            default: Some(default),
            required: false,
        }
    }
}

//! Registry of declared fact types.
//!
//! The registry owns the interner and every registered [`FactSchema`].
//! It is the single entry point for building validated facts.

use std::collections::HashMap;

use drover_foundation::{Error, FactTypeId, FieldId, Interner, Result, Value};

use crate::fact::Fact;
use crate::schema::FactSchema;

/// Registry of fact-type schemas.
#[derive(Clone, Debug, Default)]
pub struct SchemaRegistry {
    interner: Interner,
    schemas: HashMap<FactTypeId, FactSchema>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a reference to the interner.
    #[must_use]
    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    /// Returns a mutable reference to the interner.
    pub fn interner_mut(&mut self) -> &mut Interner {
        &mut self.interner
    }

    /// Registers a fact-type schema.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::DuplicateFactType`](drover_foundation::ErrorKind::DuplicateFactType)
    /// if a schema for the same type is already registered.
    pub fn register(&mut self, schema: FactSchema) -> Result<FactTypeId> {
        let ty = schema.ty;
        if self.schemas.contains_key(&ty) {
            return Err(Error::duplicate_fact_type(self.type_name(ty)));
        }
        self.schemas.insert(ty, schema);
        Ok(ty)
    }

    /// Returns the schema for a fact type.
    #[must_use]
    pub fn schema(&self, ty: FactTypeId) -> Option<&FactSchema> {
        self.schemas.get(&ty)
    }

    /// Returns the schema for a fact type, or an error naming it.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::UnknownFactType`](drover_foundation::ErrorKind::UnknownFactType)
    /// if the type has no registered schema.
    pub fn require_schema(&self, ty: FactTypeId) -> Result<&FactSchema> {
        self.schemas
            .get(&ty)
            .ok_or_else(|| Error::unknown_fact_type(self.type_name(ty)))
    }

    /// Returns the number of registered fact types.
    #[must_use]
    pub fn type_count(&self) -> usize {
        self.schemas.len()
    }

    /// Resolves a fact-type name to its id, if interned.
    #[must_use]
    pub fn type_id(&self, name: &str) -> Option<FactTypeId> {
        self.interner.type_id(name)
    }

    /// Resolves a field name to its id, if interned.
    #[must_use]
    pub fn field_id(&self, name: &str) -> Option<FieldId> {
        self.interner.field_id(name)
    }

    /// Returns the display name of a fact type.
    #[must_use]
    pub fn type_name(&self, ty: FactTypeId) -> String {
        self.interner
            .type_name(ty)
            .unwrap_or("<unknown>")
            .to_string()
    }

    /// Returns the display name of a field.
    #[must_use]
    pub fn field_name(&self, field: FieldId) -> String {
        self.interner
            .field_name(field)
            .unwrap_or("<unknown>")
            .to_string()
    }

    /// Builds a validated fact of the given type.
    ///
    /// Fields may be supplied in any order. Optional fields fall back
    /// to their declared defaults.
    ///
    /// # Errors
    ///
    /// - `UnknownFactType` if `ty` has no registered schema
    /// - `UnknownField` if a supplied field is not declared
    /// - `TypeMismatch` if a supplied value does not match the declared type
    /// - `MissingField` if a required field is absent
    pub fn build(&self, ty: FactTypeId, fields: &[(FieldId, Value)]) -> Result<Fact> {
        let schema = self.require_schema(ty)?;
        let type_name = self.type_name(ty);

        let mut values: Vec<Option<Value>> = vec![None; schema.fields.len()];
        for (field, value) in fields {
            let Some(index) = schema.field_index(*field) else {
                return Err(Error::unknown_field(&type_name, self.field_name(*field)));
            };
            let declared = schema.fields[index].ty;
            if value.value_type() != declared {
                return Err(Error::type_mismatch(declared, value.value_type()));
            }
            values[index] = Some(value.clone());
        }

        let mut resolved = Vec::with_capacity(schema.fields.len());
        for (index, slot) in values.into_iter().enumerate() {
            let field = &schema.fields[index];
            match slot {
                Some(value) => resolved.push(value),
                None => match &field.default {
                    Some(default) => resolved.push(default.clone()),
                    None => {
                        return Err(Error::missing_field(
                            &type_name,
                            self.field_name(field.name),
                        ));
                    }
                },
            }
        }

        Ok(Fact::from_parts(ty, resolved))
    }
}

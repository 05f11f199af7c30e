//! Fact-type schemas and validated fact records for Drover.
//!
//! This crate is the boundary between user data and the engine: a
//! [`SchemaRegistry`] holds the declared fact types, and every
//! [`Fact`] handed to the engine is built through the registry so the
//! engine never has to re-validate field names or types.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod fact;
pub mod registry;
pub mod schema;

pub use fact::Fact;
pub use registry::SchemaRegistry;
pub use schema::{FactSchema, FieldSchema};

//! Drover - forward-chaining production-rule engine
//!
//! This crate re-exports all layers of the Drover system for convenient
//! access. For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 2: drover_engine     — Rete network, agenda, engine facade
//! Layer 1: drover_schema     — fact-type schemas, validation, fact records
//! Layer 0: drover_foundation — core types (Value, FactId, Error)
//! ```

pub use drover_engine as engine;
pub use drover_foundation as foundation;
pub use drover_schema as schema;

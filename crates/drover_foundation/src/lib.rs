//! Core types for the Drover rule engine.
//!
//! This crate provides:
//! - [`Value`] - The field value type carried by facts and pattern literals
//! - [`Type`] - Type descriptors for fact schema validation
//! - [`FactId`] - Monotonic working-memory identifiers
//! - [`Error`] - Rich error types with rule context
//! - String interning ([`FactTypeId`], [`FieldId`], [`Interner`])

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod fact_id;
pub mod intern;
pub mod types;
pub mod value;

// Re-export primary types at crate root for convenience
pub use error::{Error, ErrorKind};
pub use fact_id::FactId;
pub use intern::{FactTypeId, FieldId, Interner};
pub use types::Type;
pub use value::Value;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

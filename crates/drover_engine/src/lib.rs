//! Rete network, conflict-resolution agenda, and engine facade.
//!
//! This crate provides:
//! - [`Pattern`] - Pattern IR and compilation
//! - [`AlphaNet`] - Shared single-fact discrimination memories
//! - [`JoinNode`] - Hash-indexed multi-fact joins
//! - [`Agenda`] - Salience-ordered conflict resolution
//! - [`Engine`] - The facade: declare / retract / run / reset
//!
//! # Example
//!
//! ```
//! use drover_engine::{ConstraintOp, Engine, Pattern, Rule};
//! use drover_foundation::{Type, Value};
//! use drover_schema::{FactSchema, FieldSchema, SchemaRegistry};
//!
//! # fn main() -> drover_foundation::Result<()> {
//! let mut registry = SchemaRegistry::new();
//! let patient = registry.interner_mut().intern_type("Patient");
//! let heartbeat = registry.interner_mut().intern_field("heartbeat");
//! registry.register(
//!     FactSchema::new(patient).with_field(FieldSchema::required(heartbeat, Type::Int)),
//! )?;
//!
//! let mut engine = Engine::new(registry);
//! engine.register_rule(
//!     Rule::new("tachycardia")
//!         .with_salience(100)
//!         .with_pattern(Pattern::new(patient).with_test(heartbeat, ConstraintOp::Gt, 120i64))
//!         .with_action(|_, facts| {
//!             println!("elevated heartbeat: {}", facts[0].field(0));
//!             Ok(())
//!         }),
//! )?;
//!
//! let fact = engine
//!     .registry()
//!     .build(patient, &[(heartbeat, Value::Int(145))])?;
//! engine.declare(fact)?;
//! assert_eq!(engine.run(None)?, 1);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow large error types - our Error has rich context
#![allow(clippy::result_large_err)]
// Allow missing error docs for now
#![allow(clippy::missing_errors_doc)]

pub mod agenda;
pub mod alpha;
pub mod beta;
pub mod engine;
pub mod pattern;
pub mod rule;
pub mod wm;

// Agenda and activations
pub use agenda::{Activation, Agenda};

// Alpha network
pub use alpha::{AlphaKey, AlphaMemory, AlphaMemoryId, AlphaNet, AlphaTest};

// Beta network
pub use beta::{JoinId, JoinKey, JoinNode, JoinOutput, JoinTest, Token, TokenField};

// Engine facade
pub use engine::Engine;

// Pattern IR
pub use pattern::{
    compile_pattern, CompiledPattern, Constraint, ConstraintOp, ConstraintTarget, Pattern,
};

// Rules
pub use rule::{ActionFn, Rule, RuleId};

// Working memory
pub use wm::FactStore;

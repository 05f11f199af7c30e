//! Pattern IR and pattern compilation.
//!
//! A [`Pattern`] describes one fact position of a rule: the fact type,
//! the intra-fact constraints, and the variable bindings. Compilation
//! resolves field names to positional indices against the registry and
//! performs every schema check the engine relies on at runtime.

use drover_foundation::{Error, FactTypeId, FieldId, Result, Type, Value};
use drover_schema::SchemaRegistry;

use crate::alpha::{AlphaKey, AlphaTest};

// =============================================================================
// Constraint operators
// =============================================================================

/// Comparison operator of a pattern constraint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConstraintOp {
    /// Equality by value.
    Eq,
    /// Inequality by value.
    Ne,
    /// Strictly less than.
    Lt,
    /// Less than or equal.
    Le,
    /// Strictly greater than.
    Gt,
    /// Greater than or equal.
    Ge,
    /// Membership in a literal collection.
    In,
}

impl ConstraintOp {
    /// Returns true for the ordering operators, which require an
    /// ordered field type.
    #[must_use]
    pub const fn is_ordering(self) -> bool {
        matches!(self, Self::Lt | Self::Le | Self::Gt | Self::Ge)
    }

    /// The operator's spelling in diagnostics.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Lt => "lt",
            Self::Le => "lte",
            Self::Gt => "gt",
            Self::Ge => "gte",
            Self::In => "in",
        }
    }

    /// Applies the operator to two values.
    ///
    /// Ordering on values of incomparable types yields false; compiled
    /// patterns never reach that case because operand types are
    /// checked at compile time.
    #[must_use]
    pub fn compare(self, lhs: &Value, rhs: &Value) -> bool {
        match self {
            Self::Eq => lhs == rhs,
            Self::Ne => lhs != rhs,
            Self::Lt => matches!(lhs.partial_cmp(rhs), Some(std::cmp::Ordering::Less)),
            Self::Le => matches!(
                lhs.partial_cmp(rhs),
                Some(std::cmp::Ordering::Less | std::cmp::Ordering::Equal)
            ),
            Self::Gt => matches!(lhs.partial_cmp(rhs), Some(std::cmp::Ordering::Greater)),
            Self::Ge => matches!(
                lhs.partial_cmp(rhs),
                Some(std::cmp::Ordering::Greater | std::cmp::Ordering::Equal)
            ),
            Self::In => false, // membership is evaluated against a collection
        }
    }
}

impl std::fmt::Display for ConstraintOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

// =============================================================================
// Pattern IR
// =============================================================================

/// Right-hand side of a constraint.
#[derive(Clone, Debug, PartialEq)]
pub enum ConstraintTarget {
    /// A literal value, fixed at compile time.
    Literal(Value),
    /// A literal collection for membership tests.
    OneOf(Vec<Value>),
    /// A variable bound by an earlier pattern of the same rule.
    Var(String),
}

/// A single intra-fact constraint: `(field, op, target)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Constraint {
    /// Constrained field, by interned name.
    pub field: FieldId,
    /// Comparison operator.
    pub op: ConstraintOp,
    /// What the field is compared against.
    pub target: ConstraintTarget,
}

/// One pattern of a rule: fact type, constraints, and bindings.
#[derive(Clone, Debug, PartialEq)]
pub struct Pattern {
    /// Fact type this pattern matches.
    pub fact_type: FactTypeId,
    /// Intra-fact constraints.
    pub constraints: Vec<Constraint>,
    /// Variable bindings `(field, variable)`.
    pub bindings: Vec<(FieldId, String)>,
}

impl Pattern {
    /// Creates an unconstrained pattern for a fact type.
    #[must_use]
    pub fn new(fact_type: FactTypeId) -> Self {
        Self {
            fact_type,
            constraints: Vec::new(),
            bindings: Vec::new(),
        }
    }

    /// Adds a literal constraint.
    #[must_use]
    pub fn with_test(mut self, field: FieldId, op: ConstraintOp, value: impl Into<Value>) -> Self {
        self.constraints.push(Constraint {
            field,
            op,
            target: ConstraintTarget::Literal(value.into()),
        });
        self
    }

    /// Adds a membership constraint (`in`).
    #[must_use]
    pub fn with_membership(mut self, field: FieldId, values: Vec<Value>) -> Self {
        self.constraints.push(Constraint {
            field,
            op: ConstraintOp::In,
            target: ConstraintTarget::OneOf(values),
        });
        self
    }

    /// Adds a cross-fact test against a variable bound by an earlier
    /// pattern.
    #[must_use]
    pub fn with_var_test(
        mut self,
        field: FieldId,
        op: ConstraintOp,
        variable: impl Into<String>,
    ) -> Self {
        self.constraints.push(Constraint {
            field,
            op,
            target: ConstraintTarget::Var(variable.into()),
        });
        self
    }

    /// Binds a field's value to a variable.
    #[must_use]
    pub fn with_binding(mut self, field: FieldId, variable: impl Into<String>) -> Self {
        self.bindings.push((field, variable.into()));
        self
    }
}

// =============================================================================
// Compilation
// =============================================================================

/// A pattern resolved against the registry.
///
/// Literal constraints are folded into the canonical alpha key; var
/// tests and bindings are kept for beta wiring, with field names
/// replaced by positional indices.
#[derive(Clone, Debug)]
pub struct CompiledPattern {
    /// Canonical alpha-memory key (fact type + sorted literal tests).
    pub alpha_key: AlphaKey,
    /// Bindings as `(field index, field type, variable)`.
    pub bindings: Vec<(usize, Type, String)>,
    /// Var tests as `(field index, field type, op, variable)`.
    pub var_tests: Vec<(usize, Type, ConstraintOp, String)>,
}

/// Compiles a pattern against the registry.
///
/// # Errors
///
/// - `UnknownFactType` if the pattern's fact type has no schema
/// - `UnknownField` if a constraint or binding names an undeclared field
/// - `UnorderedType` if an ordering operator is applied to a field
///   whose type has no total order
/// - `TypeMismatch` if a literal's type differs from the field's
pub fn compile_pattern(pattern: &Pattern, registry: &SchemaRegistry) -> Result<CompiledPattern> {
    let schema = registry.require_schema(pattern.fact_type)?;
    let type_name = registry.type_name(pattern.fact_type);

    let mut alpha_tests = Vec::new();
    let mut var_tests = Vec::new();

    for constraint in &pattern.constraints {
        let Some(index) = schema.field_index(constraint.field) else {
            return Err(Error::unknown_field(
                &type_name,
                registry.field_name(constraint.field),
            ));
        };
        let field_ty = schema.fields[index].ty;

        if constraint.op.is_ordering() && !field_ty.is_ordered() {
            return Err(Error::unordered_type(constraint.op.symbol(), field_ty));
        }

        match (&constraint.target, constraint.op) {
            (ConstraintTarget::Literal(_), ConstraintOp::In)
            | (ConstraintTarget::Var(_), ConstraintOp::In) => {
                return Err(Error::internal(
                    "in operator requires a literal collection",
                ));
            }
            (ConstraintTarget::OneOf(_), op) if op != ConstraintOp::In => {
                return Err(Error::internal(
                    "membership collection requires the in operator",
                ));
            }
            (ConstraintTarget::Literal(value), op) => {
                if value.value_type() != field_ty {
                    return Err(Error::type_mismatch(field_ty, value.value_type()));
                }
                alpha_tests.push(AlphaTest::Compare {
                    field: index,
                    op,
                    literal: value.clone(),
                });
            }
            (ConstraintTarget::OneOf(values), _) => {
                for value in values {
                    if value.value_type() != field_ty {
                        return Err(Error::type_mismatch(field_ty, value.value_type()));
                    }
                }
                let mut values = values.clone();
                values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
                alpha_tests.push(AlphaTest::Member {
                    field: index,
                    values,
                });
            }
            (ConstraintTarget::Var(variable), op) => {
                var_tests.push((index, field_ty, op, variable.clone()));
            }
        }
    }

    let mut bindings = Vec::new();
    for (field, variable) in &pattern.bindings {
        let Some(index) = schema.field_index(*field) else {
            return Err(Error::unknown_field(
                &type_name,
                registry.field_name(*field),
            ));
        };
        bindings.push((index, schema.fields[index].ty, variable.clone()));
    }

    Ok(CompiledPattern {
        alpha_key: AlphaKey::new(pattern.fact_type, alpha_tests),
        bindings,
        var_tests,
    })
}

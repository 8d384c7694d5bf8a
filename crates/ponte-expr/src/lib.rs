//! Expression layer of the Ponte NL bridge.
//!
//! This crate owns everything that happens to an expression before it
//! reaches the NL writer:
//!
//! - [`Expr`]: the tagged-sum expression tree handed over by providers
//! - [`Op`]: the NL operator table with opcodes, arities, and evaluation
//! - [`analyze`] / [`pull_up_constants`]: linearity tagging and constant
//!   folding
//! - [`process_expression`]: linear-term extraction into a [`LinearMap`]
//!   plus a constant, leaving a nonlinear residual
//! - [`canonicalize`]: operator-shape normalization for the wire

pub mod canonical;
pub mod decompose;
pub mod error;
pub mod ids;
pub mod linearity;
pub mod op;
pub mod tree;

pub use canonical::canonicalize;
pub use decompose::{process_expression, Decomposition, LinearMap};
pub use error::ExprError;
pub use ids::VariableId;
pub use linearity::{analyze, pull_up_constants, Linearity, Tagged, TaggedNode};
pub use op::{Arity, Op};
pub use tree::Expr;

//! Core model layer of the Ponte NL bridge.
//!
//! Owns the [`Model`] aggregate and everything needed to fill it: problem
//! loading from an [`NlpProvider`] or a dense matrix, bound/relation
//! normalization, and the NL index ordering.

pub mod model;
pub mod order;
pub mod provider;
pub mod types;

pub use model::{Model, ModelError};
pub use order::IndexMapper;
pub use provider::NlpProvider;
pub use types::{BoundCode, Bounds, Sense, VarCategory, VarLinearity};

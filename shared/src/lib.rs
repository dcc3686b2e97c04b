//! Shared types and models for ForeAIcast
//!
//! This crate holds the I/O-free core: forecast reconciliation, hierarchical
//! aggregation, region membership selection and the delivery data types
//! used by the backend.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;

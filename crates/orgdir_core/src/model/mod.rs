//! Domain model for the organizational unit directory.
//!
//! # Responsibility
//! - Define the canonical unit record and its provisional draft shape.
//!
//! # Invariants
//! - Committed units carry a store-assigned integer id.
//! - Provisional drafts never carry an id; commitment is a type change.

pub mod unit;

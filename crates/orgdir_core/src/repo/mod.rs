//! Persistence collaborator contracts and implementations.
//!
//! # Responsibility
//! - Define the durable-write contract the hierarchy editor commits through.
//! - Isolate SQL details inside the store boundary.
//!
//! # Invariants
//! - The store assigns every committed id; the core never invents one.
//! - Store failures are surfaced unretried; callers decide what to do.

pub mod unit_store;

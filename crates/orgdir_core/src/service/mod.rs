//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate registry and store calls into user-facing operations.
//! - Enforce permission and confirmation policy at operation entry.

pub mod hierarchy_editor;

//! Core domain logic for the organizational unit directory.
//! This crate is the single source of truth for hierarchy invariants.

pub mod access;
pub mod db;
pub mod logging;
pub mod model;
pub mod registry;
pub mod repo;
pub mod service;
pub mod view;

pub use access::{parse_user_level, UserLevel, UserLevelError, EDITOR_THRESHOLD};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::unit::{Unit, UnitDraft, UnitId, UnitValidationError};
pub use registry::{RegistryError, RegistryResult, UnitRegistry};
pub use repo::unit_store::{DirectoryStore, SqliteDirectoryStore, StoreError, StoreResult};
pub use service::hierarchy_editor::{
    ConfirmationPrompt, DeleteOutcome, DirectoryConfig, EditorError, HierarchyEditor,
    DELETE_CONFIRM_PROMPT,
};
pub use view::{unit_detail, SubunitRow, UnitDetail};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

//! Hierarchy editor use-case service.
//!
//! # Responsibility
//! - Expose the create-subunit and delete-subunit mutation operations.
//! - Gate every mutation behind the editor threshold and, for deletes,
//!   an explicit user confirmation.
//! - Reconcile provisional drafts with the durable store before the
//!   registry's authoritative state changes.
//!
//! # Invariants
//! - `PermissionDenied` and `InvalidInput` are detected before any
//!   collaborator call; the registry is untouched.
//! - Registry state changes strictly after the store acknowledges the
//!   durable write. There is no optimistic insert or removal.
//! - A declined confirmation is a no-op, not an error.

use crate::access::{UserLevel, EDITOR_THRESHOLD};
use crate::model::unit::{Unit, UnitDraft, UnitId, UnitValidationError};
use crate::registry::{RegistryError, UnitRegistry};
use crate::repo::unit_store::{DirectoryStore, StoreError};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Prompt text shown before a unit delete proceeds.
pub const DELETE_CONFIRM_PROMPT: &str = "Really delete this unit?";

/// Confirmation-prompt collaborator.
///
/// Implementations present `prompt` to the user and return the proceed
/// decision. Declining is an ordinary outcome, never a failure.
pub trait ConfirmationPrompt {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Opaque directory configuration forwarded to collaborators.
///
/// The core never interprets `backend_base` beyond passing it to the view
/// projection for link construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryConfig {
    /// Base address of the persistence backend / public site root.
    pub backend_base: String,
}

impl DirectoryConfig {
    pub fn new(backend_base: impl Into<String>) -> Self {
        Self {
            backend_base: backend_base.into(),
        }
    }
}

/// Outcome of a delete request that passed the permission gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Store acknowledged the delete; the removed unit is returned.
    Deleted(Unit),
    /// User declined the confirmation prompt; nothing changed.
    Declined,
}

/// Errors from hierarchy editor operations.
#[derive(Debug)]
pub enum EditorError {
    /// Caller level is below the editor threshold.
    PermissionDenied {
        required: UserLevel,
        actual: UserLevel,
    },
    /// Proposed name is empty or malformed.
    InvalidInput(UnitValidationError),
    /// Target or parent unit is absent from the registry.
    NotFound(UnitId),
    /// Registry integrity failure. A defect, not a user error.
    Registry(RegistryError),
    /// Durable write failed; the registry was left unchanged.
    Store(StoreError),
}

impl Display for EditorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PermissionDenied { required, actual } => write!(
                f,
                "operation requires level {} or above, caller has {}",
                required.as_str(),
                actual.as_str()
            ),
            Self::InvalidInput(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "unit not found: {id}"),
            Self::Registry(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EditorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidInput(err) => Some(err),
            Self::Registry(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<UnitValidationError> for EditorError {
    fn from(value: UnitValidationError) -> Self {
        Self::InvalidInput(value)
    }
}

impl From<RegistryError> for EditorError {
    fn from(value: RegistryError) -> Self {
        match value {
            RegistryError::UnitNotFound(id) => Self::NotFound(id),
            other => Self::Registry(other),
        }
    }
}

impl From<StoreError> for EditorError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Editor facade over an explicitly passed registry.
///
/// The registry is owned by the caller and handed in per operation, so one
/// process can run several independent hierarchies and tests stay isolated.
pub struct HierarchyEditor<S: DirectoryStore, C: ConfirmationPrompt> {
    store: S,
    prompt: C,
    config: DirectoryConfig,
}

impl<S: DirectoryStore, C: ConfirmationPrompt> HierarchyEditor<S, C> {
    /// Creates an editor from its collaborators.
    pub fn new(store: S, prompt: C, config: DirectoryConfig) -> Self {
        Self {
            store,
            prompt,
            config,
        }
    }

    /// Returns the opaque directory configuration.
    pub fn config(&self) -> &DirectoryConfig {
        &self.config
    }

    /// Proposes a subunit under `parent_id` and commits it through the
    /// store.
    ///
    /// The provisional draft never enters the registry. Only after the
    /// store acknowledges the write and assigns an id is the committed
    /// unit inserted and linked, in one atomic registry step.
    ///
    /// # Errors
    /// - `PermissionDenied` below the editor threshold; no collaborator
    ///   call, no state change.
    /// - `InvalidInput` when `proposed_name` trims to empty; no draft is
    ///   constructed.
    /// - `NotFound` when `parent_id` is not a committed unit.
    /// - `Store` when the durable write fails; the registry is unchanged
    ///   and the draft is discarded (no retry in core).
    pub fn create_subunit(
        &self,
        registry: &mut UnitRegistry,
        parent_id: UnitId,
        proposed_name: &str,
        level: UserLevel,
    ) -> Result<Unit, EditorError> {
        self.require_editor(level, "unit_create")?;

        let draft = UnitDraft::new(proposed_name, parent_id)?;
        if !registry.contains(parent_id) {
            warn!("event=unit_create module=editor status=rejected reason=parent_not_found parent_id={parent_id}");
            return Err(EditorError::NotFound(parent_id));
        }

        let assigned_id = match self.store.persist_create(&draft) {
            Ok(id) => id,
            Err(err) => {
                error!(
                    "event=unit_create module=editor status=error parent_id={parent_id} error={err}"
                );
                return Err(err.into());
            }
        };

        let unit = draft.into_unit(assigned_id);
        registry.commit_insert(unit.clone())?;
        info!(
            "event=unit_create module=editor status=ok unit_id={assigned_id} parent_id={parent_id}"
        );
        Ok(unit)
    }

    /// Deletes `unit_id` after explicit confirmation and store
    /// acknowledgement.
    ///
    /// The unit (and its subtree) stays visible until the store reports
    /// success; only then is it removed from the registry.
    ///
    /// # Errors
    /// - `PermissionDenied` below the editor threshold; the prompt is not
    ///   even shown.
    /// - `NotFound` when `unit_id` is absent after confirmation; no store
    ///   call is made.
    /// - `Store` when the durable delete fails; the unit remains committed.
    pub fn delete_subunit(
        &self,
        registry: &mut UnitRegistry,
        unit_id: UnitId,
        level: UserLevel,
    ) -> Result<DeleteOutcome, EditorError> {
        self.require_editor(level, "unit_delete")?;

        if !self.prompt.confirm(DELETE_CONFIRM_PROMPT) {
            info!("event=unit_delete module=editor status=declined unit_id={unit_id}");
            return Ok(DeleteOutcome::Declined);
        }

        if !registry.contains(unit_id) {
            warn!("event=unit_delete module=editor status=rejected reason=not_found unit_id={unit_id}");
            return Err(EditorError::NotFound(unit_id));
        }

        if let Err(err) = self.store.persist_delete(unit_id) {
            error!("event=unit_delete module=editor status=error unit_id={unit_id} error={err}");
            return Err(err.into());
        }

        let removed = registry.commit_remove(unit_id)?;
        info!("event=unit_delete module=editor status=ok unit_id={unit_id}");
        Ok(DeleteOutcome::Deleted(removed))
    }

    fn require_editor(&self, level: UserLevel, event: &str) -> Result<(), EditorError> {
        if level >= EDITOR_THRESHOLD {
            return Ok(());
        }
        warn!(
            "event={event} module=editor status=denied level={}",
            level.as_str()
        );
        Err(EditorError::PermissionDenied {
            required: EDITOR_THRESHOLD,
            actual: level,
        })
    }
}

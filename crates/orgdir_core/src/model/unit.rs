//! Unit domain model.
//!
//! # Responsibility
//! - Define the committed unit record and the provisional draft.
//! - Provide name validation shared by editor and store layers.
//!
//! # Invariants
//! - `id` is assigned by the backing store and never reused.
//! - `name` is non-empty after trimming for every committed unit.
//! - `subunit_ids` is display order only; it carries no other meaning.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned identifier for a committed unit.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type UnitId = i64;

/// A committed node in the organizational hierarchy.
///
/// Root units (companies) have `parent_id = None`; subunits point at their
/// owning unit. The parent's `subunit_ids` and the child's `parent_id` are
/// kept consistent by the registry, never by this record alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    /// Durable identifier assigned by the backing store.
    pub id: UnitId,
    /// User-facing display label.
    pub name: String,
    /// Owning unit, or `None` for a root unit.
    pub parent_id: Option<UnitId>,
    /// Child identifiers in display order.
    #[serde(default)]
    pub subunit_ids: Vec<UnitId>,
}

impl Unit {
    /// Creates a committed root unit with no children.
    pub fn root(id: UnitId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            parent_id: None,
            subunit_ids: Vec::new(),
        }
    }

    /// Checks record-level invariants.
    ///
    /// # Errors
    /// - `BlankName` when `name` trims to empty.
    /// - `SelfParent` when the unit claims itself as parent.
    pub fn validate(&self) -> Result<(), UnitValidationError> {
        if self.name.trim().is_empty() {
            return Err(UnitValidationError::BlankName);
        }
        if self.parent_id == Some(self.id) {
            return Err(UnitValidationError::SelfParent(self.id));
        }
        Ok(())
    }
}

/// A provisional unit proposed by a user but not yet acknowledged by the
/// backing store.
///
/// Deliberately has no id field: provisional state is a distinct type, so a
/// reserved placeholder value can never collide with the committed id space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitDraft {
    /// Proposed display label, already trimmed by the editor.
    pub name: String,
    /// Owning unit under which the subunit is proposed.
    pub parent_id: UnitId,
}

impl UnitDraft {
    /// Builds a draft from a trimmed, validated name.
    ///
    /// # Errors
    /// - `BlankName` when `name` trims to empty; no draft is produced.
    pub fn new(name: impl Into<String>, parent_id: UnitId) -> Result<Self, UnitValidationError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(UnitValidationError::BlankName);
        }
        Ok(Self {
            name: trimmed.to_string(),
            parent_id,
        })
    }

    /// Commits this draft under the id assigned by the backing store.
    pub fn into_unit(self, assigned_id: UnitId) -> Unit {
        Unit {
            id: assigned_id,
            name: self.name,
            parent_id: Some(self.parent_id),
            subunit_ids: Vec::new(),
        }
    }
}

/// Record-level validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitValidationError {
    /// Display name is blank after trim.
    BlankName,
    /// Unit lists itself as its own parent.
    SelfParent(UnitId),
}

impl Display for UnitValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "unit name must not be blank"),
            Self::SelfParent(id) => write!(f, "unit cannot be its own parent: {id}"),
        }
    }
}

impl Error for UnitValidationError {}

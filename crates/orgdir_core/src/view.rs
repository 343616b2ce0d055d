//! Read-only display projection for the rendering surface.
//!
//! # Responsibility
//! - Resolve one unit and its children into pre-built display instructions.
//! - Withhold mutation affordances from callers below the editor threshold.
//!
//! # Invariants
//! - The projection never mutates the registry.
//! - `can_edit`/`deletable` mirror the editor's permission gate, so the
//!   rendering surface and the operation entry point enforce the same
//!   policy independently.

use crate::access::UserLevel;
use crate::model::unit::UnitId;
use crate::registry::{RegistryError, RegistryResult, UnitRegistry};
use crate::service::hierarchy_editor::DirectoryConfig;

/// One subunit line in the detail listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubunitRow {
    pub id: UnitId,
    pub name: String,
    /// Whether the delete affordance may be rendered for this row.
    pub deletable: bool,
}

/// Display instructions for one unit's detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitDetail {
    pub id: UnitId,
    pub name: String,
    /// Link to the unit's public page on the backend.
    pub page_url: String,
    /// Link to the unit's photo upload on the backend.
    pub photo_url: String,
    /// Whether the add-subunit affordance may be rendered.
    pub can_edit: bool,
    /// Resolved children in display order.
    pub subunits: Vec<SubunitRow>,
}

/// Builds the detail projection for `unit_id`.
///
/// # Errors
/// - `UnitNotFound` when `unit_id` is not committed.
/// - `DanglingSubunit` when child resolution hits a missing entry; this is
///   a defect in intermediate state and is surfaced, never skipped.
pub fn unit_detail(
    registry: &UnitRegistry,
    unit_id: UnitId,
    level: UserLevel,
    config: &DirectoryConfig,
) -> RegistryResult<UnitDetail> {
    let unit = registry
        .get(unit_id)
        .ok_or(RegistryError::UnitNotFound(unit_id))?;
    let children = registry.children_of(unit)?;

    let base = config.backend_base.trim_end_matches('/');
    let can_edit = level.can_edit();
    Ok(UnitDetail {
        id: unit.id,
        name: unit.name.clone(),
        page_url: format!("{base}/companies/{}", unit.id),
        photo_url: format!("{base}/uploads/images/companies/{}.jpg", unit.id),
        can_edit,
        subunits: children
            .into_iter()
            .map(|child| SubunitRow {
                id: child.id,
                name: child.name.clone(),
                deletable: can_edit,
            })
            .collect(),
    })
}

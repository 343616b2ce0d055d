//! In-process registry of committed units and their tree relationships.
//!
//! # Responsibility
//! - Hold the current hierarchy and answer lookup/membership queries.
//! - Apply commit/remove mutations without exposing half-linked state.
//!
//! # Invariants
//! - Every id in a unit's `subunit_ids` resolves to a registry entry.
//! - A child's `parent_id` and its membership in the parent's
//!   `subunit_ids` are kept consistent both ways.
//! - The hierarchy is acyclic: no unit is its own ancestor.
//! - Mutations validate fully before the first write, so interleaved
//!   readers never observe a partial update.

use crate::model::unit::{Unit, UnitId, UnitValidationError};
use std::collections::{BTreeMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type used by registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors from registry queries and mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Record-level validation failure.
    Validation(UnitValidationError),
    /// Two units share one id, or an insert collides with an existing id.
    DuplicateId(UnitId),
    /// A unit's `parent_id` points at no registry entry.
    UnknownParent { unit: UnitId, parent: UnitId },
    /// Target unit is absent from the registry.
    UnitNotFound(UnitId),
    /// A `subunit_ids` entry points at no registry entry. This is a defect
    /// in intermediate state, never a user error; callers must surface it.
    DanglingSubunit { parent: UnitId, child: UnitId },
    /// Parent/child linkage disagrees between the two records.
    MembershipMismatch { parent: UnitId, child: UnitId },
    /// One child id is listed more than once under one parent.
    DuplicateMembership { parent: UnitId, child: UnitId },
    /// Parent chain loops back onto the unit itself.
    CycleDetected(UnitId),
    /// Insert of a unit that already claims children.
    NonEmptySubunits(UnitId),
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::DuplicateId(id) => write!(f, "duplicate unit id: {id}"),
            Self::UnknownParent { unit, parent } => {
                write!(f, "unit {unit} references unknown parent {parent}")
            }
            Self::UnitNotFound(id) => write!(f, "unit not found: {id}"),
            Self::DanglingSubunit { parent, child } => {
                write!(f, "unit {parent} lists dangling subunit {child}")
            }
            Self::MembershipMismatch { parent, child } => {
                write!(f, "unit {child} and parent {parent} disagree on linkage")
            }
            Self::DuplicateMembership { parent, child } => {
                write!(f, "unit {parent} lists subunit {child} more than once")
            }
            Self::CycleDetected(id) => write!(f, "unit {id} is its own ancestor"),
            Self::NonEmptySubunits(id) => {
                write!(f, "newly committed unit {id} must not claim subunits")
            }
        }
    }
}

impl Error for RegistryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<UnitValidationError> for RegistryError {
    fn from(value: UnitValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Registry of committed units keyed by id.
///
/// Explicitly owned, never ambient: callers seed one instance per hierarchy
/// and pass it by reference into the editor, which keeps tests isolated and
/// allows multiple independent hierarchies in one process.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UnitRegistry {
    units: BTreeMap<UnitId, Unit>,
}

impl UnitRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a registry from a snapshot, validating all hierarchy
    /// invariants before any unit is admitted.
    pub fn from_units(snapshot: Vec<Unit>) -> RegistryResult<Self> {
        let mut units = BTreeMap::new();
        for unit in snapshot {
            unit.validate()?;
            let id = unit.id;
            if units.insert(id, unit).is_some() {
                return Err(RegistryError::DuplicateId(id));
            }
        }

        let registry = Self { units };
        registry.check_invariants()?;
        Ok(registry)
    }

    /// Returns the unit for `id`, or `None` when unknown. No side effects.
    pub fn get(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    /// Returns whether `id` is a committed unit.
    pub fn contains(&self, id: UnitId) -> bool {
        self.units.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Iterates all committed units in id order.
    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    /// Returns root units (no parent) in id order.
    pub fn roots(&self) -> Vec<&Unit> {
        self.units
            .values()
            .filter(|unit| unit.parent_id.is_none())
            .collect()
    }

    /// Resolves `unit.subunit_ids` in display order.
    ///
    /// # Errors
    /// - `DanglingSubunit` when any child id fails to resolve. Committed
    ///   state never produces this; it marks a faulty intermediate state
    ///   and must not be silently dropped.
    pub fn children_of(&self, unit: &Unit) -> RegistryResult<Vec<&Unit>> {
        let mut children = Vec::with_capacity(unit.subunit_ids.len());
        for child_id in &unit.subunit_ids {
            let child = self
                .units
                .get(child_id)
                .ok_or(RegistryError::DanglingSubunit {
                    parent: unit.id,
                    child: *child_id,
                })?;
            children.push(child);
        }
        Ok(children)
    }

    /// Inserts a newly committed unit and links it into its parent's
    /// `subunit_ids` as one atomic step.
    ///
    /// All checks run before the first write: on any error the registry is
    /// byte-for-byte unchanged.
    pub fn commit_insert(&mut self, unit: Unit) -> RegistryResult<()> {
        unit.validate()?;
        if !unit.subunit_ids.is_empty() {
            return Err(RegistryError::NonEmptySubunits(unit.id));
        }
        if self.units.contains_key(&unit.id) {
            return Err(RegistryError::DuplicateId(unit.id));
        }
        if let Some(parent_id) = unit.parent_id {
            if !self.units.contains_key(&parent_id) {
                return Err(RegistryError::UnknownParent {
                    unit: unit.id,
                    parent: parent_id,
                });
            }
        }

        let parent_id = unit.parent_id;
        let child_id = unit.id;
        self.units.insert(child_id, unit);
        if let Some(parent_id) = parent_id {
            // Checked above; the entry is guaranteed present.
            if let Some(parent) = self.units.get_mut(&parent_id) {
                parent.subunit_ids.push(child_id);
            }
        }
        Ok(())
    }

    /// Removes the unit and its whole subtree, unlinking the root from its
    /// parent's `subunit_ids`, as one atomic step.
    ///
    /// Returns the removed root unit. Subtree removal keeps the no-dangling
    /// invariant: descendants cannot be left behind without a parent.
    pub fn commit_remove(&mut self, id: UnitId) -> RegistryResult<Unit> {
        let root = self.units.get(&id).ok_or(RegistryError::UnitNotFound(id))?;
        let parent_id = root.parent_id;
        let subtree = self.collect_subtree(root)?;

        if let Some(parent_id) = parent_id {
            if let Some(parent) = self.units.get_mut(&parent_id) {
                parent.subunit_ids.retain(|child| *child != id);
            }
        }
        let mut removed_root = None;
        for member in subtree {
            let removed = self.units.remove(&member);
            if member == id {
                removed_root = removed;
            }
        }
        removed_root.ok_or(RegistryError::UnitNotFound(id))
    }

    /// Collects subtree ids breadth-first, failing on dangling references
    /// before any mutation happens.
    fn collect_subtree(&self, root: &Unit) -> RegistryResult<Vec<UnitId>> {
        let mut ordered = vec![root.id];
        let mut queue = vec![root];
        let mut seen: HashSet<UnitId> = HashSet::from([root.id]);
        while let Some(current) = queue.pop() {
            for child_id in &current.subunit_ids {
                let child = self
                    .units
                    .get(child_id)
                    .ok_or(RegistryError::DanglingSubunit {
                        parent: current.id,
                        child: *child_id,
                    })?;
                if seen.insert(*child_id) {
                    ordered.push(*child_id);
                    queue.push(child);
                }
            }
        }
        Ok(ordered)
    }

    fn check_invariants(&self) -> RegistryResult<()> {
        for unit in self.units.values() {
            if let Some(parent_id) = unit.parent_id {
                let parent =
                    self.units
                        .get(&parent_id)
                        .ok_or(RegistryError::UnknownParent {
                            unit: unit.id,
                            parent: parent_id,
                        })?;
                if !parent.subunit_ids.contains(&unit.id) {
                    return Err(RegistryError::MembershipMismatch {
                        parent: parent_id,
                        child: unit.id,
                    });
                }
            }

            let mut seen = HashSet::new();
            for child_id in &unit.subunit_ids {
                let child = self
                    .units
                    .get(child_id)
                    .ok_or(RegistryError::DanglingSubunit {
                        parent: unit.id,
                        child: *child_id,
                    })?;
                if child.parent_id != Some(unit.id) {
                    return Err(RegistryError::MembershipMismatch {
                        parent: unit.id,
                        child: *child_id,
                    });
                }
                if !seen.insert(*child_id) {
                    return Err(RegistryError::DuplicateMembership {
                        parent: unit.id,
                        child: *child_id,
                    });
                }
            }
        }

        for unit in self.units.values() {
            self.check_ancestry(unit)?;
        }
        Ok(())
    }

    /// Walks the parent chain; a revisit of the starting unit is a cycle.
    fn check_ancestry(&self, unit: &Unit) -> RegistryResult<()> {
        let mut visited = HashSet::from([unit.id]);
        let mut cursor = unit.parent_id;
        while let Some(current) = cursor {
            if !visited.insert(current) {
                return Err(RegistryError::CycleDetected(unit.id));
            }
            let ancestor = self
                .units
                .get(&current)
                .ok_or(RegistryError::UnknownParent {
                    unit: unit.id,
                    parent: current,
                })?;
            cursor = ancestor.parent_id;
        }
        Ok(())
    }
}

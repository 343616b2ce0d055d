//! Directory store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the durable create/delete operations the editor commits through.
//! - Load the initial registry snapshot at application start.
//!
//! # Invariants
//! - `persist_create` assigns the durable id; provisional drafts carry none.
//! - `persist_delete` removes the unit together with its subtree.
//! - Snapshot child ordering is deterministic: `sort_order ASC, id ASC`.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::unit::{Unit, UnitDraft, UnitId};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type used by directory store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from directory store operations.
#[derive(Debug)]
pub enum StoreError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Target unit does not exist in durable storage.
    UnitNotFound(UnitId),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
    /// Backend rejected or failed the operation (network/storage outage).
    Backend(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UnitNotFound(id) => write!(f, "stored unit not found: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "directory store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "directory store requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "directory store requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid stored unit data: {message}"),
            Self::Backend(message) => write!(f, "backend failure: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Durable-storage collaborator for the hierarchy editor.
///
/// The editor hands a provisional draft to this trait and only updates the
/// registry once the implementation acknowledges the write. Wire format and
/// transport are implementation concerns.
pub trait DirectoryStore {
    /// Performs the durable write for one provisional draft and returns the
    /// assigned committed id.
    fn persist_create(&self, draft: &UnitDraft) -> StoreResult<UnitId>;
    /// Performs the durable delete of one unit and its subtree.
    fn persist_delete(&self, id: UnitId) -> StoreResult<()>;
    /// Loads all committed units for initial registry seeding.
    fn load_snapshot(&self) -> StoreResult<Vec<Unit>>;
}

/// SQLite-backed directory store.
pub struct SqliteDirectoryStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDirectoryStore<'conn> {
    /// Creates a store from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_store_connection_ready(conn)?;
        Ok(Self { conn })
    }

    /// Inserts one root unit (a company) and returns its assigned id.
    ///
    /// Root creation sits outside the editor's subunit protocol; it exists
    /// for application bootstrap and test seeding.
    pub fn seed_root(&self, name: &str) -> StoreResult<UnitId> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(StoreError::InvalidData(
                "root name must not be blank".to_string(),
            ));
        }
        self.conn.execute(
            "INSERT INTO units (name, parent_id, sort_order) VALUES (?1, NULL, 0);",
            [trimmed],
        )?;
        Ok(self.conn.last_insert_rowid())
    }
}

impl DirectoryStore for SqliteDirectoryStore<'_> {
    fn persist_create(&self, draft: &UnitDraft) -> StoreResult<UnitId> {
        if draft.name.trim().is_empty() {
            return Err(StoreError::InvalidData(
                "draft name must not be blank".to_string(),
            ));
        }
        if !unit_exists(self.conn, draft.parent_id)? {
            return Err(StoreError::UnitNotFound(draft.parent_id));
        }

        let sort_order = next_sort_order(self.conn, draft.parent_id)?;
        self.conn.execute(
            "INSERT INTO units (name, parent_id, sort_order) VALUES (?1, ?2, ?3);",
            params![draft.name.as_str(), draft.parent_id, sort_order],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn persist_delete(&self, id: UnitId) -> StoreResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM units WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(StoreError::UnitNotFound(id));
        }
        // Subtree rows go with the parent via ON DELETE CASCADE.
        Ok(())
    }

    fn load_snapshot(&self) -> StoreResult<Vec<Unit>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, parent_id
             FROM units
             ORDER BY parent_id ASC, sort_order ASC, id ASC;",
        )?;
        let mut rows = stmt.query([])?;

        let mut units: BTreeMap<UnitId, Unit> = BTreeMap::new();
        let mut linkage: Vec<(UnitId, UnitId)> = Vec::new();
        while let Some(row) = rows.next()? {
            let id: UnitId = row.get(0)?;
            let name: String = row.get(1)?;
            let parent_id: Option<UnitId> = row.get(2)?;
            if let Some(parent_id) = parent_id {
                linkage.push((parent_id, id));
            }
            units.insert(
                id,
                Unit {
                    id,
                    name,
                    parent_id,
                    subunit_ids: Vec::new(),
                },
            );
        }

        for (parent_id, child_id) in linkage {
            let parent = units.get_mut(&parent_id).ok_or_else(|| {
                StoreError::InvalidData(format!(
                    "unit {child_id} references missing parent {parent_id}"
                ))
            })?;
            parent.subunit_ids.push(child_id);
        }

        Ok(units.into_values().collect())
    }
}

fn unit_exists(conn: &Connection, id: UnitId) -> StoreResult<bool> {
    let found: Option<i64> = conn
        .query_row("SELECT 1 FROM units WHERE id = ?1;", [id], |row| row.get(0))
        .optional()?;
    Ok(found.is_some())
}

fn next_sort_order(conn: &Connection, parent_id: UnitId) -> StoreResult<i64> {
    let next = conn.query_row(
        "SELECT COALESCE(MAX(sort_order), -1) + 1
         FROM units
         WHERE parent_id = ?1;",
        [parent_id],
        |row| row.get(0),
    )?;
    Ok(next)
}

fn ensure_store_connection_ready(conn: &Connection) -> StoreResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "units")? {
        return Err(StoreError::MissingRequiredTable("units"));
    }
    for column in ["id", "name", "parent_id", "sort_order"] {
        if !table_has_column(conn, "units", column)? {
            return Err(StoreError::MissingRequiredColumn {
                table: "units",
                column,
            });
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> StoreResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

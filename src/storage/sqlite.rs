//! SQLite catalog implementation

use std::path::Path;
use rusqlite::{Connection, OpenFlags};
use serde::Serialize;
use crate::{Result, Error};
use crate::entity::{EntityDescriptor, EntityKind};
use crate::registrar::{CreateTableOptions, RelationCatalog, register_kinds};
use super::schema;

const CREATE_SAVEPOINT: &str = "blockdex_create_relation";

/// SQLite-backed relation catalog
pub struct SqliteCatalog {
    conn: Connection,
}

impl SqliteCatalog {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        tracing::debug!("Opened database {}", path.display());
        Ok(Self { conn })
    }

    /// Open an existing database file without write access
    pub fn open_read_only(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        tracing::debug!("Opened database {} (read-only)", path.display());
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Wrap an already open connection
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    // ========== Catalog Inspection ==========

    /// Whether a table named `name` exists
    pub fn relation_exists(&self, name: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Names of all user tables, sorted
    pub fn existing_relations(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )?;

        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;

        Ok(names)
    }

    /// DDL of every schema object, ordered by name
    pub fn schema_snapshot(&self) -> Result<Vec<(String, String)>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, sql FROM sqlite_master WHERE sql IS NOT NULL ORDER BY name",
        )?;

        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<(String, String)>>>()?;

        Ok(rows)
    }

    /// Count rows in a registered relation
    pub fn count_rows(&self, kind: EntityKind) -> Result<usize> {
        // relation names come from the closed entity set
        let sql = format!("SELECT COUNT(*) FROM {}", kind.as_str());
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Presence and row counts of every registered relation
    pub fn status(&self) -> Result<SchemaStatus> {
        let mut relations = Vec::new();
        for kind in register_kinds() {
            let present = self.relation_exists(kind.as_str())?;
            let rows = if present { Some(self.count_rows(kind)?) } else { None };
            relations.push(RelationStatus {
                kind,
                relation: kind.as_str(),
                present,
                rows,
            });
        }
        Ok(SchemaStatus { relations })
    }

    fn create_relation(&self, descriptor: &EntityDescriptor, options: &CreateTableOptions) -> Result<()> {
        descriptor.validate()?;

        // a savepoint nests inside a caller's open transaction, BEGIN would not
        self.conn.execute_batch(&format!("SAVEPOINT {}", CREATE_SAVEPOINT))?;
        match self.execute_statements(descriptor, options) {
            Ok(()) => {
                self.conn.execute_batch(&format!("RELEASE {}", CREATE_SAVEPOINT))?;
                Ok(())
            }
            Err(e) => {
                let rollback = format!("ROLLBACK TO {0}; RELEASE {0}", CREATE_SAVEPOINT);
                if let Err(rollback_err) = self.conn.execute_batch(&rollback) {
                    tracing::warn!(
                        relation = descriptor.relation,
                        "Failed to roll back partial relation: {}",
                        rollback_err
                    );
                }
                Err(e)
            }
        }
    }

    fn execute_statements(&self, descriptor: &EntityDescriptor, options: &CreateTableOptions) -> Result<()> {
        for stmt in schema::statements_for(descriptor, options) {
            tracing::debug!(relation = descriptor.relation, "{}", stmt);
            self.conn.execute(&stmt, [])?;
        }
        Ok(())
    }
}

impl RelationCatalog for SqliteCatalog {
    fn ensure_relation_exists(
        &self,
        descriptor: &EntityDescriptor,
        options: &CreateTableOptions,
    ) -> Result<()> {
        self.create_relation(descriptor, options)
            .map_err(|e| Error::RelationCreation {
                relation: descriptor.relation.to_string(),
                source: Box::new(e),
            })
    }
}

/// Presence of one registered relation
#[derive(Debug, Clone, Serialize)]
pub struct RelationStatus {
    pub kind: EntityKind,
    pub relation: &'static str,
    pub present: bool,
    pub rows: Option<usize>,
}

/// Presence of every registered relation, in registration order
#[derive(Debug, Clone, Serialize)]
pub struct SchemaStatus {
    pub relations: Vec<RelationStatus>,
}

impl SchemaStatus {
    /// True when every registered relation exists
    pub fn is_complete(&self) -> bool {
        self.relations.iter().all(|r| r.present)
    }

    /// Keep only the given kinds, preserving registration order
    pub fn only(mut self, kinds: &[EntityKind]) -> Self {
        self.relations.retain(|r| kinds.contains(&r.kind));
        self
    }

    pub fn missing(&self) -> Vec<&'static str> {
        self.relations
            .iter()
            .filter(|r| !r.present)
            .map(|r| r.relation)
            .collect()
    }
}

impl std::fmt::Display for SchemaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Schema Status:")?;
        for r in &self.relations {
            match r.rows {
                Some(rows) => writeln!(f, "  {}: {} rows", r.relation, rows)?,
                None => writeln!(f, "  {}: missing", r.relation)?,
            }
        }
        Ok(())
    }
}

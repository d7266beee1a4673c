//! Catalog schema migrations.
//!
//! # Responsibility
//! - Register numbered catalog migrations together with the tables each one
//!   creates.
//! - Apply pending migrations atomically on open.
//! - Report whether a connection carries the catalog this binary samples.
//!
//! # Invariants
//! - `version` values are strictly increasing.
//! - The applied version is mirrored to `PRAGMA user_version`.
//! - A database newer than [`latest_version`] is never touched.

use crate::db::{DbError, DbResult};
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
    tables: &'static [&'static str],
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        sql: include_str!("0001_catalog.sql"),
        tables: &["owners", "creators", "works"],
    },
    Migration {
        version: 2,
        sql: include_str!("0002_venues_programs.sql"),
        tables: &["venues", "programs", "program_works"],
    },
];

/// Where a connection's schema stands relative to this binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaState {
    Current,
    /// Migrations above `version` are still pending.
    Behind { version: u32 },
    /// Written by a newer binary.
    Ahead { version: u32 },
}

/// Returns the latest migration version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Every table the catalog migrations create, in creation order.
pub fn catalog_tables() -> impl Iterator<Item = &'static str> {
    MIGRATIONS
        .iter()
        .flat_map(|migration| migration.tables.iter().copied())
}

/// Compares the recorded `user_version` with [`latest_version`].
pub fn schema_state(conn: &Connection) -> DbResult<SchemaState> {
    let version = current_user_version(conn)?;
    let latest = latest_version();
    Ok(if version == latest {
        SchemaState::Current
    } else if version < latest {
        SchemaState::Behind { version }
    } else {
        SchemaState::Ahead { version }
    })
}

/// First catalog table absent from `conn`, if any.
pub fn missing_catalog_table(conn: &Connection) -> DbResult<Option<&'static str>> {
    let mut stmt =
        conn.prepare("SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);")?;
    for table in catalog_tables() {
        let exists: bool = stmt.query_row([table], |row| row.get(0))?;
        if !exists {
            return Ok(Some(table));
        }
    }
    Ok(None)
}

/// Applies all pending migrations on the provided connection.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let current_version = match schema_state(conn)? {
        SchemaState::Current => return Ok(()),
        SchemaState::Ahead { version } => {
            return Err(DbError::UnsupportedSchemaVersion {
                db_version: version,
                latest_supported: latest_version(),
            })
        }
        SchemaState::Behind { version } => version,
    };

    let tx = conn.transaction()?;
    for migration in MIGRATIONS
        .iter()
        .filter(|migration| migration.version > current_version)
    {
        tx.execute_batch(migration.sql)?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
    }
    tx.commit()?;

    Ok(())
}

/// Reads the schema version recorded on `conn`.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::{
        apply_migrations, catalog_tables, latest_version, missing_catalog_table, schema_state,
        SchemaState,
    };
    use rusqlite::Connection;

    #[test]
    fn versions_are_strictly_increasing() {
        let versions: Vec<u32> = super::MIGRATIONS.iter().map(|m| m.version).collect();
        assert!(versions.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(latest_version(), 2);
    }

    #[test]
    fn state_tracks_pending_and_applied_migrations() {
        let mut conn = Connection::open_in_memory().unwrap();
        assert_eq!(schema_state(&conn).unwrap(), SchemaState::Behind { version: 0 });
        assert_eq!(missing_catalog_table(&conn).unwrap(), Some("owners"));

        apply_migrations(&mut conn).unwrap();
        assert_eq!(schema_state(&conn).unwrap(), SchemaState::Current);
        assert_eq!(missing_catalog_table(&conn).unwrap(), None);

        conn.execute_batch("PRAGMA user_version = 7;").unwrap();
        assert_eq!(schema_state(&conn).unwrap(), SchemaState::Ahead { version: 7 });
    }

    #[test]
    fn dropped_table_is_reported() {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_migrations(&mut conn).unwrap();
        conn.execute_batch("DROP TABLE program_works;").unwrap();
        assert_eq!(missing_catalog_table(&conn).unwrap(), Some("program_works"));
        assert_eq!(catalog_tables().count(), 6);
    }
}

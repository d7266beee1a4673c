//! Repository layer: sampling and catalog reads over SQLite.
//!
//! # Responsibility
//! - Turn sampling requests into one seeded, correlated statement per call.
//! - Rebuild typed entities from raw rows and attach loaded relations.
//! - Keep SQL and session details out of the service layer.
//!
//! # Invariants
//! - Repositories only read; every sampling call runs in its own seeded
//!   transaction and leaves nothing behind.
//! - Connections are checked for the expected schema before use.

pub mod catalog_repo;
pub mod sampling_repo;

use crate::db::migrations::{latest_version, missing_catalog_table, schema_state, SchemaState};
use crate::db::{DbError, SessionError};
use crate::materialize::MaterializeError;
use crate::model::label_path::LabelPathKind;
use crate::model::page::SampleKind;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for sampling and catalog reads.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Session(SessionError),
    Materialize(MaterializeError),
    /// The operation cannot filter by this label-path kind.
    UnsupportedFilter {
        target: SampleKind,
        filter: LabelPathKind,
    },
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Session(err) => write!(f, "{err}"),
            Self::Materialize(err) => write!(f, "{err}"),
            Self::UnsupportedFilter { target, filter } => {
                write!(f, "{target} sampling cannot filter by {filter} label path")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it through open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::InvalidData(message) => write!(f, "invalid persisted catalog data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Session(err) => Some(err),
            Self::Materialize(err) => Some(err),
            Self::UnsupportedFilter { .. }
            | Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_)
            | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<SessionError> for RepoError {
    fn from(value: SessionError) -> Self {
        Self::Session(value)
    }
}

impl From<MaterializeError> for RepoError {
    fn from(value: MaterializeError) -> Self {
        Self::Materialize(value)
    }
}

/// Rejects connections that were not bootstrapped through `open_db`.
pub(crate) fn ensure_catalog_ready(conn: &Connection) -> RepoResult<()> {
    match schema_state(conn)? {
        SchemaState::Current => {}
        SchemaState::Behind { version } | SchemaState::Ahead { version } => {
            return Err(RepoError::UninitializedConnection {
                expected_version: latest_version(),
                actual_version: version,
            });
        }
    }

    match missing_catalog_table(conn)? {
        Some(table) => Err(RepoError::MissingRequiredTable(table)),
        None => Ok(()),
    }
}

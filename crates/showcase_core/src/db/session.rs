//! Transaction-scoped seeded sessions.
//!
//! # Responsibility
//! - Open one transaction per sampling call and apply the normalized seed as
//!   its first statement.
//! - Hand the body an explicit [`SeededSession`] instead of ambient state.
//!
//! # Invariants
//! - The seed is cleared before the transaction ends, on every exit path.
//! - A failed `setseed` aborts before the body runs.
//! - Body failure rolls the transaction back; nothing partial is committed.

use super::random::{CLEAR_SEED_SQL, SET_SEED_SQL};
use crate::model::seed::NormalizedSeed;
use log::{debug, warn};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failures of the session boundary itself.
#[derive(Debug)]
pub enum SessionError {
    /// Transaction could not be opened.
    Begin(rusqlite::Error),
    /// The store refused the `setseed` statement.
    SeedRejected(rusqlite::Error),
    /// The seed could not be cleared before commit.
    SeedReset(rusqlite::Error),
    /// Commit failed; the transaction was rolled back.
    Commit(rusqlite::Error),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Begin(err) => write!(f, "failed to open seeded session: {err}"),
            Self::SeedRejected(err) => write!(f, "failed to apply session seed: {err}"),
            Self::SeedReset(err) => write!(f, "failed to clear session seed: {err}"),
            Self::Commit(err) => write!(f, "failed to commit seeded session: {err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Begin(err) | Self::SeedRejected(err) | Self::SeedReset(err) | Self::Commit(err) => {
                Some(err)
            }
        }
    }
}

/// Handle passed to session bodies. Every statement issued through
/// [`SeededSession::conn`] runs inside the seeded transaction.
pub struct SeededSession<'tx> {
    conn: &'tx Connection,
    seed: NormalizedSeed,
}

impl<'tx> SeededSession<'tx> {
    /// Connection view of the open transaction.
    pub fn conn(&self) -> &'tx Connection {
        self.conn
    }

    /// Seed applied to this session.
    pub fn seed(&self) -> NormalizedSeed {
        self.seed
    }
}

/// Clears the seed when dropped unless [`SeedScope::clear`] already ran.
struct SeedScope<'tx> {
    conn: &'tx Connection,
    armed: bool,
}

impl<'tx> SeedScope<'tx> {
    fn apply(conn: &'tx Connection, seed: NormalizedSeed) -> Result<Self, SessionError> {
        conn.query_row(SET_SEED_SQL, [seed.value()], |_| Ok(()))
            .map_err(SessionError::SeedRejected)?;
        Ok(Self { conn, armed: true })
    }

    fn clear(mut self) -> Result<(), SessionError> {
        self.armed = false;
        clear_seed(self.conn).map_err(SessionError::SeedReset)
    }
}

impl Drop for SeedScope<'_> {
    fn drop(&mut self) {
        if self.armed {
            if let Err(err) = clear_seed(self.conn) {
                warn!("event=seed_session module=db status=error error_code=seed_reset_failed error={err}");
            }
        }
    }
}

fn clear_seed(conn: &Connection) -> rusqlite::Result<()> {
    conn.query_row(CLEAR_SEED_SQL, [], |_| Ok(()))
}

/// Runs `body` inside a transaction whose first statement applies `seed`.
///
/// # Errors
/// - Returns [`SessionError`] (converted into `E`) when the transaction cannot
///   be opened, the seed is rejected, or commit fails.
/// - Returns the body's error unchanged; the transaction is rolled back.
pub fn with_seeded_session<T, E, F>(
    conn: &mut Connection,
    seed: NormalizedSeed,
    body: F,
) -> Result<T, E>
where
    F: FnOnce(&SeededSession<'_>) -> Result<T, E>,
    E: From<SessionError>,
{
    let tx: Transaction<'_> = conn
        .transaction_with_behavior(TransactionBehavior::Deferred)
        .map_err(SessionError::Begin)?;
    let scope = SeedScope::apply(&tx, seed)?;
    debug!(
        "event=seed_session module=db status=start seed={}",
        seed.value()
    );

    let session = SeededSession { conn: &tx, seed };
    let value = match body(&session) {
        Ok(value) => value,
        Err(err) => {
            debug!("event=seed_session module=db status=rollback");
            return Err(err);
        }
    };

    scope.clear()?;
    tx.commit().map_err(SessionError::Commit)?;
    debug!("event=seed_session module=db status=ok");
    Ok(value)
}

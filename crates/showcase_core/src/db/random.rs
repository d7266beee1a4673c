//! Session random functions registered on every core connection.
//!
//! SQLite has no seedable `random()`. Each connection gets its own generator
//! behind three application-defined functions:
//! - `setseed(x)` reseeds from `x` in `[-1, 1]`, or returns to entropy on `NULL`.
//! - `seeded_random()` yields the next `f64` in `[0, 1)`.
//! - `session_seeded()` reports `1` while a seed is applied.
//!
//! # Invariants
//! - Equal seeds replay equal sequences on the same build.
//! - `seeded_random()` is registered without the deterministic flag, so SQLite
//!   evaluates it once per row instead of folding it.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rusqlite::functions::FunctionFlags;
use rusqlite::{Connection, Error};
use std::sync::{Arc, Mutex, MutexGuard};

/// SQL expression used wherever a query orders by the session generator.
pub const SEEDED_RANDOM_SQL: &str = "seeded_random()";

pub(crate) const SET_SEED_SQL: &str = "SELECT setseed(?1);";
pub(crate) const CLEAR_SEED_SQL: &str = "SELECT setseed(NULL);";

const SEED_MIN: f64 = -1.0;
const SEED_MAX: f64 = 1.0;

struct SessionRandom {
    rng: StdRng,
    seeded: bool,
}

impl SessionRandom {
    fn unseeded() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            seeded: false,
        }
    }

    fn seeded(seed: f64) -> Result<Self, Error> {
        if !(SEED_MIN..=SEED_MAX).contains(&seed) {
            return Err(Error::UserFunctionError(
                format!("setseed parameter {seed} is out of allowed range [-1,1]").into(),
            ));
        }
        Ok(Self {
            rng: StdRng::seed_from_u64(seed.to_bits()),
            seeded: true,
        })
    }
}

type SharedRandom = Arc<Mutex<SessionRandom>>;

/// Registers `setseed`, `seeded_random` and `session_seeded` on `conn`.
///
/// Called by connection bootstrap; exposed so callers that open their own
/// connections can opt in before running sampling queries.
pub fn register_session_random(conn: &Connection) -> rusqlite::Result<()> {
    let state: SharedRandom = Arc::new(Mutex::new(SessionRandom::unseeded()));

    let setseed_state = Arc::clone(&state);
    conn.create_scalar_function("setseed", 1, FunctionFlags::SQLITE_UTF8, move |ctx| {
        let value: Option<f64> = ctx.get(0)?;
        let next = match value {
            Some(seed) => SessionRandom::seeded(seed)?,
            None => SessionRandom::unseeded(),
        };
        *lock(&setseed_state)? = next;
        Ok(None::<i64>)
    })?;

    let random_state = Arc::clone(&state);
    conn.create_scalar_function("seeded_random", 0, FunctionFlags::SQLITE_UTF8, move |_| {
        let mut random = lock(&random_state)?;
        Ok(random.rng.gen::<f64>())
    })?;

    conn.create_scalar_function("session_seeded", 0, FunctionFlags::SQLITE_UTF8, move |_| {
        Ok(lock(&state)?.seeded)
    })?;

    Ok(())
}

fn lock(state: &SharedRandom) -> Result<MutexGuard<'_, SessionRandom>, Error> {
    state
        .lock()
        .map_err(|_| Error::UserFunctionError("session random state is poisoned".into()))
}

#[cfg(test)]
mod tests {
    use super::register_session_random;
    use rusqlite::Connection;

    fn connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        register_session_random(&conn).unwrap();
        conn
    }

    fn draws(conn: &Connection, seed: f64, count: usize) -> Vec<f64> {
        conn.query_row("SELECT setseed(?1);", [seed], |_| Ok(()))
            .unwrap();
        (0..count)
            .map(|_| {
                conn.query_row("SELECT seeded_random();", [], |row| row.get(0))
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn same_seed_replays_same_sequence() {
        let conn = connection();
        let first = draws(&conn, 0.25, 5);
        let second = draws(&conn, 0.25, 5);
        assert_eq!(first, second);
        assert!(first.iter().all(|value| (0.0..1.0).contains(value)));
    }

    #[test]
    fn different_seeds_diverge() {
        let conn = connection();
        assert_ne!(draws(&conn, 0.25, 5), draws(&conn, 0.5, 5));
    }

    #[test]
    fn connections_do_not_share_generators() {
        let first = connection();
        let second = connection();
        let expected = draws(&first, 0.75, 3);
        draws(&second, 0.75, 1);
        let continued: f64 = second
            .query_row("SELECT seeded_random();", [], |row| row.get(0))
            .unwrap();
        assert_eq!(continued, expected[1]);
    }

    #[test]
    fn null_seed_clears_session_flag() {
        let conn = connection();
        let seeded = |conn: &Connection| -> bool {
            conn.query_row("SELECT session_seeded();", [], |row| row.get(0))
                .unwrap()
        };
        assert!(!seeded(&conn));
        conn.query_row("SELECT setseed(0.5);", [], |_| Ok(())).unwrap();
        assert!(seeded(&conn));
        conn.query_row("SELECT setseed(NULL);", [], |_| Ok(())).unwrap();
        assert!(!seeded(&conn));
    }

    #[test]
    fn out_of_range_seed_is_rejected() {
        let conn = connection();
        let err = conn
            .query_row("SELECT setseed(1.5);", [], |_| Ok(()))
            .unwrap_err();
        assert!(err.to_string().contains("out of allowed range"));
    }
}

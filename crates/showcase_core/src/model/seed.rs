//! Sampling seed and its normalized store form.
//!
//! # Invariants
//! - Seeds live in `[0, MAX_SEED)` with `MAX_SEED = 2^32`.
//! - `normalize` maps a seed to `seed / 2^32` as `f64`; every `u32` is exactly
//!   representable, so distinct seeds never share a normalized value.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Exclusive upper bound of the seed domain.
pub const MAX_SEED: u64 = 1 << 32;

const MAX_SEED_F64: f64 = 4_294_967_296.0;

/// Client-facing sampling seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Seed(u32);

impl Seed {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    /// Draws a seed uniformly from `[0, MAX_SEED)`.
    pub fn random() -> Self {
        Self(rand::thread_rng().gen())
    }

    pub fn value(self) -> u32 {
        self.0
    }

    /// Maps this seed into the store's `[0, 1)` seed domain.
    pub fn normalize(self) -> NormalizedSeed {
        NormalizedSeed(f64::from(self.0) / MAX_SEED_F64)
    }
}

impl From<u32> for Seed {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl TryFrom<u64> for Seed {
    type Error = u64;

    /// Rejects values outside `[0, MAX_SEED)`, returning the offending value.
    fn try_from(value: u64) -> Result<Self, Self::Error> {
        u32::try_from(value).map(Self).map_err(|_| value)
    }
}

impl Display for Seed {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Seed in the store's native domain, applied through `setseed`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedSeed(f64);

impl NormalizedSeed {
    pub fn value(self) -> f64 {
        self.0
    }
}

//! Sampling configuration.
//!
//! Compile-time defaults with an optional override layer; the core never
//! reads the environment on its own, callers hand a [`SamplingConfig`] to the
//! service.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::num::NonZeroU32;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Optional ceiling for one window; unset honors every requested count.
    pub max_count: Option<NonZeroU32>,
}

impl SamplingConfig {
    /// Applies a textual `max_count` override, e.g. from `SHOWCASE_MAX_COUNT`.
    ///
    /// `None` or blank input keeps the current value.
    pub fn with_max_count_override(self, raw: Option<&str>) -> Result<Self, ConfigError> {
        let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
            return Ok(self);
        };
        let max_count = raw
            .parse::<NonZeroU32>()
            .map_err(|_| ConfigError::InvalidMaxCount(raw.to_string()))?;
        Ok(Self {
            max_count: Some(max_count),
        })
    }

    /// Clamps a requested count to `max_count` when one is set.
    pub fn clamp_count(&self, count: NonZeroU32) -> NonZeroU32 {
        match self.max_count {
            Some(max_count) => count.min(max_count),
            None => count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidMaxCount(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidMaxCount(raw) => {
                write!(f, "max_count must be a positive integer, got `{raw}`")
            }
        }
    }
}

impl Error for ConfigError {}

//! Reproducible random sampling over the showcase catalog.
//!
//! Callers page through a seeded random ordering of visible parents
//! (creators, programs) with one randomly drawn representative work each, or
//! through flat samples of works and venues. Equal seeds, windows and data
//! yield equal pages.

pub mod config;
pub mod db;
pub mod logging;
pub mod materialize;
pub mod model;
pub mod query;
pub mod repo;
pub mod service;

pub use config::{ConfigError, SamplingConfig};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use materialize::{materialize, Entity, MaterializeError, RawRow};
pub use model::creator::Creator;
pub use model::label_path::{LabelPath, LabelPathError, LabelPathKind};
pub use model::owner::Owner;
pub use model::page::{PageWindow, SampleKind, SamplePage, SampledItem};
pub use model::program::Program;
pub use model::seed::{NormalizedSeed, Seed};
pub use model::venue::Venue;
pub use model::work::Work;
pub use repo::catalog_repo::{CatalogRepository, SqliteCatalogRepository};
pub use repo::sampling_repo::{
    CreatorSample, ProgramSample, SamplingRepository, SqliteSamplingRepository,
};
pub use repo::{RepoError, RepoResult};
pub use service::sampling_service::{
    SampleRequest, SamplingError, SamplingResult, SamplingService,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

//! Sampling use-case service.
//!
//! # Responsibility
//! - Validate requests before any store access.
//! - Draw a seed when none is supplied and echo it in every page.
//! - Apply the caller's optional count ceiling and emit one log event per call.
//!
//! # Invariants
//! - `count == 0`, malformed label paths and filters an operation cannot
//!   apply fail synchronously and never reach the repository.
//! - Only metadata is logged: kind, seed, window, filter count, result size.

use crate::config::SamplingConfig;
use crate::model::label_path::{LabelPath, LabelPathError, LabelPathKind};
use crate::model::page::{PageWindow, SampleKind, SamplePage};
use crate::model::seed::{NormalizedSeed, Seed};
use crate::model::venue::Venue;
use crate::model::work::Work;
use crate::repo::sampling_repo::{CreatorSample, ProgramSample, SamplingRepository};
use crate::repo::{RepoError, RepoResult};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::num::NonZeroU32;
use std::time::Instant;

pub type SamplingResult<T> = Result<T, SamplingError>;

/// Service error for sampling use-cases.
#[derive(Debug)]
pub enum SamplingError {
    /// Requested count was zero.
    InvalidCount(u32),
    /// Label path has the wrong arity or a malformed segment.
    InvalidLabelPath(LabelPathError),
    /// Operation does not accept this filter kind.
    UnsupportedFilter {
        target: SampleKind,
        filter: LabelPathKind,
    },
    /// Raw seed does not fit in 32 bits.
    SeedOutOfRange(u64),
    /// Store or session failure; the call was rolled back.
    Repo(RepoError),
}

impl SamplingError {
    /// Stable machine-readable code for logs and callers.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidCount(_) => "invalid_count",
            Self::InvalidLabelPath(_) => "invalid_label_path",
            Self::UnsupportedFilter { .. } => "unsupported_filter",
            Self::SeedOutOfRange(_) => "seed_out_of_range",
            Self::Repo(_) => "store_failure",
        }
    }
}

impl Display for SamplingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCount(count) => write!(f, "count must be positive, got {count}"),
            Self::InvalidLabelPath(err) => write!(f, "invalid filter: {err}"),
            Self::UnsupportedFilter { target, filter } => {
                write!(f, "{target} sampling cannot filter by {filter} label path")
            }
            Self::SeedOutOfRange(seed) => {
                write!(f, "seed {seed} is out of range; expected 0..=4294967295")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SamplingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidLabelPath(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<LabelPathError> for SamplingError {
    fn from(value: LabelPathError) -> Self {
        Self::InvalidLabelPath(value)
    }
}

impl From<RepoError> for SamplingError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::UnsupportedFilter { target, filter } => {
                Self::UnsupportedFilter { target, filter }
            }
            other => Self::Repo(other),
        }
    }
}

/// Input for one sampling call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleRequest {
    /// Seed to replay; a fresh one is drawn when `None`.
    pub seed: Option<Seed>,
    /// Zero-based offset into the seeded ordering.
    pub from: u32,
    pub count: u32,
    /// AND-combined owner-chain filters.
    pub filters: Vec<LabelPath>,
}

impl SampleRequest {
    pub fn new(count: u32) -> Self {
        Self {
            seed: None,
            from: 0,
            count,
            filters: Vec::new(),
        }
    }

    pub fn with_seed(mut self, seed: Seed) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Accepts a seed from a wider integer, rejecting values above `u32::MAX`.
    pub fn with_raw_seed(self, seed: u64) -> SamplingResult<Self> {
        let seed = Seed::try_from(seed).map_err(SamplingError::SeedOutOfRange)?;
        Ok(self.with_seed(seed))
    }

    pub fn starting_at(mut self, from: u32) -> Self {
        self.from = from;
        self
    }

    pub fn with_filter(mut self, filter: LabelPath) -> Self {
        self.filters.push(filter);
        self
    }

    /// Parses and adds a `/`-separated label path, e.g. `studio/ana`.
    pub fn with_filter_slug(self, kind: LabelPathKind, slug: &str) -> SamplingResult<Self> {
        let filter = LabelPath::from_slug(kind, slug)?;
        Ok(self.with_filter(filter))
    }
}

/// Sampling facade over a repository implementation.
pub struct SamplingService<R: SamplingRepository> {
    repo: R,
    config: SamplingConfig,
}

impl<R: SamplingRepository> SamplingService<R> {
    pub fn new(repo: R) -> Self {
        Self::with_config(repo, SamplingConfig::default())
    }

    pub fn with_config(repo: R, config: SamplingConfig) -> Self {
        Self { repo, config }
    }

    pub fn config(&self) -> &SamplingConfig {
        &self.config
    }

    /// Creators with one representative work each.
    pub fn sample_creators(
        &mut self,
        request: &SampleRequest,
    ) -> SamplingResult<SamplePage<CreatorSample>> {
        self.sample(SampleKind::Creators, request, |repo, seed, window, filters| {
            repo.sample_creators(seed, window, filters)
        })
    }

    /// Programs with one representative linked work each.
    pub fn sample_programs(
        &mut self,
        request: &SampleRequest,
    ) -> SamplingResult<SamplePage<ProgramSample>> {
        self.sample(SampleKind::Programs, request, |repo, seed, window, filters| {
            repo.sample_programs(seed, window, filters)
        })
    }

    pub fn sample_works(&mut self, request: &SampleRequest) -> SamplingResult<SamplePage<Work>> {
        self.sample(SampleKind::Works, request, |repo, seed, window, filters| {
            repo.sample_works(seed, window, filters)
        })
    }

    pub fn sample_venues(&mut self, request: &SampleRequest) -> SamplingResult<SamplePage<Venue>> {
        self.sample(SampleKind::Venues, request, |repo, seed, window, filters| {
            repo.sample_venues(seed, window, filters)
        })
    }

    fn sample<T, F>(
        &mut self,
        kind: SampleKind,
        request: &SampleRequest,
        run: F,
    ) -> SamplingResult<SamplePage<T>>
    where
        F: FnOnce(&mut R, NormalizedSeed, PageWindow, &[LabelPath]) -> RepoResult<Vec<T>>,
    {
        let window = match self.validate(kind, request) {
            Ok(window) => window,
            Err(err) => {
                warn!(
                    "event=sample module=sampling status=rejected kind={} error_code={}",
                    kind,
                    err.code()
                );
                return Err(err);
            }
        };
        let seed = request.seed.unwrap_or_else(Seed::random);
        let started = Instant::now();

        match run(&mut self.repo, seed.normalize(), window, &request.filters) {
            Ok(items) => {
                info!(
                    "event=sample module=sampling status=ok kind={} seed={} from={} count={} filters={} returned={} duration_ms={}",
                    kind,
                    seed,
                    window.from,
                    window.count,
                    request.filters.len(),
                    items.len(),
                    started.elapsed().as_millis()
                );
                Ok(SamplePage {
                    seed,
                    window,
                    items,
                })
            }
            Err(err) => {
                let err = SamplingError::from(err);
                warn!(
                    "event=sample module=sampling status=error kind={} seed={} error_code={} duration_ms={} error={}",
                    kind,
                    seed,
                    err.code(),
                    started.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    fn validate(&self, kind: SampleKind, request: &SampleRequest) -> SamplingResult<PageWindow> {
        let count = NonZeroU32::new(request.count).ok_or(SamplingError::InvalidCount(request.count))?;
        if let Some(filter) = request
            .filters
            .iter()
            .find(|filter| !kind.accepts(filter.kind()))
        {
            return Err(SamplingError::UnsupportedFilter {
                target: kind,
                filter: filter.kind(),
            });
        }
        Ok(PageWindow::new(request.from, self.config.clamp_count(count)))
    }
}

//! Seeded sampling repository.
//!
//! # Responsibility
//! - Build the correlated sampling statement for each operation.
//! - Run it inside one seeded session and materialize rows in order.
//!
//! # Invariants
//! - Only visible parents, children and relations reach the output.
//! - Row order is the seeded order; items are never re-sorted here.
//! - A parent whose pick is empty yields `representative: None`.

use super::{ensure_catalog_ready, RepoError, RepoResult};
use crate::db::with_seeded_session;
use crate::materialize::{build_alias, materialize, RawRow};
use crate::model::creator::Creator;
use crate::model::label_path::LabelPath;
use crate::model::owner::Owner;
use crate::model::page::{PageWindow, SampleKind, SampledItem};
use crate::model::program::Program;
use crate::model::seed::NormalizedSeed;
use crate::model::venue::Venue;
use crate::model::work::Work;
use crate::query::{ChildSelector, SampleQuery, PICK_ALIAS};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};

const CREATOR: &str = "creator";
const OWNER: &str = "owner";
const WORK: &str = "work";
const MAKER: &str = "maker";
const MAKER_OWNER: &str = "maker_owner";
const VENUE: &str = "venue";
const PROGRAM: &str = "program";

/// Membership of the outer `work` in a visible program addressed by
/// `owner/venue/program` labels.
const WORK_IN_PROGRAM_SQL: &str = "EXISTS (
    SELECT 1
    FROM program_works AS member
    INNER JOIN programs AS member_program ON member_program.id = member.program_id
    INNER JOIN venues AS member_venue ON member_venue.id = member_program.venue_id
    INNER JOIN owners AS member_owner ON member_owner.id = member_venue.owner_id
    WHERE member.work_id = work.id
      AND member_program.public = 1
      AND member_venue.public = 1
      AND member_owner.label = ?
      AND member_venue.label = ?
      AND member_program.label = ?
)";

pub type CreatorSample = SampledItem<Creator, Work>;
pub type ProgramSample = SampledItem<Program, Work>;

/// Sampling contract. Every call draws one ordering for `seed` and returns
/// the rows of `window` within it.
pub trait SamplingRepository {
    /// Public creators, each with one random public work.
    fn sample_creators(
        &mut self,
        seed: NormalizedSeed,
        window: PageWindow,
        filters: &[LabelPath],
    ) -> RepoResult<Vec<CreatorSample>>;

    /// Public programs in public venues, each with one random linked work
    /// whose creator is public.
    fn sample_programs(
        &mut self,
        seed: NormalizedSeed,
        window: PageWindow,
        filters: &[LabelPath],
    ) -> RepoResult<Vec<ProgramSample>>;

    /// Public works by public creators.
    fn sample_works(
        &mut self,
        seed: NormalizedSeed,
        window: PageWindow,
        filters: &[LabelPath],
    ) -> RepoResult<Vec<Work>>;

    /// Public venues.
    fn sample_venues(
        &mut self,
        seed: NormalizedSeed,
        window: PageWindow,
        filters: &[LabelPath],
    ) -> RepoResult<Vec<Venue>>;
}

/// SQLite-backed sampling repository.
pub struct SqliteSamplingRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteSamplingRepository<'conn> {
    /// Wraps a connection opened through `open_db`/`open_db_in_memory`.
    ///
    /// # Errors
    /// - [`RepoError::UninitializedConnection`] when migrations are not at the
    ///   latest version.
    /// - [`RepoError::MissingRequiredTable`] when a catalog table is absent.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_catalog_ready(conn)?;
        Ok(Self { conn })
    }

    fn run<T>(
        &mut self,
        query: &SampleQuery,
        seed: NormalizedSeed,
        window: PageWindow,
        map_row: fn(&RawRow) -> RepoResult<T>,
    ) -> RepoResult<Vec<T>> {
        let built = query.build(window);
        with_seeded_session(self.conn, seed, |session| {
            let mut stmt = session.conn().prepare(&built.sql)?;
            let mut rows = stmt.query(params_from_iter(built.params.iter()))?;
            let mut items = Vec::new();
            while let Some(row) = rows.next()? {
                let raw = RawRow::from_row(row)?;
                items.push(map_row(&raw)?);
            }
            Ok(items)
        })
    }
}

impl SamplingRepository for SqliteSamplingRepository<'_> {
    fn sample_creators(
        &mut self,
        seed: NormalizedSeed,
        window: PageWindow,
        filters: &[LabelPath],
    ) -> RepoResult<Vec<CreatorSample>> {
        let query = creator_query(filters)?;
        self.run(&query, seed, window, creator_sample_from_row)
    }

    fn sample_programs(
        &mut self,
        seed: NormalizedSeed,
        window: PageWindow,
        filters: &[LabelPath],
    ) -> RepoResult<Vec<ProgramSample>> {
        let query = program_query(filters)?;
        self.run(&query, seed, window, program_sample_from_row)
    }

    fn sample_works(
        &mut self,
        seed: NormalizedSeed,
        window: PageWindow,
        filters: &[LabelPath],
    ) -> RepoResult<Vec<Work>> {
        let query = work_query(filters)?;
        self.run(&query, seed, window, work_from_row)
    }

    fn sample_venues(
        &mut self,
        seed: NormalizedSeed,
        window: PageWindow,
        filters: &[LabelPath],
    ) -> RepoResult<Vec<Venue>> {
        let query = venue_query(filters)?;
        self.run(&query, seed, window, venue_from_row)
    }
}

fn unsupported(target: SampleKind, filter: &LabelPath) -> RepoError {
    RepoError::UnsupportedFilter {
        target,
        filter: filter.kind(),
    }
}

fn label_eq(alias: &str) -> String {
    format!("{alias}.label")
}

pub(crate) fn creator_query(filters: &[LabelPath]) -> RepoResult<SampleQuery> {
    let mut query = SampleQuery::from_entity::<Creator>(CREATOR)
        .inner_join::<Owner>(OWNER, "owner.id = creator.owner_id")
        .visible(CREATOR)
        .with_child(ChildSelector::owned::<Work>(WORK, "creator_id").visible_only());

    for filter in filters {
        query = match filter {
            LabelPath::Creator { owner, creator } => query
                .filter_eq(&label_eq(OWNER), owner.clone())
                .filter_eq(&label_eq(CREATOR), creator.clone()),
            other => return Err(unsupported(SampleKind::Creators, other)),
        };
    }
    Ok(query)
}

pub(crate) fn program_query(filters: &[LabelPath]) -> RepoResult<SampleQuery> {
    let child = ChildSelector::linked::<Work>(WORK, "program_works", "program_id", "work_id")
        .visible_only()
        .pick_join(format!(
            "INNER JOIN creators AS pick_creator ON pick_creator.id = {PICK_ALIAS}.creator_id"
        ))
        .pick_filter("pick_creator.public = 1")
        .with_relation::<Creator>(MAKER, "maker.id = work.creator_id")
        .with_relation::<Owner>(MAKER_OWNER, "maker_owner.id = maker.owner_id");

    let mut query = SampleQuery::from_entity::<Program>(PROGRAM)
        .inner_join::<Venue>(VENUE, "venue.id = program.venue_id")
        .inner_join::<Owner>(OWNER, "owner.id = venue.owner_id")
        .visible(PROGRAM)
        .visible(VENUE)
        .with_child(child);

    for filter in filters {
        query = match filter {
            LabelPath::Venue { owner, venue } => query
                .filter_eq(&label_eq(OWNER), owner.clone())
                .filter_eq(&label_eq(VENUE), venue.clone()),
            LabelPath::Program {
                owner,
                venue,
                program,
            } => query
                .filter_eq(&label_eq(OWNER), owner.clone())
                .filter_eq(&label_eq(VENUE), venue.clone())
                .filter_eq(&label_eq(PROGRAM), program.clone()),
            other => return Err(unsupported(SampleKind::Programs, other)),
        };
    }
    Ok(query)
}

pub(crate) fn work_query(filters: &[LabelPath]) -> RepoResult<SampleQuery> {
    let mut query = SampleQuery::from_entity::<Work>(WORK)
        .inner_join::<Creator>(MAKER, "maker.id = work.creator_id")
        .inner_join::<Owner>(OWNER, "owner.id = maker.owner_id")
        .visible(WORK)
        .visible(MAKER);

    for filter in filters {
        query = match filter {
            LabelPath::Creator { owner, creator } => query
                .filter_eq(&label_eq(OWNER), owner.clone())
                .filter_eq(&label_eq(MAKER), creator.clone()),
            LabelPath::Program {
                owner,
                venue,
                program,
            } => query.filter_with(
                WORK_IN_PROGRAM_SQL,
                [
                    Value::Text(owner.clone()),
                    Value::Text(venue.clone()),
                    Value::Text(program.clone()),
                ],
            ),
            other => return Err(unsupported(SampleKind::Works, other)),
        };
    }
    Ok(query)
}

pub(crate) fn venue_query(filters: &[LabelPath]) -> RepoResult<SampleQuery> {
    if let Some(filter) = filters.first() {
        return Err(unsupported(SampleKind::Venues, filter));
    }
    Ok(SampleQuery::from_entity::<Venue>(VENUE)
        .inner_join::<Owner>(OWNER, "owner.id = venue.owner_id")
        .visible(VENUE))
}

/// Representative work under `alias`, absent when the pick matched nothing.
fn representative(raw: &RawRow, alias: &str) -> RepoResult<Option<Work>> {
    if raw.is_null(&build_alias(alias, "id")) {
        return Ok(None);
    }
    Ok(Some(materialize(raw, Some(alias))?))
}

fn creator_sample_from_row(raw: &RawRow) -> RepoResult<CreatorSample> {
    let mut creator: Creator = materialize(raw, Some(CREATOR))?;
    creator.owner = Some(materialize(raw, Some(OWNER))?);

    let representative = representative(raw, WORK)?.map(|mut work| {
        work.creator = Some(Box::new(creator.clone()));
        work
    });
    Ok(SampledItem {
        parent: creator,
        representative,
    })
}

fn program_sample_from_row(raw: &RawRow) -> RepoResult<ProgramSample> {
    let mut venue: Venue = materialize(raw, Some(VENUE))?;
    venue.owner = Some(materialize(raw, Some(OWNER))?);
    let mut program: Program = materialize(raw, Some(PROGRAM))?;
    program.venue = Some(venue);

    let representative = match representative(raw, WORK)? {
        Some(mut work) => {
            let mut maker: Creator = materialize(raw, Some(MAKER))?;
            maker.owner = Some(materialize(raw, Some(MAKER_OWNER))?);
            work.creator = Some(Box::new(maker));
            Some(work)
        }
        None => None,
    };
    Ok(SampledItem {
        parent: program,
        representative,
    })
}

fn work_from_row(raw: &RawRow) -> RepoResult<Work> {
    let mut maker: Creator = materialize(raw, Some(MAKER))?;
    maker.owner = Some(materialize(raw, Some(OWNER))?);
    let mut work: Work = materialize(raw, Some(WORK))?;
    work.creator = Some(Box::new(maker));
    Ok(work)
}

fn venue_from_row(raw: &RawRow) -> RepoResult<Venue> {
    let mut venue: Venue = materialize(raw, Some(VENUE))?;
    venue.owner = Some(materialize(raw, Some(OWNER))?);
    Ok(venue)
}

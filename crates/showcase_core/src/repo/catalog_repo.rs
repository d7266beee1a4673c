//! Catalog lookups by id.
//!
//! Hydrates through rusqlite's typed row access rather than the raw-row
//! materializer; sampling output must agree with these lookups field by field.

use super::{ensure_catalog_ready, RepoError, RepoResult};
use crate::materialize::{uuid_value, Entity};
use crate::model::creator::{Creator, CreatorId};
use crate::model::owner::Owner;
use crate::model::work::{Work, WorkId};
use rusqlite::{Connection, Row};
use uuid::Uuid;

const CREATOR_BY_ID_SQL: &str = "SELECT
    creator.id AS creator_id,
    creator.owner_id AS creator_owner_id,
    creator.name AS creator_name,
    creator.label AS creator_label,
    creator.biography AS creator_biography,
    creator.country_code AS creator_country_code,
    creator.public AS creator_public,
    owner.id AS owner_id,
    owner.label AS owner_label,
    owner.display_name AS owner_display_name
FROM creators AS creator
INNER JOIN owners AS owner ON owner.id = creator.owner_id
WHERE creator.id = ?1;";

const WORK_BY_ID_SQL: &str = "SELECT
    work.id AS work_id,
    work.creator_id AS work_creator_id,
    work.name AS work_name,
    work.label AS work_label,
    work.description AS work_description,
    work.year AS work_year,
    work.image_hash AS work_image_hash,
    work.image_mime_type AS work_image_mime_type,
    work.thumbnail_mime_type AS work_thumbnail_mime_type,
    work.public AS work_public,
    creator.id AS creator_id,
    creator.owner_id AS creator_owner_id,
    creator.name AS creator_name,
    creator.label AS creator_label,
    creator.biography AS creator_biography,
    creator.country_code AS creator_country_code,
    creator.public AS creator_public,
    owner.id AS owner_id,
    owner.label AS owner_label,
    owner.display_name AS owner_display_name
FROM works AS work
INNER JOIN creators AS creator ON creator.id = work.creator_id
INNER JOIN owners AS owner ON owner.id = creator.owner_id
WHERE work.id = ?1;";

/// Read-only lookups regardless of visibility.
pub trait CatalogRepository {
    /// Creator with its owner attached.
    fn find_creator(&self, id: CreatorId) -> RepoResult<Option<Creator>>;
    /// Work with its creator and the creator's owner attached.
    fn find_work(&self, id: WorkId) -> RepoResult<Option<Work>>;
}

pub struct SqliteCatalogRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCatalogRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_catalog_ready(conn)?;
        Ok(Self { conn })
    }
}

impl CatalogRepository for SqliteCatalogRepository<'_> {
    fn find_creator(&self, id: CreatorId) -> RepoResult<Option<Creator>> {
        let mut stmt = self.conn.prepare(CREATOR_BY_ID_SQL)?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => parse_creator_row(row).map(Some),
            None => Ok(None),
        }
    }

    fn find_work(&self, id: WorkId) -> RepoResult<Option<Work>> {
        let mut stmt = self.conn.prepare(WORK_BY_ID_SQL)?;
        let mut rows = stmt.query([id.to_string()])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };

        let mut work = Work {
            id: row_uuid(row, "work_id")?,
            creator_id: row_uuid(row, "work_creator_id")?,
            name: row.get("work_name")?,
            label: row.get("work_label")?,
            description: row.get("work_description")?,
            year: row.get("work_year")?,
            image_hash: row.get("work_image_hash")?,
            image_mime_type: row.get("work_image_mime_type")?,
            thumbnail_mime_type: row.get("work_thumbnail_mime_type")?,
            is_public: row.get("work_public")?,
            creator: Some(Box::new(parse_creator_row(row)?)),
            ..Work::default()
        };
        work.derive_virtual_fields();
        Ok(Some(work))
    }
}

fn parse_creator_row(row: &Row<'_>) -> RepoResult<Creator> {
    let owner = Owner {
        id: row_uuid(row, "owner_id")?,
        label: row.get("owner_label")?,
        display_name: row.get("owner_display_name")?,
    };
    Ok(Creator {
        id: row_uuid(row, "creator_id")?,
        owner_id: row_uuid(row, "creator_owner_id")?,
        name: row.get("creator_name")?,
        label: row.get("creator_label")?,
        biography: row.get("creator_biography")?,
        country_code: row.get("creator_country_code")?,
        is_public: row.get("creator_public")?,
        owner: Some(owner),
    })
}

fn row_uuid(row: &Row<'_>, column: &str) -> RepoResult<Uuid> {
    let value = row.get_ref(column)?;
    uuid_value(value)
        .map_err(|err| RepoError::InvalidData(format!("invalid uuid in `{column}`: {err}")))
}

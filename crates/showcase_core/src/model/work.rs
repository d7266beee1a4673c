//! Work domain model.
//!
//! # Responsibility
//! - Define the child entity sampled as a creator's or program's representative.
//! - Derive image file names from the stored hash and media types.
//!
//! # Invariants
//! - `image_filename` / `thumbnail_filename` are virtual: never read from rows,
//!   always recomputed by [`Entity::derive_virtual_fields`].
//! - Thumbnails share the image hash; only the extension differs.

use crate::materialize::{
    column_field, uuid_value, virtual_field, Entity, EntityDescriptor, FieldMapping,
};
use crate::model::creator::{Creator, CreatorId};
use crate::model::mime::{MimeType, DEFAULT_EXTENSION};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type WorkId = Uuid;

/// Child entity owned by exactly one creator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Work {
    pub id: WorkId,
    pub creator_id: CreatorId,
    pub name: String,
    pub label: String,
    pub description: Option<String>,
    pub year: Option<i64>,
    /// Content hash naming the stored image blobs.
    pub image_hash: Option<String>,
    pub image_mime_type: Option<MimeType>,
    pub thumbnail_mime_type: Option<MimeType>,
    #[serde(rename = "public")]
    pub is_public: bool,
    pub image_filename: Option<String>,
    pub thumbnail_filename: Option<String>,
    /// Owning creator, attached when the query carried its columns.
    pub creator: Option<Box<Creator>>,
}

impl Work {
    /// `owner/creator/work` slug, available once creator and owner are attached.
    pub fn slug(&self) -> Option<String> {
        self.creator
            .as_ref()
            .and_then(|creator| creator.slug())
            .map(|prefix| format!("{prefix}/{}", self.label))
    }
}

fn derived_filename(hash: Option<&str>, mime_type: Option<MimeType>) -> Option<String> {
    let ext = mime_type.map_or(DEFAULT_EXTENSION, MimeType::extension);
    hash.map(|hash| format!("{hash}.{ext}"))
}

static WORK_FIELDS: &[FieldMapping<Work>] = &[
    column_field!(Work, id, uuid_value),
    column_field!(Work, creator_id, uuid_value),
    column_field!(Work, name),
    column_field!(Work, label),
    column_field!(Work, description),
    column_field!(Work, year),
    column_field!(Work, image_hash),
    column_field!(Work, image_mime_type),
    column_field!(Work, thumbnail_mime_type),
    column_field!(Work, is_public => "public"),
    virtual_field!(image_filename),
    virtual_field!(thumbnail_filename),
];

static WORK_DESCRIPTOR: EntityDescriptor<Work> = EntityDescriptor {
    entity: "Work",
    table: "works",
    fields: WORK_FIELDS,
};

impl Entity for Work {
    fn descriptor() -> &'static EntityDescriptor<Self> {
        &WORK_DESCRIPTOR
    }

    fn derive_virtual_fields(&mut self) {
        let hash = self.image_hash.as_deref();
        self.image_filename = derived_filename(hash, self.image_mime_type);
        self.thumbnail_filename = derived_filename(hash, self.thumbnail_mime_type);
    }
}

//! Creator domain model.
//!
//! # Invariants
//! - `label` is unique per owner; `owner.label/label` is the creator slug.
//! - Only creators with `is_public` set are ever sampled.

use crate::materialize::{column_field, uuid_value, Entity, EntityDescriptor, FieldMapping};
use crate::model::owner::{Owner, OwnerId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type CreatorId = Uuid;

/// Parent entity owning works.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creator {
    pub id: CreatorId,
    pub owner_id: OwnerId,
    pub name: String,
    pub label: String,
    pub biography: Option<String>,
    /// ISO 3166-1 alpha-2 code.
    pub country_code: Option<String>,
    #[serde(rename = "public")]
    pub is_public: bool,
    /// Attached by the sampling and lookup paths; never read from a row.
    pub owner: Option<Owner>,
}

impl Creator {
    /// `owner/creator` slug, available once the owner is attached.
    pub fn slug(&self) -> Option<String> {
        self.owner
            .as_ref()
            .map(|owner| format!("{}/{}", owner.label, self.label))
    }
}

static CREATOR_FIELDS: &[FieldMapping<Creator>] = &[
    column_field!(Creator, id, uuid_value),
    column_field!(Creator, owner_id, uuid_value),
    column_field!(Creator, name),
    column_field!(Creator, label),
    column_field!(Creator, biography),
    column_field!(Creator, country_code),
    column_field!(Creator, is_public => "public"),
];

static CREATOR_DESCRIPTOR: EntityDescriptor<Creator> = EntityDescriptor {
    entity: "Creator",
    table: "creators",
    fields: CREATOR_FIELDS,
};

impl Entity for Creator {
    fn descriptor() -> &'static EntityDescriptor<Self> {
        &CREATOR_DESCRIPTOR
    }
}

//! Venue domain model.

use crate::materialize::{column_field, uuid_value, Entity, EntityDescriptor, FieldMapping};
use crate::model::owner::{Owner, OwnerId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type VenueId = Uuid;

/// Place hosting programs; owned by one owner account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Venue {
    pub id: VenueId,
    pub owner_id: OwnerId,
    pub name: String,
    pub label: String,
    pub country_code: Option<String>,
    #[serde(rename = "public")]
    pub is_public: bool,
    pub owner: Option<Owner>,
}

impl Venue {
    /// `owner/venue` slug, available once the owner is attached.
    pub fn slug(&self) -> Option<String> {
        self.owner
            .as_ref()
            .map(|owner| format!("{}/{}", owner.label, self.label))
    }
}

static VENUE_FIELDS: &[FieldMapping<Venue>] = &[
    column_field!(Venue, id, uuid_value),
    column_field!(Venue, owner_id, uuid_value),
    column_field!(Venue, name),
    column_field!(Venue, label),
    column_field!(Venue, country_code),
    column_field!(Venue, is_public => "public"),
];

static VENUE_DESCRIPTOR: EntityDescriptor<Venue> = EntityDescriptor {
    entity: "Venue",
    table: "venues",
    fields: VENUE_FIELDS,
};

impl Entity for Venue {
    fn descriptor() -> &'static EntityDescriptor<Self> {
        &VENUE_DESCRIPTOR
    }
}

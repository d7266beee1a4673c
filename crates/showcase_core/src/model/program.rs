//! Program domain model.
//!
//! # Invariants
//! - Programs link to works through `program_works`; a work may appear in
//!   several programs.
//! - `from_date` / `to_date` are ISO-8601 calendar dates stored as TEXT.

use crate::materialize::{column_field, uuid_value, Entity, EntityDescriptor, FieldMapping};
use crate::model::venue::{Venue, VenueId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ProgramId = Uuid;

/// Scheduled presentation of works at a venue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub id: ProgramId,
    pub venue_id: VenueId,
    pub name: String,
    pub label: String,
    pub curator: Option<String>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    #[serde(rename = "public")]
    pub is_public: bool,
    pub venue: Option<Venue>,
}

impl Program {
    /// `owner/venue/program` slug, available once venue and owner are attached.
    pub fn slug(&self) -> Option<String> {
        self.venue
            .as_ref()
            .and_then(Venue::slug)
            .map(|prefix| format!("{prefix}/{}", self.label))
    }
}

static PROGRAM_FIELDS: &[FieldMapping<Program>] = &[
    column_field!(Program, id, uuid_value),
    column_field!(Program, venue_id, uuid_value),
    column_field!(Program, name),
    column_field!(Program, label),
    column_field!(Program, curator),
    column_field!(Program, from_date),
    column_field!(Program, to_date),
    column_field!(Program, is_public => "public"),
];

static PROGRAM_DESCRIPTOR: EntityDescriptor<Program> = EntityDescriptor {
    entity: "Program",
    table: "programs",
    fields: PROGRAM_FIELDS,
};

impl Entity for Program {
    fn descriptor() -> &'static EntityDescriptor<Self> {
        &PROGRAM_DESCRIPTOR
    }
}

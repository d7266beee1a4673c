//! Owner accounts: the first segment of every label path.

use crate::materialize::{column_field, uuid_value, Entity, EntityDescriptor, FieldMapping};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type OwnerId = Uuid;

/// Account owning creators and venues.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub id: OwnerId,
    /// URL-safe slug, unique across owners.
    pub label: String,
    pub display_name: String,
}

static OWNER_FIELDS: &[FieldMapping<Owner>] = &[
    column_field!(Owner, id, uuid_value),
    column_field!(Owner, label),
    column_field!(Owner, display_name),
];

static OWNER_DESCRIPTOR: EntityDescriptor<Owner> = EntityDescriptor {
    entity: "Owner",
    table: "owners",
    fields: OWNER_FIELDS,
};

impl Entity for Owner {
    fn descriptor() -> &'static EntityDescriptor<Self> {
        &OWNER_DESCRIPTOR
    }
}

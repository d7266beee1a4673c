//! Manual hydration of entities from raw, column-aliased rows.
//!
//! # Responsibility
//! - Describe each entity as a field/column table ([`EntityDescriptor`]) kept
//!   next to the entity definition.
//! - Rebuild typed entities from [`RawRow`] maps produced by correlated
//!   sampling queries that typed row access cannot map directly.
//!
//! # Invariants
//! - Column keys are built by [`build_alias`] only; the query builder uses the
//!   same function, so aliases and lookups cannot drift.
//! - Values convert through rusqlite's `FromSql`, the same path typed
//!   `Row::get` hydration takes.
//! - Missing keys leave the field at its default; virtual fields are never read
//!   from the row and are derived after all columns are assigned.

use rusqlite::types::{FromSqlError, FromSqlResult, Value, ValueRef};
use rusqlite::Row;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Assigns one converted column value onto an entity.
pub type Assign<E> = fn(&mut E, ValueRef<'_>) -> FromSqlResult<()>;

/// Where a declared field gets its value from.
pub enum FieldSource<E> {
    /// Persisted column read from the row.
    Column { name: &'static str, assign: Assign<E> },
    /// Computed after materialization; never read from a row.
    Virtual,
}

/// One declared field of an entity.
pub struct FieldMapping<E> {
    pub field: &'static str,
    pub source: FieldSource<E>,
}

impl<E> FieldMapping<E> {
    /// Column name when the field is persisted.
    pub fn column(&self) -> Option<&'static str> {
        match self.source {
            FieldSource::Column { name, .. } => Some(name),
            FieldSource::Virtual => None,
        }
    }
}

/// Field/column table for one entity type.
pub struct EntityDescriptor<E: 'static> {
    /// Entity name used in diagnostics.
    pub entity: &'static str,
    /// Backing table; default alias when a query does not rename it.
    pub table: &'static str,
    pub fields: &'static [FieldMapping<E>],
}

impl<E> EntityDescriptor<E> {
    /// Persisted column names in declaration order.
    pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().filter_map(FieldMapping::column)
    }
}

/// Entity that can be rebuilt from a raw row.
pub trait Entity: Default + Sized + 'static {
    fn descriptor() -> &'static EntityDescriptor<Self>;

    /// Computes virtual fields once persisted fields are populated.
    fn derive_virtual_fields(&mut self) {}
}

/// Declares a persisted field; the column defaults to the field name.
///
/// ```ignore
/// column_field!(Work, name)
/// column_field!(Work, is_public => "public")
/// column_field!(Work, id, uuid_value)
/// ```
macro_rules! column_field {
    ($entity:ty, $field:ident) => {
        $crate::materialize::column_field!($entity, $field => stringify!($field))
    };
    ($entity:ty, $field:ident, $convert:path) => {
        $crate::materialize::column_field!($entity, $field => stringify!($field), $convert)
    };
    ($entity:ty, $field:ident => $column:expr) => {
        $crate::materialize::column_field!(
            $entity,
            $field => $column,
            rusqlite::types::FromSql::column_result
        )
    };
    ($entity:ty, $field:ident => $column:expr, $convert:path) => {{
        fn assign(
            entity: &mut $entity,
            value: rusqlite::types::ValueRef<'_>,
        ) -> rusqlite::types::FromSqlResult<()> {
            entity.$field = $convert(value)?;
            Ok(())
        }
        $crate::materialize::FieldMapping {
            field: stringify!($field),
            source: $crate::materialize::FieldSource::Column {
                name: $column,
                assign,
            },
        }
    }};
}

/// Declares a computed field that materialization skips.
macro_rules! virtual_field {
    ($field:ident) => {
        $crate::materialize::FieldMapping {
            field: stringify!($field),
            source: $crate::materialize::FieldSource::Virtual,
        }
    };
}

pub(crate) use column_field;
pub(crate) use virtual_field;

/// Row key for `column` selected under `table_alias`.
pub fn build_alias(table_alias: &str, column: &str) -> String {
    format!("{table_alias}__{column}")
}

/// Raw row keyed by result column name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    values: HashMap<String, Value>,
}

impl RawRow {
    /// Captures every result column of `row` by name.
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let stmt = row.as_ref();
        let mut values = HashMap::with_capacity(stmt.column_count());
        for idx in 0..stmt.column_count() {
            let name = stmt.column_name(idx)?.to_string();
            values.insert(name, row.get::<_, Value>(idx)?);
        }
        Ok(Self { values })
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// `true` when the key is absent or holds SQL `NULL`.
    pub fn is_null(&self, key: &str) -> bool {
        matches!(self.values.get(key), None | Some(Value::Null))
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }
}

impl FromIterator<(String, Value)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// A present column value could not be converted to its field type.
#[derive(Debug)]
pub struct MaterializeError {
    pub entity: &'static str,
    pub field: &'static str,
    pub key: String,
    pub source: FromSqlError,
}

impl Display for MaterializeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "cannot materialize {}.{} from column `{}`: {}",
            self.entity, self.field, self.key, self.source
        )
    }
}

impl Error for MaterializeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

/// Rebuilds an `E` from `raw`, reading columns selected under `table_alias`
/// (the entity's table name when `None`).
pub fn materialize<E: Entity>(raw: &RawRow, table_alias: Option<&str>) -> Result<E, MaterializeError> {
    let descriptor = E::descriptor();
    let alias = table_alias.unwrap_or(descriptor.table);
    let mut entity = E::default();

    for mapping in descriptor.fields {
        let FieldSource::Column { name, assign } = &mapping.source else {
            continue;
        };
        let key = build_alias(alias, name);
        let Some(value) = raw.get(&key) else {
            continue;
        };
        assign(&mut entity, ValueRef::from(value)).map_err(|source| MaterializeError {
            entity: descriptor.entity,
            field: mapping.field,
            key,
            source,
        })?;
    }

    entity.derive_virtual_fields();
    Ok(entity)
}

/// Reads a UUID stored as canonical text or as 16 raw bytes.
pub fn uuid_value(value: ValueRef<'_>) -> FromSqlResult<Uuid> {
    match value {
        ValueRef::Text(bytes) => {
            let text = std::str::from_utf8(bytes).map_err(|err| FromSqlError::Other(Box::new(err)))?;
            Uuid::parse_str(text).map_err(|err| FromSqlError::Other(Box::new(err)))
        }
        ValueRef::Blob(bytes) => {
            Uuid::from_slice(bytes).map_err(|err| FromSqlError::Other(Box::new(err)))
        }
        _ => Err(FromSqlError::InvalidType),
    }
}

/// Nullable variant of [`uuid_value`].
pub fn optional_uuid_value(value: ValueRef<'_>) -> FromSqlResult<Option<Uuid>> {
    match value {
        ValueRef::Null => Ok(None),
        other => uuid_value(other).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::{build_alias, materialize, uuid_value, Entity, EntityDescriptor, FieldMapping, RawRow};
    use rusqlite::types::{FromSqlError, Value, ValueRef};
    use uuid::Uuid;

    #[derive(Debug, Default, PartialEq)]
    struct Sample {
        id: Uuid,
        title: String,
        score: Option<i64>,
        flagged: bool,
        summary: String,
    }

    static SAMPLE_FIELDS: &[FieldMapping<Sample>] = &[
        column_field!(Sample, id, uuid_value),
        column_field!(Sample, title),
        column_field!(Sample, score),
        column_field!(Sample, flagged => "is_flagged"),
        virtual_field!(summary),
    ];

    static SAMPLE_DESCRIPTOR: EntityDescriptor<Sample> = EntityDescriptor {
        entity: "Sample",
        table: "samples",
        fields: SAMPLE_FIELDS,
    };

    impl Entity for Sample {
        fn descriptor() -> &'static EntityDescriptor<Self> {
            &SAMPLE_DESCRIPTOR
        }

        fn derive_virtual_fields(&mut self) {
            self.summary = format!("{}:{}", self.title, self.score.unwrap_or_default());
        }
    }

    fn row(entries: &[(&str, Value)]) -> RawRow {
        entries
            .iter()
            .map(|(key, value)| ((*key).to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn materializes_aliased_columns_and_derives_virtuals() {
        let id = Uuid::new_v4();
        let raw = row(&[
            ("s__id", Value::Text(id.to_string())),
            ("s__title", Value::Text("dawn".to_string())),
            ("s__score", Value::Integer(7)),
            ("s__is_flagged", Value::Integer(1)),
            ("s__summary", Value::Text("ignored".to_string())),
        ]);

        let sample: Sample = materialize(&raw, Some("s")).unwrap();
        assert_eq!(sample.id, id);
        assert_eq!(sample.title, "dawn");
        assert_eq!(sample.score, Some(7));
        assert!(sample.flagged);
        assert_eq!(sample.summary, "dawn:7");
    }

    #[test]
    fn missing_keys_keep_defaults_and_table_name_is_default_alias() {
        let raw = row(&[("samples__title", Value::Text("partial".to_string()))]);
        let sample: Sample = materialize(&raw, None).unwrap();
        assert_eq!(sample.title, "partial");
        assert_eq!(sample.id, Uuid::nil());
        assert_eq!(sample.score, None);
        assert!(!sample.flagged);
    }

    #[test]
    fn conversion_failure_names_entity_and_field() {
        let raw = row(&[("s__score", Value::Text("many".to_string()))]);
        let err = materialize::<Sample>(&raw, Some("s")).unwrap_err();
        assert_eq!(err.entity, "Sample");
        assert_eq!(err.field, "score");
        assert_eq!(err.key, "s__score");
        assert!(matches!(err.source, FromSqlError::InvalidType));
    }

    #[test]
    fn descriptor_lists_only_persisted_columns() {
        let columns: Vec<_> = Sample::descriptor().columns().collect();
        assert_eq!(columns, vec!["id", "title", "score", "is_flagged"]);
        assert_eq!(build_alias("work", "id"), "work__id");
    }

    #[test]
    fn uuid_value_accepts_text_and_blob() {
        let id = Uuid::new_v4();
        let text = id.to_string();
        assert_eq!(uuid_value(ValueRef::Text(text.as_bytes())).unwrap(), id);
        assert_eq!(uuid_value(ValueRef::Blob(id.as_bytes())).unwrap(), id);
        assert!(uuid_value(ValueRef::Integer(1)).is_err());
    }
}

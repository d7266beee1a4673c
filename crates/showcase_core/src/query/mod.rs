//! Sampling query builder.
//!
//! # Responsibility
//! - Compose visibility, label-path equality and the seeded ordering for one
//!   parent table into a single windowed statement.
//! - Attach an optional correlated child pick (see [`correlate`]).
//!
//! # Invariants
//! - Every selected column is aliased through [`build_alias`], the same rule
//!   the materializer reads with.
//! - The seeded rank is drawn once per qualifying parent before `LIMIT`/
//!   `OFFSET` apply. With a child pick, picks and ranks are drawn together
//!   for every parent in a materialized table, so neither depends on the
//!   window.
//! - Bound parameters follow textual order: predicates, then limit, then offset.
//! - Label values are always bound, never spliced into SQL.

pub mod correlate;

use crate::db::SEEDED_RANDOM_SQL;
use crate::materialize::{build_alias, Entity};
use crate::model::page::PageWindow;
use rusqlite::types::Value;

pub use correlate::{ChildSelector, Correlate, Correlation, LINK_ALIAS, PICK_ALIAS};

/// Column holding the picked child id.
pub const PICK_COLUMN: &str = "sample_pick";
/// Column holding the parent's seeded rank.
pub const RANK_COLUMN: &str = "sample_rank";
/// Alias of the windowed derived table.
pub const SAMPLED_ALIAS: &str = "sampled";
/// Materialized table holding every qualifying parent with its pick and rank.
pub const RANKED_CTE: &str = "ranked";

pub(crate) const VISIBLE_COLUMN: &str = "public";

/// `alias.column AS "alias__column"` for every persisted column of `E`.
pub fn aliased_columns<E: Entity>(alias: &str) -> Vec<String> {
    E::descriptor()
        .columns()
        .map(|column| aliased_column(alias, column))
        .collect()
}

fn aliased_column(alias: &str, column: &str) -> String {
    format!("{alias}.{column} AS \"{}\"", build_alias(alias, column))
}

/// Final SQL plus its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Seed-ordered, windowed selection over one parent table.
#[derive(Debug, Clone)]
pub struct SampleQuery {
    table: &'static str,
    alias: String,
    columns: Vec<String>,
    joins: Vec<String>,
    predicates: Vec<String>,
    params: Vec<Value>,
    child: Option<ChildSelector>,
}

impl SampleQuery {
    /// Starts from `E`'s table under `alias`, selecting all its columns.
    pub fn from_entity<E: Entity>(alias: &str) -> Self {
        Self {
            table: E::descriptor().table,
            alias: alias.to_string(),
            columns: aliased_columns::<E>(alias),
            joins: Vec::new(),
            predicates: Vec::new(),
            params: Vec::new(),
            child: None,
        }
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Inner-joins `E` under `alias` and selects its columns.
    pub fn inner_join<E: Entity>(mut self, alias: &str, on: &str) -> Self {
        self.joins.push(format!(
            "INNER JOIN {} AS {alias} ON {on}",
            E::descriptor().table
        ));
        self.columns.extend(aliased_columns::<E>(alias));
        self
    }

    /// Restricts rows to `alias.public = 1`.
    pub fn visible(self, alias: &str) -> Self {
        self.filter(format!("{alias}.{VISIBLE_COLUMN} = 1"))
    }

    /// Adds a parameterless predicate.
    pub fn filter(mut self, predicate: impl Into<String>) -> Self {
        self.predicates.push(predicate.into());
        self
    }

    /// Adds `column = ?` with `value` bound.
    pub fn filter_eq(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter_with(format!("{column} = ?"), [value.into()])
    }

    /// Adds a predicate whose `?` placeholders are bound to `params` in order.
    pub fn filter_with(
        mut self,
        predicate: impl Into<String>,
        params: impl IntoIterator<Item = Value>,
    ) -> Self {
        self.predicates.push(predicate.into());
        self.params.extend(params);
        self
    }

    /// Picks one random child per parent through `selector`.
    pub fn with_child(mut self, selector: ChildSelector) -> Self {
        self.child = Some(selector);
        self
    }

    /// Renders the statement for `window`.
    pub fn build(&self, window: PageWindow) -> BuiltQuery {
        let mut params = self.params.clone();
        params.push(Value::Integer(i64::from(window.count.get())));
        params.push(Value::Integer(i64::from(window.from)));

        let Some(child) = &self.child else {
            let mut sql = self.ranked_select(self.columns.clone());
            sql.push_str(&format!(" ORDER BY \"{RANK_COLUMN}\" LIMIT ? OFFSET ?"));
            return BuiltQuery { sql, params };
        };

        // Picks consume session draws too: draw pick and rank for every
        // qualifying parent in one full pass, then cut the window.
        let mut ranked_columns = self.columns.clone();
        ranked_columns.push(format!(
            "({}) AS \"{PICK_COLUMN}\"",
            child.correlate(&self.alias)
        ));
        let ranked = self.ranked_select(ranked_columns);

        let mut outer_columns = vec![format!("{SAMPLED_ALIAS}.*")];
        outer_columns.extend(child.columns().iter().cloned());
        let mut sql = format!(
            "WITH {RANKED_CTE} AS MATERIALIZED ({ranked}) \
             SELECT {} FROM (SELECT * FROM {RANKED_CTE} ORDER BY \"{RANK_COLUMN}\" LIMIT ? OFFSET ?) AS {SAMPLED_ALIAS} \
             LEFT JOIN {} AS {} ON {}.id = {SAMPLED_ALIAS}.\"{PICK_COLUMN}\"",
            outer_columns.join(", "),
            child.table(),
            child.alias(),
            child.alias(),
        );
        for join in child.relation_joins() {
            sql.push(' ');
            sql.push_str(join);
        }
        sql.push_str(&format!(" ORDER BY {SAMPLED_ALIAS}.\"{RANK_COLUMN}\""));

        BuiltQuery { sql, params }
    }

    /// Unwindowed selection of `columns` plus the seeded rank, filtered by
    /// the joins and predicates.
    fn ranked_select(&self, mut columns: Vec<String>) -> String {
        columns.push(format!("{SEEDED_RANDOM_SQL} AS \"{RANK_COLUMN}\""));
        let mut sql = format!(
            "SELECT {} FROM {} AS {}",
            columns.join(", "),
            self.table,
            self.alias
        );
        for join in &self.joins {
            sql.push(' ');
            sql.push_str(join);
        }
        if !self.predicates.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.predicates.join(" AND "));
        }
        sql
    }
}

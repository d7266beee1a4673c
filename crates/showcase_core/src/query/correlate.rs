//! Correlated child selection.
//!
//! A [`ChildSelector`] describes how to pick one random visible child per
//! parent row. It renders a scalar subquery returning the chosen child id;
//! [`super::SampleQuery`] evaluates it once per qualifying parent in the
//! materialized ranking table and joins the child row back on that id.

use crate::db::SEEDED_RANDOM_SQL;
use crate::materialize::Entity;

use super::{aliased_columns, VISIBLE_COLUMN};

/// Alias of the candidate child table inside the correlated subquery.
pub const PICK_ALIAS: &str = "pick";
/// Alias of the link table for many-to-many correlations.
pub const LINK_ALIAS: &str = "link";

/// Renders a subquery correlated to an outer row.
pub trait Correlate {
    /// SQL yielding at most one child id for the row aliased `outer_alias`.
    fn correlate(&self, outer_alias: &str) -> String;
}

/// How a child row relates to its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Correlation {
    /// Child row carries the parent id, e.g. `works.creator_id`.
    Owned { parent_key: &'static str },
    /// Child reaches the parent through a link table,
    /// e.g. `program_works(program_id, work_id)`.
    Linked {
        link_table: &'static str,
        parent_key: &'static str,
        child_key: &'static str,
    },
}

/// Random pick of one child per parent, plus the relations joined onto the
/// picked child in the outer query.
#[derive(Debug, Clone)]
pub struct ChildSelector {
    table: &'static str,
    alias: String,
    correlation: Correlation,
    pick_joins: Vec<String>,
    pick_predicates: Vec<String>,
    columns: Vec<String>,
    relation_joins: Vec<String>,
}

impl ChildSelector {
    /// Child `C` owned by its parent through `parent_key`.
    pub fn owned<C: Entity>(alias: &str, parent_key: &'static str) -> Self {
        Self::with_correlation::<C>(alias, Correlation::Owned { parent_key })
    }

    /// Child `C` linked to its parent through `link_table`.
    pub fn linked<C: Entity>(
        alias: &str,
        link_table: &'static str,
        parent_key: &'static str,
        child_key: &'static str,
    ) -> Self {
        Self::with_correlation::<C>(
            alias,
            Correlation::Linked {
                link_table,
                parent_key,
                child_key,
            },
        )
    }

    fn with_correlation<C: Entity>(alias: &str, correlation: Correlation) -> Self {
        Self {
            table: C::descriptor().table,
            alias: alias.to_string(),
            correlation,
            pick_joins: Vec::new(),
            pick_predicates: Vec::new(),
            columns: aliased_columns::<C>(alias),
            relation_joins: Vec::new(),
        }
    }

    /// Restricts candidates to visible children.
    pub fn visible_only(self) -> Self {
        self.pick_filter(format!("{PICK_ALIAS}.{VISIBLE_COLUMN} = 1"))
    }

    /// Adds a candidate predicate; reference the candidate as [`PICK_ALIAS`].
    pub fn pick_filter(mut self, predicate: impl Into<String>) -> Self {
        self.pick_predicates.push(predicate.into());
        self
    }

    /// Adds a join available to candidate predicates.
    pub fn pick_join(mut self, join: impl Into<String>) -> Self {
        self.pick_joins.push(join.into());
        self
    }

    /// Left-joins relation `R` onto the picked child and selects its columns
    /// under `alias`.
    pub fn with_relation<R: Entity>(mut self, alias: &str, on: &str) -> Self {
        self.relation_joins.push(format!(
            "LEFT JOIN {} AS {alias} ON {on}",
            R::descriptor().table
        ));
        self.columns.extend(aliased_columns::<R>(alias));
        self
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn table(&self) -> &'static str {
        self.table
    }

    pub(super) fn columns(&self) -> &[String] {
        &self.columns
    }

    pub(super) fn relation_joins(&self) -> &[String] {
        &self.relation_joins
    }
}

impl Correlate for ChildSelector {
    fn correlate(&self, outer_alias: &str) -> String {
        let mut sql = format!("SELECT {PICK_ALIAS}.id FROM {} AS {PICK_ALIAS}", self.table);
        let correlation = match &self.correlation {
            Correlation::Owned { parent_key } => {
                format!("{PICK_ALIAS}.{parent_key} = {outer_alias}.id")
            }
            Correlation::Linked {
                link_table,
                parent_key,
                child_key,
            } => {
                sql.push_str(&format!(
                    " INNER JOIN {link_table} AS {LINK_ALIAS} ON {LINK_ALIAS}.{child_key} = {PICK_ALIAS}.id"
                ));
                format!("{LINK_ALIAS}.{parent_key} = {outer_alias}.id")
            }
        };

        for join in &self.pick_joins {
            sql.push(' ');
            sql.push_str(join);
        }
        sql.push_str(" WHERE ");
        sql.push_str(&correlation);
        for predicate in &self.pick_predicates {
            sql.push_str(" AND ");
            sql.push_str(predicate);
        }
        sql.push_str(&format!(" ORDER BY {SEEDED_RANDOM_SQL} LIMIT 1"));
        sql
    }
}

#[cfg(test)]
mod tests {
    use super::{ChildSelector, Correlate};
    use crate::model::creator::Creator;
    use crate::model::work::Work;

    #[test]
    fn owned_correlation_renders_random_limit_one_pick() {
        let selector = ChildSelector::owned::<Work>("work", "creator_id").visible_only();
        assert_eq!(
            selector.correlate("creator"),
            "SELECT pick.id FROM works AS pick WHERE pick.creator_id = creator.id \
             AND pick.public = 1 ORDER BY seeded_random() LIMIT 1"
        );
    }

    #[test]
    fn linked_correlation_joins_link_table() {
        let selector =
            ChildSelector::linked::<Work>("work", "program_works", "program_id", "work_id")
                .pick_join("INNER JOIN creators AS pick_creator ON pick_creator.id = pick.creator_id")
                .pick_filter("pick_creator.public = 1");
        let sql = selector.correlate("program");
        assert!(sql.starts_with(
            "SELECT pick.id FROM works AS pick INNER JOIN program_works AS link \
             ON link.work_id = pick.id INNER JOIN creators AS pick_creator"
        ));
        assert!(sql.contains("WHERE link.program_id = program.id AND pick_creator.public = 1"));
    }

    #[test]
    fn relations_extend_selected_columns() {
        let selector = ChildSelector::owned::<Work>("work", "creator_id")
            .with_relation::<Creator>("maker", "maker.id = work.creator_id");
        assert!(selector
            .columns()
            .contains(&"work.creator_id AS \"work__creator_id\"".to_string()));
        assert!(selector
            .columns()
            .contains(&"maker.id AS \"maker__id\"".to_string()));
        assert_eq!(
            selector.relation_joins(),
            ["LEFT JOIN creators AS maker ON maker.id = work.creator_id".to_string()]
        );
    }
}

//! The query capability backing registry predicates.
//!
//! Existence checks funnel through one canonical [`SearchQuery`] shape;
//! the field/value and condition-map forms are thin wrappers over it.
//! Uniqueness keeps its own entry point because a uniqueness check is a
//! different question from an existence check, not a query variant.

use serde::Serialize;

/// The only filter operator registry predicates produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOp {
    Eq,
}

/// One equality filter of a [`SearchQuery`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Filter {
    pub field: String,
    pub operator: FilterOp,
    pub value: String,
}

/// A registry search over one entity type with equality filters, in
/// condition order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub entity_types: Vec<String>,
    pub filters: Vec<Filter>,
}

impl SearchQuery {
    /// Query with a single equality filter.
    #[must_use]
    pub fn single(entity_type: &str, field: &str, value: &str) -> Self {
        Self::with_filters(entity_type, &[(field.to_owned(), value.to_owned())])
    }

    /// Query with one equality filter per `(field, value)` pair, in order.
    #[must_use]
    pub fn with_filters(entity_type: &str, conditions: &[(String, String)]) -> Self {
        SearchQuery {
            entity_types: vec![entity_type.to_owned()],
            filters: conditions
                .iter()
                .map(|(field, value)| Filter {
                    field: field.clone(),
                    operator: FilterOp::Eq,
                    value: value.clone(),
                })
                .collect(),
        }
    }
}

/// External query interface into the backing record store.
///
/// All methods are pure queries. Implementations must catch their own
/// faults and answer `false` rather than panic or propagate: the engine
/// treats `false` as a normal negative result.
pub trait Lookup {
    /// Whether at least one entity matches the query.
    fn exists(&self, query: &SearchQuery) -> bool;

    /// Whether no entity of `entity_type` matches all `(field, value)`
    /// conditions.
    fn is_unique(&self, entity_type: &str, conditions: &[(String, String)]) -> bool;

    /// Convenience form of [`exists`](Lookup::exists) for a single
    /// field/value condition.
    fn exists_field(&self, entity_type: &str, field: &str, value: &str) -> bool {
        self.exists(&SearchQuery::single(entity_type, field, value))
    }

    /// Convenience form of [`exists`](Lookup::exists) for a condition map.
    fn exists_where(&self, entity_type: &str, conditions: &[(String, String)]) -> bool {
        self.exists(&SearchQuery::with_filters(entity_type, conditions))
    }
}

/// A [`Lookup`] backed by nothing: existence checks answer `false`,
/// uniqueness checks answer `true`. Useful for rule sets without registry
/// predicates and for tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyRegistry;

impl Lookup for EmptyRegistry {
    fn exists(&self, _query: &SearchQuery) -> bool {
        false
    }

    fn is_unique(&self, _entity_type: &str, _conditions: &[(String, String)]) -> bool {
        true
    }
}

//! # Filtered Collections
//!
//! Applies an engine's live predicate to an in-memory set of JSON documents.
//!
//! The [`DocumentSource`] trait is the storage seam: anything that can hand
//! out a slice of documents can be queried. [`Collection`] is the bundled
//! implementation; it only accepts JSON objects and gives each document a
//! UUID `_id` when it does not carry one.
//!
//! ## Queries
//!
//! [`CollectionFilter::find`] combines the caller's own selector with the
//! engine's current predicate as a conjunction, so either side may be empty:
//!
//! ```text
//! find(selector = {}, engine = {})         -> every document
//! find(selector = {a: 1}, engine = {})     -> {a: 1}
//! find(selector = {a: 1}, engine = {b: 2}) -> {$and: [{a: 1}, {b: 2}]}
//! ```
//!
//! Results keep insertion order unless [`FindOptions::sort`] says otherwise.
//! `skip` and `limit` apply after sorting.
//!
//! ## Sort Order
//!
//! Sorting is a total order over any mix of JSON values. Values rank by type
//! first, then compare within their type:
//!
//! ```text
//! missing/null < numbers < strings < objects < arrays < booleans
//! ```
//!
//! Strings that parse as dates sort before other strings, by instant. Other
//! strings sort lexicographically.

use std::cmp::Ordering;

use serde_json::Value;
use uuid::Uuid;

use crate::clock::Clock;
use crate::dates::parse_date;
use crate::engine::FilterEngine;
use crate::error::{FilterError, Result};
use crate::predicate::{lookup, Predicate};

/// Field holding a document's identity.
pub const ID_FIELD: &str = "_id";

/// Anything that can provide documents to filter.
pub trait DocumentSource {
    fn documents(&self) -> &[Value];
}

impl DocumentSource for Vec<Value> {
    fn documents(&self) -> &[Value] {
        self
    }
}

/// In-memory document store.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    documents: Vec<Value>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from arbitrary values, skipping anything that is not an object.
    pub fn from_values(values: impl IntoIterator<Item = Value>) -> Self {
        let mut collection = Self::new();
        for (position, value) in values.into_iter().enumerate() {
            if collection.insert(value).is_err() {
                tracing::debug!(position, "skipped non-object document");
            }
        }
        collection
    }

    /// Add a document, returning its `_id`.
    pub fn insert(&mut self, document: Value) -> Result<Value> {
        let Value::Object(mut object) = document else {
            return Err(FilterError::validation("documents must be JSON objects"));
        };
        let id = object
            .entry(ID_FIELD)
            .or_insert_with(|| Value::String(Uuid::new_v4().to_string()))
            .clone();
        self.documents.push(Value::Object(object));
        Ok(id)
    }

    pub fn get(&self, id: &Value) -> Option<&Value> {
        self.documents
            .iter()
            .find(|doc| doc.get(ID_FIELD) == Some(id))
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl DocumentSource for Collection {
    fn documents(&self) -> &[Value] {
        &self.documents
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Sort on one (dot-separated) field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub order: SortOrder,
}

impl SortKey {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Ascending,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Descending,
        }
    }

    /// Documents missing the field sort with nulls, before everything else.
    fn compare(&self, a: &Value, b: &Value) -> Ordering {
        let null = Value::Null;
        let x = lookup(a, &self.field).unwrap_or(&null);
        let y = lookup(b, &self.field).unwrap_or(&null);
        let ordering = sort_order(x, y);
        match self.order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Number(_) => 1,
        Value::String(_) => 2,
        Value::Object(_) => 3,
        Value::Array(_) => 4,
        Value::Bool(_) => 5,
    }
}

/// Total order used for sorting. Unlike predicate comparison, every pair of
/// values is ordered, so mixed-type fields still sort consistently.
fn sort_order(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.total_cmp(&y)
        }
        (Value::String(x), Value::String(y)) => match (parse_date(x), parse_date(y)) {
            (Some(dx), Some(dy)) => dx.cmp(&dy).then_with(|| x.cmp(y)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => x.cmp(y),
        },
        (Value::Object(x), Value::Object(y)) => x
            .iter()
            .zip(y.iter())
            .map(|((kx, vx), (ky, vy))| kx.cmp(ky).then_with(|| sort_order(vx, vy)))
            .find(|ordering| ordering.is_ne())
            .unwrap_or_else(|| x.len().cmp(&y.len())),
        (Value::Array(x), Value::Array(y)) => x
            .iter()
            .zip(y.iter())
            .map(|(vx, vy)| sort_order(vx, vy))
            .find(|ordering| ordering.is_ne())
            .unwrap_or_else(|| x.len().cmp(&y.len())),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindOptions {
    pub sort: Option<SortKey>,
    pub skip: usize,
    pub limit: Option<usize>,
}

impl FindOptions {
    pub fn sorted(mut self, key: SortKey) -> Self {
        self.sort = Some(key);
        self
    }

    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Queries a document source through a filter engine.
#[derive(Debug)]
pub struct CollectionFilter<S: DocumentSource> {
    source: S,
}

impl<S: DocumentSource> CollectionFilter<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// The selector `find` would run: `selector` AND the engine's predicate.
    pub fn selector<C: Clock>(&self, selector: &Predicate, engine: &FilterEngine<C>) -> Predicate {
        selector.clone().and(engine.filters().clone())
    }

    /// Documents matching both `selector` and the engine's current predicate.
    pub fn find<C: Clock>(
        &self,
        selector: &Predicate,
        options: &FindOptions,
        engine: &FilterEngine<C>,
    ) -> Vec<&Value> {
        let query = self.selector(selector, engine);
        let mut matched: Vec<&Value> = self
            .source
            .documents()
            .iter()
            .filter(|doc| query.matches(doc))
            .collect();

        if let Some(key) = &options.sort {
            matched.sort_by(|a, b| key.compare(a, b));
        }

        matched
            .into_iter()
            .skip(options.skip)
            .take(options.limit.unwrap_or(usize::MAX))
            .collect()
    }

    /// Number of documents `find` would return without paging.
    pub fn count<C: Clock>(&self, selector: &Predicate, engine: &FilterEngine<C>) -> usize {
        let query = self.selector(selector, engine);
        self.source
            .documents()
            .iter()
            .filter(|doc| query.matches(doc))
            .count()
    }
}

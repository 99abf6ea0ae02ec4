//! Predicate evaluation against JSON documents.
//!
//! Matching follows the selector semantics the predicates are rendered for:
//! a leaf on a missing field never matches, a leaf on an array field matches
//! when any element does, and ordered comparisons only hold between values of
//! a comparable type.

use std::cmp::Ordering;

use serde_json::Value;

use super::{CompareOp, Condition, Predicate};
use crate::dates::parse_date;

impl Predicate {
    /// Whether `doc` satisfies this predicate.
    pub fn matches(&self, doc: &Value) -> bool {
        match self {
            Predicate::All => true,
            Predicate::Field { field, condition } => match lookup(doc, field) {
                Some(value @ Value::Array(items)) => {
                    condition.holds(value) || items.iter().any(|item| condition.holds(item))
                }
                Some(value) => condition.holds(value),
                None => false,
            },
            Predicate::And(conditions) => conditions.iter().all(|c| c.matches(doc)),
            Predicate::Or(conditions) => conditions.iter().any(|c| c.matches(doc)),
        }
    }
}

impl Condition {
    fn holds(&self, value: &Value) -> bool {
        match self {
            Condition::Eq(expected) => values_equal(value, expected),
            Condition::In(candidates) => candidates.iter().any(|c| values_equal(value, c)),
            Condition::Compare(comparisons) => comparisons.iter().all(|(op, operand)| {
                let Some(ordering) = compare_values(value, operand) else {
                    return false;
                };
                match op {
                    CompareOp::Gt => ordering == Ordering::Greater,
                    CompareOp::Gte => ordering != Ordering::Less,
                    CompareOp::Lt => ordering == Ordering::Less,
                    CompareOp::Lte => ordering != Ordering::Greater,
                }
            }),
            Condition::Contains(text) => match value {
                Value::String(s) => s.to_lowercase().contains(&text.to_lowercase()),
                _ => false,
            },
        }
    }
}

/// Resolve a dot-separated path inside a document.
pub(crate) fn lookup<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(doc, |current, segment| current.as_object()?.get(segment))
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Order two JSON values when they are of comparable types.
///
/// Numbers compare numerically. Two strings that both parse as dates compare
/// as instants, otherwise lexicographically. A date string against a number
/// treats the number as epoch milliseconds.
pub(crate) fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => match (parse_date(x), parse_date(y)) {
            (Some(dx), Some(dy)) => Some(dx.cmp(&dy)),
            _ => Some(x.cmp(y)),
        },
        (Value::String(s), Value::Number(n)) => {
            let millis = parse_date(s)?.timestamp_millis() as f64;
            millis.partial_cmp(&n.as_f64()?)
        }
        (Value::Number(n), Value::String(s)) => {
            let millis = parse_date(s)?.timestamp_millis() as f64;
            n.as_f64()?.partial_cmp(&millis)
        }
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

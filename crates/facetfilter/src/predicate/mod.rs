//! # Predicates
//!
//! A [`Predicate`] is the structured query derived from filter state. It is a
//! small boolean tree:
//!
//! - **Leaves** constrain one document field with a [`Condition`].
//! - **Combinators** are conjunctions (`And`) and disjunctions (`Or`).
//! - [`Predicate::All`] is the empty predicate and matches every document.
//!
//! ## Wire Shape
//!
//! Predicates serialize to the selector shape storage layers expect:
//!
//! | Predicate | JSON |
//! |-----------|------|
//! | `All` | `{}` |
//! | equality | `{"status": "open"}` |
//! | membership | `{"status": {"$in": ["open", "new"]}}` |
//! | comparison | `{"price": {"$gte": 10, "$lte": 20}}` |
//! | substring | `{"name": {"$regex": "ab\\.c", "$options": "i"}}` |
//! | `And` / `Or` | `{"$and": [...]}` / `{"$or": [...]}` |
//!
//! Dates appear as RFC 3339 strings with millisecond precision.

mod eval;
mod generate;

use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value};

pub use generate::{synthesize, Generator, GeneratorFn, SynthContext};

pub(crate) use eval::lookup;

/// Ordered comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CompareOp {
    pub fn as_str(self) -> &'static str {
        match self {
            CompareOp::Gt => "$gt",
            CompareOp::Gte => "$gte",
            CompareOp::Lt => "$lt",
            CompareOp::Lte => "$lte",
        }
    }
}

/// A constraint on a single document field.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Field equals the value.
    Eq(Value),
    /// Field equals one of the values.
    In(Vec<Value>),
    /// Field satisfies every comparison.
    Compare(Vec<(CompareOp, Value)>),
    /// Field is a string containing the text, ignoring case.
    Contains(String),
}

impl Condition {
    pub fn to_json(&self) -> Value {
        match self {
            Condition::Eq(value) => value.clone(),
            Condition::In(values) => operator("$in", Value::Array(values.clone())),
            Condition::Compare(comparisons) => {
                let map: Map<String, Value> = comparisons
                    .iter()
                    .map(|(op, value)| (op.as_str().to_string(), value.clone()))
                    .collect();
                Value::Object(map)
            }
            Condition::Contains(text) => {
                let mut map = Map::new();
                map.insert("$regex".into(), Value::String(regex::escape(text)));
                map.insert("$options".into(), Value::String("i".into()));
                Value::Object(map)
            }
        }
    }
}

/// Structured boolean query over documents.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Predicate {
    /// No constraint; matches everything.
    #[default]
    All,
    Field {
        field: String,
        condition: Condition,
    },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    pub fn field(field: impl Into<String>, condition: Condition) -> Self {
        Predicate::Field {
            field: field.into(),
            condition,
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::field(field, Condition::Eq(value.into()))
    }

    pub fn is_in(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self::field(field, Condition::In(values))
    }

    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::field(field, Condition::Compare(vec![(CompareOp::Gte, value.into())]))
    }

    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::field(field, Condition::Compare(vec![(CompareOp::Lte, value.into())]))
    }

    /// Inclusive window on one field.
    pub fn between(
        field: impl Into<String>,
        lower: impl Into<Value>,
        upper: impl Into<Value>,
    ) -> Self {
        Self::field(
            field,
            Condition::Compare(vec![
                (CompareOp::Gte, lower.into()),
                (CompareOp::Lte, upper.into()),
            ]),
        )
    }

    pub fn contains(field: impl Into<String>, text: impl Into<String>) -> Self {
        Self::field(field, Condition::Contains(text.into()))
    }

    /// Combine conditions: none is `All`, one is itself, more is `And`.
    pub fn all_of(conditions: impl IntoIterator<Item = Predicate>) -> Self {
        let mut conditions: Vec<Predicate> = conditions
            .into_iter()
            .filter(|predicate| !predicate.is_empty())
            .collect();
        match conditions.len() {
            0 => Predicate::All,
            1 => conditions.remove(0),
            _ => Predicate::And(conditions),
        }
    }

    /// Conjunction of `self` and `other`, dropping empty sides.
    pub fn and(self, other: Predicate) -> Self {
        Self::all_of([self, other])
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Predicate::All)
    }

    /// Number of top-level conditions.
    pub fn condition_count(&self) -> usize {
        match self {
            Predicate::All => 0,
            Predicate::And(conditions) => conditions.len(),
            _ => 1,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Predicate::All => Value::Object(Map::new()),
            Predicate::Field { field, condition } => {
                let mut map = Map::new();
                map.insert(field.clone(), condition.to_json());
                Value::Object(map)
            }
            Predicate::And(conditions) => operator("$and", json_list(conditions)),
            Predicate::Or(conditions) => operator("$or", json_list(conditions)),
        }
    }
}

impl Serialize for Predicate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

fn operator(name: &str, operand: Value) -> Value {
    let mut map = Map::new();
    map.insert(name.to_string(), operand);
    Value::Object(map)
}

fn json_list(predicates: &[Predicate]) -> Value {
    Value::Array(predicates.iter().map(Predicate::to_json).collect())
}

/// JSON number for `n`, written as an integer when it has no fractional part.
pub fn number_json(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::Number(Number::from(n as i64))
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_predicate_is_empty_object() {
        assert_eq!(Predicate::All.to_json(), json!({}));
        assert_eq!(Predicate::all_of(Vec::new()), Predicate::All);
    }

    #[test]
    fn test_single_condition_is_not_wrapped() {
        let only = Predicate::is_in("status", vec![json!("open")]);
        assert_eq!(Predicate::all_of([only.clone()]), only);
        assert_eq!(
            only.to_json(),
            json!({ "status": { "$in": ["open"] } })
        );
    }

    #[test]
    fn test_several_conditions_become_and() {
        let combined = Predicate::all_of([
            Predicate::eq("a", 1),
            Predicate::All,
            Predicate::lte("b", 2),
        ]);
        assert_eq!(combined.condition_count(), 2);
        assert_eq!(
            serde_json::to_value(&combined).unwrap(),
            json!({ "$and": [ { "a": 1 }, { "b": { "$lte": 2 } } ] })
        );
    }

    #[test]
    fn test_and_drops_empty_sides() {
        let p = Predicate::eq("a", 1);
        assert_eq!(Predicate::All.and(p.clone()), p);
        assert_eq!(p.clone().and(Predicate::All), p);
    }

    #[test]
    fn test_substring_escapes_regex_metacharacters() {
        assert_eq!(
            Predicate::contains("name", "a.b*").to_json(),
            json!({ "name": { "$regex": "a\\.b\\*", "$options": "i" } })
        );
    }

    #[test]
    fn test_between_renders_both_bounds() {
        assert_eq!(
            Predicate::between("n", 1, 5).to_json(),
            json!({ "n": { "$gte": 1, "$lte": 5 } })
        );
    }

    #[test]
    fn test_numbers_render_as_integers_when_whole() {
        assert_eq!(number_json(5.0), json!(5));
        assert_eq!(number_json(2.5), json!(2.5));
        assert_eq!(number_json(-3.0), json!(-3));
    }
}

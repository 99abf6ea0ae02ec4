//! Type-specific field configuration and live state.
//!
//! Each canonical field carries exactly one [`FieldOptions`] variant matching
//! its kind. The options hold both configuration (bounds, permissions) and the
//! user's live selections (enabled enum values, current range value, chosen
//! date bounds).

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::{DateComparison, FieldKind, RangeBound};

/// Canonical string identity of an enum option value.
///
/// Strings are used as-is; any other JSON value uses its JSON text, so the
/// number `0` and the string `"0"` name the same option.
pub fn option_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// One selectable value of an enum field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumOption {
    pub value: Value,
    pub label: String,
    pub enabled: bool,
}

impl EnumOption {
    pub fn key(&self) -> String {
        option_key(&self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumOptions {
    pub data: Vec<EnumOption>,
}

impl EnumOptions {
    pub fn option(&self, key: &str) -> Option<&EnumOption> {
        self.data.iter().find(|option| option.key() == key)
    }

    pub fn option_mut(&mut self, key: &str) -> Option<&mut EnumOption> {
        self.data.iter_mut().find(|option| option.key() == key)
    }

    /// Values of the options currently switched on, in option order.
    pub fn enabled_values(&self) -> Vec<Value> {
        self.data
            .iter()
            .filter(|option| option.enabled)
            .map(|option| option.value.clone())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeOptions {
    pub min: f64,
    pub max: f64,
    pub value: f64,
    #[serde(rename = "type")]
    pub bound: RangeBound,
    pub allow_type_change: bool,
    /// Set once the user picks a value; only then does it survive a model change.
    #[serde(skip)]
    pub(crate) touched: bool,
}

impl RangeOptions {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn midpoint(min: f64, max: f64) -> f64 {
        min + (max - min) / 2.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateOptions {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(rename = "type")]
    pub comparison: DateComparison,
    pub allow_type_change: bool,
    /// Set once the user picks bounds; only then do they survive a model change.
    #[serde(skip)]
    pub(crate) touched: bool,
}

/// Options for a field, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "options", rename_all = "lowercase")]
pub enum FieldOptions {
    String,
    Number,
    Enum(EnumOptions),
    Range(RangeOptions),
    Date(DateOptions),
}

impl FieldOptions {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldOptions::String => FieldKind::String,
            FieldOptions::Number => FieldKind::Number,
            FieldOptions::Enum(_) => FieldKind::Enum,
            FieldOptions::Range(_) => FieldKind::Range,
            FieldOptions::Date(_) => FieldKind::Date,
        }
    }

    /// Current sub-type name, for kinds that have one.
    pub fn sub_type(&self) -> Option<&'static str> {
        match self {
            FieldOptions::Range(range) => Some(range.bound.as_str()),
            FieldOptions::Date(date) => Some(date.comparison.as_str()),
            _ => None,
        }
    }

    /// Whether the sub-type may be changed after normalization.
    pub fn allows_type_change(&self) -> bool {
        match self {
            FieldOptions::Range(range) => range.allow_type_change,
            FieldOptions::Date(date) => date.allow_type_change,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn colours() -> EnumOptions {
        EnumOptions {
            data: vec![
                EnumOption {
                    value: json!("red"),
                    label: "Red".into(),
                    enabled: true,
                },
                EnumOption {
                    value: json!(2),
                    label: "2".into(),
                    enabled: false,
                },
            ],
        }
    }

    #[test]
    fn test_option_keys_use_string_form() {
        assert_eq!(option_key(&json!("red")), "red");
        assert_eq!(option_key(&json!(0)), "0");
        assert_eq!(option_key(&json!(true)), "true");
    }

    #[test]
    fn test_enum_lookup_by_key() {
        let mut options = colours();
        assert!(options.option("red").is_some());
        assert!(options.option("2").is_some());
        assert!(options.option("blue").is_none());

        options.option_mut("2").unwrap().enabled = true;
        assert_eq!(options.enabled_values(), vec![json!("red"), json!(2)]);
    }

    #[test]
    fn test_range_midpoint_and_bounds() {
        assert_eq!(RangeOptions::midpoint(0.0, 100.0), 50.0);
        assert_eq!(RangeOptions::midpoint(10.0, 20.0), 15.0);

        let range = RangeOptions {
            min: 0.0,
            max: 10.0,
            value: 5.0,
            bound: RangeBound::Max,
            allow_type_change: false,
            touched: false,
        };
        assert!(range.contains(0.0));
        assert!(range.contains(10.0));
        assert!(!range.contains(10.5));
    }

    #[test]
    fn test_options_serialize_with_kind_tag() {
        let value = serde_json::to_value(FieldOptions::String).unwrap();
        assert_eq!(value, json!({ "type": "string" }));

        let range = FieldOptions::Range(RangeOptions {
            min: 0.0,
            max: 10.0,
            value: 5.0,
            bound: RangeBound::Min,
            allow_type_change: true,
            touched: true,
        });
        assert_eq!(range.sub_type(), Some("min"));
        assert!(range.allows_type_change());
        assert_eq!(
            serde_json::to_value(range).unwrap(),
            json!({
                "type": "range",
                "options": { "min": 0.0, "max": 10.0, "value": 5.0, "type": "min", "allowTypeChange": true }
            })
        );
    }
}

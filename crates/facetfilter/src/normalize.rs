//! # Field Model Normalizer
//!
//! Turns raw field descriptors into canonical [`Field`]s. Normalization is a
//! pure function: it validates every descriptor, resolves defaults, and
//! carries live state over from a prior field set, without touching anything
//! outside its arguments.
//!
//! ## Defaults
//!
//! | Property | Default |
//! |----------|---------|
//! | `type` | `string` |
//! | `label` | key with its first letter capitalized |
//! | `enabled` | `false` |
//! | enum option `label` | the option value's string form |
//! | enum option `enabled` | `false` |
//! | range `min` | `0` |
//! | range `value` | midpoint of `min` and `max` |
//! | range `type` | `max` |
//! | date `type` | `between` |
//! | `allowTypeChange` | `false` |
//!
//! ## Carry-over
//!
//! A prior field is only consulted when it has the same key *and* the same
//! kind. State is matched by key, never by position: enum option flags follow
//! the option value, not its index in `data`.
//!
//! - `enabled` flag: always carried.
//! - Enum option flags: carried for option values still present.
//! - Range value: carried when the user set it and it lies inside the new
//!   bounds.
//! - Range/date sub-type: carried when the new definition allows type changes.
//! - Date bounds: carried when the user set them.
//!
//! Values the user never touched follow the new model's defaults.
//!
//! ## Failure
//!
//! Any invalid descriptor fails the whole call. There is no partial result
//! and invalid dates or numbers are never replaced with a fallback value.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::dates;
use crate::error::{FilterError, Result};
use crate::field::{
    option_key, DateComparison, DateOptions, EnumOption, EnumOptions, Field, FieldKind,
    FieldOptions, FieldSet, RangeBound, RangeOptions,
};
use crate::model::RawField;
use crate::predicate::Generator;

/// Normalize `raw` into an ordered field set, carrying state over from `prior`.
pub fn normalize(raw: &[RawField], prior: &FieldSet) -> Result<FieldSet> {
    let fields = raw
        .iter()
        .enumerate()
        .map(|(position, field)| normalize_field(field, position, prior))
        .collect::<Result<Vec<_>>>()?;
    let set = FieldSet::from_fields(fields)?;

    let carried = set.iter().filter(|field| prior.contains(&field.key)).count();
    tracing::debug!(fields = set.len(), carried, "normalized field model");
    Ok(set)
}

fn normalize_field(raw: &RawField, position: usize, prior: &FieldSet) -> Result<Field> {
    let key = resolve_key(raw, position)?;

    let kind = match raw.kind.as_deref() {
        None => FieldKind::String,
        Some(name) => name
            .parse::<FieldKind>()
            .map_err(|_| invalid(&key, format!("unknown type '{name}'")))?,
    };

    let label = match raw.label.as_deref() {
        Some(label) if !label.is_empty() => label.to_string(),
        _ => capitalize(&key),
    };

    let prior = prior.get(&key).filter(|field| field.kind() == kind);

    let options = match kind {
        FieldKind::String => FieldOptions::String,
        FieldKind::Number => FieldOptions::Number,
        FieldKind::Enum => FieldOptions::Enum(enum_options(
            &key,
            &raw.options,
            prior.and_then(Field::enum_options),
        )?),
        FieldKind::Range => FieldOptions::Range(range_options(
            &key,
            &raw.options,
            prior.and_then(Field::range_options),
        )?),
        FieldKind::Date => FieldOptions::Date(date_options(
            &key,
            &raw.options,
            prior.and_then(Field::date_options),
        )?),
    };

    let enabled = prior
        .map(|field| field.enabled)
        .or(raw.enabled)
        .unwrap_or(false);

    let generator = raw
        .generator
        .clone()
        .unwrap_or_else(|| Generator::default_for(kind));

    Ok(Field {
        key,
        label,
        enabled,
        options,
        generator,
    })
}

fn resolve_key(raw: &RawField, position: usize) -> Result<String> {
    match &raw.key {
        Some(Value::String(key)) if !key.is_empty() => Ok(key.clone()),
        Some(Value::String(_)) => Err(FilterError::validation(format!(
            "field #{position}: `key` must not be empty"
        ))),
        Some(other) => Err(FilterError::validation(format!(
            "field #{position}: `key` must be a string, got {other}"
        ))),
        None => Err(FilterError::validation(format!(
            "field #{position}: every field needs a `key`"
        ))),
    }
}

/// `"foo1"` becomes `"Foo1"`.
pub fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Coerce a number or numeric string into a finite `f64`.
pub fn coerce_number(value: &Value) -> Result<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number
        .filter(|n| n.is_finite())
        .ok_or_else(|| FilterError::validation(format!("{value} is not a finite number")))
}

fn invalid(key: &str, reason: impl std::fmt::Display) -> FilterError {
    FilterError::validation(format!("field '{key}': {reason}"))
}

fn present<'a>(options: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    options.get(name).filter(|value| !value.is_null())
}

fn flag(key: &str, options: &Map<String, Value>, name: &str) -> Result<bool> {
    match present(options, name) {
        None => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(other) => Err(invalid(key, format!("`{name}` must be a boolean, got {other}"))),
    }
}

fn number(key: &str, options: &Map<String, Value>, name: &str) -> Result<Option<f64>> {
    present(options, name)
        .map(|value| {
            coerce_number(value)
                .map_err(|_| invalid(key, format!("`{name}` must be a finite number, got {value}")))
        })
        .transpose()
}

fn date(key: &str, options: &Map<String, Value>, name: &str) -> Result<DateTime<Utc>> {
    let value = present(options, name)
        .ok_or_else(|| invalid(key, format!("date fields require `{name}`")))?;
    dates::coerce_value(value).map_err(|e| invalid(key, format!("`{name}`: {e}")))
}

fn sub_type<T>(
    key: &str,
    options: &Map<String, Value>,
    parse: impl Fn(&str) -> Option<T>,
    kind: FieldKind,
) -> Result<Option<T>> {
    match present(options, "type") {
        None => Ok(None),
        Some(Value::String(name)) => parse(name).map(Some).ok_or_else(|| {
            invalid(
                key,
                format!(
                    "`type` must be one of {}, got '{name}'",
                    kind.sub_types().join(", ")
                ),
            )
        }),
        Some(other) => Err(invalid(key, format!("`type` must be a string, got {other}"))),
    }
}

fn enum_options(
    key: &str,
    options: &Map<String, Value>,
    prior: Option<&EnumOptions>,
) -> Result<EnumOptions> {
    let entries = match present(options, "data") {
        Some(Value::Array(entries)) if !entries.is_empty() => entries,
        Some(Value::Array(_)) => return Err(invalid(key, "enum `data` must not be empty")),
        Some(_) => return Err(invalid(key, "enum `data` must be a list")),
        None => return Err(invalid(key, "enum fields require `data`")),
    };

    let mut seen = HashSet::with_capacity(entries.len());
    let mut data = Vec::with_capacity(entries.len());

    for (index, entry) in entries.iter().enumerate() {
        let Value::Object(entry) = entry else {
            return Err(invalid(key, format!("option #{index} must be an object")));
        };
        let value = present(entry, "value")
            .cloned()
            .ok_or_else(|| invalid(key, format!("option #{index} is missing `value`")))?;
        let value_key = option_key(&value);
        if !seen.insert(value_key.clone()) {
            return Err(invalid(key, format!("duplicate option value '{value_key}'")));
        }

        let label = match present(entry, "label") {
            None => value_key.clone(),
            Some(Value::String(label)) => label.clone(),
            Some(other) => {
                return Err(invalid(
                    key,
                    format!("option '{value_key}' label must be a string, got {other}"),
                ))
            }
        };

        let enabled = match prior.and_then(|p| p.option(&value_key)) {
            Some(previous) => previous.enabled,
            None => flag(key, entry, "enabled")?,
        };

        data.push(EnumOption {
            value,
            label,
            enabled,
        });
    }

    Ok(EnumOptions { data })
}

fn range_options(
    key: &str,
    options: &Map<String, Value>,
    prior: Option<&RangeOptions>,
) -> Result<RangeOptions> {
    let min = number(key, options, "min")?.unwrap_or(0.0);
    let max = number(key, options, "max")?
        .ok_or_else(|| invalid(key, "range fields require a numeric `max`"))?;
    if max <= min {
        return Err(invalid(
            key,
            format!("`max` ({max}) must be greater than `min` ({min})"),
        ));
    }

    let allow_type_change = flag(key, options, "allowTypeChange")?;
    let mut bound = sub_type(key, options, RangeBound::parse, FieldKind::Range)?.unwrap_or_default();

    let mut value = match number(key, options, "value")? {
        Some(value) if value >= min && value <= max => value,
        Some(value) => {
            return Err(invalid(
                key,
                format!("`value` ({value}) must lie between {min} and {max}"),
            ))
        }
        None => RangeOptions::midpoint(min, max),
    };

    let mut touched = false;
    if let Some(previous) = prior {
        if previous.touched && previous.value >= min && previous.value <= max {
            value = previous.value;
            touched = true;
        }
        if allow_type_change {
            bound = previous.bound;
        }
    }

    Ok(RangeOptions {
        min,
        max,
        value,
        bound,
        allow_type_change,
        touched,
    })
}

fn date_options(
    key: &str,
    options: &Map<String, Value>,
    prior: Option<&DateOptions>,
) -> Result<DateOptions> {
    let mut start = date(key, options, "start")?;
    let mut end = date(key, options, "end")?;
    if start > end {
        return Err(invalid(key, "`start` must not be after `end`"));
    }

    let allow_type_change = flag(key, options, "allowTypeChange")?;
    let mut comparison =
        sub_type(key, options, DateComparison::parse, FieldKind::Date)?.unwrap_or_default();

    let mut touched = false;
    if let Some(previous) = prior {
        if previous.touched {
            start = previous.start;
            end = previous.end;
            touched = true;
        }
        if allow_type_change {
            comparison = previous.comparison;
        }
    }

    Ok(DateOptions {
        start,
        end,
        comparison,
        allow_type_change,
        touched,
    })
}

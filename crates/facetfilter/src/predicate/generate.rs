//! Per-field condition generators and predicate synthesis.
//!
//! Every canonical field owns a [`Generator`]. Unless the model supplied a
//! custom one, the normalizer installs the default for the field's kind:
//!
//! - `enum`: membership over the enabled option values.
//! - `range`: `$gte` for a `min` bound, `$lte` for a `max` bound.
//! - `date`: day-aligned window, shaped by the comparison sub-type.
//! - `string` / `number`: nothing; they only take part in free-text search.

use std::fmt;
use std::sync::Arc;

use chrono::{FixedOffset, Offset, Utc};

use super::{number_json, Predicate};
use crate::dates::{end_of_day, start_of_day, to_json};
use crate::field::{DateComparison, Field, FieldKind, FieldOptions, FieldSet, RangeBound};

/// Signature of a condition generator.
pub type GeneratorFn = dyn Fn(&Field, &SynthContext) -> Option<Predicate> + Send + Sync;

/// Settings shared by every generator during one synthesis pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynthContext {
    /// Offset used to find where a day starts and ends.
    pub day_offset: FixedOffset,
}

impl Default for SynthContext {
    fn default() -> Self {
        Self {
            day_offset: Utc.fix(),
        }
    }
}

/// Produces a field's condition from its current state.
#[derive(Clone)]
pub struct Generator {
    func: Arc<GeneratorFn>,
    custom: bool,
}

impl Generator {
    /// Wrap a caller-supplied generator.
    pub fn custom<F>(func: F) -> Self
    where
        F: Fn(&Field, &SynthContext) -> Option<Predicate> + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(func),
            custom: true,
        }
    }

    /// The built-in generator for `kind`.
    pub fn default_for(kind: FieldKind) -> Self {
        let func: Arc<GeneratorFn> = match kind {
            FieldKind::Enum => Arc::new(enum_membership),
            FieldKind::Range => Arc::new(range_threshold),
            FieldKind::Date => Arc::new(date_window),
            FieldKind::String | FieldKind::Number => Arc::new(no_condition),
        };
        Self {
            func,
            custom: false,
        }
    }

    pub fn is_custom(&self) -> bool {
        self.custom
    }

    pub fn generate(&self, field: &Field, ctx: &SynthContext) -> Option<Predicate> {
        (self.func)(field, ctx)
    }
}

impl fmt::Debug for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.custom {
            "Generator(custom)"
        } else {
            "Generator(default)"
        })
    }
}

fn no_condition(_field: &Field, _ctx: &SynthContext) -> Option<Predicate> {
    None
}

fn enum_membership(field: &Field, _ctx: &SynthContext) -> Option<Predicate> {
    let options = field.enum_options()?;
    Some(Predicate::is_in(&field.key, options.enabled_values()))
}

fn range_threshold(field: &Field, _ctx: &SynthContext) -> Option<Predicate> {
    let range = field.range_options()?;
    let value = number_json(range.value);
    Some(match range.bound {
        RangeBound::Min => Predicate::gte(&field.key, value),
        RangeBound::Max => Predicate::lte(&field.key, value),
    })
}

fn date_window(field: &Field, ctx: &SynthContext) -> Option<Predicate> {
    let date = field.date_options()?;
    let offset = ctx.day_offset;
    let start_floor = to_json(start_of_day(date.start, offset)?);
    let start_ceil = to_json(end_of_day(date.start, offset)?);
    Some(match date.comparison {
        DateComparison::Before => Predicate::lte(&field.key, start_ceil),
        DateComparison::After => Predicate::gte(&field.key, start_floor),
        DateComparison::Equals => Predicate::between(&field.key, start_floor, start_ceil),
        DateComparison::Between => Predicate::between(
            &field.key,
            start_floor,
            to_json(end_of_day(date.end, offset)?),
        ),
    })
}

/// Free-text disjunction members: substring on string fields, equality on
/// number fields when the text is numeric.
fn text_conditions(fields: &FieldSet, text: &str) -> Vec<Predicate> {
    let number = text
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .map(number_json);

    fields
        .iter()
        .filter_map(|field| match (&field.options, &number) {
            (FieldOptions::String, _) => Some(Predicate::contains(&field.key, text)),
            (FieldOptions::Number, Some(n)) => Some(Predicate::eq(&field.key, n.clone())),
            _ => None,
        })
        .collect()
}

/// Derive the composite predicate from the field list and free-text.
///
/// The free-text disjunction (if any) comes first, followed by each enabled
/// panel field's condition in field order.
pub fn synthesize(fields: &FieldSet, text: &str, ctx: &SynthContext) -> Predicate {
    let mut conditions = Vec::new();

    if !text.is_empty() {
        let search = text_conditions(fields, text);
        if !search.is_empty() {
            conditions.push(Predicate::Or(search));
        }
    }

    conditions.extend(fields.iter().filter_map(|field| field.condition(ctx)));

    Predicate::all_of(conditions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{DateOptions, EnumOption, EnumOptions, RangeOptions};
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn field(key: &str, options: FieldOptions, enabled: bool) -> Field {
        let generator = Generator::default_for(options.kind());
        Field {
            key: key.to_string(),
            label: key.to_string(),
            enabled,
            options,
            generator,
        }
    }

    fn status_field(enabled: bool) -> Field {
        field(
            "status",
            FieldOptions::Enum(EnumOptions {
                data: vec![
                    EnumOption {
                        value: json!("A"),
                        label: "A".into(),
                        enabled: true,
                    },
                    EnumOption {
                        value: json!("B"),
                        label: "B".into(),
                        enabled: false,
                    },
                ],
            }),
            enabled,
        )
    }

    fn price_field(bound: RangeBound) -> Field {
        field(
            "price",
            FieldOptions::Range(RangeOptions {
                min: 0.0,
                max: 100.0,
                value: 40.0,
                bound,
                allow_type_change: true,
                touched: false,
            }),
            true,
        )
    }

    fn created_field(comparison: DateComparison) -> Field {
        field(
            "created",
            FieldOptions::Date(DateOptions {
                start: Utc.with_ymd_and_hms(2024, 3, 5, 13, 0, 0).unwrap(),
                end: Utc.with_ymd_and_hms(2024, 3, 9, 8, 0, 0).unwrap(),
                comparison,
                allow_type_change: true,
                touched: false,
            }),
            true,
        )
    }

    fn set(fields: Vec<Field>) -> FieldSet {
        FieldSet::from_fields(fields).unwrap()
    }

    #[test]
    fn test_nothing_enabled_yields_empty_predicate() {
        let fields = set(vec![status_field(false)]);
        assert_eq!(synthesize(&fields, "", &SynthContext::default()), Predicate::All);
    }

    #[test]
    fn test_enum_membership_uses_enabled_values() {
        let fields = set(vec![status_field(true)]);
        assert_eq!(
            synthesize(&fields, "", &SynthContext::default()).to_json(),
            json!({ "status": { "$in": ["A"] } })
        );
    }

    #[test]
    fn test_range_bound_selects_comparison() {
        let ctx = SynthContext::default();
        assert_eq!(
            price_field(RangeBound::Min).condition(&ctx).unwrap().to_json(),
            json!({ "price": { "$gte": 40 } })
        );
        assert_eq!(
            price_field(RangeBound::Max).condition(&ctx).unwrap().to_json(),
            json!({ "price": { "$lte": 40 } })
        );
    }

    #[test]
    fn test_date_comparisons_are_day_aligned() {
        let ctx = SynthContext::default();
        let json_for = |c| created_field(c).condition(&ctx).unwrap().to_json();

        assert_eq!(
            json_for(DateComparison::Before),
            json!({ "created": { "$lte": "2024-03-05T23:59:59.999Z" } })
        );
        assert_eq!(
            json_for(DateComparison::After),
            json!({ "created": { "$gte": "2024-03-05T00:00:00.000Z" } })
        );
        assert_eq!(
            json_for(DateComparison::Equals),
            json!({ "created": {
                "$gte": "2024-03-05T00:00:00.000Z",
                "$lte": "2024-03-05T23:59:59.999Z"
            } })
        );
        assert_eq!(
            json_for(DateComparison::Between),
            json!({ "created": {
                "$gte": "2024-03-05T00:00:00.000Z",
                "$lte": "2024-03-09T23:59:59.999Z"
            } })
        );
    }

    #[test]
    fn test_text_search_covers_string_and_numeric_fields() {
        let fields = set(vec![
            field("name", FieldOptions::String, false),
            field("qty", FieldOptions::Number, false),
        ]);
        let ctx = SynthContext::default();

        assert_eq!(
            synthesize(&fields, "5", &ctx).to_json(),
            json!({ "$or": [
                { "name": { "$regex": "5", "$options": "i" } },
                { "qty": 5 }
            ] })
        );
        assert_eq!(
            synthesize(&fields, "abc", &ctx).to_json(),
            json!({ "$or": [ { "name": { "$regex": "abc", "$options": "i" } } ] })
        );
    }

    #[test]
    fn test_non_numeric_text_with_only_number_fields_adds_nothing() {
        let fields = set(vec![field("qty", FieldOptions::Number, false)]);
        assert_eq!(
            synthesize(&fields, "abc", &SynthContext::default()),
            Predicate::All
        );
    }

    #[test]
    fn test_custom_generator_overrides_default() {
        let mut price = price_field(RangeBound::Max);
        price.generator = Generator::custom(|field, _| {
            let value = field.range_options()?.value;
            Some(Predicate::eq("discounted_price", number_json(value / 2.0)))
        });
        assert!(price.has_custom_generator());

        let fields = set(vec![price, status_field(true)]);
        assert_eq!(
            synthesize(&fields, "", &SynthContext::default()).to_json(),
            json!({ "$and": [
                { "discounted_price": 20 },
                { "status": { "$in": ["A"] } }
            ] })
        );
    }
}

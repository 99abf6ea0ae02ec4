//! Field kinds and their comparison sub-types.
//!
//! The kind decides how a field takes part in the predicate:
//!
//! | Kind | Participates via | Sub-types |
//! |------|------------------|-----------|
//! | `String` | free-text search (substring) | none |
//! | `Number` | free-text search (equality) | none |
//! | `Enum` | its own panel, membership test | none |
//! | `Range` | its own panel, threshold | `min`, `max` |
//! | `Date` | its own panel, day-aligned window | `before`, `after`, `equals`, `between` |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FilterError;

/// The type of a filterable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
    Number,
    Enum,
    Range,
    Date,
}

impl FieldKind {
    /// Every kind, in declaration order.
    pub const ALL: [FieldKind; 5] = [
        FieldKind::String,
        FieldKind::Number,
        FieldKind::Enum,
        FieldKind::Range,
        FieldKind::Date,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Number => "number",
            FieldKind::Enum => "enum",
            FieldKind::Range => "range",
            FieldKind::Date => "date",
        }
    }

    /// Whether the field is matched by the global free-text search.
    pub fn is_text_searchable(self) -> bool {
        matches!(self, FieldKind::String | FieldKind::Number)
    }

    /// Whether the field has its own enable toggle that contributes a condition.
    pub fn has_panel(self) -> bool {
        matches!(self, FieldKind::Enum | FieldKind::Range | FieldKind::Date)
    }

    /// The sub-types a field of this kind may switch between.
    pub fn sub_types(self) -> &'static [&'static str] {
        match self {
            FieldKind::Range => RangeBound::NAMES,
            FieldKind::Date => DateComparison::NAMES,
            _ => &[],
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldKind {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                FilterError::validation(format!(
                    "unknown field type '{s}' (expected one of string, number, enum, range, date)"
                ))
            })
    }
}

/// Which side of a range threshold matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeBound {
    /// Matches values at or above the threshold.
    Min,
    /// Matches values at or below the threshold.
    #[default]
    Max,
}

impl RangeBound {
    const NAMES: &'static [&'static str] = &["min", "max"];

    pub fn as_str(self) -> &'static str {
        match self {
            RangeBound::Min => "min",
            RangeBound::Max => "max",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "min" => Some(RangeBound::Min),
            "max" => Some(RangeBound::Max),
            _ => None,
        }
    }
}

/// Shape of a date comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateComparison {
    Before,
    After,
    Equals,
    #[default]
    Between,
}

impl DateComparison {
    const NAMES: &'static [&'static str] = &["before", "after", "equals", "between"];

    pub fn as_str(self) -> &'static str {
        match self {
            DateComparison::Before => "before",
            DateComparison::After => "after",
            DateComparison::Equals => "equals",
            DateComparison::Between => "between",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "before" => Some(DateComparison::Before),
            "after" => Some(DateComparison::After),
            "equals" => Some(DateComparison::Equals),
            "between" => Some(DateComparison::Between),
            _ => None,
        }
    }
}

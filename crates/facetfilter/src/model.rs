//! # Raw Field Model
//!
//! The raw model is what callers hand to the engine: an object with a
//! `fields` list, usually parsed from JSON. It is deliberately loose, since
//! keys may be missing or of the wrong type and options are free-form. All
//! checking happens in [`crate::normalize`], which turns it into canonical
//! [`crate::field::Field`]s or fails with a validation error.
//!
//! ## JSON Shape
//!
//! ```text
//! {
//!   "fields": [
//!     { "key": "title" },                                  // type defaults to "string"
//!     { "key": "qty", "type": "number" },
//!     { "key": "status", "type": "enum",
//!       "options": { "data": [ { "value": "open" }, { "value": "done", "label": "Closed" } ] } },
//!     { "key": "price", "type": "range",
//!       "options": { "min": 0, "max": 500, "type": "min", "allowTypeChange": true } },
//!     { "key": "created", "type": "date",
//!       "options": { "start": "2024-01-01", "end": "2024-12-31", "type": "between" } }
//!   ]
//! }
//! ```
//!
//! Custom condition generators cannot be expressed in JSON; attach them with
//! [`RawField::with_generator`].

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{FilterError, Result};
use crate::field::FieldKind;
use crate::predicate::Generator;

/// A field model as supplied by the caller.
#[derive(Debug, Clone, Default)]
pub struct RawModel {
    pub fields: Vec<RawField>,
}

impl RawModel {
    pub fn new(fields: Vec<RawField>) -> Self {
        Self { fields }
    }

    /// Parse a model from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    /// Build a model from a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(mut object) = value else {
            return Err(FilterError::validation(
                "a model must be an object with a `fields` list",
            ));
        };

        let fields = match object.remove("fields") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .into_iter()
                .enumerate()
                .map(|(position, item)| RawField::from_value(item, position))
                .collect::<Result<Vec<_>>>()?,
            Some(_) => return Err(FilterError::validation("model `fields` must be a list")),
        };

        Ok(Self { fields })
    }
}

/// One field descriptor before normalization.
#[derive(Debug, Clone, Default)]
pub struct RawField {
    /// Kept as raw JSON so a non-string key surfaces as a validation error.
    pub key: Option<Value>,
    pub label: Option<String>,
    /// Field type name; `None` means `string`.
    pub kind: Option<String>,
    pub enabled: Option<bool>,
    pub options: Map<String, Value>,
    pub generator: Option<Generator>,
}

#[derive(Deserialize)]
struct WireField {
    key: Option<Value>,
    label: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    enabled: Option<bool>,
    #[serde(default)]
    options: Option<Map<String, Value>>,
}

impl RawField {
    pub fn new(key: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            key: Some(Value::String(key.into())),
            kind: Some(kind.as_str().to_string()),
            ..Default::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(name.into(), value.into());
        self
    }

    pub fn with_generator(mut self, generator: Generator) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Parse one descriptor; `position` is only used in error messages.
    pub fn from_value(value: Value, position: usize) -> Result<Self> {
        if !value.is_object() {
            return Err(FilterError::validation(format!(
                "field #{position} must be an object"
            )));
        }
        let wire: WireField = serde_json::from_value(value)
            .map_err(|e| FilterError::validation(format!("field #{position}: {e}")))?;

        Ok(Self {
            key: wire.key,
            label: wire.label,
            kind: wire.kind,
            enabled: wire.enabled,
            options: wire.options.unwrap_or_default(),
            generator: None,
        })
    }

    /// The key as text, when it is a string.
    pub fn key_str(&self) -> Option<&str> {
        self.key.as_ref().and_then(Value::as_str)
    }
}

//! # Canonical Fields
//!
//! A [`Field`] is the normalized form of one raw field descriptor: key, label,
//! kind-tagged options, the live `enabled` flag, and the generator that turns
//! it into a predicate condition.
//!
//! A [`FieldSet`] is the ordered list of fields plus a key→index map rebuilt
//! whenever the set is rebuilt, so lookups by key are O(1) and keys are
//! guaranteed unique.

mod kind;
mod options;

use std::collections::HashMap;

use serde::Serialize;

use crate::error::{FilterError, Result};
use crate::predicate::{Generator, Predicate, SynthContext};

pub use kind::{DateComparison, FieldKind, RangeBound};
pub use options::{
    option_key, DateOptions, EnumOption, EnumOptions, FieldOptions, RangeOptions,
};

/// A normalized, filterable field.
#[derive(Debug, Clone, Serialize)]
pub struct Field {
    pub key: String,
    pub label: String,
    /// Whether this field's own condition contributes to the predicate.
    pub enabled: bool,
    #[serde(flatten)]
    pub options: FieldOptions,
    #[serde(skip)]
    pub(crate) generator: Generator,
}

impl Field {
    pub fn kind(&self) -> FieldKind {
        self.options.kind()
    }

    pub fn sub_type(&self) -> Option<&'static str> {
        self.options.sub_type()
    }

    pub fn has_custom_generator(&self) -> bool {
        self.generator.is_custom()
    }

    pub fn enum_options(&self) -> Option<&EnumOptions> {
        match &self.options {
            FieldOptions::Enum(options) => Some(options),
            _ => None,
        }
    }

    pub fn range_options(&self) -> Option<&RangeOptions> {
        match &self.options {
            FieldOptions::Range(options) => Some(options),
            _ => None,
        }
    }

    pub fn date_options(&self) -> Option<&DateOptions> {
        match &self.options {
            FieldOptions::Date(options) => Some(options),
            _ => None,
        }
    }

    /// This field's condition, or `None` if it contributes nothing right now.
    ///
    /// Text-searchable fields and disabled fields never contribute here.
    pub fn condition(&self, ctx: &SynthContext) -> Option<Predicate> {
        if !self.enabled || !self.kind().has_panel() {
            return None;
        }
        self.generator
            .generate(self, ctx)
            .filter(|predicate| !predicate.is_empty())
    }
}

/// Ordered, key-indexed collection of canonical fields.
#[derive(Debug, Clone, Default)]
pub struct FieldSet {
    fields: Vec<Field>,
    index: HashMap<String, usize>,
}

impl FieldSet {
    /// Build a set, rejecting duplicate keys.
    pub fn from_fields(fields: Vec<Field>) -> Result<Self> {
        let mut index = HashMap::with_capacity(fields.len());
        for (position, field) in fields.iter().enumerate() {
            if index.insert(field.key.clone(), position).is_some() {
                return Err(FilterError::validation(format!(
                    "duplicate field key '{}'",
                    field.key
                )));
            }
        }
        Ok(Self { fields, index })
    }

    pub fn get(&self, key: &str) -> Option<&Field> {
        self.index.get(key).map(|&position| &self.fields[position])
    }

    pub(crate) fn get_mut(&mut self, key: &str) -> Option<&mut Field> {
        match self.index.get(key) {
            Some(&position) => self.fields.get_mut(position),
            None => None,
        }
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn as_slice(&self) -> &[Field] {
        &self.fields
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<'a> IntoIterator for &'a FieldSet {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

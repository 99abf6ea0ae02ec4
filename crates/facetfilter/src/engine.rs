//! # Filter State Engine
//!
//! The engine owns the live filter state (the canonical field list with its
//! per-field selections, plus one free-text string) and the predicate derived
//! from it.
//!
//! ## Recomputation
//!
//! Every successful mutation rebuilds the predicate before returning, so a
//! read never observes stale field state. The predicate is replaced as a
//! whole and subscribers are notified after the swap.
//!
//! Free-text is the exception. [`FilterEngine::set_text_filter`] only records
//! the value; it is applied once the configured quiet period (200–250ms)
//! passes without another call. The host drives this by calling
//! [`FilterEngine::poll`] from its event loop. Rapid calls therefore coalesce
//! into a single recomputation carrying the last value supplied.
//!
//! ## Failure Modes
//!
//! | Operation | Failure |
//! |-----------|---------|
//! | `set_model`, `set_range_value`, `set_date_values` | `FilterError::Validation` |
//! | any keyed mutation | `FilterError::UnknownField` |
//! | `set_enum_option` | `FilterError::UnknownOption` |
//! | `set_field_sub_type` | `Ok(false)` when the change is not permitted |
//!
//! A failed operation leaves the engine exactly as it was.
//!
//! ## Single Mutator
//!
//! The engine is not shared: all state changes go through `&mut self`. Hosts
//! that need to share it wrap it themselves.

use std::fmt;
use std::time::Duration;

use serde_json::Value;

use crate::clock::{Clock, SystemClock};
use crate::config::FilterConfig;
use crate::dates::DateInput;
use crate::debounce::Debouncer;
use crate::error::{FilterError, Result};
use crate::field::{option_key, DateComparison, Field, FieldOptions, FieldSet, RangeBound};
use crate::model::RawModel;
use crate::normalize::{coerce_number, normalize};
use crate::predicate::{synthesize, Predicate, SynthContext};

/// Handle returned by [`FilterEngine::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&Predicate)>;

/// Owns filter state and keeps the derived predicate current.
pub struct FilterEngine<C: Clock = SystemClock> {
    model: RawModel,
    fields: FieldSet,
    text: String,
    text_input: Debouncer<String>,
    predicate: Predicate,
    recomputes: u64,
    config: FilterConfig,
    ctx: SynthContext,
    clock: C,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl FilterEngine<SystemClock> {
    /// Build an engine with the default configuration.
    pub fn new(model: RawModel) -> Result<Self> {
        Self::with_config(model, FilterConfig::default())
    }

    pub fn with_config(model: RawModel, config: FilterConfig) -> Result<Self> {
        Self::with_clock(model, config, SystemClock)
    }
}

impl<C: Clock> FilterEngine<C> {
    /// Build an engine reading time from `clock`.
    pub fn with_clock(model: RawModel, config: FilterConfig, clock: C) -> Result<Self> {
        config.validate()?;
        let fields = normalize(&model.fields, &FieldSet::default())?;
        let mut engine = Self {
            model,
            fields,
            text: String::new(),
            text_input: Debouncer::new(config.text_debounce()),
            predicate: Predicate::All,
            recomputes: 0,
            ctx: SynthContext {
                day_offset: config.day_offset(),
            },
            config,
            clock,
            subscribers: Vec::new(),
            next_subscription: 0,
        };
        engine.recompute();
        Ok(engine)
    }

    // --- Model ---

    /// Replace the model, keeping live state for keys present in both.
    ///
    /// The new model is fully normalized before anything is swapped in.
    pub fn set_model(&mut self, model: RawModel) -> Result<()> {
        let fields = normalize(&model.fields, &self.fields)?;
        self.model = model;
        self.fields = fields;
        self.recompute();
        Ok(())
    }

    pub fn model(&self) -> &RawModel {
        &self.model
    }

    /// Clear free-text and rebuild every field from the model's own defaults.
    pub fn reset(&mut self) -> Result<()> {
        let fields = normalize(&self.model.fields, &FieldSet::default())?;
        self.text_input.cancel();
        self.text.clear();
        self.fields = fields;
        self.recompute();
        Ok(())
    }

    /// Alias for [`FilterEngine::reset`].
    pub fn clear(&mut self) -> Result<()> {
        self.reset()
    }

    // --- Field mutations ---

    pub fn set_field_enabled(&mut self, key: &str, enabled: bool) -> Result<()> {
        self.field_mut(key)?.enabled = enabled;
        self.recompute();
        Ok(())
    }

    /// Flip a field's enabled flag, returning the new value.
    pub fn toggle_field(&mut self, key: &str) -> Result<bool> {
        let enabled = !self.field_ref(key)?.enabled;
        self.set_field_enabled(key, enabled)?;
        Ok(enabled)
    }

    pub fn set_enum_option(
        &mut self,
        key: &str,
        value: impl Into<Value>,
        enabled: bool,
    ) -> Result<()> {
        let value_key = option_key(&value.into());
        let field = self.field_mut(key)?;
        let FieldOptions::Enum(options) = &mut field.options else {
            return Err(FilterError::unknown_option(key, value_key));
        };
        let option = options
            .option_mut(&value_key)
            .ok_or_else(|| FilterError::unknown_option(key, value_key.clone()))?;
        option.enabled = enabled;
        self.recompute();
        Ok(())
    }

    /// Flip one enum option, returning its new value.
    pub fn toggle_enum_option(&mut self, key: &str, value: impl Into<Value>) -> Result<bool> {
        let value = value.into();
        let value_key = option_key(&value);
        let enabled = !self
            .field_ref(key)?
            .enum_options()
            .and_then(|options| options.option(&value_key))
            .ok_or_else(|| FilterError::unknown_option(key, value_key.clone()))?
            .enabled;
        self.set_enum_option(key, value, enabled)?;
        Ok(enabled)
    }

    /// Set a range field's threshold from a number or numeric string.
    pub fn set_range_value(&mut self, key: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        let field = self.field_mut(key)?;
        let FieldOptions::Range(range) = &mut field.options else {
            return Err(FilterError::validation(format!(
                "field '{key}' is not a range field"
            )));
        };
        let number = coerce_number(&value).map_err(|_| {
            FilterError::validation(format!("field '{key}': {value} is not a finite number"))
        })?;
        if !range.contains(number) {
            return Err(FilterError::validation(format!(
                "field '{key}': {number} lies outside {}..={}",
                range.min, range.max
            )));
        }
        range.value = number;
        range.touched = true;
        self.recompute();
        Ok(())
    }

    /// Switch a range or date field's comparison sub-type.
    ///
    /// Returns `Ok(false)` without changing anything when the field does not
    /// allow type changes or `sub_type` is not valid for it.
    pub fn set_field_sub_type(&mut self, key: &str, sub_type: &str) -> Result<bool> {
        let field = self.field_mut(key)?;
        let changed = match &mut field.options {
            FieldOptions::Range(range) if range.allow_type_change => {
                match RangeBound::parse(sub_type) {
                    Some(bound) => {
                        range.bound = bound;
                        true
                    }
                    None => false,
                }
            }
            FieldOptions::Date(date) if date.allow_type_change => {
                match DateComparison::parse(sub_type) {
                    Some(comparison) => {
                        date.comparison = comparison;
                        true
                    }
                    None => false,
                }
            }
            _ => false,
        };
        if changed {
            self.recompute();
        } else {
            tracing::debug!(field = key, sub_type, "sub-type change rejected");
        }
        Ok(changed)
    }

    /// Set both bounds of a date field.
    pub fn set_date_values(
        &mut self,
        key: &str,
        start: impl Into<DateInput>,
        end: impl Into<DateInput>,
    ) -> Result<()> {
        let start = start.into().coerce()?;
        let end = end.into().coerce()?;
        let field = self.field_mut(key)?;
        let FieldOptions::Date(date) = &mut field.options else {
            return Err(FilterError::validation(format!(
                "field '{key}' is not a date field"
            )));
        };
        if start > end {
            return Err(FilterError::validation(format!(
                "field '{key}': start must not be after end"
            )));
        }
        date.start = start;
        date.end = end;
        date.touched = true;
        self.recompute();
        Ok(())
    }

    // --- Free-text ---

    /// Record a new free-text value; it is applied after the quiet period.
    pub fn set_text_filter(&mut self, text: impl Into<String>) {
        self.text_input.push(text.into(), &self.clock);
        tracing::trace!(
            window_ms = self.text_input.window().as_millis() as u64,
            "text filter change deferred"
        );
    }

    /// Apply a pending free-text value whose quiet period has elapsed.
    ///
    /// Returns whether a recomputation happened.
    pub fn poll(&mut self) -> bool {
        match self.text_input.poll(&self.clock) {
            Some(text) => {
                self.commit_text(text);
                true
            }
            None => false,
        }
    }

    /// Apply a pending free-text value immediately.
    pub fn flush_text_filter(&mut self) -> bool {
        match self.text_input.take() {
            Some(text) => {
                self.commit_text(text);
                true
            }
            None => false,
        }
    }

    pub fn has_pending_text(&self) -> bool {
        self.text_input.is_pending()
    }

    /// How long until pending text is due, for hosts scheduling their next `poll`.
    pub fn text_filter_due_in(&self) -> Option<Duration> {
        self.text_input.remaining(&self.clock)
    }

    /// The most recent free-text value supplied, applied or not.
    pub fn text_filter(&self) -> &str {
        self.text_input
            .pending()
            .map_or(self.text.as_str(), String::as_str)
    }

    pub fn text_filter_label(&self) -> &str {
        &self.config.text_filter_label
    }

    /// Whether any field takes part in free-text search.
    pub fn show_text_filter(&self) -> bool {
        self.fields.iter().any(|field| field.kind().is_text_searchable())
    }

    fn commit_text(&mut self, text: String) {
        self.text = text;
        self.recompute();
    }

    // --- Reads ---

    pub fn fields(&self) -> &[Field] {
        self.fields.as_slice()
    }

    /// Fields with their own filter panel (enum, range, date), in model order.
    pub fn filterable_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|field| field.kind().has_panel())
    }

    pub fn field(&self, key: &str) -> Option<&Field> {
        self.fields.get(key)
    }

    /// Whether `key` names an enabled field; unknown keys are not enabled.
    pub fn is_field_enabled(&self, key: &str) -> bool {
        self.fields.get(key).is_some_and(|field| field.enabled)
    }

    /// The current predicate.
    pub fn filters(&self) -> &Predicate {
        &self.predicate
    }

    pub fn is_filtering(&self) -> bool {
        !self.predicate.is_empty()
    }

    /// How many predicates have been published, including the initial one.
    pub fn recompute_count(&self) -> u64 {
        self.recomputes
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    // --- Subscriptions ---

    /// Call `callback` with every newly published predicate.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&Predicate) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(existing, _)| *existing != id);
        self.subscribers.len() != before
    }

    // --- Internals ---

    fn field_ref(&self, key: &str) -> Result<&Field> {
        self.fields
            .get(key)
            .ok_or_else(|| FilterError::unknown_field(key))
    }

    fn field_mut(&mut self, key: &str) -> Result<&mut Field> {
        self.fields
            .get_mut(key)
            .ok_or_else(|| FilterError::unknown_field(key))
    }

    fn recompute(&mut self) {
        self.predicate = synthesize(&self.fields, &self.text, &self.ctx);
        self.recomputes += 1;
        tracing::debug!(
            conditions = self.predicate.condition_count(),
            recomputes = self.recomputes,
            "published predicate"
        );
        for (_, subscriber) in &mut self.subscribers {
            subscriber(&self.predicate);
        }
    }
}

impl<C: Clock> fmt::Debug for FilterEngine<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterEngine")
            .field("fields", &self.fields)
            .field("text", &self.text)
            .field("pending_text", &self.text_input.pending())
            .field("predicate", &self.predicate)
            .field("recomputes", &self.recomputes)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

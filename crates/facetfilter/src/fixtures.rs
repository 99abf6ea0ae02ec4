//! Shared test fixtures.
//!
//! Available to this crate's unit tests and, through the `test_utils`
//! feature, to integration tests and downstream crates.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use serde_json::json;

use crate::clock::Clock;
use crate::config::FilterConfig;
use crate::engine::FilterEngine;
use crate::model::RawModel;

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

/// A model with one field of every kind, all disabled.
///
/// - `title`: string
/// - `qty`: number
/// - `status`: enum of `open` (enabled), `closed`, `pending`
/// - `price`: range 0..=500, `max` bound, type change allowed
/// - `created`: date, `between` 2024-01-01 and 2024-12-31, type change not allowed
pub fn sample_model() -> RawModel {
    RawModel::from_value(json!({
        "fields": [
            { "key": "title", "type": "string" },
            { "key": "qty", "type": "number", "label": "Quantity" },
            { "key": "status", "type": "enum", "options": { "data": [
                { "value": "open", "label": "Open", "enabled": true },
                { "value": "closed", "label": "Closed" },
                { "value": "pending", "label": "Pending" }
            ] } },
            { "key": "price", "type": "range", "options": {
                "min": 0, "max": 500, "type": "max", "allowTypeChange": true
            } },
            { "key": "created", "type": "date", "options": {
                "start": "2024-01-01", "end": "2024-12-31", "type": "between"
            } }
        ]
    }))
    .expect("sample model is valid")
}

/// Engine over [`sample_model`] with default config and a manual clock.
///
/// The returned clock shares time with the engine's.
pub fn sample_engine() -> (FilterEngine<ManualClock>, ManualClock) {
    engine_with(sample_model())
}

pub fn engine_with(model: RawModel) -> (FilterEngine<ManualClock>, ManualClock) {
    let clock = ManualClock::new();
    let engine = FilterEngine::with_clock(model, FilterConfig::default(), clock.clone())
        .expect("engine builds");
    (engine, clock)
}

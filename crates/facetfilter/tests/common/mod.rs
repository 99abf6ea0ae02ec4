use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use facetfilter::clock::Clock;
use facetfilter::{FilterConfig, FilterEngine, RawModel};
use serde_json::{json, Value};

#[derive(Clone)]
pub struct TestClock(Rc<Cell<Instant>>);

impl TestClock {
    pub fn new() -> Self {
        Self(Rc::new(Cell::new(Instant::now())))
    }

    pub fn advance_ms(&self, ms: u64) {
        self.0.set(self.0.get() + Duration::from_millis(ms));
    }
}

impl Clock for TestClock {
    fn now(&self) -> Instant {
        self.0.get()
    }
}

#[allow(dead_code)]
pub fn model(fields: Value) -> RawModel {
    RawModel::from_value(json!({ "fields": fields })).unwrap()
}

pub fn engine(model: RawModel) -> (FilterEngine<TestClock>, TestClock) {
    let clock = TestClock::new();
    let engine = FilterEngine::with_clock(model, FilterConfig::default(), clock.clone()).unwrap();
    (engine, clock)
}

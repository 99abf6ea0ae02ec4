//! # Facetfilter Architecture
//!
//! Facetfilter turns a declarative list of filterable fields into a live
//! query predicate. A UI renders one panel per field (checkboxes for enums, a
//! slider for ranges, a date picker for dates) plus one free-text box; every
//! change in those panels becomes a change to a [`predicate::Predicate`] that a
//! storage layer can execute.
//!
//! The crate has no UI and no storage of its own. It is the state and the
//! query derivation in between.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Host (UI, service, CLI)                                    │
//! │  - Calls mutations, polls the debounce, reads filters()     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Engine (engine.rs)                                         │
//! │  - Owns field state and free-text                           │
//! │  - Publishes a new predicate after every mutation           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Normalizer (normalize.rs) + Predicates (predicate/)        │
//! │  - Pure functions: raw model → fields, fields → predicate   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Documents (collection.rs)                                  │
//! │  - Optional: evaluate predicates against JSON documents     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use facetfilter::{FilterEngine, RawModel};
//! use serde_json::json;
//!
//! let model = RawModel::from_value(json!({ "fields": [
//!     { "key": "status", "type": "enum",
//!       "options": { "data": [ { "value": "open", "enabled": true }, { "value": "done" } ] } }
//! ] }))?;
//!
//! let mut engine = FilterEngine::new(model)?;
//! assert!(!engine.is_filtering());
//!
//! engine.set_field_enabled("status", true)?;
//! assert_eq!(
//!     engine.filters().to_json(),
//!     json!({ "status": { "$in": ["open"] } })
//! );
//! # Ok::<(), facetfilter::FilterError>(())
//! ```
//!
//! ## Module Overview
//!
//! - [`engine`]: The filter state engine, entry point for hosts
//! - [`normalize`]: Raw model validation and defaulting
//! - [`model`]: Raw, loosely typed model input
//! - [`field`]: Canonical fields and their per-kind options
//! - [`predicate`]: Predicate tree, JSON rendering, generators, evaluation
//! - [`collection`]: In-memory documents queried through an engine
//! - [`config`]: Configuration (defaults, TOML file, environment)
//! - [`dates`]: Date coercion and day boundaries
//! - [`debounce`], [`clock`]: Trailing debounce driven by a pluggable clock
//! - [`error`]: Error types

pub mod clock;
pub mod collection;
pub mod config;
pub mod dates;
pub mod debounce;
pub mod engine;
pub mod error;
pub mod field;
pub mod model;
pub mod normalize;
pub mod predicate;

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures;

pub use config::FilterConfig;
pub use engine::{FilterEngine, SubscriptionId};
pub use error::{FilterError, Result};
pub use field::{Field, FieldKind};
pub use model::{RawField, RawModel};
pub use predicate::Predicate;

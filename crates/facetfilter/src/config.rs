//! # Configuration
//!
//! Engine configuration is managed by [`confique`], which handles layered loading
//! from a TOML file, environment variables, and compiled defaults.
//!
//! ## Resolution Order
//!
//! 1. **Environment variables**: `FACETFILTER_TEXT_DEBOUNCE_MS`, etc.
//! 2. **Config file**: an optional `facetfilter.toml` passed to [`FilterConfig::load`].
//! 3. **Compiled Defaults**: Built-in fallbacks via `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `text_debounce_ms` | `200` | Quiet period before a free-text change is applied (200..=250) |
//! | `text_filter_label` | `Search` | Label shown next to the free-text input |
//! | `day_offset_minutes` | `0` | UTC offset used for start/end-of-day date boundaries |

use std::path::Path;
use std::time::Duration;

use chrono::{FixedOffset, Offset, Utc};
use confique::Config;
use serde::{Deserialize, Serialize};

use crate::error::{FilterError, Result};

/// Smallest accepted debounce window for free-text changes.
pub const MIN_TEXT_DEBOUNCE_MS: u64 = 200;

/// Largest accepted debounce window for free-text changes.
pub const MAX_TEXT_DEBOUNCE_MS: u64 = 250;

const MINUTES_PER_DAY: i32 = 24 * 60;

/// Configuration for a filter engine, optionally stored in `facetfilter.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FilterConfig {
    /// Quiet period, in milliseconds, before a free-text change is applied.
    #[config(default = 200, env = "FACETFILTER_TEXT_DEBOUNCE_MS")]
    pub text_debounce_ms: u64,

    /// Label for the free-text filter input.
    #[config(default = "Search", env = "FACETFILTER_TEXT_FILTER_LABEL")]
    pub text_filter_label: String,

    /// Offset from UTC, in minutes, that defines where a day starts and ends.
    #[config(default = 0, env = "FACETFILTER_DAY_OFFSET_MINUTES")]
    pub day_offset_minutes: i32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            text_debounce_ms: MIN_TEXT_DEBOUNCE_MS,
            text_filter_label: "Search".to_string(),
            day_offset_minutes: 0,
        }
    }
}

impl FilterConfig {
    /// Load configuration from the environment, then `path` (if given), then defaults.
    ///
    /// A missing file is not an error; an unreadable or invalid one is.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Self::builder().env();
        if let Some(path) = path {
            builder = builder.file(path);
        }
        let config = builder.load()?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value lies in its accepted range.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_TEXT_DEBOUNCE_MS..=MAX_TEXT_DEBOUNCE_MS).contains(&self.text_debounce_ms) {
            return Err(FilterError::config(format!(
                "text_debounce_ms must be between {} and {}, got {}",
                MIN_TEXT_DEBOUNCE_MS, MAX_TEXT_DEBOUNCE_MS, self.text_debounce_ms
            )));
        }
        if self.day_offset_minutes.abs() >= MINUTES_PER_DAY {
            return Err(FilterError::config(format!(
                "day_offset_minutes must be within one day, got {}",
                self.day_offset_minutes
            )));
        }
        Ok(())
    }

    /// The debounce window as a [`Duration`].
    pub fn text_debounce(&self) -> Duration {
        Duration::from_millis(self.text_debounce_ms)
    }

    /// The offset used to align date boundaries to whole days.
    pub fn day_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.day_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }
}

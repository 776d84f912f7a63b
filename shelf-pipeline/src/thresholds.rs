//! Runtime-adjustable thresholds for expiry classification.
//!
//! Defaults match the dashboard's settings panel. Changing the window
//! recomputes both expiry subsets; `risk_threshold` is carried and validated
//! but no filter reads it.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default lower bound of the near-expiry window, in days.
pub const DEFAULT_NEAR_EXPIRY_MIN: i64 = 1;
/// Default upper bound of the near-expiry window, in days.
pub const DEFAULT_NEAR_EXPIRY_MAX: i64 = 10;
/// Default waste risk threshold for URGENT.
pub const DEFAULT_RISK_THRESHOLD: f64 = 0.5;
/// Maximum rows forwarded to the assistant per question.
pub const DEFAULT_CONTEXT_LIMIT: usize = 50;

/// Accepted range for either window bound.
pub const WINDOW_BOUND_RANGE: (i64, i64) = (-30, 365);
/// Accepted range for the risk threshold.
pub const RISK_THRESHOLD_RANGE: (f64, f64) = (0.0, 10.0);

/// Inclusive day range `[min, max]` counted as "about to expire".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ExpiryWindow {
    min: i64,
    max: i64,
}

impl ExpiryWindow {
    pub fn new(min: i64, max: i64) -> Result<Self, ConfigError> {
        let (lower, upper) = WINDOW_BOUND_RANGE;
        for (field, value) in [("near_expiry_min", min), ("near_expiry_max", max)] {
            if !(lower..=upper).contains(&value) {
                return Err(ConfigError::OutOfRange {
                    field,
                    value: value as f64,
                    lower: lower as f64,
                    upper: upper as f64,
                });
            }
        }
        if min > max {
            return Err(ConfigError::InvertedWindow { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    pub fn contains(&self, days: f64) -> bool {
        days >= self.min as f64 && days <= self.max as f64
    }
}

impl Default for ExpiryWindow {
    fn default() -> Self {
        Self {
            min: DEFAULT_NEAR_EXPIRY_MIN,
            max: DEFAULT_NEAR_EXPIRY_MAX,
        }
    }
}

/// Threshold settings as they appear in configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub near_expiry_min: i64,
    pub near_expiry_max: i64,
    pub risk_threshold: f64,
    pub context_limit: usize,
}

impl Thresholds {
    pub fn window(&self) -> Result<ExpiryWindow, ConfigError> {
        ExpiryWindow::new(self.near_expiry_min, self.near_expiry_max)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.window()?;
        validate_risk_threshold(self.risk_threshold)?;
        if self.context_limit == 0 {
            return Err(ConfigError::ZeroContextLimit);
        }
        Ok(())
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            near_expiry_min: DEFAULT_NEAR_EXPIRY_MIN,
            near_expiry_max: DEFAULT_NEAR_EXPIRY_MAX,
            risk_threshold: DEFAULT_RISK_THRESHOLD,
            context_limit: DEFAULT_CONTEXT_LIMIT,
        }
    }
}

pub fn validate_risk_threshold(value: f64) -> Result<f64, ConfigError> {
    let (lower, upper) = RISK_THRESHOLD_RANGE;
    if value.is_finite() && (lower..=upper).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::OutOfRange {
            field: "risk_threshold",
            value,
            lower,
            upper,
        })
    }
}

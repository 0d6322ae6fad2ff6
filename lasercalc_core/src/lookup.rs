//! # Lookup Results
//!
//! Every reference-table lookup in this crate returns a [`Lookup`] instead of
//! panicking or returning a bare `Option`. A miss carries the reason, so the
//! UI can show "5mm copper is not tabulated" and a calculator that cannot
//! proceed without the value can promote the miss into a [`CalcError`].
//!
//! ## Example
//!
//! ```rust
//! use lasercalc_core::lookup::{Lookup, RangeValue, Estimate};
//!
//! let range = RangeValue::new(0.3, 0.5, 0.8);
//! assert_eq!(range.pick(Estimate::Typical), 0.5);
//!
//! let hit: Lookup<f64> = Lookup::Found(0.32);
//! assert_eq!(hit.found(), Some(0.32));
//!
//! let miss: Lookup<f64> = Lookup::not_found("kerf", "no 3.0mm nozzle at 1mm");
//! assert!(miss.require().is_err());
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Outcome of a reference-table lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Lookup<T> {
    /// The table has a value for the requested key
    Found(T),
    /// The key is outside the table's domain
    NotFound {
        /// Table that was consulted
        table: String,
        /// Human-readable reason
        reason: String,
    },
}

impl<T> Lookup<T> {
    /// Create a miss for `table` with a reason.
    pub fn not_found(table: impl Into<String>, reason: impl Into<String>) -> Self {
        Lookup::NotFound {
            table: table.into(),
            reason: reason.into(),
        }
    }

    /// `Some(value)` when found.
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(v) => Some(v),
            Lookup::NotFound { .. } => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    /// Transform the found value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Lookup::Found(v) => Lookup::Found(f(v)),
            Lookup::NotFound { table, reason } => Lookup::NotFound { table, reason },
        }
    }

    /// Convert a miss into [`CalcError::UnsupportedCombination`].
    ///
    /// Calculators use this when they cannot produce a result without the value.
    pub fn require(self) -> CalcResult<T> {
        match self {
            Lookup::Found(v) => Ok(v),
            Lookup::NotFound { table, reason } => {
                tracing::warn!(%table, %reason, "reference lookup missed");
                Err(CalcError::unsupported(table, reason))
            }
        }
    }
}

/// Which column of a min/typical/max table to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Estimate {
    /// Best case
    Min,
    /// Typical shop conditions
    #[default]
    Typical,
    /// Worst case
    Max,
}

impl Estimate {
    pub const ALL: [Estimate; 3] = [Estimate::Min, Estimate::Typical, Estimate::Max];

    /// Parse from common string representations
    pub fn from_str_flexible(s: &str) -> CalcResult<Self> {
        match s.to_lowercase().as_str() {
            "min" | "minimum" | "best" => Ok(Estimate::Min),
            "typical" | "typ" | "avg" | "average" => Ok(Estimate::Typical),
            "max" | "maximum" | "worst" => Ok(Estimate::Max),
            _ => Err(CalcError::invalid_input("quality", s, "Expected min, typical or max")),
        }
    }
}

/// A min/typical/max triple from a reference table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeValue {
    pub min: f64,
    pub typical: f64,
    pub max: f64,
}

impl RangeValue {
    pub const fn new(min: f64, typical: f64, max: f64) -> Self {
        RangeValue { min, typical, max }
    }

    /// A range with a single known value (e.g. "no operation": 0/0/0).
    pub const fn fixed(value: f64) -> Self {
        RangeValue::new(value, value, value)
    }

    pub fn pick(&self, estimate: Estimate) -> f64 {
        match estimate {
            Estimate::Min => self.min,
            Estimate::Typical => self.typical,
            Estimate::Max => self.max,
        }
    }

    /// Multiply all three columns by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        RangeValue::new(self.min * factor, self.typical * factor, self.max * factor)
    }
}

/// Percentage of `part` in `total`, 0 when the total is zero.
pub(crate) fn percent_of(part: f64, total: f64) -> f64 {
    if total == 0.0 {
        0.0
    } else {
        part / total * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_columns() {
        let r = RangeValue::new(1.0, 2.0, 3.0);
        assert_eq!(r.pick(Estimate::Min), 1.0);
        assert_eq!(r.pick(Estimate::Typical), 2.0);
        assert_eq!(r.pick(Estimate::Max), 3.0);
        assert_eq!(r.scaled(2.0), RangeValue::new(2.0, 4.0, 6.0));
    }

    #[test]
    fn test_lookup_require() {
        let miss: Lookup<f64> = Lookup::not_found("pierce", "25mm aluminum");
        match miss.require() {
            Err(CalcError::UnsupportedCombination { table, key }) => {
                assert_eq!(table, "pierce");
                assert_eq!(key, "25mm aluminum");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(Lookup::Found(2.0).map(|v| v * 2.0), Lookup::Found(4.0));
    }

    #[test]
    fn test_lookup_serialization() {
        let hit: Lookup<f64> = Lookup::Found(0.32);
        let json = serde_json::to_string(&hit).unwrap();
        assert!(json.contains("\"status\":\"found\""));

        let miss: Lookup<RangeValue> = Lookup::not_found("kerf", "no entry");
        let json = serde_json::to_string(&miss).unwrap();
        assert!(json.contains("\"status\":\"not_found\""));
    }

    #[test]
    fn test_estimate_parse() {
        assert_eq!(Estimate::from_str_flexible("MAX").unwrap(), Estimate::Max);
        assert!(Estimate::from_str_flexible("median").is_err());
    }

    #[test]
    fn test_percent_helpers() {
        assert_eq!(percent_of(1.0, 0.0), 0.0);
        assert!((percent_of(25.0, 200.0) - 12.5).abs() < 1e-12);
    }
}

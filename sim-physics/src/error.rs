//! Errors raised by the parameter-update API.

use thiserror::Error;

/// A rejected parameter edit. The simulation is left untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    /// The value was NaN or infinite.
    #[error("{name} must be finite, got {value}")]
    NonFinite {
        /// Parameter name.
        name: &'static str,
        /// The offending value.
        value: f64,
    },

    /// The value lies outside the accepted interval.
    #[error("{name} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        /// Parameter name.
        name: &'static str,
        /// The offending value.
        value: f64,
        /// Lower bound, inclusive.
        min: f64,
        /// Upper bound, inclusive.
        max: f64,
    },
}

impl ParamError {
    /// Check that `value` is finite and within `[min, max]`.
    pub fn check(name: &'static str, value: f64, min: f64, max: f64) -> Result<f64, Self> {
        if !value.is_finite() {
            return Err(Self::NonFinite { name, value });
        }
        if value < min || value > max {
            return Err(Self::OutOfRange {
                name,
                value,
                min,
                max,
            });
        }
        Ok(value)
    }
}

use thiserror::Error;

/// Errors returned by the telemetry, advisory and price components.
///
/// Every failure in the core is a caller-side selection problem: an unknown
/// catalog entry or a value outside its domain. Nothing here is retryable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AdvisoryError {
    #[error("invalid {field}: {value:?}")]
    InvalidSelection { field: &'static str, value: String },
}

impl AdvisoryError {
    pub fn invalid(field: &'static str, value: impl ToString) -> Self {
        Self::InvalidSelection {
            field,
            value: value.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AdvisoryError>;

/// Reject non-finite values and values outside `[0, 100]`.
pub(crate) fn check_percent(field: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && (0.0..=100.0).contains(&value) {
        Ok(value)
    } else {
        Err(AdvisoryError::invalid(field, value))
    }
}

use super::validate::Field;

/// Rejected input. Always the caller's fault and always recoverable.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{field} must be a number, got {raw:?}")]
    NotNumeric { field: Field, raw: String },

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: Field,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{field} must be a whole number, got {value}")]
    NotWhole { field: Field, value: f64 },
}

impl ValidationError {
    pub fn field(&self) -> Field {
        match self {
            ValidationError::NotNumeric { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::NotWhole { field, .. } => *field,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ComputeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("internal computation error: {quantity} is not finite")]
    NonFinite { quantity: &'static str },
}

impl ComputeError {
    /// `true` for bad input, `false` when the engine itself produced garbage.
    pub fn is_client_fault(&self) -> bool {
        matches!(self, ComputeError::Validation(_))
    }
}

pub(crate) fn ensure_finite(value: f64, quantity: &'static str) -> Result<f64, ComputeError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ComputeError::NonFinite { quantity })
    }
}

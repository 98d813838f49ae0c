use thiserror::Error;

/// Fatal errors raised by the numerical core.
///
/// Numerical degeneracies (negative compartments, Inf/NaN rates) are not errors;
/// they are reported through [`crate::diagnostics::Diagnostics`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FitError {
    /// Reported and modeled series share no common index.
    #[error("empty alignment in {context}: no common samples")]
    EmptyAlignment { context: String },

    /// Aligned data is too short for the requested computation.
    #[error("{context}: need at least {required} days, got {got}")]
    TooShort {
        context: String,
        required: usize,
        got: usize,
    },

    #[error("length mismatch in {context}: {left} has {left_len}, {right} has {right_len}")]
    LengthMismatch {
        context: String,
        left: &'static str,
        left_len: usize,
        right: &'static str,
        right_len: usize,
    },

    #[error("invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    #[error("integration failed on day {day}: {message}")]
    Integration { day: usize, message: String },
}

impl FitError {
    pub fn empty_alignment(context: impl Into<String>) -> Self {
        FitError::EmptyAlignment { context: context.into() }
    }

    pub fn length_mismatch(
        context: impl Into<String>,
        left: &'static str,
        left_len: usize,
        right: &'static str,
        right_len: usize,
    ) -> Self {
        FitError::LengthMismatch {
            context: context.into(),
            left,
            left_len,
            right,
            right_len,
        }
    }
}

pub type Result<T> = std::result::Result<T, FitError>;

use thiserror::Error;

/// Errors produced by the kinetic model.
///
/// The model never guesses: every failure is returned to the caller, which
/// decides how to present it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FitError {
    /// Malformed input (too few points, non-positive concentration or C0,
    /// negative or non-finite time).
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// The fit is mathematically undefined for this data set.
    #[error("cannot fit this data set: {reason}")]
    DegenerateFit { reason: String },
}

impl FitError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    pub fn degenerate(reason: impl Into<String>) -> Self {
        Self::DegenerateFit {
            reason: reason.into(),
        }
    }
}

/// Application-level error carrying the process exit code.
///
/// Exit codes:
/// - 2: usage, input parsing or file IO
/// - 3: invalid data (rejected before fitting)
/// - 4: degenerate fit or terminal failure
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<FitError> for AppError {
    fn from(err: FitError) -> Self {
        let code = match err {
            FitError::InvalidInput { .. } => 3,
            FitError::DegenerateFit { .. } => 4,
        };
        AppError::new(code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_errors_map_to_exit_codes() {
        let invalid: AppError = FitError::invalid("too few points").into();
        assert_eq!(invalid.exit_code(), 3);
        assert_eq!(invalid.to_string(), "invalid input: too few points");

        let degenerate: AppError = FitError::degenerate("all times are zero").into();
        assert_eq!(degenerate.exit_code(), 4);
        assert!(degenerate.to_string().starts_with("cannot fit this data set"));
    }
}

use std::process::ExitCode;

use thiserror::Error;

/// Application-level error type.
///
/// `Extraction`, `Persistence` and `Config` abort the run. `Collection` and
/// `Analysis` are recorded in the report and the run continues.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Resume extraction failed: {0}")]
    Extraction(String),

    #[error("Posting collection failed: {0}")]
    Collection(String),

    #[error("Narrative analysis failed: {0}")]
    Analysis(String),

    #[error("Could not persist report: {0}")]
    Persistence(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Whether this error must abort the run.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, AppError::Collection(_) | AppError::Analysis(_))
    }

    /// Process exit status for a run that ended with this error.
    pub fn exit_code(&self) -> ExitCode {
        let code = match self {
            AppError::Config(_) => 2,
            AppError::Extraction(_) => 3,
            AppError::Persistence(_) => 4,
            AppError::Collection(_) | AppError::Analysis(_) | AppError::Internal(_) => 1,
        };
        ExitCode::from(code)
    }
}

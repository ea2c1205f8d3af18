use thiserror::Error;

#[derive(Error, Debug)]
pub enum PsoError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("Solver is already running")]
    AlreadyRunning,

    #[error("Callback aborted the run: {0}")]
    Callback(String),

    #[error("Worker for particle {particle} panicked")]
    WorkerPanicked { particle: usize },

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PsoError>;

/// Fails with `DimensionMismatch` unless both lengths agree.
pub(crate) fn check_dim(expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(PsoError::DimensionMismatch { expected, found });
    }
    Ok(())
}

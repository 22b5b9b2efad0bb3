use thiserror::Error;

/// Recurrence engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// The rule cannot be enumerated as given (ambiguous terminator, or an
    /// unbounded rule without a window end).
    #[error("Invalid recurrence configuration: {0}")]
    Configuration(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    CoreError(#[from] cadence_core::error::CoreError),
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;

use thiserror::Error;

/// ICS boundary errors
#[derive(Error, Debug)]
pub enum RfcError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Valid RFC 5545 that the engine cannot represent.
    #[error("Unsupported recurrence feature: {0}")]
    Unsupported(String),

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    /// Local time skipped by a DST gap.
    #[error("Non-existent time (DST gap): {0}")]
    NonExistentTime(String),

    #[error(transparent)]
    CoreError(#[from] cadence_core::error::CoreError),
}

pub type RfcResult<T> = std::result::Result<T, RfcError>;

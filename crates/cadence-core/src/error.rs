use thiserror::Error;

/// Errors raised while building or checking the data model.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A rule or event field is outside its allowed range.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// A caller-supplied value such as a window or a timestamp is malformed.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;

use thiserror::Error;

/// Error type for the dashboard core
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DashError {
    /// Dataset missing, unreadable or malformed. Fatal at startup.
    #[error("data unavailable: {0}")]
    DataUnavailable(String),

    /// A caller handed in a value outside the recognised options
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

pub type DashResult<T> = std::result::Result<T, DashError>;

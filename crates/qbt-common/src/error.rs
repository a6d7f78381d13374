use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExporterError {
    #[error("missing configuration: {0}")]
    MissingConfig(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("request to {endpoint} failed: {message}")]
    Request { endpoint: String, message: String },
    #[error("{endpoint} returned status {status}")]
    UnexpectedStatus { endpoint: String, status: u16 },
    #[error("failed to decode response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },
    #[error("authentication failed: {0}")]
    Authentication(String),
    #[error("internal error: {0}")]
    InternalError(String),
}

pub type Result<T> = std::result::Result<T, ExporterError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("Index unavailable: {0}")]
    IndexUnavailable(String),
    #[error("Unknown module: {0}")]
    UnknownModule(String),
    #[error("Unknown file: {0}")]
    UnknownFile(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

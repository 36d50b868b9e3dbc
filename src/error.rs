use std::io;
use std::result::Result as StdResult;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("API error: {0}")]
    ApiError(String),
    #[error("API invalid format: {0}")]
    ApiInvalidFormat(String),
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
}

impl Error {
    /// True for anything that can go wrong between sending a query and
    /// holding a decoded result: transport, service-reported, and shape errors.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            Error::ApiError(_)
                | Error::ApiInvalidFormat(_)
                | Error::NetworkError(_)
                | Error::HttpError(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ApiInvalidFormat(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::ConfigError(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::ConfigError(err.to_string())
    }
}

pub type Result<T> = StdResult<T, Error>;

use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::client::ErrorJson;

#[derive(Debug, Error)]
pub enum AppErrors {
    // -- General error
    #[error("Error: {0}")]
    Error(String),

    #[error("Can't set tracing Global Default")]
    SetGlobalDefaultError(#[from] tracing::subscriber::SetGlobalDefaultError),

    #[error("Can't set the logger")]
    SetLoggerError(#[from] tracing_log::log::SetLoggerError),

    // -- Configuration error
    #[error("Start date must be before end date, start was {start}, end date was {end}")]
    InvalidDateRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Can't parse date: {0}")]
    DateParseError(String),

    #[error("Configuration error")]
    ConfigurationError(#[from] config::ConfigError),

    // -- Preview job error
    #[error("You must call create on a preview job before get_result")]
    JobNotCreated,

    #[error("Unknown preview task status returned from datasift, full response was {0}")]
    UnknownStatus(serde_json::Value),

    #[error("Response is missing field: {0}")]
    MissingField(&'static str),

    #[error("Preview polling cancelled")]
    Cancelled,

    #[error("Preview job did not complete within {0:?}")]
    DeadlineExceeded(Duration),

    // -- Server error
    #[error("API error ({status}): {error}")]
    ApiError { status: u16, error: ErrorJson },

    #[error("Reqwest error: {0}")]
    ReqwestError(String),

    #[error("Invalid header value {0}")]
    InvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Invalid url: {0}")]
    UrlParseError(#[from] url::ParseError),

    // -- File error
    #[error("Failed to open file")]
    FileError(#[from] std::io::Error),

    #[error("Failed to serialise json")]
    JsonError(#[from] serde_json::Error),
}

// Implementing From<reqwest::Error> for AppErrors
impl From<reqwest::Error> for AppErrors {
    fn from(error: reqwest::Error) -> Self {
        AppErrors::ReqwestError(error.to_string())
    }
}

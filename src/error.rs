//! Defines the app level error type and its conversion to JSON error responses.
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The requested months could not be parsed, or the range is empty once
    /// the end has been clamped to today.
    ///
    /// The string describes which part of the request was invalid.
    #[error("invalid date range: {0}")]
    InvalidRange(String),

    /// The granularity was neither "daily" nor "monthly".
    #[error("unknown granularity \"{0}\", expected \"daily\" or \"monthly\"")]
    InvalidGranularity(String),

    /// The query string was missing a parameter or could not be parsed.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// An aggregate row from the record store had no usable amount.
    #[error("the aggregate row for {date} has a missing or non-numeric amount")]
    MalformedAggregate {
        /// The bucket key of the offending row.
        date: String,
    },

    /// The date range resolved to zero buckets.
    ///
    /// Callers must request a range containing at least one day.
    #[error("the date range does not contain any buckets")]
    EmptyRange,

    /// Summing the amounts overflowed a 64-bit integer.
    ///
    /// Amounts are stored in minor units (cents), so this only happens with
    /// corrupt data.
    #[error("a cash flow total overflowed")]
    Overflow,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        tracing::error!("an unhandled SQL error occurred: {}", value);
        Error::SqlError(value)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::InvalidRange(_) | Error::InvalidGranularity(_) | Error::InvalidQuery(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::MalformedAggregate { .. } | Error::EmptyRange => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Error::InvalidTimezoneError(timezone) => {
                tracing::error!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                );
                StatusCode::INTERNAL_SERVER_ERROR
            }
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "an unexpected error occurred" })),
                )
                    .into_response();
            }
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

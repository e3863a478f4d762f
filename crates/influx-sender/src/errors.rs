// SPDX-License-Identifier: Apache-2.0

use reqwest::StatusCode;

/// Errors that abort sender construction. The caller must not proceed
/// without a valid sender.
#[derive(Debug, thiserror::Error)]
pub enum CreationError {
    #[error("invalid InfluxDB endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("database name must not be empty")]
    EmptyDatabase,

    #[error("configuration value {0} must be greater than zero")]
    InvalidConfig(&'static str),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Errors constructing a single point. The batch is untouched when these
/// are returned.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum PointError {
    #[error("series name must not be empty")]
    EmptyName,

    #[error("point must carry at least one field")]
    NoFields,

    #[error("field '{0}' is not a finite number")]
    NonFiniteField(String),
}

/// A single chunk write that did not reach the store.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("write request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("InfluxDB rejected write ({status}): {body}")]
    Rejected { status: StatusCode, body: String },
}

/// Asynchronous report of one failed chunk delivery, surfaced on the error
/// channel returned by [`crate::sender::MetricsSender::new`]. Carries no
/// attempt count: retry is bounded by point age, not by attempts.
#[derive(Debug, thiserror::Error)]
#[error("failed to deliver chunk of {points} points: {source}")]
pub struct DeliveryError {
    /// Number of points in the failed chunk.
    pub points: usize,
    #[source]
    pub source: WriteError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creation_error_display() {
        let error = CreationError::InvalidEndpoint {
            endpoint: "not a url".to_string(),
            reason: "relative URL without a base".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "invalid InfluxDB endpoint 'not a url': relative URL without a base"
        );
        assert_eq!(
            CreationError::EmptyDatabase.to_string(),
            "database name must not be empty"
        );
    }

    #[test]
    fn test_point_error_display() {
        assert_eq!(
            PointError::NonFiniteField("count".to_string()).to_string(),
            "field 'count' is not a finite number"
        );
    }

    #[test]
    fn test_delivery_error_carries_source() {
        let error = DeliveryError {
            points: 1000,
            source: WriteError::Rejected {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: "engine: write failed".to_string(),
            },
        };
        assert_eq!(
            error.to_string(),
            "failed to deliver chunk of 1000 points: InfluxDB rejected write (500 Internal Server Error): engine: write failed"
        );
        assert!(std::error::Error::source(&error).is_some());
    }
}

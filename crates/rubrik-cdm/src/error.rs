// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for rubrik-cdm.

use rubrik_http::TransportError;
use thiserror::Error;

/// Result type using RubrikError.
pub type Result<T> = std::result::Result<T, RubrikError>;

/// Errors that can occur when using the SDK.
///
/// Validation errors (`InvalidParameter`, `InvalidType`, `Config`) are raised
/// before any network I/O. Every failed call, whatever the transport-level
/// outcome, surfaces as `ApiCall`.
#[derive(Debug, Error)]
pub enum RubrikError {
    /// A value outside the allowed set (API version, mutually exclusive arguments, ...).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A value of the wrong shape.
    #[error("invalid type: {0}")]
    InvalidType(String),

    /// Connection failure, HTTP error status, or an error reported inside a success response.
    #[error("api call failed: {message}")]
    ApiCall {
        /// HTTP status, when a response was received.
        status: Option<u16>,
        message: String,
    },

    /// A job reached a failure status. Carries the full job-status body.
    #[error("{0}")]
    Rubrik(String),

    /// Missing or invalid connection configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Request or response JSON could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The caller-supplied polling deadline elapsed before the job finished.
    #[error("job did not finish within {elapsed_ms}ms (last status: {last_status})")]
    JobDeadlineExceeded { elapsed_ms: u64, last_status: String },

    /// Polling was cancelled through the poll policy's cancel flag.
    #[error("job polling cancelled")]
    Cancelled,
}

impl RubrikError {
    pub(crate) fn api_call(message: impl Into<String>) -> Self {
        RubrikError::ApiCall {
            status: None,
            message: message.into(),
        }
    }

    /// HTTP status attached to an `ApiCall` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            RubrikError::ApiCall { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<serde_json::Error> for RubrikError {
    fn from(err: serde_json::Error) -> Self {
        RubrikError::Serialization(err.to_string())
    }
}

impl From<TransportError> for RubrikError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Connect(detail) => RubrikError::api_call(format!(
                "unable to establish a connection to the Rubrik cluster ({detail})"
            )),
            TransportError::Timeout(detail) => RubrikError::api_call(format!(
                "the Rubrik cluster did not respond in time ({detail}); consider increasing the timeout value"
            )),
            TransportError::Tls(detail) => RubrikError::Config(format!("tls setup failed: {detail}")),
            other => RubrikError::api_call(other.to_string()),
        }
    }
}

// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Transport error types.

use thiserror::Error;

/// Failure to obtain any HTTP response from the remote host.
#[derive(Debug, Error)]
pub enum TransportError {
    /// DNS resolution or TCP connection establishment failed (including connect time-outs).
    #[error("connection failed: {0}")]
    Connect(String),

    /// The connection was established but the response did not arrive in time.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The TLS connector could not be configured.
    #[error("tls error: {0}")]
    Tls(String),

    /// The request URL could not be parsed or uses an unsupported scheme.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// Any other I/O failure while sending the request or reading the body.
    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock => {
                TransportError::Timeout(err.to_string())
            }
            _ => TransportError::Io(err.to_string()),
        }
    }
}

impl From<native_tls::Error> for TransportError {
    fn from(err: native_tls::Error) -> Self {
        TransportError::Tls(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_timeout_maps_to_timeout() {
        let err = std::io::Error::new(std::io::ErrorKind::TimedOut, "read timed out");
        assert!(matches!(TransportError::from(err), TransportError::Timeout(_)));
    }

    #[test]
    fn test_other_io_maps_to_io() {
        let err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe");
        let mapped = TransportError::from(err);
        assert!(matches!(mapped, TransportError::Io(_)));
        assert!(mapped.to_string().contains("pipe"));
    }
}

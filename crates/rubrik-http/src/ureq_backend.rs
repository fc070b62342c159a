// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Native backend built on `ureq`.

use std::error::Error as _;
use std::sync::Arc;

use tracing::trace;
use ureq::{Agent, AgentBuilder, ErrorKind};

use crate::error::TransportError;
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};

/// Blocking transport backed by a shared `ureq` agent.
///
/// Cluster nodes usually serve self-signed certificates, so certificate and
/// hostname verification can be switched off with `verify_tls = false`.
#[derive(Clone)]
pub struct UreqTransport {
    agent: Agent,
    verify_tls: bool,
}

impl UreqTransport {
    pub fn new(verify_tls: bool) -> Result<Self, TransportError> {
        let connector = native_tls::TlsConnector::builder()
            .danger_accept_invalid_certs(!verify_tls)
            .danger_accept_invalid_hostnames(!verify_tls)
            .build()?;

        let agent = AgentBuilder::new()
            .tls_connector(Arc::new(connector))
            .build();

        Ok(Self { agent, verify_tls })
    }

    pub fn verify_tls(&self) -> bool {
        self.verify_tls
    }
}

impl std::fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UreqTransport")
            .field("verify_tls", &self.verify_tls)
            .finish()
    }
}

impl HttpTransport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut req = self
            .agent
            .request(request.method.as_str(), &request.url)
            .timeout(request.timeout);
        for (name, value) in &request.headers {
            req = req.set(name, value);
        }

        trace!(method = %request.method, url = %request.url, "sending request");

        let result = match &request.body {
            Some(body) => req.send_string(body),
            None => req.call(),
        };

        match result {
            Ok(response) => {
                let status = response.status();
                let body = response.into_string()?;
                Ok(HttpResponse { status, body })
            }
            Err(ureq::Error::Status(status, response)) => {
                let body = response.into_string()?;
                Ok(HttpResponse { status, body })
            }
            Err(ureq::Error::Transport(transport)) => Err(classify(transport)),
        }
    }
}

fn classify(transport: ureq::Transport) -> TransportError {
    let message = transport.to_string();
    match transport.kind() {
        ErrorKind::Dns | ErrorKind::ConnectionFailed | ErrorKind::ProxyConnect => {
            TransportError::Connect(message)
        }
        ErrorKind::InvalidUrl | ErrorKind::UnknownScheme | ErrorKind::InsecureRequestHttpsOnly => {
            TransportError::InvalidUrl(message)
        }
        ErrorKind::Io if is_timeout(&transport) => TransportError::Timeout(message),
        _ => TransportError::Io(message),
    }
}

fn is_timeout(transport: &ureq::Transport) -> bool {
    let io_timeout = transport
        .source()
        .and_then(|source| source.downcast_ref::<std::io::Error>())
        .is_some_and(|err| {
            matches!(
                err.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
            )
        });
    io_timeout || transport.to_string().contains("timed out")
}

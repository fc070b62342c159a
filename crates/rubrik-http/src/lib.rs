// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Blocking HTTP transport for the Rubrik CDM SDK.
//!
//! The SDK never talks to an HTTP library directly. It builds an
//! [`HttpRequest`], hands it to an [`HttpTransport`], and classifies the
//! [`HttpResponse`] or [`TransportError`] it gets back. The default backend is
//! [`UreqTransport`]; tests substitute their own transport.
//!
//! Non-2xx statuses are ordinary responses. Only failures to obtain a
//! response at all (DNS, connect, TLS, time-outs) are transport errors.

mod error;
mod transport;
mod ureq_backend;

pub use error::TransportError;
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Method};
pub use ureq_backend::UreqTransport;

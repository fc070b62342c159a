// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Rubrik CDM SDK
//!
//! Client library for the Rubrik CDM REST and GraphQL APIs.
//!
//! # Architecture
//!
//! - [`Connect`] holds the node addresses, credentials and HTTP transport and
//!   owns the request dispatcher: endpoint validation, header selection,
//!   request encoding and response classification.
//! - [`ApiClient`] is the capability interface domain helpers depend on. It
//!   exposes `get`/`post`/`put`/`patch`/`delete`/`query` and `job_status`.
//! - [`JobPoller`] follows a job-status URL until the job is finished.
//! - [`helpers`] contains cluster and event helpers built on `ApiClient`.
//!
//! Every failed call surfaces as a [`RubrikError`]; there is no partial
//! success.
//!
//! # Example
//!
//! ```no_run
//! use rubrik_cdm::{ApiClient, CallOptions, Connect, ConnectConfig};
//! use rubrik_cdm::helpers::Cluster;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let rubrik = Connect::new(ConnectConfig::new("10.0.0.10", "admin", "secret"))?;
//!
//! let version = Cluster::new(&rubrik).cluster_version()?;
//! println!("Cluster version: {version}");
//!
//! let snapshot = rubrik.post(
//!     "v1",
//!     "/vmware/vm/VirtualMachine:::1234/snapshot",
//!     serde_json::json!({ "slaId": "INHERIT" }),
//!     CallOptions::function("on_demand_snapshot"),
//! )?;
//! if let Some(href) = snapshot["links"][0]["href"].as_str() {
//!     let job = rubrik.job_status(href, true)?;
//!     println!("Snapshot finished: {}", job["status"]);
//! }
//! # Ok(())
//! # }
//! ```

mod api;
mod client;
mod config;
mod endpoint;
mod error;
mod header;
pub mod helpers;
pub mod logging;
mod poller;
mod request;

pub use api::ApiClient;
pub use client::{Connect, ErrorPredicate, default_embedded_error, strict_embedded_error};
pub use config::{
    ConnectArgs, ConnectConfig, Credentials, DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT, ENV_NODE_IP,
    ENV_PASSWORD, ENV_POLL_INTERVAL_SECS, ENV_TIMEOUT_SECS, ENV_TOKEN, ENV_USERNAME, PollPolicy,
};
pub use endpoint::{ApiVersion, validate as validate_endpoint};
pub use error::{Result, RubrikError};
pub use header::{Headers, authorization_header, unauthenticated_header, user_agent};
pub use poller::{JobPoller, JobState};
pub use request::{ApiRequest, CallOptions, CallType, GraphqlQuery, QueryParams, query_params_from_value};

pub use rubrik_http::{HttpRequest, HttpResponse, HttpTransport, Method, TransportError, UreqTransport};

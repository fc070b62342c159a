// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Connection configuration.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use crate::error::{Result, RubrikError};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

pub const ENV_NODE_IP: &str = "rubrik_cdm_node_ip";
pub const ENV_USERNAME: &str = "rubrik_cdm_username";
pub const ENV_PASSWORD: &str = "rubrik_cdm_password";
pub const ENV_TOKEN: &str = "rubrik_cdm_token";
pub const ENV_TIMEOUT_SECS: &str = "rubrik_cdm_timeout_secs";
pub const ENV_POLL_INTERVAL_SECS: &str = "rubrik_cdm_poll_interval_secs";

/// Credentials used to build the `Authorization` header.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    Basic { username: String, password: String },
    Token(String),
}

impl Credentials {
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn token(token: impl Into<String>) -> Self {
        Credentials::Token(token.into())
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Credentials::Token(_) => f.debug_tuple("Token").field(&"<redacted>").finish(),
        }
    }
}

/// Job polling behaviour.
///
/// With no deadline and no cancel flag the poller waits indefinitely.
#[derive(Debug, Clone)]
pub struct PollPolicy {
    /// Sleep between two polls of an unfinished job.
    pub interval: Duration,
    /// Give up after this much wall-clock time.
    pub deadline: Option<Duration>,
    /// Checked before every sleep; set it to stop waiting.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            deadline: None,
            cancel: None,
        }
    }
}

impl PollPolicy {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }
}

/// Explicit connection arguments; any field left `None` falls back to its
/// environment variable in [`ConnectConfig::from_args`].
#[derive(Default, Clone)]
pub struct ConnectArgs {
    pub node_ip: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub token: Option<String>,
}

impl ConnectArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node_ip(mut self, node_ip: impl Into<String>) -> Self {
        self.node_ip = Some(node_ip.into());
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

impl std::fmt::Debug for ConnectArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectArgs")
            .field("node_ip", &self.node_ip)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Configuration for [`Connect`](crate::Connect).
#[derive(Debug, Clone)]
pub struct ConnectConfig {
    /// Candidate node addresses; one is picked at random for each call.
    pub nodes: Vec<String>,
    pub credentials: Option<Credentials>,
    /// Verify the cluster's TLS certificate (default: false, clusters ship self-signed certs).
    pub verify_tls: bool,
    /// Timeout applied to every HTTP call unless overridden per call.
    pub timeout: Duration,
    pub poll: PollPolicy,
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            credentials: None,
            verify_tls: false,
            timeout: DEFAULT_TIMEOUT,
            poll: PollPolicy::default(),
        }
    }
}

impl ConnectConfig {
    /// Configuration for a single node with Basic credentials.
    pub fn new(
        node: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            nodes: vec![node.into()],
            credentials: Some(Credentials::basic(username, password)),
            ..Self::default()
        }
    }

    /// Create a configuration from environment variables.
    ///
    /// Environment variables:
    /// - `rubrik_cdm_node_ip`: node address, or a comma-separated list (required)
    /// - `rubrik_cdm_token`: API token; takes precedence over username/password
    /// - `rubrik_cdm_username` / `rubrik_cdm_password`: required when no token is set
    /// - `rubrik_cdm_timeout_secs`: per-call timeout (default: 15)
    /// - `rubrik_cdm_poll_interval_secs`: job poll interval (default: 10)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::from_args_with_lookup(ConnectArgs::default(), lookup)
    }

    /// Build a configuration from explicit arguments, reading any value left
    /// unset from the environment.
    pub fn from_args(args: ConnectArgs) -> Result<Self> {
        Self::from_args_with_lookup(args, |key| std::env::var(key).ok())
    }

    /// Same as [`from_args`](Self::from_args) with a custom variable source.
    ///
    /// An explicit token or username/password pair wins over any credentials
    /// found through `lookup`.
    pub fn from_args_with_lookup<F>(args: ConnectArgs, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let given = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

        let nodes = given(args.node_ip)
            .or_else(|| var(ENV_NODE_IP))
            .map(|v| parse_nodes(&v))
            .filter(|nodes| !nodes.is_empty())
            .ok_or_else(|| RubrikError::Config(format!("{ENV_NODE_IP} is required")))?;

        let username = given(args.username);
        let password = given(args.password);
        let token = match given(args.token) {
            Some(token) => Some(token),
            None if username.is_some() || password.is_some() => None,
            None => var(ENV_TOKEN),
        };

        let credentials = match token {
            Some(token) => Credentials::Token(token),
            None => {
                let username = username.or_else(|| var(ENV_USERNAME)).ok_or_else(|| {
                    RubrikError::Config(format!("{ENV_USERNAME} is required"))
                })?;
                let password = password.or_else(|| var(ENV_PASSWORD)).ok_or_else(|| {
                    RubrikError::Config(format!("{ENV_PASSWORD} is required"))
                })?;
                Credentials::basic(username, password)
            }
        };

        let timeout = match var(ENV_TIMEOUT_SECS) {
            Some(v) => Duration::from_secs(parse_secs(ENV_TIMEOUT_SECS, &v)?),
            None => DEFAULT_TIMEOUT,
        };

        let interval = match var(ENV_POLL_INTERVAL_SECS) {
            Some(v) => Duration::from_secs(parse_secs(ENV_POLL_INTERVAL_SECS, &v)?),
            None => DEFAULT_POLL_INTERVAL,
        };

        Ok(Self {
            nodes,
            credentials: Some(credentials),
            timeout,
            poll: PollPolicy::default().with_interval(interval),
            ..Self::default()
        })
    }

    pub fn with_node(mut self, node: impl Into<String>) -> Self {
        self.nodes.push(node.into());
        self
    }

    pub fn with_nodes<I, S>(mut self, nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.nodes = nodes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    /// Check that the configuration can be used to make calls.
    pub fn validate(&self) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(RubrikError::Config(
                "at least one node address is required".to_string(),
            ));
        }
        if let Some(node) = self.nodes.iter().find(|n| n.trim().is_empty()) {
            return Err(RubrikError::Config(format!("invalid node address {node:?}")));
        }
        match &self.credentials {
            None => Err(RubrikError::Config(
                "credentials are required (username/password or API token)".to_string(),
            )),
            Some(Credentials::Basic { username, password })
                if username.is_empty() || password.is_empty() =>
            {
                Err(RubrikError::Config(
                    "username and password must not be empty".to_string(),
                ))
            }
            Some(Credentials::Token(token)) if token.is_empty() => Err(RubrikError::Config(
                "API token must not be empty".to_string(),
            )),
            Some(_) => Ok(()),
        }
    }
}

fn parse_nodes(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_secs(key: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .map_err(|e| RubrikError::Config(format!("invalid {key}: {e}")))
}

// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Connection to a Rubrik cluster and the request dispatcher.

use std::sync::{Arc, Mutex};

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use rand::seq::SliceRandom;
use rubrik_http::{HttpRequest, HttpResponse, HttpTransport, Method, UreqTransport};
use serde_json::{Value, json};
use tracing::{debug, instrument, warn};

use crate::api::ApiClient;
use crate::config::{ConnectArgs, ConnectConfig};
use crate::endpoint::{self, ApiVersion};
use crate::error::{Result, RubrikError};
use crate::header::{Headers, authorization_header, unauthenticated_header};
use crate::poller::JobPoller;
use crate::request::{ApiRequest, CallType, QueryParams};

/// Decides whether a decoded 2xx body reports an application error.
///
/// Returns the error message when it does.
pub type ErrorPredicate = Arc<dyn Fn(CallType, &Value) -> Option<String> + Send + Sync>;

/// Unreserved characters plus `:/?=&` are left as-is in query strings.
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b':')
    .remove(b'/')
    .remove(b'?')
    .remove(b'=')
    .remove(b'&');

/// Default embedded-error detection.
///
/// Bodies carrying a top-level `errorType` or `message` key are treated as
/// failures. GraphQL bodies additionally fail on `error` or `errors`. Note that a
/// successful REST body that happens to contain a `message` field also
/// matches; install a narrower predicate with
/// [`Connect::with_error_predicate`] when an endpoint does that.
pub fn default_embedded_error(call_type: CallType, body: &Value) -> Option<String> {
    let map = body.as_object()?;
    let keys: &[&str] = match call_type {
        CallType::Query => &["errorType", "message", "error", "errors"],
        _ => &["errorType", "message"],
    };
    if !keys.iter().any(|k| map.contains_key(*k)) {
        return None;
    }

    if let Some(message) = map.get("message").and_then(Value::as_str) {
        return Some(message.to_string());
    }
    let detail = keys.iter().find_map(|k| map.get(*k)).unwrap_or(body);
    Some(error_text(detail))
}

/// Only `errorType` (REST) or `error`/`errors` (GraphQL) signal a failure.
pub fn strict_embedded_error(call_type: CallType, body: &Value) -> Option<String> {
    let map = body.as_object()?;
    let key = match call_type {
        CallType::Query => ["error", "errors"].into_iter().find(|k| map.contains_key(*k))?,
        _ => "errorType",
    };
    map.get(key)?;
    Some(
        map.get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error_text(&map[key])),
    )
}

fn error_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(map) => map
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| value.to_string()),
        Value::Array(items) => items
            .iter()
            .map(error_text)
            .collect::<Vec<_>>()
            .join("; "),
        other => other.to_string(),
    }
}

/// Connection to a Rubrik cluster.
///
/// Holds the node addresses and credentials, the HTTP transport and the
/// embedded-error predicate. All calls go through [`Connect::dispatch`]; the
/// per-verb entry points live on the [`ApiClient`] trait.
///
/// The "last function name" diagnostic field is overwritten by every verb
/// call, so it is only meaningful when one thread uses the connection.
pub struct Connect {
    config: ConnectConfig,
    transport: Arc<dyn HttpTransport>,
    error_predicate: ErrorPredicate,
    last_function: Mutex<String>,
}

impl std::fmt::Debug for Connect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connect")
            .field("config", &self.config)
            .field("last_function", &self.last_function_name())
            .finish_non_exhaustive()
    }
}

impl Connect {
    /// Create a connection using the `ureq` transport.
    pub fn new(config: ConnectConfig) -> Result<Self> {
        config.validate()?;
        let transport = UreqTransport::new(config.verify_tls)?;
        Self::with_transport(config, transport)
    }

    /// Create a connection from `rubrik_cdm_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(ConnectConfig::from_env()?)
    }

    /// Connect with explicit arguments; unset ones are read from the environment.
    pub fn from_args(args: ConnectArgs) -> Result<Self> {
        Self::new(ConnectConfig::from_args(args)?)
    }

    /// Create a connection with a custom transport.
    pub fn with_transport<T>(config: ConnectConfig, transport: T) -> Result<Self>
    where
        T: HttpTransport + 'static,
    {
        config.validate()?;
        Ok(Self {
            config,
            transport: Arc::new(transport),
            error_predicate: Arc::new(default_embedded_error),
            last_function: Mutex::new(String::new()),
        })
    }

    /// Replace the embedded-error predicate.
    pub fn with_error_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(CallType, &Value) -> Option<String> + Send + Sync + 'static,
    {
        self.error_predicate = Arc::new(predicate);
        self
    }

    pub fn config(&self) -> &ConnectConfig {
        &self.config
    }

    /// Name recorded by the most recent verb call.
    pub fn last_function_name(&self) -> String {
        self.last_function
            .lock()
            .map(|name| name.clone())
            .unwrap_or_default()
    }

    pub fn poller(&self) -> JobPoller {
        JobPoller::new(self.config.poll.clone())
    }

    /// Validate, send and classify a single call.
    #[instrument(
        skip(self, request),
        fields(call_type = %request.call_type, endpoint = %request.endpoint, function = %self.last_function_name())
    )]
    pub fn dispatch(&self, request: ApiRequest) -> Result<Value> {
        let version = if request.call_type.is_rest() {
            Some(endpoint::validate(&request.api_version, &request.endpoint)?)
        } else {
            None
        };

        let timeout = request.timeout.unwrap_or(self.config.timeout);
        let headers = self.headers_for(&request)?;
        let (method, url, body) = self.build(&request, version)?;

        debug!(method = %method, url = %url, "sending api request");
        if let Some(body) = &body {
            debug!(body = %body, "request body");
        }

        let mut http_request = HttpRequest::new(method, url, timeout).with_headers(headers);
        if let Some(body) = body {
            http_request = http_request.with_body(body);
        }

        let response = self.transport.send(&http_request)?;
        if request.call_type.is_mutating() || !response.is_success() {
            debug!(status = response.status, response = %response.body, "api response");
        } else {
            debug!(status = response.status, "api response");
        }

        self.classify(request.call_type, response)
    }

    fn headers_for(&self, request: &ApiRequest) -> Result<Headers> {
        if !request.authentication && request.call_type != CallType::JobStatus {
            return Ok(unauthenticated_header());
        }
        let credentials = self.config.credentials.as_ref().ok_or_else(|| {
            RubrikError::Config("credentials are required for authenticated calls".to_string())
        })?;
        Ok(authorization_header(credentials))
    }

    fn select_node(&self) -> Result<&str> {
        self.config
            .nodes
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
            .ok_or_else(|| RubrikError::Config("no node address configured".to_string()))
    }

    fn build(
        &self,
        request: &ApiRequest,
        version: Option<ApiVersion>,
    ) -> Result<(Method, String, Option<String>)> {
        let serialize = |body: &Option<Value>| -> Result<Option<String>> {
            body.as_ref()
                .map(serde_json::to_string)
                .transpose()
                .map_err(RubrikError::from)
        };

        match (request.call_type, version) {
            (CallType::JobStatus, _) => {
                if !request.endpoint.starts_with("https://")
                    && !request.endpoint.starts_with("http://")
                {
                    return Err(RubrikError::InvalidParameter(format!(
                        "job status url must be absolute (got {:?})",
                        request.endpoint
                    )));
                }
                Ok((Method::Get, request.endpoint.clone(), None))
            }
            (CallType::Query, _) => {
                let query = request.graphql.as_ref().ok_or_else(|| {
                    RubrikError::InvalidParameter("query call without a GraphQL document".to_string())
                })?;
                let url = format!("https://{}/api/internal/graphql", self.select_node()?);
                Ok((Method::Post, url, Some(serde_json::to_string(&query.envelope())?)))
            }
            (call_type, Some(version)) => {
                let mut url = format!(
                    "https://{}/api/{}{}",
                    self.select_node()?,
                    version,
                    request.endpoint
                );
                if let Some(params) = request.params.as_ref().filter(|p| !p.is_empty()) {
                    url.push('?');
                    url.push_str(&encode_query(params));
                }
                let method = match call_type {
                    CallType::Get => Method::Get,
                    CallType::Post => Method::Post,
                    CallType::Put => Method::Put,
                    CallType::Patch => Method::Patch,
                    _ => Method::Delete,
                };
                let body = match method {
                    Method::Get => None,
                    _ => serialize(&request.body)?,
                };
                Ok((method, url, body))
            }
            (call_type, None) => Err(RubrikError::InvalidParameter(format!(
                "{call_type} call without an api version"
            ))),
        }
    }

    fn classify(&self, call_type: CallType, response: HttpResponse) -> Result<Value> {
        let status = response.status;

        if !response.is_success() {
            let message = serde_json::from_str::<Value>(&response.body)
                .ok()
                .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
                .unwrap_or_else(|| {
                    if response.body.trim().is_empty() {
                        format!("HTTP {status}")
                    } else {
                        response.body.clone()
                    }
                });
            return Err(RubrikError::ApiCall {
                status: Some(status),
                message,
            });
        }

        let marker = json!({ "status_code": status });
        if status == 204 || response.body.trim().is_empty() {
            return Ok(marker);
        }

        let body: Value = match serde_json::from_str(&response.body) {
            Ok(body) => body,
            Err(err) => {
                debug!(error = %err, "response body is not JSON");
                return Ok(marker);
            }
        };

        if let Some(message) = (self.error_predicate)(call_type, &body) {
            warn!(status, message = %message, "error reported in successful response");
            return Err(RubrikError::ApiCall {
                status: Some(status),
                message,
            });
        }

        if call_type == CallType::Query {
            return Ok(match body {
                Value::Object(mut map) => match map.remove("data") {
                    Some(data) => data,
                    None => Value::Object(map),
                },
                other => other,
            });
        }

        Ok(body)
    }
}

fn encode_query(params: &QueryParams) -> String {
    params
        .iter()
        .map(|(k, v)| {
            format!(
                "{}={}",
                utf8_percent_encode(k, QUERY_ENCODE_SET),
                utf8_percent_encode(v, QUERY_ENCODE_SET)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

impl ApiClient for Connect {
    fn dispatch(&self, request: ApiRequest) -> Result<Value> {
        Connect::dispatch(self, request)
    }

    fn record_function_name(&self, name: &str) {
        if let Ok(mut last) = self.last_function.lock() {
            last.clear();
            last.push_str(name);
        }
    }

    fn job_status(&self, url: &str, wait_for_completion: bool) -> Result<Value> {
        let fetch = || Connect::dispatch(self, ApiRequest::job_status(url));
        if !wait_for_completion {
            return fetch();
        }
        self.poller().wait(fetch)
    }
}

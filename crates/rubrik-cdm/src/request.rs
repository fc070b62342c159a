// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Request descriptors consumed by the dispatcher.

use std::time::Duration;

use serde_json::Value;

use crate::error::{Result, RubrikError};

/// Ordered query-string parameters.
pub type QueryParams = Vec<(String, String)>;

/// Kind of call the dispatcher performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallType {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    /// GET against a server-issued job-status URL.
    JobStatus,
    /// GraphQL query posted to the internal GraphQL endpoint.
    Query,
}

impl CallType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::JobStatus => "JOB_STATUS",
            Self::Query => "QUERY",
        }
    }

    /// Calls that send a JSON body and log it.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Self::Post | Self::Put | Self::Patch | Self::Delete | Self::Query
        )
    }

    /// Calls that address `/api/{version}{endpoint}` and must pass endpoint validation.
    pub fn is_rest(&self) -> bool {
        !matches!(self, Self::JobStatus | Self::Query)
    }
}

impl std::fmt::Display for CallType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A GraphQL operation.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphqlQuery {
    pub operation_name: String,
    pub query: String,
    pub variables: Value,
}

impl GraphqlQuery {
    /// `variables` must be a JSON object or null.
    pub fn new(
        operation_name: impl Into<String>,
        query: impl Into<String>,
        variables: Value,
    ) -> Result<Self> {
        let variables = match variables {
            Value::Null => Value::Object(Default::default()),
            Value::Object(map) => Value::Object(map),
            other => {
                return Err(RubrikError::InvalidType(format!(
                    "GraphQL variables must be a JSON object (got {other})"
                )));
            }
        };
        Ok(Self {
            operation_name: operation_name.into(),
            query: query.into(),
            variables,
        })
    }

    /// Envelope posted to the GraphQL endpoint.
    pub(crate) fn envelope(&self) -> Value {
        serde_json::json!({
            "operationName": self.operation_name,
            "variables": self.variables,
            "query": prefixed_document(&self.query),
        })
    }
}

fn prefixed_document(document: &str) -> String {
    let trimmed = document.trim_start();
    if trimmed.starts_with('{')
        || starts_with_keyword(trimmed, "query")
        || starts_with_keyword(trimmed, "mutation")
    {
        document.to_string()
    } else {
        format!("query {document}")
    }
}

fn starts_with_keyword(document: &str, keyword: &str) -> bool {
    document.strip_prefix(keyword).is_some_and(|rest| {
        rest.is_empty() || rest.starts_with(|c: char| c.is_whitespace() || c == '(' || c == '{')
    })
}

/// Per-call settings shared by every verb.
#[derive(Debug, Clone)]
pub struct CallOptions {
    /// Overrides the connection's default timeout (15s unless configured).
    pub timeout: Option<Duration>,
    pub authentication: bool,
    /// Name of the helper issuing the call, recorded for diagnostics.
    pub function_name: Option<String>,
}

impl Default for CallOptions {
    fn default() -> Self {
        Self {
            timeout: None,
            authentication: true,
            function_name: None,
        }
    }
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options recording `name` as the calling function.
    pub fn function(name: impl Into<String>) -> Self {
        Self::default().with_function_name(name)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_authentication(mut self, authentication: bool) -> Self {
        self.authentication = authentication;
        self
    }

    pub fn with_function_name(mut self, name: impl Into<String>) -> Self {
        self.function_name = Some(name.into());
        self
    }
}

/// Everything the dispatcher needs for one call.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub call_type: CallType,
    /// Unvalidated API version tag (REST calls only).
    pub api_version: String,
    /// Endpoint path for REST calls; the full job URL for `JobStatus`.
    pub endpoint: String,
    pub body: Option<Value>,
    pub params: Option<QueryParams>,
    /// `None` uses the connection's configured timeout.
    pub timeout: Option<Duration>,
    pub authentication: bool,
    pub graphql: Option<GraphqlQuery>,
}

impl ApiRequest {
    fn rest(call_type: CallType, api_version: &str, endpoint: &str) -> Self {
        Self {
            call_type,
            api_version: api_version.to_string(),
            endpoint: endpoint.to_string(),
            body: None,
            params: None,
            timeout: None,
            authentication: true,
            graphql: None,
        }
    }

    pub fn get(api_version: &str, endpoint: &str) -> Self {
        Self::rest(CallType::Get, api_version, endpoint)
    }

    pub fn post(api_version: &str, endpoint: &str, body: Value) -> Self {
        Self::rest(CallType::Post, api_version, endpoint).with_body(body)
    }

    pub fn put(api_version: &str, endpoint: &str, body: Value) -> Self {
        Self::rest(CallType::Put, api_version, endpoint).with_body(body)
    }

    pub fn patch(api_version: &str, endpoint: &str, body: Value) -> Self {
        Self::rest(CallType::Patch, api_version, endpoint).with_body(body)
    }

    pub fn delete(api_version: &str, endpoint: &str) -> Self {
        Self::rest(CallType::Delete, api_version, endpoint)
    }

    /// Poll a job-status URL. Always authenticated.
    pub fn job_status(url: &str) -> Self {
        Self::rest(CallType::JobStatus, "", url)
    }

    pub fn query(query: GraphqlQuery) -> Self {
        Self {
            graphql: Some(query),
            ..Self::rest(CallType::Query, "", "")
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_params(mut self, params: QueryParams) -> Self {
        self.params = Some(params);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_authentication(mut self, authentication: bool) -> Self {
        self.authentication = authentication;
        self
    }

    /// Apply timeout and authentication from `options`.
    pub fn with_options(mut self, options: &CallOptions) -> Self {
        if let Some(timeout) = options.timeout {
            self.timeout = Some(timeout);
        }
        self.with_authentication(options.authentication)
    }
}

/// Convert a JSON object of scalar values into query parameters.
///
/// Strings are used as-is, numbers and booleans are rendered, nulls are
/// skipped. Nested arrays/objects are rejected with `InvalidType`.
pub fn query_params_from_value(value: &Value) -> Result<QueryParams> {
    let Value::Object(map) = value else {
        return Err(RubrikError::InvalidType(format!(
            "params must be a JSON object (got {value})"
        )));
    };

    let mut params = Vec::with_capacity(map.len());
    for (key, value) in map {
        let rendered = match value {
            Value::Null => continue,
            Value::String(s) => s.clone(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            other => {
                return Err(RubrikError::InvalidType(format!(
                    "param {key:?} must be a scalar value (got {other})"
                )));
            }
        };
        params.push((key.clone(), rendered));
    }
    Ok(params)
}

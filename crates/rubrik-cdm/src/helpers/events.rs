// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Event queries.

use serde_json::Value;

use crate::api::ApiClient;
use crate::error::{Result, RubrikError};
use crate::request::{CallOptions, QueryParams};

pub const EVENT_STATUSES: &[&str] = &[
    "Failure", "Warning", "Running", "Success", "Canceled", "Canceling", "Queued",
];

pub const EVENT_TYPES: &[&str] = &[
    "Archive",
    "Audit",
    "AuthDomain",
    "Backup",
    "CloudNativeSource",
    "Configuration",
    "Diagnostic",
    "Discovery",
    "Instantiate",
    "Maintenance",
    "NutanixCluster",
    "Recovery",
    "Replication",
    "StorageArray",
    "System",
    "Vcd",
    "VCenter",
];

/// Filters for [`Events::query`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventQuery {
    pub limit: Option<u32>,
    pub status: Option<String>,
    pub event_type: Option<String>,
    pub object_name: Option<String>,
    pub object_ids: Vec<String>,
    pub before_date: Option<String>,
    pub after_date: Option<String>,
}

impl EventQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }

    pub fn with_object_name(mut self, name: impl Into<String>) -> Self {
        self.object_name = Some(name.into());
        self
    }

    pub fn with_object_id(mut self, id: impl Into<String>) -> Self {
        self.object_ids.push(id.into());
        self
    }

    pub fn with_before_date(mut self, date: impl Into<String>) -> Self {
        self.before_date = Some(date.into());
        self
    }

    pub fn with_after_date(mut self, date: impl Into<String>) -> Self {
        self.after_date = Some(date.into());
        self
    }

    /// Validate the filters and render them as query parameters.
    pub fn to_params(&self) -> Result<QueryParams> {
        if let Some(status) = &self.status {
            check_member("status", status, EVENT_STATUSES)?;
        }
        if let Some(event_type) = &self.event_type {
            check_member("event_type", event_type, EVENT_TYPES)?;
        }
        if self.limit == Some(0) {
            return Err(RubrikError::InvalidParameter(
                "limit must be greater than zero".to_string(),
            ));
        }

        let mut params = QueryParams::new();
        let mut push = |key: &str, value: Option<String>| {
            if let Some(value) = value {
                params.push((key.to_string(), value));
            }
        };
        push("limit", self.limit.map(|l| l.to_string()));
        push("status", self.status.clone());
        push("event_type", self.event_type.clone());
        push("object_name", self.object_name.clone());
        if !self.object_ids.is_empty() {
            push("object_ids", Some(self.object_ids.join(",")));
        }
        push("before_date", self.before_date.clone());
        push("after_date", self.after_date.clone());
        Ok(params)
    }
}

fn check_member(field: &str, value: &str, allowed: &[&str]) -> Result<()> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(RubrikError::InvalidParameter(format!(
            "{field} must be one of {} (got {value:?})",
            allowed.join(", ")
        )))
    }
}

/// Event-series lookups and job waiting.
pub struct Events<'a, C: ApiClient + ?Sized> {
    api: &'a C,
}

impl<'a, C: ApiClient + ?Sized> Events<'a, C> {
    pub fn new(api: &'a C) -> Self {
        Self { api }
    }

    /// Events matching `query`, newest first as returned by the cluster.
    pub fn query(&self, query: &EventQuery) -> Result<Vec<Value>> {
        let params = query.to_params()?;
        let response = self.api.get(
            "internal",
            "/event_series",
            Some(params),
            CallOptions::function("get_events"),
        )?;
        match response.get("data") {
            Some(Value::Array(events)) => Ok(events.clone()),
            _ => Err(RubrikError::ApiCall {
                status: None,
                message: "unexpected response: event list without a data array".to_string(),
            }),
        }
    }

    /// Block until the job behind `job_url` finishes.
    pub fn wait_for_job(&self, job_url: &str) -> Result<Value> {
        self.api.record_function_name("wait_for_job");
        self.api.job_status(job_url, true)
    }
}

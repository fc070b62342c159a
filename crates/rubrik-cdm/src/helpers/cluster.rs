// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Cluster-level helpers.

use serde_json::{Value, json};
use tracing::info;

use super::ChangeOutcome;
use crate::api::ApiClient;
use crate::error::{Result, RubrikError};
use crate::request::CallOptions;

pub const SUPPORTED_TIMEZONES: &[&str] = &[
    "America/Anchorage",
    "America/Araguaina",
    "America/Barbados",
    "America/Chicago",
    "America/Denver",
    "America/Los_Angeles",
    "America/Mexico_City",
    "America/New_York",
    "America/Noronha",
    "America/Phoenix",
    "America/Toronto",
    "America/Vancouver",
    "Asia/Bangkok",
    "Asia/Dhaka",
    "Asia/Dubai",
    "Asia/Hong_Kong",
    "Asia/Karachi",
    "Asia/Kathmandu",
    "Asia/Kolkata",
    "Asia/Magadan",
    "Asia/Singapore",
    "Asia/Tokyo",
    "Atlantic/Cape_Verde",
    "Australia/Perth",
    "Australia/Sydney",
    "Europe/Amsterdam",
    "Europe/Athens",
    "Europe/London",
    "Europe/Moscow",
    "Pacific/Auckland",
    "Pacific/Honolulu",
    "Pacific/Midway",
    "UTC",
];

/// Helpers for `/cluster/me` and its node list.
pub struct Cluster<'a, C: ApiClient + ?Sized> {
    api: &'a C,
}

impl<'a, C: ApiClient + ?Sized> Cluster<'a, C> {
    pub fn new(api: &'a C) -> Self {
        Self { api }
    }

    /// Software version running on the cluster, e.g. `5.0.1-p2-1234`.
    pub fn cluster_version(&self) -> Result<String> {
        let response = self.api.get(
            "v1",
            "/cluster/me/version",
            None,
            CallOptions::function("cluster_version"),
        )?;
        string_field(&response, "version")
    }

    /// True when the cluster runs at least `minimum_version` (numeric dotted prefix).
    pub fn minimum_installed_cdm_version(&self, minimum_version: &str) -> Result<bool> {
        let minimum = parse_version(minimum_version).ok_or_else(|| {
            RubrikError::InvalidParameter(format!(
                "minimum_version must look like 5.0 or 5.0.1 (got {minimum_version:?})"
            ))
        })?;
        let running = self.cluster_version()?;
        let current = parse_version(&running).ok_or_else(|| RubrikError::ApiCall {
            status: None,
            message: format!("cluster reported an unparseable version {running:?}"),
        })?;
        Ok(compare_versions(&current, &minimum) != std::cmp::Ordering::Less)
    }

    /// IP addresses of every node in the cluster.
    pub fn cluster_node_ip(&self) -> Result<Vec<String>> {
        self.node_field("cluster_node_ip", "ipAddress")
    }

    /// Node IDs (names) of every node in the cluster.
    pub fn cluster_node_name(&self) -> Result<Vec<String>> {
        self.node_field("cluster_node_name", "id")
    }

    fn node_field(&self, function: &str, field: &str) -> Result<Vec<String>> {
        let response = self.api.get(
            "internal",
            "/cluster/me/node",
            None,
            CallOptions::function(function),
        )?;
        let nodes = response
            .get("data")
            .and_then(Value::as_array)
            .ok_or_else(|| unexpected("node list without a data array"))?;
        nodes.iter().map(|node| string_field(node, field)).collect()
    }

    /// Set the cluster timezone unless it is already `timezone`.
    pub fn configure_timezone(&self, timezone: &str) -> Result<ChangeOutcome<Value>> {
        if !SUPPORTED_TIMEZONES.contains(&timezone) {
            return Err(RubrikError::InvalidParameter(format!(
                "timezone must be one of {} (got {timezone:?})",
                SUPPORTED_TIMEZONES.join(", ")
            )));
        }

        let current = self.api.get(
            "v1",
            "/cluster/me",
            None,
            CallOptions::function("configure_timezone"),
        )?;
        let configured = current
            .get("timezone")
            .and_then(|tz| tz.get("timezone"))
            .and_then(Value::as_str);
        if configured == Some(timezone) {
            return Ok(ChangeOutcome::NoChangeRequired(format!(
                "the cluster is already configured with {timezone:?} as its timezone"
            )));
        }

        info!(from = ?configured, to = %timezone, "updating cluster timezone");
        let response = self.api.patch(
            "v1",
            "/cluster/me",
            json!({ "timezone": { "timezone": timezone } }),
            CallOptions::function("configure_timezone"),
        )?;
        Ok(ChangeOutcome::Applied(response))
    }
}

fn string_field(value: &Value, field: &str) -> Result<String> {
    value
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| unexpected(&format!("response without a {field:?} string")))
}

fn unexpected(message: &str) -> RubrikError {
    RubrikError::ApiCall {
        status: None,
        message: format!("unexpected response: {message}"),
    }
}

/// Leading numeric components of a version string: `5.0.1-p2-1234` → `[5, 0, 1]`.
fn parse_version(version: &str) -> Option<Vec<u32>> {
    let core = version.trim().split(['-', '~', '+']).next()?;
    let parts: Option<Vec<u32>> = core.split('.').map(|p| p.parse().ok()).collect();
    parts.filter(|p| !p.is_empty())
}

fn compare_versions(a: &[u32], b: &[u32]) -> std::cmp::Ordering {
    let len = a.len().max(b.len());
    (0..len)
        .map(|i| {
            let x = a.get(i).copied().unwrap_or(0);
            let y = b.get(i).copied().unwrap_or(0);
            x.cmp(&y)
        })
        .find(|o| o.is_ne())
        .unwrap_or(std::cmp::Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Ordering;

    #[test]
    fn test_parse_version() {
        assert_eq!(parse_version("5.0.1-p2-1234"), Some(vec![5, 0, 1]));
        assert_eq!(parse_version("4.1"), Some(vec![4, 1]));
        assert_eq!(parse_version("abc"), None);
        assert_eq!(parse_version(""), None);
    }

    #[test]
    fn test_compare_versions() {
        assert_eq!(compare_versions(&[5, 0], &[5, 0, 0]), Ordering::Equal);
        assert_eq!(compare_versions(&[5, 1], &[5, 0, 9]), Ordering::Greater);
        assert_eq!(compare_versions(&[4, 2, 1], &[5]), Ordering::Less);
    }
}

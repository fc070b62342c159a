// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! API version and endpoint validation.

use std::str::FromStr;

use crate::error::{Result, RubrikError};

/// REST API versions exposed by the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiVersion {
    V1,
    V2,
    Internal,
}

impl ApiVersion {
    pub const ALL: [ApiVersion; 3] = [ApiVersion::V1, ApiVersion::V2, ApiVersion::Internal];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V1 => "v1",
            Self::V2 => "v2",
            Self::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiVersion {
    type Err = RubrikError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| {
                RubrikError::InvalidParameter(format!(
                    "api_version must be one of v1, v2, internal (got {s:?})"
                ))
            })
    }
}

/// Validate an API version/endpoint pair before any network call.
///
/// The endpoint must start with `/` and must not end with `/`.
pub fn validate(api_version: &str, endpoint: &str) -> Result<ApiVersion> {
    let version = api_version.parse()?;

    if !endpoint.starts_with('/') {
        return Err(RubrikError::InvalidParameter(format!(
            "api_endpoint must start with a \"/\" (got {endpoint:?})"
        )));
    }
    if endpoint.ends_with('/') {
        return Err(RubrikError::InvalidParameter(format!(
            "api_endpoint must not end with a \"/\" (got {endpoint:?})"
        )));
    }

    Ok(version)
}

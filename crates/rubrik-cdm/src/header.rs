// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Request header construction.

use base64::{Engine as _, engine::general_purpose};

use crate::config::Credentials;

/// Ordered list of header name/value pairs.
pub type Headers = Vec<(String, String)>;

pub const AUTHORIZATION: &str = "Authorization";

/// Static client identifier sent as `User-Agent`.
pub fn user_agent() -> String {
    format!("RubrikRustSDK--{}", env!("CARGO_PKG_VERSION"))
}

/// JSON content negotiation headers plus the client identifier.
pub fn unauthenticated_header() -> Headers {
    vec![
        ("Content-Type".to_string(), "application/json".to_string()),
        ("Accept".to_string(), "application/json".to_string()),
        ("User-Agent".to_string(), user_agent()),
    ]
}

/// [`unauthenticated_header`] plus an `Authorization` header for `credentials`.
pub fn authorization_header(credentials: &Credentials) -> Headers {
    let mut headers = unauthenticated_header();
    headers.push((AUTHORIZATION.to_string(), authorization_value(credentials)));
    headers
}

fn authorization_value(credentials: &Credentials) -> String {
    match credentials {
        Credentials::Basic { username, password } => {
            let token = general_purpose::STANDARD.encode(format!("{username}:{password}"));
            format!("Basic {token}")
        }
        Credentials::Token(token) => format!("Bearer {token}"),
    }
}

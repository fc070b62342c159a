// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Domain helpers built on [`ApiClient`](crate::ApiClient).
//!
//! Helpers borrow any `ApiClient` and translate a few named parameters into
//! one or more raw calls. Mutating helpers check the current state first and
//! report [`ChangeOutcome::NoChangeRequired`] when nothing needs to be done.

mod cluster;
mod events;

pub use cluster::{Cluster, SUPPORTED_TIMEZONES};
pub use events::{EVENT_STATUSES, EVENT_TYPES, EventQuery, Events};

/// Result of an idempotent helper.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeOutcome<T> {
    /// The cluster was already in the requested state.
    NoChangeRequired(String),
    /// A change was issued; holds the API response.
    Applied(T),
}

impl<T> ChangeOutcome<T> {
    pub fn is_applied(&self) -> bool {
        matches!(self, ChangeOutcome::Applied(_))
    }

    pub fn applied(self) -> Option<T> {
        match self {
            ChangeOutcome::Applied(value) => Some(value),
            ChangeOutcome::NoChangeRequired(_) => None,
        }
    }
}

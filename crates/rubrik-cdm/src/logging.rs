// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Opt-in log output for scripts.
//!
//! The SDK only emits `tracing` events; nothing is printed unless the
//! application installs a subscriber. Scripts that just want readable output
//! can call [`init_logging`].

use tracing_subscriber::EnvFilter;

/// Install a stderr `fmt` subscriber filtered by `RUST_LOG`, falling back to
/// `default_filter` (e.g. `"rubrik_cdm=debug"`).
///
/// Returns false when a global subscriber was already installed.
pub fn init_logging(default_filter: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}

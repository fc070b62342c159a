// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Connection configuration tests.

use std::time::Duration;

use rubrik_cdm::{
    Connect, ConnectArgs, ConnectConfig, Credentials, ENV_NODE_IP, ENV_PASSWORD, ENV_TOKEN, ENV_USERNAME,
    RubrikError,
};
use serial_test::serial;

fn clear_env() {
    for key in [ENV_NODE_IP, ENV_USERNAME, ENV_PASSWORD, ENV_TOKEN] {
        unsafe { std::env::remove_var(key) };
    }
}

#[test]
#[serial]
fn test_from_env() {
    clear_env();
    unsafe {
        std::env::set_var(ENV_NODE_IP, "10.0.0.1,10.0.0.2");
        std::env::set_var(ENV_USERNAME, "admin");
        std::env::set_var(ENV_PASSWORD, "secret");
    }

    let config = ConnectConfig::from_env().unwrap();
    assert_eq!(config.nodes, vec!["10.0.0.1", "10.0.0.2"]);
    assert_eq!(config.credentials, Some(Credentials::basic("admin", "secret")));
    assert_eq!(config.timeout, Duration::from_secs(15));

    clear_env();
}

#[test]
#[serial]
fn test_from_env_missing_values_is_config_error() {
    clear_env();

    let err = Connect::from_env().unwrap_err();
    assert!(matches!(err, RubrikError::Config(_)));

    unsafe { std::env::set_var(ENV_NODE_IP, "10.0.0.1") };
    let err = ConnectConfig::from_env().unwrap_err();
    assert!(matches!(err, RubrikError::Config(ref m) if m.contains(ENV_USERNAME)));

    clear_env();
}

#[test]
#[serial]
fn test_from_args_fills_gaps_from_env() {
    clear_env();
    unsafe {
        std::env::set_var(ENV_NODE_IP, "10.0.0.1");
        std::env::set_var(ENV_USERNAME, "env-admin");
        std::env::set_var(ENV_PASSWORD, "env-secret");
    }

    let config =
        ConnectConfig::from_args(ConnectArgs::new().with_password("override")).unwrap();
    assert_eq!(config.nodes, vec!["10.0.0.1"]);
    assert_eq!(
        config.credentials,
        Some(Credentials::basic("env-admin", "override"))
    );

    clear_env();
    let err = Connect::from_args(ConnectArgs::new().with_node_ip("10.0.0.1")).unwrap_err();
    assert!(matches!(err, RubrikError::Config(ref m) if m.contains(ENV_USERNAME)));
}

#[test]
fn test_builder_methods() {
    let config = ConnectConfig::default()
        .with_node("10.0.0.1")
        .with_node("10.0.0.2")
        .with_credentials(Credentials::token("api-token"))
        .with_verify_tls(true)
        .with_timeout(Duration::from_secs(60));

    assert_eq!(config.nodes, vec!["10.0.0.1", "10.0.0.2"]);
    assert_eq!(config.credentials, Some(Credentials::token("api-token")));
    assert!(config.verify_tls);
    assert_eq!(config.timeout, Duration::from_secs(60));
    config.validate().unwrap();
}

#[test]
fn test_connect_rejects_invalid_config() {
    let err = Connect::new(ConnectConfig::default()).unwrap_err();
    assert!(matches!(err, RubrikError::Config(_)));
}

#[test]
fn test_connect_new_builds_ureq_transport() {
    let rubrik = Connect::new(ConnectConfig::new("10.0.0.1", "admin", "secret")).unwrap();
    assert_eq!(rubrik.config().nodes, vec!["10.0.0.1"]);
    assert_eq!(rubrik.last_function_name(), "");
}

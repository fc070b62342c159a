// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Shared test utilities: a scripted in-memory transport.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rubrik_cdm::{
    Connect, ConnectConfig, HttpRequest, HttpResponse, HttpTransport, PollPolicy, TransportError,
};

enum Mode {
    Scripted,
    /// Answer 200 with the request body (or `{}` when there is none).
    Echo,
}

/// Transport that replays canned responses and records every request.
#[derive(Clone)]
pub struct MockTransport {
    responses: Arc<Mutex<VecDeque<Result<HttpResponse, TransportError>>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
    mode: Arc<Mode>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            responses: Arc::default(),
            requests: Arc::default(),
            mode: Arc::new(Mode::Scripted),
        }
    }

    pub fn echo() -> Self {
        Self {
            mode: Arc::new(Mode::Echo),
            ..Self::new()
        }
    }

    pub fn respond(&self, status: u16, body: impl Into<String>) -> &Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(HttpResponse::new(status, body)));
        self
    }

    pub fn respond_json(&self, status: u16, body: serde_json::Value) -> &Self {
        self.respond(status, body.to_string())
    }

    pub fn fail(&self, err: TransportError) -> &Self {
        self.responses.lock().unwrap().push_back(Err(err));
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> HttpRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was sent")
    }
}

impl HttpTransport for MockTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        match *self.mode {
            Mode::Echo => Ok(HttpResponse::new(
                200,
                request.body.clone().unwrap_or_else(|| "{}".to_string()),
            )),
            Mode::Scripted => self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(TransportError::Io("no scripted response left".to_string()))),
        }
    }
}

pub fn test_config() -> ConnectConfig {
    ConnectConfig::new("10.0.0.1", "admin", "secret")
        .with_poll_policy(PollPolicy::default().with_interval(Duration::from_millis(5)))
}

pub fn connect(transport: &MockTransport) -> Connect {
    Connect::with_transport(test_config(), transport.clone()).unwrap()
}

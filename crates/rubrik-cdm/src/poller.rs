// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Job-status polling.
//!
//! A job is followed through its status URL until it reaches a terminal
//! state. `SUCCEEDED` and `CANCELED` end the wait successfully; in-progress,
//! canceling and undoing states trigger another poll after the configured
//! interval; any other status is a job failure.

use std::sync::atomic::Ordering;
use std::time::Instant;

use serde_json::Value;
use tracing::{debug, info};

use crate::config::PollPolicy;
use crate::error::{Result, RubrikError};

/// Job state derived from the `status` field of a job-status response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    InProgress,
    Canceling,
    /// Rolling back after an error.
    Failing,
    Succeeded,
    Canceled,
    /// Any status not listed above, including a missing one.
    Failed(String),
}

const IN_PROGRESS: &[&str] = &[
    "QUEUED",
    "RUNNING",
    "FINISHING",
    "TO_FINISH",
    "TO_RETRY",
    "ACQUIRING",
    "TO_YIELDING",
    "YIELDING",
    "TO_YIELDED",
    "YIELDED",
];
const CANCELING: &[&str] = &["CANCELING", "TO_CANCEL"];
const FAILING: &[&str] = &["TO_UNDO", "UNDOING"];

impl JobState {
    pub fn from_status(status: &str) -> Self {
        match status {
            "SUCCEEDED" => JobState::Succeeded,
            "CANCELED" => JobState::Canceled,
            s if IN_PROGRESS.contains(&s) => JobState::InProgress,
            s if CANCELING.contains(&s) => JobState::Canceling,
            s if FAILING.contains(&s) => JobState::Failing,
            other => JobState::Failed(other.to_string()),
        }
    }

    /// Classify a job-status response body.
    pub fn from_response(response: &Value) -> Self {
        match response.get("status").and_then(Value::as_str) {
            Some(status) => Self::from_status(status),
            None => JobState::Failed(String::new()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::Succeeded | JobState::Canceled | JobState::Failed(_)
        )
    }
}

/// Drives a fetch function until the job it reports on is finished.
#[derive(Debug, Clone, Default)]
pub struct JobPoller {
    policy: PollPolicy,
}

impl JobPoller {
    pub fn new(policy: PollPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// Call `fetch` until it returns a terminal job status.
    ///
    /// Errors from `fetch` propagate immediately and are not retried.
    pub fn wait<F>(&self, mut fetch: F) -> Result<Value>
    where
        F: FnMut() -> Result<Value>,
    {
        let started = Instant::now();
        let mut polls: u64 = 0;

        loop {
            let response = fetch()?;
            polls += 1;

            match JobState::from_response(&response) {
                JobState::Succeeded | JobState::Canceled => {
                    debug!(polls, "job reached terminal state");
                    return Ok(response);
                }
                JobState::Failed(status) => {
                    debug!(polls, status = %status, "job failed");
                    return Err(RubrikError::Rubrik(response.to_string()));
                }
                state => {
                    let status = response
                        .get("status")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string();
                    match response.get("progress") {
                        Some(progress) => {
                            info!(status = %status, progress = %progress, "job in progress")
                        }
                        None => info!(status = %status, state = ?state, "job in progress"),
                    }

                    if self.cancelled() {
                        return Err(RubrikError::Cancelled);
                    }
                    if let Some(deadline) = self.policy.deadline {
                        let elapsed = started.elapsed();
                        if elapsed + self.policy.interval > deadline {
                            let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
                            return Err(RubrikError::JobDeadlineExceeded {
                                elapsed_ms,
                                last_status: status,
                            });
                        }
                    }

                    std::thread::sleep(self.policy.interval);
                }
            }
        }
    }

    fn cancelled(&self) -> bool {
        self.policy
            .cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;
    use std::time::Duration;

    fn fast() -> PollPolicy {
        PollPolicy::default().with_interval(Duration::from_millis(1))
    }

    fn scripted(responses: Vec<Value>) -> (impl FnMut() -> Result<Value>, Arc<std::sync::Mutex<u32>>) {
        let calls = Arc::new(std::sync::Mutex::new(0));
        let counter = calls.clone();
        let mut queue: VecDeque<Value> = responses.into();
        let fetch = move || {
            *counter.lock().unwrap() += 1;
            Ok(queue.pop_front().expect("fetched more often than scripted"))
        };
        (fetch, calls)
    }

    #[test]
    fn test_state_classification() {
        for s in IN_PROGRESS {
            assert_eq!(JobState::from_status(s), JobState::InProgress);
        }
        assert_eq!(JobState::from_status("TO_CANCEL"), JobState::Canceling);
        assert_eq!(JobState::from_status("CANCELING"), JobState::Canceling);
        assert_eq!(JobState::from_status("UNDOING"), JobState::Failing);
        assert_eq!(JobState::from_status("SUCCEEDED"), JobState::Succeeded);
        assert_eq!(JobState::from_status("CANCELED"), JobState::Canceled);
        assert_eq!(
            JobState::from_status("FAILED"),
            JobState::Failed("FAILED".to_string())
        );
        assert_eq!(
            JobState::from_response(&json!({"progress": 3})),
            JobState::Failed(String::new())
        );
        assert!(JobState::Canceled.is_terminal());
        assert!(!JobState::Failing.is_terminal());
    }

    #[test]
    fn test_waits_through_in_progress_states() {
        let (fetch, calls) = scripted(vec![
            json!({"status": "QUEUED"}),
            json!({"status": "TO_CANCEL"}),
            json!({"status": "UNDOING", "progress": 80}),
            json!({"status": "CANCELED"}),
        ]);
        let result = JobPoller::new(fast()).wait(fetch).unwrap();
        assert_eq!(result["status"], "CANCELED");
        assert_eq!(*calls.lock().unwrap(), 4);
    }

    #[test]
    fn test_unknown_status_is_failure() {
        let (fetch, _) = scripted(vec![json!({"status": "FAILED", "error": {"message": "x"}})]);
        let err = JobPoller::new(fast()).wait(fetch).unwrap_err();
        match err {
            RubrikError::Rubrik(body) => assert!(body.contains("FAILED")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_fetch_error_propagates() {
        let mut calls = 0;
        let err = JobPoller::new(fast())
            .wait(|| {
                calls += 1;
                Err(RubrikError::api_call("boom"))
            })
            .unwrap_err();
        assert!(matches!(err, RubrikError::ApiCall { .. }));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_deadline() {
        let policy = PollPolicy::default()
            .with_interval(Duration::from_millis(20))
            .with_deadline(Duration::from_millis(50));
        let err = JobPoller::new(policy)
            .wait(|| Ok(json!({"status": "RUNNING"})))
            .unwrap_err();
        match err {
            RubrikError::JobDeadlineExceeded {
                elapsed_ms,
                last_status,
            } => {
                assert_eq!(last_status, "RUNNING");
                // two full intervals slept before the third poll gives up
                assert!((40..10_000).contains(&elapsed_ms), "elapsed_ms = {elapsed_ms}");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_cancel_flag() {
        let flag = Arc::new(AtomicBool::new(false));
        let policy = fast().with_cancel_flag(flag.clone());
        let mut polls = 0;
        let err = JobPoller::new(policy)
            .wait(|| {
                polls += 1;
                if polls == 3 {
                    flag.store(true, Ordering::SeqCst);
                }
                Ok(json!({"status": "RUNNING"}))
            })
            .unwrap_err();
        assert!(matches!(err, RubrikError::Cancelled));
        assert_eq!(polls, 3);
    }
}

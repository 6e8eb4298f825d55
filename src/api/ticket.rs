//! Waiting for asynchronous VibraCore tasks.
//!
//! A submission returns a [`Ticket`]; [`wait_until_ticket_is_ready`] polls
//! `/get-task-status` with a doubling, capped sleep until the task leaves the
//! `PENDING`/`STARTED`/`RETRY` states.

use std::fmt;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, info};

use super::client::{RpcClient, RpcResponse};
use crate::error::{Result, VibraCoreError};

pub const SERVICE: &str = "VibraCore";
pub const STATUS_ROUTE: &str = "/get-task-status";
pub const RESULTS_ROUTE: &str = "/get-task-results";

/// Task state as reported by the remote service under the `"state"` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketState {
    Pending,
    Started,
    Retry,
    Success,
    Failure,
    Other(String),
}

impl TicketState {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "PENDING" => TicketState::Pending,
            "STARTED" => TicketState::Started,
            "RETRY" => TicketState::Retry,
            "SUCCESS" => TicketState::Success,
            "FAILURE" => TicketState::Failure,
            other => TicketState::Other(other.to_string()),
        }
    }

    /// `true` while the task is still queued or running.
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            TicketState::Pending | TicketState::Started | TicketState::Retry
        )
    }

    fn from_body(body: &Value) -> Result<Self> {
        body.get("state")
            .and_then(Value::as_str)
            .map(Self::parse)
            .ok_or_else(|| {
                VibraCoreError::InvalidInput(format!("task status without \"state\": {body}"))
            })
    }
}

impl fmt::Display for TicketState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TicketState::Pending => write!(f, "PENDING"),
            TicketState::Started => write!(f, "STARTED"),
            TicketState::Retry => write!(f, "RETRY"),
            TicketState::Success => write!(f, "SUCCESS"),
            TicketState::Failure => write!(f, "FAILURE"),
            TicketState::Other(raw) => write!(f, "{raw}"),
        }
    }
}

/// Response of a task submission.
#[derive(Debug, Clone)]
pub struct Ticket {
    response: RpcResponse,
}

impl Ticket {
    pub fn status(&self) -> u16 {
        self.response.status
    }

    pub fn is_accepted(&self) -> bool {
        self.response.is_success()
    }

    /// The task descriptor used to query status and results.
    pub fn descriptor(&self) -> Result<Value> {
        self.response.json()
    }
}

impl From<RpcResponse> for Ticket {
    fn from(response: RpcResponse) -> Self {
        Self { response }
    }
}

/// Backoff settings for the poll loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    /// Seed of the doubling sequence; the first sleep is twice this value.
    pub initial_sleep: Duration,
    /// Upper bound of a single sleep.
    pub max_sleep: Duration,
    /// Optional bound on the total wait. `None` waits until the task ends.
    pub timeout: Option<Duration>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_sleep: Duration::from_millis(50),
            max_sleep: Duration::from_secs(10),
            timeout: None,
        }
    }
}

/// Doubling sleep duration, capped at `max`.
#[derive(Debug, Clone)]
pub struct Backoff {
    current: Duration,
    max: Duration,
}

impl Backoff {
    pub fn new(config: &PollConfig) -> Self {
        Self {
            current: config.initial_sleep,
            max: config.max_sleep,
        }
    }

    /// Advances the state and returns the next sleep: `min(current * 2, max)`.
    pub fn next_sleep(&mut self) -> Duration {
        self.current = self.current.saturating_mul(2).min(self.max);
        self.current
    }
}

/// Audit record of a finished poll.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketRecord {
    pub final_state: TicketState,
    pub status_queries: u32,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: i64,
}

fn field_or_empty(body: &Value, key: &str) -> String {
    match body.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Polls the status of `ticket` until the remote task is no longer pending.
///
/// Fails with [`VibraCoreError::Submission`] when the ticket itself carries a
/// non-success status (no status query is issued), with
/// [`VibraCoreError::Poll`] when a status query fails, and with
/// [`VibraCoreError::JobFailure`] when the task ends in `FAILURE`.
pub async fn wait_until_ticket_is_ready(
    client: &impl RpcClient,
    ticket: &Ticket,
    config: &PollConfig,
) -> Result<TicketRecord> {
    if !ticket.is_accepted() {
        return Err(VibraCoreError::Submission {
            status: ticket.status(),
            body: ticket.response.text(),
        });
    }
    let descriptor = ticket.descriptor()?;

    let started_at = Utc::now();
    let clock = Instant::now();
    let mut backoff = Backoff::new(config);
    let mut state = TicketState::Started;
    let mut status_queries = 0;
    let mut last_body = Value::Null;

    while state.is_pending() {
        let pause = backoff.next_sleep();
        sleep(pause).await;

        let response = client
            .call_endpoint(SERVICE, STATUS_ROUTE, &descriptor)
            .await?;
        status_queries += 1;
        if !response.is_success() {
            return Err(VibraCoreError::Poll {
                status: response.status,
                body: response.text(),
            });
        }

        let body: Value = response.json()?;
        state = TicketState::from_body(&body)?;
        last_body = body;
        debug!(%state, query = status_queries, slept_ms = pause.as_millis() as u64, "task status");

        if let Some(timeout) = config.timeout
            && state.is_pending()
            && clock.elapsed() >= timeout
        {
            return Err(VibraCoreError::PollTimeout {
                elapsed: clock.elapsed(),
            });
        }
    }

    if state == TicketState::Failure {
        return Err(VibraCoreError::JobFailure {
            message: field_or_empty(&last_body, "msg"),
            traceback: field_or_empty(&last_body, "traceback"),
        });
    }

    let completed_at = Utc::now();
    info!(%state, status_queries, "task finished");
    Ok(TicketRecord {
        final_state: state,
        status_queries,
        started_at,
        completed_at,
        duration_ms: (completed_at - started_at).num_milliseconds(),
    })
}

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VibraCoreError {
    #[error("submission rejected (status {status}): {body}")]
    Submission { status: u16, body: String },

    #[error("task status query failed (status {status}): {body}")]
    Poll { status: u16, body: String },

    #[error("remote task failed: {message}\n{traceback}")]
    JobFailure { message: String, traceback: String },

    #[error("task did not finish within {}s", elapsed.as_secs_f64())]
    PollTimeout { elapsed: Duration },

    #[error("fetching task results failed (status {status}): {body}")]
    ResultFetch { status: u16, body: String },

    #[error("missing fields: {}", missing.join(", "))]
    MissingField { missing: Vec<String> },

    #[error("lookup failed: {0}")]
    Lookup(String),

    #[error("shape mismatch: {0}")]
    Shape(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("WFS request failed (status {status}): {body}")]
    Wfs { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl VibraCoreError {
    /// Builds a [`VibraCoreError::MissingField`] from the required names that
    /// are not present in `available`.
    pub fn missing_from(required: &[&str], available: impl Fn(&str) -> bool) -> Option<Self> {
        let missing: Vec<String> = required
            .iter()
            .filter(|name| !available(**name))
            .map(|name| name.to_string())
            .collect();
        if missing.is_empty() {
            None
        } else {
            Some(Self::MissingField { missing })
        }
    }
}

pub type Result<T, E = VibraCoreError> = std::result::Result<T, E>;

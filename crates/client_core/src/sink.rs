//! Failure reporting for car api calls.

use std::{
    fmt,
    sync::{Arc, Mutex, PoisonError},
};

use chrono::{DateTime, Utc};
use tracing::{error, warn};

use crate::error::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::List => "list",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Operation::List => "load cars",
            Operation::Create => "add car",
            Operation::Update => "update car",
            Operation::Delete => "delete car",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Network unreachable, DNS, TLS, timeouts.
    Transport,
    /// The server answered with a non-success status.
    Status,
    /// The body was not the JSON shape we expected.
    Decode,
    /// The request never left the client.
    Client,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    pub operation: Operation,
    pub kind: FailureKind,
    pub status: Option<u16>,
    pub message: String,
    pub occurred_at: DateTime<Utc>,
}

impl Failure {
    pub fn new(operation: Operation, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            operation,
            kind,
            status: None,
            message: message.into(),
            occurred_at: Utc::now(),
        }
    }

    pub fn from_error(operation: Operation, err: &ClientError) -> Self {
        Self {
            status: err.status(),
            ..Self::new(operation, err.kind(), err.to_string())
        }
    }

    /// One line suitable for a notice banner or stderr.
    pub fn summary(&self) -> String {
        format!("Failed to {}: {}", self.operation.describe(), self.message)
    }
}

/// Receives every failed car api call.
pub trait FailureSink: Send + Sync {
    fn report(&self, failure: &Failure);
}

impl<T: FailureSink + ?Sized> FailureSink for Arc<T> {
    fn report(&self, failure: &Failure) {
        (**self).report(failure)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingFailureSink;

impl FailureSink for TracingFailureSink {
    fn report(&self, failure: &Failure) {
        match failure.kind {
            FailureKind::Transport => error!(
                operation = failure.operation.as_str(),
                "car api unreachable: {}", failure.message
            ),
            _ => warn!(
                operation = failure.operation.as_str(),
                kind = ?failure.kind,
                status = failure.status,
                "car api call failed: {}",
                failure.message
            ),
        }
    }
}

/// Keeps reported failures in memory so callers can inspect them.
#[derive(Debug, Default, Clone)]
pub struct RecordingFailureSink {
    failures: Arc<Mutex<Vec<Failure>>>,
}

impl RecordingFailureSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failures(&self) -> Vec<Failure> {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl FailureSink for RecordingFailureSink {
    fn report(&self, failure: &Failure) {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(failure.clone());
    }
}

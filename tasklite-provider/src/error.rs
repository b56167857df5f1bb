//! Error types for task reconciliation.

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

use crate::reconciler::Transition;

/// Errors that can occur while talking to the TaskLite API or while
/// reconciling a task.
#[derive(Debug, Error)]
pub enum Error {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request could not be sent or no response arrived.
    #[error("{method} {url} failed: {source}")]
    Transport {
        method: reqwest::Method,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The request body could not be encoded.
    #[error("failed to encode task: {0}")]
    Encode(#[source] serde_json::Error),

    /// The response body is not a task representation.
    #[error("failed to decode task from {}: {source}", String::from_utf8_lossy(.body))]
    Decode {
        body: Vec<u8>,
        #[source]
        source: serde_json::Error,
    },

    /// The task does not exist remotely.
    #[error("task not found: {body}")]
    NotFound { body: String },

    /// Any other status outside the documented success status.
    #[error("HTTP {}: {body}", .status.as_u16())]
    Status { status: StatusCode, body: String },

    /// A precondition of the reconciliation core was violated.
    #[error("protocol violation: {0}")]
    Protocol(#[from] Violation),

    /// The caller's cancellation signal fired.
    #[error("request cancelled")]
    Cancelled,

    /// The caller's deadline elapsed.
    #[error("request timed out after {}ms", .after.as_millis())]
    TimedOut { after: Duration },
}

/// Precondition failures internal to the reconciliation core.
///
/// These are integration errors, never remote-system errors, and are never
/// worth retrying.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("{0} requires a task id, got 0")]
    MissingId(Transition),

    #[error("create requires an unmanaged task, got id {0}")]
    AssignedId(i32),

    #[error("{transition} of task {expected} returned task {actual}")]
    IdMismatch {
        transition: Transition,
        expected: i32,
        actual: i32,
    },

    #[error("server response carried no task id")]
    UnassignedResponse,

    #[error("attribute `{0}` is unknown")]
    UnknownValue(&'static str),

    #[error("required attribute `{0}` is missing")]
    MissingValue(&'static str),

    #[error("no recorded state for {0}")]
    NoPriorState(Transition),

    #[error("no desired state for {0}")]
    NoDesiredState(Transition),

    #[error("create requires an unmanaged resource, but state is already recorded")]
    AlreadyManaged,
}

/// Coarse error classification, as seen by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Serialization,
    NotFound,
    Application,
    Protocol,
    Cancelled,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Client(_) | Error::Transport { .. } => ErrorKind::Transport,
            Error::Encode(_) | Error::Decode { .. } => ErrorKind::Serialization,
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::Status { .. } => ErrorKind::Application,
            Error::Protocol(_) => ErrorKind::Protocol,
            Error::Cancelled | Error::TimedOut { .. } => ErrorKind::Cancelled,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Returns the violated precondition, if this is a protocol violation.
    pub fn violation(&self) -> Option<&Violation> {
        match self {
            Error::Protocol(v) => Some(v),
            _ => None,
        }
    }
}

/// Result type for task operations.
pub type Result<T> = std::result::Result<T, Error>;

//! Wire representations of a task, one per API schema version.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::task::Task;
use crate::error::{Error, Result};

/// TaskLite API schema variant.
///
/// The variants differ in the name of the completion field and in field
/// order; everything else is shared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaVersion {
    /// `{id, title, completed, priority}`
    V1,
    /// `{id, title, priority, complete}`
    #[default]
    V2,
}

fn is_unassigned(id: &i32) -> bool {
    *id == 0
}

// `id` is required when decoding and omitted from request bodies when unassigned.
#[derive(Debug, Serialize, Deserialize)]
struct TaskV1 {
    #[serde(skip_serializing_if = "is_unassigned")]
    id: i32,
    title: String,
    completed: bool,
    priority: i32,
}

#[derive(Debug, Serialize, Deserialize)]
struct TaskV2 {
    #[serde(skip_serializing_if = "is_unassigned")]
    id: i32,
    title: String,
    priority: i32,
    complete: bool,
}

impl From<&Task> for TaskV1 {
    fn from(t: &Task) -> Self {
        Self {
            id: t.id,
            title: t.title.clone(),
            completed: t.complete,
            priority: t.priority,
        }
    }
}

impl From<TaskV1> for Task {
    fn from(w: TaskV1) -> Self {
        Self {
            id: w.id,
            title: w.title,
            priority: w.priority,
            complete: w.completed,
        }
    }
}

impl From<&Task> for TaskV2 {
    fn from(t: &Task) -> Self {
        Self {
            id: t.id,
            title: t.title.clone(),
            priority: t.priority,
            complete: t.complete,
        }
    }
}

impl From<TaskV2> for Task {
    fn from(w: TaskV2) -> Self {
        Self {
            id: w.id,
            title: w.title,
            priority: w.priority,
            complete: w.complete,
        }
    }
}

impl SchemaVersion {
    /// Encodes a task as a request body. An unassigned id is omitted.
    pub fn encode(self, task: &Task) -> Result<Vec<u8>> {
        match self {
            SchemaVersion::V1 => serde_json::to_vec(&TaskV1::from(task)),
            SchemaVersion::V2 => serde_json::to_vec(&TaskV2::from(task)),
        }
        .map_err(Error::Encode)
    }

    /// Decodes a response body into a task.
    pub fn decode(self, body: &[u8]) -> Result<Task> {
        let decoded = match self {
            SchemaVersion::V1 => serde_json::from_slice::<TaskV1>(body).map(Task::from),
            SchemaVersion::V2 => serde_json::from_slice::<TaskV2>(body).map(Task::from),
        };
        decoded.map_err(|source| Error::Decode {
            body: body.to_vec(),
            source,
        })
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaVersion::V1 => write!(f, "v1"),
            SchemaVersion::V2 => write!(f, "v2"),
        }
    }
}

impl FromStr for SchemaVersion {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "v1" => Ok(SchemaVersion::V1),
            "v2" => Ok(SchemaVersion::V2),
            other => Err(format!("unknown schema version '{}', expected v1 or v2", other)),
        }
    }
}

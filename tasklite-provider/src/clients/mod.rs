//! Clients for the TaskLite API.
//!
//! [`TaskApi`] is the seam the reconciler talks through; [`TaskClient`] is
//! the HTTP implementation of it.

pub mod task;

pub use task::{TASK_PATH, TaskClient};

use async_trait::async_trait;

use crate::context::CallContext;
use crate::error::Result;
use crate::model::Task;

/// One round trip per call against the task collection.
#[async_trait]
pub trait TaskApi: Send + Sync {
    /// Create a task. The task must not carry an id.
    async fn create_task(&self, ctx: &CallContext, task: &Task) -> Result<Task>;

    /// Fetch the current remote representation.
    async fn read_task(&self, ctx: &CallContext, id: i32) -> Result<Task>;

    /// Replace a task. The returned task keeps the request's id.
    async fn update_task(&self, ctx: &CallContext, task: &Task) -> Result<Task>;

    /// Delete a task.
    async fn delete_task(&self, ctx: &CallContext, id: i32) -> Result<()>;
}

//! Task reconciler - reconciles task descriptors with the TaskLite API.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::{Observed, Reconciler, Transition};
use crate::clients::{TaskApi, TaskClient};
use crate::context::CallContext;
use crate::error::{Result, Violation};
use crate::model::{Task, TaskDescriptor, Value};

/// Task reconciler that interacts with the TaskLite API.
///
/// Every successful transition replaces the recorded state with exactly what
/// the API returned; nothing from the configuration is merged back in.
pub struct TaskReconciler<C = TaskClient> {
    client: C,
}

impl<C: TaskApi> TaskReconciler<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }
}

// `TaskClient` already rejects such answers; other `TaskApi` implementations may not.
fn ensure_identity(task: &Task, expected: i32, transition: Transition) -> Result<()> {
    if task.id != expected {
        return Err(Violation::IdMismatch {
            transition,
            expected,
            actual: task.id,
        }
        .into());
    }
    Ok(())
}

#[async_trait]
impl<C: TaskApi> Reconciler for TaskReconciler<C> {
    type Desired = TaskDescriptor;
    type State = TaskDescriptor;

    async fn create(&self, ctx: &CallContext, desired: &TaskDescriptor) -> Result<TaskDescriptor> {
        match desired.id {
            Value::Known(id) if id != 0 => return Err(Violation::AssignedId(id).into()),
            _ => {}
        }

        let task = desired.desired_task()?;
        debug!(
            title = %task.title,
            priority = task.priority,
            complete = task.complete,
            "Creating task"
        );

        let created = self.client.create_task(ctx, &task).await?;
        info!(id = created.id, title = %created.title, "Task created");
        Ok(TaskDescriptor::from(&created))
    }

    async fn read(
        &self,
        ctx: &CallContext,
        prior: &TaskDescriptor,
    ) -> Result<Observed<TaskDescriptor>> {
        let id = prior.recorded_id(Transition::Read)?;
        debug!(id, "Refreshing task from the API");

        match self.client.read_task(ctx, id).await {
            Ok(task) => {
                ensure_identity(&task, id, Transition::Read)?;
                Ok(Observed::Present(TaskDescriptor::from(&task)))
            }
            Err(e) if e.is_not_found() => {
                warn!(id, "Task no longer exists");
                Ok(Observed::Gone)
            }
            Err(e) => Err(e),
        }
    }

    async fn update(
        &self,
        ctx: &CallContext,
        prior: &TaskDescriptor,
        desired: &TaskDescriptor,
    ) -> Result<TaskDescriptor> {
        // Identity comes from the recorded state, never from configuration.
        let id = prior.recorded_id(Transition::Update)?;
        let mut task = desired.desired_task()?;
        task.id = id;
        debug!(
            id,
            title = %task.title,
            priority = task.priority,
            complete = task.complete,
            "Updating task"
        );

        let updated = self.client.update_task(ctx, &task).await?;
        ensure_identity(&updated, id, Transition::Update)?;

        info!(id, "Task updated");
        Ok(TaskDescriptor::from(&updated))
    }

    async fn delete(&self, ctx: &CallContext, prior: &TaskDescriptor) -> Result<()> {
        let id = prior.recorded_id(Transition::Delete)?;
        debug!(id, "Deleting task");

        // A repeated delete surfaces NotFound like any other failure.
        self.client.delete_task(ctx, id).await?;
        info!(id, "Task deleted");
        Ok(())
    }
}

//! Reconcilers for managed resources.
//!
//! A reconciler turns one lifecycle transition requested by the host into
//! client calls, and hands back the state the host should record.

pub mod task;

use std::fmt;

use async_trait::async_trait;

use crate::context::CallContext;
use crate::error::Result;

pub use task::TaskReconciler;

/// One lifecycle step applied to one managed resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    Create,
    Read,
    Update,
    Delete,
}

impl Transition {
    /// Capitalized name, as used in diagnostic summaries.
    pub fn title(self) -> &'static str {
        match self {
            Transition::Create => "Create",
            Transition::Read => "Read",
            Transition::Update => "Update",
            Transition::Delete => "Delete",
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Transition::Create => "create",
            Transition::Read => "read",
            Transition::Update => "update",
            Transition::Delete => "delete",
        })
    }
}

/// What a read found remotely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observed<S> {
    Present(S),
    /// The resource no longer exists; the host should drop its record.
    Gone,
}

/// Trait for resource reconcilers.
#[async_trait]
pub trait Reconciler: Send + Sync {
    /// The desired state from configuration.
    type Desired: Send + Sync;
    /// The state recorded by the host.
    type State: Send + Sync;

    /// Create the resource from an unmanaged desired state.
    async fn create(&self, ctx: &CallContext, desired: &Self::Desired) -> Result<Self::State>;

    /// Refresh the recorded state from the remote source of truth.
    async fn read(&self, ctx: &CallContext, prior: &Self::State) -> Result<Observed<Self::State>>;

    /// Converge an existing resource to the desired state.
    async fn update(
        &self,
        ctx: &CallContext,
        prior: &Self::State,
        desired: &Self::Desired,
    ) -> Result<Self::State>;

    /// Remove the resource.
    async fn delete(&self, ctx: &CallContext, prior: &Self::State) -> Result<()>;
}

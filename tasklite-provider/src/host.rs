//! Host-facing transition driver.
//!
//! Enforces the per-resource lifecycle (`Unmanaged -> Present -> Gone`) on
//! top of a [`Reconciler`] and turns failures into [`Diagnostics`]. On
//! failure the prior state is handed back untouched.

use tracing::error;

use crate::context::CallContext;
use crate::diagnostics::Diagnostics;
use crate::error::{Error, Violation};
use crate::reconciler::{Observed, Reconciler, Transition};

/// One transition as requested by the host.
#[derive(Debug, Clone)]
pub struct TransitionRequest<D, S> {
    pub transition: Transition,
    /// Desired state; required by create and update.
    pub desired: Option<D>,
    /// Last recorded state; `None` when the resource is unmanaged or gone.
    pub prior: Option<S>,
}

/// Outcome of one transition.
#[derive(Debug, Clone)]
pub struct TransitionResponse<S> {
    /// State to record; `None` means the host drops its record.
    pub state: Option<S>,
    pub diagnostics: Diagnostics,
}

/// Apply one transition through `reconciler`.
pub async fn apply<R>(
    reconciler: &R,
    ctx: &CallContext,
    request: TransitionRequest<R::Desired, R::State>,
) -> TransitionResponse<R::State>
where
    R: Reconciler,
    R::State: Clone,
{
    let TransitionRequest {
        transition,
        desired,
        prior,
    } = request;
    let mut diagnostics = Diagnostics::new();

    let outcome = run(reconciler, ctx, transition, desired.as_ref(), prior.as_ref()).await;
    let state = match outcome {
        Ok(Observed::Present(state)) => Some(state),
        Ok(Observed::Gone) => {
            if transition == Transition::Read {
                diagnostics.add_warning(
                    transition,
                    "Task no longer exists",
                    "The task was not found remotely and is removed from state.",
                );
            }
            None
        }
        Err(e) => {
            error!(error = %e, "Failed to {} the task", transition);
            diagnostics.add_error(transition, &e);
            prior
        }
    };

    TransitionResponse { state, diagnostics }
}

async fn run<R: Reconciler>(
    reconciler: &R,
    ctx: &CallContext,
    transition: Transition,
    desired: Option<&R::Desired>,
    prior: Option<&R::State>,
) -> Result<Observed<R::State>, Error> {
    let need_desired = || desired.ok_or(Violation::NoDesiredState(transition));
    let need_prior = || prior.ok_or(Violation::NoPriorState(transition));

    match transition {
        Transition::Create => {
            if prior.is_some() {
                return Err(Violation::AlreadyManaged.into());
            }
            let state = reconciler.create(ctx, need_desired()?).await?;
            Ok(Observed::Present(state))
        }
        Transition::Read => reconciler.read(ctx, need_prior()?).await,
        Transition::Update => {
            let state = reconciler
                .update(ctx, need_prior()?, need_desired()?)
                .await?;
            Ok(Observed::Present(state))
        }
        Transition::Delete => {
            reconciler.delete(ctx, need_prior()?).await?;
            Ok(Observed::Gone)
        }
    }
}

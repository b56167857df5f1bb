//! End-to-end lifecycle tests: host transitions through the task reconciler
//! against the mock API.

mod common;

use common::TestServer;
use tasklite_mock::StatusCode;
use tasklite_provider::{
    CallContext, Severity, TaskDescriptor, Transition, TransitionRequest, Value, Violation, apply,
};
use tokio_test::{assert_err, assert_ok};

fn request(
    transition: Transition,
    desired: Option<TaskDescriptor>,
    prior: Option<TaskDescriptor>,
) -> TransitionRequest<TaskDescriptor, TaskDescriptor> {
    TransitionRequest {
        transition,
        desired,
        prior,
    }
}

#[tokio::test]
async fn create_update_read_converges() {
    let server = TestServer::spawn().await;
    let reconciler = server.reconciler();
    let ctx = CallContext::new();

    // Step 1: only a title is configured
    let created = apply(
        &reconciler,
        &ctx,
        request(
            Transition::Create,
            Some(TaskDescriptor::titled("Task created by terraform")),
            None,
        ),
    )
    .await;
    assert!(created.diagnostics.is_empty());
    let state = created.state.expect("create records state");
    assert_eq!(state.id, Value::Known(1));
    assert_eq!(state.title, Value::Known("Task created by terraform".into()));
    assert_eq!(state.priority, Value::Known(0));
    assert_eq!(state.complete, Value::Known(false));

    // Step 2: every attribute is set
    let desired = TaskDescriptor {
        id: Value::Unknown,
        title: Value::Known("Updated Task by terraform".into()),
        priority: Value::Known(1),
        complete: Value::Known(true),
    };
    let updated = apply(
        &reconciler,
        &ctx,
        request(Transition::Update, Some(desired), Some(state)),
    )
    .await;
    assert!(updated.diagnostics.is_empty());
    let state = updated.state.expect("update records state");
    assert_eq!(state.id, Value::Known(1));
    assert_eq!(state.priority, Value::Known(1));
    assert_eq!(state.complete, Value::Known(true));

    // Step 3: refreshing shows no drift
    let refreshed = apply(
        &reconciler,
        &ctx,
        request(Transition::Read, None, Some(state.clone())),
    )
    .await;
    assert!(refreshed.diagnostics.is_empty());
    assert_eq!(refreshed.state, Some(state));

    server.shutdown();
}

#[tokio::test]
async fn read_after_delete_drops_the_record() {
    let server = TestServer::spawn().await;
    let reconciler = server.reconciler();
    let ctx = CallContext::new();

    let state = apply(
        &reconciler,
        &ctx,
        request(Transition::Create, Some(TaskDescriptor::titled("t")), None),
    )
    .await
    .state;
    assert!(state.is_some());

    let deleted = apply(
        &reconciler,
        &ctx,
        request(Transition::Delete, None, state.clone()),
    )
    .await;
    assert!(deleted.diagnostics.is_empty());
    assert_eq!(deleted.state, None);

    // the host still holds the old record and refreshes it
    let refreshed = apply(&reconciler, &ctx, request(Transition::Read, None, state)).await;
    assert_eq!(refreshed.state, None);
    assert!(!refreshed.diagnostics.has_error());
    let warning = refreshed.diagnostics.iter().next().unwrap();
    assert_eq!(warning.severity, Severity::Warning);
    assert_eq!(warning.summary, "Task no longer exists");

    server.shutdown();
}

#[tokio::test]
async fn repeated_delete_keeps_the_prior_state() {
    let server = TestServer::spawn().await;
    let reconciler = server.reconciler();
    let ctx = CallContext::new();

    let state = apply(
        &reconciler,
        &ctx,
        request(Transition::Create, Some(TaskDescriptor::titled("t")), None),
    )
    .await
    .state;

    let first = apply(
        &reconciler,
        &ctx,
        request(Transition::Delete, None, state.clone()),
    )
    .await;
    assert!(!first.diagnostics.has_error());

    let second = apply(
        &reconciler,
        &ctx,
        request(Transition::Delete, None, state.clone()),
    )
    .await;
    assert!(second.diagnostics.has_error());
    assert_eq!(second.state, state);
    let error = second.diagnostics.errors().next().unwrap();
    assert_eq!(error.summary, "Delete Operation Error");
    assert!(error.detail.starts_with("Failed to delete the task, got error: task not found"));

    server.shutdown();
}

#[tokio::test]
async fn server_failure_on_update_keeps_the_prior_state() {
    let server = TestServer::spawn().await;
    let reconciler = server.reconciler();
    let ctx = CallContext::new();

    let state = apply(
        &reconciler,
        &ctx,
        request(Transition::Create, Some(TaskDescriptor::titled("t")), None),
    )
    .await
    .state;
    server
        .mock
        .state()
        .fail_next(StatusCode::BAD_REQUEST, "Bad Request")
        .await;

    let response = apply(
        &reconciler,
        &ctx,
        request(
            Transition::Update,
            Some(TaskDescriptor::titled("u")),
            state.clone(),
        ),
    )
    .await;
    assert_eq!(response.state, state);
    let error = response.diagnostics.errors().next().unwrap();
    assert_eq!(error.summary, "Update Operation Error");
    assert!(error.detail.ends_with("HTTP 400: Bad Request"));

    // the remote task is untouched
    let stored = server.mock.state().task(1).await.unwrap();
    assert_eq!(stored.title, "t");

    server.shutdown();
}

#[tokio::test]
async fn transitions_on_unmanaged_resources_fail_without_requests() {
    let server = TestServer::spawn().await;
    let reconciler = server.reconciler();
    let ctx = CallContext::new();

    for transition in [Transition::Read, Transition::Update, Transition::Delete] {
        let response = apply(
            &reconciler,
            &ctx,
            request(transition, Some(TaskDescriptor::titled("t")), None),
        )
        .await;
        assert_eq!(response.state, None);
        assert!(response.diagnostics.has_error());
        let detail = &response.diagnostics.errors().next().unwrap().detail;
        assert!(
            detail.ends_with(&Violation::NoPriorState(transition).to_string()),
            "unexpected detail: {detail}"
        );
    }
    assert_eq!(server.requests(), 0);

    server.shutdown();
}

#[tokio::test]
async fn update_with_zero_prior_id_never_reaches_the_server() {
    let server = TestServer::spawn().await;
    let reconciler = server.reconciler();

    let prior = TaskDescriptor {
        id: Value::Known(0),
        ..TaskDescriptor::titled("t")
    };
    let response = apply(
        &reconciler,
        &CallContext::new(),
        request(
            Transition::Update,
            Some(TaskDescriptor::titled("u")),
            Some(prior.clone()),
        ),
    )
    .await;
    assert_eq!(response.state, Some(prior));
    assert!(response.diagnostics.has_error());
    assert_eq!(server.requests(), 0);

    server.shutdown();
}

#[tokio::test]
async fn create_over_a_recorded_state_is_rejected() {
    let server = TestServer::spawn().await;
    let reconciler = server.reconciler();

    let recorded = TaskDescriptor {
        id: Value::Known(1),
        ..TaskDescriptor::titled("t")
    };
    let response = apply(
        &reconciler,
        &CallContext::new(),
        request(
            Transition::Create,
            Some(TaskDescriptor::titled("t")),
            Some(recorded.clone()),
        ),
    )
    .await;
    assert_eq!(response.state, Some(recorded));
    assert!(response.diagnostics.has_error());
    assert_eq!(server.requests(), 0);

    server.shutdown();
}

#[tokio::test]
async fn reconciler_calls_propagate_typed_errors() {
    use tasklite_provider::Reconciler;

    let server = TestServer::spawn().await;
    let reconciler = server.reconciler();
    let ctx = CallContext::new();

    let state = assert_ok!(reconciler.create(&ctx, &TaskDescriptor::titled("t")).await);
    assert_ok!(reconciler.delete(&ctx, &state).await);
    let err = assert_err!(reconciler.delete(&ctx, &state).await);
    assert!(err.is_not_found());

    server.shutdown();
}

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// A stored task, serialized in wire order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTask {
    pub id: i32,
    pub title: String,
    pub priority: i32,
    pub complete: bool,
}

/// A canned response returned instead of the next request's real one.
#[derive(Clone, Debug)]
pub struct Failure {
    pub status: StatusCode,
    pub body: String,
}

#[derive(Default)]
struct Inner {
    tasks: BTreeMap<i32, StoredTask>,
    last_id: i32,
    delay: Option<Duration>,
    failure: Option<Failure>,
}

/// Shared server state. Clones share the same store.
#[derive(Clone, Default)]
pub struct MockState {
    inner: Arc<RwLock<Inner>>,
    requests: Arc<AtomicUsize>,
}

impl MockState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of requests received so far, including failed ones.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub(crate) fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }

    /// Delay every response by `delay`.
    pub async fn set_delay(&self, delay: Option<Duration>) {
        self.inner.write().await.delay = delay;
    }

    pub(crate) async fn delay(&self) -> Option<Duration> {
        self.inner.read().await.delay
    }

    /// Answer the next request with `status` and `body`.
    pub async fn fail_next(&self, status: StatusCode, body: impl Into<String>) {
        self.inner.write().await.failure = Some(Failure {
            status,
            body: body.into(),
        });
    }

    pub(crate) async fn take_failure(&self) -> Option<Failure> {
        self.inner.write().await.failure.take()
    }

    pub async fn task(&self, id: i32) -> Option<StoredTask> {
        self.inner.read().await.tasks.get(&id).cloned()
    }

    pub async fn tasks(&self) -> Vec<StoredTask> {
        self.inner.read().await.tasks.values().cloned().collect()
    }

    pub(crate) async fn insert(&self, title: String, priority: i32, complete: bool) -> StoredTask {
        let mut inner = self.inner.write().await;
        inner.last_id += 1;
        let task = StoredTask {
            id: inner.last_id,
            title,
            priority,
            complete,
        };
        inner.tasks.insert(task.id, task.clone());
        task
    }

    pub(crate) async fn replace(
        &self,
        id: i32,
        title: String,
        priority: i32,
        complete: bool,
    ) -> Option<StoredTask> {
        let mut inner = self.inner.write().await;
        let task = inner.tasks.get_mut(&id)?;
        task.title = title;
        task.priority = priority;
        task.complete = complete;
        Some(task.clone())
    }

    pub(crate) async fn remove(&self, id: i32) -> Option<StoredTask> {
        self.inner.write().await.tasks.remove(&id)
    }
}

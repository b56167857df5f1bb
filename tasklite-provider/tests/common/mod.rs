//! Shared test utilities for tasklite-provider integration tests.

#![allow(dead_code)]

use std::time::Duration;

use tasklite_mock::MockServer;
use tasklite_provider::{ClientConfig, SchemaVersion, TaskClient, TaskReconciler};

/// Mock API plus a client pointed at it.
pub struct TestServer {
    pub mock: MockServer,
    pub client: TaskClient,
}

impl TestServer {
    /// Spawn a mock API and a v2 client.
    pub async fn spawn() -> Self {
        Self::spawn_with_schema(SchemaVersion::V2).await
    }

    pub async fn spawn_with_schema(schema: SchemaVersion) -> Self {
        let mock = MockServer::spawn().await.expect("Failed to spawn mock API");

        // Small delay to ensure server is ready
        tokio::time::sleep(Duration::from_millis(20)).await;

        let client = TaskClient::new(&ClientConfig {
            endpoint: mock.base_url(),
            schema,
            request_timeout: None,
        })
        .expect("Failed to build client");

        Self { mock, client }
    }

    /// A reconciler sharing this server's client.
    pub fn reconciler(&self) -> TaskReconciler {
        TaskReconciler::new(self.client.clone())
    }

    /// Requests the mock has received so far.
    pub fn requests(&self) -> usize {
        self.mock.state().requests()
    }

    /// Shutdown the server.
    pub fn shutdown(self) {
        self.mock.shutdown();
    }
}

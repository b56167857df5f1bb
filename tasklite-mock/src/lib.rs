//! In-memory TaskLite API.
//!
//! Serves the task collection under `/api/task/` with the same paths and
//! status codes as the real service:
//! - `POST /api/task/` -> 201
//! - `GET /api/task/{id}/` -> 200
//! - `PUT /api/task/{id}` -> 200
//! - `DELETE /api/task/{id}/` -> 204
//!
//! Unknown ids answer 404. Ids are assigned sequentially from 1.

pub mod routes;
pub mod state;

use std::net::SocketAddr;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::trace::TraceLayer;
use tracing::error;

pub use axum::http::StatusCode;
pub use state::{Failure, MockState, StoredTask};

/// Build the API router on top of `state`.
pub fn create_router(state: MockState) -> Router {
    Router::new()
        .route("/api/task/", post(routes::create_task))
        .route(
            "/api/task/{id}/",
            get(routes::get_task).delete(routes::delete_task),
        )
        .route("/api/task/{id}", put(routes::update_task))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            routes::intercept,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// A mock server running on an ephemeral local port.
pub struct MockServer {
    addr: SocketAddr,
    state: MockState,
    shutdown_tx: oneshot::Sender<()>,
}

impl MockServer {
    /// Bind `127.0.0.1:0` and serve in a background task.
    pub async fn spawn() -> std::io::Result<Self> {
        let state = MockState::new();
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let router = create_router(state.clone());
        tokio::spawn(async move {
            let served = axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await;
            if let Err(e) = served {
                error!("Mock server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            state,
            shutdown_tx,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Endpoint to configure a client with (without the collection path).
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn state(&self) -> &MockState {
        &self.state
    }

    pub fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
    }
}

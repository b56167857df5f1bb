//! HTTP client for the TaskLite task collection.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use tracing::debug;

use super::TaskApi;
use crate::config::ClientConfig;
use crate::context::CallContext;
use crate::error::{Error, Result, Violation};
use crate::model::{SchemaVersion, Task};
use crate::reconciler::Transition;

/// Path of the task collection below the API endpoint.
pub const TASK_PATH: &str = "/api/task/";

const JSON: &str = "application/json";

/// Client for the TaskLite REST API.
///
/// Holds no per-call state: the collection URL and schema are fixed at
/// construction and `reqwest::Client` pools connections internally, so one
/// instance can serve concurrent calls for different tasks.
#[derive(Debug, Clone)]
pub struct TaskClient {
    http: reqwest::Client,
    collection: String,
    schema: SchemaVersion,
}

impl TaskClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(Error::Client)?;
        Ok(Self::with_http(http, config))
    }

    /// Build a client on top of an existing connection pool.
    pub fn with_http(http: reqwest::Client, config: &ClientConfig) -> Self {
        Self {
            http,
            collection: format!("{}{}", config.endpoint.trim_end_matches('/'), TASK_PATH),
            schema: config.schema,
        }
    }

    pub fn collection_url(&self) -> &str {
        &self.collection
    }

    pub fn schema(&self) -> SchemaVersion {
        self.schema
    }

    // GET and DELETE address `{id}/`, PUT addresses `{id}`.
    fn item_url(&self, id: i32, trailing_slash: bool) -> String {
        if trailing_slash {
            format!("{}{}/", self.collection, id)
        } else {
            format!("{}{}", self.collection, id)
        }
    }

    /// Send one request and read the full response body.
    async fn round_trip(
        &self,
        ctx: &CallContext,
        method: Method,
        url: String,
        body: Option<Vec<u8>>,
    ) -> Result<(StatusCode, Vec<u8>)> {
        ctx.run(async {
            debug!(%method, %url, "Sending request");
            let mut request = self
                .http
                .request(method.clone(), &url)
                .header(CONTENT_TYPE, JSON)
                .header(ACCEPT, JSON);
            if let Some(body) = body {
                request = request.body(body);
            }

            let transport = |source| Error::Transport {
                method: method.clone(),
                url: url.clone(),
                source,
            };
            let response = request.send().await.map_err(transport)?;
            let status = response.status();
            let body = response.bytes().await.map_err(transport)?;
            debug!(%method, %url, status = status.as_u16(), bytes = body.len(), "Received response");

            Ok((status, body.to_vec()))
        })
        .await
    }
}

/// Classify a response against the single documented success status.
fn expect_status(status: StatusCode, expected: StatusCode, body: Vec<u8>) -> Result<Vec<u8>> {
    if status == expected {
        return Ok(body);
    }
    let body = String::from_utf8_lossy(&body).into_owned();
    if status == StatusCode::NOT_FOUND {
        Err(Error::NotFound { body })
    } else {
        Err(Error::Status { status, body })
    }
}

fn require_id(id: i32, transition: Transition) -> Result<()> {
    if id == 0 {
        return Err(Violation::MissingId(transition).into());
    }
    Ok(())
}

/// The server must answer for the task that was addressed.
fn same_id(task: Task, expected: i32, transition: Transition) -> Result<Task> {
    if task.id != expected {
        return Err(Violation::IdMismatch {
            transition,
            expected,
            actual: task.id,
        }
        .into());
    }
    Ok(task)
}

#[async_trait]
impl TaskApi for TaskClient {
    async fn create_task(&self, ctx: &CallContext, task: &Task) -> Result<Task> {
        if task.is_assigned() {
            return Err(Violation::AssignedId(task.id).into());
        }

        let payload = self.schema.encode(task)?;
        let (status, body) = self
            .round_trip(ctx, Method::POST, self.collection.clone(), Some(payload))
            .await?;
        let created = self
            .schema
            .decode(&expect_status(status, StatusCode::CREATED, body)?)?;

        if !created.is_assigned() {
            return Err(Violation::UnassignedResponse.into());
        }
        Ok(created)
    }

    async fn read_task(&self, ctx: &CallContext, id: i32) -> Result<Task> {
        require_id(id, Transition::Read)?;

        let (status, body) = self
            .round_trip(ctx, Method::GET, self.item_url(id, true), None)
            .await?;
        let task = self
            .schema
            .decode(&expect_status(status, StatusCode::OK, body)?)?;
        same_id(task, id, Transition::Read)
    }

    async fn update_task(&self, ctx: &CallContext, task: &Task) -> Result<Task> {
        require_id(task.id, Transition::Update)?;

        let payload = self.schema.encode(task)?;
        let (status, body) = self
            .round_trip(ctx, Method::PUT, self.item_url(task.id, false), Some(payload))
            .await?;
        let updated = self
            .schema
            .decode(&expect_status(status, StatusCode::OK, body)?)?;
        same_id(updated, task.id, Transition::Update)
    }

    async fn delete_task(&self, ctx: &CallContext, id: i32) -> Result<()> {
        require_id(id, Transition::Delete)?;

        let (status, body) = self
            .round_trip(ctx, Method::DELETE, self.item_url(id, true), None)
            .await?;
        expect_status(status, StatusCode::NO_CONTENT, body)?;
        Ok(())
    }
}

//! TaskLite provider core.
//!
//! Keeps a remote TaskLite task in sync with a declarative descriptor:
//! - [`clients`]: one HTTP round trip per call, typed outcomes
//! - [`reconciler`]: lifecycle transitions on top of the client
//! - [`host`]: state-machine checks and diagnostics for the host runtime

pub mod clients;
pub mod config;
pub mod context;
pub mod diagnostics;
pub mod error;
pub mod host;
pub mod model;
pub mod reconciler;

pub use clients::{TaskApi, TaskClient};
pub use config::{ClientConfig, ConfigError, ProviderConfig};
pub use context::CallContext;
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{Error, ErrorKind, Result, Violation};
pub use host::{TransitionRequest, TransitionResponse, apply};
pub use model::{SchemaVersion, Task, TaskDescriptor, Value};
pub use reconciler::{Observed, Reconciler, TaskReconciler, Transition};

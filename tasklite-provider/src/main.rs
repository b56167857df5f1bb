//! tasklite: applies one lifecycle transition to a TaskLite task.
//!
//! Stands in for the host runtime: the desired descriptor and the recorded
//! state are JSON files, the new state is written back (or removed once the
//! task is gone), and diagnostics go to stderr.

use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use tasklite_provider::config::HOST_ENV;
use tasklite_provider::{
    CallContext, ProviderConfig, SchemaVersion, TaskClient, TaskDescriptor, TaskReconciler,
    Transition, TransitionRequest, apply,
};

/// TaskLite provider
#[derive(Parser, Debug)]
#[command(name = "tasklite", version, about)]
struct Args {
    /// TaskLite API host (e.g., http://127.0.0.1:3000), used when the provider config sets none
    #[arg(long, env = HOST_ENV, global = true)]
    host: Option<String>,

    /// Provider configuration file (JSON)
    #[arg(long, global = true)]
    provider_config: Option<PathBuf>,

    /// Wire schema of the API (v1 or v2), overrides the provider configuration
    #[arg(long, global = true)]
    schema: Option<SchemaVersion>,

    /// Give up on the call after this many seconds
    #[arg(long, global = true)]
    deadline_secs: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the task described by the desired state
    Create {
        /// Desired task descriptor (JSON)
        #[arg(long)]
        desired: PathBuf,
        /// Recorded state file; must not exist yet
        #[arg(long)]
        state: PathBuf,
    },
    /// Refresh the recorded state from the API
    Read {
        #[arg(long)]
        state: PathBuf,
    },
    /// Converge the recorded task to the desired state
    Update {
        #[arg(long)]
        desired: PathBuf,
        #[arg(long)]
        state: PathBuf,
    },
    /// Delete the recorded task
    Delete {
        #[arg(long)]
        state: PathBuf,
    },
}

impl Command {
    fn parts(&self) -> (Transition, Option<&Path>, &Path) {
        match self {
            Command::Create { desired, state } => {
                (Transition::Create, Some(desired.as_path()), state.as_path())
            }
            Command::Read { state } => (Transition::Read, None, state.as_path()),
            Command::Update { desired, state } => {
                (Transition::Update, Some(desired.as_path()), state.as_path())
            }
            Command::Delete { state } => (Transition::Delete, None, state.as_path()),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tasklite=info,tasklite_provider=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Args::parse()).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Returns whether the transition finished without error diagnostics.
async fn run(args: Args) -> Result<bool> {
    let mut provider = match &args.provider_config {
        Some(path) => read_json::<ProviderConfig>(path)
            .await?
            .context("Provider configuration file does not exist")?,
        None => ProviderConfig::default(),
    };
    if let Some(schema) = args.schema {
        provider.schema = Some(schema);
    }

    let config = provider.resolve(args.host.as_deref())?;
    info!(endpoint = %config.endpoint, schema = %config.schema, "Configured TaskLite client");
    let reconciler = TaskReconciler::new(TaskClient::new(&config)?);

    // Ctrl-C aborts the in-flight request
    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received SIGINT, cancelling");
            let _ = cancel_tx.send(true);
        }
    });
    let mut ctx = CallContext::new().with_cancel(cancel_rx);
    if let Some(secs) = args.deadline_secs {
        ctx = ctx.with_timeout(Duration::from_secs(secs));
    }

    let (transition, desired_path, state_path) = args.command.parts();
    let desired = match desired_path {
        Some(path) => Some(
            read_json::<TaskDescriptor>(path)
                .await?
                .context("Desired state file does not exist")?,
        ),
        None => None,
    };
    let prior = read_json::<TaskDescriptor>(state_path).await?;
    debug!(%transition, managed = prior.is_some(), "Applying transition");

    let response = apply(
        &reconciler,
        &ctx,
        TransitionRequest {
            transition,
            desired,
            prior,
        },
    )
    .await;

    for diagnostic in response.diagnostics.iter() {
        eprintln!("{}", diagnostic);
    }
    write_state(state_path, response.state.as_ref()).await?;

    Ok(!response.diagnostics.has_error())
}

/// Read a JSON file; `None` if it does not exist.
async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == IoErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("Failed to read {}", path.display())),
    };
    let value = serde_json::from_slice(&bytes)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(Some(value))
}

async fn write_state(path: &Path, state: Option<&TaskDescriptor>) -> Result<()> {
    match state {
        Some(state) => {
            let json = serde_json::to_string_pretty(state)?;
            tokio::fs::write(path, format!("{}\n", json))
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("{}", json);
        }
        None => match tokio::fs::remove_file(path).await {
            Ok(()) => info!(path = %path.display(), "Removed state file"),
            Err(e) if e.kind() == IoErrorKind::NotFound => {}
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to remove {}", path.display()));
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasklite_mock::MockServer;
    use tempfile::TempDir;

    fn args(host: &str, rest: &[&str]) -> Args {
        let mut argv = vec!["tasklite", "--host", host];
        argv.extend_from_slice(rest);
        Args::try_parse_from(argv).unwrap()
    }

    fn path_arg(path: &Path) -> &str {
        path.to_str().unwrap()
    }

    #[tokio::test]
    async fn absent_state_file_is_no_record() {
        let dir = TempDir::new().unwrap();
        let state = read_json::<TaskDescriptor>(&dir.path().join("state.json"))
            .await
            .unwrap();
        assert!(state.is_none());
    }

    #[tokio::test]
    async fn state_is_written_as_pretty_json_and_removed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        let state = TaskDescriptor::from(&tasklite_provider::Task {
            id: 1,
            title: "Task created by terraform".into(),
            priority: 0,
            complete: false,
        });

        write_state(&path, Some(&state)).await.unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "{\n  \"id\": 1,\n  \"title\": \"Task created by terraform\",\n  \"priority\": 0,\n  \"complete\": false\n}\n"
        );
        assert_eq!(read_json::<TaskDescriptor>(&path).await.unwrap(), Some(state));

        write_state(&path, None).await.unwrap();
        assert!(!path.exists());
        // removing an already absent file is fine
        write_state(&path, None).await.unwrap();
    }

    #[tokio::test]
    async fn malformed_state_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(read_json::<TaskDescriptor>(&path).await.is_err());
    }

    #[tokio::test]
    async fn lifecycle_through_state_files() {
        let server = MockServer::spawn().await.unwrap();
        let host = server.base_url();
        let dir = TempDir::new().unwrap();
        let desired = dir.path().join("desired.json");
        let state = dir.path().join("state.json");
        std::fs::write(&desired, r#"{"title": "Task created by terraform"}"#).unwrap();

        let create = ["create", "--desired", path_arg(&desired), "--state", path_arg(&state)];
        assert!(run(args(&host, &create)).await.unwrap());
        let recorded: TaskDescriptor =
            serde_json::from_str(&std::fs::read_to_string(&state).unwrap()).unwrap();
        assert_eq!(recorded.id, tasklite_provider::Value::Known(1));
        assert_eq!(recorded.priority, tasklite_provider::Value::Known(0));

        let read = ["read", "--state", path_arg(&state)];
        assert!(run(args(&host, &read)).await.unwrap());
        let stale = std::fs::read_to_string(&state).unwrap();

        let delete = ["delete", "--state", path_arg(&state)];
        assert!(run(args(&host, &delete)).await.unwrap());
        assert!(!state.exists());

        // a second delete with the old record fails and keeps the record
        std::fs::write(&state, &stale).unwrap();
        assert!(!run(args(&host, &delete)).await.unwrap());
        assert_eq!(std::fs::read_to_string(&state).unwrap(), stale);

        // a read that finds the task gone drops the record without failing
        assert!(run(args(&host, &read)).await.unwrap());
        assert!(!state.exists());

        server.shutdown();
    }

    #[tokio::test]
    async fn transitions_without_a_record_fail() {
        let server = MockServer::spawn().await.unwrap();
        let dir = TempDir::new().unwrap();
        let state = dir.path().join("state.json");

        let read = ["read", "--state", path_arg(&state)];
        assert!(!run(args(&server.base_url(), &read)).await.unwrap());
        assert!(!state.exists());
        assert_eq!(server.state().requests(), 0);

        server.shutdown();
    }

    #[tokio::test]
    async fn missing_desired_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let desired = dir.path().join("desired.json");
        let state = dir.path().join("state.json");

        let create = ["create", "--desired", path_arg(&desired), "--state", path_arg(&state)];
        assert!(run(args("http://127.0.0.1:9", &create)).await.is_err());
    }
}

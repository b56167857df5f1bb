//! tasklite-mock: serves the in-memory TaskLite API.

use anyhow::Result;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tasklite_mock::{MockState, create_router};

#[derive(Parser)]
#[command(name = "tasklite-mock")]
#[command(about = "In-memory TaskLite API for tests and local experiments")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "127.0.0.1:3000")]
    listen: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tasklite_mock=debug,tower_http=info".into()),
        )
        .init();

    let args = Args::parse();

    let listener = TcpListener::bind(&args.listen).await?;
    info!("TaskLite mock API listening on {}", args.listen);

    axum::serve(listener, create_router(MockState::new()))
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Received SIGINT");
        })
        .await?;

    info!("Shutdown complete");
    Ok(())
}

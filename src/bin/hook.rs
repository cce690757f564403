//! HTTP-triggered digest hook.
//!
//! Serves `POST /run` for an external scheduler to trigger digest
//! attempts. Starts even when required environment variables are
//! missing; `/run` then reports every missing name.

use taskbrief::server::{AppState, HookServer};

/// Bind address override.
const ENV_BIND_ADDR: &str = "TASKBRIEF_BIND_ADDR";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let bind_addr =
        std::env::var(ENV_BIND_ADDR).unwrap_or_else(|_| "127.0.0.1:8787".to_owned());

    let server = HookServer::start(&bind_addr, AppState::from_env())
        .await
        .map_err(|e| anyhow::anyhow!("hook server failed to start: {e}"))?;
    tracing::info!("taskbrief-hook ready on {}", server.addr());

    // Serve until interrupted.
    tokio::signal::ctrl_c().await?;
    server.shutdown();
    tracing::info!("taskbrief-hook shut down");
    Ok(())
}

//! HTTP trigger endpoint for the hook binary.
//!
//! Exposes `POST /run` (one digest attempt per request) and
//! `GET /healthz`. A misconfigured environment does not prevent the
//! server from starting; instead every `/run` request answers with a
//! structured error naming all missing variables. Error responses carry
//! the error message only — never a backtrace.

use crate::clock::Period;
use crate::config::Config;
use crate::error::BriefError;
use crate::run::{DigestRunner, RunLock, RunOutcome};
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Body of a successful `/run` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResponse {
    /// `"sent"`, `"skipped"`, or `"busy"`.
    pub status: String,
    /// Period of the attempt, when one was derived.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,
}

/// Body of a failed `/run` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
    /// Every missing environment variable, for configuration errors.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<String>,
}

/// Shared state for axum handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppInner>,
}

enum AppInner {
    /// Environment was complete at startup.
    Ready {
        runner: DigestRunner,
        lock: RunLock,
    },
    /// Required variables were missing; reported per request.
    Misconfigured { missing: Vec<String> },
}

impl AppState {
    /// Build state from the process environment.
    pub fn from_env() -> Self {
        match Config::from_env().and_then(DigestRunner::new) {
            Ok(runner) => Self::ready(runner, RunLock::new()),
            Err(BriefError::Config(missing)) => Self {
                inner: Arc::new(AppInner::Misconfigured { missing }),
            },
            Err(other) => Self {
                inner: Arc::new(AppInner::Misconfigured {
                    missing: vec![other.to_string()],
                }),
            },
        }
    }

    /// Build state around an already-constructed runner.
    pub fn ready(runner: DigestRunner, lock: RunLock) -> Self {
        Self {
            inner: Arc::new(AppInner::Ready { runner, lock }),
        }
    }

    /// Build state that reports the given missing variables on `/run`.
    pub fn misconfigured(missing: Vec<String>) -> Self {
        Self {
            inner: Arc::new(AppInner::Misconfigured { missing }),
        }
    }
}

/// Build the hook router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/run", post(handle_run))
        .route("/healthz", get(handle_healthz))
        .with_state(state)
}

async fn handle_healthz() -> &'static str {
    "ok"
}

async fn handle_run(State(state): State<AppState>) -> impl IntoResponse {
    let (runner, lock) = match state.inner.as_ref() {
        AppInner::Ready { runner, lock } => (runner, lock),
        AppInner::Misconfigured { missing } => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!(ErrorResponse {
                    error: "missing required configuration".to_owned(),
                    missing: missing.clone(),
                })),
            );
        }
    };

    match runner.run_now(lock).await {
        Ok(RunOutcome::Sent(period)) => (
            StatusCode::OK,
            Json(serde_json::json!(RunResponse {
                status: "sent".to_owned(),
                period: Some(period),
            })),
        ),
        Ok(RunOutcome::AlreadySent(period)) => (
            StatusCode::OK,
            Json(serde_json::json!(RunResponse {
                status: "skipped".to_owned(),
                period: Some(period),
            })),
        ),
        Ok(RunOutcome::Busy) => (
            StatusCode::CONFLICT,
            Json(serde_json::json!(RunResponse {
                status: "busy".to_owned(),
                period: None,
            })),
        ),
        Err(e) => {
            error!("digest run failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!(ErrorResponse {
                    error: e.to_string(),
                    missing: Vec::new(),
                })),
            )
        }
    }
}

/// Running hook server bound to a local address.
pub struct HookServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl HookServer {
    /// Bind and start serving in a background task. Use port `0` for
    /// auto-assign.
    ///
    /// # Errors
    ///
    /// Returns [`BriefError::Io`] if the listener cannot bind.
    pub async fn start(bind_addr: &str, state: AppState) -> crate::error::Result<Self> {
        let app = router(state);
        let listener = TcpListener::bind(bind_addr).await?;
        let addr = listener.local_addr()?;
        info!("hook server listening on http://{addr}");

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                error!("hook server error: {e}");
            }
        });

        Ok(Self { addr, handle })
    }

    /// Address the server is listening on.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Abort the server task.
    pub fn shutdown(&self) {
        self.handle.abort();
    }
}

impl Drop for HookServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_response_omits_empty_missing_list() {
        let body = serde_json::to_string(&ErrorResponse {
            error: "boom".to_owned(),
            missing: Vec::new(),
        })
        .unwrap_or_default();
        assert_eq!(body, "{\"error\":\"boom\"}");
    }

    #[test]
    fn run_response_serialises_period() {
        let body = serde_json::to_string(&RunResponse {
            status: "sent".to_owned(),
            period: Some(Period::Evening),
        })
        .unwrap_or_default();
        assert_eq!(body, "{\"status\":\"sent\",\"period\":\"evening\"}");
    }
}

pub mod error;
pub mod routes;
pub mod slack;
pub mod state;

use std::future::{Future, IntoFuture};
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use chatops_core::RelayConfig;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Handlers that run longer than this are answered with 408.
///
/// Must stay above the GitHub client timeout plus the Slack post timeout, so
/// an outbound call always fails on its own terms and gets reported in the
/// reply instead of being dropped mid-flight.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(45);

/// How long in-flight requests get to finish once shutdown starts.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// Larger inbound bodies are refused with 413 before any handler runs.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Build the axum Router with all routes and middleware.
/// Used by `serve_on()` and available for integration testing.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health::health))
        .route("/slack/events", post(routes::events::slack_events))
        .route("/slack/commands", post(routes::commands::slack_commands))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            REQUEST_TIMEOUT,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `0.0.0.0:{config.port}` and serve until SIGINT or SIGTERM.
pub async fn serve(config: RelayConfig) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{}", config.port);
    let state = AppState::new(config)?;
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve_on(listener, state, shutdown_signal()).await
}

/// Serve on a pre-bound listener until `shutdown` resolves.
///
/// After the signal, no new connections are accepted and in-flight requests
/// get [`SHUTDOWN_GRACE`] to complete. If they have not finished by then this
/// returns an error so the caller can exit non-zero.
pub async fn serve_on<F>(
    listener: tokio::net::TcpListener,
    state: AppState,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let actual_port = listener.local_addr()?.port();
    let app = build_router(state);

    tracing::info!("chatops relay listening on http://0.0.0.0:{actual_port}");

    let (stopping_tx, mut stopping_rx) = tokio::sync::watch::channel(false);
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            tracing::info!("shutdown signal received, draining in-flight requests");
            let _ = stopping_tx.send(true);
        })
        .into_future();
    tokio::pin!(server);

    let grace_expired = async {
        if stopping_rx.wait_for(|stopping| *stopping).await.is_ok() {
            tokio::time::sleep(SHUTDOWN_GRACE).await;
        } else {
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        result = &mut server => {
            result?;
            tracing::info!("server stopped");
            Ok(())
        }
        _ = grace_expired => {
            anyhow::bail!(
                "in-flight requests did not finish within {}s; forcing shutdown",
                SHUTDOWN_GRACE.as_secs()
            )
        }
    }
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_timeout_outlasts_outbound_calls() {
        assert!(REQUEST_TIMEOUT > github_client::client::REQUEST_TIMEOUT + slack::POST_TIMEOUT);
    }
}

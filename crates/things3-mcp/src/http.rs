//! Streamable HTTP transport.
//!
//! # Routes
//!
//! - `/mcp` - MCP streamable HTTP endpoint (API key required)
//! - `GET /health` - liveness check, no authentication

use std::time::Instant;

use axum::extract::State;
use axum::routing::get;
use axum::{middleware, Json, Router};
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::streamable_http_server::{StreamableHttpServerConfig, StreamableHttpService};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::auth::{require_auth, ApiKeyAuth};
use crate::config::ServerConfig;
use crate::server::Things3McpServer;

/// Path the MCP service is mounted at.
pub const MCP_PATH: &str = "/mcp";

/// Response body for `GET /health`.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always "ok" if responding.
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

#[derive(Debug, Clone, Copy)]
struct HealthState {
    started: Instant,
}

async fn get_health(State(state): State<HealthState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started.elapsed().as_secs(),
    })
}

/// Build the HTTP router. Each MCP session gets its own clone of `server`.
pub fn router(server: Things3McpServer, auth: ApiKeyAuth) -> Router {
    let mcp_service = StreamableHttpService::new(
        move || Ok(server.clone()),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig::default(),
    );

    let mcp = Router::new()
        .nest_service(MCP_PATH, mcp_service)
        .layer(middleware::from_fn_with_state(auth, require_auth));

    Router::new()
        .route("/health", get(get_health))
        .with_state(HealthState {
            started: Instant::now(),
        })
        .merge(mcp)
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve until SIGINT or SIGTERM.
pub async fn serve(
    config: &ServerConfig,
    server: Things3McpServer,
    auth: ApiKeyAuth,
) -> anyhow::Result<()> {
    let bind_addr = config.bind_address();
    let listener = TcpListener::bind(&bind_addr).await.map_err(|e| {
        tracing::error!(error = %e, address = %bind_addr, "Failed to bind to address");
        anyhow::anyhow!("Failed to bind to {bind_addr}: {e}")
    })?;

    tracing::info!(
        address = %bind_addr,
        endpoint = MCP_PATH,
        bearer_enabled = auth.has_bearer_token(),
        "Things 3 MCP server listening"
    );

    axum::serve(listener, router(server, auth))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("HTTP server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C, starting graceful shutdown"),
        () = terminate => tracing::info!("Received SIGTERM, starting graceful shutdown"),
    }
}

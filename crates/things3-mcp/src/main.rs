//! Things 3 MCP Server
//!
//! Model Context Protocol server exposing a Things 3 library to LLM agents,
//! over stdio (default) or streamable HTTP.

use std::sync::Arc;

use clap::Parser;
use rmcp::ServiceExt;

use things3_mcp::auth::ApiKeyAuth;
use things3_mcp::config::{load_file_config, ConfigArgs, ServerConfig, Transport};
use things3_mcp::server::Things3McpServer;
use things3_mcp::{http, logging};
use things3_sdk::bridge::ThingsBridge;
use things3_sdk::store::{TaskStore, ThingsDatabase};

#[derive(Debug, Parser)]
#[command(name = "things3-mcp", version, about = "Things 3 MCP server")]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let file = load_file_config(cli.config.config.as_deref())?;
    let config = ServerConfig::resolve(cli.config, file)?;
    logging::init(config.log_format)?;

    let store = match ThingsDatabase::open(config.database.as_deref()).await {
        Ok(store) => store,
        Err(e) if e.is_unavailable() => {
            tracing::error!(error = %e, "Things 3 database not found; set THINGSDB or --database");
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    let auth_token = match config.things_auth_token.clone() {
        Some(token) => Some(token),
        None => store.auth_token().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Could not read Things URL-scheme auth token");
            None
        }),
    };
    let bridge = ThingsBridge::system(config.script_timeout).with_auth_token(auth_token);
    if !bridge.has_auth_token() {
        tracing::warn!("No Things auth token; URL-scheme updates will be unavailable");
    }
    if !bridge.is_ready().await {
        tracing::warn!("Things 3 is not running; writes will fall back to the URL scheme");
    }
    let server = Things3McpServer::new(Arc::new(store), bridge);

    match config.transport {
        Transport::Stdio => {
            tracing::info!("things3-mcp starting (stdio transport)");
            let service = server.serve(rmcp::transport::io::stdio()).await?;
            service.waiting().await?;
        }
        Transport::Http => {
            tracing::info!("things3-mcp starting (http transport)");
            let auth = ApiKeyAuth::from_config(config.api_key.clone(), config.api_token.clone());
            http::serve(&config, server, auth).await?;
        }
    }

    Ok(())
}

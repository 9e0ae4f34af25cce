//! Things 3 MCP Server library.
//!
//! Provides the [`server::Things3McpServer`] MCP handler, its tool
//! parameter types, configuration loading, and the HTTP transport. Used by
//! the `things3-mcp` binary and available for integration testing.

pub mod auth;
pub mod config;
pub mod http;
pub mod logging;
pub mod server;
pub mod tools;

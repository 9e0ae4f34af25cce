//! MCP tool parameter types and implementations.
//!
//! All parameter structs derive `Deserialize + JsonSchema` for MCP tool registration.
//! Tool bodies live in [`read`] and [`write`] and return the text sent back
//! to the model; `server.rs` only routes to them.

pub mod helpers;
pub mod params;
pub mod read;
pub mod write;

pub use params::*;

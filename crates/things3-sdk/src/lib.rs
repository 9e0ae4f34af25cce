//! Shared SDK for the Things 3 MCP server: data access, Someday reconciliation,
//! token-efficient formatting, and the AppleScript / URL-scheme write bridge.
//!
//! # Modules
//!
//! ## Read side
//! - [`models`] — Task, project, heading, area and tag records plus shared constants
//! - [`store`] — The [`store::TaskStore`] interface and its read-only SQLite implementation
//! - [`someday`] — Reconciles raw schedule buckets with what the Things UI displays
//! - [`format`] — Concise (one line per item) and detailed renderers
//! - [`sampling`] — Random sampling for manageable batches
//! - [`dates`] — Packed-date decoding, period parsing, and date filter expressions
//!
//! ## Write side
//! - [`bridge`] — AppleScript execution with a `things:///` URL-scheme fallback

pub mod bridge;
pub mod dates;
pub mod format;
pub mod models;
pub mod sampling;
pub mod someday;
pub mod store;

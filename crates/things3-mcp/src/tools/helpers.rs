//! Shared helper functions for MCP tool implementations.

use std::fmt::Display;

use things3_sdk::format::Lookups;
use things3_sdk::store::{StoreResult, TaskStore};

/// Plain-text error reply. Tool failures are returned as text so the model
/// can read and react to them.
pub fn error_text(message: impl Display) -> String {
    format!("Error: {message}")
}

/// Log a failed tool call and turn it into an error reply.
pub fn tool_error(tool: &str, error: impl Display) -> String {
    tracing::error!(tool, error = %error, "Tool call failed");
    error_text(error)
}

/// Project and area name lookups for one request.
pub async fn load_lookups(store: &dyn TaskStore) -> StoreResult<Lookups> {
    let projects = store.projects().await?;
    let areas = store.areas().await?;
    Ok(Lookups::new(&projects, &areas))
}

/// `header` followed by one line per entry.
pub fn with_header(header: String, lines: Vec<String>) -> String {
    if lines.is_empty() {
        return header;
    }
    format!("{}\n{}", header, lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_text_prefix() {
        assert_eq!(error_text("database locked"), "Error: database locked");
    }

    #[test]
    fn test_with_header() {
        assert_eq!(with_header("Random 0 of 0 inbox items:".into(), vec![]), "Random 0 of 0 inbox items:");
        assert_eq!(
            with_header("Head:".into(), vec!["a".into(), "b".into()]),
            "Head:\na\nb"
        );
    }
}

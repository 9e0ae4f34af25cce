//! Parameter structs for all MCP tools.

use schemars::JsonSchema;
use serde::Deserialize;
use things3_sdk::models::{DEFAULT_LIMIT, DEFAULT_SAMPLE_COUNT};

/// Default cap for `json_export`.
pub const DEFAULT_EXPORT_LIMIT: usize = 50;

fn default_true() -> bool {
    true
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

fn default_count() -> usize {
    DEFAULT_SAMPLE_COUNT
}

fn default_logbook_period() -> String {
    "7d".to_string()
}

fn default_export_limit() -> usize {
    DEFAULT_EXPORT_LIMIT
}

// ── get_inbox / get_today / get_upcoming / get_anytime / get_someday ──

/// Parameters shared by the list view tools.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListViewParams {
    #[schemars(description = "One-line-per-item output (default: true)")]
    #[serde(default = "default_true")]
    pub concise: bool,

    #[schemars(description = "Max items to return (default: 10)")]
    #[serde(default = "default_limit")]
    pub limit: usize,

    #[schemars(description = "Include notes, checklist, timestamps")]
    #[serde(default)]
    pub include_details: bool,
}

impl Default for ListViewParams {
    fn default() -> Self {
        Self {
            concise: true,
            limit: DEFAULT_LIMIT,
            include_details: false,
        }
    }
}

impl ListViewParams {
    /// Detail output wins over `concise`.
    pub fn is_concise(&self) -> bool {
        self.concise && !self.include_details
    }
}

// ── get_trash / get_deadlines / get_areas ──

/// Output size parameters for simple list tools.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListParams {
    #[schemars(description = "One-line-per-item output (default: true)")]
    #[serde(default = "default_true")]
    pub concise: bool,

    #[schemars(description = "Max items to return (default: 10)")]
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            concise: true,
            limit: DEFAULT_LIMIT,
        }
    }
}

// ── get_logbook ──

/// Parameters for the `get_logbook` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct LogbookParams {
    #[schemars(description = "Time period: '7d', '2w', '1m', '3m', '1y' (default: '7d')")]
    #[serde(default = "default_logbook_period")]
    pub period: String,

    #[schemars(description = "One-line-per-item output (default: true)")]
    #[serde(default = "default_true")]
    pub concise: bool,

    #[schemars(description = "Max items to return (default: 10)")]
    #[serde(default = "default_limit")]
    pub limit: usize,
}

// ── get_random_inbox / get_random_today / get_random_anytime ──

/// Parameters for the random sampling tools.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct RandomSampleParams {
    #[schemars(description = "Number of random items to sample (default: 5)")]
    #[serde(default = "default_count")]
    pub count: usize,
}

// ── get_random_todos ──

/// Parameters for the `get_random_todos` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct RandomTodosParams {
    #[schemars(description = "Filter to a specific project by UUID")]
    pub project_uuid: Option<String>,

    #[schemars(description = "Number of random items to sample (default: 5)")]
    #[serde(default = "default_count")]
    pub count: usize,
}

// ── get_todos ──

/// Parameters for the `get_todos` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetTodosParams {
    #[schemars(description = "Filter by project UUID")]
    pub project_uuid: Option<String>,

    #[schemars(description = "One-line-per-item output (default: true)")]
    #[serde(default = "default_true")]
    pub concise: bool,

    #[schemars(description = "Max items to return (default: 10)")]
    #[serde(default = "default_limit")]
    pub limit: usize,

    #[schemars(description = "Include notes, checklist, timestamps")]
    #[serde(default)]
    pub include_details: bool,
}

// ── get_projects ──

/// Parameters for the `get_projects` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetProjectsParams {
    #[schemars(description = "One-line-per-project output (default: true)")]
    #[serde(default = "default_true")]
    pub concise: bool,

    #[schemars(description = "Max items to return (default: 10)")]
    #[serde(default = "default_limit")]
    pub limit: usize,

    #[schemars(description = "Include task list inside each project")]
    #[serde(default)]
    pub include_items: bool,
}

// ── get_tags ──

/// Parameters for the `get_tags` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetTagsParams {
    #[schemars(description = "One-line-per-tag output (default: true)")]
    #[serde(default = "default_true")]
    pub concise: bool,

    #[schemars(description = "Max items to return (default: 10)")]
    #[serde(default = "default_limit")]
    pub limit: usize,

    #[schemars(description = "Include tagged items for each tag")]
    #[serde(default)]
    pub include_items: bool,
}

// ── get_tagged_items ──

/// Parameters for the `get_tagged_items` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct TaggedItemsParams {
    #[schemars(description = "Tag name to filter by")]
    pub tag: String,

    #[schemars(description = "One-line-per-item output (default: true)")]
    #[serde(default = "default_true")]
    pub concise: bool,

    #[schemars(description = "Max items to return (default: 10)")]
    #[serde(default = "default_limit")]
    pub limit: usize,
}

// ── search_todos ──

/// Parameters for the `search_todos` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchTodosParams {
    #[schemars(description = "Search terms (matches title and notes)")]
    pub query: String,

    #[schemars(description = "One-line-per-item output (default: true)")]
    #[serde(default = "default_true")]
    pub concise: bool,

    #[schemars(description = "Max items to return (default: 10)")]
    #[serde(default = "default_limit")]
    pub limit: usize,
}

// ── search_advanced ──

/// Parameters for the `search_advanced` tool. All filters are AND-combined.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchAdvancedParams {
    #[schemars(description = "Filter: 'incomplete', 'completed', 'canceled'")]
    pub status: Option<String>,

    #[schemars(description = "Start date filter, e.g. '2026-01-01' or '>=2026-01-01'")]
    pub start_date: Option<String>,

    #[schemars(description = "Deadline filter, e.g. '<=2026-03-01'")]
    pub deadline: Option<String>,

    #[schemars(description = "Filter by tag name")]
    pub tag: Option<String>,

    #[schemars(description = "Filter by area UUID")]
    pub area: Option<String>,

    #[schemars(description = "Filter: 'to-do', 'project', 'heading'")]
    pub item_type: Option<String>,

    #[schemars(description = "Created within period: '3d', '1w', '2m'")]
    pub last: Option<String>,

    #[schemars(description = "One-line-per-item output (default: true)")]
    #[serde(default = "default_true")]
    pub concise: bool,

    #[schemars(description = "Max items to return (default: 10)")]
    #[serde(default = "default_limit")]
    pub limit: usize,
}

// ── get_recent ──

/// Parameters for the `get_recent` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct RecentParams {
    #[schemars(description = "Time period: '3d', '1w', '2m', '1y'")]
    pub period: String,

    #[schemars(description = "One-line-per-item output (default: true)")]
    #[serde(default = "default_true")]
    pub concise: bool,

    #[schemars(description = "Max items to return (default: 10)")]
    #[serde(default = "default_limit")]
    pub limit: usize,
}

// ── show_item ──

/// Parameters for the `show_item` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ShowItemParams {
    #[schemars(description = "UUID of the item to show (or built-in list name)")]
    pub uuid: String,

    #[schemars(description = "Include full details (default: true for single items)")]
    #[serde(default = "default_true")]
    pub include_details: bool,
}

// ── add_todo ──

/// Parameters for the `add_todo` tool.
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct AddTodoParams {
    #[schemars(description = "Todo title")]
    pub title: String,

    #[schemars(description = "Notes (supports Markdown; use checkboxes for subtasks)")]
    pub notes: Option<String>,

    #[schemars(
        description = "Schedule: 'today', 'tomorrow', 'evening', 'anytime', 'someday', or YYYY-MM-DD"
    )]
    pub when: Option<String>,

    #[schemars(description = "Deadline date in YYYY-MM-DD format")]
    pub deadline: Option<String>,

    #[schemars(description = "List of tag names to apply")]
    #[serde(default)]
    pub tags: Vec<String>,

    #[schemars(
        description = "UUID of project or area to add to (takes precedence over list_title)"
    )]
    pub list_id: Option<String>,

    #[schemars(description = "Name of project or area to add to")]
    pub list_title: Option<String>,

    #[schemars(
        description = "Subtask items (uses URL scheme fallback since AppleScript cannot create checklist items)"
    )]
    #[serde(default)]
    pub checklist_items: Vec<String>,
}

// ── add_project ──

/// Parameters for the `add_project` tool.
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct AddProjectParams {
    #[schemars(description = "Project title")]
    pub title: String,

    #[schemars(description = "Project notes")]
    pub notes: Option<String>,

    #[schemars(description = "Schedule: 'today', 'tomorrow', 'anytime', 'someday', or YYYY-MM-DD")]
    pub when: Option<String>,

    #[schemars(description = "Deadline date in YYYY-MM-DD format")]
    pub deadline: Option<String>,

    #[schemars(description = "List of tag names")]
    #[serde(default)]
    pub tags: Vec<String>,

    #[schemars(description = "UUID of area to assign to")]
    pub area_id: Option<String>,

    #[schemars(description = "Name of area to assign to")]
    pub area_title: Option<String>,

    #[schemars(description = "List of todo titles to create inside the project")]
    #[serde(default)]
    pub todos: Vec<String>,
}

// ── update_todo ──

/// Parameters for the `update_todo` tool. Only set fields change.
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct UpdateTodoParams {
    #[schemars(description = "UUID of the todo to update")]
    pub todo_id: String,

    #[schemars(description = "New title")]
    pub title: Option<String>,

    #[schemars(description = "New notes (replaces existing)")]
    pub notes: Option<String>,

    #[schemars(description = "Reschedule: 'today', 'tomorrow', 'anytime', 'someday', or YYYY-MM-DD")]
    pub when: Option<String>,

    #[schemars(description = "New deadline in YYYY-MM-DD format")]
    pub deadline: Option<String>,

    #[schemars(description = "Replace all tags")]
    #[serde(default)]
    pub tags: Vec<String>,

    #[schemars(description = "Mark completed (true) or reopen (false)")]
    pub completed: Option<bool>,

    #[schemars(description = "Mark canceled (true) or reopen (false)")]
    pub canceled: Option<bool>,

    #[schemars(description = "Move to project/area by UUID")]
    pub list_id: Option<String>,

    #[schemars(description = "Move to project/area by name")]
    pub list_name: Option<String>,
}

// ── update_project ──

/// Parameters for the `update_project` tool. Only set fields change.
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct UpdateProjectParams {
    #[schemars(description = "UUID of the project to update")]
    pub project_id: String,

    #[schemars(description = "New title")]
    pub title: Option<String>,

    #[schemars(description = "New notes (replaces existing)")]
    pub notes: Option<String>,

    #[schemars(description = "Reschedule: 'today', 'tomorrow', 'anytime', 'someday', or YYYY-MM-DD")]
    pub when: Option<String>,

    #[schemars(description = "New deadline in YYYY-MM-DD format")]
    pub deadline: Option<String>,

    #[schemars(description = "Replace all tags")]
    #[serde(default)]
    pub tags: Vec<String>,

    #[schemars(description = "Mark completed (true) or reopen (false)")]
    pub completed: Option<bool>,

    #[schemars(description = "Mark canceled (true) or reopen (false)")]
    pub canceled: Option<bool>,

    #[schemars(description = "Move to area by UUID")]
    pub area_id: Option<String>,

    #[schemars(description = "Move to area by name")]
    pub area_title: Option<String>,
}

// ── show_in_things ──

/// Parameters for the `show_in_things` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ShowInThingsParams {
    #[schemars(
        description = "UUID of item, or list name: inbox, today, upcoming, someday, logbook, trash"
    )]
    pub item_id: String,
}

// ── search_in_things ──

/// Parameters for the `search_in_things` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchInThingsParams {
    #[schemars(description = "Search terms to open in Things search UI")]
    pub query: String,
}

// ── json_import ──

/// Parameters for the `json_import` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct JsonImportParams {
    #[schemars(
        description = "JSON string: array of objects with {type, attributes}. Types: 'to-do', 'project', 'heading'. Attributes: title, notes, when, deadline, tags, checklist-items, list, heading. Example: [{\"type\":\"to-do\",\"attributes\":{\"title\":\"Buy milk\",\"when\":\"today\"}}]"
    )]
    pub data: String,

    #[schemars(description = "Show first created item in Things")]
    #[serde(default)]
    pub reveal: bool,
}

// ── json_export ──

/// Parameters for the `json_export` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct JsonExportParams {
    #[schemars(
        description = "Export a specific project by UUID (or all open todos if omitted)"
    )]
    pub project_uuid: Option<String>,

    #[schemars(description = "Max items to export (default: 50)")]
    #[serde(default = "default_export_limit")]
    pub limit: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_view_defaults() {
        let params: ListViewParams = serde_json::from_str("{}").unwrap();
        assert!(params.concise);
        assert_eq!(params.limit, 10);
        assert!(!params.include_details);
        assert!(params.is_concise());

        let detailed: ListViewParams =
            serde_json::from_str(r#"{"include_details": true}"#).unwrap();
        assert!(!detailed.is_concise());
    }

    #[test]
    fn test_sampling_and_export_defaults() {
        let sample: RandomSampleParams = serde_json::from_str("{}").unwrap();
        assert_eq!(sample.count, 5);

        let logbook: LogbookParams = serde_json::from_str("{}").unwrap();
        assert_eq!(logbook.period, "7d");

        let export: JsonExportParams = serde_json::from_str("{}").unwrap();
        assert_eq!(export.limit, 50);
        assert!(export.project_uuid.is_none());
    }

    #[test]
    fn test_add_todo_lists_default_empty() {
        let params: AddTodoParams = serde_json::from_str(r#"{"title": "Milk"}"#).unwrap();
        assert!(params.tags.is_empty());
        assert!(params.checklist_items.is_empty());
    }
}

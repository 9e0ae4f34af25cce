//! MCP ServerHandler implementation for Things 3.
//!
//! Tools are grouped the way an assistant usually works through a GTD review:
//!
//! **List views**
//! - `get_inbox`, `get_today`, `get_upcoming`, `get_anytime`, `get_someday`:
//!   the five scheduling lists, with Someday inheritance reconciled
//! - `get_logbook`, `get_trash`, `get_deadlines`
//!
//! **Random sampling** (recommended entry points)
//! - `get_random_inbox`, `get_random_today`, `get_random_anytime`, `get_random_todos`
//!
//! **Entities**
//! - `get_todos`, `get_projects`, `get_areas`, `get_tags`, `get_tagged_items`
//!
//! **Search & detail**
//! - `search_todos`, `search_advanced`, `get_recent`, `show_item`, `get_summary`
//!
//! **Writes** (AppleScript with URL-scheme fallback)
//! - `add_todo`, `add_project`, `update_todo`, `update_project`
//! - `show_in_things`, `search_in_things`, `json_import`, `json_export`

use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{Implementation, ProtocolVersion, ServerCapabilities, ServerInfo};
use rmcp::{tool, tool_handler, tool_router, ServerHandler};

use things3_sdk::bridge::ThingsBridge;
use things3_sdk::store::TaskStore;

use crate::tools::*;

/// Things 3 MCP server handler.
#[derive(Debug, Clone)]
pub struct Things3McpServer {
    tool_router: ToolRouter<Self>,
    store: Arc<dyn TaskStore>,
    bridge: ThingsBridge,
}

impl Things3McpServer {
    pub fn new(store: Arc<dyn TaskStore>, bridge: ThingsBridge) -> Self {
        Self {
            tool_router: Self::tool_router(),
            store,
            bridge,
        }
    }

    pub fn store(&self) -> &dyn TaskStore {
        self.store.as_ref()
    }

    pub fn bridge(&self) -> &ThingsBridge {
        &self.bridge
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for Things3McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "things3-mcp".to_string(),
                title: Some("Things 3 MCP Server".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                description: Some(
                    "Token-efficient Things 3 access: Someday-aware list views, random \
                     sampling, search, and AppleScript/URL-scheme writes"
                        .to_string(),
                ),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Things 3 task manager integration. Use concise=true (default) for token \
                 efficiency. Start with get_random_* or get_summary for overviews before \
                 requesting full lists. Use limit= to control output size.\n\
                 Today, Upcoming and Anytime hide to-dos whose project is in Someday; \
                 get_someday includes them, matching the Things app.\n\
                 Writes return the new UUID when AppleScript succeeds; URL-scheme fallbacks \
                 cannot report one."
                    .to_string(),
            ),
        }
    }
}

#[tool_router(router = tool_router)]
impl Things3McpServer {
    // ── List views ──

    #[tool(
        name = "get_inbox",
        description = "Get todos from the Things 3 Inbox. The Inbox is where unprocessed tasks live; for a quick overview use get_random_inbox instead."
    )]
    pub async fn get_inbox(&self, Parameters(params): Parameters<ListViewParams>) -> String {
        read::get_inbox(self.store(), params).await
    }

    #[tool(
        name = "get_today",
        description = "Get todos scheduled for Today. Filters out tasks that inherit Someday status from their parent project, matching the Things UI."
    )]
    pub async fn get_today(&self, Parameters(params): Parameters<ListViewParams>) -> String {
        read::get_today(self.store(), params).await
    }

    #[tool(
        name = "get_upcoming",
        description = "Get upcoming scheduled todos. Shows tasks scheduled for future dates; excludes inherited-Someday tasks."
    )]
    pub async fn get_upcoming(&self, Parameters(params): Parameters<ListViewParams>) -> String {
        read::get_upcoming(self.store(), params).await
    }

    #[tool(
        name = "get_anytime",
        description = "Get Anytime todos: tasks available to work on at any time. Excludes inherited-Someday tasks."
    )]
    pub async fn get_anytime(&self, Parameters(params): Parameters<ListViewParams>) -> String {
        read::get_anytime(self.store(), params).await
    }

    #[tool(
        name = "get_someday",
        description = "Get Someday todos. Includes directly-Someday tasks and tasks that inherit Someday status from their parent project, matching the Things UI."
    )]
    pub async fn get_someday(&self, Parameters(params): Parameters<ListViewParams>) -> String {
        read::get_someday(self.store(), params).await
    }

    #[tool(
        name = "get_logbook",
        description = "Get completed todos from the Logbook within a time period ('7d', '2w', '1m', '3m', '1y')."
    )]
    pub async fn get_logbook(&self, Parameters(params): Parameters<LogbookParams>) -> String {
        read::get_logbook(self.store(), params).await
    }

    #[tool(name = "get_trash", description = "Get trashed todos from Things 3.")]
    pub async fn get_trash(&self, Parameters(params): Parameters<ListParams>) -> String {
        read::get_trash(self.store(), params).await
    }

    #[tool(
        name = "get_deadlines",
        description = "Get open todos with deadlines, sorted chronologically. Includes tasks from all lists."
    )]
    pub async fn get_deadlines(&self, Parameters(params): Parameters<ListParams>) -> String {
        read::get_deadlines(self.store(), params).await
    }

    // ── Random sampling ──

    #[tool(
        name = "get_random_inbox",
        description = "Get a random sample from the Inbox. Recommended first call when reviewing the inbox; always concise."
    )]
    pub async fn get_random_inbox(
        &self,
        Parameters(params): Parameters<RandomSampleParams>,
    ) -> String {
        read::get_random_inbox(self.store(), params).await
    }

    #[tool(
        name = "get_random_today",
        description = "Get a random sample from Today, with Someday filtering. Good for quick daily check-ins."
    )]
    pub async fn get_random_today(
        &self,
        Parameters(params): Parameters<RandomSampleParams>,
    ) -> String {
        read::get_random_today(self.store(), params).await
    }

    #[tool(
        name = "get_random_anytime",
        description = "Get a random sample from Anytime, with Someday filtering. Useful for finding what to work on next."
    )]
    pub async fn get_random_anytime(
        &self,
        Parameters(params): Parameters<RandomSampleParams>,
    ) -> String {
        read::get_random_anytime(self.store(), params).await
    }

    #[tool(
        name = "get_random_todos",
        description = "Get a random sample of open todos, optionally within one project. Use for reviewing and improving tasks in batches."
    )]
    pub async fn get_random_todos(
        &self,
        Parameters(params): Parameters<RandomTodosParams>,
    ) -> String {
        read::get_random_todos(self.store(), params).await
    }

    // ── Entities ──

    #[tool(
        name = "get_todos",
        description = "Get all open todos, optionally filtered by project. For large lists prefer get_random_todos first."
    )]
    pub async fn get_todos(&self, Parameters(params): Parameters<GetTodosParams>) -> String {
        read::get_todos(self.store(), params).await
    }

    #[tool(
        name = "get_projects",
        description = "Get all active projects. Concise mode shows name plus open/done counts; include_items lists each project's tasks."
    )]
    pub async fn get_projects(&self, Parameters(params): Parameters<GetProjectsParams>) -> String {
        read::get_projects(self.store(), params).await
    }

    #[tool(
        name = "get_areas",
        description = "Get all areas: high-level categories such as Work, Personal, Health."
    )]
    pub async fn get_areas(&self, Parameters(params): Parameters<ListParams>) -> String {
        read::get_areas(self.store(), params).await
    }

    #[tool(name = "get_tags", description = "Get all tags, optionally with their tagged todos.")]
    pub async fn get_tags(&self, Parameters(params): Parameters<GetTagsParams>) -> String {
        read::get_tags(self.store(), params).await
    }

    #[tool(name = "get_tagged_items", description = "Get all open todos with a specific tag.")]
    pub async fn get_tagged_items(
        &self,
        Parameters(params): Parameters<TaggedItemsParams>,
    ) -> String {
        read::get_tagged_items(self.store(), params).await
    }

    // ── Search & detail ──

    #[tool(name = "search_todos", description = "Search open todos by title or notes content.")]
    pub async fn search_todos(&self, Parameters(params): Parameters<SearchTodosParams>) -> String {
        read::search_todos(self.store(), params).await
    }

    #[tool(
        name = "search_advanced",
        description = "Advanced search combining status, start_date, deadline, tag, area, item_type and created-within filters. All filters are AND-combined."
    )]
    pub async fn search_advanced(
        &self,
        Parameters(params): Parameters<SearchAdvancedParams>,
    ) -> String {
        read::search_advanced(self.store(), params).await
    }

    #[tool(
        name = "get_recent",
        description = "Get todos created within a time period ('3d', '1w', '2m', '1y')."
    )]
    pub async fn get_recent(&self, Parameters(params): Parameters<RecentParams>) -> String {
        read::get_recent(self.store(), params).await
    }

    #[tool(
        name = "show_item",
        description = "Get a single item by UUID with full details. Also accepts built-in list names: inbox, today, upcoming, anytime, someday, logbook, trash."
    )]
    pub async fn show_item(&self, Parameters(params): Parameters<ShowItemParams>) -> String {
        read::show_item(self.store(), params).await
    }

    #[tool(
        name = "get_summary",
        description = "Token-efficient GTD overview: item counts per list, active projects, areas and deadlines due this week. Recommended as the very first call."
    )]
    pub async fn get_summary(&self) -> String {
        read::get_summary(self.store()).await
    }

    // ── Writes ──

    #[tool(
        name = "add_todo",
        description = "Create a new todo. Returns its UUID when AppleScript succeeds, otherwise falls back to the URL scheme. checklist_items always use the URL scheme; alternatively put Markdown checkboxes in notes."
    )]
    pub async fn add_todo(&self, Parameters(params): Parameters<AddTodoParams>) -> String {
        write::add_todo(self.bridge(), params).await
    }

    #[tool(
        name = "add_project",
        description = "Create a new project, optionally with initial todos. Returns its UUID when AppleScript succeeds."
    )]
    pub async fn add_project(&self, Parameters(params): Parameters<AddProjectParams>) -> String {
        write::add_project(self.bridge(), params).await
    }

    #[tool(
        name = "update_todo",
        description = "Update an existing todo. Pass only the fields to change. Uses AppleScript (no auth token needed) and falls back to the URL scheme."
    )]
    pub async fn update_todo(&self, Parameters(params): Parameters<UpdateTodoParams>) -> String {
        write::update_todo(self.bridge(), params).await
    }

    #[tool(
        name = "update_project",
        description = "Update an existing project. Uses AppleScript (no auth token needed) and falls back to the URL scheme."
    )]
    pub async fn update_project(
        &self,
        Parameters(params): Parameters<UpdateProjectParams>,
    ) -> String {
        write::update_project(self.bridge(), params).await
    }

    #[tool(
        name = "show_in_things",
        description = "Reveal an item or built-in list in the Things 3 app window."
    )]
    pub async fn show_in_things(
        &self,
        Parameters(params): Parameters<ShowInThingsParams>,
    ) -> String {
        write::show_in_things(self.bridge(), params).await
    }

    #[tool(
        name = "search_in_things",
        description = "Open the Things 3 search UI with the given query. Use search_todos for results returned here."
    )]
    pub async fn search_in_things(
        &self,
        Parameters(params): Parameters<SearchInThingsParams>,
    ) -> String {
        write::search_in_things(self.bridge(), params).await
    }

    #[tool(
        name = "json_import",
        description = "Bulk import todos and projects via the Things JSON format (array of {type, attributes}). Supports nested projects with headings and todos. Rate limit: 250 items per 10 seconds."
    )]
    pub async fn json_import(&self, Parameters(params): Parameters<JsonImportParams>) -> String {
        write::json_import(self.bridge(), params).await
    }

    #[tool(
        name = "json_export",
        description = "Export open todos as compact JSON (title, uuid, status, when, deadline, tags, notes) for backup or transfer."
    )]
    pub async fn json_export(&self, Parameters(params): Parameters<JsonExportParams>) -> String {
        read::json_export(self.store(), params).await
    }
}

//! Write tool implementations.
//!
//! Creates and updates go through AppleScript first and fall back to the
//! `things:///` URL scheme; the reply says which path ran, since only
//! AppleScript reports the new id back.

use serde_json::Value;

use things3_sdk::bridge::{NewProject, NewTodo, ProjectUpdate, ThingsBridge, TodoUpdate, WriteOutcome};

use super::helpers::tool_error;
use super::params::{
    AddProjectParams, AddTodoParams, JsonImportParams, SearchInThingsParams, ShowInThingsParams,
    UpdateProjectParams, UpdateTodoParams,
};

impl From<AddTodoParams> for NewTodo {
    fn from(p: AddTodoParams) -> Self {
        Self {
            title: p.title,
            notes: p.notes,
            when: p.when,
            deadline: p.deadline,
            tags: p.tags,
            list_id: p.list_id,
            list_title: p.list_title,
            checklist_items: p.checklist_items,
            ..NewTodo::default()
        }
    }
}

impl From<AddProjectParams> for NewProject {
    fn from(p: AddProjectParams) -> Self {
        Self {
            title: p.title,
            notes: p.notes,
            when: p.when,
            deadline: p.deadline,
            tags: p.tags,
            area_id: p.area_id,
            area_title: p.area_title,
            todos: p.todos,
            reveal: false,
        }
    }
}

impl From<UpdateTodoParams> for TodoUpdate {
    fn from(p: UpdateTodoParams) -> Self {
        Self {
            id: p.todo_id,
            title: p.title,
            notes: p.notes,
            when: p.when,
            deadline: p.deadline,
            tags: p.tags,
            completed: p.completed,
            canceled: p.canceled,
            list_id: p.list_id,
            list_title: p.list_name,
        }
    }
}

impl From<UpdateProjectParams> for ProjectUpdate {
    fn from(p: UpdateProjectParams) -> Self {
        Self {
            id: p.project_id,
            title: p.title,
            notes: p.notes,
            when: p.when,
            deadline: p.deadline,
            tags: p.tags,
            completed: p.completed,
            canceled: p.canceled,
            area_id: p.area_id,
            area_title: p.area_title,
        }
    }
}

pub async fn add_todo(bridge: &ThingsBridge, params: AddTodoParams) -> String {
    let todo = NewTodo::from(params);
    let with_checklist = !todo.checklist_items.is_empty();

    match bridge.add_todo(&todo).await {
        Ok(WriteOutcome::Script { output }) => {
            format!("Created todo '{}' — UUID: {}", todo.title, output)
        }
        Ok(WriteOutcome::UrlScheme { url }) if with_checklist => format!(
            "Created todo '{}' via URL scheme (checklist items included). URL: {}",
            todo.title, url
        ),
        Ok(WriteOutcome::UrlScheme { .. }) => {
            format!("Created todo '{}' via URL scheme (no UUID available).", todo.title)
        }
        Err(e) => tool_error("add_todo", e),
    }
}

pub async fn add_project(bridge: &ThingsBridge, params: AddProjectParams) -> String {
    let project = NewProject::from(params);
    match bridge.add_project(&project).await {
        Ok(WriteOutcome::Script { output }) => {
            format!("Created project '{}' — UUID: {}", project.title, output)
        }
        Ok(WriteOutcome::UrlScheme { .. }) => format!(
            "Created project '{}' via URL scheme (no UUID available).",
            project.title
        ),
        Err(e) => tool_error("add_project", e),
    }
}

pub async fn update_todo(bridge: &ThingsBridge, params: UpdateTodoParams) -> String {
    let update = TodoUpdate::from(params);
    match bridge.update_todo(&update).await {
        Ok(WriteOutcome::Script { .. }) => format!("Updated todo {}", update.id),
        Ok(WriteOutcome::UrlScheme { .. }) => format!("Updated todo {} via URL scheme.", update.id),
        Err(e) => tool_error("update_todo", e),
    }
}

pub async fn update_project(bridge: &ThingsBridge, params: UpdateProjectParams) -> String {
    let update = ProjectUpdate::from(params);
    match bridge.update_project(&update).await {
        Ok(WriteOutcome::Script { .. }) => format!("Updated project {}", update.id),
        Ok(WriteOutcome::UrlScheme { .. }) => {
            format!("Updated project {} via URL scheme.", update.id)
        }
        Err(e) => tool_error("update_project", e),
    }
}

pub async fn show_in_things(bridge: &ThingsBridge, params: ShowInThingsParams) -> String {
    let id = params.item_id;
    match bridge.show(&id).await {
        Ok(WriteOutcome::Script { .. }) => format!("Revealed {} in Things.", id),
        Ok(WriteOutcome::UrlScheme { .. }) => format!("Revealed {} in Things via URL scheme.", id),
        Err(e) => tool_error("show_in_things", e),
    }
}

pub async fn search_in_things(bridge: &ThingsBridge, params: SearchInThingsParams) -> String {
    match bridge.search(&params.query).await {
        Ok(_) => format!("Opened Things search for: {}", params.query),
        Err(e) => tool_error("search_in_things", e),
    }
}

/// Parse the import payload: a JSON array of objects.
fn parse_import(data: &str) -> Result<Vec<Value>, String> {
    let parsed: Value = serde_json::from_str(data).map_err(|e| format!("Invalid JSON: {e}"))?;
    match parsed {
        Value::Array(items) if items.iter().all(Value::is_object) => Ok(items),
        _ => Err("JSON must be an array of objects.".to_string()),
    }
}

pub async fn json_import(bridge: &ThingsBridge, params: JsonImportParams) -> String {
    let items = match parse_import(&params.data) {
        Ok(items) => items,
        Err(message) => return message,
    };
    match bridge.json_import(&items, params.reveal).await {
        Ok(_) => format!("Imported {} items via JSON.", items.len()),
        Err(e) => tool_error("json_import", e),
    }
}

//! `things:///` URL construction and opening.
//!
//! Used when AppleScript is unavailable, and always for checklist items and
//! JSON imports. Values are percent-encoded; tag lists are joined with commas
//! and checklist / to-do lists with newlines.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command;
use tracing::{debug, warn};

use super::error::{BridgeError, BridgeResult};
use super::request::{NewProject, NewTodo, ProjectUpdate, TodoUpdate};
use super::UrlOpener;

const OPEN_TIMEOUT: Duration = Duration::from_secs(10);

/// Builder for one `things:///{command}?...` URL. Empty values are skipped.
#[derive(Debug, Clone)]
pub struct ThingsUrl {
    command: &'static str,
    params: Vec<(&'static str, String)>,
}

impl ThingsUrl {
    pub fn new(command: &'static str) -> Self {
        Self {
            command,
            params: Vec::new(),
        }
    }

    pub fn param(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.params.push((key, value.into()));
        self
    }

    pub fn opt(self, key: &'static str, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.param(key, v),
            None => self,
        }
    }

    /// `true` / `false` when set.
    pub fn flag(self, key: &'static str, value: Option<bool>) -> Self {
        match value {
            Some(v) => self.param(key, v.to_string()),
            None => self,
        }
    }

    /// Comma-joined list, skipped when empty.
    pub fn comma_list(self, key: &'static str, values: &[String]) -> Self {
        if values.is_empty() {
            return self;
        }
        self.param(key, values.join(","))
    }

    /// Newline-joined list, skipped when empty.
    pub fn line_list(self, key: &'static str, values: &[String]) -> Self {
        if values.is_empty() {
            return self;
        }
        self.param(key, values.join("\n"))
    }

    pub fn command(&self) -> &str {
        self.command
    }

    pub fn build(&self) -> String {
        let query = self
            .params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        format!("things:///{}?{}", self.command, query)
    }
}

fn with_auth(url: ThingsUrl, auth_token: Option<&str>) -> ThingsUrl {
    match auth_token {
        Some(token) => url.param("auth-token", token),
        None => {
            warn!(command = url.command(), "No auth token available, update may fail");
            url
        }
    }
}

fn reveal(url: ThingsUrl, reveal: bool) -> ThingsUrl {
    if reveal {
        url.param("reveal", "true")
    } else {
        url
    }
}

pub fn add_todo_url(todo: &NewTodo) -> String {
    let url = ThingsUrl::new("add")
        .param("title", todo.title.as_str())
        .opt("notes", todo.notes.as_deref())
        .opt("when", todo.when.as_deref())
        .opt("deadline", todo.deadline.as_deref())
        .comma_list("tags", &todo.tags)
        .line_list("checklist-items", &todo.checklist_items)
        .opt("list-id", todo.list_id.as_deref())
        .opt("list", todo.list_title.as_deref())
        .opt("heading-id", todo.heading_id.as_deref())
        .opt("heading", todo.heading.as_deref());
    reveal(url, todo.reveal).build()
}

pub fn add_project_url(project: &NewProject) -> String {
    let url = ThingsUrl::new("add-project")
        .param("title", project.title.as_str())
        .opt("notes", project.notes.as_deref())
        .opt("when", project.when.as_deref())
        .opt("deadline", project.deadline.as_deref())
        .comma_list("tags", &project.tags)
        .opt("area-id", project.area_id.as_deref())
        .opt("area", project.area_title.as_deref())
        .line_list("to-dos", &project.todos);
    reveal(url, project.reveal).build()
}

pub fn update_todo_url(update: &TodoUpdate, auth_token: Option<&str>) -> String {
    let url = ThingsUrl::new("update")
        .param("id", update.id.as_str())
        .opt("title", update.title.as_deref())
        .opt("notes", update.notes.as_deref())
        .opt("when", update.when.as_deref())
        .opt("deadline", update.deadline.as_deref())
        .comma_list("tags", &update.tags)
        .flag("completed", update.completed)
        .flag("canceled", update.canceled)
        .opt("list-id", update.list_id.as_deref())
        .opt("list", update.list_title.as_deref());
    with_auth(url, auth_token).build()
}

pub fn update_project_url(update: &ProjectUpdate, auth_token: Option<&str>) -> String {
    let url = ThingsUrl::new("update-project")
        .param("id", update.id.as_str())
        .opt("title", update.title.as_deref())
        .opt("notes", update.notes.as_deref())
        .opt("when", update.when.as_deref())
        .opt("deadline", update.deadline.as_deref())
        .comma_list("tags", &update.tags)
        .flag("completed", update.completed)
        .flag("canceled", update.canceled)
        .opt("area-id", update.area_id.as_deref())
        .opt("area", update.area_title.as_deref());
    with_auth(url, auth_token).build()
}

/// True when any item asks for `"operation": "update"`.
pub fn has_update_operation(items: &[Value]) -> bool {
    items
        .iter()
        .any(|item| item.get("operation").and_then(Value::as_str) == Some("update"))
}

/// Bulk import URL. The auth token is attached only when the payload updates
/// existing items.
pub fn json_url(items: &[Value], reveal_first: bool, auth_token: Option<&str>) -> BridgeResult<String> {
    let mut url = reveal(
        ThingsUrl::new("json").param("data", serde_json::to_string(items)?),
        reveal_first,
    );
    if has_update_operation(items) {
        if let Some(token) = auth_token {
            url = url.param("auth-token", token);
        }
    }
    Ok(url.build())
}

pub fn show_url(id: &str) -> String {
    ThingsUrl::new("show").param("id", id).build()
}

pub fn search_url(query: &str) -> String {
    ThingsUrl::new("search").param("query", query).build()
}

/// Opens URLs with `osascript -e 'open location …'` so Things stays in the
/// background, falling back to `open`.
#[derive(Debug, Clone, Default)]
pub struct SystemUrlOpener;

async fn run_quiet(program: &str, args: &[&str]) -> BridgeResult<()> {
    let output = tokio::time::timeout(
        OPEN_TIMEOUT,
        Command::new(program).args(args).kill_on_drop(true).output(),
    )
    .await
    .map_err(|_| BridgeError::url_open(format!("{program} timed out")))??;

    if output.status.success() {
        Ok(())
    } else {
        Err(BridgeError::url_open(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ))
    }
}

#[async_trait]
impl UrlOpener for SystemUrlOpener {
    async fn open(&self, url: &str) -> BridgeResult<()> {
        let script = format!("open location \"{url}\"");
        match run_quiet("osascript", &["-e", script.as_str()]).await {
            Ok(()) => Ok(()),
            Err(e) => {
                debug!(error = %e, "osascript open failed, trying open");
                run_quiet("open", &[url])
                    .await
                    .map_err(|e| BridgeError::url_open(format!("{url}: {e}")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_add_url_encodes_and_joins_lists() {
        let todo = NewTodo {
            notes: Some("a & b".into()),
            tags: vec!["work".into(), "urgent".into()],
            checklist_items: vec!["one".into(), "two".into()],
            ..NewTodo::new("Plan trip")
        };

        assert_eq!(
            add_todo_url(&todo),
            "things:///add?title=Plan%20trip&notes=a%20%26%20b&tags=work%2Curgent&checklist-items=one%0Atwo"
        );
    }

    #[test]
    fn test_add_project_url_joins_todos_with_newlines() {
        let project = NewProject {
            todos: vec!["Dig".into(), "Plant".into()],
            reveal: true,
            ..NewProject::new("Garden")
        };
        assert_eq!(
            add_project_url(&project),
            "things:///add-project?title=Garden&to-dos=Dig%0APlant&reveal=true"
        );
    }

    #[test]
    fn test_update_url_carries_auth_token() {
        let update = TodoUpdate {
            completed: Some(true),
            ..TodoUpdate::new("T1")
        };
        assert_eq!(
            update_todo_url(&update, Some("tok")),
            "things:///update?id=T1&completed=true&auth-token=tok"
        );
        assert_eq!(
            update_todo_url(&update, None),
            "things:///update?id=T1&completed=true"
        );
    }

    #[test]
    fn test_update_project_url() {
        let update = ProjectUpdate {
            area_title: Some("Work".into()),
            ..ProjectUpdate::new("P1")
        };
        assert_eq!(
            update_project_url(&update, Some("tok")),
            "things:///update-project?id=P1&area=Work&auth-token=tok"
        );
    }

    #[test]
    fn test_json_url_token_only_for_updates() {
        let create = vec![json!({"type": "to-do", "attributes": {"title": "Milk"}})];
        let url = json_url(&create, false, Some("tok")).unwrap();
        assert!(url.starts_with("things:///json?data="));
        assert!(!url.contains("auth-token"));

        let update = vec![json!({"type": "to-do", "operation": "update", "id": "T1"})];
        let url = json_url(&update, true, Some("tok")).unwrap();
        assert!(url.ends_with("&reveal=true&auth-token=tok"));
    }

    #[test]
    fn test_show_and_search_urls() {
        assert_eq!(show_url("today"), "things:///show?id=today");
        assert_eq!(search_url("tax forms"), "things:///search?query=tax%20forms");
    }
}

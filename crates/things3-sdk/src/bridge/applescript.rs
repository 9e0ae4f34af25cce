//! AppleScript generation and execution.
//!
//! String literals treat `\` as an escape character, so backslashes are
//! doubled first; embedded double quotes are then spliced in with
//! `ASCII character 34`. Scripts are written to a temporary `.applescript`
//! file and run with `osascript`.

use std::io::Write;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::process::Command;
use tracing::{debug, error, warn};

use super::error::{BridgeError, BridgeResult};
use super::request::{NewProject, NewTodo, ProjectUpdate, TodoUpdate};
use super::ScriptRunner;
use crate::dates::{days_from_today, parse_date};

/// Default time allowed for one script.
pub const DEFAULT_SCRIPT_TIMEOUT: Duration = Duration::from_secs(10);

/// Returns the app name when Things is running, `not running` otherwise.
pub const READY_SCRIPT: &str = r#"tell application "System Events"
    set isRunning to (exists process "Things3")
end tell
if isRunning then
    tell application "Things3"
        return name
    end tell
else
    return "not running"
end if"#;

/// Quote `s` as an AppleScript string literal.
pub fn escape(s: &str) -> String {
    if s.is_empty() {
        return "\"\"".to_string();
    }
    let escaped = s.replace('\\', "\\\\");
    format!(
        "\"{}\"",
        escaped
            .split('"')
            .collect::<Vec<_>>()
            .join("\" & (ASCII character 34) & \"")
    )
}

/// Scheduling lines for `when`. Unrecognised values produce no lines.
pub fn when_lines(var: &str, when: &str, today: NaiveDate) -> Vec<String> {
    let when = when.trim().to_lowercase();
    match when.as_str() {
        "today" => vec![format!("    move {var} to list \"Today\"")],
        "anytime" => vec![format!("    move {var} to list \"Anytime\"")],
        "someday" => vec![format!("    move {var} to list \"Someday\"")],
        "tomorrow" | "evening" => vec![format!("    schedule {var} for \"{when}\"")],
        other => match parse_date(other) {
            Ok(date) => match days_from_today(date, today) {
                0 => vec![format!("    move {var} to list \"Today\"")],
                days => vec![format!("    schedule {var} for (current date) + {days} * days")],
            },
            Err(_) => {
                warn!(when = %other, "Unrecognized 'when' value, skipping");
                Vec::new()
            }
        },
    }
}

/// Deadline line for a `YYYY-MM-DD` value. Invalid dates produce no lines.
pub fn deadline_lines(var: &str, deadline: &str, today: NaiveDate) -> Vec<String> {
    match parse_date(deadline) {
        Ok(date) => {
            let days = days_from_today(date, today);
            vec![format!("    set due date of {var} to (current date) + {days} * days")]
        }
        Err(_) => {
            warn!(deadline = %deadline, "Invalid deadline format, expected YYYY-MM-DD");
            Vec::new()
        }
    }
}

pub fn tag_lines(var: &str, tags: &[String]) -> Vec<String> {
    tags.iter()
        .flat_map(|tag| {
            [
                format!("    set tagName to {}", escape(tag)),
                "    set newTag to make new tag with properties {name:tagName}".to_string(),
                format!("    add newTag to tags of {var}"),
            ]
        })
        .collect()
}

/// Move into a project, falling back to an area, matched by id or else name.
pub fn list_assignment_lines(var: &str, list_id: Option<&str>, list_title: Option<&str>) -> Vec<String> {
    let (key, target) = match (list_id, list_title) {
        (Some(id), _) => ("id", escape(id)),
        (None, Some(title)) => ("name", escape(title)),
        (None, None) => return Vec::new(),
    };
    vec![
        "    try".to_string(),
        format!("        set targetProject to first project whose {key} is {target}"),
        format!("        move {var} to targetProject"),
        "    on error".to_string(),
        "        try".to_string(),
        format!("            set targetArea to first area whose {key} is {target}"),
        format!("            move {var} to targetArea"),
        "        end try".to_string(),
        "    end try".to_string(),
    ]
}

/// Move into an area matched by id or else name.
pub fn area_assignment_lines(var: &str, area_id: Option<&str>, area_title: Option<&str>) -> Vec<String> {
    let (key, target) = match (area_id, area_title) {
        (Some(id), _) => ("id", escape(id)),
        (None, Some(title)) => ("name", escape(title)),
        (None, None) => return Vec::new(),
    };
    vec![
        "        try".to_string(),
        format!("            set targetArea to first area whose {key} is {target}"),
        format!("            move {var} to targetArea"),
        "        end try".to_string(),
    ]
}

pub fn status_lines(var: &str, completed: Option<bool>, canceled: Option<bool>) -> Vec<String> {
    let mut lines = Vec::new();
    match completed {
        Some(true) => lines.push(format!("        set status of {var} to completed")),
        Some(false) => lines.push(format!("        set status of {var} to open")),
        None => {}
    }
    match canceled {
        Some(true) => lines.push(format!("        set status of {var} to canceled")),
        Some(false) if completed != Some(true) => {
            lines.push(format!("        set status of {var} to open"))
        }
        _ => {}
    }
    lines
}

fn properties(title: &str, notes: Option<&str>) -> String {
    let mut props = vec![format!("name:{}", escape(title))];
    if let Some(notes) = notes.filter(|n| !n.is_empty()) {
        props.push(format!("notes:{}", escape(notes)));
    }
    props.join(", ")
}

/// Wrap body lines in the `tell` / `try` envelope shared by every write.
fn wrap(head: String, body: Vec<String>, result: &str) -> String {
    let mut lines = vec![
        "tell application \"Things3\"".to_string(),
        "    try".to_string(),
        head,
    ];
    lines.extend(body);
    lines.push(format!("        return {result}"));
    lines.push("    on error errMsg".to_string());
    lines.push("        return \"Error: \" & errMsg".to_string());
    lines.push("    end try".to_string());
    lines.push("end tell".to_string());
    lines.join("\n")
}

fn schedule_lines(
    var: &str,
    when: Option<&str>,
    deadline: Option<&str>,
    tags: &[String],
    today: NaiveDate,
) -> Vec<String> {
    let mut body = Vec::new();
    if let Some(when) = when.filter(|w| !w.is_empty()) {
        body.extend(when_lines(var, when, today));
    }
    if let Some(deadline) = deadline.filter(|d| !d.is_empty()) {
        body.extend(deadline_lines(var, deadline, today));
    }
    body.extend(tag_lines(var, tags));
    body
}

/// Script creating a to-do; returns the new id.
pub fn add_todo_script(todo: &NewTodo, today: NaiveDate) -> String {
    let var = "newTodo";
    let mut body = schedule_lines(var, todo.when.as_deref(), todo.deadline.as_deref(), &todo.tags, today);
    body.extend(list_assignment_lines(var, todo.list_id.as_deref(), todo.list_title.as_deref()));

    wrap(
        format!(
            "        set {var} to make new to do with properties {{{}}}",
            properties(&todo.title, todo.notes.as_deref())
        ),
        body,
        &format!("id of {var}"),
    )
}

/// Script creating a project with its initial to-dos; returns the new id.
pub fn add_project_script(project: &NewProject, today: NaiveDate) -> String {
    let var = "newProj";
    let mut body = schedule_lines(
        var,
        project.when.as_deref(),
        project.deadline.as_deref(),
        &project.tags,
        today,
    );
    body.extend(area_assignment_lines(
        var,
        project.area_id.as_deref(),
        project.area_title.as_deref(),
    ));
    for title in &project.todos {
        body.push(format!(
            "        make new to do with properties {{name:{}}} at beginning of to dos of {var}",
            escape(title)
        ));
    }

    wrap(
        format!(
            "        set {var} to make new project with properties {{{}}}",
            properties(&project.title, project.notes.as_deref())
        ),
        body,
        &format!("id of {var}"),
    )
}

pub fn update_todo_script(update: &TodoUpdate, today: NaiveDate) -> String {
    let var = "theTodo";
    let mut body = Vec::new();
    if let Some(title) = update.title.as_deref().filter(|t| !t.is_empty()) {
        body.push(format!("        set name of {var} to {}", escape(title)));
    }
    if let Some(notes) = update.notes.as_deref() {
        body.push(format!("        set notes of {var} to {}", escape(notes)));
    }
    body.extend(schedule_lines(
        var,
        update.when.as_deref(),
        update.deadline.as_deref(),
        &update.tags,
        today,
    ));
    body.extend(list_assignment_lines(
        var,
        update.list_id.as_deref(),
        update.list_title.as_deref(),
    ));
    body.extend(status_lines(var, update.completed, update.canceled));

    wrap(
        format!("        set {var} to to do id {}", escape(&update.id)),
        body,
        "\"OK\"",
    )
}

pub fn update_project_script(update: &ProjectUpdate, today: NaiveDate) -> String {
    let var = "theProj";
    let mut body = Vec::new();
    if let Some(title) = update.title.as_deref().filter(|t| !t.is_empty()) {
        body.push(format!("        set name of {var} to {}", escape(title)));
    }
    if let Some(notes) = update.notes.as_deref() {
        body.push(format!("        set notes of {var} to {}", escape(notes)));
    }
    body.extend(schedule_lines(
        var,
        update.when.as_deref(),
        update.deadline.as_deref(),
        &update.tags,
        today,
    ));
    body.extend(area_assignment_lines(
        var,
        update.area_id.as_deref(),
        update.area_title.as_deref(),
    ));
    body.extend(status_lines(var, update.completed, update.canceled));

    wrap(
        format!("        set {var} to project id {}", escape(&update.id)),
        body,
        "\"OK\"",
    )
}

/// Reveal an item of the given class (`to do` or `project`) and bring Things forward.
pub fn show_script(class: &str, id: &str) -> String {
    format!(
        "tell application \"Things3\"\n    show {class} id {}\n    activate\nend tell",
        escape(id)
    )
}

/// Runs scripts through `osascript`.
#[derive(Debug, Clone)]
pub struct OsascriptRunner {
    timeout: Duration,
}

impl OsascriptRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for OsascriptRunner {
    fn default() -> Self {
        Self::new(DEFAULT_SCRIPT_TIMEOUT)
    }
}

#[async_trait]
impl ScriptRunner for OsascriptRunner {
    async fn run(&self, script: &str) -> BridgeResult<String> {
        // The temporary file is removed when `file` drops.
        let mut file = tempfile::Builder::new()
            .prefix("things3-mcp-")
            .suffix(".applescript")
            .tempfile()?;
        file.write_all(script.as_bytes())?;
        file.flush()?;

        debug!(path = %file.path().display(), "Running AppleScript");
        let output = tokio::time::timeout(
            self.timeout,
            Command::new("osascript").arg(file.path()).kill_on_drop(true).output(),
        )
        .await
        .map_err(|_| BridgeError::Timeout(self.timeout.as_secs()))??;

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            error!(stderr = %stderr, "AppleScript error");
            return Err(BridgeError::ScriptFailed(stderr));
        }
        Ok(stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 16).unwrap()
    }

    #[test]
    fn test_escape_quotes() {
        assert_eq!(escape(""), "\"\"");
        assert_eq!(escape("plain"), "\"plain\"");
        assert_eq!(
            escape("say \"hi\""),
            "\"say \" & (ASCII character 34) & \"hi\" & (ASCII character 34) & \"\""
        );
    }

    #[test]
    fn test_escape_backslash() {
        assert_eq!(escape("x\\"), "\"x\\\\\"");
        assert_eq!(escape("a\\b"), "\"a\\\\b\"");
        // A backslash before a quote cannot swallow the closing delimiter.
        assert_eq!(
            escape("x\\\"; beep"),
            "\"x\\\\\" & (ASCII character 34) & \"; beep\""
        );
    }

    #[test]
    fn test_when_keywords() {
        assert_eq!(when_lines("t", "Today", today()), vec!["    move t to list \"Today\""]);
        assert_eq!(when_lines("t", "someday", today()), vec!["    move t to list \"Someday\""]);
        assert_eq!(when_lines("t", "evening", today()), vec!["    schedule t for \"evening\""]);
    }

    #[test]
    fn test_when_dates() {
        assert_eq!(
            when_lines("t", "2026-02-16", today()),
            vec!["    move t to list \"Today\""]
        );
        assert_eq!(
            when_lines("t", "2026-02-20", today()),
            vec!["    schedule t for (current date) + 4 * days"]
        );
        assert!(when_lines("t", "next week", today()).is_empty());
    }

    #[test]
    fn test_deadline_lines() {
        assert_eq!(
            deadline_lines("t", "2026-02-18", today()),
            vec!["    set due date of t to (current date) + 2 * days"]
        );
        assert!(deadline_lines("t", "soon", today()).is_empty());
    }

    #[test]
    fn test_status_lines() {
        assert_eq!(status_lines("t", Some(true), None), vec!["        set status of t to completed"]);
        assert_eq!(status_lines("t", None, Some(true)), vec!["        set status of t to canceled"]);
        // Reopening a cancellation is skipped when the same update completes it.
        assert_eq!(
            status_lines("t", Some(true), Some(false)),
            vec!["        set status of t to completed"]
        );
        assert!(status_lines("t", None, None).is_empty());
    }

    #[test]
    fn test_add_todo_script() {
        let todo = NewTodo {
            notes: Some("2% milk".into()),
            when: Some("today".into()),
            tags: vec!["errands".into()],
            list_title: Some("Home".into()),
            ..NewTodo::new("Buy \"good\" milk")
        };
        let script = add_todo_script(&todo, today());

        assert!(script.starts_with("tell application \"Things3\"\n    try\n"));
        assert!(script.contains(
            "set newTodo to make new to do with properties {name:\"Buy \" & (ASCII character 34) & \"good\" & (ASCII character 34) & \" milk\", notes:\"2% milk\"}"
        ));
        assert!(script.contains("move newTodo to list \"Today\""));
        assert!(script.contains("add newTag to tags of newTodo"));
        assert!(script.contains("set targetProject to first project whose name is \"Home\""));
        assert!(script.contains("return id of newTodo"));
        assert!(script.ends_with("    end try\nend tell"));
    }

    #[test]
    fn test_add_project_script_with_todos_and_area() {
        let project = NewProject {
            area_id: Some("AREA-1".into()),
            todos: vec!["First".into(), "Second".into()],
            ..NewProject::new("Garden")
        };
        let script = add_project_script(&project, today());

        assert!(script.contains("set targetArea to first area whose id is \"AREA-1\""));
        assert!(script.contains(
            "make new to do with properties {name:\"Second\"} at beginning of to dos of newProj"
        ));
        assert!(script.contains("return id of newProj"));
    }

    #[test]
    fn test_update_todo_script() {
        let update = TodoUpdate {
            notes: Some(String::new()),
            completed: Some(true),
            list_id: Some("PROJ-1".into()),
            ..TodoUpdate::new("TODO-1")
        };
        let script = update_todo_script(&update, today());

        assert!(script.contains("set theTodo to to do id \"TODO-1\""));
        assert!(script.contains("set notes of theTodo to \"\""));
        assert!(script.contains("first project whose id is \"PROJ-1\""));
        assert!(script.contains("set status of theTodo to completed"));
        assert!(script.contains("return \"OK\""));
    }

    #[test]
    fn test_update_project_script() {
        let update = ProjectUpdate {
            title: Some("Renamed".into()),
            canceled: Some(true),
            ..ProjectUpdate::new("PROJ-1")
        };
        let script = update_project_script(&update, today());

        assert!(script.contains("set theProj to project id \"PROJ-1\""));
        assert!(script.contains("set name of theProj to \"Renamed\""));
        assert!(script.contains("set status of theProj to canceled"));
    }

    #[test]
    fn test_show_script() {
        assert_eq!(
            show_script("project", "P1"),
            "tell application \"Things3\"\n    show project id \"P1\"\n    activate\nend tell"
        );
    }
}

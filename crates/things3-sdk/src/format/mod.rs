//! Token-efficient text rendering.
//!
//! Two modes: [`concise`] renders one line per item and omits empty fields,
//! [`detailed`] renders every populated field on its own line. Callers build
//! a [`Lookups`] once per request so project and area names resolve without
//! further queries.

pub mod concise;
pub mod detailed;
#[cfg(test)]
mod fixtures;

use std::collections::HashMap;

use chrono::NaiveDateTime;

use crate::models::{Area, Project, Task, TodoCounts, NOTES_TRUNCATE_CHARS, SHORT_UUID_LEN};

/// Name lookups for project and area ids.
#[derive(Debug, Clone, Default)]
pub struct Lookups {
    pub projects: HashMap<String, String>,
    pub areas: HashMap<String, String>,
}

impl Lookups {
    pub fn new(projects: &[Project], areas: &[Area]) -> Self {
        Self {
            projects: build_project_lookup(projects),
            areas: build_area_lookup(areas),
        }
    }

    pub fn project_title(&self, uuid: &str) -> Option<&str> {
        self.projects.get(uuid).map(String::as_str)
    }

    pub fn area_title(&self, uuid: &str) -> Option<&str> {
        self.areas.get(uuid).map(String::as_str)
    }
}

/// Project id → title, skipping untitled projects.
pub fn build_project_lookup(projects: &[Project]) -> HashMap<String, String> {
    projects
        .iter()
        .filter(|p| !p.uuid.is_empty() && !p.title.is_empty())
        .map(|p| (p.uuid.clone(), p.title.clone()))
        .collect()
}

/// Area id → title, skipping untitled areas.
pub fn build_area_lookup(areas: &[Area]) -> HashMap<String, String> {
    areas
        .iter()
        .filter(|a| !a.uuid.is_empty() && !a.title.is_empty())
        .map(|a| (a.uuid.clone(), a.title.clone()))
        .collect()
}

/// First [`SHORT_UUID_LEN`] characters of an id.
pub fn short_uuid(uuid: &str) -> &str {
    match uuid.char_indices().nth(SHORT_UUID_LEN) {
        Some((end, _)) => &uuid[..end],
        None => uuid,
    }
}

/// Cut `text` to `max` characters, appending `…` when anything was dropped.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((end, _)) => format!("{}…", &text[..end]),
        None => text.to_string(),
    }
}

pub(crate) fn truncate_notes(notes: &str) -> String {
    truncate_chars(notes, NOTES_TRUNCATE_CHARS)
}

pub(crate) fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn more_line(total: usize, shown: usize) -> String {
    format!("\n… {} more (use limit= to see more)", total - shown)
}

/// Render a list of to-dos, honouring `limit`.
pub fn todo_list(tasks: &[Task], concise: bool, limit: usize, lookups: &Lookups) -> String {
    let total = tasks.len();
    let shown = &tasks[..total.min(limit)];
    if shown.is_empty() {
        return "No items found.".to_string();
    }

    if !concise {
        let body = shown
            .iter()
            .map(|t| detailed::todo(t, lookups))
            .collect::<Vec<_>>()
            .join("\n---\n");
        return format!("Showing {}/{} items\n\n{}", shown.len(), total, body);
    }

    let mut out = shown
        .iter()
        .map(|t| concise::todo(t, lookups))
        .collect::<Vec<_>>()
        .join("\n");
    if total > shown.len() {
        out.push_str(&more_line(total, shown.len()));
    }
    out
}

/// Render a list of projects, honouring `limit`.
pub fn project_list(
    projects: &[Project],
    concise: bool,
    limit: usize,
    counts: Option<&HashMap<String, TodoCounts>>,
    lookups: &Lookups,
) -> String {
    let total = projects.len();
    let shown = &projects[..total.min(limit)];
    if shown.is_empty() {
        return "No projects found.".to_string();
    }

    if !concise {
        let body = shown
            .iter()
            .map(|p| detailed::project(p, lookups, &[]))
            .collect::<Vec<_>>()
            .join("\n---\n");
        return format!("Showing {}/{} projects\n\n{}", shown.len(), total, body);
    }

    let mut out = shown
        .iter()
        .map(|p| concise::project(p, counts))
        .collect::<Vec<_>>()
        .join("\n");
    if total > shown.len() {
        out.push_str(&more_line(total, shown.len()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_list_respects_limit() {
        let tasks = vec![todo_full(); 25];
        let out = todo_list(&tasks, true, 10, &lookups());
        let lines: Vec<_> = out.lines().filter(|l| !l.trim().is_empty()).collect();
        assert_eq!(lines.len(), 11);
        assert!(out.ends_with("… 15 more (use limit= to see more)"));
    }

    #[test]
    fn test_list_empty() {
        assert_eq!(todo_list(&[], true, 10, &Lookups::default()), "No items found.");
        assert_eq!(
            project_list(&[], true, 10, None, &Lookups::default()),
            "No projects found."
        );
    }

    #[test]
    fn test_list_under_limit_has_no_footer() {
        let tasks = vec![todo_full(); 3];
        assert!(!todo_list(&tasks, true, 10, &lookups()).contains("more"));
    }

    #[test]
    fn test_detailed_list_header_and_separator() {
        let tasks = vec![todo_full(), todo_minimal(), todo_full()];
        let out = todo_list(&tasks, false, 2, &lookups());
        assert!(out.starts_with("Showing 2/3 items\n\n"));
        assert_eq!(out.matches("\n---\n").count(), 1);
    }

    #[test]
    fn test_project_lookup_skips_untitled() {
        let projects = vec![
            Project::new("aaa", "Project A"),
            Project::new("bbb", "Project B"),
            Project::new("ccc", ""),
        ];
        let lookup = build_project_lookup(&projects);
        assert_eq!(lookup.len(), 2);
        assert_eq!(lookup["aaa"], "Project A");
        assert!(!lookup.contains_key("ccc"));
    }

    #[test]
    fn test_short_uuid_and_truncation() {
        assert_eq!(short_uuid("ABC12345-6789"), "ABC12345");
        assert_eq!(short_uuid("abc"), "abc");
        assert_eq!(truncate_chars("héllo wörld", 5), "héllo…");
        assert_eq!(truncate_chars("short", 10), "short");
    }
}

//! Multi-line rendering with every populated field.

use super::{format_timestamp, truncate_notes, Lookups};
use crate::models::{Area, Project, Status, Task, DETAIL_ITEM_CAP};

fn push_tags(lines: &mut Vec<String>, tags: &[String]) {
    if !tags.is_empty() {
        lines.push(format!("Tags: {}", tags.join(", ")));
    }
}

fn push_notes(lines: &mut Vec<String>, notes: Option<&str>) {
    if let Some(notes) = notes.filter(|n| !n.is_empty()) {
        lines.push(format!("Notes: {}", truncate_notes(notes)));
    }
}

fn push_capped<'a>(lines: &mut Vec<String>, titles: impl ExactSizeIterator<Item = (&'a str, &'a str)>) {
    let total = titles.len();
    for (icon, title) in titles.take(DETAIL_ITEM_CAP) {
        lines.push(format!("  {icon} {title}"));
    }
    if total > DETAIL_ITEM_CAP {
        lines.push(format!("  … and {} more", total - DETAIL_ITEM_CAP));
    }
}

pub fn todo(task: &Task, lookups: &Lookups) -> String {
    let mut lines = vec![
        format!("Title: {}", task.title),
        format!("UUID: {}", task.uuid),
        format!("Status: {}", task.status),
    ];

    if let Some(bucket) = task.start {
        lines.push(format!("Start: {bucket}"));
    }
    if let Some(date) = task.start_date {
        lines.push(format!("Scheduled: {date}"));
    }
    if let Some(deadline) = task.deadline {
        lines.push(format!("Deadline: {deadline}"));
    }
    if let Some(project) = task.project.as_deref() {
        let name = lookups.project_title(project).unwrap_or(project);
        lines.push(format!("Project: {name}"));
    }
    if let Some(area) = task.area.as_deref() {
        let name = lookups.area_title(area).unwrap_or(area);
        lines.push(format!("Area: {name}"));
    }
    push_tags(&mut lines, &task.tags);
    push_notes(&mut lines, task.notes.as_deref());

    if !task.checklist.is_empty() {
        lines.push("Checklist:".to_string());
        for item in &task.checklist {
            let check = if item.status == Status::Completed { "✓" } else { "□" };
            lines.push(format!("  {check} {}", item.title));
        }
    }

    if let Some(ts) = &task.stop_date {
        lines.push(format!("Completed: {}", format_timestamp(ts)));
    }
    if let Some(ts) = &task.created {
        lines.push(format!("Created: {}", format_timestamp(ts)));
    }
    if let Some(ts) = &task.modified {
        lines.push(format!("Modified: {}", format_timestamp(ts)));
    }

    lines.join("\n")
}

/// A project with up to [`DETAIL_ITEM_CAP`] of its to-dos.
pub fn project(project: &Project, lookups: &Lookups, items: &[Task]) -> String {
    let mut lines = vec![
        format!("Title: {}", project.title),
        format!("UUID: {}", project.uuid),
        format!("Status: {}", project.status),
    ];

    if let Some(bucket) = project.start {
        lines.push(format!("Start: {bucket}"));
    }
    if let Some(deadline) = project.deadline {
        lines.push(format!("Deadline: {deadline}"));
    }
    if let Some(area) = project.area.as_deref() {
        let name = lookups.area_title(area).unwrap_or(area);
        lines.push(format!("Area: {name}"));
    }
    push_tags(&mut lines, &project.tags);
    push_notes(&mut lines, project.notes.as_deref());

    if !items.is_empty() {
        lines.push(format!("Tasks ({}):", items.len()));
        push_capped(
            &mut lines,
            items.iter().map(|t| (t.status.icon(), t.title.as_str())),
        );
    }

    lines.join("\n")
}

/// An area with its projects and up to [`DETAIL_ITEM_CAP`] of its to-dos.
pub fn area(area: &Area, projects: &[Project], todos: &[Task]) -> String {
    let mut lines = vec![
        format!("Title: {}", area.title),
        format!("UUID: {}", area.uuid),
    ];
    push_tags(&mut lines, &area.tags);

    if !projects.is_empty() {
        lines.push(format!("Projects ({}):", projects.len()));
        for p in projects {
            lines.push(format!("  📋 {}", p.title));
        }
    }

    if !todos.is_empty() {
        lines.push(format!("Todos ({}):", todos.len()));
        push_capped(&mut lines, todos.iter().map(|t| ("□", t.title.as_str())));
    }

    lines.join("\n")
}

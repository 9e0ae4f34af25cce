//! One line per item; empty fields are left out entirely.

use std::collections::HashMap;

use super::{short_uuid, Lookups};
use crate::models::{Area, Bucket, Project, Tag, Task, TodoCounts};

fn hashtags(tags: &[String]) -> String {
    tags.iter()
        .map(|t| format!("#{t}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// `□ Title [short] | schedule | deadline:D | in:Project | #tag,#tag`
pub fn todo(task: &Task, lookups: &Lookups) -> String {
    let mut parts = vec![format!(
        "{} {} [{}]",
        task.status.icon(),
        task.title,
        short_uuid(&task.uuid)
    )];

    if let Some(date) = task.start_date {
        parts.push(date.to_string());
    } else if let Some(bucket) = task.start.filter(|b| *b != Bucket::Anytime) {
        parts.push(bucket.as_when().to_string());
    }

    if let Some(deadline) = task.deadline {
        parts.push(format!("deadline:{deadline}"));
    }

    if let Some(name) = task.project.as_deref().and_then(|p| lookups.project_title(p)) {
        parts.push(format!("in:{name}"));
    }

    if !task.tags.is_empty() {
        parts.push(hashtags(&task.tags));
    }

    parts.join(" | ")
}

/// `📋 Title [short] | schedule | open:N done:N | deadline:D | #tags`
pub fn project(project: &Project, counts: Option<&HashMap<String, TodoCounts>>) -> String {
    let mut parts = vec![format!("📋 {} [{}]", project.title, short_uuid(&project.uuid))];

    if let Some(bucket) = project.start.filter(|b| *b != Bucket::Anytime) {
        parts.push(bucket.as_when().to_string());
    }

    if let Some(c) = counts.and_then(|m| m.get(&project.uuid)) {
        parts.push(format!("open:{} done:{}", c.open, c.done));
    }

    if let Some(deadline) = project.deadline {
        parts.push(format!("deadline:{deadline}"));
    }

    if !project.tags.is_empty() {
        parts.push(hashtags(&project.tags));
    }

    parts.join(" | ")
}

pub fn area(area: &Area) -> String {
    format!("📁 {} [{}]", area.title, short_uuid(&area.uuid))
}

pub fn tag(tag: &Tag) -> String {
    let base = format!("#{} [{}]", tag.title, short_uuid(&tag.uuid));
    match tag.shortcut.as_deref() {
        Some(shortcut) => format!("{base} shortcut:{shortcut}"),
        None => base,
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures as fx;
    use super::*;

    #[test]
    fn test_todo_full_line() {
        let line = todo(&fx::todo_full(), &fx::lookups());
        assert_eq!(
            line,
            "□ Buy groceries [ABC12345] | 2026-02-16 | deadline:2026-02-20 | in:Home Renovation | #errands,#personal"
        );
    }

    #[test]
    fn test_todo_minimal_omits_empty_fields() {
        let line = todo(&fx::todo_minimal(), &Lookups::default());
        assert_eq!(line, "□ Simple task [MIN12345]");
    }

    #[test]
    fn test_todo_shows_bucket_unless_anytime() {
        let someday = fx::todo_minimal().with_start(Bucket::Someday);
        assert!(todo(&someday, &Lookups::default()).ends_with(" | someday"));

        let anytime = fx::todo_minimal().with_start(Bucket::Anytime);
        assert!(!todo(&anytime, &Lookups::default()).contains('|'));
    }

    #[test]
    fn test_completed_todo_icon() {
        let line = todo(&fx::todo_completed(), &Lookups::default());
        assert!(line.starts_with("✓ Filed taxes"));
    }

    #[test]
    fn test_project_with_counts() {
        let mut counts = HashMap::new();
        counts.insert(fx::PROJECT_ID.to_string(), TodoCounts { open: 5, done: 3 });

        assert_eq!(
            project(&fx::project(), Some(&counts)),
            "📋 Home Renovation [PROJ1234] | open:5 done:3 | deadline:2026-06-01 | #home"
        );
        assert!(!project(&fx::project(), None).contains("open:"));
    }

    #[test]
    fn test_area_and_tag() {
        assert_eq!(area(&fx::area()), "📁 Personal [AREA1234]");
        assert_eq!(tag(&fx::tag()), "#urgent [TAG12345] shortcut:u");
    }
}

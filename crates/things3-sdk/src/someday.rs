//! Someday reconciliation.
//!
//! The Things database reports a to-do under its own `start` value, usually
//! Anytime, even when it lives inside a project scheduled for Someday. The
//! Things UI shows such to-dos as Someday. This module builds a per-query
//! [`SomedayContext`] and uses it to drop those to-dos from the active views
//! and add them to the Someday view.
//!
//! A to-do filed under a heading carries only the heading reference, so
//! headings of Someday projects are resolved to their project as well.
//!
//! ```no_run
//! # async fn demo(db: &things3_sdk::store::ThingsDatabase) -> things3_sdk::store::StoreResult<()> {
//! use things3_sdk::models::Bucket;
//! use things3_sdk::someday;
//!
//! let today = someday::load_active_view(db, Bucket::Today).await?;
//! let someday = someday::load_someday_view(db).await?;
//! # Ok(()) }
//! ```

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::models::{Bucket, Task};
use crate::store::{SomedaySource, StoreResult};

/// Which projects are Someday-scheduled, and which headings belong to them.
///
/// Rebuilt for every logical query; never cached.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SomedayContext {
    someday_project_ids: HashSet<String>,
    heading_to_project: HashMap<String, String>,
}

impl SomedayContext {
    /// Build a context from its parts.
    ///
    /// Heading entries whose project is not in `someday_project_ids` are
    /// dropped, so every mapped project is always a Someday project.
    pub fn from_parts(
        someday_project_ids: HashSet<String>,
        mut heading_to_project: HashMap<String, String>,
    ) -> Self {
        heading_to_project.retain(|_, project| someday_project_ids.contains(project));
        Self {
            someday_project_ids,
            heading_to_project,
        }
    }

    pub fn someday_project_ids(&self) -> &HashSet<String> {
        &self.someday_project_ids
    }

    pub fn heading_to_project(&self) -> &HashMap<String, String> {
        &self.heading_to_project
    }

    /// True when no project is scheduled for Someday.
    pub fn is_empty(&self) -> bool {
        self.someday_project_ids.is_empty()
    }

    /// Whether `task` belongs to a Someday project, directly or via a heading.
    ///
    /// The heading is consulted only when the to-do has no project reference;
    /// a project reference always decides on its own.
    pub fn is_in_someday_project(&self, task: &Task) -> bool {
        if let Some(project) = task.project.as_deref() {
            if self.someday_project_ids.contains(project) {
                return true;
            }
        }
        match (task.project.as_deref(), task.heading.as_deref()) {
            (None, Some(heading)) => self.heading_to_project.contains_key(heading),
            _ => false,
        }
    }
}

/// Fetch the Someday projects and their headings.
///
/// Fetch failures propagate unchanged.
pub async fn build_context<S>(source: &S) -> StoreResult<SomedayContext>
where
    S: SomedaySource + ?Sized,
{
    let projects = source.list_projects_by_bucket(Bucket::Someday).await?;

    let mut someday_project_ids = HashSet::with_capacity(projects.len());
    let mut heading_to_project = HashMap::new();
    for project in projects {
        for heading in source.list_headings(&project.uuid).await? {
            heading_to_project.insert(heading.uuid, project.uuid.clone());
        }
        someday_project_ids.insert(project.uuid);
    }

    debug!(
        projects = someday_project_ids.len(),
        headings = heading_to_project.len(),
        "Built Someday context"
    );

    Ok(SomedayContext::from_parts(someday_project_ids, heading_to_project))
}

/// Free-function form of [`SomedayContext::is_in_someday_project`].
pub fn is_in_someday_project(task: &Task, context: &SomedayContext) -> bool {
    context.is_in_someday_project(task)
}

/// Drop to-dos that belong to a Someday project, keeping order.
///
/// Returns `tasks` untouched when the context has no Someday projects.
pub fn filter_non_someday(tasks: Vec<Task>, context: &SomedayContext) -> Vec<Task> {
    if context.is_empty() {
        return tasks;
    }
    tasks
        .into_iter()
        .filter(|task| !context.is_in_someday_project(task))
        .collect()
}

/// Append the `anytime_candidates` that belong to a Someday project and are not
/// already listed.
///
/// Existing entries keep their position; candidates are appended in encounter
/// order, each id at most once. Returns `someday_tasks` untouched when the
/// context has no Someday projects.
pub fn augment_with_inherited(
    mut someday_tasks: Vec<Task>,
    anytime_candidates: Vec<Task>,
    context: &SomedayContext,
) -> Vec<Task> {
    if context.is_empty() {
        return someday_tasks;
    }

    let mut seen: HashSet<String> = someday_tasks.iter().map(|t| t.uuid.clone()).collect();
    for task in anytime_candidates {
        if context.is_in_someday_project(&task) && seen.insert(task.uuid.clone()) {
            someday_tasks.push(task);
        }
    }
    someday_tasks
}

/// Today, Upcoming or Anytime as the Things UI shows them.
///
/// Inbox is returned as reported; it never holds project to-dos.
pub async fn load_active_view<S>(source: &S, bucket: Bucket) -> StoreResult<Vec<Task>>
where
    S: SomedaySource + ?Sized,
{
    let tasks = source.list_tasks_by_bucket(bucket).await?;
    if bucket == Bucket::Inbox || bucket == Bucket::Someday {
        return Ok(tasks);
    }
    let context = build_context(source).await?;
    Ok(filter_non_someday(tasks, &context))
}

/// The Someday list including to-dos inherited from Someday projects.
pub async fn load_someday_view<S>(source: &S) -> StoreResult<Vec<Task>>
where
    S: SomedaySource + ?Sized,
{
    let someday = source.list_tasks_by_bucket(Bucket::Someday).await?;
    let context = build_context(source).await?;
    if context.is_empty() {
        return Ok(someday);
    }
    let anytime = source.list_tasks_by_bucket(Bucket::Anytime).await?;
    Ok(augment_with_inherited(someday, anytime, &context))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Heading, Project};
    use crate::store::memory::InMemoryStore;

    fn context(projects: &[&str], headings: &[(&str, &str)]) -> SomedayContext {
        SomedayContext::from_parts(
            projects.iter().map(|p| p.to_string()).collect(),
            headings
                .iter()
                .map(|(h, p)| (h.to_string(), p.to_string()))
                .collect(),
        )
    }

    fn ids(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.uuid.as_str()).collect()
    }

    #[test]
    fn test_direct_project_membership_is_filtered() {
        let ctx = context(&["P1"], &[]);
        let tasks = vec![
            Task::new("t1", "Draft").in_project("P1"),
            Task::new("t2", "Ship").in_project("P2"),
            Task::new("t3", "Loose"),
        ];

        assert_eq!(ids(&filter_non_someday(tasks, &ctx)), vec!["t2", "t3"]);
    }

    #[test]
    fn test_heading_inherits_project_schedule() {
        let ctx = context(&["P1"], &[("H1", "P1")]);
        let tasks = vec![
            Task::new("t1", "Under heading").under_heading("H1"),
            Task::new("t2", "Other heading").under_heading("H9"),
        ];

        assert_eq!(ids(&filter_non_someday(tasks, &ctx)), vec!["t2"]);
    }

    #[test]
    fn test_augment_appends_inherited_without_duplicates() {
        let ctx = context(&["P1"], &[("H1", "P1")]);
        let someday = vec![Task::new("s1", "Already someday")];
        let anytime = vec![
            Task::new("a1", "In project").in_project("P1"),
            Task::new("a2", "Elsewhere").in_project("P2"),
            Task::new("s1", "Already someday").in_project("P1"),
            Task::new("a3", "Under heading").under_heading("H1"),
        ];

        let result = augment_with_inherited(someday, anytime, &ctx);
        assert_eq!(ids(&result), vec!["s1", "a1", "a3"]);
    }

    #[test]
    fn test_empty_context_is_identity() {
        let ctx = SomedayContext::default();
        let tasks = vec![
            Task::new("t1", "A").in_project("P1"),
            Task::new("t2", "B").under_heading("H1"),
        ];

        assert_eq!(filter_non_someday(tasks.clone(), &ctx), tasks);
        assert_eq!(
            augment_with_inherited(tasks.clone(), vec![Task::new("x", "X").in_project("P1")], &ctx),
            tasks
        );
    }

    #[test]
    fn test_project_reference_takes_precedence_over_heading() {
        // Heading H1 maps to Someday project P1, but the to-do names P2 directly.
        let ctx = context(&["P1"], &[("H1", "P1")]);
        let task = Task::new("t1", "Both refs").in_project("P2").under_heading("H1");

        assert!(!is_in_someday_project(&task, &ctx));
        assert_eq!(filter_non_someday(vec![task], &ctx).len(), 1);
    }

    #[test]
    fn test_filter_is_idempotent_and_order_preserving() {
        let ctx = context(&["P1"], &[("H1", "P1")]);
        let tasks: Vec<Task> = (0..10)
            .map(|i| {
                let task = Task::new(format!("t{i}"), format!("Task {i}"));
                match i % 3 {
                    0 => task.in_project("P1"),
                    1 => task.under_heading("H1"),
                    _ => task,
                }
            })
            .collect();

        let once = filter_non_someday(tasks, &ctx);
        let twice = filter_non_someday(once.clone(), &ctx);
        assert_eq!(once, twice);
        assert_eq!(ids(&once), vec!["t2", "t5", "t8"]);
    }

    #[test]
    fn test_from_parts_drops_headings_of_other_projects() {
        let ctx = context(&["P1"], &[("H1", "P1"), ("H2", "P2")]);
        assert_eq!(ctx.heading_to_project().len(), 1);
        assert!(ctx
            .heading_to_project()
            .values()
            .all(|p| ctx.someday_project_ids().contains(p)));
    }

    #[tokio::test]
    async fn test_build_context_maps_headings_of_someday_projects() {
        let store = InMemoryStore::new()
            .with_project(Project::new("P1", "Someday project").with_start(Bucket::Someday))
            .with_project(Project::new("P2", "Active project").with_start(Bucket::Anytime))
            .with_heading(Heading::new("H1", "Later", "P1"))
            .with_heading(Heading::new("H2", "Now", "P2"));

        let ctx = build_context(&store).await.unwrap();

        assert_eq!(ctx.someday_project_ids().len(), 1);
        assert!(ctx.someday_project_ids().contains("P1"));
        assert_eq!(ctx.heading_to_project().get("H1").map(String::as_str), Some("P1"));
        assert!(!ctx.heading_to_project().contains_key("H2"));
    }

    #[tokio::test]
    async fn test_build_context_on_empty_store() {
        let ctx = build_context(&InMemoryStore::new()).await.unwrap();
        assert!(ctx.is_empty());
        assert!(ctx.heading_to_project().is_empty());
    }

    #[tokio::test]
    async fn test_views_reconcile_against_store() {
        let store = InMemoryStore::new()
            .with_project(Project::new("P1", "Someday project").with_start(Bucket::Someday))
            .with_heading(Heading::new("H1", "Later", "P1"))
            .with_task(Task::new("s1", "Real someday").with_start(Bucket::Someday))
            .with_task(Task::new("a1", "Inherited").with_start(Bucket::Anytime).in_project("P1"))
            .with_task(Task::new("a2", "Via heading").with_start(Bucket::Anytime).under_heading("H1"))
            .with_task(Task::new("a3", "Plain anytime").with_start(Bucket::Anytime));

        let anytime = load_active_view(&store, Bucket::Anytime).await.unwrap();
        assert_eq!(ids(&anytime), vec!["a3"]);

        let someday = load_someday_view(&store).await.unwrap();
        assert_eq!(ids(&someday), vec!["s1", "a1", "a2"]);
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates() {
        let store = InMemoryStore::new().failing();
        assert!(build_context(&store).await.is_err());
    }
}

//! Fixture store for tests.
//!
//! Buckets are taken literally from each record's `start` field, so a test
//! controls exactly what the "database" reports.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Duration, Utc};

use super::{SomedaySource, StoreError, StoreResult, TaskStore, TodoFilter};
use crate::dates::period_start;
use crate::models::{
    Area, Bucket, ChecklistItem, Heading, Item, Project, Status, Tag, Task, TodoCounts,
};

#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tasks: Vec<Task>,
    trashed: Vec<Task>,
    projects: Vec<Project>,
    headings: Vec<Heading>,
    areas: Vec<Area>,
    tags: Vec<Tag>,
    auth_token: Option<String>,
    fail: bool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_task(mut self, task: Task) -> Self {
        self.tasks.push(task);
        self
    }

    pub fn with_trashed(mut self, task: Task) -> Self {
        self.trashed.push(task);
        self
    }

    pub fn with_project(mut self, project: Project) -> Self {
        self.projects.push(project);
        self
    }

    pub fn with_heading(mut self, heading: Heading) -> Self {
        self.headings.push(heading);
        self
    }

    pub fn with_area(mut self, area: Area) -> Self {
        self.areas.push(area);
        self
    }

    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Every query fails, as if the database were missing.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    fn check(&self) -> StoreResult<()> {
        if self.fail {
            return Err(StoreError::DatabaseNotFound(
                "in-memory store set to fail".to_string(),
            ));
        }
        Ok(())
    }

    /// Project a to-do belongs to, directly or through its heading.
    fn owning_project<'a>(&'a self, task: &'a Task) -> Option<&'a str> {
        task.project.as_deref().or_else(|| {
            let heading = task.heading.as_deref()?;
            self.headings
                .iter()
                .find(|h| h.uuid == heading)
                .map(|h| h.project.as_str())
        })
    }

    fn open_tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks
            .iter()
            .filter(|t| t.status == Status::Incomplete)
    }
}

#[async_trait]
impl SomedaySource for InMemoryStore {
    async fn list_projects_by_bucket(&self, bucket: Bucket) -> StoreResult<Vec<Project>> {
        self.check()?;
        Ok(self
            .projects
            .iter()
            .filter(|p| p.status == Status::Incomplete && p.start == Some(bucket))
            .cloned()
            .collect())
    }

    async fn list_headings(&self, project_id: &str) -> StoreResult<Vec<Heading>> {
        self.check()?;
        Ok(self
            .headings
            .iter()
            .filter(|h| h.project == project_id)
            .cloned()
            .collect())
    }

    async fn list_tasks_by_bucket(&self, bucket: Bucket) -> StoreResult<Vec<Task>> {
        self.check()?;
        Ok(self
            .open_tasks()
            .filter(|t| t.start == Some(bucket))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TaskStore for InMemoryStore {
    async fn projects(&self) -> StoreResult<Vec<Project>> {
        self.check()?;
        Ok(self
            .projects
            .iter()
            .filter(|p| p.status == Status::Incomplete)
            .cloned()
            .collect())
    }

    async fn areas(&self) -> StoreResult<Vec<Area>> {
        self.check()?;
        Ok(self.areas.clone())
    }

    async fn tags(&self) -> StoreResult<Vec<Tag>> {
        self.check()?;
        Ok(self.tags.clone())
    }

    async fn todos(&self, filter: &TodoFilter) -> StoreResult<Vec<Task>> {
        self.check()?;
        let status = filter.effective_status();
        let created_after = filter
            .created_within
            .map(|period| period_start(Utc::now(), period))
            .transpose()?
            .map(|dt| dt.naive_utc());

        Ok(self
            .tasks
            .iter()
            .filter(|t| t.status == status)
            .filter(|t| match &filter.project {
                Some(project) => self.owning_project(t) == Some(project.as_str()),
                None => true,
            })
            .filter(|t| match &filter.tag {
                Some(tag) => t.tags.iter().any(|x| x == tag),
                None => true,
            })
            .filter(|t| match &filter.area {
                Some(area) => t.area.as_deref() == Some(area.as_str()),
                None => true,
            })
            .filter(|t| match (&filter.start_date, t.start_date) {
                (Some(f), Some(d)) => f.matches(d),
                (Some(_), None) => false,
                (None, _) => true,
            })
            .filter(|t| match (&filter.deadline, t.deadline) {
                (Some(f), Some(d)) => f.matches(d),
                (Some(_), None) => false,
                (None, _) => true,
            })
            .filter(|t| match (created_after, t.created) {
                (Some(after), Some(created)) => created >= after,
                (Some(_), None) => false,
                (None, _) => true,
            })
            .cloned()
            .collect())
    }

    async fn search(&self, query: &str) -> StoreResult<Vec<Task>> {
        self.check()?;
        let needle = query.to_lowercase();
        Ok(self
            .open_tasks()
            .filter(|t| {
                t.title.to_lowercase().contains(&needle)
                    || t
                        .notes
                        .as_deref()
                        .is_some_and(|n| n.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect())
    }

    async fn get(&self, uuid: &str) -> StoreResult<Option<Item>> {
        self.check()?;
        if let Some(task) = self.tasks.iter().chain(&self.trashed).find(|t| t.uuid == uuid) {
            return Ok(Some(Item::Task(task.clone())));
        }
        if let Some(project) = self.projects.iter().find(|p| p.uuid == uuid) {
            return Ok(Some(Item::Project(project.clone())));
        }
        Ok(self
            .areas
            .iter()
            .find(|a| a.uuid == uuid)
            .cloned()
            .map(Item::Area))
    }

    async fn deadlines(&self) -> StoreResult<Vec<Task>> {
        self.check()?;
        let mut tasks: Vec<Task> = self
            .open_tasks()
            .filter(|t| t.deadline.is_some())
            .cloned()
            .collect();
        tasks.sort_by_key(|t| t.deadline);
        Ok(tasks)
    }

    async fn logbook(&self, period: Duration) -> StoreResult<Vec<Task>> {
        self.check()?;
        let after = period_start(Utc::now(), period)?.naive_utc();
        let mut tasks: Vec<Task> = self
            .tasks
            .iter()
            .filter(|t| t.status != Status::Incomplete)
            .filter(|t| t.stop_date.is_some_and(|d| d >= after))
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.stop_date.cmp(&a.stop_date));
        Ok(tasks)
    }

    async fn trash(&self) -> StoreResult<Vec<Task>> {
        self.check()?;
        Ok(self.trashed.clone())
    }

    async fn checklist(&self, task_id: &str) -> StoreResult<Vec<ChecklistItem>> {
        self.check()?;
        Ok(self
            .tasks
            .iter()
            .find(|t| t.uuid == task_id)
            .map(|t| t.checklist.clone())
            .unwrap_or_default())
    }

    async fn todo_counts(&self) -> StoreResult<HashMap<String, TodoCounts>> {
        self.check()?;
        let mut counts: HashMap<String, TodoCounts> = HashMap::new();
        for task in &self.tasks {
            let Some(project) = self.owning_project(task) else {
                continue;
            };
            let entry = counts.entry(project.to_string()).or_default();
            match task.status {
                Status::Incomplete => entry.open += 1,
                Status::Completed => entry.done += 1,
                Status::Canceled => {}
            }
        }
        Ok(counts)
    }

    async fn auth_token(&self) -> StoreResult<Option<String>> {
        self.check()?;
        Ok(self.auth_token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_project_filter_follows_headings() {
        let store = InMemoryStore::new()
            .with_heading(Heading::new("H1", "Phase 1", "P1"))
            .with_task(Task::new("t1", "Direct").in_project("P1"))
            .with_task(Task::new("t2", "Under heading").under_heading("H1"))
            .with_task(Task::new("t3", "Elsewhere").in_project("P2"));

        let tasks = store.todos(&TodoFilter::for_project("P1")).await.unwrap();
        let ids: Vec<_> = tasks.iter().map(|t| t.uuid.as_str()).collect();
        assert_eq!(ids, vec!["t1", "t2"]);
    }

    #[tokio::test]
    async fn test_todo_counts() {
        let mut done = Task::new("t2", "Done").in_project("P1");
        done.status = Status::Completed;
        let store = InMemoryStore::new()
            .with_task(Task::new("t1", "Open").in_project("P1"))
            .with_task(done);

        let counts = store.todo_counts().await.unwrap();
        assert_eq!(counts["P1"], TodoCounts { open: 1, done: 1 });
    }

    #[tokio::test]
    async fn test_failing_store() {
        let store = InMemoryStore::new().failing();
        let err = store.projects().await.unwrap_err();
        assert!(err.is_unavailable());
    }
}

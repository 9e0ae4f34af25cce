//! Read access to Things 3 data.
//!
//! [`SomedaySource`] is the narrow surface the Someday reconciler needs;
//! [`TaskStore`] extends it with everything the read tools query. The
//! production implementation is [`ThingsDatabase`]; tests use
//! [`memory::InMemoryStore`].

pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
pub mod sqlite;

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Duration;

use crate::dates::DateFilter;
use crate::models::{Area, Bucket, ChecklistItem, Heading, Item, Project, Status, Tag, Task, TodoCounts};

pub use error::{StoreError, StoreResult};
pub use sqlite::ThingsDatabase;

/// The three fetches the Someday reconciler depends on.
#[async_trait]
pub trait SomedaySource: Send + Sync {
    /// Active projects scheduled in `bucket`.
    async fn list_projects_by_bucket(&self, bucket: Bucket) -> StoreResult<Vec<Project>>;

    /// Headings of one project.
    async fn list_headings(&self, project_id: &str) -> StoreResult<Vec<Heading>>;

    /// Open to-dos the database reports in `bucket`.
    async fn list_tasks_by_bucket(&self, bucket: Bucket) -> StoreResult<Vec<Task>>;
}

/// Filter for [`TaskStore::todos`]. All set fields are AND-combined.
#[derive(Debug, Clone, Default)]
pub struct TodoFilter {
    pub project: Option<String>,
    pub tag: Option<String>,
    pub area: Option<String>,
    /// Defaults to [`Status::Incomplete`] when unset.
    pub status: Option<Status>,
    pub start_date: Option<DateFilter>,
    pub deadline: Option<DateFilter>,
    /// Only items created within this period before now.
    pub created_within: Option<Duration>,
}

impl TodoFilter {
    pub fn for_project(project: impl Into<String>) -> Self {
        Self {
            project: Some(project.into()),
            ..Self::default()
        }
    }

    pub fn for_tag(tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
            ..Self::default()
        }
    }

    pub fn effective_status(&self) -> Status {
        self.status.unwrap_or(Status::Incomplete)
    }
}

/// Full read surface used by the MCP tools.
#[async_trait]
pub trait TaskStore: SomedaySource + std::fmt::Debug {
    /// All active (open, untrashed) projects.
    async fn projects(&self) -> StoreResult<Vec<Project>>;

    async fn areas(&self) -> StoreResult<Vec<Area>>;

    async fn tags(&self) -> StoreResult<Vec<Tag>>;

    /// To-dos matching `filter`, in Things list order.
    async fn todos(&self, filter: &TodoFilter) -> StoreResult<Vec<Task>>;

    /// Open to-dos whose title or notes contain `query`.
    async fn search(&self, query: &str) -> StoreResult<Vec<Task>>;

    /// Any to-do, project, or area by id.
    async fn get(&self, uuid: &str) -> StoreResult<Option<Item>>;

    /// Open to-dos with a deadline, soonest first.
    async fn deadlines(&self) -> StoreResult<Vec<Task>>;

    /// To-dos completed within `period` before now, most recent first.
    async fn logbook(&self, period: Duration) -> StoreResult<Vec<Task>>;

    /// Trashed to-dos.
    async fn trash(&self) -> StoreResult<Vec<Task>>;

    async fn checklist(&self, task_id: &str) -> StoreResult<Vec<ChecklistItem>>;

    /// Open / done to-do counts keyed by project id.
    async fn todo_counts(&self) -> StoreResult<HashMap<String, TodoCounts>>;

    /// URL-scheme authorization token from the Things settings, if enabled.
    async fn auth_token(&self) -> StoreResult<Option<String>>;
}

//! # Things Database
//!
//! Read-only access to the Things 3 `main.sqlite` database.
//!
//! Things keeps to-dos, projects and headings in a single `TMTask` table,
//! distinguished by `type` (0 to-do, 1 project, 2 heading). The schedule lives
//! in `start` (0 Inbox, 1 Anytime, 2 Someday) combined with the packed
//! `startDate`; Today and Upcoming are derived from the date.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{Duration, Local, NaiveDate, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite};
use tracing::{debug, info};

use super::{SomedaySource, StoreError, StoreResult, TaskStore, TodoFilter};
use crate::dates::{pack_date, period_start, timestamp_to_datetime, unpack_date, DateFilter};
use crate::models::{
    Area, Bucket, ChecklistItem, Heading, Item, Project, Status, Tag, Task, TodoCounts,
};

const GROUP_CONTAINER: &str = "Library/Group Containers/JLMPQHK86H.com.culturedcode.ThingsMac";
const DATABASE_FILE: &str = "Things Database.thingsdatabase/main.sqlite";

/// Separator used when concatenating tag titles in SQL.
const TAG_SEPARATOR: char = '\u{1f}';

const TASK_COLUMNS: &str = r#"
    T.uuid AS uuid,
    T.title AS title,
    T.status AS status,
    T.start AS start,
    T.startDate AS start_date,
    T.deadline AS deadline,
    T.notes AS notes,
    T.project AS project,
    T.heading AS heading,
    T.area AS area,
    CAST(T.stopDate AS REAL) AS stop_date,
    CAST(T.creationDate AS REAL) AS created,
    CAST(T.userModificationDate AS REAL) AS modified,
    (SELECT group_concat(TG.title, char(31))
       FROM TMTaskTag TT JOIN TMTag TG ON TG.uuid = TT.tags
      WHERE TT.tasks = T.uuid) AS tags
"#;

const TASK_FROM: &str = r#"
    FROM TMTask T
    LEFT JOIN TMTask P ON P.uuid = T.project
    LEFT JOIN TMTask H ON H.uuid = T.heading
    LEFT JOIN TMTask HP ON HP.uuid = H.project
"#;

/// Untrashed to-dos whose project (direct or via heading) is not trashed.
const LIVE_TASK: &str = r#"
    T.type = 0 AND T.trashed = 0
    AND (P.uuid IS NULL OR P.trashed = 0)
    AND (H.uuid IS NULL OR H.trashed = 0)
    AND (HP.uuid IS NULL OR HP.trashed = 0)
"#;

/// Owning project still open.
const OPEN_PROJECT: &str = r#"
    AND (P.uuid IS NULL OR P.status = 0)
    AND (HP.uuid IS NULL OR HP.status = 0)
"#;

const PROJECT_COLUMNS: &str = r#"
    T.uuid AS uuid,
    T.title AS title,
    T.status AS status,
    T.start AS start,
    T.startDate AS start_date,
    T.deadline AS deadline,
    T.notes AS notes,
    T.area AS area,
    (SELECT group_concat(TG.title, char(31))
       FROM TMTaskTag TT JOIN TMTag TG ON TG.uuid = TT.tags
      WHERE TT.tasks = T.uuid) AS tags
"#;

/// Locate the Things database.
///
/// An explicit path wins; otherwise the first `ThingsData-*` directory under
/// the Things group container in `$HOME` is used.
pub fn resolve_database_path(explicit: Option<&Path>) -> StoreResult<PathBuf> {
    if let Some(path) = explicit {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        return Err(StoreError::DatabaseNotFound(path.display().to_string()));
    }

    let home = std::env::var_os("HOME")
        .map(PathBuf::from)
        .ok_or_else(|| StoreError::DatabaseNotFound("HOME is not set".to_string()))?;
    let container = home.join(GROUP_CONTAINER);

    let mut data_dirs: Vec<PathBuf> = std::fs::read_dir(&container)
        .map_err(|_| StoreError::DatabaseNotFound(container.display().to_string()))?
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_string_lossy().starts_with("ThingsData-"))
        .map(|entry| entry.path())
        .collect();
    data_dirs.sort();

    data_dirs
        .into_iter()
        .map(|dir| dir.join(DATABASE_FILE))
        .find(|path| path.exists())
        .ok_or_else(|| {
            StoreError::DatabaseNotFound(format!(
                "no ThingsData-*/{} under {}",
                DATABASE_FILE,
                container.display()
            ))
        })
}

fn status_code(status: Status) -> i64 {
    match status {
        Status::Incomplete => 0,
        Status::Canceled => 2,
        Status::Completed => 3,
    }
}

fn status_from_code(code: i64) -> Status {
    match code {
        2 => Status::Canceled,
        3 => Status::Completed,
        _ => Status::Incomplete,
    }
}

/// Bucket Things displays for a `start` value and start date.
fn bucket_for(start: i64, start_date: Option<NaiveDate>, today: NaiveDate) -> Option<Bucket> {
    match (start, start_date) {
        (0, _) => Some(Bucket::Inbox),
        (1 | 2, Some(date)) if date <= today => Some(Bucket::Today),
        (2, Some(_)) => Some(Bucket::Upcoming),
        (1, _) => Some(Bucket::Anytime),
        (2, None) => Some(Bucket::Someday),
        _ => None,
    }
}

/// Append the `start` / `startDate` condition selecting `bucket` on alias `T`.
fn push_bucket_clause(qb: &mut QueryBuilder<'_, Sqlite>, bucket: Bucket, today: NaiveDate) {
    match bucket {
        Bucket::Inbox => {
            qb.push(" AND T.start = 0");
        }
        Bucket::Anytime => {
            qb.push(" AND T.start = 1");
        }
        Bucket::Someday => {
            qb.push(" AND T.start = 2 AND T.startDate IS NULL");
        }
        Bucket::Today => {
            qb.push(" AND T.start IN (1, 2) AND T.startDate IS NOT NULL AND T.startDate <= ")
                .push_bind(pack_date(today));
        }
        Bucket::Upcoming => {
            qb.push(" AND T.start = 2 AND T.startDate > ")
                .push_bind(pack_date(today));
        }
    }
}

fn bucket_order(bucket: Bucket) -> &'static str {
    match bucket {
        Bucket::Today => " ORDER BY T.todayIndex, T.\"index\"",
        Bucket::Upcoming => " ORDER BY T.startDate, T.\"index\"",
        _ => " ORDER BY T.\"index\"",
    }
}

fn push_date_filter(qb: &mut QueryBuilder<'_, Sqlite>, column: &str, filter: &DateFilter) {
    qb.push(format!(" AND {column} IS NOT NULL AND {column} {} ", filter.op.as_sql()))
        .push_bind(pack_date(filter.date));
}

fn split_tags(tags: Option<String>) -> Vec<String> {
    tags.map(|joined| {
        joined
            .split(TAG_SEPARATOR)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[derive(Debug, sqlx::FromRow)]
struct TaskRow {
    uuid: String,
    title: Option<String>,
    status: i64,
    start: i64,
    start_date: Option<i64>,
    deadline: Option<i64>,
    notes: Option<String>,
    project: Option<String>,
    heading: Option<String>,
    area: Option<String>,
    stop_date: Option<f64>,
    created: Option<f64>,
    modified: Option<f64>,
    tags: Option<String>,
}

impl TaskRow {
    fn into_task(self, today: NaiveDate) -> Task {
        let start_date = self.start_date.and_then(unpack_date);
        Task {
            uuid: self.uuid,
            title: self.title.unwrap_or_default(),
            status: status_from_code(self.status),
            start: bucket_for(self.start, start_date, today),
            start_date,
            deadline: self.deadline.and_then(unpack_date),
            tags: split_tags(self.tags),
            notes: non_empty(self.notes),
            project: non_empty(self.project),
            heading: non_empty(self.heading),
            area: non_empty(self.area),
            checklist: Vec::new(),
            stop_date: self.stop_date.and_then(timestamp_to_datetime),
            created: self.created.and_then(timestamp_to_datetime),
            modified: self.modified.and_then(timestamp_to_datetime),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProjectRow {
    uuid: String,
    title: Option<String>,
    status: i64,
    start: i64,
    start_date: Option<i64>,
    deadline: Option<i64>,
    notes: Option<String>,
    area: Option<String>,
    tags: Option<String>,
}

impl ProjectRow {
    fn into_project(self, today: NaiveDate) -> Project {
        let start_date = self.start_date.and_then(unpack_date);
        Project {
            uuid: self.uuid,
            title: self.title.unwrap_or_default(),
            status: status_from_code(self.status),
            start: bucket_for(self.start, start_date, today),
            start_date,
            deadline: self.deadline.and_then(unpack_date),
            tags: split_tags(self.tags),
            notes: non_empty(self.notes),
            area: non_empty(self.area),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AreaRow {
    uuid: String,
    title: Option<String>,
    tags: Option<String>,
}

/// Read-only handle on the Things database.
#[derive(Debug, Clone)]
pub struct ThingsDatabase {
    pool: SqlitePool,
    today: Option<NaiveDate>,
}

impl ThingsDatabase {
    /// Open the database at `path`, or at the default Things location.
    pub async fn open(path: Option<&Path>) -> StoreResult<Self> {
        let path = resolve_database_path(path)?;
        let options = SqliteConnectOptions::new()
            .filename(&path)
            .read_only(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|source| StoreError::Open {
                path: path.clone(),
                source,
            })?;

        info!(path = %path.display(), "Opened Things database");
        Ok(Self::from_pool(pool))
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool, today: None }
    }

    /// Pin the date used to derive Today and Upcoming.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    fn task_query(&self) -> QueryBuilder<'static, Sqlite> {
        QueryBuilder::new(format!("SELECT {TASK_COLUMNS} {TASK_FROM} WHERE {LIVE_TASK}"))
    }

    async fn fetch_tasks(&self, mut qb: QueryBuilder<'_, Sqlite>) -> StoreResult<Vec<Task>> {
        let today = self.today();
        let rows: Vec<TaskRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(|row| row.into_task(today)).collect())
    }
}

#[async_trait]
impl SomedaySource for ThingsDatabase {
    async fn list_projects_by_bucket(&self, bucket: Bucket) -> StoreResult<Vec<Project>> {
        let today = self.today();
        let mut qb = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {PROJECT_COLUMNS} FROM TMTask T WHERE T.type = 1 AND T.trashed = 0 AND T.status = 0"
        ));
        if bucket == Bucket::Someday {
            // A Someday project stays Someday even when it carries a start date.
            qb.push(" AND T.start = 2");
        } else {
            push_bucket_clause(&mut qb, bucket, today);
        }
        qb.push(bucket_order(bucket));

        let rows: Vec<ProjectRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        debug!(bucket = %bucket, count = rows.len(), "Fetched projects by bucket");
        Ok(rows.into_iter().map(|row| row.into_project(today)).collect())
    }

    async fn list_headings(&self, project_id: &str) -> StoreResult<Vec<Heading>> {
        let rows: Vec<(String, Option<String>, Option<String>)> = sqlx::query_as(
            r#"SELECT uuid, title, project FROM TMTask
               WHERE type = 2 AND trashed = 0 AND project = ?
               ORDER BY "index""#,
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(uuid, title, project)| {
                Some(Heading::new(uuid, title.unwrap_or_default(), project?))
            })
            .collect())
    }

    async fn list_tasks_by_bucket(&self, bucket: Bucket) -> StoreResult<Vec<Task>> {
        let mut qb = self.task_query();
        qb.push(OPEN_PROJECT).push(" AND T.status = 0");
        push_bucket_clause(&mut qb, bucket, self.today());
        qb.push(bucket_order(bucket));

        let tasks = self.fetch_tasks(qb).await?;
        debug!(bucket = %bucket, count = tasks.len(), "Fetched tasks by bucket");
        Ok(tasks)
    }
}

#[async_trait]
impl TaskStore for ThingsDatabase {
    async fn projects(&self) -> StoreResult<Vec<Project>> {
        let today = self.today();
        let rows: Vec<ProjectRow> = sqlx::query_as(&format!(
            "SELECT {PROJECT_COLUMNS} FROM TMTask T
             WHERE T.type = 1 AND T.trashed = 0 AND T.status = 0
             ORDER BY T.\"index\""
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|row| row.into_project(today)).collect())
    }

    async fn areas(&self) -> StoreResult<Vec<Area>> {
        let rows: Vec<AreaRow> = sqlx::query_as(
            r#"SELECT A.uuid AS uuid, A.title AS title,
                      (SELECT group_concat(TG.title, char(31))
                         FROM TMAreaTag AT JOIN TMTag TG ON TG.uuid = AT.tags
                        WHERE AT.areas = A.uuid) AS tags
               FROM TMArea A
               ORDER BY A."index""#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| Area {
                uuid: row.uuid,
                title: row.title.unwrap_or_default(),
                tags: split_tags(row.tags),
            })
            .collect())
    }

    async fn tags(&self) -> StoreResult<Vec<Tag>> {
        let rows: Vec<(String, Option<String>, Option<String>)> =
            sqlx::query_as(r#"SELECT uuid, title, shortcut FROM TMTag ORDER BY "index""#)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows
            .into_iter()
            .map(|(uuid, title, shortcut)| Tag {
                uuid,
                title: title.unwrap_or_default(),
                shortcut: non_empty(shortcut),
            })
            .collect())
    }

    async fn todos(&self, filter: &TodoFilter) -> StoreResult<Vec<Task>> {
        let status = filter.effective_status();
        let mut qb = self.task_query();
        if status == Status::Incomplete {
            qb.push(OPEN_PROJECT);
        }
        qb.push(" AND T.status = ").push_bind(status_code(status));

        if let Some(project) = &filter.project {
            qb.push(" AND (T.project = ")
                .push_bind(project.clone())
                .push(" OR H.project = ")
                .push_bind(project.clone())
                .push(")");
        }
        if let Some(tag) = &filter.tag {
            qb.push(
                " AND EXISTS (SELECT 1 FROM TMTaskTag TT JOIN TMTag TG ON TG.uuid = TT.tags \
                 WHERE TT.tasks = T.uuid AND TG.title = ",
            )
            .push_bind(tag.clone())
            .push(")");
        }
        if let Some(area) = &filter.area {
            qb.push(" AND (T.area = ")
                .push_bind(area.clone())
                .push(" OR P.area = ")
                .push_bind(area.clone())
                .push(")");
        }
        if let Some(start_date) = &filter.start_date {
            push_date_filter(&mut qb, "T.startDate", start_date);
        }
        if let Some(deadline) = &filter.deadline {
            push_date_filter(&mut qb, "T.deadline", deadline);
        }
        if let Some(period) = filter.created_within {
            let after = period_start(Utc::now(), period)?.timestamp() as f64;
            qb.push(" AND T.creationDate >= ").push_bind(after);
        }
        qb.push(" ORDER BY T.\"index\"");

        self.fetch_tasks(qb).await
    }

    async fn search(&self, query: &str) -> StoreResult<Vec<Task>> {
        let pattern = escape_like(query);
        let mut qb = self.task_query();
        qb.push(OPEN_PROJECT)
            .push(" AND T.status = 0 AND (T.title LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR T.notes LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\') ORDER BY T.\"index\"");
        self.fetch_tasks(qb).await
    }

    async fn get(&self, uuid: &str) -> StoreResult<Option<Item>> {
        let today = self.today();

        let task: Option<TaskRow> = sqlx::query_as(&format!(
            "SELECT {TASK_COLUMNS} FROM TMTask T WHERE T.type = 0 AND T.uuid = ?"
        ))
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await?;
        if let Some(row) = task {
            let mut task = row.into_task(today);
            task.checklist = self.checklist(uuid).await?;
            return Ok(Some(Item::Task(task)));
        }

        let project: Option<ProjectRow> = sqlx::query_as(&format!(
            "SELECT {PROJECT_COLUMNS} FROM TMTask T WHERE T.type = 1 AND T.uuid = ?"
        ))
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await?;
        if let Some(row) = project {
            return Ok(Some(Item::Project(row.into_project(today))));
        }

        let area: Option<AreaRow> = sqlx::query_as(
            r#"SELECT A.uuid AS uuid, A.title AS title,
                      (SELECT group_concat(TG.title, char(31))
                         FROM TMAreaTag AT JOIN TMTag TG ON TG.uuid = AT.tags
                        WHERE AT.areas = A.uuid) AS tags
               FROM TMArea A WHERE A.uuid = ?"#,
        )
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await?;

        Ok(area.map(|row| {
            Item::Area(Area {
                uuid: row.uuid,
                title: row.title.unwrap_or_default(),
                tags: split_tags(row.tags),
            })
        }))
    }

    async fn deadlines(&self) -> StoreResult<Vec<Task>> {
        let mut qb = self.task_query();
        qb.push(OPEN_PROJECT)
            .push(" AND T.status = 0 AND T.deadline IS NOT NULL ORDER BY T.deadline, T.\"index\"");
        self.fetch_tasks(qb).await
    }

    async fn logbook(&self, period: Duration) -> StoreResult<Vec<Task>> {
        let after = period_start(Utc::now(), period)?.timestamp() as f64;
        let mut qb = self.task_query();
        qb.push(" AND T.status IN (2, 3) AND T.stopDate >= ")
            .push_bind(after)
            .push(" ORDER BY T.stopDate DESC");
        self.fetch_tasks(qb).await
    }

    async fn trash(&self) -> StoreResult<Vec<Task>> {
        let today = self.today();
        let rows: Vec<TaskRow> = sqlx::query_as(&format!(
            "SELECT {TASK_COLUMNS} FROM TMTask T WHERE T.type = 0 AND T.trashed = 1 ORDER BY T.\"index\""
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|row| row.into_task(today)).collect())
    }

    async fn checklist(&self, task_id: &str) -> StoreResult<Vec<ChecklistItem>> {
        let rows: Vec<(Option<String>, i64)> = sqlx::query_as(
            r#"SELECT title, status FROM TMChecklistItem WHERE task = ? ORDER BY "index""#,
        )
        .bind(task_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(title, status)| ChecklistItem {
                title: title.unwrap_or_default(),
                status: status_from_code(status),
            })
            .collect())
    }

    async fn todo_counts(&self) -> StoreResult<HashMap<String, TodoCounts>> {
        let rows: Vec<(String, i64, i64)> = sqlx::query_as(
            r#"SELECT COALESCE(T.project, H.project) AS project,
                      SUM(CASE WHEN T.status = 0 THEN 1 ELSE 0 END) AS open,
                      SUM(CASE WHEN T.status = 3 THEN 1 ELSE 0 END) AS done
               FROM TMTask T
               LEFT JOIN TMTask H ON H.uuid = T.heading
               WHERE T.type = 0 AND T.trashed = 0
                 AND COALESCE(T.project, H.project) IS NOT NULL
               GROUP BY COALESCE(T.project, H.project)"#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(project, open, done)| {
                (
                    project,
                    TodoCounts {
                        open: usize::try_from(open).unwrap_or(0),
                        done: usize::try_from(done).unwrap_or(0),
                    },
                )
            })
            .collect())
    }

    async fn auth_token(&self) -> StoreResult<Option<String>> {
        let row: Option<(Option<String>,)> =
            sqlx::query_as("SELECT uriSchemeAuthenticationToken FROM TMSettings LIMIT 1")
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.and_then(|(token,)| non_empty(token)))
    }
}

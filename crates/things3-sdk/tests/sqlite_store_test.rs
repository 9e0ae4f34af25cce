//! ThingsDatabase against an in-memory copy of the Things 3 schema.

use chrono::{Duration, NaiveDate, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use things3_sdk::dates::{pack_date, DateFilter};
use things3_sdk::models::{Bucket, Item, Status};
use things3_sdk::someday;
use things3_sdk::store::{SomedaySource, TaskStore, ThingsDatabase, TodoFilter};

const SCHEMA: &str = r#"
CREATE TABLE TMTask (
    uuid TEXT PRIMARY KEY,
    type INTEGER NOT NULL DEFAULT 0,
    status INTEGER NOT NULL DEFAULT 0,
    title TEXT,
    notes TEXT,
    start INTEGER NOT NULL DEFAULT 1,
    startDate INTEGER,
    deadline INTEGER,
    stopDate REAL,
    creationDate REAL,
    userModificationDate REAL,
    trashed INTEGER NOT NULL DEFAULT 0,
    project TEXT,
    heading TEXT,
    area TEXT,
    "index" INTEGER NOT NULL DEFAULT 0,
    todayIndex INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE TMArea (uuid TEXT PRIMARY KEY, title TEXT, "index" INTEGER NOT NULL DEFAULT 0);
CREATE TABLE TMTag (uuid TEXT PRIMARY KEY, title TEXT, shortcut TEXT, "index" INTEGER NOT NULL DEFAULT 0);
CREATE TABLE TMTaskTag (tasks TEXT NOT NULL, tags TEXT NOT NULL);
CREATE TABLE TMAreaTag (areas TEXT NOT NULL, tags TEXT NOT NULL);
CREATE TABLE TMChecklistItem (uuid TEXT PRIMARY KEY, title TEXT, status INTEGER NOT NULL DEFAULT 0, task TEXT, "index" INTEGER NOT NULL DEFAULT 0);
CREATE TABLE TMSettings (uuid TEXT PRIMARY KEY, uriSchemeAuthenticationToken TEXT);
"#;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 2, 16).unwrap()
}

#[allow(clippy::too_many_arguments)]
async fn insert_task(
    pool: &SqlitePool,
    uuid: &str,
    kind: i64,
    title: &str,
    start: i64,
    start_date: Option<NaiveDate>,
    project: Option<&str>,
    heading: Option<&str>,
    index: i64,
) {
    sqlx::query(
        r#"INSERT INTO TMTask (uuid, type, title, start, startDate, project, heading, "index", creationDate)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(uuid)
    .bind(kind)
    .bind(title)
    .bind(start)
    .bind(start_date.map(pack_date))
    .bind(project)
    .bind(heading)
    .bind(index)
    .bind(Utc::now().timestamp() as f64)
    .execute(pool)
    .await
    .unwrap();
}

async fn fixture() -> ThingsDatabase {
    ThingsDatabase::from_pool(fixture_pool().await).with_today(today())
}

async fn fixture_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::raw_sql(SCHEMA).execute(&pool).await.unwrap();

    let tomorrow = today() + Duration::days(1);

    // Someday project with a heading, and an active project.
    insert_task(&pool, "PS", 1, "Learn piano", 2, None, None, None, 1).await;
    insert_task(&pool, "HS", 2, "Basics", 2, None, Some("PS"), None, 2).await;
    insert_task(&pool, "PA", 1, "Tax return", 1, None, None, None, 3).await;

    insert_task(&pool, "inbox1", 0, "Call plumber", 0, None, None, None, 10).await;
    insert_task(&pool, "any1", 0, "File receipts", 1, None, Some("PA"), None, 11).await;
    insert_task(&pool, "any2", 0, "Buy keyboard", 1, None, Some("PS"), None, 12).await;
    insert_task(&pool, "any3", 0, "Scales", 1, None, None, Some("HS"), 13).await;
    insert_task(&pool, "some1", 0, "Write a novel", 2, None, None, None, 14).await;
    insert_task(&pool, "today1", 0, "Pay rent", 1, Some(today()), None, None, 15).await;
    insert_task(&pool, "up1", 0, "Dentist", 2, Some(tomorrow), None, None, 16).await;
    insert_task(&pool, "trash1", 0, "Old idea", 1, None, None, None, 17).await;

    sqlx::query("UPDATE TMTask SET trashed = 1 WHERE uuid = 'trash1'")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("UPDATE TMTask SET deadline = ?, notes = 'bring forms' WHERE uuid = 'any1'")
        .bind(pack_date(today() + Duration::days(3)))
        .execute(&pool)
        .await
        .unwrap();
    sqlx::raw_sql(
        "INSERT INTO TMTag (uuid, title, shortcut) VALUES ('tag1', 'errand', 'e');
         INSERT INTO TMTaskTag (tasks, tags) VALUES ('inbox1', 'tag1');
         INSERT INTO TMArea (uuid, title) VALUES ('area1', 'Home');
         INSERT INTO TMChecklistItem (uuid, title, status, task, \"index\") VALUES ('c1', 'Scan', 3, 'any1', 0);
         INSERT INTO TMSettings (uuid, uriSchemeAuthenticationToken) VALUES ('s', 'secret-token');",
    )
    .execute(&pool)
    .await
    .unwrap();

    pool
}

fn ids(tasks: &[things3_sdk::models::Task]) -> Vec<&str> {
    tasks.iter().map(|t| t.uuid.as_str()).collect()
}

#[tokio::test]
async fn test_bucket_queries() {
    let db = fixture().await;

    let inbox = db.list_tasks_by_bucket(Bucket::Inbox).await.unwrap();
    assert_eq!(ids(&inbox), vec!["inbox1"]);
    assert_eq!(inbox[0].tags, vec!["errand"]);

    let someday = db.list_tasks_by_bucket(Bucket::Someday).await.unwrap();
    assert_eq!(ids(&someday), vec!["some1"]);

    let today = db.list_tasks_by_bucket(Bucket::Today).await.unwrap();
    assert_eq!(ids(&today), vec!["today1"]);
    assert_eq!(today[0].start, Some(Bucket::Today));

    let upcoming = db.list_tasks_by_bucket(Bucket::Upcoming).await.unwrap();
    assert_eq!(ids(&upcoming), vec!["up1"]);
}

#[tokio::test]
async fn test_someday_projects_and_headings() {
    let db = fixture().await;

    let projects = db.list_projects_by_bucket(Bucket::Someday).await.unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].uuid, "PS");

    let headings = db.list_headings("PS").await.unwrap();
    assert_eq!(headings.len(), 1);
    assert_eq!(headings[0].project, "PS");
}

#[tokio::test]
async fn test_reconciled_views() {
    let db = fixture().await;

    let anytime = someday::load_active_view(&db, Bucket::Anytime).await.unwrap();
    assert!(ids(&anytime).contains(&"any1"));
    assert!(!ids(&anytime).contains(&"any2"));
    assert!(!ids(&anytime).contains(&"any3"));

    let someday_view = someday::load_someday_view(&db).await.unwrap();
    assert_eq!(ids(&someday_view), vec!["some1", "any2", "any3"]);
}

#[tokio::test]
async fn test_scheduled_someday_project_still_hides_its_todos() {
    let pool = fixture_pool().await;
    let later = today() + Duration::days(30);
    insert_task(&pool, "PF", 1, "Renovate", 2, Some(later), None, None, 4).await;
    insert_task(&pool, "anyF", 0, "Get quotes", 1, None, Some("PF"), None, 18).await;
    let db = ThingsDatabase::from_pool(pool).with_today(today());

    let projects = db.list_projects_by_bucket(Bucket::Someday).await.unwrap();
    let project_ids: Vec<&str> = projects.iter().map(|p| p.uuid.as_str()).collect();
    assert_eq!(project_ids, vec!["PS", "PF"]);

    let anytime = someday::load_active_view(&db, Bucket::Anytime).await.unwrap();
    assert!(!ids(&anytime).contains(&"anyF"));

    let someday_view = someday::load_someday_view(&db).await.unwrap();
    assert!(ids(&someday_view).contains(&"anyF"));

    // Scheduled Someday to-dos keep their date-derived bucket.
    let upcoming = db.list_tasks_by_bucket(Bucket::Upcoming).await.unwrap();
    assert_eq!(ids(&upcoming), vec!["up1"]);
}

#[tokio::test]
async fn test_todo_filters() {
    let db = fixture().await;

    let in_project = db.todos(&TodoFilter::for_project("PS")).await.unwrap();
    assert_eq!(ids(&in_project), vec!["any2", "any3"]);

    let tagged = db.todos(&TodoFilter::for_tag("errand")).await.unwrap();
    assert_eq!(ids(&tagged), vec!["inbox1"]);

    let with_deadline = db
        .todos(&TodoFilter {
            deadline: Some(DateFilter::parse(">=2026-02-17").unwrap()),
            ..TodoFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(ids(&with_deadline), vec!["any1"]);

    let recent = db
        .todos(&TodoFilter {
            created_within: Some(Duration::days(1)),
            ..TodoFilter::default()
        })
        .await
        .unwrap();
    assert!(!recent.is_empty());
}

#[tokio::test]
async fn test_search_get_and_trash() {
    let db = fixture().await;

    let found = db.search("forms").await.unwrap();
    assert_eq!(ids(&found), vec!["any1"]);

    match db.get("any1").await.unwrap() {
        Some(Item::Task(task)) => {
            assert_eq!(task.checklist.len(), 1);
            assert_eq!(task.checklist[0].status, Status::Completed);
        }
        other => panic!("expected task, got {other:?}"),
    }
    assert!(matches!(db.get("PA").await.unwrap(), Some(Item::Project(_))));
    assert!(matches!(db.get("area1").await.unwrap(), Some(Item::Area(_))));
    assert!(db.get("missing").await.unwrap().is_none());

    let trash = db.trash().await.unwrap();
    assert_eq!(ids(&trash), vec!["trash1"]);
}

#[tokio::test]
async fn test_counts_tags_and_token() {
    let db = fixture().await;

    let counts = db.todo_counts().await.unwrap();
    assert_eq!(counts["PS"].open, 2);
    assert_eq!(counts["PA"].open, 1);

    let tags = db.tags().await.unwrap();
    assert_eq!(tags[0].shortcut.as_deref(), Some("e"));

    assert_eq!(db.auth_token().await.unwrap().as_deref(), Some("secret-token"));

    let deadlines = db.deadlines().await.unwrap();
    assert_eq!(ids(&deadlines), vec!["any1"]);
}

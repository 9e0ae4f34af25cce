//! Read-only tool implementations.
//!
//! Async functions that take the task store and param structs, returning
//! the text reply. Today, Upcoming and Anytime drop to-dos inherited from
//! Someday projects; Someday gains them, so every view matches the Things UI.

use chrono::{Duration, Local, NaiveDate};
use serde::Serialize;

use things3_sdk::dates::{parse_period, DateFilter};
use things3_sdk::format::{self, concise, detailed, Lookups};
use things3_sdk::models::{
    is_builtin_list, Area, Bucket, Item, ItemType, Project, Status, Task, DEFAULT_LIMIT,
    DETAIL_ITEM_CAP,
};
use things3_sdk::sampling::random_sample;
use things3_sdk::someday::{self, augment_with_inherited, build_context, filter_non_someday};
use things3_sdk::store::{SomedaySource, StoreError, StoreResult, TaskStore, TodoFilter};

use super::helpers::{load_lookups, tool_error, with_header};
use super::params::{
    GetProjectsParams, GetTagsParams, GetTodosParams, JsonExportParams, ListParams,
    ListViewParams, LogbookParams, RandomSampleParams, RandomTodosParams, RecentParams,
    SearchAdvancedParams, SearchTodosParams, ShowItemParams, TaggedItemsParams,
};

/// How far ahead `get_summary` looks for deadlines.
const SUMMARY_DEADLINE_DAYS: i64 = 7;
/// Deadlines listed by name in the summary.
const SUMMARY_DEADLINE_SHOWN: usize = 5;
/// Notes characters kept per `json_export` entry.
const EXPORT_NOTES_CHARS: usize = 200;

fn reply(tool: &str, result: StoreResult<String>) -> String {
    result.unwrap_or_else(|e| {
        if e.is_unavailable() {
            tool_error(
                tool,
                format!("{e}. Is Things 3 installed? Set THINGSDB to the database path."),
            )
        } else {
            tool_error(tool, e)
        }
    })
}

/// A bucket's to-dos as the Things UI shows them.
async fn view_tasks(store: &dyn TaskStore, bucket: Bucket) -> StoreResult<Vec<Task>> {
    match bucket {
        Bucket::Someday => someday::load_someday_view(store).await,
        _ => someday::load_active_view(store, bucket).await,
    }
}

/// Render tasks, loading checklists for the shown entries in detailed mode.
async fn render_tasks(
    store: &dyn TaskStore,
    mut tasks: Vec<Task>,
    concise: bool,
    limit: usize,
) -> StoreResult<String> {
    let lookups = load_lookups(store).await?;
    if !concise {
        for task in tasks.iter_mut().take(limit) {
            if task.checklist.is_empty() {
                task.checklist = store.checklist(&task.uuid).await?;
            }
        }
    }
    Ok(format::todo_list(&tasks, concise, limit, &lookups))
}

async fn render_sample(
    store: &dyn TaskStore,
    tasks: Vec<Task>,
    count: usize,
    label: &str,
) -> StoreResult<String> {
    let lookups = load_lookups(store).await?;
    let total = tasks.len();
    let sampled = random_sample(tasks, count);
    let header = format!("Random {} of {} {}:", sampled.len(), total, label);
    let lines = sampled.iter().map(|t| concise::todo(t, &lookups)).collect();
    Ok(with_header(header, lines))
}

fn limited<T>(items: &[T], limit: usize) -> (&[T], usize) {
    let total = items.len();
    (&items[..total.min(limit)], total)
}

fn more_suffix(total: usize, shown: usize) -> String {
    if total > shown {
        format!("\n… {} more (use limit= to see more)", total - shown)
    } else {
        String::new()
    }
}

// ── List views ──

async fn list_view(store: &dyn TaskStore, bucket: Bucket, params: ListViewParams) -> StoreResult<String> {
    let tasks = view_tasks(store, bucket).await?;
    render_tasks(store, tasks, params.is_concise(), params.limit).await
}

pub async fn get_inbox(store: &dyn TaskStore, params: ListViewParams) -> String {
    reply("get_inbox", list_view(store, Bucket::Inbox, params).await)
}

pub async fn get_today(store: &dyn TaskStore, params: ListViewParams) -> String {
    reply("get_today", list_view(store, Bucket::Today, params).await)
}

pub async fn get_upcoming(store: &dyn TaskStore, params: ListViewParams) -> String {
    reply("get_upcoming", list_view(store, Bucket::Upcoming, params).await)
}

pub async fn get_anytime(store: &dyn TaskStore, params: ListViewParams) -> String {
    reply("get_anytime", list_view(store, Bucket::Anytime, params).await)
}

pub async fn get_someday(store: &dyn TaskStore, params: ListViewParams) -> String {
    reply("get_someday", list_view(store, Bucket::Someday, params).await)
}

/// Completed to-dos only; canceled ones stay out of the logbook view.
async fn logbook(store: &dyn TaskStore, params: LogbookParams) -> StoreResult<String> {
    let period = parse_period(&params.period)?;
    let tasks = store
        .logbook(period)
        .await?
        .into_iter()
        .filter(|t| t.status == Status::Completed)
        .collect();
    render_tasks(store, tasks, params.concise, params.limit).await
}

pub async fn get_logbook(store: &dyn TaskStore, params: LogbookParams) -> String {
    reply("get_logbook", logbook(store, params).await)
}

pub async fn get_trash(store: &dyn TaskStore, params: ListParams) -> String {
    let result = match store.trash().await {
        Ok(tasks) => render_tasks(store, tasks, params.concise, params.limit).await,
        Err(e) => Err(e),
    };
    reply("get_trash", result)
}

pub async fn get_deadlines(store: &dyn TaskStore, params: ListParams) -> String {
    let result = match store.deadlines().await {
        Ok(tasks) => render_tasks(store, tasks, params.concise, params.limit).await,
        Err(e) => Err(e),
    };
    reply("get_deadlines", result)
}

// ── Random sampling ──

async fn random_view(
    store: &dyn TaskStore,
    bucket: Bucket,
    params: RandomSampleParams,
) -> StoreResult<String> {
    let tasks = view_tasks(store, bucket).await?;
    let label = format!("{} items", bucket.as_when());
    render_sample(store, tasks, params.count, &label).await
}

pub async fn get_random_inbox(store: &dyn TaskStore, params: RandomSampleParams) -> String {
    reply("get_random_inbox", random_view(store, Bucket::Inbox, params).await)
}

pub async fn get_random_today(store: &dyn TaskStore, params: RandomSampleParams) -> String {
    reply("get_random_today", random_view(store, Bucket::Today, params).await)
}

pub async fn get_random_anytime(store: &dyn TaskStore, params: RandomSampleParams) -> String {
    reply("get_random_anytime", random_view(store, Bucket::Anytime, params).await)
}

async fn random_todos(store: &dyn TaskStore, params: RandomTodosParams) -> StoreResult<String> {
    let filter = TodoFilter {
        project: params.project_uuid,
        ..TodoFilter::default()
    };
    let tasks = store.todos(&filter).await?;
    render_sample(store, tasks, params.count, "todos").await
}

pub async fn get_random_todos(store: &dyn TaskStore, params: RandomTodosParams) -> String {
    reply("get_random_todos", random_todos(store, params).await)
}

// ── Entities ──

async fn todos(store: &dyn TaskStore, params: GetTodosParams) -> StoreResult<String> {
    let filter = TodoFilter {
        project: params.project_uuid,
        ..TodoFilter::default()
    };
    let tasks = store.todos(&filter).await?;
    let concise = params.concise && !params.include_details;
    render_tasks(store, tasks, concise, params.limit).await
}

pub async fn get_todos(store: &dyn TaskStore, params: GetTodosParams) -> String {
    reply("get_todos", todos(store, params).await)
}

async fn projects(store: &dyn TaskStore, params: GetProjectsParams) -> StoreResult<String> {
    let projects = store.projects().await?;
    let lookups = load_lookups(store).await?;

    if !params.include_items {
        let counts = if params.concise {
            Some(store.todo_counts().await?)
        } else {
            None
        };
        return Ok(format::project_list(
            &projects,
            params.concise,
            params.limit,
            counts.as_ref(),
            &lookups,
        ));
    }

    let (shown, total) = limited(&projects, params.limit);
    if shown.is_empty() {
        return Ok("No projects found.".to_string());
    }
    let mut blocks = Vec::with_capacity(shown.len());
    for project in shown {
        let items = store.todos(&TodoFilter::for_project(&project.uuid)).await?;
        blocks.push(detailed::project(project, &lookups, &items));
    }
    Ok(format!(
        "Showing {}/{} projects\n\n{}",
        shown.len(),
        total,
        blocks.join("\n---\n")
    ))
}

pub async fn get_projects(store: &dyn TaskStore, params: GetProjectsParams) -> String {
    reply("get_projects", projects(store, params).await)
}

async fn areas(store: &dyn TaskStore, params: ListParams) -> StoreResult<String> {
    let areas = store.areas().await?;
    let (shown, total) = limited(&areas, params.limit);
    if shown.is_empty() {
        return Ok("No areas found.".to_string());
    }

    let lines = if params.concise {
        shown.iter().map(concise::area).collect::<Vec<_>>()
    } else {
        let projects = store.projects().await?;
        let mut lines = Vec::with_capacity(shown.len());
        for area in shown {
            lines.push(area_detail(store, area, &projects).await?);
        }
        lines
    };
    Ok(format!("{}{}", lines.join("\n"), more_suffix(total, shown.len())))
}

/// The area's projects and the to-dos filed directly in it.
async fn area_detail(
    store: &dyn TaskStore,
    area: &Area,
    projects: &[Project],
) -> StoreResult<String> {
    let in_area: Vec<Project> = projects
        .iter()
        .filter(|p| p.area.as_deref() == Some(area.uuid.as_str()))
        .cloned()
        .collect();
    let filter = TodoFilter {
        area: Some(area.uuid.clone()),
        ..TodoFilter::default()
    };
    let todos: Vec<Task> = store
        .todos(&filter)
        .await?
        .into_iter()
        .filter(|t| t.area.as_deref() == Some(area.uuid.as_str()))
        .collect();
    Ok(detailed::area(area, &in_area, &todos))
}

pub async fn get_areas(store: &dyn TaskStore, params: ListParams) -> String {
    reply("get_areas", areas(store, params).await)
}

async fn tags(store: &dyn TaskStore, params: GetTagsParams) -> StoreResult<String> {
    let tags = store.tags().await?;
    let (shown, total) = limited(&tags, params.limit);
    if shown.is_empty() {
        return Ok("No tags found.".to_string());
    }

    let lookups = if params.include_items {
        load_lookups(store).await?
    } else {
        Lookups::default()
    };
    let mut lines = Vec::with_capacity(shown.len());
    for tag in shown {
        lines.push(concise::tag(tag));
        if params.include_items {
            let items = store.todos(&TodoFilter::for_tag(&tag.title)).await?;
            let (items_shown, items_total) = limited(&items, DETAIL_ITEM_CAP);
            lines.extend(items_shown.iter().map(|t| format!("  {}", concise::todo(t, &lookups))));
            if items_total > items_shown.len() {
                lines.push(format!("  … and {} more", items_total - items_shown.len()));
            }
        }
    }
    Ok(format!("{}{}", lines.join("\n"), more_suffix(total, shown.len())))
}

pub async fn get_tags(store: &dyn TaskStore, params: GetTagsParams) -> String {
    reply("get_tags", tags(store, params).await)
}

pub async fn get_tagged_items(store: &dyn TaskStore, params: TaggedItemsParams) -> String {
    let result = match store.todos(&TodoFilter::for_tag(params.tag)).await {
        Ok(tasks) => render_tasks(store, tasks, params.concise, params.limit).await,
        Err(e) => Err(e),
    };
    reply("get_tagged_items", result)
}

// ── Search & detail ──

pub async fn search_todos(store: &dyn TaskStore, params: SearchTodosParams) -> String {
    let result = match store.search(&params.query).await {
        Ok(tasks) => render_tasks(store, tasks, params.concise, params.limit).await,
        Err(e) => Err(e),
    };
    reply("search_todos", result)
}

fn parse_status(value: &str) -> StoreResult<Status> {
    value.parse().map_err(StoreError::invalid_filter)
}

fn parse_item_type(value: &str) -> StoreResult<ItemType> {
    value.parse().map_err(StoreError::invalid_filter)
}

async fn advanced(store: &dyn TaskStore, params: SearchAdvancedParams) -> StoreResult<String> {
    let filter = TodoFilter {
        project: None,
        tag: params.tag,
        area: params.area,
        status: params.status.as_deref().map(parse_status).transpose()?,
        start_date: params.start_date.as_deref().map(DateFilter::parse).transpose()?,
        deadline: params.deadline.as_deref().map(DateFilter::parse).transpose()?,
        created_within: params.last.as_deref().map(parse_period).transpose()?,
    };
    let item_type = params
        .item_type
        .as_deref()
        .map(parse_item_type)
        .transpose()?
        .unwrap_or(ItemType::Todo);

    match item_type {
        ItemType::Todo => {
            let tasks = store.todos(&filter).await?;
            render_tasks(store, tasks, params.concise, params.limit).await
        }
        ItemType::Project => {
            let projects = matching_projects(store.projects().await?, &filter);
            let counts = store.todo_counts().await?;
            let lookups = load_lookups(store).await?;
            Ok(format::project_list(
                &projects,
                params.concise,
                params.limit,
                Some(&counts),
                &lookups,
            ))
        }
        ItemType::Heading => Err(StoreError::invalid_filter(
            "headings are not searchable; search for to-do or project instead",
        )),
    }
}

/// Apply the project-relevant parts of a to-do filter.
///
/// `store.projects()` returns open projects only, so any other status
/// yields nothing.
fn matching_projects(projects: Vec<Project>, filter: &TodoFilter) -> Vec<Project> {
    if filter.effective_status() != Status::Incomplete {
        return Vec::new();
    }
    projects
        .into_iter()
        .filter(|p| match &filter.tag {
            Some(tag) => p.tags.iter().any(|t| t == tag),
            None => true,
        })
        .filter(|p| match &filter.area {
            Some(area) => p.area.as_deref() == Some(area.as_str()),
            None => true,
        })
        .filter(|p| match (&filter.start_date, p.start_date) {
            (Some(f), Some(d)) => f.matches(d),
            (Some(_), None) => false,
            (None, _) => true,
        })
        .filter(|p| match (&filter.deadline, p.deadline) {
            (Some(f), Some(d)) => f.matches(d),
            (Some(_), None) => false,
            (None, _) => true,
        })
        .collect()
}

pub async fn search_advanced(store: &dyn TaskStore, params: SearchAdvancedParams) -> String {
    reply("search_advanced", advanced(store, params).await)
}

async fn recent(store: &dyn TaskStore, params: RecentParams) -> StoreResult<String> {
    let filter = TodoFilter {
        created_within: Some(parse_period(&params.period)?),
        ..TodoFilter::default()
    };
    let tasks = store.todos(&filter).await?;
    render_tasks(store, tasks, params.concise, params.limit).await
}

pub async fn get_recent(store: &dyn TaskStore, params: RecentParams) -> String {
    reply("get_recent", recent(store, params).await)
}

/// A built-in list rendered concisely with the default limit.
async fn builtin_list(store: &dyn TaskStore, name: &str) -> StoreResult<String> {
    let lower = name.to_ascii_lowercase();
    let tasks = match lower.as_str() {
        "logbook" => store
            .logbook(parse_period("7d")?)
            .await?
            .into_iter()
            .filter(|t| t.status == Status::Completed)
            .collect(),
        "trash" => store.trash().await?,
        other => {
            let bucket = other.parse::<Bucket>().map_err(StoreError::invalid_filter)?;
            view_tasks(store, bucket).await?
        }
    };
    let body = render_tasks(store, tasks, true, DEFAULT_LIMIT).await?;
    Ok(format!("{}:\n{}", capitalise(&lower), body))
}

fn capitalise(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

async fn show(store: &dyn TaskStore, params: ShowItemParams) -> StoreResult<String> {
    let id = params.uuid.trim();
    if is_builtin_list(id) {
        return builtin_list(store, id).await;
    }

    let Some(item) = store.get(id).await? else {
        return Ok(format!("No item found with UUID: {}", params.uuid));
    };
    let lookups = load_lookups(store).await?;

    let text = match (item, params.include_details) {
        (Item::Task(task), true) => detailed::todo(&task, &lookups),
        (Item::Task(task), false) => concise::todo(&task, &lookups),
        (Item::Project(project), true) => {
            let items = store.todos(&TodoFilter::for_project(&project.uuid)).await?;
            detailed::project(&project, &lookups, &items)
        }
        (Item::Project(project), false) => concise::project(&project, None),
        (Item::Area(area), true) => {
            let projects = store.projects().await?;
            area_detail(store, &area, &projects).await?
        }
        (Item::Area(area), false) => concise::area(&area),
    };
    Ok(text)
}

pub async fn show_item(store: &dyn TaskStore, params: ShowItemParams) -> String {
    reply("show_item", show(store, params).await)
}

// ── Summary ──

async fn summary(store: &dyn TaskStore, today: NaiveDate) -> StoreResult<String> {
    let context = build_context(store).await?;

    let inbox = store.list_tasks_by_bucket(Bucket::Inbox).await?;
    let today_items = filter_non_someday(store.list_tasks_by_bucket(Bucket::Today).await?, &context);
    let upcoming = filter_non_someday(store.list_tasks_by_bucket(Bucket::Upcoming).await?, &context);
    let anytime_raw = store.list_tasks_by_bucket(Bucket::Anytime).await?;
    let someday_items = augment_with_inherited(
        store.list_tasks_by_bucket(Bucket::Someday).await?,
        anytime_raw.clone(),
        &context,
    );
    let anytime = filter_non_someday(anytime_raw, &context);
    let projects = store.projects().await?;
    let areas = store.areas().await?;

    let horizon = today + Duration::days(SUMMARY_DEADLINE_DAYS);
    let urgent: Vec<Task> = store
        .deadlines()
        .await?
        .into_iter()
        .filter(|t| t.deadline.is_some_and(|d| d <= horizon))
        .collect();

    let mut lines = vec![
        "=== Things 3 Summary ===".to_string(),
        format!("Inbox: {} items", inbox.len()),
        format!("Today: {} items", today_items.len()),
        format!("Upcoming: {} items", upcoming.len()),
        format!("Anytime: {} items", anytime.len()),
        format!("Someday: {} items", someday_items.len()),
        format!("Projects: {} active", projects.len()),
        format!("Areas: {}", areas.len()),
    ];

    if !urgent.is_empty() {
        lines.push(format!("\nDue this week ({}):", urgent.len()));
        for task in urgent.iter().take(SUMMARY_DEADLINE_SHOWN) {
            let title = if task.title.is_empty() { "Untitled" } else { task.title.as_str() };
            let deadline = task.deadline.map(|d| d.to_string()).unwrap_or_default();
            lines.push(format!("  ! {} — deadline:{}", title, deadline));
        }
        if urgent.len() > SUMMARY_DEADLINE_SHOWN {
            lines.push(format!("  … and {} more", urgent.len() - SUMMARY_DEADLINE_SHOWN));
        }
    }

    Ok(lines.join("\n"))
}

pub async fn get_summary(store: &dyn TaskStore) -> String {
    get_summary_on(store, Local::now().date_naive()).await
}

/// [`get_summary`] against a fixed date.
pub async fn get_summary_on(store: &dyn TaskStore, today: NaiveDate) -> String {
    reply("get_summary", summary(store, today).await)
}

// ── Export ──

/// One entry of `json_export`. Empty fields are left out.
#[derive(Debug, Serialize)]
struct ExportEntry {
    title: String,
    uuid: String,
    status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    when: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deadline: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
}

impl From<Task> for ExportEntry {
    fn from(task: Task) -> Self {
        Self {
            title: task.title,
            uuid: task.uuid,
            status: task.status,
            when: task.start_date,
            deadline: task.deadline,
            tags: task.tags,
            notes: task
                .notes
                .filter(|n| !n.is_empty())
                .map(|n| n.chars().take(EXPORT_NOTES_CHARS).collect()),
        }
    }
}

async fn export(store: &dyn TaskStore, params: JsonExportParams) -> StoreResult<Vec<ExportEntry>> {
    let filter = TodoFilter {
        project: params.project_uuid,
        ..TodoFilter::default()
    };
    Ok(store
        .todos(&filter)
        .await?
        .into_iter()
        .take(params.limit)
        .map(ExportEntry::from)
        .collect())
}

pub async fn json_export(store: &dyn TaskStore, params: JsonExportParams) -> String {
    match export(store, params).await {
        Ok(entries) => serde_json::to_string(&entries)
            .unwrap_or_else(|e| tool_error("json_export", e)),
        Err(e) => tool_error("json_export", e),
    }
}

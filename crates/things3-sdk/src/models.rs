//! Things 3 records and shared display constants.
//!
//! Records are plain data: the store fills them, the formatters and the
//! Someday reconciler read them. Identifiers are the Things UUID strings.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Number of UUID characters shown in concise output.
pub const SHORT_UUID_LEN: usize = 8;

/// Default `limit` for list tools.
pub const DEFAULT_LIMIT: usize = 10;

/// Default `count` for random sampling tools.
pub const DEFAULT_SAMPLE_COUNT: usize = 5;

/// Notes longer than this are cut in detailed output.
pub const NOTES_TRUNCATE_CHARS: usize = 500;

/// Maximum child tasks listed under a project or area in detailed output.
pub const DETAIL_ITEM_CAP: usize = 20;

/// Things 3 built-in list names accepted wherever an item id is.
pub const BUILTIN_LISTS: [&str; 7] = [
    "inbox", "today", "upcoming", "anytime", "someday", "logbook", "trash",
];

/// Returns true when `name` is one of the built-in list names (case-insensitive).
pub fn is_builtin_list(name: &str) -> bool {
    BUILTIN_LISTS
        .iter()
        .any(|list| list.eq_ignore_ascii_case(name))
}

/// Schedule classification of a task or project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bucket {
    Inbox,
    Today,
    Upcoming,
    Anytime,
    Someday,
}

impl Bucket {
    pub const ALL: [Bucket; 5] = [
        Bucket::Inbox,
        Bucket::Today,
        Bucket::Upcoming,
        Bucket::Anytime,
        Bucket::Someday,
    ];

    /// Capitalised name, as Things displays it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::Inbox => "Inbox",
            Bucket::Today => "Today",
            Bucket::Upcoming => "Upcoming",
            Bucket::Anytime => "Anytime",
            Bucket::Someday => "Someday",
        }
    }

    /// Lower-case form used by `when` scheduling keywords and concise output.
    pub fn as_when(&self) -> &'static str {
        match self {
            Bucket::Inbox => "inbox",
            Bucket::Today => "today",
            Bucket::Upcoming => "upcoming",
            Bucket::Anytime => "anytime",
            Bucket::Someday => "someday",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Bucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Bucket::ALL
            .into_iter()
            .find(|b| b.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "unknown bucket '{}': expected inbox, today, upcoming, anytime, or someday",
                    s
                )
            })
    }
}

/// Completion state of a task, project, or checklist item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Incomplete,
    Completed,
    Canceled,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Incomplete => "incomplete",
            Status::Completed => "completed",
            Status::Canceled => "canceled",
        }
    }

    /// Icon used by concise renderers.
    pub fn icon(&self) -> &'static str {
        match self {
            Status::Incomplete => "□",
            Status::Completed => "✓",
            Status::Canceled => "✗",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "incomplete" | "open" => Ok(Status::Incomplete),
            "completed" | "complete" | "done" => Ok(Status::Completed),
            "canceled" | "cancelled" => Ok(Status::Canceled),
            other => Err(format!(
                "unknown status '{}': expected incomplete, completed, or canceled",
                other
            )),
        }
    }
}

/// Kind of a `TMTask` row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemType {
    #[serde(rename = "to-do")]
    Todo,
    #[serde(rename = "project")]
    Project,
    #[serde(rename = "heading")]
    Heading,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Todo => "to-do",
            ItemType::Project => "project",
            ItemType::Heading => "heading",
        }
    }
}

impl FromStr for ItemType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "to-do" | "todo" => Ok(ItemType::Todo),
            "project" => Ok(ItemType::Project),
            "heading" => Ok(ItemType::Heading),
            other => Err(format!(
                "unknown item type '{}': expected to-do, project, or heading",
                other
            )),
        }
    }
}

/// A checklist entry inside a to-do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub title: String,
    pub status: Status,
}

/// A to-do.
///
/// `project` and `heading` are the raw references stored on the row: a to-do
/// filed under a heading normally carries only the heading reference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub uuid: String,
    pub title: String,
    pub status: Status,
    pub start: Option<Bucket>,
    pub start_date: Option<NaiveDate>,
    pub deadline: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub notes: Option<String>,
    pub project: Option<String>,
    pub heading: Option<String>,
    pub area: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub checklist: Vec<ChecklistItem>,
    pub stop_date: Option<NaiveDateTime>,
    pub created: Option<NaiveDateTime>,
    pub modified: Option<NaiveDateTime>,
}

impl Task {
    /// Minimal to-do with the given id and title; everything else empty.
    pub fn new(uuid: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_start(mut self, bucket: Bucket) -> Self {
        self.start = Some(bucket);
        self
    }

    pub fn in_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    pub fn under_heading(mut self, heading: impl Into<String>) -> Self {
        self.heading = Some(heading.into());
        self
    }
}

/// A project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub uuid: String,
    pub title: String,
    pub status: Status,
    pub start: Option<Bucket>,
    pub start_date: Option<NaiveDate>,
    pub deadline: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub notes: Option<String>,
    pub area: Option<String>,
}

impl Project {
    pub fn new(uuid: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_start(mut self, bucket: Bucket) -> Self {
        self.start = Some(bucket);
        self
    }
}

/// A heading groups to-dos inside exactly one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    pub uuid: String,
    pub title: String,
    pub project: String,
}

impl Heading {
    pub fn new(
        uuid: impl Into<String>,
        title: impl Into<String>,
        project: impl Into<String>,
    ) -> Self {
        Self {
            uuid: uuid.into(),
            title: title.into(),
            project: project.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    pub uuid: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub uuid: String,
    pub title: String,
    pub shortcut: Option<String>,
}

/// Any single entity resolvable by id.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Item {
    Task(Task),
    Project(Project),
    Area(Area),
}

/// Open / done to-do counts for one project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TodoCounts {
    pub open: usize,
    pub done: usize,
}

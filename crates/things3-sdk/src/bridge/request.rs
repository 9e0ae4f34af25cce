//! Write requests accepted by the bridge.
//!
//! Dates and `when` values are kept as the caller wrote them; each write path
//! interprets them (AppleScript converts to day offsets, the URL scheme passes
//! them through).

/// A to-do to create.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTodo {
    pub title: String,
    pub notes: Option<String>,
    /// `today`, `tomorrow`, `evening`, `anytime`, `someday`, or `YYYY-MM-DD`.
    pub when: Option<String>,
    /// `YYYY-MM-DD`.
    pub deadline: Option<String>,
    pub tags: Vec<String>,
    /// Project or area id; wins over `list_title`.
    pub list_id: Option<String>,
    pub list_title: Option<String>,
    pub heading_id: Option<String>,
    pub heading: Option<String>,
    /// AppleScript cannot create checklist items; non-empty forces the URL scheme.
    pub checklist_items: Vec<String>,
    pub reveal: bool,
}

impl NewTodo {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// A project to create, optionally with initial to-dos.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewProject {
    pub title: String,
    pub notes: Option<String>,
    pub when: Option<String>,
    pub deadline: Option<String>,
    pub tags: Vec<String>,
    pub area_id: Option<String>,
    pub area_title: Option<String>,
    pub todos: Vec<String>,
    pub reveal: bool,
}

impl NewProject {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Changes to an existing to-do. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoUpdate {
    pub id: String,
    pub title: Option<String>,
    /// Replaces the notes; `Some("")` clears them.
    pub notes: Option<String>,
    pub when: Option<String>,
    pub deadline: Option<String>,
    /// Replaces all tags when non-empty.
    pub tags: Vec<String>,
    pub completed: Option<bool>,
    pub canceled: Option<bool>,
    pub list_id: Option<String>,
    pub list_title: Option<String>,
}

impl TodoUpdate {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

/// Changes to an existing project. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectUpdate {
    pub id: String,
    pub title: Option<String>,
    pub notes: Option<String>,
    pub when: Option<String>,
    pub deadline: Option<String>,
    pub tags: Vec<String>,
    pub completed: Option<bool>,
    pub canceled: Option<bool>,
    pub area_id: Option<String>,
    pub area_title: Option<String>,
}

impl ProjectUpdate {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

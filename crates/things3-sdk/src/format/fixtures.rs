//! Records shared by the formatter tests.

use chrono::NaiveDate;

use super::Lookups;
use crate::models::{Area, Bucket, ChecklistItem, Project, Status, Tag, Task};

pub const PROJECT_ID: &str = "PROJ1234-5678-90AB-CDEF-1234567890AB";
pub const AREA_ID: &str = "AREA1234-5678-90AB-CDEF-1234567890AB";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn todo_full() -> Task {
    Task {
        uuid: "ABC12345-6789-DEF0-1234-567890ABCDEF".into(),
        title: "Buy groceries".into(),
        status: Status::Incomplete,
        start: Some(Bucket::Anytime),
        start_date: Some(date(2026, 2, 16)),
        deadline: Some(date(2026, 2, 20)),
        tags: vec!["errands".into(), "personal".into()],
        notes: Some("Milk, eggs, bread".into()),
        project: Some(PROJECT_ID.into()),
        checklist: vec![
            ChecklistItem { title: "Milk".into(), status: Status::Incomplete },
            ChecklistItem { title: "Eggs".into(), status: Status::Completed },
            ChecklistItem { title: "Bread".into(), status: Status::Incomplete },
        ],
        created: date(2026, 2, 10).and_hms_opt(10, 0, 0),
        modified: date(2026, 2, 15).and_hms_opt(14, 30, 0),
        ..Task::default()
    }
}

pub fn todo_minimal() -> Task {
    Task::new("MIN12345-6789-0000-0000-000000000000", "Simple task")
}

pub fn todo_completed() -> Task {
    Task {
        status: Status::Completed,
        stop_date: date(2026, 2, 10).and_hms_opt(18, 0, 0),
        tags: vec!["finance".into()],
        ..Task::new("DONE1234-5678-90AB-CDEF-1234567890AB", "Filed taxes")
    }
}

pub fn project() -> Project {
    Project {
        start: Some(Bucket::Anytime),
        deadline: Some(date(2026, 6, 1)),
        tags: vec!["home".into()],
        notes: Some("Kitchen and bathroom".into()),
        area: Some(AREA_ID.into()),
        ..Project::new(PROJECT_ID, "Home Renovation")
    }
}

pub fn area() -> Area {
    Area {
        uuid: AREA_ID.into(),
        title: "Personal".into(),
        tags: Vec::new(),
    }
}

pub fn tag() -> Tag {
    Tag {
        uuid: "TAG12345-6789-0000-0000-000000000000".into(),
        title: "urgent".into(),
        shortcut: Some("u".into()),
    }
}

pub fn lookups() -> Lookups {
    Lookups::new(&[project()], &[area()])
}

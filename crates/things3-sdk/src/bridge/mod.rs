//! Write access to Things 3.
//!
//! [`ThingsBridge`] tries AppleScript first, since it returns the id of what it
//! created and needs no auth token, and falls back to the `things:///` URL
//! scheme when the script fails. Checklist items and JSON imports go straight
//! to the URL scheme.
//!
//! Process execution sits behind [`ScriptRunner`] and [`UrlOpener`] so the
//! write tools can be tested without macOS.

pub mod applescript;
pub mod error;
pub mod request;
pub mod url_scheme;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use serde_json::Value;
use tracing::{debug, info};

pub use applescript::OsascriptRunner;
pub use error::{BridgeError, BridgeResult};
pub use request::{NewProject, NewTodo, ProjectUpdate, TodoUpdate};
pub use url_scheme::SystemUrlOpener;

/// Executes an AppleScript and returns its trimmed output.
#[async_trait]
pub trait ScriptRunner: Send + Sync + std::fmt::Debug {
    async fn run(&self, script: &str) -> BridgeResult<String>;
}

/// Opens a `things:///` URL.
#[async_trait]
pub trait UrlOpener: Send + Sync + std::fmt::Debug {
    async fn open(&self, url: &str) -> BridgeResult<()>;
}

/// Which path completed a write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// AppleScript succeeded; `output` is the new id, or `OK` for updates.
    Script { output: String },
    /// The URL scheme was used; Things does not report ids back.
    UrlScheme { url: String },
}

#[derive(Debug, Clone)]
pub struct ThingsBridge {
    scripts: Arc<dyn ScriptRunner>,
    opener: Arc<dyn UrlOpener>,
    auth_token: Option<String>,
}

impl ThingsBridge {
    pub fn new(scripts: Arc<dyn ScriptRunner>, opener: Arc<dyn UrlOpener>) -> Self {
        Self {
            scripts,
            opener,
            auth_token: None,
        }
    }

    /// `osascript` and the system URL opener.
    pub fn system(script_timeout: std::time::Duration) -> Self {
        Self::new(
            Arc::new(OsascriptRunner::new(script_timeout)),
            Arc::new(SystemUrlOpener),
        )
    }

    /// Token required by URL-scheme updates.
    pub fn with_auth_token(mut self, token: Option<String>) -> Self {
        self.auth_token = token.filter(|t| !t.is_empty());
        self
    }

    pub fn has_auth_token(&self) -> bool {
        self.auth_token.is_some()
    }

    fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    /// Run a script; an `Error: …` result from Things counts as failure.
    async fn run_script(&self, script: &str) -> BridgeResult<String> {
        let output = self.scripts.run(script).await?;
        match output.strip_prefix("Error:") {
            Some(message) => Err(BridgeError::Things(message.trim().to_string())),
            None => Ok(output),
        }
    }

    async fn open(&self, url: String) -> BridgeResult<WriteOutcome> {
        self.opener.open(&url).await?;
        Ok(WriteOutcome::UrlScheme { url })
    }

    /// Script first, then `fallback_url` when the script fails.
    async fn script_or_url(&self, script: String, fallback_url: impl FnOnce() -> String) -> BridgeResult<WriteOutcome> {
        match self.run_script(&script).await {
            Ok(output) => Ok(WriteOutcome::Script { output }),
            Err(e) if e.allows_fallback() => {
                info!(error = %e, "AppleScript failed, falling back to URL scheme");
                self.open(fallback_url()).await
            }
            Err(e) => Err(e),
        }
    }

    pub async fn add_todo(&self, todo: &NewTodo) -> BridgeResult<WriteOutcome> {
        if !todo.checklist_items.is_empty() {
            debug!("Checklist items requested, using URL scheme");
            return self.open(url_scheme::add_todo_url(todo)).await;
        }
        let script = applescript::add_todo_script(todo, Self::today());
        self.script_or_url(script, || url_scheme::add_todo_url(todo))
            .await
    }

    pub async fn add_project(&self, project: &NewProject) -> BridgeResult<WriteOutcome> {
        let script = applescript::add_project_script(project, Self::today());
        self.script_or_url(script, || url_scheme::add_project_url(project))
            .await
    }

    pub async fn update_todo(&self, update: &TodoUpdate) -> BridgeResult<WriteOutcome> {
        let script = applescript::update_todo_script(update, Self::today());
        self.script_or_url(script, || {
            url_scheme::update_todo_url(update, self.auth_token.as_deref())
        })
        .await
    }

    pub async fn update_project(&self, update: &ProjectUpdate) -> BridgeResult<WriteOutcome> {
        let script = applescript::update_project_script(update, Self::today());
        self.script_or_url(script, || {
            url_scheme::update_project_url(update, self.auth_token.as_deref())
        })
        .await
    }

    /// Reveal a to-do, project, or built-in list.
    pub async fn show(&self, id: &str) -> BridgeResult<WriteOutcome> {
        for class in ["to do", "project"] {
            match self.run_script(&applescript::show_script(class, id)).await {
                Ok(output) => return Ok(WriteOutcome::Script { output }),
                Err(e) => debug!(class, error = %e, "Show via AppleScript failed"),
            }
        }
        self.open(url_scheme::show_url(id)).await
    }

    /// Open the Things search window.
    pub async fn search(&self, query: &str) -> BridgeResult<WriteOutcome> {
        self.open(url_scheme::search_url(query)).await
    }

    /// Bulk import via the JSON command.
    pub async fn json_import(&self, items: &[Value], reveal: bool) -> BridgeResult<WriteOutcome> {
        let url = url_scheme::json_url(items, reveal, self.auth_token.as_deref())?;
        self.open(url).await
    }

    /// Whether Things is running and answering scripts.
    pub async fn is_ready(&self) -> bool {
        matches!(
            self.scripts.run(applescript::READY_SCRIPT).await,
            Ok(output) if output != "not running"
        )
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub mod testing {
    //! Recording fakes for [`ScriptRunner`] and [`UrlOpener`].

    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// Replays queued results and records every script it receives.
    #[derive(Debug, Default)]
    pub struct RecordingRunner {
        responses: Mutex<VecDeque<BridgeResult<String>>>,
        scripts: Mutex<Vec<String>>,
    }

    impl RecordingRunner {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue a result; once the queue is empty every run fails.
        pub fn respond(self, response: BridgeResult<String>) -> Self {
            if let Ok(mut queue) = self.responses.lock() {
                queue.push_back(response);
            }
            self
        }

        pub fn scripts(&self) -> Vec<String> {
            self.scripts.lock().map(|s| s.clone()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl ScriptRunner for RecordingRunner {
        async fn run(&self, script: &str) -> BridgeResult<String> {
            if let Ok(mut scripts) = self.scripts.lock() {
                scripts.push(script.to_string());
            }
            self.responses
                .lock()
                .ok()
                .and_then(|mut queue| queue.pop_front())
                .unwrap_or_else(|| Err(BridgeError::script_failed("osascript unavailable")))
        }
    }

    /// Records opened URLs; optionally fails every open.
    #[derive(Debug, Default)]
    pub struct RecordingOpener {
        urls: Mutex<Vec<String>>,
        fail: bool,
    }

    impl RecordingOpener {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        pub fn urls(&self) -> Vec<String> {
            self.urls.lock().map(|u| u.clone()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl UrlOpener for RecordingOpener {
        async fn open(&self, url: &str) -> BridgeResult<()> {
            if self.fail {
                return Err(BridgeError::url_open("no URL handler"));
            }
            if let Ok(mut urls) = self.urls.lock() {
                urls.push(url.to_string());
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{RecordingOpener, RecordingRunner};
    use super::*;

    fn make_bridge(runner: RecordingRunner) -> (ThingsBridge, Arc<RecordingRunner>, Arc<RecordingOpener>) {
        let runner = Arc::new(runner);
        let opener = Arc::new(RecordingOpener::new());
        let bridge = ThingsBridge::new(runner.clone(), opener.clone())
            .with_auth_token(Some("tok".into()));
        (bridge, runner, opener)
    }

    #[tokio::test]
    async fn test_add_todo_uses_script_result() {
        let (bridge, runner, opener) = make_bridge(RecordingRunner::new().respond(Ok("NEW-ID".into())));

        let outcome = bridge.add_todo(&NewTodo::new("Milk")).await.unwrap();

        assert_eq!(outcome, WriteOutcome::Script { output: "NEW-ID".into() });
        assert_eq!(runner.scripts().len(), 1);
        assert!(opener.urls().is_empty());
    }

    #[tokio::test]
    async fn test_things_error_falls_back_to_url() {
        let (bridge, _, opener) =
            make_bridge(RecordingRunner::new().respond(Ok("Error: Can't make to do".into())));

        let outcome = bridge.add_todo(&NewTodo::new("Milk")).await.unwrap();

        assert!(matches!(outcome, WriteOutcome::UrlScheme { .. }));
        assert_eq!(opener.urls(), vec!["things:///add?title=Milk"]);
    }

    #[tokio::test]
    async fn test_checklist_skips_applescript() {
        let (bridge, runner, opener) = make_bridge(RecordingRunner::new());
        let todo = NewTodo {
            checklist_items: vec!["a".into()],
            ..NewTodo::new("Pack")
        };

        let outcome = bridge.add_todo(&todo).await.unwrap();

        assert!(matches!(outcome, WriteOutcome::UrlScheme { .. }));
        assert!(runner.scripts().is_empty());
        assert_eq!(opener.urls().len(), 1);
    }

    #[tokio::test]
    async fn test_update_fallback_carries_token() {
        let (bridge, _, opener) = make_bridge(RecordingRunner::new());

        bridge.update_todo(&TodoUpdate::new("T1")).await.unwrap();

        assert_eq!(opener.urls(), vec!["things:///update?id=T1&auth-token=tok"]);
    }

    #[tokio::test]
    async fn test_show_tries_todo_then_project_then_url() {
        let (bridge, runner, opener) = make_bridge(
            RecordingRunner::new()
                .respond(Err(BridgeError::script_failed("no such to do")))
                .respond(Ok(String::new())),
        );

        let outcome = bridge.show("P1").await.unwrap();

        assert!(matches!(outcome, WriteOutcome::Script { .. }));
        let scripts = runner.scripts();
        assert!(scripts[0].contains("show to do id \"P1\""));
        assert!(scripts[1].contains("show project id \"P1\""));
        assert!(opener.urls().is_empty());

        let (bridge, _, opener) = make_bridge(RecordingRunner::new());
        bridge.show("today").await.unwrap();
        assert_eq!(opener.urls(), vec!["things:///show?id=today"]);
    }

    #[tokio::test]
    async fn test_url_open_failure_is_reported() {
        let bridge = ThingsBridge::new(
            Arc::new(RecordingRunner::new()),
            Arc::new(RecordingOpener::failing()),
        );
        let err = bridge.search("tax").await.unwrap_err();
        assert!(matches!(err, BridgeError::UrlOpen(_)));
    }

    #[tokio::test]
    async fn test_is_ready() {
        let (ready, _, _) = make_bridge(RecordingRunner::new().respond(Ok("Things3".into())));
        assert!(ready.is_ready().await);

        let (stopped, _, _) = make_bridge(RecordingRunner::new().respond(Ok("not running".into())));
        assert!(!stopped.is_ready().await);
    }
}

//! The browser boundary
//!
//! The automation runtime is an external collaborator; the harness consumes
//! it through this trait and nothing else. Verbs either act (click, type),
//! observe (text, counts), or wait — the runtime's own "poll a predicate
//! until satisfied or timeout" capability surfaces as `wait_for_text` /
//! `wait_gone` so backends can use whatever retry machinery they have.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::poll::PollBudget;
use crate::target::Target;

/// Where a text expectation looks.
#[derive(Debug, Clone)]
pub enum Scope {
    /// Anywhere in the rendered page
    Page,
    /// Inside elements matching the target
    In(Target),
}

impl Scope {
    pub fn describe(&self) -> String {
        match self {
            Scope::Page => "page".to_string(),
            Scope::In(t) => t.to_string(),
        }
    }
}

/// Keys the harness needs for workaround paths and shell input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStroke {
    Tab,
    Enter,
    End,
    Escape,
}

/// Opaque authenticated-state snapshot.
///
/// The WebDriver protocol has no full browser-context snapshot, so this is
/// the cookie jar; the suite never inspects it, only hands it back to
/// [`Browser::restore_session`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionState {
    cookies: Vec<serde_json::Value>,
}

impl SessionState {
    pub fn new(cookies: Vec<serde_json::Value>) -> Self {
        Self { cookies }
    }

    pub fn cookies(&self) -> &[serde_json::Value] {
        &self.cookies
    }
}

/// Primitive browser capability consumed by the harness.
///
/// One browser context, one interaction stream: callers issue verbs
/// strictly sequentially and every verb completes (possibly after internal
/// polling) before the next is issued.
#[async_trait]
pub trait Browser: Send + Sync {
    /// Navigate to a path relative to the configured base URL.
    async fn goto(&self, path: &str) -> Result<()>;

    async fn reload(&self) -> Result<()>;

    async fn current_path(&self) -> Result<String>;

    /// Click the single element matching `target`. Zero matches after the
    /// element budget is a `NotFound`; more than one is `Ambiguous` and is
    /// not retried — ambiguity means a broken layout assumption.
    async fn click(&self, target: &Target) -> Result<()>;

    /// Type into the matched element. Does not clear; callers that need
    /// clear-then-type go through the `type_value` vocabulary.
    async fn type_text(&self, target: &Target, text: &str) -> Result<()>;

    async fn clear(&self, target: &Target) -> Result<()>;

    /// Send a key to the focused element.
    async fn press(&self, key: KeyStroke) -> Result<()>;

    /// Type into whatever currently has focus (tab-navigation fallback).
    async fn type_active(&self, text: &str) -> Result<()>;

    /// Attach a local file to a file input.
    async fn attach_file(&self, target: &Target, path: &Path) -> Result<()>;

    /// Visible text of the single matching element.
    async fn text_of(&self, target: &Target) -> Result<String>;

    /// Number of elements currently matching, without waiting.
    async fn count(&self, target: &Target) -> Result<usize>;

    /// Full rendered text of the page body.
    async fn page_text(&self) -> Result<String>;

    /// Whether the matching element carries the `disabled` attribute.
    async fn is_disabled(&self, target: &Target) -> Result<bool>;

    /// Poll until `text` is rendered within `scope` or the budget expires.
    async fn wait_for_text(&self, scope: &Scope, text: &str, budget: PollBudget) -> Result<()>;

    /// Poll until `text` is no longer rendered within `scope`.
    async fn wait_gone(&self, scope: &Scope, text: &str, budget: PollBudget) -> Result<()>;

    /// Start watching for a request to an endpoint path prefix. Used once,
    /// for login synchronization; the suite makes no other network-level
    /// observations.
    async fn watch_request(&self, method: &str, path_prefix: &str) -> Result<()>;

    /// Wait for a previously watched request to complete.
    async fn wait_for_request(&self, path_prefix: &str, budget: PollBudget) -> Result<()>;

    async fn snapshot_session(&self) -> Result<SessionState>;

    async fn restore_session(&self, state: &SessionState) -> Result<()>;

    /// Save a screenshot under `name`; used when a workaround fires so the
    /// deviation leaves evidence.
    async fn screenshot(&self, name: &str) -> Result<PathBuf>;
}

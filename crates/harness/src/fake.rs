//! Scripted in-memory browser used by the unit tests
//!
//! Element text is scripted as per-target timelines: each read returns the
//! next entry and the last one sticks. That is enough to exercise the
//! eventual-consistency paths (a badge that flips to Active after a few
//! polls, a deleted row that lingers before vanishing) without a browser.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::{sleep, Instant};

use crate::browser::{Browser, KeyStroke, Scope, SessionState};
use crate::error::{Error, Result};
use crate::poll::PollBudget;
use crate::target::Target;

#[derive(Default)]
struct Timeline {
    values: Vec<String>,
    idx: usize,
}

impl Timeline {
    fn single(value: impl Into<String>) -> Self {
        Self {
            values: vec![value.into()],
            idx: 0,
        }
    }

    fn next(&mut self) -> String {
        if self.values.is_empty() {
            return String::new();
        }
        let v = self.values[self.idx].clone();
        if self.idx + 1 < self.values.len() {
            self.idx += 1;
        }
        v
    }
}

#[derive(Default)]
pub(crate) struct FakeBrowser {
    calls: Mutex<Vec<String>>,
    fields: Mutex<HashMap<String, String>>,
    texts: Mutex<HashMap<String, Timeline>>,
    page: Mutex<Timeline>,
    counts: Mutex<HashMap<String, usize>>,
    disabled: Mutex<HashMap<String, Vec<bool>>>,
    session: Mutex<Option<SessionState>>,
    fail_click: Mutex<Option<String>>,
    path: Mutex<String>,
    snapshots: Mutex<u64>,
}

impl FakeBrowser {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().push(call.into());
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub(crate) fn calls_matching(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    pub(crate) fn set_text(&self, target: &Target, text: impl Into<String>) {
        self.texts
            .lock()
            .insert(target.to_string(), Timeline::single(text));
    }

    /// Script a sequence of element texts; each read advances, the last
    /// value sticks.
    pub(crate) fn push_texts(&self, target: &Target, values: &[&str]) {
        self.texts.lock().insert(
            target.to_string(),
            Timeline {
                values: values.iter().map(|s| s.to_string()).collect(),
                idx: 0,
            },
        );
    }

    pub(crate) fn set_page_text(&self, text: impl Into<String>) {
        *self.page.lock() = Timeline::single(text);
    }

    pub(crate) fn push_page_texts(&self, values: &[&str]) {
        *self.page.lock() = Timeline {
            values: values.iter().map(|s| s.to_string()).collect(),
            idx: 0,
        };
    }

    pub(crate) fn set_count(&self, target: &Target, n: usize) {
        self.counts.lock().insert(target.to_string(), n);
    }

    /// Script the disabled-attribute reads for a target, in order; the last
    /// value sticks.
    pub(crate) fn set_disabled_seq(&self, target: &Target, seq: &[bool]) {
        self.disabled.lock().insert(target.to_string(), seq.to_vec());
    }

    pub(crate) fn set_field(&self, target: &Target, value: impl Into<String>) {
        self.fields.lock().insert(target.to_string(), value.into());
    }

    pub(crate) fn field(&self, target: &Target) -> Option<String> {
        self.fields.lock().get(&target.to_string()).cloned()
    }

    pub(crate) fn fail_next_click(&self, reason: &str) {
        *self.fail_click.lock() = Some(reason.to_string());
    }

    fn scope_text(&self, scope: &Scope) -> String {
        match scope {
            Scope::Page => self.page.lock().next(),
            Scope::In(target) => self
                .texts
                .lock()
                .entry(target.to_string())
                .or_default()
                .next(),
        }
    }
}

#[async_trait]
impl Browser for FakeBrowser {
    async fn goto(&self, path: &str) -> Result<()> {
        self.record(format!("goto:{path}"));
        *self.path.lock() = path.to_string();
        Ok(())
    }

    async fn reload(&self) -> Result<()> {
        self.record("reload");
        Ok(())
    }

    async fn current_path(&self) -> Result<String> {
        Ok(self.path.lock().clone())
    }

    async fn click(&self, target: &Target) -> Result<()> {
        self.record(format!("click:{target}"));
        if let Some(reason) = self.fail_click.lock().take() {
            return Err(Error::StepFailed {
                step: format!("click:{target}"),
                reason,
            });
        }
        Ok(())
    }

    async fn type_text(&self, target: &Target, text: &str) -> Result<()> {
        self.record(format!("type:{target}:{text}"));
        self.fields
            .lock()
            .entry(target.to_string())
            .or_default()
            .push_str(text);
        Ok(())
    }

    async fn clear(&self, target: &Target) -> Result<()> {
        self.record(format!("clear:{target}"));
        self.fields.lock().insert(target.to_string(), String::new());
        Ok(())
    }

    async fn press(&self, key: KeyStroke) -> Result<()> {
        self.record(format!("press:{key:?}"));
        Ok(())
    }

    async fn type_active(&self, text: &str) -> Result<()> {
        self.record(format!("type-active:{text}"));
        Ok(())
    }

    async fn attach_file(&self, target: &Target, path: &Path) -> Result<()> {
        self.record(format!("attach:{target}:{}", path.display()));
        Ok(())
    }

    async fn text_of(&self, target: &Target) -> Result<String> {
        let mut texts = self.texts.lock();
        match texts.get_mut(&target.to_string()) {
            Some(timeline) => Ok(timeline.next()),
            None => Err(Error::NotFound {
                target: target.to_string(),
            }),
        }
    }

    async fn count(&self, target: &Target) -> Result<usize> {
        Ok(self
            .counts
            .lock()
            .get(&target.to_string())
            .copied()
            .unwrap_or(0))
    }

    async fn page_text(&self) -> Result<String> {
        Ok(self.page.lock().next())
    }

    async fn is_disabled(&self, target: &Target) -> Result<bool> {
        let mut map = self.disabled.lock();
        let seq = map.entry(target.to_string()).or_default();
        if seq.is_empty() {
            return Ok(false);
        }
        if seq.len() == 1 {
            return Ok(seq[0]);
        }
        Ok(seq.remove(0))
    }

    async fn wait_for_text(&self, scope: &Scope, text: &str, budget: PollBudget) -> Result<()> {
        self.record(format!("wait-text:{}:{text}", scope.describe()));
        let start = Instant::now();
        loop {
            if self.scope_text(scope).contains(text) {
                return Ok(());
            }
            if start.elapsed() >= budget.timeout {
                return Err(Error::timeout(
                    format!("text {text:?} in {}", scope.describe()),
                    start.elapsed(),
                ));
            }
            sleep(budget.interval).await;
        }
    }

    async fn wait_gone(&self, scope: &Scope, text: &str, budget: PollBudget) -> Result<()> {
        self.record(format!("wait-gone:{}:{text}", scope.describe()));
        let start = Instant::now();
        loop {
            if !self.scope_text(scope).contains(text) {
                return Ok(());
            }
            if start.elapsed() >= budget.timeout {
                return Err(Error::timeout(
                    format!("text {text:?} to leave {}", scope.describe()),
                    start.elapsed(),
                ));
            }
            sleep(budget.interval).await;
        }
    }

    async fn watch_request(&self, method: &str, path_prefix: &str) -> Result<()> {
        self.record(format!("watch:{method}:{path_prefix}"));
        Ok(())
    }

    async fn wait_for_request(&self, path_prefix: &str, _budget: PollBudget) -> Result<()> {
        self.record(format!("wait-request:{path_prefix}"));
        Ok(())
    }

    async fn snapshot_session(&self) -> Result<SessionState> {
        self.record("snapshot");
        let n = {
            let mut s = self.snapshots.lock();
            *s += 1;
            *s
        };
        let state = SessionState::new(vec![serde_json::json!({ "token": n })]);
        *self.session.lock() = Some(state.clone());
        Ok(state)
    }

    async fn restore_session(&self, state: &SessionState) -> Result<()> {
        self.record("restore");
        *self.session.lock() = Some(state.clone());
        Ok(())
    }

    async fn screenshot(&self, name: &str) -> Result<PathBuf> {
        self.record(format!("screenshot:{name}"));
        Ok(PathBuf::from(format!("screenshots/{name}.png")))
    }
}

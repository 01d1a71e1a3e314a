//! Global timing interceptor
//!
//! The dashboard re-renders asynchronously after most interactions; scripts
//! that fire the next action immediately race the render and fail
//! intermittently. [`Settled`] wraps a [`Browser`] and sleeps one fixed
//! quantum after each intercepted verb — navigate, click, type, clear,
//! reload and the text-assertion waits — before yielding back to the
//! caller. The policy is applied once, at harness construction, so no call
//! site can opt out; pure reads used inside polling loops are exempt so
//! poll budgets stay honest.
//!
//! The delay never verifies that settling actually happened. Real flakiness
//! still surfaces downstream as assertion timeouts.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use crate::browser::{Browser, KeyStroke, Scope, SessionState};
use crate::error::Result;
use crate::poll::PollBudget;
use crate::target::Target;

/// Browser decorator injecting a fixed post-action settle delay.
pub struct Settled<B> {
    inner: B,
    quantum: Duration,
    delays: AtomicU64,
}

impl<B> Settled<B> {
    pub fn new(inner: B, quantum: Duration) -> Self {
        Self {
            inner,
            quantum,
            delays: AtomicU64::new(0),
        }
    }

    /// Number of settle delays applied so far. One per intercepted
    /// primitive invocation, never more — nested macros do not compound.
    pub fn delays_applied(&self) -> u64 {
        self.delays.load(Ordering::Relaxed)
    }

    async fn settle(&self) {
        self.delays.fetch_add(1, Ordering::Relaxed);
        if !self.quantum.is_zero() {
            sleep(self.quantum).await;
        }
    }
}

#[async_trait]
impl<B: Browser> Browser for Settled<B> {
    async fn goto(&self, path: &str) -> Result<()> {
        let res = self.inner.goto(path).await;
        self.settle().await;
        res
    }

    async fn reload(&self) -> Result<()> {
        let res = self.inner.reload().await;
        self.settle().await;
        res
    }

    async fn current_path(&self) -> Result<String> {
        self.inner.current_path().await
    }

    async fn click(&self, target: &Target) -> Result<()> {
        let res = self.inner.click(target).await;
        self.settle().await;
        res
    }

    async fn type_text(&self, target: &Target, text: &str) -> Result<()> {
        let res = self.inner.type_text(target, text).await;
        self.settle().await;
        res
    }

    async fn clear(&self, target: &Target) -> Result<()> {
        let res = self.inner.clear(target).await;
        self.settle().await;
        res
    }

    async fn press(&self, key: KeyStroke) -> Result<()> {
        self.inner.press(key).await
    }

    async fn type_active(&self, text: &str) -> Result<()> {
        self.inner.type_active(text).await
    }

    async fn attach_file(&self, target: &Target, path: &Path) -> Result<()> {
        self.inner.attach_file(target, path).await
    }

    async fn text_of(&self, target: &Target) -> Result<String> {
        self.inner.text_of(target).await
    }

    async fn count(&self, target: &Target) -> Result<usize> {
        self.inner.count(target).await
    }

    async fn page_text(&self) -> Result<String> {
        self.inner.page_text().await
    }

    async fn is_disabled(&self, target: &Target) -> Result<bool> {
        self.inner.is_disabled(target).await
    }

    async fn wait_for_text(&self, scope: &Scope, text: &str, budget: PollBudget) -> Result<()> {
        let res = self.inner.wait_for_text(scope, text, budget).await;
        self.settle().await;
        res
    }

    async fn wait_gone(&self, scope: &Scope, text: &str, budget: PollBudget) -> Result<()> {
        let res = self.inner.wait_gone(scope, text, budget).await;
        self.settle().await;
        res
    }

    async fn watch_request(&self, method: &str, path_prefix: &str) -> Result<()> {
        self.inner.watch_request(method, path_prefix).await
    }

    async fn wait_for_request(&self, path_prefix: &str, budget: PollBudget) -> Result<()> {
        self.inner.wait_for_request(path_prefix, budget).await
    }

    async fn snapshot_session(&self) -> Result<SessionState> {
        self.inner.snapshot_session().await
    }

    async fn restore_session(&self, state: &SessionState) -> Result<()> {
        self.inner.restore_session(state).await
    }

    async fn screenshot(&self, name: &str) -> Result<PathBuf> {
        self.inner.screenshot(name).await
    }
}

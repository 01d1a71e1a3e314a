//! The action vocabulary
//!
//! [`Ui`] wraps the browser boundary with the named, reusable commands the
//! lifecycle macros are written in. Selector logic stays in [`Target`];
//! this layer adds the behavioral guarantees: `type_value` always clears
//! first, destructive confirmation assumes an open dialog, nav drill-down
//! clicks strictly in order.

use std::path::Path;
use std::sync::Arc;

use regex::Regex;
use tracing::debug;

use crate::browser::{Browser, KeyStroke, Scope, SessionState};
use crate::error::{Error, Result};
use crate::poll::{poll_until, PollBudget};
use crate::target::Target;

/// Where a value lands: a labeled form field or an explicit target.
#[derive(Debug, Clone)]
pub enum Field {
    Label(String),
    At(Target),
}

/// One field-typing action. `sensitive` keeps the value out of the logs.
#[derive(Debug, Clone)]
pub struct TypeValue {
    field: Field,
    value: String,
    sensitive: bool,
}

impl TypeValue {
    pub fn label(label: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        Self {
            field: Field::Label(label.as_ref().to_string()),
            value: value.as_ref().to_string(),
            sensitive: false,
        }
    }

    pub fn at(target: Target, value: impl AsRef<str>) -> Self {
        Self {
            field: Field::At(target),
            value: value.as_ref().to_string(),
            sensitive: false,
        }
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    fn target(&self) -> Target {
        match &self.field {
            Field::Label(l) => Target::label(l.clone()),
            Field::At(t) => t.clone(),
        }
    }

    /// What the logs may show for this value.
    pub(crate) fn loggable(&self) -> &str {
        if self.sensitive {
            "<redacted>"
        } else {
            &self.value
        }
    }
}

/// High-level command surface over one browser context.
#[derive(Clone)]
pub struct Ui {
    browser: Arc<dyn Browser>,
    element_budget: PollBudget,
}

impl Ui {
    pub fn new(browser: Arc<dyn Browser>) -> Self {
        Self {
            browser,
            element_budget: PollBudget::element(),
        }
    }

    pub fn browser(&self) -> &Arc<dyn Browser> {
        &self.browser
    }

    pub async fn goto(&self, path: &str) -> Result<()> {
        debug!(path, "navigate");
        self.browser.goto(path).await
    }

    pub async fn reload(&self) -> Result<()> {
        self.browser.reload().await
    }

    pub async fn click(&self, target: &Target) -> Result<()> {
        debug!(%target, "click");
        self.browser.click(target).await
    }

    /// Click a button-styled element by its label.
    pub async fn click_button(&self, label: &str) -> Result<()> {
        self.click(&Target::button(label)).await
    }

    /// Click the confirmation control of an already-open destructive-action
    /// dialog. Fails if no dialog is open.
    pub async fn confirm_delete(&self) -> Result<()> {
        self.click(&Target::test_id("prompt-remove-confirm-button"))
            .await
    }

    /// Drill into nested menus: each label is clicked inside the persistent
    /// nav element, assuming the previous click revealed the next entry.
    pub async fn click_nav_menu(&self, labels: &[&str]) -> Result<()> {
        for label in labels {
            self.click(&Target::nav(*label)).await?;
        }
        Ok(())
    }

    /// Type a value into a field, always clearing existing content first.
    /// Callers never clear manually.
    pub async fn type_value(&self, tv: TypeValue) -> Result<()> {
        let target = tv.target();
        debug!(%target, value = tv.loggable(), "type value");
        self.browser.clear(&target).await?;
        self.browser.type_text(&target, &tv.value).await
    }

    pub async fn press(&self, key: KeyStroke) -> Result<()> {
        self.browser.press(key).await
    }

    /// Type into the focused element; only workaround paths use this.
    pub async fn type_active(&self, text: &str) -> Result<()> {
        self.browser.type_active(text).await
    }

    pub async fn attach_file(&self, target: &Target, path: &Path) -> Result<()> {
        debug!(%target, file = %path.display(), "attach file");
        self.browser.attach_file(target, path).await
    }

    /// Assert `text` renders within the default element budget.
    pub async fn expect_text(&self, scope: Scope, text: &str) -> Result<()> {
        self.browser
            .wait_for_text(&scope, text, self.element_budget)
            .await
    }

    pub async fn expect_text_within(
        &self,
        scope: Scope,
        text: &str,
        budget: PollBudget,
    ) -> Result<()> {
        self.browser.wait_for_text(&scope, text, budget).await
    }

    /// Assert `text` is absent (or leaves) within the default budget.
    pub async fn expect_gone(&self, scope: Scope, text: &str) -> Result<()> {
        self.browser
            .wait_gone(&scope, text, self.element_budget)
            .await
    }

    pub async fn expect_gone_within(
        &self,
        scope: Scope,
        text: &str,
        budget: PollBudget,
    ) -> Result<()> {
        self.browser.wait_gone(&scope, text, budget).await
    }

    /// Assert the text of `target` matches `pattern` within the budget.
    pub async fn expect_match(
        &self,
        target: &Target,
        pattern: &Regex,
        budget: PollBudget,
    ) -> Result<()> {
        let what = format!("{target} to match /{pattern}/");
        let browser = &self.browser;
        poll_until(&what, budget, move || async move {
            match browser.text_of(target).await {
                Ok(text) => Ok(pattern.is_match(&text)),
                Err(Error::NotFound { .. }) => Ok(false),
                Err(e) => Err(e),
            }
        })
        .await
    }

    /// Whether any element matches right now, without waiting.
    pub async fn exists_now(&self, target: &Target) -> Result<bool> {
        Ok(self.browser.count(target).await? > 0)
    }

    /// Poll until at least one element matches `target`.
    pub async fn expect_present(&self, target: &Target) -> Result<()> {
        let what = format!("{target} to be present");
        let browser = &self.browser;
        poll_until(&what, self.element_budget, move || async move {
            Ok(browser.count(target).await? > 0)
        })
        .await
    }

    /// Assert a control carries the `disabled` attribute right now.
    pub async fn expect_disabled(&self, target: &Target) -> Result<()> {
        if self.browser.is_disabled(target).await? {
            Ok(())
        } else {
            Err(Error::StepFailed {
                step: format!("expect-disabled:{target}"),
                reason: "control is enabled".into(),
            })
        }
    }

    /// Poll until a control loses its `disabled` attribute.
    pub async fn expect_enabled_within(&self, target: &Target, budget: PollBudget) -> Result<()> {
        let what = format!("{target} to become enabled");
        let browser = &self.browser;
        poll_until(&what, budget, move || async move {
            Ok(!browser.is_disabled(target).await?)
        })
        .await
    }

    pub async fn snapshot_session(&self) -> Result<SessionState> {
        self.browser.snapshot_session().await
    }

    pub async fn restore_session(&self, state: &SessionState) -> Result<()> {
        self.browser.restore_session(state).await
    }
}

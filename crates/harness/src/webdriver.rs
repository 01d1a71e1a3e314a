//! WebDriver-backed browser
//!
//! Implements the [`Browser`] boundary over a chromedriver (or any
//! WebDriver) endpoint via `thirtyfour`. Targets render to CSS where the
//! dashboard gives us attributes and to XPath where only text containment
//! works; the session snapshot is the cookie jar; the login request watch
//! is a fetch/XHR recorder injected into the page, since the protocol has
//! no native network interception.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thirtyfour::prelude::*;
use thirtyfour::{Cookie, Key};
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::browser::{Browser, KeyStroke, Scope, SessionState};
use crate::error::{Error, Result};
use crate::poll::PollBudget;
use crate::target::Target;

/// Recorder installed once per page; completed fetch/XHR exchanges are
/// appended to `window.__e2eRequests` as "METHOD /path".
const REQUEST_RECORDER: &str = r#"
if (!window.__e2eRequests) {
  window.__e2eRequests = [];
  const record = (method, url) => {
    try {
      const u = new URL(url, window.location.origin);
      window.__e2eRequests.push(method.toUpperCase() + ' ' + u.pathname);
    } catch (e) { /* opaque URL, ignore */ }
  };
  const origFetch = window.fetch;
  window.fetch = function(input, init) {
    const url = (typeof input === 'string') ? input : input.url;
    const method = (init && init.method) || (input && input.method) || 'GET';
    return origFetch.apply(this, arguments).then((resp) => {
      record(method, url);
      return resp;
    });
  };
  const origOpen = XMLHttpRequest.prototype.open;
  XMLHttpRequest.prototype.open = function(method, url) {
    this.addEventListener('loadend', () => record(method, url));
    return origOpen.apply(this, arguments);
  };
}
"#;

const READ_RECORDED: &str = "return window.__e2eRequests || [];";

/// Configuration for connecting the browser
#[derive(Debug, Clone)]
pub struct WebDriverConfig {
    /// WebDriver endpoint, e.g. "http://127.0.0.1:9515"
    pub webdriver_url: String,
    /// Dashboard base URL all relative paths resolve against
    pub base_url: String,
    /// Where Chrome drops downloads
    pub download_dir: PathBuf,
    /// Where workaround screenshots land
    pub screenshot_dir: PathBuf,
    /// Budget for an element to appear before an action fails
    pub element_budget: PollBudget,
    pub headless: bool,
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://127.0.0.1:9515".to_string(),
            base_url: "https://localhost".to_string(),
            download_dir: PathBuf::from("downloads"),
            screenshot_dir: PathBuf::from("screenshots"),
            element_budget: PollBudget::element(),
            headless: true,
        }
    }
}

/// `Browser` implementation over a WebDriver session
pub struct WebBrowser {
    driver: WebDriver,
    base_url: String,
    screenshot_dir: PathBuf,
    element_budget: PollBudget,
    watched: parking_lot::Mutex<Vec<String>>,
}

impl WebBrowser {
    pub async fn connect(config: WebDriverConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.download_dir)?;
        let download_dir = std::fs::canonicalize(&config.download_dir)?;

        let mut caps = DesiredCapabilities::chrome();
        if config.headless {
            caps.set_headless()?;
        }
        // The dashboard usually runs on a self-signed certificate.
        caps.set_ignore_certificate_errors()?;
        caps.add_experimental_option(
            "prefs",
            serde_json::json!({
                "download.default_directory": download_dir.to_string_lossy(),
                "download.prompt_for_download": false,
            }),
        )?;

        let driver = WebDriver::new(&config.webdriver_url, caps).await?;
        Ok(Self {
            driver,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            screenshot_dir: config.screenshot_dir,
            element_budget: config.element_budget,
            watched: parking_lot::Mutex::new(Vec::new()),
        })
    }

    /// End the WebDriver session.
    pub async fn quit(self) -> Result<()> {
        self.driver.quit().await?;
        Ok(())
    }

    fn absolute(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        }
    }

    async fn find_candidates(&self, target: &Target) -> Result<Vec<WebElement>> {
        match target {
            Target::TextIn { css, text } => {
                let mut matching = Vec::new();
                for elem in self.driver.find_all(By::Css(css.as_str())).await? {
                    if elem.text().await.unwrap_or_default().contains(text.as_str()) {
                        matching.push(elem);
                    }
                }
                Ok(matching)
            }
            other => {
                let by = locator(other);
                Ok(self.driver.find_all(by).await?)
            }
        }
    }

    /// Resolve a target to one element, polling within the element budget.
    /// Containment targets take the first match; attribute/position targets
    /// must match exactly one — ambiguity is a broken layout assumption and
    /// fails immediately.
    async fn resolve_one(&self, target: &Target) -> Result<WebElement> {
        let strict = matches!(
            target,
            Target::Css(_)
                | Target::TestId(_)
                | Target::LabeledInput(_)
                | Target::KvKey { .. }
                | Target::KvValue { .. }
        );
        let start = Instant::now();
        loop {
            let mut candidates = self.find_candidates(target).await?;
            match candidates.len() {
                0 => {}
                1 => return Ok(candidates.remove(0)),
                n if strict => {
                    return Err(Error::Ambiguous {
                        target: target.to_string(),
                        matches: n,
                    })
                }
                _ => return Ok(candidates.remove(0)),
            }
            if start.elapsed() >= self.element_budget.timeout {
                return Err(Error::NotFound {
                    target: target.to_string(),
                });
            }
            sleep(self.element_budget.interval).await;
        }
    }

    async fn scope_text(&self, scope: &Scope) -> Result<String> {
        match scope {
            Scope::Page => self.page_text().await,
            Scope::In(target) => {
                let mut combined = String::new();
                for elem in self.find_candidates(target).await? {
                    combined.push_str(&elem.text().await.unwrap_or_default());
                    combined.push('\n');
                }
                Ok(combined)
            }
        }
    }
}

/// Render a target to a WebDriver locator. `TextIn` is resolved
/// client-side and never reaches this function.
fn locator(target: &Target) -> By {
    match target {
        Target::Css(sel) => By::Css(sel.as_str()),
        Target::TestId(_) | Target::KvKey { .. } | Target::KvValue { .. } => {
            By::Css(css_for(target).unwrap_or_default())
        }
        Target::LabeledInput(_) | Target::Button(_) | Target::NavItem(_) | Target::Text(_) => {
            By::XPath(xpath_for(target).unwrap_or_default())
        }
        Target::TextIn { css, .. } => By::Css(css.as_str()),
    }
}

/// CSS rendering for attribute- and position-addressed targets.
fn css_for(target: &Target) -> Option<String> {
    match target {
        Target::Css(sel) => Some(sel.clone()),
        Target::TestId(id) => Some(format!(r#"[data-testid="{id}"]"#)),
        Target::KvKey { block, row } => Some(if *row == 0 {
            format!(r#"[data-testid="{block}"] > .kv-container > .kv-item.key"#)
        } else {
            format!(
                r#"[data-testid="{block}"] > .kv-container > :nth-child({}) > input"#,
                Target::kv_child_index(*row)
            )
        }),
        Target::KvValue { block, row } => Some(if *row == 0 {
            format!(r#"[data-testid="{block}"] > .kv-container > .kv-item.value"#)
        } else {
            format!(
                r#"[data-testid="{block}"] > .kv-container > :nth-child({}) > .no-resize"#,
                Target::kv_child_index(*row) + 1
            )
        }),
        _ => None,
    }
}

/// XPath rendering for text-addressed targets.
fn xpath_for(target: &Target) -> Option<String> {
    match target {
        Target::LabeledInput(label) => Some(format!(
            ".//*[contains(@class,'labeled-input')][contains(normalize-space(.),'{label}')]//input"
        )),
        Target::Button(label) => Some(format!(
            ".//*[contains(@class,'btn')][contains(normalize-space(.),'{label}')]"
        )),
        Target::NavItem(label) => Some(format!(
            ".//nav//*[contains(normalize-space(text()),'{label}')]"
        )),
        Target::Text(text) => Some(format!(".//*[contains(normalize-space(text()),'{text}')]")),
        _ => None,
    }
}

fn key_sequence(key: KeyStroke) -> String {
    let k = match key {
        KeyStroke::Tab => Key::Tab,
        KeyStroke::Enter => Key::Enter,
        KeyStroke::End => Key::End,
        KeyStroke::Escape => Key::Escape,
    };
    (k + "").to_string()
}

#[async_trait]
impl Browser for WebBrowser {
    async fn goto(&self, path: &str) -> Result<()> {
        self.driver.goto(self.absolute(path)).await?;
        Ok(())
    }

    async fn reload(&self) -> Result<()> {
        self.driver.refresh().await?;
        Ok(())
    }

    async fn current_path(&self) -> Result<String> {
        Ok(self.driver.current_url().await?.path().to_string())
    }

    async fn click(&self, target: &Target) -> Result<()> {
        let elem = self.resolve_one(target).await?;
        elem.scroll_into_view().await?;
        elem.click().await?;
        Ok(())
    }

    async fn type_text(&self, target: &Target, text: &str) -> Result<()> {
        let elem = self.resolve_one(target).await?;
        elem.send_keys(text).await?;
        Ok(())
    }

    async fn clear(&self, target: &Target) -> Result<()> {
        let elem = self.resolve_one(target).await?;
        elem.focus().await?;
        elem.clear().await?;
        Ok(())
    }

    async fn press(&self, key: KeyStroke) -> Result<()> {
        let active = self.driver.active_element().await?;
        active.send_keys(key_sequence(key)).await?;
        Ok(())
    }

    async fn type_active(&self, text: &str) -> Result<()> {
        let active = self.driver.active_element().await?;
        active.send_keys(text).await?;
        Ok(())
    }

    async fn attach_file(&self, target: &Target, path: &Path) -> Result<()> {
        let elem = self.resolve_one(target).await?;
        let absolute = std::fs::canonicalize(path)?;
        elem.send_keys(absolute.to_string_lossy().as_ref()).await?;
        Ok(())
    }

    async fn text_of(&self, target: &Target) -> Result<String> {
        let elem = self.resolve_one(target).await?;
        Ok(elem.text().await?)
    }

    async fn count(&self, target: &Target) -> Result<usize> {
        Ok(self.find_candidates(target).await?.len())
    }

    async fn page_text(&self) -> Result<String> {
        let body = self.driver.find(By::Tag("body")).await?;
        Ok(body.text().await?)
    }

    async fn is_disabled(&self, target: &Target) -> Result<bool> {
        let elem = self.resolve_one(target).await?;
        Ok(elem.attr("disabled").await?.is_some())
    }

    async fn wait_for_text(&self, scope: &Scope, text: &str, budget: PollBudget) -> Result<()> {
        let start = Instant::now();
        loop {
            if self.scope_text(scope).await?.contains(text) {
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
        let start = Instant::now();
        loop {
            if !self.scope_text(scope).await?.contains(text) {
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
        debug!(method, path_prefix, "installing request recorder");
        self.driver.execute(REQUEST_RECORDER, Vec::new()).await?;
        self.watched
            .lock()
            .push(format!("{} {}", method.to_uppercase(), path_prefix));
        Ok(())
    }

    async fn wait_for_request(&self, path_prefix: &str, budget: PollBudget) -> Result<()> {
        let needle = {
            let watched = self.watched.lock();
            watched
                .iter()
                .rev()
                .find(|w| w.ends_with(path_prefix))
                .cloned()
        }
        .ok_or_else(|| Error::StepFailed {
            step: format!("wait-request:{path_prefix}"),
            reason: "no watch registered for this endpoint".into(),
        })?;

        let start = Instant::now();
        loop {
            let ret = self.driver.execute(READ_RECORDED, Vec::new()).await?;
            let recorded = ret.json().clone();
            let seen = recorded
                .as_array()
                .map(|entries| {
                    entries
                        .iter()
                        .filter_map(|v| v.as_str())
                        .any(|entry| entry.starts_with(&needle))
                })
                .unwrap_or(false);
            if seen {
                return Ok(());
            }
            if start.elapsed() >= budget.timeout {
                return Err(Error::timeout(
                    format!("request {needle}"),
                    start.elapsed(),
                ));
            }
            sleep(budget.interval).await;
        }
    }

    async fn snapshot_session(&self) -> Result<SessionState> {
        let cookies = self.driver.get_all_cookies().await?;
        let mut values = Vec::with_capacity(cookies.len());
        for cookie in cookies {
            values.push(serde_json::to_value(&cookie)?);
        }
        Ok(SessionState::new(values))
    }

    async fn restore_session(&self, state: &SessionState) -> Result<()> {
        // Cookies only attach to a loaded origin.
        self.driver.goto(self.absolute("/")).await?;
        self.driver.delete_all_cookies().await?;
        for value in state.cookies() {
            let cookie: Cookie = serde_json::from_value(value.clone())?;
            self.driver.add_cookie(cookie).await?;
        }
        self.driver.refresh().await?;
        Ok(())
    }

    async fn screenshot(&self, name: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.screenshot_dir)?;
        let path = self.screenshot_dir.join(format!("{name}.png"));
        self.driver.screenshot(&path).await?;
        Ok(path)
    }
}

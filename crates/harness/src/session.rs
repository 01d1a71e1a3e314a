//! Login and session reuse
//!
//! A full login walks the auth form and synchronizes on the one network
//! request the suite ever watches. With caching enabled the authenticated
//! state is snapshotted and keyed by the credential pair, so later
//! scenarios restore it directly instead of re-walking the form. The cache
//! is an explicit object created at suite start and passed by reference —
//! no hidden process-wide state.

use std::collections::HashMap;

use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::browser::{Scope, SessionState};
use crate::config::Config;
use crate::error::Result;
use crate::poll::PollBudget;
use crate::target::Target;
use crate::ui::{TypeValue, Ui};

/// Local-provider authentication endpoint watched during login.
pub const AUTH_ENDPOINT: &str = "/v3-public/localProviders/local";

/// Text the post-login landing page must render.
pub const LOGIN_LANDMARK: &str = "Welcome to Rancher";

/// One credential pair plus the reuse policy.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub cache_session: bool,
}

impl Credentials {
    pub fn new(username: impl AsRef<str>, password: impl AsRef<str>) -> Self {
        Self {
            username: username.as_ref().to_string(),
            password: password.as_ref().to_string(),
            cache_session: false,
        }
    }

    pub fn cached(mut self) -> Self {
        self.cache_session = true;
        self
    }

    /// Suite-default credentials from configuration.
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            username: cfg.username.clone(),
            password: cfg.password.clone(),
            cache_session: cfg.cache_session,
        }
    }

    /// Cache key: digest of the credential tuple, so the map never holds
    /// plaintext credentials.
    fn cache_key(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.username.as_bytes());
        hasher.update([0x1f]);
        hasher.update(self.password.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Authenticated-state cache, keyed by credential pair.
#[derive(Default)]
pub struct SessionCache {
    inner: Mutex<HashMap<String, SessionState>>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn get(&self, key: &str) -> Option<SessionState> {
        self.inner.lock().get(key).cloned()
    }

    fn put(&self, key: String, state: SessionState) {
        self.inner.lock().insert(key, state);
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

/// Log into the dashboard, restoring a cached session when allowed.
///
/// A cache hit issues no authentication request at all. A full login
/// watches the local-provider endpoint, submits the form (credential
/// values never reach the logs) and then requires the landing banner
/// within the login budget; either wait expiring propagates as a timeout.
pub async fn login(ui: &Ui, creds: &Credentials, cache: &SessionCache) -> Result<()> {
    let key = creds.cache_key();

    if creds.cache_session {
        if let Some(state) = cache.get(&key) {
            debug!(user = %creds.username, "session cache hit, restoring");
            ui.restore_session(&state).await?;
            return Ok(());
        }
    }

    info!(user = %creds.username, "logging into the dashboard");
    ui.browser().watch_request("POST", AUTH_ENDPOINT).await?;
    ui.goto("/auth/login").await?;

    ui.type_value(
        TypeValue::at(Target::test_id("local-login-username"), &creds.username).sensitive(),
    )
    .await?;
    ui.type_value(
        TypeValue::at(Target::test_id("local-login-password"), &creds.password).sensitive(),
    )
    .await?;
    ui.click(&Target::test_id("login-submit")).await?;

    ui.browser()
        .wait_for_request(AUTH_ENDPOINT, PollBudget::login())
        .await?;
    ui.expect_text_within(
        Scope::In(Target::test_id("banner-title")),
        LOGIN_LANDMARK,
        PollBudget::login(),
    )
    .await?;

    if creds.cache_session {
        let state = ui.snapshot_session().await?;
        cache.put(key, state);
        debug!(user = %creds.username, "session cached");
    }
    Ok(())
}

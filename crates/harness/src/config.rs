//! Suite configuration
//!
//! Everything is environment-sourced; unset options fall back to the
//! defaults a local Rancher + Elemental dev setup uses. The suite never
//! prompts and never writes configuration.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, Result};

/// Maturity level of the Elemental operator artifacts under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Channel {
    #[default]
    Dev,
    Staging,
    Stable,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Dev => "dev",
            Channel::Staging => "staging",
            Channel::Stable => "stable",
        }
    }
}

impl FromStr for Channel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "dev" => Ok(Channel::Dev),
            "staging" => Ok(Channel::Staging),
            "stable" => Ok(Channel::Stable),
            other => Err(Error::InvalidConfig(format!(
                "unknown operator channel {other:?} (expected dev, staging or stable)"
            ))),
        }
    }
}

/// Recognized environment options.
#[derive(Debug, Clone)]
pub struct Config {
    /// Dashboard base URL (`E2E_BASE_URL`)
    pub base_url: String,
    /// Admin login (`E2E_USERNAME` / `E2E_PASSWORD`)
    pub username: String,
    pub password: String,
    /// Reuse the authenticated state across scenarios (`E2E_CACHE_SESSION`)
    pub cache_session: bool,
    /// Account flavor driving some scenarios ("user" switches to the
    /// unprivileged login) (`E2E_UI_ACCOUNT`)
    pub ui_account: Option<String>,
    /// Name of the Elemental cluster under test (`E2E_CLUSTER_NAME`)
    pub cluster_name: String,
    /// Kubernetes version string shown in the version picker
    /// (`E2E_K8S_VERSION`), e.g. "v1.26.8+rke2r1"
    pub k8s_version: String,
    /// OS image used by the k3s upgrade path (`E2E_UPGRADE_IMAGE`)
    pub upgrade_image: String,
    /// "elemental" enables the proxy branch of cluster creation
    /// (`E2E_PROXY`)
    pub proxy: Option<String>,
    /// Operator artifact maturity (`E2E_OPERATOR_CHANNEL`)
    pub operator_channel: Channel,
    /// Default scenario group filter (`E2E_TEST_TAG`)
    pub test_tag: String,
    /// Where the browser drops downloads (`E2E_DOWNLOAD_DIR`)
    pub download_dir: PathBuf,
    /// Attach to an existing WebDriver endpoint instead of spawning
    /// chromedriver (`E2E_WEBDRIVER_URL`)
    pub webdriver_url: Option<String>,
    /// Post-action settle quantum (`E2E_SETTLE_MS`)
    pub settle: Duration,
}

impl Config {
    /// Read the recognized options from the environment.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(v) = env::var("E2E_BASE_URL") {
            cfg.base_url = v.trim_end_matches('/').to_string();
        }
        if let Ok(v) = env::var("E2E_USERNAME") {
            cfg.username = v;
        }
        if let Ok(v) = env::var("E2E_PASSWORD") {
            cfg.password = v;
        }
        if let Ok(v) = env::var("E2E_CACHE_SESSION") {
            cfg.cache_session = matches!(v.as_str(), "1" | "true" | "yes");
        }
        cfg.ui_account = env::var("E2E_UI_ACCOUNT").ok();
        if let Ok(v) = env::var("E2E_CLUSTER_NAME") {
            cfg.cluster_name = v;
        }
        if let Ok(v) = env::var("E2E_K8S_VERSION") {
            cfg.k8s_version = v;
        }
        if let Ok(v) = env::var("E2E_UPGRADE_IMAGE") {
            cfg.upgrade_image = v;
        }
        cfg.proxy = env::var("E2E_PROXY").ok();
        if let Ok(v) = env::var("E2E_OPERATOR_CHANNEL") {
            match v.parse() {
                Ok(ch) => cfg.operator_channel = ch,
                Err(e) => tracing::warn!("ignoring E2E_OPERATOR_CHANNEL: {e}"),
            }
        }
        if let Ok(v) = env::var("E2E_TEST_TAG") {
            cfg.test_tag = v;
        }
        if let Ok(v) = env::var("E2E_DOWNLOAD_DIR") {
            cfg.download_dir = PathBuf::from(v);
        }
        cfg.webdriver_url = env::var("E2E_WEBDRIVER_URL").ok();
        if let Ok(v) = env::var("E2E_SETTLE_MS") {
            if let Ok(ms) = v.parse::<u64>() {
                cfg.settle = Duration::from_millis(ms);
            }
        }
        cfg
    }

    /// Whether the cluster under test runs the given Kubernetes flavor
    /// ("rke2" or "k3s").
    pub fn is_k8s(&self, flavor: &str) -> bool {
        self.k8s_version.contains(flavor)
    }

    /// Whether the proxy branch of cluster creation is requested.
    pub fn proxy_enabled(&self) -> bool {
        self.proxy.as_deref() == Some("elemental")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "https://localhost".to_string(),
            username: "admin".to_string(),
            password: "password".to_string(),
            cache_session: false,
            ui_account: None,
            cluster_name: "mycluster".to_string(),
            k8s_version: "v1.26.8+rke2r1".to_string(),
            upgrade_image: "registry.opensuse.org/isv/rancher/elemental/dev/containers/suse/sle-micro-iso:5.4".to_string(),
            proxy: None,
            operator_channel: Channel::Dev,
            test_tag: "main".to_string(),
            download_dir: PathBuf::from("downloads"),
            webdriver_url: None,
            settle: Duration::from_millis(1000),
        }
    }
}

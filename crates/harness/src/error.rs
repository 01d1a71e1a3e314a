//! Error types for the dashboard harness

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Result type alias using the harness Error
pub type Result<T> = std::result::Result<T, Error>;

/// Harness error types
///
/// Every failure aborts the current scenario; there is no recovery inside a
/// lifecycle macro. Timeouts always carry the predicate that never held and
/// the time actually waited.
#[derive(Error, Debug)]
pub enum Error {
    #[error("timed out after {waited:?} waiting for {what}")]
    Timeout { what: String, waited: Duration },

    #[error("selector {target} matched {matches} elements, expected exactly one")]
    Ambiguous { target: String, matches: usize },

    #[error("selector {target} matched nothing")]
    NotFound { target: String },

    #[error("step failed: {step} - {reason}")]
    StepFailed { step: String, reason: String },

    #[error("no file matching {pattern} in {dir}")]
    Download { pattern: String, dir: PathBuf },

    #[error("chromedriver failed to start: {0}")]
    DriverStartup(String),

    #[error("chromedriver health check failed after {0} attempts")]
    DriverHealthCheck(usize),

    #[error("dashboard not reachable at {url}: {reason}")]
    DashboardUnreachable { url: String, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("WebDriver error: {0}")]
    WebDriver(#[from] thirtyfour::error::WebDriverError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Timeout helper used by every bounded wait.
    pub fn timeout(what: impl Into<String>, waited: Duration) -> Self {
        Error::Timeout {
            what: what.into(),
            waited,
        }
    }
}

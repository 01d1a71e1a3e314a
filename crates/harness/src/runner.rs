//! Scenario runner
//!
//! Scenarios run strictly sequentially against the one browser context;
//! the only state they share is the session cache. Each scenario is a
//! hard pass/fail — a timeout anywhere aborts it — and the suite result
//! aggregates outcomes into a JSON report.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::session::SessionCache;
use crate::ui::Ui;

/// Shared context handed to every scenario.
pub struct ScenarioCtx {
    pub ui: Ui,
    pub config: Config,
    pub cache: SessionCache,
}

pub type ScenarioFn = for<'a> fn(&'a ScenarioCtx) -> BoxFuture<'a, Result<()>>;

/// A named scenario with its group tags.
pub struct Scenario {
    pub name: &'static str,
    pub tags: &'static [&'static str],
    pub run: ScenarioFn,
}

impl Scenario {
    pub fn tagged(&self, tag: &str) -> bool {
        self.tags.contains(&tag)
    }
}

/// Outcome of one scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseOutcome {
    pub name: String,
    pub success: bool,
    pub duration_ms: u64,
    pub error: Option<String>,
}

/// Outcome of the whole run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub results: Vec<CaseOutcome>,
}

impl SuiteReport {
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

/// Sequential scenario runner
pub struct SuiteRunner {
    ctx: ScenarioCtx,
    output_dir: PathBuf,
}

impl SuiteRunner {
    pub fn new(ctx: ScenarioCtx, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            ctx,
            output_dir: output_dir.into(),
        }
    }

    pub fn ctx(&self) -> &ScenarioCtx {
        &self.ctx
    }

    /// Run every scenario matching the filters, in registration order.
    pub async fn run(
        &self,
        scenarios: &[Scenario],
        tag: Option<&str>,
        name: Option<&str>,
    ) -> Result<SuiteReport> {
        let started_at = chrono::Utc::now();
        let start = Instant::now();

        let selected: Vec<&Scenario> = scenarios
            .iter()
            .filter(|s| tag.map_or(true, |t| s.tagged(t)))
            .filter(|s| name.map_or(true, |n| s.name == n))
            .collect();

        info!("running {} scenario(s)...", selected.len());

        let mut results = Vec::new();
        let mut passed = 0;
        let mut failed = 0;

        for scenario in &selected {
            let case_start = Instant::now();
            let outcome = (scenario.run)(&self.ctx).await;
            let duration_ms = case_start.elapsed().as_millis() as u64;

            match outcome {
                Ok(()) => {
                    passed += 1;
                    info!("✓ {} ({} ms)", scenario.name, duration_ms);
                    results.push(CaseOutcome {
                        name: scenario.name.to_string(),
                        success: true,
                        duration_ms,
                        error: None,
                    });
                }
                Err(e) => {
                    failed += 1;
                    error!("✗ {} - {}", scenario.name, e);
                    results.push(CaseOutcome {
                        name: scenario.name.to_string(),
                        success: false,
                        duration_ms,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        info!("");
        info!(
            "suite result: {} passed, {} failed ({} ms)",
            passed, failed, duration_ms
        );

        Ok(SuiteReport {
            total: selected.len(),
            passed,
            failed,
            duration_ms,
            started_at,
            results,
        })
    }

    /// Write the suite report as JSON and return its path.
    pub fn write_report(&self, report: &SuiteReport) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join("suite-report.json");
        let json = serde_json::to_string_pretty(report)?;
        std::fs::write(&path, json)?;
        info!("report written to {}", path.display());
        Ok(path)
    }
}

/// Probe the dashboard's ping endpoint until it answers or the timeout
/// elapses. Run once before any scenario so a dead environment fails fast
/// instead of burning a login budget per scenario.
pub async fn wait_for_dashboard(config: &Config, timeout: Duration) -> Result<()> {
    let url = format!("{}/ping", config.base_url);
    let client = reqwest::Client::builder()
        // Local Rancher setups run on self-signed certificates.
        .danger_accept_invalid_certs(true)
        .timeout(Duration::from_secs(5))
        .build()?;

    let start = Instant::now();
    let mut last_err = String::new();
    while start.elapsed() < timeout {
        match client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => return Ok(()),
            Ok(resp) => last_err = format!("status {}", resp.status()),
            Err(e) => last_err = e.to_string(),
        }
        tokio::time::sleep(Duration::from_secs(2)).await;
    }

    Err(Error::DashboardUnreachable {
        url,
        reason: last_err,
    })
}

//! E2E scenario runner entry point
//!
//! This binary drives a real browser against a running dashboard.
//! Run with: cargo test --package elemental-e2e --test e2e -- --tag main

mod scenarios;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use elemental_harness::chromedriver::{DriverConfig, DriverServer};
use elemental_harness::runner::wait_for_dashboard;
use elemental_harness::{
    Config, ScenarioCtx, SessionCache, Settled, SuiteRunner, Ui, WebBrowser, WebDriverConfig,
};

#[derive(Parser, Debug)]
#[command(name = "elemental-e2e")]
#[command(about = "End-to-end scenario runner for the Elemental dashboard")]
struct Args {
    /// Run only scenarios carrying this tag (default: E2E_TEST_TAG)
    #[arg(short, long)]
    tag: Option<String>,

    /// Run only the scenario with this exact name
    #[arg(short, long)]
    name: Option<String>,

    /// List matching scenarios instead of running them
    #[arg(long)]
    list: bool,

    /// Skip the dashboard availability probe
    #[arg(long)]
    skip_probe: bool,

    /// Run the browser with a visible window
    #[arg(long)]
    headed: bool,

    /// Output directory for the suite report
    #[arg(short, long, default_value = "test-results")]
    output: PathBuf,

    /// Directory for workaround screenshots
    #[arg(long, default_value = "screenshots")]
    screenshot_dir: PathBuf,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let rt = tokio::runtime::Runtime::new().expect("failed to create tokio runtime");
    match rt.block_on(async_main(args)) {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(2);
        }
    }
}

async fn async_main(args: Args) -> anyhow::Result<bool> {
    let config = Config::from_env();
    let tag = args.tag.clone().unwrap_or_else(|| config.test_tag.clone());
    let scenarios = scenarios::all();

    if args.list {
        for s in scenarios
            .iter()
            .filter(|s| s.tagged(&tag) || args.name.as_deref() == Some(s.name))
        {
            println!("{} [{}]", s.name, s.tags.join(", "));
        }
        return Ok(true);
    }

    if !args.skip_probe {
        wait_for_dashboard(&config, Duration::from_secs(60)).await?;
    }

    // Spawn chromedriver unless the environment points at one.
    let driver_server = match &config.webdriver_url {
        Some(_) => None,
        None => Some(DriverServer::spawn(DriverConfig::default()).await?),
    };
    let webdriver_url = match (&config.webdriver_url, &driver_server) {
        (Some(url), _) => url.clone(),
        (None, Some(server)) => server.url().to_string(),
        (None, None) => unreachable!("spawned above"),
    };

    let browser = WebBrowser::connect(WebDriverConfig {
        webdriver_url,
        base_url: config.base_url.clone(),
        download_dir: config.download_dir.clone(),
        screenshot_dir: args.screenshot_dir.clone(),
        headless: !args.headed,
        ..WebDriverConfig::default()
    })
    .await?;

    // The settle policy is attached here, once, for every scenario.
    let settled = Settled::new(browser, config.settle);
    let ui = Ui::new(Arc::new(settled));

    let ctx = ScenarioCtx {
        ui,
        config,
        cache: SessionCache::new(),
    };
    let runner = SuiteRunner::new(ctx, &args.output);
    let report = runner.run(&scenarios, Some(&tag), args.name.as_deref()).await?;
    runner.write_report(&report)?;

    Ok(report.all_passed())
}

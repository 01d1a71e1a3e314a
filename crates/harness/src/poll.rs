//! Bounded polling primitives
//!
//! Every eventual-consistency assertion in the suite goes through
//! [`poll_until`]: evaluate a predicate, sleep, repeat until it holds or the
//! budget runs out. A budget expiring is a hard failure carrying the
//! predicate description and the elapsed wait; nothing in the harness
//! retries a whole macro.

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, Instant};

use crate::error::{Error, Result};

/// How long to poll and how often.
#[derive(Debug, Clone, Copy)]
pub struct PollBudget {
    /// Total time the predicate may take to hold
    pub timeout: Duration,
    /// Pause between evaluations
    pub interval: Duration,
}

impl PollBudget {
    pub const fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }

    /// Default budget for an element to show up after an action (5 s).
    pub const fn element() -> Self {
        Self::new(Duration::from_secs(5), Duration::from_millis(250))
    }

    /// Post-login landmark budget (10 s).
    pub const fn login() -> Self {
        Self::new(Duration::from_secs(10), Duration::from_millis(250))
    }

    /// Extended budget for a deleted resource to disappear (20 s); backend
    /// reconciliation keeps rows visible well after the confirm click.
    pub const fn deletion() -> Self {
        Self::new(Duration::from_secs(20), Duration::from_millis(500))
    }

    /// Budget for an OS version channel to settle Active (50 s).
    pub const fn channel() -> Self {
        Self::new(Duration::from_secs(50), Duration::from_secs(1))
    }

    /// ISO build completion budget (5 min).
    pub const fn iso_build() -> Self {
        Self::new(Duration::from_secs(300), Duration::from_secs(2))
    }

    /// Cluster provisioning budget (10 min).
    pub const fn cluster() -> Self {
        Self::new(Duration::from_secs(600), Duration::from_secs(5))
    }

    pub const fn of_secs(timeout: u64) -> Self {
        Self::new(Duration::from_secs(timeout), Duration::from_millis(500))
    }
}

impl Default for PollBudget {
    fn default() -> Self {
        Self::element()
    }
}

/// Evaluate `predicate` until it returns true or `budget.timeout` elapses.
///
/// The predicate runs at least once even with a zero budget, so state that
/// is already good never fails on a tight clock.
pub async fn poll_until<F, Fut>(what: &str, budget: PollBudget, mut predicate: F) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let start = Instant::now();
    loop {
        if predicate().await? {
            return Ok(());
        }
        if start.elapsed() >= budget.timeout {
            return Err(Error::timeout(what, start.elapsed()));
        }
        sleep(budget.interval).await;
    }
}

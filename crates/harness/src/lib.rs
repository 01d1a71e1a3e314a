//! Elemental dashboard test harness
//!
//! A Rust-controlled browser-automation layer for end-to-end testing of
//! the Elemental OS-management extension:
//! - drives a real browser through a WebDriver endpoint
//! - names every selector behind a stable vocabulary
//! - settles the UI after each action with a uniform, inescapable delay
//! - caches authenticated sessions across scenarios
//! - wraps every eventual-consistency wait in an explicit poll budget
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Scenario suite (crates/e2e)              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Lifecycle macros                                           │
//! │    registration │ inventory │ catalog │ channels │ cluster  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Ui vocabulary        click_button / type_value /           │
//! │                       click_nav_menu / expect_* / kv rows   │
//! │  session::login       request watch + landmark + cache      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Settled<B>           fixed settle quantum per primitive    │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Browser (trait)      goto/click/type/clear/reload +        │
//! │                       bounded text waits + session snapshot │
//! │    └── WebBrowser     thirtyfour over chromedriver          │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod browser;
pub mod catalog;
pub mod channels;
pub mod chromedriver;
pub mod cluster;
pub mod config;
pub mod downloads;
pub mod error;
pub mod hardware;
pub mod inventory;
pub mod poll;
pub mod registration;
pub mod runner;
pub mod session;
pub mod settle;
pub mod target;
pub mod ui;
pub mod webdriver;

#[cfg(test)]
pub(crate) mod fake;

pub use browser::{Browser, KeyStroke, Scope, SessionState};
pub use config::{Channel, Config};
pub use error::{Error, Result};
pub use poll::{poll_until, PollBudget};
pub use runner::{Scenario, ScenarioCtx, SuiteReport, SuiteRunner};
pub use session::{login, Credentials, SessionCache};
pub use settle::Settled;
pub use target::Target;
pub use ui::{TypeValue, Ui};
pub use webdriver::{WebBrowser, WebDriverConfig};

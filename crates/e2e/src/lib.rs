//! Shared scenario plumbing
//!
//! Page objects for the dashboard's top-level navigation and the
//! before-each sequence every OS Management scenario starts with.

pub mod menu;

pub use menu::{Elemental, TopLevelMenu};

use elemental_harness::{login, Config, Credentials, Result, ScenarioCtx};

/// Login used by the unprivileged-account flavor of the suite.
pub const ELEMENTAL_USER: &str = "elemental-user";
const ELEMENTAL_USER_PASSWORD: &str = "rancherpassword";

/// Credentials a scenario logs in with: the configured admin pair, or the
/// seeded unprivileged user when `E2E_UI_ACCOUNT=user`.
pub fn scenario_credentials(cfg: &Config) -> Credentials {
    let mut creds = if cfg.ui_account.as_deref() == Some("user") {
        Credentials::new(ELEMENTAL_USER, ELEMENTAL_USER_PASSWORD)
    } else {
        Credentials::new(cfg.username.clone(), cfg.password.clone())
    };
    creds.cache_session = cfg.cache_session;
    creds
}

/// Standard scenario opening: log in, land on the home page, open the
/// side menu and enter OS Management.
pub async fn open_os_management(ctx: &ScenarioCtx) -> Result<()> {
    let creds = scenario_credentials(&ctx.config);
    login(&ctx.ui, &creds, &ctx.cache).await?;
    ctx.ui.goto("/").await?;
    TopLevelMenu::open_if_closed(&ctx.ui).await?;
    Elemental::access_menu(&ctx.ui).await
}

/// Scenario opening for flows that stay in the fleet manager itself.
pub async fn open_home(ctx: &ScenarioCtx) -> Result<()> {
    let creds = scenario_credentials(&ctx.config);
    login(&ctx.ui, &creds, &ctx.cache).await?;
    ctx.ui.goto("/").await
}

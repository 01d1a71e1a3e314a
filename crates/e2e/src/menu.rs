//! Top-level navigation page objects

use elemental_harness::{Result, Target, Ui};

/// The burger menu in the dashboard header.
pub struct TopLevelMenu;

impl TopLevelMenu {
    /// Open the side menu unless it is already showing.
    pub async fn open_if_closed(ui: &Ui) -> Result<()> {
        if !ui.exists_now(&Target::test_id("side-menu")).await? {
            ui.click(&Target::css(".menu-icon")).await?;
        }
        Ok(())
    }
}

/// Entry points of the Elemental extension.
pub struct Elemental;

impl Elemental {
    /// Click the OS Management icon in the side menu.
    pub async fn access_menu(ui: &Ui) -> Result<()> {
        ui.click(&Target::text("OS Management")).await
    }
}

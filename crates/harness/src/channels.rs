//! OS version channels and update groups
//!
//! Channels publish the OS versions machines can run; update groups roll a
//! version (or a raw registry image, on k3s) out to a cluster. Both live
//! under the Advanced menu.

use std::time::Duration;

use tokio::time::sleep;
use tracing::info;

use crate::browser::Scope;
use crate::catalog;
use crate::config::{Channel, Config};
use crate::error::Result;
use crate::poll::PollBudget;
use crate::target::Target;
use crate::ui::{TypeValue, Ui};

/// Status flaps repeatedly right after creating a channel or update
/// group; checks before this window closes see transient states.
const STATUS_FLAP_WINDOW: Duration = Duration::from_secs(10);

/// Registry path of the version channel for a maturity level.
pub fn channel_repo(channel: Channel) -> String {
    format!(
        "registry.opensuse.org/isv/rancher/elemental/{}/teal53/15.4/rancher/elemental-teal-channel/5.3:latest",
        channel.as_str()
    )
}

/// Create an OS version channel and wait for it to settle Active.
pub async fn add_os_version_channel(ui: &Ui, channel: Channel) -> Result<()> {
    let name = format!("{}-channel", channel.as_str());
    info!(%name, "adding OS version channel");
    ui.click_nav_menu(&["Advanced", "OS Version Channels"]).await?;
    ui.click(&Target::text_in(r#"[data-testid="masthead-create"]"#, "Create"))
        .await?;
    ui.type_value(TypeValue::at(
        Target::test_id("name-ns-description-name"),
        &name,
    ))
    .await?;
    ui.type_value(TypeValue::at(
        Target::test_id("os-version-channel-path"),
        channel_repo(channel),
    ))
    .await?;
    ui.click(&Target::text_in(r#"[data-testid="form-save"]"#, "Create"))
        .await?;

    sleep(STATUS_FLAP_WINDOW).await;
    ui.expect_text_within(
        Scope::Page,
        &format!("Active {name}"),
        PollBudget::channel(),
    )
    .await
}

/// Verify the channel delivered its OS versions. Only dev and staging
/// publish a `latest-*` version to look for.
pub async fn check_os_versions(ui: &Ui, channel: Channel) -> Result<()> {
    ui.click_nav_menu(&["Advanced", "OS Versions"]).await?;
    let expected = match channel {
        Channel::Dev => "Active latest-dev",
        Channel::Staging => "Active latest-staging",
        Channel::Stable => return Ok(()),
    };
    ui.expect_text_within(Scope::Page, expected, PollBudget::of_secs(120))
        .await
}

#[derive(Debug, Clone)]
pub struct UpdateGroupSpec {
    pub name: String,
    pub cluster: String,
}

/// Create an update group targeting a cluster. k3s clusters upgrade from
/// a registry image, rke2 clusters follow a managed OS version.
pub async fn create_update_group(ui: &Ui, cfg: &Config, spec: &UpdateGroupSpec) -> Result<()> {
    info!(name = %spec.name, cluster = %spec.cluster, "creating update group");
    ui.click_nav_menu(&["Advanced", "Update Groups"]).await?;
    ui.click(&Target::text_in(r#"[data-testid="masthead-create"]"#, "Create"))
        .await?;
    ui.expect_text(
        Scope::In(Target::css(".primaryheader")),
        "Update Group: Create",
    )
    .await?;
    ui.type_value(TypeValue::at(
        Target::test_id("name-ns-description-name"),
        &spec.name,
    ))
    .await?;
    ui.expect_text(Scope::Page, "Target Cluster").await?;
    ui.click(&Target::test_id("cluster-target")).await?;
    ui.click(&Target::text(&spec.cluster)).await?;

    if cfg.is_k8s("k3s") {
        ui.click(&Target::text("Use image from registry")).await?;
        ui.type_value(TypeValue::at(
            Target::test_id("os-image-box"),
            &cfg.upgrade_image,
        ))
        .await?;
    } else {
        ui.click(&Target::text("Use Managed OS Version")).await?;
        ui.click(&Target::test_id("os-version-box")).await?;
        ui.click(&Target::text(cfg.operator_channel.as_str())).await?;
    }

    ui.click(&Target::text_in(r#"[data-testid="form-save"]"#, "Create"))
        .await?;
    sleep(STATUS_FLAP_WINDOW).await;
    ui.expect_text(Scope::In(Target::test_id("sortable-cell-0-0")), "Active")
        .await
}

/// A cluster can only be targeted by one update group; a second creation
/// attempt must find no cluster left to pick.
pub async fn expect_no_second_update_group(ui: &Ui) -> Result<()> {
    ui.click_nav_menu(&["Advanced", "Update Groups"]).await?;
    ui.click(&Target::text_in(r#"[data-testid="masthead-create"]"#, "Create"))
        .await?;
    ui.expect_text(
        Scope::In(Target::css(".primaryheader")),
        "Update Group: Create",
    )
    .await?;
    ui.click(&Target::test_id("cluster-target")).await?;
    ui.expect_text(Scope::Page, "Sorry, no matching options").await
}

/// Drop all version channels and verify the versions drain with them.
pub async fn delete_channels(ui: &Ui) -> Result<()> {
    ui.click_nav_menu(&["Advanced", "OS Version Channels"]).await?;
    catalog::delete_all(ui).await?;
    ui.click_nav_menu(&["Advanced", "OS Versions"]).await?;
    ui.expect_text(Scope::Page, "There are no rows to show").await
}

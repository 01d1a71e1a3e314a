//! Elemental cluster lifecycle
//!
//! Creating a cluster from registered machines, watching it come up, and
//! deleting it to reset the machines underneath. Provisioning is the
//! slowest reconciliation the suite waits on; budgets here are minutes,
//! not seconds.

use tracing::info;

use crate::browser::Scope;
use crate::config::Config;
use crate::error::Result;
use crate::poll::PollBudget;
use crate::target::Target;
use crate::ui::{TypeValue, Ui};

/// Proxy seeded into the agent environment when the proxy branch is on.
pub const DEFAULT_PROXY: &str = "http://172.17.0.1:3128";

const NO_PROXY: &str =
    "localhost,127.0.0.0/8,10.0.0.0/8,172.16.0.0/12,192.168.0.0/16,.svc,.cluster.local";

#[derive(Debug, Clone)]
pub struct ClusterSpec {
    pub name: String,
    pub description: String,
    pub k8s_version: String,
    /// Proxy URL for the agent environment, when required
    pub proxy: Option<String>,
}

impl ClusterSpec {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            name: cfg.cluster_name.clone(),
            description: "My Elemental testing cluster".to_string(),
            k8s_version: cfg.k8s_version.clone(),
            proxy: cfg.proxy_enabled().then(|| DEFAULT_PROXY.to_string()),
        }
    }
}

/// Create an Elemental cluster and wait for it to go Active.
pub async fn create(ui: &Ui, spec: &ClusterSpec) -> Result<()> {
    info!(name = %spec.name, version = %spec.k8s_version, "creating elemental cluster");
    ui.click(&Target::test_id("button-create-elemental-cluster"))
        .await?;
    ui.type_value(TypeValue::at(
        Target::test_id("name-ns-description-name"),
        &spec.name,
    ))
    .await?;
    ui.type_value(TypeValue::at(
        Target::test_id("name-ns-description-description"),
        &spec.description,
    ))
    .await?;
    ui.click(&Target::text("Show deprecated Kubernetes")).await?;
    ui.click(&Target::text("Kubernetes Version")).await?;
    ui.click(&Target::text(&spec.k8s_version)).await?;

    if let Some(proxy) = &spec.proxy {
        seed_agent_proxy_env(ui, proxy).await?;
    }

    ui.click_button("Create").await?;
    ui.expect_text_within(
        Scope::Page,
        &format!("Updating {}", spec.name),
        PollBudget::of_secs(360),
    )
    .await?;
    ui.expect_text_within(
        Scope::Page,
        &format!("Active {}", spec.name),
        PollBudget::cluster(),
    )
    .await
}

/// Seed HTTP_PROXY / HTTPS_PROXY / NO_PROXY into the agent environment.
/// The kv rows of this editor are only addressable positionally; the
/// offsets below track its append-only layout.
async fn seed_agent_proxy_env(ui: &Ui, proxy: &str) -> Result<()> {
    ui.click(&Target::text("Agent Environment Vars")).await?;
    let add = Target::text_in("#agentEnv > .key-value", "Add");

    ui.click(&add).await?;
    ui.type_value(TypeValue::at(Target::css(".key > input"), "HTTP_PROXY"))
        .await?;
    ui.type_value(TypeValue::at(Target::css(".no-resize"), proxy))
        .await?;

    ui.click(&add).await?;
    ui.type_value(TypeValue::at(Target::css(":nth-child(7) > input"), "HTTPS_PROXY"))
        .await?;
    ui.type_value(TypeValue::at(Target::css(":nth-child(8) > .no-resize"), proxy))
        .await?;

    ui.click(&add).await?;
    ui.type_value(TypeValue::at(Target::css(":nth-child(10) > input"), "NO_PROXY"))
        .await?;
    ui.type_value(TypeValue::at(
        Target::css(":nth-child(11) > .no-resize"),
        NO_PROXY,
    ))
    .await
}

/// Verify the cluster row on the fleet Home screen reports Active.
pub async fn check_status(ui: &Ui, name: &str) -> Result<()> {
    ui.expect_text_within(
        Scope::In(Target::css(format!(
            r#"[data-node-id="fleet-default/{name}"]"#
        ))),
        "Active",
        PollBudget::of_secs(300),
    )
    .await
}

/// Delete a cluster through the manage screen; the removal prompt wants
/// the cluster name typed back.
pub async fn delete(ui: &Ui, name: &str) -> Result<()> {
    info!(name, "deleting elemental cluster");
    ui.click(&Target::test_id("button-manage-elemental-clusters"))
        .await?;
    ui.click(&Target::test_id("sortable-cell-0-0")).await?;
    ui.click_button("Delete").await?;
    ui.type_value(TypeValue::at(Target::test_id("prompt-remove-input"), name))
        .await?;
    ui.confirm_delete().await
}

/// After a cluster deletion the machine resets: the inventory drains and
/// the freed machine re-registers on its own.
pub async fn wait_for_reset(ui: &Ui) -> Result<()> {
    ui.click_nav_menu(&["Inventory of Machines"]).await?;
    ui.expect_text(Scope::Page, "There are no rows to show.").await?;
    ui.expect_text_within(
        Scope::In(Target::test_id("sortable-table-0-row")),
        "Active",
        PollBudget::of_secs(180),
    )
    .await
}

//! Apps catalog helpers
//!
//! Helm repositories feed the Elemental operator chart into the cluster;
//! the bulk-delete macro cleans any sortable-table screen between
//! scenarios.

use tracing::{info, warn};

use crate::browser::Scope;
use crate::error::Result;
use crate::poll::PollBudget;
use crate::target::Target;
use crate::ui::{TypeValue, Ui};

const EMPTY_TABLE_MARKER: &str = "There are no rows to show";

/// Repository source flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoKind {
    /// Plain HTTP index
    Http,
    /// Git repository, tracked on main
    Git,
}

#[derive(Debug, Clone)]
pub struct RepoSpec {
    pub name: String,
    pub url: String,
    pub kind: RepoKind,
}

impl RepoSpec {
    pub fn http(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            kind: RepoKind::Http,
        }
    }

    pub fn git(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            kind: RepoKind::Git,
        }
    }
}

/// Add a Helm repository under Apps → Repositories.
pub async fn add_helm_repo(ui: &Ui, spec: &RepoSpec) -> Result<()> {
    info!(name = %spec.name, url = %spec.url, "adding helm repository");
    ui.click_nav_menu(&["Apps", "Repositories"]).await?;

    // Creation used to race the screen transition; anchor on the header
    // before touching anything.
    ui.expect_text(Scope::In(Target::css("header")), "Repositories")
        .await?;
    ui.expect_text(Scope::Page, "Create").await?;

    ui.click_button("Create").await?;
    ui.expect_text(Scope::Page, "Repository: Create").await?;
    ui.type_value(TypeValue::label("Name", &spec.name)).await?;
    match spec.kind {
        RepoKind::Git => {
            ui.click(&Target::text("Git repository")).await?;
            ui.type_value(TypeValue::label("Git Repo URL", &spec.url))
                .await?;
            ui.type_value(TypeValue::label("Git Branch", "main")).await?;
        }
        RepoKind::Http => {
            ui.type_value(TypeValue::label("Index URL", &spec.url))
                .await?;
        }
    }
    ui.click_button("Create").await
}

/// Delete every resource on the current sortable-table screen.
///
/// The view sometimes crashes while rows are being removed; when the
/// empty-table marker is missing after the confirm, reload once and leave
/// a screenshot behind before asserting again.
pub async fn delete_all(ui: &Ui) -> Result<()> {
    ui.click(&Target::css(r#"[width="30"] > .checkbox-outer-container"#))
        .await?;
    ui.click(&Target::text_in(
        r#"[data-testid="sortable-table-promptRemove"]"#,
        "Delete",
    ))
    .await?;
    ui.confirm_delete().await?;

    let body = ui.browser().page_text().await?;
    if !body.contains(EMPTY_TABLE_MARKER) {
        warn!("empty-table marker missing after bulk delete, reloading");
        ui.browser().screenshot("reload-triggered").await?;
        ui.reload().await?;
    }
    ui.expect_text_within(Scope::Page, EMPTY_TABLE_MARKER, PollBudget::of_secs(15))
        .await
}

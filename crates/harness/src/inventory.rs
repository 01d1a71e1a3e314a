//! Machine inventory operations
//!
//! Inventories are normally produced by registering machines; the suite
//! also imports pre-built inventory YAMLs to exercise the list view,
//! advanced filtering and the label size limits without booting anything.

use std::path::Path;

use tracing::info;

use crate::browser::Scope;
use crate::error::Result;
use crate::registration::add_inventory_label;
use crate::target::Target;
use crate::ui::{TypeValue, Ui};

/// One advanced-filter expectation: a seeded row name and whether the
/// filter should keep it visible.
#[derive(Debug, Clone)]
pub struct FilterCheck {
    pub query: String,
    pub expectations: Vec<(String, bool)>,
}

impl FilterCheck {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            expectations: Vec::new(),
        }
    }

    pub fn expect(mut self, row: impl Into<String>, visible: bool) -> Self {
        self.expectations.push((row.into(), visible));
        self
    }
}

/// Which side of a label pair is oversized in the size-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Oversized {
    Name,
    Value,
}

/// Import a machine inventory from a YAML file and wait for it to land.
pub async fn import(ui: &Ui, file: &Path, expected_name: &str) -> Result<()> {
    info!(file = %file.display(), "importing machine inventory");
    ui.click_nav_menu(&["Inventory of Machines"]).await?;
    ui.click(&Target::test_id("masthead-create-yaml")).await?;
    ui.click_button("Read from File").await?;
    ui.attach_file(&Target::css(r#"input[type="file"]"#), file)
        .await?;
    ui.click(&Target::text_in(
        r#"[data-testid="action-button-async-button"]"#,
        "Create",
    ))
    .await?;
    ui.expect_gone(Scope::Page, "Creating").await?;
    ui.expect_text(Scope::Page, expected_name).await
}

/// Run one advanced-search filter and verify which seeded rows survive.
pub async fn check_filter(ui: &Ui, check: &FilterCheck) -> Result<()> {
    ui.click_nav_menu(&["Inventory of Machines"]).await?;
    ui.click_button("Add Filter").await?;
    ui.type_value(TypeValue::at(
        Target::css(".advanced-search-box"),
        &check.query,
    ))
    .await?;
    ui.click(&Target::css(".bottom-block > .role-primary")).await?;
    for (row, visible) in &check.expectations {
        if *visible {
            ui.expect_text(Scope::Page, row).await?;
        } else {
            ui.expect_gone(Scope::Page, row).await?;
        }
    }
    Ok(())
}

/// Verify that an oversized label name or value blocks creation: the size
/// banner must appear and the create button must stay disabled.
pub async fn check_label_size(ui: &Ui, which: Oversized) -> Result<()> {
    ui.click_nav_menu(&["Dashboard"]).await?;
    ui.click(&Target::test_id("button-create-registration-endpoint"))
        .await?;
    let (key, value) = match which {
        Oversized::Name => (
            "labeltoolonggggggggggggggggggggggggggggggggggggggggggggggggggggg",
            "mylabelvalue",
        ),
        Oversized::Value => (
            "mylabelname",
            "valuetoolonggggggggggggggggggggggggggggggggggggggggggggggggggggg",
        ),
    };
    add_inventory_label(ui, key, value, false).await?;
    ui.expect_present(&Target::css(".banner > span")).await?;
    ui.expect_disabled(&Target::test_id("form-save")).await
}

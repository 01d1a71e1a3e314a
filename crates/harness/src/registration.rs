//! Machine registration lifecycle
//!
//! Create, edit and delete registration endpoints, attach label and
//! annotation pairs to the registration and to the inventory it will
//! produce, and read everything back through the YAML view. All flows are
//! navigate → act → assert-within-budget; an expired budget aborts the
//! scenario.

use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use tracing::info;

use crate::browser::{KeyStroke, Scope};
use crate::config::{Channel, Config};
use crate::downloads::{self, FilePattern};
use crate::error::Result;
use crate::hardware::HARDWARE_LABELS;
use crate::poll::PollBudget;
use crate::target::Target;
use crate::ui::{TypeValue, Ui};

/// Substrings the generated default cloud-config must render. The editor
/// is syntax-highlighted, so these are containment checks against its
/// text, never document parsing.
pub const DEFAULT_CLOUD_CONFIG: &[&str] = &[
    "config:",
    "cloud-config:",
    "users:",
    "- name: root",
    "passwd: root",
    "elemental:",
    "install:",
    "device: /dev/nvme0n1",
    "poweroff: true",
];

fn registration_url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"https://.*elemental/registration").expect("static pattern")
    })
}

/// Everything a registration creation may carry. Defaults are the plain
/// path: default namespace, no pairs, default cloud-config verified.
#[derive(Debug, Clone)]
pub struct RegistrationSpec {
    pub name: String,
    /// Non-default namespace; triggers the create-new-namespace flow
    pub namespace: Option<String>,
    pub labels: Vec<(String, String)>,
    pub annotations: Vec<(String, String)>,
    pub inventory_labels: Vec<(String, String)>,
    pub inventory_annotations: Vec<(String, String)>,
    /// Also attach the full hardware label table to the inventory block
    pub hardware_labels: bool,
    /// Custom cloud-config file uploaded during creation
    pub cloud_config: Option<PathBuf>,
    /// Verify the generated default cloud-config content
    pub check_default_cloud_config: bool,
    /// Build and download an ISO (only meaningful on rke2 clusters)
    pub build_iso: bool,
    /// Re-open the resource afterwards and verify pairs in the YAML view
    pub verify_read_back: bool,
}

impl RegistrationSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            labels: Vec::new(),
            annotations: Vec::new(),
            inventory_labels: Vec::new(),
            inventory_annotations: Vec::new(),
            hardware_labels: false,
            cloud_config: None,
            check_default_cloud_config: true,
            build_iso: false,
            verify_read_back: false,
        }
    }

    pub fn in_namespace(mut self, ns: impl Into<String>) -> Self {
        self.namespace = Some(ns.into());
        self
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.push((key.into(), value.into()));
        self
    }

    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.push((key.into(), value.into()));
        self
    }

    pub fn with_inventory_label(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.inventory_labels.push((key.into(), value.into()));
        self
    }

    pub fn with_inventory_annotation(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.inventory_annotations.push((key.into(), value.into()));
        self
    }

    pub fn with_hardware_labels(mut self) -> Self {
        self.hardware_labels = true;
        self
    }

    /// Upload a custom cloud-config; the generated default is then not
    /// expected to appear.
    pub fn with_cloud_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.cloud_config = Some(path.into());
        self.check_default_cloud_config = false;
        self
    }

    pub fn with_iso_build(mut self) -> Self {
        self.build_iso = true;
        self
    }

    pub fn verifying_read_back(mut self) -> Self {
        self.verify_read_back = true;
        self
    }

    pub fn namespace_or_default(&self) -> &str {
        self.namespace.as_deref().unwrap_or("fleet-default")
    }
}

/// How an edit reaches the resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditVia {
    Form,
    Yaml,
}

#[derive(Debug, Clone)]
pub struct EditSpec {
    pub name: String,
    pub label: Option<(String, String)>,
    pub annotation: Option<(String, String)>,
    pub via: EditVia,
}

fn kv_add_button(block: &str) -> Target {
    Target::css(format!(r#"[data-testid="{block}"] > .footer > .btn"#))
}

async fn add_pair(ui: &Ui, block: &str, tab: &str, key: &str, value: &str) -> Result<()> {
    ui.click(&Target::text_in(
        r#"[data-testid="labels-and-annotations-block"]"#,
        tab,
    ))
    .await?;
    ui.click(&kv_add_button(block)).await?;
    ui.type_value(TypeValue::at(Target::kv_key(block, 0), key))
        .await?;
    ui.type_value(TypeValue::at(Target::kv_value(block, 0), value))
        .await
}

/// Attach a label to the registration block of the creation form.
pub async fn add_registration_label(ui: &Ui, key: &str, value: &str) -> Result<()> {
    add_pair(ui, "add-label-mach-reg", "Registration Endpoint", key, value).await
}

/// Attach an annotation to the registration block.
pub async fn add_registration_annotation(ui: &Ui, key: &str, value: &str) -> Result<()> {
    add_pair(
        ui,
        "add-annotation-mach-reg",
        "Registration Endpoint",
        key,
        value,
    )
    .await
}

/// Attach a label to the inventory block, optionally followed by the full
/// hardware label table. Rows beyond the first only exist positionally;
/// the nth-row targets own that layout assumption.
pub async fn add_inventory_label(
    ui: &Ui,
    key: &str,
    value: &str,
    with_hardware: bool,
) -> Result<()> {
    const BLOCK: &str = "add-label-mach-inv";
    add_pair(ui, BLOCK, "Inventory of Machines", key, value).await?;

    if with_hardware {
        for (row, (name, expr)) in HARDWARE_LABELS.iter().enumerate() {
            ui.click(&kv_add_button(BLOCK)).await?;
            ui.type_value(TypeValue::at(Target::kv_key(BLOCK, row + 1), *name))
                .await?;
            ui.type_value(TypeValue::at(Target::kv_value(BLOCK, row + 1), *expr))
                .await?;
        }
    }
    Ok(())
}

/// Attach an annotation to the inventory block.
pub async fn add_inventory_annotation(ui: &Ui, key: &str, value: &str) -> Result<()> {
    ui.click(&Target::text_in(
        r#"[data-testid="labels-and-annotations-block"]"#,
        "Inventory of Machines",
    ))
    .await?;
    ui.click_button("Add Annotation").await?;
    ui.type_value(TypeValue::at(Target::kv_key("add-annotation-mach-inv", 0), key))
        .await?;
    ui.type_value(TypeValue::at(
        Target::kv_value("add-annotation-mach-inv", 0),
        value,
    ))
    .await
}

/// Create a machine registration and verify the outcome.
pub async fn create(ui: &Ui, cfg: &Config, spec: &RegistrationSpec) -> Result<()> {
    info!(name = %spec.name, "creating machine registration");
    ui.click_nav_menu(&["Dashboard"]).await?;
    ui.click(&Target::test_id("button-create-registration-endpoint"))
        .await?;

    match &spec.namespace {
        None => {
            ui.type_value(TypeValue::at(
                Target::test_id("name-ns-description-name"),
                &spec.name,
            ))
            .await?;
        }
        Some(ns) => {
            // The namespace picker steals focus and the name field has no
            // stable selector on this path; after creating the namespace we
            // get back to it by tabbing.
            ui.click(&Target::test_id("name-ns-description-namespace"))
                .await?;
            ui.type_active(ns).await?;
            ui.click(&Target::text("Create a New Namespace")).await?;
            ui.press(KeyStroke::Tab).await?;
            ui.type_active(&spec.name).await?;
        }
    }

    if let Some(cloud_config) = &spec.cloud_config {
        ui.attach_file(&Target::css(r#"input[type="file"]"#), cloud_config)
            .await?;
    }

    for (key, value) in &spec.labels {
        add_registration_label(ui, key, value).await?;
    }
    for (key, value) in &spec.annotations {
        add_registration_annotation(ui, key, value).await?;
    }
    for (key, value) in &spec.inventory_labels {
        add_inventory_label(ui, key, value, spec.hardware_labels).await?;
    }
    for (key, value) in &spec.inventory_annotations {
        add_inventory_annotation(ui, key, value).await?;
    }

    ui.click(&Target::text_in(r#"[data-testid="form-save"]"#, "Create"))
        .await?;

    // The status badge renders adjacent to the title, so both arrive as
    // one text run.
    let masthead = Target::css(".masthead");
    ui.expect_text(
        Scope::In(masthead.clone()),
        &format!("Registration Endpoint: {}Active", spec.name),
    )
    .await?;
    ui.expect_text(
        Scope::In(masthead),
        &format!("Namespace: {}", spec.namespace_or_default()),
    )
    .await?;
    ui.expect_match(
        &Target::test_id("registration-url"),
        registration_url_re(),
        PollBudget::element(),
    )
    .await?;

    if spec.build_iso && cfg.is_k8s("rke2") {
        build_and_download_iso(ui, cfg).await?;
    }

    ui.click(&Target::test_id("download-btn")).await?;
    downloads::wait_for(
        &cfg.download_dir,
        &FilePattern::name(format!("{}_registrationURL.yaml", spec.name)),
        PollBudget::of_secs(30),
    )
    .await?;
    ui.expect_gone(Scope::Page, "Saving").await?;

    if spec.check_default_cloud_config {
        let editor = Target::test_id("yaml-editor-code-mirror");
        for needle in DEFAULT_CLOUD_CONFIG {
            ui.expect_text(Scope::In(editor.clone()), needle).await?;
        }
    }

    if spec.verify_read_back {
        // The form fields are disabled in the detail view; the YAML view is
        // the only place the pairs can be read back.
        ui.click(&Target::text("Registration Endpoint")).await?;
        for (key, value) in &spec.labels {
            check_label(ui, &spec.name, key, value).await?;
        }
        for (key, value) in &spec.annotations {
            check_annotation(ui, &spec.name, key, value).await?;
        }
    }
    Ok(())
}

/// ISO build branch of creation: pick the OS version the configured
/// operator channel publishes, build, wait out the build, download.
async fn build_and_download_iso(ui: &Ui, cfg: &Config) -> Result<()> {
    ui.click(&Target::test_id("select-os-version-build-iso"))
        .await?;
    let entry = match cfg.operator_channel {
        Channel::Stable => "Elemental Teal ISO x86_64 v1.1.5",
        Channel::Staging => "Elemental Teal ISO x86_64 latest-staging",
        Channel::Dev => "Elemental Teal ISO x86_64 latest-dev",
    };
    ui.click(&Target::text(entry)).await?;
    ui.click(&Target::test_id("build-iso-btn")).await?;

    let download_btn = Target::test_id("download-iso-btn");
    // Download stays disabled for the duration of the build.
    ui.expect_disabled(&download_btn).await?;
    ui.expect_enabled_within(&download_btn, PollBudget::iso_build())
        .await?;
    ui.click(&download_btn).await?;
    downloads::wait_for(
        &cfg.download_dir,
        &FilePattern::suffix(".iso"),
        PollBudget::new(Duration::from_secs(180), Duration::from_secs(5)),
    )
    .await
}

async fn open_yaml_view(ui: &Ui, name: &str) -> Result<()> {
    ui.click(&Target::text(name)).await?;
    ui.click(&Target::css("div.actions > .role-multi-action"))
        .await?;
    ui.click(&Target::text_in("li", "Edit YAML")).await?;
    ui.expect_text(Scope::Page, &format!("Registration Endpoint: {name}"))
        .await
}

/// Verify a registration label through the YAML view.
pub async fn check_label(ui: &Ui, name: &str, key: &str, value: &str) -> Result<()> {
    open_yaml_view(ui, name).await?;
    ui.expect_text(
        Scope::In(Target::test_id("yaml-editor-code-mirror")),
        &format!("{key}: {value}"),
    )
    .await?;
    ui.click_button("Cancel").await
}

/// Verify a registration annotation through the YAML view.
pub async fn check_annotation(ui: &Ui, name: &str, key: &str, value: &str) -> Result<()> {
    check_label(ui, name, key, value).await
}

/// Verify an inventory label, either from the registration's YAML view or
/// — after a machine booted — directly in the open inventory YAML.
pub async fn check_inventory_label(
    ui: &Ui,
    name: &str,
    key: &str,
    value: &str,
    with_hardware: bool,
    after_boot: bool,
) -> Result<()> {
    let editor = Target::test_id("yaml-editor-code-mirror");
    if !after_boot {
        open_yaml_view(ui, name).await?;
        ui.expect_text(Scope::In(editor.clone()), &format!("{key}: {value}"))
            .await?;
        if with_hardware {
            for (hw_key, hw_expr) in HARDWARE_LABELS {
                ui.expect_text(Scope::In(editor.clone()), &format!("{hw_key}: {hw_expr}"))
                    .await?;
            }
        }
        ui.click_button("Cancel").await
    } else {
        ui.expect_text(Scope::In(editor.clone()), &format!("{key}: {value}"))
            .await?;
        if with_hardware {
            // Booted machines have resolved the templates; only the keys
            // are stable.
            for (hw_key, _) in HARDWARE_LABELS {
                ui.expect_text(Scope::In(editor.clone()), &format!("{hw_key}: "))
                    .await?;
            }
        }
        Ok(())
    }
}

/// Edit a registration, through the config form or the YAML editor.
pub async fn edit(ui: &Ui, spec: &EditSpec) -> Result<()> {
    ui.click(&Target::text(&spec.name)).await?;
    ui.click(&Target::css("div.actions > .role-multi-action"))
        .await?;
    match spec.via {
        EditVia::Yaml => {
            ui.click(&Target::text_in("li", "Edit YAML")).await?;
            if let Some((key, value)) = &spec.label {
                append_metadata_block(ui, "labels", key, value).await?;
            }
            if let Some((key, value)) = &spec.annotation {
                append_metadata_block(ui, "annotations", key, value).await?;
            }
        }
        EditVia::Form => {
            ui.click(&Target::text_in("li", "Edit Config")).await?;
            if let Some((key, value)) = &spec.label {
                add_registration_label(ui, key, value).await?;
            }
            if let Some((key, value)) = &spec.annotation {
                add_registration_annotation(ui, key, value).await?;
            }
        }
    }
    Ok(())
}

async fn append_metadata_block(ui: &Ui, block: &str, key: &str, value: &str) -> Result<()> {
    ui.click(&Target::text("metadata")).await?;
    ui.press(KeyStroke::End).await?;
    ui.press(KeyStroke::Enter).await?;
    ui.type_active(&format!("  {block}:")).await?;
    ui.press(KeyStroke::Enter).await?;
    ui.type_active(&format!("  {key}: {value}")).await
}

/// Delete a registration and wait for it to actually disappear.
pub async fn delete(ui: &Ui, name: &str) -> Result<()> {
    info!(name, "deleting machine registration");
    ui.click(&Target::text("Registration Endpoint")).await?;
    // Selecting the row by name is broken upstream
    // (rancher/elemental#714); select all rows instead.
    ui.click(&Target::css(r#"[width="30"] > .checkbox-outer-container"#))
        .await?;
    ui.click(&Target::text_in(
        r#"[data-testid="sortable-table-promptRemove"]"#,
        "Delete",
    ))
    .await?;
    ui.confirm_delete().await?;
    // Reconciliation keeps the row visible well past the confirm click
    // (rancher/elemental#643); use the extended deletion budget.
    ui.expect_gone_within(Scope::Page, name, PollBudget::deletion())
        .await
}

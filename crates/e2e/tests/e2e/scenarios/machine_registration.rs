//! Machine registration scenarios
//!
//! Each scenario creates its own registration endpoint, exercises one
//! creation or edit branch, and deletes what it created so the next
//! scenario starts from an empty list.

use std::path::PathBuf;

use futures::future::BoxFuture;

use elemental_e2e::open_os_management;
use elemental_harness::registration::{self, EditSpec, EditVia, RegistrationSpec};
use elemental_harness::{Result, Scenario, ScenarioCtx};

fn asset(file: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets").join(file)
}

pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "create-default-registration",
            tags: &["main"],
            run: create_default,
        },
        Scenario {
            name: "create-registration-with-labels-and-annotations",
            tags: &["main"],
            run: create_with_labels,
        },
        Scenario {
            name: "create-registration-with-inventory-labels",
            tags: &["main"],
            run: create_with_inventory_labels,
        },
        Scenario {
            name: "create-registration-in-custom-namespace",
            tags: &["main"],
            run: create_in_custom_namespace,
        },
        Scenario {
            name: "create-registration-with-custom-cloud-config",
            tags: &["main"],
            run: create_with_custom_cloud_config,
        },
        Scenario {
            name: "build-iso-image",
            tags: &["main"],
            run: build_iso,
        },
        Scenario {
            name: "edit-registration-via-form",
            tags: &["main"],
            run: edit_via_form,
        },
        Scenario {
            name: "edit-registration-via-yaml",
            tags: &["main"],
            run: edit_via_yaml,
        },
        Scenario {
            name: "create-persistent-registration",
            tags: &["main", "upgrade"],
            run: create_persistent,
        },
    ]
}

fn create_default(ctx: &ScenarioCtx) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        open_os_management(ctx).await?;
        let spec = RegistrationSpec::new("default-reg");
        registration::create(&ctx.ui, &ctx.config, &spec).await?;
        registration::delete(&ctx.ui, "default-reg").await
    })
}

fn create_with_labels(ctx: &ScenarioCtx) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        open_os_management(ctx).await?;
        let spec = RegistrationSpec::new("labeled-reg")
            .with_label("myLabel1", "myLabelValue1")
            .with_annotation("myAnnotation1", "myAnnotationValue1")
            .verifying_read_back();
        registration::create(&ctx.ui, &ctx.config, &spec).await?;
        registration::delete(&ctx.ui, "labeled-reg").await
    })
}

fn create_with_inventory_labels(ctx: &ScenarioCtx) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        open_os_management(ctx).await?;
        let spec = RegistrationSpec::new("inventory-reg")
            .with_inventory_label("myInvLabel1", "myInvLabelValue1")
            .with_inventory_annotation("myInvAnnotation1", "myInvAnnotationValue1")
            .with_hardware_labels();
        registration::create(&ctx.ui, &ctx.config, &spec).await?;
        registration::check_inventory_label(
            &ctx.ui,
            "inventory-reg",
            "myInvLabel1",
            "myInvLabelValue1",
            true,
            false,
        )
        .await?;
        registration::delete(&ctx.ui, "inventory-reg").await
    })
}

fn create_in_custom_namespace(ctx: &ScenarioCtx) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        open_os_management(ctx).await?;
        let spec = RegistrationSpec::new("namespaced-reg").in_namespace("custom-namespace");
        registration::create(&ctx.ui, &ctx.config, &spec).await?;
        registration::delete(&ctx.ui, "namespaced-reg").await
    })
}

fn create_with_custom_cloud_config(ctx: &ScenarioCtx) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        open_os_management(ctx).await?;
        let spec = RegistrationSpec::new("cloud-config-reg")
            .with_cloud_config(asset("custom_cloud-config.yaml"));
        registration::create(&ctx.ui, &ctx.config, &spec).await?;
        registration::delete(&ctx.ui, "cloud-config-reg").await
    })
}

/// ISO building only exists on rke2; the macro skips the branch on k3s.
fn build_iso(ctx: &ScenarioCtx) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        open_os_management(ctx).await?;
        let spec = RegistrationSpec::new("iso-reg").with_iso_build();
        registration::create(&ctx.ui, &ctx.config, &spec).await?;
        registration::delete(&ctx.ui, "iso-reg").await
    })
}

fn edit_via_form(ctx: &ScenarioCtx) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        open_os_management(ctx).await?;
        let spec = RegistrationSpec::new("form-edit-reg");
        registration::create(&ctx.ui, &ctx.config, &spec).await?;
        registration::edit(
            &ctx.ui,
            &EditSpec {
                name: "form-edit-reg".to_string(),
                label: Some(("myLabel1".to_string(), "myLabelValue1".to_string())),
                annotation: Some((
                    "myAnnotation1".to_string(),
                    "myAnnotationValue1".to_string(),
                )),
                via: EditVia::Form,
            },
        )
        .await?;
        registration::check_label(&ctx.ui, "form-edit-reg", "myLabel1", "myLabelValue1").await?;
        registration::delete(&ctx.ui, "form-edit-reg").await
    })
}

fn edit_via_yaml(ctx: &ScenarioCtx) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        open_os_management(ctx).await?;
        let spec = RegistrationSpec::new("yaml-edit-reg");
        registration::create(&ctx.ui, &ctx.config, &spec).await?;
        registration::edit(
            &ctx.ui,
            &EditSpec {
                name: "yaml-edit-reg".to_string(),
                label: Some(("myLabel1".to_string(), "myLabelValue1".to_string())),
                annotation: Some((
                    "myAnnotation1".to_string(),
                    "myAnnotationValue1".to_string(),
                )),
                via: EditVia::Yaml,
            },
        )
        .await?;
        registration::delete(&ctx.ui, "yaml-edit-reg").await
    })
}

/// The registration the cluster scenarios enroll machines through; it
/// stays behind for the rest of the run.
fn create_persistent(ctx: &ScenarioCtx) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        open_os_management(ctx).await?;
        let spec = RegistrationSpec::new("machine-registration")
            .with_inventory_label("myInvLabel1", "myInvLabelValue1")
            .with_hardware_labels();
        registration::create(&ctx.ui, &ctx.config, &spec).await
    })
}

//! Machine inventory and cluster creation scenarios

use std::path::PathBuf;

use futures::future::BoxFuture;

use elemental_e2e::{open_home, open_os_management, TopLevelMenu};
use elemental_harness::cluster::{self, ClusterSpec};
use elemental_harness::hardware::HARDWARE_LABELS;
use elemental_harness::inventory::{self, FilterCheck, Oversized};
use elemental_harness::registration;
use elemental_harness::{Result, Scenario, ScenarioCtx, Scope, Target};

fn inventory_asset(file: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("assets/machine-inventories")
        .join(file)
}

pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "machine-inventory-created",
            tags: &["main"],
            run: inventory_created,
        },
        Scenario {
            name: "inventory-hardware-label-columns",
            tags: &["main"],
            run: hardware_label_columns,
        },
        Scenario {
            name: "import-machine-inventories",
            tags: &["main"],
            run: import_inventories,
        },
        Scenario {
            name: "inventory-advanced-filters",
            tags: &["main"],
            run: advanced_filters,
        },
        Scenario {
            name: "label-size-limits",
            tags: &["main"],
            run: label_size_limits,
        },
        Scenario {
            name: "create-elemental-cluster",
            tags: &["main", "upgrade"],
            run: create_cluster,
        },
        Scenario {
            name: "elemental-cluster-status",
            tags: &["main", "upgrade"],
            run: cluster_status,
        },
    ]
}

/// The machine registered through the persistent endpoint shows up as an
/// Active inventory row.
fn inventory_created(ctx: &ScenarioCtx) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        open_os_management(ctx).await?;
        ctx.ui.click_nav_menu(&["Inventory of Machines"]).await?;
        ctx.ui
            .expect_text(Scope::Page, "Namespace: fleet-default")
            .await?;
        ctx.ui
            .expect_text(Scope::In(Target::test_id("sortable-cell-0-0")), "Active")
            .await?;
        ctx.ui
            .expect_text(Scope::In(Target::test_id("sortable-cell-0-1")), "my-machine")
            .await
    })
}

/// The embedded hardware labels are resolved on the booted machine and
/// can be surfaced as table columns.
fn hardware_label_columns(ctx: &ScenarioCtx) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        open_os_management(ctx).await?;
        ctx.ui.click_nav_menu(&["Inventory of Machines"]).await?;
        ctx.ui.click(&Target::text("my-machine")).await?;
        registration::check_inventory_label(
            &ctx.ui,
            "machine-registration",
            "myInvLabel1",
            "myInvLabelValue1",
            true,
            true,
        )
        .await?;

        for (name, _) in HARDWARE_LABELS {
            ctx.ui.click_nav_menu(&["Inventory of Machines"]).await?;
            ctx.ui
                .click(&Target::css(".table-options-group > .btn > .icon"))
                .await?;
            ctx.ui.click(&Target::text(*name)).await?;
            ctx.ui.expect_text(Scope::Page, name).await?;
        }
        Ok(())
    })
}

fn import_inventories(ctx: &ScenarioCtx) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        open_os_management(ctx).await?;
        for name in ["test-filter-one", "test-filter-two", "shouldnotmatch"] {
            inventory::import(
                &ctx.ui,
                &inventory_asset(&format!("{name}.yaml")),
                name,
            )
            .await?;
        }
        Ok(())
    })
}

fn advanced_filters(ctx: &ScenarioCtx) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        open_os_management(ctx).await?;
        let checks = [
            FilterCheck::new("test-filter")
                .expect("test-filter-one", true)
                .expect("test-filter-two", true)
                .expect("shouldnotmatch", false),
            FilterCheck::new("test-filter-one")
                .expect("test-filter-one", true)
                .expect("test-filter-two", false)
                .expect("shouldnotmatch", false),
            FilterCheck::new("element=water")
                .expect("test-filter-one", false)
                .expect("test-filter-two", true)
                .expect("shouldnotmatch", false),
        ];
        for check in &checks {
            inventory::check_filter(&ctx.ui, check).await?;
        }
        Ok(())
    })
}

fn label_size_limits(ctx: &ScenarioCtx) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        open_os_management(ctx).await?;
        inventory::check_label_size(&ctx.ui, Oversized::Name).await?;
        open_os_management(ctx).await?;
        inventory::check_label_size(&ctx.ui, Oversized::Value).await
    })
}

fn create_cluster(ctx: &ScenarioCtx) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        open_os_management(ctx).await?;
        let spec = ClusterSpec::from_config(&ctx.config);
        cluster::create(&ctx.ui, &spec).await
    })
}

/// The new cluster also reports Active on the fleet Home screen.
fn cluster_status(ctx: &ScenarioCtx) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        open_home(ctx).await?;
        TopLevelMenu::open_if_closed(&ctx.ui).await?;
        ctx.ui.click(&Target::text("Home")).await?;
        cluster::check_status(&ctx.ui, &ctx.config.cluster_name).await?;
        TopLevelMenu::open_if_closed(&ctx.ui).await?;
        ctx.ui.click(&Target::text(&ctx.config.cluster_name)).await
    })
}

//! Scenario registry
//!
//! Scenarios are grouped by tag: "main" is the default regression pass,
//! "upgrade" covers the OS upgrade path. Registration order is execution
//! order — later scenarios build on state the earlier ones leave behind.

pub mod machine_inventory;
pub mod machine_registration;

use elemental_harness::Scenario;

pub fn all() -> Vec<Scenario> {
    let mut scenarios = Vec::new();
    scenarios.extend(first_connection::scenarios());
    scenarios.extend(machine_registration::scenarios());
    scenarios.extend(machine_inventory::scenarios());
    scenarios.extend(deploy_app::scenarios());
    scenarios.extend(upgrade::scenarios());
    scenarios.extend(reset::scenarios());
    scenarios
}

//! Hardware label table
//!
//! Short label names mapped to the templated SMBIOS expressions the
//! operator resolves on the machine. The table is ordered: inventory-label
//! rows are addressed positionally, so iteration order decides which row a
//! key lands in. Values must match what the dashboard renders byte for
//! byte or the YAML read-back checks fail.

/// Label name → templated backend expression, in row order.
pub const HARDWARE_LABELS: &[(&str, &str)] = &[
    ("CPUModel", "${System Data/CPU/Model}"),
    ("CPUVendor", "${System Data/CPU/Vendor}"),
    ("NumberBlockDevices", "${System Data/Block Devices/Number Devices}"),
    ("NumberNetInterface", "${System Data/Network/Number Interfaces}"),
    ("CPUVendorTotalCPUCores", "${System Data/CPU/Total Cores}"),
    ("TotalCPUThread", "${System Data/CPU/Total Threads}"),
    ("TotalMemory", "${System Data/Memory/Total Physical Bytes}"),
];

/// Templated expression for a label name, if the table carries it.
pub fn expression_for(label: &str) -> Option<&'static str> {
    HARDWARE_LABELS
        .iter()
        .find(|(name, _)| *name == label)
        .map(|(_, expr)| *expr)
}

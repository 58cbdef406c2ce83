//! Dependent-resource naming
//!
//! Every resource of a compute unit is named deterministically from the
//! machine name. Re-invocation after a crash finds previously created
//! resources by name; no identifier mapping is ever persisted.

use cumulus_cloud::spec::DataDisk;

pub const NIC_SUFFIX: &str = "-nic";
pub const OS_DISK_SUFFIX: &str = "-os-disk";
pub const DATA_DISK_SUFFIX: &str = "-data-disk";

/// Name of the unit's network interface.
pub fn nic_name(machine_name: &str) -> String {
    format!("{machine_name}{NIC_SUFFIX}")
}

/// Name of the unit's OS disk.
pub fn os_disk_name(machine_name: &str) -> String {
    format!("{machine_name}{OS_DISK_SUFFIX}")
}

/// Name of one data disk.
///
/// The LUN keeps derived names pairwise distinct even when the declared
/// disk name is empty or repeated.
pub fn data_disk_name(machine_name: &str, disk_name: &str, lun: i32) -> String {
    if disk_name.is_empty() {
        format!("{machine_name}-{lun}{DATA_DISK_SUFFIX}")
    } else {
        format!("{disk_name}-{lun}-{machine_name}{DATA_DISK_SUFFIX}")
    }
}

/// Data disks with their effective LUNs, ordered by LUN so every caller
/// iterates deterministically.
pub fn ordered_data_disks(disks: &[DataDisk]) -> Vec<(i32, &DataDisk)> {
    let mut ordered: Vec<(i32, &DataDisk)> = disks
        .iter()
        .enumerate()
        .map(|(index, disk)| (disk.effective_lun(index), disk))
        .collect();
    ordered.sort_by_key(|(lun, _)| *lun);
    ordered
}

/// Derived names of every disk in the unit: the OS disk first, then the
/// data disks in LUN order.
pub fn all_disk_names(machine_name: &str, data_disks: &[DataDisk]) -> Vec<String> {
    let mut names = vec![os_disk_name(machine_name)];
    for (lun, disk) in ordered_data_disks(data_disks) {
        names.push(data_disk_name(machine_name, &disk.name, lun));
    }
    names
}

/// Opaque provider id for a VM, encoding location and name.
pub fn encode_machine_id(location: &str, machine_name: &str) -> String {
    format!("azure:///{location}/{machine_name}")
}

/// Trailing resource name of a full ARM resource id.
pub fn resource_name(resource_id: &str) -> &str {
    resource_id
        .rsplit('/')
        .next()
        .unwrap_or(resource_id)
}

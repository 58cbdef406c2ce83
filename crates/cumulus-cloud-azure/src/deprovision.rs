//! Deprovisioning orchestrator
//!
//! Tears down one compute unit: VM first (after detaching its data
//! disks), then the NIC and every disk concurrently, each behind an
//! attachment guard. The resource set is inferred purely from derived
//! names and live lookups; nothing is read from storage.
//!
//! Not-found is success for every individual resource, so the whole
//! operation is idempotent under repeated invocation. A resource found
//! attached to a different VM fails loudly with a conflict instead of
//! being skipped.

use crate::access::CloudSession;
use crate::names;
use crate::tasks::{self, Task};
use cumulus_cloud::error::{CloudError, Result};
use cumulus_cloud::spec::ProviderSpec;

/// Delete the compute unit `machine_name` and its dependent resources.
pub async fn delete_compute_unit(
    session: &CloudSession,
    spec: &ProviderSpec,
    machine_name: &str,
) -> Result<()> {
    let resource_group = &spec.resource_group;

    match session.vms.get(resource_group, machine_name).await {
        Ok(vm) => {
            if !vm.data_disks.is_empty() {
                tracing::info!(
                    "Detaching {} data disk(s) from {}",
                    vm.data_disks.len(),
                    machine_name
                );
                session
                    .vms
                    .detach_data_disks(resource_group, machine_name)
                    .await?;
            }
            tracing::info!("Deleting virtual machine: {}", machine_name);
            match session.vms.delete(resource_group, machine_name).await {
                Ok(()) => {}
                Err(err) if err.is_not_found() => {}
                Err(err) => return Err(err),
            }
        }
        Err(err) if err.is_not_found() => {
            tracing::debug!("VM {} not found, deleting leftovers only", machine_name);
        }
        Err(err) => return Err(err),
    }

    // The VM is gone (or never existed); the NIC and every disk are now
    // mutually independent and deleted concurrently.
    let mut teardown: Vec<Task<'_>> = Vec::new();

    let nic_name = names::nic_name(machine_name);
    teardown.push((
        format!("network interface {nic_name}"),
        Box::pin(delete_nic_if_unattached(
            session,
            resource_group,
            nic_name.clone(),
            machine_name,
        )),
    ));

    for disk_name in names::all_disk_names(machine_name, &spec.storage.data_disks) {
        teardown.push((
            format!("disk {disk_name}"),
            Box::pin(delete_disk_if_unattached(
                session,
                resource_group,
                disk_name,
                machine_name,
            )),
        ));
    }

    tasks::run_all(teardown).await
}

/// Delete the NIC unless it reports an owner other than `machine_name`.
async fn delete_nic_if_unattached(
    session: &CloudSession,
    resource_group: &str,
    nic_name: String,
    machine_name: &str,
) -> Result<()> {
    let nic = match session.nics.get(resource_group, &nic_name).await {
        Ok(nic) => nic,
        Err(err) if err.is_not_found() => return Ok(()),
        Err(err) => return Err(err),
    };

    if let Some(owner) = &nic.virtual_machine_id {
        if names::resource_name(owner) != machine_name {
            return Err(CloudError::Conflict(format!(
                "network interface {nic_name} is attached to {owner}"
            )));
        }
        // Owner is the VM that was just deleted; the read was stale.
    }

    tracing::info!("Deleting network interface: {}", nic_name);
    match session.nics.delete(resource_group, &nic_name).await {
        Ok(()) => Ok(()),
        Err(err) if err.is_not_found() => Ok(()),
        Err(err) => Err(err),
    }
}

/// Delete a disk unless `managedBy` reports an owner other than
/// `machine_name`.
async fn delete_disk_if_unattached(
    session: &CloudSession,
    resource_group: &str,
    disk_name: String,
    machine_name: &str,
) -> Result<()> {
    let disk = match session.disks.get(resource_group, &disk_name).await {
        Ok(disk) => disk,
        Err(err) if err.is_not_found() => return Ok(()),
        Err(err) => return Err(err),
    };

    if let Some(owner) = &disk.managed_by {
        if names::resource_name(owner) != machine_name {
            return Err(CloudError::Conflict(format!(
                "disk {disk_name} is attached to {owner}"
            )));
        }
    }

    tracing::info!("Deleting disk: {}", disk_name);
    match session.disks.delete(resource_group, &disk_name).await {
        Ok(()) => Ok(()),
        Err(err) if err.is_not_found() => Ok(()),
        Err(err) => Err(err),
    }
}

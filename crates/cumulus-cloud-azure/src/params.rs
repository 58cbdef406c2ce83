//! Creation-parameter builders
//!
//! Pure translation from the provider spec to the request bodies the
//! access layer sends. Everything here is validated and assembled before
//! the first remote call of the step that uses it.

use crate::access::PurchasePlan;
use crate::names;
use base64::Engine;
use cumulus_cloud::error::Result;
use cumulus_cloud::spec::{Caching, ImageReference, Placement, ProviderSpec};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Disk create options understood by the compute API.
pub const CREATE_OPTION_FROM_IMAGE: &str = "FromImage";
pub const CREATE_OPTION_EMPTY: &str = "Empty";

/// Network-interface creation request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NicParams {
    pub location: String,
    /// Resource id of the subnet the primary IP configuration binds to;
    /// the private address is allocated dynamically.
    pub subnet_id: String,
    pub accelerated_networking: bool,
    pub tags: HashMap<String, String>,
}

impl NicParams {
    pub fn for_machine(spec: &ProviderSpec, subnet_id: &str) -> Self {
        Self {
            location: spec.location.clone(),
            subnet_id: subnet_id.to_string(),
            accelerated_networking: spec.network.accelerated_networking,
            tags: spec.tags.clone(),
        }
    }
}

/// OS disk block of a VM creation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OsDiskParams {
    pub name: String,
    pub caching: Caching,
    pub storage_account_type: String,
    pub size_gb: i32,
    pub create_option: String,
}

/// Data disk block of a VM creation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataDiskParams {
    pub name: String,
    pub lun: i32,
    pub caching: Caching,
    pub storage_account_type: String,
    pub size_gb: i32,
    pub create_option: String,
}

/// Virtual-machine creation request body.
#[derive(Debug, Clone, Serialize)]
pub struct VmParams {
    pub location: String,
    pub vm_size: String,
    #[serde(skip)]
    pub image: ImageReference,
    /// Marketplace plan; terms must already be accepted or creation fails
    pub plan: Option<PurchasePlan>,
    pub os_disk: OsDiskParams,
    /// In LUN order
    pub data_disks: Vec<DataDiskParams>,
    pub computer_name: String,
    pub admin_username: String,
    pub ssh_public_key: String,
    pub disable_password_auth: bool,
    /// Base64-encoded cloud-init payload
    pub custom_data: Option<String>,
    /// Resource id of the primary NIC
    pub nic_id: String,
    pub tags: HashMap<String, String>,
    pub zone: Option<u8>,
    pub availability_set_id: Option<String>,
    pub scale_set_id: Option<String>,
}

impl VmParams {
    /// Assemble the VM request for one compute unit.
    ///
    /// `image` is the already-resolved reference and `plan` the
    /// marketplace plan looked up for it, if any. Exactly one placement
    /// field ends up populated.
    pub fn build(
        machine_name: &str,
        spec: &ProviderSpec,
        user_data: &[u8],
        image: ImageReference,
        plan: Option<PurchasePlan>,
        nic_id: String,
    ) -> Result<VmParams> {
        let placement = spec.placement.resolve()?;
        let (zone, availability_set_id, scale_set_id) = match placement {
            Placement::Zone(zone) => (Some(zone), None, None),
            Placement::AvailabilitySet(id) => (None, Some(id), None),
            Placement::ScaleSet(id) => (None, None, Some(id)),
        };

        let os_disk = OsDiskParams {
            name: names::os_disk_name(machine_name),
            caching: spec.storage.os_disk.caching,
            storage_account_type: spec.storage.os_disk.storage_account_type.clone(),
            size_gb: spec.storage.os_disk.size_gb,
            create_option: CREATE_OPTION_FROM_IMAGE.to_string(),
        };

        let data_disks = names::ordered_data_disks(&spec.storage.data_disks)
            .into_iter()
            .map(|(lun, disk)| DataDiskParams {
                name: names::data_disk_name(machine_name, &disk.name, lun),
                lun,
                caching: disk.caching,
                storage_account_type: disk.storage_account_type.clone(),
                size_gb: disk.size_gb,
                create_option: CREATE_OPTION_EMPTY.to_string(),
            })
            .collect();

        let custom_data = if user_data.is_empty() {
            None
        } else {
            Some(base64::engine::general_purpose::STANDARD.encode(user_data))
        };

        Ok(VmParams {
            location: spec.location.clone(),
            vm_size: spec.hardware.vm_size.clone(),
            image,
            plan,
            os_disk,
            data_disks,
            computer_name: machine_name.to_string(),
            admin_username: spec.os.admin_username.clone(),
            ssh_public_key: spec.os.ssh_public_key.clone(),
            disable_password_auth: spec.os.disable_password_auth,
            custom_data,
            nic_id,
            tags: spec.tags.clone(),
            zone,
            availability_set_id,
            scale_set_id,
        })
    }
}

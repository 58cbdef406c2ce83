//! Cloud resource access layer
//!
//! Per-resource-kind client traits the orchestrators are written against.
//! A production binding implements them on top of the Azure SDK; tests
//! implement them in memory. Every method is a blocking remote call: a
//! create-or-update or delete resolves only once the long-running cloud
//! operation has completed.
//!
//! Absence is reported as [`CloudError::NotFound`] at this layer. The
//! orchestrators decide where not-found means success.

use crate::params::{NicParams, VmParams};
use async_trait::async_trait;
use cumulus_cloud::error::Result;
use cumulus_cloud::secrets::Credentials;
use cumulus_cloud::spec::Urn;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A subnet as returned by the network API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subnet {
    pub id: String,
    pub name: String,
}

/// A network interface and its current VM attachment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkInterface {
    pub id: String,
    pub name: String,
    /// Full resource id of the owning VM, if any
    #[serde(default)]
    pub virtual_machine_id: Option<String>,
}

/// A managed disk and its current owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Disk {
    pub id: String,
    pub name: String,
    /// Full resource id of the resource the disk is attached to, if any
    #[serde(default)]
    pub managed_by: Option<String>,
}

/// A data disk as attached to a live VM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachedDisk {
    pub name: String,
    pub lun: i32,
}

/// A virtual machine as returned by the compute API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VirtualMachine {
    pub id: String,
    pub name: String,
    pub location: String,
    #[serde(default)]
    pub data_disks: Vec<AttachedDisk>,
}

/// Marketplace purchase plan attached to some platform images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchasePlan {
    pub name: String,
    pub publisher: String,
    pub product: String,
}

/// A platform image as resolved from its URN.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VmImage {
    pub id: String,
    #[serde(default)]
    pub plan: Option<PurchasePlan>,
}

#[async_trait]
pub trait VirtualMachines: Send + Sync {
    async fn get(&self, resource_group: &str, name: &str) -> Result<VirtualMachine>;

    async fn create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        params: &VmParams,
    ) -> Result<VirtualMachine>;

    /// Update the VM to an empty data-disk list and wait for the update
    /// to complete. A disk cannot be deleted while a VM's storage profile
    /// still references it.
    async fn detach_data_disks(&self, resource_group: &str, name: &str) -> Result<VirtualMachine>;

    async fn delete(&self, resource_group: &str, name: &str) -> Result<()>;
}

#[async_trait]
pub trait NetworkInterfaces: Send + Sync {
    async fn get(&self, resource_group: &str, name: &str) -> Result<NetworkInterface>;

    async fn create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        params: &NicParams,
    ) -> Result<NetworkInterface>;

    async fn delete(&self, resource_group: &str, name: &str) -> Result<()>;
}

#[async_trait]
pub trait Disks: Send + Sync {
    async fn get(&self, resource_group: &str, name: &str) -> Result<Disk>;

    async fn delete(&self, resource_group: &str, name: &str) -> Result<()>;
}

#[async_trait]
pub trait Subnets: Send + Sync {
    async fn get(&self, resource_group: &str, vnet: &str, subnet: &str) -> Result<Subnet>;
}

#[async_trait]
pub trait MarketplaceImages: Send + Sync {
    async fn get(&self, location: &str, urn: &Urn) -> Result<VmImage>;
}

/// Read-only resource enumeration, filtered by resource type and tag keys.
#[async_trait]
pub trait ResourceGraph: Send + Sync {
    /// Names of the VMs in `resource_group` carrying every one of the
    /// given tag keys.
    async fn vm_names_by_tags(
        &self,
        resource_group: &str,
        tag_keys: &[String],
    ) -> Result<Vec<String>>;
}

/// One credentialed cloud session.
///
/// Built per invocation from [`Credentials`]; never shared across
/// invocations, so concurrent operations for different compute units do
/// not contend on client state.
pub struct CloudSession {
    pub subscription_id: String,
    pub vms: Arc<dyn VirtualMachines>,
    pub nics: Arc<dyn NetworkInterfaces>,
    pub disks: Arc<dyn Disks>,
    pub subnets: Arc<dyn Subnets>,
    pub images: Arc<dyn MarketplaceImages>,
    pub graph: Arc<dyn ResourceGraph>,
}

/// Builds a short-lived [`CloudSession`] from credentials.
pub trait AccessFactory: Send + Sync {
    fn session(&self, credentials: &Credentials) -> Result<Arc<CloudSession>>;
}

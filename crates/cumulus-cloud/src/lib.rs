//! Cumulus machine-driver abstraction
//!
//! This crate defines the provider-agnostic surface between a cluster
//! reconciliation loop and a cloud-specific provisioning driver:
//!
//! - the declarative [`ProviderSpec`] describing one compute unit,
//! - the [`MachineDriver`] trait a concrete provider implements,
//! - the closed [`CloudError`] taxonomy drivers report through,
//! - credential plumbing for short-lived, per-invocation cloud sessions.
//!
//! Concrete providers (e.g. `cumulus-cloud-azure`) implement
//! [`MachineDriver`] against their cloud's resource model.

pub mod driver;
pub mod error;
pub mod secrets;
pub mod spec;

// Re-exports
pub use driver::{
    AZURE_DISK_CSI_DRIVER, CreateMachineRequest, CreateMachineResponse, CsiVolume,
    DeleteMachineRequest, ListMachinesRequest, MachineDriver, VolumeSpec,
};
pub use error::{CloudError, Result};
pub use secrets::{CredentialProvider, Credentials, MachineSecrets, StaticCredentials};
pub use spec::{
    CLUSTER_TAG_PREFIX, Caching, DataDisk, HardwareProfile, ImageRef, ImageReference,
    MAX_DATA_DISKS, NetworkProfile, OsDisk, OsProfile, Placement, PlacementConfig, ProviderSpec,
    ROLE_TAG_PREFIX, StorageProfile, Urn,
};

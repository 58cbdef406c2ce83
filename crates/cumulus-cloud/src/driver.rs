//! Machine driver trait definition
//!
//! The boundary between the reconciliation control loop and a concrete
//! cloud implementation. The loop re-invokes these operations until
//! convergence; every implementation must therefore be safe to re-enter
//! after a partial failure.

use crate::error::Result;
use crate::secrets::MachineSecrets;
use crate::spec::ProviderSpec;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Driver name used by the Azure disk CSI driver in volume specs.
pub const AZURE_DISK_CSI_DRIVER: &str = "disk.csi.azure.com";

/// Machine lifecycle driver
///
/// Concurrent calls for different machines are independent; calls for the
/// same machine must be serialized by the caller.
#[async_trait]
pub trait MachineDriver: Send + Sync {
    /// Provision one compute unit. Returns the opaque provider id and the
    /// node name the cluster will know the machine by.
    async fn create_machine(&self, req: CreateMachineRequest) -> Result<CreateMachineResponse>;

    /// Tear down one compute unit and every dependent resource. Must be
    /// idempotent: repeating the call on an already-deleted unit succeeds.
    async fn delete_machine(&self, req: DeleteMachineRequest) -> Result<()>;

    /// Enumerate the compute units carrying the spec's cluster and role
    /// tags, as a provider-id to machine-name map.
    async fn list_machines(&self, req: ListMachinesRequest) -> Result<HashMap<String, String>>;

    /// Extract provider volume ids from volume specs. Pure data-shape
    /// work, no remote calls.
    fn get_volume_ids(&self, specs: &[VolumeSpec]) -> Result<Vec<String>>;
}

#[derive(Debug, Clone)]
pub struct CreateMachineRequest {
    pub machine_name: String,
    pub spec: ProviderSpec,
    pub secrets: MachineSecrets,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateMachineResponse {
    /// Opaque composite id encoding location and VM name
    pub provider_id: String,
    pub node_name: String,
}

#[derive(Debug, Clone)]
pub struct DeleteMachineRequest {
    pub machine_name: String,
    pub spec: ProviderSpec,
    pub secrets: MachineSecrets,
}

#[derive(Debug, Clone)]
pub struct ListMachinesRequest {
    pub spec: ProviderSpec,
    pub secrets: MachineSecrets,
}

/// Volume reference as it appears in an externally supplied volume spec.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VolumeSpec {
    /// In-tree Azure disk volume: the disk name is the volume id
    #[serde(default)]
    pub azure_disk: Option<String>,

    /// CSI volume: the handle is the volume id when the driver matches
    #[serde(default)]
    pub csi: Option<CsiVolume>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsiVolume {
    pub driver: String,
    pub volume_handle: String,
}

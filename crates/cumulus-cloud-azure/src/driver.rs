//! Azure machine driver
//!
//! Implements the [`MachineDriver`] boundary on top of the provisioning
//! and deprovisioning orchestrators. A fresh [`CloudSession`] is built
//! per call from the request's credentials through the injected
//! [`AccessFactory`]; the driver itself holds no cloud state.

use crate::access::AccessFactory;
use crate::names;
use crate::{deprovision, provision};
use async_trait::async_trait;
use cumulus_cloud::driver::{
    AZURE_DISK_CSI_DRIVER, CreateMachineRequest, CreateMachineResponse, DeleteMachineRequest,
    ListMachinesRequest, MachineDriver, VolumeSpec,
};
use cumulus_cloud::error::Result;
use cumulus_cloud::spec::{CLUSTER_TAG_PREFIX, ROLE_TAG_PREFIX};
use std::collections::HashMap;
use std::sync::Arc;

pub struct AzureDriver {
    access: Arc<dyn AccessFactory>,
}

impl AzureDriver {
    pub fn new(access: Arc<dyn AccessFactory>) -> Self {
        Self { access }
    }
}

#[async_trait]
impl MachineDriver for AzureDriver {
    async fn create_machine(&self, req: CreateMachineRequest) -> Result<CreateMachineResponse> {
        let session = self.access.session(&req.secrets.credentials)?;
        provision::create_compute_unit(&session, &req.spec, &req.secrets, &req.machine_name).await
    }

    async fn delete_machine(&self, req: DeleteMachineRequest) -> Result<()> {
        let session = self.access.session(&req.secrets.credentials)?;
        deprovision::delete_compute_unit(&session, &req.spec, &req.machine_name).await
    }

    async fn list_machines(&self, req: ListMachinesRequest) -> Result<HashMap<String, String>> {
        let session = self.access.session(&req.secrets.credentials)?;

        // Filter on the spec's cluster and role tag keys; both are
        // stamped onto every VM this driver creates.
        let tag_keys: Vec<String> = req
            .spec
            .tags
            .keys()
            .filter(|k| k.starts_with(CLUSTER_TAG_PREFIX) || k.starts_with(ROLE_TAG_PREFIX))
            .cloned()
            .collect();

        let vm_names = session
            .graph
            .vm_names_by_tags(&req.spec.resource_group, &tag_keys)
            .await?;

        Ok(vm_names
            .into_iter()
            .map(|name| (names::encode_machine_id(&req.spec.location, &name), name))
            .collect())
    }

    fn get_volume_ids(&self, specs: &[VolumeSpec]) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        for spec in specs {
            if let Some(disk_name) = &spec.azure_disk {
                ids.push(disk_name.clone());
            } else if let Some(csi) = &spec.csi {
                if csi.driver == AZURE_DISK_CSI_DRIVER {
                    ids.push(csi.volume_handle.clone());
                } else {
                    tracing::debug!("Skipping volume with foreign CSI driver {}", csi.driver);
                }
            }
        }
        Ok(ids)
    }
}

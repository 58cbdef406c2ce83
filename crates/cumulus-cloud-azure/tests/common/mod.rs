//! In-memory fake cloud for orchestrator tests
//!
//! Implements every access-layer trait over a single mutex-guarded state
//! table and records each mutating call so tests can assert ordering.

// Each test binary uses a different subset of the harness.
#![allow(dead_code)]

use async_trait::async_trait;
use cumulus_cloud::error::{CloudError, Result};
use cumulus_cloud::secrets::{Credentials, MachineSecrets};
use cumulus_cloud::spec::{
    DataDisk, HardwareProfile, ImageRef, NetworkProfile, OsDisk, OsProfile, PlacementConfig,
    ProviderSpec, StorageProfile, Urn,
};
use cumulus_cloud_azure::access::{
    AccessFactory, AttachedDisk, CloudSession, Disk, Disks, MarketplaceImages, NetworkInterface,
    NetworkInterfaces, ResourceGraph, Subnet, Subnets, VirtualMachine, VirtualMachines, VmImage,
};
use cumulus_cloud_azure::params::{NicParams, VmParams};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const SUBSCRIPTION: &str = "00000000-0000-0000-0000-000000000001";

#[derive(Default)]
pub struct State {
    pub subnets: HashMap<String, Subnet>,
    pub nics: HashMap<String, NetworkInterface>,
    pub disks: HashMap<String, Disk>,
    pub vms: HashMap<String, VirtualMachine>,
    pub vm_tags: HashMap<String, HashMap<String, String>>,
    pub images: HashMap<String, VmImage>,

    /// When set, the next VM create fails with this message
    pub fail_vm_create: Option<String>,
    /// When set, every VM get fails with this message
    pub fail_vm_get: Option<String>,

    /// Last VM params seen by create_or_update
    pub last_vm_params: Option<VmParams>,

    /// Mutating calls in invocation order, e.g. "vm.delete worker-1"
    pub calls: Vec<String>,
}

#[derive(Default)]
pub struct FakeCloud {
    pub state: Mutex<State>,
}

impl FakeCloud {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn session(self: &Arc<Self>) -> Arc<CloudSession> {
        Arc::new(CloudSession {
            subscription_id: SUBSCRIPTION.to_string(),
            vms: self.clone(),
            nics: self.clone(),
            disks: self.clone(),
            subnets: self.clone(),
            images: self.clone(),
            graph: self.clone(),
        })
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn add_subnet(&self, rg: &str, vnet: &str, subnet: &str) {
        let key = format!("{rg}/{vnet}/{subnet}");
        self.state.lock().unwrap().subnets.insert(
            key.clone(),
            Subnet {
                id: format!("/subscriptions/{SUBSCRIPTION}/resourceGroups/{rg}/providers/Microsoft.Network/virtualNetworks/{vnet}/subnets/{subnet}"),
                name: subnet.to_string(),
            },
        );
    }

    pub fn add_nic(&self, name: &str, attached_vm: Option<&str>) {
        self.state.lock().unwrap().nics.insert(
            name.to_string(),
            NetworkInterface {
                id: nic_id(name),
                name: name.to_string(),
                virtual_machine_id: attached_vm.map(vm_id),
            },
        );
    }

    pub fn add_disk(&self, name: &str, attached_vm: Option<&str>) {
        self.state.lock().unwrap().disks.insert(
            name.to_string(),
            Disk {
                id: disk_id(name),
                name: name.to_string(),
                managed_by: attached_vm.map(vm_id),
            },
        );
    }

    pub fn add_vm(&self, name: &str, data_disks: Vec<AttachedDisk>) {
        self.state.lock().unwrap().vms.insert(
            name.to_string(),
            VirtualMachine {
                id: vm_id(name),
                name: name.to_string(),
                location: "westeurope".to_string(),
                data_disks,
            },
        );
    }

    pub fn add_image(&self, urn: &str, image: VmImage) {
        self.state.lock().unwrap().images.insert(urn.to_string(), image);
    }

    pub fn fail_next_vm_create(&self, message: &str) {
        self.state.lock().unwrap().fail_vm_create = Some(message.to_string());
    }

    /// Subnet plus a plan-less platform image: the baseline a creation
    /// needs to reach the VM step.
    pub fn seed_defaults(&self) {
        self.add_subnet("shoot-a", "shoot-a", "nodes");
        self.add_image(
            "canonical:ubuntu:24_04-lts:latest",
            VmImage {
                id: "image-1".to_string(),
                plan: None,
            },
        );
    }
}

pub fn vm_id(name: &str) -> String {
    format!(
        "/subscriptions/{SUBSCRIPTION}/resourceGroups/shoot-a/providers/Microsoft.Compute/virtualMachines/{name}"
    )
}

pub fn nic_id(name: &str) -> String {
    format!(
        "/subscriptions/{SUBSCRIPTION}/resourceGroups/shoot-a/providers/Microsoft.Network/networkInterfaces/{name}"
    )
}

pub fn disk_id(name: &str) -> String {
    format!(
        "/subscriptions/{SUBSCRIPTION}/resourceGroups/shoot-a/providers/Microsoft.Compute/disks/{name}"
    )
}

#[async_trait]
impl VirtualMachines for FakeCloud {
    async fn get(&self, _rg: &str, name: &str) -> Result<VirtualMachine> {
        let state = self.state.lock().unwrap();
        if let Some(message) = &state.fail_vm_get {
            return Err(CloudError::Api(message.clone()));
        }
        state
            .vms
            .get(name)
            .cloned()
            .ok_or_else(|| CloudError::NotFound(format!("VM {name}")))
    }

    async fn create_or_update(
        &self,
        _rg: &str,
        name: &str,
        params: &VmParams,
    ) -> Result<VirtualMachine> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("vm.create {name}"));
        state.last_vm_params = Some(params.clone());
        if let Some(message) = state.fail_vm_create.take() {
            return Err(CloudError::Api(message));
        }

        let vm = VirtualMachine {
            id: vm_id(name),
            name: name.to_string(),
            location: params.location.clone(),
            data_disks: params
                .data_disks
                .iter()
                .map(|d| AttachedDisk {
                    name: d.name.clone(),
                    lun: d.lun,
                })
                .collect(),
        };

        // Creation materializes the disks and binds the NIC, as the
        // real compute API does.
        let owner = vm.id.clone();
        state.disks.insert(
            params.os_disk.name.clone(),
            Disk {
                id: disk_id(&params.os_disk.name),
                name: params.os_disk.name.clone(),
                managed_by: Some(owner.clone()),
            },
        );
        for disk in &params.data_disks {
            state.disks.insert(
                disk.name.clone(),
                Disk {
                    id: disk_id(&disk.name),
                    name: disk.name.clone(),
                    managed_by: Some(owner.clone()),
                },
            );
        }
        for nic in state.nics.values_mut() {
            if nic.id == params.nic_id {
                nic.virtual_machine_id = Some(owner.clone());
            }
        }
        state.vm_tags.insert(name.to_string(), params.tags.clone());
        state.vms.insert(name.to_string(), vm.clone());
        Ok(vm)
    }

    async fn detach_data_disks(&self, _rg: &str, name: &str) -> Result<VirtualMachine> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("vm.detach {name}"));
        let owner = vm_id(name);
        for disk in state.disks.values_mut() {
            if disk.managed_by.as_deref() == Some(owner.as_str()) && disk.name.ends_with("-data-disk")
            {
                disk.managed_by = None;
            }
        }
        let vm = state
            .vms
            .get_mut(name)
            .ok_or_else(|| CloudError::NotFound(format!("VM {name}")))?;
        vm.data_disks.clear();
        Ok(vm.clone())
    }

    async fn delete(&self, _rg: &str, name: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("vm.delete {name}"));
        if state.vms.remove(name).is_none() {
            return Err(CloudError::NotFound(format!("VM {name}")));
        }
        state.vm_tags.remove(name);
        // VM deletion releases its NIC and disks.
        let owner = vm_id(name);
        for nic in state.nics.values_mut() {
            if nic.virtual_machine_id.as_deref() == Some(owner.as_str()) {
                nic.virtual_machine_id = None;
            }
        }
        for disk in state.disks.values_mut() {
            if disk.managed_by.as_deref() == Some(owner.as_str()) {
                disk.managed_by = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl NetworkInterfaces for FakeCloud {
    async fn get(&self, _rg: &str, name: &str) -> Result<NetworkInterface> {
        self.state
            .lock()
            .unwrap()
            .nics
            .get(name)
            .cloned()
            .ok_or_else(|| CloudError::NotFound(format!("NIC {name}")))
    }

    async fn create_or_update(
        &self,
        _rg: &str,
        name: &str,
        _params: &NicParams,
    ) -> Result<NetworkInterface> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("nic.create {name}"));
        let nic = NetworkInterface {
            id: nic_id(name),
            name: name.to_string(),
            virtual_machine_id: None,
        };
        state.nics.insert(name.to_string(), nic.clone());
        Ok(nic)
    }

    async fn delete(&self, _rg: &str, name: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("nic.delete {name}"));
        if state.nics.remove(name).is_none() {
            return Err(CloudError::NotFound(format!("NIC {name}")));
        }
        Ok(())
    }
}

#[async_trait]
impl Disks for FakeCloud {
    async fn get(&self, _rg: &str, name: &str) -> Result<Disk> {
        self.state
            .lock()
            .unwrap()
            .disks
            .get(name)
            .cloned()
            .ok_or_else(|| CloudError::NotFound(format!("disk {name}")))
    }

    async fn delete(&self, _rg: &str, name: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("disk.delete {name}"));
        if state.disks.remove(name).is_none() {
            return Err(CloudError::NotFound(format!("disk {name}")));
        }
        Ok(())
    }
}

#[async_trait]
impl Subnets for FakeCloud {
    async fn get(&self, rg: &str, vnet: &str, subnet: &str) -> Result<Subnet> {
        self.state
            .lock()
            .unwrap()
            .subnets
            .get(&format!("{rg}/{vnet}/{subnet}"))
            .cloned()
            .ok_or_else(|| CloudError::NotFound(format!("subnet {vnet}/{subnet}")))
    }
}

#[async_trait]
impl MarketplaceImages for FakeCloud {
    async fn get(&self, _location: &str, urn: &Urn) -> Result<VmImage> {
        self.state
            .lock()
            .unwrap()
            .images
            .get(&urn.to_string())
            .cloned()
            .ok_or_else(|| CloudError::NotFound(format!("image {urn}")))
    }
}

#[async_trait]
impl ResourceGraph for FakeCloud {
    async fn vm_names_by_tags(&self, _rg: &str, tag_keys: &[String]) -> Result<Vec<String>> {
        let state = self.state.lock().unwrap();
        let mut names: Vec<String> = state
            .vm_tags
            .iter()
            .filter(|(_, tags)| tag_keys.iter().all(|k| tags.contains_key(k)))
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        Ok(names)
    }
}

pub struct FakeFactory(pub Arc<FakeCloud>);

impl AccessFactory for FakeFactory {
    fn session(&self, _credentials: &Credentials) -> Result<Arc<CloudSession>> {
        Ok(self.0.session())
    }
}

pub fn secrets() -> MachineSecrets {
    MachineSecrets {
        credentials: Credentials::new(SUBSCRIPTION, "tenant", "client", "secret").unwrap(),
        user_data: b"#cloud-config".to_vec(),
    }
}

pub fn provider_spec() -> ProviderSpec {
    let mut tags = HashMap::new();
    tags.insert("kubernetes.io-cluster-shoot-a".to_string(), "1".to_string());
    tags.insert("kubernetes.io-role-node".to_string(), "1".to_string());
    ProviderSpec {
        location: "westeurope".to_string(),
        resource_group: "shoot-a".to_string(),
        tags,
        hardware: HardwareProfile {
            vm_size: "Standard_D2s_v3".to_string(),
        },
        storage: StorageProfile {
            image: ImageRef::from_urn("canonical:ubuntu:24_04-lts:latest"),
            os_disk: OsDisk {
                size_gb: 50,
                caching: Default::default(),
                storage_account_type: "Standard_LRS".to_string(),
            },
            data_disks: Vec::new(),
        },
        os: OsProfile {
            admin_username: "core".to_string(),
            ssh_public_key: "ssh-ed25519 AAAA".to_string(),
            disable_password_auth: true,
        },
        network: NetworkProfile {
            vnet: "shoot-a".to_string(),
            vnet_resource_group: None,
            subnet: "nodes".to_string(),
            accelerated_networking: false,
        },
        placement: PlacementConfig::zoned(1),
    }
}

pub fn spec_with_data_disk(name: &str, lun: Option<i32>) -> ProviderSpec {
    let mut spec = provider_spec();
    spec.storage.data_disks = vec![DataDisk {
        name: name.to_string(),
        lun,
        size_gb: 100,
        storage_account_type: "Premium_LRS".to_string(),
        caching: Default::default(),
    }];
    spec
}

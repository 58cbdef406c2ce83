//! Provider spec model
//!
//! The declarative description of one compute unit (a VM plus its NIC and
//! disks). The spec is built once per reconciliation invocation by the
//! caller and is read-only for the duration of one operation.
//!
//! Mutually exclusive alternatives (image source, placement) arrive as
//! groups of optional fields and are resolved into tagged enums before any
//! remote call is made, so an invalid combination fails fast as a
//! [`CloudError::Configuration`].

use crate::error::{CloudError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Tag key prefix identifying the owning cluster.
pub const CLUSTER_TAG_PREFIX: &str = "kubernetes.io-cluster-";

/// Tag key prefix identifying the node role.
pub const ROLE_TAG_PREFIX: &str = "kubernetes.io-role-";

/// Maximum number of data disks attachable to one compute unit.
pub const MAX_DATA_DISKS: usize = 64;

/// Desired state of one compute unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSpec {
    /// Azure region, e.g. "westeurope"
    pub location: String,

    /// Resource group every resource of the unit lives in
    pub resource_group: String,

    /// Resource tags; must carry a cluster tag and a role tag
    #[serde(default)]
    pub tags: HashMap<String, String>,

    pub hardware: HardwareProfile,
    pub storage: StorageProfile,
    pub os: OsProfile,
    pub network: NetworkProfile,

    /// Placement alternatives; exactly one must be set
    #[serde(default)]
    pub placement: PlacementConfig,
}

impl ProviderSpec {
    /// Validate every closed invariant that can be checked without a
    /// remote call. Orchestrators call this before touching the cloud.
    pub fn validate(&self) -> Result<()> {
        if self.location.is_empty() {
            return Err(CloudError::Configuration("location must not be empty".into()));
        }
        if self.resource_group.is_empty() {
            return Err(CloudError::Configuration(
                "resource group must not be empty".into(),
            ));
        }

        let has_cluster_tag = self.tags.keys().any(|k| k.starts_with(CLUSTER_TAG_PREFIX));
        let has_role_tag = self.tags.keys().any(|k| k.starts_with(ROLE_TAG_PREFIX));
        if !has_cluster_tag || !has_role_tag {
            return Err(CloudError::Configuration(format!(
                "tags must include a '{CLUSTER_TAG_PREFIX}*' and a '{ROLE_TAG_PREFIX}*' key"
            )));
        }

        self.storage.image.resolve()?;
        self.placement.resolve()?;
        self.validate_data_disks()?;
        Ok(())
    }

    fn validate_data_disks(&self) -> Result<()> {
        let disks = &self.storage.data_disks;
        if disks.len() > MAX_DATA_DISKS {
            return Err(CloudError::Configuration(format!(
                "at most {MAX_DATA_DISKS} data disks are allowed, got {}",
                disks.len()
            )));
        }
        let mut seen = std::collections::HashSet::new();
        for (index, disk) in disks.iter().enumerate() {
            let lun = disk.effective_lun(index);
            if !(0..MAX_DATA_DISKS as i32).contains(&lun) {
                return Err(CloudError::Configuration(format!(
                    "data disk LUN {lun} is outside [0, {}]",
                    MAX_DATA_DISKS - 1
                )));
            }
            if !seen.insert(lun) {
                return Err(CloudError::Configuration(format!(
                    "duplicate data disk LUN {lun}"
                )));
            }
        }
        Ok(())
    }
}

/// VM size class
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HardwareProfile {
    /// e.g. "Standard_D2s_v3"
    pub vm_size: String,
}

/// Image and disk layout of the unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageProfile {
    pub image: ImageRef,
    pub os_disk: OsDisk,
    #[serde(default)]
    pub data_disks: Vec<DataDisk>,
}

/// OS disk descriptor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OsDisk {
    pub size_gb: i32,
    #[serde(default)]
    pub caching: Caching,
    /// Managed-disk storage class, e.g. "Standard_LRS"
    pub storage_account_type: String,
}

/// Data disk descriptor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataDisk {
    /// Optional display name; empty means a positional name is derived
    #[serde(default)]
    pub name: String,

    /// Logical unit number; the disk's list index is used when absent
    #[serde(default)]
    pub lun: Option<i32>,

    pub size_gb: i32,
    pub storage_account_type: String,
    #[serde(default)]
    pub caching: Caching,
}

impl DataDisk {
    /// LUN actually used on the VM: the declared one, or the disk's
    /// position in the list when none was declared.
    pub fn effective_lun(&self, index: usize) -> i32 {
        self.lun.unwrap_or(index as i32)
    }
}

/// Host caching mode for a disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Caching {
    #[default]
    None,
    ReadOnly,
    ReadWrite,
}

impl std::fmt::Display for Caching {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Caching::None => write!(f, "None"),
            Caching::ReadOnly => write!(f, "ReadOnly"),
            Caching::ReadWrite => write!(f, "ReadWrite"),
        }
    }
}

/// Admin identity and login material
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OsProfile {
    pub admin_username: String,
    pub ssh_public_key: String,
    #[serde(default = "default_true")]
    pub disable_password_auth: bool,
}

fn default_true() -> bool {
    true
}

/// Subnet binding of the unit's NIC
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkProfile {
    pub vnet: String,
    /// Resource group of the vnet when it differs from the unit's
    #[serde(default)]
    pub vnet_resource_group: Option<String>,
    pub subnet: String,
    #[serde(default)]
    pub accelerated_networking: bool,
}

impl NetworkProfile {
    /// Resource group the subnet is looked up in.
    pub fn subnet_resource_group<'a>(&'a self, spec_resource_group: &'a str) -> &'a str {
        self.vnet_resource_group
            .as_deref()
            .unwrap_or(spec_resource_group)
    }
}

/// Image source alternatives as they arrive on the wire.
///
/// Exactly one field must be set; [`ImageRef::resolve`] enforces that and
/// produces the tagged [`ImageReference`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageRef {
    #[serde(default)]
    pub id: Option<String>,
    /// Platform image URN, `publisher:offer:sku:version`
    #[serde(default)]
    pub urn: Option<String>,
    #[serde(default)]
    pub community_gallery_image_id: Option<String>,
    #[serde(default)]
    pub shared_gallery_image_id: Option<String>,
}

impl ImageRef {
    pub fn from_urn(urn: impl Into<String>) -> Self {
        Self {
            urn: Some(urn.into()),
            ..Default::default()
        }
    }

    pub fn from_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    /// Resolve the closed choice, rejecting zero or multiple set fields
    /// with an error naming the conflicting ones.
    pub fn resolve(&self) -> Result<ImageReference> {
        let mut set = Vec::new();
        if self.id.is_some() {
            set.push("id");
        }
        if self.urn.is_some() {
            set.push("urn");
        }
        if self.community_gallery_image_id.is_some() {
            set.push("communityGalleryImageId");
        }
        if self.shared_gallery_image_id.is_some() {
            set.push("sharedGalleryImageId");
        }
        match set.as_slice() {
            [] => Err(CloudError::Configuration(
                "image reference must set exactly one of id, urn, \
                 communityGalleryImageId, sharedGalleryImageId"
                    .into(),
            )),
            [_] => Ok(if let Some(id) = &self.id {
                ImageReference::Id(id.clone())
            } else if let Some(urn) = &self.urn {
                ImageReference::Urn(urn.parse()?)
            } else if let Some(id) = &self.community_gallery_image_id {
                ImageReference::CommunityGallery(id.clone())
            } else {
                ImageReference::SharedGallery(
                    self.shared_gallery_image_id.clone().unwrap_or_default(),
                )
            }),
            many => Err(CloudError::Configuration(format!(
                "image reference fields are mutually exclusive, got: {}",
                many.join(", ")
            ))),
        }
    }
}

/// Resolved image source with exactly one active case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageReference {
    /// Opaque managed-image or gallery-version resource id
    Id(String),
    /// Platform (marketplace) image
    Urn(Urn),
    CommunityGallery(String),
    SharedGallery(String),
}

/// Parsed platform-image URN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Urn {
    pub publisher: String,
    pub offer: String,
    pub sku: String,
    pub version: String,
}

impl std::str::FromStr for Urn {
    type Err = CloudError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 4 || parts.iter().any(|p| p.is_empty()) {
            return Err(CloudError::Configuration(format!(
                "malformed image URN {s:?}: want 4 non-empty \
                 colon-separated parts (publisher:offer:sku:version)"
            )));
        }
        Ok(Urn {
            publisher: parts[0].to_string(),
            offer: parts[1].to_string(),
            sku: parts[2].to_string(),
            version: parts[3].to_string(),
        })
    }
}

impl std::fmt::Display for Urn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.publisher, self.offer, self.sku, self.version
        )
    }
}

/// Placement alternatives as they arrive on the wire.
///
/// Exactly one of the three must be set; [`PlacementConfig::resolve`]
/// enforces that before any cloud call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlacementConfig {
    /// Availability-zone index, e.g. 1
    #[serde(default)]
    pub zone: Option<u8>,
    /// Availability-set resource id
    #[serde(default)]
    pub availability_set: Option<String>,
    /// Scale-set resource id
    #[serde(default)]
    pub scale_set: Option<String>,
}

impl PlacementConfig {
    pub fn zoned(zone: u8) -> Self {
        Self {
            zone: Some(zone),
            ..Default::default()
        }
    }

    pub fn resolve(&self) -> Result<Placement> {
        let mut set = Vec::new();
        if self.zone.is_some() {
            set.push("zone");
        }
        if self.availability_set.is_some() {
            set.push("availabilitySet");
        }
        if self.scale_set.is_some() {
            set.push("scaleSet");
        }
        match set.as_slice() {
            [] => Err(CloudError::Configuration(
                "exactly one of zone, availabilitySet, scaleSet must be set, got none".into(),
            )),
            [_] => Ok(if let Some(zone) = self.zone {
                Placement::Zone(zone)
            } else if let Some(set_id) = &self.availability_set {
                Placement::AvailabilitySet(set_id.clone())
            } else {
                Placement::ScaleSet(self.scale_set.clone().unwrap_or_default())
            }),
            many => Err(CloudError::Configuration(format!(
                "placement fields are mutually exclusive, got: {}",
                many.join(", ")
            ))),
        }
    }
}

/// Resolved placement with exactly one active case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    Zone(u8),
    AvailabilitySet(String),
    ScaleSet(String),
}

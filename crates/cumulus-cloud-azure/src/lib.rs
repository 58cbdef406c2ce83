//! Azure compute-unit provisioning driver for Cumulus
//!
//! Provisions and deprovisions one compute unit (a VM plus its NIC and
//! disks) per [`cumulus_cloud::MachineDriver`] call:
//!
//! - creation: subnet lookup → NIC creation → VM creation, with a
//!   compensating teardown when a later step fails,
//! - deletion: data-disk detach → VM delete, then guarded concurrent
//!   deletion of the NIC and every disk,
//! - dependent resources are found purely by deterministic naming, so
//!   re-entry after a crash needs no stored identifier mapping.
//!
//! The Azure API itself sits behind the client traits in [`access`];
//! this crate contains the orchestration, not the SDK binding.

pub mod access;
pub mod deprovision;
pub mod driver;
pub mod names;
pub mod params;
pub mod provision;
pub mod tasks;

// Re-exports
pub use access::{
    AccessFactory, AttachedDisk, CloudSession, Disk, Disks, MarketplaceImages, NetworkInterface,
    NetworkInterfaces, PurchasePlan, ResourceGraph, Subnet, Subnets, VirtualMachine,
    VirtualMachines, VmImage,
};
pub use driver::AzureDriver;
pub use params::{NicParams, VmParams};

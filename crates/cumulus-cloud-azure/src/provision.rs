//! Provisioning orchestrator
//!
//! Creation path for one compute unit, strictly ordered: resolve the
//! subnet, create the NIC, resolve the image's marketplace plan, create
//! the VM. Each step needs the previous step's output, so the sequence
//! blocks at every remote call.
//!
//! When VM creation fails after the NIC exists, the resource-set teardown
//! runs as a compensating step. Its own failure is logged and never masks
//! the original creation error.

use crate::access::{CloudSession, PurchasePlan, Subnet};
use crate::deprovision;
use crate::names;
use crate::params::{NicParams, VmParams};
use cumulus_cloud::driver::CreateMachineResponse;
use cumulus_cloud::error::{CloudError, Result};
use cumulus_cloud::secrets::MachineSecrets;
use cumulus_cloud::spec::{ImageReference, ProviderSpec};

/// Create the compute unit `machine_name` per `spec`.
pub async fn create_compute_unit(
    session: &CloudSession,
    spec: &ProviderSpec,
    secrets: &MachineSecrets,
    machine_name: &str,
) -> Result<CreateMachineResponse> {
    spec.validate()?;
    let image = spec.storage.image.resolve()?;

    let subnet = resolve_subnet(session, spec).await?;

    let nic_name = names::nic_name(machine_name);
    let nic_params = NicParams::for_machine(spec, &subnet.id);
    tracing::info!("Creating network interface: {}", nic_name);
    let nic = session
        .nics
        .create_or_update(&spec.resource_group, &nic_name, &nic_params)
        .await?;

    let plan = resolve_plan(session, spec, &image).await?;
    let vm_params = VmParams::build(
        machine_name,
        spec,
        &secrets.user_data,
        image,
        plan,
        nic.id.clone(),
    )?;

    tracing::info!("Creating virtual machine: {}", machine_name);
    match session
        .vms
        .create_or_update(&spec.resource_group, machine_name, &vm_params)
        .await
    {
        Ok(vm) => Ok(CreateMachineResponse {
            provider_id: names::encode_machine_id(&spec.location, &vm.name),
            node_name: machine_name.to_string(),
        }),
        Err(create_err) => {
            tracing::warn!(
                "VM creation for {} failed, tearing down dependent resources: {}",
                machine_name,
                create_err
            );
            if let Err(cleanup_err) =
                deprovision::delete_compute_unit(session, spec, machine_name).await
            {
                tracing::warn!(
                    "teardown after failed creation of {} left resources behind: {}",
                    machine_name,
                    cleanup_err
                );
            }
            Err(create_err)
        }
    }
}

async fn resolve_subnet(session: &CloudSession, spec: &ProviderSpec) -> Result<Subnet> {
    let subnet_rg = spec.network.subnet_resource_group(&spec.resource_group);
    tracing::debug!(
        "Resolving subnet {}/{} in {}",
        spec.network.vnet,
        spec.network.subnet,
        subnet_rg
    );
    session
        .subnets
        .get(subnet_rg, &spec.network.vnet, &spec.network.subnet)
        .await
        .map_err(|err| {
            if err.is_not_found() {
                CloudError::DependencyNotFound(format!(
                    "subnet {}/{} in resource group {}",
                    spec.network.vnet, spec.network.subnet, subnet_rg
                ))
            } else {
                err
            }
        })
}

/// Marketplace plan of the image, if it has one. Only platform (URN)
/// images can carry a plan; the other image kinds never do.
async fn resolve_plan(
    session: &CloudSession,
    spec: &ProviderSpec,
    image: &ImageReference,
) -> Result<Option<PurchasePlan>> {
    let urn = match image {
        ImageReference::Urn(urn) => urn,
        _ => return Ok(None),
    };
    let vm_image = session
        .images
        .get(&spec.location, urn)
        .await
        .map_err(|err| {
            if err.is_not_found() {
                CloudError::DependencyNotFound(format!(
                    "platform image {urn} in {}",
                    spec.location
                ))
            } else {
                err
            }
        })?;
    Ok(vm_image.plan)
}

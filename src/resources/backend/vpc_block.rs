//! VPC block storage claim

use std::collections::BTreeMap;
use std::sync::Arc;

use k8s_openapi::api::core::v1::{
    PersistentVolumeClaim, PersistentVolumeClaimSpec, VolumeResourceRequirements,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::ResourceExt;

use crate::crd::Nfs;
use crate::resources::{ClusterClient, Managed, ResourceGroup};

/// Group name used in logs and metrics
pub const GROUP_NAME: &str = "vpc-block";

/// Build the backing storage resource group for an Nfs instance
pub fn resources(client: Arc<dyn ClusterClient>, owner: &Arc<Nfs>) -> ResourceGroup {
    let log = tracing::info_span!("vpc-block", nfs = %owner.name_any());
    let claim = Managed::boxed(client, Some(owner.clone()), persistent_volume_claim(owner), &log);

    ResourceGroup::new(GROUP_NAME, vec![claim], log)
}

/// Claim for the block volume holding the NFS exports.
///
/// Block volumes attach to one node, hence ReadWriteOnce.
pub fn persistent_volume_claim(owner: &Nfs) -> PersistentVolumeClaim {
    let backing = &owner.spec.backing_storage;

    PersistentVolumeClaim {
        metadata: ObjectMeta {
            name: Some(backing.pvc_name.clone()),
            namespace: Some(owner.namespace().unwrap_or_else(|| "default".to_string())),
            ..Default::default()
        },
        spec: Some(PersistentVolumeClaimSpec {
            storage_class_name: Some(backing.storage_class.clone()),
            access_modes: Some(vec!["ReadWriteOnce".to_string()]),
            resources: Some(VolumeResourceRequirements {
                requests: Some(BTreeMap::from([(
                    "storage".to_string(),
                    Quantity(backing.storage_size.clone()),
                )])),
                ..Default::default()
            }),
            ..Default::default()
        }),
        ..Default::default()
    }
}

//! StorageClass through which users request NFS volumes
//!
//! The StorageClass is cluster-scoped while its owner is a namespaced Nfs.
//! The API server accepts the controller reference, but the garbage collector
//! rejects it (`OwnerRefInvalidNamespace`), so deleting the Nfs leaves the
//! StorageClass behind. The owner reference is still what maps StorageClass
//! events back to the Nfs, together with the namespace label below.

use k8s_openapi::api::storage::v1::StorageClass;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::{runtime::reflector::ObjectRef, Resource};

use super::{app_labels, namespace};
use crate::crd::Nfs;

/// NFS protocol version requested by mounts
pub const MOUNT_OPTIONS: [&str; 1] = ["vers=4.1"];

/// Label carrying the namespace of the owning Nfs
pub const OWNER_NAMESPACE_LABEL: &str = "ibmcloud.ibm.com/nfs-namespace";

/// StorageClass is cluster-scoped and carries no namespace
pub fn storage_class(owner: &Nfs) -> StorageClass {
    let mut labels = app_labels();
    labels.insert(OWNER_NAMESPACE_LABEL.to_string(), namespace(owner));

    StorageClass {
        metadata: ObjectMeta {
            name: Some(owner.spec.storage_class.clone()),
            labels: Some(labels),
            ..Default::default()
        },
        provisioner: owner.spec.provisioner_api.clone(),
        mount_options: Some(MOUNT_OPTIONS.iter().map(|o| o.to_string()).collect()),
        ..Default::default()
    }
}

/// The Nfs controlling a StorageClass.
///
/// Owner references carry no namespace, so a cluster-scoped object needs the
/// namespace label to point at its namespaced owner.
pub fn owning_nfs(storage_class: &StorageClass) -> Option<ObjectRef<Nfs>> {
    let namespace = storage_class.metadata.labels.as_ref()?.get(OWNER_NAMESPACE_LABEL)?;
    let owner = storage_class
        .metadata
        .owner_references
        .as_ref()?
        .iter()
        .find(|r| {
            r.controller == Some(true)
                && r.kind == Nfs::kind(&())
                && r.api_version == Nfs::api_version(&())
        })?;

    Some(ObjectRef::new(&owner.name).within(namespace))
}

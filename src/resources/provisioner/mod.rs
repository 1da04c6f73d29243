//! NFS provisioner resources
//!
//! The provisioner runs as a single-replica Deployment exporting the backing
//! claim over NFS, reachable through a Service, authorized through a
//! ServiceAccount bound to a leader-locking Role, and exposed to users
//! through a StorageClass.

mod deployment;
mod rbac;
mod service;
mod service_account;
mod storage_class;

pub use deployment::deployment;
pub use rbac::{role, role_binding};
pub use service::service;
pub use service_account::service_account;
pub use storage_class::{owning_nfs, storage_class, OWNER_NAMESPACE_LABEL};

use std::collections::BTreeMap;
use std::sync::Arc;

use kube::ResourceExt;

use super::{ClusterClient, Managed, ResourceGroup};
use crate::crd::Nfs;

/// Name shared by the provisioner's Deployment, Service and ServiceAccount
pub const APP_NAME: &str = "nfs-provisioner";

/// Provisioner container image
pub const IMAGE_NAME: &str = "quay.io/kubernetes_incubator/nfs-provisioner:latest";

/// Name of the leader-locking Role and its RoleBinding
pub const LEADER_LOCKING_NAME: &str = "leader-locking-nfs-provisioner";

/// Group name used in logs and metrics
pub const GROUP_NAME: &str = "nfs-provisioner";

/// Ports served by the NFS server, each exposed on TCP and UDP
pub(crate) const NFS_PORTS: [(&str, i32); 6] = [
    ("nfs", 2049),
    ("nlockmgr", 32803),
    ("mountd", 20048),
    ("rquotad", 875),
    ("rpcbind", 111),
    ("statd", 662),
];

/// Build the provisioner resource group for an Nfs instance
pub fn resources(client: Arc<dyn ClusterClient>, owner: &Arc<Nfs>) -> ResourceGroup {
    let log = tracing::info_span!("nfs-provisioner", nfs = %owner.name_any());
    let owned_by = Some(owner.clone());

    let resources = vec![
        Managed::boxed(client.clone(), owned_by.clone(), service_account(owner), &log),
        Managed::boxed(client.clone(), owned_by.clone(), service(owner), &log),
        Managed::boxed(client.clone(), owned_by.clone(), deployment(owner), &log),
        Managed::boxed(client.clone(), owned_by.clone(), role(owner), &log),
        Managed::boxed(client.clone(), owned_by.clone(), role_binding(owner), &log),
        Managed::boxed(client, owned_by, storage_class(owner), &log),
    ];

    ResourceGroup::new(GROUP_NAME, resources, log)
}

/// Namespace of the provisioner objects: the namespace of the Nfs instance
pub(crate) fn namespace(owner: &Nfs) -> String {
    owner.namespace().unwrap_or_else(|| "default".to_string())
}

pub(crate) fn app_labels() -> BTreeMap<String, String> {
    BTreeMap::from([("app".to_string(), APP_NAME.to_string())])
}

//! Custom Resource Definitions for the NFS Operator

mod nfs;

pub use nfs::*;

use kube::CustomResourceExt;

/// Generate all CRD YAML manifests
pub fn generate_crds() -> Result<Vec<String>, serde_yaml::Error> {
    Ok(vec![serde_yaml::to_string(&Nfs::crd())?])
}

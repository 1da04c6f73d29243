//! Nfs Custom Resource Definition

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Nfs resource specification
#[derive(CustomResource, Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "ibmcloud.ibm.com",
    version = "v1alpha1",
    kind = "Nfs",
    plural = "nfs",
    singular = "nfs",
    namespaced,
    status = "NfsStatus",
    printcolumn = r#"{"name": "Capacity", "type": "string", "jsonPath": ".status.capacity"}"#,
    printcolumn = r#"{"name": "StorageClass", "type": "string", "jsonPath": ".spec.storageClass"}"#,
    printcolumn = r#"{"name": "Age", "type": "date", "jsonPath": ".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct NfsSpec {
    /// Name of the StorageClass served by the NFS provisioner
    #[serde(default = "default_storage_class")]
    pub storage_class: String,

    /// Provisioner identifier written into the StorageClass
    #[serde(rename = "provisionerAPI", default = "default_provisioner_api")]
    pub provisioner_api: String,

    /// Block storage exported by the NFS server
    #[serde(default)]
    pub backing_storage: BackingStorageSpec,
}

impl Default for NfsSpec {
    fn default() -> Self {
        Self {
            storage_class: default_storage_class(),
            provisioner_api: default_provisioner_api(),
            backing_storage: BackingStorageSpec::default(),
        }
    }
}

fn default_storage_class() -> String {
    "example-nfs".to_string()
}

fn default_provisioner_api() -> String {
    "example.com/nfs".to_string()
}

/// Backing storage specification
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BackingStorageSpec {
    /// PersistentVolumeClaim name
    #[serde(default = "default_pvc_name")]
    pub pvc_name: String,

    /// StorageClass of the block volume
    #[serde(default = "default_backing_storage_class")]
    pub storage_class: String,

    /// Requested size (e.g., "10Gi")
    #[serde(default = "default_storage_size")]
    pub storage_size: String,
}

impl Default for BackingStorageSpec {
    fn default() -> Self {
        Self {
            pvc_name: default_pvc_name(),
            storage_class: default_backing_storage_class(),
            storage_size: default_storage_size(),
        }
    }
}

fn default_pvc_name() -> String {
    "nfs-block-custom".to_string()
}

fn default_backing_storage_class() -> String {
    "ibmc-vpc-block-general-purpose".to_string()
}

fn default_storage_size() -> String {
    "10Gi".to_string()
}

/// Nfs status, reserved for capacity reporting
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NfsStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_mode: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

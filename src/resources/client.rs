//! Cluster access used by managed resources
//!
//! Resources address objects by identity (API resource, namespace, name) and
//! exchange them as `DynamicObject`s so a single client serves every kind.

use std::fmt;

use async_trait::async_trait;
use kube::{
    api::{Api, ApiResource, DynamicObject, PostParams},
    Client,
};

#[cfg(test)]
use mockall::automock;

/// Field manager recorded on objects created by the operator
pub const FIELD_MANAGER: &str = "nfs-operator";

/// Deterministic identity of a cluster object
#[derive(Clone, Debug)]
pub struct ObjectKey {
    /// Group, version, kind and plural of the object
    pub api_resource: ApiResource,
    /// `None` for cluster-scoped kinds
    pub namespace: Option<String>,
    pub name: String,
}

impl ObjectKey {
    pub fn new(api_resource: ApiResource, namespace: Option<String>, name: impl Into<String>) -> Self {
        Self {
            api_resource,
            namespace,
            name: name.into(),
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{} {}/{}", self.api_resource.kind, ns, self.name),
            None => write!(f, "{} {}", self.api_resource.kind, self.name),
        }
    }
}

/// Trait abstracting the get/create verbs the reconciliation engine needs
///
/// This trait allows mocking the Kubernetes client in tests while using
/// the real client in production.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Fetch an object. A missing object is reported as a 404 API error.
    async fn get(&self, key: &ObjectKey) -> Result<DynamicObject, kube::Error>;

    /// Create an object. A name collision is reported as a 409 API error.
    async fn create(&self, key: &ObjectKey, object: &DynamicObject)
        -> Result<DynamicObject, kube::Error>;
}

/// Real Kubernetes client implementation
#[derive(Clone)]
pub struct KubeClusterClient {
    client: Client,
}

impl KubeClusterClient {
    /// Create a new KubeClusterClient wrapping the given kube Client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api(&self, key: &ObjectKey) -> Api<DynamicObject> {
        match &key.namespace {
            Some(ns) => Api::namespaced_with(self.client.clone(), ns, &key.api_resource),
            None => Api::all_with(self.client.clone(), &key.api_resource),
        }
    }
}

#[async_trait]
impl ClusterClient for KubeClusterClient {
    async fn get(&self, key: &ObjectKey) -> Result<DynamicObject, kube::Error> {
        self.api(key).get(&key.name).await
    }

    async fn create(
        &self,
        key: &ObjectKey,
        object: &DynamicObject,
    ) -> Result<DynamicObject, kube::Error> {
        let params = PostParams {
            field_manager: Some(FIELD_MANAGER.to_string()),
            ..Default::default()
        };
        self.api(key).create(&params, object).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::{core::v1::Service, storage::v1::StorageClass};

    #[test]
    fn test_object_key_display() {
        let namespaced = ObjectKey::new(
            ApiResource::erase::<Service>(&()),
            Some("storage".to_string()),
            "nfs-provisioner",
        );
        assert_eq!(namespaced.to_string(), "Service storage/nfs-provisioner");

        let cluster = ObjectKey::new(ApiResource::erase::<StorageClass>(&()), None, "example-nfs");
        assert_eq!(cluster.to_string(), "StorageClass example-nfs");
    }
}

//! Managed cluster resources
//!
//! Every object the operator owns (Deployment, Service, RBAC, StorageClass,
//! PersistentVolumeClaim) is wrapped in a [`Managed`] resource which knows how
//! to look itself up, create itself when missing, and attach the owning Nfs
//! as controller so deleting the Nfs garbage-collects it.
//!
//! Resources are grouped per subsystem in a [`ResourceGroup`]:
//! - [`provisioner`] for the NFS provisioner itself
//! - [`backend`] for the block storage it exports

pub mod backend;
pub mod client;
pub mod group;
pub mod provisioner;

pub use client::{ClusterClient, KubeClusterClient, ObjectKey};
pub use group::{GroupReport, ResourceGroup};

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};
use kube::{
    api::{ApiResource, DynamicObject},
    Resource as KubeResource, ResourceExt,
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{error, info, Instrument, Span};

use crate::crd::Nfs;
use crate::error::{Error, Result};
use crate::metrics;

/// Result of reconciling a single managed resource
#[derive(Clone, Debug)]
pub enum Outcome {
    /// The object was already present; nothing was changed
    Skipped,
    /// The object was created, as returned by the API server
    Created(Box<DynamicObject>),
}

impl Outcome {
    pub fn is_created(&self) -> bool {
        matches!(self, Outcome::Created(_))
    }
}

/// A resource that can be reconciled by the controller
#[async_trait]
pub trait Reconcilable: Send + Sync {
    /// Identity of the object in the cluster
    fn key(&self) -> &ObjectKey;

    /// Fetch the object from the cluster
    async fn get(&self) -> Result<DynamicObject>;

    /// Create the object if it does not exist
    async fn apply(&self) -> Result<Outcome>;

    /// Set the owner as controller of the object, then apply it
    async fn reconcile(&mut self) -> Result<Outcome>;
}

/// Capabilities shared by every managed resource
#[derive(Clone)]
pub struct Resource {
    pub client: Arc<dyn ClusterClient>,
    /// API identity of the managed kind
    pub api_resource: ApiResource,
    pub owner: Option<Arc<Nfs>>,
    /// Span carrying the resource identity; all resource logs go through it
    pub log: Span,
}

/// Returns whether a lookup found the object.
///
/// A not-found error means the object is absent. Any other error is returned
/// as is since the state of the object is unknown.
pub fn exists<T>(lookup: Result<T>) -> Result<bool> {
    match lookup {
        Ok(_) => Ok(true),
        Err(e) if e.is_not_found() => Ok(false),
        Err(e) => Err(e),
    }
}

/// Returns the API version and kind of an object, or empty strings when the
/// object carries no type information.
pub fn group_version_kind<K: Serialize>(object: &K) -> (String, String) {
    let Ok(value) = serde_json::to_value(object) else {
        return (String::new(), String::new());
    };
    let field = |name: &str| {
        value
            .get(name)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string()
    };
    (field("apiVersion"), field("kind"))
}

/// Convert a typed object into its dynamic wire form
pub fn to_dynamic<K: Serialize>(object: &K) -> Result<DynamicObject> {
    Ok(serde_json::from_value(serde_json::to_value(object)?)?)
}

/// Make `owner_ref` the controller of the object.
///
/// An existing reference to the same owner is replaced. Fails if another
/// controller already owns the object.
pub fn set_controller_reference(meta: &mut ObjectMeta, owner_ref: OwnerReference) -> std::result::Result<(), String> {
    let refs = meta.owner_references.get_or_insert_with(Vec::new);

    if let Some(other) = refs
        .iter()
        .find(|r| r.controller == Some(true) && r.uid != owner_ref.uid)
    {
        return Err(format!(
            "object is already owned by another controller {} {}",
            other.kind, other.name
        ));
    }

    match refs.iter_mut().find(|r| r.uid == owner_ref.uid) {
        Some(existing) => *existing = owner_ref,
        None => refs.push(owner_ref),
    }
    Ok(())
}

/// A typed Kubernetes object managed by the operator
pub struct Managed<K> {
    resource: Resource,
    key: ObjectKey,
    object: K,
}

impl<K> Managed<K>
where
    K: KubeResource<DynamicType = ()> + Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// Wrap the desired definition of an object.
    ///
    /// `log` is the span of the enclosing group; the resource logs in a child
    /// span enriched with its identity.
    pub fn new(
        client: Arc<dyn ClusterClient>,
        owner: Option<Arc<Nfs>>,
        object: K,
        log: &Span,
    ) -> Self {
        let api_resource = ApiResource::erase::<K>(&());
        let key = ObjectKey::new(api_resource.clone(), object.namespace(), object.name_any());
        let (api_version, kind) = group_version_kind(&object);
        let log = tracing::info_span!(
            parent: log,
            "resource",
            resource.name = %key.name,
            resource.namespace = key.namespace.as_deref().unwrap_or_default(),
            resource.api_version = %api_version,
            resource.kind = %kind,
        );

        Self {
            resource: Resource {
                client,
                api_resource,
                owner,
                log,
            },
            key,
            object,
        }
    }

    /// Same as [`Managed::new`], boxed for a group declaration list
    pub fn boxed(
        client: Arc<dyn ClusterClient>,
        owner: Option<Arc<Nfs>>,
        object: K,
        log: &Span,
    ) -> Box<dyn Reconcilable> {
        Box::new(Self::new(client, owner, object, log))
    }

    /// Desired definition of the object
    pub fn object(&self) -> &K {
        &self.object
    }

    async fn create(&self) -> Result<Outcome> {
        let kind = self.resource.api_resource.kind.as_str();
        let desired = to_dynamic(&self.object)?;

        match self.resource.client.create(&self.key, &desired).await {
            Ok(created) => {
                info!("Created a new resource");
                metrics::RESOURCES.with_label_values(&["created", kind]).inc();
                Ok(Outcome::Created(Box::new(created)))
            }
            Err(e) => {
                let e = Error::from(e);
                if e.is_already_exists() {
                    info!("Skip reconcile: resource was created concurrently");
                    metrics::RESOURCES.with_label_values(&["skipped", kind]).inc();
                    return Ok(Outcome::Skipped);
                }
                error!(error = %e, "Failed to create the resource");
                metrics::RESOURCES.with_label_values(&["failed", kind]).inc();
                Err(e)
            }
        }
    }
}

#[async_trait]
impl<K> Reconcilable for Managed<K>
where
    K: KubeResource<DynamicType = ()> + Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn key(&self) -> &ObjectKey {
        &self.key
    }

    async fn get(&self) -> Result<DynamicObject> {
        Ok(self.resource.client.get(&self.key).await?)
    }

    async fn apply(&self) -> Result<Outcome> {
        async {
            let found = match exists(self.get().await) {
                Ok(found) => found,
                Err(e) => {
                    error!(error = %e, "Failed to reconcile the resource");
                    metrics::RESOURCES
                        .with_label_values(&["failed", self.resource.api_resource.kind.as_str()])
                        .inc();
                    return Err(e);
                }
            };

            if found {
                info!("Skip reconcile: resource already exists");
                metrics::RESOURCES
                    .with_label_values(&["skipped", self.resource.api_resource.kind.as_str()])
                    .inc();
                return Ok(Outcome::Skipped);
            }

            self.create().await
        }
        .instrument(self.resource.log.clone())
        .await
    }

    async fn reconcile(&mut self) -> Result<Outcome> {
        let Some(owner) = self.resource.owner.clone() else {
            return Err(Error::MissingOwner(self.key.to_string()));
        };

        let owner_ref = owner
            .controller_owner_ref(&())
            .ok_or_else(|| Error::OwnerReference {
                resource: self.key.to_string(),
                reason: "owner has no name or uid".to_string(),
            })?;

        info!(parent: &self.resource.log, "Reconciling {} resource", self.key.name);
        set_controller_reference(self.object.meta_mut(), owner_ref).map_err(|reason| {
            error!(parent: &self.resource.log, %reason, "Failed to set controller reference to resource");
            Error::OwnerReference {
                resource: self.key.to_string(),
                reason,
            }
        })?;

        self.apply().await
    }
}

//! Nfs reconciler
//!
//! One reconciliation pass:
//! - fetches the current Nfs instance (a missing instance ends the pass)
//! - validates its spec
//! - reconciles the backing storage group, then the provisioner group
//!
//! Every pass recomputes the desired objects from the current spec, so the
//! only question asked of the cluster is whether each object exists.

use std::sync::Arc;

use kube::{
    api::{ApiResource, DynamicObject},
    runtime::controller::Action,
};
use tracing::{info, warn};

use crate::crd::Nfs;
use crate::error::{Error, Result};
use crate::resources::{backend::vpc_block, provisioner, ClusterClient, ObjectKey, ResourceGroup};

/// Fetch the Nfs instance, `None` if it no longer exists
pub async fn fetch(client: &dyn ClusterClient, namespace: &str, name: &str) -> Result<Option<Nfs>> {
    let key = ObjectKey::new(
        ApiResource::erase::<Nfs>(&()),
        Some(namespace.to_string()),
        name,
    );

    match client.get(&key).await.map_err(Error::from) {
        Ok(object) => Ok(Some(from_dynamic(object)?)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

fn from_dynamic(object: DynamicObject) -> Result<Nfs> {
    Ok(serde_json::from_value(serde_json::to_value(object)?)?)
}

/// Validate the Nfs spec
pub fn validate(nfs: &Nfs) -> Result<()> {
    let spec = &nfs.spec;

    if spec.provisioner_api.trim().is_empty() {
        return Err(Error::validation("provisionerAPI must not be empty"));
    }
    if spec.storage_class.trim().is_empty() {
        return Err(Error::validation("storageClass must not be empty"));
    }
    if spec.backing_storage.pvc_name.trim().is_empty() {
        return Err(Error::validation("backingStorage.pvcName must not be empty"));
    }
    if spec.backing_storage.storage_class.trim().is_empty() {
        return Err(Error::validation("backingStorage.storageClass must not be empty"));
    }
    if !is_quantity(&spec.backing_storage.storage_size) {
        return Err(Error::validation(format!(
            "Invalid backingStorage.storageSize '{}': must be a quantity such as 10Gi",
            spec.backing_storage.storage_size
        )));
    }

    Ok(())
}

/// Whether `value` is an unsigned Kubernetes resource quantity: a decimal
/// number followed by a binary suffix (Ki..Ei), a decimal suffix
/// (n, u, m, k..E) or an exponent (e3, E-2). Signed sizes are rejected.
fn is_quantity(value: &str) -> bool {
    let number_len = value
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(value.len());
    let (number, suffix) = value.split_at(number_len);

    let mut parts = number.splitn(2, '.');
    let whole = parts.next().unwrap_or_default();
    let fraction = parts.next();
    if whole.is_empty() && fraction.map_or(true, str::is_empty) {
        return false;
    }
    if fraction.is_some_and(|f| f.contains('.')) {
        return false;
    }

    match suffix {
        "" | "Ki" | "Mi" | "Gi" | "Ti" | "Pi" | "Ei" => true,
        "n" | "u" | "m" | "k" | "M" | "G" | "T" | "P" | "E" => true,
        exponent => exponent
            .strip_prefix(['e', 'E'])
            .map(|e| e.strip_prefix(['+', '-']).unwrap_or(e))
            .is_some_and(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_digit())),
    }
}

/// Resource groups of an Nfs instance, in reconcile order.
///
/// The provisioner Deployment mounts the backing claim by name, so the
/// backing storage group comes first.
pub fn resource_groups(client: Arc<dyn ClusterClient>, nfs: &Arc<Nfs>) -> Vec<ResourceGroup> {
    vec![
        vpc_block::resources(client.clone(), nfs),
        provisioner::resources(client, nfs),
    ]
}

/// Run one reconciliation pass for the Nfs identified by namespace/name
pub async fn reconcile(client: Arc<dyn ClusterClient>, namespace: &str, name: &str) -> Result<Action> {
    let Some(nfs) = fetch(client.as_ref(), namespace, name).await? else {
        // Owned objects are garbage collected through their owner references
        info!(namespace, nfs = name, "Nfs not found, nothing to reconcile");
        return Ok(Action::await_change());
    };

    if let Err(e) = validate(&nfs) {
        warn!(namespace, nfs = name, error = %e, "Validation failed");
        return Err(e);
    }

    let nfs = Arc::new(nfs);
    for mut group in resource_groups(client, &nfs) {
        let report = group.reconcile().await?;
        info!(
            group = group.name(),
            created = report.created.len(),
            skipped = report.skipped.len(),
            "Reconciled resource group"
        );
    }

    Ok(Action::await_change())
}

//! Nfs controller
//!
//! Watches Nfs resources and the objects they own, and triggers
//! reconciliation of the owning Nfs on any change.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use k8s_openapi::api::{
    apps::v1::Deployment,
    core::v1::{PersistentVolumeClaim, Service, ServiceAccount},
    rbac::v1::{Role, RoleBinding},
    storage::v1::StorageClass,
};
use kube::{
    api::ListParams,
    runtime::{
        controller::{Action, Controller},
        watcher::Config as WatcherConfig,
    },
    Api, ResourceExt,
};
use tracing::{error, info, instrument};

use crate::controllers::Context;
use crate::crd::Nfs;
use crate::error::{Error, Result};
use crate::metrics;
use crate::reconcilers::nfs as nfs_reconciler;
use crate::resources::provisioner;

/// Run the Nfs controller
///
/// Namespaced children are mapped back through their owner references. The
/// cluster-scoped StorageClass is mapped through its owner namespace label.
pub async fn run(context: Arc<Context>) {
    let client = context.client.clone();
    let api: Api<Nfs> = Api::all(client.clone());

    // Verify CRD is installed
    if let Err(e) = api.list(&ListParams::default().limit(1)).await {
        error!("Nfs CRD not installed: {}", e);
        return;
    }

    info!("Starting Nfs controller");

    Controller::new(api, WatcherConfig::default())
        .owns(Api::<PersistentVolumeClaim>::all(client.clone()), WatcherConfig::default())
        .owns(Api::<ServiceAccount>::all(client.clone()), WatcherConfig::default())
        .owns(Api::<Service>::all(client.clone()), WatcherConfig::default())
        .owns(Api::<Deployment>::all(client.clone()), WatcherConfig::default())
        .owns(Api::<Role>::all(client.clone()), WatcherConfig::default())
        .owns(Api::<RoleBinding>::all(client.clone()), WatcherConfig::default())
        .watches(
            Api::<StorageClass>::all(client),
            WatcherConfig::default(),
            |storage_class| provisioner::owning_nfs(&storage_class),
        )
        .shutdown_on_signal()
        .run(reconcile, error_policy, context)
        .for_each(|result| async move {
            match result {
                Ok((obj, _action)) => {
                    info!(
                        name = %obj.name,
                        namespace = obj.namespace.as_deref().unwrap_or("default"),
                        "Reconciled Nfs"
                    );
                }
                Err(e) => {
                    error!(error = %e, "Reconciliation error");
                    metrics::RECONCILIATION_ERRORS.with_label_values(&["Nfs"]).inc();
                }
            }
        })
        .await;
}

/// Main reconciliation function
///
/// The watched object may be stale; the reconciler fetches the current
/// instance itself.
#[instrument(skip(obj, ctx), fields(name = %obj.name_any(), namespace = obj.namespace()))]
async fn reconcile(obj: Arc<Nfs>, ctx: Arc<Context>) -> Result<Action> {
    let _timer = metrics::RECONCILE_DURATION
        .with_label_values(&["Nfs"])
        .start_timer();
    metrics::RECONCILIATIONS.with_label_values(&["Nfs"]).inc();

    let name = obj.name_any();
    let namespace = obj.namespace().unwrap_or_else(|| "default".to_string());

    info!("Reconciling Nfs");
    nfs_reconciler::reconcile(ctx.cluster.clone(), &namespace, &name).await
}

/// Error policy for the controller
fn error_policy(obj: Arc<Nfs>, error: &Error, _ctx: Arc<Context>) -> Action {
    error!(
        name = %obj.name_any(),
        error = %error,
        "Reconciliation failed, scheduling retry"
    );

    Action::requeue(requeue_after(error))
}

/// Delay before retrying a failed pass
fn requeue_after(error: &Error) -> Duration {
    match error {
        Error::Validation(_) => Duration::from_secs(300),
        _ => Duration::from_secs(30),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::{Client, Config};

    #[test]
    fn test_validation_errors_back_off_longer() {
        assert_eq!(requeue_after(&Error::validation("bad size")), Duration::from_secs(300));
        assert_eq!(
            requeue_after(&Error::MissingOwner("Service default/nfs".to_string())),
            Duration::from_secs(30)
        );
    }

    #[tokio::test]
    async fn test_run_stops_when_crd_check_fails() {
        // Nothing listens on port 1, so the CRD check through the context client fails
        let config = Config::new("http://127.0.0.1:1".parse().unwrap());
        let context = Arc::new(Context::new(Client::try_from(config).unwrap()));

        let finished = tokio::time::timeout(Duration::from_secs(10), run(context)).await;
        assert!(finished.is_ok());
    }
}

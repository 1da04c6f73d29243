//! Kubernetes controllers for NFS Operator CRDs
//!
//! This module contains the controller implementations that watch for CRD changes
//! and trigger reconciliation.

mod nfs_controller;

pub use nfs_controller::run as run_nfs_controller;

use std::sync::Arc;

use kube::Client;

use crate::resources::{ClusterClient, KubeClusterClient};

/// Shared context for all controllers
pub struct Context {
    /// Kubernetes client
    pub client: Client,
    /// Get/create access used by the managed resources
    pub cluster: Arc<dyn ClusterClient>,
}

impl Context {
    /// Create a new context
    pub fn new(client: Client) -> Self {
        Self {
            cluster: Arc::new(KubeClusterClient::new(client.clone())),
            client,
        }
    }
}

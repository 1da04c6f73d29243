//! NFS Kubernetes Operator
//!
//! This operator reconciles `Nfs` custom resources into an NFS provisioner
//! Deployment, its RBAC, Service and StorageClass, plus the block storage
//! claim it exports.

pub mod controllers;
pub mod crd;
pub mod error;
pub mod metrics;
pub mod reconcilers;
pub mod resources;

pub use error::{Error, Result};

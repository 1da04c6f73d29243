//! Reconcilers for NFS Operator CRDs
//!
//! This module contains the business logic for reconciling each CRD type.
//! Reconcilers are responsible for:
//! - Fetching and validating the custom resource
//! - Converging the cluster objects it owns

pub mod nfs;

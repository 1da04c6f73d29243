//! Prometheus metrics for the NFS Operator
//!
//! This module exposes metrics for monitoring operator health and performance.

mod exporter;

pub use exporter::*;

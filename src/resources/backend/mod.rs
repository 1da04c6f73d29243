//! Backing storage exported by the NFS server
//!
//! Only IBM Cloud VPC block storage is supported: a single
//! PersistentVolumeClaim sized and classed from the Nfs `backingStorage`.

pub mod vpc_block;

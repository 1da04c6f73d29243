//! CRD YAML Generator
//!
//! This binary generates the Kubernetes CRD manifest for the Nfs custom
//! resource managed by the nfs-operator.
//!
//! Usage: cargo run --bin crdgen > deploy/crds/nfs.yaml

use nfs_operator::crd::generate_crds;

fn main() -> anyhow::Result<()> {
    for crd in generate_crds()? {
        println!("---");
        print!("{}", crd);
    }
    Ok(())
}

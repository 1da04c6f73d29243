//! Deployment running the NFS provisioner
//!
//! A single replica exports the backing claim mounted at `/export`. The
//! Recreate strategy guarantees the old pod releases the ReadWriteOnce claim
//! before a new one starts.

use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec, DeploymentStrategy};
use k8s_openapi::api::core::v1::{
    Capabilities, Container, ContainerPort, EnvVar, EnvVarSource, ObjectFieldSelector,
    PersistentVolumeClaimVolumeSource, PodSpec, PodTemplateSpec, SecurityContext, Volume,
    VolumeMount,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};

use super::{app_labels, namespace, APP_NAME, IMAGE_NAME, NFS_PORTS};
use crate::crd::Nfs;

const EXPORT_VOLUME: &str = "export-volume";
const EXPORT_PATH: &str = "/export";

pub fn deployment(owner: &Nfs) -> Deployment {
    Deployment {
        metadata: ObjectMeta {
            name: Some(APP_NAME.to_string()),
            namespace: Some(namespace(owner)),
            ..Default::default()
        },
        spec: Some(DeploymentSpec {
            selector: LabelSelector {
                match_labels: Some(app_labels()),
                ..Default::default()
            },
            replicas: Some(1),
            strategy: Some(DeploymentStrategy {
                type_: Some("Recreate".to_string()),
                ..Default::default()
            }),
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(app_labels()),
                    ..Default::default()
                }),
                spec: Some(PodSpec {
                    service_account_name: Some(APP_NAME.to_string()),
                    containers: vec![container(owner)],
                    volumes: Some(vec![Volume {
                        name: EXPORT_VOLUME.to_string(),
                        persistent_volume_claim: Some(PersistentVolumeClaimVolumeSource {
                            claim_name: owner.spec.backing_storage.pvc_name.clone(),
                            ..Default::default()
                        }),
                        ..Default::default()
                    }]),
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn container(owner: &Nfs) -> Container {
    let ports = NFS_PORTS
        .iter()
        .flat_map(|&(name, port)| {
            [
                ContainerPort {
                    name: Some(name.to_string()),
                    container_port: port,
                    ..Default::default()
                },
                ContainerPort {
                    name: Some(format!("{}-udp", name)),
                    container_port: port,
                    protocol: Some("UDP".to_string()),
                    ..Default::default()
                },
            ]
        })
        .collect();

    Container {
        name: APP_NAME.to_string(),
        image: Some(IMAGE_NAME.to_string()),
        image_pull_policy: Some("IfNotPresent".to_string()),
        ports: Some(ports),
        security_context: Some(SecurityContext {
            capabilities: Some(Capabilities {
                add: Some(vec!["DAC_READ_SEARCH".to_string(), "SYS_RESOURCE".to_string()]),
                ..Default::default()
            }),
            ..Default::default()
        }),
        args: Some(vec![format!("-provisioner={}", owner.spec.provisioner_api)]),
        env: Some(vec![
            field_env("POD_IP", "status.podIP"),
            EnvVar {
                name: "SERVICE_NAME".to_string(),
                value: Some(APP_NAME.to_string()),
                ..Default::default()
            },
            field_env("POD_NAMESPACE", "metadata.namespace"),
        ]),
        volume_mounts: Some(vec![VolumeMount {
            name: EXPORT_VOLUME.to_string(),
            mount_path: EXPORT_PATH.to_string(),
            ..Default::default()
        }]),
        ..Default::default()
    }
}

fn field_env(name: &str, field_path: &str) -> EnvVar {
    EnvVar {
        name: name.to_string(),
        value_from: Some(EnvVarSource {
            field_ref: Some(ObjectFieldSelector {
                field_path: field_path.to_string(),
                ..Default::default()
            }),
            ..Default::default()
        }),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::NfsSpec;

    fn owner() -> Nfs {
        let mut spec = NfsSpec::default();
        spec.provisioner_api = "ibmcloud/nfs".to_string();
        spec.backing_storage.pvc_name = "export-claim".to_string();
        let mut nfs = Nfs::new("cluster-nfs", spec);
        nfs.metadata.namespace = Some("storage".to_string());
        nfs
    }

    #[test]
    fn test_deployment_single_replica_recreate() {
        let deployment = deployment(&owner());
        let spec = deployment.spec.unwrap();

        assert_eq!(spec.replicas, Some(1));
        assert_eq!(spec.strategy.unwrap().type_.as_deref(), Some("Recreate"));
        assert_eq!(spec.selector.match_labels.unwrap()["app"], APP_NAME);
    }

    #[test]
    fn test_deployment_mounts_backing_claim() {
        let pod = deployment(&owner()).spec.unwrap().template.spec.unwrap();

        let volume = &pod.volumes.unwrap()[0];
        assert_eq!(
            volume.persistent_volume_claim.as_ref().unwrap().claim_name,
            "export-claim"
        );

        let container = &pod.containers[0];
        let mount = &container.volume_mounts.as_ref().unwrap()[0];
        assert_eq!(mount.name, volume.name);
        assert_eq!(mount.mount_path, "/export");
        assert_eq!(pod.service_account_name.as_deref(), Some(APP_NAME));
    }

    #[test]
    fn test_container_provisioner_and_capabilities() {
        let container = container(&owner());

        assert_eq!(
            container.args.as_deref(),
            Some(&["-provisioner=ibmcloud/nfs".to_string()][..])
        );
        let caps = container
            .security_context
            .unwrap()
            .capabilities
            .unwrap()
            .add
            .unwrap();
        assert_eq!(caps, vec!["DAC_READ_SEARCH", "SYS_RESOURCE"]);
        assert_eq!(container.ports.unwrap().len(), 12);
    }
}

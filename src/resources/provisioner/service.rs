//! Service exposing the NFS server ports

use k8s_openapi::api::core::v1::{Service, ServicePort, ServiceSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use super::{app_labels, namespace, APP_NAME, NFS_PORTS};
use crate::crd::Nfs;

pub fn service(owner: &Nfs) -> Service {
    let ports = NFS_PORTS
        .iter()
        .flat_map(|&(name, port)| {
            [
                ServicePort {
                    name: Some(name.to_string()),
                    port,
                    ..Default::default()
                },
                ServicePort {
                    name: Some(format!("{}-udp", name)),
                    port,
                    protocol: Some("UDP".to_string()),
                    ..Default::default()
                },
            ]
        })
        .collect();

    Service {
        metadata: ObjectMeta {
            name: Some(APP_NAME.to_string()),
            namespace: Some(namespace(owner)),
            labels: Some(app_labels()),
            ..Default::default()
        },
        spec: Some(ServiceSpec {
            ports: Some(ports),
            selector: Some(app_labels()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_exposes_tcp_and_udp_ports() {
        let mut owner = Nfs::new("cluster-nfs", Default::default());
        owner.metadata.namespace = Some("storage".to_string());

        let service = service(&owner);
        assert_eq!(service.metadata.namespace.as_deref(), Some("storage"));

        let spec = service.spec.unwrap();
        let ports = spec.ports.unwrap();
        assert_eq!(ports.len(), 12);

        let udp: Vec<_> = ports
            .iter()
            .filter(|p| p.protocol.as_deref() == Some("UDP"))
            .collect();
        assert_eq!(udp.len(), 6);
        assert!(udp.iter().all(|p| p.name.as_deref().unwrap().ends_with("-udp")));

        let nfs = ports.iter().find(|p| p.name.as_deref() == Some("nfs")).unwrap();
        assert_eq!(nfs.port, 2049);
        assert_eq!(spec.selector.unwrap()["app"], "nfs-provisioner");
    }
}

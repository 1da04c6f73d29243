//! RBAC objects letting the provisioner hold its leader lock
//!
//! The provisioner elects a leader through an Endpoints object in its own
//! namespace, so a namespaced Role is sufficient.

use k8s_openapi::api::rbac::v1::{PolicyRule, Role, RoleBinding, RoleRef, Subject};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use super::{namespace, APP_NAME, LEADER_LOCKING_NAME};
use crate::crd::Nfs;

pub fn role(owner: &Nfs) -> Role {
    Role {
        metadata: ObjectMeta {
            name: Some(LEADER_LOCKING_NAME.to_string()),
            namespace: Some(namespace(owner)),
            ..Default::default()
        },
        rules: Some(vec![PolicyRule {
            api_groups: Some(vec![String::new()]),
            resources: Some(vec!["endpoints".to_string()]),
            verbs: ["get", "list", "watch", "create", "update", "patch"]
                .iter()
                .map(|v| v.to_string())
                .collect(),
            ..Default::default()
        }]),
    }
}

pub fn role_binding(owner: &Nfs) -> RoleBinding {
    let namespace = namespace(owner);

    RoleBinding {
        metadata: ObjectMeta {
            name: Some(LEADER_LOCKING_NAME.to_string()),
            namespace: Some(namespace.clone()),
            ..Default::default()
        },
        subjects: Some(vec![Subject {
            kind: "ServiceAccount".to_string(),
            name: APP_NAME.to_string(),
            namespace: Some(namespace),
            ..Default::default()
        }]),
        role_ref: RoleRef {
            kind: "Role".to_string(),
            name: LEADER_LOCKING_NAME.to_string(),
            api_group: "rbac.authorization.k8s.io".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_binding_targets_role_and_service_account() {
        let mut owner = Nfs::new("cluster-nfs", Default::default());
        owner.metadata.namespace = Some("storage".to_string());

        let role = role(&owner);
        let binding = role_binding(&owner);

        assert_eq!(binding.role_ref.name, role.metadata.name.unwrap());
        let subject = &binding.subjects.unwrap()[0];
        assert_eq!(subject.name, APP_NAME);
        assert_eq!(subject.namespace.as_deref(), Some("storage"));
    }
}

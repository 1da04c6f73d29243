//! ServiceAccount the provisioner pod runs as

use k8s_openapi::api::core::v1::ServiceAccount;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use super::{namespace, APP_NAME};
use crate::crd::Nfs;

pub fn service_account(owner: &Nfs) -> ServiceAccount {
    ServiceAccount {
        metadata: ObjectMeta {
            name: Some(APP_NAME.to_string()),
            namespace: Some(namespace(owner)),
            ..Default::default()
        },
        ..Default::default()
    }
}

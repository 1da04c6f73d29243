//! In-memory cluster used by the integration tests
//!
//! Stores objects by identity, records every call, and can be told to fail
//! gets or creates for a given kind.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::{ApiResource, DynamicObject};
use kube::core::ErrorResponse;
use kube::Resource;
use serde::Serialize;

use nfs_operator::crd::{Nfs, NfsSpec};
use nfs_operator::resources::{to_dynamic, ClusterClient, ObjectKey};

pub const NAMESPACE: &str = "storage";
pub const NFS_NAME: &str = "cluster-nfs";
pub const NFS_UID: &str = "0d6b8a52-3c1e-4f7a-9d2b-5e8f1a7c4b90";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Get { kind: String, name: String },
    Create { kind: String, name: String },
}

#[derive(Default)]
pub struct FakeCluster {
    objects: Mutex<BTreeMap<String, DynamicObject>>,
    calls: Mutex<Vec<Call>>,
    get_failures: Mutex<HashMap<String, (u16, String)>>,
    create_failures: Mutex<HashMap<String, (u16, String)>>,
}

impl FakeCluster {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Store a typed object as if it had been created earlier
    pub fn seed<K>(&self, object: &K)
    where
        K: Resource<DynamicType = ()> + Serialize,
    {
        let key = ObjectKey::new(
            ApiResource::erase::<K>(&()),
            object.meta().namespace.clone(),
            object.meta().name.clone().unwrap_or_default(),
        );
        let object = to_dynamic(object).expect("object serializes");
        self.objects.lock().unwrap().insert(storage_key(&key), object);
    }

    pub fn fail_get(&self, kind: &str, code: u16, reason: &str) {
        self.get_failures
            .lock()
            .unwrap()
            .insert(kind.to_string(), (code, reason.to_string()));
    }

    pub fn fail_create(&self, kind: &str, code: u16, reason: &str) {
        self.create_failures
            .lock()
            .unwrap()
            .insert(kind.to_string(), (code, reason.to_string()));
    }

    pub fn clear_failures(&self) {
        self.get_failures.lock().unwrap().clear();
        self.create_failures.lock().unwrap().clear();
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Kinds and names of the create calls, in call order
    pub fn creates(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Create { kind, name } => Some((kind, name)),
                Call::Get { .. } => None,
            })
            .collect()
    }

    pub fn gets(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Get { kind, name } => Some((kind, name)),
                Call::Create { .. } => None,
            })
            .collect()
    }

    /// Stored objects of a kind
    pub fn objects_of(&self, kind: &str) -> Vec<DynamicObject> {
        self.objects
            .lock()
            .unwrap()
            .values()
            .filter(|o| o.types.as_ref().is_some_and(|t| t.kind == kind))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }
}

#[async_trait]
impl ClusterClient for FakeCluster {
    async fn get(&self, key: &ObjectKey) -> Result<DynamicObject, kube::Error> {
        let kind = key.api_resource.kind.clone();
        self.calls.lock().unwrap().push(Call::Get {
            kind: kind.clone(),
            name: key.name.clone(),
        });

        if let Some((code, reason)) = self.get_failures.lock().unwrap().get(&kind) {
            return Err(api_error(*code, reason));
        }

        self.objects
            .lock()
            .unwrap()
            .get(&storage_key(key))
            .cloned()
            .ok_or_else(|| api_error(404, "NotFound"))
    }

    async fn create(
        &self,
        key: &ObjectKey,
        object: &DynamicObject,
    ) -> Result<DynamicObject, kube::Error> {
        let kind = key.api_resource.kind.clone();
        self.calls.lock().unwrap().push(Call::Create {
            kind: kind.clone(),
            name: key.name.clone(),
        });

        if let Some((code, reason)) = self.create_failures.lock().unwrap().get(&kind) {
            return Err(api_error(*code, reason));
        }

        let mut objects = self.objects.lock().unwrap();
        let storage_key = storage_key(key);
        if objects.contains_key(&storage_key) {
            return Err(api_error(409, "AlreadyExists"));
        }
        objects.insert(storage_key, object.clone());
        Ok(object.clone())
    }
}

fn storage_key(key: &ObjectKey) -> String {
    format!("{} {}", key.api_resource.api_version, key)
}

pub fn api_error(code: u16, reason: &str) -> kube::Error {
    kube::Error::Api(ErrorResponse {
        status: "Failure".to_string(),
        message: format!("simulated {}", reason),
        reason: reason.to_string(),
        code,
    })
}

pub fn nfs_with(spec: NfsSpec) -> Nfs {
    Nfs {
        metadata: ObjectMeta {
            name: Some(NFS_NAME.to_string()),
            namespace: Some(NAMESPACE.to_string()),
            uid: Some(NFS_UID.to_string()),
            ..Default::default()
        },
        spec,
        status: None,
    }
}

pub fn nfs() -> Nfs {
    nfs_with(NfsSpec::default())
}

pub fn kinds(calls: &[(String, String)]) -> Vec<&str> {
    calls.iter().map(|(kind, _)| kind.as_str()).collect()
}

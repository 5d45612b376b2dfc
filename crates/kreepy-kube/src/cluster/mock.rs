//! Mock cluster for testing
//!
//! Keeps CRDs, custom instances and policies in memory, useful for unit and
//! integration tests without requiring a Kubernetes cluster. Failures can be
//! injected per operation and key to exercise the transient-error paths.

use async_trait::async_trait;
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::{
    CustomResourceDefinition, CustomResourceDefinitionNames, CustomResourceDefinitionSpec,
    CustomResourceDefinitionVersion,
};
use kube::{ResourceExt, api::ObjectMeta, error::ErrorResponse};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use super::{ClusterApi, Instance};
use crate::definition::InstanceCoordinates;
use crate::error::{KubeError, Result};
use crate::policy::{CrdCleanupPolicy, CrdCleanupPolicyStatus};

/// Operations that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOp {
    /// Keyed by CRD name
    GetCrd,
    /// Keyed by CRD name
    DeleteCrd,
    /// Keyed by CRD name
    ReplaceCrd,
    /// Keyed by `plural.group`
    ListInstances,
    /// Keyed by `namespace/name`
    GetPolicy,
    /// Keyed by `namespace/name`
    PatchStatus,
}

/// Counts of operations performed for testing assertions
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OperationCounts {
    pub crd_gets: usize,
    pub crd_deletes: usize,
    pub crd_replaces: usize,
    pub instance_lists: usize,
    pub policy_gets: usize,
    pub status_patches: usize,
}

#[derive(Debug, Clone)]
struct StoredInstance {
    group: String,
    plural: String,
    api_version: String,
}

/// In-memory cluster for testing
#[derive(Clone, Default)]
pub struct MockCluster {
    crds: Arc<RwLock<BTreeMap<String, CustomResourceDefinition>>>,
    instances: Arc<RwLock<Vec<StoredInstance>>>,
    policies: Arc<RwLock<BTreeMap<String, CrdCleanupPolicy>>>,
    failures: Arc<RwLock<HashMap<(MockOp, String), u16>>>,
    operations: Arc<RwLock<OperationCounts>>,
    resource_version: Arc<AtomicU64>,
}

impl MockCluster {
    /// Create a new empty mock cluster
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with pre-installed CRDs
    pub fn with_crds(crds: impl IntoIterator<Item = CustomResourceDefinition>) -> Self {
        let cluster = Self::new();
        for crd in crds {
            cluster.add_crd(crd);
        }
        cluster
    }

    fn next_resource_version(&self) -> String {
        (self.resource_version.fetch_add(1, Ordering::SeqCst) + 1).to_string()
    }

    /// Install or overwrite a CRD, assigning a fresh resourceVersion
    pub fn add_crd(&self, mut crd: CustomResourceDefinition) {
        crd.metadata.resource_version = Some(self.next_resource_version());
        self.crds.write().unwrap().insert(crd.name_any(), crd);
    }

    /// Mutate a stored CRD as an unrelated writer would
    pub fn edit_crd(&self, name: &str, edit: impl FnOnce(&mut CustomResourceDefinition)) {
        let rv = self.next_resource_version();
        if let Some(crd) = self.crds.write().unwrap().get_mut(name) {
            edit(crd);
            crd.metadata.resource_version = Some(rv);
        }
    }

    /// Get a stored CRD
    pub fn crd(&self, name: &str) -> Option<CustomResourceDefinition> {
        self.crds.read().unwrap().get(name).cloned()
    }

    /// Declared version names of a stored CRD
    pub fn crd_versions(&self, name: &str) -> Option<Vec<String>> {
        self.crd(name)
            .map(|crd| crd.spec.versions.iter().map(|v| v.name.clone()).collect())
    }

    /// Create `count` instances of the CRD named `crd_name` stored at `version`
    pub fn add_instances(&self, crd_name: &str, version: &str, count: usize) {
        let (plural, group) = split_crd_name(crd_name);
        let mut instances = self.instances.write().unwrap();
        for _ in 0..count {
            instances.push(StoredInstance {
                group: group.clone(),
                plural: plural.clone(),
                api_version: format!("{}/{}", group, version),
            });
        }
    }

    /// Remove every instance of the CRD named `crd_name`
    pub fn remove_instances(&self, crd_name: &str) {
        let (plural, group) = split_crd_name(crd_name);
        self.instances
            .write()
            .unwrap()
            .retain(|i| !(i.group == group && i.plural == plural));
    }

    /// Number of stored instances of the CRD named `crd_name`
    pub fn instance_count(&self, crd_name: &str) -> usize {
        let (plural, group) = split_crd_name(crd_name);
        self.instances
            .read()
            .unwrap()
            .iter()
            .filter(|i| i.group == group && i.plural == plural)
            .count()
    }

    /// Store a policy, assigning a fresh resourceVersion; it must carry a namespace
    pub fn add_policy(&self, mut policy: CrdCleanupPolicy) {
        policy.metadata.resource_version = Some(self.next_resource_version());
        let key = policy_key(
            policy.namespace().as_deref().unwrap_or_default(),
            &policy.name_any(),
        );
        self.policies.write().unwrap().insert(key, policy);
    }

    /// Mutate a stored policy as a concurrent writer would
    pub fn edit_policy(&self, namespace: &str, name: &str, edit: impl FnOnce(&mut CrdCleanupPolicy)) {
        let rv = self.next_resource_version();
        if let Some(policy) = self
            .policies
            .write()
            .unwrap()
            .get_mut(&policy_key(namespace, name))
        {
            edit(policy);
            policy.metadata.resource_version = Some(rv);
        }
    }

    /// Get a stored policy
    pub fn policy(&self, namespace: &str, name: &str) -> Option<CrdCleanupPolicy> {
        self.policies
            .read()
            .unwrap()
            .get(&policy_key(namespace, name))
            .cloned()
    }

    /// Make every `op` on `key` fail with the given HTTP status code
    pub fn fail_on(&self, op: MockOp, key: impl Into<String>, code: u16) {
        self.failures.write().unwrap().insert((op, key.into()), code);
    }

    /// Remove all injected failures
    pub fn clear_failures(&self) {
        self.failures.write().unwrap().clear();
    }

    /// Get operation counts for assertions
    pub fn operation_counts(&self) -> OperationCounts {
        self.operations.read().unwrap().clone()
    }

    /// Reset operation counts
    pub fn reset_counts(&self) {
        *self.operations.write().unwrap() = OperationCounts::default();
    }

    fn record(&self, op: MockOp, key: &str) -> Result<()> {
        {
            let mut ops = self.operations.write().unwrap();
            match op {
                MockOp::GetCrd => ops.crd_gets += 1,
                MockOp::DeleteCrd => ops.crd_deletes += 1,
                MockOp::ReplaceCrd => ops.crd_replaces += 1,
                MockOp::ListInstances => ops.instance_lists += 1,
                MockOp::GetPolicy => ops.policy_gets += 1,
                MockOp::PatchStatus => ops.status_patches += 1,
            }
        }

        match self.failures.read().unwrap().get(&(op, key.to_string())) {
            Some(&code) => Err(api_error(
                code,
                "Injected",
                format!("injected failure for {:?} on {}", op, key),
            )),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ClusterApi for MockCluster {
    async fn get_crd(&self, name: &str) -> Result<Option<CustomResourceDefinition>> {
        self.record(MockOp::GetCrd, name)?;
        Ok(self.crd(name))
    }

    async fn delete_crd(&self, name: &str) -> Result<()> {
        self.record(MockOp::DeleteCrd, name)?;

        let removed = self.crds.write().unwrap().remove(name);
        match removed {
            Some(_) => {
                self.remove_instances(name);
                Ok(())
            }
            None => Err(not_found("customresourcedefinitions", name)),
        }
    }

    async fn replace_crd(&self, crd: &CustomResourceDefinition) -> Result<()> {
        let name = crd.name_any();
        self.record(MockOp::ReplaceCrd, &name)?;

        let rv = self.next_resource_version();
        let mut crds = self.crds.write().unwrap();
        let Some(current) = crds.get(&name) else {
            return Err(not_found("customresourcedefinitions", &name));
        };

        if current.metadata.resource_version != crd.metadata.resource_version {
            return Err(api_error(
                409,
                "Conflict",
                format!(
                    "Operation cannot be fulfilled on customresourcedefinitions \"{}\": the object has been modified",
                    name
                ),
            ));
        }

        let mut updated = crd.clone();
        updated.metadata.resource_version = Some(rv);
        crds.insert(name, updated);
        Ok(())
    }

    async fn list_instances(&self, coords: &InstanceCoordinates) -> Result<Vec<Instance>> {
        self.record(
            MockOp::ListInstances,
            &format!("{}.{}", coords.plural, coords.group),
        )?;

        // Mirror the API server: an unserved version has no list endpoint
        let crd_name = format!("{}.{}", coords.plural, coords.group);
        if let Some(crd) = self.crd(&crd_name) {
            let served = crd
                .spec
                .versions
                .iter()
                .any(|v| v.name == coords.version && v.served);
            if !served {
                return Err(not_found(&coords.plural, &coords.version));
            }
        }

        // Instances report the version they were written at
        Ok(self
            .instances
            .read()
            .unwrap()
            .iter()
            .filter(|i| i.group == coords.group && i.plural == coords.plural)
            .map(|i| Instance::new(&i.api_version))
            .collect())
    }

    async fn get_policy(&self, namespace: &str, name: &str) -> Result<Option<CrdCleanupPolicy>> {
        self.record(MockOp::GetPolicy, &policy_key(namespace, name))?;
        Ok(self.policy(namespace, name))
    }

    async fn patch_policy_status(
        &self,
        namespace: &str,
        name: &str,
        resource_version: Option<&str>,
        status: &CrdCleanupPolicyStatus,
    ) -> Result<()> {
        let key = policy_key(namespace, name);
        self.record(MockOp::PatchStatus, &key)?;

        let rv = self.next_resource_version();
        let mut policies = self.policies.write().unwrap();
        let Some(policy) = policies.get_mut(&key) else {
            return Err(not_found("crdcleanuppolicies", name));
        };

        if resource_version.is_some_and(|v| policy.metadata.resource_version.as_deref() != Some(v)) {
            return Err(api_error(
                409,
                "Conflict",
                format!(
                    "Operation cannot be fulfilled on crdcleanuppolicies \"{}\": the object has been modified",
                    name
                ),
            ));
        }

        policy.status = Some(status.clone());
        policy.metadata.resource_version = Some(rv);
        Ok(())
    }
}

fn policy_key(namespace: &str, name: &str) -> String {
    format!("{}/{}", namespace, name)
}

/// Split `plural.group` the way CRD names are formed
fn split_crd_name(name: &str) -> (String, String) {
    match name.split_once('.') {
        Some((plural, group)) => (plural.to_string(), group.to_string()),
        None => (name.to_string(), String::new()),
    }
}

/// Build an API error with the given status code
pub fn api_error(code: u16, reason: &str, message: impl Into<String>) -> KubeError {
    KubeError::Api(kube::Error::Api(ErrorResponse {
        status: "Failure".to_string(),
        message: message.into(),
        reason: reason.to_string(),
        code,
    }))
}

fn not_found(resource: &str, name: &str) -> KubeError {
    api_error(
        404,
        "NotFound",
        format!("{} \"{}\" not found", resource, name),
    )
}

/// Build a namespaced CRD named `plural.group` declaring `versions` in order
///
/// The first version is marked as the storage version.
pub fn definition(name: &str, kind: &str, versions: &[&str]) -> CustomResourceDefinition {
    let (plural, group) = split_crd_name(name);
    CustomResourceDefinition {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..Default::default()
        },
        spec: CustomResourceDefinitionSpec {
            group,
            names: CustomResourceDefinitionNames {
                kind: kind.to_string(),
                plural,
                singular: Some(kind.to_lowercase()),
                ..Default::default()
            },
            scope: "Namespaced".to_string(),
            versions: versions
                .iter()
                .enumerate()
                .map(|(i, v)| CustomResourceDefinitionVersion {
                    name: v.to_string(),
                    served: true,
                    storage: i == 0,
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        },
        status: None,
    }
}

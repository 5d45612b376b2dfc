//! Cluster access for the cleanup pipeline
//!
//! Everything the controller reads from or writes to the API server goes
//! through the [`ClusterApi`] trait:
//! - **CRDs**: point get, delete, and replace (optimistic update)
//! - **Instances**: list of a custom kind across all namespaces
//! - **Policies**: point get and status patch
//!
//! [`KubeCluster`] talks to a real API server; [`MockCluster`] keeps
//! everything in memory for tests.

mod kube_api;
pub mod mock;

pub use kube_api::KubeCluster;
pub use mock::{MockCluster, MockOp, OperationCounts};

use async_trait::async_trait;
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;

use crate::definition::InstanceCoordinates;
use crate::error::Result;
use crate::policy::{CrdCleanupPolicy, CrdCleanupPolicyStatus};

/// A listed custom resource, observed only through its reported apiVersion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    pub api_version: String,
}

impl Instance {
    pub fn new(api_version: impl Into<String>) -> Self {
        Self {
            api_version: api_version.into(),
        }
    }
}

/// Cluster operations used by the cleanup pipeline
///
/// Implementations must be Send + Sync for use across async tasks.
#[async_trait]
pub trait ClusterApi: Send + Sync {
    /// Get a CRD by name, `None` if it does not exist
    async fn get_crd(&self, name: &str) -> Result<Option<CustomResourceDefinition>>;

    /// Delete a CRD by name
    async fn delete_crd(&self, name: &str) -> Result<()>;

    /// Replace a CRD; rejected with a conflict if its resourceVersion is stale
    async fn replace_crd(&self, crd: &CustomResourceDefinition) -> Result<()>;

    /// List all instances at the given coordinates across all namespaces
    ///
    /// A version that is not served is reported as a 404 error, never as an
    /// empty list.
    async fn list_instances(&self, coords: &InstanceCoordinates) -> Result<Vec<Instance>>;

    /// Get a policy, `None` if it does not exist
    async fn get_policy(&self, namespace: &str, name: &str) -> Result<Option<CrdCleanupPolicy>>;

    /// Write the full status of a policy in one request
    ///
    /// When `resource_version` is set the write is rejected with a conflict
    /// if the stored policy has changed since.
    async fn patch_policy_status(
        &self,
        namespace: &str,
        name: &str,
        resource_version: Option<&str>,
        status: &CrdCleanupPolicyStatus,
    ) -> Result<()>;
}

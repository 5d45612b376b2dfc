//! API server backed cluster access

use async_trait::async_trait;
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::{
    Client, ResourceExt,
    api::{Api, DeleteParams, DynamicObject, ListParams, Patch, PatchParams, PostParams},
};
use serde_json::{Value, json};

use super::{ClusterApi, Instance};
use crate::definition::InstanceCoordinates;
use crate::error::Result;
use crate::policy::{CrdCleanupPolicy, CrdCleanupPolicyStatus};

/// Field manager recorded on status writes
const FIELD_MANAGER: &str = "kreepy";

/// [`ClusterApi`] over a live Kubernetes client
#[derive(Clone)]
pub struct KubeCluster {
    client: Client,
}

impl KubeCluster {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn crds(&self) -> Api<CustomResourceDefinition> {
        Api::all(self.client.clone())
    }

    fn policies(&self, namespace: &str) -> Api<CrdCleanupPolicy> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl ClusterApi for KubeCluster {
    async fn get_crd(&self, name: &str) -> Result<Option<CustomResourceDefinition>> {
        Ok(self.crds().get_opt(name).await?)
    }

    async fn delete_crd(&self, name: &str) -> Result<()> {
        self.crds().delete(name, &DeleteParams::default()).await?;
        Ok(())
    }

    async fn replace_crd(&self, crd: &CustomResourceDefinition) -> Result<()> {
        self.crds()
            .replace(&crd.name_any(), &PostParams::default(), crd)
            .await?;
        Ok(())
    }

    async fn list_instances(&self, coords: &InstanceCoordinates) -> Result<Vec<Instance>> {
        let ar = coords.api_resource();
        let api: Api<DynamicObject> = Api::all_with(self.client.clone(), &ar);

        // An unserved version answers 404, which stays an error
        let list = api.list(&ListParams::default()).await?;
        Ok(list
            .items
            .into_iter()
            .map(|item| {
                let api_version = item
                    .types
                    .map(|t| t.api_version)
                    .unwrap_or_else(|| ar.api_version.clone());
                Instance::new(api_version)
            })
            .collect())
    }

    async fn get_policy(&self, namespace: &str, name: &str) -> Result<Option<CrdCleanupPolicy>> {
        Ok(self.policies(namespace).get_opt(name).await?)
    }

    async fn patch_policy_status(
        &self,
        namespace: &str,
        name: &str,
        resource_version: Option<&str>,
        status: &CrdCleanupPolicyStatus,
    ) -> Result<()> {
        let patch = status_patch(resource_version, status);
        let params = PatchParams {
            field_manager: Some(FIELD_MANAGER.to_string()),
            ..Default::default()
        };
        self.policies(namespace)
            .patch_status(name, &params, &Patch::Merge(&patch))
            .await?;
        Ok(())
    }
}

/// Merge patch body for a status write
///
/// With a resourceVersion the API server rejects the write with a conflict
/// when the policy changed since it was loaded.
fn status_patch(resource_version: Option<&str>, status: &CrdCleanupPolicyStatus) -> Value {
    match resource_version {
        Some(rv) => json!({
            "metadata": { "resourceVersion": rv },
            "status": status,
        }),
        None => json!({ "status": status }),
    }
}

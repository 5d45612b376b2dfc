//! Deleting a CRD or stripping one of its versions

use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::ResourceExt;
use tracing::{debug, info};

use crate::cluster::ClusterApi;
use crate::definition::without_version;
use crate::error::Result;

/// What a successful deletion removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deletion {
    /// The whole CRD was deleted
    Definition,
    /// One version was removed; `kept` lists the versions left behind
    Version { version: String, kept: Vec<String> },
}

/// Delete the CRD, or only `version` of it when given
///
/// Version removal is a read-modify-write against `crd` as fetched earlier
/// in the pass: a concurrent change makes the update fail with a conflict,
/// which is returned as-is and retried on a later pass.
pub async fn delete_target<C>(
    cluster: &C,
    crd: &CustomResourceDefinition,
    version: Option<&str>,
) -> Result<Deletion>
where
    C: ClusterApi + ?Sized,
{
    match version {
        None => delete_definition(cluster, crd).await,
        Some(v) => delete_version(cluster, crd, v).await,
    }
}

async fn delete_definition<C>(cluster: &C, crd: &CustomResourceDefinition) -> Result<Deletion>
where
    C: ClusterApi + ?Sized,
{
    let name = crd.name_any();
    debug!(crd = %name, "deleting entire CRD since no specific version was requested");

    match cluster.delete_crd(&name).await {
        Ok(()) => {}
        // Already gone between lookup and delete
        Err(e) if e.is_not_found() => {
            debug!(crd = %name, "CRD disappeared before delete");
        }
        Err(e) => return Err(e),
    }

    info!(crd = %name, "deleted CRD");
    Ok(Deletion::Definition)
}

async fn delete_version<C>(
    cluster: &C,
    crd: &CustomResourceDefinition,
    version: &str,
) -> Result<Deletion>
where
    C: ClusterApi + ?Sized,
{
    let updated = without_version(crd, version);
    let kept: Vec<String> = updated.spec.versions.iter().map(|v| v.name.clone()).collect();

    cluster.replace_crd(&updated).await?;

    info!(crd = %crd.name_any(), version = %version, kept = ?kept, "removed version from CRD");
    Ok(Deletion::Version {
        version: version.to_string(),
        kept,
    })
}

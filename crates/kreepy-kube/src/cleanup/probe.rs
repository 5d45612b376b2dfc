//! Existence probing of CRDs

use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use tracing::debug;

use crate::cluster::ClusterApi;
use crate::error::Result;

/// Result of looking up a CRD by name
#[derive(Debug, Clone)]
pub enum Probe {
    /// The CRD exists; carries the fetched object for read-modify-write
    Found(Box<CustomResourceDefinition>),
    /// The CRD does not exist
    NotFound,
}

/// Look up a CRD by name
///
/// `Err` is reserved for failures other than absence (network, throttling,
/// authorization) and means the lookup should be retried later.
pub async fn probe_definition<C>(cluster: &C, name: &str) -> Result<Probe>
where
    C: ClusterApi + ?Sized,
{
    debug!(crd = %name, "fetching CRD definition");
    match cluster.get_crd(name).await {
        Ok(Some(crd)) => Ok(Probe::Found(Box::new(crd))),
        Ok(None) => Ok(Probe::NotFound),
        Err(e) if e.is_not_found() => Ok(Probe::NotFound),
        Err(e) => Err(e),
    }
}

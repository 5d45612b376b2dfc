//! Counting live instances of a CRD
//!
//! A CRD (or version) may only be removed once nothing is stored under it.
//! Counting works in three steps:
//!
//! 1. Resolve the version: the requested one if it is declared, otherwise the
//!    first declared version.
//! 2. List every instance of the kind across all namespaces at that version.
//! 3. When a version was requested, count only instances whose `apiVersion`
//!    is `<group>/<version>`; instances of other versions do not block it.

use tracing::debug;

use crate::cluster::{ClusterApi, Instance};
use crate::definition::{DefinitionView, InstanceCoordinates};
use crate::error::Result;

/// Result of counting instances
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceCount {
    /// The requested version is not declared on the CRD
    VersionNotFound,
    /// Number of live instances at the resolved version
    Counted { version: String, count: usize },
}

/// Count the instances that would block deleting `requested` from `definition`
///
/// `requested = None` means the whole CRD and resolves to its first
/// declared version. `Err` means the list call failed and should be retried.
pub async fn count_instances<C>(
    cluster: &C,
    definition: &DefinitionView,
    requested: Option<&str>,
) -> Result<InstanceCount>
where
    C: ClusterApi + ?Sized,
{
    let version = match requested {
        Some(v) if definition.has_version(v) => v,
        Some(v) => {
            debug!(crd = %definition.name, version = %v, "version not declared on CRD");
            return Ok(InstanceCount::VersionNotFound);
        }
        None => match definition.first_version() {
            Some(v) => v,
            None => return Ok(InstanceCount::VersionNotFound),
        },
    };

    let coords = definition.instances_at(version);
    debug!(crd = %definition.name, resource = %coords, "checking for CRD instances");

    let instances = cluster.list_instances(&coords).await?;
    let count = count_matching(&instances, &coords, requested.is_some());

    Ok(InstanceCount::Counted {
        version: version.to_string(),
        count,
    })
}

/// Count listed instances, filtered to `coords`' apiVersion when `exact`
///
/// The filter only separates versions when the list reports each object at
/// the version it was stored at. A real API server converts every listed
/// object to the version being listed, so on a live cluster instances stored
/// under other versions are counted too and block removal of this one.
pub fn count_matching(instances: &[Instance], coords: &InstanceCoordinates, exact: bool) -> usize {
    if !exact {
        return instances.len();
    }
    let api_version = coords.api_version();
    instances
        .iter()
        .filter(|i| i.api_version == api_version)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::mock::{MockCluster, MockOp, definition};

    fn view(versions: &[&str]) -> DefinitionView {
        DefinitionView::from_crd(&definition("widgets.example.com", "Widget", versions))
    }

    #[test]
    fn test_count_matching_exact() {
        let coords = view(&["v1", "v2"]).instances_at("v1");
        let instances = vec![
            Instance::new("example.com/v1"),
            Instance::new("example.com/v2"),
            Instance::new("example.com/v2"),
        ];
        assert_eq!(count_matching(&instances, &coords, true), 1);
        assert_eq!(count_matching(&instances, &coords, false), 3);
    }

    #[test]
    fn test_count_matching_does_not_match_bare_version() {
        let coords = view(&["v1"]).instances_at("v1");
        let instances = vec![Instance::new("v1")];
        assert_eq!(count_matching(&instances, &coords, true), 0);
    }

    #[tokio::test]
    async fn test_whole_crd_counts_all_instances() {
        let cluster = MockCluster::new();
        cluster.add_instances("widgets.example.com", "v1", 2);
        cluster.add_instances("widgets.example.com", "v2", 1);

        let count = count_instances(&cluster, &view(&["v1", "v2"]), None).await.unwrap();
        assert_eq!(
            count,
            InstanceCount::Counted { version: "v1".into(), count: 3 }
        );
    }

    #[tokio::test]
    async fn test_unrequested_version_resolves_to_first_declared() {
        let cluster = MockCluster::new();
        let count = count_instances(&cluster, &view(&["v2", "v1"]), None).await.unwrap();
        assert_eq!(
            count,
            InstanceCount::Counted { version: "v2".into(), count: 0 }
        );
    }

    #[tokio::test]
    async fn test_requested_version_ignores_other_versions() {
        let cluster = MockCluster::new();
        cluster.add_instances("widgets.example.com", "v2", 4);

        let count = count_instances(&cluster, &view(&["v1", "v2"]), Some("v1"))
            .await
            .unwrap();
        assert_eq!(
            count,
            InstanceCount::Counted { version: "v1".into(), count: 0 }
        );

        let count = count_instances(&cluster, &view(&["v1", "v2"]), Some("v2"))
            .await
            .unwrap();
        assert_eq!(
            count,
            InstanceCount::Counted { version: "v2".into(), count: 4 }
        );
    }

    #[tokio::test]
    async fn test_undeclared_version_short_circuits() {
        let cluster = MockCluster::new();
        let count = count_instances(&cluster, &view(&["v1"]), Some("v9")).await.unwrap();

        assert_eq!(count, InstanceCount::VersionNotFound);
        assert_eq!(cluster.operation_counts().instance_lists, 0);
    }

    #[tokio::test]
    async fn test_no_declared_versions() {
        let cluster = MockCluster::new();
        let count = count_instances(&cluster, &view(&[]), None).await.unwrap();
        assert_eq!(count, InstanceCount::VersionNotFound);
    }

    #[tokio::test]
    async fn test_unserved_version_list_is_an_error() {
        let cluster = MockCluster::with_crds([definition("widgets.example.com", "Widget", &["v1", "v2"])]);
        cluster.edit_crd("widgets.example.com", |crd| crd.spec.versions[0].served = false);
        cluster.add_instances("widgets.example.com", "v2", 1);
        let crd = cluster.crd("widgets.example.com").unwrap();

        let err = count_instances(&cluster, &DefinitionView::from_crd(&crd), None)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_list_failure_is_an_error() {
        let cluster = MockCluster::new();
        cluster.fail_on(MockOp::ListInstances, "widgets.example.com", 500);
        assert!(count_instances(&cluster, &view(&["v1"]), None).await.is_err());
    }
}

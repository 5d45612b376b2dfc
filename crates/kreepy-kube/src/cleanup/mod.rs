//! The per-target cleanup pipeline
//!
//! Every pending target goes through the same steps:
//!
//! ```text
//! identity ──► Target::parse ──► probe ──► count ──► delete
//!                                  │          │          │
//!                               NotFound   VersionNotFound / Blocked / error
//!                                  ▼          ▼          ▼
//!                              NonExistent  NonExistent / Remaining / Remaining
//! ```
//!
//! - **Probe** (`probe`): does the CRD exist at all?
//! - **Count** (`count`): how many live instances would be lost?
//! - **Delete** (`delete`): remove the CRD or one version of it
//! - **Status** (`status`): fold the outcomes of a pass into a new status
//!
//! Failures of individual API calls are captured as [`TargetOutcome::Transient`]
//! so one bad target never stops the rest of the pass.

mod count;
mod delete;
mod probe;
mod status;

pub use count::{InstanceCount, count_instances, count_matching};
pub use delete::{Deletion, delete_target};
pub use probe::{Probe, probe_definition};
pub use status::{fold_status, summary_message};

use std::fmt;

use tracing::{info, warn};

use crate::cluster::ClusterApi;
use crate::definition::DefinitionView;
use crate::target::Target;

/// Which status list a target lands in after a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Processed,
    Remaining,
    NonExistent,
}

/// Pipeline step that hit a transient failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Lookup,
    Count,
    Delete,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lookup => write!(f, "lookup"),
            Self::Count => write!(f, "count"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Classified result of processing one target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetOutcome {
    /// The CRD or version was deleted
    Deleted,
    /// Live instances exist; an operator must remove them first
    Blocked { instances: usize },
    /// An API call failed; retried on the next pass
    Transient { stage: Stage, error: String },
    /// The CRD does not exist
    CrdNotFound,
    /// The CRD exists but does not declare the requested version
    VersionNotFound { version: String },
}

impl TargetOutcome {
    /// Status list this outcome belongs to
    pub fn bucket(&self) -> Bucket {
        match self {
            Self::Deleted => Bucket::Processed,
            Self::Blocked { .. } | Self::Transient { .. } => Bucket::Remaining,
            Self::CrdNotFound | Self::VersionNotFound { .. } => Bucket::NonExistent,
        }
    }
}

/// Outcome of one target, keyed by the identity stored in status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetResult {
    pub identity: String,
    pub outcome: TargetOutcome,
}

/// Run the full pipeline for one target identity
///
/// Never fails: every error is folded into the returned outcome.
pub async fn process_target<C>(cluster: &C, identity: &str) -> TargetOutcome
where
    C: ClusterApi + ?Sized,
{
    let target = Target::parse(identity);

    let crd = match probe_definition(cluster, &target.name).await {
        Ok(Probe::Found(crd)) => crd,
        Ok(Probe::NotFound) => {
            info!(identity = %identity, "CRD does not exist");
            return TargetOutcome::CrdNotFound;
        }
        Err(e) => {
            warn!(identity = %identity, error = %e, "failed to fetch CRD definition");
            return TargetOutcome::Transient {
                stage: Stage::Lookup,
                error: e.to_string(),
            };
        }
    };

    let view = DefinitionView::from_crd(&crd);
    match count_instances(cluster, &view, target.version()).await {
        Ok(InstanceCount::VersionNotFound) => {
            info!(identity = %identity, "version not found in CRD");
            return TargetOutcome::VersionNotFound {
                version: target.version().unwrap_or_default().to_string(),
            };
        }
        Ok(InstanceCount::Counted { count, .. }) if count > 0 => {
            info!(identity = %identity, count, "instances of CRD found, skipping deletion");
            return TargetOutcome::Blocked { instances: count };
        }
        Ok(InstanceCount::Counted { .. }) => {}
        Err(e) => {
            warn!(identity = %identity, error = %e, "failed to list instances of CRD");
            return TargetOutcome::Transient {
                stage: Stage::Count,
                error: e.to_string(),
            };
        }
    }

    match delete_target(cluster, &crd, target.version()).await {
        Ok(_) => TargetOutcome::Deleted,
        Err(e) => {
            warn!(identity = %identity, error = %e, "failed to delete CRD or version");
            TargetOutcome::Transient {
                stage: Stage::Delete,
                error: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::mock::{MockCluster, MockOp, definition};

    #[test]
    fn test_buckets() {
        assert_eq!(TargetOutcome::Deleted.bucket(), Bucket::Processed);
        assert_eq!(
            TargetOutcome::Blocked { instances: 1 }.bucket(),
            Bucket::Remaining
        );
        assert_eq!(
            TargetOutcome::Transient { stage: Stage::Delete, error: String::new() }.bucket(),
            Bucket::Remaining
        );
        assert_eq!(TargetOutcome::CrdNotFound.bucket(), Bucket::NonExistent);
        assert_eq!(
            TargetOutcome::VersionNotFound { version: "v9".into() }.bucket(),
            Bucket::NonExistent
        );
    }

    #[tokio::test]
    async fn test_process_deletes_empty_crd() {
        let cluster = MockCluster::with_crds([definition("foo.example.com", "Foo", &["v1"])]);

        let outcome = process_target(&cluster, "foo.example.com").await;

        assert_eq!(outcome, TargetOutcome::Deleted);
        assert!(cluster.crd("foo.example.com").is_none());
    }

    #[tokio::test]
    async fn test_process_never_deletes_with_instances() {
        let cluster = MockCluster::with_crds([definition("foo.example.com", "Foo", &["v1"])]);
        cluster.add_instances("foo.example.com", "v1", 3);

        let outcome = process_target(&cluster, "foo.example.com").await;

        assert_eq!(outcome, TargetOutcome::Blocked { instances: 3 });
        assert!(cluster.crd("foo.example.com").is_some());
        assert_eq!(cluster.operation_counts().crd_deletes, 0);
    }

    #[tokio::test]
    async fn test_process_missing_version() {
        let cluster = MockCluster::with_crds([definition("foo.example.com", "Foo", &["v1"])]);

        let outcome = process_target(&cluster, "foo.example.com/v9").await;

        assert_eq!(outcome, TargetOutcome::VersionNotFound { version: "v9".into() });
        assert_eq!(cluster.operation_counts().crd_replaces, 0);
    }

    #[tokio::test]
    async fn test_process_transient_stages() {
        let cluster = MockCluster::with_crds([
            definition("a.example.com", "A", &["v1"]),
            definition("b.example.com", "B", &["v1"]),
            definition("c.example.com", "C", &["v1"]),
        ]);
        cluster.fail_on(MockOp::GetCrd, "a.example.com", 500);
        cluster.fail_on(MockOp::ListInstances, "b.example.com", 500);
        cluster.fail_on(MockOp::DeleteCrd, "c.example.com", 500);

        let stage = |o: TargetOutcome| match o {
            TargetOutcome::Transient { stage, .. } => Some(stage),
            _ => None,
        };

        assert_eq!(stage(process_target(&cluster, "a.example.com").await), Some(Stage::Lookup));
        assert_eq!(stage(process_target(&cluster, "b.example.com").await), Some(Stage::Count));
        assert_eq!(stage(process_target(&cluster, "c.example.com").await), Some(Stage::Delete));
    }

    #[tokio::test]
    async fn test_unserved_first_version_keeps_crd() {
        let cluster = MockCluster::with_crds([definition("foos.example.com", "Foo", &["v1", "v2"])]);
        cluster.edit_crd("foos.example.com", |crd| {
            crd.spec.versions[0].served = false;
            crd.spec.versions[0].storage = false;
            crd.spec.versions[1].storage = true;
        });
        cluster.add_instances("foos.example.com", "v2", 1);

        let outcome = process_target(&cluster, "foos.example.com").await;

        assert!(matches!(
            outcome,
            TargetOutcome::Transient { stage: Stage::Count, .. }
        ));
        assert_eq!(outcome.bucket(), Bucket::Remaining);
        assert!(cluster.crd("foos.example.com").is_some());
        assert_eq!(cluster.instance_count("foos.example.com"), 1);
        assert_eq!(cluster.operation_counts().crd_deletes, 0);
    }
}

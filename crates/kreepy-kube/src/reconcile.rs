//! One reconciliation pass over a CRDCleanupPolicy
//!
//! A pass moves through a fixed sequence of states:
//!
//! ```text
//! Loading ──► Initializing ──► Processing(target_i) ──► Aggregating ──► Done | Requeued
//!    │
//!    └── policy gone ──► end (no error)
//! ```
//!
//! Targets are processed strictly one after another. Per-target failures
//! never abort the pass; only loading the policy and writing its status can.
//! The status write is conditional on the resourceVersion the policy was
//! loaded at, so a concurrent pass surfaces as a conflict.

use kube::ResourceExt;
use tracing::{debug, info, instrument};

use crate::cleanup::{TargetResult, fold_status, process_target};
use crate::cluster::ClusterApi;
use crate::error::{KubeError, Result};
use crate::policy::{CrdCleanupPolicy, CrdCleanupPolicyStatus};

/// How a pass ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    /// The policy no longer exists; nothing to do
    PolicyGone,
    /// Every target was processed or found missing
    Done(CrdCleanupPolicyStatus),
    /// Some targets are still pending; run again later
    Requeue(CrdCleanupPolicyStatus),
}

impl PassOutcome {
    /// Status written by this pass, if any
    pub fn status(&self) -> Option<&CrdCleanupPolicyStatus> {
        match self {
            Self::PolicyGone => None,
            Self::Done(status) | Self::Requeue(status) => Some(status),
        }
    }
}

/// Drives cleanup passes against a cluster
pub struct Reconciler<C> {
    cluster: C,
}

impl<C: ClusterApi> Reconciler<C> {
    pub fn new(cluster: C) -> Self {
        Self { cluster }
    }

    /// Get the cluster this reconciler acts on
    pub fn cluster(&self) -> &C {
        &self.cluster
    }

    /// Run one full pass for the policy `namespace/name`
    #[instrument(skip(self))]
    pub async fn reconcile(&self, namespace: &str, name: &str) -> Result<PassOutcome> {
        info!("starting reconciliation for CRDCleanupPolicy");

        let Some(policy) = self.cluster.get_policy(namespace, name).await? else {
            info!("no CRDCleanupPolicy found, may be deleted");
            return Ok(PassOutcome::PolicyGone);
        };
        let (namespace, name) = policy_identity(&policy)?;

        let prior = policy.initialized_status();
        let mut results = Vec::with_capacity(prior.remaining().len());
        for identity in prior.remaining() {
            debug!(identity = %identity, "processing CRD");
            let outcome = process_target(&self.cluster, identity).await;
            results.push(TargetResult {
                identity: identity.clone(),
                outcome,
            });
        }

        let next = fold_status(&prior, &results);
        if policy.status.as_ref() == Some(&next) {
            debug!("status unchanged, skipping write");
        } else {
            self.cluster
                .patch_policy_status(
                    &namespace,
                    &name,
                    policy.metadata.resource_version.as_deref(),
                    &next,
                )
                .await?;
        }

        if next.remaining().is_empty() {
            info!(
                processed = next.processed_crds.len(),
                non_existent = next.non_existent_crds.len(),
                "all CRDs processed"
            );
            Ok(PassOutcome::Done(next))
        } else {
            info!(remaining = next.remaining().len(), "some CRDs are still pending deletion");
            Ok(PassOutcome::Requeue(next))
        }
    }
}

/// Namespace and name of a persisted policy
pub fn policy_identity(policy: &CrdCleanupPolicy) -> Result<(String, String)> {
    let namespace = policy
        .namespace()
        .ok_or(KubeError::PolicyIdentity { field: "namespace" })?;
    let name = policy
        .metadata
        .name
        .clone()
        .ok_or(KubeError::PolicyIdentity { field: "name" })?;
    Ok((namespace, name))
}

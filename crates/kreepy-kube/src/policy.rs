//! The `CRDCleanupPolicy` custom resource
//!
//! A policy names the CRDs (or single CRD versions) that should be removed
//! from the cluster once they no longer have any instances.
//!
//! # Example
//!
//! ```yaml
//! apiVersion: policies.kreepy.kubecrew.de/v1alpha1
//! kind: CRDCleanupPolicy
//! metadata:
//!   name: legacy-crds
//!   namespace: default
//! spec:
//!   crdsversions:
//!     - name: widgets.example.com
//!     - name: gadgets.example.com
//!       version: v1beta1
//! ```

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::target::Target;

/// API group of the policy resource
pub const POLICY_GROUP: &str = "policies.kreepy.kubecrew.de";

/// Summary written when nothing is left to delete
pub const MESSAGE_COMPLETE: &str = "All CRDs have been successfully processed.";

/// Summary written while targets are still pending
pub const MESSAGE_PENDING: &str = "Some CRDs are still pending deletion.";

/// Desired cleanup targets
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[kube(
    group = "policies.kreepy.kubecrew.de",
    version = "v1alpha1",
    kind = "CRDCleanupPolicy",
    plural = "crdcleanuppolicies",
    shortname = "ccp",
    namespaced,
    status = "CrdCleanupPolicyStatus",
    printcolumn = r#"{"name":"Status","type":"string","jsonPath":".status.statusMessage"}"#
)]
pub struct CrdCleanupPolicySpec {
    /// CRDs (and optionally a single apiVersion of each) to delete.
    /// Only the name is required.
    #[serde(rename = "crdsversions", default)]
    pub crds_versions: Vec<CleanupTarget>,
}

/// The policy object, under the name used throughout this crate
pub type CrdCleanupPolicy = CRDCleanupPolicy;

/// One declared cleanup target
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
pub struct CleanupTarget {
    /// Name of the CustomResourceDefinition to delete
    pub name: String,

    /// Version of the CustomResourceDefinition to delete; empty deletes the whole CRD
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl CleanupTarget {
    /// Parsed form of this declaration
    pub fn target(&self) -> Target {
        match &self.version {
            Some(v) => Target::versioned(&self.name, v),
            None => Target::whole(&self.name),
        }
    }
}

/// Observed cleanup progress
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CrdCleanupPolicyStatus {
    /// Human-readable summary of the cleanup process
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,

    /// Targets already deleted
    #[serde(default)]
    pub processed_crds: Vec<String>,

    /// Targets still waiting for deletion; `None` until the first pass
    #[serde(default)]
    pub remaining_crds: Option<Vec<String>>,

    /// Targets whose CRD or version did not exist when processed
    #[serde(default)]
    pub non_existent_crds: Vec<String>,
}

impl CrdCleanupPolicyStatus {
    /// Status for a policy that has never been reconciled
    pub fn initial(targets: Vec<String>) -> Self {
        Self {
            status_message: None,
            processed_crds: Vec::new(),
            remaining_crds: Some(targets),
            non_existent_crds: Vec::new(),
        }
    }

    /// Pending identities (empty before initialization)
    pub fn remaining(&self) -> &[String] {
        self.remaining_crds.as_deref().unwrap_or_default()
    }

    /// Whether the remaining list has been seeded from the spec
    pub fn is_initialized(&self) -> bool {
        self.remaining_crds.is_some()
    }

    /// True once every target has been processed or found missing
    pub fn is_complete(&self) -> bool {
        self.is_initialized() && self.remaining().is_empty()
    }
}

impl CrdCleanupPolicy {
    /// Declared target identities in declaration order, duplicates collapsed
    pub fn target_identities(&self) -> Vec<String> {
        let mut identities: Vec<String> = Vec::with_capacity(self.spec.crds_versions.len());
        for declared in &self.spec.crds_versions {
            let identity = declared.target().identity();
            if !identities.contains(&identity) {
                identities.push(identity);
            }
        }
        identities
    }

    /// Current status, seeding it from the spec on the first pass
    ///
    /// Identities already recorded as processed or non-existent are not
    /// seeded again, so the three lists stay disjoint.
    pub fn initialized_status(&self) -> CrdCleanupPolicyStatus {
        match &self.status {
            Some(status) if status.is_initialized() => status.clone(),
            Some(status) => {
                let remaining = self
                    .target_identities()
                    .into_iter()
                    .filter(|id| {
                        !status.processed_crds.contains(id) && !status.non_existent_crds.contains(id)
                    })
                    .collect();
                CrdCleanupPolicyStatus {
                    remaining_crds: Some(remaining),
                    ..status.clone()
                }
            }
            None => CrdCleanupPolicyStatus::initial(self.target_identities()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::CustomResourceExt;

    fn policy(targets: &[(&str, Option<&str>)]) -> CrdCleanupPolicy {
        CrdCleanupPolicy::new(
            "legacy",
            CrdCleanupPolicySpec {
                crds_versions: targets
                    .iter()
                    .map(|(name, version)| CleanupTarget {
                        name: name.to_string(),
                        version: version.map(str::to_string),
                    })
                    .collect(),
            },
        )
    }

    #[test]
    fn test_crd_metadata() {
        let crd = CrdCleanupPolicy::crd();
        assert_eq!(
            crd.metadata.name.as_deref(),
            Some("crdcleanuppolicies.policies.kreepy.kubecrew.de")
        );
        assert_eq!(crd.spec.group, POLICY_GROUP);
        assert_eq!(crd.spec.names.kind, "CRDCleanupPolicy");
        assert_eq!(crd.spec.scope, "Namespaced");
        assert_eq!(crd.spec.versions[0].name, "v1alpha1");

        let policy: CRDCleanupPolicy = CrdCleanupPolicy::new("legacy", Default::default());
        assert_eq!(policy.metadata.name.as_deref(), Some("legacy"));
    }

    #[test]
    fn test_spec_wire_format() {
        let spec: CrdCleanupPolicySpec = serde_json::from_value(serde_json::json!({
            "crdsversions": [
                {"name": "foo.example.com"},
                {"name": "bar.example.com", "version": "v1"}
            ]
        }))
        .unwrap();

        assert_eq!(spec.crds_versions.len(), 2);
        assert_eq!(spec.crds_versions[0].version, None);
        assert_eq!(spec.crds_versions[1].version.as_deref(), Some("v1"));
    }

    #[test]
    fn test_status_wire_format() {
        let status = CrdCleanupPolicyStatus {
            status_message: Some(MESSAGE_PENDING.to_string()),
            processed_crds: vec!["a.example.com".into()],
            remaining_crds: Some(vec![]),
            non_existent_crds: vec![],
        };
        let json = serde_json::to_value(&status).unwrap();

        assert_eq!(json["statusMessage"], MESSAGE_PENDING);
        assert_eq!(json["processedCrds"][0], "a.example.com");
        assert_eq!(json["remainingCrds"], serde_json::json!([]));
        assert_eq!(json["nonExistentCrds"], serde_json::json!([]));
    }

    #[test]
    fn test_target_identities_renders_versions() {
        let p = policy(&[("foo.example.com", None), ("bar.example.com", Some("v1"))]);
        assert_eq!(
            p.target_identities(),
            vec!["foo.example.com", "bar.example.com/v1"]
        );
    }

    #[test]
    fn test_target_identities_collapses_duplicates() {
        let p = policy(&[
            ("foo.example.com", None),
            ("foo.example.com", Some("")),
            ("bar.example.com", Some("v1")),
            ("bar.example.com", Some("v1")),
        ]);
        assert_eq!(
            p.target_identities(),
            vec!["foo.example.com", "bar.example.com/v1"]
        );
    }

    #[test]
    fn test_initialized_status_seeds_remaining_once() {
        let mut p = policy(&[("foo.example.com", None)]);
        let first = p.initialized_status();
        assert_eq!(first.remaining(), ["foo.example.com"]);
        assert!(first.processed_crds.is_empty());

        // After completion the empty list must not be re-seeded
        p.status = Some(CrdCleanupPolicyStatus {
            status_message: Some(MESSAGE_COMPLETE.into()),
            processed_crds: vec!["foo.example.com".into()],
            remaining_crds: Some(vec![]),
            non_existent_crds: vec![],
        });
        let again = p.initialized_status();
        assert!(again.is_complete());
        assert!(again.remaining().is_empty());
    }

    #[test]
    fn test_seeding_skips_recorded_identities() {
        let mut p = policy(&[
            ("a.example.com", None),
            ("b.example.com", None),
            ("c.example.com", Some("v1")),
        ]);
        p.status = Some(
            serde_json::from_value(serde_json::json!({
                "processedCrds": ["a.example.com"],
                "remainingCrds": null,
                "nonExistentCrds": ["c.example.com/v1"]
            }))
            .unwrap(),
        );

        let status = p.initialized_status();

        assert_eq!(status.processed_crds, vec!["a.example.com"]);
        assert_eq!(status.remaining(), ["b.example.com"]);
        assert_eq!(status.non_existent_crds, vec!["c.example.com/v1"]);
    }
}

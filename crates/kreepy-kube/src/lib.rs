//! Kreepy Kube - Kubernetes integration for Kreepy
//!
//! This crate provides:
//! - **Policy CRD**: The `CRDCleanupPolicy` custom resource and its status
//! - **Cleanup Pipeline**: Probe, count, and delete CRDs or single CRD versions
//! - **Status Folding**: Converge processed / remaining / non-existent lists across passes
//! - **Reconciler**: One sequential, re-entrant pass per policy
//! - **Controller**: kube-runtime wiring with a flat requeue interval
//! - **Mock Cluster**: In-memory cluster for tests without a Kubernetes API server

pub mod cleanup;
pub mod cluster;
pub mod config;
pub mod controller;
pub mod definition;
pub mod error;
pub mod policy;
pub mod reconcile;
pub mod target;

pub use cleanup::{Bucket, Stage, TargetOutcome, TargetResult, fold_status, process_target};
pub use cluster::{ClusterApi, Instance, KubeCluster, MockCluster};
pub use config::ControllerConfig;
pub use controller::run_controller;
pub use definition::{DefinitionView, InstanceCoordinates};
pub use error::{KubeError, Result};
pub use policy::{
    CRDCleanupPolicy, CleanupTarget, CrdCleanupPolicy, CrdCleanupPolicySpec, CrdCleanupPolicyStatus,
    MESSAGE_COMPLETE, MESSAGE_PENDING,
};
pub use reconcile::{PassOutcome, Reconciler};
pub use target::Target;

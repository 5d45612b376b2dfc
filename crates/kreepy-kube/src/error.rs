//! Error types for kreepy-kube

use thiserror::Error;

/// Result type for kreepy-kube operations
pub type Result<T> = std::result::Result<T, KubeError>;

/// Errors that can occur during Kubernetes operations
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KubeError {
    /// Kubernetes API error
    #[error("Kubernetes API error: {0}")]
    Api(#[from] kube::Error),

    /// The persisted policy lacks a field needed to address it
    #[error("CRDCleanupPolicy is missing metadata.{field}")]
    PolicyIdentity { field: &'static str },

    /// The CRDCleanupPolicy CRD itself is not installed in the cluster
    #[error("CRDCleanupPolicy CRD is not installed: {0}")]
    PolicyCrdMissing(String),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl KubeError {
    /// Check if this is a Kubernetes 404 Not Found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, KubeError::Api(kube::Error::Api(resp)) if resp.code == 404)
    }

    /// Check if this is a conflict error (409)
    pub fn is_conflict(&self) -> bool {
        matches!(self, KubeError::Api(kube::Error::Api(resp)) if resp.code == 409)
    }
}

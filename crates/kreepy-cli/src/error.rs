//! CLI error types with exit code handling

use kreepy_kube::KubeError;
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// Errors surfaced to the operator, each mapped to an exit code
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// Invalid flag or environment value
    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(kreepy::cli::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Could not build a Kubernetes client
    #[error("Cannot connect to the cluster: {message}")]
    #[diagnostic(
        code(kreepy::cli::connect),
        help("check KUBECONFIG or run inside a pod with a service account")
    )]
    Connect { message: String },

    /// A Kubernetes API call failed
    #[error("Cluster error: {message}")]
    #[diagnostic(code(kreepy::cli::cluster))]
    Cluster {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Policy lookup came back empty
    #[error("CRDCleanupPolicy {namespace}/{name} not found")]
    #[diagnostic(code(kreepy::cli::not_found))]
    PolicyNotFound { namespace: String, name: String },

    /// Output could not be serialized
    #[error("Output error: {message}")]
    #[diagnostic(code(kreepy::cli::output))]
    Output { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config { .. } => exit_codes::USAGE_ERROR,
            CliError::Connect { .. } => exit_codes::UNAVAILABLE,
            CliError::Cluster { .. } => exit_codes::CLUSTER_ERROR,
            CliError::PolicyNotFound { .. } => exit_codes::NOT_FOUND,
            CliError::Output { .. } => exit_codes::ERROR,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: None,
        }
    }
}

impl From<KubeError> for CliError {
    fn from(err: KubeError) -> Self {
        match err {
            KubeError::InvalidConfig(message) => CliError::Config {
                message,
                help: None,
            },
            KubeError::PolicyCrdMissing(_) => CliError::Cluster {
                message: err.to_string(),
                help: Some("install it with: kreepy crd | kubectl apply -f -".to_string()),
            },
            other => CliError::Cluster {
                message: other.to_string(),
                help: None,
            },
        }
    }
}

impl From<kube::Error> for CliError {
    fn from(err: kube::Error) -> Self {
        KubeError::from(err).into()
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Output {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for CliError {
    fn from(err: serde_yaml::Error) -> Self {
        CliError::Output {
            message: err.to_string(),
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

//! Subcommand implementations

pub mod crd;
pub mod reconcile;
pub mod run;
pub mod status;

use kube::Client;

use crate::error::{CliError, Result};

/// Build a client from kubeconfig or the in-cluster service account
pub async fn connect() -> Result<Client> {
    Client::try_default().await.map_err(|e| CliError::Connect {
        message: e.to_string(),
    })
}

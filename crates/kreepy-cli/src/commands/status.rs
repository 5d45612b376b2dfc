//! Status command - show the progress of a CRDCleanupPolicy

use kreepy_kube::{ClusterApi, KubeCluster};
use serde_json::json;

use crate::commands::connect;
use crate::display;
use crate::error::{CliError, Result};

pub async fn run(namespace: &str, name: &str, output_json: bool) -> Result<()> {
    let cluster = KubeCluster::new(connect().await?);

    let policy = cluster
        .get_policy(namespace, name)
        .await?
        .ok_or_else(|| CliError::PolicyNotFound {
            namespace: namespace.to_string(),
            name: name.to_string(),
        })?;

    if output_json {
        let doc = json!({
            "namespace": namespace,
            "name": name,
            "targets": policy.target_identities(),
            "status": policy.status,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    display::print_policy(namespace, name, &policy);
    Ok(())
}

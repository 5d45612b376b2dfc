//! Reconcile command - run a single cleanup pass outside the controller

use kreepy_kube::{KubeCluster, PassOutcome, Reconciler};
use tracing::debug;

use crate::commands::connect;
use crate::display;
use crate::error::{CliError, Result};
use crate::exit_codes;

/// Run one pass and report it; returns the process exit code
pub async fn run(namespace: &str, name: &str, output_json: bool) -> Result<i32> {
    debug!(namespace, name, "running a single cleanup pass");
    let client = connect().await?;
    let reconciler = Reconciler::new(KubeCluster::new(client));

    let outcome = reconciler.reconcile(namespace, name).await?;
    if outcome == PassOutcome::PolicyGone {
        return Err(CliError::PolicyNotFound {
            namespace: namespace.to_string(),
            name: name.to_string(),
        });
    }

    if output_json {
        println!("{}", serde_json::to_string_pretty(&outcome.status())?);
    } else {
        display::print_outcome(namespace, name, &outcome);
    }

    Ok(match outcome {
        PassOutcome::Requeue(_) => exit_codes::PENDING,
        _ => exit_codes::SUCCESS,
    })
}

//! Run command - start the long-running controller

use std::time::Duration;

use kreepy_kube::{ControllerConfig, run_controller};

use crate::commands::connect;
use crate::error::Result;

pub async fn run(
    namespace: Option<String>,
    requeue_interval: u64,
    error_backoff: u64,
) -> Result<()> {
    let config = ControllerConfig {
        requeue_interval: Duration::from_secs(requeue_interval),
        error_backoff: Duration::from_secs(error_backoff),
        namespace,
    };
    // Reject bad settings before touching the cluster
    config.validate()?;

    let client = connect().await?;
    run_controller(client, config).await?;
    Ok(())
}

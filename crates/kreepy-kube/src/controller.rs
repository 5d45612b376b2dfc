//! Controller runtime wiring
//!
//! Watches CRDCleanupPolicy objects and runs one cleanup pass per
//! invocation. The kube-runtime scheduler never reconciles the same object
//! twice at once, while different policies are reconciled concurrently.

use std::sync::Arc;

use futures::StreamExt;
use kube::{
    Client, ResourceExt,
    api::{Api, ListParams},
    runtime::{Controller, controller::Action, watcher},
};
use tracing::{error, info, warn};

use crate::cluster::KubeCluster;
use crate::config::ControllerConfig;
use crate::error::{KubeError, Result};
use crate::policy::CrdCleanupPolicy;
use crate::reconcile::{PassOutcome, Reconciler, policy_identity};

/// Shared state handed to every reconcile call
pub struct ControllerContext {
    pub reconciler: Reconciler<KubeCluster>,
    pub config: ControllerConfig,
}

/// Run the cleanup controller until a shutdown signal arrives
pub async fn run_controller(client: Client, config: ControllerConfig) -> Result<()> {
    config.validate()?;

    let api: Api<CrdCleanupPolicy> = match &config.namespace {
        Some(ns) => Api::namespaced(client.clone(), ns),
        None => Api::all(client.clone()),
    };

    // Fail fast with a hint instead of a watcher retrying forever
    if let Err(e) = api.list(&ListParams::default().limit(1)).await {
        return Err(match e {
            kube::Error::Api(resp) if resp.code == 404 => KubeError::PolicyCrdMissing(resp.message),
            other => KubeError::Api(other),
        });
    }

    info!(
        namespace = config.namespace.as_deref().unwrap_or("<all>"),
        requeue_secs = config.requeue_interval.as_secs(),
        "starting CRDCleanupPolicy controller"
    );

    let ctx = Arc::new(ControllerContext {
        reconciler: Reconciler::new(KubeCluster::new(client)),
        config,
    });

    Controller::new(api, watcher::Config::default())
        .shutdown_on_signal()
        .run(reconcile, error_policy, ctx)
        .for_each(|res| async move {
            match res {
                Ok((obj_ref, action)) => info!(policy = %obj_ref, ?action, "reconciled"),
                Err(e) => warn!(error = %e, "reconcile failed"),
            }
        })
        .await;

    info!("controller stopped");
    Ok(())
}

async fn reconcile(
    policy: Arc<CrdCleanupPolicy>,
    ctx: Arc<ControllerContext>,
) -> Result<Action> {
    let (namespace, name) = policy_identity(&policy)?;
    let outcome = ctx.reconciler.reconcile(&namespace, &name).await?;
    Ok(next_action(&outcome, &ctx.config))
}

fn error_policy(
    policy: Arc<CrdCleanupPolicy>,
    error: &KubeError,
    ctx: Arc<ControllerContext>,
) -> Action {
    error!(policy = %policy.name_any(), error = %error, "cleanup pass failed");
    Action::requeue(ctx.config.error_backoff)
}

/// Scheduling decision after a pass
pub fn next_action(outcome: &PassOutcome, config: &ControllerConfig) -> Action {
    match outcome {
        PassOutcome::Requeue(_) => Action::requeue(config.requeue_interval),
        PassOutcome::Done(_) | PassOutcome::PolicyGone => Action::await_change(),
    }
}

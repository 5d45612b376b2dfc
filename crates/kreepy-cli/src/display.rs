//! Terminal rendering of policy status

use console::style;
use kreepy_kube::{CrdCleanupPolicy, CrdCleanupPolicyStatus, PassOutcome};

/// Print a policy header and its three status buckets
pub fn print_policy(namespace: &str, name: &str, policy: &CrdCleanupPolicy) {
    println!("{}", style("POLICY").bold().underlined());
    println!("  Name:       {}", style(name).cyan());
    println!("  Namespace:  {}", style(namespace).yellow());
    println!("  Targets:    {}", policy.target_identities().len());

    match &policy.status {
        Some(status) if status.is_initialized() => print_status(status),
        _ => println!("\n  {}", style("Not reconciled yet").dim()),
    }
}

/// Print the buckets of a status
pub fn print_status(status: &CrdCleanupPolicyStatus) {
    let message = status.status_message.as_deref().unwrap_or("-");
    let message = if status.is_complete() {
        style(message).green()
    } else {
        style(message).yellow()
    };
    println!("  Status:     {}", message);

    print_bucket("PROCESSED", &status.processed_crds, "✓");
    print_bucket("REMAINING", status.remaining(), "…");
    print_bucket("NON-EXISTENT", &status.non_existent_crds, "∅");
}

fn print_bucket(title: &str, items: &[String], marker: &str) {
    println!(
        "\n{} {}",
        style(title).bold().underlined(),
        style(format!("({})", items.len())).dim()
    );
    if items.is_empty() {
        println!("  {}", style("none").dim());
        return;
    }
    for item in items {
        let marker = match title {
            "PROCESSED" => style(marker).green(),
            "REMAINING" => style(marker).yellow(),
            _ => style(marker).dim(),
        };
        println!("  {} {}", marker, item);
    }
}

/// One-line summary of a pass
pub fn print_outcome(namespace: &str, name: &str, outcome: &PassOutcome) {
    match outcome {
        PassOutcome::PolicyGone => {
            println!(
                "{} CRDCleanupPolicy {}/{} no longer exists",
                style("!").yellow().bold(),
                namespace,
                name
            );
        }
        PassOutcome::Done(status) => {
            println!(
                "{} {}/{}: {}",
                style("✓").green().bold(),
                namespace,
                name,
                status.status_message.as_deref().unwrap_or_default()
            );
            print_status(status);
        }
        PassOutcome::Requeue(status) => {
            println!(
                "{} {}/{}: {}",
                style("…").yellow().bold(),
                namespace,
                name,
                status.status_message.as_deref().unwrap_or_default()
            );
            print_status(status);
        }
    }
}

//! Folding per-target outcomes into the policy status

use crate::policy::{CrdCleanupPolicyStatus, MESSAGE_COMPLETE, MESSAGE_PENDING};

use super::{Bucket, TargetResult};

/// Build the status that results from one pass
///
/// `prior` is the status the pass started from (already initialized) and
/// `results` holds one entry per target processed, in processing order.
/// Remaining is rebuilt from the results; Processed and NonExistent keep
/// their prior entries and gain new ones without duplicates.
pub fn fold_status(prior: &CrdCleanupPolicyStatus, results: &[TargetResult]) -> CrdCleanupPolicyStatus {
    let mut next = CrdCleanupPolicyStatus {
        status_message: None,
        processed_crds: prior.processed_crds.clone(),
        remaining_crds: Some(Vec::new()),
        non_existent_crds: prior.non_existent_crds.clone(),
    };

    let mut remaining = Vec::new();
    for result in results {
        let identity = result.identity.clone();
        match result.outcome.bucket() {
            Bucket::Processed => push_unique(&mut next.processed_crds, identity),
            Bucket::Remaining => push_unique(&mut remaining, identity),
            Bucket::NonExistent => push_unique(&mut next.non_existent_crds, identity),
        }
    }

    next.status_message = Some(summary_message(&remaining).to_string());
    next.remaining_crds = Some(remaining);
    next
}

/// Summary line for a remaining list
pub fn summary_message(remaining: &[String]) -> &'static str {
    if remaining.is_empty() {
        MESSAGE_COMPLETE
    } else {
        MESSAGE_PENDING
    }
}

fn push_unique(list: &mut Vec<String>, identity: String) {
    if !list.contains(&identity) {
        list.push(identity);
    }
}

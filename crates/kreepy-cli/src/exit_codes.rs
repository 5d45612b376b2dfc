//! Process exit codes
//!
//! Follows sysexits.h where a matching code exists.

/// Operation completed
pub const SUCCESS: i32 = 0;

/// Unspecified failure
pub const ERROR: i32 = 1;

/// A one-shot pass finished but targets are still pending
pub const PENDING: i32 = 2;

/// The Kubernetes API rejected or failed a request
pub const CLUSTER_ERROR: i32 = 3;

/// The requested CRDCleanupPolicy does not exist
pub const NOT_FOUND: i32 = 4;

/// Invalid arguments or configuration (sysexits.h EX_USAGE)
pub const USAGE_ERROR: i32 = 64;

/// No kubeconfig or in-cluster credentials (sysexits.h EX_UNAVAILABLE)
pub const UNAVAILABLE: i32 = 69;

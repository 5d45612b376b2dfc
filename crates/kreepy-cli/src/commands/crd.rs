//! Crd command - print the CRDCleanupPolicy definition

use kreepy_kube::CrdCleanupPolicy;
use kube::CustomResourceExt;

use crate::error::Result;

/// Render the definition as YAML, ready for `kubectl apply -f -`
pub fn render() -> Result<String> {
    Ok(serde_yaml::to_string(&CrdCleanupPolicy::crd())?)
}

pub fn run() -> Result<()> {
    print!("{}", render()?);
    Ok(())
}

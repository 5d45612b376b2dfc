//! Typed view over a CustomResourceDefinition
//!
//! The cleanup pipeline only needs a handful of fields from a CRD: its
//! group, names, and the ordered list of declared versions. This module
//! projects those out of the k8s-openapi type and builds the coordinates
//! used to list instances.

use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::{
    ResourceExt,
    core::GroupVersionKind,
    discovery::ApiResource,
};

/// The parts of a CRD the cleanup pipeline reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionView {
    pub name: String,
    pub group: String,
    pub kind: String,
    pub plural: String,
    pub singular: Option<String>,
    /// Version names in declaration order
    pub versions: Vec<String>,
}

impl DefinitionView {
    /// Project a fetched CRD
    pub fn from_crd(crd: &CustomResourceDefinition) -> Self {
        Self {
            name: crd.name_any(),
            group: crd.spec.group.clone(),
            kind: crd.spec.names.kind.clone(),
            plural: crd.spec.names.plural.clone(),
            singular: crd.spec.names.singular.clone(),
            versions: crd.spec.versions.iter().map(|v| v.name.clone()).collect(),
        }
    }

    /// Whether the CRD declares this version
    pub fn has_version(&self, version: &str) -> bool {
        self.versions.iter().any(|v| v == version)
    }

    /// The first declared version
    ///
    /// This is index 0 of the declared list, which is not necessarily the
    /// storage or preferred served version.
    pub fn first_version(&self) -> Option<&str> {
        self.versions.first().map(String::as_str)
    }

    /// Coordinates for listing instances at `version`
    pub fn instances_at(&self, version: &str) -> InstanceCoordinates {
        InstanceCoordinates {
            group: self.group.clone(),
            version: version.to_string(),
            kind: self.kind.clone(),
            plural: self.plural.clone(),
        }
    }
}

/// Group/version/resource address of a class of custom instances
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstanceCoordinates {
    pub group: String,
    pub version: String,
    pub kind: String,
    /// Plural resource name used in the API path
    pub plural: String,
}

impl InstanceCoordinates {
    /// `group/version`, as reported in an instance's `apiVersion`
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    /// Dynamic API resource for these coordinates
    pub fn api_resource(&self) -> ApiResource {
        let gvk = GroupVersionKind::gvk(&self.group, &self.version, &self.kind);
        ApiResource::from_gvk_with_plural(&gvk, &self.plural)
    }
}

impl std::fmt::Display for InstanceCoordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}/{}", self.plural, self.group, self.version)
    }
}

/// Copy of `crd` with `version` removed from its version list
///
/// The relative order of the remaining versions is preserved, and the
/// metadata (including `resourceVersion`) is carried over unchanged so that
/// an update built from it is rejected if the CRD changed in the meantime.
pub fn without_version(crd: &CustomResourceDefinition, version: &str) -> CustomResourceDefinition {
    let mut updated = crd.clone();
    updated.spec.versions.retain(|v| v.name != version);
    updated
}

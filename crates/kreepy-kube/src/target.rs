//! Cleanup target identities
//!
//! A target is rendered as `name` (the whole CRD) or `name/version`
//! (a single served version). The rendered string is the identity
//! stored in the policy status.

use std::fmt;

/// Separator between CRD name and version in a target identity
pub const VERSION_SEPARATOR: char = '/';

/// A parsed cleanup target
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    /// CRD name, e.g. `foos.example.com`
    pub name: String,
    /// Requested version; `None` means the whole definition
    pub version: Option<String>,
}

impl Target {
    /// Target the whole definition
    pub fn whole(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
        }
    }

    /// Target a single version of a definition
    ///
    /// An empty version is the same as targeting the whole definition.
    pub fn versioned(name: impl Into<String>, version: impl Into<String>) -> Self {
        let version = version.into();
        Self {
            name: name.into(),
            version: (!version.is_empty()).then_some(version),
        }
    }

    /// Split an identity on the first separator
    ///
    /// No validation happens here; a malformed name simply fails lookup later.
    pub fn parse(identity: &str) -> Self {
        match identity.split_once(VERSION_SEPARATOR) {
            Some((name, version)) => Self::versioned(name, version),
            None => Self::whole(identity),
        }
    }

    /// Requested version, if any
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Render back into the identity stored in status
    pub fn identity(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(v) => write!(f, "{}{}{}", self.name, VERSION_SEPARATOR, v),
            None => write!(f, "{}", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_whole_definition() {
        let target = Target::parse("foo.example.com");
        assert_eq!(target.name, "foo.example.com");
        assert_eq!(target.version(), None);
    }

    #[test]
    fn test_parse_versioned() {
        let target = Target::parse("bar.example.com/v1");
        assert_eq!(target.name, "bar.example.com");
        assert_eq!(target.version(), Some("v1"));
    }

    #[test]
    fn test_parse_splits_on_first_separator_only() {
        let target = Target::parse("bar.example.com/v1/extra");
        assert_eq!(target.name, "bar.example.com");
        assert_eq!(target.version(), Some("v1/extra"));
    }

    #[test]
    fn test_trailing_separator_means_whole() {
        let target = Target::parse("bar.example.com/");
        assert_eq!(target, Target::whole("bar.example.com"));
        assert_eq!(target.identity(), "bar.example.com");
    }

    #[test]
    fn test_identity_round_trips() {
        for identity in ["foo.example.com", "bar.example.com/v2beta1"] {
            assert_eq!(Target::parse(identity).identity(), identity);
        }
    }
}

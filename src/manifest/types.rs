//! Shared types produced by manifest parsers.

use std::fmt;

/// Package ecosystem a manifest belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ecosystem {
    Pypi,
    Npm,
    Maven,
}

impl Ecosystem {
    /// Ecosystem name as used in remediation API paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            Ecosystem::Pypi => "pypi",
            Ecosystem::Npm => "npm",
            Ecosystem::Maven => "maven",
        }
    }
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A package discovered in a manifest, normalized across ecosystems.
///
/// Parsers guarantee `name` and `version` are non-empty and that
/// (name, version) pairs are unique within a single parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInfo {
    /// Package name (`groupId:artifactId` for Maven)
    pub name: String,
    /// Resolved exact version
    pub version: String,
    /// Declared constraint; identical to `version` for lock files
    pub version_constraint: String,
    /// Ecosystem the package belongs to
    pub ecosystem: Ecosystem,
    /// Declared at the manifest's top level
    pub direct: bool,
    /// Test or dev-only dependency
    pub dev: bool,
}

//! Shared contract implemented by every ecosystem parser.

use std::collections::HashMap;
use std::path::Path;

use crate::{
    Result,
    manifest::types::{Ecosystem, PackageInfo},
};

/// Parses, updates, and validates dependency manifests for one ecosystem.
///
/// Implementations are format-specific: there is no shared parsing logic,
/// only a shared shape so orchestration code can treat manifests uniformly.
#[cfg_attr(test, mockall::automock)]
pub trait ManifestParser {
    /// Ecosystem this parser handles.
    fn ecosystem(&self) -> Ecosystem;

    /// File names this parser recognizes.
    fn file_patterns(&self) -> &'static [&'static str];

    /// Whether this parser handles the given manifest path.
    fn can_handle(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        self.file_patterns().iter().any(|pattern| *pattern == name)
    }

    /// Parse a manifest into a normalized package list.
    fn parse(&self, path: &Path) -> Result<Vec<PackageInfo>>;

    /// Produce updated manifest content with the requested versions applied.
    ///
    /// `updates` maps package name to new version. The file itself is not
    /// written; callers persist the returned content after validating it.
    fn update(
        &self,
        path: &Path,
        updates: &HashMap<String, String>,
    ) -> Result<String>;

    /// Whether the given content is syntactically valid for this format.
    fn validate(&self, content: &str) -> bool;
}

//! Wire types for the remediation service.

use serde::{Deserialize, Serialize};

/// A package reference submitted for analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRef {
    pub name: String,
    pub version: String,
}

/// Request body for the remediate endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub packages: Vec<PackageRef>,
}

/// Upgraded package coordinates carried by a patch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchInfo {
    /// Package name
    pub name: String,
    /// Package version
    pub version: String,
}

/// A remediation recommendation for one vulnerable package.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackagePatch {
    /// Currently installed package name
    pub package_name: String,
    /// Currently installed version
    pub version: String,
    /// Same-named upgraded package
    pub patch: PatchInfo,
    /// Vendor-renamed package carrying the same fix
    pub patch_alias: PatchInfo,
    /// CVEs fixed by the patch
    #[serde(default)]
    pub cve_ids: Vec<String>,
}

impl PackagePatch {
    /// Select the replacement this patch should install: the vendor-aliased
    /// package when `use_alias` is set, the same-named upgrade otherwise.
    pub fn select(&self, use_alias: bool) -> &PatchInfo {
        if use_alias {
            &self.patch_alias
        } else {
            &self.patch
        }
    }
}

/// A package the service declined to analyze.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedPackage {
    pub package_name: String,
    pub reason: String,
}

/// Response body from the remediate endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    #[serde(default)]
    pub patches: Vec<PackagePatch>,
    #[serde(default)]
    pub skipped: Vec<SkippedPackage>,
}

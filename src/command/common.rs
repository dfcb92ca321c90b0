//! Shared orchestration helpers.

use log::*;
use std::path::Path;

use crate::{
    Result,
    api::types::{AnalyzeResponse, PackageRef},
    error::DepmendError,
    manifest::types::PackageInfo,
    pip::InstalledPackage,
};

/// Fail fast when the target manifest is missing.
pub fn ensure_exists(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(DepmendError::manifest_not_found(
            path.display().to_string(),
        )
        .into());
    }

    Ok(())
}

/// Convert parsed manifest packages into the wire refs sent for analysis.
pub fn to_package_refs(packages: &[PackageInfo]) -> Vec<PackageRef> {
    packages
        .iter()
        .map(|pkg| PackageRef {
            name: pkg.name.clone(),
            version: pkg.version.clone(),
        })
        .collect()
}

/// Convert pip-installed packages into wire refs.
pub fn installed_to_refs(packages: &[InstalledPackage]) -> Vec<PackageRef> {
    packages
        .iter()
        .map(|pkg| PackageRef {
            name: pkg.name.clone(),
            version: pkg.version.clone(),
        })
        .collect()
}

/// Log analysis results. Skipped packages never affect control flow.
pub fn log_analysis(response: &AnalyzeResponse) {
    debug!(
        "analysis complete: {} patches available, {} packages skipped",
        response.patches.len(),
        response.skipped.len()
    );

    for skipped in &response.skipped {
        debug!("skipped {}: {}", skipped.package_name, skipped.reason);
    }
}

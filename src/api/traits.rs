//! Contract for the vulnerability remediation service.

use async_trait::async_trait;

use crate::{
    Result,
    api::types::{AnalyzeResponse, PackageRef},
    manifest::types::Ecosystem,
};

/// Client for the remote vulnerability-analysis service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemediationApi {
    /// Submit packages for analysis and receive patch recommendations.
    async fn analyze_packages(
        &self,
        ecosystem: Ecosystem,
        packages: Vec<PackageRef>,
    ) -> Result<AnalyzeResponse>;
}

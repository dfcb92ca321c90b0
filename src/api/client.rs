//! HTTP client for the remediation service using reqwest.

use async_trait::async_trait;
use color_eyre::eyre::WrapErr;
use log::*;
use reqwest::{StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};

use crate::{
    Result,
    api::{
        traits::RemediationApi,
        types::{AnalyzeRequest, AnalyzeResponse, PackageRef},
    },
    error::DepmendError,
    manifest::types::Ecosystem,
};

/// Remediation API client authenticating with an API key over HTTP Basic
/// Auth (key as username, empty password).
pub struct Client {
    base_url: Url,
    api_key: SecretString,
    client: reqwest::Client,
}

impl Client {
    /// Create a client for the given API base URL.
    pub fn new(base_url: &str, api_key: SecretString) -> Result<Self> {
        // Force a trailing slash so joins append instead of replacing the
        // last path segment
        let mut base = base_url.trim_end_matches('/').to_string();
        base.push('/');

        let base_url = Url::parse(&base)
            .wrap_err_with(|| format!("invalid API base URL: {}", base))?;

        let client = reqwest::Client::builder().build()?;

        Ok(Self {
            base_url,
            api_key,
            client,
        })
    }

    fn endpoint(&self, ecosystem: Ecosystem) -> Result<Url> {
        let url = self
            .base_url
            .join(&format!("v3/remediate/{}", ecosystem))?;
        Ok(url)
    }
}

#[async_trait]
impl RemediationApi for Client {
    async fn analyze_packages(
        &self,
        ecosystem: Ecosystem,
        packages: Vec<PackageRef>,
    ) -> Result<AnalyzeResponse> {
        let url = self.endpoint(ecosystem)?;
        let request = AnalyzeRequest { packages };

        debug!(
            "analyzing {} {} packages via {}",
            request.packages.len(),
            ecosystem,
            url
        );

        let response = self
            .client
            .post(url)
            .basic_auth(self.api_key.expose_secret(), Some(""))
            .json(&request)
            .send()
            .await
            .wrap_err("failed to execute request")?;

        let status = response.status();

        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(DepmendError::ApiStatus {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let analysis: AnalyzeResponse = response
            .json()
            .await
            .wrap_err("failed to decode response")?;

        debug!(
            "analysis returned {} patches, {} skipped",
            analysis.patches.len(),
            analysis.skipped.len()
        );

        Ok(analysis)
    }
}

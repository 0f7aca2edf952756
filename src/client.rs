use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error};

use crate::config::InstanceConfig;
use crate::types::{ScanResult, UsageInfo};

const USER_AGENT: &str = concat!("cloudsmith-check/", env!("CARGO_PKG_VERSION"));

/// Longest slice of an error response body kept in [`FetchError::Status`]
pub const MAX_ERROR_BODY_BYTES: usize = 512;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Read access to the Cloudsmith usage and vulnerability endpoints.
#[async_trait]
pub trait CloudsmithApi: Send + Sync {
    async fn get_usage_info(&self, instance: &InstanceConfig) -> Result<UsageInfo, FetchError>;

    async fn get_vulnerability_info(
        &self,
        instance: &InstanceConfig,
    ) -> Result<Vec<ScanResult>, FetchError>;
}

pub fn usage_url(instance: &InstanceConfig) -> String {
    format!("{}/quota/{}/", instance.url, instance.org)
}

pub fn vulnerabilities_url(instance: &InstanceConfig) -> String {
    format!("{}/vulnerabilities/{}/", instance.url, instance.org)
}

/// Cut an error body down to at most [`MAX_ERROR_BODY_BYTES`], on a char boundary.
pub fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_BYTES {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY_BYTES;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

/// Network-backed client talking to the Cloudsmith REST API
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: String,
        api_key: &str,
    ) -> Result<T, FetchError> {
        debug!("GET {}", url);
        let res = self
            .client
            .get(&url)
            .header("X-Api-Key", api_key)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.clone(),
                source,
            })?;

        if !res.status().is_success() {
            let status = res.status();
            let body = truncate_body(&res.text().await.unwrap_or_default());
            error!("Cloudsmith API request failed: {} - {}", status, body);
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
                body,
            });
        }

        res.json::<T>()
            .await
            .map_err(|source| FetchError::Decode { url, source })
    }
}

#[async_trait]
impl CloudsmithApi for HttpClient {
    async fn get_usage_info(&self, instance: &InstanceConfig) -> Result<UsageInfo, FetchError> {
        self.get_json(usage_url(instance), &instance.api_key).await
    }

    async fn get_vulnerability_info(
        &self,
        instance: &InstanceConfig,
    ) -> Result<Vec<ScanResult>, FetchError> {
        self.get_json(vulnerabilities_url(instance), &instance.api_key).await
    }
}

//! Client for the external HTTP conversion service.
//!
//! The service accepts either a subscription URL to fetch itself or the raw
//! content as a POST body, and returns a rendered document in the same
//! target format. Documents produced here skip local validation (the
//! service owns its own), but a response without the `proxies:` marker is
//! still a conversion failure.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use tracing::{debug, info};

use crate::error::ConvertError;
use crate::get_version;

/// HTTP conversion service endpoint
pub struct Subconverter {
    base_url: String,
    timeout: Duration,
}

impl Subconverter {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    /// Service version string, doubling as a health probe
    pub async fn version(&self) -> Result<String, ConvertError> {
        let url = format!("{}/version", self.base_url);
        let response = self
            .client()?
            .get(&url)
            .send()
            .await
            .map_err(|e| self.network_error(&url, e.to_string()))?;

        response
            .text()
            .await
            .map_err(|e| self.network_error(&url, e.to_string()))
    }

    /// Convert by handing the service a subscription URL to fetch
    pub async fn convert_url(&self, subscription_url: &str) -> Result<String, ConvertError> {
        let url = format!("{}/sub", self.base_url);
        debug!("Requesting conversion of {} via {}", subscription_url, url);

        let response = self
            .client()?
            .get(&url)
            .query(&[("target", "clash"), ("url", subscription_url)])
            .send()
            .await
            .map_err(|e| self.network_error(&url, e.to_string()))?;

        self.read_document(&url, response).await
    }

    /// Convert by posting the raw subscription content
    pub async fn convert_content(&self, content: &str) -> Result<String, ConvertError> {
        if content.trim().is_empty() {
            return Err(ConvertError::RemoteConversion {
                reason: "subscription content is empty".to_string(),
            });
        }

        let url = format!("{}/sub", self.base_url);
        debug!("Posting {} byte(s) of content to {}", content.len(), url);

        let response = self
            .client()?
            .post(&url)
            .query(&[("target", "clash")])
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(content.to_string())
            .send()
            .await
            .map_err(|e| self.network_error(&url, e.to_string()))?;

        self.read_document(&url, response).await
    }

    async fn read_document(
        &self,
        url: &str,
        response: reqwest::Response,
    ) -> Result<String, ConvertError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ConvertError::RemoteConversion {
                reason: format!("HTTP status {}: {}", status, body.trim()),
            });
        }

        let document = response
            .text()
            .await
            .map_err(|e| self.network_error(url, e.to_string()))?;

        ensure_clash_document(&document)?;
        info!("Conversion service returned {} byte(s)", document.len());
        Ok(document)
    }

    fn client(&self) -> Result<reqwest::Client, ConvertError> {
        reqwest::Client::builder()
            .user_agent(format!("subforge/{}", get_version()))
            .timeout(self.timeout)
            .build()
            .map_err(|e| self.network_error(&self.base_url, e.to_string()))
    }

    fn network_error(&self, url: &str, reason: String) -> ConvertError {
        ConvertError::Network {
            url: url.to_string(),
            reason,
        }
    }
}

/// A usable response must carry the `proxies:` marker; anything else is a
/// conversion failure, not a document.
fn ensure_clash_document(document: &str) -> Result<(), ConvertError> {
    if document.trim().is_empty() {
        return Err(ConvertError::RemoteConversion {
            reason: "response is empty".to_string(),
        });
    }
    if !document.contains("proxies:") {
        return Err(ConvertError::RemoteConversion {
            reason: "response lacks the proxies: marker".to_string(),
        });
    }
    Ok(())
}

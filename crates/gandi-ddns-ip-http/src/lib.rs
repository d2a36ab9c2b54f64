// # HTTP Address Source
//
// This crate provides the address-echo based AddressSource for the Gandi
// DDNS client.
//
// ## Purpose
//
// Asks an external "what is my IP" service for the host's public address.
// The default service is icanhazip, which exposes one host per address
// family (`ipv4.icanhazip.com`, `ipv6.icanhazip.com`), so the protocol of
// the answer is decided by which host is queried.
//
// ## Contract
//
// - One GET per call, bounded by a request timeout
// - Non-success status, empty body, or a body that is not an address of
//   the requested family ⇒ `Error::Fetch`
// - No retries and no polling; the next invocation is the retry

use gandi_ddns_core::config::AddressSourceConfig;
use gandi_ddns_core::traits::AddressSource;
use gandi_ddns_core::{Error, Protocol, Result};

use std::net::IpAddr;
use std::time::Duration;

/// Default request timeout for the address-echo service
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Placeholder in the URL template replaced by `ipv4`/`ipv6`
const PROTOCOL_PLACEHOLDER: &str = "{protocol}";

/// Address source backed by an HTTP address-echo service
#[derive(Debug, Clone)]
pub struct HttpAddressSource {
    /// URL template, e.g. "https://{protocol}.icanhazip.com/"
    url_template: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpAddressSource {
    /// Create a new HTTP address source
    ///
    /// # Parameters
    ///
    /// - `url_template`: URL to query; `{protocol}` expands to `ipv4`/`ipv6`
    /// - `timeout`: Per-request timeout
    pub fn new(url_template: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url_template: url_template.into(),
            client,
        })
    }

    /// Create from the client configuration
    pub fn from_config(config: &AddressSourceConfig) -> Result<Self> {
        let timeout = if config.timeout_secs == 0 {
            DEFAULT_TIMEOUT
        } else {
            Duration::from_secs(config.timeout_secs)
        };
        Self::new(config.url_template.clone(), timeout)
    }

    /// URL queried for `protocol`
    pub fn url_for(&self, protocol: Protocol) -> String {
        self.url_template
            .replace(PROTOCOL_PLACEHOLDER, protocol.as_str())
    }

    /// Fetch and validate the current address
    async fn fetch(&self, protocol: Protocol) -> Result<IpAddr> {
        let url = self.url_for(protocol);
        tracing::debug!("Fetching current {} address from {}", protocol, url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::fetch(format!("Request to {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(Error::fetch(format!(
                "{} returned HTTP {}",
                url,
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::fetch(format!("Failed to read response from {}: {}", url, e)))?;

        let text = body.trim();
        if text.is_empty() {
            return Err(Error::fetch(format!("{} returned an empty body", url)));
        }

        protocol.parse_address(text).ok_or_else(|| {
            Error::fetch(format!(
                "{} returned '{}', which is not an {} address",
                url, text, protocol
            ))
        })
    }
}

#[async_trait::async_trait]
impl AddressSource for HttpAddressSource {
    async fn current(&self, protocol: Protocol) -> Result<IpAddr> {
        let ip = self.fetch(protocol).await?;
        tracing::debug!("Current {} address: {}", protocol, ip);
        Ok(ip)
    }

    fn source_name(&self) -> &'static str {
        "http"
    }
}

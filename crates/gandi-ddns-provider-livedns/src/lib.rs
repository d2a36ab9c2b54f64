// # Gandi LiveDNS Provider
//
// This crate provides the Gandi LiveDNS (API v5) DnsProvider implementation
// for the Gandi DDNS client.
//
// ## Scope
//
// - ✅ Read one rrset: `GET {base}/domains/{domain}/records/{name}/{type}`
// - ✅ Replace one rrset: `PUT` on the same URL with
//   `{"rrset_values": [address], "rrset_ttl": ttl}`
// - ✅ API key (`X-Api-Key`) or personal access token (`Authorization: Bearer`)
// - ✅ Specific error handling for HTTP status codes (401/403, 404, 409, 429, 5xx)
// - ✅ Dry-run mode for safe testing
// - ✅ HTTP timeout configured
// - ❌ NO retry logic (the next invocation of the client is the retry)
// - ❌ NO caching (owned by the AddressCache)
// - ❌ NO record creation beyond what a PUT on the rrset implies, no listing,
//   no deletion
//
// ## Security
//
// The credential is never logged and never appears in error messages or
// `Debug` output.

use async_trait::async_trait;
use gandi_ddns_core::config::{Credential, ProviderConfig};
use gandi_ddns_core::traits::{DnsProvider, RecordMetadata, UpdateResult};
use gandi_ddns_core::{Error, RecordTarget, Result};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::time::Duration;

/// Provider name used in logs and errors
const PROVIDER_NAME: &str = "livedns";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// rrset as returned by the record endpoint
#[derive(Debug, Deserialize)]
struct RrsetResponse {
    #[serde(default)]
    rrset_name: Option<String>,
    #[serde(default)]
    rrset_ttl: Option<u32>,
    #[serde(default)]
    rrset_values: Vec<String>,
}

/// Body of the rrset replace request
#[derive(Debug, Serialize)]
struct RrsetUpdate {
    rrset_values: Vec<String>,
    rrset_ttl: u32,
}

/// Gandi LiveDNS provider
///
/// Stateless and single-shot: each trait method performs exactly one API
/// call (or none, for a dry-run update).
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Perform GET requests normally
/// - Log the intended PUT request and payload
/// - **NOT** modify the record
pub struct LiveDnsProvider {
    /// API root without trailing slash
    base_url: String,

    /// API credential
    /// ⚠️ NEVER log this value
    credential: Credential,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Dry-run mode: if true, perform GET requests but skip PUT updates
    dry_run: bool,
}

// Custom Debug implementation that hides the credential
impl std::fmt::Debug for LiveDnsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveDnsProvider")
            .field("base_url", &self.base_url)
            .field("credential", &self.credential.scheme())
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl LiveDnsProvider {
    /// Create a new LiveDNS provider
    ///
    /// # Parameters
    ///
    /// - `base_url`: API root, e.g. "https://dns.api.gandi.net/api/v5/"
    /// - `credential`: API key or personal access token
    /// - `timeout`: Per-request timeout
    /// - `dry_run`: If true, perform GET requests but skip PUT updates
    ///
    /// An empty credential is accepted with a warning; LiveDNS will reject
    /// every request made with it.
    pub fn new(
        base_url: impl Into<String>,
        credential: Credential,
        timeout: Duration,
        dry_run: bool,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        if credential.is_empty() {
            tracing::warn!("LiveDNS credential is empty; API requests will be rejected");
        }

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credential,
            client,
            dry_run,
        })
    }

    /// Create from the client configuration
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        let timeout = if config.timeout_secs == 0 {
            DEFAULT_HTTP_TIMEOUT
        } else {
            Duration::from_secs(config.timeout_secs)
        };

        if config.dry_run {
            tracing::warn!("LiveDNS provider running in DRY-RUN mode - no changes will be made");
        }

        Self::new(
            config.base_url.clone(),
            config.credential.clone(),
            timeout,
            config.dry_run,
        )
    }

    /// Whether updates are only logged
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// URL of the rrset identified by `target`
    pub fn record_url(&self, target: &RecordTarget) -> String {
        format!(
            "{}/domains/{}/records/{}/{}",
            self.base_url, target.domain, target.name, target.record_type
        )
    }

    /// Attach authentication and content-type headers
    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = request.header("Content-Type", "application/json");
        match &self.credential {
            Credential::ApiKey(key) => request.header("X-Api-Key", key),
            Credential::Bearer(token) => request.bearer_auth(token),
        }
    }

    /// Map a non-success response to an error
    async fn status_error(
        response: reqwest::Response,
        action: &str,
        target: &RecordTarget,
    ) -> Error {
        let status = response.status();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());

        match status.as_u16() {
            401 | 403 => Error::auth(format!(
                "Invalid API key/token or insufficient permissions. Status: {}",
                status
            )),
            404 => Error::not_found(target.to_string()),
            409 => Error::provider(
                PROVIDER_NAME,
                format!("Conflict while trying to {} {}. Status: {}", action, target, status),
            ),
            429 => Error::rate_limited(format!(
                "LiveDNS rate limit exceeded. Please retry later. Status: {}",
                status
            )),
            500..=599 => Error::provider(
                PROVIDER_NAME,
                format!("LiveDNS server error (transient): {} - {}", status, error_text),
            ),
            _ => Error::provider(
                PROVIDER_NAME,
                format!("Failed to {} {}: {} - {}", action, target, status, error_text),
            ),
        }
    }
}

#[async_trait]
impl DnsProvider for LiveDnsProvider {
    /// Read the rrset
    ///
    /// ```http
    /// GET /domains/example.com/records/@/A
    /// X-Api-Key: <key>
    /// ```
    async fn get_record(&self, target: &RecordTarget) -> Result<RecordMetadata> {
        let url = self.record_url(target);
        tracing::debug!("Reading {}", target);

        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|e| Error::http(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::status_error(response, "read", target).await);
        }

        let rrset: RrsetResponse = response
            .json()
            .await
            .map_err(|e| Error::provider(PROVIDER_NAME, format!("Failed to parse response: {}", e)))?;

        tracing::debug!("{} holds {:?}", target, rrset.rrset_values);
        Ok(RecordMetadata {
            name: rrset.rrset_name.unwrap_or_else(|| target.name.clone()),
            record_type: target.record_type,
            values: rrset.rrset_values,
            ttl: rrset.rrset_ttl,
        })
    }

    /// Replace the rrset with a single value
    ///
    /// ```http
    /// PUT /domains/example.com/records/@/A
    /// X-Api-Key: <key>
    /// Content-Type: application/json
    ///
    /// {"rrset_values": ["203.0.113.5"], "rrset_ttl": 300}
    /// ```
    async fn update_record(
        &self,
        target: &RecordTarget,
        new_ip: &IpAddr,
        ttl: u32,
    ) -> Result<UpdateResult> {
        let url = self.record_url(target);
        let payload = RrsetUpdate {
            rrset_values: vec![new_ip.to_string()],
            rrset_ttl: ttl,
        };

        tracing::info!(
            "{} {} -> {} (ttl {}) [mode: {}]",
            if self.dry_run { "Would update" } else { "Updating" },
            target,
            new_ip,
            ttl,
            if self.dry_run { "DRY-RUN" } else { "LIVE" }
        );

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send PUT request to {} with payload: {}",
                url,
                serde_json::to_string(&payload)?
            );
            return Ok(UpdateResult::DryRun { new_ip: *new_ip });
        }

        let response = self
            .authorize(self.client.put(&url))
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::http(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::status_error(response, "update", target).await);
        }

        tracing::info!("DNS record updated successfully: {} -> {}", target, new_ip);
        Ok(UpdateResult::Updated { new_ip: *new_ip })
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

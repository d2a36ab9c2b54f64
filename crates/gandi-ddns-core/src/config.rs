//! Configuration types for the DDNS client
//!
//! A [`DdnsConfig`] is built once at startup and handed to the
//! [`Reconciler`](crate::Reconciler). Nothing in the crate reads ambient
//! global state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::types::{Protocol, RecordTarget};

/// LiveDNS production API root
pub const DEFAULT_PROVIDER_URL: &str = "https://dns.api.gandi.net/api/v5/";

/// Address-echo service, `{protocol}` is replaced by `ipv4`/`ipv6`
pub const DEFAULT_ADDRESS_SOURCE_URL: &str = "https://{protocol}.icanhazip.com/";

/// Default cache directory
pub const DEFAULT_CACHE_DIR: &str = "/run";

pub const DEFAULT_RECORD_NAME: &str = "@";

pub const DEFAULT_TTL: u32 = 300;

/// Smallest TTL LiveDNS accepts
pub const MIN_TTL: u32 = 300;

/// Largest TTL LiveDNS accepts (30 days)
pub const MAX_TTL: u32 = 2_592_000;

/// Main DDNS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DdnsConfig {
    /// Target DNS zone
    pub domain: String,

    /// Record within the zone
    #[serde(default = "default_record_name")]
    pub record_name: String,

    /// TTL applied on update (seconds)
    #[serde(default = "default_ttl")]
    pub ttl: u32,

    /// Protocols to reconcile, in order
    #[serde(default = "default_protocols")]
    pub protocols: Vec<Protocol>,

    /// Read the live record when the cache has no entry
    ///
    /// With this disabled an empty cache is always treated as "changed".
    #[serde(default = "default_enabled")]
    pub record_fallback: bool,

    /// DNS provider configuration
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Address-echo service configuration
    #[serde(default)]
    pub address_source: AddressSourceConfig,

    /// Address cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
}

impl DdnsConfig {
    /// Create a configuration for `domain` with every other option defaulted
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            record_name: default_record_name(),
            ttl: default_ttl(),
            protocols: default_protocols(),
            record_fallback: true,
            provider: ProviderConfig::default(),
            address_source: AddressSourceConfig::default(),
            cache: CacheConfig::default(),
        }
    }

    /// Set the record name
    pub fn with_record_name(mut self, name: impl Into<String>) -> Self {
        self.record_name = name.into();
        self
    }

    /// Set the TTL
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the protocols to reconcile
    pub fn with_protocols(mut self, protocols: Vec<Protocol>) -> Self {
        self.protocols = protocols;
        self
    }

    /// Enable or disable the live-record fallback on cache miss
    pub fn with_record_fallback(mut self, enabled: bool) -> Self {
        self.record_fallback = enabled;
        self
    }

    /// Set the provider configuration
    pub fn with_provider(mut self, provider: ProviderConfig) -> Self {
        self.provider = provider;
        self
    }

    /// Set the address source configuration
    pub fn with_address_source(mut self, source: AddressSourceConfig) -> Self {
        self.address_source = source;
        self
    }

    /// Set the cache configuration
    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    /// The rrset reconciled for `protocol`
    pub fn target(&self, protocol: Protocol) -> RecordTarget {
        RecordTarget::new(&self.domain, &self.record_name, protocol.record_type())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.domain.trim().is_empty() {
            return Err(crate::Error::config(
                "GANDI_DOMAIN is required. Set it via: export GANDI_DOMAIN=example.com",
            ));
        }
        validate_domain_name(&self.domain)?;
        validate_record_name(&self.record_name)?;

        if !(MIN_TTL..=MAX_TTL).contains(&self.ttl) {
            return Err(crate::Error::config(format!(
                "Record TTL must be between {} and {} seconds. Got: {}",
                MIN_TTL, MAX_TTL, self.ttl
            )));
        }

        if self.protocols.is_empty() {
            return Err(crate::Error::config(
                "At least one protocol (ipv4, ipv6) must be configured",
            ));
        }
        for (i, protocol) in self.protocols.iter().enumerate() {
            if self.protocols[..i].contains(protocol) {
                return Err(crate::Error::config(format!(
                    "Protocol {} is listed more than once",
                    protocol
                )));
            }
        }

        self.provider.validate()?;
        self.address_source.validate()?;
        self.cache.validate()?;

        Ok(())
    }
}

fn validate_http_url(name: &str, url: &str) -> Result<(), crate::Error> {
    if url.is_empty() {
        return Err(crate::Error::config(format!("{} cannot be empty", name)));
    }
    if !url.starts_with("https://") && !url.starts_with("http://") {
        return Err(crate::Error::config(format!(
            "{} must use HTTP or HTTPS scheme. Got: {}",
            name, url
        )));
    }
    Ok(())
}

/// Basic RFC 1035 domain name validation
fn validate_domain_name(domain: &str) -> Result<(), crate::Error> {
    if domain.len() > 253 {
        return Err(crate::Error::config(format!(
            "Domain name too long: {} chars (max 253). Got: {}",
            domain.len(),
            domain
        )));
    }

    for label in domain.trim_end_matches('.').split('.') {
        validate_label(domain, label, false)?;
    }
    Ok(())
}

/// Record names are relative to the zone: "@" for the apex, otherwise one
/// or more labels, the first of which may be a wildcard
fn validate_record_name(name: &str) -> Result<(), crate::Error> {
    if name.is_empty() {
        return Err(crate::Error::config("Record name cannot be empty"));
    }
    if name == "@" {
        return Ok(());
    }
    for (i, label) in name.split('.').enumerate() {
        validate_label(name, label, i == 0)?;
    }
    Ok(())
}

fn validate_label(name: &str, label: &str, allow_wildcard: bool) -> Result<(), crate::Error> {
    if label.is_empty() {
        return Err(crate::Error::config(format!(
            "Name has empty label: '{}'",
            name
        )));
    }
    if allow_wildcard && label == "*" {
        return Ok(());
    }
    if label.len() > 63 {
        return Err(crate::Error::config(format!(
            "Label too long: {} chars (max 63). Label: '{}'",
            label.len(),
            label
        )));
    }
    if !label
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(crate::Error::config(format!(
            "Label contains invalid characters. Label: '{}'. \
            Valid: alphanumeric, hyphen and underscore only.",
            label
        )));
    }
    if label.starts_with('-') || label.ends_with('-') {
        return Err(crate::Error::config(format!(
            "Label cannot start or end with hyphen. Label: '{}'",
            label
        )));
    }
    Ok(())
}

/// Credential presented to the DNS provider
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Credential {
    /// Legacy API key, sent as `X-Api-Key`
    ApiKey(String),
    /// Personal access token, sent as `Authorization: Bearer`
    Bearer(String),
}

impl Credential {
    pub fn is_empty(&self) -> bool {
        match self {
            Credential::ApiKey(secret) | Credential::Bearer(secret) => secret.is_empty(),
        }
    }

    /// Scheme name, safe to log
    pub fn scheme(&self) -> &'static str {
        match self {
            Credential::ApiKey(_) => "api-key",
            Credential::Bearer(_) => "bearer",
        }
    }
}

impl Default for Credential {
    fn default() -> Self {
        Credential::ApiKey(String::new())
    }
}

// Never print the secret
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redacted = if self.is_empty() { "<EMPTY>" } else { "<REDACTED>" };
        match self {
            Credential::ApiKey(_) => f.debug_tuple("ApiKey").field(&redacted).finish(),
            Credential::Bearer(_) => f.debug_tuple("Bearer").field(&redacted).finish(),
        }
    }
}

/// DNS provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API root, e.g. "https://dns.api.gandi.net/api/v5/"
    #[serde(default = "default_provider_url")]
    pub base_url: String,

    /// Authentication credential
    ///
    /// An empty credential is accepted; update calls will be rejected by the
    /// provider.
    #[serde(default)]
    pub credential: Credential,

    /// Perform reads but only log the update request
    #[serde(default)]
    pub dry_run: bool,

    /// Per-request timeout (seconds)
    #[serde(default = "default_provider_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        validate_http_url("Provider base URL", &self.base_url)?;
        if self.timeout_secs == 0 {
            return Err(crate::Error::config("Provider timeout must be > 0"));
        }
        Ok(())
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_provider_url(),
            credential: Credential::default(),
            dry_run: false,
            timeout_secs: default_provider_timeout_secs(),
        }
    }
}

/// Address-echo service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressSourceConfig {
    /// URL template; `{protocol}` expands to `ipv4` or `ipv6`
    #[serde(default = "default_address_source_url")]
    pub url_template: String,

    /// Per-request timeout (seconds)
    #[serde(default = "default_address_source_timeout_secs")]
    pub timeout_secs: u64,
}

impl AddressSourceConfig {
    /// URL queried for `protocol`
    pub fn url_for(&self, protocol: Protocol) -> String {
        self.url_template.replace("{protocol}", protocol.as_str())
    }

    /// Validate the address source configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        validate_http_url("Address source URL", &self.url_template)?;
        if self.timeout_secs == 0 {
            return Err(crate::Error::config("Address source timeout must be > 0"));
        }
        Ok(())
    }
}

impl Default for AddressSourceConfig {
    fn default() -> Self {
        Self {
            url_template: default_address_source_url(),
            timeout_secs: default_address_source_timeout_secs(),
        }
    }
}

/// Address cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CacheConfig {
    /// One file per protocol
    File {
        /// Directory holding `{protocol}.last` files
        dir: PathBuf,
        /// Explicit path for the ipv4 entry
        #[serde(default)]
        ipv4_path: Option<PathBuf>,
        /// Explicit path for the ipv6 entry
        #[serde(default)]
        ipv6_path: Option<PathBuf>,
    },

    /// Process-local only; every run consults the live record
    Memory,
}

impl CacheConfig {
    /// File cache rooted at `dir`
    pub fn file(dir: impl Into<PathBuf>) -> Self {
        CacheConfig::File {
            dir: dir.into(),
            ipv4_path: None,
            ipv6_path: None,
        }
    }

    /// Validate the cache configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            CacheConfig::File {
                dir,
                ipv4_path,
                ipv6_path,
            } => {
                let empty = |p: &Option<PathBuf>| p.as_ref().is_some_and(|p| p.as_os_str().is_empty());
                if dir.as_os_str().is_empty() && (ipv4_path.is_none() || ipv6_path.is_none()) {
                    return Err(crate::Error::config("Cache directory cannot be empty"));
                }
                if empty(ipv4_path) || empty(ipv6_path) {
                    return Err(crate::Error::config("Cache file path cannot be empty"));
                }
                Ok(())
            }
            CacheConfig::Memory => Ok(()),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig::file(DEFAULT_CACHE_DIR)
    }
}

fn default_record_name() -> String {
    DEFAULT_RECORD_NAME.to_string()
}

fn default_ttl() -> u32 {
    DEFAULT_TTL
}

fn default_protocols() -> Vec<Protocol> {
    Protocol::ALL.to_vec()
}

fn default_enabled() -> bool {
    true
}

fn default_provider_url() -> String {
    DEFAULT_PROVIDER_URL.to_string()
}

fn default_provider_timeout_secs() -> u64 {
    30
}

fn default_address_source_url() -> String {
    DEFAULT_ADDRESS_SOURCE_URL.to_string()
}

fn default_address_source_timeout_secs() -> u64 {
    10
}

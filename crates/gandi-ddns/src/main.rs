// # gandi-ddns - One-shot DDNS client
//
// This binary is a THIN integration layer:
// - It reads configuration from environment variables
// - It initializes logging and the runtime
// - It wires the address source, the LiveDNS provider and the address cache
// - It runs one reconciliation pass and exits
//
// All reconciliation logic lives in gandi-ddns-core. There is no loop and
// no retry here; periodic execution belongs to cron or a systemd timer.
//
// ## Configuration
//
// ### Record
// - `GANDI_DOMAIN`: Zone to update (required)
// - `GANDI_RECORD`: Record name within the zone (default `@`)
// - `GANDI_TTL`: TTL applied on update, in seconds (default 300)
// - `GANDI_PROTOCOLS`: Comma-separated protocols (default `ipv4,ipv6`)
//
// ### LiveDNS
// - `GANDI_URL`: API root (default `https://dns.api.gandi.net/api/v5/`)
// - `GANDI_KEY`: API key, sent as `X-Api-Key`
// - `GANDI_PAT`: Personal access token, sent as a bearer token (wins over `GANDI_KEY`)
//
// ### Address cache
// - `DDNS_CACHE_TYPE`: `file` (default) or `memory`
// - `CACHE_DIR`: Directory of `{protocol}.last` files (default `/run`)
// - `CACHE_KEY_IPV4` / `CACHE_KEY_IPV6`: Explicit per-protocol cache files
// - `DDNS_RECORD_FALLBACK`: Read the live record on a cache miss (default `true`)
//
// ### Misc
// - `DDNS_IP_SOURCE_URL`: Address-echo URL, `{protocol}` expands to `ipv4`/`ipv6`
// - `DDNS_MODE`: `live` (default) or `dry-run`
// - `DDNS_LOG_LEVEL`: trace, debug, info, warn, error (default `info`)
//
// ## Output
//
// One status line per protocol on stdout. Logs go to stderr.
//
// ## Example
//
// ```bash
// export GANDI_DOMAIN=example.com
// export GANDI_KEY=your_key
// export CACHE_DIR=/var/lib/gandi-ddns
//
// gandi-ddns
// ```

use anyhow::{Context, Result};
use gandi_ddns_core::config::{
    AddressSourceConfig, CacheConfig, Credential, DEFAULT_CACHE_DIR, ProviderConfig,
};
use gandi_ddns_core::{DdnsConfig, Protocol, Reconciler, RunReport, cache};
use gandi_ddns_ip_http::HttpAddressSource;
use gandi_ddns_provider_livedns::LiveDnsProvider;
use std::env;
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for the possible run results
///
/// - 0: Every protocol reconciled, or at least one address was fetched
/// - 1: Configuration error, nothing was contacted
/// - 2: The current address could not be fetched for any protocol
/// - 3: Setup or runtime error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DdnsExitCode {
    /// Run completed (possibly with per-protocol failures)
    Success = 0,
    /// Configuration error
    ConfigError = 1,
    /// No current address for any protocol
    AllFetchesFailed = 2,
    /// Setup or runtime failure
    RuntimeError = 3,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

impl DdnsExitCode {
    fn for_report(report: &RunReport) -> Self {
        if report.all_fetches_failed() {
            DdnsExitCode::AllFetchesFailed
        } else {
            DdnsExitCode::Success
        }
    }
}

/// Application configuration
#[derive(Debug)]
struct Config {
    ddns: DdnsConfig,
    log_level: Level,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Load configuration through `lookup`
    ///
    /// Empty values are treated as unset.
    fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let domain = var("GANDI_DOMAIN").unwrap_or_default();
        let mut ddns = DdnsConfig::new(domain);

        if let Some(record) = var("GANDI_RECORD") {
            ddns = ddns.with_record_name(record);
        }

        if let Some(ttl) = var("GANDI_TTL") {
            let ttl = ttl
                .parse::<u32>()
                .with_context(|| format!("GANDI_TTL must be a number of seconds. Got: {}", ttl))?;
            ddns = ddns.with_ttl(ttl);
        }

        if let Some(list) = var("GANDI_PROTOCOLS") {
            let protocols = list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::parse::<Protocol>)
                .collect::<Result<Vec<_>, _>>()
                .context("GANDI_PROTOCOLS is invalid")?;
            ddns = ddns.with_protocols(protocols);
        }

        if let Some(flag) = var("DDNS_RECORD_FALLBACK") {
            ddns = ddns.with_record_fallback(parse_bool("DDNS_RECORD_FALLBACK", &flag)?);
        }

        let dry_run = match var("DDNS_MODE").as_deref() {
            None | Some("live") => false,
            Some("dry-run") => true,
            Some(other) => anyhow::bail!(
                "DDNS_MODE '{}' is not valid. Valid modes: live, dry-run",
                other
            ),
        };

        // GANDI_PAT wins over GANDI_KEY
        let credential = match (var("GANDI_PAT"), var("GANDI_KEY")) {
            (Some(token), _) => Credential::Bearer(token),
            (None, Some(key)) => Credential::ApiKey(key),
            (None, None) => Credential::default(),
        };
        let defaults = ProviderConfig::default();
        ddns = ddns.with_provider(ProviderConfig {
            base_url: var("GANDI_URL").unwrap_or(defaults.base_url),
            credential,
            dry_run,
            timeout_secs: defaults.timeout_secs,
        });

        if let Some(url) = var("DDNS_IP_SOURCE_URL") {
            ddns = ddns.with_address_source(AddressSourceConfig {
                url_template: url,
                ..AddressSourceConfig::default()
            });
        }

        let cache = match var("DDNS_CACHE_TYPE").as_deref() {
            None | Some("file") => CacheConfig::File {
                dir: var("CACHE_DIR")
                    .unwrap_or_else(|| DEFAULT_CACHE_DIR.to_string())
                    .into(),
                ipv4_path: var("CACHE_KEY_IPV4").map(Into::into),
                ipv6_path: var("CACHE_KEY_IPV6").map(Into::into),
            },
            Some("memory") => CacheConfig::Memory,
            Some(other) => anyhow::bail!(
                "DDNS_CACHE_TYPE '{}' is not supported. Supported types: file, memory",
                other
            ),
        };
        ddns = ddns.with_cache(cache);

        let log_level = match var("DDNS_LOG_LEVEL")
            .unwrap_or_else(|| "info".to_string())
            .to_lowercase()
            .as_str()
        {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            other => anyhow::bail!(
                "DDNS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                other
            ),
        };

        ddns.validate()?;

        Ok(Self { ddns, log_level })
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => anyhow::bail!("{} must be true or false. Got: {}", name, value),
    }
}

fn main() -> ExitCode {
    // Load and validate configuration before anything else
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    // Logs go to stderr; stdout carries the status lines
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::RuntimeError.into();
    }

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    let code = rt.block_on(async {
        match run(config.ddns).await {
            Ok(report) => {
                for outcome in &report.outcomes {
                    println!("{}", outcome);
                }
                DdnsExitCode::for_report(&report)
            }
            Err(e) => {
                error!("Run failed: {:#}", e);
                DdnsExitCode::RuntimeError
            }
        }
    });

    code.into()
}

/// Wire the collaborators and run one reconciliation pass
async fn run(config: DdnsConfig) -> Result<RunReport> {
    info!(
        "Reconciling {} for {} ({})",
        config.record_name,
        config.domain,
        config
            .protocols
            .iter()
            .map(Protocol::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    );

    let source = HttpAddressSource::from_config(&config.address_source)
        .context("Failed to create address source")?;
    let provider =
        LiveDnsProvider::from_config(&config.provider).context("Failed to create LiveDNS provider")?;
    let address_cache = cache::from_config(&config.cache);

    let reconciler = Reconciler::new(Box::new(source), Box::new(provider), address_cache, config)
        .context("Failed to create reconciler")?;

    let report = reconciler.run().await;
    info!(
        "Run complete: {} updated, {} failed",
        report.updated_count(),
        report.failure_count()
    );
    Ok(report)
}

//! Record reconciler
//!
//! The Reconciler decides, per protocol, whether the published DNS record
//! must change and performs the change exactly when needed:
//! - Fetching the current public address via AddressSource
//! - Determining the last published address (cache, then live record)
//! - Updating the record via DnsProvider when the two differ
//! - Refreshing the cache after a successful update
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐
//! │ AddressSource │─── current address ───┐
//! └───────────────┘                       │
//!                                         ▼
//!                                 ┌──────────────┐
//!                                 │  Reconciler  │
//!                                 └──────────────┘
//!                                         │
//!             ┌───────────────────────────┼──────────────────────────┐
//!             │                           │                          │
//!             ▼                           ▼                          ▼
//!     ┌──────────────┐           ┌──────────────┐           ┌──────────────┐
//!     │ AddressCache │           │ DnsProvider  │           │   Outcome    │
//!     │ (hint)       │           │ (read/write) │           │  (report)    │
//!     └──────────────┘           └──────────────┘           └──────────────┘
//! ```
//!
//! ## Flow (per protocol)
//!
//! 1. Fetch current address; unavailable ⇒ report and stop
//! 2. Previous = cache entry, or the live record on cache miss
//! 3. Unchanged ⇒ report and stop (no provider call, no cache write)
//! 4. Changed ⇒ replace the record; on success write the cache
//!
//! Every failure is converted into a [`ReconcileOutcome`] at the protocol
//! boundary. Nothing is retried here; the next invocation of the client is
//! the retry.

use std::fmt;
use std::net::IpAddr;

use crate::config::DdnsConfig;
use crate::error::{Error, Result};
use crate::traits::{AddressCache, AddressSource, DnsProvider, UpdateResult};
use crate::types::{Protocol, RecordTarget, RecordType, UpdateDecision};
use tracing::{debug, error, info, warn};

/// Result of reconciling one protocol
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The current address could not be determined
    FetchFailed {
        protocol: Protocol,
        error: String,
    },

    /// The published address already matches
    Unchanged {
        target: RecordTarget,
        address: IpAddr,
    },

    /// The record was replaced with the current address
    Updated {
        target: RecordTarget,
        address: IpAddr,
        previous: Option<IpAddr>,
        /// The provider only logged the request
        dry_run: bool,
        /// Set when the record changed but the cache could not be written
        cache_error: Option<String>,
    },

    /// The provider rejected or never received the update
    UpdateFailed {
        target: RecordTarget,
        address: IpAddr,
        error: String,
    },
}

impl ReconcileOutcome {
    /// Protocol this outcome belongs to
    pub fn protocol(&self) -> Protocol {
        match self {
            ReconcileOutcome::FetchFailed { protocol, .. } => *protocol,
            ReconcileOutcome::Unchanged { target, .. }
            | ReconcileOutcome::Updated { target, .. }
            | ReconcileOutcome::UpdateFailed { target, .. } => match target.record_type {
                RecordType::A => Protocol::V4,
                RecordType::Aaaa => Protocol::V6,
            },
        }
    }

    /// Whether this outcome represents a failure of any kind
    pub fn is_failure(&self) -> bool {
        match self {
            ReconcileOutcome::FetchFailed { .. } | ReconcileOutcome::UpdateFailed { .. } => true,
            ReconcileOutcome::Updated { cache_error, .. } => cache_error.is_some(),
            ReconcileOutcome::Unchanged { .. } => false,
        }
    }
}

/// Human-readable status line
impl fmt::Display for ReconcileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileOutcome::FetchFailed { protocol, error } => {
                write!(f, "Unable to fetch current address for {}: {}", protocol, error)
            }
            ReconcileOutcome::Unchanged { target, address } => write!(
                f,
                "No change in external IP ({}), not updating {} record",
                address, target.record_type
            ),
            ReconcileOutcome::Updated {
                target,
                address,
                dry_run,
                cache_error,
                ..
            } => {
                if *dry_run {
                    write!(
                        f,
                        "[dry-run] Would set IP to {} for {} record '{}' for {}",
                        address, target.record_type, target.name, target.domain
                    )?;
                } else {
                    write!(
                        f,
                        "Set IP to {} for {} record '{}' for {}",
                        address, target.record_type, target.name, target.domain
                    )?;
                }
                if let Some(e) = cache_error {
                    write!(f, " (address cache not updated: {})", e)?;
                }
                Ok(())
            }
            ReconcileOutcome::UpdateFailed { error, .. } => f.write_str(error),
        }
    }
}

/// Outcomes of one pass over the configured protocols, in order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub outcomes: Vec<ReconcileOutcome>,
}

impl RunReport {
    /// True when every protocol failed at the address fetch step
    pub fn all_fetches_failed(&self) -> bool {
        !self.outcomes.is_empty()
            && self
                .outcomes
                .iter()
                .all(|o| matches!(o, ReconcileOutcome::FetchFailed { .. }))
    }

    /// Number of records that were (or would have been) replaced
    pub fn updated_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, ReconcileOutcome::Updated { .. }))
            .count()
    }

    /// Number of outcomes that represent a failure
    pub fn failure_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failure()).count()
    }
}

/// Record reconciler
///
/// Holds the immutable configuration and the three collaborators. A
/// reconciler is built once per invocation and driven with [`run`] (all
/// configured protocols) or [`reconcile`] (one protocol).
///
/// ## Lifecycle
///
/// 1. Create with [`Reconciler::new()`] (validates the configuration)
/// 2. Call [`Reconciler::run()`]
/// 3. Report the outcomes and exit
///
/// ## Concurrency
///
/// Protocols are reconciled one after another in configuration order; no
/// two operations are ever in flight at the same time.
///
/// [`run`]: Reconciler::run
/// [`reconcile`]: Reconciler::reconcile
pub struct Reconciler {
    /// Observes the current public address
    source: Box<dyn AddressSource>,

    /// Reads and replaces the published record
    provider: Box<dyn DnsProvider>,

    /// Last published address per protocol
    cache: Box<dyn AddressCache>,

    config: DdnsConfig,
}

impl Reconciler {
    /// Create a new reconciler
    ///
    /// # Parameters
    ///
    /// - `source`: Address source implementation
    /// - `provider`: DNS provider implementation
    /// - `cache`: Address cache implementation
    /// - `config`: Client configuration
    ///
    /// # Returns
    ///
    /// `Err(Error::Config)` if the configuration is invalid. No collaborator
    /// is called in that case.
    pub fn new(
        source: Box<dyn AddressSource>,
        provider: Box<dyn DnsProvider>,
        cache: Box<dyn AddressCache>,
        config: DdnsConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            source,
            provider,
            cache,
            config,
        })
    }

    /// Reconcile every configured protocol, in order
    ///
    /// A failure for one protocol never prevents the next from running.
    pub async fn run(&self) -> RunReport {
        info!(
            "Reconciling {} protocol(s) for '{}' in {} (source={}, provider={}, cache={})",
            self.config.protocols.len(),
            self.config.record_name,
            self.config.domain,
            self.source.source_name(),
            self.provider.provider_name(),
            self.cache.cache_name()
        );

        let mut report = RunReport::default();
        for protocol in &self.config.protocols {
            let outcome = self.reconcile(*protocol).await;
            report.outcomes.push(outcome);
        }

        debug!(
            "Run finished: {} updated, {} failed",
            report.updated_count(),
            report.failure_count()
        );
        report
    }

    /// Reconcile a single protocol
    pub async fn reconcile(&self, protocol: Protocol) -> ReconcileOutcome {
        let target = self.config.target(protocol);

        let current = match self.fetch_current(protocol).await {
            Ok(ip) => ip,
            Err(e) => {
                warn!("Unable to fetch current {} address: {}", protocol, e);
                return ReconcileOutcome::FetchFailed {
                    protocol,
                    error: e.detail(),
                };
            }
        };
        debug!("Current {} address: {}", protocol, current);

        let previous = self.previous_address(protocol, &target).await;
        let decision = UpdateDecision::decide(current, previous);

        if !decision.changed {
            info!("No change in {} address ({}), not updating {}", protocol, current, target);
            return ReconcileOutcome::Unchanged {
                target,
                address: current,
            };
        }

        info!(
            "{} address changed: {} -> {}",
            protocol,
            decision
                .previous
                .map(|ip| ip.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            current
        );

        self.apply(protocol, target, decision).await
    }

    /// Fetch the current address and enforce its family
    async fn fetch_current(&self, protocol: Protocol) -> Result<IpAddr> {
        let ip = self.source.current(protocol).await?;
        if !protocol.matches(&ip) {
            return Err(Error::fetch(format!(
                "{} returned {} which is not an {} address",
                self.source.source_name(),
                ip,
                protocol
            )));
        }
        Ok(ip)
    }

    /// Determine the last published address
    ///
    /// The cache is consulted first. On a miss (or an unusable entry) the
    /// live record is read, if enabled, and written back to the cache unless
    /// the provider runs in dry-run mode. Any
    /// failure along the way yields `None`, so a concrete current address
    /// compares as changed.
    async fn previous_address(&self, protocol: Protocol, target: &RecordTarget) -> Option<IpAddr> {
        let key = protocol.as_str();

        match self.cache.get(key).await {
            Ok(Some(value)) => match protocol.parse_address(&value) {
                Some(ip) => {
                    debug!("Cached {} address: {}", protocol, ip);
                    return Some(ip);
                }
                None => {
                    warn!("Ignoring unusable cached {} value '{}'", protocol, value);
                }
            },
            Ok(None) => {
                debug!("No cached {} address", protocol);
            }
            Err(e) => {
                warn!("Failed to read cached {} address: {}", protocol, e);
            }
        }

        if !self.config.record_fallback {
            debug!("Live record fallback disabled, treating {} as changed", protocol);
            return None;
        }

        match self.read_live_record(protocol, target).await {
            Ok(ip) => {
                debug!("Live {} holds {}", target, ip);
                if self.config.provider.dry_run {
                    debug!("Dry-run, not refreshing cached {} address", protocol);
                } else if let Err(e) = self.cache.set(key, &ip.to_string()).await {
                    warn!("Failed to refresh cached {} address: {}", protocol, e);
                }
                Some(ip)
            }
            Err(e) => {
                warn!("{}; treating previous {} address as unavailable", e, protocol);
                None
            }
        }
    }

    /// Read the record's current value from the provider
    async fn read_live_record(&self, protocol: Protocol, target: &RecordTarget) -> Result<IpAddr> {
        let record = self
            .provider
            .get_record(target)
            .await
            .map_err(|e| Error::record_read(format!("{}: {}", target, e)))?;

        let value = record
            .current_value()
            .ok_or_else(|| Error::record_read(format!("{} has no values", target)))?;

        protocol.parse_address(value).ok_or_else(|| {
            Error::record_read(format!("{} holds unusable value '{}'", target, value))
        })
    }

    /// Push the new address and refresh the cache on success
    async fn apply(
        &self,
        protocol: Protocol,
        target: RecordTarget,
        decision: UpdateDecision,
    ) -> ReconcileOutcome {
        let address = decision.address;

        let result = match self
            .provider
            .update_record(&target, &address, self.config.ttl)
            .await
            .map_err(|e| Error::record_write(format!("{}: {}", target, e)))
        {
            Ok(result) => result,
            Err(e) => {
                error!("{}", e);
                return ReconcileOutcome::UpdateFailed {
                    target,
                    address,
                    error: e.to_string(),
                };
            }
        };

        let dry_run = matches!(result, UpdateResult::DryRun { .. });

        // Dry-run published nothing; the cache keeps its previous value
        let cache_error = if dry_run {
            None
        } else {
            match self.cache.set(protocol.as_str(), &address.to_string()).await {
                Ok(()) => None,
                Err(e) => {
                    error!("Updated {} but failed to write address cache: {}", target, e);
                    Some(e.to_string())
                }
            }
        };

        info!("Set {} to {}", target, result.new_ip());
        ReconcileOutcome::Updated {
            target,
            address,
            previous: decision.previous,
            dry_run,
            cache_error,
        }
    }
}

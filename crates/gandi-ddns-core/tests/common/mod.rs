//! Test doubles and common utilities for reconciliation contract tests
//!
//! This module provides scripted collaborators that count every call, so
//! tests can assert not only on outcomes but on which side effects did or
//! did not happen.

#![allow(dead_code)]

use gandi_ddns_core::error::{Error, Result};
use gandi_ddns_core::traits::{
    AddressCache, AddressSource, DnsProvider, RecordMetadata, UpdateResult,
};
use gandi_ddns_core::{
    DdnsConfig, MemoryAddressCache, Protocol, ProviderConfig, RecordTarget, RecordType,
};
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const DOMAIN: &str = "example.com";

pub fn ip(text: &str) -> IpAddr {
    text.parse().expect("valid test address")
}

/// Configuration for `example.com` with only the given protocols
pub fn config_for(protocols: &[Protocol]) -> DdnsConfig {
    DdnsConfig::new(DOMAIN).with_protocols(protocols.to_vec())
}

/// Same as [`config_for`] with the provider in dry-run mode
pub fn dry_run_config_for(protocols: &[Protocol]) -> DdnsConfig {
    config_for(protocols).with_provider(ProviderConfig {
        dry_run: true,
        ..ProviderConfig::default()
    })
}

/// An AddressSource returning a scripted answer per protocol
#[derive(Clone, Default)]
pub struct ScriptedAddressSource {
    answers: Arc<Mutex<HashMap<Protocol, std::result::Result<IpAddr, String>>>>,
    calls: Arc<Mutex<Vec<Protocol>>>,
}

impl ScriptedAddressSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `protocol` with `address`
    pub fn with_address(self, protocol: Protocol, address: &str) -> Self {
        self.answers
            .lock()
            .unwrap()
            .insert(protocol, Ok(ip(address)));
        self
    }

    /// Fail `protocol` with `message`
    pub fn with_failure(self, protocol: Protocol, message: &str) -> Self {
        self.answers
            .lock()
            .unwrap()
            .insert(protocol, Err(message.to_string()));
        self
    }

    /// Protocols queried, in order
    pub fn calls(&self) -> Vec<Protocol> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl AddressSource for ScriptedAddressSource {
    async fn current(&self, protocol: Protocol) -> Result<IpAddr> {
        self.calls.lock().unwrap().push(protocol);
        match self.answers.lock().unwrap().get(&protocol) {
            Some(Ok(ip)) => Ok(*ip),
            Some(Err(message)) => Err(Error::fetch(message.clone())),
            None => Err(Error::fetch("no scripted answer")),
        }
    }

    fn source_name(&self) -> &'static str {
        "scripted"
    }
}

/// One recorded update call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedUpdate {
    pub target: RecordTarget,
    pub value: IpAddr,
    pub ttl: u32,
}

/// A mock DnsProvider holding records in memory and tracking calls
#[derive(Clone, Default)]
pub struct MockDnsProvider {
    records: Arc<Mutex<HashMap<RecordType, Vec<String>>>>,
    get_call_count: Arc<AtomicUsize>,
    update_call_count: Arc<AtomicUsize>,
    updates: Arc<Mutex<Vec<RecordedUpdate>>>,
    fail_reads: Arc<Mutex<bool>>,
    fail_updates: Arc<Mutex<bool>>,
    dry_run: bool,
}

impl MockDnsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `value` as the live record of `record_type`
    pub fn with_record(self, record_type: RecordType, value: &str) -> Self {
        self.records
            .lock()
            .unwrap()
            .insert(record_type, vec![value.to_string()]);
        self
    }

    /// Make every get_record() call fail
    pub fn failing_reads(self) -> Self {
        *self.fail_reads.lock().unwrap() = true;
        self
    }

    /// Make every update_record() call fail
    pub fn failing_updates(self) -> Self {
        *self.fail_updates.lock().unwrap() = true;
        self
    }

    /// Report updates as dry-run instead of applying them
    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    /// Get the number of times get_record() was called
    pub fn get_call_count(&self) -> usize {
        self.get_call_count.load(Ordering::SeqCst)
    }

    /// Get the number of times update_record() was called
    pub fn update_call_count(&self) -> usize {
        self.update_call_count.load(Ordering::SeqCst)
    }

    /// Get the recorded update calls
    pub fn updates(&self) -> Vec<RecordedUpdate> {
        self.updates.lock().unwrap().clone()
    }

    /// Current value set of the live record
    pub fn live_values(&self, record_type: RecordType) -> Option<Vec<String>> {
        self.records.lock().unwrap().get(&record_type).cloned()
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn get_record(&self, target: &RecordTarget) -> Result<RecordMetadata> {
        self.get_call_count.fetch_add(1, Ordering::SeqCst);
        if *self.fail_reads.lock().unwrap() {
            return Err(Error::http("connection reset"));
        }

        let values = self
            .records
            .lock()
            .unwrap()
            .get(&target.record_type)
            .cloned()
            .ok_or_else(|| Error::not_found(target.to_string()))?;

        Ok(RecordMetadata {
            name: target.name.clone(),
            record_type: target.record_type,
            values,
            ttl: Some(300),
        })
    }

    async fn update_record(
        &self,
        target: &RecordTarget,
        new_ip: &IpAddr,
        ttl: u32,
    ) -> Result<UpdateResult> {
        self.update_call_count.fetch_add(1, Ordering::SeqCst);
        self.updates.lock().unwrap().push(RecordedUpdate {
            target: target.clone(),
            value: *new_ip,
            ttl,
        });

        if *self.fail_updates.lock().unwrap() {
            return Err(Error::auth("Invalid API key"));
        }

        if self.dry_run {
            return Ok(UpdateResult::DryRun { new_ip: *new_ip });
        }

        self.records
            .lock()
            .unwrap()
            .insert(target.record_type, vec![new_ip.to_string()]);
        Ok(UpdateResult::Updated { new_ip: *new_ip })
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// A MemoryAddressCache wrapper that counts calls
#[derive(Clone, Default)]
pub struct CountingCache {
    inner: MemoryAddressCache,
    get_call_count: Arc<AtomicUsize>,
    set_call_count: Arc<AtomicUsize>,
    fail_sets: Arc<Mutex<bool>>,
}

impl CountingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate an entry without counting it
    pub async fn seeded(self, key: &str, value: &str) -> Self {
        self.inner.set(key, value).await.expect("memory set");
        self
    }

    /// Make every set() call fail
    pub fn failing_sets(self) -> Self {
        *self.fail_sets.lock().unwrap() = true;
        self
    }

    /// Get the number of times get() was called
    pub fn get_call_count(&self) -> usize {
        self.get_call_count.load(Ordering::SeqCst)
    }

    /// Get the number of times set() was called
    pub fn set_call_count(&self) -> usize {
        self.set_call_count.load(Ordering::SeqCst)
    }

    /// Read an entry without counting it
    pub async fn peek(&self, key: &str) -> Option<String> {
        self.inner.get(key).await.expect("memory get")
    }
}

#[async_trait::async_trait]
impl AddressCache for CountingCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.get_call_count.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.set_call_count.fetch_add(1, Ordering::SeqCst);
        if *self.fail_sets.lock().unwrap() {
            return Err(Error::cache("read-only file system"));
        }
        self.inner.set(key, value).await
    }

    fn cache_name(&self) -> &'static str {
        "counting"
    }
}

//! Reconciliation Contract Test: Failure Isolation
//!
//! This test verifies that failures stay inside the protocol they belong
//! to and that configuration problems stop everything up front.
//!
//! Constraints verified:
//! - An unavailable current address causes no cache access and no provider call
//! - One protocol failing does not prevent the next from running
//! - Protocols run in configuration order
//! - Invalid configuration is rejected before any collaborator is called

mod common;

use common::*;
use gandi_ddns_core::{DdnsConfig, Protocol, ReconcileOutcome, Reconciler, RecordType};

#[tokio::test]
async fn fetch_failure_touches_nothing() {
    for protocol in Protocol::ALL {
        let source = ScriptedAddressSource::new().with_failure(protocol, "HTTP error: 503");
        let provider = MockDnsProvider::new().with_record(protocol.record_type(), "203.0.113.5");
        let cache = CountingCache::new();

        let reconciler = Reconciler::new(
            Box::new(source),
            Box::new(provider.clone()),
            Box::new(cache.clone()),
            config_for(&[protocol]),
        )
        .expect("reconciler construction succeeds");

        let outcome = reconciler.reconcile(protocol).await;

        assert!(
            matches!(outcome, ReconcileOutcome::FetchFailed { .. }),
            "got {outcome:?}"
        );
        assert_eq!(cache.get_call_count(), 0, "no cache read for {protocol}");
        assert_eq!(cache.set_call_count(), 0, "no cache write for {protocol}");
        assert_eq!(provider.get_call_count(), 0);
        assert_eq!(provider.update_call_count(), 0);
    }
}

#[tokio::test]
async fn fetch_failure_status_line_has_single_prefix() {
    let source = ScriptedAddressSource::new().with_failure(Protocol::V6, "HTTP 503");

    let reconciler = Reconciler::new(
        Box::new(source),
        Box::new(MockDnsProvider::new()),
        Box::new(CountingCache::new()),
        config_for(&[Protocol::V6]),
    )
    .expect("reconciler construction succeeds");

    let outcome = reconciler.reconcile(Protocol::V6).await;

    assert_eq!(
        outcome.to_string(),
        "Unable to fetch current address for ipv6: HTTP 503"
    );
}

#[tokio::test]
async fn wrong_family_from_source_is_unavailable() {
    // An echo service that answers the IPv6 query over IPv4
    let source = ScriptedAddressSource::new().with_address(Protocol::V6, "203.0.113.5");
    let provider = MockDnsProvider::new();
    let cache = CountingCache::new();

    let reconciler = Reconciler::new(
        Box::new(source),
        Box::new(provider.clone()),
        Box::new(cache.clone()),
        config_for(&[Protocol::V6]),
    )
    .expect("reconciler construction succeeds");

    let outcome = reconciler.reconcile(Protocol::V6).await;

    assert!(matches!(outcome, ReconcileOutcome::FetchFailed { .. }));
    assert_eq!(cache.get_call_count(), 0);
    assert_eq!(provider.update_call_count(), 0);
}

#[tokio::test]
async fn one_protocol_failing_does_not_block_the_other() {
    let source = ScriptedAddressSource::new()
        .with_failure(Protocol::V4, "timed out")
        .with_address(Protocol::V6, "2001:db8::9");
    let provider = MockDnsProvider::new().with_record(RecordType::Aaaa, "2001:db8::1");
    let cache = CountingCache::new();

    let reconciler = Reconciler::new(
        Box::new(source.clone()),
        Box::new(provider.clone()),
        Box::new(cache.clone()),
        config_for(&[Protocol::V4, Protocol::V6]),
    )
    .expect("reconciler construction succeeds");

    let report = reconciler.run().await;

    assert_eq!(report.outcomes.len(), 2);
    assert!(matches!(report.outcomes[0], ReconcileOutcome::FetchFailed { .. }));
    assert!(matches!(report.outcomes[1], ReconcileOutcome::Updated { .. }));
    assert!(!report.all_fetches_failed());
    assert_eq!(provider.update_call_count(), 1);
    assert_eq!(cache.peek("ipv4").await, None);
    assert_eq!(cache.peek("ipv6").await.as_deref(), Some("2001:db8::9"));
}

#[tokio::test]
async fn update_failure_does_not_block_the_other_protocol() {
    let source = ScriptedAddressSource::new()
        .with_address(Protocol::V4, "198.51.100.9")
        .with_address(Protocol::V6, "2001:db8::9");
    let provider = MockDnsProvider::new().failing_updates();
    let cache = CountingCache::new();

    let reconciler = Reconciler::new(
        Box::new(source.clone()),
        Box::new(provider.clone()),
        Box::new(cache),
        config_for(&[Protocol::V4, Protocol::V6]),
    )
    .expect("reconciler construction succeeds");

    let report = reconciler.run().await;

    assert_eq!(source.calls(), vec![Protocol::V4, Protocol::V6]);
    assert_eq!(provider.update_call_count(), 2);
    assert_eq!(report.failure_count(), 2);
    assert!(!report.all_fetches_failed());
}

#[tokio::test]
async fn protocols_run_in_configured_order() {
    let source = ScriptedAddressSource::new()
        .with_failure(Protocol::V4, "unreachable")
        .with_failure(Protocol::V6, "unreachable");

    let reconciler = Reconciler::new(
        Box::new(source.clone()),
        Box::new(MockDnsProvider::new()),
        Box::new(CountingCache::new()),
        config_for(&[Protocol::V6, Protocol::V4]),
    )
    .expect("reconciler construction succeeds");

    let report = reconciler.run().await;

    assert_eq!(source.calls(), vec![Protocol::V6, Protocol::V4]);
    assert_eq!(report.outcomes[0].protocol(), Protocol::V6);
    assert!(report.all_fetches_failed());
}

#[tokio::test]
async fn missing_domain_aborts_before_any_call() {
    let source = ScriptedAddressSource::new().with_address(Protocol::V4, "198.51.100.9");
    let provider = MockDnsProvider::new();
    let cache = CountingCache::new();

    let result = Reconciler::new(
        Box::new(source.clone()),
        Box::new(provider.clone()),
        Box::new(cache.clone()),
        DdnsConfig::new(""),
    );

    let err = result.err().expect("construction must fail");
    assert!(err.is_fatal());
    assert!(source.calls().is_empty());
    assert_eq!(provider.get_call_count(), 0);
    assert_eq!(provider.update_call_count(), 0);
    assert_eq!(cache.get_call_count(), 0);
}

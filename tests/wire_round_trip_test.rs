//! Integration tests for wire-parameter building and reconstruction.

use std::collections::HashMap;
use std::sync::Arc;

use clickhouse_settings::{
    ClientSettings, LayeredSource, RequestInterceptor, TotalsMode, WireParamsBuilder,
    WireParameterSet,
};

/// Building with defaults included and reconstructing from those pairs
/// yields field-for-field equality with the original.
#[test]
fn test_wire_parameters_round_trip_default_object() {
    let settings = ClientSettings::default();
    let wire = settings.build_wire_parameters(true);

    let pairs: HashMap<String, String> = wire
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let rebuilt = ClientSettings::from_source(&LayeredSource::from_map(pairs)).unwrap();
    assert_eq!(rebuilt, settings);
}

/// Same round trip with non-default values in play.
#[test]
fn test_wire_parameters_round_trip_modified_object() {
    let mut settings = ClientSettings::default();
    settings
        .set_max_memory_usage(10_000_000_000)
        .set_insert_quorum(2)
        .set_totals_mode(TotalsMode::BeforeHaving)
        .set_extremes(true);

    let wire = settings.build_wire_parameters(true);
    let pairs: HashMap<String, String> = wire
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let rebuilt = ClientSettings::from_source(&LayeredSource::from_map(pairs)).unwrap();

    assert_eq!(rebuilt.max_memory_usage(), 10_000_000_000);
    assert_eq!(rebuilt.insert_quorum(), 2);
    assert_eq!(rebuilt.totals_mode(), TotalsMode::BeforeHaving);
    assert!(rebuilt.extremes());
    assert_eq!(rebuilt, settings);
}

/// An explicitly set quorum timeout surfaces under its wire key as exact
/// decimal text.
#[test]
fn test_quorum_timeout_surfaces_as_decimal() {
    let mut settings = ClientSettings::default();
    settings.set_insert_quorum_timeout(1000);

    let wire = settings.build_wire_parameters(true);
    assert_eq!(wire.get("insert_quorum_timeout"), Some("1000"));
}

/// Booleans ride the wire as 1/0, enums as their canonical symbol.
#[test]
fn test_wire_serialization_per_kind() {
    let mut settings = ClientSettings::default();
    settings
        .set_extremes(true)
        .set_totals_mode(TotalsMode::AfterHavingInclusive)
        .set_priority(7)
        .set_profile("web");

    let wire = settings.build_wire_parameters(false);
    assert_eq!(wire.get("extremes"), Some("1"));
    assert_eq!(wire.get("totals_mode"), Some("after_having_inclusive"));
    assert_eq!(wire.get("priority"), Some("7"));
    assert_eq!(wire.get("profile"), Some("web"));
}

/// Skipping defaults keeps the request minimal: only deviating fields and
/// residuals are emitted.
#[test]
fn test_skip_defaults_emits_only_deviations() {
    let mut settings = ClientSettings::default();
    settings.set_max_rows_to_read(1_000_000);
    settings.set_raw("readonly", "2").unwrap();

    let wire = settings.build_wire_parameters(false);
    assert_eq!(wire.len(), 2);
    assert_eq!(wire.get("max_rows_to_read"), Some("1000000"));
    assert_eq!(wire.get("readonly"), Some("2"));
}

struct NoopInterceptor;

impl RequestInterceptor for NoopInterceptor {
    fn before_request(&self, _params: &mut WireParameterSet) {}
}

/// Attached hooks survive a settings clone with count and order intact,
/// and the builder leaves them alone.
#[test]
fn test_interceptors_survive_clone() {
    let mut settings = ClientSettings::default();
    settings.set_request_interceptors(vec![
        Arc::new(NoopInterceptor),
        Arc::new(NoopInterceptor),
        Arc::new(NoopInterceptor),
    ]);

    let copy = settings.clone();
    assert_eq!(copy.request_interceptors().len(), 3);
    assert_eq!(copy.response_interceptors().len(), 0);
    assert_eq!(settings.request_interceptors(), copy.request_interceptors());

    let _ = copy.build_wire_parameters(true);
    assert_eq!(copy.request_interceptors().len(), 3);
}

/// One-shot overrides apply to a single build only; neither the settings
/// object nor clones made afterwards observe them.
#[test]
fn test_one_shot_override_is_request_scoped() {
    let settings = ClientSettings::default();

    let wire = WireParamsBuilder::new(&settings)
        .override_param("decompress", "1")
        .build();
    assert_eq!(wire.get("decompress"), Some("1"));

    assert!(!settings.decompress());
    let clone = settings.clone();
    assert!(clone.build_wire_parameters(false).is_empty());
}

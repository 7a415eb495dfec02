//! Projection of client settings into outgoing wire parameters.
//!
//! A [`WireParameterSet`] lives for one request: it is derived on demand,
//! handed to the transport, and dropped. Per-call overrides (one-shot
//! toggles for a single statement) are merged here and never written back
//! to the settings object.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::trace;
use url::form_urlencoded;

use crate::settings::registry;
use crate::settings::ClientSettings;

/// Key/value pairs sent to the server with one request, ordered by key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WireParameterSet {
    params: BTreeMap<String, String>,
}

impl WireParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn into_map(self) -> BTreeMap<String, String> {
        self.params
    }

    /// Render as a form-urlencoded query string, the shape the transport
    /// appends to the request URL.
    pub fn as_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        serializer.extend_pairs(self.params.iter());
        serializer.finish()
    }
}

impl<'a> IntoIterator for &'a WireParameterSet {
    type Item = (&'a String, &'a String);
    type IntoIter = std::collections::btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}

/// Builds a [`WireParameterSet`] from a settings object.
///
/// Candidates are the wire-keyed registry fields; residual parameters are
/// forwarded verbatim after them, and explicit overrides win last.
pub struct WireParamsBuilder<'a> {
    settings: &'a ClientSettings,
    include_defaults: bool,
    overrides: BTreeMap<String, String>,
}

impl<'a> WireParamsBuilder<'a> {
    pub fn new(settings: &'a ClientSettings) -> Self {
        Self {
            settings,
            include_defaults: false,
            overrides: BTreeMap::new(),
        }
    }

    /// Emit fields whose value equals the registry default. Off by default
    /// to keep requests small.
    pub fn include_defaults(mut self, include: bool) -> Self {
        self.include_defaults = include;
        self
    }

    /// One-shot override for this request only; the settings object is not
    /// mutated and later builds do not see the override.
    pub fn override_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> WireParameterSet {
        let mut set = WireParameterSet::new();
        for setting in registry::all() {
            let Some(wire_key) = setting.wire_key else {
                continue;
            };
            let value = self.settings.encoded_value(setting.name);
            if self.include_defaults || value != setting.default.encoded() {
                set.insert(wire_key, value);
            }
        }
        for (key, value) in self.settings.residual() {
            set.insert(key.as_str(), value.as_str());
        }
        for (key, value) in self.overrides {
            set.insert(key, value);
        }
        trace!(params = set.len(), "built wire parameters");
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_build_no_params_without_defaults() {
        let settings = ClientSettings::default();
        let params = WireParamsBuilder::new(&settings).build();
        assert!(params.is_empty());
    }

    #[test]
    fn test_include_defaults_emits_every_wire_candidate() {
        let settings = ClientSettings::default();
        let params = WireParamsBuilder::new(&settings).include_defaults(true).build();

        let wire_candidates = registry::all().iter().filter(|s| s.wire_key.is_some()).count();
        assert_eq!(params.len(), wire_candidates);
        assert_eq!(params.get("max_memory_usage"), Some("0"));
        assert_eq!(params.get("totals_mode"), Some("after_having_exclusive"));
        assert_eq!(params.get("extremes"), Some("0"));
        // Client-side fields never appear.
        assert!(!params.contains("user"));
        assert!(!params.contains("compress"));
        assert!(!params.contains("connection_timeout"));
    }

    #[test]
    fn test_non_default_value_is_emitted_without_include_defaults() {
        let mut settings = ClientSettings::default();
        settings.set_max_memory_usage(43);
        let params = WireParamsBuilder::new(&settings).build();
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("max_memory_usage"), Some("43"));
    }

    #[test]
    fn test_quorum_fields_surface_as_decimal_text() {
        let mut settings = ClientSettings::default();
        settings
            .set_insert_quorum_timeout(1000)
            .set_insert_quorum(3)
            .set_select_sequential_consistency(1);

        let params = settings.build_wire_parameters(true);
        assert_eq!(params.get("insert_quorum"), Some("3"));
        assert_eq!(params.get("insert_quorum_timeout"), Some("1000"));
        assert_eq!(params.get("select_sequential_consistency"), Some("1"));
    }

    #[test]
    fn test_residual_params_are_forwarded_verbatim() {
        let mut settings = ClientSettings::default();
        settings.set_raw("send_progress_in_http_headers", "1").unwrap();
        let params = WireParamsBuilder::new(&settings).build();
        assert_eq!(params.get("send_progress_in_http_headers"), Some("1"));
    }

    #[test]
    fn test_override_wins_and_does_not_persist() {
        let settings = ClientSettings::default();
        let params = WireParamsBuilder::new(&settings)
            .include_defaults(true)
            .override_param("enable_http_compression", "1")
            .build();
        assert_eq!(params.get("enable_http_compression"), Some("1"));

        // The settings object is untouched and later builds see no trace.
        assert!(!settings.enable_http_compression());
        let again = settings.build_wire_parameters(true);
        assert_eq!(again.get("enable_http_compression"), Some("0"));
    }

    #[test]
    fn test_override_is_invisible_to_clones() {
        let settings = ClientSettings::default();
        let _ = WireParamsBuilder::new(&settings)
            .override_param("decompress", "1")
            .build();
        let clone = settings.clone();
        assert!(clone.build_wire_parameters(false).is_empty());
    }

    #[test]
    fn test_as_query_string_encodes_pairs() {
        let mut set = WireParameterSet::new();
        set.insert("max_memory_usage", "43");
        set.insert("quota_key", "team a");
        assert_eq!(set.as_query_string(), "max_memory_usage=43&quota_key=team+a");
    }
}

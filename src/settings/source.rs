//! Layered key/value source with full-chain resolution.
//!
//! A lookup must see through the explicit layer into the fallback layer;
//! treating "present in fallback only" as absent silently masks inherited
//! defaults. `resolve` is the only lookup primitive the rest of the crate
//! uses, so the shadowing semantics live in exactly one place.

use std::collections::HashMap;

/// An ordered pair of string maps: explicit overrides shadowing a fallback
/// layer of defaults.
#[derive(Debug, Clone, Default)]
pub struct LayeredSource {
    explicit: HashMap<String, String>,
    fallback: HashMap<String, String>,
}

impl LayeredSource {
    pub fn new(explicit: HashMap<String, String>, fallback: HashMap<String, String>) -> Self {
        Self { explicit, fallback }
    }

    /// A source with no fallback layer.
    pub fn from_map(explicit: HashMap<String, String>) -> Self {
        Self {
            explicit,
            fallback: HashMap::new(),
        }
    }

    /// Full-chain lookup: explicit layer first, then fallback. The registry
    /// default (the third link of the chain) is applied by the caller when
    /// this returns `None`.
    pub fn resolve(&self, key: &str) -> Option<&str> {
        self.explicit
            .get(key)
            .or_else(|| self.fallback.get(key))
            .map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.explicit.insert(key.into(), value.into());
    }

    /// Union of keys across both layers; explicit keys first, then fallback
    /// keys not shadowed by an explicit entry.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.explicit.keys().map(String::as_str).chain(
            self.fallback
                .keys()
                .filter(|k| !self.explicit.contains_key(*k))
                .map(String::as_str),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.explicit.is_empty() && self.fallback.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_explicit_shadows_fallback() {
        let source = LayeredSource::new(map(&[("user", "root")]), map(&[("user", "superuser")]));
        assert_eq!(source.resolve("user"), Some("root"));
    }

    #[test]
    fn test_fallback_only_key_is_visible() {
        let source = LayeredSource::new(HashMap::new(), map(&[("user", "superuser")]));
        assert_eq!(source.resolve("user"), Some("superuser"));
    }

    #[test]
    fn test_absent_key_resolves_to_none() {
        let source = LayeredSource::new(map(&[("user", "root")]), map(&[("profile", "web")]));
        assert_eq!(source.resolve("password"), None);
    }

    #[test]
    fn test_keys_union_without_duplicates() {
        let source = LayeredSource::new(
            map(&[("user", "root"), ("compress", "1")]),
            map(&[("user", "superuser"), ("profile", "web")]),
        );
        let mut keys: Vec<&str> = source.keys().collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["compress", "profile", "user"]);
    }

    #[test]
    fn test_is_empty() {
        assert!(LayeredSource::default().is_empty());
        assert!(!LayeredSource::from_map(map(&[("user", "root")])).is_empty());
    }
}

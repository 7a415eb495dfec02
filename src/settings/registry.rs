//! The typed field registry: one descriptor per recognized setting.
//!
//! The registry is a process-wide constant table. Each entry carries the
//! setting's key, its kind, its built-in default, and the wire-protocol key
//! when the server understands the setting. Client-side settings (timeouts,
//! credentials, transport compression toggles) have no wire key and never
//! leave the process.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// Identity of a registered setting. One variant per registry entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingName {
    User,
    Password,
    Database,
    Compress,
    Decompress,
    Ssl,
    ConnectionTimeout,
    SocketTimeout,
    UseServerTimeZone,
    MaxMemoryUsage,
    MaxParallelReplicas,
    MaxBlockSize,
    MaxRowsToRead,
    MaxExecutionTime,
    InsertQuorum,
    InsertQuorumTimeout,
    SelectSequentialConsistency,
    TotalsMode,
    Extremes,
    Profile,
    QuotaKey,
    Priority,
    EnableHttpCompression,
}

/// Value kind of a registered setting, driving coercion and serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKind {
    Bool,
    Int,
    Long,
    Str,
    Enum,
    Duration,
}

/// Built-in default for a setting, stored in a const-friendly shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
    Bool(bool),
    Int(i32),
    Long(i64),
    Str(&'static str),
    Totals(TotalsMode),
    /// Durations default in whole milliseconds.
    Millis(u64),
}

impl DefaultValue {
    /// Serialize the default with the same encoding rules as live values
    /// (booleans as `1`/`0`, numbers as decimal text, enums as their symbol,
    /// durations as milliseconds).
    pub fn encoded(&self) -> String {
        match self {
            Self::Bool(b) => encode_bool(*b).to_string(),
            Self::Int(i) => i.to_string(),
            Self::Long(l) => l.to_string(),
            Self::Str(s) => (*s).to_string(),
            Self::Totals(t) => t.as_str().to_string(),
            Self::Millis(ms) => ms.to_string(),
        }
    }
}

/// Descriptor of one registered setting.
#[derive(Debug, Clone, Copy)]
pub struct Setting {
    pub name: SettingName,
    /// Key under which the setting appears in locators, property maps and
    /// flat serializations.
    pub key: &'static str,
    pub kind: SettingKind,
    pub default: DefaultValue,
    /// Present only for settings the server acts on during query execution.
    pub wire_key: Option<&'static str>,
}

impl Setting {
    const fn client(
        name: SettingName,
        key: &'static str,
        kind: SettingKind,
        default: DefaultValue,
    ) -> Self {
        Self {
            name,
            key,
            kind,
            default,
            wire_key: None,
        }
    }

    /// Server-side settings go on the wire under the same key they are
    /// configured with.
    const fn wire(
        name: SettingName,
        key: &'static str,
        kind: SettingKind,
        default: DefaultValue,
    ) -> Self {
        Self {
            name,
            key,
            kind,
            default,
            wire_key: Some(key),
        }
    }
}

/// Every recognized setting, in registry order.
pub const REGISTRY: &[Setting] = &[
    // Client-side settings: consumed by the connector, never sent to the
    // server.
    Setting::client(
        SettingName::User,
        "user",
        SettingKind::Str,
        DefaultValue::Str("default"),
    ),
    Setting::client(
        SettingName::Password,
        "password",
        SettingKind::Str,
        DefaultValue::Str(""),
    ),
    Setting::client(
        SettingName::Database,
        "database",
        SettingKind::Str,
        DefaultValue::Str("default"),
    ),
    Setting::client(
        SettingName::Compress,
        "compress",
        SettingKind::Bool,
        DefaultValue::Bool(true),
    ),
    Setting::client(
        SettingName::Decompress,
        "decompress",
        SettingKind::Bool,
        DefaultValue::Bool(false),
    ),
    Setting::client(
        SettingName::Ssl,
        "ssl",
        SettingKind::Bool,
        DefaultValue::Bool(false),
    ),
    Setting::client(
        SettingName::ConnectionTimeout,
        "connection_timeout",
        SettingKind::Duration,
        DefaultValue::Millis(10_000),
    ),
    Setting::client(
        SettingName::SocketTimeout,
        "socket_timeout",
        SettingKind::Duration,
        DefaultValue::Millis(30_000),
    ),
    Setting::client(
        SettingName::UseServerTimeZone,
        "use_server_time_zone",
        SettingKind::Bool,
        DefaultValue::Bool(true),
    ),
    // Server-side settings: forwarded as wire parameters.
    Setting::wire(
        SettingName::MaxMemoryUsage,
        "max_memory_usage",
        SettingKind::Long,
        DefaultValue::Long(0),
    ),
    Setting::wire(
        SettingName::MaxParallelReplicas,
        "max_parallel_replicas",
        SettingKind::Int,
        DefaultValue::Int(1),
    ),
    Setting::wire(
        SettingName::MaxBlockSize,
        "max_block_size",
        SettingKind::Int,
        DefaultValue::Int(65_536),
    ),
    Setting::wire(
        SettingName::MaxRowsToRead,
        "max_rows_to_read",
        SettingKind::Long,
        DefaultValue::Long(0),
    ),
    // Seconds, per server convention.
    Setting::wire(
        SettingName::MaxExecutionTime,
        "max_execution_time",
        SettingKind::Int,
        DefaultValue::Int(0),
    ),
    Setting::wire(
        SettingName::InsertQuorum,
        "insert_quorum",
        SettingKind::Long,
        DefaultValue::Long(0),
    ),
    // Milliseconds, per server convention.
    Setting::wire(
        SettingName::InsertQuorumTimeout,
        "insert_quorum_timeout",
        SettingKind::Long,
        DefaultValue::Long(600_000),
    ),
    Setting::wire(
        SettingName::SelectSequentialConsistency,
        "select_sequential_consistency",
        SettingKind::Long,
        DefaultValue::Long(0),
    ),
    Setting::wire(
        SettingName::TotalsMode,
        "totals_mode",
        SettingKind::Enum,
        DefaultValue::Totals(TotalsMode::AfterHavingExclusive),
    ),
    Setting::wire(
        SettingName::Extremes,
        "extremes",
        SettingKind::Bool,
        DefaultValue::Bool(false),
    ),
    Setting::wire(
        SettingName::Profile,
        "profile",
        SettingKind::Str,
        DefaultValue::Str(""),
    ),
    Setting::wire(
        SettingName::QuotaKey,
        "quota_key",
        SettingKind::Str,
        DefaultValue::Str(""),
    ),
    Setting::wire(
        SettingName::Priority,
        "priority",
        SettingKind::Int,
        DefaultValue::Int(0),
    ),
    Setting::wire(
        SettingName::EnableHttpCompression,
        "enable_http_compression",
        SettingKind::Bool,
        DefaultValue::Bool(false),
    ),
];

/// Look up the descriptor for a setting key. Returns `None` for
/// unrecognized keys; callers treat those as residual parameters.
pub fn describe(key: &str) -> Option<&'static Setting> {
    REGISTRY.iter().find(|s| s.key == key)
}

/// All registered settings, in declaration order.
pub fn all() -> &'static [Setting] {
    REGISTRY
}

/// Mode for computing WITH TOTALS aggregations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TotalsMode {
    BeforeHaving,
    AfterHavingExclusive,
    AfterHavingInclusive,
    AfterHavingAuto,
}

impl TotalsMode {
    /// Canonical symbol understood by the server.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BeforeHaving => "before_having",
            Self::AfterHavingExclusive => "after_having_exclusive",
            Self::AfterHavingInclusive => "after_having_inclusive",
            Self::AfterHavingAuto => "after_having_auto",
        }
    }
}

impl fmt::Display for TotalsMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TotalsMode {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "before_having" => Ok(Self::BeforeHaving),
            "after_having_exclusive" => Ok(Self::AfterHavingExclusive),
            "after_having_inclusive" => Ok(Self::AfterHavingInclusive),
            "after_having_auto" => Ok(Self::AfterHavingAuto),
            _ => Err(SettingsError::invalid_value(
                "totals_mode",
                s,
                "unknown totals mode symbol",
            )),
        }
    }
}

pub(crate) fn encode_bool(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}

/// Coerce a raw boolean literal. Only `1`/`true` and `0`/`false` are
/// accepted (case-insensitive); anything else is a hard error rather than a
/// silent false.
pub(crate) fn parse_bool(key: &str, raw: &str) -> Result<bool, SettingsError> {
    if raw == "1" || raw.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if raw == "0" || raw.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(SettingsError::invalid_value(
            key,
            raw,
            "expected one of '1', '0', 'true', 'false'",
        ))
    }
}

pub(crate) fn parse_int(key: &str, raw: &str) -> Result<i32, SettingsError> {
    raw.parse::<i32>().map_err(|e| {
        SettingsError::invalid_value(key, raw, format!("not a 32-bit integer: {e}"))
    })
}

pub(crate) fn parse_long(key: &str, raw: &str) -> Result<i64, SettingsError> {
    raw.parse::<i64>().map_err(|e| {
        SettingsError::invalid_value(key, raw, format!("not a 64-bit integer: {e}"))
    })
}

/// Coerce a duration literal: bare digits are milliseconds, otherwise a
/// digit run followed by one of `ms`, `s`, `m`, `h`.
pub(crate) fn parse_duration(key: &str, raw: &str) -> Result<Duration, SettingsError> {
    let split = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());
    let (digits, unit) = raw.split_at(split);
    if digits.is_empty() {
        return Err(SettingsError::invalid_value(
            key,
            raw,
            "duration must start with digits",
        ));
    }
    let amount: u64 = digits.parse().map_err(|e| {
        SettingsError::invalid_value(key, raw, format!("duration out of range: {e}"))
    })?;
    let factor = match unit {
        "" | "ms" => 1,
        "s" => 1_000,
        "m" => 60_000,
        "h" => 3_600_000,
        _ => {
            return Err(SettingsError::invalid_value(
                key,
                raw,
                "unknown duration unit (expected ms, s, m or h)",
            ));
        }
    };
    let millis = amount.checked_mul(factor).ok_or_else(|| {
        SettingsError::invalid_value(key, raw, "duration overflows u64 milliseconds")
    })?;
    Ok(Duration::from_millis(millis))
}

pub(crate) fn encode_duration(value: Duration) -> String {
    value.as_millis().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_describe_known_key() {
        let setting = describe("max_memory_usage").unwrap();
        assert_eq!(setting.name, SettingName::MaxMemoryUsage);
        assert_eq!(setting.kind, SettingKind::Long);
        assert_eq!(setting.wire_key, Some("max_memory_usage"));
    }

    #[test]
    fn test_describe_unknown_key() {
        assert!(describe("no_such_setting").is_none());
    }

    #[test]
    fn test_registry_keys_are_unique() {
        let mut seen = HashSet::new();
        for setting in all() {
            assert!(seen.insert(setting.key), "duplicate key {}", setting.key);
        }
    }

    #[test]
    fn test_client_settings_have_no_wire_key() {
        for key in ["user", "password", "compress", "connection_timeout"] {
            assert!(describe(key).unwrap().wire_key.is_none(), "{key}");
        }
    }

    #[test]
    fn test_duration_settings_never_go_on_the_wire() {
        for setting in all() {
            if setting.kind == SettingKind::Duration {
                assert!(setting.wire_key.is_none(), "{}", setting.key);
            }
        }
    }

    #[test]
    fn test_parse_bool_accepted_literals() {
        assert!(parse_bool("compress", "1").unwrap());
        assert!(parse_bool("compress", "true").unwrap());
        assert!(parse_bool("compress", "TRUE").unwrap());
        assert!(!parse_bool("compress", "0").unwrap());
        assert!(!parse_bool("compress", "false").unwrap());
    }

    #[test]
    fn test_parse_bool_rejects_other_literals() {
        for raw in ["yes", "on", "", "2"] {
            let err = parse_bool("compress", raw).unwrap_err();
            assert!(matches!(err, SettingsError::InvalidValue { .. }), "{raw}");
        }
    }

    #[test]
    fn test_parse_int_overflow_is_an_error() {
        assert!(parse_int("priority", "2147483647").is_ok());
        assert!(parse_int("priority", "2147483648").is_err());
        assert!(parse_int("priority", "ten").is_err());
    }

    #[test]
    fn test_parse_long_negative() {
        assert_eq!(parse_long("max_rows_to_read", "-5").unwrap(), -5);
    }

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(
            parse_duration("socket_timeout", "1500").unwrap(),
            Duration::from_millis(1500)
        );
        assert_eq!(
            parse_duration("socket_timeout", "1500ms").unwrap(),
            Duration::from_millis(1500)
        );
        assert_eq!(
            parse_duration("socket_timeout", "2s").unwrap(),
            Duration::from_secs(2)
        );
        assert_eq!(
            parse_duration("socket_timeout", "3m").unwrap(),
            Duration::from_secs(180)
        );
        assert_eq!(
            parse_duration("socket_timeout", "1h").unwrap(),
            Duration::from_secs(3600)
        );
    }

    #[test]
    fn test_parse_duration_rejects_bad_literals() {
        assert!(parse_duration("socket_timeout", "s").is_err());
        assert!(parse_duration("socket_timeout", "10d").is_err());
        assert!(parse_duration("socket_timeout", "").is_err());
    }

    #[test]
    fn test_totals_mode_round_trip() {
        for symbol in [
            "before_having",
            "after_having_exclusive",
            "after_having_inclusive",
            "after_having_auto",
        ] {
            let mode: TotalsMode = symbol.parse().unwrap();
            assert_eq!(mode.as_str(), symbol);
        }
        assert!("after_having".parse::<TotalsMode>().is_err());
    }

    #[test]
    fn test_default_encoding() {
        assert_eq!(DefaultValue::Bool(true).encoded(), "1");
        assert_eq!(DefaultValue::Bool(false).encoded(), "0");
        assert_eq!(DefaultValue::Long(600_000).encoded(), "600000");
        assert_eq!(
            DefaultValue::Totals(TotalsMode::AfterHavingExclusive).encoded(),
            "after_having_exclusive"
        );
        assert_eq!(DefaultValue::Millis(10_000).encoded(), "10000");
    }
}

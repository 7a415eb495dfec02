//! Client settings: the typed, defaulted record behind every connection.
//!
//! Construction is all-or-nothing. Every registered field is seeded from
//! its registry default, then resolved through the full fallback chain of a
//! [`LayeredSource`] (explicit layer, fallback layer, registry default) and
//! coerced by its kind. Keys the registry does not know are kept verbatim
//! in a residual map so newer server settings pass through untouched.

pub mod registry;
pub mod source;

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, trace};

use crate::error::SettingsError;
use crate::interceptor::{
    RequestInterceptor, RequestInterceptors, ResponseInterceptor, ResponseInterceptors,
};
use crate::locator::Locator;
use crate::wire::{WireParamsBuilder, WireParameterSet};
use self::registry::{Setting, SettingName, TotalsMode};
pub use self::source::LayeredSource;

/// Database used when the locator path names none.
pub const DEFAULT_DATABASE: &str = "default";

/// Typed connection settings plus the residual map of unrecognized
/// parameters. One instance per connection; clone per statement when
/// per-call overrides are needed.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientSettings {
    // Client-side fields.
    user: String,
    password: String,
    database: String,
    compress: bool,
    decompress: bool,
    ssl: bool,
    connection_timeout: Duration,
    socket_timeout: Duration,
    use_server_time_zone: bool,
    // Server-side (wire-keyed) fields.
    max_memory_usage: i64,
    max_parallel_replicas: i32,
    max_block_size: i32,
    max_rows_to_read: i64,
    max_execution_time: i32,
    insert_quorum: i64,
    insert_quorum_timeout: i64,
    select_sequential_consistency: i64,
    totals_mode: TotalsMode,
    extremes: bool,
    profile: String,
    quota_key: String,
    priority: i32,
    enable_http_compression: bool,
    /// Unrecognized source keys, preserved for forward compatibility.
    residual: BTreeMap<String, String>,
    request_interceptors: RequestInterceptors,
    response_interceptors: ResponseInterceptors,
}

impl Default for ClientSettings {
    /// Registry defaults across the board. Kept in sync with
    /// [`registry::REGISTRY`]; `test_defaults_match_registry` guards the
    /// correspondence.
    fn default() -> Self {
        Self {
            user: "default".to_string(),
            password: String::new(),
            database: DEFAULT_DATABASE.to_string(),
            compress: true,
            decompress: false,
            ssl: false,
            connection_timeout: Duration::from_millis(10_000),
            socket_timeout: Duration::from_millis(30_000),
            use_server_time_zone: true,
            max_memory_usage: 0,
            max_parallel_replicas: 1,
            max_block_size: 65_536,
            max_rows_to_read: 0,
            max_execution_time: 0,
            insert_quorum: 0,
            insert_quorum_timeout: 600_000,
            select_sequential_consistency: 0,
            totals_mode: TotalsMode::AfterHavingExclusive,
            extremes: false,
            profile: String::new(),
            quota_key: String::new(),
            priority: 0,
            enable_http_compression: false,
            residual: BTreeMap::new(),
            request_interceptors: RequestInterceptors::new(),
            response_interceptors: ResponseInterceptors::new(),
        }
    }
}

impl ClientSettings {
    /// Construct from a layered source. Every registered key is resolved
    /// through the full chain (explicit, then fallback, then registry
    /// default); a single failed coercion rejects the whole construction.
    pub fn from_source(source: &LayeredSource) -> Result<Self, SettingsError> {
        let mut settings = Self::default();
        for setting in registry::all() {
            if let Some(raw) = source.resolve(setting.key) {
                settings.apply_raw(setting, raw)?;
            }
        }
        for key in source.keys() {
            if registry::describe(key).is_none() {
                if let Some(value) = source.resolve(key) {
                    settings.residual.insert(key.to_string(), value.to_string());
                }
            }
        }
        trace!(residual = settings.residual.len(), "constructed client settings");
        Ok(settings)
    }

    /// Construct from a parsed locator: query parameters form the explicit
    /// layer, and a non-empty locator path overrides any `database` query
    /// key.
    pub fn from_locator(locator: &Locator) -> Result<Self, SettingsError> {
        Self::from_locator_with_defaults(locator, &HashMap::new())
    }

    /// Like [`from_locator`](Self::from_locator), with a caller-supplied
    /// fallback layer under the query parameters.
    pub fn from_locator_with_defaults(
        locator: &Locator,
        defaults: &HashMap<String, String>,
    ) -> Result<Self, SettingsError> {
        let source = LayeredSource::new(locator.params().clone(), defaults.clone());
        let mut settings = Self::from_source(&source)?;
        if locator.has_explicit_database() {
            settings.database = locator.database().to_string();
        }
        debug!(
            database = %settings.database,
            user = %settings.user,
            "settings resolved from locator"
        );
        Ok(settings)
    }

    /// Coerce and apply one raw value by its registered kind.
    fn apply_raw(&mut self, setting: &Setting, raw: &str) -> Result<(), SettingsError> {
        let key = setting.key;
        match setting.name {
            SettingName::User => self.user = raw.to_string(),
            SettingName::Password => self.password = raw.to_string(),
            SettingName::Database => self.database = raw.to_string(),
            SettingName::Compress => self.compress = registry::parse_bool(key, raw)?,
            SettingName::Decompress => self.decompress = registry::parse_bool(key, raw)?,
            SettingName::Ssl => self.ssl = registry::parse_bool(key, raw)?,
            SettingName::ConnectionTimeout => {
                self.connection_timeout = registry::parse_duration(key, raw)?;
            }
            SettingName::SocketTimeout => {
                self.socket_timeout = registry::parse_duration(key, raw)?;
            }
            SettingName::UseServerTimeZone => {
                self.use_server_time_zone = registry::parse_bool(key, raw)?;
            }
            SettingName::MaxMemoryUsage => {
                self.max_memory_usage = registry::parse_long(key, raw)?;
            }
            SettingName::MaxParallelReplicas => {
                self.max_parallel_replicas = registry::parse_int(key, raw)?;
            }
            SettingName::MaxBlockSize => self.max_block_size = registry::parse_int(key, raw)?,
            SettingName::MaxRowsToRead => self.max_rows_to_read = registry::parse_long(key, raw)?,
            SettingName::MaxExecutionTime => {
                self.max_execution_time = registry::parse_int(key, raw)?;
            }
            SettingName::InsertQuorum => self.insert_quorum = registry::parse_long(key, raw)?,
            SettingName::InsertQuorumTimeout => {
                self.insert_quorum_timeout = registry::parse_long(key, raw)?;
            }
            SettingName::SelectSequentialConsistency => {
                self.select_sequential_consistency = registry::parse_long(key, raw)?;
            }
            SettingName::TotalsMode => self.totals_mode = raw.parse()?,
            SettingName::Extremes => self.extremes = registry::parse_bool(key, raw)?,
            SettingName::Profile => self.profile = raw.to_string(),
            SettingName::QuotaKey => self.quota_key = raw.to_string(),
            SettingName::Priority => self.priority = registry::parse_int(key, raw)?,
            SettingName::EnableHttpCompression => {
                self.enable_http_compression = registry::parse_bool(key, raw)?;
            }
        }
        Ok(())
    }

    /// Set a field by key with the same coercion contract as construction.
    /// Unrecognized keys land in the residual map.
    pub fn set_raw(&mut self, key: &str, value: &str) -> Result<&mut Self, SettingsError> {
        match registry::describe(key) {
            Some(setting) => self.apply_raw(setting, value)?,
            None => {
                self.residual.insert(key.to_string(), value.to_string());
            }
        }
        Ok(self)
    }

    /// Encoded value of one registered field, following the wire
    /// serialization rules (booleans as `1`/`0`, durations as milliseconds,
    /// enums as their symbol).
    pub(crate) fn encoded_value(&self, name: SettingName) -> String {
        match name {
            SettingName::User => self.user.clone(),
            SettingName::Password => self.password.clone(),
            SettingName::Database => self.database.clone(),
            SettingName::Compress => registry::encode_bool(self.compress).to_string(),
            SettingName::Decompress => registry::encode_bool(self.decompress).to_string(),
            SettingName::Ssl => registry::encode_bool(self.ssl).to_string(),
            SettingName::ConnectionTimeout => registry::encode_duration(self.connection_timeout),
            SettingName::SocketTimeout => registry::encode_duration(self.socket_timeout),
            SettingName::UseServerTimeZone => {
                registry::encode_bool(self.use_server_time_zone).to_string()
            }
            SettingName::MaxMemoryUsage => self.max_memory_usage.to_string(),
            SettingName::MaxParallelReplicas => self.max_parallel_replicas.to_string(),
            SettingName::MaxBlockSize => self.max_block_size.to_string(),
            SettingName::MaxRowsToRead => self.max_rows_to_read.to_string(),
            SettingName::MaxExecutionTime => self.max_execution_time.to_string(),
            SettingName::InsertQuorum => self.insert_quorum.to_string(),
            SettingName::InsertQuorumTimeout => self.insert_quorum_timeout.to_string(),
            SettingName::SelectSequentialConsistency => {
                self.select_sequential_consistency.to_string()
            }
            SettingName::TotalsMode => self.totals_mode.as_str().to_string(),
            SettingName::Extremes => registry::encode_bool(self.extremes).to_string(),
            SettingName::Profile => self.profile.clone(),
            SettingName::QuotaKey => self.quota_key.clone(),
            SettingName::Priority => self.priority.to_string(),
            SettingName::EnableHttpCompression => {
                registry::encode_bool(self.enable_http_compression).to_string()
            }
        }
    }

    /// Serialize every registered field (default or not) keyed by field
    /// name, plus the residual map. Feeding the result back through
    /// [`from_source`](Self::from_source) reproduces the object.
    pub fn as_flat_properties(&self) -> BTreeMap<String, String> {
        let mut props = BTreeMap::new();
        for setting in registry::all() {
            props.insert(setting.key.to_string(), self.encoded_value(setting.name));
        }
        for (key, value) in &self.residual {
            props.insert(key.clone(), value.clone());
        }
        props
    }

    /// Project into the wire-keyed subset for one outgoing request.
    pub fn build_wire_parameters(&self, include_defaults: bool) -> WireParameterSet {
        WireParamsBuilder::new(self)
            .include_defaults(include_defaults)
            .build()
    }

    /// Unrecognized parameters, preserved verbatim.
    pub fn residual(&self) -> &BTreeMap<String, String> {
        &self.residual
    }

    // Typed accessors. Setters are fluent and overwrite a single field.

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn set_user(&mut self, user: impl Into<String>) -> &mut Self {
        self.user = user.into();
        self
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn set_password(&mut self, password: impl Into<String>) -> &mut Self {
        self.password = password.into();
        self
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn set_database(&mut self, database: impl Into<String>) -> &mut Self {
        self.database = database.into();
        self
    }

    pub fn compress(&self) -> bool {
        self.compress
    }

    pub fn set_compress(&mut self, compress: bool) -> &mut Self {
        self.compress = compress;
        self
    }

    pub fn decompress(&self) -> bool {
        self.decompress
    }

    pub fn set_decompress(&mut self, decompress: bool) -> &mut Self {
        self.decompress = decompress;
        self
    }

    pub fn ssl(&self) -> bool {
        self.ssl
    }

    pub fn set_ssl(&mut self, ssl: bool) -> &mut Self {
        self.ssl = ssl;
        self
    }

    pub fn connection_timeout(&self) -> Duration {
        self.connection_timeout
    }

    pub fn set_connection_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.connection_timeout = timeout;
        self
    }

    pub fn socket_timeout(&self) -> Duration {
        self.socket_timeout
    }

    pub fn set_socket_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.socket_timeout = timeout;
        self
    }

    pub fn use_server_time_zone(&self) -> bool {
        self.use_server_time_zone
    }

    pub fn set_use_server_time_zone(&mut self, use_it: bool) -> &mut Self {
        self.use_server_time_zone = use_it;
        self
    }

    pub fn max_memory_usage(&self) -> i64 {
        self.max_memory_usage
    }

    pub fn set_max_memory_usage(&mut self, bytes: i64) -> &mut Self {
        self.max_memory_usage = bytes;
        self
    }

    pub fn max_parallel_replicas(&self) -> i32 {
        self.max_parallel_replicas
    }

    pub fn set_max_parallel_replicas(&mut self, replicas: i32) -> &mut Self {
        self.max_parallel_replicas = replicas;
        self
    }

    pub fn max_block_size(&self) -> i32 {
        self.max_block_size
    }

    pub fn set_max_block_size(&mut self, rows: i32) -> &mut Self {
        self.max_block_size = rows;
        self
    }

    pub fn max_rows_to_read(&self) -> i64 {
        self.max_rows_to_read
    }

    pub fn set_max_rows_to_read(&mut self, rows: i64) -> &mut Self {
        self.max_rows_to_read = rows;
        self
    }

    /// Seconds, per server convention.
    pub fn max_execution_time(&self) -> i32 {
        self.max_execution_time
    }

    pub fn set_max_execution_time(&mut self, seconds: i32) -> &mut Self {
        self.max_execution_time = seconds;
        self
    }

    pub fn insert_quorum(&self) -> i64 {
        self.insert_quorum
    }

    pub fn set_insert_quorum(&mut self, quorum: i64) -> &mut Self {
        self.insert_quorum = quorum;
        self
    }

    /// Milliseconds, per server convention.
    pub fn insert_quorum_timeout(&self) -> i64 {
        self.insert_quorum_timeout
    }

    pub fn set_insert_quorum_timeout(&mut self, millis: i64) -> &mut Self {
        self.insert_quorum_timeout = millis;
        self
    }

    pub fn select_sequential_consistency(&self) -> i64 {
        self.select_sequential_consistency
    }

    pub fn set_select_sequential_consistency(&mut self, value: i64) -> &mut Self {
        self.select_sequential_consistency = value;
        self
    }

    pub fn totals_mode(&self) -> TotalsMode {
        self.totals_mode
    }

    pub fn set_totals_mode(&mut self, mode: TotalsMode) -> &mut Self {
        self.totals_mode = mode;
        self
    }

    pub fn extremes(&self) -> bool {
        self.extremes
    }

    pub fn set_extremes(&mut self, extremes: bool) -> &mut Self {
        self.extremes = extremes;
        self
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    pub fn set_profile(&mut self, profile: impl Into<String>) -> &mut Self {
        self.profile = profile.into();
        self
    }

    pub fn quota_key(&self) -> &str {
        &self.quota_key
    }

    pub fn set_quota_key(&mut self, quota_key: impl Into<String>) -> &mut Self {
        self.quota_key = quota_key.into();
        self
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn set_priority(&mut self, priority: i32) -> &mut Self {
        self.priority = priority;
        self
    }

    pub fn enable_http_compression(&self) -> bool {
        self.enable_http_compression
    }

    pub fn set_enable_http_compression(&mut self, enable: bool) -> &mut Self {
        self.enable_http_compression = enable;
        self
    }

    // Interceptor chains: carried opaquely, never invoked here.

    pub fn request_interceptors(&self) -> &RequestInterceptors {
        &self.request_interceptors
    }

    pub fn add_request_interceptor(&mut self, hook: Arc<dyn RequestInterceptor>) -> &mut Self {
        self.request_interceptors.push(hook);
        self
    }

    pub fn set_request_interceptors(
        &mut self,
        hooks: Vec<Arc<dyn RequestInterceptor>>,
    ) -> &mut Self {
        self.request_interceptors.replace(hooks);
        self
    }

    pub fn response_interceptors(&self) -> &ResponseInterceptors {
        &self.response_interceptors
    }

    pub fn add_response_interceptor(&mut self, hook: Arc<dyn ResponseInterceptor>) -> &mut Self {
        self.response_interceptors.push(hook);
        self
    }

    pub fn set_response_interceptors(
        &mut self,
        hooks: Vec<Arc<dyn ResponseInterceptor>>,
    ) -> &mut Self {
        self.response_interceptors.replace(hooks);
        self
    }
}

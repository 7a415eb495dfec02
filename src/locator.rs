//! Connection locator parsing.
//!
//! A locator has the shape
//! `scheme://host1[:port1][,host2[:port2]...][/database][?key=value&...]`.
//! The authority may carry several comma-separated endpoints for balanced
//! deployments, which is why it is split by hand before the query part is
//! handed to the `url` machinery: `url::Url` cannot represent a
//! comma-separated host list.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::form_urlencoded;

use crate::error::SettingsError;

/// Default HTTP interface port of the server.
pub const DEFAULT_PORT: u16 = 8123;

/// One server endpoint. The load-balancing collaborator consumes these in
/// declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostEndpoint {
    pub host: String,
    pub port: u16,
}

impl HostEndpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for HostEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// A parsed connection locator: ordered endpoints, target database and the
/// flat query-parameter map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    scheme: String,
    endpoints: Vec<HostEndpoint>,
    database: String,
    /// True when the path named the database rather than the default.
    explicit_database: bool,
    params: HashMap<String, String>,
}

impl Locator {
    /// Parse a locator string. Pure function of the input; fails with
    /// [`SettingsError::MalformedLocator`] when the string cannot be
    /// decomposed into at least one valid endpoint.
    pub fn parse(input: &str) -> Result<Self, SettingsError> {
        let (scheme, rest) = input
            .split_once("://")
            .ok_or_else(|| SettingsError::malformed(format!("missing '://' in '{input}'")))?;
        if scheme.is_empty() {
            return Err(SettingsError::malformed(format!("empty scheme in '{input}'")));
        }

        let (authority, path, query) = split_after_scheme(rest);
        if authority.is_empty() {
            return Err(SettingsError::malformed(format!("no hosts in '{input}'")));
        }

        let endpoints = parse_hosts(authority)?;
        let explicit_database = !path.trim_matches('/').is_empty();
        let database = parse_database(path);
        let params = parse_query(query);

        debug!(
            scheme,
            hosts = endpoints.len(),
            database = %database,
            params = params.len(),
            "parsed connection locator"
        );

        Ok(Self {
            scheme: scheme.to_string(),
            endpoints,
            database,
            explicit_database,
            params,
        })
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Ordered, non-empty endpoint list.
    pub fn endpoints(&self) -> &[HostEndpoint] {
        &self.endpoints
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    /// Query parameters, percent-decoded, last occurrence of a repeated key
    /// retained.
    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    pub fn into_params(self) -> HashMap<String, String> {
        self.params
    }

    /// True when the locator path carried an explicit database segment.
    pub fn has_explicit_database(&self) -> bool {
        self.explicit_database
    }
}

/// Split the post-scheme remainder into authority, path and query slices.
fn split_after_scheme(rest: &str) -> (&str, &str, &str) {
    let (before_query, query) = match rest.split_once('?') {
        Some((b, q)) => (b, q),
        None => (rest, ""),
    };
    match before_query.split_once('/') {
        Some((authority, path)) => (authority, path, query),
        None => (before_query, "", query),
    }
}

/// Parse the comma-separated authority into endpoints. Ports must fall in
/// [1, 65535]; a missing port means the default HTTP port.
fn parse_hosts(authority: &str) -> Result<Vec<HostEndpoint>, SettingsError> {
    let mut endpoints = Vec::new();
    for part in authority.split(',') {
        let part = part.trim();
        if part.is_empty() {
            return Err(SettingsError::malformed(format!(
                "empty host in authority '{authority}'"
            )));
        }
        let (host, port) = match part.rsplit_once(':') {
            Some((host, port_text)) => {
                let port: u32 = port_text.parse().map_err(|_| {
                    SettingsError::malformed(format!("invalid port '{port_text}' in '{part}'"))
                })?;
                if port == 0 || port > u16::MAX as u32 {
                    return Err(SettingsError::malformed(format!(
                        "port {port} out of range [1, 65535] in '{part}'"
                    )));
                }
                (host, port as u16)
            }
            None => (part, DEFAULT_PORT),
        };
        if host.is_empty() {
            return Err(SettingsError::malformed(format!(
                "empty host in '{part}'"
            )));
        }
        endpoints.push(HostEndpoint::new(host, port));
    }
    Ok(endpoints)
}

/// Database from the path segment, defaulting to `"default"`.
fn parse_database(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        crate::settings::DEFAULT_DATABASE.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Percent-decode the query string into a flat map; the last occurrence of
/// a repeated key wins.
fn parse_query(query: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        params.insert(key.into_owned(), value.into_owned());
    }
    params
}

//! Connection configuration for ClickHouse HTTP clients.
//!
//! This library parses connection locators
//! (`clickhouse://host:port[,host2:port2]/database?key=value`), resolves
//! layered defaults into a typed [`ClientSettings`] object, and projects
//! the result into the wire parameters an HTTP transport sends with each
//! request.

pub mod error;
pub mod interceptor;
pub mod locator;
pub mod settings;
pub mod wire;

pub use error::SettingsError;
pub use interceptor::{RequestInterceptor, ResponseInterceptor};
pub use locator::{HostEndpoint, Locator};
pub use settings::registry::TotalsMode;
pub use settings::{ClientSettings, LayeredSource};
pub use wire::{WireParameterSet, WireParamsBuilder};

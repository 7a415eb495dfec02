//! Error types for locator parsing and settings construction.
//!
//! Both variants are fatal to the call that raised them: a settings object
//! either constructs fully or not at all, so no collaborator can observe a
//! partially coerced state.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    /// The connection locator could not be decomposed into hosts, database
    /// and query parameters.
    #[error("malformed locator: {message}")]
    MalformedLocator { message: String },

    /// A raw string value failed type coercion for its registered kind.
    #[error("invalid value '{value}' for setting '{key}': {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

impl SettingsError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedLocator {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_value(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

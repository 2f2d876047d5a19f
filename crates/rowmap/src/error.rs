//! Error types for rowmap

use thiserror::Error;

/// Result type alias for rowmap operations
pub type MapResult<T> = Result<T, MapError>;

/// Error types for mapper and adapter operations
#[derive(Debug, Error)]
pub enum MapError {
    /// Missing or invalid setup (no driver, no primary keys, empty where-clause)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Unresolvable registry or schema entry
    #[error("Lookup error: {0}")]
    Lookup(String),

    /// Malformed call arguments
    #[error("Argument error: {0}")]
    Argument(String),

    /// Adapter or input contract violation
    #[error("Contract violation: {0}")]
    Contract(String),

    /// Base adapter capability invoked without an override
    #[error("Capability '{0}' is not implemented by this adapter")]
    Unsupported(&'static str),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Failure from the underlying execution layer, passed through unmodified
    #[error("Driver error: {0}")]
    Driver(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl MapError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a lookup error
    pub fn lookup(message: impl Into<String>) -> Self {
        Self::Lookup(message.into())
    }

    /// Create an argument error
    pub fn argument(message: impl Into<String>) -> Self {
        Self::Argument(message.into())
    }

    /// Create a contract violation error
    pub fn contract(message: impl Into<String>) -> Self {
        Self::Contract(message.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Wrap a driver-level failure without reinterpreting it
    pub fn driver(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Driver(err.into())
    }

    /// Check if this is a configuration error
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Check if this is a lookup error
    pub fn is_lookup(&self) -> bool {
        matches!(self, Self::Lookup(_))
    }

    /// Check if this is an unimplemented-capability error
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported(_))
    }

    /// Check if this is a passed-through driver error
    pub fn is_driver(&self) -> bool {
        matches!(self, Self::Driver(_))
    }
}

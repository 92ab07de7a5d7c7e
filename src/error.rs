//! Error types for configuration and template loading
//!
//! Transition impossibility, feature chains walking off the partial tree,
//! and missing predicates are not errors: they surface as `false`/`None`
//! returns or as silently skipped features.

use thiserror::Error;

/// Error type for configuration and template operations
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration value error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Malformed feature template
    #[error("Invalid feature template '{template}': {reason}")]
    Template {
        /// The offending template text
        template: String,
        /// What went wrong while parsing it
        reason: String,
    },

    /// Attribute name not in the feature attribute table
    #[error("Unknown feature attribute: {0}")]
    UnknownAttribute(String),

    /// I/O failure while reading a configuration file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file is not valid TOML
    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

/// Result type for configuration and template operations
pub type Result<T> = std::result::Result<T, Error>;

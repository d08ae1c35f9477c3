//! Error types and handling for sitemapper-core operations.
//!
//! This module provides one error type covering every failure the generation
//! pipeline can surface. Schema violations are *not* reported one at a time:
//! they are collected into a [`ValidationResult`] and carried by
//! [`Error::Validation`] so a caller sees every problem from a single run.
//!
//! ## Error Categories
//!
//! - **I/O Errors**: writing documents, reading or updating `robots.txt`
//! - **Configuration Errors**: invalid settings, bad exclusion patterns
//! - **Validation Errors**: one or more routes violate the sitemap protocol
//! - **Callback Errors**: a user transform, route factory, or serializer failed
//! - **Storage Errors**: committing generated files to disk
//!
//! ## Example
//!
//! ```rust
//! use sitemapper_core::{Error, Result};
//!
//! fn report(result: Result<()>) {
//!     match result {
//!         Ok(()) => println!("done"),
//!         Err(Error::Validation(report)) => {
//!             for err in &report.errors {
//!                 eprintln!("{}: {}", err.path, err.message);
//!             }
//!         }
//!         Err(e) => eprintln!("[{}] {e}", e.category()),
//!     }
//! }
//! # report(Ok(()));
//! ```

use thiserror::Error;

use crate::validate::ValidationResult;

/// Boxed error returned by user-supplied callbacks.
///
/// Transforms, route factories and custom serializers are external code, so
/// they report failures through this type rather than through [`Error`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The main error type for sitemapper-core operations.
///
/// A failure is always scoped to one route collection: when several
/// collections are generated together each gets its own `Result`.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed.
    ///
    /// Covers reading and writing output files and the `robots.txt` file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing operation failed.
    ///
    /// Raised when a textual value (for example a change frequency) does not
    /// match its expected format.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration is invalid or inaccessible.
    ///
    /// ## Common Causes
    ///
    /// - Invalid TOML syntax in a config file
    /// - Split thresholds outside the protocol limits
    /// - Default priority outside `0.0..=1.0`
    #[error("Configuration error: {0}")]
    Config(String),

    /// An exclusion pattern could not be compiled.
    #[error("Invalid exclusion pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// Pattern as supplied by the caller.
        pattern: String,
        /// Compiler message from the glob or regex engine.
        reason: String,
    },

    /// One or more routes failed protocol validation.
    ///
    /// The boxed report holds every violation across every route, not just the
    /// first one encountered.
    #[error("Validation failed with {} error(s) across {} route(s)", .0.errors.len(), .0.route_count)]
    Validation(Box<ValidationResult>),

    /// A user transform callback failed for a route.
    ///
    /// Aborts generation of the collection the route belongs to.
    #[error("Transform failed for '{url}': {source}")]
    Transform {
        /// URL of the route being transformed.
        url: String,
        /// Error reported by the callback.
        #[source]
        source: BoxError,
    },

    /// A route factory failed to produce its route list.
    #[error("Route source '{collection}' failed: {source}")]
    RouteSource {
        /// Name of the collection whose factory failed.
        collection: String,
        /// Error reported by the factory.
        #[source]
        source: BoxError,
    },

    /// Serializing routes into a document failed.
    ///
    /// The built-in XML serializer never fails; this is only produced by a
    /// custom serializer override.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Committing generated files to disk failed.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl Error {
    /// Check if the error might be recoverable through retry logic.
    ///
    /// Only transient I/O failures qualify. Validation, configuration and
    /// callback failures are deterministic and will fail again on retry.
    ///
    /// ```rust
    /// use sitemapper_core::Error;
    /// use std::io;
    ///
    /// assert!(Error::Io(io::Error::new(io::ErrorKind::Interrupted, "eintr")).is_recoverable());
    /// assert!(!Error::Config("max_urls must be positive".into()).is_recoverable());
    /// ```
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut
                    | std::io::ErrorKind::Interrupted
                    | std::io::ErrorKind::WouldBlock
            ),
            _ => false,
        }
    }

    /// Get the error category as a string identifier.
    ///
    /// Useful as a structured logging field:
    ///
    /// ```rust
    /// use sitemapper_core::Error;
    ///
    /// let err = Error::Storage("disk full".into());
    /// tracing::error!(category = err.category(), error = %err, "generation failed");
    /// ```
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Parse(_) => "parse",
            Self::Config(_) | Self::InvalidPattern { .. } => "config",
            Self::Validation(_) => "validation",
            Self::Transform { .. } | Self::RouteSource { .. } => "callback",
            Self::Serialization(_) => "serialization",
            Self::Storage(_) => "storage",
        }
    }

    /// Returns the validation report when this is a validation failure.
    #[must_use]
    pub fn validation_report(&self) -> Option<&ValidationResult> {
        match self {
            Self::Validation(report) => Some(report),
            _ => None,
        }
    }
}

/// Convenience type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

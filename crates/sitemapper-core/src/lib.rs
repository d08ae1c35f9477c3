//! # sitemapper-core
//!
//! Core functionality for sitemapper - protocol-compliant sitemap generation
//! from page-route descriptors.
//!
//! Route lists go through a fixed pipeline (exclusion, transform, defaults,
//! hostname resolution, validation, deduplication) and come out as one
//! `<urlset>` document, or as several size-bounded documents plus a
//! `<sitemapindex>` when they exceed the protocol limits.
//!
//! ## Architecture
//!
//! - **Types**: [`Route`] and its image/video/news/alternate extensions
//! - **Exclusion**: glob and regex URL filters ([`exclude`])
//! - **Validation**: collects every protocol violation with field paths ([`validate`])
//! - **Serialization**: XML with only the namespaces in use ([`xml`])
//! - **Splitting**: first-fit packing under URL and byte limits ([`split`])
//! - **Pipeline**: per-collection orchestration ([`pipeline`])
//! - **Output**: file commits and `robots.txt` upkeep ([`output`], [`robots`])
//! - **Configuration**: TOML settings ([`config`])
//!
//! ## Quick Start
//!
//! ```rust
//! use sitemapper_core::{GenerationOptions, Route, generate};
//!
//! let options = GenerationOptions::new()
//!     .with_hostname("https://example.com")
//!     .with_exclude("/admin/**")
//!     .with_default_priority(0.5);
//!
//! let routes = vec![
//!     Route::new("/"),
//!     Route::new("/blog/hello-world").with_lastmod("2024-05-17"),
//!     Route::new("/admin/settings"),
//! ];
//!
//! let result = futures::executor::block_on(generate("default", routes, &options))?;
//! assert_eq!(result.route_count, 2);
//! assert_eq!(result.excluded_count, 1);
//! println!("{}", result.documents[0].xml);
//! # Ok::<(), sitemapper_core::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! Validation never stops at the first problem. A failed collection carries the
//! full report:
//!
//! ```rust
//! use sitemapper_core::{Error, GenerationOptions, Route, generate};
//!
//! let routes = vec![Route::new("/no-hostname"), Route::new("https://example.com/").with_priority(7.0)];
//!
//! match futures::executor::block_on(generate("default", routes, &GenerationOptions::new())) {
//!     Err(Error::Validation(report)) => {
//!         for error in &report.errors {
//!             eprintln!("{error}");
//!         }
//!         assert_eq!(report.errors.len(), 2);
//!     },
//!     other => panic!("expected validation failure, got {other:?}"),
//! }
//! ```

/// TOML configuration
pub mod config;
/// Error types and result aliases
pub mod error;
/// URL exclusion patterns
pub mod exclude;
/// Protocol limits
pub mod limits;
/// Writing generated documents to disk
pub mod output;
/// Generation pipeline and its stages
pub mod pipeline;
/// `robots.txt` maintenance
pub mod robots;
/// Size-aware document splitting
pub mod split;
/// Route and extension data types
pub mod types;
/// Route validation
pub mod validate;
/// XML serialization
pub mod xml;

// Re-export commonly used types
pub use config::{DefaultsConfig, OutputConfig, SitemapConfig, SplitConfig};
pub use error::{Error, Result};
pub use exclude::{ExcludePattern, ExclusionMatcher};
pub use output::{sitemap_reference, write_output};
pub use pipeline::{
    DEFAULT_COLLECTION, GenerationOptions, GenerationResult, RouteSource, RouteTransform,
    SitemapDocument, generate, generate_all, transform_fn,
};
pub use robots::{RobotsAction, RobotsTxtUpdate, update_robots_txt};
pub use split::{SitemapChunk, SizeEstimate, SplitOptions, SplitResult, estimate_total_size, split_routes};
pub use types::*;
pub use validate::{ErrorCode, ValidationError, ValidationResult, Warning, WarningCode};
pub use xml::{UrlsetSerializer, XmlSerializer};

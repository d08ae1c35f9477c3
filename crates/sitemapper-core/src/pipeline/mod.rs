//! The generation pipeline.
//!
//! [`generate`] turns one route collection into sitemap documents:
//!
//! ```text
//! input -> exclude -> transform -> defaults -> hostname -> validate -> dedupe -> split
//! ```
//!
//! Exclusion runs first so that excluded routes never reach the transform.
//! Validation sees absolute URLs and original positions; deduplication runs
//! after it so error paths point at the caller's indices. A validation
//! failure aborts the collection with the full report unless
//! [`GenerationOptions::skip_validation`] is set.
//!
//! [`generate_all`] runs several collections concurrently. Each collection
//! gets its own `Result`, so one failing collection never aborts another.
//!
//! ```rust
//! use sitemapper_core::{GenerationOptions, Route, generate};
//!
//! let options = GenerationOptions::new().with_hostname("https://example.com");
//! let routes = vec![Route::new("/"), Route::new("/about")];
//!
//! let result = futures::executor::block_on(generate("default", routes, &options))?;
//! assert_eq!(result.documents[0].filename, "sitemap.xml");
//! assert!(result.documents[0].xml.contains("<loc>https://example.com/about</loc>"));
//! # Ok::<(), sitemapper_core::Error>(())
//! ```

mod source;
mod stages;
mod transform;

use std::sync::Arc;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

pub use source::{DEFAULT_COLLECTION, RouteFactory, RouteSource, base_name};
pub use stages::{
    RouteDefaults, apply_defaults, dedupe, filter_excluded, resolve_hostname, resolve_hostnames,
};
pub use transform::{FnTransform, RouteTransform, TransformOutcome, apply_transform, transform_fn};

use crate::exclude::{ExcludePattern, ExclusionMatcher};
use crate::limits::{DEFAULT_MAX_BYTES, MAX_URLS_PER_SITEMAP};
use crate::split::{SplitOptions, split_routes, split_routes_with};
use crate::validate::{Warning, WarningCode, validate};
use crate::xml::UrlsetSerializer;
use crate::{ChangeFrequency, Error, Result, Route};

/// Settings shared by every collection of one generation run.
#[derive(Clone)]
pub struct GenerationOptions {
    /// Base URL prepended to relative route URLs.
    pub hostname: Option<String>,
    pub exclude: Vec<ExcludePattern>,
    pub defaults: RouteDefaults,
    pub transform: Option<Arc<dyn RouteTransform>>,
    /// Replaces the built-in XML serializer for documents (not the index).
    pub serializer: Option<Arc<dyn UrlsetSerializer>>,
    pub max_urls: usize,
    pub max_bytes: usize,
    /// Generate even when routes fail validation.
    pub skip_validation: bool,
    /// Fixed `<lastmod>` for index entries.
    pub index_lastmod: Option<String>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            hostname: None,
            exclude: Vec::new(),
            defaults: RouteDefaults::default(),
            transform: None,
            serializer: None,
            max_urls: MAX_URLS_PER_SITEMAP,
            max_bytes: DEFAULT_MAX_BYTES,
            skip_validation: false,
            index_lastmod: None,
        }
    }
}

impl std::fmt::Debug for GenerationOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationOptions")
            .field("hostname", &self.hostname)
            .field("exclude", &self.exclude)
            .field("defaults", &self.defaults)
            .field("transform", &self.transform.is_some())
            .field("serializer", &self.serializer.is_some())
            .field("max_urls", &self.max_urls)
            .field("max_bytes", &self.max_bytes)
            .field("skip_validation", &self.skip_validation)
            .field("index_lastmod", &self.index_lastmod)
            .finish()
    }
}

impl GenerationOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    #[must_use]
    pub fn with_exclude(mut self, pattern: impl Into<ExcludePattern>) -> Self {
        self.exclude.push(pattern.into());
        self
    }

    #[must_use]
    pub const fn with_default_changefreq(mut self, changefreq: ChangeFrequency) -> Self {
        self.defaults.changefreq = Some(changefreq);
        self
    }

    #[must_use]
    pub const fn with_default_priority(mut self, priority: f64) -> Self {
        self.defaults.priority = Some(priority);
        self
    }

    #[must_use]
    pub fn with_default_lastmod(mut self, lastmod: impl Into<String>) -> Self {
        self.defaults.lastmod = Some(lastmod.into());
        self
    }

    #[must_use]
    pub fn with_transform(mut self, transform: impl RouteTransform + 'static) -> Self {
        self.transform = Some(Arc::new(transform));
        self
    }

    #[must_use]
    pub fn with_serializer(mut self, serializer: impl UrlsetSerializer + 'static) -> Self {
        self.serializer = Some(Arc::new(serializer));
        self
    }

    #[must_use]
    pub const fn with_max_urls(mut self, max_urls: usize) -> Self {
        self.max_urls = max_urls;
        self
    }

    #[must_use]
    pub const fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    #[must_use]
    pub const fn with_skip_validation(mut self, skip: bool) -> Self {
        self.skip_validation = skip;
        self
    }

    #[must_use]
    pub fn with_index_lastmod(mut self, lastmod: impl Into<String>) -> Self {
        self.index_lastmod = Some(lastmod.into());
        self
    }

    fn split_options(&self, collection: &str) -> SplitOptions {
        SplitOptions {
            max_urls: self.max_urls,
            max_bytes: self.max_bytes,
            hostname: self.hostname.clone(),
            base_name: base_name(collection),
            index_lastmod: self.index_lastmod.clone(),
        }
    }
}

/// One rendered file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SitemapDocument {
    pub filename: String,
    pub xml: String,
    pub byte_size: usize,
    /// Routes in this document; zero for an index.
    pub route_count: usize,
}

/// Everything produced for one collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    /// Collection name.
    pub name: String,
    /// One document, or every chunk when split.
    pub documents: Vec<SitemapDocument>,
    /// Index document, present exactly when the output was split.
    pub index: Option<SitemapDocument>,
    pub warnings: Vec<Warning>,
    /// Routes written across all documents.
    pub route_count: usize,
    pub excluded_count: usize,
    pub duplicate_count: usize,
}

impl GenerationResult {
    #[must_use]
    pub const fn was_split(&self) -> bool {
        self.index.is_some()
    }

    /// File to advertise to crawlers: the index when split, else the only document.
    #[must_use]
    pub fn entry_filename(&self) -> Option<&str> {
        self.index
            .as_ref()
            .or_else(|| self.documents.first())
            .map(|doc| doc.filename.as_str())
    }
}

/// Run the full pipeline over one collection.
///
/// # Errors
///
/// - [`Error::InvalidPattern`] when an exclusion pattern does not compile
/// - [`Error::Transform`] when the transform fails for any route
/// - [`Error::Validation`] with every violation when routes are invalid
/// - [`Error::Serialization`] when a custom serializer fails
#[instrument(skip_all, fields(collection = %name, input = routes.len()))]
pub async fn generate(
    name: &str,
    routes: Vec<Route>,
    options: &GenerationOptions,
) -> Result<GenerationResult> {
    let mut warnings = Vec::new();

    let matcher = ExclusionMatcher::new(&options.exclude)?;
    let before = routes.len();
    let routes = filter_excluded(routes, &matcher);
    let excluded_count = before - routes.len();
    if excluded_count > 0 {
        warnings.push(Warning::new(
            WarningCode::RoutesExcluded,
            format!("{excluded_count} route(s) matched an exclusion pattern"),
        ));
    }

    let routes = match &options.transform {
        Some(transform) => {
            let outcome = apply_transform(routes, transform.as_ref()).await?;
            if outcome.dropped > 0 {
                warnings.push(Warning::new(
                    WarningCode::RoutesDroppedByTransform,
                    format!("{} route(s) dropped by the transform", outcome.dropped),
                ));
            }
            outcome.routes
        },
        None => routes,
    };

    let routes = apply_defaults(routes, &options.defaults);
    let routes = resolve_hostnames(routes, options.hostname.as_deref());

    if options.skip_validation {
        debug!("validation skipped");
    } else {
        let report = validate(&routes);
        if !report.valid {
            warn!(errors = report.errors.len(), "routes failed validation");
            return Err(Error::Validation(Box::new(report)));
        }
        warnings.extend(report.warnings);
    }

    let before = routes.len();
    let routes = dedupe(routes);
    let duplicate_count = before - routes.len();
    if duplicate_count > 0 {
        warnings.push(Warning::new(
            WarningCode::DuplicatesRemoved,
            format!("{duplicate_count} duplicate route(s) removed"),
        ));
    }

    let route_count = routes.len();
    let split_options = options.split_options(name);
    let split = match &options.serializer {
        Some(serializer) => split_routes_with(routes, &split_options, serializer.as_ref())?,
        None => split_routes(routes, &split_options)?,
    };

    if split.was_split {
        warnings.push(Warning::new(
            WarningCode::DocumentSplit,
            format!(
                "{route_count} routes split across {} documents",
                split.chunks.len()
            ),
        ));
    }

    let index = match (split.index_filename, split.index_xml) {
        (Some(filename), Some(xml)) => Some(SitemapDocument {
            filename,
            byte_size: xml.len(),
            xml,
            route_count: 0,
        }),
        _ => None,
    };
    let documents: Vec<SitemapDocument> = split
        .chunks
        .into_iter()
        .map(|chunk| SitemapDocument {
            filename: chunk.filename,
            xml: chunk.xml,
            byte_size: chunk.byte_size,
            route_count: chunk.routes.len(),
        })
        .collect();

    info!(
        routes = route_count,
        documents = documents.len(),
        warnings = warnings.len(),
        "sitemap generated"
    );

    Ok(GenerationResult {
        name: name.to_string(),
        documents,
        index,
        warnings,
        route_count,
        excluded_count,
        duplicate_count,
    })
}

/// Generate every collection concurrently.
///
/// Results are returned in input order, one per collection.
pub async fn generate_all<I, N>(
    collections: I,
    options: &GenerationOptions,
) -> Vec<(String, Result<GenerationResult>)>
where
    I: IntoIterator<Item = (N, RouteSource)>,
    N: Into<String>,
{
    let pending = collections.into_iter().map(|(name, source)| {
        let name: String = name.into();
        async move {
            let result = match source.resolve(&name).await {
                Ok(routes) => generate(&name, routes, options).await,
                Err(e) => Err(e),
            };
            if let Err(e) = &result {
                warn!(collection = %name, category = e.category(), "collection failed: {e}");
            }
            (name, result)
        }
    });

    join_all(pending).await
}

//! Size-aware splitting of route lists into sitemap documents.
//!
//! The protocol caps one document at [`MAX_URLS_PER_SITEMAP`] entries and 50 MiB.
//! [`split_routes`] keeps every document under both a URL-count limit and a
//! byte budget, emitting a `<sitemapindex>` whenever more than one document
//! is needed.
//!
//! ## Algorithm
//!
//! 1. Empty input yields one empty-but-valid document.
//! 2. When the count fits, the full list is rendered once; if the bytes fit
//!    too, that render is the result.
//! 3. Otherwise routes are packed first-fit in input order. Each route's
//!    marginal cost is its rendered size alone minus the empty-document
//!    overhead. A route that would overflow the current chunk closes it.
//! 4. Each chunk is rendered independently and an index references them all.
//!
//! A route that alone exceeds the byte budget still gets its own chunk.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::limits::{DEFAULT_MAX_BYTES, MAX_URLS_PER_SITEMAP, SIZE_SAMPLE_ROUTES};
use crate::xml::{IndexEntry, UrlsetSerializer, XmlSerializer, build_index_document, byte_size};
use crate::{Error, Result, Route};

/// Default file base name.
pub const DEFAULT_BASE_NAME: &str = "sitemap";

/// Thresholds and naming for one split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitOptions {
    /// Maximum routes per document.
    pub max_urls: usize,
    /// Byte budget per document.
    pub max_bytes: usize,
    /// Prefix for index `<loc>` values; bare filenames when `None`.
    pub hostname: Option<String>,
    /// File base name (`sitemap` or `sitemap-<collection>`).
    pub base_name: String,
    /// Fixed index `<lastmod>`; today's UTC date when `None`.
    pub index_lastmod: Option<String>,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            max_urls: MAX_URLS_PER_SITEMAP,
            max_bytes: DEFAULT_MAX_BYTES,
            hostname: None,
            base_name: DEFAULT_BASE_NAME.to_string(),
            index_lastmod: None,
        }
    }
}

impl SplitOptions {
    /// Filename of the unsplit document.
    #[must_use]
    pub fn single_filename(&self) -> String {
        format!("{}.xml", self.base_name)
    }

    /// Filename of the zero-based chunk `index`.
    #[must_use]
    pub fn chunk_filename(&self, index: usize) -> String {
        format!("{}-{index}.xml", self.base_name)
    }

    /// Filename of the index document.
    #[must_use]
    pub fn index_filename(&self) -> String {
        format!("{}-index.xml", self.base_name)
    }

    /// Location written into the index for `filename`.
    #[must_use]
    pub fn qualify(&self, filename: &str) -> String {
        match &self.hostname {
            Some(host) => format!("{}/{filename}", host.trim_end_matches('/')),
            None => filename.to_string(),
        }
    }
}

/// One rendered document.
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapChunk {
    /// Zero-based position among the chunks.
    pub index: usize,
    pub filename: String,
    pub routes: Vec<Route>,
    pub xml: String,
    /// UTF-8 length of `xml`.
    pub byte_size: usize,
}

/// Result of [`split_routes`].
#[derive(Debug, Clone, PartialEq)]
pub struct SplitResult {
    pub chunks: Vec<SitemapChunk>,
    /// Index document, present exactly when `was_split`.
    pub index_xml: Option<String>,
    /// Filename of the index document, present exactly when `was_split`.
    pub index_filename: Option<String>,
    pub was_split: bool,
}

impl SplitResult {
    /// Total routes across all chunks.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.chunks.iter().map(|c| c.routes.len()).sum()
    }
}

/// Extrapolated size of a route list, for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeEstimate {
    pub route_count: usize,
    pub estimated_bytes: usize,
    pub needs_split: bool,
    pub estimated_chunks: usize,
}

/// Split `routes` with the built-in XML serializer.
///
/// # Errors
///
/// The built-in serializer does not fail, so this only errors if that
/// changes; see [`split_routes_with`].
pub fn split_routes(routes: Vec<Route>, options: &SplitOptions) -> Result<SplitResult> {
    split_routes_with(routes, options, &XmlSerializer)
}

/// Split `routes`, measuring and rendering through `serializer`.
///
/// # Errors
///
/// Returns [`Error::Serialization`] when `serializer` fails.
#[instrument(skip_all, fields(route_count = routes.len(), max_urls = options.max_urls, max_bytes = options.max_bytes))]
pub fn split_routes_with<S>(
    routes: Vec<Route>,
    options: &SplitOptions,
    serializer: &S,
) -> Result<SplitResult>
where
    S: UrlsetSerializer + ?Sized,
{
    let max_urls = options.max_urls.max(1);

    if routes.len() <= max_urls {
        let xml = render(serializer, &routes)?;
        let size = byte_size(&xml);
        if size <= options.max_bytes {
            debug!(bytes = size, "routes fit in a single document");
            return Ok(SplitResult {
                chunks: vec![SitemapChunk {
                    index: 0,
                    filename: options.single_filename(),
                    routes,
                    xml,
                    byte_size: size,
                }],
                index_xml: None,
                index_filename: None,
                was_split: false,
            });
        }
    }

    let overhead = byte_size(&render(serializer, &[])?);
    let mut groups: Vec<Vec<Route>> = Vec::new();
    let mut current: Vec<Route> = Vec::new();
    let mut current_bytes = overhead;

    for route in routes {
        let alone = byte_size(&render(serializer, std::slice::from_ref(&route))?);
        let cost = alone.saturating_sub(overhead);

        let over_count = current.len() >= max_urls;
        let over_bytes = current_bytes.saturating_add(cost) > options.max_bytes;
        if !current.is_empty() && (over_count || over_bytes) {
            groups.push(std::mem::take(&mut current));
            current_bytes = overhead;
        }

        current_bytes = current_bytes.saturating_add(cost);
        current.push(route);
    }
    if !current.is_empty() {
        groups.push(current);
    }

    let mut chunks = Vec::with_capacity(groups.len());
    for (index, routes) in groups.into_iter().enumerate() {
        let xml = render(serializer, &routes)?;
        chunks.push(SitemapChunk {
            index,
            filename: options.chunk_filename(index),
            byte_size: byte_size(&xml),
            routes,
            xml,
        });
    }

    let lastmod = options
        .index_lastmod
        .clone()
        .unwrap_or_else(|| Utc::now().format("%Y-%m-%d").to_string());
    let entries: Vec<IndexEntry> = chunks
        .iter()
        .map(|chunk| IndexEntry {
            loc: options.qualify(&chunk.filename),
            lastmod: Some(lastmod.clone()),
        })
        .collect();

    debug!(chunk_count = chunks.len(), "routes split across documents");

    Ok(SplitResult {
        chunks,
        index_xml: Some(build_index_document(&entries)),
        index_filename: Some(options.index_filename()),
        was_split: true,
    })
}

/// Estimate the rendered size of `routes` with the built-in serializer.
///
/// # Errors
///
/// See [`estimate_total_size_with`].
pub fn estimate_total_size(routes: &[Route], options: &SplitOptions) -> Result<SizeEstimate> {
    estimate_total_size_with(routes, options, &XmlSerializer)
}

/// Estimate the rendered size of `routes` from a sample of at most
/// [`SIZE_SAMPLE_ROUTES`] routes, extrapolated linearly.
///
/// This is a reporting aid; [`split_routes_with`] never relies on it.
///
/// # Errors
///
/// Returns [`Error::Serialization`] when `serializer` fails.
pub fn estimate_total_size_with<S>(
    routes: &[Route],
    options: &SplitOptions,
    serializer: &S,
) -> Result<SizeEstimate>
where
    S: UrlsetSerializer + ?Sized,
{
    let overhead = byte_size(&render(serializer, &[])?);
    let sample = &routes[..routes.len().min(SIZE_SAMPLE_ROUTES)];

    let estimated_bytes = if sample.is_empty() {
        overhead
    } else {
        let sample_body = byte_size(&render(serializer, sample)?).saturating_sub(overhead);
        overhead.saturating_add(
            sample_body
                .saturating_mul(routes.len())
                .div_ceil(sample.len()),
        )
    };

    let max_urls = options.max_urls.max(1);
    let max_bytes = options.max_bytes.max(1);
    let needs_split = routes.len() > max_urls || estimated_bytes > max_bytes;
    let estimated_chunks = routes
        .len()
        .div_ceil(max_urls)
        .max(estimated_bytes.div_ceil(max_bytes))
        .max(1);

    Ok(SizeEstimate {
        route_count: routes.len(),
        estimated_bytes,
        needs_split,
        estimated_chunks,
    })
}

fn render<S>(serializer: &S, routes: &[Route]) -> Result<String>
where
    S: UrlsetSerializer + ?Sized,
{
    serializer
        .serialize(routes)
        .map_err(|e| Error::Serialization(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use crate::xml::build_document;
    use proptest::prelude::*;

    fn routes(count: usize) -> Vec<Route> {
        (0..count)
            .map(|i| Route::new(format!("https://example.com/page/{i}")))
            .collect()
    }

    fn options(max_urls: usize, max_bytes: usize) -> SplitOptions {
        SplitOptions {
            max_urls,
            max_bytes,
            index_lastmod: Some("2024-06-01".to_string()),
            ..SplitOptions::default()
        }
    }

    #[test]
    fn test_empty_input_yields_one_empty_document() {
        // Given: No routes
        // When: Splitting
        let result = split_routes(Vec::new(), &SplitOptions::default()).unwrap();

        // Then: One valid empty document is produced without an index
        assert!(!result.was_split);
        assert!(result.index_xml.is_none());
        assert_eq!(result.chunks.len(), 1);
        assert_eq!(result.chunks[0].filename, "sitemap.xml");
        assert_eq!(result.chunks[0].xml, build_document(&[]));
    }

    #[test]
    fn test_exactly_max_urls_is_not_split() {
        let result = split_routes(routes(10), &options(10, DEFAULT_MAX_BYTES)).unwrap();

        assert!(!result.was_split);
        assert_eq!(result.chunks.len(), 1);
        assert_eq!(result.route_count(), 10);
    }

    #[test]
    fn test_one_over_max_urls_splits_in_order() {
        // Given: N + 1 routes
        let input = routes(11);

        // When: Splitting with max_urls = N
        let result = split_routes(input.clone(), &options(10, DEFAULT_MAX_BYTES)).unwrap();

        // Then: The routes are spread over two chunks in their original order
        assert!(result.was_split);
        assert_eq!(result.chunks.len(), 2);
        assert_eq!(result.route_count(), 11);
        let flattened: Vec<Route> = result
            .chunks
            .iter()
            .flat_map(|c| c.routes.iter().cloned())
            .collect();
        assert_eq!(flattened, input);
        assert_eq!(result.chunks[0].filename, "sitemap-0.xml");
        assert_eq!(result.chunks[1].filename, "sitemap-1.xml");
        assert_eq!(result.index_filename.as_deref(), Some("sitemap-index.xml"));
    }

    #[test]
    fn test_hundred_thousand_routes_make_two_full_chunks() {
        let result = split_routes(routes(100_000), &options(50_000, DEFAULT_MAX_BYTES)).unwrap();

        assert!(result.was_split);
        assert_eq!(result.chunks.len(), 2);
        assert!(result.chunks.iter().all(|c| c.routes.len() == 50_000));

        let index = result.index_xml.unwrap();
        assert_eq!(index.matches("<sitemap>").count(), 2);
        assert!(index.contains("<loc>sitemap-0.xml</loc>"));
        assert!(index.contains("<loc>sitemap-1.xml</loc>"));
    }

    #[test]
    fn test_byte_budget_forces_split() {
        // Given: A budget that fits roughly three routes
        let overhead = build_document(&[]).len();
        let one = build_document(&routes(1)).len() - overhead;
        let budget = overhead + one * 3 + one / 2;

        // When: Splitting ten routes
        let result = split_routes(routes(10), &options(50_000, budget)).unwrap();

        // Then: Every chunk respects the budget
        assert!(result.was_split);
        assert!(result.chunks.len() >= 4);
        for chunk in &result.chunks {
            assert!(chunk.byte_size <= budget, "chunk {} too large", chunk.index);
            assert_eq!(chunk.byte_size, chunk.xml.len());
        }
        assert_eq!(result.route_count(), 10);
    }

    #[test]
    fn test_oversized_route_gets_its_own_chunk() {
        let result = split_routes(routes(3), &options(50_000, 10)).unwrap();

        assert!(result.was_split);
        assert_eq!(result.chunks.len(), 3);
        assert!(result.chunks.iter().all(|c| c.routes.len() == 1));
    }

    #[test]
    fn test_single_oversized_route_goes_through_packing() {
        // Given: One route whose document exceeds the byte budget
        let input = routes(1);

        // When: Splitting
        let result = split_routes(input.clone(), &options(50_000, 10)).unwrap();

        // Then: It lands alone in a numbered chunk referenced by an index
        assert!(result.was_split);
        assert_eq!(result.chunks.len(), 1);
        assert_eq!(result.chunks[0].routes, input);
        assert_eq!(result.chunks[0].filename, "sitemap-0.xml");
        assert_eq!(result.index_filename.as_deref(), Some("sitemap-index.xml"));
        assert!(result.index_xml.unwrap().contains("sitemap-0.xml"));
    }

    #[test]
    fn test_index_locations_use_hostname() {
        let opts = SplitOptions {
            hostname: Some("https://example.com/".to_string()),
            base_name: "sitemap-blog".to_string(),
            ..options(2, DEFAULT_MAX_BYTES)
        };

        let result = split_routes(routes(3), &opts).unwrap();

        let index = result.index_xml.unwrap();
        assert!(index.contains("<loc>https://example.com/sitemap-blog-0.xml</loc>"));
        assert!(index.contains("<loc>https://example.com/sitemap-blog-1.xml</loc>"));
        assert_eq!(index.matches("<lastmod>2024-06-01</lastmod>").count(), 2);
        assert_eq!(result.index_filename.as_deref(), Some("sitemap-blog-index.xml"));
    }

    struct FailingSerializer;

    impl UrlsetSerializer for FailingSerializer {
        fn serialize(&self, _routes: &[Route]) -> std::result::Result<String, BoxError> {
            Err("renderer offline".into())
        }
    }

    #[test]
    fn test_serializer_failure_propagates() {
        let err = split_routes_with(routes(2), &SplitOptions::default(), &FailingSerializer)
            .unwrap_err();

        assert!(matches!(err, Error::Serialization(ref msg) if msg.contains("renderer offline")));
    }

    struct PaddedSerializer;

    impl UrlsetSerializer for PaddedSerializer {
        fn serialize(&self, routes: &[Route]) -> std::result::Result<String, BoxError> {
            Ok(format!("{}{}", build_document(routes), " ".repeat(routes.len() * 1000)))
        }
    }

    #[test]
    fn test_custom_serializer_drives_packing() {
        // Given: A serializer that inflates every route by 1000 bytes
        let budget = build_document(&[]).len() + 2500;

        // When: Splitting with a budget that the built-in output would meet
        let result = split_routes_with(routes(4), &options(50_000, budget), &PaddedSerializer)
            .unwrap();

        // Then: Packing follows the custom sizes
        assert!(result.was_split);
        assert!(result.chunks.iter().all(|c| c.routes.len() <= 2));
        assert!(result.chunks.iter().all(|c| c.xml.ends_with(' ')));
    }

    #[test]
    fn test_estimate_small_set() {
        let estimate = estimate_total_size(&routes(10), &SplitOptions::default()).unwrap();

        assert_eq!(estimate.route_count, 10);
        assert!(!estimate.needs_split);
        assert_eq!(estimate.estimated_chunks, 1);
        assert_eq!(estimate.estimated_bytes, build_document(&routes(10)).len());
    }

    #[test]
    fn test_estimate_large_set() {
        let estimate = estimate_total_size(&routes(120_000), &SplitOptions::default()).unwrap();

        assert!(estimate.needs_split);
        assert_eq!(estimate.estimated_chunks, 3);
    }

    #[test]
    fn test_estimate_empty() {
        let estimate = estimate_total_size(&[], &SplitOptions::default()).unwrap();

        assert_eq!(estimate.route_count, 0);
        assert_eq!(estimate.estimated_bytes, build_document(&[]).len());
        assert!(!estimate.needs_split);
        assert_eq!(estimate.estimated_chunks, 1);
    }

    proptest! {
        #[test]
        fn test_split_preserves_order_and_limits(count in 0usize..120, max_urls in 1usize..20) {
            let input = routes(count);

            let result = split_routes(input.clone(), &options(max_urls, DEFAULT_MAX_BYTES)).unwrap();

            let flattened: Vec<Route> = result
                .chunks
                .iter()
                .flat_map(|c| c.routes.iter().cloned())
                .collect();
            prop_assert_eq!(flattened, input);
            prop_assert!(result.chunks.iter().all(|c| c.routes.len() <= max_urls));
            prop_assert_eq!(result.was_split, count > max_urls);
            prop_assert_eq!(result.index_xml.is_some(), result.was_split);
            for (i, chunk) in result.chunks.iter().enumerate() {
                prop_assert_eq!(chunk.index, i);
            }
        }
    }
}

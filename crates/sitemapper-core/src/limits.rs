//! Protocol limits enforced by validation and splitting.

/// Maximum `<url>` entries in one sitemap document.
pub const MAX_URLS_PER_SITEMAP: usize = 50_000;

/// Hard size ceiling of one uncompressed sitemap document.
pub const MAX_SITEMAP_BYTES: usize = 50 * 1024 * 1024;

/// Default byte budget per document, kept below [`MAX_SITEMAP_BYTES`].
pub const DEFAULT_MAX_BYTES: usize = 45 * 1024 * 1024;

/// Maximum length of a `<loc>` value, in characters.
pub const MAX_URL_LENGTH: usize = 2048;

/// Maximum `<image:image>` entries per route.
pub const MAX_IMAGES_PER_ROUTE: usize = 1000;

/// Maximum `<video:tag>` entries per video.
pub const MAX_VIDEO_TAGS: usize = 32;

/// Maximum tickers in `<news:stock_tickers>`.
pub const MAX_STOCK_TICKERS: usize = 5;

/// Shortest allowed video, in seconds.
pub const MIN_VIDEO_DURATION: u32 = 1;

/// Longest allowed video (eight hours), in seconds.
pub const MAX_VIDEO_DURATION: u32 = 28_800;

pub const MAX_VIDEO_RATING: f64 = 5.0;

pub const MAX_VIDEO_TITLE_LENGTH: usize = 100;

pub const MAX_VIDEO_DESCRIPTION_LENGTH: usize = 2048;

/// Number of routes rendered when estimating total document size.
pub const SIZE_SAMPLE_ROUTES: usize = 100;

//! Protocol-level route validation.
//!
//! [`validate`] checks every route independently and never stops at the
//! first problem: the returned [`ValidationResult`] lists *all* violations
//! across *all* routes, each with a field path such as
//! `routes[2].videos[0].duration`.
//!
//! ```rust
//! use sitemapper_core::{Route, validate::validate};
//!
//! let routes = vec![
//!     Route::new("https://example.com/"),
//!     Route::new("/relative").with_priority(1.5),
//! ];
//!
//! let result = validate(&routes);
//! assert!(!result.valid);
//! assert!(result.errors.iter().any(|e| e.path == "routes[1].url"));
//! assert!(result.errors.iter().any(|e| e.path == "routes[1].priority"));
//! ```

mod date;
mod rules;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Route;

pub use date::{W3cDateTime, is_w3c_datetime, parse_w3c_datetime};

/// Machine-readable kind of a validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// A required field is empty.
    Required,
    /// A URL field does not parse as an absolute URL.
    InvalidUrl,
    /// A URL uses a scheme other than `http`/`https`.
    InvalidProtocol,
    UrlTooLong,
    UrlHasFragment,
    /// A date field is not a calendar-valid W3C datetime.
    InvalidDate,
    /// A numeric field is outside its allowed range.
    OutOfRange,
    TooManyItems,
    TooShort,
    TooLong,
    /// A code-like field (language, country) has the wrong shape.
    InvalidFormat,
    /// A video has neither `content_loc` nor `player_loc`.
    MissingVideoSource,
}

impl ErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::InvalidUrl => "invalid_url",
            Self::InvalidProtocol => "invalid_protocol",
            Self::UrlTooLong => "url_too_long",
            Self::UrlHasFragment => "url_has_fragment",
            Self::InvalidDate => "invalid_date",
            Self::OutOfRange => "out_of_range",
            Self::TooManyItems => "too_many_items",
            Self::TooShort => "too_short",
            Self::TooLong => "too_long",
            Self::InvalidFormat => "invalid_format",
            Self::MissingVideoSource => "missing_video_source",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One schema violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    pub code: ErrorCode,
    pub message: String,
    /// Field path, e.g. `routes[3].images[0].loc`.
    pub path: String,
    /// Snapshot of the offending value.
    pub value: serde_json::Value,
    /// Hint on how to fix the value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ValidationError {
    pub fn new(
        code: ErrorCode,
        path: impl Into<String>,
        message: impl Into<String>,
        value: serde_json::Value,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            path: path.into(),
            value,
            suggestion: None,
        }
    }

    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}]: {}", self.path, self.code, self.message)?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, " ({suggestion})")?;
        }
        Ok(())
    }
}

/// Kind of a non-blocking warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningCode {
    /// `lastmod` lies in the future.
    FutureLastmod,
    /// Routes with an already-seen URL were dropped.
    DuplicatesRemoved,
    /// Routes matched an exclusion pattern.
    RoutesExcluded,
    /// The transform callback returned no route.
    RoutesDroppedByTransform,
    /// Output was split across several documents plus an index.
    DocumentSplit,
}

/// Informational finding that never blocks generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub code: WarningCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl Warning {
    pub fn new(code: WarningCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: None,
        }
    }

    #[must_use]
    pub fn at(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

/// Outcome of validating a route list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    /// `true` exactly when `errors` is empty.
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub route_count: usize,
    pub warnings: Vec<Warning>,
}

/// Validate every route, collecting all errors and warnings.
#[must_use]
pub fn validate(routes: &[Route]) -> ValidationResult {
    validate_at(routes, Utc::now())
}

/// Same as [`validate`] with an explicit "now" for future-date warnings.
#[must_use]
pub fn validate_at(routes: &[Route], now: DateTime<Utc>) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for (index, route) in routes.iter().enumerate() {
        rules::check_route(route, &format!("routes[{index}]"), now, &mut errors, &mut warnings);
    }

    if !errors.is_empty() {
        tracing::debug!(
            error_count = errors.len(),
            route_count = routes.len(),
            "route validation failed"
        );
    }

    ValidationResult {
        valid: errors.is_empty(),
        errors,
        route_count: routes.len(),
        warnings,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{Alternate, ChangeFrequency, Image, News, Video};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn codes_at<'a>(result: &'a ValidationResult, path: &str) -> Vec<ErrorCode> {
        result
            .errors
            .iter()
            .filter(|e| e.path == path)
            .map(|e| e.code)
            .collect()
    }

    fn full_route() -> Route {
        Route::new("https://example.com/watch?v=1&t=2")
            .with_lastmod("2024-02-29T10:00:00+01:00")
            .with_changefreq(ChangeFrequency::Weekly)
            .with_priority(0.8)
            .with_image(Image::new("https://cdn.example.com/a.png").with_caption("A & B"))
            .with_video(
                Video::new(
                    "https://cdn.example.com/thumb.jpg",
                    "Grilling steaks",
                    "How to grill the perfect steak",
                )
                .with_content_loc("https://cdn.example.com/video.mp4"),
            )
            .with_news(News::new("Example Times", "en", "2024-05-01", "Headline"))
            .with_alternate(Alternate::new("de", "https://example.com/de/watch"))
    }

    #[test]
    fn test_valid_routes_produce_no_errors() {
        let routes = vec![Route::new("https://example.com/"), full_route()];

        let result = validate_at(&routes, now());

        assert!(result.valid, "unexpected errors: {:?}", result.errors);
        assert!(result.errors.is_empty());
        assert_eq!(result.route_count, 2);
    }

    #[test]
    fn test_empty_input_is_valid() {
        let result = validate_at(&[], now());
        assert!(result.valid);
        assert_eq!(result.route_count, 0);
    }

    #[test]
    fn test_missing_and_malformed_urls_reference_route_index() {
        let routes = vec![
            Route::new("https://example.com/"),
            Route::new(""),
            Route::new("not a url"),
            Route::new("ftp://example.com/file"),
        ];

        let result = validate_at(&routes, now());

        assert!(!result.valid);
        assert_eq!(codes_at(&result, "routes[1].url"), vec![ErrorCode::Required]);
        assert_eq!(codes_at(&result, "routes[2].url"), vec![ErrorCode::InvalidUrl]);
        assert_eq!(
            codes_at(&result, "routes[3].url"),
            vec![ErrorCode::InvalidProtocol]
        );
        assert!(codes_at(&result, "routes[0].url").is_empty());
    }

    #[test]
    fn test_relative_url_gets_hostname_suggestion() {
        let result = validate_at(&[Route::new("/about")], now());

        let error = &result.errors[0];
        assert_eq!(error.code, ErrorCode::InvalidUrl);
        assert!(error.suggestion.as_deref().unwrap().contains("hostname"));
        assert_eq!(error.value, serde_json::json!("/about"));
    }

    #[test]
    fn test_url_length_and_fragment() {
        let long = format!("https://example.com/{}", "a".repeat(2048));
        let routes = vec![Route::new(long), Route::new("https://example.com/#top")];

        let result = validate_at(&routes, now());

        assert_eq!(codes_at(&result, "routes[0].url"), vec![ErrorCode::UrlTooLong]);
        assert_eq!(
            codes_at(&result, "routes[1].url"),
            vec![ErrorCode::UrlHasFragment]
        );
    }

    #[test]
    fn test_collects_every_error_without_short_circuit() {
        let mut bad_video = Video::new("", "", "");
        bad_video.duration = Some(0);
        bad_video.rating = Some(5.5);
        bad_video.tags = vec!["t".to_string(); 33];

        let routes = vec![
            Route::new("https://example.com/a")
                .with_priority(-0.1)
                .with_lastmod("2023-02-29"),
            Route::new("https://example.com/b").with_video(bad_video),
        ];

        let result = validate_at(&routes, now());

        assert_eq!(
            codes_at(&result, "routes[0].priority"),
            vec![ErrorCode::OutOfRange]
        );
        assert_eq!(
            codes_at(&result, "routes[0].lastmod"),
            vec![ErrorCode::InvalidDate]
        );
        assert_eq!(
            codes_at(&result, "routes[1].videos[0].thumbnail_loc"),
            vec![ErrorCode::Required]
        );
        assert_eq!(
            codes_at(&result, "routes[1].videos[0].title"),
            vec![ErrorCode::Required]
        );
        assert_eq!(
            codes_at(&result, "routes[1].videos[0].description"),
            vec![ErrorCode::Required]
        );
        assert_eq!(
            codes_at(&result, "routes[1].videos[0]"),
            vec![ErrorCode::MissingVideoSource]
        );
        assert_eq!(
            codes_at(&result, "routes[1].videos[0].duration"),
            vec![ErrorCode::OutOfRange]
        );
        assert_eq!(
            codes_at(&result, "routes[1].videos[0].rating"),
            vec![ErrorCode::OutOfRange]
        );
        assert_eq!(
            codes_at(&result, "routes[1].videos[0].tags"),
            vec![ErrorCode::TooManyItems]
        );
        assert_eq!(result.errors.len(), 9);
    }

    #[test]
    fn test_priority_bounds_are_inclusive() {
        let routes = vec![
            Route::new("https://example.com/a").with_priority(0.0),
            Route::new("https://example.com/b").with_priority(1.0),
            Route::new("https://example.com/c").with_priority(f64::NAN),
        ];

        let result = validate_at(&routes, now());

        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].path, "routes[2].priority");
    }

    #[test]
    fn test_image_limit() {
        let mut route = Route::new("https://example.com/gallery");
        route.images = (0..1001)
            .map(|i| Image::new(format!("https://cdn.example.com/{i}.png")))
            .collect();

        let result = validate_at(&[route], now());

        assert_eq!(
            codes_at(&result, "routes[0].images"),
            vec![ErrorCode::TooManyItems]
        );
    }

    #[test]
    fn test_image_locations_are_checked() {
        let route = Route::new("https://example.com/")
            .with_image(Image::new("https://cdn.example.com/ok.png"))
            .with_image(Image::new("nope"));

        let result = validate_at(&[route], now());

        assert_eq!(
            codes_at(&result, "routes[0].images[1].loc"),
            vec![ErrorCode::InvalidUrl]
        );
    }

    #[test]
    fn test_news_rules() {
        let mut news = News::new("", "english", "2024-13-01", "");
        news.stock_tickers = (0..6).map(|i| format!("NASDAQ:T{i}")).collect();
        let route = Route::new("https://example.com/story").with_news(news);

        let result = validate_at(&[route], now());

        assert_eq!(
            codes_at(&result, "routes[0].news.publication.name"),
            vec![ErrorCode::Required]
        );
        assert_eq!(
            codes_at(&result, "routes[0].news.publication.language"),
            vec![ErrorCode::InvalidFormat]
        );
        assert_eq!(
            codes_at(&result, "routes[0].news.publication_date"),
            vec![ErrorCode::InvalidDate]
        );
        assert_eq!(
            codes_at(&result, "routes[0].news.title"),
            vec![ErrorCode::Required]
        );
        assert_eq!(
            codes_at(&result, "routes[0].news.stock_tickers"),
            vec![ErrorCode::TooManyItems]
        );
    }

    #[test]
    fn test_alternate_rules() {
        let route = Route::new("https://example.com/")
            .with_alternate(Alternate::new("x", "https://example.com/x"))
            .with_alternate(Alternate::new("fr", ""));

        let result = validate_at(&[route], now());

        assert_eq!(
            codes_at(&result, "routes[0].alternates[0].hreflang"),
            vec![ErrorCode::TooShort]
        );
        assert_eq!(
            codes_at(&result, "routes[0].alternates[1].href"),
            vec![ErrorCode::Required]
        );
    }

    #[test]
    fn test_future_lastmod_is_a_warning_only() {
        let routes = vec![Route::new("https://example.com/").with_lastmod("2030-01-01")];

        let result = validate_at(&routes, now());

        assert!(result.valid);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].code, WarningCode::FutureLastmod);
        assert_eq!(result.warnings[0].path.as_deref(), Some("routes[0].lastmod"));
    }

    #[test]
    fn test_error_display_includes_path_and_code() {
        let error = ValidationError::new(
            ErrorCode::OutOfRange,
            "routes[0].priority",
            "priority must be between 0.0 and 1.0",
            serde_json::json!(2.0),
        )
        .with_suggestion("use 1.0");

        assert_eq!(
            error.to_string(),
            "routes[0].priority [out_of_range]: priority must be between 0.0 and 1.0 (use 1.0)"
        );
    }
}

//! Per-field validators composed into the route-level check.
//!
//! Every function appends to the shared error list instead of returning
//! early, which is what lets one validation pass report everything.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde_json::json;
use url::Url;

use super::date::parse_w3c_datetime;
use super::{ErrorCode, ValidationError, Warning, WarningCode};
use crate::limits::{
    MAX_IMAGES_PER_ROUTE, MAX_STOCK_TICKERS, MAX_URL_LENGTH, MAX_VIDEO_DESCRIPTION_LENGTH,
    MAX_VIDEO_DURATION, MAX_VIDEO_RATING, MAX_VIDEO_TAGS, MAX_VIDEO_TITLE_LENGTH,
    MIN_VIDEO_DURATION,
};
use crate::{Alternate, Image, News, Route, Video};

static LANGUAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]{2,3}(-[A-Za-z]{2,4})?$").unwrap());

static COUNTRY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z]{2}$").unwrap());

type Errors = Vec<ValidationError>;

pub(super) fn check_route(
    route: &Route,
    path: &str,
    now: DateTime<Utc>,
    errors: &mut Errors,
    warnings: &mut Vec<Warning>,
) {
    check_page_url(&route.url, &format!("{path}.url"), errors);

    if let Some(lastmod) = &route.lastmod {
        let field = format!("{path}.lastmod");
        if let Some(parsed) = check_date(lastmod, &field, errors) {
            if parsed.to_utc() > now {
                warnings.push(
                    Warning::new(
                        WarningCode::FutureLastmod,
                        format!("lastmod '{lastmod}' is in the future"),
                    )
                    .at(field),
                );
            }
        }
    }

    if let Some(priority) = route.priority {
        check_range(
            priority,
            0.0,
            1.0,
            &format!("{path}.priority"),
            "priority",
            errors,
        );
    }

    if route.images.len() > MAX_IMAGES_PER_ROUTE {
        errors.push(
            ValidationError::new(
                ErrorCode::TooManyItems,
                format!("{path}.images"),
                format!(
                    "a route may list at most {MAX_IMAGES_PER_ROUTE} images, found {}",
                    route.images.len()
                ),
                json!(route.images.len()),
            )
            .with_suggestion("Split the images across several pages"),
        );
    }
    for (i, image) in route.images.iter().enumerate() {
        check_image(image, &format!("{path}.images[{i}]"), errors);
    }

    for (i, video) in route.videos.iter().enumerate() {
        check_video(video, &format!("{path}.videos[{i}]"), errors);
    }

    if let Some(news) = &route.news {
        check_news(news, &format!("{path}.news"), errors);
    }

    for (i, alternate) in route.alternates.iter().enumerate() {
        check_alternate(alternate, &format!("{path}.alternates[{i}]"), errors);
    }
}

/// The page location carries extra protocol constraints on top of
/// [`check_url`].
fn check_page_url(value: &str, path: &str, errors: &mut Errors) {
    if !check_url(value, path, errors) {
        return;
    }

    let length = value.chars().count();
    if length > MAX_URL_LENGTH {
        errors.push(
            ValidationError::new(
                ErrorCode::UrlTooLong,
                path,
                format!("URL is {length} characters long, the limit is {MAX_URL_LENGTH}"),
                json!(value),
            )
            .with_suggestion("Shorten the path or drop tracking query parameters"),
        );
    }

    if value.contains('#') {
        errors.push(
            ValidationError::new(
                ErrorCode::UrlHasFragment,
                path,
                "sitemap URLs must not contain a fragment",
                json!(value),
            )
            .with_suggestion("Remove everything from '#' onwards"),
        );
    }
}

/// Checks an absolute http(s) URL. Returns `true` when it parsed.
fn check_url(value: &str, path: &str, errors: &mut Errors) -> bool {
    if value.trim().is_empty() {
        errors.push(ValidationError::new(
            ErrorCode::Required,
            path,
            "URL is required",
            json!(value),
        ));
        return false;
    }

    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => true,
        Ok(url) => {
            errors.push(
                ValidationError::new(
                    ErrorCode::InvalidProtocol,
                    path,
                    format!("URL scheme '{}' is not allowed", url.scheme()),
                    json!(value),
                )
                .with_suggestion("Use an http:// or https:// URL"),
            );
            false
        },
        Err(e) => {
            let mut error = ValidationError::new(
                ErrorCode::InvalidUrl,
                path,
                format!("'{value}' is not a valid absolute URL: {e}"),
                json!(value),
            );
            if value.starts_with('/') {
                error = error
                    .with_suggestion("Set a hostname so relative paths resolve to absolute URLs");
            }
            errors.push(error);
            false
        },
    }
}

fn check_optional_url(value: Option<&String>, path: &str, errors: &mut Errors) {
    if let Some(value) = value {
        check_url(value, path, errors);
    }
}

fn check_date(
    value: &str,
    path: &str,
    errors: &mut Errors,
) -> Option<super::date::W3cDateTime> {
    let parsed = parse_w3c_datetime(value);
    if parsed.is_none() {
        errors.push(
            ValidationError::new(
                ErrorCode::InvalidDate,
                path,
                format!("'{value}' is not a valid W3C datetime"),
                json!(value),
            )
            .with_suggestion("Use YYYY, YYYY-MM, YYYY-MM-DD or YYYY-MM-DDThh:mm:ss+hh:mm"),
        );
    }
    parsed
}

fn check_range(value: f64, min: f64, max: f64, path: &str, field: &str, errors: &mut Errors) {
    if !value.is_finite() || value < min || value > max {
        errors.push(
            ValidationError::new(
                ErrorCode::OutOfRange,
                path,
                format!("{field} must be between {min:.1} and {max:.1}"),
                json!(value),
            )
            .with_suggestion(format!("Use a value between {min:.1} and {max:.1}")),
        );
    }
}

fn check_required_text(value: &str, path: &str, field: &str, errors: &mut Errors) -> bool {
    if value.trim().is_empty() {
        errors.push(ValidationError::new(
            ErrorCode::Required,
            path,
            format!("{field} is required"),
            json!(value),
        ));
        return false;
    }
    true
}

fn check_max_length(value: &str, max: usize, path: &str, field: &str, errors: &mut Errors) {
    let length = value.chars().count();
    if length > max {
        errors.push(ValidationError::new(
            ErrorCode::TooLong,
            path,
            format!("{field} is {length} characters long, the limit is {max}"),
            json!(value),
        ));
    }
}

fn check_image(image: &Image, path: &str, errors: &mut Errors) {
    check_url(&image.loc, &format!("{path}.loc"), errors);
    check_optional_url(image.license.as_ref(), &format!("{path}.license"), errors);
}

fn check_video(video: &Video, path: &str, errors: &mut Errors) {
    check_url(&video.thumbnail_loc, &format!("{path}.thumbnail_loc"), errors);

    let title_path = format!("{path}.title");
    if check_required_text(&video.title, &title_path, "video title", errors) {
        check_max_length(
            &video.title,
            MAX_VIDEO_TITLE_LENGTH,
            &title_path,
            "video title",
            errors,
        );
    }

    let description_path = format!("{path}.description");
    if check_required_text(
        &video.description,
        &description_path,
        "video description",
        errors,
    ) {
        check_max_length(
            &video.description,
            MAX_VIDEO_DESCRIPTION_LENGTH,
            &description_path,
            "video description",
            errors,
        );
    }

    if video.content_loc.is_none() && video.player_loc.is_none() {
        errors.push(
            ValidationError::new(
                ErrorCode::MissingVideoSource,
                path,
                "a video needs content_loc or player_loc",
                json!(null),
            )
            .with_suggestion("Provide the media file URL or an embeddable player URL"),
        );
    }
    check_optional_url(video.content_loc.as_ref(), &format!("{path}.content_loc"), errors);
    check_optional_url(video.player_loc.as_ref(), &format!("{path}.player_loc"), errors);

    if let Some(duration) = video.duration {
        if !(MIN_VIDEO_DURATION..=MAX_VIDEO_DURATION).contains(&duration) {
            errors.push(
                ValidationError::new(
                    ErrorCode::OutOfRange,
                    format!("{path}.duration"),
                    format!(
                        "duration must be between {MIN_VIDEO_DURATION} and {MAX_VIDEO_DURATION} seconds"
                    ),
                    json!(duration),
                )
                .with_suggestion("Give the length in whole seconds, at most eight hours"),
            );
        }
    }

    if let Some(rating) = video.rating {
        check_range(
            rating,
            0.0,
            MAX_VIDEO_RATING,
            &format!("{path}.rating"),
            "rating",
            errors,
        );
    }

    if let Some(date) = &video.publication_date {
        check_date(date, &format!("{path}.publication_date"), errors);
    }
    if let Some(date) = &video.expiration_date {
        check_date(date, &format!("{path}.expiration_date"), errors);
    }

    if video.tags.len() > MAX_VIDEO_TAGS {
        errors.push(ValidationError::new(
            ErrorCode::TooManyItems,
            format!("{path}.tags"),
            format!(
                "a video may have at most {MAX_VIDEO_TAGS} tags, found {}",
                video.tags.len()
            ),
            json!(video.tags.len()),
        ));
    }

    if let Some(restriction) = &video.restriction {
        for (i, country) in restriction.countries.iter().enumerate() {
            if !COUNTRY_RE.is_match(country) {
                errors.push(
                    ValidationError::new(
                        ErrorCode::InvalidFormat,
                        format!("{path}.restriction.countries[{i}]"),
                        format!("'{country}' is not an ISO 3166 alpha-2 country code"),
                        json!(country),
                    )
                    .with_suggestion("Use two-letter codes such as US or DE"),
                );
            }
        }
    }

    if let Some(uploader) = &video.uploader {
        check_required_text(
            &uploader.name,
            &format!("{path}.uploader.name"),
            "uploader name",
            errors,
        );
        check_optional_url(uploader.info.as_ref(), &format!("{path}.uploader.info"), errors);
    }
}

fn check_news(news: &News, path: &str, errors: &mut Errors) {
    check_required_text(
        &news.publication.name,
        &format!("{path}.publication.name"),
        "publication name",
        errors,
    );

    let language_path = format!("{path}.publication.language");
    if check_required_text(
        &news.publication.language,
        &language_path,
        "publication language",
        errors,
    ) && !LANGUAGE_RE.is_match(&news.publication.language)
    {
        errors.push(
            ValidationError::new(
                ErrorCode::InvalidFormat,
                language_path,
                format!(
                    "'{}' is not an ISO 639 language code",
                    news.publication.language
                ),
                json!(news.publication.language),
            )
            .with_suggestion("Use a code such as en, fr or zh-cn"),
        );
    }

    check_date(
        &news.publication_date,
        &format!("{path}.publication_date"),
        errors,
    );
    check_required_text(&news.title, &format!("{path}.title"), "news title", errors);

    if news.stock_tickers.len() > MAX_STOCK_TICKERS {
        errors.push(ValidationError::new(
            ErrorCode::TooManyItems,
            format!("{path}.stock_tickers"),
            format!(
                "at most {MAX_STOCK_TICKERS} stock tickers are allowed, found {}",
                news.stock_tickers.len()
            ),
            json!(news.stock_tickers),
        ));
    }
}

fn check_alternate(alternate: &Alternate, path: &str, errors: &mut Errors) {
    check_url(&alternate.href, &format!("{path}.href"), errors);

    if alternate.hreflang.trim().chars().count() < 2 {
        errors.push(
            ValidationError::new(
                ErrorCode::TooShort,
                format!("{path}.hreflang"),
                "hreflang must be at least 2 characters",
                json!(alternate.hreflang),
            )
            .with_suggestion("Use a language code such as en or en-GB, or x-default"),
        );
    }
}

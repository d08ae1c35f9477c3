//! Sitemap XML serialization.
//!
//! Renders route lists into `<urlset>` documents and chunk references into
//! `<sitemapindex>` documents. The root element only declares the extension
//! namespaces that the routes actually use, decided by a single
//! [`NamespaceFlags`] pre-pass before any route is rendered.
//!
//! ## Format
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://example.com/a?x=1&amp;y=2</loc>
//!     <priority>1.0</priority>
//!   </url>
//! </urlset>
//! ```
//!
//! Free text goes through the five predefined XML entities. URL values are
//! reparsed and re-serialized before escaping; a value that does not parse is
//! escaped as-is so serialization never fails.
//!
//! ```rust
//! use sitemapper_core::{Route, xml::build_document};
//!
//! let xml = build_document(&[Route::new("https://example.com/a?x=1&y=2").with_priority(1.0)]);
//! assert!(xml.contains("<loc>https://example.com/a?x=1&amp;y=2</loc>"));
//! assert!(xml.contains("<priority>1.0</priority>"));
//! ```

use std::borrow::Cow;

use quick_xml::escape::escape;
use url::Url;

use crate::error::BoxError;
use crate::{Alternate, Image, News, Route, Video};

pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
pub const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
pub const IMAGE_NS: &str = "http://www.google.com/schemas/sitemap-image/1.1";
pub const VIDEO_NS: &str = "http://www.google.com/schemas/sitemap-video/1.1";
pub const NEWS_NS: &str = "http://www.google.com/schemas/sitemap-news/0.9";
pub const XHTML_NS: &str = "http://www.w3.org/1999/xhtml";

/// Renders a route list into a complete urlset document.
///
/// [`XmlSerializer`] is the built-in implementation. A custom implementation
/// replaces it for every document of a collection, including the size
/// measurements used when splitting.
pub trait UrlsetSerializer: Send + Sync {
    /// Serialize `routes` into one document.
    ///
    /// # Errors
    ///
    /// Implementations may fail; the failure aborts generation of the
    /// collection being rendered.
    fn serialize(&self, routes: &[Route]) -> std::result::Result<String, BoxError>;
}

/// Built-in serializer producing protocol-compliant XML.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlSerializer;

impl UrlsetSerializer for XmlSerializer {
    fn serialize(&self, routes: &[Route]) -> std::result::Result<String, BoxError> {
        Ok(build_document(routes))
    }
}

/// Which extension namespaces a route set needs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NamespaceFlags {
    pub image: bool,
    pub video: bool,
    pub news: bool,
    pub xhtml: bool,
}

impl NamespaceFlags {
    /// Scan `routes` once and record which extensions appear.
    #[must_use]
    pub fn from_routes(routes: &[Route]) -> Self {
        routes.iter().fold(Self::default(), |flags, route| Self {
            image: flags.image || !route.images.is_empty(),
            video: flags.video || !route.videos.is_empty(),
            news: flags.news || route.news.is_some(),
            xhtml: flags.xhtml || !route.alternates.is_empty(),
        })
    }

    fn write_attributes(self, out: &mut String) {
        push_attr(out, "xmlns", SITEMAP_NS);
        if self.image {
            push_attr(out, "xmlns:image", IMAGE_NS);
        }
        if self.video {
            push_attr(out, "xmlns:video", VIDEO_NS);
        }
        if self.news {
            push_attr(out, "xmlns:news", NEWS_NS);
        }
        if self.xhtml {
            push_attr(out, "xmlns:xhtml", XHTML_NS);
        }
    }
}

/// One `<sitemap>` entry of an index document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// Location of the child document.
    pub loc: String,
    /// Day-precision generation date.
    pub lastmod: Option<String>,
}

/// Render a `<urlset>` document.
#[must_use]
pub fn build_document(routes: &[Route]) -> String {
    let flags = NamespaceFlags::from_routes(routes);

    let mut out = String::with_capacity(128 + routes.len() * 96);
    out.push_str(XML_DECLARATION);
    out.push_str("\n<urlset");
    flags.write_attributes(&mut out);
    out.push_str(">\n");
    for route in routes {
        write_route(&mut out, route);
    }
    out.push_str("</urlset>\n");
    out
}

/// Render a `<sitemapindex>` document. Only the base namespace is declared.
#[must_use]
pub fn build_index_document(entries: &[IndexEntry]) -> String {
    let mut out = String::with_capacity(128 + entries.len() * 128);
    out.push_str(XML_DECLARATION);
    out.push_str("\n<sitemapindex");
    push_attr(&mut out, "xmlns", SITEMAP_NS);
    out.push_str(">\n");
    for entry in entries {
        push_open(&mut out, 1, "sitemap");
        push_element(&mut out, 2, "loc", &escape_url(&entry.loc));
        if let Some(lastmod) = &entry.lastmod {
            push_element(&mut out, 2, "lastmod", &escape_text(lastmod));
        }
        push_close(&mut out, 1, "sitemap");
    }
    out.push_str("</sitemapindex>\n");
    out
}

/// UTF-8 byte length of a rendered document.
#[must_use]
pub const fn byte_size(document: &str) -> usize {
    document.len()
}

/// Escape the five predefined XML entities.
#[must_use]
pub fn escape_text(text: &str) -> Cow<'_, str> {
    escape(text)
}

/// Canonicalize a URL by reparsing it, then escape it for XML.
///
/// Unparsable input is escaped verbatim.
#[must_use]
pub fn escape_url(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(url) => escape(url.as_str()).into_owned(),
        Err(_) => escape(raw).into_owned(),
    }
}

/// Format a number with at least one decimal digit (`1` -> `1.0`).
#[must_use]
pub fn format_decimal(value: f64) -> String {
    let mut text = value.to_string();
    if value.is_finite() && !text.contains('.') {
        text.push_str(".0");
    }
    text
}

fn write_route(out: &mut String, route: &Route) {
    push_open(out, 1, "url");
    push_element(out, 2, "loc", &escape_url(&route.url));
    if let Some(lastmod) = &route.lastmod {
        push_element(out, 2, "lastmod", &escape_text(lastmod));
    }
    if let Some(changefreq) = route.changefreq {
        push_element(out, 2, "changefreq", changefreq.as_str());
    }
    if let Some(priority) = route.priority {
        push_element(out, 2, "priority", &format_decimal(priority));
    }
    for image in &route.images {
        write_image(out, image);
    }
    for video in &route.videos {
        write_video(out, video);
    }
    if let Some(news) = &route.news {
        write_news(out, news);
    }
    for alternate in &route.alternates {
        write_alternate(out, alternate);
    }
    push_close(out, 1, "url");
}

fn write_image(out: &mut String, image: &Image) {
    push_open(out, 2, "image:image");
    push_element(out, 3, "image:loc", &escape_url(&image.loc));
    if let Some(caption) = &image.caption {
        push_element(out, 3, "image:caption", &escape_text(caption));
    }
    if let Some(title) = &image.title {
        push_element(out, 3, "image:title", &escape_text(title));
    }
    if let Some(geo) = &image.geo_location {
        push_element(out, 3, "image:geo_location", &escape_text(geo));
    }
    if let Some(license) = &image.license {
        push_element(out, 3, "image:license", &escape_url(license));
    }
    push_close(out, 2, "image:image");
}

fn write_video(out: &mut String, video: &Video) {
    push_open(out, 2, "video:video");
    push_element(out, 3, "video:thumbnail_loc", &escape_url(&video.thumbnail_loc));
    push_element(out, 3, "video:title", &escape_text(&video.title));
    push_element(out, 3, "video:description", &escape_text(&video.description));
    if let Some(loc) = &video.content_loc {
        push_element(out, 3, "video:content_loc", &escape_url(loc));
    }
    if let Some(loc) = &video.player_loc {
        push_element(out, 3, "video:player_loc", &escape_url(loc));
    }
    if let Some(duration) = video.duration {
        push_element(out, 3, "video:duration", &duration.to_string());
    }
    if let Some(date) = &video.expiration_date {
        push_element(out, 3, "video:expiration_date", &escape_text(date));
    }
    if let Some(rating) = video.rating {
        push_element(out, 3, "video:rating", &format_decimal(rating));
    }
    if let Some(views) = video.view_count {
        push_element(out, 3, "video:view_count", &views.to_string());
    }
    if let Some(date) = &video.publication_date {
        push_element(out, 3, "video:publication_date", &escape_text(date));
    }
    if let Some(family_friendly) = video.family_friendly {
        push_element(out, 3, "video:family_friendly", yes_no(family_friendly));
    }
    if let Some(restriction) = &video.restriction {
        let countries = restriction.countries.join(" ");
        push_element_with_attr(
            out,
            3,
            "video:restriction",
            ("relationship", restriction.relationship.as_str()),
            &escape_text(&countries),
        );
    }
    if let Some(platform) = &video.platform {
        let platforms = platform
            .platforms
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        push_element_with_attr(
            out,
            3,
            "video:platform",
            ("relationship", platform.relationship.as_str()),
            &platforms,
        );
    }
    if let Some(requires_subscription) = video.requires_subscription {
        push_element(
            out,
            3,
            "video:requires_subscription",
            yes_no(requires_subscription),
        );
    }
    if let Some(uploader) = &video.uploader {
        let name = escape_text(&uploader.name);
        match &uploader.info {
            Some(info) => {
                push_element_with_attr(out, 3, "video:uploader", ("info", &escape_url(info)), &name);
            },
            None => push_element(out, 3, "video:uploader", &name),
        }
    }
    if let Some(live) = video.live {
        push_element(out, 3, "video:live", yes_no(live));
    }
    for tag in &video.tags {
        push_element(out, 3, "video:tag", &escape_text(tag));
    }
    push_close(out, 2, "video:video");
}

fn write_news(out: &mut String, news: &News) {
    push_open(out, 2, "news:news");
    push_open(out, 3, "news:publication");
    push_element(out, 4, "news:name", &escape_text(&news.publication.name));
    push_element(out, 4, "news:language", &escape_text(&news.publication.language));
    push_close(out, 3, "news:publication");
    push_element(
        out,
        3,
        "news:publication_date",
        &escape_text(&news.publication_date),
    );
    push_element(out, 3, "news:title", &escape_text(&news.title));
    if let Some(keywords) = &news.keywords {
        push_element(out, 3, "news:keywords", &escape_text(keywords));
    }
    if !news.stock_tickers.is_empty() {
        push_element(
            out,
            3,
            "news:stock_tickers",
            &escape_text(&news.stock_tickers.join(", ")),
        );
    }
    push_close(out, 2, "news:news");
}

fn write_alternate(out: &mut String, alternate: &Alternate) {
    indent(out, 2);
    out.push_str("<xhtml:link rel=\"alternate\"");
    push_attr(out, "hreflang", &escape_text(&alternate.hreflang));
    push_attr(out, "href", &escape_url(&alternate.href));
    out.push_str("/>\n");
}

const fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

fn indent(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push_str("  ");
    }
}

/// Appends ` name="value"`; `value` must already be escaped.
fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(value);
    out.push('"');
}

fn push_open(out: &mut String, level: usize, name: &str) {
    indent(out, level);
    out.push('<');
    out.push_str(name);
    out.push_str(">\n");
}

fn push_close(out: &mut String, level: usize, name: &str) {
    indent(out, level);
    out.push_str("</");
    out.push_str(name);
    out.push_str(">\n");
}

fn push_element(out: &mut String, level: usize, name: &str, escaped: &str) {
    indent(out, level);
    out.push('<');
    out.push_str(name);
    out.push('>');
    out.push_str(escaped);
    out.push_str("</");
    out.push_str(name);
    out.push_str(">\n");
}

fn push_element_with_attr(
    out: &mut String,
    level: usize,
    name: &str,
    (attr, attr_value): (&str, &str),
    escaped: &str,
) {
    indent(out, level);
    out.push('<');
    out.push_str(name);
    push_attr(out, attr, attr_value);
    out.push('>');
    out.push_str(escaped);
    out.push_str("</");
    out.push_str(name);
    out.push_str(">\n");
}

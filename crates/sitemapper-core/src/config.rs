//! TOML configuration for sitemap generation.
//!
//! A [`SitemapConfig`] carries everything about a generation run that can be
//! expressed declaratively. Callbacks (transform, custom serializer) are not
//! configurable from a file; attach them to the [`GenerationOptions`]
//! returned by [`SitemapConfig::into_options`].
//!
//! ## File format
//!
//! ```toml
//! hostname = "https://example.com"
//! exclude = ["/admin/**", { regex = "\\?preview=" }]
//! skip_validation = false
//!
//! [defaults]
//! changefreq = "weekly"
//! priority = 0.5
//!
//! [split]
//! max_urls = 50000
//! max_bytes = 47185920
//!
//! [output]
//! dir = "public"
//! robots_txt = true
//! ```
//!
//! Every key is optional; missing keys take the values of
//! [`SitemapConfig::default`].
//!
//! ## Examples
//!
//! ```rust
//! use sitemapper_core::SitemapConfig;
//!
//! let config = SitemapConfig::from_toml_str(r#"
//!     hostname = "https://example.com"
//!     [split]
//!     max_urls = 1000
//! "#)?;
//! assert_eq!(config.split.max_urls, 1000);
//!
//! let options = config.into_options()?;
//! assert_eq!(options.hostname.as_deref(), Some("https://example.com"));
//! # Ok::<(), sitemapper_core::Error>(())
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::exclude::{ExcludePattern, ExclusionMatcher};
use crate::limits::{DEFAULT_MAX_BYTES, MAX_SITEMAP_BYTES, MAX_URLS_PER_SITEMAP};
use crate::pipeline::{GenerationOptions, RouteDefaults};
use crate::validate::is_w3c_datetime;
use crate::{ChangeFrequency, Error, Result};

/// Declarative generation settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SitemapConfig {
    /// Base URL for relative routes and for index `<loc>` values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,

    /// Exclusion rules; bare strings are globs, `{ regex = ".." }` tables
    /// are regular expressions.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<ExcludePattern>,

    /// Generate even when routes fail validation.
    pub skip_validation: bool,

    /// Values for route fields left unset.
    pub defaults: DefaultsConfig,

    /// Per-document limits.
    pub split: SplitConfig,

    /// Where generated files go.
    pub output: OutputConfig,
}

/// Route field defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changefreq: Option<ChangeFrequency>,
    /// Must lie in `0.0..=1.0`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<f64>,
    /// W3C datetime.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lastmod: Option<String>,
}

/// Per-document limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Routes per document, `1..=50000`.
    pub max_urls: usize,
    /// Byte budget per document, up to 50 MiB.
    pub max_bytes: usize,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            max_urls: MAX_URLS_PER_SITEMAP,
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }
}

/// Output location settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving the sitemap files.
    pub dir: PathBuf,
    /// Keep `robots.txt` in `dir` pointing at the generated sitemaps.
    pub robots_txt: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("public"),
            robots_txt: true,
        }
    }
}

impl SitemapConfig {
    /// Load and validate a config file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file cannot be read, is not valid
    /// TOML, or holds out-of-range values.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config {}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for invalid TOML or out-of-range values.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Write the config as TOML, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when serialization or writing fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config directory: {e}")))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {e}")))?;
        fs::write(path, content)
            .map_err(|e| Error::Config(format!("Failed to write config: {e}")))?;

        tracing::debug!("Saved config to {}", path.display());
        Ok(())
    }

    /// Check values against the protocol limits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] describing the first offending value.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_URLS_PER_SITEMAP).contains(&self.split.max_urls) {
            return Err(Error::Config(format!(
                "split.max_urls must be between 1 and {MAX_URLS_PER_SITEMAP}, got {}",
                self.split.max_urls
            )));
        }
        if !(1..=MAX_SITEMAP_BYTES).contains(&self.split.max_bytes) {
            return Err(Error::Config(format!(
                "split.max_bytes must be between 1 and {MAX_SITEMAP_BYTES}, got {}",
                self.split.max_bytes
            )));
        }
        if let Some(priority) = self.defaults.priority {
            if !(0.0..=1.0).contains(&priority) {
                return Err(Error::Config(format!(
                    "defaults.priority must be between 0.0 and 1.0, got {priority}"
                )));
            }
        }
        if let Some(lastmod) = &self.defaults.lastmod {
            if !is_w3c_datetime(lastmod) {
                return Err(Error::Config(format!(
                    "defaults.lastmod '{lastmod}' is not a W3C datetime"
                )));
            }
        }
        if let Some(hostname) = &self.hostname {
            if !(hostname.starts_with("http://") || hostname.starts_with("https://")) {
                return Err(Error::Config(format!(
                    "hostname '{hostname}' must start with http:// or https://"
                )));
            }
        }
        Ok(())
    }

    /// Convert into pipeline options.
    ///
    /// Exclusion patterns are compiled here so that a bad pattern is
    /// reported before any collection is generated.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for out-of-range values and
    /// [`Error::InvalidPattern`] for patterns that do not compile.
    pub fn into_options(self) -> Result<GenerationOptions> {
        self.validate()?;
        ExclusionMatcher::new(&self.exclude)?;

        Ok(GenerationOptions {
            hostname: self.hostname,
            exclude: self.exclude,
            defaults: RouteDefaults {
                changefreq: self.defaults.changefreq,
                priority: self.defaults.priority,
                lastmod: self.defaults.lastmod,
            },
            max_urls: self.split.max_urls,
            max_bytes: self.split.max_bytes,
            skip_validation: self.skip_validation,
            ..GenerationOptions::default()
        })
    }
}

//! `robots.txt` maintenance.
//!
//! [`update_robots_txt`] makes sure the crawler directives file in an output
//! directory advertises a sitemap URL. Existing files are only ever appended
//! to; every other byte is preserved.
//!
//! | Existing file | Contains the URL | Result |
//! |---------------|------------------|--------|
//! | no | - | created with a permissive default rule |
//! | yes | yes | [`RobotsAction::Unchanged`] |
//! | yes | no | `Sitemap:` line appended, [`RobotsAction::Updated`] |
//!
//! Directive keys match case-insensitively and values are compared trimmed,
//! so `sitemap:   https://example.com/sitemap.xml` counts as present.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::output::write_atomic;
use crate::{Error, Result};

pub const ROBOTS_FILENAME: &str = "robots.txt";

/// What [`update_robots_txt`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RobotsAction {
    Created,
    Updated,
    Unchanged,
}

impl RobotsAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Unchanged => "unchanged",
        }
    }
}

/// Outcome of a `robots.txt` update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobotsTxtUpdate {
    pub action: RobotsAction,
    pub path: PathBuf,
}

/// Ensure `dir/robots.txt` lists `sitemap_url`.
///
/// # Errors
///
/// Returns [`Error::Io`] when the existing file cannot be read and
/// [`Error::Storage`] when the new content cannot be committed.
pub fn update_robots_txt(dir: &Path, sitemap_url: &str) -> Result<RobotsTxtUpdate> {
    let path = dir.join(ROBOTS_FILENAME);

    let existing = match fs::read_to_string(&path) {
        Ok(content) => Some(content),
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(e) => return Err(Error::Io(e)),
    };

    let action = match existing {
        None => {
            fs::create_dir_all(dir)?;
            write_atomic(&path, &default_robots_txt(sitemap_url))?;
            RobotsAction::Created
        },
        Some(content) => match append_sitemap_directive(&content, sitemap_url) {
            Some(updated) => {
                write_atomic(&path, &updated)?;
                RobotsAction::Updated
            },
            None => {
                debug!("robots.txt already lists {sitemap_url}");
                RobotsAction::Unchanged
            },
        },
    };

    info!(action = action.as_str(), path = %path.display(), "robots.txt checked");
    Ok(RobotsTxtUpdate { action, path })
}

/// Content of a freshly created `robots.txt`.
#[must_use]
pub fn default_robots_txt(sitemap_url: &str) -> String {
    format!("User-agent: *\nAllow: /\n\nSitemap: {sitemap_url}\n")
}

/// `true` when `content` has a `Sitemap:` directive for `sitemap_url`.
#[must_use]
pub fn has_sitemap_directive(content: &str, sitemap_url: &str) -> bool {
    let wanted = sitemap_url.trim();
    content.lines().any(|line| {
        line.split_once(':').is_some_and(|(key, value)| {
            key.trim().eq_ignore_ascii_case("sitemap") && value.trim() == wanted
        })
    })
}

/// `content` with a directive for `sitemap_url` appended, or `None` when it
/// is already present.
#[must_use]
pub fn append_sitemap_directive(content: &str, sitemap_url: &str) -> Option<String> {
    if has_sitemap_directive(content, sitemap_url) {
        return None;
    }

    let mut updated = String::with_capacity(content.len() + sitemap_url.len() + 11);
    updated.push_str(content);
    if !content.is_empty() && !content.ends_with('\n') {
        updated.push('\n');
    }
    updated.push_str("Sitemap: ");
    updated.push_str(sitemap_url);
    updated.push('\n');
    Some(updated)
}

//! URL exclusion matching.
//!
//! Exclusion runs first in the pipeline so that excluded routes never reach
//! the (possibly expensive) transform stage.
//!
//! Two pattern kinds are supported:
//!
//! - **Globs** match the *whole* URL. `*` and `?` stay within one path
//!   segment, `**` crosses segments. A pattern without wildcards is a literal
//!   full-string match.
//! - **Regular expressions** are tested anywhere in the URL; anchor them with
//!   `^`/`$` when a full match is wanted.
//!
//! ```rust
//! use sitemapper_core::exclude::{ExcludePattern, ExclusionMatcher};
//!
//! let matcher = ExclusionMatcher::new(&[
//!     ExcludePattern::glob("/admin/**"),
//!     ExcludePattern::regex(r"\?preview=1$"),
//! ])?;
//!
//! assert!(matcher.matches("/admin/users/42"));
//! assert!(matcher.matches("https://example.com/post?preview=1"));
//! assert!(!matcher.matches("/blog/hello"));
//! # Ok::<(), sitemapper_core::Error>(())
//! ```

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A single exclusion rule as supplied by the caller.
///
/// In TOML a bare string is a glob and a `{ regex = "..." }` table is a
/// regular expression:
///
/// ```toml
/// exclude = ["/admin/**", { regex = "^/drafts/" }]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExcludePattern {
    /// Glob or literal string matched against the whole URL.
    Glob(String),
    /// Regular expression tested against the URL.
    Regex {
        /// Expression source in `regex` crate syntax.
        regex: String,
    },
}

impl ExcludePattern {
    /// Glob or literal pattern.
    pub fn glob(pattern: impl Into<String>) -> Self {
        Self::Glob(pattern.into())
    }

    /// Regular expression pattern.
    pub fn regex(pattern: impl Into<String>) -> Self {
        Self::Regex {
            regex: pattern.into(),
        }
    }

    /// Pattern source text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Glob(pattern) => pattern,
            Self::Regex { regex } => regex,
        }
    }
}

impl From<&str> for ExcludePattern {
    fn from(pattern: &str) -> Self {
        Self::glob(pattern)
    }
}

impl From<Regex> for ExcludePattern {
    fn from(regex: Regex) -> Self {
        Self::regex(regex.as_str())
    }
}

/// Compiled set of exclusion patterns.
///
/// Compile once and reuse; matching does not allocate.
#[derive(Debug, Clone)]
pub struct ExclusionMatcher {
    globs: GlobSet,
    regexes: Vec<Regex>,
    pattern_count: usize,
}

impl Default for ExclusionMatcher {
    fn default() -> Self {
        Self {
            globs: GlobSet::empty(),
            regexes: Vec::new(),
            pattern_count: 0,
        }
    }
}

impl ExclusionMatcher {
    /// Compile a list of patterns.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] naming the first pattern that fails
    /// to compile.
    pub fn new(patterns: &[ExcludePattern]) -> Result<Self> {
        let mut glob_builder = GlobSetBuilder::new();
        let mut regexes = Vec::new();

        for pattern in patterns {
            match pattern {
                ExcludePattern::Glob(glob) if has_inner_double_star(glob) => {
                    let compiled =
                        Regex::new(&glob_to_regex(glob)).map_err(|e| Error::InvalidPattern {
                            pattern: glob.clone(),
                            reason: e.to_string(),
                        })?;
                    regexes.push(compiled);
                },
                ExcludePattern::Glob(glob) => {
                    let compiled = GlobBuilder::new(glob)
                        .literal_separator(true)
                        .build()
                        .map_err(|e| Error::InvalidPattern {
                            pattern: glob.clone(),
                            reason: e.to_string(),
                        })?;
                    glob_builder.add(compiled);
                },
                ExcludePattern::Regex { regex } => {
                    let compiled = Regex::new(regex).map_err(|e| Error::InvalidPattern {
                        pattern: regex.clone(),
                        reason: e.to_string(),
                    })?;
                    regexes.push(compiled);
                },
            }
        }

        let globs = glob_builder.build().map_err(|e| Error::InvalidPattern {
            pattern: patterns
                .iter()
                .map(ExcludePattern::as_str)
                .collect::<Vec<_>>()
                .join(", "),
            reason: e.to_string(),
        })?;

        Ok(Self {
            globs,
            regexes,
            pattern_count: patterns.len(),
        })
    }

    /// `true` when any pattern matches `url`.
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        self.globs.is_match(url) || self.regexes.iter().any(|re| re.is_match(url))
    }

    /// `true` when no patterns were configured.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.pattern_count == 0
    }

    /// Number of configured patterns.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.pattern_count
    }
}

/// `true` when `glob` has a `**` that is not a whole path component, as in
/// `/blog/post-**`. `globset` reads those as a plain `*`.
fn has_inner_double_star(glob: &str) -> bool {
    let bytes = glob.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' {
            i += 2;
            continue;
        }
        if bytes[i] == b'*' {
            let start = i;
            while i < bytes.len() && bytes[i] == b'*' {
                i += 1;
            }
            let run = i - start;
            let before_ok = start == 0 || bytes[start - 1] == b'/';
            let after_ok = i == bytes.len() || bytes[i] == b'/';
            if run >= 2 && !(before_ok && after_ok) {
                return true;
            }
            continue;
        }
        i += 1;
    }
    false
}

/// Anchored regex for `glob`: `**` matches anything, `*` and `?` stay inside
/// one segment, `[..]` classes and `{a,b}` alternates carry over.
fn glob_to_regex(glob: &str) -> String {
    let mut out = String::with_capacity(glob.len() * 2 + 2);
    out.push('^');

    let mut chars = glob.chars().peekable();
    let mut alternates = 0usize;
    while let Some(c) = chars.next() {
        match c {
            '*' => {
                if chars.peek() == Some(&'*') {
                    while chars.peek() == Some(&'*') {
                        chars.next();
                    }
                    out.push_str(".*");
                } else {
                    out.push_str("[^/]*");
                }
            },
            '?' => out.push_str("[^/]"),
            '[' => {
                out.push('[');
                if matches!(chars.peek(), Some('!' | '^')) {
                    chars.next();
                    out.push('^');
                }
                for class_char in chars.by_ref() {
                    if class_char == ']' {
                        break;
                    }
                    if class_char == '\\' || class_char == '[' {
                        out.push('\\');
                    }
                    out.push(class_char);
                }
                out.push(']');
            },
            '{' => {
                alternates += 1;
                out.push_str("(?:");
            },
            '}' if alternates > 0 => {
                alternates -= 1;
                out.push(')');
            },
            ',' if alternates > 0 => out.push('|'),
            '\\' => {
                if let Some(escaped) = chars.next() {
                    out.push_str(&regex::escape(escaped.encode_utf8(&mut [0; 4])));
                }
            },
            other => out.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
    }

    out.push('$');
    out
}

/// One-shot check of `url` against `patterns`.
///
/// Prefer [`ExclusionMatcher`] when checking many URLs.
///
/// # Errors
///
/// Returns [`Error::InvalidPattern`] if a pattern does not compile.
pub fn matches(url: &str, patterns: &[ExcludePattern]) -> Result<bool> {
    if patterns.is_empty() {
        return Ok(false);
    }
    Ok(ExclusionMatcher::new(patterns)?.matches(url))
}

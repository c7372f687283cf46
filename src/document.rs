//! The document model.
//!
//! A [`Document`] is one parsed content file: where it came from, which
//! collection owns it, its metadata, and its rendered body. Documents are
//! built once by the scanner and never modified afterwards; every field is
//! private behind a read-only accessor.
//!
//! ## Permalinks
//!
//! A document computes its own URL path from an optional pattern:
//!
//! | Pattern                     | Document                       | Result                  |
//! |-----------------------------|--------------------------------|-------------------------|
//! | *(none)*                    | `posts/hello.md`               | `/posts/hello/`         |
//! | *(none)*                    | `about.md` (collection `pages`) | `/about/`              |
//! | `{year}/{slug}`             | `2024-01-02-x.md`              | `/2024/x/`              |
//! | `blog/{year}/{month}/{day}` | undated                        | `/blog/`                |
//!
//! Placeholders are substituted in a single pass, so a slug that happens to
//! contain `{year}` is left alone.

use crate::naming;
use crate::types::Metadata;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat};
use regex::{Captures, Regex};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Name of the collection that holds top-level and unclassified content.
pub const PAGES_COLLECTION: &str = "pages";

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{(collection|slug|filename|year|month|day)\}")
        .expect("placeholder pattern is valid")
});

/// One parsed content file.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    source_path: PathBuf,
    slug: String,
    collection: String,
    front_matter: Metadata,
    content_html: String,
    content_raw: String,
    date: Option<DateTime<FixedOffset>>,
}

impl Document {
    pub fn new(
        source_path: PathBuf,
        slug: String,
        collection: String,
        front_matter: Metadata,
        content_html: String,
        content_raw: String,
        date: Option<DateTime<FixedOffset>>,
    ) -> Self {
        Self {
            source_path,
            slug,
            collection,
            front_matter,
            content_html,
            content_raw,
            date,
        }
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn front_matter(&self) -> &Metadata {
        &self.front_matter
    }

    pub fn content_html(&self) -> &str {
        &self.content_html
    }

    pub fn content_raw(&self) -> &str {
        &self.content_raw
    }

    pub fn date(&self) -> Option<DateTime<FixedOffset>> {
        self.date
    }

    /// Front matter `title` if it is a string, otherwise derived from the slug.
    pub fn title(&self) -> String {
        match self.front_matter.get("title").and_then(|v| v.as_str()) {
            Some(title) => title.to_string(),
            None => naming::title_from_slug(&self.slug),
        }
    }

    /// Compute this document's URL path under `base`.
    ///
    /// The result always starts and ends with `/` (relative to `base`).
    pub fn permalink(&self, base: &str, pattern: Option<&str>) -> String {
        let path = match pattern.filter(|p| !p.is_empty()) {
            Some(pattern) => self.expand_pattern(pattern),
            None => {
                let collection = (self.collection != PAGES_COLLECTION)
                    .then_some(self.collection.as_str());
                collection
                    .into_iter()
                    .chain(std::iter::once(self.slug.as_str()))
                    .filter(|segment| !segment.is_empty())
                    .collect::<Vec<_>>()
                    .join("/")
            }
        };

        let base = base.trim_end_matches('/');
        let path = path.trim_matches('/');
        if path.is_empty() {
            format!("{base}/")
        } else {
            format!("{base}/{path}/")
        }
    }

    fn expand_pattern(&self, pattern: &str) -> String {
        PLACEHOLDER
            .replace_all(pattern, |caps: &Captures| match &caps[1] {
                "collection" => self.collection.clone(),
                "slug" | "filename" => self.slug.clone(),
                "year" => self.date_part("%Y"),
                "month" => self.date_part("%m"),
                "day" => self.date_part("%d"),
                other => format!("{{{other}}}"),
            })
            .into_owned()
    }

    fn date_part(&self, format: &str) -> String {
        self.date
            .map(|date| date.format(format).to_string())
            .unwrap_or_default()
    }
}

// =============================================================================
// Timestamps
// =============================================================================

/// Parse a front matter date.
///
/// Accepts RFC 3339 (`2024-03-01T09:30:00+02:00`), `YYYY-MM-DD HH:MM[:SS]`,
/// `YYYY-MM-DDTHH:MM[:SS]`, and a bare `YYYY-MM-DD`. Values without an
/// offset are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }

    const NAIVE_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
    ];
    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })?;
    Some(naive.and_utc().fixed_offset())
}

/// Midnight UTC on the given calendar day.
pub fn timestamp_from_date(date: NaiveDate) -> Option<DateTime<FixedOffset>> {
    date.and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc().fixed_offset())
}

/// Canonical ISO-8601 form stored back into front matter,
/// e.g. `2024-03-01T00:00:00+00:00`.
pub fn format_timestamp(date: &DateTime<FixedOffset>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, false)
}

//! Filename conventions for content files.
//!
//! Dated content (blog posts, changelog entries) carries its publication date
//! as a `YYYY-MM-DD-` prefix on the filename. This module is the single place
//! that understands the convention:
//!
//! - `2024-01-02-hello-world.md` → date 2024-01-02, name `hello-world`
//! - `about.md` → no date, name `about`
//! - `index.md` → no date, name `index`
//! - `2024-13-40-typo.md` → no date (not a calendar day), name `typo`
//!
//! The prefix is stripped from the name whenever it has the right *shape*,
//! even if the digits do not form a real date. Only the date itself is
//! dropped in that case.
//!
//! ## Display Titles
//!
//! Documents without a `title` in their front matter are shown under a title
//! derived from the slug: dashes become spaces and the first letter is
//! upper-cased (`hello-world` → "Hello world").

use chrono::NaiveDate;

/// Result of parsing a content file stem like `2024-01-02-hello-world`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedName {
    /// Calendar date from the prefix, if the prefix is present and valid.
    pub date: Option<NaiveDate>,
    /// Stem with any `YYYY-MM-DD-` prefix removed, whitespace trimmed.
    pub name: String,
}

/// Length of `YYYY-MM-DD-`.
const DATE_PREFIX_LEN: usize = 11;

/// Parse a file stem following the optional `YYYY-MM-DD-name` convention.
///
/// - `"2024-01-02-hello-world"` → date=Some(2024-01-02), name="hello-world"
/// - `"hello-world"` → date=None, name="hello-world"
/// - `"2024-01-02"` → date=None, name="2024-01-02" (no trailing dash, no prefix)
/// - `"2024-02-30-leap"` → date=None, name="leap"
pub fn parse_file_stem(stem: &str) -> ParsedName {
    match split_date_prefix(stem) {
        Some((year, month, day, rest)) => ParsedName {
            date: NaiveDate::from_ymd_opt(year, month, day),
            name: rest.trim().to_string(),
        },
        None => ParsedName {
            date: None,
            name: stem.trim().to_string(),
        },
    }
}

/// Derive a document slug from its file stem.
///
/// The date prefix is dropped and the remainder trimmed; `index` is kept
/// verbatim so that section index files keep their special meaning.
pub fn slug_from_stem(stem: &str) -> String {
    let parsed = parse_file_stem(stem);
    if parsed.name == "index" {
        return "index".to_string();
    }
    parsed.name
}

/// Date encoded in a file name's `YYYY-MM-DD-` prefix.
///
/// Takes the bare file name (`2024-01-02-hello.md`), never a path: a dated
/// directory does not date the files inside it.
pub fn date_from_file_name(file_name: &str) -> Option<NaiveDate> {
    split_date_prefix(file_name)
        .and_then(|(year, month, day, _)| NaiveDate::from_ymd_opt(year, month, day))
}

/// Human-readable title for a slug: `hello-world` → "Hello world".
pub fn title_from_slug(slug: &str) -> String {
    let spaced = slug.replace('-', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Split `YYYY-MM-DD-rest` into its numeric parts and the remainder.
///
/// Only checks the shape (ASCII digits and dashes in the right places); the
/// caller decides whether the numbers make a valid date.
fn split_date_prefix(name: &str) -> Option<(i32, u32, u32, &str)> {
    let bytes = name.as_bytes();
    if bytes.len() < DATE_PREFIX_LEN {
        return None;
    }

    let digits_at = |range: std::ops::Range<usize>| bytes[range].iter().all(u8::is_ascii_digit);
    let shape_ok = digits_at(0..4)
        && bytes[4] == b'-'
        && digits_at(5..7)
        && bytes[7] == b'-'
        && digits_at(8..10)
        && bytes[10] == b'-';
    if !shape_ok {
        return None;
    }

    // All prefix bytes are ASCII, so these slices are on char boundaries.
    let year = name[0..4].parse().ok()?;
    let month = name[5..7].parse().ok()?;
    let day = name[8..10].parse().ok()?;
    Some((year, month, day, &name[DATE_PREFIX_LEN..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dated_stem_with_multi_word_name() {
        let p = parse_file_stem("2024-01-02-hello-world");
        assert_eq!(p.date, NaiveDate::from_ymd_opt(2024, 1, 2));
        assert_eq!(p.name, "hello-world");
    }

    #[test]
    fn undated_stem() {
        let p = parse_file_stem("about");
        assert_eq!(p.date, None);
        assert_eq!(p.name, "about");
    }

    #[test]
    fn bare_date_is_not_a_prefix() {
        let p = parse_file_stem("2024-01-02");
        assert_eq!(p.date, None);
        assert_eq!(p.name, "2024-01-02");
    }

    #[test]
    fn invalid_calendar_date_still_strips_prefix() {
        let p = parse_file_stem("2024-02-30-leap");
        assert_eq!(p.date, None);
        assert_eq!(p.name, "leap");
    }

    #[test]
    fn name_is_trimmed() {
        let p = parse_file_stem("2024-01-02- spaced ");
        assert_eq!(p.name, "spaced");
    }

    #[test]
    fn non_digit_prefix_is_ignored() {
        let p = parse_file_stem("abcd-01-02-post");
        assert_eq!(p.date, None);
        assert_eq!(p.name, "abcd-01-02-post");
    }

    #[test]
    fn slug_strips_date_prefix() {
        assert_eq!(slug_from_stem("2024-01-02-hello-world"), "hello-world");
    }

    #[test]
    fn slug_keeps_index() {
        assert_eq!(slug_from_stem("index"), "index");
    }

    #[test]
    fn slug_of_dated_index() {
        assert_eq!(slug_from_stem("2024-01-02-index"), "index");
    }

    #[test]
    fn slug_of_multibyte_name() {
        assert_eq!(slug_from_stem("2024-01-02-café"), "café");
        assert_eq!(slug_from_stem("日本"), "日本");
    }

    #[test]
    fn date_from_file_name_with_extension() {
        assert_eq!(
            date_from_file_name("2023-05-01-post.md"),
            NaiveDate::from_ymd_opt(2023, 5, 1)
        );
    }

    #[test]
    fn date_from_file_name_without_prefix() {
        assert_eq!(date_from_file_name("post.md"), None);
    }

    #[test]
    fn date_from_file_name_invalid_day() {
        assert_eq!(date_from_file_name("2023-04-31-post.md"), None);
    }

    #[test]
    fn title_from_slug_spaces_and_capitalizes() {
        assert_eq!(title_from_slug("hello-world"), "Hello world");
        assert_eq!(title_from_slug("about"), "About");
        assert_eq!(title_from_slug(""), "");
    }
}

//! Markdown body rendering.
//!
//! Bodies are CommonMark with a few common extensions (tables, strikethrough,
//! footnotes, task lists), rendered with `pulldown-cmark`. Raw HTML in the
//! source passes through untouched: authors own their content. Link and image
//! destinations with script-capable schemes are blanked so a stray
//! `javascript:` URL cannot become a live link.

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, html};

/// Schemes that are never emitted as link or image targets.
const UNSAFE_SCHEMES: &[&str] = &["javascript:", "vbscript:", "file:", "data:"];

/// `data:` payloads that are allowed through (inline raster images).
const SAFE_DATA_PREFIXES: &[&str] = &[
    "data:image/png",
    "data:image/gif",
    "data:image/jpeg",
    "data:image/webp",
];

fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_TASKLISTS
}

/// Convert a Markdown body to an HTML fragment.
pub fn render(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, options()).map(|event| match event {
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: sanitize_url(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: sanitize_url(dest_url),
            title,
            id,
        }),
        other => other,
    });

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

fn sanitize_url(url: CowStr<'_>) -> CowStr<'_> {
    if is_unsafe_url(&url) {
        CowStr::Borrowed("")
    } else {
        url
    }
}

/// Whether a URL uses a scheme that could execute code in the browser.
///
/// Leading whitespace and ASCII case are ignored, matching how browsers
/// resolve the scheme.
pub fn is_unsafe_url(url: &str) -> bool {
    let normalized = url.trim_start().to_ascii_lowercase();
    if SAFE_DATA_PREFIXES
        .iter()
        .any(|prefix| normalized.starts_with(prefix))
    {
        return false;
    }
    UNSAFE_SCHEMES
        .iter()
        .any(|scheme| normalized.starts_with(scheme))
}

//! Front matter extraction.
//!
//! A content file may open with a delimited metadata block:
//!
//! ```text
//! ---                      +++
//! title: Hello             title = "Hello"
//! date: 2024-01-02         date = 2024-01-02
//! ---                      +++
//! Body text…               Body text…
//! ```
//!
//! `---` fences hold YAML, `+++` fences hold TOML. Both are converted into the
//! same [`Metadata`] mapping. A file without a leading fence has empty
//! metadata and its whole text is the body. A fenced block that parses to
//! something other than a mapping (a bare string, a list) also yields empty
//! metadata; a block that does not parse at all is an error.

use crate::types::Metadata;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrontMatterError {
    #[error("invalid YAML front matter: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid TOML front matter: {0}")]
    Toml(#[from] toml::de::Error),
}

/// A content file split into its metadata and body.
#[derive(Debug, Clone, PartialEq)]
pub struct FrontMatter {
    pub metadata: Metadata,
    pub body: String,
}

static YAML_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\A---\s*\n(.+?)\n---\s*\n(.*)\z").expect("YAML fence pattern is valid")
});

static TOML_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\A\+\+\+\s*\n(.+?)\n\+\+\+\s*\n(.*)\z").expect("TOML fence pattern is valid")
});

/// Split raw file text into front matter and body.
pub fn extract(raw: &str) -> Result<FrontMatter, FrontMatterError> {
    if let Some(caps) = YAML_BLOCK.captures(raw) {
        let value: Value = serde_yaml::from_str(&caps[1])?;
        return Ok(FrontMatter {
            metadata: into_metadata(value),
            body: caps[2].to_string(),
        });
    }

    if let Some(caps) = TOML_BLOCK.captures(raw) {
        let table: toml::Table = toml::from_str(&caps[1])?;
        return Ok(FrontMatter {
            metadata: into_metadata(toml_to_json(toml::Value::Table(table))),
            body: caps[2].to_string(),
        });
    }

    Ok(FrontMatter {
        metadata: Metadata::new(),
        body: raw.to_string(),
    })
}

fn into_metadata(value: Value) -> Metadata {
    match value {
        Value::Object(map) => map,
        _ => Metadata::new(),
    }
}

/// Convert a TOML value to JSON. Datetimes become their RFC 3339 text so
/// that date handling downstream sees the same shape as YAML input.
fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(key, value)| (key, toml_to_json(value)))
                .collect(),
        ),
    }
}

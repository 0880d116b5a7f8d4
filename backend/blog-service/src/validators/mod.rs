/// Input normalization and validation helpers shared by the request models
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use uuid::Uuid;

/// `https://` host with at least one dot and an optional slash-separated path
pub static WEBSITE_URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https://([a-zA-Z0-9_-]+\.)+[a-zA-Z0-9_-]+(/[a-zA-Z0-9_-]+)*/?$")
        .expect("website url pattern compiles")
});

/// Letters, digits, underscore and hyphen only
pub static LOGIN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]*$").expect("login pattern compiles"));

/// Deserialize a string field, trimming surrounding whitespace.
///
/// A missing or `null` value becomes the empty string so length rules
/// report it instead of the JSON extractor.
pub fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .map(|s| s.trim().to_string())
        .unwrap_or_default())
}

/// Like `trimmed` but keeps whitespace (passwords).
pub fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Path ids are UUIDs; anything else can never match a stored row.
pub fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw.trim()).ok()
}

/// Escape LIKE wildcards so search terms match literally.
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

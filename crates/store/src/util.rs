//! Internal helpers for input sanitization.
//!
//! These utilities are **not** part of the public API beyond
//! [`sanitize_text`]. They centralize the cleaning rules so every name, tag
//! and category reaching the database went through the same filter.

use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::{ResultStore, StoreError};

/// Punctuation kept verbatim besides letters, digits and whitespace.
const ALLOWED_PUNCTUATION: &[char] = &['.', ',', '-', '\'', '_', '!', '"'];

fn is_allowed(c: char) -> bool {
    c.is_alphanumeric() || c.is_whitespace() || ALLOWED_PUNCTUATION.contains(&c)
}

/// Clean free text coming from callers.
///
/// Disallowed characters become spaces, whitespace runs collapse to a single
/// space and both ends are trimmed. The result may be empty.
///
/// ```rust
/// assert_eq!(store::sanitize_text("  Rent<script>  2026 "), "Rent script 2026");
/// ```
#[must_use]
pub fn sanitize_text(raw: &str) -> String {
    let replaced: String = raw
        .nfc()
        .map(|c| if is_allowed(c) { c } else { ' ' })
        .collect();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Sanitize and require a non-blank value.
pub(crate) fn required_text(raw: &str, label: &str) -> ResultStore<String> {
    let cleaned = sanitize_text(raw);
    if cleaned.is_empty() {
        return Err(StoreError::validation(format!(
            "{label} cannot be empty or contain only invalid characters"
        )));
    }
    Ok(cleaned)
}

/// Sanitize an optional free-text field; blanks collapse to `None`.
pub(crate) fn optional_text(raw: Option<&str>) -> Option<String> {
    raw.map(sanitize_text).filter(|s| !s.is_empty())
}

/// Sanitize tags, dropping the ones that end up blank.
pub(crate) fn sanitize_tags(tags: &[String]) -> Vec<String> {
    tags.iter()
        .map(|tag| sanitize_text(tag))
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultStore<Uuid> {
    Uuid::parse_str(value).map_err(|_| {
        StoreError::Database(sea_orm::DbErr::Type(format!("invalid {label} id: {value}")))
    })
}

/// Encode tags for the `tags` text column.
pub(crate) fn encode_tags(tags: &[String]) -> ResultStore<Option<String>> {
    if tags.is_empty() {
        return Ok(None);
    }
    serde_json::to_string(tags)
        .map(Some)
        .map_err(|err| StoreError::validation(format!("cannot encode tags: {err}")))
}

/// Decode the `tags` text column. `NULL` and `""` both mean no tags.
pub(crate) fn decode_tags(raw: Option<&str>, owner_id: &str) -> ResultStore<Vec<String>> {
    match raw {
        None | Some("") => Ok(Vec::new()),
        Some(json) => serde_json::from_str::<Option<Vec<String>>>(json)
            .map(Option::unwrap_or_default)
            .map_err(|err| {
                StoreError::Database(sea_orm::DbErr::Type(format!(
                    "failed to parse tags for {owner_id}: {err}"
                )))
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_and_collapses() {
        assert_eq!(sanitize_text("Food & Drinks"), "Food Drinks");
        assert_eq!(sanitize_text("\tCafé  \n  Olé!"), "Café Olé!");
        assert_eq!(sanitize_text("O'Brien's \"pub\""), "O'Brien's \"pub\"");
        assert_eq!(sanitize_text("<<>>"), "");
    }

    #[test]
    fn required_text_rejects_blank() {
        assert!(matches!(
            required_text(" @@ ", "category"),
            Err(StoreError::Validation(_))
        ));
        assert_eq!(required_text(" Rent ", "category").unwrap(), "Rent");
    }

    #[test]
    fn tags_drop_blank_entries() {
        let tags = vec!["home".to_string(), "  ".to_string(), "#1".to_string()];
        assert_eq!(sanitize_tags(&tags), vec!["home", "1"]);
    }

    #[test]
    fn tags_column_round_trips_null() {
        assert_eq!(encode_tags(&[]).unwrap(), None);
        assert!(decode_tags(None, "x").unwrap().is_empty());
        assert!(decode_tags(Some("null"), "x").unwrap().is_empty());
        assert_eq!(
            decode_tags(Some("[\"a\",\"b\"]"), "x").unwrap(),
            vec!["a", "b"]
        );
    }
}

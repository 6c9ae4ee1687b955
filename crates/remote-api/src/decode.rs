//! Defensive decoding of text fields written by foreign clients.
//!
//! Other clients of the holdings service are known to write JSON metadata
//! into the `type` and `notes` columns. These helpers apply an ordered
//! fallback chain exactly once, at the API boundary; decoded values flow
//! upstream as plain strings and are never re-inspected.

use serde_json::Value;

/// Metadata keys that mark a note as machine-written rather than a genuine
/// user note.
const NOTE_METADATA_KEYS: [&str; 4] = ["local_id", "cost_basis", "source", "created_at"];

/// Decodes a raw product-type value.
///
/// Fallback chain: JSON object with a string under `name`/`type`/`label`,
/// then a bare JSON string, then the first line of the raw text (foreign
/// clients sometimes append metadata after a newline), then the text as-is.
pub(crate) fn decode_product_type(raw: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(raw) {
        for key in ["name", "type", "label"] {
            if let Some(text) = value.get(key).and_then(Value::as_str) {
                return text.to_string();
            }
        }
        if let Some(text) = value.as_str() {
            return text.to_string();
        }
    }
    raw.lines().next().unwrap_or_default().trim().to_string()
}

/// Decodes a raw notes value.
///
/// A note is discarded entirely when it is JSON carrying any known metadata
/// key, or when the raw text contains the `local_id` marker even without
/// being valid JSON. Anything else passes through unchanged.
pub(crate) fn decode_notes(raw: Option<String>) -> Option<String> {
    let raw = raw?;
    if raw.trim().is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str::<Value>(&raw) {
        if let Some(object) = value.as_object() {
            if NOTE_METADATA_KEYS
                .iter()
                .any(|key| object.contains_key(*key))
            {
                return None;
            }
        }
    }
    if raw.contains("local_id") {
        return None;
    }
    Some(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Product Type Decoding ====================

    #[test]
    fn test_plain_product_type_passes_through() {
        assert_eq!(decode_product_type("American Eagle"), "American Eagle");
    }

    #[test]
    fn test_json_product_type_extracts_known_keys() {
        assert_eq!(decode_product_type(r#"{"name":"Krugerrand"}"#), "Krugerrand");
        assert_eq!(decode_product_type(r#"{"type":"Bar"}"#), "Bar");
        assert_eq!(decode_product_type(r#"{"label":"Round"}"#), "Round");
    }

    #[test]
    fn test_json_product_type_prefers_name_over_type() {
        assert_eq!(
            decode_product_type(r#"{"type":"Bar","name":"Krugerrand"}"#),
            "Krugerrand"
        );
    }

    #[test]
    fn test_double_encoded_string_unwraps() {
        assert_eq!(decode_product_type(r#""Coin""#), "Coin");
    }

    #[test]
    fn test_multiline_product_type_keeps_first_line() {
        assert_eq!(
            decode_product_type("Maple Leaf\nsynced-from: mobile"),
            "Maple Leaf"
        );
    }

    #[test]
    fn test_json_without_known_keys_falls_back_to_first_line() {
        assert_eq!(decode_product_type(r#"{"foo":1}"#), r#"{"foo":1}"#);
    }

    // ==================== Notes Decoding ====================

    #[test]
    fn test_genuine_note_passes_through() {
        assert_eq!(
            decode_notes(Some("bought at local dealer".to_string())),
            Some("bought at local dealer".to_string())
        );
    }

    #[test]
    fn test_metadata_json_note_is_discarded() {
        for json in [
            r#"{"local_id":"123-abc"}"#,
            r#"{"cost_basis":2000}"#,
            r#"{"source":"import"}"#,
            r#"{"created_at":"2024-01-01"}"#,
        ] {
            assert_eq!(decode_notes(Some(json.to_string())), None, "{}", json);
        }
    }

    #[test]
    fn test_note_containing_marker_substring_is_discarded() {
        let raw = "local_id=1700000000000-ab12cd34".to_string();
        assert_eq!(decode_notes(Some(raw)), None);
    }

    #[test]
    fn test_json_note_without_metadata_keys_passes_through() {
        let raw = r#"{"grade":"MS70"}"#.to_string();
        assert_eq!(decode_notes(Some(raw.clone())), Some(raw));
    }

    #[test]
    fn test_empty_note_is_absent() {
        assert_eq!(decode_notes(Some("  ".to_string())), None);
        assert_eq!(decode_notes(None), None);
    }
}

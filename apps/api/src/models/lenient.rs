//! Accessors for model-produced JSON. Nothing the model returns is trusted
//! literally: numbers may arrive as strings, keys may be missing or blank.

use serde_json::Value;

/// Returns a trimmed, non-empty string field.
pub fn text_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Reads a number given as `85`, `85.4`, `"85"` or `"85%"`.
pub fn number_field(value: &Value, key: &str) -> Option<f64> {
    let n = match value.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|n| n.is_finite())
}

/// A 0–100 score, rounded and clamped.
pub fn score_field(value: &Value, key: &str) -> Option<u8> {
    number_field(value, key).map(|n| n.round().clamp(0.0, 100.0) as u8)
}

/// A 1–5 proficiency level, rounded and clamped.
pub fn level_field(value: &Value, key: &str) -> Option<u8> {
    number_field(value, key).map(clamp_level)
}

pub fn clamp_level(n: f64) -> u8 {
    n.round().clamp(1.0, 5.0) as u8
}

/// String items of an array field; non-string and blank items are skipped.
pub fn string_list(value: &Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|item| item.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_text_field_skips_blank() {
        let v = json!({"a": "  x ", "b": "   ", "c": 3});
        assert_eq!(text_field(&v, "a").as_deref(), Some("x"));
        assert_eq!(text_field(&v, "b"), None);
        assert_eq!(text_field(&v, "c"), None);
        assert_eq!(text_field(&v, "missing"), None);
    }

    #[test]
    fn test_score_field_accepts_strings_and_clamps() {
        let v = json!({"n": 85, "s": "72%", "f": 64.6, "hi": 140, "lo": -3, "bad": "high"});
        assert_eq!(score_field(&v, "n"), Some(85));
        assert_eq!(score_field(&v, "s"), Some(72));
        assert_eq!(score_field(&v, "f"), Some(65));
        assert_eq!(score_field(&v, "hi"), Some(100));
        assert_eq!(score_field(&v, "lo"), Some(0));
        assert_eq!(score_field(&v, "bad"), None);
    }

    #[test]
    fn test_level_field_clamps_to_one_through_five() {
        let v = json!({"a": 0, "b": 9, "c": "4"});
        assert_eq!(level_field(&v, "a"), Some(1));
        assert_eq!(level_field(&v, "b"), Some(5));
        assert_eq!(level_field(&v, "c"), Some(4));
    }

    #[test]
    fn test_string_list_filters_non_strings() {
        let v = json!({"xs": ["a", 1, " ", "b"]});
        assert_eq!(string_list(&v, "xs"), vec!["a", "b"]);
        assert!(string_list(&v, "missing").is_empty());
    }
}

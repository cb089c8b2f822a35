//! Typed reads of loosely-typed table rows.

use serde_json::Value;
use showroom_core::Row;

/// String column, empty when absent or not a string.
pub fn text(row: &Row, column: &str) -> String {
    opt_text(row, column).unwrap_or_default()
}

pub fn opt_text(row: &Row, column: &str) -> Option<String> {
    match row.get(column)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Numeric column. Numbers stored as text are accepted.
pub fn number(row: &Row, column: &str) -> Option<f64> {
    match row.get(column)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Key column value, if present and not null.
pub fn key(row: &Row, column: &str) -> Option<Value> {
    row.get(column).filter(|v| !v.is_null()).cloned()
}

/// Key value as plain text (no JSON quoting for string keys).
pub fn id_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Required text field: trimmed, non-empty.
pub fn require(value: &str, label: &str) -> showroom_core::Result<()> {
    if value.trim().is_empty() {
        return Err(showroom_core::ShowroomError::validation(format!("{label} is required")));
    }
    Ok(())
}

/// A column as loaded, next to the typed value it was read as.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    raw: Value,
    read_as: T,
}

impl<T: PartialEq> Loaded<T> {
    pub fn new(raw: Value, read_as: T) -> Self {
        Self { raw, read_as }
    }

    /// The stored value while `current` still reads the same, else `fresh`.
    pub fn write_back(loaded: Option<&Self>, current: &T, fresh: Value) -> Value {
        match loaded {
            Some(loaded) if loaded.read_as == *current => loaded.raw.clone(),
            _ => fresh,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_text_and_number_coercion() {
        let r = row(json!({"name": "Oak Table", "price": "1299.50", "qty": 3, "note": null}));
        assert_eq!(text(&r, "name"), "Oak Table");
        assert_eq!(text(&r, "note"), "");
        assert_eq!(opt_text(&r, "qty").as_deref(), Some("3"));
        assert_eq!(number(&r, "price"), Some(1299.5));
        assert_eq!(number(&r, "missing"), None);
    }

    #[test]
    fn test_require_rejects_blank() {
        assert!(require("  ", "Title").is_err());
        assert!(require("Sofa Set", "Title").is_ok());
    }

    #[test]
    fn test_loaded_column_written_back_until_changed() {
        let loaded = Loaded::new(json!("Showcase"), 1);
        assert_eq!(Loaded::write_back(Some(&loaded), &1, json!("image")), json!("Showcase"));
        assert_eq!(Loaded::write_back(Some(&loaded), &2, json!("video")), json!("video"));
        assert_eq!(Loaded::write_back(None, &1, json!("image")), json!("image"));
    }
}

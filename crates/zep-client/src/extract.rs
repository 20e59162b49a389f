//! Typed id extraction from loosely-shaped API responses.
//!
//! Zephyr responses name the same identifier differently across endpoints
//! (`id` vs `cycleId` vs `folderId`, sometimes nested under `execution`).
//! `Ok(None)` means the field is genuinely absent; `Err(Malformed)` means
//! the response is not an object or the field holds a non-id value.

use serde_json::Value;

use crate::error::ClientError;

/// Extract an id (string or integer) from `value` at the first key present.
///
/// # Errors
///
/// Returns [`ClientError::Malformed`] if `value` is not a JSON object or a
/// matching key holds something other than a string or integer.
pub(crate) fn extract_id(value: &Value, keys: &[&str]) -> Result<Option<String>, ClientError> {
    let Some(object) = value.as_object() else {
        return Err(ClientError::Malformed(format!(
            "expected a JSON object, got: {value}"
        )));
    };

    for key in keys {
        if let Some(field) = object.get(*key) {
            return id_value(field)
                .map(Some)
                .ok_or_else(|| ClientError::Malformed(format!("field '{key}' is not an id: {field}")));
        }
    }
    Ok(None)
}

fn id_value(field: &Value) -> Option<String> {
    match field {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn string_and_numeric_ids_extract() {
        let value = json!({"id": "123"});
        assert_eq!(extract_id(&value, &["id"]).unwrap(), Some("123".into()));

        let value = json!({"cycleId": 456});
        assert_eq!(
            extract_id(&value, &["id", "cycleId"]).unwrap(),
            Some("456".into())
        );
    }

    #[test]
    fn first_present_key_wins() {
        let value = json!({"folderId": 9, "id": 1});
        assert_eq!(extract_id(&value, &["id", "folderId"]).unwrap(), Some("1".into()));
        assert_eq!(extract_id(&value, &["folderId", "id"]).unwrap(), Some("9".into()));
    }

    #[test]
    fn absent_field_is_none_not_error() {
        let value = json!({"name": "Sprint1"});
        assert_eq!(extract_id(&value, &["id", "cycleId"]).unwrap(), None);
    }

    #[test]
    fn non_object_is_malformed() {
        let err = extract_id(&json!([1, 2]), &["id"]).unwrap_err();
        assert!(matches!(err, ClientError::Malformed(_)));
    }

    #[test]
    fn wrong_typed_field_is_malformed() {
        let err = extract_id(&json!({"id": {"nested": true}}), &["id"]).unwrap_err();
        assert!(matches!(err, ClientError::Malformed(_)));
    }
}

//! Operator-supplied user mapping.
//!
//! A JSON object of `display name → account id` that takes precedence over
//! directory search. The file is optional; any problem loading it degrades
//! to an empty map so a bad mapping never blocks a run.

use std::collections::HashMap;
use std::path::Path;

/// Load the user mapping file. Missing or malformed files return an empty
/// map with a warning.
#[must_use]
pub fn load_user_mapping(path: &Path) -> HashMap<String, String> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) => {
            tracing::warn!(path = %path.display(), %error, "could not read user mapping file");
            return HashMap::new();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(mapping) => mapping,
        Err(error) => {
            tracing::warn!(path = %path.display(), %error, "could not parse user mapping file");
            HashMap::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn loads_mapping_from_json() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        write!(
            file,
            r#"{{"Jane Doe": "5b10ac8d82e05b22cc7d4ef5", "Sam Lee": "712020:abc"}}"#
        )
        .expect("write");

        let mapping = load_user_mapping(file.path());
        assert_eq!(mapping.len(), 2);
        assert_eq!(
            mapping.get("Jane Doe").map(String::as_str),
            Some("5b10ac8d82e05b22cc7d4ef5")
        );
    }

    #[test]
    fn missing_file_is_empty_map() {
        let mapping = load_user_mapping(Path::new("/nonexistent/mapping.json"));
        assert!(mapping.is_empty());
    }

    #[test]
    fn malformed_file_is_empty_map() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        write!(file, "not json").expect("write");
        let mapping = load_user_mapping(file.path());
        assert!(mapping.is_empty());
    }
}

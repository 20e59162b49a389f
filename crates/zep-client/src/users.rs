//! User name → account id resolution.
//!
//! Precedence: operator-supplied mapping (normalized name, then the raw
//! name), then a case-insensitive match against the directory fetched once
//! at startup. All outcomes are cached under the normalized name, absent
//! outcomes included.

use std::collections::HashMap;

use zep_core::normalize::{normalize_user_name, normalize_whitespace};

use crate::jira::JiraUser;

/// Resolve a raw display name from the CSV to an account id.
pub fn resolve_account_id(
    raw_name: &str,
    cache: &mut HashMap<String, Option<String>>,
    mapping: &HashMap<String, String>,
    directory: &[JiraUser],
) -> Option<String> {
    if raw_name.is_empty() {
        return None;
    }

    let normalized = normalize_user_name(raw_name);
    if let Some(cached) = cache.get(&normalized) {
        return cached.clone();
    }

    let resolved = mapping
        .get(&normalized)
        .or_else(|| mapping.get(raw_name))
        .cloned()
        .or_else(|| {
            directory
                .iter()
                .find(|u| {
                    normalize_whitespace(&u.display_name).eq_ignore_ascii_case(&normalized)
                })
                .map(|u| u.account_id.clone())
        });

    cache.insert(normalized, resolved.clone());
    resolved
}

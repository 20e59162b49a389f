//! Get-or-create reference resolvers and their run-scoped caches.
//!
//! Every resolver checks [`RefCaches`] first, creates through the API on a
//! miss, and caches the outcome — including absent outcomes, so a failed
//! creation is not re-attempted for every record that names it. Caches are
//! owned by the workflow driver and live for exactly one run.

use std::collections::HashMap;

use crate::jira::JiraClient;
use crate::zephyr::{FolderInfo, ZephyrClient};

/// Version id used for "Unscheduled" and unresolvable versions.
pub const UNSCHEDULED_VERSION_ID: i64 = -1;

/// Cycle name used when the CSV leaves the cycle blank.
pub const DEFAULT_CYCLE_NAME: &str = "Ad hoc";

/// Process-local memos for one migration run.
#[derive(Debug, Default)]
pub struct RefCaches {
    /// Fix version name → id, prefetched, extended by creations.
    pub versions: HashMap<String, i64>,
    /// Component name → id, prefetched, extended by creations.
    pub components: HashMap<String, String>,
    /// User display name (normalized) → account id; `None` = unresolvable.
    pub users: HashMap<String, Option<String>>,
    issue_ids: HashMap<String, Option<String>>,
    cycles: HashMap<(String, i64), Option<String>>,
    folders: HashMap<(String, i64, i64, String), Option<String>>,
    folder_listings: HashMap<(i64, i64, String), Vec<FolderInfo>>,
}

impl RefCaches {
    /// Seed the caches with the prefetched version and component maps.
    #[must_use]
    pub fn new(versions: HashMap<String, i64>, components: HashMap<String, String>) -> Self {
        Self {
            versions,
            components,
            ..Self::default()
        }
    }
}

pub(crate) enum VersionLookup {
    /// Empty or "unscheduled" — use the sentinel, no API call.
    Sentinel,
    Cached(i64),
    Create(String),
}

pub(crate) fn version_lookup(versions: &HashMap<String, i64>, name: &str) -> VersionLookup {
    let name = name.trim();
    if name.is_empty() || name.eq_ignore_ascii_case("unscheduled") {
        return VersionLookup::Sentinel;
    }
    versions
        .get(name)
        .copied()
        .map_or_else(|| VersionLookup::Create(name.to_string()), VersionLookup::Cached)
}

pub(crate) fn match_folder(listing: &[FolderInfo], name: &str) -> Option<String> {
    listing.iter().find(|f| f.matches(name)).and_then(FolderInfo::id)
}

/// Resolve an issue key to its Jira id, caching absent outcomes.
pub async fn issue_id(
    jira: &JiraClient,
    caches: &mut RefCaches,
    issue_key: &str,
) -> Option<String> {
    if let Some(cached) = caches.issue_ids.get(issue_key) {
        return cached.clone();
    }

    let resolved = match jira.get_issue_id(issue_key).await {
        Ok(id) => Some(id),
        Err(error) => {
            tracing::warn!(issue_key, %error, "Jira issue not found");
            None
        }
    };
    caches.issue_ids.insert(issue_key.to_string(), resolved.clone());
    resolved
}

/// Resolve a version name to its id, creating the version on a miss.
///
/// Empty and "unscheduled" names map to [`UNSCHEDULED_VERSION_ID`]; so does
/// a failed creation.
pub async fn version_id(
    jira: &JiraClient,
    caches: &mut RefCaches,
    project_id: i64,
    version_name: &str,
) -> i64 {
    let name = match version_lookup(&caches.versions, version_name) {
        VersionLookup::Sentinel => return UNSCHEDULED_VERSION_ID,
        VersionLookup::Cached(id) => return id,
        VersionLookup::Create(name) => name,
    };

    match jira.create_version(project_id, &name).await {
        Ok(id) => {
            caches.versions.insert(name, id);
            id
        }
        Err(error) => {
            tracing::warn!(version = %name, %error, "could not create version");
            UNSCHEDULED_VERSION_ID
        }
    }
}

/// Resolve a component name to its id, creating the component on a miss.
pub async fn component_id(
    jira: &JiraClient,
    caches: &mut RefCaches,
    project_key: &str,
    component_name: &str,
) -> Option<String> {
    let name = component_name.trim();
    if name.is_empty() {
        return None;
    }
    if let Some(id) = caches.components.get(name) {
        return Some(id.clone());
    }

    match jira.create_component(project_key, name).await {
        Ok(id) => {
            caches.components.insert(name.to_string(), id.clone());
            Some(id)
        }
        Err(error) => {
            tracing::warn!(component = name, %error, "could not create component");
            None
        }
    }
}

/// Resolve a cycle to its id, creating it on a miss.
///
/// Cycles are keyed by (name, version); creation is not preceded by a
/// listing lookup — an absent cache entry always creates.
pub async fn cycle_id(
    zephyr: &ZephyrClient,
    caches: &mut RefCaches,
    project_id: i64,
    version_id: i64,
    cycle_name: &str,
) -> Option<String> {
    let name = if cycle_name.is_empty() {
        DEFAULT_CYCLE_NAME
    } else {
        cycle_name
    };

    let key = (name.to_string(), version_id);
    if let Some(cached) = caches.cycles.get(&key) {
        return cached.clone();
    }

    let resolved = match zephyr.create_cycle(project_id, version_id, name).await {
        Ok(id) => Some(id),
        Err(error) => {
            tracing::warn!(cycle = name, version_id, %error, "could not create cycle");
            None
        }
    };
    caches.cycles.insert(key, resolved.clone());
    resolved
}

/// Resolve a folder to its id within a (project, version, cycle) scope.
///
/// The scope's folder listing is fetched lazily and cached; a name match is
/// case-insensitive. Misses create the folder and append it to the cached
/// listing.
pub async fn folder_id(
    zephyr: &ZephyrClient,
    caches: &mut RefCaches,
    project_id: i64,
    version_id: i64,
    cycle_id: &str,
    folder_name: &str,
) -> Option<String> {
    let name = folder_name.trim();
    if name.is_empty() {
        return None;
    }

    let key = (name.to_string(), project_id, version_id, cycle_id.to_string());
    if let Some(cached) = caches.folders.get(&key) {
        return cached.clone();
    }

    let scope = (project_id, version_id, cycle_id.to_string());
    if !caches.folder_listings.contains_key(&scope) {
        let listing = match zephyr.list_folders(project_id, version_id, cycle_id).await {
            Ok(listing) => listing,
            Err(error) => {
                tracing::warn!(cycle_id, %error, "could not list folders");
                Vec::new()
            }
        };
        caches.folder_listings.insert(scope.clone(), listing);
    }

    let listing = caches.folder_listings.get(&scope).expect("listing just inserted");
    let mut resolved = match_folder(listing, name);

    if resolved.is_none() {
        match zephyr.create_folder(project_id, version_id, cycle_id, name).await {
            Ok(folder) => {
                resolved = folder.id();
                if let Some(listing) = caches.folder_listings.get_mut(&scope) {
                    listing.push(folder);
                }
            }
            Err(error) => {
                tracing::warn!(folder = name, cycle_id, %error, "could not create folder");
            }
        }
    }

    caches.folders.insert(key, resolved.clone());
    resolved
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    // Clients pointed at an unroutable port: any accidental request in a
    // cache-hit path would error loudly instead of resolving.
    fn jira() -> JiraClient {
        JiraClient::new("http://127.0.0.1:1", "nobody@example.com", "token")
    }

    fn zephyr() -> ZephyrClient {
        ZephyrClient::new("http://127.0.0.1:1", "ak", "sk", "account")
    }

    #[test]
    fn version_lookup_sentinel_cases() {
        let versions = HashMap::from([("1.0".to_string(), 10001)]);
        assert!(matches!(version_lookup(&versions, ""), VersionLookup::Sentinel));
        assert!(matches!(version_lookup(&versions, "   "), VersionLookup::Sentinel));
        assert!(matches!(
            version_lookup(&versions, "Unscheduled"),
            VersionLookup::Sentinel
        ));
        assert!(matches!(
            version_lookup(&versions, "UNSCHEDULED"),
            VersionLookup::Sentinel
        ));
    }

    #[test]
    fn version_lookup_cached_and_create() {
        let versions = HashMap::from([("1.0".to_string(), 10001)]);
        assert!(matches!(version_lookup(&versions, " 1.0 "), VersionLookup::Cached(10001)));
        match version_lookup(&versions, "2.0") {
            VersionLookup::Create(name) => assert_eq!(name, "2.0"),
            _ => panic!("expected create"),
        }
    }

    #[test]
    fn folder_matching_ignores_case() {
        let listing: Vec<FolderInfo> = serde_json::from_value(json!([
            {"id": 1, "name": "Smoke"},
            {"id": 2, "name": " Regression "}
        ]))
        .unwrap();
        assert_eq!(match_folder(&listing, "regression"), Some("2".into()));
        assert_eq!(match_folder(&listing, "SMOKE"), Some("1".into()));
        assert_eq!(match_folder(&listing, "perf"), None);
    }

    #[tokio::test]
    async fn issue_id_cache_hit_skips_the_api() {
        let jira = jira();
        let mut caches = RefCaches::default();
        caches
            .issue_ids
            .insert("GCTEST-94808".into(), Some("31415".into()));
        caches.issue_ids.insert("GCTEST-95392".into(), None);

        assert_eq!(
            issue_id(&jira, &mut caches, "GCTEST-94808").await,
            Some("31415".into())
        );
        // Cached absence is also a hit — no second lookup.
        assert_eq!(issue_id(&jira, &mut caches, "GCTEST-95392").await, None);
    }

    #[tokio::test]
    async fn version_id_cache_hit_skips_the_api() {
        let jira = jira();
        let mut caches = RefCaches::new(HashMap::from([("1.0".to_string(), 10001)]), HashMap::new());
        assert_eq!(version_id(&jira, &mut caches, 10200, "1.0").await, 10001);
        assert_eq!(
            version_id(&jira, &mut caches, 10200, "Unscheduled").await,
            UNSCHEDULED_VERSION_ID
        );
    }

    #[tokio::test]
    async fn component_id_cache_hit_skips_the_api() {
        let jira = jira();
        let mut caches = RefCaches::new(
            HashMap::new(),
            HashMap::from([("Billing".to_string(), "20001".to_string())]),
        );
        assert_eq!(
            component_id(&jira, &mut caches, "GCTEST", "Billing").await,
            Some("20001".into())
        );
        assert_eq!(component_id(&jira, &mut caches, "GCTEST", "  ").await, None);
    }

    #[tokio::test]
    async fn cycle_id_cache_hit_skips_the_api() {
        let zephyr = zephyr();
        let mut caches = RefCaches::default();
        caches
            .cycles
            .insert(("Sprint1".to_string(), -1), Some("cyc-9".into()));
        assert_eq!(
            cycle_id(&zephyr, &mut caches, 10200, -1, "Sprint1").await,
            Some("cyc-9".into())
        );
    }

    #[tokio::test]
    async fn blank_cycle_name_uses_the_default() {
        let zephyr = zephyr();
        let mut caches = RefCaches::default();
        caches
            .cycles
            .insert((DEFAULT_CYCLE_NAME.to_string(), -1), Some("adhoc-1".into()));
        assert_eq!(
            cycle_id(&zephyr, &mut caches, 10200, -1, "").await,
            Some("adhoc-1".into())
        );
    }

    #[tokio::test]
    async fn folder_id_resolves_from_cached_listing() {
        let zephyr = zephyr();
        let mut caches = RefCaches::default();
        let listing: Vec<FolderInfo> =
            serde_json::from_value(json!([{"id": 77, "name": "Regression"}])).unwrap();
        caches
            .folder_listings
            .insert((10200, -1, "cyc-9".to_string()), listing);

        assert_eq!(
            folder_id(&zephyr, &mut caches, 10200, -1, "cyc-9", "regression").await,
            Some("77".into())
        );
        // Second call hits the per-folder cache.
        assert_eq!(
            folder_id(&zephyr, &mut caches, 10200, -1, "cyc-9", "regression").await,
            Some("77".into())
        );
        assert_eq!(
            folder_id(&zephyr, &mut caches, 10200, -1, "cyc-9", "").await,
            None
        );
    }
}

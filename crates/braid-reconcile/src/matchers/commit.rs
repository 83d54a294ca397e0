use braid_core::CanonicalEvent;

use super::MatchReason;
use crate::config::ReconcileConfig;

/// Hex-only and at least `min_len` long. Branch names like `main` fail this.
fn looks_like_commit(s: &str, min_len: usize) -> bool {
    s.len() >= min_len.max(1) && s.chars().all(|c| c.is_ascii_hexdigit())
}

/// Either hash is a case-insensitive prefix of the other.
///
/// Both sides must be hex and at least `min_len` characters; a `min_len` of
/// 0 is treated as 1 and never disables the hex check.
pub(crate) fn hash_prefix_match(a: &str, b: &str, min_len: usize) -> bool {
    let (a, b) = (a.trim(), b.trim());
    if !looks_like_commit(a, min_len) || !looks_like_commit(b, min_len) {
        return false;
    }
    let a = a.to_ascii_lowercase();
    let b = b.to_ascii_lowercase();
    a.starts_with(&b) || b.starts_with(&a)
}

/// `hash` and `fullHash`; metadata shas only when neither is set.
fn commit_refs(event: &CanonicalEvent) -> Vec<String> {
    let mut refs: Vec<String> = [&event.hash, &event.full_hash]
        .into_iter()
        .flatten()
        .filter(|h| !h.trim().is_empty())
        .cloned()
        .collect();
    if refs.is_empty() {
        refs.extend(event.hints().commit_ref().map(str::to_string));
    }
    refs
}

pub(super) fn matches(
    e1: &CanonicalEvent,
    e2: &CanonicalEvent,
    cfg: &ReconcileConfig,
) -> Option<MatchReason> {
    let (r1, r2) = (commit_refs(e1), commit_refs(e2));
    let hit = r1
        .iter()
        .any(|a| r2.iter().any(|b| hash_prefix_match(a, b, cfg.min_hash_prefix)));
    hit.then_some(MatchReason::CommitHash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matchers::test_support::ev;
    use braid_core::providers::{HOSTING_API, LOCAL_VCS};
    use braid_core::EventType;

    fn pair() -> (CanonicalEvent, CanonicalEvent) {
        (
            ev("local-1", LOCAL_VCS, EventType::Commit),
            ev("gh-1", HOSTING_API, EventType::Commit),
        )
    }

    #[test]
    fn abbreviated_hash_matches_full_hash() {
        let (mut a, mut b) = pair();
        a.full_hash = Some("abc123def456".to_string());
        b.hash = Some("abc123d".to_string());
        let cfg = ReconcileConfig::default();
        assert_eq!(matches(&a, &b, &cfg), Some(MatchReason::CommitHash));
        assert_eq!(matches(&b, &a, &cfg), Some(MatchReason::CommitHash));
    }

    #[test]
    fn length_floor_and_hex_check() {
        assert!(!hash_prefix_match("abc", "abc123d", 4));
        assert!(hash_prefix_match("abc", "abc123d", 3));
        assert!(!hash_prefix_match("main", "main", 0));
        assert!(hash_prefix_match("a", "abc123d", 0));
    }

    #[test]
    fn prefix_is_case_insensitive() {
        let (mut a, mut b) = pair();
        a.hash = Some("ABC123D".to_string());
        b.full_hash = Some("abc123def456".to_string());
        assert!(matches(&a, &b, &ReconcileConfig::default()).is_some());
    }

    #[test]
    fn different_hashes_do_not_match() {
        let (mut a, mut b) = pair();
        a.hash = Some("abc123d".to_string());
        b.hash = Some("abc124d".to_string());
        assert_eq!(matches(&a, &b, &ReconcileConfig::default()), None);
    }

    #[test]
    fn no_identifying_data_means_no_match() {
        let (mut a, mut b) = pair();
        a.title = "Fix typo".to_string();
        b.title = "Fix typo".to_string();
        assert_eq!(matches(&a, &b, &ReconcileConfig::default()), None);
    }

    #[test]
    fn metadata_sha_is_a_fallback() {
        let (mut a, mut b) = pair();
        a.hash = Some("deadbeef".to_string());
        b.metadata
            .insert("sha".to_string(), serde_json::json!("deadbeef00112233"));
        assert!(matches(&a, &b, &ReconcileConfig::default()).is_some());
    }

    #[test]
    fn metadata_sha_ignored_when_hash_present() {
        let (mut a, mut b) = pair();
        a.hash = Some("deadbeef".to_string());
        b.hash = Some("cafebabe".to_string());
        b.metadata
            .insert("sha".to_string(), serde_json::json!("deadbeef"));
        assert_eq!(matches(&a, &b, &ReconcileConfig::default()), None);
    }

    #[test]
    fn too_short_prefix_is_rejected() {
        let (mut a, mut b) = pair();
        a.hash = Some("abc".to_string());
        b.hash = Some("abc123def456".to_string());
        assert_eq!(matches(&a, &b, &ReconcileConfig::default()), None);
        let cfg = ReconcileConfig {
            min_hash_prefix: 3,
            ..ReconcileConfig::default()
        };
        assert!(matches(&a, &b, &cfg).is_some());
    }

    #[test]
    fn non_hex_refs_are_not_commits() {
        assert!(!hash_prefix_match("main", "main", 4));
        assert!(!hash_prefix_match("", "abcd", 0));
        assert!(hash_prefix_match(" abcd ", "ABCDEF", 4));
    }
}

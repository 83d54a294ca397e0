//! Releases match in three tiers, most certain first. The first tier that
//! succeeds wins; only the fuzzy tier looks at timestamps.

use braid_core::CanonicalEvent;

use super::{hash_prefix_match, MatchReason};
use crate::config::ReconcileConfig;
use crate::version::{normalize_tag, tag_from_title, tags_equivalent, version_in};

/// `tags[0]`, then `tagName` metadata, then a tag spelled out in the title.
fn release_tag(event: &CanonicalEvent) -> Option<String> {
    event
        .tags
        .first()
        .filter(|t| !t.trim().is_empty())
        .cloned()
        .or_else(|| event.hints().tag_name)
        .or_else(|| tag_from_title(&event.title))
}

/// `hash`, then `target_commitish` / `targetCommit` metadata.
fn release_target(event: &CanonicalEvent) -> Option<String> {
    event
        .hash
        .clone()
        .filter(|h| !h.trim().is_empty())
        .or_else(|| event.hints().release_target().map(str::to_string))
}

fn tag_tier(e1: &CanonicalEvent, e2: &CanonicalEvent) -> bool {
    match (release_tag(e1), release_tag(e2)) {
        (Some(a), Some(b)) => tags_equivalent(&a, &b),
        _ => false,
    }
}

fn target_tier(e1: &CanonicalEvent, e2: &CanonicalEvent, cfg: &ReconcileConfig) -> bool {
    match (release_target(e1), release_target(e2)) {
        (Some(a), Some(b)) => hash_prefix_match(&a, &b, cfg.min_hash_prefix),
        _ => false,
    }
}

fn titles_similar(a: &str, b: &str) -> bool {
    match (version_in(a), version_in(b)) {
        (Some(va), Some(vb)) => normalize_tag(&va) == normalize_tag(&vb),
        _ => {
            let (a, b) = (a.trim().to_lowercase(), b.trim().to_lowercase());
            !a.is_empty() && !b.is_empty() && (a.contains(&b) || b.contains(&a))
        }
    }
}

fn fuzzy_tier(e1: &CanonicalEvent, e2: &CanonicalEvent, cfg: &ReconcileConfig) -> bool {
    let close = (e1.timestamp - e2.timestamp).abs() <= cfg.release_window();
    close && titles_similar(&e1.title, &e2.title)
}

pub(super) fn matches(
    e1: &CanonicalEvent,
    e2: &CanonicalEvent,
    cfg: &ReconcileConfig,
) -> Option<MatchReason> {
    if tag_tier(e1, e2) {
        Some(MatchReason::ReleaseTag)
    } else if target_tier(e1, e2, cfg) {
        Some(MatchReason::ReleaseTargetCommit)
    } else if fuzzy_tier(e1, e2, cfg) {
        Some(MatchReason::ReleaseFuzzy)
    } else {
        None
    }
}

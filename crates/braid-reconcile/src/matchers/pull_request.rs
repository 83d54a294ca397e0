use braid_core::CanonicalEvent;

use super::MatchReason;

/// Identical PR number on both sides. No fuzzy fallback.
pub(super) fn matches(e1: &CanonicalEvent, e2: &CanonicalEvent) -> Option<MatchReason> {
    match (e1.pull_request_number, e2.pull_request_number) {
        (Some(a), Some(b)) if a == b => Some(MatchReason::PullRequestNumber),
        _ => None,
    }
}

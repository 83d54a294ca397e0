//! Per-category match predicates.
//!
//! [`match_events`] decides whether two raw events from different providers
//! describe the same repository action, and if so names the rule that fired.
//! Every predicate is pure and leaves events unmatched when identifying data
//! is missing: under-merging is preferred to a wrong merge.

mod branch;
mod commit;
mod pull_request;
mod release;
mod tag;

use braid_core::{CanonicalEvent, EventType};
use serde::Serialize;

use crate::config::ReconcileConfig;

pub(crate) use commit::hash_prefix_match;

/// How sure a rule is that two events are one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    High,
    Certain,
}

/// The rule that judged two events equivalent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchReason {
    /// Same `canonicalId`.
    SameRecord,
    /// One commit hash is a prefix of the other.
    CommitHash,
    PullRequestNumber,
    /// Release tier 1.
    ReleaseTag,
    /// Release tier 2.
    ReleaseTargetCommit,
    /// Release tier 3: title similarity inside the release window.
    ReleaseFuzzy,
    Tag,
    BranchLifecycle,
}

impl MatchReason {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchReason::SameRecord => "same_record",
            MatchReason::CommitHash => "commit_hash",
            MatchReason::PullRequestNumber => "pull_request_number",
            MatchReason::ReleaseTag => "release_tag",
            MatchReason::ReleaseTargetCommit => "release_target_commit",
            MatchReason::ReleaseFuzzy => "release_fuzzy",
            MatchReason::Tag => "tag",
            MatchReason::BranchLifecycle => "branch_lifecycle",
        }
    }

    pub fn confidence(self) -> Confidence {
        match self {
            MatchReason::SameRecord | MatchReason::CommitHash | MatchReason::ReleaseTargetCommit => {
                Confidence::Certain
            }
            MatchReason::PullRequestNumber | MatchReason::ReleaseTag | MatchReason::Tag => {
                Confidence::High
            }
            MatchReason::ReleaseFuzzy | MatchReason::BranchLifecycle => Confidence::Low,
        }
    }
}

/// A local merge commit and a hosted "PR merged" event may be one action.
fn is_merge_cross_pair(a: EventType, b: EventType) -> bool {
    matches!(
        (a, b),
        (EventType::Merge, EventType::PrMerged) | (EventType::PrMerged, EventType::Merge)
    )
}

/// Decide whether `e1` and `e2` are the same action.
///
/// Dispatches on `e1`'s type. Events from the same provider never match
/// unless they are literally the same record.
pub fn match_events(
    e1: &CanonicalEvent,
    e2: &CanonicalEvent,
    cfg: &ReconcileConfig,
) -> Option<MatchReason> {
    if !e1.canonical_id.is_empty() && e1.canonical_id == e2.canonical_id {
        return Some(MatchReason::SameRecord);
    }
    if e1.provider_id == e2.provider_id {
        return None;
    }
    if e1.event_type != e2.event_type {
        if !is_merge_cross_pair(e1.event_type, e2.event_type) {
            return None;
        }
        // Symmetric: the merge commit sha first, then the PR number.
        return commit::matches(e1, e2, cfg).or_else(|| pull_request::matches(e1, e2));
    }

    match e1.event_type {
        EventType::Commit | EventType::Merge => commit::matches(e1, e2, cfg),
        t if t.is_pull_request() => pull_request::matches(e1, e2),
        EventType::Release => release::matches(e1, e2, cfg),
        EventType::TagCreated => tag::matches(e1, e2),
        t if t.is_branch_lifecycle() => branch::matches(e1, e2, cfg),
        _ => None,
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::ev;
    use super::*;
    use braid_core::providers::{HOSTING_API, LOCAL_VCS};

    fn cfg() -> ReconcileConfig {
        ReconcileConfig::default()
    }

    #[test]
    fn same_canonical_id_matches() {
        let a = ev("x", LOCAL_VCS, EventType::IssueOpened);
        let mut b = ev("y", HOSTING_API, EventType::IssueOpened);
        b.canonical_id = "x".to_string();
        assert_eq!(match_events(&a, &b, &cfg()), Some(MatchReason::SameRecord));
    }

    #[test]
    fn empty_canonical_ids_do_not_match() {
        let mut a = ev("x", LOCAL_VCS, EventType::IssueOpened);
        let mut b = ev("y", HOSTING_API, EventType::IssueOpened);
        a.canonical_id.clear();
        b.canonical_id.clear();
        assert_eq!(match_events(&a, &b, &cfg()), None);
    }

    #[test]
    fn same_provider_never_matches() {
        let mut a = ev("a", LOCAL_VCS, EventType::Commit);
        let mut b = ev("b", LOCAL_VCS, EventType::Commit);
        a.hash = Some("abc1234".to_string());
        b.hash = Some("abc1234".to_string());
        assert_eq!(match_events(&a, &b, &cfg()), None);
    }

    #[test]
    fn type_mismatch_never_matches() {
        let mut a = ev("a", LOCAL_VCS, EventType::Commit);
        let mut b = ev("b", HOSTING_API, EventType::Release);
        a.hash = Some("abc1234".to_string());
        b.hash = Some("abc1234".to_string());
        assert_eq!(match_events(&a, &b, &cfg()), None);
    }

    #[test]
    fn merge_and_pr_merged_match_by_sha_in_both_orders() {
        let mut local = ev("a", LOCAL_VCS, EventType::Merge);
        local.hash = Some("9f8e7d6c5b4a".to_string());
        let mut remote = ev("b", HOSTING_API, EventType::PrMerged);
        remote.pull_request_number = Some(12);
        remote
            .metadata
            .insert("sha".to_string(), serde_json::json!("9f8e7d6"));
        assert_eq!(match_events(&local, &remote, &cfg()), Some(MatchReason::CommitHash));
        assert_eq!(match_events(&remote, &local, &cfg()), Some(MatchReason::CommitHash));
    }

    #[test]
    fn merge_and_pr_merged_fall_back_to_pr_number() {
        let mut local = ev("a", LOCAL_VCS, EventType::Merge);
        local.pull_request_number = Some(12);
        let mut remote = ev("b", HOSTING_API, EventType::PrMerged);
        remote.pull_request_number = Some(12);
        assert_eq!(
            match_events(&remote, &local, &cfg()),
            Some(MatchReason::PullRequestNumber)
        );
    }

    #[test]
    fn unhandled_types_never_match() {
        let mut a = ev("a", LOCAL_VCS, EventType::IssueOpened);
        let mut b = ev("b", HOSTING_API, EventType::IssueOpened);
        a.title = "Crash on start".to_string();
        b.title = "Crash on start".to_string();
        a.pull_request_number = Some(3);
        b.pull_request_number = Some(3);
        assert_eq!(match_events(&a, &b, &cfg()), None);
    }

    #[test]
    fn pr_number_strictness_across_types() {
        let mut opened = ev("a", LOCAL_VCS, EventType::PrOpened);
        let mut closed = ev("b", HOSTING_API, EventType::PrClosed);
        opened.pull_request_number = Some(7);
        closed.pull_request_number = Some(7);
        assert_eq!(match_events(&opened, &closed, &cfg()), None);

        let mut opened2 = ev("c", HOSTING_API, EventType::PrOpened);
        opened2.pull_request_number = Some(7);
        assert_eq!(
            match_events(&opened, &opened2, &cfg()),
            Some(MatchReason::PullRequestNumber)
        );
    }

    #[test]
    fn confidence_ordering() {
        assert!(MatchReason::CommitHash.confidence() > MatchReason::ReleaseTag.confidence());
        assert!(MatchReason::ReleaseTag.confidence() > MatchReason::ReleaseFuzzy.confidence());
        assert_eq!(MatchReason::ReleaseTargetCommit.confidence(), Confidence::Certain);
    }
}

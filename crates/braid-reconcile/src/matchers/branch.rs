use braid_core::CanonicalEvent;

use super::MatchReason;
use crate::config::ReconcileConfig;

/// Same lifecycle kind, same branch, close in time.
pub(super) fn matches(
    e1: &CanonicalEvent,
    e2: &CanonicalEvent,
    cfg: &ReconcileConfig,
) -> Option<MatchReason> {
    if e1.event_type != e2.event_type || !e1.event_type.is_branch_lifecycle() {
        return None;
    }
    let same_branch = matches!(
        (e1.branch_name(), e2.branch_name()),
        (Some(a), Some(b)) if a == b
    );
    let close = (e1.timestamp - e2.timestamp).abs() <= cfg.branch_window();
    (same_branch && close).then_some(MatchReason::BranchLifecycle)
}

use braid_core::CanonicalEvent;

use super::MatchReason;

fn shared_tag(e1: &CanonicalEvent, e2: &CanonicalEvent) -> bool {
    e1.tags.iter().any(|a| {
        !a.trim().is_empty() && e2.tags.iter().any(|b| a.trim().eq_ignore_ascii_case(b.trim()))
    })
}

fn same_title(e1: &CanonicalEvent, e2: &CanonicalEvent) -> bool {
    let a = e1.title.trim().to_lowercase();
    !a.is_empty() && a == e2.title.trim().to_lowercase()
}

pub(super) fn matches(e1: &CanonicalEvent, e2: &CanonicalEvent) -> Option<MatchReason> {
    (shared_tag(e1, e2) || same_title(e1, e2)).then_some(MatchReason::Tag)
}

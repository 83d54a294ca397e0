//! Partition a flat event list into equivalence groups.
//!
//! Groups hold indices into the input slice. Every index lands in exactly one
//! group, groups are ordered by their first member, and members keep input
//! order. No group ever contains two events from the same provider.

use braid_core::CanonicalEvent;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

use crate::config::{GroupingStrategy, ReconcileConfig};
use crate::matchers::{match_events, MatchReason};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    /// Input indices, ascending.
    pub members: Vec<usize>,
    /// One reason per join; empty for singletons.
    pub reasons: Vec<MatchReason>,
}

pub fn group_events(events: &[CanonicalEvent], cfg: &ReconcileConfig) -> Vec<Group> {
    match cfg.grouping {
        GroupingStrategy::Anchor => anchor_groups(events, cfg),
        GroupingStrategy::Transitive => transitive_groups(events, cfg),
    }
}

// ── Anchor ──

/// Each unassigned event anchors a group; later candidates are compared to
/// the anchor only. A chain A~B~C where A and C do not match directly can
/// leave C out of A's group.
fn anchor_groups(events: &[CanonicalEvent], cfg: &ReconcileConfig) -> Vec<Group> {
    let mut processed = vec![false; events.len()];
    let mut groups = Vec::new();

    for (i, anchor) in events.iter().enumerate() {
        if processed[i] {
            continue;
        }
        processed[i] = true;
        let mut members = vec![i];
        let mut reasons = Vec::new();
        let mut providers: BTreeSet<&str> = BTreeSet::from([anchor.provider_id.as_str()]);

        for (j, candidate) in events.iter().enumerate().skip(i + 1) {
            if processed[j] || providers.contains(candidate.provider_id.as_str()) {
                continue;
            }
            if let Some(reason) = match_events(anchor, candidate, cfg) {
                debug!(
                    anchor = %anchor.id,
                    candidate = %candidate.id,
                    reason = reason.as_str(),
                    "joined group"
                );
                processed[j] = true;
                members.push(j);
                reasons.push(reason);
                providers.insert(candidate.provider_id.as_str());
            }
        }
        groups.push(Group { members, reasons });
    }
    groups
}

// ── Transitive ──

/// Disjoint sets that also track which providers each set contains.
struct ProviderSets<'a> {
    parent: Vec<usize>,
    size: Vec<usize>,
    providers: Vec<BTreeSet<&'a str>>,
}

impl<'a> ProviderSets<'a> {
    fn new(events: &'a [CanonicalEvent]) -> Self {
        Self {
            parent: (0..events.len()).collect(),
            size: vec![1; events.len()],
            providers: events
                .iter()
                .map(|e| BTreeSet::from([e.provider_id.as_str()]))
                .collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        while self.parent[x] != root {
            let next = self.parent[x];
            self.parent[x] = root;
            x = next;
        }
        root
    }

    /// Sets that already share a provider must stay apart.
    fn can_union(&self, ra: usize, rb: usize) -> bool {
        self.providers[ra].is_disjoint(&self.providers[rb])
    }

    fn union(&mut self, ra: usize, rb: usize) {
        let (big, small) = if self.size[ra] >= self.size[rb] {
            (ra, rb)
        } else {
            (rb, ra)
        };
        self.parent[small] = big;
        self.size[big] += self.size[small];
        let moved = std::mem::take(&mut self.providers[small]);
        self.providers[big].extend(moved);
    }
}

/// Union every matching pair, visiting pairs in input order.
fn transitive_groups(events: &[CanonicalEvent], cfg: &ReconcileConfig) -> Vec<Group> {
    let mut sets = ProviderSets::new(events);
    let mut joins: Vec<(usize, MatchReason)> = Vec::new();

    for i in 0..events.len() {
        for j in (i + 1)..events.len() {
            let (ri, rj) = (sets.find(i), sets.find(j));
            if ri == rj || !sets.can_union(ri, rj) {
                continue;
            }
            if let Some(reason) = match_events(&events[i], &events[j], cfg) {
                debug!(
                    left = %events[i].id,
                    right = %events[j].id,
                    reason = reason.as_str(),
                    "union"
                );
                sets.union(ri, rj);
                joins.push((i, reason));
            }
        }
    }

    let mut slot_of_root: HashMap<usize, usize> = HashMap::new();
    let mut groups: Vec<Group> = Vec::new();
    for i in 0..events.len() {
        let root = sets.find(i);
        let slot = *slot_of_root.entry(root).or_insert_with(|| {
            groups.push(Group {
                members: Vec::new(),
                reasons: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].members.push(i);
    }
    for (i, reason) in joins {
        let slot = slot_of_root[&sets.find(i)];
        groups[slot].reasons.push(reason);
    }
    groups
}

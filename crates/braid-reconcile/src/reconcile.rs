use braid_core::{validate_event, CanonicalEvent};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::OffsetDateTime;
use tracing::info;

use crate::config::ReconcileConfig;
use crate::error::ReconcileError;
use crate::grouping::group_events;
use crate::matchers::{match_events, MatchReason};
use crate::merge::{merge_group, MergeContext};

/// Counts describing one reconciliation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileStats {
    pub total_input: usize,
    pub total_output: usize,
    /// Output events built from more than one raw event.
    pub merged_count: usize,
    /// Always `total_input - total_output`.
    pub duplicates_removed: usize,
    /// Joins per rule, keyed by [`MatchReason::as_str`].
    #[serde(default)]
    pub match_reasons: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileResult {
    pub events: Vec<CanonicalEvent>,
    pub stats: ReconcileStats,
}

/// Reconciles raw provider events under one fixed policy.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    config: ReconcileConfig,
}

impl Reconciler {
    pub fn new(config: ReconcileConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    /// Reconcile, stamping merged events with the current time.
    pub fn reconcile(&self, events: &[CanonicalEvent]) -> Result<ReconcileResult, ReconcileError> {
        self.reconcile_at(events, OffsetDateTime::now_utc())
    }

    /// Reconcile with a caller-chosen `mergedAt`. Same input and `at` give
    /// identical output.
    #[tracing::instrument(skip_all, fields(input = events.len()))]
    pub fn reconcile_at(
        &self,
        events: &[CanonicalEvent],
        at: OffsetDateTime,
    ) -> Result<ReconcileResult, ReconcileError> {
        for (index, event) in events.iter().enumerate() {
            validate_event(event)
                .map_err(|source| ReconcileError::MalformedEvent { index, source })?;
        }

        let groups = group_events(events, &self.config);
        let ctx = MergeContext {
            config: &self.config,
            merged_at: at,
        };

        let mut out = Vec::with_capacity(groups.len());
        let mut match_reasons: BTreeMap<String, usize> = BTreeMap::new();
        for group in &groups {
            let members: Vec<&CanonicalEvent> = group.members.iter().map(|&i| &events[i]).collect();
            out.push(merge_group(&members, &ctx)?);
            for reason in &group.reasons {
                *match_reasons.entry(reason.as_str().to_string()).or_default() += 1;
            }
        }

        let stats = ReconcileStats {
            total_input: events.len(),
            total_output: out.len(),
            merged_count: out.iter().filter(|e| e.source_count() > 1).count(),
            duplicates_removed: events.len() - out.len(),
            match_reasons,
        };
        info!(
            output = stats.total_output,
            merged = stats.merged_count,
            removed = stats.duplicates_removed,
            "reconciled"
        );
        Ok(ReconcileResult { events: out, stats })
    }

    /// Which rule, if any, judges `a` and `b` to be the same action.
    pub fn explain(&self, a: &CanonicalEvent, b: &CanonicalEvent) -> Option<MatchReason> {
        match_events(a, b, &self.config)
    }
}

/// Reconcile under the default policy.
pub fn reconcile(events: &[CanonicalEvent]) -> Result<ReconcileResult, ReconcileError> {
    Reconciler::default().reconcile(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matchers::test_support::{ev, t0};
    use braid_core::providers::{HOSTING_API, LOCAL_VCS};
    use braid_core::{meta_key, EventType, ValidationError};

    fn commit(id: &str, provider: &str, hash: &str) -> CanonicalEvent {
        let mut e = ev(id, provider, EventType::Commit);
        e.hash = Some(hash.to_string());
        e
    }

    #[test]
    fn empty_input() {
        let result = reconcile(&[]).unwrap();
        assert!(result.events.is_empty());
        assert_eq!(result.stats, ReconcileStats::default());
    }

    #[test]
    fn commit_seen_by_both_providers() {
        let events = vec![
            commit("local-1", LOCAL_VCS, "abc123d"),
            commit("gh-1", HOSTING_API, "abc123def456"),
            commit("local-2", LOCAL_VCS, "fff000a"),
        ];
        let result = Reconciler::default().reconcile_at(&events, t0()).unwrap();
        assert_eq!(result.events.len(), 2);
        assert_eq!(result.events[0].id, "local-1");
        assert_eq!(result.events[0].source_count(), 2);
        assert_eq!(result.events[1].id, "local-2");
        assert_eq!(result.events[1].source_count(), 1);

        let stats = &result.stats;
        assert_eq!(stats.total_input, 3);
        assert_eq!(stats.total_output, 2);
        assert_eq!(stats.merged_count, 1);
        assert_eq!(stats.duplicates_removed, 1);
        assert_eq!(stats.match_reasons["commit_hash"], 1);
    }

    #[test]
    fn merged_at_comes_from_caller() {
        let events = vec![
            commit("local-1", LOCAL_VCS, "abc123d"),
            commit("gh-1", HOSTING_API, "abc123d"),
        ];
        let result = Reconciler::default().reconcile_at(&events, t0()).unwrap();
        assert_eq!(
            result.events[0].metadata[meta_key::MERGED_AT],
            "2026-03-02T12:00:00Z"
        );
    }

    #[test]
    fn malformed_event_reports_index() {
        let mut bad = commit("gh-1", HOSTING_API, "abc123d");
        bad.provider_id.clear();
        let events = vec![commit("local-1", LOCAL_VCS, "abc123d"), bad];
        let err = reconcile(&events).unwrap_err();
        match err {
            ReconcileError::MalformedEvent { index, source } => {
                assert_eq!(index, 1);
                assert_eq!(
                    source,
                    ValidationError::MissingProvider {
                        id: "gh-1".to_string()
                    }
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn explain_names_the_rule() {
        let reconciler = Reconciler::default();
        let a = commit("local-1", LOCAL_VCS, "abc123d");
        let b = commit("gh-1", HOSTING_API, "abc123def");
        let c = commit("gh-2", HOSTING_API, "0000000");
        assert_eq!(reconciler.explain(&a, &b), Some(MatchReason::CommitHash));
        assert_eq!(reconciler.explain(&a, &c), None);
    }

    #[test]
    fn stats_serialize_camel_case() {
        let result = reconcile(&[commit("a", LOCAL_VCS, "abc123d")]).unwrap();
        let json = serde_json::to_value(&result.stats).unwrap();
        assert_eq!(json["totalInput"], 1);
        assert_eq!(json["duplicatesRemoved"], 0);
        assert!(json["matchReasons"].as_object().unwrap().is_empty());
    }

    #[test]
    fn reconciler_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Reconciler>();
    }
}

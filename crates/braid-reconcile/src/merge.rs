//! Collapse one equivalence group into a single canonical event.

use braid_core::{meta_key, CanonicalEvent, EventSource, Metadata};
use std::collections::{BTreeSet, HashSet};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::debug;

use crate::config::{MetadataPolicy, ReconcileConfig};
use crate::error::ReconcileError;

/// Inputs shared by every merge in one reconciliation run.
#[derive(Debug, Clone, Copy)]
pub struct MergeContext<'a> {
    pub config: &'a ReconcileConfig,
    /// Recorded under `mergedAt` on every merged event.
    pub merged_at: OffsetDateTime,
}

/// `merged:<sorted providers joined by '+'>:<first event id>`.
pub fn merged_canonical_id(providers: &[String], first_id: &str) -> String {
    format!("merged:{}:{}", providers.join("+"), first_id)
}

/// Merge a group given in input order.
///
/// A singleton comes back unchanged apart from a one-entry `sources` list.
pub fn merge_group(
    group: &[&CanonicalEvent],
    ctx: &MergeContext<'_>,
) -> Result<CanonicalEvent, ReconcileError> {
    let first = *group.first().ok_or(ReconcileError::EmptyGroup)?;
    if group.len() == 1 {
        let mut single = first.clone();
        single.sources = Some(vec![first.to_source()]);
        return Ok(single);
    }

    let cfg = ctx.config;
    let mut by_authority: Vec<&CanonicalEvent> = group.to_vec();
    by_authority.sort_by_key(|e| cfg.authority_rank(&e.provider_id));
    let base = by_authority[0];

    let providers: Vec<String> = group
        .iter()
        .map(|e| e.provider_id.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect();

    let mut merged = base.clone();
    merged.canonical_id = merged_canonical_id(&providers, &first.id);
    merged.sources = Some(group.iter().map(|e| e.to_source()).collect::<Vec<EventSource>>());

    merged.branches = union(group.iter().map(|e| &e.branches));
    merged.tags = union(group.iter().map(|e| &e.tags));
    merged.labels = union(group.iter().map(|e| &e.labels));

    merged.hash = base_or_first(base.hash.as_ref(), group.iter().map(|e| e.hash.as_ref()));
    merged.full_hash = base_or_first(
        base.full_hash.as_ref(),
        group.iter().map(|e| e.full_hash.as_ref()),
    );

    let metrics = cfg
        .metrics_provider
        .as_deref()
        .and_then(|p| group.iter().find(|e| e.provider_id == p));
    merged.impact = metrics
        .and_then(|e| e.impact)
        .or_else(|| group.iter().find_map(|e| e.impact));
    merged.url = metrics
        .and_then(|e| e.url.clone())
        .or_else(|| base.url.clone());

    let mut metadata = merge_metadata(group, cfg);
    metadata.insert(
        meta_key::MERGED_PROVIDERS.to_string(),
        serde_json::json!(providers),
    );
    metadata.insert(
        meta_key::MERGED_AT.to_string(),
        serde_json::Value::String(ctx.merged_at.format(&Rfc3339)?),
    );
    merged.metadata = metadata;

    debug!(
        canonical_id = %merged.canonical_id,
        base = %base.id,
        members = group.len(),
        "merged group"
    );
    Ok(merged)
}

/// Set union over lists, first-seen order.
fn union<'a>(lists: impl Iterator<Item = &'a Vec<String>>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for item in lists.flatten() {
        if seen.insert(item.as_str()) {
            out.push(item.clone());
        }
    }
    out
}

fn base_or_first<'a>(
    base: Option<&'a String>,
    all: impl Iterator<Item = Option<&'a String>>,
) -> Option<String> {
    let non_empty = |v: &&String| !v.trim().is_empty();
    base.filter(non_empty)
        .or_else(|| all.flatten().find(non_empty))
        .cloned()
}

/// Shallow merge in input order, honouring declared per-key policies.
fn merge_metadata(group: &[&CanonicalEvent], cfg: &ReconcileConfig) -> Metadata {
    let mut merged = Metadata::new();
    let mut pinned: HashSet<&str> = HashSet::new();

    for event in group {
        for (key, value) in &event.metadata {
            match cfg.metadata_policies.get(key) {
                Some(MetadataPolicy::First) => {
                    merged.entry(key.clone()).or_insert_with(|| value.clone());
                }
                Some(MetadataPolicy::Prefer(provider)) => {
                    if event.provider_id == *provider {
                        pinned.insert(key.as_str());
                        merged.insert(key.clone(), value.clone());
                    } else if !pinned.contains(key.as_str()) {
                        merged.insert(key.clone(), value.clone());
                    }
                }
                Some(MetadataPolicy::Last) | None => {
                    merged.insert(key.clone(), value.clone());
                }
            }
        }
    }
    merged
}

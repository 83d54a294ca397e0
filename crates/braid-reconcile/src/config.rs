//! Reconciliation policy: provider authority, conflict rules, match windows.

use braid_core::providers;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// How raw events are partitioned into equivalence groups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupingStrategy {
    /// Compare each candidate against the group's first member only.
    #[default]
    Anchor,
    /// Union every matching pair (transitive closure).
    Transitive,
}

impl FromStr for GroupingStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "anchor" => Ok(Self::Anchor),
            "transitive" => Ok(Self::Transitive),
            other => Err(format!("unknown grouping strategy: {other}")),
        }
    }
}

/// Conflict rule for one metadata key when merging a group.
///
/// Written as `last`, `first`, or `prefer:<provider-id>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MetadataPolicy {
    /// Later members (input order) overwrite earlier ones.
    Last,
    /// The first member that carries the key keeps it.
    First,
    /// The named provider's value wins; otherwise last-write-wins.
    Prefer(String),
}

impl fmt::Display for MetadataPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataPolicy::Last => f.write_str("last"),
            MetadataPolicy::First => f.write_str("first"),
            MetadataPolicy::Prefer(p) => write!(f, "prefer:{p}"),
        }
    }
}

impl FromStr for MetadataPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "last" => Ok(MetadataPolicy::Last),
            "first" => Ok(MetadataPolicy::First),
            other => match other.strip_prefix("prefer:").map(str::trim) {
                Some(p) if !p.is_empty() => Ok(MetadataPolicy::Prefer(p.to_string())),
                _ => Err(format!(
                    "invalid metadata policy {other:?} (expected last, first, or prefer:<provider>)"
                )),
            },
        }
    }
}

impl TryFrom<String> for MetadataPolicy {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<MetadataPolicy> for String {
    fn from(p: MetadataPolicy) -> Self {
        p.to_string()
    }
}

pub const DEFAULT_RELEASE_WINDOW_SECS: u64 = 7 * 24 * 60 * 60;
pub const DEFAULT_BRANCH_WINDOW_SECS: u64 = 5 * 60;
pub const DEFAULT_MIN_HASH_PREFIX: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReconcileConfig {
    /// Providers in descending authority. Unlisted providers rank last.
    pub provider_priority: Vec<String>,
    /// Provider whose impact stats and url are preferred on merge.
    pub metrics_provider: Option<String>,
    pub grouping: GroupingStrategy,
    /// Max distance between fuzzy-matched releases.
    pub release_window_secs: u64,
    /// Max distance between matched branch create/delete events.
    pub branch_window_secs: u64,
    /// Shortest abbreviated hash accepted as a commit reference.
    pub min_hash_prefix: usize,
    pub metadata_policies: BTreeMap<String, MetadataPolicy>,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            provider_priority: vec![
                providers::LOCAL_VCS.to_string(),
                providers::HOSTING_API.to_string(),
            ],
            metrics_provider: Some(providers::HOSTING_API.to_string()),
            grouping: GroupingStrategy::Anchor,
            release_window_secs: DEFAULT_RELEASE_WINDOW_SECS,
            branch_window_secs: DEFAULT_BRANCH_WINDOW_SECS,
            min_hash_prefix: DEFAULT_MIN_HASH_PREFIX,
            metadata_policies: BTreeMap::new(),
        }
    }
}

impl ReconcileConfig {
    /// Position in `provider_priority`; unlisted providers share the last rank.
    pub fn authority_rank(&self, provider_id: &str) -> usize {
        self.provider_priority
            .iter()
            .position(|p| p == provider_id)
            .unwrap_or(self.provider_priority.len())
    }

    pub fn release_window(&self) -> time::Duration {
        secs(self.release_window_secs)
    }

    pub fn branch_window(&self) -> time::Duration {
        secs(self.branch_window_secs)
    }
}

fn secs(n: u64) -> time::Duration {
    time::Duration::seconds(i64::try_from(n).unwrap_or(i64::MAX))
}

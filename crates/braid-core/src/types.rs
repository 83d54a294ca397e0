use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;

use crate::hints::ProviderHints;

/// Open key/value bag for provider-specific extras.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Provider ids for the feeds Braid ships with.
pub mod providers {
    /// History read from a local clone.
    pub const LOCAL_VCS: &str = "local-vcs";
    /// History read from the hosting service API.
    pub const HOSTING_API: &str = "hosting-api";
}

/// Well-known metadata keys.
pub mod meta_key {
    pub const SHA: &str = "sha";
    pub const HEAD_SHA: &str = "headSha";
    pub const BASE_SHA: &str = "baseSha";
    pub const TARGET_COMMITISH: &str = "target_commitish";
    pub const TARGET_COMMIT: &str = "targetCommit";
    pub const TAG_NAME: &str = "tagName";
    /// Added on merge: sorted list of contributing provider ids.
    pub const MERGED_PROVIDERS: &str = "mergedProviders";
    /// Added on merge: RFC 3339 time of the reconciliation run.
    pub const MERGED_AT: &str = "mergedAt";
}

// ── Event type ──

/// Kind of repository action an event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    Commit,
    Merge,
    BranchCreated,
    BranchDeleted,
    TagCreated,
    Release,
    PrOpened,
    PrMerged,
    PrClosed,
    PrReviewed,
    IssueOpened,
    IssueClosed,
    IssueCommented,
    Deployment,
}

impl EventType {
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::Commit => "COMMIT",
            EventType::Merge => "MERGE",
            EventType::BranchCreated => "BRANCH_CREATED",
            EventType::BranchDeleted => "BRANCH_DELETED",
            EventType::TagCreated => "TAG_CREATED",
            EventType::Release => "RELEASE",
            EventType::PrOpened => "PR_OPENED",
            EventType::PrMerged => "PR_MERGED",
            EventType::PrClosed => "PR_CLOSED",
            EventType::PrReviewed => "PR_REVIEWED",
            EventType::IssueOpened => "ISSUE_OPENED",
            EventType::IssueClosed => "ISSUE_CLOSED",
            EventType::IssueCommented => "ISSUE_COMMENTED",
            EventType::Deployment => "DEPLOYMENT",
        }
    }

    pub fn is_pull_request(self) -> bool {
        matches!(
            self,
            EventType::PrOpened | EventType::PrMerged | EventType::PrClosed | EventType::PrReviewed
        )
    }

    pub fn is_branch_lifecycle(self) -> bool {
        matches!(self, EventType::BranchCreated | EventType::BranchDeleted)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Records ──

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Size of the change an event introduced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Impact {
    pub files_changed: u64,
    pub lines_added: u64,
    pub lines_removed: u64,
}

/// Provenance: which raw event, from which provider, went into a canonical event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSource {
    pub provider_id: String,
    pub source_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    #[serde(default)]
    pub metadata: Metadata,
}

/// One observed (raw) or reconciled (merged) repository action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalEvent {
    pub id: String,
    #[serde(default)]
    pub canonical_id: String,
    #[serde(default)]
    pub provider_id: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub author: Author,
    #[serde(default)]
    pub branches: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request_number: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<Impact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub metadata: Metadata,
    /// Set only by reconciliation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<EventSource>>,
}

impl CanonicalEvent {
    /// Bare event with `canonical_id == id` and every optional field empty.
    pub fn new(
        id: &str,
        provider_id: &str,
        event_type: EventType,
        timestamp: OffsetDateTime,
        title: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            canonical_id: id.to_string(),
            provider_id: provider_id.to_string(),
            event_type,
            timestamp,
            title: title.to_string(),
            description: None,
            author: Author::default(),
            branches: Vec::new(),
            primary_branch: None,
            hash: None,
            full_hash: None,
            tags: Vec::new(),
            labels: Vec::new(),
            pull_request_number: None,
            impact: None,
            url: None,
            metadata: Metadata::new(),
            sources: None,
        }
    }

    /// `primary_branch`, falling back to the first listed branch.
    pub fn branch_name(&self) -> Option<&str> {
        self.primary_branch
            .as_deref()
            .or_else(|| self.branches.first().map(String::as_str))
            .filter(|b| !b.is_empty())
    }

    /// Typed view over the provider-specific metadata keys.
    pub fn hints(&self) -> ProviderHints {
        ProviderHints::from_metadata(&self.metadata)
    }

    /// Provenance entry describing this event as a contributor.
    pub fn to_source(&self) -> EventSource {
        EventSource {
            provider_id: self.provider_id.clone(),
            source_id: self.id.clone(),
            timestamp: self.timestamp,
            metadata: self.metadata.clone(),
        }
    }

    /// Number of raw events folded into this one (1 before reconciliation).
    pub fn source_count(&self) -> usize {
        self.sources.as_ref().map_or(1, Vec::len)
    }
}

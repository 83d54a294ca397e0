//! Typed view over provider-specific metadata.
//!
//! Providers stash identifying extras (`sha`, `target_commitish`, `tagName`, ...)
//! in the open metadata bag. Matchers read them through [`ProviderHints`] so the
//! key names live in one place.

use crate::types::{meta_key, Metadata};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderHints {
    pub sha: Option<String>,
    pub head_sha: Option<String>,
    pub base_sha: Option<String>,
    pub target_commitish: Option<String>,
    pub target_commit: Option<String>,
    pub tag_name: Option<String>,
}

impl ProviderHints {
    /// Extract known keys. Missing, blank, or non-string values become `None`.
    pub fn from_metadata(metadata: &Metadata) -> Self {
        let text = |key: &str| -> Option<String> {
            metadata
                .get(key)
                .and_then(|v| v.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        Self {
            sha: text(meta_key::SHA),
            head_sha: text(meta_key::HEAD_SHA),
            base_sha: text(meta_key::BASE_SHA),
            target_commitish: text(meta_key::TARGET_COMMITISH),
            target_commit: text(meta_key::TARGET_COMMIT),
            tag_name: text(meta_key::TAG_NAME),
        }
    }

    /// First commit-bearing key, in `sha`, `headSha`, `baseSha` order.
    pub fn commit_ref(&self) -> Option<&str> {
        self.sha
            .as_deref()
            .or(self.head_sha.as_deref())
            .or(self.base_sha.as_deref())
    }

    /// Commit a release points at, in `target_commitish`, `targetCommit` order.
    pub fn release_target(&self) -> Option<&str> {
        self.target_commitish
            .as_deref()
            .or(self.target_commit.as_deref())
    }
}

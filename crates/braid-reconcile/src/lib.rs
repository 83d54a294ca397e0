pub mod config;
pub mod error;
pub mod grouping;
pub mod matchers;
pub mod merge;
pub mod reconcile;
pub mod version;

pub use config::{GroupingStrategy, MetadataPolicy, ReconcileConfig};
pub use error::ReconcileError;
pub use grouping::{group_events, Group};
pub use matchers::{match_events, Confidence, MatchReason};
pub use merge::{merge_group, MergeContext};
pub use reconcile::{reconcile, ReconcileResult, ReconcileStats, Reconciler};

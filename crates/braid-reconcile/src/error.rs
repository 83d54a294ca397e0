use braid_core::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// Grouping never yields an empty group; reaching this is a caller bug.
    #[error("cannot merge an empty event group")]
    EmptyGroup,

    #[error("event #{index} is malformed: {source}")]
    MalformedEvent {
        index: usize,
        #[source]
        source: ValidationError,
    },

    #[error("merge timestamp is not representable as RFC 3339: {0}")]
    Timestamp(#[from] time::error::Format),
}

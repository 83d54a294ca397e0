use crate::types::CanonicalEvent;

/// Shape problems that make an event unusable for reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("event has an empty id")]
    MissingId,
    #[error("event {id} has an empty providerId")]
    MissingProvider { id: String },
    #[error("event {id} lists an empty branch name")]
    EmptyBranch { id: String },
}

/// Check the fields reconciliation relies on.
pub fn validate_event(event: &CanonicalEvent) -> Result<(), ValidationError> {
    if event.id.trim().is_empty() {
        return Err(ValidationError::MissingId);
    }
    if event.provider_id.trim().is_empty() {
        return Err(ValidationError::MissingProvider {
            id: event.id.clone(),
        });
    }
    if event.branches.iter().any(|b| b.trim().is_empty()) {
        return Err(ValidationError::EmptyBranch {
            id: event.id.clone(),
        });
    }
    Ok(())
}

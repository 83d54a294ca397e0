pub mod hints;
pub mod provider;
pub mod types;
pub mod validate;

pub use hints::ProviderHints;
pub use provider::{collect_events, EventProvider, ProviderContext};
pub use types::*;
pub use validate::{validate_event, ValidationError};

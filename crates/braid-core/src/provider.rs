use anyhow::Context;
use std::path::PathBuf;

use crate::types::CanonicalEvent;

/// What a provider needs to know about the repository it observes.
#[derive(Debug, Clone)]
pub struct ProviderContext {
    pub repo_root: PathBuf,
}

/// An independent source of raw events.
///
/// Fetch mechanics (auth, pagination, caching) are the provider's business.
/// The only contract is a flat list tagged with the provider's own id.
pub trait EventProvider {
    fn provider_id(&self) -> &str;

    fn fetch(&self, ctx: &ProviderContext) -> anyhow::Result<Vec<CanonicalEvent>>;
}

/// Fetch from every provider and concatenate, preserving provider order.
pub fn collect_events(
    providers: &[Box<dyn EventProvider>],
    ctx: &ProviderContext,
) -> anyhow::Result<Vec<CanonicalEvent>> {
    let mut all = Vec::new();
    for p in providers {
        let events = p
            .fetch(ctx)
            .with_context(|| format!("fetch events from provider {}", p.provider_id()))?;
        all.extend(events);
    }
    Ok(all)
}

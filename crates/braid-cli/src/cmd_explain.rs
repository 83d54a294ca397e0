use braid_core::CanonicalEvent;
use braid_reconcile::Reconciler;
use std::path::{Path, PathBuf};

use crate::{config, feed};

fn find<'a>(events: &'a [CanonicalEvent], id: &str) -> anyhow::Result<&'a CanonicalEvent> {
    events
        .iter()
        .find(|e| e.id == id)
        .ok_or_else(|| anyhow::anyhow!("no event with id {id:?} in the given feeds"))
}

/// Human-readable verdict for one pair of raw events.
pub fn verdict(reconciler: &Reconciler, a: &CanonicalEvent, b: &CanonicalEvent) -> String {
    match reconciler.explain(a, b) {
        Some(reason) => format!(
            "{} and {} match: {} ({:?} confidence)",
            a.id,
            b.id,
            reason.as_str(),
            reason.confidence()
        ),
        None if a.provider_id == b.provider_id => format!(
            "{} and {} do not match: both come from provider {}",
            a.id, b.id, a.provider_id
        ),
        None => format!("{} and {} do not match", a.id, b.id),
    }
}

pub fn execute(
    repo_root: &Path,
    feeds: &[PathBuf],
    a: &str,
    b: &str,
    config_path: Option<&Path>,
) -> anyhow::Result<()> {
    let (cfg, _) = config::load(config_path)?;
    let events = feed::load_feeds(repo_root, feeds)?;
    let (ea, eb) = (find(&events, a)?, find(&events, b)?);
    println!("{}", verdict(&Reconciler::new(cfg), ea, eb));
    Ok(())
}

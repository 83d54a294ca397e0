//! Event feeds read from files on disk.

use anyhow::Context;
use braid_core::{collect_events, CanonicalEvent, EventProvider, ProviderContext};
use std::path::{Path, PathBuf};

/// One feed file. `.json` holds an array, anything else is JSON Lines.
pub struct FileProvider {
    path: PathBuf,
    label: String,
}

impl FileProvider {
    pub fn new(path: &Path) -> Self {
        let label = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "feed".to_string());
        Self {
            path: path.to_path_buf(),
            label,
        }
    }

    fn parse(&self, content: &str) -> anyhow::Result<Vec<CanonicalEvent>> {
        let is_array = self.path.extension().is_some_and(|ext| ext == "json");
        if is_array {
            return serde_json::from_str(content)
                .with_context(|| format!("parse {}", self.path.display()));
        }
        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(n, line)| {
                serde_json::from_str::<CanonicalEvent>(line)
                    .with_context(|| format!("parse {} line {}", self.path.display(), n + 1))
            })
            .collect()
    }
}

impl EventProvider for FileProvider {
    fn provider_id(&self) -> &str {
        &self.label
    }

    fn fetch(&self, ctx: &ProviderContext) -> anyhow::Result<Vec<CanonicalEvent>> {
        let path = if self.path.is_absolute() {
            self.path.clone()
        } else {
            ctx.repo_root.join(&self.path)
        };
        let content =
            std::fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
        let mut events = self.parse(&content)?;
        for event in &mut events {
            if event.provider_id.trim().is_empty() {
                event.provider_id = self.label.clone();
            }
            if event.canonical_id.is_empty() {
                event.canonical_id = event.id.clone();
            }
        }
        tracing::debug!(feed = %self.label, events = events.len(), "loaded feed");
        Ok(events)
    }
}

/// Load every feed in argument order and concatenate the events.
pub fn load_feeds(repo_root: &Path, feeds: &[PathBuf]) -> anyhow::Result<Vec<CanonicalEvent>> {
    let providers: Vec<Box<dyn EventProvider>> = feeds
        .iter()
        .map(|p| Box::new(FileProvider::new(p)) as Box<dyn EventProvider>)
        .collect();
    let ctx = ProviderContext {
        repo_root: repo_root.to_path_buf(),
    };
    collect_events(&providers, &ctx)
}

use anyhow::Context;
use braid_reconcile::{GroupingStrategy, ReconcileResult, Reconciler};
use clap::ValueEnum;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::{config, feed};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Counts and one line per output event
    Summary,
    /// `{ events, stats }` as one JSON document
    Json,
    /// One canonical event per line
    Jsonl,
}

pub struct ReconcileParams<'a> {
    pub repo_root: &'a Path,
    pub feeds: &'a [PathBuf],
    pub config: Option<&'a Path>,
    pub strategy: Option<GroupingStrategy>,
    pub format: OutputFormat,
    pub out: Option<&'a Path>,
}

pub fn execute(p: ReconcileParams<'_>) -> anyhow::Result<()> {
    let (mut cfg, _) = config::load(p.config)?;
    if let Some(strategy) = p.strategy {
        cfg.grouping = strategy;
    }
    let events = feed::load_feeds(p.repo_root, p.feeds)?;
    let result = Reconciler::new(cfg).reconcile(&events)?;
    let rendered = render(&result, p.format)?;

    match p.out {
        Some(path) => {
            write_atomic(path, rendered.as_bytes())?;
            eprintln!(
                "Wrote {} events ({} merged) to {}",
                result.stats.total_output,
                result.stats.merged_count,
                path.display()
            );
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

fn render(result: &ReconcileResult, format: OutputFormat) -> anyhow::Result<String> {
    let out = match format {
        OutputFormat::Summary => summary(result),
        OutputFormat::Json => {
            let mut s = serde_json::to_string_pretty(result)?;
            s.push('\n');
            s
        }
        OutputFormat::Jsonl => {
            let mut s = String::new();
            for event in &result.events {
                s.push_str(&serde_json::to_string(event)?);
                s.push('\n');
            }
            s
        }
    };
    Ok(out)
}

fn summary(result: &ReconcileResult) -> String {
    let stats = &result.stats;
    let mut s = format!(
        "Input: {}  Output: {}  Merged: {}  Duplicates removed: {}\n",
        stats.total_input, stats.total_output, stats.merged_count, stats.duplicates_removed
    );
    for (reason, count) in &stats.match_reasons {
        s.push_str(&format!("  {reason}: {count}\n"));
    }
    for event in &result.events {
        let providers: Vec<&str> = event
            .sources
            .iter()
            .flatten()
            .map(|src| src.provider_id.as_str())
            .collect();
        s.push_str(&format!(
            "{} {:<14} {} [{}]\n",
            event.timestamp.date(),
            event.event_type.as_str(),
            event.title,
            providers.join(",")
        ));
    }
    s
}

/// Replace `path` in one step: write a sibling temp file, then rename.
fn write_atomic(path: &Path, data: &[u8]) -> anyhow::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;
    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(data)?;
    tmp.flush()?;
    tmp.persist(path)
        .with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED_A: &str = r#"{"id":"c1","providerId":"local-vcs","type":"COMMIT","timestamp":"2026-03-02T12:00:00Z","title":"Fix","hash":"abc123d"}"#;
    const FEED_B: &str = r#"{"id":"g1","providerId":"hosting-api","type":"COMMIT","timestamp":"2026-03-02T12:01:00Z","title":"Fix (#3)","fullHash":"abc123def456"}"#;

    fn params<'a>(
        root: &'a Path,
        feeds: &'a [PathBuf],
        cfg: &'a Path,
        format: OutputFormat,
        out: &'a Path,
    ) -> ReconcileParams<'a> {
        ReconcileParams {
            repo_root: root,
            feeds,
            config: Some(cfg),
            strategy: None,
            format,
            out: Some(out),
        }
    }

    fn setup() -> (tempfile::TempDir, Vec<PathBuf>, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.jsonl"), FEED_A).unwrap();
        std::fs::write(dir.path().join("b.jsonl"), FEED_B).unwrap();
        let cfg = dir.path().join("policy.yaml");
        std::fs::write(&cfg, "min_hash_prefix: 4\n").unwrap();
        (
            dir,
            vec![PathBuf::from("a.jsonl"), PathBuf::from("b.jsonl")],
            cfg,
        )
    }

    #[test]
    fn writes_jsonl_output() {
        let (dir, feeds, cfg) = setup();
        let out = dir.path().join("out/timeline.jsonl");
        execute(params(dir.path(), &feeds, &cfg, OutputFormat::Jsonl, &out)).unwrap();
        let content = std::fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 1);
        let event: braid_core::CanonicalEvent = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(event.id, "c1");
        assert_eq!(event.source_count(), 2);
    }

    #[test]
    fn json_output_carries_stats() {
        let (dir, feeds, cfg) = setup();
        let out = dir.path().join("timeline.json");
        execute(params(dir.path(), &feeds, &cfg, OutputFormat::Json, &out)).unwrap();
        let doc: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(doc["stats"]["totalInput"], 2);
        assert_eq!(doc["stats"]["duplicatesRemoved"], 1);
        assert_eq!(doc["events"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn summary_lists_providers() {
        let (dir, feeds, cfg) = setup();
        let out = dir.path().join("summary.txt");
        execute(params(dir.path(), &feeds, &cfg, OutputFormat::Summary, &out)).unwrap();
        let text = std::fs::read_to_string(&out).unwrap();
        assert!(text.starts_with("Input: 2  Output: 1  Merged: 1"), "{text}");
        assert!(text.contains("commit_hash: 1"), "{text}");
        assert!(text.contains("[local-vcs,hosting-api]"), "{text}");
    }
}

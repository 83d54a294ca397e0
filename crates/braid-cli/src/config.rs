use anyhow::Context;
use braid_reconcile::ReconcileConfig;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "BRAID_CONFIG";

/// Where the effective policy comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults,
}

/// `--config`, then `$BRAID_CONFIG`, then `<config dir>/braid/config.yaml` if it exists.
pub fn resolve(explicit: Option<&Path>) -> ConfigSource {
    if let Some(path) = explicit {
        return ConfigSource::File(path.to_path_buf());
    }
    if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
        return ConfigSource::File(PathBuf::from(path));
    }
    match dirs::config_dir().map(|d| d.join("braid").join("config.yaml")) {
        Some(path) if path.exists() => ConfigSource::File(path),
        _ => ConfigSource::Defaults,
    }
}

/// Parse a policy file; `.json` is read as JSON, anything else as YAML.
pub fn read_config(path: &Path) -> anyhow::Result<ReconcileConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    let is_json = path.extension().is_some_and(|ext| ext == "json");
    let config = if is_json {
        serde_json::from_str(&content)
            .with_context(|| format!("parse config {}", path.display()))?
    } else {
        serde_yaml::from_str(&content)
            .with_context(|| format!("parse config {}", path.display()))?
    };
    Ok(config)
}

pub fn load(explicit: Option<&Path>) -> anyhow::Result<(ReconcileConfig, ConfigSource)> {
    let source = resolve(explicit);
    let config = match &source {
        ConfigSource::File(path) => read_config(path)?,
        ConfigSource::Defaults => ReconcileConfig::default(),
    };
    tracing::debug!(?source, "loaded reconcile policy");
    Ok((config, source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use braid_reconcile::{GroupingStrategy, MetadataPolicy};

    #[test]
    fn explicit_path_wins() {
        let path = Path::new("/tmp/policy.yaml");
        assert_eq!(resolve(Some(path)), ConfigSource::File(path.to_path_buf()));
    }

    #[test]
    fn reads_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.yaml");
        std::fs::write(
            &path,
            "grouping: transitive\nmetadata_policies:\n  state: prefer:hosting-api\n",
        )
        .unwrap();
        let cfg = read_config(&path).unwrap();
        assert_eq!(cfg.grouping, GroupingStrategy::Transitive);
        assert_eq!(
            cfg.metadata_policies["state"],
            MetadataPolicy::Prefer("hosting-api".to_string())
        );
    }

    #[test]
    fn reads_json_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.json");
        std::fs::write(&path, r#"{"min_hash_prefix": 7}"#).unwrap();
        assert_eq!(read_config(&path).unwrap().min_hash_prefix, 7);
    }

    #[test]
    fn parse_error_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "grouping: sideways\n").unwrap();
        let err = format!("{:#}", read_config(&path).unwrap_err());
        assert!(err.contains("bad.yaml"), "{err}");
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(Some(&dir.path().join("nope.yaml"))).is_err());
    }
}

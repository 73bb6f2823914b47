use crate::error::{CredenceError, Result};
use crate::scan::patterns::PatternSet;
use crate::types::config::ScoringConfig;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use toml::map::Map;
use toml::Value;
use tracing::{debug, info};

pub const DEFAULT_CONFIG_FILE: &str = "credence.toml";

/// A validated configuration together with the files it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: ScoringConfig,
    /// Hex SHA-256 over the bytes of every loaded file, in load order.
    pub content_hash: String,
    pub files: Vec<PathBuf>,
}

/// `<stem>.local.toml` next to the base file.
pub fn overlay_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("credence");
    path.with_file_name(format!("{stem}.local.toml"))
}

pub fn load_config(path: &Path) -> Result<LoadedConfig> {
    if !path.is_file() {
        return Err(CredenceError::ConfigNotFound(path.display().to_string()));
    }

    let mut merged = Value::Table(Map::new());
    let mut hasher = Sha256::new();
    let mut files = Vec::new();
    let mut sources = vec![path.to_path_buf()];
    let overlay = overlay_path(path);
    if overlay.is_file() {
        sources.push(overlay);
    }
    for candidate in sources {
        let bytes = std::fs::read(&candidate)?;
        hasher.update(&bytes);
        merge_toml(&mut merged, parse_toml(&candidate, &bytes)?);
        files.push(candidate);
    }

    let config: ScoringConfig = merged
        .try_into()
        .map_err(|e: toml::de::Error| CredenceError::ConfigParse(e.to_string()))?;
    config.validate()?;

    let content_hash = format!("{:x}", hasher.finalize());
    debug!(files = files.len(), hash = %content_hash, "configuration loaded");
    Ok(LoadedConfig {
        config,
        content_hash,
        files,
    })
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    format!("{digest:x}")
}

fn parse_toml(path: &Path, bytes: &[u8]) -> Result<Value> {
    let content = std::str::from_utf8(bytes)
        .map_err(|e| CredenceError::ConfigParse(format!("{}: {}", path.display(), e)))?;
    toml::from_str(content)
        .map_err(|e| CredenceError::ConfigParse(format!("{}: {}", path.display(), e)))
}

fn merge_toml(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Table(base_table), Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => {
            *slot = value;
        }
    }
}

/// Immutable view of one configuration, shared by every component of a run.
#[derive(Debug)]
pub struct ConfigSnapshot {
    pub config: ScoringConfig,
    pub patterns: Arc<PatternSet>,
    pub content_hash: String,
}

impl ConfigSnapshot {
    pub fn new(config: ScoringConfig, content_hash: String) -> Result<Self> {
        config.validate()?;
        let patterns = Arc::new(PatternSet::compile(&config.patterns)?);
        Ok(Self {
            config,
            patterns,
            content_hash,
        })
    }

    /// Snapshot for an in-memory configuration; hashed over its TOML rendering.
    pub fn from_config(config: ScoringConfig) -> Result<Self> {
        let rendered =
            toml::to_string(&config).map_err(|e| CredenceError::ConfigParse(e.to_string()))?;
        let hash = sha256_hex(rendered.as_bytes());
        Self::new(config, hash)
    }

    pub fn defaults() -> Result<Self> {
        Self::from_config(ScoringConfig::default())
    }
}

/// Holds the current snapshot and swaps it when the backing files change.
#[derive(Debug)]
pub struct ConfigStore {
    path: Option<PathBuf>,
    current: RwLock<Arc<ConfigSnapshot>>,
}

impl ConfigStore {
    pub fn open(path: &Path) -> Result<Self> {
        let loaded = load_config(path)?;
        let snapshot = ConfigSnapshot::new(loaded.config, loaded.content_hash)?;
        Ok(Self {
            path: Some(path.to_path_buf()),
            current: RwLock::new(Arc::new(snapshot)),
        })
    }

    /// Store without a backing file; `reload_if_changed` is a no-op.
    pub fn fixed(snapshot: ConfigSnapshot) -> Self {
        Self {
            path: None,
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    pub fn snapshot(&self) -> Arc<ConfigSnapshot> {
        let guard = self
            .current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&guard)
    }

    /// Returns `Ok(true)` when a new snapshot was installed. On error the
    /// previous snapshot stays current.
    pub fn reload_if_changed(&self) -> Result<bool> {
        let Some(path) = &self.path else {
            return Ok(false);
        };
        let loaded = load_config(path)?;
        if loaded.content_hash == self.snapshot().content_hash {
            return Ok(false);
        }

        let snapshot = Arc::new(ConfigSnapshot::new(loaded.config, loaded.content_hash)?);
        info!(hash = %snapshot.content_hash, "configuration reloaded");
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = snapshot;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_a_hard_error() {
        let dir = TempDir::new().expect("temp dir should be created");
        let err = load_config(&dir.path().join(DEFAULT_CONFIG_FILE))
            .expect_err("missing config should fail");
        assert!(matches!(err, CredenceError::ConfigNotFound(_)));
    }

    #[test]
    fn partial_file_keeps_defaults_and_overlay_wins() {
        let dir = TempDir::new().expect("temp dir should be created");
        let base = dir.path().join(DEFAULT_CONFIG_FILE);
        fs::write(
            &base,
            r#"
[consilience]
floor = 50.0

[gate]
min_commits = 20
"#,
        )
        .expect("base config should write");
        fs::write(
            overlay_path(&base),
            r#"
[gate]
min_commits = 5
"#,
        )
        .expect("overlay should write");

        let loaded = load_config(&base).expect("config should load");
        assert_eq!(loaded.config.consilience.floor, 50.0);
        assert_eq!(loaded.config.consilience.weight_tech, 0.4);
        assert_eq!(loaded.config.gate.min_commits, 5);
        assert_eq!(loaded.config.gate.stale_days, 365);
        assert_eq!(loaded.files.len(), 2);
        assert_eq!(loaded.content_hash.len(), 64);
    }

    #[test]
    fn invalid_weights_are_rejected() {
        let dir = TempDir::new().expect("temp dir should be created");
        let base = dir.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&base, "[consilience]\nweight_raw = 0.9\n").expect("config should write");
        let err = load_config(&base).expect_err("weights over 1.0 should fail");
        assert!(matches!(err, CredenceError::ConfigParse(_)));
    }

    #[test]
    fn hash_tracks_file_content() {
        let dir = TempDir::new().expect("temp dir should be created");
        let base = dir.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&base, "[links]\nmax_checks = 10\n").expect("config should write");
        let first = load_config(&base).expect("config should load").content_hash;
        let again = load_config(&base).expect("config should load").content_hash;
        fs::write(&base, "[links]\nmax_checks = 11\n").expect("config should rewrite");
        let changed = load_config(&base).expect("config should load").content_hash;
        assert_eq!(first, again);
        assert_ne!(first, changed);
    }

    #[test]
    fn store_reloads_only_on_change_and_keeps_old_snapshot_on_error() {
        let dir = TempDir::new().expect("temp dir should be created");
        let base = dir.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&base, "[gate]\nmin_commits = 10\n").expect("config should write");
        let store = ConfigStore::open(&base).expect("store should open");
        let original = store.snapshot();

        assert!(!store.reload_if_changed().expect("unchanged reload should succeed"));

        fs::write(&base, "[gate]\nmin_commits = 3\n").expect("config should rewrite");
        assert!(store.reload_if_changed().expect("changed reload should succeed"));
        assert_eq!(store.snapshot().config.gate.min_commits, 3);
        assert_eq!(original.config.gate.min_commits, 10);

        fs::write(&base, "[patterns.command_patterns]\nbad = \"(unclosed\"\n")
            .expect("config should rewrite");
        assert!(store.reload_if_changed().is_err());
        assert_eq!(store.snapshot().config.gate.min_commits, 3);
    }

    #[test]
    fn default_snapshot_compiles_patterns() {
        let snapshot = ConfigSnapshot::defaults().expect("defaults should be valid");
        assert!(!snapshot.patterns.command_patterns.is_empty());
        assert_eq!(snapshot.content_hash.len(), 64);
    }
}

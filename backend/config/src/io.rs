//! Config and session file read/write with atomic replacement.

use crate::schema::ShowroomConfig;
use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

/// Default config file name within the config directory.
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Signed-in session, kept next to the config.
const SESSION_FILE_NAME: &str = "session.json";

/// Number of rolling config backups to keep.
const MAX_BACKUPS: usize = 3;

/// Resolve the console's config directory.
/// Priority: `SHOWROOM_CONFIG_DIR` env > `~/.showroom/`
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("SHOWROOM_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    match dirs::home_dir() {
        Some(home) => home.join(".showroom"),
        None => PathBuf::from(".showroom"),
    }
}

pub fn config_file_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE_NAME)
}

pub fn session_file_path(config_dir: &Path) -> PathBuf {
    config_dir.join(SESSION_FILE_NAME)
}

/// Load and parse the config from disk.
///
/// A missing file is not an error: the defaults plus env overrides may be
/// enough to reach the backend.
pub async fn load_config(path: &Path) -> Result<ShowroomConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(ShowroomConfig::default());
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: ShowroomConfig = serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    info!(path = %path.display(), "Loaded config");
    Ok(config)
}

/// Write config as YAML, keeping rolling backups of the previous file.
pub async fn write_config(config: &ShowroomConfig, path: &Path) -> Result<()> {
    if path.exists() {
        rotate_backups(path).await?;
    }
    let yaml = serde_yaml::to_string(config).context("Failed to serialize config to YAML")?;
    write_atomic(path, yaml.as_bytes()).await?;
    info!(path = %path.display(), "Wrote config");
    Ok(())
}

/// Persist a JSON document (the signed-in session) atomically.
pub async fn save_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let json = serde_json::to_vec_pretty(value).context("Failed to serialize JSON")?;
    write_atomic(path, &json).await
}

/// Read a JSON document written by [`save_json`]. `None` when absent.
pub async fn load_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value = serde_json::from_slice(&raw)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(Some(value))
}

/// Remove a file if it exists.
pub async fn remove_file(path: &Path) -> Result<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
    }
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    fs::write(&tmp_path, bytes)
        .await
        .with_context(|| format!("Failed to write temp file: {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path)
        .await
        .with_context(|| format!("Failed to rename temp file to: {}", path.display()))?;
    Ok(())
}

/// config.yaml.bak.1 → .bak.2 → ... → .bak.N
async fn rotate_backups(path: &Path) -> Result<()> {
    for i in (1..MAX_BACKUPS).rev() {
        let old = path.with_extension(format!("yaml.bak.{i}"));
        let new = path.with_extension(format!("yaml.bak.{}", i + 1));
        if old.exists() {
            if let Err(e) = fs::rename(&old, &new).await {
                warn!("Failed to rotate backup {}: {}", old.display(), e);
            }
        }
    }

    let bak = path.with_extension("yaml.bak.1");
    if let Err(e) = fs::copy(path, &bak).await {
        warn!("Failed to create backup {}: {}", bak.display(), e);
    }
    Ok(())
}

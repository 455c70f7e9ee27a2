use super::model::{Settings, SettingsPatch};
use crate::error::{Error, Result};
use anyhow::Context;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// Process-wide settings guarded by a single lock
///
/// The lock is held across merge and persist so concurrent updates are
/// applied one after another and the file always matches the last
/// published value.
pub struct SettingsStore {
    path: PathBuf,
    current: Mutex<Settings>,
}

impl SettingsStore {
    /// Load settings from `path`, falling back to defaults when the file is absent
    pub fn load(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();

        let settings = if path.exists() {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings file {:?}", path))?;
            let settings: Settings = serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse settings file {:?}", path))?;
            info!("Loaded settings from {}", path.display());
            settings
        } else {
            warn!(
                "Settings file {} not found, using defaults",
                path.display()
            );
            Settings::default()
        };

        Ok(Self::new(path, settings))
    }

    pub fn new(path: impl Into<PathBuf>, settings: Settings) -> Self {
        Self {
            path: path.into(),
            current: Mutex::new(settings),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshot of the current settings
    pub async fn get(&self) -> Settings {
        self.current.lock().await.clone()
    }

    /// Merge `patch`, persist the result, then publish it
    ///
    /// Nothing changes in memory if validation or the write fails.
    pub async fn update(&self, patch: SettingsPatch) -> Result<Settings> {
        let mut current = self.current.lock().await;

        let merged = current.merged(&patch);
        merged.validate()?;

        if let Err(e) = persist(&self.path, &merged).await {
            error!("Failed to persist settings to {}: {:#}", self.path.display(), e);
            return Err(Error::ConfigPersistFailure(format!("{:#}", e)));
        }

        *current = merged.clone();
        info!("Settings updated and saved to {}", self.path.display());

        Ok(merged)
    }
}

/// Write-to-temp-then-rename so readers never observe a truncated file
async fn persist(path: &Path, settings: &Settings) -> anyhow::Result<()> {
    let json = serde_json::to_vec_pretty(settings).context("Failed to serialize settings")?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {:?}", parent))?;
    }

    let temp_path = path.with_extension("tmp");
    tokio::fs::write(&temp_path, json)
        .await
        .with_context(|| format!("Failed to write {:?}", temp_path))?;
    tokio::fs::rename(&temp_path, path)
        .await
        .with_context(|| format!("Failed to replace {:?}", path))?;

    Ok(())
}

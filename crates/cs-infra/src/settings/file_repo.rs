use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info};

use cs_core::ports::SettingsPort;
use cs_core::settings::model::{Settings, CURRENT_SCHEMA_VERSION};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings file {path} is not valid JSON: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("settings schema version {found} is newer than supported version {supported}")]
    UnsupportedSchema { found: u32, supported: u32 },
}

/// JSON-backed settings store.
///
/// A missing file reads as defaults. Writes go to a sibling temp file that is
/// renamed over the target, so readers never see a partial file.
pub struct FileSettingsRepository {
    path: PathBuf,
}

impl FileSettingsRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("create settings dir failed: {}", dir.display()))?;
        }
        Ok(())
    }

    async fn atomic_write(&self, content: &str) -> Result<()> {
        self.ensure_parent_dir().await?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, content)
            .await
            .with_context(|| format!("write temp settings failed: {}", tmp_path.display()))?;

        fs::rename(&tmp_path, &self.path).await.with_context(|| {
            format!(
                "rename temp settings to target failed: {} -> {}",
                tmp_path.display(),
                self.path.display()
            )
        })?;

        Ok(())
    }
}

#[async_trait]
impl SettingsPort for FileSettingsRepository {
    async fn load(&self) -> Result<Settings> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "settings file missing, using defaults");
                return Ok(Settings::default());
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("read settings failed: {}", self.path.display()))
            }
        };

        let mut settings: Settings =
            serde_json::from_str(&content).map_err(|source| SettingsError::Malformed {
                path: self.path.clone(),
                source,
            })?;

        if settings.schema_version > CURRENT_SCHEMA_VERSION {
            return Err(SettingsError::UnsupportedSchema {
                found: settings.schema_version,
                supported: CURRENT_SCHEMA_VERSION,
            }
            .into());
        }

        if settings.schema_version < CURRENT_SCHEMA_VERSION {
            info!(
                from = settings.schema_version,
                to = CURRENT_SCHEMA_VERSION,
                "upgrading settings schema"
            );
            settings.schema_version = CURRENT_SCHEMA_VERSION;
            self.save(&settings).await?;
        }

        Ok(settings)
    }

    async fn save(&self, settings: &Settings) -> Result<()> {
        let content =
            serde_json::to_string_pretty(settings).context("serialize settings failed")?;

        self.atomic_write(&content).await
    }
}

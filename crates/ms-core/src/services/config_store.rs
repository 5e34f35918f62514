use std::path::{Path, PathBuf};

use crate::error::{ManuscriptError, Result};
use crate::models::{Manuscript, ManuscriptConfig};

/// Directory under the base dir holding one sub-directory per job.
pub const MANUSCRIPT_BASE_NAME: &str = "manuscript";

/// Default location of the store: `~/.manuscript/config.yaml`.
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".manuscript")
        .join("config.yaml")
}

/// Persisted list of deployed manuscripts plus the base directory setting.
pub struct ConfigStore {
    config_path: PathBuf,
}

impl ConfigStore {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Load the store; a missing file is an empty config.
    pub async fn load(&self) -> Result<ManuscriptConfig> {
        if !self.config_path.exists() {
            return Ok(ManuscriptConfig::default());
        }
        let contents = tokio::fs::read_to_string(&self.config_path)
            .await
            .map_err(|e| ManuscriptError::Config(format!("failed to read config: {e}")))?;
        if contents.trim().is_empty() {
            return Ok(ManuscriptConfig::default());
        }
        let mut config: ManuscriptConfig = serde_yaml::from_str(&contents)
            .map_err(|e| ManuscriptError::Config(format!("invalid config: {e}")))?;
        for manuscript in &mut config.manuscripts {
            manuscript.derive_fields();
        }
        Ok(config)
    }

    pub async fn save(&self, config: &ManuscriptConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                ManuscriptError::Config(format!("failed to create config dir: {e}"))
            })?;
        }
        let yaml = serde_yaml::to_string(config)?;
        let temp_path = self.config_path.with_extension("yaml.tmp");
        tokio::fs::write(&temp_path, yaml)
            .await
            .map_err(|e| ManuscriptError::Config(format!("failed to write config: {e}")))?;
        tokio::fs::rename(&temp_path, &self.config_path)
            .await
            .map_err(|e| ManuscriptError::Config(format!("failed to replace config: {e}")))?;
        Ok(())
    }

    /// Insert `manuscript`, replacing any stored entry with the same name.
    pub async fn upsert(&self, manuscript: &Manuscript) -> Result<()> {
        let mut config = self.load().await?;
        match config
            .manuscripts
            .iter_mut()
            .find(|m| m.name == manuscript.name)
        {
            Some(existing) => *existing = manuscript.clone(),
            None => config.manuscripts.push(manuscript.clone()),
        }
        self.save(&config).await
    }

    /// Remove the entry named `name`. Returns whether anything was removed.
    pub async fn remove(&self, name: &str) -> Result<bool> {
        let mut config = self.load().await?;
        let before = config.manuscripts.len();
        config.manuscripts.retain(|m| m.name != name);
        if config.manuscripts.len() == before {
            return Ok(false);
        }
        self.save(&config).await?;
        Ok(true)
    }
}

/// Root under which job directories live: `<base>/manuscript`.
pub fn jobs_root(config: &ManuscriptConfig) -> PathBuf {
    let base = config
        .base_dir
        .as_ref()
        .filter(|p| !p.as_os_str().is_empty())
        .map(|p| {
            let trimmed = p.to_string_lossy();
            PathBuf::from(trimmed.trim_end_matches('/'))
        })
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")));
    base.join(MANUSCRIPT_BASE_NAME)
}

pub fn job_dir(config: &ManuscriptConfig, name: &str) -> PathBuf {
    jobs_root(config).join(name)
}

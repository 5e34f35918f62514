use std::path::PathBuf;

use ms_core::services::config_store::{self, ConfigStore};

use crate::cli::Cli;

/// Options shared by every command, resolved once from the command line.
#[derive(Debug, Clone)]
pub struct Settings {
    pub config_path: PathBuf,
}

impl Settings {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            config_path: cli
                .config
                .clone()
                .unwrap_or_else(config_store::default_config_path),
        }
    }

    pub fn store(&self) -> ConfigStore {
        ConfigStore::new(self.config_path.clone())
    }
}

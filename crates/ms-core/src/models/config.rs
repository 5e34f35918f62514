use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::manuscript::Manuscript;

/// Contents of the local configuration store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManuscriptConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_dir: Option<PathBuf>,
    #[serde(default)]
    pub manuscripts: Vec<Manuscript>,
}

impl ManuscriptConfig {
    pub fn find(&self, name: &str) -> Option<&Manuscript> {
        self.manuscripts.iter().find(|m| m.name == name)
    }
}

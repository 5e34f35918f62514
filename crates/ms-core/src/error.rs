use std::path::PathBuf;

use crate::models::PortRole;

#[derive(Debug, thiserror::Error)]
pub enum ManuscriptError {
    #[error("port conflict detected: {port} is reserved by both {first} and {second} for {role}")]
    PortConflict {
        port: u16,
        first: String,
        second: String,
        role: PortRole,
    },

    #[error("port {port} is already reserved by manuscript {owner} for {role}")]
    PortReserved {
        port: u16,
        owner: String,
        role: PortRole,
    },

    #[error("no available ports in the range {start}-{end} for {role}")]
    PortsExhausted { role: PortRole, start: u16, end: u16 },

    #[error("unable to check system ports: {0}")]
    HostProbe(String),

    #[error("container engine failed: {0}")]
    ContainerEngine(String),

    #[error("manuscript file does not exist: {0}")]
    DescriptorNotFound(PathBuf),

    #[error("manuscript file is empty: {0}")]
    EmptyDescriptor(PathBuf),

    #[error("invalid manuscript: {0}")]
    InvalidDescriptor(String),

    #[error("manuscript [ {0} ] already deployed, please change the name in the manuscript yaml file")]
    AlreadyDeployed(String),

    #[error("manuscript '{0}' not found")]
    JobNotFound(String),

    #[error("container '{0}' is not running")]
    ContainerNotRunning(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("chat failed: {0}")]
    Chat(String),

    #[error("{step} failed: {source}")]
    StepFailed {
        step: &'static str,
        #[source]
        source: Box<ManuscriptError>,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, ManuscriptError>;

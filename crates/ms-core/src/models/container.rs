use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

static EXIT_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Exited \((\d+)\)").unwrap());

/// One line of `docker ps --format '{{json .}}'`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ContainerInfo {
    #[serde(rename = "ID", default)]
    pub id: String,
    #[serde(rename = "Names", default)]
    pub name: String,
    #[serde(rename = "Image", default)]
    pub image: String,
    #[serde(rename = "State", default)]
    pub state: String,
    #[serde(rename = "Status", default)]
    pub status: String,
    #[serde(rename = "Ports", default)]
    pub ports: String,
    #[serde(rename = "RunningFor", default)]
    pub running_for: String,
}

impl ContainerInfo {
    pub fn is_running(&self) -> bool {
        self.state == "running"
    }

    pub fn job_status(&self) -> JobStatus {
        JobStatus::from_container(&self.state, &self.status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Running,
    Warning,
    Failed,
    Stopped,
    Other(String),
}

impl JobStatus {
    pub fn from_container(state: &str, status: &str) -> Self {
        let status_lower = status.to_ascii_lowercase();
        match state {
            "running"
                if status_lower.contains("unhealthy") || status_lower.contains("restarting") =>
            {
                JobStatus::Warning
            }
            "running" => JobStatus::Running,
            "restarting" => JobStatus::Warning,
            "dead" => JobStatus::Failed,
            "exited" => match EXIT_CODE_RE
                .captures(status)
                .and_then(|c| c[1].parse::<i32>().ok())
            {
                Some(0) => JobStatus::Stopped,
                Some(_) => JobStatus::Failed,
                None => JobStatus::Stopped,
            },
            other => JobStatus::Other(other.to_string()),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Running => f.write_str("Running"),
            JobStatus::Warning => f.write_str("Warning"),
            JobStatus::Failed => f.write_str("Failed"),
            JobStatus::Stopped => f.write_str("Stopped"),
            JobStatus::Other(state) if state.is_empty() => f.write_str("Unknown"),
            JobStatus::Other(state) => write!(f, "{state}"),
        }
    }
}

use std::path::{Path, PathBuf};

use crate::error::{ManuscriptError, Result};
use crate::models::{JobStatus, Manuscript};

use super::config_store::{self, ConfigStore};
use super::descriptor::{self, DESCRIPTOR_FILENAME};
use super::docker::ContainerEngine;

/// One row of `manuscript-cli list`.
#[derive(Debug, Clone, PartialEq)]
pub struct JobSummary {
    pub name: String,
    pub status: JobStatus,
    pub running_for: String,
    pub graphql_endpoint: Option<String>,
    pub job_dir: PathBuf,
}

/// Every job directory under `root` holding a readable descriptor, joined
/// with the state of its jobmanager container. Ports allocated at deploy time
/// only live in `stored`, so a stored entry of the same name wins.
pub async fn list_jobs(
    root: &Path,
    stored: &[Manuscript],
    engine: &dyn ContainerEngine,
) -> Result<Vec<JobSummary>> {
    if !root.exists() {
        return Ok(Vec::new());
    }

    let containers = engine.list_containers().await?;
    let mut jobs = Vec::new();
    let mut entries = tokio::fs::read_dir(root).await?;
    while let Some(entry) = entries.next_entry().await? {
        let job_dir = entry.path();
        let descriptor_path = job_dir.join(DESCRIPTOR_FILENAME);
        if !descriptor_path.is_file() {
            continue;
        }
        let manuscript = match descriptor::parse(&descriptor_path).await {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(path = %descriptor_path.display(), error = %e, "skipping_unreadable_manuscript");
                continue;
            }
        };

        let jobmanager = manuscript.jobmanager_container();
        let container = containers.iter().find(|c| c.name == jobmanager);
        let deployed = stored
            .iter()
            .find(|m| m.name == manuscript.name)
            .unwrap_or(&manuscript);
        jobs.push(JobSummary {
            status: container
                .map(|c| c.job_status())
                .unwrap_or_else(|| JobStatus::Other("not deployed".into())),
            running_for: container.map(|c| c.running_for.clone()).unwrap_or_default(),
            graphql_endpoint: deployed.graphql_endpoint(),
            name: manuscript.name,
            job_dir,
        });
    }

    jobs.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(jobs)
}

/// Find a job by name in the store, falling back to its directory on disk.
pub async fn resolve_job(store: &ConfigStore, name: &str) -> Result<(Manuscript, PathBuf)> {
    let config = store.load().await?;
    let job_dir = config_store::job_dir(&config, name);
    if let Some(manuscript) = config.find(name) {
        return Ok((manuscript.clone(), job_dir));
    }
    let descriptor_path = job_dir.join(DESCRIPTOR_FILENAME);
    if descriptor_path.is_file() {
        let manuscript = descriptor::parse(&descriptor_path).await?;
        return Ok((manuscript, job_dir));
    }
    Err(ManuscriptError::JobNotFound(name.to_string()))
}

/// Stop the job's containers, keeping their data and configuration.
pub async fn stop_job(
    store: &ConfigStore,
    engine: &dyn ContainerEngine,
    name: &str,
) -> Result<PathBuf> {
    let (manuscript, job_dir) = resolve_job(store, name).await?;
    engine.compose_stop(&job_dir, &manuscript.name).await?;
    Ok(job_dir)
}

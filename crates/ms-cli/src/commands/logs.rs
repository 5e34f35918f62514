use color_eyre::eyre::bail;

use ms_core::services::docker::{ContainerEngine, Docker};
use ms_core::services::jobs;

use crate::settings::Settings;

pub async fn run(settings: &Settings, job_name: &str) -> color_eyre::Result<()> {
    let (manuscript, _) = jobs::resolve_job(&settings.store(), job_name).await?;
    let container = manuscript.jobmanager_container();
    let status = Docker::new().logs(&container, true).await?;
    if !status.success() {
        bail!("docker logs for {container} exited with {status}");
    }
    Ok(())
}

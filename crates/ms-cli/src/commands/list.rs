use std::path::PathBuf;

use ms_core::services::config_store;
use ms_core::services::docker::Docker;
use ms_core::services::jobs;

use crate::output::render_job_table;
use crate::settings::Settings;

pub async fn run(settings: &Settings, directory: Option<PathBuf>) -> color_eyre::Result<()> {
    let config = settings.store().load().await?;
    let root = directory.unwrap_or_else(|| config_store::jobs_root(&config));
    tracing::debug!(root = %root.display(), "listing_jobs");

    let jobs = jobs::list_jobs(&root, &config.manuscripts, &Docker::new()).await?;
    println!("{}", render_job_table(&jobs));
    Ok(())
}

use colored::Colorize;

use ms_core::services::docker::Docker;
use ms_core::services::jobs;

use crate::settings::Settings;

pub async fn run(settings: &Settings, job_name: &str) -> color_eyre::Result<()> {
    let job_dir = jobs::stop_job(&settings.store(), &Docker::new(), job_name).await?;
    println!("{}", format!("✓ Manuscript {job_name} stopped").green());
    println!(
        "Configuration and data are kept in {}; restart with `manuscript-cli deploy`.",
        job_dir.display()
    );
    Ok(())
}

//! `manuscript-cli deploy`.

use std::path::Path;

use colored::Colorize;

use ms_core::services::descriptor::DESCRIPTOR_FILENAME;
use ms_core::services::docker::Docker;
use ms_core::services::inventory::Lsof;
use ms_core::services::pipeline::{self, DeployContext, DeployOutcome};

use crate::cli::DeployEnv;
use crate::output::StepProgress;
use crate::settings::Settings;

pub async fn run(settings: &Settings, manuscript: &Path, env: DeployEnv) -> color_eyre::Result<()> {
    match env {
        DeployEnv::Local => {
            deploy_local(settings, manuscript).await?;
            Ok(())
        }
        DeployEnv::Chainbase => {
            println!("Deploying to Chainbase network...coming soon!");
            Ok(())
        }
    }
}

/// Run the deployment pipeline against the local Docker engine.
pub async fn deploy_local(
    settings: &Settings,
    manuscript: &Path,
) -> color_eyre::Result<DeployOutcome> {
    let store = settings.store();
    let docker = Docker::new();
    let ctx = DeployContext::new(&store, &docker, &Lsof);

    let mut progress = StepProgress::new();
    let outcome = pipeline::deploy(&ctx, manuscript, |event| progress.handle(event)).await?;

    print_summary(&outcome);
    Ok(outcome)
}

fn print_summary(outcome: &DeployOutcome) {
    let job_dir = outcome.job_dir.display();
    let descriptor = outcome.job_dir.join(DESCRIPTOR_FILENAME);
    let descriptor = descriptor.display();

    println!("{}", "✓ Manuscript deployment completed successfully!".green());
    println!();
    println!("{}", "You can now list your job with the command:".green());
    println!("👉 {}", "manuscript-cli list".yellow());
    println!();
    println!(
        "{}",
        format!(
            "If you need to manually edit the manuscript, you can edit the file '{descriptor}' and deploy it again:"
        )
        .green()
    );
    println!("👉 {}", format!("vim {descriptor}").yellow());
    println!(
        "👉 {}",
        format!("manuscript-cli deploy {descriptor} --env=local").yellow()
    );
    println!();
    println!(
        "{}",
        format!(
            "You can now access your manuscript at http://localhost:{}",
            outcome.manuscript.port
        )
        .green()
    );
    if let Some(endpoint) = outcome.manuscript.graphql_endpoint() {
        if outcome.manuscript.has_postgres_sink() {
            println!("{}", format!("GraphQL endpoint: {endpoint}").green());
        }
    }
    tracing::debug!(job_dir = %job_dir, "deploy_complete");
}

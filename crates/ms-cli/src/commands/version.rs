use ms_core::services::docker::{ContainerEngine, Docker};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub async fn run(verbose: bool) -> color_eyre::Result<()> {
    println!("manuscript-cli version {VERSION}");
    if verbose {
        println!("OS/Arch:        {}/{}", std::env::consts::OS, std::env::consts::ARCH);
        let docker = match Docker::new().version().await {
            Ok(version) => version,
            Err(e) => {
                tracing::debug!(error = %e, "docker_version_unavailable");
                "not available".to_string()
            }
        };
        println!("Docker Engine:  {docker}");
    }
    Ok(())
}

use std::path::Path;
use std::process::{ExitStatus, Stdio};

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{ManuscriptError, Result};
use crate::models::ContainerInfo;

pub const COMPOSE_FILENAME: &str = "docker-compose.yml";

/// Operations the CLI needs from the container engine.
#[async_trait]
pub trait ContainerEngine: Send + Sync {
    /// Raw `{{.Ports}}` column of every running container.
    async fn published_ports(&self) -> Result<String>;

    /// All containers, running or not.
    async fn list_containers(&self) -> Result<Vec<ContainerInfo>>;

    /// Server version; fails when the engine is missing or not running.
    async fn version(&self) -> Result<String>;

    async fn compose_up(&self, job_dir: &Path, project: &str) -> Result<()>;

    async fn compose_stop(&self, job_dir: &Path, project: &str) -> Result<()>;

    /// Stream a container's logs to the terminal until it exits or the user interrupts.
    async fn logs(&self, container: &str, follow: bool) -> Result<ExitStatus>;

    /// Run a query through `psql` inside `container`, returning unaligned `|`-separated rows.
    async fn psql(&self, container: &str, user: &str, database: &str, sql: &str)
        -> Result<String>;
}

/// The `docker` CLI.
pub struct Docker {
    binary: String,
}

impl Docker {
    pub fn new() -> Self {
        Self {
            binary: "docker".to_string(),
        }
    }

    async fn run(&self, args: &[&str], working_directory: Option<&Path>) -> Result<String> {
        tracing::debug!(binary = %self.binary, args = ?args, "docker_invoke");
        let mut cmd = Command::new(&self.binary);
        cmd.args(args);
        if let Some(dir) = working_directory {
            cmd.current_dir(dir);
        }
        let output = cmd.output().await.map_err(|e| {
            ManuscriptError::ContainerEngine(format!("failed to run {}: {e}", self.binary))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ManuscriptError::ContainerEngine(format!(
                "{} {} failed (exit {}): {}",
                self.binary,
                args.join(" "),
                output.status.code().unwrap_or(-1),
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl Default for Docker {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse `docker ps --format '{{json .}}'` output, one object per line.
pub fn parse_container_lines(output: &str) -> Result<Vec<ContainerInfo>> {
    output
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| serde_json::from_str(l).map_err(ManuscriptError::from))
        .collect()
}

#[async_trait]
impl ContainerEngine for Docker {
    async fn published_ports(&self) -> Result<String> {
        self.run(&["ps", "--format", "{{.Ports}}"], None).await
    }

    async fn list_containers(&self) -> Result<Vec<ContainerInfo>> {
        let output = self
            .run(&["ps", "-a", "--format", "{{json .}}"], None)
            .await?;
        parse_container_lines(&output)
    }

    async fn version(&self) -> Result<String> {
        self.run(&["version", "--format", "{{.Server.Version}}"], None)
            .await
    }

    async fn compose_up(&self, job_dir: &Path, project: &str) -> Result<()> {
        let compose_file = job_dir.join(COMPOSE_FILENAME);
        let compose_file = compose_file.to_string_lossy();
        self.run(
            &["compose", "-f", &compose_file, "-p", project, "up", "-d"],
            Some(job_dir),
        )
        .await?;
        Ok(())
    }

    async fn compose_stop(&self, job_dir: &Path, project: &str) -> Result<()> {
        let compose_file = job_dir.join(COMPOSE_FILENAME);
        let compose_file = compose_file.to_string_lossy();
        self.run(
            &["compose", "-f", &compose_file, "-p", project, "stop"],
            Some(job_dir),
        )
        .await?;
        Ok(())
    }

    async fn logs(&self, container: &str, follow: bool) -> Result<ExitStatus> {
        let mut args = vec!["logs"];
        if follow {
            args.push("-f");
        }
        args.push(container);
        let status = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| ManuscriptError::ContainerEngine(format!("failed to follow logs: {e}")))?;
        Ok(status)
    }

    async fn psql(
        &self,
        container: &str,
        user: &str,
        database: &str,
        sql: &str,
    ) -> Result<String> {
        self.run(
            &[
                "exec", container, "psql", "-U", user, "-d", database, "-At", "-F", "|", "-c",
                sql,
            ],
            None,
        )
        .await
    }
}

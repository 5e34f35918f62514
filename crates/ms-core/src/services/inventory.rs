use std::collections::HashSet;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use tokio::process::Command;

use super::docker::ContainerEngine;
use crate::error::{ManuscriptError, Result};

static LISTEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":(\d+)\s+\(LISTEN\)").unwrap());

static PUBLISHED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"0\.0\.0\.0:(\d+)").unwrap());

/// Lists TCP sockets in LISTEN state on the host.
#[async_trait]
pub trait HostPortScanner: Send + Sync {
    async fn listening_output(&self) -> Result<String>;
}

/// `lsof -nP -iTCP -sTCP:LISTEN`.
pub struct Lsof;

#[async_trait]
impl HostPortScanner for Lsof {
    async fn listening_output(&self) -> Result<String> {
        let output = Command::new("lsof")
            .args(["-nP", "-iTCP", "-sTCP:LISTEN"])
            .output()
            .await
            .map_err(|e| ManuscriptError::HostProbe(format!("failed to run lsof: {e}")))?;
        if !output.status.success() {
            return Err(ManuscriptError::HostProbe(format!(
                "lsof exited with {}",
                output.status.code().unwrap_or(-1)
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

pub fn parse_listening_ports(output: &str) -> HashSet<u16> {
    output
        .lines()
        .filter_map(|line| LISTEN_RE.captures(line))
        .filter_map(|caps| caps[1].parse().ok())
        .collect()
}

pub fn parse_published_ports(output: &str) -> HashSet<u16> {
    output
        .lines()
        .flat_map(|line| PUBLISHED_RE.captures_iter(line))
        .filter_map(|caps| caps[1].parse().ok())
        .collect()
}

/// Ports bound on the host plus ports published by running containers.
///
/// A failing host scan is logged and ignored; a failing container engine is
/// returned as an error.
pub async fn occupied_ports(
    scanner: &dyn HostPortScanner,
    engine: &dyn ContainerEngine,
) -> Result<HashSet<u16>> {
    let mut ports = match scanner.listening_output().await {
        Ok(output) => parse_listening_ports(&output),
        Err(e) => {
            tracing::warn!(error = %e, "host_port_scan_failed");
            HashSet::new()
        }
    };

    let published = engine.published_ports().await?;
    ports.extend(parse_published_ports(&published));
    Ok(ports)
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::process::ExitStatus;

    use super::*;
    use crate::models::ContainerInfo;

    const LSOF_OUTPUT: &str = "\
COMMAND     PID USER   FD   TYPE             DEVICE SIZE/OFF NODE NAME
rapportd    512 me    9u  IPv4 0x1234567890abcdef      0t0  TCP *:49152 (LISTEN)
postgres    733 me    7u  IPv6 0x1234567890abcdee      0t0  TCP [::1]:5432 (LISTEN)
ControlCe   801 me   10u  IPv4 0x1234567890abcded      0t0  TCP 127.0.0.1:7000 (LISTEN)
";

    struct FailingScanner;

    #[async_trait]
    impl HostPortScanner for FailingScanner {
        async fn listening_output(&self) -> Result<String> {
            Err(ManuscriptError::HostProbe("lsof not installed".into()))
        }
    }

    struct FixedScanner(&'static str);

    #[async_trait]
    impl HostPortScanner for FixedScanner {
        async fn listening_output(&self) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct PortsOnlyEngine(Option<&'static str>);

    #[async_trait]
    impl ContainerEngine for PortsOnlyEngine {
        async fn published_ports(&self) -> Result<String> {
            self.0
                .map(str::to_string)
                .ok_or_else(|| ManuscriptError::ContainerEngine("docker not running".into()))
        }
        async fn list_containers(&self) -> Result<Vec<ContainerInfo>> {
            Ok(Vec::new())
        }
        async fn version(&self) -> Result<String> {
            Ok("27.0.0".into())
        }
        async fn compose_up(&self, _: &Path, _: &str) -> Result<()> {
            Ok(())
        }
        async fn compose_stop(&self, _: &Path, _: &str) -> Result<()> {
            Ok(())
        }
        async fn logs(&self, _: &str, _: bool) -> Result<ExitStatus> {
            unimplemented!()
        }
        async fn psql(&self, _: &str, _: &str, _: &str, _: &str) -> Result<String> {
            unimplemented!()
        }
    }

    #[test]
    fn parse_lsof_listing() {
        let ports = parse_listening_ports(LSOF_OUTPUT);
        assert_eq!(ports, [49152, 5432, 7000].into_iter().collect());
    }

    #[test]
    fn parse_docker_port_column() {
        let output = "0.0.0.0:8081->8081/tcp, :::8081->8081/tcp\n\
                      0.0.0.0:15432->5432/tcp, 0.0.0.0:8082->8080/tcp\n\
                      5432/tcp\n";
        let ports = parse_published_ports(output);
        assert_eq!(ports, [8081, 15432, 8082].into_iter().collect());
    }

    #[test]
    fn out_of_range_numbers_are_skipped() {
        assert!(parse_published_ports("0.0.0.0:99999->1/tcp").is_empty());
    }

    #[tokio::test]
    async fn host_failure_is_not_fatal() {
        let engine = PortsOnlyEngine(Some("0.0.0.0:8081->8081/tcp"));
        let ports = occupied_ports(&FailingScanner, &engine).await.unwrap();
        assert_eq!(ports, [8081].into_iter().collect());
    }

    #[tokio::test]
    async fn engine_failure_is_fatal() {
        let engine = PortsOnlyEngine(None);
        let result = occupied_ports(&FixedScanner(LSOF_OUTPUT), &engine).await;
        assert!(matches!(result, Err(ManuscriptError::ContainerEngine(_))));
    }

    #[tokio::test]
    async fn host_and_container_ports_are_merged() {
        let engine = PortsOnlyEngine(Some("0.0.0.0:8081->8081/tcp"));
        let ports = occupied_ports(&FixedScanner(LSOF_OUTPUT), &engine)
            .await
            .unwrap();
        assert_eq!(ports.len(), 4);
        assert!(ports.contains(&8081));
        assert!(ports.contains(&7000));
    }
}

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ManuscriptError, Result};
use crate::models::Manuscript;

use super::config_store::{self, ConfigStore};
use super::docker::ContainerEngine;
use super::inventory::{self, HostPortScanner};
use super::{compose, descriptor, ports};

/// Collaborators shared by every deployment step.
pub struct DeployContext<'a> {
    pub store: &'a ConfigStore,
    pub engine: &'a dyn ContainerEngine,
    pub scanner: &'a dyn HostPortScanner,
    /// How many times the last step polls for the jobmanager container.
    pub status_attempts: u32,
    pub status_interval: Duration,
}

impl<'a> DeployContext<'a> {
    pub fn new(
        store: &'a ConfigStore,
        engine: &'a dyn ContainerEngine,
        scanner: &'a dyn HostPortScanner,
    ) -> Self {
        Self {
            store,
            engine,
            scanner,
            status_attempts: 15,
            status_interval: Duration::from_secs(2),
        }
    }
}

/// Everything the steps have produced so far.
#[derive(Debug, Clone)]
pub struct DeployState {
    pub descriptor_path: PathBuf,
    pub manuscript: Option<Manuscript>,
    pub job_dir: Option<PathBuf>,
    pub stored_jobs: Vec<Manuscript>,
}

impl DeployState {
    pub fn new(descriptor_path: impl Into<PathBuf>) -> Self {
        Self {
            descriptor_path: descriptor_path.into(),
            manuscript: None,
            job_dir: None,
            stored_jobs: Vec::new(),
        }
    }

    fn manuscript(&self) -> Result<&Manuscript> {
        self.manuscript
            .as_ref()
            .ok_or_else(|| ManuscriptError::InvalidDescriptor("manuscript not parsed yet".into()))
    }

    fn job_dir(&self) -> Result<&Path> {
        self.job_dir
            .as_deref()
            .ok_or_else(|| ManuscriptError::InvalidDescriptor("job directory not resolved yet".into()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployStep {
    ValidateFile,
    ParseDescriptor,
    InitializePorts,
    CheckExisting,
    CreateDirectory,
    CopyDescriptor,
    RenderCompose,
    CheckEngine,
    StartContainers,
    CheckStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepEvent {
    Started(DeployStep),
    Finished(DeployStep),
    Failed(DeployStep),
}

/// Result of a successful deployment.
#[derive(Debug, Clone)]
pub struct DeployOutcome {
    pub manuscript: Manuscript,
    pub job_dir: PathBuf,
}

impl DeployStep {
    pub const ALL: [DeployStep; 10] = [
        DeployStep::ValidateFile,
        DeployStep::ParseDescriptor,
        DeployStep::InitializePorts,
        DeployStep::CheckExisting,
        DeployStep::CreateDirectory,
        DeployStep::CopyDescriptor,
        DeployStep::RenderCompose,
        DeployStep::CheckEngine,
        DeployStep::StartContainers,
        DeployStep::CheckStatus,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DeployStep::ValidateFile => "Step 1: Validating manuscript file",
            DeployStep::ParseDescriptor => "Step 2: Parsing manuscript yaml",
            DeployStep::InitializePorts => "Step 3: Verifying port initialization",
            DeployStep::CheckExisting => "Step 4: Checking manuscript is already deployed",
            DeployStep::CreateDirectory => "Step 5: Creating directory",
            DeployStep::CopyDescriptor => "Step 6: Creating manuscript file",
            DeployStep::RenderCompose => "Step 7: Creating docker compose file",
            DeployStep::CheckEngine => "Step 8: Checking docker installed",
            DeployStep::StartContainers => "Step 9: Starting docker containers",
            DeployStep::CheckStatus => "Step 10: Checking container status",
        }
    }

    pub async fn run(self, ctx: &DeployContext<'_>, state: DeployState) -> Result<DeployState> {
        match self {
            DeployStep::ValidateFile => validate_file(state).await,
            DeployStep::ParseDescriptor => parse_descriptor(ctx, state).await,
            DeployStep::InitializePorts => initialize_ports(ctx, state).await,
            DeployStep::CheckExisting => check_existing(ctx, state).await,
            DeployStep::CreateDirectory => create_directory(state).await,
            DeployStep::CopyDescriptor => copy_descriptor(state).await,
            DeployStep::RenderCompose => render_compose(state).await,
            DeployStep::CheckEngine => check_engine(ctx, state).await,
            DeployStep::StartContainers => start_containers(ctx, state).await,
            DeployStep::CheckStatus => check_status(ctx, state).await,
        }
    }
}

async fn validate_file(state: DeployState) -> Result<DeployState> {
    descriptor::validate_file(&state.descriptor_path).await?;
    Ok(state)
}

async fn parse_descriptor(ctx: &DeployContext<'_>, mut state: DeployState) -> Result<DeployState> {
    let manuscript = descriptor::parse(&state.descriptor_path).await?;
    let config = ctx.store.load().await?;
    state.job_dir = Some(config_store::job_dir(&config, &manuscript.name));
    state.stored_jobs = config.manuscripts;
    state.manuscript = Some(manuscript);
    Ok(state)
}

async fn initialize_ports(ctx: &DeployContext<'_>, mut state: DeployState) -> Result<DeployState> {
    let occupied = inventory::occupied_ports(ctx.scanner, ctx.engine).await?;
    let mut manuscript = state.manuscript()?.clone();
    ports::initialize_ports(&mut manuscript, &state.stored_jobs, &occupied)?;
    state.manuscript = Some(manuscript);
    Ok(state)
}

async fn check_existing(ctx: &DeployContext<'_>, state: DeployState) -> Result<DeployState> {
    let manuscript = state.manuscript()?;
    let jobmanager = manuscript.jobmanager_container();
    let containers = ctx.engine.list_containers().await?;
    if containers
        .iter()
        .any(|c| c.name == jobmanager && c.is_running())
    {
        return Err(ManuscriptError::AlreadyDeployed(manuscript.name.clone()));
    }
    Ok(state)
}

async fn create_directory(state: DeployState) -> Result<DeployState> {
    tokio::fs::create_dir_all(state.job_dir()?).await?;
    Ok(state)
}

async fn copy_descriptor(state: DeployState) -> Result<DeployState> {
    descriptor::copy_into(state.job_dir()?, &state.descriptor_path).await?;
    Ok(state)
}

async fn render_compose(state: DeployState) -> Result<DeployState> {
    compose::write(state.job_dir()?, state.manuscript()?).await?;
    Ok(state)
}

async fn check_engine(ctx: &DeployContext<'_>, state: DeployState) -> Result<DeployState> {
    let version = ctx.engine.version().await?;
    tracing::debug!(%version, "container_engine_available");
    Ok(state)
}

async fn start_containers(ctx: &DeployContext<'_>, state: DeployState) -> Result<DeployState> {
    let manuscript = state.manuscript()?;
    ctx.engine
        .compose_up(state.job_dir()?, &manuscript.name)
        .await?;
    Ok(state)
}

async fn check_status(ctx: &DeployContext<'_>, state: DeployState) -> Result<DeployState> {
    let jobmanager = state.manuscript()?.jobmanager_container();
    for attempt in 1..=ctx.status_attempts {
        let containers = ctx.engine.list_containers().await?;
        if containers
            .iter()
            .any(|c| c.name == jobmanager && c.is_running())
        {
            return Ok(state);
        }
        tracing::debug!(attempt, container = %jobmanager, "waiting_for_container");
        if attempt < ctx.status_attempts {
            tokio::time::sleep(ctx.status_interval).await;
        }
    }
    Err(ManuscriptError::ContainerNotRunning(jobmanager))
}

/// Run every step in order, stopping at the first failure.
///
/// Nothing is rolled back on failure. On success the manuscript, with its
/// allocated ports, is written to the configuration store.
pub async fn deploy(
    ctx: &DeployContext<'_>,
    descriptor_path: &Path,
    mut on_event: impl FnMut(StepEvent),
) -> Result<DeployOutcome> {
    let mut state = DeployState::new(descriptor_path);

    for step in DeployStep::ALL {
        tracing::info!(step = step.name(), "deploy_step_started");
        on_event(StepEvent::Started(step));
        state = match step.run(ctx, state).await {
            Ok(next) => next,
            Err(e) => {
                tracing::info!(step = step.name(), error = %e, "deploy_step_failed");
                on_event(StepEvent::Failed(step));
                return Err(ManuscriptError::StepFailed {
                    step: step.name(),
                    source: Box::new(e),
                });
            }
        };
        on_event(StepEvent::Finished(step));
    }

    let manuscript = state.manuscript()?.clone();
    let job_dir = state.job_dir()?.to_path_buf();
    ctx.store.upsert(&manuscript).await?;

    Ok(DeployOutcome {
        manuscript,
        job_dir,
    })
}

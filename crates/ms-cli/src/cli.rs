use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "manuscript-cli")]
#[command(about = "Provision and manage local manuscript data-pipeline jobs")]
pub struct Cli {
    /// Configuration store (defaults to ~/.manuscript/config.yaml)
    #[arg(long, global = true, env = "MANUSCRIPT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Write a debug log to .manuscript-cli-debug.log
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize and start local manuscript containers
    #[command(visible_aliases = ["ini", "in", "i"])]
    Init(InitArgs),

    /// Deploy a manuscript locally or to the Chainbase network
    #[command(visible_alias = "d")]
    Deploy {
        /// Path to the manuscript.yaml file
        manuscript: PathBuf,

        /// Target environment
        #[arg(long, value_enum)]
        env: DeployEnv,
    },

    /// List all manuscript jobs
    #[command(visible_alias = "ls")]
    List {
        /// Directory holding the job directories (defaults to <base>/manuscript)
        directory: Option<PathBuf>,
    },

    /// Stop a manuscript job, keeping its data and configuration
    Stop {
        job_name: String,
    },

    /// Follow the logs of a manuscript job
    Logs {
        job_name: String,
    },

    /// Chat with the dataset AI (text to SQL)
    #[command(visible_alias = "c")]
    Chat {
        job_name: String,
    },

    /// Show the version of manuscript-cli
    Version {
        /// Display detailed version information
        #[arg(short, long)]
        verbose: bool,
    },
}

/// Answers for `init`; anything left out is asked interactively.
#[derive(Args, Debug, Default, Clone)]
pub struct InitArgs {
    /// Project name
    #[arg(long)]
    pub name: Option<String>,

    /// Chain to read from, e.g. ethereum
    #[arg(long)]
    pub chain: Option<String>,

    /// Dataset table, e.g. blocks
    #[arg(long)]
    pub table: Option<String>,

    /// Output sink: postgres or print
    #[arg(long)]
    pub sink: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployEnv {
    /// Docker on this machine
    Local,
    /// Chainbase network
    Chainbase,
}

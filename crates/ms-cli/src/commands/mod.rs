pub mod chat;
pub mod deploy;
pub mod init;
pub mod list;
pub mod logs;
pub mod stop;
pub mod version;

use crate::cli::Commands;
use crate::settings::Settings;

pub async fn run(command: Commands, settings: &Settings) -> color_eyre::Result<()> {
    match command {
        Commands::Init(args) => init::run(settings, args).await,
        Commands::Deploy { manuscript, env } => deploy::run(settings, &manuscript, env).await,
        Commands::List { directory } => list::run(settings, directory).await,
        Commands::Stop { job_name } => stop::run(settings, &job_name).await,
        Commands::Logs { job_name } => logs::run(settings, &job_name).await,
        Commands::Chat { job_name } => chat::run(settings, &job_name).await,
        Commands::Version { verbose } => version::run(verbose).await,
    }
}

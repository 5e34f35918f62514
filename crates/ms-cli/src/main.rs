use clap::Parser;

use ms_cli::cli::Cli;
use ms_cli::commands;
use ms_cli::logging;
use ms_cli::settings::Settings;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let _guard = logging::init(cli.debug);
    let settings = Settings::from_cli(&cli);

    commands::run(cli.command, &settings).await
}

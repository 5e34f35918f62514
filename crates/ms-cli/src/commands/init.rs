//! `manuscript-cli init`: scaffold a manuscript and deploy it.

use color_eyre::eyre::{bail, eyre};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};

use ms_core::services::config_store;
use ms_core::services::descriptor::{self, validate_name, DESCRIPTOR_FILENAME};

use crate::cli::InitArgs;
use crate::settings::Settings;

use super::deploy;

pub const CHAINS: &[&str] = &[
    "ethereum", "bsc", "polygon", "arbitrum", "optimism", "base", "zkevm", "zksync", "avalanche",
];
pub const TABLES: &[&str] = &["blocks", "transactions", "transactionLogs"];
pub const SINKS: &[&str] = &["postgres", "print"];

fn pick(prompt: &str, choices: &[&str], given: Option<String>) -> color_eyre::Result<String> {
    if let Some(value) = given {
        if !choices.contains(&value.as_str()) {
            bail!("unknown {prompt} '{value}', expected one of: {}", choices.join(", "));
        }
        return Ok(value);
    }
    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("Select {prompt}"))
        .items(choices)
        .default(0)
        .interact()?;
    Ok(choices[selection].to_string())
}

fn ask_name(given: Option<String>) -> color_eyre::Result<String> {
    let name = match given {
        Some(name) => name,
        None => Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Project name")
            .default("demo".to_string())
            .validate_with(|input: &String| validate_name(input))
            .interact_text()?,
    };
    validate_name(&name).map_err(|e| eyre!("invalid project name: {e}"))?;
    Ok(name)
}

pub async fn run(settings: &Settings, args: InitArgs) -> color_eyre::Result<()> {
    let name = ask_name(args.name)?;
    let chain = pick("chain", CHAINS, args.chain)?;
    let table = pick("table", TABLES, args.table)?;
    let sink = pick("output", SINKS, args.sink)?;

    let config = settings.store().load().await?;
    let descriptor_path = config_store::job_dir(&config, &name).join(DESCRIPTOR_FILENAME);
    if descriptor_path.exists() {
        bail!(
            "manuscript '{name}' already exists at {}; deploy it with `manuscript-cli deploy {} --env=local`",
            descriptor_path.display(),
            descriptor_path.display()
        );
    }

    let manuscript = descriptor::scaffold(&name, &chain, &table, &sink);
    descriptor::write(&descriptor_path, &manuscript).await?;
    println!("Created {}", descriptor_path.display());

    deploy::deploy_local(settings, &descriptor_path).await?;
    Ok(())
}

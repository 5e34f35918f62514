//! `manuscript-cli chat`: ask questions about a job's Postgres sink in plain language.

use color_eyre::eyre::bail;
use colored::Colorize;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input};

use ms_core::models::Manuscript;
use ms_core::services::chat::{self, ChatClient, ChatProvider};
use ms_core::services::docker::Docker;
use ms_core::services::jobs;

use crate::settings::Settings;

fn is_exit(input: &str) -> bool {
    matches!(input.trim(), "exit" | "quit" | "q")
}

pub async fn run(settings: &Settings, job_name: &str) -> color_eyre::Result<()> {
    let (manuscript, _) = jobs::resolve_job(&settings.store(), job_name).await?;
    if !manuscript.has_postgres_sink() {
        bail!("manuscript '{job_name}' has no postgres sink to chat with");
    }

    let docker = Docker::new();
    let client = ChatClient::new(ChatProvider::from_env()?);
    let columns = chat::describe_table(&docker, &manuscript).await?;
    let system_prompt = chat::build_system_prompt(&manuscript, &columns);

    println!(
        "Chatting with {} about {}.{} using {} ({}). Type 'exit' to leave.",
        manuscript.name,
        manuscript.schema(),
        manuscript.table,
        client.provider().name,
        client.provider().model
    );

    loop {
        let question: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Question")
            .interact_text()?;
        if is_exit(&question) {
            break;
        }
        if let Err(e) = answer(&docker, &client, &manuscript, &system_prompt, &question).await {
            println!("{} {e}", "✗".red());
        }
    }
    Ok(())
}

async fn answer(
    docker: &Docker,
    client: &ChatClient,
    manuscript: &Manuscript,
    system_prompt: &str,
    question: &str,
) -> color_eyre::Result<()> {
    let reply = client.complete(system_prompt, question).await?;
    let sql = chat::extract_sql(&reply)?;
    println!("{}", sql.cyan());

    let execute = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("Run this query?")
        .default(true)
        .interact()?;
    if !execute {
        return Ok(());
    }

    let rows = chat::run_query(docker, manuscript, &sql).await?;
    if rows.is_empty() {
        println!("(no rows)");
    } else {
        println!("{rows}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_words() {
        assert!(is_exit("exit"));
        assert!(is_exit(" quit "));
        assert!(!is_exit("how many blocks"));
    }
}

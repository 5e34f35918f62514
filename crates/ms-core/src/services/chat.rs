use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ManuscriptError, Result};
use crate::models::Manuscript;

use super::docker::ContainerEngine;

const OPENAI_DEFAULT_BASE: &str = "https://api.openai.com/v1";
const OPENAI_DEFAULT_MODEL: &str = "gpt-4o-mini";
const GEMINI_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
const GEMINI_DEFAULT_MODEL: &str = "gemini-1.5-flash";

static SQL_FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:sql|SQL)?\s*(.*?)```").unwrap());

/// An OpenAI-compatible chat completion endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatProvider {
    pub name: &'static str,
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl ChatProvider {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok().filter(|v| !v.is_empty()))
    }

    /// OpenAI (or any compatible server via `OPENAI_API_BASE`) wins over Gemini.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(api_key) = lookup("OPENAI_API_KEY") {
            return Ok(Self {
                name: "OpenAI",
                base_url: lookup("OPENAI_API_BASE")
                    .unwrap_or_else(|| OPENAI_DEFAULT_BASE.to_string())
                    .trim_end_matches('/')
                    .to_string(),
                api_key,
                model: lookup("OPENAI_MODEL").unwrap_or_else(|| OPENAI_DEFAULT_MODEL.to_string()),
            });
        }
        if let Some(api_key) = lookup("GEMINI_API_KEY") {
            return Ok(Self {
                name: "Gemini",
                base_url: GEMINI_BASE.to_string(),
                api_key,
                model: lookup("GEMINI_MODEL").unwrap_or_else(|| GEMINI_DEFAULT_MODEL.to_string()),
            });
        }
        Err(ManuscriptError::Chat(
            "no AI provider configured: set OPENAI_API_KEY or GEMINI_API_KEY".into(),
        ))
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

pub struct ChatClient {
    http: reqwest::Client,
    provider: ChatProvider,
}

impl ChatClient {
    pub fn new(provider: ChatProvider) -> Self {
        Self {
            http: reqwest::Client::new(),
            provider,
        }
    }

    pub fn provider(&self) -> &ChatProvider {
        &self.provider
    }

    pub async fn complete(&self, system_prompt: &str, question: &str) -> Result<String> {
        let request = CompletionRequest {
            model: &self.provider.model,
            messages: vec![
                Message {
                    role: "system",
                    content: system_prompt,
                },
                Message {
                    role: "user",
                    content: question,
                },
            ],
            temperature: 0.0,
        };
        let url = format!("{}/chat/completions", self.provider.base_url);
        tracing::debug!(provider = self.provider.name, model = %self.provider.model, "chat_request");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.provider.api_key)
            .json(&request)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ManuscriptError::Chat(format!(
                "{} returned {status}: {body}",
                self.provider.name
            )));
        }
        let completion: CompletionResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ManuscriptError::Chat("empty completion".into()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub data_type: String,
}

/// Parse `name|type` rows from `psql -At -F '|'`.
pub fn parse_columns(output: &str) -> Vec<Column> {
    output
        .lines()
        .filter_map(|line| line.split_once('|'))
        .map(|(name, data_type)| Column {
            name: name.trim().to_string(),
            data_type: data_type.trim().to_string(),
        })
        .filter(|c| !c.name.is_empty())
        .collect()
}

pub async fn describe_table(
    engine: &dyn ContainerEngine,
    manuscript: &Manuscript,
) -> Result<Vec<Column>> {
    let sql = format!(
        "SELECT column_name, data_type FROM information_schema.columns \
         WHERE table_schema = '{}' AND table_name = '{}' ORDER BY ordinal_position",
        manuscript.schema(),
        manuscript.table
    );
    let output = run_query(engine, manuscript, &sql).await?;
    Ok(parse_columns(&output))
}

pub async fn run_query(
    engine: &dyn ContainerEngine,
    manuscript: &Manuscript,
    sql: &str,
) -> Result<String> {
    engine
        .psql(
            &manuscript.postgres_container(),
            &manuscript.db_user,
            &manuscript.database,
            sql,
        )
        .await
}

pub fn build_system_prompt(manuscript: &Manuscript, columns: &[Column]) -> String {
    let mut lines = vec![
        "You translate questions into a single PostgreSQL SELECT statement.".to_string(),
        format!(
            "The data comes from the {} dataset and is stored in table {}.{}.",
            manuscript.chain,
            manuscript.schema(),
            manuscript.table
        ),
    ];
    if !columns.is_empty() {
        let described: Vec<String> = columns
            .iter()
            .map(|c| format!("{} ({})", c.name, c.data_type))
            .collect();
        lines.push(format!("Columns: {}.", described.join(", ")));
    }
    lines.push("Reply with only the SQL inside a ```sql code block.".to_string());
    lines.join("\n")
}

/// Pull the SQL statement out of a model reply. Only a single read query is
/// accepted.
pub fn extract_sql(reply: &str) -> Result<String> {
    let body = SQL_FENCE_RE
        .captures(reply)
        .map(|caps| caps[1].to_string())
        .unwrap_or_else(|| reply.to_string());
    let sql = body.trim().trim_end_matches(';').trim().to_string();

    let head = sql
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_ascii_uppercase();
    if head != "SELECT" && head != "WITH" {
        return Err(ManuscriptError::Chat(format!(
            "model did not return a SELECT query: {}",
            reply.trim()
        )));
    }
    if sql.contains(';') {
        return Err(ManuscriptError::Chat(
            "model returned more than one statement".into(),
        ));
    }
    Ok(sql)
}

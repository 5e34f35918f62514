use std::path::{Path, PathBuf};

use crate::error::{ManuscriptError, Result};
use crate::models::{Manuscript, Sink, SinkConfig, Source, Transform};

pub const DESCRIPTOR_FILENAME: &str = "manuscript.yaml";

/// The descriptor must exist and have content.
pub async fn validate_file(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(ManuscriptError::DescriptorNotFound(path.to_path_buf()));
    }
    let content = tokio::fs::read(path).await?;
    if content.is_empty() {
        return Err(ManuscriptError::EmptyDescriptor(path.to_path_buf()));
    }
    Ok(())
}

pub fn parse_str(contents: &str) -> Result<Manuscript> {
    let mut manuscript: Manuscript = serde_yaml::from_str(contents)
        .map_err(|e| ManuscriptError::InvalidDescriptor(e.to_string()))?;
    if manuscript.name.trim().is_empty() {
        return Err(ManuscriptError::InvalidDescriptor(
            "name field is required".into(),
        ));
    }
    validate_name(&manuscript.name).map_err(|e| {
        ManuscriptError::InvalidDescriptor(format!("invalid name '{}': {e}", manuscript.name))
    })?;
    manuscript.derive_fields();
    Ok(manuscript)
}

/// Project names become compose project and container names.
pub fn validate_name(name: &str) -> std::result::Result<(), String> {
    let Some(first) = name.chars().next() else {
        return Err("name cannot be empty".to_string());
    };
    if !first.is_ascii_lowercase() {
        return Err("name must start with a lowercase letter".to_string());
    }
    if let Some(ch) = name
        .chars()
        .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-' || *c == '_'))
    {
        return Err(format!("name contains invalid character: '{ch}'"));
    }
    Ok(())
}

pub async fn parse(path: &Path) -> Result<Manuscript> {
    let contents = tokio::fs::read_to_string(path).await?;
    parse_str(&contents)
}

/// Write `manuscript` as YAML to `path`, creating parent directories.
pub async fn write(path: &Path, manuscript: &Manuscript) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let yaml = serde_yaml::to_string(manuscript)?;
    tokio::fs::write(path, yaml).await?;
    Ok(())
}

/// Copy the descriptor into `job_dir`, replacing any previous copy atomically.
pub async fn copy_into(job_dir: &Path, source: &Path) -> Result<PathBuf> {
    let content = tokio::fs::read(source).await?;
    if content.is_empty() {
        return Err(ManuscriptError::EmptyDescriptor(source.to_path_buf()));
    }

    let file_name = source.file_name().ok_or_else(|| {
        ManuscriptError::InvalidDescriptor(format!("{} has no file name", source.display()))
    })?;
    let destination = job_dir.join(file_name);
    let mut temp_name = file_name.to_os_string();
    temp_name.push(".tmp");
    let temp_path = job_dir.join(temp_name);

    tokio::fs::write(&temp_path, &content).await?;
    if let Err(e) = tokio::fs::rename(&temp_path, &destination).await {
        tokio::fs::remove_file(&temp_path).await.ok();
        return Err(e.into());
    }
    Ok(destination)
}

/// A new single-source, single-sink manuscript for `init`.
pub fn scaffold(name: &str, chain: &str, table: &str, sink: &str) -> Manuscript {
    let source_name = format!("{chain}_{table}");
    let transform_name = format!("{source_name}_transform");
    let sinks = if sink == "postgres" {
        vec![Sink {
            name: format!("{source_name}_sink"),
            kind: "postgres".to_string(),
            from: transform_name.clone(),
            database: chain.to_string(),
            schema: "public".to_string(),
            table: table.to_string(),
            primary_key: default_primary_key(table).to_string(),
            config: Some(SinkConfig {
                host: "postgres".to_string(),
                port: 5432,
                username: "postgres".to_string(),
                password: "postgres".to_string(),
            }),
        }]
    } else {
        vec![Sink {
            name: format!("{source_name}_sink"),
            kind: "print".to_string(),
            from: transform_name.clone(),
            database: String::new(),
            schema: String::new(),
            table: String::new(),
            primary_key: String::new(),
            config: None,
        }]
    };

    let mut manuscript = Manuscript {
        name: name.to_string(),
        spec_version: "v1.0.0".to_string(),
        parallelism: 1,
        port: 0,
        graphql_port: 0,
        db_port: 0,
        db_user: "postgres".to_string(),
        db_password: "postgres".to_string(),
        sources: vec![Source {
            name: source_name.clone(),
            kind: "dataset".to_string(),
            dataset: format!("{chain}.{table}"),
            filter: None,
        }],
        transforms: vec![Transform {
            name: transform_name,
            sql: format!("SELECT * FROM {source_name}"),
        }],
        sinks,
        chain: String::new(),
        table: String::new(),
        database: String::new(),
        query: String::new(),
        sink: String::new(),
    };
    manuscript.derive_fields();
    manuscript
}

fn default_primary_key(table: &str) -> &'static str {
    match table {
        "blocks" => "block_number",
        "transactions" => "transaction_hash",
        "transactionLogs" => "transaction_hash,log_index",
        _ => "id",
    }
}

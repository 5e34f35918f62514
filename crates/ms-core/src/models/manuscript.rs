use serde::{Deserialize, Serialize};

use super::port::PortRole;

fn default_spec_version() -> String {
    "v1.0.0".to_string()
}

fn default_parallelism() -> u32 {
    1
}

fn default_db_credential() -> String {
    "postgres".to_string()
}

fn is_zero(port: &u16) -> bool {
    *port == 0
}

/// A manuscript job descriptor, as written in `manuscript.yaml`.
///
/// Port fields use 0 for "not yet assigned".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Manuscript {
    pub name: String,
    #[serde(default = "default_spec_version")]
    pub spec_version: String,
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub port: u16,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub graphql_port: u16,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub db_port: u16,
    #[serde(default = "default_db_credential")]
    pub db_user: String,
    #[serde(default = "default_db_credential")]
    pub db_password: String,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub transforms: Vec<Transform>,
    #[serde(default)]
    pub sinks: Vec<Sink>,

    #[serde(skip)]
    pub chain: String,
    #[serde(skip)]
    pub table: String,
    #[serde(skip)]
    pub database: String,
    #[serde(skip)]
    pub query: String,
    #[serde(skip)]
    pub sink: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Source {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub dataset: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transform {
    pub name: String,
    pub sql: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Sink {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub database: String,
    #[serde(default)]
    pub schema: String,
    #[serde(default)]
    pub table: String,
    #[serde(default)]
    pub primary_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<SinkConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SinkConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

impl Manuscript {
    /// Fill the convenience fields from the first source, sink and transform.
    pub fn derive_fields(&mut self) {
        if let Some(sink) = self.sinks.first() {
            self.table = sink.table.clone();
            self.database = sink.database.clone();
            if sink.kind == "postgres" {
                self.sink = "postgres".to_string();
            }
        }
        if let Some(source) = self.sources.first() {
            self.chain = source.dataset.clone();
        }
        if let Some(transform) = self.transforms.first() {
            self.query = transform.sql.clone();
        }
    }

    pub fn port_for(&self, role: PortRole) -> u16 {
        match role {
            PortRole::Service => self.port,
            PortRole::Query => self.graphql_port,
            PortRole::Database => self.db_port,
        }
    }

    pub fn set_port(&mut self, role: PortRole, port: u16) {
        match role {
            PortRole::Service => self.port = port,
            PortRole::Query => self.graphql_port = port,
            PortRole::Database => self.db_port = port,
        }
    }

    pub fn has_postgres_sink(&self) -> bool {
        self.sink == "postgres"
    }

    /// Schema of the first sink, `public` when unset.
    pub fn schema(&self) -> &str {
        self.sinks
            .first()
            .map(|s| s.schema.as_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("public")
    }

    /// Container name compose gives `service` in this job's project.
    pub fn container_name(&self, service: &str) -> String {
        format!("{}-{service}-1", self.name)
    }

    pub fn jobmanager_container(&self) -> String {
        self.container_name("jobmanager")
    }

    pub fn postgres_container(&self) -> String {
        self.container_name("postgres")
    }

    pub fn graphql_endpoint(&self) -> Option<String> {
        (self.graphql_port != 0).then(|| format!("http://127.0.0.1:{}", self.graphql_port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESCRIPTOR: &str = r#"
name: demo
specVersion: v1.0.0
parallelism: 1
port: 8081
sources:
  - name: zkevm_blocks
    type: dataset
    dataset: zkevm.blocks
    filter: "block_number > 100000"
transforms:
  - name: zkevm_blocks_transform
    sql: SELECT * FROM zkevm_blocks
sinks:
  - name: zkevm_blocks_sink
    type: postgres
    from: zkevm_blocks_transform
    database: zkevm
    schema: public
    table: blocks
    primary_key: block_number
"#;

    #[test]
    fn parse_and_derive() {
        let mut ms: Manuscript = serde_yaml::from_str(DESCRIPTOR).unwrap();
        ms.derive_fields();
        assert_eq!(ms.port, 8081);
        assert_eq!(ms.graphql_port, 0);
        assert_eq!(ms.chain, "zkevm.blocks");
        assert_eq!(ms.table, "blocks");
        assert_eq!(ms.database, "zkevm");
        assert_eq!(ms.query, "SELECT * FROM zkevm_blocks");
        assert!(ms.has_postgres_sink());
    }

    #[test]
    fn derive_without_lists_leaves_fields_empty() {
        let mut ms: Manuscript = serde_yaml::from_str("name: bare\n").unwrap();
        ms.derive_fields();
        assert!(ms.chain.is_empty());
        assert!(ms.sink.is_empty());
        assert_eq!(ms.db_user, "postgres");
        assert_eq!(ms.schema(), "public");
    }

    #[test]
    fn unset_ports_are_not_serialized() {
        let ms: Manuscript = serde_yaml::from_str("name: bare\nport: 8090\n").unwrap();
        let yaml = serde_yaml::to_string(&ms).unwrap();
        assert!(yaml.contains("port: 8090"));
        assert!(!yaml.contains("graphqlPort"));
        assert!(!yaml.contains("dbPort"));
    }

    #[test]
    fn container_names_follow_compose_project() {
        let ms: Manuscript = serde_yaml::from_str("name: demo\ngraphqlPort: 8082\n").unwrap();
        assert_eq!(ms.jobmanager_container(), "demo-jobmanager-1");
        assert_eq!(ms.postgres_container(), "demo-postgres-1");
        assert_eq!(ms.graphql_endpoint().as_deref(), Some("http://127.0.0.1:8082"));
    }
}

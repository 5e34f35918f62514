use std::fmt;

use serde::{Deserialize, Serialize};

/// The three fixed port purposes of a manuscript job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PortRole {
    /// Flink web UI / REST port.
    Service,
    /// Hasura GraphQL endpoint.
    Query,
    /// Postgres sink.
    Database,
}

impl PortRole {
    /// Roles in the order they are checked and allocated.
    pub const ALL: [PortRole; 3] = [PortRole::Service, PortRole::Query, PortRole::Database];

    /// Inclusive allocation range for this role.
    pub fn range(self) -> (u16, u16) {
        match self {
            PortRole::Service => (8081, 8181),
            PortRole::Query => (8082, 8182),
            PortRole::Database => (15432, 15532),
        }
    }

    /// Name of the component behind the port, as shown to users.
    pub fn label(self) -> &'static str {
        match self {
            PortRole::Service => "Flink",
            PortRole::Query => "GraphQL",
            PortRole::Database => "DB",
        }
    }
}

impl fmt::Display for PortRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PortRole::Service => "service",
            PortRole::Query => "query-endpoint",
            PortRole::Database => "database",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortReservation {
    pub port: u16,
    pub manuscript_name: String,
    pub role: PortRole,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_do_not_start_on_the_same_port() {
        let starts: Vec<u16> = PortRole::ALL.iter().map(|r| r.range().0).collect();
        assert_eq!(starts, vec![8081, 8082, 15432]);
    }

    #[test]
    fn display_uses_role_names() {
        assert_eq!(PortRole::Query.to_string(), "query-endpoint");
        assert_eq!(PortRole::Query.label(), "GraphQL");
    }
}

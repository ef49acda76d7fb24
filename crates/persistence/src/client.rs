//! ScyllaDB client and connection management

use crate::error::PersistenceError;
use crate::schema;
use call_agent_config::ScyllaSettings;
use scylla::{Session, SessionBuilder};
use std::sync::Arc;

/// ScyllaDB configuration
#[derive(Debug, Clone)]
pub struct ScyllaConfig {
    pub hosts: Vec<String>,
    pub keyspace: String,
    pub replication_factor: u8,
}

impl Default for ScyllaConfig {
    fn default() -> Self {
        Self::from(&ScyllaSettings::default())
    }
}

impl From<&ScyllaSettings> for ScyllaConfig {
    fn from(settings: &ScyllaSettings) -> Self {
        Self {
            hosts: settings.hosts.clone(),
            keyspace: settings.keyspace.clone(),
            replication_factor: settings.replication_factor,
        }
    }
}

/// ScyllaDB client wrapper
#[derive(Clone)]
pub struct ScyllaClient {
    session: Arc<Session>,
    config: ScyllaConfig,
}

impl ScyllaClient {
    /// Connect to ScyllaDB cluster
    pub async fn connect(config: ScyllaConfig) -> Result<Self, PersistenceError> {
        if config.hosts.is_empty() {
            return Err(PersistenceError::Configuration(
                "persistence.scylla.hosts is empty".to_string(),
            ));
        }
        tracing::info!(hosts = ?config.hosts, keyspace = %config.keyspace, "Connecting to ScyllaDB");

        let session = SessionBuilder::new()
            .known_nodes(&config.hosts)
            .build()
            .await?;

        Ok(Self {
            session: Arc::new(session),
            config,
        })
    }

    /// Ensure keyspace and tables exist
    pub async fn ensure_schema(&self) -> Result<(), PersistenceError> {
        schema::create_keyspace(
            &self.session,
            &self.config.keyspace,
            self.config.replication_factor,
        )
        .await?;
        schema::create_tables(&self.session, &self.config.keyspace).await?;
        tracing::info!(keyspace = %self.config.keyspace, "Schema ensured");
        Ok(())
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn keyspace(&self) -> &str {
        &self.config.keyspace
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_settings() {
        let settings = ScyllaSettings {
            hosts: vec!["10.0.0.1:9042".to_string(), "10.0.0.2:9042".to_string()],
            keyspace: "donors".to_string(),
            replication_factor: 3,
            ..Default::default()
        };
        let config = ScyllaConfig::from(&settings);
        assert_eq!(config.hosts.len(), 2);
        assert_eq!(config.keyspace, "donors");
        assert_eq!(config.replication_factor, 3);
    }

    #[tokio::test]
    async fn test_empty_hosts_rejected() {
        let config = ScyllaConfig {
            hosts: Vec::new(),
            ..Default::default()
        };
        let result = ScyllaClient::connect(config).await;
        assert!(matches!(result, Err(PersistenceError::Configuration(_))));
    }
}

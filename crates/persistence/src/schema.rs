//! ScyllaDB schema creation

use scylla::Session;
use crate::error::PersistenceError;

/// Create the keyspace if it doesn't exist
pub async fn create_keyspace(session: &Session, keyspace: &str, replication_factor: u8) -> Result<(), PersistenceError> {
    let query = format!(
        "CREATE KEYSPACE IF NOT EXISTS {} WITH replication = {{'class': 'SimpleStrategy', 'replication_factor': {}}}",
        keyspace, replication_factor
    );

    session.query_unpaged(query, &[]).await
        .map_err(|e| PersistenceError::SchemaError(format!("Failed to create keyspace: {}", e)))?;

    Ok(())
}

/// Create all required tables
pub async fn create_tables(session: &Session, keyspace: &str) -> Result<(), PersistenceError> {
    // One row per recorded profile; a caller who phones twice gets two rows
    let users_table = format!(r#"
        CREATE TABLE IF NOT EXISTS {}.users (
            registration_id UUID,
            conversation_id TEXT,
            name TEXT,
            email TEXT,
            blood_group TEXT,
            phone_number TEXT,
            registered_at TIMESTAMP,
            status TEXT,
            notes TEXT,
            PRIMARY KEY (registration_id)
        )
    "#, keyspace);

    session.query_unpaged(users_table, &[]).await
        .map_err(|e| PersistenceError::SchemaError(format!("Failed to create users table: {}", e)))?;

    // Per-step call log, newest first within a call
    let conversations_table = format!(r#"
        CREATE TABLE IF NOT EXISTS {}.conversations (
            conversation_id TEXT,
            created_at TIMESTAMP,
            turn_id UUID,
            step TEXT,
            user_input TEXT,
            agent_response TEXT,
            language TEXT,
            status TEXT,
            PRIMARY KEY ((conversation_id), created_at, turn_id)
        ) WITH CLUSTERING ORDER BY (created_at DESC, turn_id ASC)
    "#, keyspace);

    session.query_unpaged(conversations_table, &[]).await
        .map_err(|e| PersistenceError::SchemaError(format!("Failed to create conversations table: {}", e)))?;

    tracing::info!("All tables created successfully");
    Ok(())
}

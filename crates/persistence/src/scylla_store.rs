//! ScyllaDB profile and conversation store

use async_trait::async_trait;
use scylla::frame::value::CqlTimestamp;
use uuid::Uuid;

use call_agent_core::{ConversationLogEntry, ConversationLogger, ProfileSink, Result, UserProfile};

use crate::{PersistenceError, ScyllaClient};

/// Writes profiles to `users` and step logs to `conversations`
#[derive(Clone)]
pub struct ScyllaProfileStore {
    client: ScyllaClient,
}

impl ScyllaProfileStore {
    pub fn new(client: ScyllaClient) -> Self {
        Self { client }
    }

    async fn insert_user(&self, profile: &UserProfile) -> std::result::Result<Uuid, PersistenceError> {
        let registration_id = Uuid::new_v4();
        let query = format!(
            "INSERT INTO {}.users (
                registration_id, conversation_id, name, email, blood_group,
                phone_number, registered_at, status, notes
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            self.client.keyspace()
        );

        self.client
            .session()
            .query_unpaged(
                query,
                (
                    registration_id,
                    profile.conversation_id.as_deref(),
                    profile.name.as_str(),
                    profile.email.as_str(),
                    profile.blood_group.as_str(),
                    profile.phone_number.as_deref(),
                    CqlTimestamp(profile.registered_at.timestamp_millis()),
                    profile.status.as_str(),
                    profile.notes.as_deref(),
                ),
            )
            .await?;

        Ok(registration_id)
    }

    async fn insert_turn(&self, entry: &ConversationLogEntry) -> std::result::Result<(), PersistenceError> {
        let query = format!(
            "INSERT INTO {}.conversations (
                conversation_id, created_at, turn_id, step, user_input,
                agent_response, language, status
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            self.client.keyspace()
        );

        self.client
            .session()
            .query_unpaged(
                query,
                (
                    entry.conversation_id.as_str(),
                    CqlTimestamp(entry.timestamp.timestamp_millis()),
                    Uuid::new_v4(),
                    entry.step.as_str(),
                    entry.user_input.as_str(),
                    entry.agent_response.as_str(),
                    entry.language.as_str(),
                    entry.status.as_str(),
                ),
            )
            .await?;

        Ok(())
    }
}

#[async_trait]
impl ProfileSink for ScyllaProfileStore {
    async fn record(&self, profile: &UserProfile) -> Result<()> {
        let registration_id = self.insert_user(profile).await?;
        tracing::info!(
            registration_id = %registration_id,
            conversation_id = ?profile.conversation_id,
            status = profile.status.as_str(),
            "Profile persisted to ScyllaDB"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "scylla"
    }
}

#[async_trait]
impl ConversationLogger for ScyllaProfileStore {
    async fn log_turn(&self, entry: &ConversationLogEntry) -> Result<()> {
        self.insert_turn(entry).await?;
        tracing::debug!(
            conversation_id = %entry.conversation_id,
            step = %entry.step,
            "Conversation turn logged"
        );
        Ok(())
    }
}

use super::bot_data_models::ServerConfig;
use crate::core::moderation::{WarningEntry, WarningRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Access to the persisted bot document.
///
/// Every mutation is applied and persisted as one step, so two concurrent
/// warnings for the same user never lose an increment.
#[async_trait]
pub trait BotDataStore: Send + Sync {
    async fn get_welcome_message(&self, guild_id: u64) -> Result<Option<String>, StoreError>;
    async fn set_welcome_message(&self, guild_id: u64, message: String) -> Result<(), StoreError>;

    async fn get_warnings(
        &self,
        guild_id: u64,
        user_id: u64,
    ) -> Result<Option<WarningRecord>, StoreError>;
    /// Record a violation and return the new value of the counter it bumped.
    async fn add_warning(
        &self,
        guild_id: u64,
        user_id: u64,
        entry: WarningEntry,
    ) -> Result<u32, StoreError>;
    /// Returns whether a record existed.
    async fn remove_warnings(&self, guild_id: u64, user_id: u64) -> Result<bool, StoreError>;
    async fn list_warnings(&self, guild_id: u64) -> Result<Vec<(u64, WarningRecord)>, StoreError>;

    async fn banned_users(&self) -> Result<HashMap<u64, DateTime<Utc>>, StoreError>;
    async fn add_banned_user(&self, user_id: u64, until: DateTime<Utc>) -> Result<(), StoreError>;
    /// Returns whether an entry existed.
    async fn remove_banned_user(&self, user_id: u64) -> Result<bool, StoreError>;

    async fn get_server_config(&self, guild_id: u64) -> Result<Option<ServerConfig>, StoreError>;
    async fn save_server_config(
        &self,
        guild_id: u64,
        config: ServerConfig,
    ) -> Result<(), StoreError>;
}

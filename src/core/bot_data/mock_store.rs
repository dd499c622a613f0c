// In-memory BotDataStore for core tests.

use super::bot_data_models::{BotData, ServerConfig};
use super::bot_data_store::{BotDataStore, StoreError};
use crate::core::moderation::{WarningEntry, WarningRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct MockStore {
    pub data: Mutex<BotData>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BotDataStore for MockStore {
    async fn get_welcome_message(&self, guild_id: u64) -> Result<Option<String>, StoreError> {
        Ok(self.data.lock().unwrap().welcome_messages.get(&guild_id).cloned())
    }

    async fn set_welcome_message(&self, guild_id: u64, message: String) -> Result<(), StoreError> {
        self.data
            .lock()
            .unwrap()
            .welcome_messages
            .insert(guild_id, message);
        Ok(())
    }

    async fn get_warnings(
        &self,
        guild_id: u64,
        user_id: u64,
    ) -> Result<Option<WarningRecord>, StoreError> {
        Ok(self
            .data
            .lock()
            .unwrap()
            .auto_mod
            .warnings
            .get(&guild_id)
            .and_then(|g| g.get(&user_id))
            .cloned())
    }

    async fn add_warning(
        &self,
        guild_id: u64,
        user_id: u64,
        entry: WarningEntry,
    ) -> Result<u32, StoreError> {
        Ok(self.data.lock().unwrap().add_warning(guild_id, user_id, entry))
    }

    async fn remove_warnings(&self, guild_id: u64, user_id: u64) -> Result<bool, StoreError> {
        Ok(self.data.lock().unwrap().remove_warnings(guild_id, user_id))
    }

    async fn list_warnings(&self, guild_id: u64) -> Result<Vec<(u64, WarningRecord)>, StoreError> {
        Ok(self
            .data
            .lock()
            .unwrap()
            .auto_mod
            .warnings
            .get(&guild_id)
            .map(|g| g.iter().map(|(u, r)| (*u, r.clone())).collect())
            .unwrap_or_default())
    }

    async fn banned_users(&self) -> Result<HashMap<u64, DateTime<Utc>>, StoreError> {
        Ok(self.data.lock().unwrap().auto_mod.banned_users.clone())
    }

    async fn add_banned_user(&self, user_id: u64, until: DateTime<Utc>) -> Result<(), StoreError> {
        self.data
            .lock()
            .unwrap()
            .auto_mod
            .banned_users
            .insert(user_id, until);
        Ok(())
    }

    async fn remove_banned_user(&self, user_id: u64) -> Result<bool, StoreError> {
        Ok(self
            .data
            .lock()
            .unwrap()
            .auto_mod
            .banned_users
            .remove(&user_id)
            .is_some())
    }

    async fn get_server_config(&self, guild_id: u64) -> Result<Option<ServerConfig>, StoreError> {
        Ok(self.data.lock().unwrap().server_configs.get(&guild_id).cloned())
    }

    async fn save_server_config(
        &self,
        guild_id: u64,
        config: ServerConfig,
    ) -> Result<(), StoreError> {
        self.data
            .lock()
            .unwrap()
            .server_configs
            .insert(guild_id, config);
        Ok(())
    }
}

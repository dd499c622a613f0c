use crate::core::bot_data::{BotData, BotDataStore, ServerConfig, StoreError};
use crate::core::moderation::{WarningEntry, WarningRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use tokio::sync::RwLock;

/// JSON-backed bot document. The whole file is rewritten on every change:
/// { welcome_messages, auto_mod: { warnings, banned_users }, server_configs }
pub struct JsonBotDataStore {
    path: PathBuf,
    cache: RwLock<BotData>,
}

impl JsonBotDataStore {
    /// Load the document at `path`. A missing or unreadable file starts
    /// empty.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let cache = if path.exists() {
            match File::open(&path) {
                Ok(file) => serde_json::from_reader(BufReader::new(file)).unwrap_or_else(|e| {
                    tracing::warn!(path = %path.display(), "Bot data file unreadable, starting empty: {}", e);
                    BotData::default()
                }),
                Err(e) => {
                    tracing::warn!(path = %path.display(), "Could not open bot data file: {}", e);
                    BotData::default()
                }
            }
        } else {
            BotData::default()
        };

        Self {
            path,
            cache: RwLock::new(cache),
        }
    }

    /// Write `data` out. Callers pass the data behind their write guard so
    /// writers never interleave file rewrites.
    fn persist(&self, data: &BotData) -> Result<(), StoreError> {
        let file = File::create(&self.path)?;
        serde_json::to_writer_pretty(file, data)?;
        Ok(())
    }
}

#[async_trait]
impl BotDataStore for JsonBotDataStore {
    async fn get_welcome_message(&self, guild_id: u64) -> Result<Option<String>, StoreError> {
        let cache = self.cache.read().await;
        Ok(cache.welcome_messages.get(&guild_id).cloned())
    }

    async fn set_welcome_message(&self, guild_id: u64, message: String) -> Result<(), StoreError> {
        let mut cache = self.cache.write().await;
        cache.welcome_messages.insert(guild_id, message);
        self.persist(&cache)
    }

    async fn get_warnings(
        &self,
        guild_id: u64,
        user_id: u64,
    ) -> Result<Option<WarningRecord>, StoreError> {
        let cache = self.cache.read().await;
        Ok(cache
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
        let mut cache = self.cache.write().await;
        let count = cache.add_warning(guild_id, user_id, entry);
        self.persist(&cache)?;
        Ok(count)
    }

    async fn remove_warnings(&self, guild_id: u64, user_id: u64) -> Result<bool, StoreError> {
        let mut cache = self.cache.write().await;
        let removed = cache.remove_warnings(guild_id, user_id);
        if removed {
            self.persist(&cache)?;
        }
        Ok(removed)
    }

    async fn list_warnings(&self, guild_id: u64) -> Result<Vec<(u64, WarningRecord)>, StoreError> {
        let cache = self.cache.read().await;
        Ok(cache
            .auto_mod
            .warnings
            .get(&guild_id)
            .map(|g| g.iter().map(|(u, r)| (*u, r.clone())).collect())
            .unwrap_or_default())
    }

    async fn banned_users(&self) -> Result<HashMap<u64, DateTime<Utc>>, StoreError> {
        let cache = self.cache.read().await;
        Ok(cache.auto_mod.banned_users.clone())
    }

    async fn add_banned_user(&self, user_id: u64, until: DateTime<Utc>) -> Result<(), StoreError> {
        let mut cache = self.cache.write().await;
        cache.auto_mod.banned_users.insert(user_id, until);
        self.persist(&cache)
    }

    async fn remove_banned_user(&self, user_id: u64) -> Result<bool, StoreError> {
        let mut cache = self.cache.write().await;
        let removed = cache.auto_mod.banned_users.remove(&user_id).is_some();
        if removed {
            self.persist(&cache)?;
        }
        Ok(removed)
    }

    async fn get_server_config(&self, guild_id: u64) -> Result<Option<ServerConfig>, StoreError> {
        let cache = self.cache.read().await;
        Ok(cache.server_configs.get(&guild_id).cloned())
    }

    async fn save_server_config(
        &self,
        guild_id: u64,
        config: ServerConfig,
    ) -> Result<(), StoreError> {
        let mut cache = self.cache.write().await;
        cache.server_configs.insert(guild_id, config);
        self.persist(&cache)
    }
}

use crate::core::moderation::WarningRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The whole persisted document. Keys match the file on disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BotData {
    /// guild id -> welcome message template
    #[serde(default)]
    pub welcome_messages: HashMap<u64, String>,
    #[serde(default)]
    pub auto_mod: AutoModData,
    #[serde(default)]
    pub server_configs: HashMap<u64, ServerConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutoModData {
    /// guild id -> user id -> record
    #[serde(default)]
    pub warnings: HashMap<u64, HashMap<u64, WarningRecord>>,
    /// user id -> when the temporary ban ends
    #[serde(default)]
    pub banned_users: HashMap<u64, DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Key of the template last applied to the guild
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_at: Option<DateTime<Utc>>,
}

impl BotData {
    /// Record a warning for a user and return the counter it bumped.
    pub fn add_warning(
        &mut self,
        guild_id: u64,
        user_id: u64,
        entry: crate::core::moderation::WarningEntry,
    ) -> u32 {
        self.auto_mod
            .warnings
            .entry(guild_id)
            .or_default()
            .entry(user_id)
            .or_default()
            .record(entry)
    }

    /// Drop a user's record. Empty guild maps are dropped with it.
    pub fn remove_warnings(&mut self, guild_id: u64, user_id: u64) -> bool {
        let Some(guild) = self.auto_mod.warnings.get_mut(&guild_id) else {
            return false;
        };
        let removed = guild.remove(&user_id).is_some();
        if guild.is_empty() {
            self.auto_mod.warnings.remove(&guild_id);
        }
        removed
    }
}

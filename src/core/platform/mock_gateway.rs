// In-memory PlatformGateway used by the core tests.

use super::platform_gateway::{PlatformError, PlatformGateway};
use super::platform_models::{
    ChannelInfo, ChannelKind, ChatMessage, NewChannel, NewRole, OutgoingMessage, OverrideTarget,
    Permission, PermissionOverride, RoleInfo,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

pub const BOT_USER_ID: u64 = 999;

#[derive(Debug, Default)]
pub struct MockState {
    pub next_id: u64,
    pub guilds: Vec<u64>,
    pub channels: HashMap<u64, Vec<ChannelInfo>>,
    pub roles: HashMap<u64, Vec<RoleInfo>>,
    pub created_roles: Vec<NewRole>,
    pub created_channels: Vec<NewChannel>,
    pub member_roles: Vec<(u64, u64, u64)>,
    pub overrides: Vec<(u64, PermissionOverride)>,
    pub denied: Vec<(u64, OverrideTarget, Vec<Permission>)>,
    pub cleared: Vec<(u64, OverrideTarget, Vec<Permission>)>,
    pub sent: Vec<(u64, u64, OutgoingMessage)>,
    pub edited: Vec<(u64, u64, OutgoingMessage)>,
    pub deleted_messages: Vec<(u64, u64)>,
    pub history: HashMap<u64, Vec<ChatMessage>>,
    pub dms: Vec<(u64, OutgoingMessage)>,
    pub dm_closed: HashSet<u64>,
    pub bans: HashSet<(u64, u64)>,
    pub ban_calls: Vec<(u64, u64, String)>,
    pub unban_calls: Vec<(u64, u64)>,
    pub kick_calls: Vec<(u64, u64, String)>,
    /// Channels that refuse any message send.
    pub send_forbidden: HashSet<u64>,
    /// Reject messages that ping @everyone.
    pub forbid_everyone_ping: bool,
    pub fail_bans: bool,
}

pub struct MockGateway {
    pub state: Mutex<MockState>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                next_id: 10_000,
                ..Default::default()
            }),
        }
    }

    pub fn with_guild(self, guild_id: u64) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.guilds.push(guild_id);
            state.channels.entry(guild_id).or_default();
            state.roles.entry(guild_id).or_default().push(RoleInfo {
                id: guild_id,
                name: "@everyone".to_string(),
                managed: false,
            });
        }
        self
    }

    pub fn add_channel(&self, guild_id: u64, name: &str, kind: ChannelKind) -> u64 {
        self.add_channel_in(guild_id, name, kind, None)
    }

    pub fn add_channel_in(
        &self,
        guild_id: u64,
        name: &str,
        kind: ChannelKind,
        parent_id: Option<u64>,
    ) -> u64 {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = state.next_id;
        let channels = state.channels.entry(guild_id).or_default();
        let position = channels.len() as u16;
        channels.push(ChannelInfo {
            id,
            name: name.to_string(),
            kind,
            parent_id,
            position,
        });
        id
    }

    pub fn add_role(&self, guild_id: u64, name: &str, managed: bool) -> u64 {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = state.next_id;
        state.roles.entry(guild_id).or_default().push(RoleInfo {
            id,
            name: name.to_string(),
            managed,
        });
        id
    }

    pub fn push_history(&self, channel_id: u64, message: ChatMessage) {
        let mut state = self.state.lock().unwrap();
        // Newest first, matching the platform.
        state.history.entry(channel_id).or_default().insert(0, message);
    }

    pub fn channel_names(&self, guild_id: u64) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state
            .channels
            .get(&guild_id)
            .map(|c| c.iter().map(|c| c.name.clone()).collect())
            .unwrap_or_default()
    }

    pub fn role_names(&self, guild_id: u64) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state
            .roles
            .get(&guild_id)
            .map(|r| r.iter().map(|r| r.name.clone()).collect())
            .unwrap_or_default()
    }

    fn guild_of_channel(state: &MockState, channel_id: u64) -> Option<u64> {
        state
            .channels
            .iter()
            .find(|(_, chans)| chans.iter().any(|c| c.id == channel_id))
            .map(|(guild, _)| *guild)
    }
}

pub fn message(id: u64, channel_id: u64, author_id: u64, content: &str) -> ChatMessage {
    ChatMessage {
        id,
        guild_id: Some(1),
        channel_id,
        author_id,
        author_name: format!("user{}", author_id),
        author_avatar: None,
        author_is_bot: false,
        content: content.to_string(),
        timestamp: Utc::now(),
        attachments: Vec::new(),
        reactions: Vec::new(),
        embed_titles: Vec::new(),
    }
}

#[async_trait]
impl PlatformGateway for MockGateway {
    async fn current_user_id(&self) -> Result<u64, PlatformError> {
        Ok(BOT_USER_ID)
    }

    async fn guilds(&self) -> Result<Vec<u64>, PlatformError> {
        Ok(self.state.lock().unwrap().guilds.clone())
    }

    async fn channels(&self, guild_id: u64) -> Result<Vec<ChannelInfo>, PlatformError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .channels
            .get(&guild_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn roles(&self, guild_id: u64) -> Result<Vec<RoleInfo>, PlatformError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .roles
            .get(&guild_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_role(&self, guild_id: u64, role: &NewRole) -> Result<RoleInfo, PlatformError> {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let info = RoleInfo {
            id: state.next_id,
            name: role.name.clone(),
            managed: false,
        };
        state.roles.entry(guild_id).or_default().push(info.clone());
        state.created_roles.push(role.clone());
        Ok(info)
    }

    async fn delete_role(&self, guild_id: u64, role_id: u64) -> Result<(), PlatformError> {
        let mut state = self.state.lock().unwrap();
        let roles = state.roles.entry(guild_id).or_default();
        let before = roles.len();
        roles.retain(|r| r.id != role_id);
        if roles.len() == before {
            return Err(PlatformError::NotFound(format!("role {}", role_id)));
        }
        Ok(())
    }

    async fn add_member_role(
        &self,
        guild_id: u64,
        user_id: u64,
        role_id: u64,
    ) -> Result<(), PlatformError> {
        self.state
            .lock()
            .unwrap()
            .member_roles
            .push((guild_id, user_id, role_id));
        Ok(())
    }

    async fn create_channel(
        &self,
        guild_id: u64,
        channel: &NewChannel,
    ) -> Result<ChannelInfo, PlatformError> {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = state.next_id;
        let channels = state.channels.entry(guild_id).or_default();
        let info = ChannelInfo {
            id,
            name: channel.name.clone(),
            kind: channel.kind,
            parent_id: channel.parent_id,
            position: channel.position.unwrap_or(channels.len() as u16),
        };
        channels.push(info.clone());
        for overwrite in &channel.overrides {
            state.overrides.push((id, overwrite.clone()));
        }
        state.created_channels.push(channel.clone());
        Ok(info)
    }

    async fn delete_channel(&self, channel_id: u64) -> Result<(), PlatformError> {
        let mut state = self.state.lock().unwrap();
        let mut found = false;
        for channels in state.channels.values_mut() {
            let before = channels.len();
            channels.retain(|c| c.id != channel_id);
            found |= channels.len() != before;
        }
        if found {
            Ok(())
        } else {
            Err(PlatformError::NotFound(format!("channel {}", channel_id)))
        }
    }

    async fn set_permission_override(
        &self,
        _guild_id: u64,
        channel_id: u64,
        overwrite: &PermissionOverride,
    ) -> Result<(), PlatformError> {
        self.state
            .lock()
            .unwrap()
            .overrides
            .push((channel_id, overwrite.clone()));
        Ok(())
    }

    async fn deny_permissions(
        &self,
        _guild_id: u64,
        channel_id: u64,
        target: OverrideTarget,
        permissions: &[Permission],
    ) -> Result<(), PlatformError> {
        self.state
            .lock()
            .unwrap()
            .denied
            .push((channel_id, target, permissions.to_vec()));
        Ok(())
    }

    async fn clear_permissions(
        &self,
        _guild_id: u64,
        channel_id: u64,
        target: OverrideTarget,
        permissions: &[Permission],
    ) -> Result<(), PlatformError> {
        self.state
            .lock()
            .unwrap()
            .cleared
            .push((channel_id, target, permissions.to_vec()));
        Ok(())
    }

    async fn send_message(
        &self,
        channel_id: u64,
        message: &OutgoingMessage,
    ) -> Result<u64, PlatformError> {
        let mut state = self.state.lock().unwrap();
        if state.send_forbidden.contains(&channel_id) {
            return Err(PlatformError::MissingPermissions("send messages".into()));
        }
        if message.ping_everyone && state.forbid_everyone_ping {
            return Err(PlatformError::MissingPermissions("mention everyone".into()));
        }
        if Self::guild_of_channel(&state, channel_id).is_none() && !state.history.contains_key(&channel_id) {
            return Err(PlatformError::NotFound(format!("channel {}", channel_id)));
        }
        state.next_id += 1;
        let id = state.next_id;
        state.sent.push((channel_id, id, message.clone()));
        Ok(id)
    }

    async fn edit_message(
        &self,
        channel_id: u64,
        message_id: u64,
        message: &OutgoingMessage,
    ) -> Result<(), PlatformError> {
        let mut state = self.state.lock().unwrap();
        if Self::guild_of_channel(&state, channel_id).is_none() {
            return Err(PlatformError::NotFound(format!("channel {}", channel_id)));
        }
        state.edited.push((channel_id, message_id, message.clone()));
        Ok(())
    }

    async fn delete_message(&self, channel_id: u64, message_id: u64) -> Result<(), PlatformError> {
        let mut state = self.state.lock().unwrap();
        if state.deleted_messages.contains(&(channel_id, message_id)) {
            return Err(PlatformError::NotFound(format!("message {}", message_id)));
        }
        state.deleted_messages.push((channel_id, message_id));
        if let Some(history) = state.history.get_mut(&channel_id) {
            history.retain(|m| m.id != message_id);
        }
        Ok(())
    }

    async fn fetch_message(
        &self,
        channel_id: u64,
        message_id: u64,
    ) -> Result<ChatMessage, PlatformError> {
        self.state
            .lock()
            .unwrap()
            .history
            .get(&channel_id)
            .and_then(|h| h.iter().find(|m| m.id == message_id).cloned())
            .ok_or_else(|| PlatformError::NotFound(format!("message {}", message_id)))
    }

    async fn recent_messages(
        &self,
        channel_id: u64,
        limit: u8,
    ) -> Result<Vec<ChatMessage>, PlatformError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .history
            .get(&channel_id)
            .map(|h| h.iter().take(limit as usize).cloned().collect())
            .unwrap_or_default())
    }

    async fn send_direct_message(
        &self,
        user_id: u64,
        message: &OutgoingMessage,
    ) -> Result<(), PlatformError> {
        let mut state = self.state.lock().unwrap();
        if state.dm_closed.contains(&user_id) {
            return Err(PlatformError::DirectMessagesClosed);
        }
        state.dms.push((user_id, message.clone()));
        Ok(())
    }

    async fn ban_member(
        &self,
        guild_id: u64,
        user_id: u64,
        _delete_message_days: u8,
        reason: &str,
    ) -> Result<(), PlatformError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_bans {
            return Err(PlatformError::MissingPermissions("ban members".into()));
        }
        state.bans.insert((guild_id, user_id));
        state.ban_calls.push((guild_id, user_id, reason.to_string()));
        Ok(())
    }

    async fn unban_member(&self, guild_id: u64, user_id: u64) -> Result<(), PlatformError> {
        let mut state = self.state.lock().unwrap();
        state.unban_calls.push((guild_id, user_id));
        if state.bans.remove(&(guild_id, user_id)) {
            Ok(())
        } else {
            Err(PlatformError::NotFound("ban".into()))
        }
    }

    async fn kick_member(
        &self,
        guild_id: u64,
        user_id: u64,
        reason: &str,
    ) -> Result<(), PlatformError> {
        self.state
            .lock()
            .unwrap()
            .kick_calls
            .push((guild_id, user_id, reason.to_string()));
        Ok(())
    }

    async fn is_banned(&self, guild_id: u64, user_id: u64) -> Result<bool, PlatformError> {
        Ok(self.state.lock().unwrap().bans.contains(&(guild_id, user_id)))
    }
}

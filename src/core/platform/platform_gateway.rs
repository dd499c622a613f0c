// The platform port: every call the core makes to the chat platform.
//
// Services take a `PlatformGateway` instead of SDK objects so the whole
// moderation and template flows can run against an in-memory mock.

use super::platform_models::{
    ChannelInfo, ChatMessage, NewChannel, NewRole, OutgoingMessage, OverrideTarget, Permission,
    PermissionOverride, RoleInfo,
};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PlatformError {
    /// The target no longer exists (message already deleted, unknown ban, ...).
    #[error("Not found: {0}")]
    NotFound(String),

    /// The user does not accept direct messages from the bot.
    #[error("Direct messages are closed for this user")]
    DirectMessagesClosed,

    #[error("Missing permissions: {0}")]
    MissingPermissions(String),

    #[error("Platform request failed: {0}")]
    Request(String),
}

impl PlatformError {
    /// Races the bot is expected to lose now and then. Callers swallow these
    /// silently; anything else gets logged.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            PlatformError::NotFound(_) | PlatformError::DirectMessagesClosed
        )
    }
}

#[async_trait]
pub trait PlatformGateway: Send + Sync {
    /// The bot's own user id.
    async fn current_user_id(&self) -> Result<u64, PlatformError>;

    /// Every guild the bot is a member of.
    async fn guilds(&self) -> Result<Vec<u64>, PlatformError>;

    async fn channels(&self, guild_id: u64) -> Result<Vec<ChannelInfo>, PlatformError>;

    async fn roles(&self, guild_id: u64) -> Result<Vec<RoleInfo>, PlatformError>;

    async fn create_role(&self, guild_id: u64, role: &NewRole) -> Result<RoleInfo, PlatformError>;

    async fn delete_role(&self, guild_id: u64, role_id: u64) -> Result<(), PlatformError>;

    async fn add_member_role(
        &self,
        guild_id: u64,
        user_id: u64,
        role_id: u64,
    ) -> Result<(), PlatformError>;

    async fn create_channel(
        &self,
        guild_id: u64,
        channel: &NewChannel,
    ) -> Result<ChannelInfo, PlatformError>;

    async fn delete_channel(&self, channel_id: u64) -> Result<(), PlatformError>;

    /// Create or replace the override for `overwrite.target` on a channel.
    async fn set_permission_override(
        &self,
        guild_id: u64,
        channel_id: u64,
        overwrite: &PermissionOverride,
    ) -> Result<(), PlatformError>;

    /// Deny the given permissions for `target`, keeping whatever else its
    /// override already allows or denies.
    async fn deny_permissions(
        &self,
        guild_id: u64,
        channel_id: u64,
        target: OverrideTarget,
        permissions: &[Permission],
    ) -> Result<(), PlatformError>;

    /// Reset the given permissions to neutral for `target`, leaving the rest
    /// of its override untouched.
    async fn clear_permissions(
        &self,
        guild_id: u64,
        channel_id: u64,
        target: OverrideTarget,
        permissions: &[Permission],
    ) -> Result<(), PlatformError>;

    /// Send a message, returning the new message id.
    async fn send_message(
        &self,
        channel_id: u64,
        message: &OutgoingMessage,
    ) -> Result<u64, PlatformError>;

    async fn edit_message(
        &self,
        channel_id: u64,
        message_id: u64,
        message: &OutgoingMessage,
    ) -> Result<(), PlatformError>;

    async fn delete_message(&self, channel_id: u64, message_id: u64) -> Result<(), PlatformError>;

    async fn fetch_message(
        &self,
        channel_id: u64,
        message_id: u64,
    ) -> Result<ChatMessage, PlatformError>;

    /// The latest `limit` messages of a channel, newest first.
    async fn recent_messages(
        &self,
        channel_id: u64,
        limit: u8,
    ) -> Result<Vec<ChatMessage>, PlatformError>;

    async fn send_direct_message(
        &self,
        user_id: u64,
        message: &OutgoingMessage,
    ) -> Result<(), PlatformError>;

    async fn ban_member(
        &self,
        guild_id: u64,
        user_id: u64,
        delete_message_days: u8,
        reason: &str,
    ) -> Result<(), PlatformError>;

    async fn unban_member(&self, guild_id: u64, user_id: u64) -> Result<(), PlatformError>;

    async fn kick_member(
        &self,
        guild_id: u64,
        user_id: u64,
        reason: &str,
    ) -> Result<(), PlatformError>;

    async fn is_banned(&self, guild_id: u64, user_id: u64) -> Result<bool, PlatformError>;
}

// PlatformGateway over serenity's HTTP client.
//
// Translates the core's plain models into serenity builders and maps
// Discord's JSON error codes onto PlatformError.

use crate::core::platform::{
    Attachment, ChannelInfo, ChannelKind, ChatMessage, Embed, NewChannel, NewRole,
    OutgoingMessage, OverrideTarget, Permission, PermissionOverride, PlatformError,
    PlatformGateway, ReactionCount, RoleInfo,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use poise::serenity_prelude as serenity;
use std::sync::Arc;

pub struct SerenityGateway {
    http: Arc<serenity::Http>,
}

impl SerenityGateway {
    pub fn new(http: Arc<serenity::Http>) -> Self {
        Self { http }
    }

    fn http(&self) -> &serenity::Http {
        &self.http
    }

    /// Read-modify-write the override for `target`, so permissions we don't
    /// touch keep their current state.
    async fn update_override(
        &self,
        guild_id: u64,
        channel_id: u64,
        target: OverrideTarget,
        update: impl FnOnce(&mut serenity::Permissions, &mut serenity::Permissions),
    ) -> Result<(), PlatformError> {
        let channel = serenity::ChannelId::new(channel_id);
        let kind = overwrite_kind(guild_id, target);

        let existing = channel
            .to_channel(self.http())
            .await
            .platform("fetch channel")?
            .guild()
            .and_then(|c| c.permission_overwrites.into_iter().find(|o| o.kind == kind));

        let (mut allow, mut deny) = match existing {
            Some(o) => (o.allow, o.deny),
            None => (serenity::Permissions::empty(), serenity::Permissions::empty()),
        };
        update(&mut allow, &mut deny);

        channel
            .create_permission(self.http(), serenity::PermissionOverwrite { allow, deny, kind })
            .await
            .platform("update permissions")
    }
}

// ============================================================================
// ERROR MAPPING
// ============================================================================

trait PlatformResultExt<T> {
    fn platform(self, action: &str) -> Result<T, PlatformError>;
}

impl<T> PlatformResultExt<T> for Result<T, serenity::Error> {
    fn platform(self, action: &str) -> Result<T, PlatformError> {
        self.map_err(|source| map_error(action, source))
    }
}

fn map_error(action: &str, source: serenity::Error) -> PlatformError {
    if let serenity::Error::Http(serenity::HttpError::UnsuccessfulRequest(response)) = &source {
        let detail = format!("{}: {}", action, response.error.message);
        return match response.error.code {
            // unknown channel, member, message, role, user, ban
            10003 | 10007 | 10008 | 10011 | 10013 | 10026 => PlatformError::NotFound(detail),
            50007 => PlatformError::DirectMessagesClosed,
            50001 | 50013 => PlatformError::MissingPermissions(detail),
            _ if response.status_code.as_u16() == 403 => PlatformError::MissingPermissions(detail),
            _ if response.status_code.as_u16() == 404 => PlatformError::NotFound(detail),
            _ => PlatformError::Request(detail),
        };
    }
    PlatformError::Request(format!("{}: {}", action, source))
}

// ============================================================================
// CONVERSIONS
// ============================================================================

fn permission_flag(permission: Permission) -> serenity::Permissions {
    match permission {
        Permission::Administrator => serenity::Permissions::ADMINISTRATOR,
        Permission::ManageGuild => serenity::Permissions::MANAGE_GUILD,
        Permission::ManageRoles => serenity::Permissions::MANAGE_ROLES,
        Permission::ManageChannels => serenity::Permissions::MANAGE_CHANNELS,
        Permission::ManageMessages => serenity::Permissions::MANAGE_MESSAGES,
        Permission::KickMembers => serenity::Permissions::KICK_MEMBERS,
        Permission::MuteMembers => serenity::Permissions::MUTE_MEMBERS,
        Permission::MoveMembers => serenity::Permissions::MOVE_MEMBERS,
        Permission::PrioritySpeaker => serenity::Permissions::PRIORITY_SPEAKER,
        Permission::ViewChannel => serenity::Permissions::VIEW_CHANNEL,
        Permission::SendMessages => serenity::Permissions::SEND_MESSAGES,
        Permission::AttachFiles => serenity::Permissions::ATTACH_FILES,
        Permission::AddReactions => serenity::Permissions::ADD_REACTIONS,
        Permission::CreatePublicThreads => serenity::Permissions::CREATE_PUBLIC_THREADS,
        Permission::CreatePrivateThreads => serenity::Permissions::CREATE_PRIVATE_THREADS,
    }
}

fn permissions(list: &[Permission]) -> serenity::Permissions {
    list.iter()
        .fold(serenity::Permissions::empty(), |acc, p| acc | permission_flag(*p))
}

fn overwrite_kind(guild_id: u64, target: OverrideTarget) -> serenity::PermissionOverwriteType {
    match target {
        // @everyone role ID is same as guild ID
        OverrideTarget::Everyone => {
            serenity::PermissionOverwriteType::Role(serenity::RoleId::new(guild_id))
        }
        OverrideTarget::Role(id) => serenity::PermissionOverwriteType::Role(serenity::RoleId::new(id)),
        OverrideTarget::Member(id) => {
            serenity::PermissionOverwriteType::Member(serenity::UserId::new(id))
        }
    }
}

fn overwrite(guild_id: u64, o: &PermissionOverride) -> serenity::PermissionOverwrite {
    serenity::PermissionOverwrite {
        allow: permissions(&o.allow),
        deny: permissions(&o.deny),
        kind: overwrite_kind(guild_id, o.target),
    }
}

fn channel_type(kind: ChannelKind) -> serenity::ChannelType {
    match kind {
        ChannelKind::Text | ChannelKind::Other => serenity::ChannelType::Text,
        ChannelKind::Voice => serenity::ChannelType::Voice,
        ChannelKind::Stage => serenity::ChannelType::Stage,
        ChannelKind::Category => serenity::ChannelType::Category,
    }
}

fn channel_kind(kind: serenity::ChannelType) -> ChannelKind {
    match kind {
        serenity::ChannelType::Text | serenity::ChannelType::News => ChannelKind::Text,
        serenity::ChannelType::Voice => ChannelKind::Voice,
        serenity::ChannelType::Stage => ChannelKind::Stage,
        serenity::ChannelType::Category => ChannelKind::Category,
        _ => ChannelKind::Other,
    }
}

fn channel_info(channel: &serenity::GuildChannel) -> ChannelInfo {
    ChannelInfo {
        id: channel.id.get(),
        name: channel.name.clone(),
        kind: channel_kind(channel.kind),
        parent_id: channel.parent_id.map(|p| p.get()),
        position: channel.position,
    }
}

fn role_info(role: &serenity::Role) -> RoleInfo {
    RoleInfo {
        id: role.id.get(),
        name: role.name.clone(),
        managed: role.managed,
    }
}

pub fn create_embed(embed: &Embed) -> serenity::CreateEmbed {
    let mut builder = serenity::CreateEmbed::new();
    if let Some(title) = &embed.title {
        builder = builder.title(title);
    }
    if let Some(description) = &embed.description {
        builder = builder.description(description);
    }
    if let Some(color) = embed.color {
        builder = builder.color(color);
    }
    if let Some(author) = &embed.author {
        let mut a = serenity::CreateEmbedAuthor::new(&author.name);
        if let Some(icon) = &author.icon_url {
            a = a.icon_url(icon);
        }
        builder = builder.author(a);
    }
    for field in &embed.fields {
        builder = builder.field(&field.name, &field.value, field.inline);
    }
    if let Some(footer) = &embed.footer {
        let mut f = serenity::CreateEmbedFooter::new(footer);
        if let Some(icon) = &embed.footer_icon {
            f = f.icon_url(icon);
        }
        builder = builder.footer(f);
    }
    if let Some(image) = &embed.image_url {
        builder = builder.image(image);
    }
    if let Some(thumbnail) = &embed.thumbnail_url {
        builder = builder.thumbnail(thumbnail);
    }
    if let Some(at) = embed.timestamp {
        if let Ok(ts) = serenity::Timestamp::from_unix_timestamp(at.timestamp()) {
            builder = builder.timestamp(ts);
        }
    }
    builder
}

fn create_message(message: &OutgoingMessage) -> serenity::CreateMessage {
    let mut builder = serenity::CreateMessage::new().allowed_mentions(
        serenity::CreateAllowedMentions::new()
            .everyone(message.ping_everyone)
            .all_users(true),
    );
    if let Some(content) = &message.content {
        builder = builder.content(content);
    }
    if let Some(embed) = &message.embed {
        builder = builder.embed(create_embed(embed));
    }
    builder
}

pub fn to_utc(timestamp: serenity::Timestamp) -> DateTime<Utc> {
    // Display is RFC 3339 with sub-second precision.
    DateTime::parse_from_rfc3339(&timestamp.to_string())
        .map(|t| t.with_timezone(&Utc))
        .ok()
        .or_else(|| DateTime::<Utc>::from_timestamp(timestamp.unix_timestamp(), 0))
        .unwrap_or_else(Utc::now)
}

/// Convert a serenity message for the core. Also used by the quote context
/// menu, which receives the message directly.
pub fn chat_message(message: &serenity::Message) -> ChatMessage {
    ChatMessage {
        id: message.id.get(),
        guild_id: message.guild_id.map(|g| g.get()),
        channel_id: message.channel_id.get(),
        author_id: message.author.id.get(),
        author_name: message
            .author
            .global_name
            .clone()
            .unwrap_or_else(|| message.author.name.clone()),
        author_avatar: Some(message.author.face()),
        author_is_bot: message.author.bot,
        content: message.content.clone(),
        timestamp: to_utc(message.timestamp),
        attachments: message
            .attachments
            .iter()
            .map(|a| Attachment {
                url: a.url.clone(),
                content_type: a.content_type.clone(),
            })
            .collect(),
        reactions: message
            .reactions
            .iter()
            .map(|r| ReactionCount {
                emoji: r.reaction_type.to_string(),
                count: r.count,
            })
            .collect(),
        embed_titles: message.embeds.iter().filter_map(|e| e.title.clone()).collect(),
    }
}

// ============================================================================
// GATEWAY
// ============================================================================

#[async_trait]
impl PlatformGateway for SerenityGateway {
    async fn current_user_id(&self) -> Result<u64, PlatformError> {
        let user = self.http.get_current_user().await.platform("fetch current user")?;
        Ok(user.id.get())
    }

    async fn guilds(&self) -> Result<Vec<u64>, PlatformError> {
        let guilds = self.http.get_guilds(None, None).await.platform("list guilds")?;
        Ok(guilds.iter().map(|g| g.id.get()).collect())
    }

    async fn channels(&self, guild_id: u64) -> Result<Vec<ChannelInfo>, PlatformError> {
        let channels = serenity::GuildId::new(guild_id)
            .channels(self.http())
            .await
            .platform("list channels")?;
        let mut list: Vec<ChannelInfo> = channels.values().map(channel_info).collect();
        list.sort_by_key(|c| (c.position, c.id));
        Ok(list)
    }

    async fn roles(&self, guild_id: u64) -> Result<Vec<RoleInfo>, PlatformError> {
        let roles = serenity::GuildId::new(guild_id)
            .roles(self.http())
            .await
            .platform("list roles")?;
        Ok(roles.values().map(role_info).collect())
    }

    async fn create_role(&self, guild_id: u64, role: &NewRole) -> Result<RoleInfo, PlatformError> {
        let builder = serenity::EditRole::new()
            .name(&role.name)
            .permissions(permissions(&role.permissions))
            .colour(role.color)
            .hoist(role.hoist)
            .mentionable(role.mentionable);
        let created = serenity::GuildId::new(guild_id)
            .create_role(self.http(), builder)
            .await
            .platform("create role")?;
        Ok(role_info(&created))
    }

    async fn delete_role(&self, guild_id: u64, role_id: u64) -> Result<(), PlatformError> {
        serenity::GuildId::new(guild_id)
            .delete_role(self.http(), serenity::RoleId::new(role_id))
            .await
            .platform("delete role")
    }

    async fn add_member_role(
        &self,
        guild_id: u64,
        user_id: u64,
        role_id: u64,
    ) -> Result<(), PlatformError> {
        self.http
            .add_member_role(
                serenity::GuildId::new(guild_id),
                serenity::UserId::new(user_id),
                serenity::RoleId::new(role_id),
                None,
            )
            .await
            .platform("add member role")
    }

    async fn create_channel(
        &self,
        guild_id: u64,
        channel: &NewChannel,
    ) -> Result<ChannelInfo, PlatformError> {
        let mut builder = serenity::CreateChannel::new(&channel.name)
            .kind(channel_type(channel.kind))
            .permissions(channel.overrides.iter().map(|o| overwrite(guild_id, o)));
        if let Some(topic) = &channel.topic {
            builder = builder.topic(topic);
        }
        if let Some(parent) = channel.parent_id {
            builder = builder.category(serenity::ChannelId::new(parent));
        }
        if let Some(position) = channel.position {
            builder = builder.position(position);
        }

        let created = serenity::GuildId::new(guild_id)
            .create_channel(self.http(), builder)
            .await
            .platform("create channel")?;
        Ok(channel_info(&created))
    }

    async fn delete_channel(&self, channel_id: u64) -> Result<(), PlatformError> {
        serenity::ChannelId::new(channel_id)
            .delete(self.http())
            .await
            .platform("delete channel")?;
        Ok(())
    }

    async fn set_permission_override(
        &self,
        guild_id: u64,
        channel_id: u64,
        permission_override: &PermissionOverride,
    ) -> Result<(), PlatformError> {
        serenity::ChannelId::new(channel_id)
            .create_permission(self.http(), overwrite(guild_id, permission_override))
            .await
            .platform("set permissions")
    }

    async fn deny_permissions(
        &self,
        guild_id: u64,
        channel_id: u64,
        target: OverrideTarget,
        list: &[Permission],
    ) -> Result<(), PlatformError> {
        let flags = permissions(list);
        self.update_override(guild_id, channel_id, target, |allow, deny| {
            allow.remove(flags);
            deny.insert(flags);
        })
        .await
    }

    async fn clear_permissions(
        &self,
        guild_id: u64,
        channel_id: u64,
        target: OverrideTarget,
        list: &[Permission],
    ) -> Result<(), PlatformError> {
        let flags = permissions(list);
        self.update_override(guild_id, channel_id, target, |allow, deny| {
            allow.remove(flags);
            deny.remove(flags);
        })
        .await
    }

    async fn send_message(
        &self,
        channel_id: u64,
        message: &OutgoingMessage,
    ) -> Result<u64, PlatformError> {
        let sent = serenity::ChannelId::new(channel_id)
            .send_message(self.http(), create_message(message))
            .await
            .platform("send message")?;
        Ok(sent.id.get())
    }

    async fn edit_message(
        &self,
        channel_id: u64,
        message_id: u64,
        message: &OutgoingMessage,
    ) -> Result<(), PlatformError> {
        let builder = serenity::EditMessage::new()
            .content(message.content.clone().unwrap_or_default())
            .embeds(message.embed.iter().map(create_embed).collect());
        serenity::ChannelId::new(channel_id)
            .edit_message(self.http(), serenity::MessageId::new(message_id), builder)
            .await
            .platform("edit message")?;
        Ok(())
    }

    async fn delete_message(&self, channel_id: u64, message_id: u64) -> Result<(), PlatformError> {
        serenity::ChannelId::new(channel_id)
            .delete_message(self.http(), serenity::MessageId::new(message_id))
            .await
            .platform("delete message")
    }

    async fn fetch_message(
        &self,
        channel_id: u64,
        message_id: u64,
    ) -> Result<ChatMessage, PlatformError> {
        let message = serenity::ChannelId::new(channel_id)
            .message(self.http(), serenity::MessageId::new(message_id))
            .await
            .platform("fetch message")?;
        Ok(chat_message(&message))
    }

    async fn recent_messages(
        &self,
        channel_id: u64,
        limit: u8,
    ) -> Result<Vec<ChatMessage>, PlatformError> {
        let messages = serenity::ChannelId::new(channel_id)
            .messages(self.http(), serenity::GetMessages::new().limit(limit))
            .await
            .platform("fetch history")?;
        Ok(messages.iter().map(chat_message).collect())
    }

    async fn send_direct_message(
        &self,
        user_id: u64,
        message: &OutgoingMessage,
    ) -> Result<(), PlatformError> {
        serenity::UserId::new(user_id)
            .direct_message(self.http(), create_message(message))
            .await
            .platform("send direct message")?;
        Ok(())
    }

    async fn ban_member(
        &self,
        guild_id: u64,
        user_id: u64,
        delete_message_days: u8,
        reason: &str,
    ) -> Result<(), PlatformError> {
        serenity::GuildId::new(guild_id)
            .ban_with_reason(
                self.http(),
                serenity::UserId::new(user_id),
                delete_message_days,
                reason,
            )
            .await
            .platform("ban member")
    }

    async fn unban_member(&self, guild_id: u64, user_id: u64) -> Result<(), PlatformError> {
        serenity::GuildId::new(guild_id)
            .unban(self.http(), serenity::UserId::new(user_id))
            .await
            .platform("unban member")
    }

    async fn kick_member(
        &self,
        guild_id: u64,
        user_id: u64,
        reason: &str,
    ) -> Result<(), PlatformError> {
        serenity::GuildId::new(guild_id)
            .kick_with_reason(self.http(), serenity::UserId::new(user_id), reason)
            .await
            .platform("kick member")
    }

    async fn is_banned(&self, guild_id: u64, user_id: u64) -> Result<bool, PlatformError> {
        let guild = serenity::GuildId::new(guild_id);
        ban_listed(user_id, |after| async move {
            let target = after.map(|id| serenity::UserPagination::After(serenity::UserId::new(id)));
            guild
                .bans(self.http(), target, None)
                .await
                .map(|page| page.into_iter().map(|ban| ban.user.id.get()).collect())
                .platform("list bans")
        })
        .await
    }
}

/// Discord's default (and maximum) ban page size.
const BAN_PAGE_SIZE: usize = 1000;

/// Walk the ban list page by page until `user_id` turns up or a short page
/// ends it. `fetch_page` receives the last user id of the previous page.
async fn ban_listed<F, Fut>(user_id: u64, mut fetch_page: F) -> Result<bool, PlatformError>
where
    F: FnMut(Option<u64>) -> Fut,
    Fut: std::future::Future<Output = Result<Vec<u64>, PlatformError>>,
{
    let mut after = None;
    loop {
        let page = fetch_page(after).await?;
        if page.contains(&user_id) {
            return Ok(true);
        }
        if page.len() < BAN_PAGE_SIZE {
            return Ok(false);
        }
        after = page.iter().max().copied();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_flags_combine() {
        let flags = permissions(&[Permission::SendMessages, Permission::AddReactions]);
        assert!(flags.contains(serenity::Permissions::SEND_MESSAGES));
        assert!(flags.contains(serenity::Permissions::ADD_REACTIONS));
        assert!(!flags.contains(serenity::Permissions::VIEW_CHANNEL));
        assert!(permissions(&[]).is_empty());
    }

    #[test]
    fn test_everyone_targets_guild_role() {
        assert_eq!(
            overwrite_kind(55, OverrideTarget::Everyone),
            serenity::PermissionOverwriteType::Role(serenity::RoleId::new(55))
        );
        assert_eq!(
            overwrite_kind(55, OverrideTarget::Member(7)),
            serenity::PermissionOverwriteType::Member(serenity::UserId::new(7))
        );
    }

    #[test]
    fn test_channel_kind_mapping() {
        assert_eq!(channel_kind(serenity::ChannelType::News), ChannelKind::Text);
        assert_eq!(channel_kind(serenity::ChannelType::Category), ChannelKind::Category);
        assert_eq!(channel_type(ChannelKind::Stage), serenity::ChannelType::Stage);
    }

    #[test]
    fn test_non_http_errors_are_requests() {
        let err = map_error("send", serenity::Error::Other("boom"));
        assert!(matches!(err, PlatformError::Request(_)));
        assert!(!err.is_expected());
    }

    /// Serves `total` sorted ban ids in pages, recording each `after` cursor.
    fn paged_bans(
        total: u64,
        cursors: &std::sync::Mutex<Vec<Option<u64>>>,
        after: Option<u64>,
    ) -> Result<Vec<u64>, PlatformError> {
        cursors.lock().unwrap().push(after);
        let start = after.map_or(1, |id| id + 1);
        Ok((start..=total).take(BAN_PAGE_SIZE).collect())
    }

    #[tokio::test]
    async fn test_ban_found_past_first_page() {
        let cursors = std::sync::Mutex::new(Vec::new());
        let found = ban_listed(2_400, |after| {
            let page = paged_bans(2_500, &cursors, after);
            async move { page }
        })
        .await
        .unwrap();

        assert!(found);
        assert_eq!(*cursors.lock().unwrap(), vec![None, Some(1_000), Some(2_000)]);
    }

    #[tokio::test]
    async fn test_ban_missing_after_full_pages() {
        let cursors = std::sync::Mutex::new(Vec::new());
        let found = ban_listed(9_999, |after| {
            let page = paged_bans(2_000, &cursors, after);
            async move { page }
        })
        .await
        .unwrap();

        assert!(!found);
        // The empty third page ends the walk.
        assert_eq!(cursors.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_ban_page_errors_propagate() {
        let result = ban_listed(1, |_| async {
            Err(PlatformError::MissingPermissions("list bans".into()))
        })
        .await;
        assert!(matches!(result, Err(PlatformError::MissingPermissions(_))));
    }

    #[test]
    fn test_to_utc_keeps_subseconds() {
        let timestamp = serenity::Timestamp::parse("2024-03-01T12:00:09.750+00:00").unwrap();
        let converted = to_utc(timestamp);
        assert_eq!(converted.timestamp(), 1_709_294_409);
        assert_eq!(converted.timestamp_subsec_millis(), 750);
    }
}

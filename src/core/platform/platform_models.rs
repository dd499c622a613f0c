// Platform domain models - the shapes the core exchanges with the chat platform.
//
// These are plain data types with no Discord dependencies. The infra layer
// translates them to and from serenity builders.

use chrono::{DateTime, Utc};

pub const COLOR_GREEN: u32 = 0x00ff00;
pub const COLOR_RED: u32 = 0xff0000;
pub const COLOR_ORANGE: u32 = 0xffa500;
pub const COLOR_SOFT_RED: u32 = 0xff6b6b;
pub const COLOR_GOLD: u32 = 0xffd700;
pub const COLOR_BLURPLE: u32 = 0x5865f2;
pub const COLOR_STAFF: u32 = 0x7289da;

/// A single embed field.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// Platform-agnostic embed payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Embed {
    pub title: Option<String>,
    pub description: Option<String>,
    pub color: Option<u32>,
    pub author: Option<EmbedAuthor>,
    pub fields: Vec<EmbedField>,
    pub footer: Option<String>,
    pub footer_icon: Option<String>,
    pub image_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmbedAuthor {
    pub name: String,
    pub icon_url: Option<String>,
}

impl Embed {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn untitled() -> Self {
        Self::default()
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }

    pub fn author(mut self, name: impl Into<String>, icon_url: Option<String>) -> Self {
        self.author = Some(EmbedAuthor {
            name: name.into(),
            icon_url,
        });
        self
    }

    pub fn footer(mut self, text: impl Into<String>) -> Self {
        self.footer = Some(text.into());
        self
    }

    pub fn footer_icon(mut self, url: Option<String>) -> Self {
        self.footer_icon = url;
        self
    }

    pub fn image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    pub fn thumbnail(mut self, url: impl Into<String>) -> Self {
        self.thumbnail_url = Some(url.into());
        self
    }

    pub fn timestamp(mut self, at: DateTime<Utc>) -> Self {
        self.timestamp = Some(at);
        self
    }

    /// Look up a field value by name. Mostly useful in tests and for
    /// duplicate detection.
    pub fn field_value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }
}

/// A message the core wants to send or edit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutgoingMessage {
    pub content: Option<String>,
    pub embed: Option<Embed>,
    /// Allow the content to ping @everyone.
    pub ping_everyone: bool,
}

impl OutgoingMessage {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn embed(embed: Embed) -> Self {
        Self {
            embed: Some(embed),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    Text,
    Voice,
    Stage,
    Category,
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChannelInfo {
    pub id: u64,
    pub name: String,
    pub kind: ChannelKind,
    pub parent_id: Option<u64>,
    pub position: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoleInfo {
    pub id: u64,
    pub name: String,
    /// Roles owned by integrations (bots, boosts) cannot be deleted.
    pub managed: bool,
}

/// Permissions the bot grants or denies through roles and overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    Administrator,
    ManageGuild,
    ManageRoles,
    ManageChannels,
    ManageMessages,
    KickMembers,
    MuteMembers,
    MoveMembers,
    PrioritySpeaker,
    ViewChannel,
    SendMessages,
    AttachFiles,
    AddReactions,
    CreatePublicThreads,
    CreatePrivateThreads,
}

/// Who a channel permission override applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverrideTarget {
    Everyone,
    Role(u64),
    Member(u64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PermissionOverride {
    pub target: OverrideTarget,
    pub allow: Vec<Permission>,
    pub deny: Vec<Permission>,
}

impl PermissionOverride {
    pub fn hidden(target: OverrideTarget) -> Self {
        Self {
            target,
            allow: Vec::new(),
            deny: vec![Permission::ViewChannel],
        }
    }

    pub fn visible(target: OverrideTarget) -> Self {
        Self {
            target,
            allow: vec![Permission::ViewChannel],
            deny: Vec::new(),
        }
    }

    pub fn visible_and_writable(target: OverrideTarget) -> Self {
        Self {
            target,
            allow: vec![Permission::ViewChannel, Permission::SendMessages],
            deny: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewRole {
    pub name: String,
    pub permissions: Vec<Permission>,
    pub color: u32,
    pub hoist: bool,
    pub mentionable: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewChannel {
    pub name: String,
    pub kind: ChannelKind,
    pub topic: Option<String>,
    pub parent_id: Option<u64>,
    pub position: Option<u16>,
    pub overrides: Vec<PermissionOverride>,
}

impl NewChannel {
    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ChannelKind::Text,
            topic: None,
            parent_id: None,
            position: None,
            overrides: Vec::new(),
        }
    }

    pub fn category(name: impl Into<String>) -> Self {
        Self {
            kind: ChannelKind::Category,
            ..Self::text(name)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub url: String,
    pub content_type: Option<String>,
}

impl Attachment {
    pub fn is_image(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| ct.starts_with("image/"))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReactionCount {
    pub emoji: String,
    pub count: u64,
}

/// A message read back from the platform.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: u64,
    pub guild_id: Option<u64>,
    pub channel_id: u64,
    pub author_id: u64,
    pub author_name: String,
    pub author_avatar: Option<String>,
    pub author_is_bot: bool,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub attachments: Vec<Attachment>,
    pub reactions: Vec<ReactionCount>,
    pub embed_titles: Vec<String>,
}

impl ChatMessage {
    pub fn jump_url(&self) -> String {
        let guild = self
            .guild_id
            .map(|g| g.to_string())
            .unwrap_or_else(|| "@me".to_string());
        format!(
            "https://discord.com/channels/{}/{}/{}",
            guild, self.channel_id, self.id
        )
    }
}

/// Mention syntax helpers, kept here so the core can build message text
/// without pulling in the SDK.
pub fn user_mention(user_id: u64) -> String {
    format!("<@{}>", user_id)
}

pub fn channel_mention(channel_id: u64) -> String {
    format!("<#{}>", channel_id)
}

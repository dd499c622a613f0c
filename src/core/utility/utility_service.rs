// Utility service - announcements, rules editing, channel locks and quotes.
//
// Permission checks that need the invoker's session (server owner) live in
// the command layer. Checks that need stored state, like which roles count
// as staff for announcements, live here.

use super::quote::{self, parse_message_link};
use super::utility_models::{AnnounceOutcome, Invoker, LOCK_PERMISSIONS};
use crate::core::bot_data::{BotDataStore, StoreError};
use crate::core::platform::{
    channel_mention, user_mention, ChannelInfo, ChannelKind, Embed, NewChannel, OutgoingMessage,
    OverrideTarget, PlatformError, PlatformGateway, COLOR_GOLD, COLOR_GREEN, COLOR_SOFT_RED,
};
use crate::core::templates::template_rules::{self, RULES_CHANNEL_NAME};
use crate::core::templates::{template_service::applied_template, ServerTemplate};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum UtilityError {
    #[error("Invalid message link format! Please use the 'Copy Message Link' option.")]
    InvalidLink,

    #[error("Rules channel not found! Apply a template first.")]
    RulesChannelMissing,

    #[error("Please provide at least one rule.")]
    NoRules,

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),
}

const ANNOUNCEMENTS_CATEGORY_NAME: &str = "📢 ANNOUNCEMENTS";
const ANNOUNCEMENTS_CHANNEL_NAME: &str = "📢announcements";
/// How many messages /editrules clears before posting.
const RULES_PURGE_LIMIT: u8 = 10;

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct UtilityService<S: BotDataStore, G: PlatformGateway> {
    store: Arc<S>,
    gateway: Arc<G>,
}

impl<S: BotDataStore, G: PlatformGateway> UtilityService<S, G> {
    pub fn new(store: Arc<S>, gateway: Arc<G>) -> Self {
        Self { store, gateway }
    }

    /// Whether a member holding `member_roles` may post announcements.
    /// Staff roles come from the applied template, or from every template
    /// when none was applied.
    pub async fn is_staff(&self, guild_id: u64, member_roles: &[u64]) -> Result<bool, UtilityError> {
        let staff_names: Vec<&'static str> = match applied_template(self.store.as_ref(), guild_id).await? {
            Some(template) => staff_role_names(template),
            None => ServerTemplate::all()
                .into_iter()
                .flat_map(staff_role_names)
                .collect(),
        };

        let roles = self.gateway.roles(guild_id).await?;
        Ok(roles
            .iter()
            .filter(|r| staff_names.contains(&r.name.as_str()))
            .any(|r| member_roles.contains(&r.id)))
    }

    pub async fn announce(
        &self,
        guild_id: u64,
        message: &str,
        author: &Invoker,
    ) -> Result<AnnounceOutcome, UtilityError> {
        let channels = self.gateway.channels(guild_id).await?;
        let (channel_id, created_channel) = match find_announcements(&channels) {
            Some(id) => (id, false),
            None => (self.create_announcements(guild_id, &channels).await?, true),
        };

        let embed = Embed::new("📢 Server Announcement")
            .description(message)
            .color(COLOR_GOLD)
            .timestamp(Utc::now())
            .author(author.display_name.as_str(), author.avatar_url.clone())
            .footer(format!("Announcement by {}", author.display_name));

        let ping = OutgoingMessage {
            content: Some("@everyone".to_string()),
            embed: Some(embed.clone()),
            ping_everyone: true,
        };
        let pinged = match self.gateway.send_message(channel_id, &ping).await {
            Ok(_) => true,
            Err(PlatformError::MissingPermissions(e)) => {
                debug!(guild_id, channel_id, "Announcing without ping: {}", e);
                self.gateway
                    .send_message(channel_id, &OutgoingMessage::embed(embed))
                    .await?;
                false
            }
            Err(e) => return Err(e.into()),
        };

        info!(guild_id, channel_id, user_id = author.id, pinged, "Announcement posted");
        Ok(AnnounceOutcome {
            channel_id,
            pinged,
            created_channel,
        })
    }

    /// Create the announcements channel under the welcome category, or
    /// under a new announcements category.
    async fn create_announcements(
        &self,
        guild_id: u64,
        channels: &[ChannelInfo],
    ) -> Result<u64, UtilityError> {
        let welcome = channels
            .iter()
            .find(|c| c.kind == ChannelKind::Category && c.name.to_uppercase().contains("WELCOME"))
            .map(|c| c.id);

        let parent_id = match welcome {
            Some(id) => id,
            None => {
                self.gateway
                    .create_channel(guild_id, &NewChannel::category(ANNOUNCEMENTS_CATEGORY_NAME))
                    .await?
                    .id
            }
        };

        let channel = NewChannel {
            topic: Some("Important server announcements".into()),
            parent_id: Some(parent_id),
            ..NewChannel::text(ANNOUNCEMENTS_CHANNEL_NAME)
        };
        let created = self.gateway.create_channel(guild_id, &channel).await?;
        info!(guild_id, channel_id = created.id, "Created announcements channel");
        Ok(created.id)
    }

    /// Replace the posted rules with `rules_text`, one rule per line.
    /// Returns how many rules were posted.
    pub async fn edit_rules(
        &self,
        guild_id: u64,
        rules_text: &str,
        editor_id: u64,
        at: DateTime<Utc>,
    ) -> Result<usize, UtilityError> {
        let rules = template_rules::parse_rules(rules_text);
        if rules.is_empty() {
            return Err(UtilityError::NoRules);
        }

        let channels = self.gateway.channels(guild_id).await?;
        let text = || channels.iter().filter(|c| c.kind == ChannelKind::Text);
        let channel_id = text()
            .find(|c| c.name == RULES_CHANNEL_NAME)
            .or_else(|| text().find(|c| template_rules::is_rules_channel_name(&c.name)))
            .map(|c| c.id)
            .ok_or(UtilityError::RulesChannelMissing)?;

        for old in self.gateway.recent_messages(channel_id, RULES_PURGE_LIMIT).await? {
            if let Err(e) = self.gateway.delete_message(channel_id, old.id).await {
                if !e.is_expected() {
                    warn!(guild_id, channel_id, "Could not purge old rules message: {}", e);
                }
            }
        }

        let embed = template_rules::edited_rules_embed(&rules, editor_id, at);
        self.gateway
            .send_message(channel_id, &OutgoingMessage::embed(embed))
            .await?;

        info!(guild_id, user_id = editor_id, rules = rules.len(), "Rules edited");
        Ok(rules.len())
    }

    /// Stop @everyone from talking in a channel and post a notice there.
    pub async fn lock_channel(
        &self,
        guild_id: u64,
        channel_id: u64,
        actor: &Invoker,
    ) -> Result<(), UtilityError> {
        self.gateway
            .deny_permissions(guild_id, channel_id, OverrideTarget::Everyone, LOCK_PERMISSIONS)
            .await?;

        let embed = lock_notice("🔒 Channel Locked", "locked", COLOR_SOFT_RED, channel_id, actor);
        self.gateway
            .send_message(channel_id, &OutgoingMessage::embed(embed))
            .await?;
        info!(guild_id, channel_id, user_id = actor.id, "Channel locked");
        Ok(())
    }

    /// Reset the lock permissions to neutral and post a notice.
    pub async fn unlock_channel(
        &self,
        guild_id: u64,
        channel_id: u64,
        actor: &Invoker,
    ) -> Result<(), UtilityError> {
        self.gateway
            .clear_permissions(guild_id, channel_id, OverrideTarget::Everyone, LOCK_PERMISSIONS)
            .await?;

        let embed = lock_notice("🔓 Channel Unlocked", "unlocked", COLOR_GREEN, channel_id, actor);
        self.gateway
            .send_message(channel_id, &OutgoingMessage::embed(embed))
            .await?;
        info!(guild_id, channel_id, user_id = actor.id, "Channel unlocked");
        Ok(())
    }

    /// Fetch the linked message and build its quote embed.
    pub async fn quote(
        &self,
        link: &str,
        quoter: &Invoker,
        reply: Option<&str>,
    ) -> Result<Embed, UtilityError> {
        let target = parse_message_link(link).ok_or(UtilityError::InvalidLink)?;
        let message = self
            .gateway
            .fetch_message(target.channel_id, target.message_id)
            .await?;

        let channel_name = match self.gateway.channels(target.guild_id).await {
            Ok(channels) => channels
                .into_iter()
                .find(|c| c.id == target.channel_id)
                .map(|c| c.name),
            Err(e) => {
                debug!(guild_id = target.guild_id, "Channel lookup for quote failed: {}", e);
                None
            }
        };

        Ok(quote::quote_embed(&message, channel_name.as_deref(), quoter, reply))
    }
}

fn staff_role_names(template: &'static ServerTemplate) -> Vec<&'static str> {
    template
        .roles
        .iter()
        .filter(|r| r.is_staff())
        .map(|r| r.name)
        .collect()
}

fn find_announcements(channels: &[ChannelInfo]) -> Option<u64> {
    channels
        .iter()
        .filter(|c| c.kind == ChannelKind::Text && c.name.to_lowercase().contains("announcements"))
        .min_by_key(|c| c.position)
        .map(|c| c.id)
}

fn lock_notice(title: &str, verb: &str, color: u32, channel_id: u64, actor: &Invoker) -> Embed {
    Embed::new(title)
        .description(format!(
            "{} has been {} by {}.",
            channel_mention(channel_id),
            verb,
            user_mention(actor.id)
        ))
        .color(color)
        .timestamp(Utc::now())
        .footer(format!("{}{} by {}", verb[..1].to_uppercase(), &verb[1..], actor.display_name))
        .footer_icon(actor.avatar_url.clone())
}

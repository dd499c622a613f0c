// Template service - destructive server setup from a static template.
//
// Applying a template wipes every channel and category, clears roles left
// behind by earlier templates and then rebuilds the guild step by step.
// There is no rollback: individual failures are logged and counted, only a
// failure to list the guild's channels aborts the run.

use super::setup_progress::SetupProgress;
use super::template_definitions::{RoleTier, ServerTemplate, TemplateId};
use super::template_rules::{self, RULES_CHANNEL_NAME};
use crate::core::bot_data::{BotDataStore, ServerConfig, StoreError};
use crate::core::platform::{
    ChannelInfo, ChannelKind, Embed, NewChannel, NewRole, OutgoingMessage, OverrideTarget,
    PermissionOverride, PlatformError, PlatformGateway, COLOR_GREEN, COLOR_RED, COLOR_STAFF,
};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),
}

// ============================================================================
// MODELS
// ============================================================================

/// Counts reported back to the invoker once setup finishes.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplySummary {
    pub template: TemplateId,
    pub channels_deleted: usize,
    pub roles_deleted: usize,
    /// Template roles that exist after setup, created or reused
    pub roles_configured: usize,
    pub roles_created: usize,
    pub categories_created: usize,
    pub channels_created: usize,
    pub rules_channel_id: Option<u64>,
    pub staff_channel_id: Option<u64>,
    /// Individual platform calls that failed along the way
    pub failures: usize,
}

impl ApplySummary {
    fn new(template: TemplateId) -> Self {
        Self {
            template,
            channels_deleted: 0,
            roles_deleted: 0,
            roles_configured: 0,
            roles_created: 0,
            categories_created: 0,
            channels_created: 0,
            rules_channel_id: None,
            staff_channel_id: None,
            failures: 0,
        }
    }
}

const PROGRESS_CATEGORY_NAME: &str = "⚙️ Setup Progress";
const PROGRESS_CHANNEL_NAME: &str = "setup-progress";

/// Pause between platform calls during setup, to stay clear of rate limits.
pub const DEFAULT_STEP_DELAY: Duration = Duration::from_millis(500);

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct TemplateService<S: BotDataStore, G: PlatformGateway> {
    store: Arc<S>,
    gateway: Arc<G>,
    staff_channel_name: String,
    step_delay: Duration,
}

impl<S: BotDataStore, G: PlatformGateway> TemplateService<S, G> {
    pub fn new(store: Arc<S>, gateway: Arc<G>, staff_channel_name: impl Into<String>) -> Self {
        Self {
            store,
            gateway,
            staff_channel_name: staff_channel_name.into(),
            step_delay: DEFAULT_STEP_DELAY,
        }
    }

    pub fn with_step_delay(mut self, step_delay: Duration) -> Self {
        self.step_delay = step_delay;
        self
    }

    /// Wipe the guild and rebuild it from `template_id`.
    pub async fn apply(
        &self,
        guild_id: u64,
        template_id: TemplateId,
        invoker_id: u64,
        invoker_name: &str,
    ) -> Result<ApplySummary, TemplateError> {
        let template = ServerTemplate::get(template_id);
        let mut summary = ApplySummary::new(template_id);

        info!(
            guild_id,
            user_id = invoker_id,
            template = template_id.as_str(),
            "Applying server template"
        );

        let bot_id = self.gateway.current_user_id().await?;
        let existing = self.gateway.channels(guild_id).await?;

        let first_text = first_text_channel(&existing);
        let mut progress = SetupProgress::new(self.gateway.as_ref(), invoker_id, first_text);
        progress.update("🔄 **Starting template setup...** (0%)").await;
        progress.update("🗑️ **Deleting all existing channels...** (25%)").await;

        self.delete_all_channels(&existing, &mut summary).await;
        summary.roles_deleted = self.delete_template_roles(guild_id, &mut summary).await;

        let progress_channel = self.create_progress_channel(guild_id, &mut summary).await;
        progress.move_to(progress_channel);
        progress.update("🔄 **Creating roles...** (50%)").await;

        let roles = self.create_roles(guild_id, template, &mut summary).await;

        progress.update("🔄 **Creating categories...** (75%)").await;
        let categories = self.create_categories(guild_id, template, &mut summary).await;

        progress.update("🔄 **Creating channels...** (90%)").await;
        self.create_channels(guild_id, template, &categories, &mut summary)
            .await;

        progress.update("🔄 **Setting up additional features...** (95%)").await;

        summary.rules_channel_id = self
            .setup_rules_channel(guild_id, template, &roles, &categories, bot_id, &mut summary)
            .await;
        summary.staff_channel_id = self
            .setup_staff_channel(guild_id, template, &roles, bot_id, &mut summary)
            .await;
        self.lock_staff_category(guild_id, template, &roles, &categories, &mut summary)
            .await;

        self.store
            .set_welcome_message(guild_id, template.welcome.to_string())
            .await?;
        self.store
            .save_server_config(
                guild_id,
                ServerConfig {
                    template: Some(template_id.as_str().to_string()),
                    applied_at: Some(Utc::now()),
                },
            )
            .await?;

        progress.update("🔄 **Finalizing setup...** (100%)").await;

        let fallback = match self.gateway.channels(guild_id).await {
            Ok(channels) => first_text_channel(&channels),
            Err(_) => None,
        };
        let embed = completion_embed(template, &summary, invoker_name, &self.staff_channel_name);
        if !progress.finish(embed, fallback).await {
            warn!(guild_id, "Could not deliver the template completion summary");
        }

        info!(
            guild_id,
            template = template_id.as_str(),
            roles = summary.roles_configured,
            categories = summary.categories_created,
            channels = summary.channels_created,
            failures = summary.failures,
            "Server template applied"
        );

        Ok(summary)
    }

    async fn pause(&self) {
        if !self.step_delay.is_zero() {
            tokio::time::sleep(self.step_delay).await;
        }
    }

    /// Channels first, categories last, so children never outlive a parent
    /// mid-run.
    async fn delete_all_channels(&self, existing: &[ChannelInfo], summary: &mut ApplySummary) {
        let (categories, channels): (Vec<&ChannelInfo>, Vec<&ChannelInfo>) = existing
            .iter()
            .partition(|c| c.kind == ChannelKind::Category);

        for channel in channels.into_iter().chain(categories) {
            match self.gateway.delete_channel(channel.id).await {
                Ok(()) => summary.channels_deleted += 1,
                Err(e) => {
                    warn!(channel_id = channel.id, "Error deleting channel {}: {}", channel.name, e);
                    summary.failures += 1;
                }
            }
            self.pause().await;
        }
    }

    /// Remove roles any template created, so reapplying does not pile them up.
    async fn delete_template_roles(&self, guild_id: u64, summary: &mut ApplySummary) -> usize {
        let roles = match self.gateway.roles(guild_id).await {
            Ok(roles) => roles,
            Err(e) => {
                warn!(guild_id, "Could not list roles for cleanup: {}", e);
                summary.failures += 1;
                return 0;
            }
        };

        let template_names = ServerTemplate::all_role_names();
        let mut deleted = 0;
        for role in roles {
            if role.managed || role.name == "@everyone" || role.id == guild_id {
                continue;
            }
            if !template_names.contains(&role.name.as_str()) {
                continue;
            }
            match self.gateway.delete_role(guild_id, role.id).await {
                Ok(()) => {
                    debug!(guild_id, "Deleted template role {}", role.name);
                    deleted += 1;
                }
                Err(e) => {
                    warn!(guild_id, "Error deleting role {}: {}", role.name, e);
                    summary.failures += 1;
                }
            }
            self.pause().await;
        }
        deleted
    }

    async fn create_progress_channel(
        &self,
        guild_id: u64,
        summary: &mut ApplySummary,
    ) -> Option<u64> {
        let category = match self
            .gateway
            .create_channel(guild_id, &NewChannel::category(PROGRESS_CATEGORY_NAME))
            .await
        {
            Ok(category) => category,
            Err(e) => {
                warn!(guild_id, "Could not create the setup progress category: {}", e);
                summary.failures += 1;
                return None;
            }
        };

        let channel = NewChannel {
            parent_id: Some(category.id),
            ..NewChannel::text(PROGRESS_CHANNEL_NAME)
        };
        match self.gateway.create_channel(guild_id, &channel).await {
            Ok(channel) => Some(channel.id),
            Err(e) => {
                warn!(guild_id, "Could not create the setup progress channel: {}", e);
                summary.failures += 1;
                None
            }
        }
    }

    /// Create template roles, reusing any same-named role still present.
    /// Returns role ids keyed by template role key.
    async fn create_roles(
        &self,
        guild_id: u64,
        template: &ServerTemplate,
        summary: &mut ApplySummary,
    ) -> HashMap<&'static str, u64> {
        let existing = match self.gateway.roles(guild_id).await {
            Ok(roles) => roles,
            Err(e) => {
                warn!(guild_id, "Could not list roles: {}", e);
                summary.failures += 1;
                Vec::new()
            }
        };

        let mut mapping = HashMap::new();
        for spec in template.roles {
            if let Some(role) = existing.iter().find(|r| r.name == spec.name) {
                mapping.insert(spec.key, role.id);
                continue;
            }

            let new_role = NewRole {
                name: spec.name.to_string(),
                permissions: spec.permissions.to_vec(),
                color: spec.color,
                hoist: spec.hoist(),
                mentionable: spec.mentionable(),
            };
            match self.gateway.create_role(guild_id, &new_role).await {
                Ok(role) => {
                    mapping.insert(spec.key, role.id);
                    summary.roles_created += 1;
                }
                Err(e) => {
                    warn!(guild_id, "Role creation error for {}: {}", spec.name, e);
                    summary.failures += 1;
                }
            }
            self.pause().await;
        }

        summary.roles_configured = mapping.len();
        mapping
    }

    async fn create_categories(
        &self,
        guild_id: u64,
        template: &ServerTemplate,
        summary: &mut ApplySummary,
    ) -> HashMap<&'static str, u64> {
        let mut ordered: Vec<_> = template.categories.iter().collect();
        ordered.sort_by_key(|c| c.position);

        let mut mapping = HashMap::new();
        for spec in ordered {
            let category = NewChannel {
                position: Some(spec.position),
                ..NewChannel::category(spec.name)
            };
            match self.gateway.create_channel(guild_id, &category).await {
                Ok(created) => {
                    mapping.insert(spec.key, created.id);
                    summary.categories_created += 1;
                }
                Err(e) => {
                    warn!(guild_id, "Category creation error for {}: {}", spec.name, e);
                    summary.failures += 1;
                }
            }
            self.pause().await;
        }
        mapping
    }

    async fn create_channels(
        &self,
        guild_id: u64,
        template: &ServerTemplate,
        categories: &HashMap<&'static str, u64>,
        summary: &mut ApplySummary,
    ) {
        for category in template.categories {
            let Some(&parent_id) = categories.get(category.key) else {
                continue;
            };

            for spec in category.channels {
                let channel = NewChannel {
                    name: spec.name.to_string(),
                    kind: spec.kind,
                    topic: spec.topic.map(str::to_string),
                    parent_id: Some(parent_id),
                    position: None,
                    overrides: Vec::new(),
                };
                match self.gateway.create_channel(guild_id, &channel).await {
                    Ok(_) => summary.channels_created += 1,
                    Err(e) => {
                        warn!(guild_id, "Channel creation error for {}: {}", spec.name, e);
                        summary.failures += 1;
                    }
                }
                self.pause().await;
            }
        }
    }

    /// Reuse a rules channel from the welcome category, or create the private
    /// rules channel, then post the template rules once.
    async fn setup_rules_channel(
        &self,
        guild_id: u64,
        template: &ServerTemplate,
        roles: &HashMap<&'static str, u64>,
        categories: &HashMap<&'static str, u64>,
        bot_id: u64,
        summary: &mut ApplySummary,
    ) -> Option<u64> {
        let existing = match categories.get("welcome") {
            Some(&welcome_id) => self
                .gateway
                .channels(guild_id)
                .await
                .unwrap_or_default()
                .into_iter()
                .find(|c| {
                    c.kind == ChannelKind::Text
                        && c.parent_id == Some(welcome_id)
                        && template_rules::is_rules_channel_name(&c.name)
                })
                .map(|c| c.id),
            None => None,
        };

        let channel_id = match existing {
            Some(id) => id,
            None => {
                let mut overrides = vec![PermissionOverride::hidden(OverrideTarget::Everyone)];
                if let Some(&owner) = roles.get("owner") {
                    overrides.push(PermissionOverride::visible_and_writable(OverrideTarget::Role(
                        owner,
                    )));
                }
                overrides.push(PermissionOverride::visible_and_writable(OverrideTarget::Member(
                    bot_id,
                )));

                let channel = NewChannel {
                    topic: Some("Server rules configuration - Only Owner & Bot can access".into()),
                    overrides,
                    ..NewChannel::text(RULES_CHANNEL_NAME)
                };
                match self.gateway.create_channel(guild_id, &channel).await {
                    Ok(created) => created.id,
                    Err(e) => {
                        warn!(guild_id, "Rules channel setup error: {}", e);
                        summary.failures += 1;
                        return None;
                    }
                }
            }
        };

        if let Err(e) = self.post_rules(channel_id, template.rules).await {
            warn!(guild_id, channel_id, "Posting template rules failed: {}", e);
            summary.failures += 1;
        }
        Some(channel_id)
    }

    /// Post the rules embed unless one is among the channel's last messages.
    async fn post_rules(&self, channel_id: u64, rules: &[&str]) -> Result<(), PlatformError> {
        match self.gateway.recent_messages(channel_id, 5).await {
            Ok(recent) if template_rules::has_rules_message(&recent) => {
                debug!(channel_id, "Rules already posted");
                return Ok(());
            }
            Ok(_) => {}
            Err(e) => debug!(channel_id, "Could not check rules history: {}", e),
        }

        let message = OutgoingMessage::embed(template_rules::rules_embed(rules));
        self.gateway.send_message(channel_id, &message).await?;
        Ok(())
    }

    async fn setup_staff_channel(
        &self,
        guild_id: u64,
        template: &ServerTemplate,
        roles: &HashMap<&'static str, u64>,
        bot_id: u64,
        summary: &mut ApplySummary,
    ) -> Option<u64> {
        let mut overrides = vec![PermissionOverride::hidden(OverrideTarget::Everyone)];
        overrides.extend(
            template
                .roles
                .iter()
                .filter(|r| r.is_staff())
                .filter_map(|r| roles.get(r.key))
                .map(|&id| PermissionOverride::visible_and_writable(OverrideTarget::Role(id))),
        );
        overrides.push(PermissionOverride::visible_and_writable(OverrideTarget::Member(
            bot_id,
        )));

        let channel = NewChannel {
            topic: Some("Staff discussions and coordination".into()),
            overrides,
            ..NewChannel::text(self.staff_channel_name.as_str())
        };
        let created = match self.gateway.create_channel(guild_id, &channel).await {
            Ok(created) => created,
            Err(e) => {
                warn!(guild_id, "Staff channel setup error: {}", e);
                summary.failures += 1;
                return None;
            }
        };

        let embed = Embed::new("👋 Welcome to Staff Chat")
            .description(
                "This channel is for staff discussions, coordination, and important server matters.",
            )
            .color(COLOR_STAFF)
            .field(
                "Available Commands",
                "• `/announce` - Make server announcements\n• `/welcome` - Set welcome message\n• `/editrules` - Modify server rules",
                false,
            );
        if let Err(e) = self
            .gateway
            .send_message(created.id, &OutgoingMessage::embed(embed))
            .await
        {
            warn!(guild_id, "Staff welcome message failed: {}", e);
            summary.failures += 1;
        }

        Some(created.id)
    }

    /// Hide the staff category from everyone but the moderator role.
    async fn lock_staff_category(
        &self,
        guild_id: u64,
        template: &ServerTemplate,
        roles: &HashMap<&'static str, u64>,
        categories: &HashMap<&'static str, u64>,
        summary: &mut ApplySummary,
    ) {
        let Some(&staff_category) = categories.get("staff") else {
            return;
        };

        let mut overrides = vec![PermissionOverride::hidden(OverrideTarget::Everyone)];
        let moderator = template
            .role("moderator")
            .or_else(|| template.roles.iter().rev().find(|r| r.tier == RoleTier::Staff))
            .and_then(|spec| roles.get(spec.key));
        if let Some(&role_id) = moderator {
            overrides.push(PermissionOverride::visible(OverrideTarget::Role(role_id)));
        }

        for overwrite in &overrides {
            if let Err(e) = self
                .gateway
                .set_permission_override(guild_id, staff_category, overwrite)
                .await
            {
                warn!(guild_id, "Staff category permission error: {}", e);
                summary.failures += 1;
            }
        }
    }
}

/// Look up the template recorded for a guild.
pub async fn applied_template<S: BotDataStore + ?Sized>(
    store: &S,
    guild_id: u64,
) -> Result<Option<&'static ServerTemplate>, StoreError> {
    Ok(store
        .get_server_config(guild_id)
        .await?
        .and_then(|config| config.template)
        .and_then(|key| TemplateId::from_str(&key))
        .map(ServerTemplate::get))
}

fn first_text_channel(channels: &[ChannelInfo]) -> Option<u64> {
    channels
        .iter()
        .filter(|c| c.kind == ChannelKind::Text)
        .min_by_key(|c| c.position)
        .map(|c| c.id)
}

// ============================================================================
// EMBEDS
// ============================================================================

pub fn catalog_embed() -> Embed {
    let mut embed = Embed::new("🎨 Available Server Templates")
        .description("Choose one of these layouts:")
        .color(COLOR_STAFF);

    for template in ServerTemplate::all() {
        embed = embed.field(
            template.display_name(),
            format!(
                "{}\n{} roles • {} categories • {} channels\nUse `/apply {}`",
                template.description,
                template.roles.len(),
                template.categories.len(),
                template.channel_count(),
                template.id.as_str()
            ),
            false,
        );
    }

    embed.footer("Applying a template deletes every existing channel")
}

pub fn apply_warning_embed(template: &ServerTemplate) -> Embed {
    Embed::new(format!("⚠️ DANGEROUS ACTION: Applying {}", template.name))
        .description("**THIS WILL DELETE ALL EXISTING CHANNELS AND CATEGORIES!**")
        .color(COLOR_RED)
        .field(
            "🚨 WARNING",
            "• All current channels will be PERMANENTLY deleted\n• All categories will be removed\n• Only roles and members will be preserved\n• This action cannot be undone!",
            false,
        )
        .field(
            "New Template Includes",
            format!(
                "• {} Roles\n• {} Categories\n• {} Channels",
                template.roles.len(),
                template.categories.len(),
                template.channel_count()
            ),
            false,
        )
        .field("Estimated Time", "60-90 seconds", true)
}

fn completion_embed(
    template: &ServerTemplate,
    summary: &ApplySummary,
    invoker_name: &str,
    staff_channel_name: &str,
) -> Embed {
    let mut embed = Embed::new(format!("✅ {} Setup Complete!", template.name))
        .description(format!(
            "Server has been completely transformed with the {} template.",
            template.name
        ))
        .color(COLOR_GREEN)
        .timestamp(Utc::now())
        .field(
            "📊 Setup Summary",
            format!(
                "• {} old channels deleted\n• {} roles configured\n• {} categories created\n• {} channels created",
                summary.channels_deleted,
                summary.roles_configured,
                summary.categories_created,
                summary.channels_created
            ),
            false,
        )
        .field(
            "🎯 Next Steps",
            "1. Assign moderator roles to trusted members\n2. Customize channel topics\n3. Set up your welcome message\n4. Configure bot permissions",
            false,
        )
        .field(
            "🆕 New Features Added",
            format!(
                "• Auto-generated rules in {} or an existing rules channel\n• Staff-only channel {}\n• Announcement system `/announce`\n• Welcome system `/welcome`",
                RULES_CHANNEL_NAME, staff_channel_name
            ),
            false,
        );

    if summary.failures > 0 {
        embed = embed.field(
            "⚠️ Issues",
            format!("{} steps failed, check the bot logs for details", summary.failures),
            false,
        );
    }

    embed.footer(format!("Template applied by {}", invoker_name))
}

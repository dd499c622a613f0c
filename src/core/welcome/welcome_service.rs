// Welcome service - greets new members and manages the welcome message.

use super::welcome_format::{format_welcome, WelcomeContext, PLACEHOLDER_HELP};
use crate::core::bot_data::{BotDataStore, StoreError};
use crate::core::platform::{
    user_mention, ChannelKind, Embed, OutgoingMessage, PlatformError, PlatformGateway,
    COLOR_GREEN,
};
use crate::core::templates::{template_service::applied_template, GENERIC_WELCOME};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum WelcomeError {
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),
}

/// Role given to new members when no template role exists.
const FALLBACK_MEMBER_ROLE: &str = "Member";

/// A member who just joined, as seen by the core.
#[derive(Debug, Clone)]
pub struct NewMember {
    pub guild_id: u64,
    pub guild_name: String,
    pub user_id: u64,
    pub name: String,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub member_count: u64,
}

impl NewMember {
    pub fn context(&self) -> WelcomeContext {
        WelcomeContext {
            mention: user_mention(self.user_id),
            name: self.name.clone(),
            server: self.guild_name.clone(),
            member_count: self.member_count,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GreetOutcome {
    pub role_id: Option<u64>,
    pub channel_id: Option<u64>,
}

pub struct WelcomeService<S: BotDataStore, G: PlatformGateway> {
    store: Arc<S>,
    gateway: Arc<G>,
}

impl<S: BotDataStore, G: PlatformGateway> WelcomeService<S, G> {
    pub fn new(store: Arc<S>, gateway: Arc<G>) -> Self {
        Self { store, gateway }
    }

    /// The unformatted welcome text for a guild: the stored message, then
    /// the applied template's default, then a generic greeting.
    pub async fn welcome_template(&self, guild_id: u64) -> Result<String, StoreError> {
        if let Some(message) = self.store.get_welcome_message(guild_id).await? {
            return Ok(message);
        }
        let applied = applied_template(self.store.as_ref(), guild_id).await?;
        Ok(applied
            .map(|t| t.welcome)
            .unwrap_or(GENERIC_WELCOME)
            .to_string())
    }

    /// Store a new welcome message and build the preview shown to the
    /// invoker.
    pub async fn set_welcome(
        &self,
        guild_id: u64,
        message: &str,
        preview: &WelcomeContext,
    ) -> Result<Embed, StoreError> {
        self.store
            .set_welcome_message(guild_id, message.to_string())
            .await?;
        info!(guild_id, "Welcome message updated");

        Ok(Embed::new("✅ Welcome Message Set!")
            .description(format!("**Preview:**\n{}", format_welcome(message, preview)))
            .color(COLOR_GREEN)
            .field("📝 Supported Placeholders", PLACEHOLDER_HELP, false))
    }

    /// Give the member role and post the welcome embed.
    pub async fn greet_member(&self, member: &NewMember) -> Result<GreetOutcome, WelcomeError> {
        let mut outcome = GreetOutcome::default();

        match self.find_member_role(member.guild_id).await {
            Ok(Some(role_id)) => {
                match self
                    .gateway
                    .add_member_role(member.guild_id, member.user_id, role_id)
                    .await
                {
                    Ok(()) => outcome.role_id = Some(role_id),
                    Err(e) => warn!(
                        guild_id = member.guild_id,
                        user_id = member.user_id,
                        "Could not assign member role: {}",
                        e
                    ),
                }
            }
            Ok(None) => debug!(guild_id = member.guild_id, "No member role to assign"),
            Err(e) => warn!(guild_id = member.guild_id, "Member role lookup failed: {}", e),
        }

        let channels = self.gateway.channels(member.guild_id).await?;
        let Some(channel) = channels
            .iter()
            .filter(|c| c.kind == ChannelKind::Text && c.name.to_lowercase().contains("welcome"))
            .min_by_key(|c| c.position)
        else {
            debug!(guild_id = member.guild_id, "No welcome channel");
            return Ok(outcome);
        };

        let text = format_welcome(&self.welcome_template(member.guild_id).await?, &member.context());
        let embed = welcome_embed(member, text);
        self.gateway
            .send_message(channel.id, &OutgoingMessage::embed(embed))
            .await?;
        outcome.channel_id = Some(channel.id);

        Ok(outcome)
    }

    async fn find_member_role(&self, guild_id: u64) -> Result<Option<u64>, WelcomeError> {
        let roles = self.gateway.roles(guild_id).await?;
        let template_role = applied_template(self.store.as_ref(), guild_id)
            .await?
            .and_then(|t| t.member_role())
            .map(|r| r.name);

        let by_name = |name: &str| roles.iter().find(|r| r.name == name).map(|r| r.id);
        Ok(template_role
            .and_then(by_name)
            .or_else(|| by_name(FALLBACK_MEMBER_ROLE)))
    }
}

fn welcome_embed(member: &NewMember, text: String) -> Embed {
    let mut embed = Embed::new(format!("🎉 Welcome {}!", member.name))
        .description(text)
        .color(COLOR_GREEN)
        .field("Member Count", format!("#{}", member.member_count), true)
        .field(
            "Account Created",
            format!("<t:{}:R>", member.created_at.timestamp()),
            true,
        )
        .footer(format!("ID: {}", member.user_id));
    if let Some(avatar) = &member.avatar_url {
        embed = embed.thumbnail(avatar.as_str());
    }
    embed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bot_data::mock_store::MockStore;
    use crate::core::bot_data::ServerConfig;
    use crate::core::platform::mock_gateway::MockGateway;

    const GUILD: u64 = 1;

    fn member() -> NewMember {
        NewMember {
            guild_id: GUILD,
            guild_name: "Harbor".into(),
            user_id: 7,
            name: "sam".into(),
            avatar_url: Some("https://cdn.example/avatar.png".into()),
            created_at: Utc::now(),
            member_count: 12,
        }
    }

    fn setup() -> (Arc<MockStore>, Arc<MockGateway>, WelcomeService<MockStore, MockGateway>) {
        let store = Arc::new(MockStore::new());
        let gateway = Arc::new(MockGateway::new().with_guild(GUILD));
        let service = WelcomeService::new(Arc::clone(&store), Arc::clone(&gateway));
        (store, gateway, service)
    }

    async fn apply_music(store: &MockStore) {
        store
            .save_server_config(
                GUILD,
                ServerConfig {
                    template: Some("music".into()),
                    applied_at: None,
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_welcome_template_fallbacks() {
        let (store, _gateway, service) = setup();
        assert_eq!(service.welcome_template(GUILD).await.unwrap(), GENERIC_WELCOME);

        apply_music(&store).await;
        assert!(service
            .welcome_template(GUILD)
            .await
            .unwrap()
            .contains("Share your favorite tracks"));

        store.set_welcome_message(GUILD, "hey {name}".into()).await.unwrap();
        assert_eq!(service.welcome_template(GUILD).await.unwrap(), "hey {name}");
    }

    #[tokio::test]
    async fn test_greet_assigns_template_role_and_posts() {
        let (store, gateway, service) = setup();
        apply_music(&store).await;
        let listener = gateway.add_role(GUILD, "🎵 Listener", false);
        gateway.add_role(GUILD, "Member", false);
        gateway.add_channel(GUILD, "general", ChannelKind::Text);
        let welcome = gateway.add_channel(GUILD, "🎵welcome", ChannelKind::Text);

        let outcome = service.greet_member(&member()).await.unwrap();
        assert_eq!(outcome.role_id, Some(listener));
        assert_eq!(outcome.channel_id, Some(welcome));

        let state = gateway.state.lock().unwrap();
        assert_eq!(state.member_roles, vec![(GUILD, 7, listener)]);
        let embed = state.sent[0].2.embed.clone().unwrap();
        assert_eq!(embed.title.as_deref(), Some("🎉 Welcome sam!"));
        assert!(embed
            .description
            .as_deref()
            .unwrap()
            .starts_with("🎵 Welcome <@7>!"));
        assert_eq!(embed.field_value("Member Count"), Some("#12"));
        assert_eq!(embed.footer.as_deref(), Some("ID: 7"));
    }

    #[tokio::test]
    async fn test_greet_falls_back_to_member_role() {
        let (_store, gateway, service) = setup();
        let member_role = gateway.add_role(GUILD, "Member", false);

        let outcome = service.greet_member(&member()).await.unwrap();
        assert_eq!(outcome.role_id, Some(member_role));
        // No welcome channel, nothing posted.
        assert_eq!(outcome.channel_id, None);
        assert!(gateway.state.lock().unwrap().sent.is_empty());
    }

    #[tokio::test]
    async fn test_set_welcome_previews_with_invoker() {
        let (store, _gateway, service) = setup();
        let preview = member().context();

        let embed = service
            .set_welcome(GUILD, "Welcome {member} to {server} ({count})", &preview)
            .await
            .unwrap();

        assert_eq!(
            embed.description.as_deref(),
            Some("**Preview:**\nWelcome <@7> to Harbor (12)")
        );
        assert_eq!(
            store.get_welcome_message(GUILD).await.unwrap().as_deref(),
            Some("Welcome {member} to {server} ({count})")
        );
    }
}

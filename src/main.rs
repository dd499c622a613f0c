// This is the entry point of the Discord bot.
//
// **Architecture Overview:**
// - `core/` = Business logic (platform-agnostic)
// - `infra/` = Implementations of core traits (JSON store, serenity gateway)
// - `discord/` = Discord-specific adapters (commands, events)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Set up the Discord framework
// 4. Register commands and restore pending unbans

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "discord/discord_layer.rs"]
mod discord;
#[path = "infra/infra_layer.rs"]
mod infra;

use crate::core::moderation::{AutoModConfig, ModerationService};
use crate::core::templates::TemplateService;
use crate::core::utility::UtilityService;
use crate::core::welcome::WelcomeService;
use crate::discord::commands::presence;
use crate::discord::events::event_handler;
use crate::discord::Data;
use crate::infra::bot_data::JsonBotDataStore;
use crate::infra::platform::SerenityGateway;
use poise::serenity_prelude as serenity;
use std::path::Path;
use std::sync::Arc;

const DEFAULT_BOT_DATA_FILE: &str = "data/bot_data.json";
const SPAM_SWEEP_SECS: u64 = 300;

#[tokio::main]
async fn main() {
    // Initialize logging so we can see what's happening (RUST_LOG filters)
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    // Get Discord bot token from environment
    let token = std::env::var("DISCORD_TOKEN").expect(
        "Missing DISCORD_TOKEN environment variable! Create a .env file with your bot token.",
    );

    // Keep runtime data in a dedicated folder so the repo root stays tidy.
    let data_file =
        std::env::var("BOT_DATA_FILE").unwrap_or_else(|_| DEFAULT_BOT_DATA_FILE.to_string());
    if let Some(dir) = Path::new(&data_file).parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).expect("Failed to create bot data directory");
    }

    let store = Arc::new(JsonBotDataStore::new(&data_file));
    tracing::info!(path = %data_file, "Bot data loaded");

    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT // Required to read message content
        | serenity::GatewayIntents::GUILD_MEMBERS
        | serenity::GatewayIntents::GUILD_MODERATION;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: discord::commands::all(),
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some("!".into()),
                ..Default::default()
            },
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                tracing::info!(user = %ready.user.name, "🤖 Bot is starting up...");

                // ============================================================
                // DEPENDENCY INJECTION
                // ============================================================
                // The gateway shares the client's HTTP handle, so every
                // service is built here rather than before the client.
                let gateway = Arc::new(SerenityGateway::new(ctx.http.clone()));
                let config = AutoModConfig::default();

                let data = Data {
                    templates: Arc::new(TemplateService::new(
                        Arc::clone(&store),
                        Arc::clone(&gateway),
                        config.staff_channel_name.clone(),
                    )),
                    welcome: Arc::new(WelcomeService::new(Arc::clone(&store), Arc::clone(&gateway))),
                    utility: Arc::new(UtilityService::new(Arc::clone(&store), Arc::clone(&gateway))),
                    moderation: Arc::new(ModerationService::new(
                        Arc::clone(&store),
                        Arc::clone(&gateway),
                        config,
                    )),
                };

                // Register slash commands globally (can take up to an hour to
                // propagate). `/sync` re-registers in a single guild.
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                tracing::info!("✅ Commands registered!");

                match data.moderation.restore_active_bans(chrono::Utc::now()).await {
                    Ok(report) => tracing::info!(
                        rescheduled = report.rescheduled,
                        purged = report.purged,
                        "Pending unbans restored"
                    ),
                    Err(e) => tracing::error!("Failed to restore pending unbans: {}", e),
                }

                // Sweep idle spam windows every few minutes.
                let moderation = Arc::clone(&data.moderation);
                tokio::spawn(async move {
                    use std::time::Duration as StdDuration;
                    use tokio::time::sleep;

                    loop {
                        sleep(StdDuration::from_secs(SPAM_SWEEP_SECS)).await;
                        let tracked = moderation.prune_spam_windows(chrono::Utc::now());
                        tracing::debug!(tracked, "Spam windows pruned");
                    }
                });

                presence::on_ready(ctx);
                tracing::info!("🚀 Bot is ready!");
                Ok(data)
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await
        .expect("Error creating client");

    client.start().await.expect("Error running bot");
}

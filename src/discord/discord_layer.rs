// Discord layer - commands and event handlers.

use crate::core::moderation::ModerationService;
use crate::core::templates::TemplateService;
use crate::core::utility::UtilityService;
use crate::core::welcome::WelcomeService;
use crate::infra::bot_data::JsonBotDataStore;
use crate::infra::platform::SerenityGateway;
use std::sync::Arc;

#[path = "commands/command_catalog.rs"]
pub mod commands;

#[path = "events/event_handler.rs"]
pub mod events;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

/// Services shared by every command and event handler.
pub struct Data {
    pub moderation: Arc<ModerationService<JsonBotDataStore, SerenityGateway>>,
    pub templates: Arc<TemplateService<JsonBotDataStore, SerenityGateway>>,
    pub welcome: Arc<WelcomeService<JsonBotDataStore, SerenityGateway>>,
    pub utility: Arc<UtilityService<JsonBotDataStore, SerenityGateway>>,
}

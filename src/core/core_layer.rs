// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "platform/mod.rs"]
pub mod platform;

#[path = "bot_data/mod.rs"]
pub mod bot_data;

#[path = "moderation/mod.rs"]
pub mod moderation;

#[path = "templates/mod.rs"]
pub mod templates;

#[path = "welcome/mod.rs"]
pub mod welcome;

#[path = "utility/mod.rs"]
pub mod utility;

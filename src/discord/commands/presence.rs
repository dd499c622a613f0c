// This module handles bot presence and lifecycle events.
//
// Discord-layer glue only: we work with SDK types (Context, ActivityData,
// OnlineStatus) and keep the logic short.

use poise::serenity_prelude as serenity;

/// Point people at the help command.
pub fn reset_status(ctx: &serenity::Context) {
    let activity = serenity::ActivityData::watching("/help for templates");
    ctx.set_presence(Some(activity), serenity::OnlineStatus::Online);
}

/// Called once the bot is ready so the default presence is set in one place.
pub fn on_ready(ctx: &serenity::Context) {
    reset_status(ctx);
}

// Quote a message, either from its link or from the message context menu.

use crate::core::utility::quote::quote_embed;
use crate::discord::commands::access::{invoker, reply_embed, reply_utility_error};
use crate::discord::{Context, Error};
use crate::infra::platform::serenity_gateway::chat_message;
use poise::serenity_prelude as serenity;

/// Create a quote from a message link.
#[poise::command(slash_command, guild_only)]
pub async fn quote(
    ctx: Context<'_>,
    #[description = "Link to the message (right-click → Copy Message Link)"] message_link: String,
    #[description = "Your reply text"] reply_text: Option<String>,
) -> Result<(), Error> {
    match ctx
        .data()
        .utility
        .quote(&message_link, &invoker(ctx), reply_text.as_deref())
        .await
    {
        Ok(embed) => reply_embed(ctx, &embed, false).await,
        Err(e) => reply_utility_error(ctx, e).await,
    }
}

/// Right-click a message → Apps → Create Quote.
#[poise::command(context_menu_command = "Create Quote", guild_only)]
pub async fn create_quote(
    ctx: Context<'_>,
    #[description = "Message to quote"] message: serenity::Message,
) -> Result<(), Error> {
    let embed = quote_embed(&chat_message(&message), None, &invoker(ctx), None);
    reply_embed(ctx, &embed, false).await
}

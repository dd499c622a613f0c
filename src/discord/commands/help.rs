use crate::core::utility::help::help_embed;
use crate::discord::commands::access::reply_embed;
use crate::discord::{Context, Error};

/// Show all commands and templates.
#[poise::command(slash_command)]
pub async fn help(ctx: Context<'_>) -> Result<(), Error> {
    reply_embed(ctx, &help_embed(), true).await
}

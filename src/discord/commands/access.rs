// Permission checks and small reply helpers shared by the commands.

use crate::core::platform::Embed;
use crate::core::utility::{Invoker, UtilityError};
use crate::discord::{Context, Error};
use crate::infra::platform::serenity_gateway::create_embed;

const OWNER_ONLY: &str = "Only the server owner can use this command.";

/// Whether the invoker owns the guild the command ran in.
pub async fn is_guild_owner(ctx: Context<'_>) -> bool {
    match ctx.partial_guild().await {
        Some(guild) => guild.owner_id == ctx.author().id,
        None => false,
    }
}

/// Command check: let the guild owner through, tell everyone else why not.
pub async fn guild_owner_only(ctx: Context<'_>) -> Result<bool, Error> {
    if is_guild_owner(ctx).await {
        return Ok(true);
    }

    tracing::debug!(
        user_id = ctx.author().id.get(),
        command = %ctx.command().name,
        "Owner-only command refused"
    );
    // Prefix commands stay silent for non-owners.
    if let Context::Application(_) = ctx {
        reply_error(ctx, OWNER_ONLY).await?;
    }
    Ok(false)
}

pub fn invoker(ctx: Context<'_>) -> Invoker {
    let author = ctx.author();
    Invoker {
        id: author.id.get(),
        display_name: author
            .global_name
            .clone()
            .unwrap_or_else(|| author.name.clone()),
        avatar_url: Some(author.face()),
    }
}

pub async fn reply_error(ctx: Context<'_>, message: impl std::fmt::Display) -> Result<(), Error> {
    ctx.send(
        poise::CreateReply::default()
            .content(format!("❌ {}", message))
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

pub async fn reply_embed(ctx: Context<'_>, embed: &Embed, ephemeral: bool) -> Result<(), Error> {
    ctx.send(
        poise::CreateReply::default()
            .embed(create_embed(embed))
            .ephemeral(ephemeral),
    )
    .await?;
    Ok(())
}

/// Turn a utility failure into an ephemeral reply. Storage failures are
/// returned so poise reports them.
pub async fn reply_utility_error(ctx: Context<'_>, error: UtilityError) -> Result<(), Error> {
    match error {
        UtilityError::Store(e) => Err(e.into()),
        UtilityError::Platform(e) => {
            tracing::warn!(command = %ctx.command().name, "Platform call failed: {}", e);
            reply_error(ctx, e).await
        }
        other => reply_error(ctx, other).await,
    }
}

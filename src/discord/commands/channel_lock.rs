// Channel lock/unlock, as both slash and `!` prefix commands.

use crate::discord::commands::access::{guild_owner_only, invoker, reply_utility_error};
use crate::discord::{Context, Error};
use poise::serenity_prelude::{self as serenity, Mentionable};

/// Lock a channel so @everyone can't send messages.
#[poise::command(slash_command, prefix_command, guild_only, check = "guild_owner_only")]
pub async fn lock(
    ctx: Context<'_>,
    #[description = "Channel to lock (defaults to this one)"] channel: Option<serenity::GuildChannel>,
) -> Result<(), Error> {
    set_locked(ctx, channel, true).await
}

/// Unlock a locked channel.
#[poise::command(slash_command, prefix_command, guild_only, check = "guild_owner_only")]
pub async fn unlock(
    ctx: Context<'_>,
    #[description = "Channel to unlock (defaults to this one)"] channel: Option<serenity::GuildChannel>,
) -> Result<(), Error> {
    set_locked(ctx, channel, false).await
}

async fn set_locked(
    ctx: Context<'_>,
    channel: Option<serenity::GuildChannel>,
    locked: bool,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?.get();
    let channel_id = channel.map(|c| c.id).unwrap_or_else(|| ctx.channel_id());
    let actor = invoker(ctx);

    let utility = &ctx.data().utility;
    let result = if locked {
        utility.lock_channel(guild_id, channel_id.get(), &actor).await
    } else {
        utility.unlock_channel(guild_id, channel_id.get(), &actor).await
    };

    match result {
        // The notice in the channel is the prefix command's only output.
        Ok(()) => {
            if let Context::Application(_) = ctx {
                let verb = if locked { "🔒 Locked" } else { "🔓 Unlocked" };
                ctx.send(
                    poise::CreateReply::default()
                        .content(format!("{} {}.", verb, channel_id.mention()))
                        .ephemeral(true),
                )
                .await?;
            }
            Ok(())
        }
        Err(e) => reply_utility_error(ctx, e).await,
    }
}

// Owner tools: welcome message, rules, announcements and command sync.

use crate::core::welcome::WelcomeContext;
use crate::discord::commands::access::{
    guild_owner_only, invoker, is_guild_owner, reply_embed, reply_error, reply_utility_error,
};
use crate::discord::{Context, Error};
use poise::serenity_prelude::{self as serenity, Mentionable};

/// Set a custom welcome message for new members.
#[poise::command(slash_command, guild_only, check = "guild_owner_only")]
pub async fn welcome(
    ctx: Context<'_>,
    #[description = "Your welcome message (use {member} for the member mention)"] message: String,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?;

    // Cache first, the guild ref can't be held across an await.
    let cached = ctx.guild().map(|g| (g.name.clone(), g.member_count));
    let (server, member_count) = match cached {
        Some(found) => found,
        None => {
            let guild = ctx.partial_guild().await.ok_or("Server not found")?;
            (guild.name, guild.approximate_member_count.unwrap_or(0))
        }
    };

    let preview = WelcomeContext {
        mention: ctx.author().mention().to_string(),
        name: ctx.author().name.clone(),
        server,
        member_count,
    };

    let embed = ctx
        .data()
        .welcome
        .set_welcome(guild_id.get(), &message, &preview)
        .await?;
    reply_embed(ctx, &embed, true).await
}

/// Edit the server rules, one rule per line.
#[poise::command(slash_command, guild_only, check = "guild_owner_only")]
pub async fn editrules(
    ctx: Context<'_>,
    #[description = "New rules (one per line, or separated by \\n)"] rules: String,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?.get();
    // Slash inputs are single-line, so accept a literal "\n" as a break too.
    let rules = rules.replace("\\n", "\n");

    match ctx
        .data()
        .utility
        .edit_rules(guild_id, &rules, ctx.author().id.get(), chrono::Utc::now())
        .await
    {
        Ok(count) => {
            ctx.send(
                poise::CreateReply::default()
                    .content(format!("✅ Rules updated successfully! ({} rules)", count))
                    .ephemeral(true),
            )
            .await?;
            Ok(())
        }
        Err(e) => reply_utility_error(ctx, e).await,
    }
}

/// Make an announcement in the announcements channel.
#[poise::command(slash_command, guild_only)]
pub async fn announce(
    ctx: Context<'_>,
    #[description = "Your announcement message"] message: String,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?.get();

    let allowed = if is_guild_owner(ctx).await {
        true
    } else {
        let roles: Vec<u64> = ctx
            .author_member()
            .await
            .map(|m| m.roles.iter().map(|r| r.get()).collect())
            .unwrap_or_default();
        ctx.data().utility.is_staff(guild_id, &roles).await?
    };
    if !allowed {
        return reply_error(ctx, "Only the server owner or staff can make announcements.").await;
    }

    ctx.defer_ephemeral().await?;

    match ctx
        .data()
        .utility
        .announce(guild_id, &message, &invoker(ctx))
        .await
    {
        Ok(outcome) => {
            let mut text = format!(
                "✅ Announcement posted in {}!",
                serenity::ChannelId::new(outcome.channel_id).mention()
            );
            if outcome.created_channel {
                text.push_str("\n📢 Created a new announcements channel.");
            }
            if !outcome.pinged {
                text.push_str("\n⚠️ I couldn't ping @everyone, so the announcement was posted without it.");
            }
            ctx.send(poise::CreateReply::default().content(text).ephemeral(true))
                .await?;
            Ok(())
        }
        Err(e) => reply_utility_error(ctx, e).await,
    }
}

/// Re-register the bot's commands in this server.
#[poise::command(slash_command, guild_only, check = "guild_owner_only")]
pub async fn sync(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?;

    ctx.defer_ephemeral().await?;

    let commands = &ctx.framework().options().commands;
    match poise::builtins::register_in_guild(ctx.http(), commands, guild_id).await {
        Ok(()) => {
            tracing::info!(guild_id = guild_id.get(), "Commands synced to guild");
            ctx.send(
                poise::CreateReply::default()
                    .content("✅ Commands synced successfully!")
                    .ephemeral(true),
            )
            .await?;
            Ok(())
        }
        Err(e) => {
            tracing::warn!(guild_id = guild_id.get(), "Command sync failed: {}", e);
            reply_error(ctx, format!("Failed to sync commands: {}", e)).await
        }
    }
}

// Discord event handling - translates gateway events into core calls.
//
// Message events feed the auto-mod, member joins feed the welcome flow.

use crate::core::moderation::IncomingMessage;
use crate::core::welcome::NewMember;
use crate::discord::{Data, Error};
use crate::infra::platform::serenity_gateway::to_utc;
use anyhow::Context as _;
use poise::serenity_prelude as serenity;

/// Event handler for non-command Discord events.
pub async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Message { new_message } => {
            if let Err(e) = moderate_message(ctx, data, new_message).await {
                tracing::error!(
                    message_id = new_message.id.get(),
                    user_id = new_message.author.id.get(),
                    "Auto-mod failed: {:#}",
                    e
                );
            }
        }
        serenity::FullEvent::GuildMemberAddition { new_member } => {
            if let Err(e) = greet_member(ctx, data, new_member).await {
                tracing::error!(
                    guild_id = new_member.guild_id.get(),
                    user_id = new_member.user.id.get(),
                    "Welcome failed: {:#}",
                    e
                );
            }
        }
        _ => {}
    }

    Ok(())
}

/// Run a guild message through the auto-mod.
async fn moderate_message(
    ctx: &serenity::Context,
    data: &Data,
    msg: &serenity::Message,
) -> anyhow::Result<()> {
    // Ignore bot messages (including our own)
    if msg.author.bot {
        return Ok(());
    }
    // Only guild messages are moderated
    let Some(guild_id) = msg.guild_id else {
        return Ok(());
    };

    let (channel_name, channel_is_nsfw) = channel_facts(ctx, guild_id, msg.channel_id).await;
    let incoming = IncomingMessage {
        message_id: msg.id.get(),
        guild_id: guild_id.get(),
        channel_id: msg.channel_id.get(),
        channel_name,
        channel_is_nsfw,
        author_id: msg.author.id.get(),
        author_is_bot: msg.author.bot,
        author_is_admin: author_is_admin(ctx, msg, guild_id),
        content: msg.content.clone(),
        sent_at: to_utc(msg.timestamp),
    };

    let outcome = data
        .moderation
        .handle_message(&incoming)
        .await
        .context("handling message")?;

    if let Some(outcome) = outcome {
        tracing::info!(
            guild_id = incoming.guild_id,
            user_id = incoming.author_id,
            kind = ?outcome.kind,
            count = outcome.count,
            action = %outcome.action.describe(),
            "Auto-mod violation handled"
        );
    }
    Ok(())
}

/// Name and NSFW flag of a channel, cache first.
async fn channel_facts(
    ctx: &serenity::Context,
    guild_id: serenity::GuildId,
    channel_id: serenity::ChannelId,
) -> (String, bool) {
    let cached = ctx.cache.guild(guild_id).and_then(|guild| {
        guild
            .channels
            .get(&channel_id)
            .map(|c| (c.name.clone(), c.nsfw))
    });
    if let Some(facts) = cached {
        return facts;
    }

    match channel_id.to_channel(&ctx.http).await {
        Ok(serenity::Channel::Guild(channel)) => (channel.name, channel.nsfw),
        Ok(_) => (String::from("unknown"), false),
        Err(e) => {
            tracing::debug!(channel_id = channel_id.get(), "Channel lookup failed: {}", e);
            (String::from("unknown"), false)
        }
    }
}

/// Owner or holder of a role with the Administrator permission.
fn author_is_admin(ctx: &serenity::Context, msg: &serenity::Message, guild_id: serenity::GuildId) -> bool {
    let Some(guild) = ctx.cache.guild(guild_id) else {
        return false;
    };
    if guild.owner_id == msg.author.id {
        return true;
    }

    let roles = match &msg.member {
        Some(member) => member.roles.clone(),
        None => guild
            .members
            .get(&msg.author.id)
            .map(|m| m.roles.clone())
            .unwrap_or_default(),
    };
    roles
        .iter()
        .filter_map(|id| guild.roles.get(id))
        .any(|role| role.permissions.administrator())
}

/// Give a new member their role and post the welcome embed.
async fn greet_member(
    ctx: &serenity::Context,
    data: &Data,
    member: &serenity::Member,
) -> anyhow::Result<()> {
    if member.user.bot {
        return Ok(());
    }

    let (guild_name, member_count) = ctx
        .cache
        .guild(member.guild_id)
        .map(|g| (g.name.clone(), g.member_count))
        .unwrap_or_else(|| (String::from("the server"), 0));

    let new_member = NewMember {
        guild_id: member.guild_id.get(),
        guild_name,
        user_id: member.user.id.get(),
        name: member.user.name.clone(),
        avatar_url: Some(member.user.face()),
        created_at: to_utc(member.user.id.created_at()),
        member_count,
    };

    let outcome = data
        .welcome
        .greet_member(&new_member)
        .await
        .context("greeting member")?;

    tracing::info!(
        guild_id = new_member.guild_id,
        user_id = new_member.user_id,
        role_id = ?outcome.role_id,
        channel_id = ?outcome.channel_id,
        "Member welcomed"
    );
    Ok(())
}

// Auto-mod admin commands: inspect warnings, reset them, lift bans early.

use crate::core::moderation::{ModerationError, WarningRecord};
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

const LIST_LIMIT: usize = 10;
const HISTORY_SHOWN: usize = 5;

/// Auto-moderation tools.
#[poise::command(
    slash_command,
    subcommands("warnings", "clear", "unban"),
    required_permissions = "MANAGE_MESSAGES",
    guild_only
)]
pub async fn automod(_ctx: Context<'_>) -> Result<(), Error> {
    // Parent command - subcommands do the work
    Ok(())
}

/// Show a user's warnings, or the most-warned users in the server.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_MESSAGES")]
pub async fn warnings(
    ctx: Context<'_>,
    #[description = "User to inspect (defaults to everyone)"] user: Option<serenity::User>,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?.get();
    let moderation = &ctx.data().moderation;
    let config = moderation.config();

    let embed = match user {
        Some(user) => {
            let record = moderation.warnings(guild_id, user.id.get()).await?;
            user_embed(&user, record.as_ref(), config.ban_at, config.kick_at)
        }
        None => {
            let records = moderation.list_warnings(guild_id).await?;
            list_embed(&records)
        }
    };

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}

fn user_embed(
    user: &serenity::User,
    record: Option<&WarningRecord>,
    ban_at: u32,
    kick_at: u32,
) -> serenity::CreateEmbed {
    let embed = serenity::CreateEmbed::new()
        .title(format!("⚠️ Warnings for {}", user.name))
        .thumbnail(user.face())
        .color(0xffa500);

    let Some(record) = record else {
        return embed.description("No warnings on record.").color(0x00ff00);
    };

    let history = record
        .history
        .iter()
        .rev()
        .take(HISTORY_SHOWN)
        .map(|entry| {
            let kind = entry
                .kind
                .map(|k| k.to_string())
                .unwrap_or_else(|| "Violation".to_string());
            format!(
                "<t:{}:R> **{}** in #{}\n> {}",
                entry.timestamp.timestamp(),
                kind,
                entry.channel,
                entry.excerpt
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    embed
        .field(
            "Warnings",
            format!("{} (ban at {}, kick at {})", record.count, ban_at, kick_at),
            true,
        )
        .field("NSFW Warnings", record.nsfw_count.unwrap_or(0).to_string(), true)
        .field(
            "Recent History",
            if history.is_empty() {
                "None".to_string()
            } else {
                history
            },
            false,
        )
}

fn list_embed(records: &[(u64, WarningRecord)]) -> serenity::CreateEmbed {
    let lines = records
        .iter()
        .take(LIST_LIMIT)
        .enumerate()
        .map(|(i, (user_id, record))| {
            format!(
                "**{}.** <@{}> - {} warning(s), {} NSFW",
                i + 1,
                user_id,
                record.count,
                record.nsfw_count.unwrap_or(0)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    serenity::CreateEmbed::new()
        .title("🛡️ Auto-Mod Warnings")
        .color(0x7289da)
        .description(if lines.is_empty() {
            "Nobody has been warned yet.".to_string()
        } else {
            lines
        })
        .footer(serenity::CreateEmbedFooter::new(format!(
            "{} user(s) on record",
            records.len()
        )))
}

/// Clear all auto-mod warnings for a user.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_MESSAGES")]
pub async fn clear(
    ctx: Context<'_>,
    #[description = "User to clear warnings for"] user: serenity::User,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?.get();

    let removed = ctx
        .data()
        .moderation
        .clear_warnings(guild_id, user.id.get())
        .await?;

    let text = if removed {
        tracing::info!(guild_id, user_id = user.id.get(), "Warnings cleared by staff");
        format!("✅ Cleared all auto-mod warnings for <@{}>.", user.id)
    } else {
        format!("ℹ️ <@{}> has no warnings.", user.id)
    };
    ctx.send(poise::CreateReply::default().content(text).ephemeral(true))
        .await?;
    Ok(())
}

/// Lift a temporary ban now and cancel its scheduled unban.
#[poise::command(slash_command, guild_only, required_permissions = "BAN_MEMBERS")]
pub async fn unban(
    ctx: Context<'_>,
    #[description = "Banned user (paste their ID)"] user: serenity::User,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?.get();
    let user_id = user.id;

    let text = match ctx
        .data()
        .moderation
        .manual_unban(guild_id, user_id.get())
        .await
    {
        Ok(()) => format!("✅ <@{}> has been unbanned.", user_id),
        Err(ModerationError::NotBanned) => format!("ℹ️ <@{}> is not banned.", user_id),
        Err(ModerationError::Platform(e)) => {
            tracing::warn!(guild_id, user_id = user_id.get(), "Manual unban failed: {}", e);
            format!("❌ Could not unban <@{}>: {}", user_id, e)
        }
        Err(e) => return Err(e.into()),
    };

    ctx.send(poise::CreateReply::default().content(text).ephemeral(true))
        .await?;
    Ok(())
}

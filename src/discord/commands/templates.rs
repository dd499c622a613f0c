// Server template commands.
//
// Same pattern as the other command files: pull ids out of the context,
// hand them to the core service, render whatever comes back.

use crate::core::templates::template_service::{apply_warning_embed, catalog_embed};
use crate::core::templates::{ServerTemplate, TemplateError, TemplateId};
use crate::discord::commands::access::{guild_owner_only, invoker, reply_embed, reply_error};
use crate::discord::{Context, Error};

#[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
pub enum TemplateChoice {
    #[name = "Gaming"]
    Gaming,
    #[name = "Music"]
    Music,
    #[name = "Friends"]
    Friends,
    #[name = "Blox Fruits"]
    BloxFruits,
    #[name = "YouTube"]
    YouTube,
}

impl From<TemplateChoice> for TemplateId {
    fn from(choice: TemplateChoice) -> Self {
        match choice {
            TemplateChoice::Gaming => TemplateId::Gaming,
            TemplateChoice::Music => TemplateId::Music,
            TemplateChoice::Friends => TemplateId::Friends,
            TemplateChoice::BloxFruits => TemplateId::BloxFruits,
            TemplateChoice::YouTube => TemplateId::YouTube,
        }
    }
}

/// View the available server templates.
#[poise::command(slash_command, guild_only, check = "guild_owner_only")]
pub async fn templates(ctx: Context<'_>) -> Result<(), Error> {
    reply_embed(ctx, &catalog_embed(), true).await
}

/// Apply a template to the server (DELETES ALL EXISTING CHANNELS).
#[poise::command(slash_command, guild_only, check = "guild_owner_only")]
pub async fn apply(
    ctx: Context<'_>,
    #[description = "The template to apply"] template: TemplateChoice,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?.get();
    let template_id = TemplateId::from(template);

    reply_embed(ctx, &apply_warning_embed(ServerTemplate::get(template_id)), true).await?;

    let who = invoker(ctx);
    match ctx
        .data()
        .templates
        .apply(guild_id, template_id, who.id, &who.display_name)
        .await
    {
        Ok(summary) => {
            tracing::info!(
                guild_id,
                template = template_id.as_str(),
                channels = summary.channels_created,
                roles = summary.roles_created,
                failures = summary.failures,
                "Template applied"
            );
            // The invoking channel is usually gone by now, so the core
            // already delivered the summary elsewhere.
            if let Err(e) = ctx
                .send(
                    poise::CreateReply::default()
                        .content(format!(
                            "✅ **{}** applied: {} channels, {} roles.",
                            ServerTemplate::get(template_id).name,
                            summary.channels_created,
                            summary.roles_created
                        ))
                        .ephemeral(true),
                )
                .await
            {
                tracing::debug!(guild_id, "Apply follow-up not delivered: {}", e);
            }
            Ok(())
        }
        Err(TemplateError::Platform(e)) => {
            tracing::error!(guild_id, "Template apply failed: {}", e);
            reply_error(ctx, format!("Template setup failed: {}", e)).await
        }
        Err(e) => Err(e.into()),
    }
}

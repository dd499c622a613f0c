// Help embed.

use crate::core::platform::{Embed, COLOR_STAFF};
use crate::core::templates::ServerTemplate;

const COMMANDS: &[(&str, &str)] = &[
    ("`/templates`", "View available templates"),
    ("`/apply <template>`", "🚨 APPLY TEMPLATE (deletes all existing channels)"),
    ("`/quote <message_link> [reply]`", "🎨 Create a quote from a message link"),
    ("`/announce <message>`", "Make announcements in the announcements channel"),
    ("`/welcome <message>`", "Set a custom welcome message"),
    ("`/editrules <rules>`", "Edit server rules (Owner only)"),
    ("`/lock [channel]` or `!lock`", "🔒 Lock a channel to prevent messages"),
    ("`/unlock [channel]` or `!unlock`", "🔓 Unlock a locked channel"),
    ("`/automod`", "Review or clear auto-mod warnings and lift bans"),
    ("`/sync`", "Re-register commands in this server"),
    ("`/help`", "Show this help menu"),
];

pub fn help_embed() -> Embed {
    let mut embed = Embed::new("🤖 Template Bot Help")
        .description("Server template system with moderation & utilities")
        .color(COLOR_STAFF);

    for (command, description) in COMMANDS {
        embed = embed.field(*command, *description, false);
    }

    let templates = ServerTemplate::all()
        .into_iter()
        .map(|t| format!("• {}", t.display_name()))
        .collect::<Vec<_>>()
        .join("\n");

    embed
        .field("📋 Available Templates", templates, false)
        .field(
            "🖱️ Context Menus",
            "Right-click on any message → **Apps** → **Create Quote**",
            false,
        )
        .field(
            "⚠️ WARNING",
            "Using `/apply` will **PERMANENTLY DELETE** all existing channels!",
            false,
        )
        .footer("Use with caution!")
}

// Message quotes - link parsing and the quote embed.

use super::utility_models::Invoker;
use crate::core::platform::{ChatMessage, Embed, COLOR_BLURPLE};

/// Longest quoted text before it is cut.
const MAX_QUOTE_CHARS: usize = 1000;
const MAX_REACTIONS: usize = 5;

const LINK_HOSTS: &[&str] = &[
    "https://discord.com/channels/",
    "https://canary.discord.com/channels/",
    "https://ptb.discord.com/channels/",
    "https://discordapp.com/channels/",
];

/// Where a message link points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageLink {
    pub guild_id: u64,
    pub channel_id: u64,
    pub message_id: u64,
}

/// Parse `https://discord.com/channels/<guild>/<channel>/<message>`.
/// Canary and PTB hosts are accepted too.
pub fn parse_message_link(link: &str) -> Option<MessageLink> {
    let link = link.trim().trim_start_matches('<').trim_end_matches('>');
    let rest = LINK_HOSTS.iter().find_map(|host| link.strip_prefix(host))?;

    let mut parts = rest.trim_end_matches('/').split('/');
    let guild_id = parts.next()?.parse().ok()?;
    let channel_id = parts.next()?.parse().ok()?;
    let message_id = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }

    Some(MessageLink {
        guild_id,
        channel_id,
        message_id,
    })
}

fn truncate_quote(content: &str) -> String {
    if content.chars().count() > MAX_QUOTE_CHARS {
        let cut: String = content.chars().take(MAX_QUOTE_CHARS - 3).collect();
        format!("{}...", cut)
    } else {
        content.to_string()
    }
}

/// Build the quote embed for `message`. `channel_name` adds the source
/// channel to the footer when known.
pub fn quote_embed(
    message: &ChatMessage,
    channel_name: Option<&str>,
    quoter: &Invoker,
    reply: Option<&str>,
) -> Embed {
    let text = if message.content.trim().is_empty() {
        "*(no text)*".to_string()
    } else {
        truncate_quote(&message.content)
    };

    let mut embed = Embed::untitled()
        .color(COLOR_BLURPLE)
        .timestamp(message.timestamp)
        .author(format!("{} said:", message.author_name), message.author_avatar.clone())
        .description(format!("[Jump to original message]({})", message.jump_url()))
        .field("\u{200b}", text, false);

    if let Some(first) = message.attachments.first() {
        let mut summary = format!("📎 {} attachment(s)", message.attachments.len());
        if first.is_image() {
            summary.push_str(" 🖼️");
            embed = embed.image(first.url.as_str());
        }
        embed = embed.field("Attachments", summary, true);
    }

    if !message.reactions.is_empty() {
        let reactions = message
            .reactions
            .iter()
            .take(MAX_REACTIONS)
            .map(|r| format!("{} {}", r.emoji, r.count))
            .collect::<Vec<_>>()
            .join(" ");
        embed = embed.field("Reactions", reactions, true);
    }

    if let Some(reply) = reply.filter(|r| !r.trim().is_empty()) {
        embed = embed.field(format!("💬 {} replied:", quoter.display_name), reply, false);
    }

    let footer = match channel_name {
        Some(name) => format!("Quoted by {} • #{}", quoter.display_name, name),
        None => format!("Quoted by {}", quoter.display_name),
    };
    embed.footer(footer).footer_icon(quoter.avatar_url.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::platform::mock_gateway::message;
    use crate::core::platform::{Attachment, ReactionCount};

    fn quoter() -> Invoker {
        Invoker {
            id: 5,
            display_name: "Robin".into(),
            avatar_url: None,
        }
    }

    #[test]
    fn test_parse_accepts_all_hosts() {
        for host in ["discord.com", "canary.discord.com", "ptb.discord.com"] {
            let link = format!("https://{}/channels/1/2/3", host);
            assert_eq!(
                parse_message_link(&link),
                Some(MessageLink {
                    guild_id: 1,
                    channel_id: 2,
                    message_id: 3
                })
            );
        }
        assert!(parse_message_link("<https://discord.com/channels/1/2/3>").is_some());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for link in [
            "",
            "hello",
            "https://discord.com/channels/1/2",
            "https://discord.com/channels/1/2/x",
            "https://discord.com/channels/1/2/3/4",
            "https://evil.example/channels/1/2/3",
            "https://discord.com/channels/@me/2/3",
        ] {
            assert_eq!(parse_message_link(link), None, "accepted {:?}", link);
        }
    }

    #[test]
    fn test_long_quote_truncated() {
        let msg = message(3, 2, 7, &"a".repeat(1500));
        let embed = quote_embed(&msg, Some("general"), &quoter(), None);
        let text = embed.field_value("\u{200b}").unwrap();
        assert_eq!(text.chars().count(), 1000);
        assert!(text.ends_with("..."));
        assert_eq!(embed.footer.as_deref(), Some("Quoted by Robin • #general"));
    }

    #[test]
    fn test_attachments_reactions_and_reply() {
        let mut msg = message(3, 2, 7, "look at this");
        msg.attachments.push(Attachment {
            url: "https://cdn.example/cat.png".into(),
            content_type: Some("image/png".into()),
        });
        msg.attachments.push(Attachment {
            url: "https://cdn.example/notes.txt".into(),
            content_type: Some("text/plain".into()),
        });
        for i in 0..7 {
            msg.reactions.push(ReactionCount {
                emoji: format!("e{}", i),
                count: 1,
            });
        }

        let embed = quote_embed(&msg, None, &quoter(), Some("agreed"));
        assert_eq!(embed.field_value("Attachments"), Some("📎 2 attachment(s) 🖼️"));
        assert_eq!(embed.image_url.as_deref(), Some("https://cdn.example/cat.png"));
        assert_eq!(embed.field_value("Reactions"), Some("e0 1 e1 1 e2 1 e3 1 e4 1"));
        assert_eq!(embed.field_value("💬 Robin replied:"), Some("agreed"));
        assert_eq!(embed.author.unwrap().name, "user7 said:");
    }

    #[test]
    fn test_empty_message_placeholder() {
        let msg = message(3, 2, 7, "");
        let embed = quote_embed(&msg, None, &quoter(), None);
        assert_eq!(embed.field_value("\u{200b}"), Some("*(no text)*"));
        assert!(embed
            .description
            .unwrap()
            .contains("https://discord.com/channels/1/2/3"));
    }
}

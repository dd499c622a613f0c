// Embeds the auto-mod sends: the generic notice to the member and the
// detailed report to staff.

use super::moderation_models::{AutoModConfig, IncomingMessage, ModerationOutcome, ViolationKind};
use crate::core::platform::{channel_mention, user_mention, Embed, COLOR_ORANGE, COLOR_SOFT_RED};
use chrono::{DateTime, Utc};

/// Discord rejects field values longer than this.
const FIELD_LIMIT: usize = 1024;

/// The DM sent to the author. Deliberately says nothing about warnings or
/// the actual reason.
pub fn member_notice(kind: ViolationKind, at: DateTime<Utc>) -> Embed {
    match kind {
        ViolationKind::Nsfw => Embed::new("🔞 Content Notice")
            .color(COLOR_SOFT_RED)
            .field(
                "Content Review",
                "Your recent message has been reviewed by our content moderation system.",
                false,
            )
            .field(
                "Community Guidelines",
                "Please ensure all conversations are appropriate for all ages and follow our server rules.",
                false,
            )
            .field(
                "NSFW Channels",
                "For mature discussions, please use channels marked as NSFW.",
                false,
            )
            .footer("Thank you for helping keep our community family-friendly")
            .timestamp(at),
        ViolationKind::Profanity | ViolationKind::Spam => {
            let (title, color) = if kind == ViolationKind::Spam {
                ("🚨 Spam Notice", COLOR_SOFT_RED)
            } else {
                ("🛡️ Message Notice", COLOR_ORANGE)
            };
            Embed::new(title)
                .color(color)
                .field(
                    "Content Review",
                    "Your recent message has been reviewed by our moderation system.",
                    false,
                )
                .field(
                    "Community Guidelines",
                    "Please ensure all messages follow our server rules and community guidelines.",
                    false,
                )
                .footer("Thank you for helping keep our community respectful")
                .timestamp(at)
        }
    }
}

fn code_block(content: &str) -> String {
    // Leave room for the fences and never split a char.
    let budget = FIELD_LIMIT - 8;
    let mut body: String = content.replace("```", "'''").chars().take(budget).collect();
    if body.is_empty() {
        body.push(' ');
    }
    format!("```{}```", body)
}

/// The report posted to the staff channel.
pub fn staff_report(
    message: &IncomingMessage,
    outcome: &ModerationOutcome,
    config: &AutoModConfig,
) -> Embed {
    let title = match outcome.kind {
        ViolationKind::Profanity => "🛡️ Auto-Mod Action Taken",
        ViolationKind::Nsfw => "🔞 NSFW Content Detected",
        ViolationKind::Spam => "🚨 Spam Detected",
    };
    let counter_label = match outcome.kind {
        ViolationKind::Nsfw => "NSFW Warnings",
        _ => "Warnings",
    };

    let mut embed = Embed::new(title)
        .color(COLOR_SOFT_RED)
        .field(
            "User",
            format!("{} (`{}`)", user_mention(message.author_id), message.author_id),
            true,
        )
        .field(
            counter_label,
            format!("{}/{}", outcome.count, config.kick_at),
            true,
        )
        .field("Channel", channel_mention(message.channel_id), true);

    if let Some(detail) = &outcome.detail {
        embed = embed.field("Detection", detail, true);
    }

    embed
        .field("Violation", outcome.kind.to_string(), true)
        .field("Action Taken", outcome.action.describe(), false)
        .field("Message Content", code_block(&message.content), false)
        .timestamp(message.sent_at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::moderation::moderation_models::PenaltyAction;
    use std::time::Duration;

    fn incoming(content: &str) -> IncomingMessage {
        IncomingMessage {
            message_id: 1,
            guild_id: 1,
            channel_id: 5,
            channel_name: "general".into(),
            channel_is_nsfw: false,
            author_id: 42,
            author_is_bot: false,
            author_is_admin: false,
            content: content.into(),
            sent_at: Utc::now(),
        }
    }

    #[test]
    fn test_member_notice_never_mentions_warnings() {
        for kind in [ViolationKind::Profanity, ViolationKind::Nsfw, ViolationKind::Spam] {
            let embed = member_notice(kind, Utc::now());
            for field in &embed.fields {
                let text = field.value.to_lowercase();
                assert!(!text.contains("warn"), "{:?} notice leaks warnings", kind);
                assert!(!text.contains("ban"));
            }
        }
        assert!(member_notice(ViolationKind::Nsfw, Utc::now())
            .field_value("NSFW Channels")
            .is_some());
    }

    #[test]
    fn test_staff_report_fields() {
        let config = AutoModConfig::default();
        let outcome = ModerationOutcome {
            kind: ViolationKind::Nsfw,
            count: 3,
            action: PenaltyAction::TempBan {
                duration: Duration::from_secs(7200),
            },
            detail: Some("Severity level 2".into()),
        };
        let embed = staff_report(&incoming("bad words"), &outcome, &config);

        assert_eq!(embed.title.as_deref(), Some("🔞 NSFW Content Detected"));
        assert_eq!(embed.field_value("User"), Some("<@42> (`42`)"));
        assert_eq!(embed.field_value("NSFW Warnings"), Some("3/5"));
        assert_eq!(embed.field_value("Channel"), Some("<#5>"));
        assert_eq!(
            embed.field_value("Action Taken"),
            Some("🔨 Temporarily banned for 2 hours")
        );
        assert_eq!(embed.field_value("Message Content"), Some("```bad words```"));
    }

    #[test]
    fn test_long_content_fits_field() {
        let config = AutoModConfig::default();
        let outcome = ModerationOutcome {
            kind: ViolationKind::Spam,
            count: 1,
            action: PenaltyAction::Notice,
            detail: None,
        };
        let embed = staff_report(&incoming(&"x".repeat(5000)), &outcome, &config);
        let value = embed.field_value("Message Content").unwrap();
        assert!(value.chars().count() <= FIELD_LIMIT);
    }
}

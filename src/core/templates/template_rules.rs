// Rules embeds shared by template setup and /editrules.

use crate::core::platform::{user_mention, ChatMessage, Embed, COLOR_GREEN, COLOR_ORANGE};
use chrono::{DateTime, Utc};

pub const RULES_TITLE: &str = "🛡️ Auto-Generated Server Rules";
pub const EDITED_RULES_TITLE: &str = "🛡️ Server Rules (Edited)";

/// Name of the private rules channel created when the welcome category has
/// no rules channel of its own.
pub const RULES_CHANNEL_NAME: &str = "rules-config";

/// Fragments that mark an existing channel as a rules channel.
const RULES_FRAGMENTS: &[&str] = &["rules", "rule", "guidelines", "terms"];

pub fn is_rules_channel_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    RULES_FRAGMENTS.iter().any(|f| lower.contains(f))
}

pub fn rules_embed(rules: &[&str]) -> Embed {
    let mut embed = Embed::new(RULES_TITLE)
        .description("These rules were automatically generated for your server template.")
        .color(COLOR_GREEN);

    for (i, rule) in rules.iter().enumerate() {
        embed = embed.field(format!("Rule #{}", i + 1), *rule, false);
    }

    embed.field(
        "⚙️ How to Edit Rules",
        "Use `/editrules` to modify these rules. Only server owners can edit rules.",
        false,
    )
}

pub fn edited_rules_embed(rules: &[String], editor_id: u64, at: DateTime<Utc>) -> Embed {
    let mut embed = Embed::new(EDITED_RULES_TITLE)
        .description("These rules were customized by the server owner.")
        .color(COLOR_ORANGE);

    for (i, rule) in rules.iter().enumerate() {
        embed = embed.field(format!("Rule #{}", i + 1), rule.as_str(), false);
    }

    embed.field(
        "📝 Last Updated",
        format!("Edited by {} at <t:{}:F>", user_mention(editor_id), at.timestamp()),
        false,
    )
}

/// Split `/editrules` input into one rule per non-blank line.
pub fn parse_rules(input: &str) -> Vec<String> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whether a recent message already carries the generated rules.
pub fn has_rules_message(messages: &[ChatMessage]) -> bool {
    messages.iter().any(|m| {
        m.content.contains("Auto-Generated Server Rules")
            || m.embed_titles.first().map(String::as_str) == Some(RULES_TITLE)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::platform::mock_gateway::message;

    #[test]
    fn test_rules_embed_numbers_rules() {
        let embed = rules_embed(&["Be nice", "No spam"]);
        assert_eq!(embed.field_value("Rule #1"), Some("Be nice"));
        assert_eq!(embed.field_value("Rule #2"), Some("No spam"));
        assert_eq!(embed.fields.len(), 3);
    }

    #[test]
    fn test_parse_rules_skips_blank_lines() {
        let rules = parse_rules("  one \n\n two\n   \nthree");
        assert_eq!(rules, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_rules_channel_detection() {
        assert!(is_rules_channel_name("📋rules"));
        assert!(is_rules_channel_name("📜crew-rules"));
        assert!(is_rules_channel_name("Community-Guidelines"));
        assert!(!is_rules_channel_name("👋welcome"));
    }

    #[test]
    fn test_has_rules_message() {
        let mut posted = message(1, 5, 999, "");
        posted.embed_titles.push(RULES_TITLE.to_string());
        let chatter = message(2, 5, 7, "hello");

        assert!(has_rules_message(&[chatter.clone(), posted]));
        assert!(!has_rules_message(&[chatter]));
    }
}

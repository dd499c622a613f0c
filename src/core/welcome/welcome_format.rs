// Welcome message placeholders.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z]+)\}").expect("placeholder pattern compiles"));

/// Values substituted into a welcome message.
#[derive(Debug, Clone)]
pub struct WelcomeContext {
    /// Mention markup for the member
    pub mention: String,
    pub name: String,
    pub server: String,
    pub member_count: u64,
}

pub const PLACEHOLDER_HELP: &str = "• `{member}`, `{user}`, `{mention}` - Member mention\n\
• `{name}`, `{username}` - Member name\n\
• `{server}`, `{guild}` - Server name\n\
• `{count}`, `{members}`, `{membercount}` - Member count";

/// Substitute every known placeholder in one pass. Substituted values are
/// never rescanned, and unknown `{tokens}` are left as written.
pub fn format_welcome(template: &str, ctx: &WelcomeContext) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            match caps[1].to_lowercase().as_str() {
                "member" | "user" | "mention" => ctx.mention.clone(),
                "name" | "username" => ctx.name.clone(),
                "server" | "guild" => ctx.server.clone(),
                "count" | "members" | "membercount" => ctx.member_count.to_string(),
                _ => caps[0].to_string(),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> WelcomeContext {
        WelcomeContext {
            mention: "<@7>".into(),
            name: "sam".into(),
            server: "Harbor".into(),
            member_count: 12,
        }
    }

    #[test]
    fn test_every_alias_substituted() {
        let out = format_welcome(
            "{member} {user} {mention} {name} {username} {server} {guild} {count} {members} {membercount}",
            &ctx(),
        );
        assert_eq!(out, "<@7> <@7> <@7> sam sam Harbor Harbor 12 12 12");
    }

    #[test]
    fn test_unknown_tokens_left_intact() {
        let out = format_welcome("Hi {member}, see {rules} and {}", &ctx());
        assert_eq!(out, "Hi <@7>, see {rules} and {}");
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let mut context = ctx();
        context.name = "{server}".into();
        let out = format_welcome("{name} joined {server}", &context);
        assert_eq!(out, "{server} joined Harbor");
    }

    #[test]
    fn test_repeated_placeholders() {
        let out = format_welcome("{member}{member}", &ctx());
        assert_eq!(out, "<@7><@7>");
        assert!(!out.contains('{'));
    }
}

// Server template definitions
//
// This module defines every layout `/apply` can build: roles, categories,
// channels, plus the default rules and welcome text each template ships with.

use crate::core::platform::{ChannelKind, Permission};

/// Unique identifier for templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateId {
    Gaming,
    Music,
    Friends,
    BloxFruits,
    YouTube,
}

impl TemplateId {
    /// Convert template ID to string representation for storage and commands.
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateId::Gaming => "gaming",
            TemplateId::Music => "music",
            TemplateId::Friends => "friends",
            TemplateId::BloxFruits => "bloxfruits",
            TemplateId::YouTube => "youtube",
        }
    }

    /// Parse template ID from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "gaming" => Some(TemplateId::Gaming),
            "music" => Some(TemplateId::Music),
            "friends" => Some(TemplateId::Friends),
            "bloxfruits" | "blox_fruits" => Some(TemplateId::BloxFruits),
            "youtube" => Some(TemplateId::YouTube),
            _ => None,
        }
    }

    /// Get all available template IDs.
    pub fn all() -> Vec<TemplateId> {
        vec![
            TemplateId::Gaming,
            TemplateId::Music,
            TemplateId::Friends,
            TemplateId::BloxFruits,
            TemplateId::YouTube,
        ]
    }
}

/// Where a role sits in the server hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleTier {
    Owner,
    Staff,
    /// Given to every member on join
    Member,
    Cosmetic,
}

#[derive(Debug, Clone)]
pub struct RoleSpec {
    pub key: &'static str,
    pub name: &'static str,
    pub permissions: &'static [Permission],
    pub color: u32,
    pub tier: RoleTier,
}

impl RoleSpec {
    pub fn hoist(&self) -> bool {
        matches!(self.key, "owner" | "admin" | "moderator")
    }

    pub fn mentionable(&self) -> bool {
        matches!(self.key, "owner" | "admin")
    }

    pub fn is_staff(&self) -> bool {
        matches!(self.tier, RoleTier::Owner | RoleTier::Staff)
    }
}

#[derive(Debug, Clone)]
pub struct ChannelSpec {
    pub name: &'static str,
    pub kind: ChannelKind,
    pub topic: Option<&'static str>,
}

#[derive(Debug, Clone)]
pub struct CategorySpec {
    pub key: &'static str,
    pub name: &'static str,
    pub position: u16,
    pub channels: &'static [ChannelSpec],
}

/// A complete server layout.
#[derive(Debug, Clone)]
pub struct ServerTemplate {
    pub id: TemplateId,
    pub name: &'static str,
    pub emoji: &'static str,
    pub description: &'static str,
    pub roles: &'static [RoleSpec],
    pub categories: &'static [CategorySpec],
    pub rules: &'static [&'static str],
    pub welcome: &'static str,
}

const fn text(name: &'static str, topic: &'static str) -> ChannelSpec {
    ChannelSpec {
        name,
        kind: ChannelKind::Text,
        topic: Some(topic),
    }
}

const fn voice(name: &'static str) -> ChannelSpec {
    ChannelSpec {
        name,
        kind: ChannelKind::Voice,
        topic: None,
    }
}

const fn stage(name: &'static str) -> ChannelSpec {
    ChannelSpec {
        name,
        kind: ChannelKind::Stage,
        topic: None,
    }
}

const fn role(
    key: &'static str,
    name: &'static str,
    permissions: &'static [Permission],
    color: u32,
    tier: RoleTier,
) -> RoleSpec {
    RoleSpec {
        key,
        name,
        permissions,
        color,
        tier,
    }
}

const fn category(
    key: &'static str,
    name: &'static str,
    position: u16,
    channels: &'static [ChannelSpec],
) -> CategorySpec {
    CategorySpec {
        key,
        name,
        position,
        channels,
    }
}

use Permission::*;
use RoleTier::*;

const TOS_RULE: &str = "📢 **Follow Discord TOS**: https://discord.com/terms";

static GAMING: ServerTemplate = ServerTemplate {
    id: TemplateId::Gaming,
    name: "Gaming Community",
    emoji: "🎮",
    description: "Full gaming server with game rooms, a competitive section and voice lobbies",
    roles: &[
        role("owner", "👑 Server Owner", &[Administrator], 0xff0000, Owner),
        role("head_admin", "⚡ Head Admin", &[ManageGuild, ManageRoles], 0xff4500, Staff),
        role("admin", "🔧 Admin", &[ManageChannels, ManageMessages], 0xffa500, Staff),
        role("moderator", "🛡️ Moderator", &[ManageMessages, KickMembers], 0x00ff00, Staff),
        role("event_host", "🎯 Event Host", &[MuteMembers, MoveMembers], 0x9370db, Cosmetic),
        role("vip", "⭐ VIP", &[PrioritySpeaker], 0xffff00, Cosmetic),
        role("member", "🎮 Player", &[ViewChannel], 0x00bfff, Member),
    ],
    categories: &[
        category("welcome", "🚀 START HERE", 0, &[
            text("📋rules", "Server rules and guidelines"),
            text("👋welcome", "Say hi to new players"),
            text("📢announcements", "Important server announcements"),
        ]),
        category("lobby", "💬 LOBBY", 1, &[
            text("💬general", "General discussion"),
            text("🎬clips", "Share your best plays"),
            text("📰gaming-news", "Latest gaming news"),
        ]),
        category("game_rooms", "🎮 GAME ROOMS", 2, &[
            text("🎯shooters", "FPS and battle royale talk"),
            text("🧙rpg", "RPG and MMO talk"),
            text("🎲party-games", "Casual and party games"),
        ]),
        category("competitive", "🏆 COMPETITIVE", 3, &[
            text("🏆tournaments", "Tournament announcements"),
            text("📊leaderboards", "Server leaderboards"),
            text("🤝scrims", "Find scrim partners"),
        ]),
        category("voice", "🎧 VOICE", 4, &[
            voice("🎧 Hangout"),
            voice("🎮 Squad 1"),
            voice("🎮 Squad 2"),
            voice("💤 AFK"),
        ]),
        category("staff", "🔧 STAFF ROOM", 5, &[
            text("📝mod-log", "Moderation notes"),
            text("🤖bot-commands", "Bot command channel"),
        ]),
    ],
    rules: &[
        "🎮 **Be Respectful**: No harassment, hate speech, or discrimination",
        "🚫 **No Spamming**: Don't flood channels with messages",
        "🎤 **Voice Etiquette**: No earrape, background noise, or music without consent",
        "🔞 **Keep It Clean**: Content must be appropriate for all ages",
        "⚔️ **Play Fair**: No cheating, hacking, or exploiting",
        TOS_RULE,
    ],
    welcome: "🎮 Welcome {member} to {server}! Check out the rules and introduce yourself!",
};

static MUSIC: ServerTemplate = ServerTemplate {
    id: TemplateId::Music,
    name: "Music Community",
    emoji: "🎵",
    description: "For music lovers and creators, with genre rooms and a live stage",
    roles: &[
        role("owner", "👑 Studio Owner", &[Administrator], 0xff0000, Owner),
        role("curator", "🎼 Curator", &[ManageMessages, ManageRoles], 0x00ff00, Staff),
        role("dj", "🎧 DJ", &[PrioritySpeaker, MuteMembers], 0x9370db, Cosmetic),
        role("artist", "🎤 Artist", &[AttachFiles], 0xff69b4, Cosmetic),
        role("member", "🎵 Listener", &[ViewChannel], 0x00bfff, Member),
    ],
    categories: &[
        category("welcome", "🎵 WELCOME", 0, &[
            text("🎵welcome", "Welcome to the music community!"),
            text("🎼introductions", "Introduce yourself"),
            text("📢announcements", "Important server announcements"),
        ]),
        category("music_talk", "💬 MUSIC TALK", 1, &[
            text("💬general", "General music discussion"),
            text("🎧song-requests", "Request your favorite songs"),
            text("📻music-news", "Latest music news"),
        ]),
        category("genres", "🎶 GENRES", 2, &[
            text("🎸rock-metal", "Rock and metal"),
            text("🎹electronic", "Electronic music"),
            text("🎤hiphop", "Hip-hop and rap"),
            text("🎻classical-jazz", "Classical and jazz"),
        ]),
        category("events", "🎪 EVENTS", 3, &[
            text("🎪listening-parties", "Upcoming listening parties"),
            text("🏆charts", "Weekly community charts"),
            text("📀playlists", "Share your playlists"),
        ]),
        category("stages", "🎤 STAGES", 4, &[
            voice("🎧 Lounge"),
            stage("🎤 Live Stage"),
            voice("🌙 Chill Room"),
        ]),
    ],
    rules: &[
        "🎵 **Share Responsibly**: Only share music you have the rights to",
        "🚫 **No Link Spam**: Don't flood channels with song links",
        "🎤 **Respect Artists**: No unauthorized distribution",
        "💬 **Constructive Feedback**: Be helpful in music discussions",
        TOS_RULE,
    ],
    welcome: "🎵 Welcome {member}! Share your favorite tracks and enjoy the vibe!",
};

static FRIENDS: ServerTemplate = ServerTemplate {
    id: TemplateId::Friends,
    name: "Friends Hangout",
    emoji: "👥",
    description: "A cozy server for friend groups and small communities",
    roles: &[
        role("owner", "👑 Host", &[Administrator], 0xff0000, Owner),
        role("member", "😊 Friend", &[ViewChannel], 0x00bfff, Member),
    ],
    categories: &[
        category("welcome", "👋 WELCOME", 0, &[
            text("👋welcome", "Welcome to the group!"),
            text("📌server-info", "Server information"),
            text("📢announcements", "Important server announcements"),
        ]),
        category("hangout", "💬 HANGOUT", 1, &[
            text("💬general", "General chat"),
            text("🤪random", "Random discussions"),
            text("💭thoughts", "Share your thoughts"),
        ]),
        category("media", "📸 MEDIA", 2, &[
            text("📸photos", "Share your photos"),
            text("🎬videos", "Share interesting videos"),
            text("🎵music", "Music recommendations"),
        ]),
        category("activities", "🎮 ACTIVITIES", 3, &[
            text("🎮gaming", "Gaming together"),
            text("🍿movie-night", "Movie night planning"),
        ]),
        category("voice", "🎧 VOICE", 4, &[
            voice("🎧 Hangout"),
            voice("🎮 Gaming"),
            voice("💤 AFK"),
        ]),
    ],
    rules: &[
        "👥 **Respect Privacy**: Don't share personal info without consent",
        "💬 **Be Kind**: No bullying or harassment",
        "📱 **No Spam**: Keep conversations meaningful",
        "🎮 **Include Others**: Invite people to join activities",
        TOS_RULE,
    ],
    welcome: "👋 Hey {member}! Welcome to the group. Make yourself at home!",
};

static BLOX_FRUITS: ServerTemplate = ServerTemplate {
    id: TemplateId::BloxFruits,
    name: "Blox Fruits Crew",
    emoji: "⚔️",
    description: "Crew server for Blox Fruits with bounty roles, trading and battle planning",
    roles: &[
        role("owner", "🏴‍☠️ Captain", &[Administrator], 0xff0000, Owner),
        role("vice_captain", "⭐ First Mate", &[ManageMessages, KickMembers], 0xffa500, Staff),
        role("officer", "🔧 Officer", &[ManageMessages], 0x00ff00, Staff),
        role("bounty_5m", "🌊 5M Bounty", &[ViewChannel], 0x00bfff, Cosmetic),
        role("bounty_15m", "🌊 15M Bounty", &[ViewChannel], 0x4169e1, Cosmetic),
        role("bounty_30m", "🌊 30M Bounty", &[ViewChannel], 0x8a2be2, Cosmetic),
        role("marine", "⚓ Marine", &[ViewChannel], 0x1e90ff, Cosmetic),
        role("member", "⚔️ Crew Member", &[ViewChannel], 0x808080, Member),
    ],
    categories: &[
        category("welcome", "🏴‍☠️ WELCOME ABOARD", 0, &[
            text("📜crew-rules", "Crew rules and guidelines"),
            text("👋welcome", "Welcome new crew members!"),
            text("📢announcements", "Important crew announcements"),
        ]),
        category("crew", "⚓ CREW", 1, &[
            text("📋applications", "Apply to join the crew"),
            text("🔄crew-updates", "Crew status and updates"),
            text("👥crew-chat", "General crew discussion"),
            text("🎯bounty-board", "Bounty targets and achievements"),
        ]),
        category("battle", "⚔️ BATTLE", 2, &[
            text("⚔️strategy", "Battle tactics"),
            text("🏆pvp-arena", "PvP matchmaking"),
            text("🎮game-updates", "Latest Blox Fruits updates"),
        ]),
        category("trading", "💰 TRADING", 3, &[
            text("🍎fruit-trading", "Fruit trading and values"),
            text("💎item-trading", "Item and gear trading"),
            text("💰belli-farming", "Money making strategies"),
        ]),
        category("voice", "🎧 VOICE", 4, &[
            voice("General Voice"),
            voice("Raids"),
            voice("Trading Hub"),
            voice("AFK"),
        ]),
        category("staff", "👑 OFFICER QUARTERS", 5, &[
            text("🔧officer-chat", "Officer discussions"),
            text("📊crew-stats", "Crew statistics"),
        ]),
    ],
    rules: &[
        "🏴‍☠️ **Be Respectful**: No harassment, hate speech, or discrimination",
        "⚔️ **Play Fair**: No cheating, exploiting, or hacking",
        "💰 **Trade Safely**: Use the trading channels only",
        TOS_RULE,
    ],
    welcome: "🏴‍☠️ Ahoy {member}! Welcome aboard the crew! Check the rules and introduce yourself!",
};

static YOUTUBE: ServerTemplate = ServerTemplate {
    id: TemplateId::YouTube,
    name: "YouTube Community",
    emoji: "🎬",
    description: "Community server for a YouTube channel with milestones, feedback and collabs",
    roles: &[
        role("owner", "🎬 Channel Owner", &[Administrator], 0xff0000, Owner),
        role("creator", "📹 Creator", &[ManageMessages], 0x00ff00, Staff),
        role("editor", "✂️ Editor", &[AttachFiles], 0x9370db, Cosmetic),
        role("moderator", "🛡️ Moderator", &[ManageMessages], 0x00bfff, Staff),
        role("club_1k", "🥉 1K Club", &[ViewChannel], 0xcd7f32, Cosmetic),
        role("club_10k", "🥈 10K Club", &[ViewChannel], 0xc0c0c0, Cosmetic),
        role("club_100k", "🥇 100K Club", &[ViewChannel], 0xffd700, Cosmetic),
        role("member", "👍 Subscriber", &[ViewChannel], 0x7289da, Member),
    ],
    categories: &[
        category("welcome", "🎬 WELCOME", 0, &[
            text("👋welcome", "Welcome to the community!"),
            text("📋server-rules", "Community guidelines and rules"),
            text("📢announcements", "Channel announcements and updates"),
        ]),
        category("content", "📹 CONTENT", 1, &[
            text("🎥uploads", "Latest uploads and discussion"),
            text("📊milestones", "Channel growth and milestones"),
        ]),
        category("community", "💬 COMMUNITY", 2, &[
            text("💬general", "General community discussion"),
            text("💭feedback", "Video feedback and suggestions"),
            text("🎮off-topic", "Off-topic discussion"),
        ]),
        category("collabs", "🤝 COLLABS", 3, &[
            text("🤝collab-requests", "Collaboration opportunities"),
        ]),
        category("support", "💡 SUPPORT", 4, &[
            text("❓q-and-a", "Questions about the content"),
            text("💡video-ideas", "Suggest video ideas"),
        ]),
        category("voice", "🎧 VOICE", 5, &[
            voice("General Voice"),
            voice("Content Planning"),
        ]),
    ],
    rules: &[
        "🎬 **Be Respectful**: No harassment, hate speech, or discrimination",
        "🚫 **No Self-Promo Spam**: Don't flood channels with links",
        "💬 **Constructive Feedback**: Be helpful in discussions",
        TOS_RULE,
    ],
    welcome: "🎬 Welcome {member}! Don't forget to subscribe and introduce yourself!",
};

/// Welcome text used when neither the guild nor an applied template has one.
pub const GENERIC_WELCOME: &str = "Welcome {member} to the server!";

impl ServerTemplate {
    /// Get template by ID.
    pub fn get(id: TemplateId) -> &'static ServerTemplate {
        match id {
            TemplateId::Gaming => &GAMING,
            TemplateId::Music => &MUSIC,
            TemplateId::Friends => &FRIENDS,
            TemplateId::BloxFruits => &BLOX_FRUITS,
            TemplateId::YouTube => &YOUTUBE,
        }
    }

    /// Get all available templates.
    pub fn all() -> Vec<&'static ServerTemplate> {
        TemplateId::all().into_iter().map(ServerTemplate::get).collect()
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.emoji, self.name)
    }

    pub fn role(&self, key: &str) -> Option<&RoleSpec> {
        self.roles.iter().find(|r| r.key == key)
    }

    pub fn member_role(&self) -> Option<&RoleSpec> {
        self.roles.iter().find(|r| r.tier == RoleTier::Member)
    }

    pub fn channel_count(&self) -> usize {
        self.categories.iter().map(|c| c.channels.len()).sum()
    }

    /// Every role name any template creates. Used to clear leftovers before
    /// applying a new layout.
    pub fn all_role_names() -> Vec<&'static str> {
        let mut names: Vec<&'static str> = ServerTemplate::all()
            .into_iter()
            .flat_map(|t| t.roles.iter().map(|r| r.name))
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_template_id_conversion() {
        for id in TemplateId::all() {
            assert_eq!(TemplateId::from_str(id.as_str()), Some(id));
        }
        assert_eq!(TemplateId::from_str("  Gaming "), Some(TemplateId::Gaming));
        assert_eq!(TemplateId::from_str("minecraft"), None);
    }

    #[test]
    fn test_every_template_is_well_formed() {
        for template in ServerTemplate::all() {
            let owners = template
                .roles
                .iter()
                .filter(|r| r.tier == RoleTier::Owner)
                .count();
            assert_eq!(owners, 1, "{} needs exactly one owner role", template.name);
            assert!(template.member_role().is_some(), "{} has no member role", template.name);
            assert!(template.welcome.contains("{member}"));
            assert!(!template.rules.is_empty());

            let keys: HashSet<_> = template.categories.iter().map(|c| c.key).collect();
            assert_eq!(keys.len(), template.categories.len());
            assert!(keys.contains("welcome"), "{} has no welcome category", template.name);

            let role_names: HashSet<_> = template.roles.iter().map(|r| r.name).collect();
            assert_eq!(role_names.len(), template.roles.len());
        }
    }

    #[test]
    fn test_hoist_and_mention_flags() {
        let gaming = ServerTemplate::get(TemplateId::Gaming);
        assert!(gaming.role("owner").unwrap().hoist());
        assert!(gaming.role("owner").unwrap().mentionable());
        assert!(gaming.role("moderator").unwrap().hoist());
        assert!(!gaming.role("moderator").unwrap().mentionable());
        assert!(!gaming.role("vip").unwrap().hoist());
    }

    #[test]
    fn test_all_role_names_deduplicated() {
        let names = ServerTemplate::all_role_names();
        // Moderator appears in two templates.
        assert_eq!(names.iter().filter(|n| **n == "🛡️ Moderator").count(), 1);
        assert!(names.contains(&"😊 Friend"));
    }
}

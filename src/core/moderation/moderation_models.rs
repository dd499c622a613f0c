// Moderation domain models - data structures for the auto-mod system.
//
// These are pure domain types with no Discord dependencies. The Discord
// layer builds an `IncomingMessage` from a serenity message and the service
// takes it from there.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How many history entries we keep per user before dropping the oldest.
pub const MAX_HISTORY_ENTRIES: usize = 50;
/// Length of the message excerpt stored with each warning.
pub const EXCERPT_CHARS: usize = 100;

/// What kind of rule a message broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Slurs and filter-bypass spellings
    Profanity,
    /// Sexual content outside NSFW channels
    #[serde(rename = "nsfw_conversation")]
    Nsfw,
    /// Too many messages too quickly
    Spam,
}

impl std::fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViolationKind::Profanity => write!(f, "Inappropriate Language"),
            ViolationKind::Nsfw => write!(f, "NSFW Conversation"),
            ViolationKind::Spam => write!(f, "Spam"),
        }
    }
}

/// One entry in a user's warning history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarningEntry {
    pub timestamp: DateTime<Utc>,
    /// Excerpt of the offending message
    #[serde(rename = "message")]
    pub excerpt: String,
    /// Channel name at the time of the violation
    pub channel: String,
    /// Older entries written before violations were typed have no kind.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ViolationKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<u32>,
}

impl WarningEntry {
    pub fn new(kind: ViolationKind, content: &str, channel: &str, at: DateTime<Utc>) -> Self {
        Self {
            timestamp: at,
            excerpt: content.chars().take(EXCERPT_CHARS).collect(),
            channel: channel.to_string(),
            kind: Some(kind),
            severity: None,
        }
    }

    pub fn with_severity(mut self, severity: u32) -> Self {
        self.severity = Some(severity);
        self
    }
}

/// Per-guild, per-user warning state.
///
/// `count` tracks profanity and spam, `nsfw_count` tracks NSFW violations
/// separately so each path escalates on its own counter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WarningRecord {
    #[serde(default)]
    pub count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nsfw_count: Option<u32>,
    #[serde(default)]
    pub history: Vec<WarningEntry>,
}

impl WarningRecord {
    /// Apply a violation: bump the matching counter and append the entry.
    /// Returns the new value of the counter that was bumped.
    pub fn record(&mut self, entry: WarningEntry) -> u32 {
        let new_count = match entry.kind {
            Some(ViolationKind::Nsfw) => {
                let n = self.nsfw_count.unwrap_or(0) + 1;
                self.nsfw_count = Some(n);
                n
            }
            _ => {
                self.count += 1;
                self.count
            }
        };

        self.history.push(entry);
        if self.history.len() > MAX_HISTORY_ENTRIES {
            let overflow = self.history.len() - MAX_HISTORY_ENTRIES;
            self.history.drain(..overflow);
        }

        new_count
    }

    /// Current value of the counter that `kind` escalates on.
    pub fn count_for(&self, kind: ViolationKind) -> u32 {
        match kind {
            ViolationKind::Nsfw => self.nsfw_count.unwrap_or(0),
            _ => self.count,
        }
    }
}

/// What the escalation state machine decided for a violation.
#[derive(Debug, Clone, PartialEq)]
pub enum PenaltyAction {
    /// Message deleted and a notice sent, nothing more
    Notice,
    /// Temporary ban, lifted automatically after `duration`
    TempBan { duration: Duration },
    /// Kick and reset the stored record
    Kick,
}

impl PenaltyAction {
    pub fn describe(&self) -> String {
        match self {
            PenaltyAction::Notice => "Message deleted + Notice sent".to_string(),
            PenaltyAction::TempBan { duration } => {
                let hours = duration.as_secs() / 3600;
                format!(
                    "🔨 Temporarily banned for {} hour{}",
                    hours,
                    if hours == 1 { "" } else { "s" }
                )
            }
            PenaltyAction::Kick => "👢 Kicked from server".to_string(),
        }
    }
}

/// Thresholds and durations for the auto-mod.
#[derive(Debug, Clone)]
pub struct AutoModConfig {
    /// Counter value that triggers a temporary ban (exact match)
    pub ban_at: u32,
    /// Counter value from which the user is kicked
    pub kick_at: u32,
    pub ban_duration_secs: u64,
    pub nsfw_ban_duration_secs: u64,
    /// Days of the user's messages the platform deletes on ban
    pub ban_delete_message_days: u8,
    /// Messages allowed in the spam window before it triggers
    pub spam_max_messages: usize,
    pub spam_window_secs: u64,
    /// Score at which the NSFW scorer flags a message
    pub nsfw_threshold: u32,
    /// How many channel messages the NSFW scorer looks back over
    pub history_lookback: u8,
    /// Exact name of the staff log channel
    pub staff_channel_name: String,
}

impl Default for AutoModConfig {
    fn default() -> Self {
        Self {
            ban_at: 3,
            kick_at: 5,
            ban_duration_secs: 60 * 60,
            nsfw_ban_duration_secs: 2 * 60 * 60,
            ban_delete_message_days: 1,
            spam_max_messages: 5,
            spam_window_secs: 10,
            nsfw_threshold: 2,
            history_lookback: 10,
            staff_channel_name: "staff-chat".to_string(),
        }
    }
}

impl AutoModConfig {
    pub fn ban_duration(&self, kind: ViolationKind) -> Duration {
        match kind {
            ViolationKind::Nsfw => Duration::from_secs(self.nsfw_ban_duration_secs),
            _ => Duration::from_secs(self.ban_duration_secs),
        }
    }

    /// The escalation rule: ban exactly at `ban_at`, kick from `kick_at` on.
    pub fn penalty_for(&self, kind: ViolationKind, count: u32) -> PenaltyAction {
        if count == self.ban_at {
            PenaltyAction::TempBan {
                duration: self.ban_duration(kind),
            }
        } else if count >= self.kick_at {
            PenaltyAction::Kick
        } else {
            PenaltyAction::Notice
        }
    }
}

/// The message facts the auto-mod needs, extracted by the Discord layer.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub message_id: u64,
    pub guild_id: u64,
    pub channel_id: u64,
    pub channel_name: String,
    pub channel_is_nsfw: bool,
    pub author_id: u64,
    pub author_is_bot: bool,
    pub author_is_admin: bool,
    pub content: String,
    pub sent_at: DateTime<Utc>,
}

/// What the auto-mod did with a message.
#[derive(Debug, Clone, PartialEq)]
pub struct ModerationOutcome {
    pub kind: ViolationKind,
    pub count: u32,
    pub action: PenaltyAction,
    /// Filter target or severity detail, for the staff report
    pub detail: Option<String>,
}

/// Result of re-scanning persisted bans at startup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RestoreReport {
    pub rescheduled: usize,
    pub purged: usize,
}

// Auto-moderation service - core business logic for the escalation flow.
//
// This service handles:
// - Classifying a message (slur filter, NSFW scorer, spam rate)
// - Recording the violation and picking the penalty
// - Deleting the message, notifying the member and reporting to staff
// - Temporary bans with scheduled unbans, kicks with a record reset
//
// NO Discord dependencies here - the platform is reached through
// `PlatformGateway` and persistence through `BotDataStore`.

use super::content_filter;
use super::moderation_models::{
    AutoModConfig, IncomingMessage, ModerationOutcome, PenaltyAction, RestoreReport,
    ViolationKind, WarningEntry, WarningRecord,
};
use super::moderation_notices;
use super::nsfw_scorer::{self, NsfwScore};
use super::spam_tracker::SpamTracker;
use super::unban_scheduler::UnbanScheduler;
use crate::core::bot_data::{BotDataStore, StoreError};
use crate::core::platform::{ChannelKind, OutgoingMessage, PlatformError, PlatformGateway};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum ModerationError {
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("User is not banned")]
    NotBanned,
}

// ============================================================================
// CORE SERVICE
// ============================================================================

/// What a classifier found before anything is recorded.
struct Detection {
    kind: ViolationKind,
    detail: Option<String>,
    severity: Option<u32>,
}

pub struct ModerationService<S: BotDataStore, G: PlatformGateway> {
    store: Arc<S>,
    gateway: Arc<G>,
    config: AutoModConfig,
    spam: SpamTracker,
    unbans: UnbanScheduler<S, G>,
}

impl<S, G> ModerationService<S, G>
where
    S: BotDataStore + 'static,
    G: PlatformGateway + 'static,
{
    pub fn new(store: Arc<S>, gateway: Arc<G>, config: AutoModConfig) -> Self {
        let spam = SpamTracker::new(config.spam_max_messages, config.spam_window_secs);
        let unbans = UnbanScheduler::new(Arc::clone(&store), Arc::clone(&gateway));
        Self {
            store,
            gateway,
            config,
            spam,
            unbans,
        }
    }

    pub fn config(&self) -> &AutoModConfig {
        &self.config
    }

    /// Run the auto-mod over a guild message.
    ///
    /// Returns the outcome when the message broke a rule, `None` otherwise.
    pub async fn handle_message(
        &self,
        message: &IncomingMessage,
    ) -> Result<Option<ModerationOutcome>, ModerationError> {
        if message.author_is_bot {
            return Ok(None);
        }

        match self.classify(message).await {
            Some(detection) => self.handle_violation(message, detection).await.map(Some),
            None => Ok(None),
        }
    }

    /// Classifiers in priority order, first hit wins.
    async fn classify(&self, message: &IncomingMessage) -> Option<Detection> {
        // Every message counts toward the rate, even if another rule fires.
        let rate_exceeded = self
            .spam
            .record(message.guild_id, message.author_id, message.sent_at);

        if !message.author_is_admin {
            if let Some(target) = content_filter::find_target(&message.content) {
                return Some(Detection {
                    kind: ViolationKind::Profanity,
                    detail: Some(format!("Filter: {}", target)),
                    severity: None,
                });
            }
        }

        if !message.channel_is_nsfw {
            let score = self.nsfw_score(message).await;
            if score.is_flagged(self.config.nsfw_threshold) {
                return Some(Detection {
                    kind: ViolationKind::Nsfw,
                    detail: Some(format!(
                        "Severity level {} (score {})",
                        score.severity(),
                        score.total()
                    )),
                    severity: Some(score.severity()),
                });
            }
        }

        if rate_exceeded {
            return Some(Detection {
                kind: ViolationKind::Spam,
                detail: Some(format!(
                    "{} messages in {}s",
                    self.config.spam_max_messages, self.config.spam_window_secs
                )),
                severity: None,
            });
        }

        None
    }

    /// Score the message together with the author's recent messages in the
    /// channel. History is skipped when the message flags on its own.
    async fn nsfw_score(&self, message: &IncomingMessage) -> NsfwScore {
        let own = nsfw_scorer::score(&message.content, &[]);
        if own.is_flagged(self.config.nsfw_threshold) {
            return own;
        }

        let recent = match self
            .gateway
            .recent_messages(message.channel_id, self.config.history_lookback)
            .await
        {
            Ok(recent) => recent,
            Err(e) => {
                warn!(channel_id = message.channel_id, error = %e, "Could not read channel history");
                return own;
            }
        };

        let earlier: Vec<&str> = recent
            .iter()
            .filter(|m| m.author_id == message.author_id && m.id != message.message_id)
            .map(|m| m.content.as_str())
            .collect();

        nsfw_scorer::score(&message.content, &earlier)
    }

    async fn handle_violation(
        &self,
        message: &IncomingMessage,
        detection: Detection,
    ) -> Result<ModerationOutcome, ModerationError> {
        let mut entry = WarningEntry::new(
            detection.kind,
            &message.content,
            &message.channel_name,
            message.sent_at,
        );
        if let Some(severity) = detection.severity {
            entry = entry.with_severity(severity);
        }

        let count = self
            .store
            .add_warning(message.guild_id, message.author_id, entry)
            .await?;
        let action = self.config.penalty_for(detection.kind, count);

        info!(
            guild_id = message.guild_id,
            user_id = message.author_id,
            kind = ?detection.kind,
            count,
            "Auto-mod violation"
        );

        let outcome = ModerationOutcome {
            kind: detection.kind,
            count,
            action,
            detail: detection.detail,
        };

        self.delete_offending_message(message).await;
        self.notify_member(message, detection.kind).await;
        self.report_to_staff(message, &outcome).await;
        self.apply_penalty(message, detection.kind, &outcome.action)
            .await?;

        Ok(outcome)
    }

    async fn delete_offending_message(&self, message: &IncomingMessage) {
        match self
            .gateway
            .delete_message(message.channel_id, message.message_id)
            .await
        {
            Ok(()) => {}
            Err(e) if e.is_expected() => {
                debug!(message_id = message.message_id, "Message already gone")
            }
            Err(e) => warn!(message_id = message.message_id, error = %e, "Failed to delete message"),
        }
    }

    async fn notify_member(&self, message: &IncomingMessage, kind: ViolationKind) {
        let notice = OutgoingMessage::embed(moderation_notices::member_notice(kind, Utc::now()));
        match self
            .gateway
            .send_direct_message(message.author_id, &notice)
            .await
        {
            Ok(()) => {}
            Err(e) if e.is_expected() => debug!(user_id = message.author_id, "Member has DMs closed"),
            Err(e) => warn!(user_id = message.author_id, error = %e, "Failed to send notice"),
        }
    }

    async fn report_to_staff(&self, message: &IncomingMessage, outcome: &ModerationOutcome) {
        let channel_id = match self.find_staff_channel(message.guild_id).await {
            Ok(Some(id)) => id,
            Ok(None) => {
                warn!(guild_id = message.guild_id, "No staff channel to report to");
                return;
            }
            Err(e) => {
                warn!(guild_id = message.guild_id, error = %e, "Could not list channels");
                return;
            }
        };

        let report = moderation_notices::staff_report(message, outcome, &self.config);
        if let Err(e) = self
            .gateway
            .send_message(channel_id, &OutgoingMessage::embed(report))
            .await
        {
            warn!(guild_id = message.guild_id, error = %e, "Failed to post staff report");
        }
    }

    /// The channel named exactly like the staff channel, else the first text
    /// channel mentioning staff or admin.
    pub async fn find_staff_channel(&self, guild_id: u64) -> Result<Option<u64>, PlatformError> {
        let channels = self.gateway.channels(guild_id).await?;
        let mut text = channels.iter().filter(|c| c.kind == ChannelKind::Text);

        if let Some(exact) = text
            .clone()
            .find(|c| c.name == self.config.staff_channel_name)
        {
            return Ok(Some(exact.id));
        }

        Ok(text
            .find(|c| {
                let name = c.name.to_lowercase();
                name.contains("staff") || name.contains("admin")
            })
            .map(|c| c.id))
    }

    async fn apply_penalty(
        &self,
        message: &IncomingMessage,
        kind: ViolationKind,
        action: &PenaltyAction,
    ) -> Result<(), ModerationError> {
        let (guild_id, user_id) = (message.guild_id, message.author_id);

        match action {
            PenaltyAction::Notice => Ok(()),
            PenaltyAction::TempBan { duration } => {
                let reason = match kind {
                    ViolationKind::Profanity => "Auto-mod: 3 warnings for inappropriate language",
                    ViolationKind::Nsfw => "Auto-mod: 3 NSFW content violations",
                    ViolationKind::Spam => "Auto-mod: 3 spam warnings",
                };
                self.gateway
                    .ban_member(
                        guild_id,
                        user_id,
                        self.config.ban_delete_message_days,
                        reason,
                    )
                    .await?;

                let until = message.sent_at + chrono::Duration::seconds(duration.as_secs() as i64);
                self.store.add_banned_user(user_id, until).await?;
                self.unbans.schedule(guild_id, user_id, *duration);

                info!(guild_id, user_id, %until, "Temporary ban issued");
                Ok(())
            }
            PenaltyAction::Kick => {
                let reason = match kind {
                    ViolationKind::Profanity => "Auto-mod: 5 warnings for inappropriate language",
                    ViolationKind::Nsfw => "Auto-mod: Excessive NSFW content violations",
                    ViolationKind::Spam => "Auto-mod: Excessive spam warnings",
                };
                self.gateway.kick_member(guild_id, user_id, reason).await?;
                self.store.remove_warnings(guild_id, user_id).await?;
                self.spam.forget(guild_id, user_id);

                info!(guild_id, user_id, "Member kicked, warnings reset");
                Ok(())
            }
        }
    }

    // ========================================================================
    // STARTUP
    // ========================================================================

    /// Re-scan persisted bans: reschedule the ones still running in every
    /// guild that holds them, drop the rest.
    pub async fn restore_active_bans(
        &self,
        now: DateTime<Utc>,
    ) -> Result<RestoreReport, ModerationError> {
        let bans = self.store.banned_users().await?;
        let mut report = RestoreReport::default();
        if bans.is_empty() {
            return Ok(report);
        }

        let guilds = self.gateway.guilds().await?;

        for (user_id, until) in bans {
            let remaining = match (until - now).to_std() {
                Ok(remaining) if until > now => remaining,
                _ => {
                    self.store.remove_banned_user(user_id).await?;
                    report.purged += 1;
                    continue;
                }
            };

            let mut rescheduled = false;
            for &guild_id in &guilds {
                match self.gateway.is_banned(guild_id, user_id).await {
                    Ok(true) => {
                        self.unbans.schedule(guild_id, user_id, remaining);
                        rescheduled = true;
                    }
                    Ok(false) => {}
                    Err(e) => warn!(guild_id, user_id, error = %e, "Could not check ban"),
                }
            }

            if rescheduled {
                report.rescheduled += 1;
            } else {
                self.store.remove_banned_user(user_id).await?;
                report.purged += 1;
            }
        }

        info!(
            rescheduled = report.rescheduled,
            purged = report.purged,
            "Restored temporary bans"
        );
        Ok(report)
    }

    // ========================================================================
    // ADMIN OPERATIONS
    // ========================================================================

    pub async fn warnings(
        &self,
        guild_id: u64,
        user_id: u64,
    ) -> Result<Option<WarningRecord>, ModerationError> {
        Ok(self.store.get_warnings(guild_id, user_id).await?)
    }

    /// Users with a record in the guild, highest counters first.
    pub async fn list_warnings(
        &self,
        guild_id: u64,
    ) -> Result<Vec<(u64, WarningRecord)>, ModerationError> {
        let mut records = self.store.list_warnings(guild_id).await?;
        records.sort_by_key(|(user_id, r)| {
            (
                std::cmp::Reverse(r.count + r.nsfw_count.unwrap_or(0)),
                *user_id,
            )
        });
        Ok(records)
    }

    /// Returns whether the user had a record.
    pub async fn clear_warnings(&self, guild_id: u64, user_id: u64) -> Result<bool, ModerationError> {
        Ok(self.store.remove_warnings(guild_id, user_id).await?)
    }

    /// Lift a ban now, cancelling the scheduled unban if there is one.
    pub async fn manual_unban(&self, guild_id: u64, user_id: u64) -> Result<(), ModerationError> {
        let was_pending = self.unbans.cancel(guild_id, user_id);

        match self.gateway.unban_member(guild_id, user_id).await {
            Ok(()) => {}
            Err(PlatformError::NotFound(_)) => {
                self.store.remove_banned_user(user_id).await?;
                return Err(ModerationError::NotBanned);
            }
            Err(e) => return Err(e.into()),
        }

        self.store.remove_banned_user(user_id).await?;
        info!(guild_id, user_id, was_pending, "Manual unban");
        Ok(())
    }

    pub fn is_unban_pending(&self, guild_id: u64, user_id: u64) -> bool {
        self.unbans.is_pending(guild_id, user_id)
    }

    /// Drop spam windows that have been idle for a full window.
    ///
    /// Returns how many users are still tracked.
    pub fn prune_spam_windows(&self, now: DateTime<Utc>) -> usize {
        let idle_since = now - chrono::Duration::seconds(self.config.spam_window_secs as i64);
        self.spam.prune(idle_since);
        self.spam.tracked_users()
    }
}

// ============================================================================
// TESTS
// ============================================================================

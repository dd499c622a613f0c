// Sliding-window message rate tracker.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::collections::VecDeque;

/// Tracks recent message timestamps per (guild, user).
pub struct SpamTracker {
    windows: DashMap<(u64, u64), VecDeque<DateTime<Utc>>>,
    max_messages: usize,
    window: Duration,
}

impl SpamTracker {
    pub fn new(max_messages: usize, window_secs: u64) -> Self {
        Self {
            windows: DashMap::new(),
            max_messages,
            window: Duration::seconds(window_secs as i64),
        }
    }

    /// Record a message and report whether it pushed the user over the limit.
    ///
    /// The window is emptied when it triggers, so one burst yields one hit.
    pub fn record(&self, guild_id: u64, user_id: u64, at: DateTime<Utc>) -> bool {
        let mut window = self.windows.entry((guild_id, user_id)).or_default();

        let cutoff = at - self.window;
        while window.front().is_some_and(|t| *t <= cutoff) {
            window.pop_front();
        }
        window.push_back(at);

        if window.len() >= self.max_messages {
            window.clear();
            true
        } else {
            false
        }
    }

    /// Forget a user, e.g. after they were removed from the guild.
    pub fn forget(&self, guild_id: u64, user_id: u64) {
        self.windows.remove(&(guild_id, user_id));
    }

    /// Drop windows with no activity since `older_than`.
    pub fn prune(&self, older_than: DateTime<Utc>) {
        self.windows
            .retain(|_, w| w.back().is_some_and(|t| *t > older_than));
    }

    pub fn tracked_users(&self) -> usize {
        self.windows.len()
    }
}

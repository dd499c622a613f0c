// Keyed, cancellable table of pending automatic unbans.

use crate::core::bot_data::BotDataStore;
use crate::core::platform::PlatformGateway;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

struct PendingUnban {
    /// Lets a finished task tell whether its slot was taken by a replacement.
    generation: u64,
    handle: JoinHandle<()>,
}

pub struct UnbanScheduler<S: BotDataStore, G: PlatformGateway> {
    store: Arc<S>,
    gateway: Arc<G>,
    pending: Arc<DashMap<(u64, u64), PendingUnban>>,
    next_generation: AtomicU64,
}

impl<S, G> UnbanScheduler<S, G>
where
    S: BotDataStore + 'static,
    G: PlatformGateway + 'static,
{
    pub fn new(store: Arc<S>, gateway: Arc<G>) -> Self {
        Self {
            store,
            gateway,
            pending: Arc::new(DashMap::new()),
            next_generation: AtomicU64::new(0),
        }
    }

    /// Unban `user_id` in `guild_id` after `delay`, replacing any pending unban
    /// for the same pair.
    pub fn schedule(&self, guild_id: u64, user_id: u64, delay: Duration) {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let store = Arc::clone(&self.store);
        let gateway = Arc::clone(&self.gateway);
        let pending = Arc::clone(&self.pending);

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            match gateway.unban_member(guild_id, user_id).await {
                Ok(()) => info!(guild_id, user_id, "Temporary ban expired, user unbanned"),
                Err(e) if e.is_expected() => {
                    debug!(guild_id, user_id, "Ban already lifted before scheduled unban")
                }
                Err(e) => warn!(guild_id, user_id, error = %e, "Scheduled unban failed"),
            }

            pending.remove_if(&(guild_id, user_id), |_, p| p.generation == generation);

            // The ban map is keyed by user, keep the entry while another guild still waits.
            let still_pending = pending.iter().any(|entry| entry.key().1 == user_id);
            if !still_pending {
                if let Err(e) = store.remove_banned_user(user_id).await {
                    warn!(user_id, error = %e, "Failed to remove expired ban record");
                }
            }
        });

        if let Some(previous) = self
            .pending
            .insert((guild_id, user_id), PendingUnban { generation, handle })
        {
            previous.handle.abort();
        }
    }

    /// Cancel a pending unban. Returns whether one was pending.
    pub fn cancel(&self, guild_id: u64, user_id: u64) -> bool {
        match self.pending.remove(&(guild_id, user_id)) {
            Some((_, p)) => {
                p.handle.abort();
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self, guild_id: u64, user_id: u64) -> bool {
        self.pending.contains_key(&(guild_id, user_id))
    }

    #[cfg(test)]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bot_data::mock_store::MockStore;
    use crate::core::platform::mock_gateway::MockGateway;
    use chrono::Utc;

    fn setup() -> (Arc<MockStore>, Arc<MockGateway>, UnbanScheduler<MockStore, MockGateway>) {
        let store = Arc::new(MockStore::new());
        let gateway = Arc::new(MockGateway::new().with_guild(1));
        let scheduler = UnbanScheduler::new(Arc::clone(&store), Arc::clone(&gateway));
        (store, gateway, scheduler)
    }

    #[tokio::test(start_paused = true)]
    async fn test_unban_fires_after_delay() {
        let (store, gateway, scheduler) = setup();
        gateway.state.lock().unwrap().bans.insert((1, 42));
        store.add_banned_user(42, Utc::now()).await.unwrap();

        scheduler.schedule(1, 42, Duration::from_secs(3600));
        assert!(scheduler.is_pending(1, 42));

        tokio::time::sleep(Duration::from_secs(3599)).await;
        assert!(gateway.state.lock().unwrap().unban_calls.is_empty());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(gateway.state.lock().unwrap().unban_calls, vec![(1, 42)]);
        assert!(!scheduler.is_pending(1, 42));
        assert!(store.banned_users().await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_unban() {
        let (_store, gateway, scheduler) = setup();

        scheduler.schedule(1, 42, Duration::from_secs(60));
        assert!(scheduler.cancel(1, 42));
        assert!(!scheduler.cancel(1, 42));

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert!(gateway.state.lock().unwrap().unban_calls.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_replaces_pending_task() {
        let (_store, gateway, scheduler) = setup();
        gateway.state.lock().unwrap().bans.insert((1, 42));

        scheduler.schedule(1, 42, Duration::from_secs(60));
        scheduler.schedule(1, 42, Duration::from_secs(600));
        assert_eq!(scheduler.pending_count(), 1);

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert!(gateway.state.lock().unwrap().unban_calls.is_empty());
        assert!(scheduler.is_pending(1, 42));

        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(gateway.state.lock().unwrap().unban_calls.len(), 1);
        assert!(!scheduler.is_pending(1, 42));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ban_record_kept_while_other_guild_pending() {
        let (store, gateway, scheduler) = setup();
        {
            let mut state = gateway.state.lock().unwrap();
            state.bans.insert((1, 42));
            state.bans.insert((2, 42));
        }
        store.add_banned_user(42, Utc::now()).await.unwrap();

        scheduler.schedule(1, 42, Duration::from_secs(60));
        scheduler.schedule(2, 42, Duration::from_secs(120));

        tokio::time::sleep(Duration::from_secs(90)).await;
        assert!(store.banned_users().await.unwrap().contains_key(&42));

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(store.banned_users().await.unwrap().is_empty());
    }
}

// Progress reporting for template setup.
//
// Setup deletes the channel it started reporting in, so the reporter can be
// pointed at a new channel midway. Every update degrades from editing the
// progress message, to posting a new one, to a direct message.

use crate::core::platform::{Embed, OutgoingMessage, PlatformGateway};
use tracing::debug;

pub struct SetupProgress<'a, G: PlatformGateway> {
    gateway: &'a G,
    invoker_id: u64,
    channel_id: Option<u64>,
    message_id: Option<u64>,
}

impl<'a, G: PlatformGateway> SetupProgress<'a, G> {
    pub fn new(gateway: &'a G, invoker_id: u64, channel_id: Option<u64>) -> Self {
        Self {
            gateway,
            invoker_id,
            channel_id,
            message_id: None,
        }
    }

    /// Continue reporting in another channel, starting with a fresh message.
    pub fn move_to(&mut self, channel_id: Option<u64>) {
        self.channel_id = channel_id;
        self.message_id = None;
    }

    pub async fn update(&mut self, text: &str) {
        let message = OutgoingMessage::text(text);
        if !self.deliver(&message).await {
            if let Err(e) = self.gateway.send_direct_message(self.invoker_id, &message).await {
                debug!(user_id = self.invoker_id, "Setup progress DM failed: {}", e);
            }
        }
    }

    /// Post the final embed. Falls back to a direct message and then to
    /// `fallback_channel`. Returns whether anything was delivered.
    pub async fn finish(&mut self, embed: Embed, fallback_channel: Option<u64>) -> bool {
        let message = OutgoingMessage::embed(embed);
        if self.deliver(&message).await {
            return true;
        }
        if self
            .gateway
            .send_direct_message(self.invoker_id, &message)
            .await
            .is_ok()
        {
            return true;
        }
        match fallback_channel {
            Some(channel_id) => self.gateway.send_message(channel_id, &message).await.is_ok(),
            None => false,
        }
    }

    /// Edit the progress message in place, or post a new one in the
    /// progress channel.
    async fn deliver(&mut self, message: &OutgoingMessage) -> bool {
        let Some(channel_id) = self.channel_id else {
            return false;
        };

        if let Some(message_id) = self.message_id {
            match self.gateway.edit_message(channel_id, message_id, message).await {
                Ok(()) => return true,
                Err(e) => debug!(channel_id, "Editing setup progress failed: {}", e),
            }
        }

        match self.gateway.send_message(channel_id, message).await {
            Ok(id) => {
                self.message_id = Some(id);
                true
            }
            Err(e) => {
                debug!(channel_id, "Posting setup progress failed: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::platform::mock_gateway::MockGateway;
    use crate::core::platform::ChannelKind;

    #[tokio::test]
    async fn test_second_update_edits_in_place() {
        let gateway = MockGateway::new().with_guild(1);
        let channel = gateway.add_channel(1, "general", ChannelKind::Text);

        let mut progress = SetupProgress::new(&gateway, 42, Some(channel));
        progress.update("step 1").await;
        progress.update("step 2").await;

        let state = gateway.state.lock().unwrap();
        assert_eq!(state.sent.len(), 1);
        assert_eq!(state.edited.len(), 1);
        assert_eq!(state.edited[0].2.content.as_deref(), Some("step 2"));
        assert!(state.dms.is_empty());
    }

    #[tokio::test]
    async fn test_deleted_channel_falls_back_to_dm() {
        let gateway = MockGateway::new().with_guild(1);
        let channel = gateway.add_channel(1, "general", ChannelKind::Text);

        let mut progress = SetupProgress::new(&gateway, 42, Some(channel));
        progress.update("starting").await;
        gateway.delete_channel(channel).await.unwrap();
        progress.update("deleting").await;

        let state = gateway.state.lock().unwrap();
        assert_eq!(state.dms.len(), 1);
        assert_eq!(state.dms[0].0, 42);
    }

    #[tokio::test]
    async fn test_move_to_starts_new_message() {
        let gateway = MockGateway::new().with_guild(1);
        let first = gateway.add_channel(1, "general", ChannelKind::Text);
        let second = gateway.add_channel(1, "setup-progress", ChannelKind::Text);

        let mut progress = SetupProgress::new(&gateway, 42, Some(first));
        progress.update("one").await;
        progress.move_to(Some(second));
        progress.update("two").await;

        let state = gateway.state.lock().unwrap();
        assert_eq!(state.sent.len(), 2);
        assert_eq!(state.sent[1].0, second);
    }

    #[tokio::test]
    async fn test_finish_uses_fallback_channel_last() {
        let gateway = MockGateway::new().with_guild(1);
        let fallback = gateway.add_channel(1, "general", ChannelKind::Text);
        gateway.state.lock().unwrap().dm_closed.insert(42);

        let mut progress = SetupProgress::new(&gateway, 42, None);
        assert!(progress.finish(Embed::new("done"), Some(fallback)).await);

        let state = gateway.state.lock().unwrap();
        assert_eq!(state.sent[0].0, fallback);
    }
}

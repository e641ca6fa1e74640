use std::sync::Arc;

use serenity::async_trait;
use serenity::http::Http;
use serenity::model::id::ChannelId;
use tracing::error;

use crate::commands::timer::models::ChannelRef;
use crate::error::Result;

/// Outbound port for messages that aren't a reply to the current command.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn broadcast(&self, channel: &ChannelRef, content: &str) -> Result<()>;
}

pub struct HttpNotifier {
    http: Arc<Http>,
}

impl HttpNotifier {
    pub fn new(http: Arc<Http>) -> Self {
        HttpNotifier { http }
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn broadcast(&self, channel: &ChannelRef, content: &str) -> Result<()> {
        ChannelId::new(channel.get_channel_id())
            .say(self.http.as_ref(), content)
            .await?;
        Ok(())
    }
}

// Best-effort delivery: failures are logged and never reach the users.
pub async fn deliver(notifier: &dyn Notifier, channel: &ChannelRef, content: &str) {
    if let Err(err) = notifier.broadcast(channel, content).await {
        error!(
            "Can't send the message to the channel {} ({}): {}",
            channel.display_name(),
            channel.get_channel_id(),
            err.to_string()
        );
    }
}

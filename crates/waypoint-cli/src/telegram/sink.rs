//! Notification delivery through the Bot API.

use jiff::tz::TimeZone;
use log::{debug, warn};
use teloxide::{
    prelude::*,
    types::{ChatId, UserId},
};
use tokio::{sync::mpsc, task::JoinHandle};
use waypoint_core::{Event, NotificationSink};

use super::{keyboards, texts};

/// Queues events for a background task that sends them one at a time.
///
/// `notify` never blocks, so it is safe to call from inside a sweep. The
/// delivery task finishes once every clone of the sink is dropped and the
/// queue is drained.
#[derive(Clone)]
pub struct TelegramSink {
    queue: mpsc::UnboundedSender<(u64, Event)>,
}

impl TelegramSink {
    pub fn spawn(bot: Bot, timezone: TimeZone) -> (Self, JoinHandle<()>) {
        let (queue, mut pending) = mpsc::unbounded_channel::<(u64, Event)>();
        let delivery = tokio::spawn(async move {
            while let Some((user_id, event)) = pending.recv().await {
                deliver(&bot, &timezone, user_id, &event).await;
            }
            debug!("notification queue closed");
        });
        (Self { queue }, delivery)
    }
}

impl NotificationSink for TelegramSink {
    fn notify(&self, user_id: u64, event: Event) {
        let kind = event.kind();
        if self.queue.send((user_id, event)).is_err() {
            warn!("delivery task stopped, dropping {kind} for user {user_id}");
        }
    }
}

async fn deliver(bot: &Bot, timezone: &TimeZone, user_id: u64, event: &Event) {
    let chat = ChatId::from(UserId(user_id));
    let mut request = bot.send_message(chat, texts::event_text(event, timezone));
    if let Some(markup) = keyboards::for_event(event) {
        request = request.reply_markup(markup);
    }
    match request.await {
        Ok(_) => debug!("delivered {} to user {user_id}", event.kind()),
        // Blocked bots and deleted chats end up here.
        Err(e) => warn!("failed to deliver {} to user {user_id}: {e}", event.kind()),
    }
}

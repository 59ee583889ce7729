//! Consume outage events from the queue and notify the subscribers of the
//! affected addresses.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use teloxide::prelude::*;
use tokio::select;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::db::{self, DbPool};
use crate::metrics::Metrics;
use crate::models::OutageEvent;
use crate::utils::ResultExt as _;

mod render;

pub use render::notification_text;

/// A received queue message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueMessage {
    pub body: String,
    pub receipt_handle: String,
}

pub trait OutageQueue {
    /// Long-poll for at most one message.
    fn receive(&self) -> impl Future<Output = Result<Vec<QueueMessage>>> + Send;

    /// Acknowledge a message so it is never redelivered.
    fn delete(&self, receipt_handle: &str) -> impl Future<Output = Result<()>> + Send;
}

pub trait SubscriberLookup {
    /// Chats subscribed to any of `kladr_codes`.
    fn subscribers(&self, kladr_codes: &[&str]) -> Result<Vec<ChatId>>;
}

pub trait Notifier {
    fn notify(
        &self,
        chat_id: ChatId,
        text: String,
    ) -> impl Future<Output = Result<()>> + Send;
}

impl SubscriberLookup for DbPool {
    fn subscribers(&self, kladr_codes: &[&str]) -> Result<Vec<ChatId>> {
        let tg_ids =
            db::with_conn(self, |conn| db::subscribers_of(conn, kladr_codes))?;
        Ok(tg_ids
            .into_iter()
            .filter_map(|tg_id| {
                ChatId::try_from(tg_id.clone())
                    .log_ok(&format!("Bad tg_id {tg_id:?}"))
            })
            .collect())
    }
}

impl Notifier for Bot {
    async fn notify(&self, chat_id: ChatId, text: String) -> Result<()> {
        self.send_message(chat_id, text).await?;
        Ok(())
    }
}

/// What happened to a single queue message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// The body is not a valid outage event.
    Malformed,
    /// Not a shutdown event.
    Ignored,
    Notified { sent: usize, failed: usize },
    /// Subscribers could not be loaded; the message stays on the queue.
    LookupFailed,
}

impl Disposition {
    pub const fn should_delete(self) -> bool {
        !matches!(self, Self::LookupFailed)
    }
}

pub struct Poller<Q, S, N> {
    pub queue: Q,
    pub subscribers: S,
    pub notifier: N,
    pub metrics: Arc<Metrics>,
    pub retry_delay: Duration,
}

impl<Q, S, N> Poller<Q, S, N>
where
    Q: OutageQueue + Sync,
    S: SubscriberLookup + Sync,
    N: Notifier + Sync,
{
    pub async fn run(&self, shutdown: CancellationToken) {
        log::info!("Queue poller started");
        loop {
            let received = select! {
                biased;
                () = shutdown.cancelled() => break,
                received = self.queue.receive() => received,
            };

            match received {
                Ok(messages) => {
                    for message in messages {
                        self.process(message).await;
                    }
                }
                Err(e) => {
                    log::error!("Error receiving message: {e:#}");
                    select! {
                        () = shutdown.cancelled() => break,
                        () = sleep(self.retry_delay) => {}
                    }
                }
            }
        }
        log::info!("Queue poller stopped");
    }

    async fn process(&self, message: QueueMessage) -> Disposition {
        let disposition = self.handle_body(&message.body).await;
        log::debug!("Message processed: {disposition:?}");
        if disposition.should_delete() {
            self.queue
                .delete(&message.receipt_handle)
                .await
                .log_ok("Error deleting message");
        } else {
            log::warn!("Leaving message on the queue for redelivery");
        }
        disposition
    }

    pub async fn handle_body(&self, body: &str) -> Disposition {
        let event: OutageEvent = match serde_json::from_str(body) {
            Ok(event) => event,
            Err(e) => {
                log::error!("Error decoding message {body:?}: {e}");
                return Disposition::Malformed;
            }
        };
        if !event.is_shutdown() {
            return Disposition::Ignored;
        }
        self.notify_subscribers(&event).await
    }

    async fn notify_subscribers(&self, event: &OutageEvent) -> Disposition {
        let kladr_codes = event.kladr_codes();
        if kladr_codes.is_empty() {
            log::warn!("Event {} has no KLADR codes", event.id);
            return Disposition::Notified { sent: 0, failed: 0 };
        }

        let chats = match self.subscribers.subscribers(&kladr_codes) {
            Ok(chats) => chats,
            Err(e) => {
                log::error!("Error querying subscriptions: {e:#}");
                return Disposition::LookupFailed;
            }
        };

        let text = notification_text(event);
        let (mut sent, mut failed) = (0, 0);
        for chat_id in chats {
            match self.notifier.notify(chat_id, text.clone()).await {
                Ok(()) => {
                    self.metrics.record_sent_message(&event.service);
                    sent += 1;
                }
                Err(e) => {
                    log::error!("Error sending message to {}: {e:#}", chat_id.0);
                    failed += 1;
                }
            }
        }
        log::info!(
            "Event {}: notified {sent} chats, {failed} failed",
            event.id
        );
        Disposition::Notified { sent, failed }
    }
}

//! Outbound network adapter.
//!
//! - [`WebhookPort`]: queues the payload on
//!   [`WEBHOOK_CHANNEL`](crate::channels::WEBHOOK_CHANNEL); the
//!   [`webhook_task`](super::webhook_task) thread performs the `POST`.
//! - [`NotificationPort`]: publishes the snapshot on
//!   [`SNAPSHOT_CHANNEL`](crate::channels::SNAPSHOT_CHANNEL) for the UI push
//!   task.
//!
//! Both paths return immediately and drop the message with
//! [`NotificationError::QueueFull`] when the consumer falls behind.
//! Neither path retries.

use log::debug;

use crate::app::events::{StateSnapshot, WebhookPayload};
use crate::app::ports::{NotificationPort, WebhookPort};
use crate::channels::{SNAPSHOT_CHANNEL, WEBHOOK_CHANNEL, WebhookJob};
use crate::config::WebhookUrl;
use crate::error::NotificationError;

#[derive(Default)]
pub struct NetAdapter {
    webhooks_queued: u32,
}

impl NetAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Webhooks accepted by the delivery queue.
    pub fn webhooks_queued(&self) -> u32 {
        self.webhooks_queued
    }
}

impl WebhookPort for NetAdapter {
    fn send(&mut self, url: &str, payload: &WebhookPayload) -> Result<(), NotificationError> {
        let mut job_url = WebhookUrl::new();
        job_url.push_str(url).map_err(|()| NotificationError::Encode)?;
        WEBHOOK_CHANNEL
            .try_send(WebhookJob {
                url: job_url,
                payload: payload.clone(),
            })
            .map_err(|_| NotificationError::QueueFull)?;
        self.webhooks_queued = self.webhooks_queued.wrapping_add(1);
        debug!("Webhook queued: cause={} speed={}", payload.cause, payload.speed);
        Ok(())
    }
}

impl NotificationPort for NetAdapter {
    fn broadcast(&mut self, snapshot: &StateSnapshot) -> Result<(), NotificationError> {
        SNAPSHOT_CHANNEL
            .try_send(snapshot.clone())
            .map_err(|_| NotificationError::QueueFull)
    }
}

//! Inter-task communication channels.
//!
//! Uses `embassy-sync` bounded MPMC channels to bridge the HTTP/UI tasks
//! and the webhook delivery thread with the synchronous control loop.
//!
//! ```text
//! ┌──────────────┐  AppCommand    ┌──────────────┐  WebhookJob  ┌──────────────┐
//! │  HTTP / UI   │──────────────▶│ Control Loop │─────────────▶│ Webhook task │
//! │  tasks       │◀──────────────│ (sync)       │              │ (I/O thread) │
//! └──────────────┘ StateSnapshot  └──────────────┘              └──────────────┘
//! ```
//!
//! The loop never blocks on any channel: commands are drained with
//! `try_receive`, snapshots and webhook jobs are published with `try_send`
//! and dropped when the consumer falls behind.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use crate::app::commands::AppCommand;
use crate::app::events::{StateSnapshot, WebhookPayload};
use crate::config::WebhookUrl;

/// Channel depth for inbound commands.
const CMD_DEPTH: usize = 8;

/// Channel depth for outbound snapshots.
const SNAPSHOT_DEPTH: usize = 4;

/// Channel depth for queued webhook deliveries.
pub const WEBHOOK_DEPTH: usize = 8;

/// One webhook POST waiting for the delivery task.
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookJob {
    pub url: WebhookUrl,
    pub payload: WebhookPayload,
}

/// Inbound command channel: HTTP/UI tasks → control loop.
pub static COMMAND_CHANNEL: Channel<CriticalSectionRawMutex, AppCommand, CMD_DEPTH> = Channel::new();

/// Outbound snapshot channel: control loop → UI push task.
pub static SNAPSHOT_CHANNEL: Channel<CriticalSectionRawMutex, StateSnapshot, SNAPSHOT_DEPTH> = Channel::new();

/// Outbound webhook channel: control loop → webhook delivery task (FIFO).
pub static WEBHOOK_CHANNEL: Channel<CriticalSectionRawMutex, WebhookJob, WEBHOOK_DEPTH> = Channel::new();

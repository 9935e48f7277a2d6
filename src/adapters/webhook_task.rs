//! Webhook delivery task.
//!
//! Owns the HTTP client and drains
//! [`WEBHOOK_CHANNEL`](crate::channels::WEBHOOK_CHANNEL) on its own thread,
//! so a slow or unreachable endpoint never stalls the control loop.  A
//! single consumer posts jobs in the order they were queued.
//!
//! ```text
//! control loop ──try_send──▶ WEBHOOK_CHANNEL ──receive──▶ delivery_loop ──POST──▶ endpoint
//! ```

use core::time::Duration;

use log::{debug, info, warn};

use crate::channels::{WEBHOOK_CHANNEL, WebhookJob};
use crate::error::NotificationError;

/// Upper bound for one webhook request.
pub const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(5);

/// Stack for the delivery thread (HTTP client plus TLS handshake).
const WEBHOOK_TASK_STACK: usize = 16 * 1024;

/// Blocking HTTP client used by the delivery thread.
#[derive(Default)]
pub struct WebhookClient {
    delivered: u32,
    failed: u32,
}

impl WebhookClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delivered(&self) -> u32 {
        self.delivered
    }

    pub fn failed(&self) -> u32 {
        self.failed
    }

    /// Serialise and `POST` one job.
    pub fn deliver(&mut self, job: &WebhookJob) -> Result<(), NotificationError> {
        let result = serde_json::to_vec(&job.payload)
            .map_err(|_| NotificationError::Encode)
            .and_then(|body| self.post_json(&job.url, &body));
        match result {
            Ok(()) => {
                self.delivered = self.delivered.wrapping_add(1);
                debug!("Webhook sent: cause={} speed={}", job.payload.cause, job.payload.speed);
            }
            Err(_) => self.failed = self.failed.wrapping_add(1),
        }
        result
    }

    #[cfg(target_os = "espidf")]
    fn post_json(&mut self, url: &str, body: &[u8]) -> Result<(), NotificationError> {
        use esp_idf_svc::http::Method;
        use esp_idf_svc::http::client::{Configuration, EspHttpConnection};

        let config = Configuration {
            timeout: Some(WEBHOOK_TIMEOUT),
            crt_bundle_attach: Some(esp_idf_svc::sys::esp_crt_bundle_attach),
            ..Default::default()
        };
        let mut conn = EspHttpConnection::new(&config).map_err(|_| NotificationError::Connect)?;

        let len = body.len().to_string();
        let headers = [("Content-Type", "application/json"), ("Content-Length", len.as_str())];
        conn.initiate_request(Method::Post, url, &headers)
            .map_err(|_| NotificationError::Connect)?;

        let mut rest = body;
        while !rest.is_empty() {
            let n = conn.write(rest).map_err(|_| NotificationError::Timeout)?;
            if n == 0 {
                return Err(NotificationError::Timeout);
            }
            rest = &rest[n..];
        }

        conn.initiate_response().map_err(|_| NotificationError::Timeout)?;
        match conn.status() {
            200..=299 => Ok(()),
            code => Err(NotificationError::Status(code)),
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn post_json(&mut self, url: &str, body: &[u8]) -> Result<(), NotificationError> {
        if url.is_empty() {
            return Err(NotificationError::Connect);
        }
        debug!("Webhook (sim) POST {} {}", url, String::from_utf8_lossy(body));
        Ok(())
    }
}

/// Spawn the delivery thread.
pub fn spawn(client: WebhookClient) -> std::io::Result<std::thread::JoinHandle<()>> {
    std::thread::Builder::new()
        .name("webhook".into())
        .stack_size(WEBHOOK_TASK_STACK)
        .spawn(move || run(client))
}

/// Runs the delivery loop on a single-threaded executor; never returns.
fn run(client: WebhookClient) {
    let executor: edge_executor::LocalExecutor<'_, 4> = edge_executor::LocalExecutor::new();
    executor.spawn(delivery_loop(client)).detach();
    info!("Webhook task running (timeout {} ms)", WEBHOOK_TIMEOUT.as_millis());
    futures_lite::future::block_on(executor.run(core::future::pending::<()>()));
}

async fn delivery_loop(mut client: WebhookClient) {
    loop {
        let job = WEBHOOK_CHANNEL.receive().await;
        if let Err(e) = client.deliver(&job) {
            warn!("Webhook to {} failed: {} ({} failed so far)", job.url, e, client.failed());
        }
    }
}

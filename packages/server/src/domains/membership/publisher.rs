//! Best-effort delivery of audit payloads to the broker.
//!
//! One attempt per payload, bounded by a timeout. Failures are logged and
//! counted here and handed back as a `PublishResult`; they are never turned
//! into an error for the mutation that produced the payload.

use bytes::Bytes;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use super::formatter::NotificationPayload;
use crate::kernel::NatsPublisher;

/// Default NATS subject for membership audit events.
pub const DEFAULT_SUBJECT: &str = "project.publish";

/// Default bound on one publish attempt.
pub const DEFAULT_PUBLISH_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Failed to serialize payload: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Publish timed out after {0:?}")]
    Timeout(Duration),

    #[error("Broker error: {0}")]
    Broker(anyhow::Error),
}

/// Outcome of one publish attempt.
#[derive(Debug)]
pub enum PublishResult {
    Delivered,
    Failed(PublishError),
}

impl PublishResult {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

/// Running totals of publish outcomes.
#[derive(Debug, Default)]
pub struct PublishStats {
    delivered: AtomicU64,
    failed: AtomicU64,
}

impl PublishStats {
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    fn record(&self, result: &PublishResult) {
        let counter = match result {
            PublishResult::Delivered => &self.delivered,
            PublishResult::Failed(_) => &self.failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Publishes `NotificationPayload`s to a fixed subject.
#[derive(Clone)]
pub struct NotificationPublisher {
    nats: Arc<dyn NatsPublisher>,
    subject: String,
    timeout: Duration,
    stats: Arc<PublishStats>,
}

impl NotificationPublisher {
    pub fn new(nats: Arc<dyn NatsPublisher>, subject: impl Into<String>, timeout: Duration) -> Self {
        Self {
            nats,
            subject: subject.into(),
            timeout,
            stats: Arc::new(PublishStats::default()),
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn stats(&self) -> &PublishStats {
        &self.stats
    }

    /// Serialize and publish `payload` once.
    pub async fn publish(&self, payload: &NotificationPayload) -> PublishResult {
        let result = self.attempt(payload).await;
        self.stats.record(&result);

        match &result {
            PublishResult::Delivered => info!(
                subject = %self.subject,
                project_id = %payload.project_id,
                action = %payload.action,
                "published membership notification"
            ),
            PublishResult::Failed(e) => warn!(
                error = %e,
                subject = %self.subject,
                project_id = %payload.project_id,
                action = %payload.action,
                "Failed to publish membership notification"
            ),
        }

        result
    }

    async fn attempt(&self, payload: &NotificationPayload) -> PublishResult {
        let bytes = match serde_json::to_vec(payload) {
            Ok(bytes) => Bytes::from(bytes),
            Err(e) => return PublishResult::Failed(e.into()),
        };

        let send = self.nats.publish(self.subject.clone(), bytes);
        match tokio::time::timeout(self.timeout, send).await {
            Ok(Ok(())) => PublishResult::Delivered,
            Ok(Err(e)) => PublishResult::Failed(PublishError::Broker(e)),
            Err(_) => PublishResult::Failed(PublishError::Timeout(self.timeout)),
        }
    }
}

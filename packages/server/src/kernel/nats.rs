//! NATS client abstraction for production and testing.
//!
//! Provides a trait-based NATS implementation that allows swapping between
//! a real NATS connection and test doubles that record, fail or stall.

use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::RwLock;
use std::time::Duration;
use tracing::info;

/// A published message.
#[derive(Debug, Clone)]
pub struct PublishedMessage {
    pub subject: String,
    pub payload: Bytes,
}

/// Trait for NATS publish operations.
///
/// This allows swapping between real NATS and test mocks.
#[async_trait]
pub trait NatsPublisher: Send + Sync {
    /// Publish a message to a subject.
    async fn publish(&self, subject: String, payload: Bytes) -> Result<()>;
}

/// Real NATS client publisher.
///
/// `async_nats::Client` multiplexes one connection and is cheap to clone, so
/// a single publisher is shared by every concurrent mutation.
pub struct NatsClientPublisher {
    client: async_nats::Client,
}

impl NatsClientPublisher {
    pub fn new(client: async_nats::Client) -> Self {
        Self { client }
    }

    /// Connect to `url`.
    ///
    /// With `retry_on_initial_connect` the call returns even when the broker
    /// is down; the client keeps reconnecting in the background and publishes
    /// stall until it does, which the caller's publish timeout bounds.
    pub async fn connect(url: &str, connection_timeout: Duration) -> Result<Self> {
        let client = async_nats::ConnectOptions::new()
            .name("membership-notify")
            .connection_timeout(connection_timeout)
            .retry_on_initial_connect()
            .connect(url)
            .await
            .with_context(|| format!("Failed to connect to NATS at {}", url))?;

        info!(url = %url, "NATS client created");
        Ok(Self::new(client))
    }
}

#[async_trait]
impl NatsPublisher for NatsClientPublisher {
    async fn publish(&self, subject: String, payload: Bytes) -> Result<()> {
        self.client.publish(subject, payload).await?;
        // Flush so success means the server connection took the bytes,
        // not just the client's outbound buffer.
        self.client.flush().await?;
        Ok(())
    }
}

/// Mock NATS client that tracks published messages for testing.
///
/// This allows tests to inspect what messages would have been published
/// to NATS without requiring a real connection.
#[derive(Default)]
pub struct TestNats {
    published: RwLock<Vec<PublishedMessage>>,
}

impl TestNats {
    /// Create a new test NATS client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a published message.
    pub fn record_publish(&self, subject: String, payload: Bytes) {
        self.published
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(PublishedMessage { subject, payload });
    }

    /// Get all published messages.
    pub fn published_messages(&self) -> Vec<PublishedMessage> {
        self.published
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Get published messages for a specific subject.
    pub fn messages_for_subject(&self, subject: &str) -> Vec<PublishedMessage> {
        self.published
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|m| m.subject == subject)
            .cloned()
            .collect()
    }

    /// Check if any message was published to a subject.
    pub fn was_published_to(&self, subject: &str) -> bool {
        self.published
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .any(|m| m.subject == subject)
    }

    /// Get the count of published messages.
    pub fn publish_count(&self) -> usize {
        self.published
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// Clear all recorded messages.
    pub fn clear(&self) {
        self.published
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    /// Deserialize a published message payload as JSON.
    pub fn deserialize_message<T: serde::de::DeserializeOwned>(
        &self,
        msg: &PublishedMessage,
    ) -> std::result::Result<T, serde_json::Error> {
        serde_json::from_slice(&msg.payload)
    }

    /// Deserialize every published payload as JSON, in publish order.
    pub fn deserialize_all<T: serde::de::DeserializeOwned>(
        &self,
    ) -> std::result::Result<Vec<T>, serde_json::Error> {
        self.published_messages()
            .iter()
            .map(|m| self.deserialize_message(m))
            .collect()
    }
}

#[async_trait]
impl NatsPublisher for TestNats {
    async fn publish(&self, subject: String, payload: Bytes) -> Result<()> {
        self.record_publish(subject, payload);
        Ok(())
    }
}

/// Publisher whose broker is always unreachable. Counts attempts.
#[derive(Default)]
pub struct FailingNats {
    attempts: RwLock<Vec<String>>,
}

impl FailingNats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subjects publishing was attempted on.
    pub fn attempts(&self) -> Vec<String> {
        self.attempts
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl NatsPublisher for FailingNats {
    async fn publish(&self, subject: String, _payload: Bytes) -> Result<()> {
        self.attempts
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(subject.clone());
        anyhow::bail!("connection refused publishing to {}", subject)
    }
}

/// Publisher that never completes, like a broker that accepted the TCP
/// connection and then went silent.
#[derive(Default)]
pub struct StalledNats;

#[async_trait]
impl NatsPublisher for StalledNats {
    async fn publish(&self, _subject: String, _payload: Bytes) -> Result<()> {
        std::future::pending::<()>().await;
        Ok(())
    }
}

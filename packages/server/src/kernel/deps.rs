//! Server dependencies for membership actions (using traits for testability)
//!
//! This module provides the dependency container used by the membership
//! service. All external services use trait abstractions to enable testing.

use std::sync::Arc;

use crate::kernel::{BaseClock, BaseMembershipStore, BaseUserDirectory, NatsPublisher, SystemClock};

// =============================================================================
// ServerDeps
// =============================================================================

/// Dependencies accessible to membership actions
#[derive(Clone)]
pub struct ServerDeps {
    pub store: Arc<dyn BaseMembershipStore>,
    pub directory: Arc<dyn BaseUserDirectory>,
    pub nats: Arc<dyn NatsPublisher>,
    pub clock: Arc<dyn BaseClock>,
}

impl ServerDeps {
    /// Create new ServerDeps using the wall clock
    pub fn new(
        store: Arc<dyn BaseMembershipStore>,
        directory: Arc<dyn BaseUserDirectory>,
        nats: Arc<dyn NatsPublisher>,
    ) -> Self {
        Self {
            store,
            directory,
            nats,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock (tests pin time with `FixedClock`)
    pub fn with_clock(mut self, clock: Arc<dyn BaseClock>) -> Self {
        self.clock = clock;
        self
    }
}

//! Test harness wiring the membership service to in-memory dependencies.
//!
//! Fixture: project 7 "Apollo"; users Alice (1), Carol (2), Dave (3);
//! roles Manager (1), Developer (2), Reporter (3); a "Phone Number"
//! attribute (10) set for Alice and Carol only. The clock is pinned to
//! 2024-01-01 00:00 UTC, a Monday at 07:00 in UTC+7.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;
use std::time::Duration;

use membership_core::common::{Actor, ProjectId, RoleId, UserId};
use membership_core::config::NotificationSettings;
use membership_core::domains::membership::{MembershipService, NotificationPayload};
use membership_core::kernel::{
    InMemoryMembershipStore, MockUserDirectory, NatsPublisher, TestDependencies, TestNats,
};

pub const APOLLO: ProjectId = ProjectId::new(7);
pub const ALICE: UserId = UserId::new(1);
pub const CAROL: UserId = UserId::new(2);
pub const DAVE: UserId = UserId::new(3);
pub const MANAGER: RoleId = RoleId::new(1);
pub const DEVELOPER: RoleId = RoleId::new(2);
pub const REPORTER: RoleId = RoleId::new(3);
pub const PHONE_ATTRIBUTE_ID: i64 = 10;

/// Rendered date suffix for the pinned clock.
pub const WHEN: &str = "pada hari Senin, tanggal 01 Januari 2024, Jam 07:00";

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

pub fn bob() -> Actor {
    Actor::new(UserId::new(99), "Bob")
}

pub fn init_tracing() {
    // Run tests with: RUST_LOG=debug cargo test -- --nocapture
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn fixture_store() -> InMemoryMembershipStore {
    InMemoryMembershipStore::new()
        .with_project(7, "Apollo")
        .with_project(8, "Gemini")
        .with_user(1, "Alice")
        .with_user(2, "Carol")
        .with_user(3, "Dave")
        .with_role(1, "Manager")
        .with_role(2, "Developer")
        .with_role(3, "Reporter")
}

pub fn fixture_directory() -> MockUserDirectory {
    MockUserDirectory::new()
        .with_attribute(PHONE_ATTRIBUTE_ID, "Phone Number")
        .with_value(1, PHONE_ATTRIBUTE_ID, "+6281111111")
        .with_value(2, PHONE_ATTRIBUTE_ID, "+6282222222")
}

pub struct TestHarness {
    pub service: MembershipService,
    pub store: Arc<InMemoryMembershipStore>,
    pub directory: Arc<MockUserDirectory>,
    pub nats: Arc<TestNats>,
}

impl TestHarness {
    pub async fn new() -> Self {
        Self::build(fixture_directory(), NotificationSettings::default()).await
    }

    pub async fn with_directory(directory: MockUserDirectory) -> Self {
        Self::build(directory, NotificationSettings::default()).await
    }

    async fn build(directory: MockUserDirectory, settings: NotificationSettings) -> Self {
        init_tracing();

        let nats = Arc::new(TestNats::new());
        let deps = TestDependencies::new()
            .mock_store(fixture_store())
            .mock_directory(directory)
            .mock_nats(nats.clone())
            .at(fixed_now());

        let store = deps.store.clone();
        let directory = deps.directory.clone();
        let service = MembershipService::new(deps.into_deps(), &settings).await;

        Self {
            service,
            store,
            directory,
            nats,
        }
    }

    /// Payloads published so far, in order.
    pub fn payloads(&self) -> Vec<NotificationPayload> {
        self.nats.deserialize_all().unwrap()
    }
}

/// Service wired to an arbitrary broker double with a short publish timeout.
pub async fn service_with_broker(
    nats: Arc<dyn NatsPublisher>,
) -> (MembershipService, Arc<InMemoryMembershipStore>) {
    init_tracing();

    let settings = NotificationSettings {
        publish_timeout: Duration::from_millis(50),
        ..NotificationSettings::default()
    };
    let deps = TestDependencies::new()
        .mock_store(fixture_store())
        .mock_directory(fixture_directory())
        .mock_nats(nats)
        .at(fixed_now());

    let store = deps.store.clone();
    let service = MembershipService::new(deps.into_deps(), &settings).await;
    (service, store)
}

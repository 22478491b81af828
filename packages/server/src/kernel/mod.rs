//! Kernel module - infrastructure traits, broker client and dependencies.

pub mod deps;
pub mod nats;
pub mod test_dependencies;
pub mod traits;

pub use deps::ServerDeps;
pub use nats::{FailingNats, NatsClientPublisher, NatsPublisher, PublishedMessage, StalledNats, TestNats};
pub use test_dependencies::{FixedClock, InMemoryMembershipStore, MockUserDirectory, TestDependencies};
pub use traits::*;

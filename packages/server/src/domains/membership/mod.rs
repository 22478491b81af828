//! Membership domain - project members and their audit notifications
//!
//! Architecture:
//!   MembershipService → action (persist via store) → EventFormatter → NotificationPublisher

pub mod actions;
pub mod events;
pub mod formatter;
pub mod models;
pub mod publisher;
pub mod service;

// Re-export commonly used types
pub use events::{MembershipAction, MembershipChangeFact};
pub use formatter::{EventFormatter, MessageLocale, NotificationPayload};
pub use models::{MemberRole, Membership, NewMembership, Project, Role, User};
pub use publisher::{NotificationPublisher, PublishError, PublishResult, PublishStats};
pub use service::MembershipService;

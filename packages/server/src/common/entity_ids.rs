//! Typed ID definitions for the membership domain.
//!
//! ```rust
//! use membership_core::common::{ProjectId, UserId};
//!
//! let project_id = ProjectId::new(7);
//! let user_id = UserId::new(7);
//!
//! // Same raw key, incompatible types:
//! // let wrong: ProjectId = user_id;
//! # let _ = (project_id, user_id);
//! ```

pub use super::id::Id;

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for Project entities.
pub struct Project;

/// Marker type for User entities (principals that can be members).
pub struct User;

/// Marker type for Membership entities (a user's seat in a project).
pub struct Membership;

/// Marker type for Role entities.
pub struct Role;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

/// Typed ID for Project entities.
pub type ProjectId = Id<Project>;

/// Typed ID for User entities.
pub type UserId = Id<User>;

/// Typed ID for Membership entities.
pub type MembershipId = Id<Membership>;

/// Typed ID for Role entities.
pub type RoleId = Id<Role>;

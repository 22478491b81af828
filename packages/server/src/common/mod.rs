// Common types shared across the kernel and domain layers

pub mod actor;
pub mod entity_ids;
pub mod errors;
pub mod id;

pub use actor::Actor;
pub use entity_ids::{MembershipId, ProjectId, RoleId, UserId};
pub use errors::{FieldError, LookupError, MembershipError, StoreError, ValidationErrors};
pub use id::Id;

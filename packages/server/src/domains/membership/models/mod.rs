pub mod membership;

pub use membership::{MemberRole, Membership, NewMembership, Project, Role, User};

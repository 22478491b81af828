//! Membership actions - business logic functions
//!
//! Each action persists through the store first and only then announces the
//! change. Announcing never fails the action.

mod add_members;
mod notify;
mod remove_member;
mod update_roles;

pub use add_members::add_members;
pub use remove_member::remove_member;
pub use update_roles::update_roles;

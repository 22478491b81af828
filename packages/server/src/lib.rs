// Project Membership Notifications - Core
//
// This crate manages project membership mutations (add, update roles, remove)
// and publishes an audit notification to NATS after each successful change.
// Persistence and user directories are injected through kernel traits.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;

pub use config::*;

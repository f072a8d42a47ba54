//! `coalition-auth` — pure authorization boundary plus the session layer.
//!
//! The role evaluator is deliberately free of I/O: every other component
//! re-derives capabilities from an [`Actor`] snapshot instead of caching
//! permissions, so a role change takes effect on the next request.

pub mod actor;
pub mod impersonation;
pub mod roles;
pub mod session;

pub use actor::Actor;
pub use impersonation::{ImpersonationController, SessionSlots};
pub use roles::Role;
pub use session::{InMemorySessions, SessionService, SessionToken};

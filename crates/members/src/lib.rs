//! `coalition-members` — accounts, clubs and the club-membership workflow.
//!
//! The workflow is the state machine `NoClub -> Pending -> {Approved,
//! Rejected}` plus the soft-delete paths (member removal, club deletion
//! cascade). Member codes are issued exactly once, at approval time.

pub mod member_code;
pub mod records;
pub mod store;
pub mod workflow;

pub use member_code::{format_member_code, MemberCode};
pub use records::{Account, Club, MembershipRequest, MembershipStatus, RequestStatus};
pub use store::{AccountFilter, DirectoryStore, InMemoryDirectory, StoreError};
pub use workflow::{ClubPatch, MembershipWorkflow, NewClub};

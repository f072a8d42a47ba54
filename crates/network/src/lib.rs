//! The intelligence network: a gated area layered on top of club
//! membership. Access is earned through nomination (or an eligible role),
//! and unlocked for real by completing onboarding.

pub mod access;
pub mod gate;
pub mod records;
pub mod store;

pub use access::{AccessStatus, NetworkAccess};
pub use gate::{DemandFilter, NetworkGate, NewDemand, NewReport, OnboardingForm, ReportView};
pub use records::{
    Demand, DemandKind, DemandPriority, DemandStatus, NetworkMembership, Organization, Report,
    ReportStatus,
};
pub use store::{InMemoryNetwork, NetworkStore};

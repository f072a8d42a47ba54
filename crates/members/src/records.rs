use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use coalition_auth::{Actor, Role};
use coalition_core::{AccountId, ClubId, Entity, RequestId};

use crate::member_code::MemberCode;

/// Club-membership approval state of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl MembershipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipStatus::Pending => "pending",
            MembershipStatus::Approved => "approved",
            MembershipStatus::Rejected => "rejected",
        }
    }
}

/// An account: identity of a person in the federation.
///
/// # Invariants
/// - `member_code`, once assigned, is immutable and globally unique.
/// - `ClubOfficer`/`ClubAdmin` roles are only meaningful with a `club_id`.
/// - Accounts are soft-deleted (`deleted_at`), never removed, so the club
///   history survives removals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub email: Option<String>,
    pub role: Role,
    pub club_id: Option<ClubId>,
    pub membership_status: MembershipStatus,
    /// ISO 3166-1 alpha-2, used as the member-code prefix.
    pub country: Option<String>,
    pub member_code: Option<MemberCode>,
    pub member_sequence: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Account {
    /// A fresh account as created at first authentication: no club, pending.
    pub fn new(id: AccountId, name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: name.into(),
            email: None,
            role: Role::Member,
            club_id: None,
            membership_status: MembershipStatus::Pending,
            country: None,
            member_code: None,
            member_sequence: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Snapshot for the role evaluator.
    pub fn actor(&self) -> Actor {
        Actor::new(self.id, self.role, self.club_id)
    }
}

impl Entity for Account {
    type Id = AccountId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// A club in the federation.
///
/// The president, if set, must be an account whose `club_id` is this club;
/// the workflow enforces that when assigning one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Club {
    pub id: ClubId,
    pub name: String,
    pub description: Option<String>,
    pub country: Option<String>,
    pub president_id: Option<AccountId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Club {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

impl Entity for Club {
    type Id = ClubId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Resolution state of a membership request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

/// A pending bid by an account to join a club.
///
/// Transitions exactly once to `Approved` or `Rejected` and is immutable
/// thereafter; a new cycle requires a new row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipRequest {
    pub id: RequestId,
    pub account_id: AccountId,
    pub club_id: ClubId,
    pub status: RequestStatus,
    pub message: Option<String>,
    pub reviewed_by: Option<AccountId>,
    pub review_notes: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl MembershipRequest {
    pub fn new(
        account_id: AccountId,
        club_id: ClubId,
        message: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: RequestId::new(),
            account_id,
            club_id,
            status: RequestStatus::Pending,
            message,
            reviewed_by: None,
            review_notes: None,
            reviewed_at: None,
            created_at: now,
        }
    }
}

impl Entity for MembershipRequest {
    type Id = RequestId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

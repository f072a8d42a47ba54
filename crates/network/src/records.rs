use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use coalition_core::{AccountId, DemandId, Entity, MembershipId, OrganizationId, ReportId};

// ─── Network membership ──────────────────────────────────────────────────

/// A single account's standing inside the network. At most one row per
/// account; revocation deletes the row outright.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkMembership {
    pub id: MembershipId,
    pub account_id: AccountId,
    pub organization_id: Option<OrganizationId>,
    pub category: Option<String>,
    pub sector: Option<String>,
    pub work_phone: Option<String>,
    pub functional_email: Option<String>,
    pub onboarded: bool,
    pub nominated_by: Option<AccountId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NetworkMembership {
    pub fn new(account_id: AccountId, nominated_by: Option<AccountId>, now: DateTime<Utc>) -> Self {
        Self {
            id: MembershipId::new(),
            account_id,
            organization_id: None,
            category: None,
            sector: None,
            work_phone: None,
            functional_email: None,
            onboarded: false,
            nominated_by,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Entity for NetworkMembership {
    type Id = MembershipId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Organizations are deduplicated by exact name, stored uppercased.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrganizationId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Entity for Organization {
    type Id = OrganizationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

// ─── Reports ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Active,
    Archived,
    Deleted,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Active => "active",
            ReportStatus::Archived => "archived",
            ReportStatus::Deleted => "deleted",
        }
    }
}

/// Field reports circulated inside the network. Status flips are soft;
/// nothing is ever physically removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: ReportId,
    pub author_id: AccountId,
    pub title: String,
    pub body: String,
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Report {
    pub fn new(
        author_id: AccountId,
        title: impl Into<String>,
        body: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ReportId::new(),
            author_id,
            title: title.into(),
            body: body.into(),
            status: ReportStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Entity for Report {
    type Id = ReportId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

// ─── Demands ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DemandPriority {
    Low,
    Medium,
    High,
    Urgent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DemandKind {
    Intel,
    Support,
    Logistics,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DemandStatus {
    Open,
    InProgress,
    Closed,
}

/// A task posted into the network, optionally targeted at one agent.
/// Untargeted demands are visible to every agent; targeted ones only to
/// the author, the target, and super admins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Demand {
    pub id: DemandId,
    pub author_id: AccountId,
    pub title: String,
    pub body: String,
    pub priority: DemandPriority,
    pub kind: DemandKind,
    pub status: DemandStatus,
    pub target_agent_id: Option<AccountId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Demand {
    type Id = DemandId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

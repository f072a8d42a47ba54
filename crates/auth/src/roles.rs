use core::str::FromStr;

use serde::{Deserialize, Serialize};

use coalition_core::DomainError;

/// Global role of an account.
///
/// Roles form a partial order for club-scoped operations:
/// `SuperAdmin` > `ClubAdmin` > `ClubOfficer` > `Member`, where the two
/// club-staff roles are additionally bounded to their own club. `SuperAdmin`
/// capabilities are global and ignore club ids entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Member,
    ClubOfficer,
    ClubAdmin,
    SuperAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::ClubOfficer => "club_officer",
            Role::ClubAdmin => "club_admin",
            Role::SuperAdmin => "super_admin",
        }
    }

    /// Club staff: roles that review requests and manage members of their club.
    pub fn is_club_staff(&self) -> bool {
        matches!(self, Role::ClubAdmin | Role::ClubOfficer)
    }

    pub fn is_super_admin(&self) -> bool {
        matches!(self, Role::SuperAdmin)
    }

    /// Role-based implicit eligibility for the intelligence network.
    ///
    /// Club officers are deliberately excluded; only presidents and global
    /// admins get the implicit gate.
    pub fn network_eligible(&self) -> bool {
        matches!(self, Role::ClubAdmin | Role::SuperAdmin)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "member" => Ok(Role::Member),
            "club_officer" => Ok(Role::ClubOfficer),
            "club_admin" => Ok(Role::ClubAdmin),
            "super_admin" => Ok(Role::SuperAdmin),
            other => Err(DomainError::invalid_id(format!("unknown role '{other}'"))),
        }
    }
}

use serde::Serialize;

use coalition_auth::Role;

use crate::records::NetworkMembership;

/// How an account stands relative to the network gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NetworkAccess {
    /// No membership row and no eligible role.
    NoAccess,
    /// No membership row, but the role alone opens the gate. Onboarding has
    /// not happened, so the account is steered to the onboarding flow.
    RoleEligible,
    /// A membership row exists; `onboarded` says whether the flow finished.
    ActiveMember { onboarded: bool },
}

impl NetworkAccess {
    /// Classify from the membership row (if any) and the global role.
    /// A row always wins over the role: a nominated super admin is an
    /// active member, not merely role-eligible.
    pub fn classify(membership: Option<&NetworkMembership>, role: Role) -> Self {
        match membership {
            Some(row) => NetworkAccess::ActiveMember {
                onboarded: row.onboarded,
            },
            None if role.network_eligible() => NetworkAccess::RoleEligible,
            None => NetworkAccess::NoAccess,
        }
    }

    pub fn has_access(&self) -> bool {
        !matches!(self, NetworkAccess::NoAccess)
    }

    pub fn is_onboarded(&self) -> bool {
        matches!(self, NetworkAccess::ActiveMember { onboarded: true })
    }
}

/// Wire shape of the gate check consumed by clients.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AccessStatus {
    pub has_access: bool,
    pub is_onboarded: bool,
    #[serde(flatten)]
    pub access: NetworkAccess,
}

impl From<NetworkAccess> for AccessStatus {
    fn from(access: NetworkAccess) -> Self {
        Self {
            has_access: access.has_access(),
            is_onboarded: access.is_onboarded(),
            access,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use coalition_core::AccountId;

    fn row(onboarded: bool) -> NetworkMembership {
        let mut m = NetworkMembership::new(AccountId::new(), None, Utc::now());
        m.onboarded = onboarded;
        m
    }

    #[test]
    fn role_alone_opens_the_gate_without_onboarding() {
        let access = NetworkAccess::classify(None, Role::ClubAdmin);
        assert_eq!(access, NetworkAccess::RoleEligible);
        assert!(access.has_access());
        assert!(!access.is_onboarded());
    }

    #[test]
    fn officers_and_plain_members_are_shut_out() {
        for role in [Role::Member, Role::ClubOfficer] {
            assert_eq!(NetworkAccess::classify(None, role), NetworkAccess::NoAccess);
        }
    }

    #[test]
    fn membership_row_beats_role() {
        let m = row(false);
        let access = NetworkAccess::classify(Some(&m), Role::SuperAdmin);
        assert_eq!(access, NetworkAccess::ActiveMember { onboarded: false });
        assert!(access.has_access());
        assert!(!access.is_onboarded());
    }

    #[test]
    fn onboarded_member_is_fully_in() {
        let m = row(true);
        let access = NetworkAccess::classify(Some(&m), Role::Member);
        assert!(access.has_access());
        assert!(access.is_onboarded());
    }
}

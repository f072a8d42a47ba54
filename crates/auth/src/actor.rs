//! The actor snapshot and the role evaluator.
//!
//! Request handlers resolve an [`Actor`] once per request and pass it into
//! every service call. All checks here are pure: no I/O, no panics, no
//! business logic beyond the capability rules themselves. Handlers must not
//! re-implement these rules inline.

use serde::{Deserialize, Serialize};

use coalition_core::{AccountId, ClubId, DomainError, DomainResult};

use crate::Role;

/// A resolved actor: who is asking, with which role and club linkage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub account_id: AccountId,
    pub role: Role,
    pub club_id: Option<ClubId>,
}

impl Actor {
    pub fn new(account_id: AccountId, role: Role, club_id: Option<ClubId>) -> Self {
        Self {
            account_id,
            role,
            club_id,
        }
    }

    /// Can this actor review (approve/reject/list) membership requests
    /// targeting `club`? Club staff only within their own club.
    pub fn can_review_requests_for(&self, club: ClubId) -> bool {
        match self.role {
            Role::SuperAdmin => true,
            Role::ClubAdmin | Role::ClubOfficer => self.club_id == Some(club),
            Role::Member => false,
        }
    }

    /// Can this actor manage (remove, re-role) a member whose club linkage
    /// is `club`? A clubless target is only manageable by a super admin.
    pub fn can_manage_member_of(&self, club: Option<ClubId>) -> bool {
        match self.role {
            Role::SuperAdmin => true,
            Role::ClubAdmin | Role::ClubOfficer => {
                self.club_id.is_some() && self.club_id == club
            }
            Role::Member => false,
        }
    }

    /// Can this actor edit club `club`'s record?
    pub fn can_edit_club(&self, club: ClubId) -> bool {
        match self.role {
            Role::SuperAdmin => true,
            Role::ClubAdmin | Role::ClubOfficer => self.club_id == Some(club),
            Role::Member => false,
        }
    }

    /// Can this actor nominate an account (club linkage `club`) into the
    /// intelligence network? Presidents nominate from their own club only;
    /// officers cannot nominate at all.
    pub fn can_nominate_member_of(&self, club: Option<ClubId>) -> bool {
        match self.role {
            Role::SuperAdmin => true,
            Role::ClubAdmin => self.club_id.is_some() && self.club_id == club,
            Role::ClubOfficer | Role::Member => false,
        }
    }

    /// Which roles may this actor grant to a target in club `target_club`?
    ///
    /// Club staff can only touch their own club's members and can never mint
    /// a super admin; officers additionally cannot mint presidents.
    pub fn can_assign_role(&self, target_club: Option<ClubId>, new_role: Role) -> bool {
        match self.role {
            Role::SuperAdmin => true,
            Role::ClubAdmin | Role::ClubOfficer => {
                if self.club_id.is_none() || self.club_id != target_club {
                    return false;
                }
                if new_role == Role::SuperAdmin {
                    return false;
                }
                if self.role == Role::ClubOfficer && new_role == Role::ClubAdmin {
                    return false;
                }
                true
            }
            Role::Member => false,
        }
    }

    /// Delete authority over a feed item: the author, a super admin, or the
    /// president of the club the item targets.
    pub fn can_delete_post(&self, author: AccountId, target_club: Option<ClubId>) -> bool {
        if self.account_id == author {
            return true;
        }
        match self.role {
            Role::SuperAdmin => true,
            Role::ClubAdmin => target_club.is_some() && self.club_id == target_club,
            _ => false,
        }
    }

    pub fn ensure_super_admin(&self) -> DomainResult<()> {
        if self.role.is_super_admin() {
            Ok(())
        } else {
            Err(DomainError::forbidden("super admin access required"))
        }
    }

    pub fn ensure_club_staff(&self) -> DomainResult<()> {
        if self.role.is_super_admin() || self.role.is_club_staff() {
            Ok(())
        } else {
            Err(DomainError::forbidden("admin access required"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(role: Role, club: Option<ClubId>) -> Actor {
        Actor::new(AccountId::new(), role, club)
    }

    #[test]
    fn super_admin_reviews_any_club() {
        let a = actor(Role::SuperAdmin, None);
        assert!(a.can_review_requests_for(ClubId::new()));
    }

    #[test]
    fn club_admin_reviews_own_club_only() {
        let own = ClubId::new();
        let other = ClubId::new();
        let a = actor(Role::ClubAdmin, Some(own));
        assert!(a.can_review_requests_for(own));
        assert!(!a.can_review_requests_for(other));
    }

    #[test]
    fn plain_member_reviews_nothing() {
        let club = ClubId::new();
        let a = actor(Role::Member, Some(club));
        assert!(!a.can_review_requests_for(club));
    }

    #[test]
    fn officer_cannot_mint_club_admin() {
        let club = ClubId::new();
        let officer = actor(Role::ClubOfficer, Some(club));
        assert!(officer.can_assign_role(Some(club), Role::ClubOfficer));
        assert!(!officer.can_assign_role(Some(club), Role::ClubAdmin));
        assert!(!officer.can_assign_role(Some(club), Role::SuperAdmin));
    }

    #[test]
    fn club_admin_cannot_mint_super_admin() {
        let club = ClubId::new();
        let admin = actor(Role::ClubAdmin, Some(club));
        assert!(admin.can_assign_role(Some(club), Role::ClubAdmin));
        assert!(!admin.can_assign_role(Some(club), Role::SuperAdmin));
        assert!(!admin.can_assign_role(Some(ClubId::new()), Role::Member));
    }

    #[test]
    fn officer_cannot_nominate_to_network() {
        let club = ClubId::new();
        let officer = actor(Role::ClubOfficer, Some(club));
        assert!(!officer.can_nominate_member_of(Some(club)));

        let president = actor(Role::ClubAdmin, Some(club));
        assert!(president.can_nominate_member_of(Some(club)));
        assert!(!president.can_nominate_member_of(Some(ClubId::new())));
        assert!(!president.can_nominate_member_of(None));
    }

    #[test]
    fn post_delete_authority() {
        let author = AccountId::new();
        let club = ClubId::new();

        let as_author = Actor::new(author, Role::Member, None);
        assert!(as_author.can_delete_post(author, Some(club)));

        let stranger = actor(Role::Member, Some(club));
        assert!(!stranger.can_delete_post(author, Some(club)));

        let matching_president = actor(Role::ClubAdmin, Some(club));
        assert!(matching_president.can_delete_post(author, Some(club)));
        // A president has no authority over global items they did not write.
        assert!(!matching_president.can_delete_post(author, None));

        let root = actor(Role::SuperAdmin, None);
        assert!(root.can_delete_post(author, Some(club)));
    }
}

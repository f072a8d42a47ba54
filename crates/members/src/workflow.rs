//! Club membership workflow: `NoClub -> Pending -> {Approved, Rejected}`,
//! member removal, and the club soft-delete cascade.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;

use coalition_auth::{Actor, Role};
use coalition_core::{AccountId, ClubId, DomainError, DomainResult, RequestId};

use crate::member_code::format_member_code;
use crate::records::{Account, Club, MembershipRequest, MembershipStatus, RequestStatus};
use crate::store::{AccountFilter, DirectoryStore};

/// Input for club creation.
#[derive(Debug, Clone, Deserialize)]
pub struct NewClub {
    pub name: String,
    pub description: Option<String>,
    pub country: Option<String>,
    /// Designating a president promotes them to `club_admin` (unless they
    /// are already a super admin), binds them to the club and auto-approves
    /// their membership.
    pub president_id: Option<AccountId>,
}

/// Partial update for a club record. `None` keeps the existing value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClubPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub country: Option<String>,
}

/// The membership workflow service. Request-scoped and stateless; all
/// durable state lives in the directory store.
pub struct MembershipWorkflow {
    directory: Arc<dyn DirectoryStore>,
}

impl MembershipWorkflow {
    pub fn new(directory: Arc<dyn DirectoryStore>) -> Self {
        Self { directory }
    }

    /// Submit a bid to join `club_id`.
    pub async fn request(
        &self,
        actor: &Actor,
        club_id: ClubId,
        message: Option<String>,
    ) -> DomainResult<MembershipRequest> {
        let club = self.live_club(club_id).await?;

        let account = self.live_account(actor.account_id).await?;
        if account.membership_status == MembershipStatus::Approved && account.club_id.is_some() {
            return Err(DomainError::conflict("already an approved club member"));
        }
        if let Some(open) = self.directory.pending_request_for(account.id).await? {
            return Err(DomainError::conflict(format!(
                "a pending request ({}) already exists",
                open.id
            )));
        }

        let request = MembershipRequest::new(account.id, club.id, message, Utc::now());
        self.directory.insert_request(request.clone()).await?;
        tracing::info!(account = %account.id, club = %club.id, request = %request.id, "membership requested");
        Ok(request)
    }

    /// Approve a request: binds the account to the club and issues a member
    /// code on first approval. Approving an already-approved request is a
    /// no-op success and never re-issues a code.
    pub async fn approve(
        &self,
        actor: &Actor,
        request_id: RequestId,
        notes: Option<String>,
    ) -> DomainResult<MembershipRequest> {
        let mut request = self.existing_request(request_id).await?;
        self.ensure_review_scope(actor, request.club_id)?;

        match request.status {
            RequestStatus::Approved => return Ok(request),
            RequestStatus::Rejected => {
                return Err(DomainError::conflict("request was already rejected"));
            }
            RequestStatus::Pending => {}
        }

        let now = Utc::now();
        request.status = RequestStatus::Approved;
        request.reviewed_by = Some(actor.account_id);
        request.review_notes = notes;
        request.reviewed_at = Some(now);
        self.directory.update_request(&request).await?;

        let mut account = self.live_account(request.account_id).await?;
        account.club_id = Some(request.club_id);
        account.membership_status = MembershipStatus::Approved;
        if account.member_code.is_none() {
            let sequence = self.directory.next_member_sequence().await?;
            let code = format_member_code(account.country.as_deref(), sequence);
            tracing::info!(account = %account.id, code = %code, "member code issued");
            account.member_code = Some(code);
            account.member_sequence = Some(sequence);
        }
        account.updated_at = now;
        self.directory.update_account(&account).await?;

        Ok(request)
    }

    /// Reject a request. The account's club linkage stays untouched (null).
    pub async fn reject(
        &self,
        actor: &Actor,
        request_id: RequestId,
        notes: Option<String>,
    ) -> DomainResult<MembershipRequest> {
        let mut request = self.existing_request(request_id).await?;
        self.ensure_review_scope(actor, request.club_id)?;

        match request.status {
            RequestStatus::Rejected => return Ok(request),
            RequestStatus::Approved => {
                return Err(DomainError::conflict("request was already approved"));
            }
            RequestStatus::Pending => {}
        }

        let now = Utc::now();
        request.status = RequestStatus::Rejected;
        request.reviewed_by = Some(actor.account_id);
        request.review_notes = notes;
        request.reviewed_at = Some(now);
        self.directory.update_request(&request).await?;

        let mut account = self.live_account(request.account_id).await?;
        account.membership_status = MembershipStatus::Rejected;
        account.updated_at = now;
        self.directory.update_account(&account).await?;

        Ok(request)
    }

    /// Soft-delete a member. Club linkage and history are preserved for the
    /// audit trail.
    pub async fn remove_member(&self, actor: &Actor, account_id: AccountId) -> DomainResult<()> {
        let mut account = self.live_account(account_id).await?;
        if !actor.can_manage_member_of(account.club_id) {
            return Err(DomainError::forbidden(
                "you can only remove members from your own club",
            ));
        }

        let now = Utc::now();
        account.deleted_at = Some(now);
        account.updated_at = now;
        self.directory.update_account(&account).await?;
        tracing::info!(account = %account_id, by = %actor.account_id, "member removed");
        Ok(())
    }

    /// Create a club, optionally installing a president.
    pub async fn create_club(&self, actor: &Actor, input: NewClub) -> DomainResult<Club> {
        actor.ensure_super_admin()?;
        if input.name.trim().is_empty() {
            return Err(DomainError::bad_request("club name cannot be empty"));
        }

        let now = Utc::now();
        let mut club = Club {
            id: ClubId::new(),
            name: input.name,
            description: input.description,
            country: input.country,
            president_id: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        if let Some(president_id) = input.president_id {
            let mut president = self.live_account(president_id).await?;
            if president.role != Role::SuperAdmin {
                president.role = Role::ClubAdmin;
            }
            president.club_id = Some(club.id);
            president.membership_status = MembershipStatus::Approved;
            president.updated_at = now;
            club.president_id = Some(president.id);

            self.directory.insert_club(club.clone()).await?;
            self.directory.update_account(&president).await?;
        } else {
            self.directory.insert_club(club.clone()).await?;
        }

        tracing::info!(club = %club.id, "club created");
        Ok(club)
    }

    /// Update a club's record. Super admins may touch any club, club staff
    /// only their own.
    pub async fn update_club(
        &self,
        actor: &Actor,
        club_id: ClubId,
        patch: ClubPatch,
    ) -> DomainResult<Club> {
        let mut club = self.live_club(club_id).await?;
        if !actor.can_edit_club(club_id) {
            return Err(DomainError::forbidden("you can only edit your own club"));
        }

        if let Some(name) = patch.name {
            if name.trim().is_empty() {
                return Err(DomainError::bad_request("club name cannot be empty"));
            }
            club.name = name;
        }
        if let Some(description) = patch.description {
            club.description = Some(description);
        }
        if let Some(country) = patch.country {
            club.country = Some(country);
        }
        club.updated_at = Utc::now();
        self.directory.update_club(&club).await?;
        Ok(club)
    }

    /// Soft-delete a club and cascade to every linked member, all-or-nothing.
    pub async fn delete_club(&self, actor: &Actor, club_id: ClubId) -> DomainResult<()> {
        actor.ensure_super_admin()?;
        let club = self.live_club(club_id).await?;
        self.directory
            .soft_delete_club_cascade(club.id, Utc::now())
            .await?;
        tracing::info!(club = %club_id, "club deleted (cascaded)");
        Ok(())
    }

    /// Pending requests for a club, reviewer-scoped.
    pub async fn pending_requests(
        &self,
        actor: &Actor,
        club_id: ClubId,
    ) -> DomainResult<Vec<MembershipRequest>> {
        actor.ensure_club_staff()?;
        self.ensure_review_scope(actor, club_id)?;
        Ok(self.directory.pending_requests_for_club(club_id).await?)
    }

    /// The caller's own open request, if any.
    pub async fn my_pending_request(
        &self,
        actor: &Actor,
    ) -> DomainResult<Option<MembershipRequest>> {
        Ok(self.directory.pending_request_for(actor.account_id).await?)
    }

    /// Approved members of a club, plus its officers and admins.
    pub async fn club_members(&self, club_id: ClubId) -> DomainResult<Vec<Account>> {
        let members = self
            .directory
            .list_accounts(AccountFilter {
                club_id: Some(club_id),
                ..AccountFilter::default()
            })
            .await?;
        Ok(members
            .into_iter()
            .filter(|a| {
                a.membership_status == MembershipStatus::Approved
                    || a.role.is_club_staff()
                    || a.role.is_super_admin()
            })
            .collect())
    }

    pub async fn list_clubs(&self) -> DomainResult<Vec<Club>> {
        Ok(self.directory.list_clubs(false).await?)
    }

    pub async fn deleted_clubs(&self, actor: &Actor) -> DomainResult<Vec<Club>> {
        actor.ensure_super_admin()?;
        let clubs = self.directory.list_clubs(true).await?;
        Ok(clubs.into_iter().filter(|c| c.is_deleted()).collect())
    }

    pub async fn club(&self, club_id: ClubId) -> DomainResult<Club> {
        self.live_club(club_id).await
    }

    /// Account listing for admin screens; club staff are always narrowed to
    /// their own club regardless of the requested filter.
    pub async fn list_accounts(
        &self,
        actor: &Actor,
        mut filter: AccountFilter,
    ) -> DomainResult<Vec<Account>> {
        actor.ensure_club_staff()?;
        if actor.role.is_club_staff() {
            filter.club_id = actor.club_id;
            if filter.club_id.is_none() {
                return Ok(Vec::new());
            }
        }
        Ok(self.directory.list_accounts(filter).await?)
    }

    /// Change an account's global role.
    ///
    /// Club-staff roles require a club linkage; the network-membership side
    /// effect of a role change is handled by the network gate, not here.
    pub async fn update_role(
        &self,
        actor: &Actor,
        account_id: AccountId,
        new_role: Role,
    ) -> DomainResult<Account> {
        let mut account = self.live_account(account_id).await?;
        if !actor.can_assign_role(account.club_id, new_role) {
            return Err(DomainError::forbidden(
                "you are not allowed to assign this role",
            ));
        }
        if new_role.is_club_staff() && account.club_id.is_none() {
            return Err(DomainError::bad_request(
                "club roles require a club membership",
            ));
        }

        account.role = new_role;
        account.updated_at = Utc::now();
        self.directory.update_account(&account).await?;
        tracing::info!(account = %account_id, role = %new_role, by = %actor.account_id, "role updated");
        Ok(account)
    }

    /// Load a live (non-deleted) account or fail with `NotFound`.
    pub async fn account(&self, id: AccountId) -> DomainResult<Account> {
        self.live_account(id).await
    }

    fn ensure_review_scope(&self, actor: &Actor, club: ClubId) -> DomainResult<()> {
        if actor.can_review_requests_for(club) {
            Ok(())
        } else {
            Err(DomainError::forbidden(
                "you can only manage requests for your own club",
            ))
        }
    }

    async fn live_account(&self, id: AccountId) -> DomainResult<Account> {
        match self.directory.account(id).await? {
            Some(account) if !account.is_deleted() => Ok(account),
            _ => Err(DomainError::not_found(format!("account {id}"))),
        }
    }

    async fn existing_request(&self, id: RequestId) -> DomainResult<MembershipRequest> {
        match self.directory.request(id).await? {
            Some(request) => Ok(request),
            None => Err(DomainError::not_found(format!("request {id}"))),
        }
    }

    async fn live_club(&self, id: ClubId) -> DomainResult<Club> {
        match self.directory.club(id).await? {
            Some(club) if !club.is_deleted() => Ok(club),
            _ => Err(DomainError::not_found(format!("club {id}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryDirectory;

    struct Fixture {
        directory: Arc<InMemoryDirectory>,
        workflow: MembershipWorkflow,
    }

    impl Fixture {
        fn new() -> Self {
            let directory = Arc::new(InMemoryDirectory::new());
            let workflow = MembershipWorkflow::new(directory.clone());
            Self {
                directory,
                workflow,
            }
        }

        async fn account(&self, role: Role, club: Option<ClubId>) -> Account {
            let mut account = Account::new(AccountId::new(), "someone", Utc::now());
            account.role = role;
            account.club_id = club;
            if club.is_some() {
                account.membership_status = MembershipStatus::Approved;
            }
            self.directory.insert_account(account.clone()).await.unwrap();
            account
        }

        async fn club(&self) -> Club {
            let now = Utc::now();
            let club = Club {
                id: ClubId::new(),
                name: "Test Club".into(),
                description: None,
                country: Some("BR".into()),
                president_id: None,
                created_at: now,
                updated_at: now,
                deleted_at: None,
            };
            self.directory.insert_club(club.clone()).await.unwrap();
            club
        }
    }

    #[tokio::test]
    async fn request_then_approve_issues_member_code() {
        let fx = Fixture::new();
        let club = fx.club().await;
        let mut applicant = Account::new(AccountId::new(), "u", Utc::now());
        applicant.country = Some("BR".into());
        fx.directory.insert_account(applicant.clone()).await.unwrap();
        let admin = fx.account(Role::ClubAdmin, Some(club.id)).await;

        let request = fx
            .workflow
            .request(&applicant.actor(), club.id, Some("hi".into()))
            .await
            .unwrap();
        assert_eq!(request.status, RequestStatus::Pending);

        let approved = fx
            .workflow
            .approve(&admin.actor(), request.id, None)
            .await
            .unwrap();
        assert_eq!(approved.status, RequestStatus::Approved);

        let stored = fx.workflow.account(applicant.id).await.unwrap();
        assert_eq!(stored.club_id, Some(club.id));
        assert_eq!(stored.membership_status, MembershipStatus::Approved);
        assert_eq!(stored.member_code.as_ref().unwrap().as_str(), "[BR]-000.001-W");
    }

    #[tokio::test]
    async fn reviewing_an_unknown_request_is_not_found() {
        let fx = Fixture::new();
        let club = fx.club().await;
        let admin = fx.account(Role::ClubAdmin, Some(club.id)).await;

        let missing = RequestId::new();
        let err = fx
            .workflow
            .approve(&admin.actor(), missing, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
        let err = fx
            .workflow
            .reject(&admin.actor(), missing, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn approve_is_idempotent_and_keeps_the_code() {
        let fx = Fixture::new();
        let club = fx.club().await;
        let applicant = fx.account(Role::Member, None).await;
        let admin = fx.account(Role::ClubAdmin, Some(club.id)).await;

        let request = fx
            .workflow
            .request(&applicant.actor(), club.id, None)
            .await
            .unwrap();
        fx.workflow
            .approve(&admin.actor(), request.id, None)
            .await
            .unwrap();
        let first = fx.workflow.account(applicant.id).await.unwrap();

        let again = fx
            .workflow
            .approve(&admin.actor(), request.id, None)
            .await
            .unwrap();
        assert_eq!(again.status, RequestStatus::Approved);

        let second = fx.workflow.account(applicant.id).await.unwrap();
        assert_eq!(first.member_code, second.member_code);
        assert_eq!(first.member_sequence, second.member_sequence);
    }

    #[tokio::test]
    async fn second_pending_request_is_a_conflict() {
        let fx = Fixture::new();
        let club_a = fx.club().await;
        let club_b = fx.club().await;
        let applicant = fx.account(Role::Member, None).await;

        fx.workflow
            .request(&applicant.actor(), club_a.id, None)
            .await
            .unwrap();
        let err = fx
            .workflow
            .request(&applicant.actor(), club_b.id, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn approved_member_cannot_request_again() {
        let fx = Fixture::new();
        let club = fx.club().await;
        let member = fx.account(Role::Member, Some(club.id)).await;

        let err = fx
            .workflow
            .request(&member.actor(), club.id, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn foreign_club_admin_cannot_review() {
        let fx = Fixture::new();
        let club_a = fx.club().await;
        let club_b = fx.club().await;
        let applicant = fx.account(Role::Member, None).await;
        let foreign_admin = fx.account(Role::ClubAdmin, Some(club_b.id)).await;
        let root = fx.account(Role::SuperAdmin, None).await;

        let request = fx
            .workflow
            .request(&applicant.actor(), club_a.id, None)
            .await
            .unwrap();

        let err = fx
            .workflow
            .approve(&foreign_admin.actor(), request.id, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        // A super admin reviews any club.
        fx.workflow
            .approve(&root.actor(), request.id, None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn reject_leaves_club_linkage_empty() {
        let fx = Fixture::new();
        let club = fx.club().await;
        let applicant = fx.account(Role::Member, None).await;
        let admin = fx.account(Role::ClubAdmin, Some(club.id)).await;

        let request = fx
            .workflow
            .request(&applicant.actor(), club.id, None)
            .await
            .unwrap();
        let rejected = fx
            .workflow
            .reject(&admin.actor(), request.id, Some("no".into()))
            .await
            .unwrap();
        assert_eq!(rejected.status, RequestStatus::Rejected);

        let stored = fx.workflow.account(applicant.id).await.unwrap();
        assert_eq!(stored.club_id, None);
        assert_eq!(stored.membership_status, MembershipStatus::Rejected);
        assert!(stored.member_code.is_none());

        // A settled rejection cannot be approved afterwards.
        let err = fx
            .workflow
            .approve(&admin.actor(), request.id, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn concurrent_approvals_issue_distinct_codes() {
        let fx = Fixture::new();
        let club = fx.club().await;
        let admin = fx.account(Role::SuperAdmin, None).await;

        let mut requests = Vec::new();
        for _ in 0..8 {
            let applicant = fx.account(Role::Member, None).await;
            requests.push((
                applicant.id,
                fx.workflow
                    .request(&applicant.actor(), club.id, None)
                    .await
                    .unwrap(),
            ));
        }

        let mut handles = Vec::new();
        let workflow = Arc::new(MembershipWorkflow::new(fx.directory.clone()));
        for (_, request) in &requests {
            let workflow = workflow.clone();
            let actor = admin.actor();
            let id = request.id;
            handles.push(tokio::spawn(async move {
                workflow.approve(&actor, id, None).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let mut codes = std::collections::HashSet::new();
        for (account_id, _) in requests {
            let account = fx.workflow.account(account_id).await.unwrap();
            assert!(codes.insert(account.member_code.unwrap()));
        }
    }

    #[tokio::test]
    async fn delete_club_cascades_to_every_member() {
        let fx = Fixture::new();
        let club = fx.club().await;
        let root = fx.account(Role::SuperAdmin, None).await;
        let a = fx.account(Role::Member, Some(club.id)).await;
        let b = fx.account(Role::ClubOfficer, Some(club.id)).await;
        let outsider = fx.account(Role::Member, None).await;

        fx.workflow.delete_club(&root.actor(), club.id).await.unwrap();

        for id in [a.id, b.id] {
            let err = fx.workflow.account(id).await.unwrap_err();
            assert!(matches!(err, DomainError::NotFound(_)));
        }
        // Unlinked accounts are untouched.
        fx.workflow.account(outsider.id).await.unwrap();

        let err = fx.workflow.club(club.id).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn remove_member_is_scoped_to_own_club() {
        let fx = Fixture::new();
        let club_a = fx.club().await;
        let club_b = fx.club().await;
        let admin_a = fx.account(Role::ClubAdmin, Some(club_a.id)).await;
        let member_b = fx.account(Role::Member, Some(club_b.id)).await;

        let err = fx
            .workflow
            .remove_member(&admin_a.actor(), member_b.id)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        let member_a = fx.account(Role::Member, Some(club_a.id)).await;
        fx.workflow
            .remove_member(&admin_a.actor(), member_a.id)
            .await
            .unwrap();

        // Soft delete: club linkage survives for the audit trail.
        let raw = fx.directory.account(member_a.id).await.unwrap().unwrap();
        assert!(raw.is_deleted());
        assert_eq!(raw.club_id, Some(club_a.id));
    }

    #[tokio::test]
    async fn create_club_installs_president() {
        let fx = Fixture::new();
        let root = fx.account(Role::SuperAdmin, None).await;
        let president = fx.account(Role::Member, None).await;

        let club = fx
            .workflow
            .create_club(
                &root.actor(),
                NewClub {
                    name: "Northern Chapter".into(),
                    description: None,
                    country: Some("BR".into()),
                    president_id: Some(president.id),
                },
            )
            .await
            .unwrap();

        assert_eq!(club.president_id, Some(president.id));
        let stored = fx.workflow.account(president.id).await.unwrap();
        assert_eq!(stored.role, Role::ClubAdmin);
        assert_eq!(stored.club_id, Some(club.id));
        assert_eq!(stored.membership_status, MembershipStatus::Approved);
    }

    #[tokio::test]
    async fn club_role_requires_club_linkage() {
        let fx = Fixture::new();
        let root = fx.account(Role::SuperAdmin, None).await;
        let loner = fx.account(Role::Member, None).await;

        let err = fx
            .workflow
            .update_role(&root.actor(), loner.id, Role::ClubAdmin)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::BadRequest(_)));
    }
}

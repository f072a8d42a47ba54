//! The network gate service: access checks, nomination and onboarding,
//! plus the report and demand boards behind the gate.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use coalition_auth::Actor;
use coalition_core::{
    AccountId, DemandId, DomainError, DomainResult, OrganizationId, ReportId,
};
use coalition_members::records::Account;
use coalition_members::store::{AccountFilter, DirectoryStore};

use crate::access::{AccessStatus, NetworkAccess};
use crate::records::{
    Demand, DemandKind, DemandPriority, DemandStatus, NetworkMembership, Organization, Report,
    ReportStatus,
};
use crate::store::NetworkStore;

/// Onboarding submission. Every field is mandatory; the organization is
/// free text and gets deduplicated by exact name, uppercased.
#[derive(Debug, Clone, Deserialize)]
pub struct OnboardingForm {
    pub organization: String,
    pub category: String,
    pub sector: String,
    pub work_phone: String,
    pub functional_email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewReport {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewDemand {
    pub title: String,
    pub body: String,
    pub priority: DemandPriority,
    pub kind: DemandKind,
    pub target_agent_id: Option<AccountId>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct DemandFilter {
    pub status: Option<DemandStatus>,
    pub kind: Option<DemandKind>,
}

/// A report joined with the caller's read mark.
#[derive(Debug, Clone, Serialize)]
pub struct ReportView {
    #[serde(flatten)]
    pub report: Report,
    pub read: bool,
}

pub struct NetworkGate {
    network: Arc<dyn NetworkStore>,
    directory: Arc<dyn DirectoryStore>,
}

impl NetworkGate {
    pub fn new(network: Arc<dyn NetworkStore>, directory: Arc<dyn DirectoryStore>) -> Self {
        Self { network, directory }
    }

    // ─── Access ──────────────────────────────────────────────────────────

    pub async fn access_status(&self, actor: &Actor) -> DomainResult<AccessStatus> {
        let membership = self.network.membership_for(actor.account_id).await?;
        Ok(NetworkAccess::classify(membership.as_ref(), actor.role).into())
    }

    /// Gatekeeper for everything behind the network door.
    pub async fn require_access(&self, actor: &Actor) -> DomainResult<NetworkAccess> {
        let membership = self.network.membership_for(actor.account_id).await?;
        let access = NetworkAccess::classify(membership.as_ref(), actor.role);
        if access.has_access() {
            Ok(access)
        } else {
            Err(DomainError::forbidden("network access required"))
        }
    }

    // ─── Onboarding and nomination ───────────────────────────────────────

    /// Complete (or redo) onboarding. Role-eligible accounts without a row
    /// get one created on the spot, self-nominated; everyone else must hold
    /// a nomination. Every profile field is required.
    pub async fn submit_onboarding(
        &self,
        actor: &Actor,
        form: OnboardingForm,
    ) -> DomainResult<NetworkMembership> {
        let access = self.require_access(actor).await?;

        let organization = required_field(&form.organization, "organization")?;
        let category = required_field(&form.category, "category")?;
        let sector = required_field(&form.sector, "sector")?;
        let work_phone = required_field(&form.work_phone, "work phone")?;
        let functional_email = required_field(&form.functional_email, "functional email")?;
        if !functional_email.contains('@') {
            return Err(DomainError::bad_request("functional email is not an email address"));
        }

        let now = Utc::now();
        let mut membership = match self.network.membership_for(actor.account_id).await? {
            Some(row) => row,
            None => {
                debug_assert_eq!(access, NetworkAccess::RoleEligible);
                let row =
                    NetworkMembership::new(actor.account_id, Some(actor.account_id), now);
                self.network.insert_membership(row.clone()).await?;
                row
            }
        };

        membership.organization_id = Some(self.upsert_organization(&organization, now).await?);
        membership.category = Some(category);
        membership.sector = Some(sector);
        membership.work_phone = Some(work_phone);
        membership.functional_email = Some(functional_email);
        membership.onboarded = true;
        membership.updated_at = now;
        self.network.update_membership(&membership).await?;
        tracing::info!(account = %actor.account_id, "network onboarding completed");
        Ok(membership)
    }

    /// The organization directory feeding the onboarding form's picker.
    pub async fn list_organizations(&self, actor: &Actor) -> DomainResult<Vec<Organization>> {
        self.require_access(actor).await?;
        Ok(self.network.list_organizations().await?)
    }

    /// Bring a club member into the network. Scoped like member management:
    /// club admins nominate inside their own club, super admins anywhere.
    pub async fn nominate(&self, actor: &Actor, account_id: AccountId) -> DomainResult<NetworkMembership> {
        let target = self.live_account(account_id).await?;
        if !actor.can_nominate_member_of(target.club_id) {
            return Err(DomainError::forbidden(
                "you can only nominate members of your own club",
            ));
        }
        if self.network.membership_for(account_id).await?.is_some() {
            return Err(DomainError::conflict("account is already in the network"));
        }

        let membership = NetworkMembership::new(account_id, Some(actor.account_id), Utc::now());
        self.network.insert_membership(membership.clone()).await?;
        tracing::info!(account = %account_id, by = %actor.account_id, "nominated into the network");
        Ok(membership)
    }

    /// Flip an account's network membership as an admin action. Enabling
    /// creates a bare (un-onboarded) row; disabling deletes the row, so any
    /// later return goes through onboarding again.
    pub async fn set_network_member(
        &self,
        actor: &Actor,
        account_id: AccountId,
        enabled: bool,
    ) -> DomainResult<()> {
        let target = self.live_account(account_id).await?;
        if !actor.can_nominate_member_of(target.club_id) {
            return Err(DomainError::forbidden(
                "you can only manage network membership inside your own club",
            ));
        }

        if enabled {
            if self.network.membership_for(account_id).await?.is_none() {
                let membership =
                    NetworkMembership::new(account_id, Some(actor.account_id), Utc::now());
                self.network.insert_membership(membership).await?;
            }
        } else {
            self.network.delete_membership(account_id).await?;
            tracing::info!(account = %account_id, by = %actor.account_id, "network membership revoked");
        }
        Ok(())
    }

    /// Whether an account holds a network membership row. Used to annotate
    /// member listings without exposing the row itself.
    pub async fn is_network_member(&self, account_id: AccountId) -> DomainResult<bool> {
        Ok(self.network.membership_for(account_id).await?.is_some())
    }

    /// The agent directory: every account with a membership row, plus the
    /// role-eligible admins, deduplicated.
    pub async fn agents(&self, actor: &Actor) -> DomainResult<Vec<Account>> {
        self.require_access(actor).await?;

        let mut seen = std::collections::HashSet::new();
        let mut agents = Vec::new();
        for membership in self.network.list_memberships().await? {
            if let Some(account) = self.directory.account(membership.account_id).await? {
                if !account.is_deleted() && seen.insert(account.id) {
                    agents.push(account);
                }
            }
        }
        let everyone = self.directory.list_accounts(AccountFilter::default()).await?;
        for account in everyone {
            if account.role.network_eligible() && seen.insert(account.id) {
                agents.push(account);
            }
        }
        Ok(agents)
    }

    // ─── Reports ─────────────────────────────────────────────────────────

    pub async fn submit_report(&self, actor: &Actor, input: NewReport) -> DomainResult<Report> {
        self.require_access(actor).await?;
        if input.title.trim().is_empty() || input.body.trim().is_empty() {
            return Err(DomainError::bad_request("report title and body are required"));
        }
        let report = Report::new(actor.account_id, input.title, input.body, Utc::now());
        self.network.insert_report(report.clone()).await?;
        Ok(report)
    }

    /// Active (and optionally archived) reports with the caller's read
    /// marks. Deleted reports never surface here.
    pub async fn list_reports(
        &self,
        actor: &Actor,
        include_archived: bool,
    ) -> DomainResult<Vec<ReportView>> {
        self.require_access(actor).await?;
        let statuses: &[ReportStatus] = if include_archived {
            &[ReportStatus::Active, ReportStatus::Archived]
        } else {
            &[ReportStatus::Active]
        };
        let read = self.network.read_report_ids(actor.account_id).await?;
        let reports = self.network.list_reports(statuses).await?;
        Ok(reports
            .into_iter()
            .map(|report| ReportView {
                read: read.contains(&report.id),
                report,
            })
            .collect())
    }

    pub async fn unread_report_count(&self, actor: &Actor) -> DomainResult<usize> {
        self.require_access(actor).await?;
        let read = self.network.read_report_ids(actor.account_id).await?;
        let active = self.network.list_reports(&[ReportStatus::Active]).await?;
        Ok(active.iter().filter(|r| !read.contains(&r.id)).count())
    }

    pub async fn mark_report_read(&self, actor: &Actor, report_id: ReportId) -> DomainResult<()> {
        self.require_access(actor).await?;
        self.live_report(report_id).await?;
        self.network
            .mark_report_read(report_id, actor.account_id)
            .await?;
        Ok(())
    }

    pub async fn archive_report(&self, actor: &Actor, report_id: ReportId) -> DomainResult<Report> {
        self.flip_report_status(actor, report_id, ReportStatus::Archived)
            .await
    }

    /// Soft delete: the row stays, flagged `deleted`, and drops out of
    /// every listing.
    pub async fn delete_report(&self, actor: &Actor, report_id: ReportId) -> DomainResult<Report> {
        self.flip_report_status(actor, report_id, ReportStatus::Deleted)
            .await
    }

    async fn flip_report_status(
        &self,
        actor: &Actor,
        report_id: ReportId,
        status: ReportStatus,
    ) -> DomainResult<Report> {
        self.require_access(actor).await?;
        let mut report = self.live_report(report_id).await?;
        if report.author_id != actor.account_id && !actor.role.is_super_admin() {
            return Err(DomainError::forbidden(
                "only the author or a super admin can manage this report",
            ));
        }
        report.status = status;
        report.updated_at = Utc::now();
        self.network.update_report(&report).await?;
        Ok(report)
    }

    // ─── Demands ─────────────────────────────────────────────────────────

    pub async fn create_demand(&self, actor: &Actor, input: NewDemand) -> DomainResult<Demand> {
        self.require_access(actor).await?;
        if input.title.trim().is_empty() {
            return Err(DomainError::bad_request("demand title is required"));
        }
        if let Some(target) = input.target_agent_id {
            if self.network.membership_for(target).await?.is_none() {
                let account = self.live_account(target).await?;
                if !account.role.network_eligible() {
                    return Err(DomainError::bad_request("target is not a network agent"));
                }
            }
        }

        let now = Utc::now();
        let demand = Demand {
            id: DemandId::new(),
            author_id: actor.account_id,
            title: input.title,
            body: input.body,
            priority: input.priority,
            kind: input.kind,
            status: DemandStatus::Open,
            target_agent_id: input.target_agent_id,
            created_at: now,
            updated_at: now,
        };
        self.network.insert_demand(demand.clone()).await?;
        Ok(demand)
    }

    /// Demands visible to the caller: authored, targeted at them, or
    /// untargeted. Super admins see everything.
    pub async fn list_demands(
        &self,
        actor: &Actor,
        filter: DemandFilter,
    ) -> DomainResult<Vec<Demand>> {
        self.require_access(actor).await?;
        let demands = self.network.list_demands().await?;
        Ok(demands
            .into_iter()
            .filter(|d| self.demand_visible(actor, d))
            .filter(|d| filter.status.is_none_or(|s| d.status == s))
            .filter(|d| filter.kind.is_none_or(|k| d.kind == k))
            .collect())
    }

    pub async fn update_demand_status(
        &self,
        actor: &Actor,
        demand_id: DemandId,
        status: DemandStatus,
    ) -> DomainResult<Demand> {
        self.require_access(actor).await?;
        let mut demand = match self.network.demand(demand_id).await? {
            Some(d) => d,
            None => return Err(DomainError::not_found(format!("demand {demand_id}"))),
        };
        let involved = demand.author_id == actor.account_id
            || demand.target_agent_id == Some(actor.account_id);
        if !involved && !actor.role.is_super_admin() {
            return Err(DomainError::forbidden(
                "only the author or the target can update this demand",
            ));
        }
        demand.status = status;
        demand.updated_at = Utc::now();
        self.network.update_demand(&demand).await?;
        Ok(demand)
    }

    fn demand_visible(&self, actor: &Actor, demand: &Demand) -> bool {
        actor.role.is_super_admin()
            || demand.author_id == actor.account_id
            || demand.target_agent_id.is_none()
            || demand.target_agent_id == Some(actor.account_id)
    }

    // ─── Helpers ─────────────────────────────────────────────────────────

    async fn upsert_organization(
        &self,
        name: &str,
        now: chrono::DateTime<Utc>,
    ) -> DomainResult<OrganizationId> {
        let name = name.trim().to_uppercase();
        if name.is_empty() {
            return Err(DomainError::bad_request("organization name cannot be empty"));
        }
        if let Some(existing) = self.network.organization_by_name(&name).await? {
            return Ok(existing.id);
        }
        let organization = Organization {
            id: OrganizationId::new(),
            name,
            created_at: now,
        };
        let id = organization.id;
        self.network.insert_organization(organization).await?;
        Ok(id)
    }

    async fn live_account(&self, id: AccountId) -> DomainResult<Account> {
        match self.directory.account(id).await? {
            Some(account) if !account.is_deleted() => Ok(account),
            _ => Err(DomainError::not_found(format!("account {id}"))),
        }
    }

    async fn live_report(&self, id: ReportId) -> DomainResult<Report> {
        match self.network.report(id).await? {
            Some(report) if report.status != ReportStatus::Deleted => Ok(report),
            _ => Err(DomainError::not_found(format!("report {id}"))),
        }
    }
}

fn required_field(raw: &str, label: &str) -> DomainResult<String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(DomainError::bad_request(format!("{label} is required")));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use coalition_auth::Role;
    use coalition_core::ClubId;
    use coalition_members::store::InMemoryDirectory;
    use crate::store::InMemoryNetwork;

    struct Fixture {
        directory: Arc<InMemoryDirectory>,
        gate: NetworkGate,
    }

    impl Fixture {
        fn new() -> Self {
            let directory = Arc::new(InMemoryDirectory::new());
            let gate = NetworkGate::new(Arc::new(InMemoryNetwork::new()), directory.clone());
            Self { directory, gate }
        }

        async fn account(&self, role: Role, club: Option<ClubId>) -> Account {
            let mut account = Account::new(AccountId::new(), "agent", Utc::now());
            account.role = role;
            account.club_id = club;
            self.directory.insert_account(account.clone()).await.unwrap();
            account
        }
    }

    fn profile(organization: &str) -> OnboardingForm {
        OnboardingForm {
            organization: organization.into(),
            category: "federal".into(),
            sector: "logistics".into(),
            work_phone: "+55 11 5555-0101".into(),
            functional_email: "agent@example.gov".into(),
        }
    }

    #[tokio::test]
    async fn nomination_then_onboarding_unlocks_the_gate() {
        let fx = Fixture::new();
        let club = ClubId::new();
        let admin = fx.account(Role::ClubAdmin, Some(club)).await;
        let member = fx.account(Role::Member, Some(club)).await;

        let status = fx.gate.access_status(&member.actor()).await.unwrap();
        assert!(!status.has_access);

        fx.gate.nominate(&admin.actor(), member.id).await.unwrap();
        let status = fx.gate.access_status(&member.actor()).await.unwrap();
        assert!(status.has_access);
        assert!(!status.is_onboarded);

        fx.gate
            .submit_onboarding(
                &member.actor(),
                profile("  acme corp "),
            )
            .await
            .unwrap();
        let status = fx.gate.access_status(&member.actor()).await.unwrap();
        assert!(status.is_onboarded);
    }

    #[tokio::test]
    async fn double_nomination_is_a_conflict() {
        let fx = Fixture::new();
        let club = ClubId::new();
        let admin = fx.account(Role::ClubAdmin, Some(club)).await;
        let member = fx.account(Role::Member, Some(club)).await;

        fx.gate.nominate(&admin.actor(), member.id).await.unwrap();
        let err = fx.gate.nominate(&admin.actor(), member.id).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn nomination_is_club_scoped() {
        let fx = Fixture::new();
        let admin = fx.account(Role::ClubAdmin, Some(ClubId::new())).await;
        let outsider = fx.account(Role::Member, Some(ClubId::new())).await;

        let err = fx.gate.nominate(&admin.actor(), outsider.id).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn role_eligible_admin_self_onboards() {
        let fx = Fixture::new();
        let admin = fx.account(Role::ClubAdmin, Some(ClubId::new())).await;

        let membership = fx
            .gate
            .submit_onboarding(&admin.actor(), profile("DEFENSE MINISTRY"))
            .await
            .unwrap();
        assert!(membership.onboarded);
        assert_eq!(membership.nominated_by, Some(admin.id));
    }

    #[tokio::test]
    async fn onboarding_requires_every_profile_field() {
        let fx = Fixture::new();
        let admin = fx.account(Role::ClubAdmin, Some(ClubId::new())).await;

        let blank = OnboardingForm {
            organization: String::new(),
            category: String::new(),
            sector: String::new(),
            work_phone: String::new(),
            functional_email: String::new(),
        };
        let err = fx
            .gate
            .submit_onboarding(&admin.actor(), blank)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::BadRequest(_)));

        let mut whitespace_sector = profile("ACME CORP");
        whitespace_sector.sector = "   ".into();
        let err = fx
            .gate
            .submit_onboarding(&admin.actor(), whitespace_sector)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::BadRequest(_)));

        let mut bad_email = profile("ACME CORP");
        bad_email.functional_email = "not-an-email".into();
        let err = fx
            .gate
            .submit_onboarding(&admin.actor(), bad_email)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::BadRequest(_)));

        // Nothing was created for the rejected submissions.
        let status = fx.gate.access_status(&admin.actor()).await.unwrap();
        assert!(!status.is_onboarded);
    }

    #[tokio::test]
    async fn organization_directory_lists_by_name() {
        let fx = Fixture::new();
        let a = fx.account(Role::SuperAdmin, None).await;

        fx.gate
            .submit_onboarding(&a.actor(), profile("Zulu Agency"))
            .await
            .unwrap();
        let b = fx.account(Role::ClubAdmin, Some(ClubId::new())).await;
        fx.gate
            .submit_onboarding(&b.actor(), profile("Alpha Agency"))
            .await
            .unwrap();

        let names: Vec<_> = fx
            .gate
            .list_organizations(&a.actor())
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.name)
            .collect();
        assert_eq!(names, vec!["ALPHA AGENCY", "ZULU AGENCY"]);
    }

    #[tokio::test]
    async fn organizations_deduplicate_by_uppercased_name() {
        let fx = Fixture::new();
        let a = fx.account(Role::SuperAdmin, None).await;
        let b = fx.account(Role::ClubAdmin, Some(ClubId::new())).await;

        let first = fx
            .gate
            .submit_onboarding(
                &a.actor(),
                profile("Acme Corp"),
            )
            .await
            .unwrap();
        let second = fx
            .gate
            .submit_onboarding(
                &b.actor(),
                profile("  ACME corp"),
            )
            .await
            .unwrap();
        assert_eq!(first.organization_id, second.organization_id);
    }

    #[tokio::test]
    async fn revocation_deletes_the_row_and_resets_onboarding() {
        let fx = Fixture::new();
        let club = ClubId::new();
        let admin = fx.account(Role::ClubAdmin, Some(club)).await;
        let member = fx.account(Role::Member, Some(club)).await;

        fx.gate.nominate(&admin.actor(), member.id).await.unwrap();
        fx.gate
            .submit_onboarding(&member.actor(), profile("ACME CORP"))
            .await
            .unwrap();

        fx.gate
            .set_network_member(&admin.actor(), member.id, false)
            .await
            .unwrap();
        let status = fx.gate.access_status(&member.actor()).await.unwrap();
        assert!(!status.has_access);
        assert!(!status.is_onboarded);

        // Re-enabling starts over: no onboarding carried across revocation.
        fx.gate
            .set_network_member(&admin.actor(), member.id, true)
            .await
            .unwrap();
        let status = fx.gate.access_status(&member.actor()).await.unwrap();
        assert!(status.has_access);
        assert!(!status.is_onboarded);
    }

    #[tokio::test]
    async fn reports_track_read_marks_per_reader() {
        let fx = Fixture::new();
        let author = fx.account(Role::SuperAdmin, None).await;
        let reader = fx.account(Role::ClubAdmin, Some(ClubId::new())).await;

        let report = fx
            .gate
            .submit_report(
                &author.actor(),
                NewReport {
                    title: "sighting".into(),
                    body: "details".into(),
                },
            )
            .await
            .unwrap();

        assert_eq!(fx.gate.unread_report_count(&reader.actor()).await.unwrap(), 1);
        fx.gate.mark_report_read(&reader.actor(), report.id).await.unwrap();
        assert_eq!(fx.gate.unread_report_count(&reader.actor()).await.unwrap(), 0);
        // The author's own marks are independent.
        assert_eq!(fx.gate.unread_report_count(&author.actor()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn deleted_reports_drop_out_of_listings() {
        let fx = Fixture::new();
        let author = fx.account(Role::SuperAdmin, None).await;
        let other = fx.account(Role::ClubAdmin, Some(ClubId::new())).await;

        let report = fx
            .gate
            .submit_report(
                &author.actor(),
                NewReport {
                    title: "t".into(),
                    body: "b".into(),
                },
            )
            .await
            .unwrap();

        // A non-author without the super admin role cannot manage it.
        let err = fx
            .gate
            .delete_report(&other.actor(), report.id)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        fx.gate.delete_report(&author.actor(), report.id).await.unwrap();
        let listed = fx.gate.list_reports(&other.actor(), true).await.unwrap();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn archived_reports_only_show_when_asked() {
        let fx = Fixture::new();
        let author = fx.account(Role::SuperAdmin, None).await;

        let report = fx
            .gate
            .submit_report(
                &author.actor(),
                NewReport {
                    title: "t".into(),
                    body: "b".into(),
                },
            )
            .await
            .unwrap();
        fx.gate.archive_report(&author.actor(), report.id).await.unwrap();

        assert!(fx.gate.list_reports(&author.actor(), false).await.unwrap().is_empty());
        assert_eq!(fx.gate.list_reports(&author.actor(), true).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn targeted_demands_hide_from_bystanders() {
        let fx = Fixture::new();
        let club = ClubId::new();
        let author = fx.account(Role::ClubAdmin, Some(club)).await;
        let target = fx.account(Role::Member, Some(club)).await;
        let bystander = fx.account(Role::Member, Some(club)).await;
        let root = fx.account(Role::SuperAdmin, None).await;
        fx.gate.nominate(&author.actor(), target.id).await.unwrap();
        fx.gate.nominate(&author.actor(), bystander.id).await.unwrap();

        fx.gate
            .create_demand(
                &author.actor(),
                NewDemand {
                    title: "quiet task".into(),
                    body: "".into(),
                    priority: DemandPriority::High,
                    kind: DemandKind::Intel,
                    target_agent_id: Some(target.id),
                },
            )
            .await
            .unwrap();
        fx.gate
            .create_demand(
                &author.actor(),
                NewDemand {
                    title: "open task".into(),
                    body: "".into(),
                    priority: DemandPriority::Low,
                    kind: DemandKind::Support,
                    target_agent_id: None,
                },
            )
            .await
            .unwrap();

        let for_target = fx
            .gate
            .list_demands(&target.actor(), DemandFilter::default())
            .await
            .unwrap();
        assert_eq!(for_target.len(), 2);

        let for_bystander = fx
            .gate
            .list_demands(&bystander.actor(), DemandFilter::default())
            .await
            .unwrap();
        assert_eq!(for_bystander.len(), 1);
        assert_eq!(for_bystander[0].title, "open task");

        let for_root = fx
            .gate
            .list_demands(&root.actor(), DemandFilter::default())
            .await
            .unwrap();
        assert_eq!(for_root.len(), 2);
    }

    #[tokio::test]
    async fn outsiders_cannot_touch_the_boards() {
        let fx = Fixture::new();
        let outsider = fx.account(Role::Member, None).await;

        let err = fx
            .gate
            .list_reports(&outsider.actor(), false)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }
}

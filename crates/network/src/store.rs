use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;

use coalition_core::{AccountId, DemandId, MembershipId, OrganizationId, ReportId};
use coalition_members::store::StoreError;

use crate::records::{Demand, NetworkMembership, Organization, Report, ReportStatus};

/// Persistence port for the network area.
#[async_trait]
pub trait NetworkStore: Send + Sync {
    async fn membership_for(
        &self,
        account_id: AccountId,
    ) -> Result<Option<NetworkMembership>, StoreError>;
    async fn insert_membership(&self, membership: NetworkMembership) -> Result<(), StoreError>;
    async fn update_membership(&self, membership: &NetworkMembership) -> Result<(), StoreError>;
    /// Revocation is a hard delete; there is no tombstone for memberships.
    async fn delete_membership(&self, account_id: AccountId) -> Result<(), StoreError>;
    async fn list_memberships(&self) -> Result<Vec<NetworkMembership>, StoreError>;

    /// Lookup by exact (already-uppercased) name.
    async fn organization_by_name(&self, name: &str) -> Result<Option<Organization>, StoreError>;
    async fn insert_organization(&self, organization: Organization) -> Result<(), StoreError>;
    /// All organizations, ordered by name.
    async fn list_organizations(&self) -> Result<Vec<Organization>, StoreError>;

    async fn report(&self, id: ReportId) -> Result<Option<Report>, StoreError>;
    async fn insert_report(&self, report: Report) -> Result<(), StoreError>;
    async fn update_report(&self, report: &Report) -> Result<(), StoreError>;
    /// Reports in the given statuses, newest first.
    async fn list_reports(&self, statuses: &[ReportStatus]) -> Result<Vec<Report>, StoreError>;
    async fn mark_report_read(
        &self,
        report_id: ReportId,
        account_id: AccountId,
    ) -> Result<(), StoreError>;
    async fn read_report_ids(&self, account_id: AccountId) -> Result<HashSet<ReportId>, StoreError>;

    async fn demand(&self, id: DemandId) -> Result<Option<Demand>, StoreError>;
    async fn insert_demand(&self, demand: Demand) -> Result<(), StoreError>;
    async fn update_demand(&self, demand: &Demand) -> Result<(), StoreError>;
    /// All demands, newest first. Visibility is the caller's concern.
    async fn list_demands(&self) -> Result<Vec<Demand>, StoreError>;
}

// ─── In-memory implementation ────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryNetwork {
    memberships: RwLock<HashMap<MembershipId, NetworkMembership>>,
    organizations: RwLock<HashMap<OrganizationId, Organization>>,
    reports: RwLock<HashMap<ReportId, Report>>,
    read_marks: RwLock<HashSet<(ReportId, AccountId)>>,
    demands: RwLock<HashMap<DemandId, Demand>>,
}

impl InMemoryNetwork {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NetworkStore for InMemoryNetwork {
    async fn membership_for(
        &self,
        account_id: AccountId,
    ) -> Result<Option<NetworkMembership>, StoreError> {
        let memberships = self.memberships.read().unwrap();
        Ok(memberships
            .values()
            .find(|m| m.account_id == account_id)
            .cloned())
    }

    async fn insert_membership(&self, membership: NetworkMembership) -> Result<(), StoreError> {
        let mut memberships = self.memberships.write().unwrap();
        if memberships
            .values()
            .any(|m| m.account_id == membership.account_id)
        {
            return Err(StoreError::Conflict(format!(
                "account {} already has a network membership",
                membership.account_id
            )));
        }
        memberships.insert(membership.id, membership);
        Ok(())
    }

    async fn update_membership(&self, membership: &NetworkMembership) -> Result<(), StoreError> {
        let mut memberships = self.memberships.write().unwrap();
        match memberships.get_mut(&membership.id) {
            Some(slot) => {
                *slot = membership.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    async fn delete_membership(&self, account_id: AccountId) -> Result<(), StoreError> {
        let mut memberships = self.memberships.write().unwrap();
        memberships.retain(|_, m| m.account_id != account_id);
        Ok(())
    }

    async fn list_memberships(&self) -> Result<Vec<NetworkMembership>, StoreError> {
        let memberships = self.memberships.read().unwrap();
        let mut rows: Vec<_> = memberships.values().cloned().collect();
        rows.sort_by_key(|m| m.created_at);
        Ok(rows)
    }

    async fn organization_by_name(&self, name: &str) -> Result<Option<Organization>, StoreError> {
        let organizations = self.organizations.read().unwrap();
        Ok(organizations.values().find(|o| o.name == name).cloned())
    }

    async fn insert_organization(&self, organization: Organization) -> Result<(), StoreError> {
        let mut organizations = self.organizations.write().unwrap();
        if organizations.values().any(|o| o.name == organization.name) {
            return Err(StoreError::Conflict(format!(
                "organization {:?} already exists",
                organization.name
            )));
        }
        organizations.insert(organization.id, organization);
        Ok(())
    }

    async fn list_organizations(&self) -> Result<Vec<Organization>, StoreError> {
        let organizations = self.organizations.read().unwrap();
        let mut rows: Vec<_> = organizations.values().cloned().collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn report(&self, id: ReportId) -> Result<Option<Report>, StoreError> {
        Ok(self.reports.read().unwrap().get(&id).cloned())
    }

    async fn insert_report(&self, report: Report) -> Result<(), StoreError> {
        self.reports.write().unwrap().insert(report.id, report);
        Ok(())
    }

    async fn update_report(&self, report: &Report) -> Result<(), StoreError> {
        let mut reports = self.reports.write().unwrap();
        match reports.get_mut(&report.id) {
            Some(slot) => {
                *slot = report.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    async fn list_reports(&self, statuses: &[ReportStatus]) -> Result<Vec<Report>, StoreError> {
        let reports = self.reports.read().unwrap();
        let mut rows: Vec<_> = reports
            .values()
            .filter(|r| statuses.contains(&r.status))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn mark_report_read(
        &self,
        report_id: ReportId,
        account_id: AccountId,
    ) -> Result<(), StoreError> {
        self.read_marks
            .write()
            .unwrap()
            .insert((report_id, account_id));
        Ok(())
    }

    async fn read_report_ids(
        &self,
        account_id: AccountId,
    ) -> Result<HashSet<ReportId>, StoreError> {
        let marks = self.read_marks.read().unwrap();
        Ok(marks
            .iter()
            .filter(|(_, reader)| *reader == account_id)
            .map(|(report, _)| *report)
            .collect())
    }

    async fn demand(&self, id: DemandId) -> Result<Option<Demand>, StoreError> {
        Ok(self.demands.read().unwrap().get(&id).cloned())
    }

    async fn insert_demand(&self, demand: Demand) -> Result<(), StoreError> {
        self.demands.write().unwrap().insert(demand.id, demand);
        Ok(())
    }

    async fn update_demand(&self, demand: &Demand) -> Result<(), StoreError> {
        let mut demands = self.demands.write().unwrap();
        match demands.get_mut(&demand.id) {
            Some(slot) => {
                *slot = demand.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    async fn list_demands(&self) -> Result<Vec<Demand>, StoreError> {
        let demands = self.demands.read().unwrap();
        let mut rows: Vec<_> = demands.values().cloned().collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }
}

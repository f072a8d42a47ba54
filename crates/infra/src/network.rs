//! Postgres-backed network store (memberships, organizations, reports,
//! demands).

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use coalition_core::{AccountId, DemandId, MembershipId, OrganizationId, ReportId};
use coalition_members::store::StoreError;
use coalition_network::records::{
    Demand, DemandKind, DemandPriority, DemandStatus, NetworkMembership, Organization, Report,
    ReportStatus,
};
use coalition_network::store::NetworkStore;

use crate::errors::{bad_column, map_sqlx_error};

#[derive(Debug, Clone)]
pub struct PostgresNetwork {
    pool: Arc<PgPool>,
}

impl PostgresNetwork {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

const MEMBERSHIP_COLUMNS: &str = "id, account_id, organization_id, category, sector, \
                                  work_phone, functional_email, onboarded, nominated_by, \
                                  created_at, updated_at";
const REPORT_COLUMNS: &str = "id, author_id, title, body, status, created_at, updated_at";
const DEMAND_COLUMNS: &str =
    "id, author_id, title, body, priority, kind, status, target_agent_id, created_at, updated_at";

fn membership_from_row(row: &PgRow) -> Result<NetworkMembership, StoreError> {
    let get = |e| map_sqlx_error("network_membership", e);
    Ok(NetworkMembership {
        id: MembershipId::from_uuid(row.try_get::<Uuid, _>("id").map_err(get)?),
        account_id: AccountId::from_uuid(row.try_get::<Uuid, _>("account_id").map_err(get)?),
        organization_id: row
            .try_get::<Option<Uuid>, _>("organization_id")
            .map_err(get)?
            .map(OrganizationId::from_uuid),
        category: row.try_get("category").map_err(get)?,
        sector: row.try_get("sector").map_err(get)?,
        work_phone: row.try_get("work_phone").map_err(get)?,
        functional_email: row.try_get("functional_email").map_err(get)?,
        onboarded: row.try_get("onboarded").map_err(get)?,
        nominated_by: row
            .try_get::<Option<Uuid>, _>("nominated_by")
            .map_err(get)?
            .map(AccountId::from_uuid),
        created_at: row.try_get("created_at").map_err(get)?,
        updated_at: row.try_get("updated_at").map_err(get)?,
    })
}

fn report_from_row(row: &PgRow) -> Result<Report, StoreError> {
    let status_text: String = row
        .try_get("status")
        .map_err(|e| map_sqlx_error("report", e))?;
    let status = match status_text.as_str() {
        "active" => ReportStatus::Active,
        "archived" => ReportStatus::Archived,
        "deleted" => ReportStatus::Deleted,
        other => return Err(bad_column("status", other)),
    };

    let get = |e| map_sqlx_error("report", e);
    Ok(Report {
        id: ReportId::from_uuid(row.try_get::<Uuid, _>("id").map_err(get)?),
        author_id: AccountId::from_uuid(row.try_get::<Uuid, _>("author_id").map_err(get)?),
        title: row.try_get("title").map_err(get)?,
        body: row.try_get("body").map_err(get)?,
        status,
        created_at: row.try_get("created_at").map_err(get)?,
        updated_at: row.try_get("updated_at").map_err(get)?,
    })
}

fn demand_from_row(row: &PgRow) -> Result<Demand, StoreError> {
    let priority_text: String = row
        .try_get("priority")
        .map_err(|e| map_sqlx_error("demand", e))?;
    let priority = match priority_text.as_str() {
        "low" => DemandPriority::Low,
        "medium" => DemandPriority::Medium,
        "high" => DemandPriority::High,
        "urgent" => DemandPriority::Urgent,
        other => return Err(bad_column("priority", other)),
    };
    let kind_text: String = row
        .try_get("kind")
        .map_err(|e| map_sqlx_error("demand", e))?;
    let kind = match kind_text.as_str() {
        "intel" => DemandKind::Intel,
        "support" => DemandKind::Support,
        "logistics" => DemandKind::Logistics,
        "other" => DemandKind::Other,
        other => return Err(bad_column("kind", other)),
    };
    let status_text: String = row
        .try_get("status")
        .map_err(|e| map_sqlx_error("demand", e))?;
    let status = match status_text.as_str() {
        "open" => DemandStatus::Open,
        "in_progress" => DemandStatus::InProgress,
        "closed" => DemandStatus::Closed,
        other => return Err(bad_column("status", other)),
    };

    let get = |e| map_sqlx_error("demand", e);
    Ok(Demand {
        id: DemandId::from_uuid(row.try_get::<Uuid, _>("id").map_err(get)?),
        author_id: AccountId::from_uuid(row.try_get::<Uuid, _>("author_id").map_err(get)?),
        title: row.try_get("title").map_err(get)?,
        body: row.try_get("body").map_err(get)?,
        priority,
        kind,
        status,
        target_agent_id: row
            .try_get::<Option<Uuid>, _>("target_agent_id")
            .map_err(get)?
            .map(AccountId::from_uuid),
        created_at: row.try_get("created_at").map_err(get)?,
        updated_at: row.try_get("updated_at").map_err(get)?,
    })
}

fn priority_str(priority: DemandPriority) -> &'static str {
    match priority {
        DemandPriority::Low => "low",
        DemandPriority::Medium => "medium",
        DemandPriority::High => "high",
        DemandPriority::Urgent => "urgent",
    }
}

fn kind_str(kind: DemandKind) -> &'static str {
    match kind {
        DemandKind::Intel => "intel",
        DemandKind::Support => "support",
        DemandKind::Logistics => "logistics",
        DemandKind::Other => "other",
    }
}

fn status_str(status: DemandStatus) -> &'static str {
    match status {
        DemandStatus::Open => "open",
        DemandStatus::InProgress => "in_progress",
        DemandStatus::Closed => "closed",
    }
}

#[async_trait]
impl NetworkStore for PostgresNetwork {
    async fn membership_for(
        &self,
        account_id: AccountId,
    ) -> Result<Option<NetworkMembership>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {MEMBERSHIP_COLUMNS} FROM network_memberships WHERE account_id = $1"
        ))
        .bind(account_id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("membership_for", e))?;
        row.as_ref().map(membership_from_row).transpose()
    }

    async fn insert_membership(&self, membership: NetworkMembership) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO network_memberships (id, account_id, organization_id, category,
                                             sector, work_phone, functional_email,
                                             onboarded, nominated_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(membership.id.as_uuid())
        .bind(membership.account_id.as_uuid())
        .bind(membership.organization_id.map(|o| o.as_uuid()))
        .bind(&membership.category)
        .bind(&membership.sector)
        .bind(&membership.work_phone)
        .bind(&membership.functional_email)
        .bind(membership.onboarded)
        .bind(membership.nominated_by.map(|n| n.as_uuid()))
        .bind(membership.created_at)
        .bind(membership.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_membership", e))?;
        Ok(())
    }

    async fn update_membership(&self, membership: &NetworkMembership) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE network_memberships
            SET organization_id = $2, category = $3, sector = $4, work_phone = $5,
                functional_email = $6, onboarded = $7, updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(membership.id.as_uuid())
        .bind(membership.organization_id.map(|o| o.as_uuid()))
        .bind(&membership.category)
        .bind(&membership.sector)
        .bind(&membership.work_phone)
        .bind(&membership.functional_email)
        .bind(membership.onboarded)
        .bind(membership.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_membership", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete_membership(&self, account_id: AccountId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM network_memberships WHERE account_id = $1")
            .bind(account_id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_membership", e))?;
        Ok(())
    }

    async fn list_memberships(&self) -> Result<Vec<NetworkMembership>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {MEMBERSHIP_COLUMNS} FROM network_memberships ORDER BY created_at"
        ))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_memberships", e))?;
        rows.iter().map(membership_from_row).collect()
    }

    async fn organization_by_name(&self, name: &str) -> Result<Option<Organization>, StoreError> {
        let row = sqlx::query("SELECT id, name, created_at FROM organizations WHERE name = $1")
            .bind(name)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("organization_by_name", e))?;
        let Some(row) = row else { return Ok(None) };
        let get = |e| map_sqlx_error("organization", e);
        Ok(Some(Organization {
            id: OrganizationId::from_uuid(row.try_get::<Uuid, _>("id").map_err(get)?),
            name: row.try_get("name").map_err(get)?,
            created_at: row.try_get("created_at").map_err(get)?,
        }))
    }

    async fn insert_organization(&self, organization: Organization) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO organizations (id, name, created_at) VALUES ($1, $2, $3)")
            .bind(organization.id.as_uuid())
            .bind(&organization.name)
            .bind(organization.created_at)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_organization", e))?;
        Ok(())
    }

    async fn list_organizations(&self) -> Result<Vec<Organization>, StoreError> {
        let rows = sqlx::query("SELECT id, name, created_at FROM organizations ORDER BY name")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_organizations", e))?;
        let get = |e| map_sqlx_error("organization", e);
        rows.iter()
            .map(|row| {
                Ok(Organization {
                    id: OrganizationId::from_uuid(row.try_get::<Uuid, _>("id").map_err(get)?),
                    name: row.try_get("name").map_err(get)?,
                    created_at: row.try_get("created_at").map_err(get)?,
                })
            })
            .collect()
    }

    async fn report(&self, id: ReportId) -> Result<Option<Report>, StoreError> {
        let row = sqlx::query(&format!("SELECT {REPORT_COLUMNS} FROM reports WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("report", e))?;
        row.as_ref().map(report_from_row).transpose()
    }

    async fn insert_report(&self, report: Report) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO reports (id, author_id, title, body, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(report.id.as_uuid())
        .bind(report.author_id.as_uuid())
        .bind(&report.title)
        .bind(&report.body)
        .bind(report.status.as_str())
        .bind(report.created_at)
        .bind(report.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_report", e))?;
        Ok(())
    }

    async fn update_report(&self, report: &Report) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE reports SET title = $2, body = $3, status = $4, updated_at = $5 WHERE id = $1",
        )
        .bind(report.id.as_uuid())
        .bind(&report.title)
        .bind(&report.body)
        .bind(report.status.as_str())
        .bind(report.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_report", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list_reports(&self, statuses: &[ReportStatus]) -> Result<Vec<Report>, StoreError> {
        let statuses: Vec<String> = statuses.iter().map(|s| s.as_str().to_owned()).collect();
        let rows = sqlx::query(&format!(
            r#"
            SELECT {REPORT_COLUMNS} FROM reports
            WHERE status = ANY($1)
            ORDER BY created_at DESC
            "#
        ))
        .bind(&statuses)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_reports", e))?;
        rows.iter().map(report_from_row).collect()
    }

    async fn mark_report_read(
        &self,
        report_id: ReportId,
        account_id: AccountId,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO report_reads (report_id, account_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(report_id.as_uuid())
        .bind(account_id.as_uuid())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("mark_report_read", e))?;
        Ok(())
    }

    async fn read_report_ids(
        &self,
        account_id: AccountId,
    ) -> Result<HashSet<ReportId>, StoreError> {
        let rows = sqlx::query("SELECT report_id FROM report_reads WHERE account_id = $1")
            .bind(account_id.as_uuid())
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("read_report_ids", e))?;
        rows.iter()
            .map(|row| {
                row.try_get::<Uuid, _>("report_id")
                    .map(ReportId::from_uuid)
                    .map_err(|e| map_sqlx_error("read_report_ids", e))
            })
            .collect()
    }

    async fn demand(&self, id: DemandId) -> Result<Option<Demand>, StoreError> {
        let row = sqlx::query(&format!("SELECT {DEMAND_COLUMNS} FROM demands WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("demand", e))?;
        row.as_ref().map(demand_from_row).transpose()
    }

    async fn insert_demand(&self, demand: Demand) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO demands (id, author_id, title, body, priority, kind, status,
                                 target_agent_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(demand.id.as_uuid())
        .bind(demand.author_id.as_uuid())
        .bind(&demand.title)
        .bind(&demand.body)
        .bind(priority_str(demand.priority))
        .bind(kind_str(demand.kind))
        .bind(status_str(demand.status))
        .bind(demand.target_agent_id.map(|t| t.as_uuid()))
        .bind(demand.created_at)
        .bind(demand.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_demand", e))?;
        Ok(())
    }

    async fn update_demand(&self, demand: &Demand) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE demands
            SET title = $2, body = $3, priority = $4, kind = $5, status = $6, updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(demand.id.as_uuid())
        .bind(&demand.title)
        .bind(&demand.body)
        .bind(priority_str(demand.priority))
        .bind(kind_str(demand.kind))
        .bind(status_str(demand.status))
        .bind(demand.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_demand", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list_demands(&self) -> Result<Vec<Demand>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {DEMAND_COLUMNS} FROM demands ORDER BY created_at DESC"
        ))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_demands", e))?;
        rows.iter().map(demand_from_row).collect()
    }
}

//! Postgres-backed directory store (accounts, clubs, membership requests).

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::instrument;
use uuid::Uuid;

use coalition_auth::Role;
use coalition_core::{AccountId, ClubId, RequestId};
use coalition_members::member_code::MemberCode;
use coalition_members::records::{
    Account, Club, MembershipRequest, MembershipStatus, RequestStatus,
};
use coalition_members::store::{AccountFilter, DirectoryStore, StoreError};

use crate::errors::{bad_column, map_sqlx_error};

#[derive(Debug, Clone)]
pub struct PostgresDirectory {
    pool: Arc<PgPool>,
}

impl PostgresDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

const ACCOUNT_COLUMNS: &str = "id, name, email, role, club_id, membership_status, country, \
                               member_code, member_sequence, created_at, updated_at, deleted_at";
const CLUB_COLUMNS: &str = "id, name, description, country, president_id, created_at, updated_at, \
                            deleted_at";
const REQUEST_COLUMNS: &str = "id, account_id, club_id, status, message, reviewed_by, \
                               review_notes, reviewed_at, created_at";

fn account_from_row(row: &PgRow) -> Result<Account, StoreError> {
    let role_text: String = row.try_get("role").map_err(|e| map_sqlx_error("account", e))?;
    let role = Role::from_str(&role_text).map_err(|_| bad_column("role", &role_text))?;
    let status_text: String = row
        .try_get("membership_status")
        .map_err(|e| map_sqlx_error("account", e))?;
    let membership_status = match status_text.as_str() {
        "pending" => MembershipStatus::Pending,
        "approved" => MembershipStatus::Approved,
        "rejected" => MembershipStatus::Rejected,
        other => return Err(bad_column("membership_status", other)),
    };

    let get = |e| map_sqlx_error("account", e);
    Ok(Account {
        id: AccountId::from_uuid(row.try_get::<Uuid, _>("id").map_err(get)?),
        name: row.try_get("name").map_err(get)?,
        email: row.try_get("email").map_err(get)?,
        role,
        club_id: row
            .try_get::<Option<Uuid>, _>("club_id")
            .map_err(get)?
            .map(ClubId::from_uuid),
        membership_status,
        country: row.try_get("country").map_err(get)?,
        member_code: row
            .try_get::<Option<String>, _>("member_code")
            .map_err(get)?
            .map(MemberCode::from),
        member_sequence: row
            .try_get::<Option<i64>, _>("member_sequence")
            .map_err(get)?
            .map(|n| n as u64),
        created_at: row.try_get("created_at").map_err(get)?,
        updated_at: row.try_get("updated_at").map_err(get)?,
        deleted_at: row.try_get("deleted_at").map_err(get)?,
    })
}

fn club_from_row(row: &PgRow) -> Result<Club, StoreError> {
    let get = |e| map_sqlx_error("club", e);
    Ok(Club {
        id: ClubId::from_uuid(row.try_get::<Uuid, _>("id").map_err(get)?),
        name: row.try_get("name").map_err(get)?,
        description: row.try_get("description").map_err(get)?,
        country: row.try_get("country").map_err(get)?,
        president_id: row
            .try_get::<Option<Uuid>, _>("president_id")
            .map_err(get)?
            .map(AccountId::from_uuid),
        created_at: row.try_get("created_at").map_err(get)?,
        updated_at: row.try_get("updated_at").map_err(get)?,
        deleted_at: row.try_get("deleted_at").map_err(get)?,
    })
}

fn request_from_row(row: &PgRow) -> Result<MembershipRequest, StoreError> {
    let status_text: String = row
        .try_get("status")
        .map_err(|e| map_sqlx_error("request", e))?;
    let status = match status_text.as_str() {
        "pending" => RequestStatus::Pending,
        "approved" => RequestStatus::Approved,
        "rejected" => RequestStatus::Rejected,
        other => return Err(bad_column("status", other)),
    };

    let get = |e| map_sqlx_error("request", e);
    Ok(MembershipRequest {
        id: RequestId::from_uuid(row.try_get::<Uuid, _>("id").map_err(get)?),
        account_id: AccountId::from_uuid(row.try_get::<Uuid, _>("account_id").map_err(get)?),
        club_id: ClubId::from_uuid(row.try_get::<Uuid, _>("club_id").map_err(get)?),
        status,
        message: row.try_get("message").map_err(get)?,
        reviewed_by: row
            .try_get::<Option<Uuid>, _>("reviewed_by")
            .map_err(get)?
            .map(AccountId::from_uuid),
        review_notes: row.try_get("review_notes").map_err(get)?,
        reviewed_at: row.try_get("reviewed_at").map_err(get)?,
        created_at: row.try_get("created_at").map_err(get)?,
    })
}

#[async_trait]
impl DirectoryStore for PostgresDirectory {
    async fn account(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("account", e))?;
        row.as_ref().map(account_from_row).transpose()
    }

    async fn insert_account(&self, account: Account) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO accounts (id, name, email, role, club_id, membership_status, country,
                                  member_code, member_sequence, created_at, updated_at, deleted_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(account.id.as_uuid())
        .bind(&account.name)
        .bind(&account.email)
        .bind(account.role.as_str())
        .bind(account.club_id.map(|c| c.as_uuid()))
        .bind(account.membership_status.as_str())
        .bind(&account.country)
        .bind(account.member_code.as_ref().map(|c| c.as_str().to_owned()))
        .bind(account.member_sequence.map(|n| n as i64))
        .bind(account.created_at)
        .bind(account.updated_at)
        .bind(account.deleted_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_account", e))?;
        Ok(())
    }

    async fn update_account(&self, account: &Account) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET name = $2, email = $3, role = $4, club_id = $5, membership_status = $6,
                country = $7, member_code = $8, member_sequence = $9, updated_at = $10,
                deleted_at = $11
            WHERE id = $1
            "#,
        )
        .bind(account.id.as_uuid())
        .bind(&account.name)
        .bind(&account.email)
        .bind(account.role.as_str())
        .bind(account.club_id.map(|c| c.as_uuid()))
        .bind(account.membership_status.as_str())
        .bind(&account.country)
        .bind(account.member_code.as_ref().map(|c| c.as_str().to_owned()))
        .bind(account.member_sequence.map(|n| n as i64))
        .bind(account.updated_at)
        .bind(account.deleted_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_account", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list_accounts(&self, filter: AccountFilter) -> Result<Vec<Account>, StoreError> {
        // Optional filters collapse with `IS NULL` guards so one statement
        // covers every combination.
        let rows = sqlx::query(&format!(
            r#"
            SELECT {ACCOUNT_COLUMNS} FROM accounts
            WHERE ($1::uuid IS NULL OR club_id = $1)
              AND ($2::text IS NULL OR role = $2)
              AND ($3::text IS NULL OR country = $3)
              AND ($4 OR deleted_at IS NULL)
            ORDER BY created_at
            "#
        ))
        .bind(filter.club_id.map(|c| c.as_uuid()))
        .bind(filter.role.map(|r| r.as_str()))
        .bind(filter.country)
        .bind(filter.include_deleted)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_accounts", e))?;
        rows.iter().map(account_from_row).collect()
    }

    async fn club(&self, id: ClubId) -> Result<Option<Club>, StoreError> {
        let row = sqlx::query(&format!("SELECT {CLUB_COLUMNS} FROM clubs WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("club", e))?;
        row.as_ref().map(club_from_row).transpose()
    }

    async fn insert_club(&self, club: Club) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO clubs (id, name, description, country, president_id, created_at,
                               updated_at, deleted_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(club.id.as_uuid())
        .bind(&club.name)
        .bind(&club.description)
        .bind(&club.country)
        .bind(club.president_id.map(|p| p.as_uuid()))
        .bind(club.created_at)
        .bind(club.updated_at)
        .bind(club.deleted_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_club", e))?;
        Ok(())
    }

    async fn update_club(&self, club: &Club) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE clubs
            SET name = $2, description = $3, country = $4, president_id = $5, updated_at = $6,
                deleted_at = $7
            WHERE id = $1
            "#,
        )
        .bind(club.id.as_uuid())
        .bind(&club.name)
        .bind(&club.description)
        .bind(&club.country)
        .bind(club.president_id.map(|p| p.as_uuid()))
        .bind(club.updated_at)
        .bind(club.deleted_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_club", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list_clubs(&self, include_deleted: bool) -> Result<Vec<Club>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {CLUB_COLUMNS} FROM clubs WHERE $1 OR deleted_at IS NULL ORDER BY name"
        ))
        .bind(include_deleted)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_clubs", e))?;
        rows.iter().map(club_from_row).collect()
    }

    async fn request(&self, id: RequestId) -> Result<Option<MembershipRequest>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {REQUEST_COLUMNS} FROM membership_requests WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("request", e))?;
        row.as_ref().map(request_from_row).transpose()
    }

    async fn insert_request(&self, request: MembershipRequest) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO membership_requests (id, account_id, club_id, status, message,
                                             reviewed_by, review_notes, reviewed_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(request.id.as_uuid())
        .bind(request.account_id.as_uuid())
        .bind(request.club_id.as_uuid())
        .bind(request.status.as_str())
        .bind(&request.message)
        .bind(request.reviewed_by.map(|r| r.as_uuid()))
        .bind(&request.review_notes)
        .bind(request.reviewed_at)
        .bind(request.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_request", e))?;
        Ok(())
    }

    async fn update_request(&self, request: &MembershipRequest) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE membership_requests
            SET status = $2, reviewed_by = $3, review_notes = $4, reviewed_at = $5
            WHERE id = $1
            "#,
        )
        .bind(request.id.as_uuid())
        .bind(request.status.as_str())
        .bind(request.reviewed_by.map(|r| r.as_uuid()))
        .bind(&request.review_notes)
        .bind(request.reviewed_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_request", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn pending_request_for(
        &self,
        account_id: AccountId,
    ) -> Result<Option<MembershipRequest>, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {REQUEST_COLUMNS} FROM membership_requests
            WHERE account_id = $1 AND status = 'pending'
            ORDER BY created_at DESC
            LIMIT 1
            "#
        ))
        .bind(account_id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("pending_request_for", e))?;
        row.as_ref().map(request_from_row).transpose()
    }

    async fn pending_requests_for_club(
        &self,
        club_id: ClubId,
    ) -> Result<Vec<MembershipRequest>, StoreError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {REQUEST_COLUMNS} FROM membership_requests
            WHERE club_id = $1 AND status = 'pending'
            ORDER BY created_at DESC
            "#
        ))
        .bind(club_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("pending_requests_for_club", e))?;
        rows.iter().map(request_from_row).collect()
    }

    async fn next_member_sequence(&self) -> Result<u64, StoreError> {
        let row = sqlx::query("SELECT nextval('member_code_seq') AS seq")
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("next_member_sequence", e))?;
        let seq: i64 = row
            .try_get("seq")
            .map_err(|e| map_sqlx_error("next_member_sequence", e))?;
        Ok(seq as u64)
    }

    #[instrument(skip(self), fields(club_id = %club_id.as_uuid()), err)]
    async fn soft_delete_club_cascade(
        &self,
        club_id: ClubId,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("soft_delete_club_cascade", e))?;

        let result = sqlx::query(
            "UPDATE clubs SET deleted_at = $2, updated_at = $2 WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(club_id.as_uuid())
        .bind(at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("soft_delete_club_cascade", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        sqlx::query(
            r#"
            UPDATE accounts SET deleted_at = $2, updated_at = $2
            WHERE club_id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(club_id.as_uuid())
        .bind(at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("soft_delete_club_cascade", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("soft_delete_club_cascade", e))
    }
}

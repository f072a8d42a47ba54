//! Directory store: the durable home of accounts, clubs and requests.
//!
//! The port is async so infrastructure can suspend on I/O; the engine treats
//! every call as a plain blocking lookup and never caches results between
//! requests.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use coalition_auth::Role;
use coalition_core::{AccountId, ClubId, DomainError, RequestId};

use crate::records::{Account, Club, MembershipRequest, RequestStatus};

/// Store-level error, mapped into the domain taxonomy at the boundary.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("row not found")]
    NotFound,
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("backend error: {0}")]
    Backend(String),
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => DomainError::not_found("record not found"),
            StoreError::Conflict(msg) => DomainError::conflict(msg),
            StoreError::Backend(msg) => DomainError::storage(msg),
        }
    }
}

/// Predicate filter for account listings.
#[derive(Debug, Clone, Default)]
pub struct AccountFilter {
    pub club_id: Option<ClubId>,
    pub role: Option<Role>,
    pub country: Option<String>,
    pub include_deleted: bool,
}

/// Durable storage for accounts, clubs and membership requests.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    async fn account(&self, id: AccountId) -> Result<Option<Account>, StoreError>;
    async fn insert_account(&self, account: Account) -> Result<(), StoreError>;
    async fn update_account(&self, account: &Account) -> Result<(), StoreError>;
    async fn list_accounts(&self, filter: AccountFilter) -> Result<Vec<Account>, StoreError>;

    async fn club(&self, id: ClubId) -> Result<Option<Club>, StoreError>;
    async fn insert_club(&self, club: Club) -> Result<(), StoreError>;
    async fn update_club(&self, club: &Club) -> Result<(), StoreError>;
    async fn list_clubs(&self, include_deleted: bool) -> Result<Vec<Club>, StoreError>;

    async fn request(&self, id: RequestId) -> Result<Option<MembershipRequest>, StoreError>;
    async fn insert_request(&self, request: MembershipRequest) -> Result<(), StoreError>;
    async fn update_request(&self, request: &MembershipRequest) -> Result<(), StoreError>;
    /// The account's open request, if any. At most one exists at a time.
    async fn pending_request_for(
        &self,
        account: AccountId,
    ) -> Result<Option<MembershipRequest>, StoreError>;
    async fn pending_requests_for_club(
        &self,
        club: ClubId,
    ) -> Result<Vec<MembershipRequest>, StoreError>;

    /// Allocate the next member-code sequence value.
    ///
    /// Must be a single atomic increment-and-read; concurrent approvals must
    /// never observe the same value.
    async fn next_member_sequence(&self) -> Result<u64, StoreError>;

    /// Soft-delete a club and every account linked to it, as one unit.
    ///
    /// A half-applied cascade (club dead but members live, or vice versa)
    /// must not be observable.
    async fn soft_delete_club_cascade(
        &self,
        club: ClubId,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError>;
}

/// In-memory directory for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    accounts: RwLock<HashMap<AccountId, Account>>,
    clubs: RwLock<HashMap<ClubId, Club>>,
    requests: RwLock<HashMap<RequestId, MembershipRequest>>,
    member_sequence: AtomicU64,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DirectoryStore for InMemoryDirectory {
    async fn account(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        Ok(self.accounts.read().unwrap().get(&id).cloned())
    }

    async fn insert_account(&self, account: Account) -> Result<(), StoreError> {
        let mut accounts = self.accounts.write().unwrap();
        if accounts.contains_key(&account.id) {
            return Err(StoreError::Conflict(format!(
                "account {} already exists",
                account.id
            )));
        }
        accounts.insert(account.id, account);
        Ok(())
    }

    async fn update_account(&self, account: &Account) -> Result<(), StoreError> {
        let mut accounts = self.accounts.write().unwrap();
        if !accounts.contains_key(&account.id) {
            return Err(StoreError::NotFound);
        }
        accounts.insert(account.id, account.clone());
        Ok(())
    }

    async fn list_accounts(&self, filter: AccountFilter) -> Result<Vec<Account>, StoreError> {
        let accounts = self.accounts.read().unwrap();
        let mut matches: Vec<Account> = accounts
            .values()
            .filter(|a| filter.include_deleted || !a.is_deleted())
            .filter(|a| filter.club_id.is_none() || a.club_id == filter.club_id)
            .filter(|a| filter.role.is_none() || Some(a.role) == filter.role)
            .filter(|a| {
                filter
                    .country
                    .as_deref()
                    .map(|c| a.country.as_deref() == Some(c))
                    .unwrap_or(true)
            })
            .cloned()
            .collect();
        matches.sort_by_key(|a| a.created_at);
        Ok(matches)
    }

    async fn club(&self, id: ClubId) -> Result<Option<Club>, StoreError> {
        Ok(self.clubs.read().unwrap().get(&id).cloned())
    }

    async fn insert_club(&self, club: Club) -> Result<(), StoreError> {
        let mut clubs = self.clubs.write().unwrap();
        if clubs.contains_key(&club.id) {
            return Err(StoreError::Conflict(format!(
                "club {} already exists",
                club.id
            )));
        }
        clubs.insert(club.id, club);
        Ok(())
    }

    async fn update_club(&self, club: &Club) -> Result<(), StoreError> {
        let mut clubs = self.clubs.write().unwrap();
        if !clubs.contains_key(&club.id) {
            return Err(StoreError::NotFound);
        }
        clubs.insert(club.id, club.clone());
        Ok(())
    }

    async fn list_clubs(&self, include_deleted: bool) -> Result<Vec<Club>, StoreError> {
        let clubs = self.clubs.read().unwrap();
        let mut all: Vec<Club> = clubs
            .values()
            .filter(|c| include_deleted || !c.is_deleted())
            .cloned()
            .collect();
        all.sort_by_key(|c| c.created_at);
        Ok(all)
    }

    async fn request(&self, id: RequestId) -> Result<Option<MembershipRequest>, StoreError> {
        Ok(self.requests.read().unwrap().get(&id).cloned())
    }

    async fn insert_request(&self, request: MembershipRequest) -> Result<(), StoreError> {
        let mut requests = self.requests.write().unwrap();
        if requests.contains_key(&request.id) {
            return Err(StoreError::Conflict(format!(
                "request {} already exists",
                request.id
            )));
        }
        requests.insert(request.id, request);
        Ok(())
    }

    async fn update_request(&self, request: &MembershipRequest) -> Result<(), StoreError> {
        let mut requests = self.requests.write().unwrap();
        if !requests.contains_key(&request.id) {
            return Err(StoreError::NotFound);
        }
        requests.insert(request.id, request.clone());
        Ok(())
    }

    async fn pending_request_for(
        &self,
        account: AccountId,
    ) -> Result<Option<MembershipRequest>, StoreError> {
        let requests = self.requests.read().unwrap();
        Ok(requests
            .values()
            .find(|r| r.account_id == account && r.status == RequestStatus::Pending)
            .cloned())
    }

    async fn pending_requests_for_club(
        &self,
        club: ClubId,
    ) -> Result<Vec<MembershipRequest>, StoreError> {
        let requests = self.requests.read().unwrap();
        let mut pending: Vec<MembershipRequest> = requests
            .values()
            .filter(|r| r.club_id == club && r.status == RequestStatus::Pending)
            .cloned()
            .collect();
        pending.sort_by_key(|r| r.created_at);
        pending.reverse();
        Ok(pending)
    }

    async fn next_member_sequence(&self) -> Result<u64, StoreError> {
        Ok(self.member_sequence.fetch_add(1, Ordering::SeqCst) + 1)
    }

    async fn soft_delete_club_cascade(
        &self,
        club: ClubId,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        // Both locks are held for the whole mutation, so the cascade is
        // observable only as a whole.
        let mut clubs = self.clubs.write().unwrap();
        let mut accounts = self.accounts.write().unwrap();

        let record = clubs.get_mut(&club).ok_or(StoreError::NotFound)?;
        record.deleted_at = Some(at);
        record.updated_at = at;

        let affected: Vec<AccountId> = accounts
            .values()
            .filter(|a| a.club_id == Some(club) && !a.is_deleted())
            .map(|a| a.id)
            .collect();
        for id in affected {
            if let Some(account) = accounts.get_mut(&id) {
                account.deleted_at = Some(at);
                account.updated_at = at;
            }
        }
        Ok(())
    }
}

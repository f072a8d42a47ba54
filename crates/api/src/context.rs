use coalition_auth::{Actor, SessionSlots};
use coalition_members::records::Account;

/// The authenticated account behind a request, loaded fresh from the
/// directory by the auth middleware. While impersonating, this is the
/// impersonated account, not the admin's.
#[derive(Debug, Clone)]
pub struct ActorContext {
    account: Account,
}

impl ActorContext {
    pub fn new(account: Account) -> Self {
        Self { account }
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn actor(&self) -> Actor {
        self.account.actor()
    }
}

/// The request's session cookie pair.
#[derive(Debug, Clone)]
pub struct SessionContext {
    slots: SessionSlots,
}

impl SessionContext {
    pub fn new(slots: SessionSlots) -> Self {
        Self { slots }
    }

    pub fn slots(&self) -> &SessionSlots {
        &self.slots
    }

    pub fn is_impersonating(&self) -> bool {
        self.slots.is_impersonating()
    }
}

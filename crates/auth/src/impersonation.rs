//! Session impersonation: a super admin temporarily assumes another
//! account's session while keeping a path back to their own.
//!
//! The original identity is parked in a single secondary slot next to the
//! primary session. The slot is an explicit one-element stack: impersonating
//! while already impersonating is rejected rather than silently overwriting
//! the parked session.

use coalition_core::{AccountId, DomainError, DomainResult};

use crate::{Actor, SessionService, SessionToken};

/// The pair of session slots carried by one request channel.
///
/// `original` is only populated while an impersonation is in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSlots {
    pub primary: SessionToken,
    pub original: Option<SessionToken>,
}

impl SessionSlots {
    pub fn new(primary: SessionToken) -> Self {
        Self {
            primary,
            original: None,
        }
    }

    pub fn is_impersonating(&self) -> bool {
        self.original.is_some()
    }
}

/// Swaps sessions between the primary and the parked slot.
pub struct ImpersonationController<'a> {
    sessions: &'a dyn SessionService,
}

impl<'a> ImpersonationController<'a> {
    pub fn new(sessions: &'a dyn SessionService) -> Self {
        Self { sessions }
    }

    /// Begin impersonating `target`. Super admin only; one level deep.
    ///
    /// The caller is responsible for verifying that `target` resolves to an
    /// existing account before invoking this.
    pub fn impersonate(
        &self,
        actor: &Actor,
        slots: SessionSlots,
        target: AccountId,
    ) -> DomainResult<SessionSlots> {
        actor.ensure_super_admin()?;

        if slots.is_impersonating() {
            return Err(DomainError::bad_request("already impersonating"));
        }

        let minted = self.sessions.mint(target);
        tracing::info!(admin = %actor.account_id, target = %target, "impersonation started");

        Ok(SessionSlots {
            primary: minted,
            original: Some(slots.primary),
        })
    }

    /// Promote the parked session back to primary and clear the slot.
    pub fn stop(&self, slots: SessionSlots) -> DomainResult<SessionSlots> {
        let original = slots
            .original
            .ok_or_else(|| DomainError::bad_request("not impersonating"))?;

        // The impersonated session is dead once we swap back.
        self.sessions.revoke(&slots.primary);

        Ok(SessionSlots::new(original))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{InMemorySessions, Role};

    fn super_admin() -> Actor {
        Actor::new(AccountId::new(), Role::SuperAdmin, None)
    }

    #[test]
    fn impersonate_then_stop_restores_original_session() {
        let sessions = InMemorySessions::new();
        let controller = ImpersonationController::new(&sessions);

        let admin = super_admin();
        let target = AccountId::new();
        let original = sessions.mint(admin.account_id);

        let slots = controller
            .impersonate(&admin, SessionSlots::new(original.clone()), target)
            .unwrap();
        assert!(slots.is_impersonating());
        assert_eq!(sessions.resolve(&slots.primary), Some(target));

        let restored = controller.stop(slots).unwrap();
        assert!(!restored.is_impersonating());
        assert_eq!(restored.primary, original);
        assert_eq!(sessions.resolve(&restored.primary), Some(admin.account_id));
    }

    #[test]
    fn nested_impersonation_is_rejected() {
        let sessions = InMemorySessions::new();
        let controller = ImpersonationController::new(&sessions);
        let admin = super_admin();

        let slots = controller
            .impersonate(
                &admin,
                SessionSlots::new(sessions.mint(admin.account_id)),
                AccountId::new(),
            )
            .unwrap();

        let err = controller
            .impersonate(&admin, slots, AccountId::new())
            .unwrap_err();
        assert!(matches!(err, DomainError::BadRequest(_)));
    }

    #[test]
    fn only_super_admin_may_impersonate() {
        let sessions = InMemorySessions::new();
        let controller = ImpersonationController::new(&sessions);
        let president = Actor::new(AccountId::new(), Role::ClubAdmin, None);

        let err = controller
            .impersonate(
                &president,
                SessionSlots::new(sessions.mint(president.account_id)),
                AccountId::new(),
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[test]
    fn stop_without_impersonation_is_bad_request() {
        let sessions = InMemorySessions::new();
        let controller = ImpersonationController::new(&sessions);

        let err = controller
            .stop(SessionSlots::new(sessions.mint(AccountId::new())))
            .unwrap_err();
        assert!(matches!(err, DomainError::BadRequest(_)));
    }
}

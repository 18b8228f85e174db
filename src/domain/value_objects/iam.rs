use uuid::Uuid;

use super::enums::account_roles::AccountRole;

/// Identity of the caller as asserted by the auth layer. Ownership decisions
/// at settlement time never trust this; they re-check persisted state.
#[derive(Debug, Clone, Copy)]
pub struct Requester {
    pub account_id: Uuid,
    pub role: AccountRole,
}

impl Requester {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

//! Club service port.
//!
//! Supplies the club plan the policy reads when a resource is club-scoped,
//! plus the member count for the member-capacity gate.

use crate::domain::entitlement::ClubPlan;
use crate::domain::foundation::{ClubId, DomainError, UserId};
use async_trait::async_trait;

/// Port for the external club service.
#[async_trait]
pub trait ClubService: Send + Sync {
    /// Fetch a club's current plan.
    ///
    /// Returns `None` if the club does not exist.
    async fn get_club_plan(&self, club_id: ClubId) -> Result<Option<ClubPlan>, DomainError>;

    /// Current member count of a club.
    async fn get_member_count(&self, club_id: ClubId) -> Result<u32, DomainError>;

    /// Whether the user holds any club plan (gates club creation).
    async fn user_has_club_plan(&self, user_id: UserId) -> Result<bool, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trait object safety test
    #[test]
    fn club_service_is_object_safe() {
        fn _accepts_dyn(_service: &dyn ClubService) {}
    }
}

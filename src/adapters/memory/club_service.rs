//! In-memory club service backed by a static plan table.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::entitlement::ClubPlan;
use crate::domain::foundation::{ClubId, DomainError, UserId};
use crate::ports::ClubService;

#[derive(Default)]
pub struct StaticClubService {
    plans: Mutex<HashMap<ClubId, ClubPlan>>,
    member_counts: Mutex<HashMap<ClubId, u32>>,
    plan_holders: Mutex<HashSet<UserId>>,
}

impl StaticClubService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_plan(&self, club_id: ClubId, plan: ClubPlan) {
        self.plans
            .lock()
            .expect("club lock poisoned")
            .insert(club_id, plan);
    }

    pub fn set_member_count(&self, club_id: ClubId, count: u32) {
        self.member_counts
            .lock()
            .expect("club lock poisoned")
            .insert(club_id, count);
    }

    pub fn grant_plan_to(&self, user_id: UserId) {
        self.plan_holders
            .lock()
            .expect("club lock poisoned")
            .insert(user_id);
    }
}

#[async_trait]
impl ClubService for StaticClubService {
    async fn get_club_plan(&self, club_id: ClubId) -> Result<Option<ClubPlan>, DomainError> {
        Ok(self
            .plans
            .lock()
            .expect("club lock poisoned")
            .get(&club_id)
            .cloned())
    }

    async fn get_member_count(&self, club_id: ClubId) -> Result<u32, DomainError> {
        Ok(self
            .member_counts
            .lock()
            .expect("club lock poisoned")
            .get(&club_id)
            .copied()
            .unwrap_or(0))
    }

    async fn user_has_club_plan(&self, user_id: UserId) -> Result<bool, DomainError> {
        Ok(self
            .plan_holders
            .lock()
            .expect("club lock poisoned")
            .contains(&user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entitlement::SubscriptionStatus;

    #[tokio::test]
    async fn plan_and_member_count_are_read_back() {
        let service = StaticClubService::new();
        let club_id = ClubId::new();
        service.set_plan(
            club_id,
            ClubPlan {
                plan_id: "CLUB_BASIC".to_string(),
                subscription: SubscriptionStatus::Active,
                max_event_participants: Some(200),
                max_members: Some(100),
                allow_paid_events: false,
                allow_csv_export: false,
            },
        );
        service.set_member_count(club_id, 42);

        let plan = service.get_club_plan(club_id).await.unwrap().unwrap();
        assert_eq!(plan.plan_id, "CLUB_BASIC");
        assert_eq!(service.get_member_count(club_id).await.unwrap(), 42);
    }

    #[tokio::test]
    async fn unknown_club_has_no_plan_and_zero_members() {
        let service = StaticClubService::new();
        let club_id = ClubId::new();

        assert!(service.get_club_plan(club_id).await.unwrap().is_none());
        assert_eq!(service.get_member_count(club_id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn plan_holding_is_per_user() {
        let service = StaticClubService::new();
        let holder = UserId::new();
        service.grant_plan_to(holder);

        assert!(service.user_has_club_plan(holder).await.unwrap());
        assert!(!service.user_has_club_plan(UserId::new()).await.unwrap());
    }
}

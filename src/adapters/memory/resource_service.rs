//! In-memory resource service standing in for the platform's event storage.
//!
//! Doubles as the compensation test harness: deletes can be scripted to fail
//! so orchestrator rollback behavior is observable.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode, ResourceId};
use crate::ports::{NewResource, ResourceService, ResourceSummary};

#[derive(Default)]
pub struct InMemoryResourceService {
    resources: Mutex<HashMap<ResourceId, ResourceSummary>>,
    fail_deletes: Mutex<bool>,
}

impl InMemoryResourceService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent delete fail. Test hook.
    pub fn fail_deletes(&self) {
        *self.fail_deletes.lock().expect("resource lock poisoned") = true;
    }

    pub fn contains(&self, resource_id: ResourceId) -> bool {
        self.resources
            .lock()
            .expect("resource lock poisoned")
            .contains_key(&resource_id)
    }
}

#[async_trait]
impl ResourceService for InMemoryResourceService {
    async fn create_resource(&self, resource: NewResource) -> Result<ResourceId, DomainError> {
        let id = ResourceId::new();
        let summary = ResourceSummary {
            id,
            participants: resource.participants,
            club_id: resource.club_id,
            is_paid: resource.is_paid,
        };
        self.resources
            .lock()
            .expect("resource lock poisoned")
            .insert(id, summary);
        Ok(id)
    }

    async fn delete_resource(&self, resource_id: ResourceId) -> Result<(), DomainError> {
        if *self.fail_deletes.lock().expect("resource lock poisoned") {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                "delete rejected by storage",
            ));
        }
        let removed = self
            .resources
            .lock()
            .expect("resource lock poisoned")
            .remove(&resource_id);
        match removed {
            Some(_) => Ok(()),
            None => Err(DomainError::new(
                ErrorCode::ResourceNotFound,
                format!("resource {} not found", resource_id),
            )),
        }
    }

    async fn get_resource(
        &self,
        resource_id: ResourceId,
    ) -> Result<Option<ResourceSummary>, DomainError> {
        Ok(self
            .resources
            .lock()
            .expect("resource lock poisoned")
            .get(&resource_id)
            .cloned())
    }
}

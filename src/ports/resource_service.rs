//! Resource service port.
//!
//! The gated resource (an event) is owned by its own domain service; this
//! core treats it as foreign, referencing it by id. The contract covers
//! exactly what the entitlement core needs: creation (so the orchestrator
//! can wrap it), deletion (the compensation path), and a shape lookup.

use crate::domain::foundation::{ClubId, DomainError, ResourceId, UserId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Input for creating a gated resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewResource {
    pub owner_id: UserId,
    pub title: String,
    pub participants: u32,
    pub club_id: Option<ClubId>,
    pub is_paid: bool,
}

/// Entitlement-relevant shape of an existing resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSummary {
    pub id: ResourceId,
    pub participants: u32,
    pub club_id: Option<ClubId>,
    pub is_paid: bool,
}

/// Port for the external resource (event) service.
#[async_trait]
pub trait ResourceService: Send + Sync {
    /// Persist a new resource and return its id.
    async fn create_resource(&self, input: NewResource) -> Result<ResourceId, DomainError>;

    /// Delete a resource. Used by the orchestrator's compensation path.
    async fn delete_resource(&self, id: ResourceId) -> Result<(), DomainError>;

    /// Fetch a resource's entitlement-relevant shape.
    ///
    /// Returns `None` if the resource does not exist.
    async fn get_resource(&self, id: ResourceId) -> Result<Option<ResourceSummary>, DomainError>;
}

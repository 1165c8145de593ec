//! Domain layer - pure business logic, no I/O.

pub mod billing;
pub mod catalog;
pub mod entitlement;
pub mod foundation;

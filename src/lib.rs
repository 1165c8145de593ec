//! Gatherly Billing - Entitlement Enforcement and Credit Consumption
//!
//! This crate implements the monetization core of the Gatherly events/clubs
//! platform: the entitlement policy gating event saves, the credit ledger
//! with exactly-once consumption, and the compensating-transaction
//! orchestrator tying resource creation to credit spends.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

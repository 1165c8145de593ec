pub mod billing;
pub mod entitlement;

//! Database entities for the alert tracker.

pub mod alert;
pub mod alert_rule;
pub mod customer;
pub mod endpoint;
pub mod mitigation_strategy;
pub mod rule;
pub mod source;
pub mod user_profile;

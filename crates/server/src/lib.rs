//! Backend for tracking security alerts across customers.
//!
//! Alerts flow in from registered monitoring sources, get triaged by SOC
//! analysts with a closure code, and findings classified as true-positive
//! non-malicious can be remediated by the affected customer directly.
//! Dashboards and downloadable PDF reports summarize activity per
//! customer.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::AppConfig;

pub mod api;
pub mod auth;
pub mod config;
pub mod entity;
pub mod error;
pub mod filters;
pub mod lifecycle;
pub mod report;
pub mod response;
pub mod stats;

/// Shared handles attached to every request as an axum extension.
#[derive(Clone, Debug)]
pub struct AppResources {
    pub db: Arc<DatabaseConnection>,
    pub config: Arc<AppConfig>,
}

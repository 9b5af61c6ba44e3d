//! Dashboard statistics endpoints.

use crate::auth::{Caller, Role};
use crate::entity::{customer, endpoint};
use crate::error::ApiError;
use crate::filters::parse_timestamp;
use crate::stats::{self, AlertStats, EndpointStats};
use crate::AppResources;
use axum::extract::{Path, Query};
use axum::{Extension, Json};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::Deserialize;
use time::{Duration, OffsetDateTime};
use utoipa::IntoParams;
use utoipa_axum::{router::OpenApiRouter, routes};

/// Tag for OpenAPI documentation.
pub const DASHBOARD_TAG: &str = "Dashboard";

/// Creates the dashboard API router.
pub fn router() -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(company_endpoint_stats))
        .routes(routes!(company_alert_stats))
}

/// Resolve the customer a dashboard request refers to. Analysts address
/// any customer by company name; customers are self-scoped and the path
/// segment is ignored for them.
pub(crate) async fn resolve_customer(
    resources: &AppResources,
    caller: &Caller,
    company: &str,
) -> Result<customer::Model, ApiError> {
    match caller.role {
        Some(Role::Analyst) => {
            caller.require_analyst()?;
            customer::Entity::find()
                .filter(customer::Column::CompanyName.eq(company))
                .one(resources.db.as_ref())
                .await?
                .ok_or_else(|| ApiError::not_found("Customer"))
        }
        _ => {
            let customer_id = caller.require_customer()?;
            customer::Entity::find_by_id(customer_id)
                .one(resources.db.as_ref())
                .await?
                .ok_or_else(|| ApiError::not_found("Customer"))
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct WindowParams {
    /// Window start, RFC 3339. Defaults to seven days before now.
    pub after: Option<String>,
    /// Window end, RFC 3339. Defaults to now.
    pub before: Option<String>,
}

impl WindowParams {
    /// Parse the inclusive [after, before] window, defaulting to the
    /// trailing seven days.
    pub fn resolve(&self) -> Result<(OffsetDateTime, OffsetDateTime), ApiError> {
        let now = OffsetDateTime::now_utc();
        let after = match &self.after {
            Some(value) => parse_timestamp("after", value)?,
            None => now - Duration::days(7),
        };
        let before = match &self.before {
            Some(value) => parse_timestamp("before", value)?,
            None => now,
        };
        Ok((after, before))
    }
}

#[tracing::instrument(skip(resources, caller))]
#[utoipa::path(
    get,
    path = "/{company}/endpoints",
    operation_id = "Endpoint Dashboard",
    tag = DASHBOARD_TAG,
    summary = "Endpoint counts for a company",
    params(("company" = String, Path, description = "Customer company name")),
    responses(
        (status = 200, description = "Endpoint counts", body = EndpointStats),
        (status = 401, description = "Missing or invalid credentials", content_type = "application/json"),
        (status = 403, description = "Caller has neither role", content_type = "application/json"),
        (status = 404, description = "Unknown or foreign company", content_type = "application/json")
    ),
    security(("Authorization" = []))
)]
async fn company_endpoint_stats(
    Extension(resources): Extension<AppResources>,
    caller: Caller,
    Path(company): Path<String>,
) -> Result<Json<EndpointStats>, ApiError> {
    let customer = resolve_customer(&resources, &caller, &company).await?;
    let endpoints = endpoint::Entity::find()
        .filter(endpoint::Column::CustomerId.eq(customer.id))
        .all(resources.db.as_ref())
        .await?;
    Ok(Json(stats::endpoint_stats(&endpoints)))
}

#[tracing::instrument(skip(resources, caller, window))]
#[utoipa::path(
    get,
    path = "/{company}/alerts",
    operation_id = "Alert Dashboard",
    tag = DASHBOARD_TAG,
    summary = "Alert statistics for a company and time window",
    description = "Groups the company's alerts within the window by severity, \
                   creation day, source and status. The window defaults to the \
                   trailing seven days.",
    params(
        ("company" = String, Path, description = "Customer company name"),
        WindowParams
    ),
    responses(
        (status = 200, description = "Alert statistics", body = AlertStats),
        (status = 400, description = "Malformed window bound", content_type = "application/json"),
        (status = 401, description = "Missing or invalid credentials", content_type = "application/json"),
        (status = 403, description = "Caller has neither role", content_type = "application/json"),
        (status = 404, description = "Unknown or foreign company", content_type = "application/json")
    ),
    security(("Authorization" = []))
)]
async fn company_alert_stats(
    Extension(resources): Extension<AppResources>,
    caller: Caller,
    Path(company): Path<String>,
    Query(window): Query<WindowParams>,
) -> Result<Json<AlertStats>, ApiError> {
    // Malformed window bounds are rejected before any query runs.
    let (after, before) = window.resolve()?;
    let customer = resolve_customer(&resources, &caller, &company).await?;
    let pairs = stats::alerts_in_window(resources.db.as_ref(), customer.id, after, before).await?;
    Ok(Json(stats::alert_stats(&pairs)))
}

//! PDF report download endpoint.

use crate::auth::{Caller, Role};
use crate::entity::{customer, endpoint};
use crate::error::ApiError;
use crate::report::{render_pdf, ReportData};
use crate::stats;
use crate::AppResources;
use axum::extract::Query;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Extension;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::Deserialize;
use utoipa::IntoParams;

use super::dashboard::WindowParams;

/// Tag for OpenAPI documentation.
pub const REPORTS_TAG: &str = "Reports";

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ReportParams {
    /// Company to report on. Required for analysts; ignored for customer
    /// callers, who always receive their own report.
    pub company_name: Option<String>,
    /// Window start, RFC 3339. Defaults to seven days before now.
    pub after: Option<String>,
    /// Window end, RFC 3339. Defaults to now.
    pub before: Option<String>,
}

#[tracing::instrument(skip(resources, caller, params))]
#[utoipa::path(
    get,
    path = "/pdf-report",
    operation_id = "Download PDF Report",
    tag = REPORTS_TAG,
    summary = "Download a PDF activity report",
    description = "Renders the dashboard statistics and the endpoint inventory of one \
                   customer into a downloadable PDF. Customers always receive their own \
                   report; analysts must name the company.",
    params(ReportParams),
    responses(
        (status = 200, description = "The report", content_type = "application/pdf"),
        (status = 400, description = "Missing company_name or malformed window bound", content_type = "application/json"),
        (status = 401, description = "Missing or invalid credentials", content_type = "application/json"),
        (status = 403, description = "Caller has neither role", content_type = "application/json"),
        (status = 404, description = "Unknown company", content_type = "application/json")
    ),
    security(("Authorization" = []))
)]
pub async fn pdf_report(
    Extension(resources): Extension<AppResources>,
    caller: Caller,
    Query(params): Query<ReportParams>,
) -> Result<impl IntoResponse, ApiError> {
    let customer = match caller.role {
        Some(Role::Analyst) => {
            caller.require_analyst()?;
            let company = params
                .company_name
                .as_deref()
                .ok_or_else(|| ApiError::field("company_name", "This field is required."))?;
            customer::Entity::find()
                .filter(customer::Column::CompanyName.eq(company))
                .one(resources.db.as_ref())
                .await?
                .ok_or_else(|| ApiError::not_found("Customer"))?
        }
        _ => {
            let customer_id = caller.require_customer()?;
            customer::Entity::find_by_id(customer_id)
                .one(resources.db.as_ref())
                .await?
                .ok_or_else(|| ApiError::not_found("Customer"))?
        }
    };

    let window = WindowParams {
        after: params.after,
        before: params.before,
    };
    let (after, before) = window.resolve()?;

    let pairs = stats::alerts_in_window(resources.db.as_ref(), customer.id, after, before).await?;
    let endpoints = endpoint::Entity::find()
        .filter(endpoint::Column::CustomerId.eq(customer.id))
        .order_by_asc(endpoint::Column::Id)
        .all(resources.db.as_ref())
        .await?;

    let data = ReportData::build(
        customer.company_name,
        after,
        before,
        stats::alert_stats(&pairs),
        endpoints,
    );
    let filename = data.filename();
    let bytes = render_pdf(&data, &resources.config.report)?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    ))
}

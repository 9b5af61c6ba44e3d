//! Endpoint inventory endpoints.
//!
//! Customers see their own fleet; analysts browse any customer's fleet by
//! company name and may deactivate individual endpoints.

use crate::auth::Caller;
use crate::entity::{customer, endpoint};
use crate::error::ApiError;
use crate::lifecycle;
use crate::response::CustomerEndpointBody;
use crate::AppResources;
use axum::extract::Path;
use axum::{Extension, Json};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use utoipa_axum::{router::OpenApiRouter, routes};

/// Tag for OpenAPI documentation.
pub const ENDPOINTS_TAG: &str = "Endpoints";

/// Creates the endpoints API router.
pub fn router() -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_own_endpoints))
        .routes(routes!(list_company_endpoints))
        .routes(routes!(get_company_endpoint, deactivate_company_endpoint))
}

#[tracing::instrument(skip(resources, caller))]
#[utoipa::path(
    get,
    path = "/",
    operation_id = "List Own Endpoints",
    tag = ENDPOINTS_TAG,
    summary = "List the caller's own endpoints",
    responses(
        (status = 200, description = "Endpoints of the caller's customer", body = Vec<CustomerEndpointBody>),
        (status = 401, description = "Missing or invalid credentials", content_type = "application/json"),
        (status = 403, description = "Caller has no customer affiliation", content_type = "application/json")
    ),
    security(("Authorization" = []))
)]
async fn list_own_endpoints(
    Extension(resources): Extension<AppResources>,
    caller: Caller,
) -> Result<Json<Vec<CustomerEndpointBody>>, ApiError> {
    let customer_id = caller.require_customer()?;
    let endpoints = endpoint::Entity::find()
        .filter(endpoint::Column::CustomerId.eq(customer_id))
        .order_by_asc(endpoint::Column::Id)
        .all(resources.db.as_ref())
        .await?;
    Ok(Json(
        endpoints.into_iter().map(CustomerEndpointBody::from).collect(),
    ))
}

#[tracing::instrument(skip(resources, caller))]
#[utoipa::path(
    get,
    path = "/{company}",
    operation_id = "List Company Endpoints",
    tag = ENDPOINTS_TAG,
    summary = "List a company's endpoints",
    description = "Analyst-only listing of a customer's fleet by company name. An \
                   unknown company yields an empty list, not an error.",
    params(("company" = String, Path, description = "Customer company name")),
    responses(
        (status = 200, description = "Endpoints of the company", body = Vec<endpoint::Model>),
        (status = 401, description = "Missing or invalid credentials", content_type = "application/json"),
        (status = 403, description = "Caller is not an MFA-verified analyst", content_type = "application/json")
    ),
    security(("Authorization" = []))
)]
async fn list_company_endpoints(
    Extension(resources): Extension<AppResources>,
    caller: Caller,
    Path(company): Path<String>,
) -> Result<Json<Vec<endpoint::Model>>, ApiError> {
    caller.require_analyst()?;
    let Some(customer) = customer::Entity::find()
        .filter(customer::Column::CompanyName.eq(company))
        .one(resources.db.as_ref())
        .await?
    else {
        return Ok(Json(Vec::new()));
    };

    let endpoints = endpoint::Entity::find()
        .filter(endpoint::Column::CustomerId.eq(customer.id))
        .order_by_asc(endpoint::Column::Id)
        .all(resources.db.as_ref())
        .await?;
    Ok(Json(endpoints))
}

/// Resolve one endpoint by company name + id, 404 when either is unknown
/// or the endpoint belongs to a different customer.
async fn find_company_endpoint(
    resources: &AppResources,
    company: &str,
    endpoint_id: i32,
) -> Result<endpoint::Model, ApiError> {
    let customer = customer::Entity::find()
        .filter(customer::Column::CompanyName.eq(company))
        .one(resources.db.as_ref())
        .await?
        .ok_or_else(|| ApiError::not_found("Customer"))?;

    endpoint::Entity::find_by_id(endpoint_id)
        .filter(endpoint::Column::CustomerId.eq(customer.id))
        .one(resources.db.as_ref())
        .await?
        .ok_or_else(|| ApiError::not_found("Endpoint"))
}

#[tracing::instrument(skip(resources, caller))]
#[utoipa::path(
    get,
    path = "/{company}/{id}",
    operation_id = "Get Company Endpoint",
    tag = ENDPOINTS_TAG,
    summary = "Fetch one endpoint of a company",
    params(
        ("company" = String, Path, description = "Customer company name"),
        ("id" = i32, Path, description = "Endpoint id")
    ),
    responses(
        (status = 200, description = "The endpoint", body = endpoint::Model),
        (status = 401, description = "Missing or invalid credentials", content_type = "application/json"),
        (status = 403, description = "Caller is not an MFA-verified analyst", content_type = "application/json"),
        (status = 404, description = "Unknown company or endpoint", content_type = "application/json")
    ),
    security(("Authorization" = []))
)]
async fn get_company_endpoint(
    Extension(resources): Extension<AppResources>,
    caller: Caller,
    Path((company, id)): Path<(String, i32)>,
) -> Result<Json<endpoint::Model>, ApiError> {
    caller.require_analyst()?;
    let endpoint = find_company_endpoint(&resources, &company, id).await?;
    Ok(Json(endpoint))
}

#[tracing::instrument(skip(resources, caller))]
#[utoipa::path(
    patch,
    path = "/{company}/{id}",
    operation_id = "Deactivate Endpoint",
    tag = ENDPOINTS_TAG,
    summary = "Deactivate an endpoint",
    description = "Marks the endpoint inactive. There is no reactivation through the \
                   API; an inactive endpoint stops accepting new alerts.",
    params(
        ("company" = String, Path, description = "Customer company name"),
        ("id" = i32, Path, description = "Endpoint id")
    ),
    responses(
        (status = 200, description = "Deactivated endpoint", body = endpoint::Model),
        (status = 401, description = "Missing or invalid credentials", content_type = "application/json"),
        (status = 403, description = "Caller is not an MFA-verified analyst", content_type = "application/json"),
        (status = 404, description = "Unknown company or endpoint", content_type = "application/json")
    ),
    security(("Authorization" = []))
)]
async fn deactivate_company_endpoint(
    Extension(resources): Extension<AppResources>,
    caller: Caller,
    Path((company, id)): Path<(String, i32)>,
) -> Result<Json<endpoint::Model>, ApiError> {
    caller.require_analyst()?;
    let endpoint = find_company_endpoint(&resources, &company, id).await?;
    let updated = lifecycle::deactivate_endpoint(resources.db.as_ref(), endpoint.id).await?;
    Ok(Json(updated))
}

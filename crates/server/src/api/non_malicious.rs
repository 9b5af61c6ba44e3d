//! Customer self-remediation of non-malicious (TPNM) findings.
//!
//! Everything here is scoped to the caller's own customer AND to alerts
//! whose closure code is TPNM; anything outside that set reads as not
//! found and is never mutated.

use crate::auth::Caller;
use crate::entity::alert::{self, ClosureCode, Mitigation};
use crate::error::{ApiError, ApiJson};
use crate::lifecycle;
use crate::response::AlertBody;
use crate::AppResources;
use axum::extract::Path;
use axum::{Extension, Json};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::Deserialize;
use serde_json::{json, Value};
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

/// Tag for OpenAPI documentation.
pub const SELF_SERVICE_TAG: &str = "Self-Service";

/// Creates the self-remediation router, nested under `/alerts`.
pub fn router() -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_non_malicious))
        .routes(routes!(
            get_non_malicious,
            select_mitigation,
            resolve_non_malicious
        ))
}

#[tracing::instrument(skip(resources, caller))]
#[utoipa::path(
    get,
    path = "/non-malicious",
    operation_id = "List Non-Malicious Alerts",
    tag = SELF_SERVICE_TAG,
    summary = "List the caller's alerts classified as TPNM",
    responses(
        (status = 200, description = "TPNM alerts of the caller's customer", body = Vec<AlertBody>),
        (status = 401, description = "Missing or invalid credentials", content_type = "application/json"),
        (status = 403, description = "Caller has no customer affiliation", content_type = "application/json")
    ),
    security(("Authorization" = []))
)]
async fn list_non_malicious(
    Extension(resources): Extension<AppResources>,
    caller: Caller,
) -> Result<Json<Vec<AlertBody>>, ApiError> {
    let customer_id = caller.require_customer()?;
    let alerts = alert::Entity::find()
        .filter(alert::Column::CustomerId.eq(customer_id))
        .filter(alert::Column::ClosureCode.eq(ClosureCode::Tpnm))
        .order_by_asc(alert::Column::Id)
        .all(resources.db.as_ref())
        .await?;
    Ok(Json(
        AlertBody::load_many(resources.db.as_ref(), alerts).await?,
    ))
}

#[tracing::instrument(skip(resources, caller))]
#[utoipa::path(
    get,
    path = "/non-malicious/{id}",
    operation_id = "Get Non-Malicious Alert",
    tag = SELF_SERVICE_TAG,
    summary = "Fetch one of the caller's TPNM alerts",
    params(("id" = i32, Path, description = "Alert id")),
    responses(
        (status = 200, description = "The alert", body = AlertBody),
        (status = 401, description = "Missing or invalid credentials", content_type = "application/json"),
        (status = 403, description = "Caller has no customer affiliation", content_type = "application/json"),
        (status = 404, description = "Alert unknown, foreign, or not TPNM", content_type = "application/json")
    ),
    security(("Authorization" = []))
)]
async fn get_non_malicious(
    Extension(resources): Extension<AppResources>,
    caller: Caller,
    Path(id): Path<i32>,
) -> Result<Json<AlertBody>, ApiError> {
    let customer_id = caller.require_customer()?;
    let alert = lifecycle::find_non_malicious(resources.db.as_ref(), customer_id, id).await?;
    Ok(Json(AlertBody::load(resources.db.as_ref(), alert).await?))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SelectMitigation {
    /// Who owns remediation: NA, soc or customer.
    pub mitigation: String,
}

#[tracing::instrument(skip(resources, caller, payload))]
#[utoipa::path(
    patch,
    path = "/non-malicious/{id}",
    operation_id = "Select Mitigation Owner",
    tag = SELF_SERVICE_TAG,
    summary = "Select who remediates a TPNM finding",
    description = "Records which party owns remediation of the finding. The alert \
                   status is left unchanged.",
    params(("id" = i32, Path, description = "Alert id")),
    request_body(content = SelectMitigation),
    responses(
        (status = 200, description = "Updated alert", body = AlertBody),
        (status = 400, description = "Unknown mitigation value", content_type = "application/json"),
        (status = 401, description = "Missing or invalid credentials", content_type = "application/json"),
        (status = 403, description = "Caller has no customer affiliation", content_type = "application/json"),
        (status = 404, description = "Alert unknown, foreign, or not TPNM", content_type = "application/json")
    ),
    security(("Authorization" = []))
)]
async fn select_mitigation(
    Extension(resources): Extension<AppResources>,
    caller: Caller,
    Path(id): Path<i32>,
    ApiJson(payload): ApiJson<SelectMitigation>,
) -> Result<Json<AlertBody>, ApiError> {
    let customer_id = caller.require_customer()?;
    let mitigation: Mitigation = payload
        .mitigation
        .parse()
        .map_err(|message: String| ApiError::field("mitigation", message))?;

    let alert =
        lifecycle::select_mitigation(resources.db.as_ref(), customer_id, id, mitigation).await?;
    Ok(Json(AlertBody::load(resources.db.as_ref(), alert).await?))
}

#[tracing::instrument(skip(resources, caller))]
#[utoipa::path(
    put,
    path = "/non-malicious/{id}",
    operation_id = "Resolve Non-Malicious Alert",
    tag = SELF_SERVICE_TAG,
    summary = "Mark a TPNM finding as resolved",
    description = "Moves the alert into the resolved state, stamping the acting user \
                   and the resolution time.",
    params(("id" = i32, Path, description = "Alert id")),
    responses(
        (status = 200, description = "Alert resolved", content_type = "application/json", example = json!({"detail": "Alert marked as resolved."})),
        (status = 401, description = "Missing or invalid credentials", content_type = "application/json"),
        (status = 403, description = "Caller has no customer affiliation", content_type = "application/json"),
        (status = 404, description = "Alert unknown, foreign, or not TPNM", content_type = "application/json")
    ),
    security(("Authorization" = []))
)]
async fn resolve_non_malicious(
    Extension(resources): Extension<AppResources>,
    caller: Caller,
    Path(id): Path<i32>,
) -> Result<Json<Value>, ApiError> {
    let customer_id = caller.require_customer()?;
    lifecycle::resolve_alert(resources.db.as_ref(), customer_id, id, caller.user_id).await?;
    Ok(Json(json!({ "detail": "Alert marked as resolved." })))
}
